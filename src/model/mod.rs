//! Résumé document model.
//!
//! This module defines the in-memory schema of a résumé and the pure
//! transition function ([`apply`]) through which every edit flows.
//! Nothing here performs I/O; persistence lives in [`crate::store`].

#[macro_use]
mod patch;

mod document;
mod edit;
mod entries;
mod theme;

pub use document::{Document, PersonalInfo, PersonalInfoPatch};
pub use edit::{apply, apply_at, transition, Edit};
pub use entries::{
    Certification, CertificationPatch, Education, EducationPatch, Entry, Experience,
    ExperiencePatch, Language, LanguagePatch, Proficiency, Project, ProjectPatch, Skill,
    SkillCategory, SkillLevel, SkillPatch,
};
pub use patch::Patch;
pub use theme::{LayoutVariant, Palette, Section, Sections, SectionsPatch, Theme};
