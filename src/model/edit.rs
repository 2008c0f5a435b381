//! Edits and the pure transition function that applies them.
//!
//! # Example
//!
//! ```
//! use cvbuilder::model::{apply, Document, Edit, Experience};
//!
//! let doc = Document::new();
//! let next = apply(&doc, Edit::AddExperience(Experience::new("e1", "Engineer", "Acme")));
//! assert_eq!(next.experiences.len(), 1);
//! assert!(doc.experiences.is_empty());
//! ```

use super::{
    Certification, CertificationPatch, Document, Education, EducationPatch, Entry, Experience,
    ExperiencePatch, Language, LanguagePatch, Patch, PersonalInfoPatch, Project, ProjectPatch,
    SectionsPatch, Skill, SkillPatch, Theme,
};
use chrono::{DateTime, Utc};

/// An edit applied to a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Replace the whole document.
    Load(Box<Document>),
    /// Merge fields into the personal-info block.
    UpdatePersonalInfo(PersonalInfoPatch),

    AddExperience(Experience),
    UpdateExperience { id: String, patch: ExperiencePatch },
    DeleteExperience(String),

    AddEducation(Education),
    UpdateEducation { id: String, patch: EducationPatch },
    DeleteEducation(String),

    AddSkill(Skill),
    UpdateSkill { id: String, patch: SkillPatch },
    DeleteSkill(String),

    AddProject(Project),
    UpdateProject { id: String, patch: ProjectPatch },
    DeleteProject(String),

    AddCertification(Certification),
    UpdateCertification { id: String, patch: CertificationPatch },
    DeleteCertification(String),

    AddLanguage(Language),
    UpdateLanguage { id: String, patch: LanguagePatch },
    DeleteLanguage(String),

    /// Replace the theme.
    UpdateTheme(Theme),
    /// Merge visibility flags.
    UpdateSections(SectionsPatch),
    /// Restore defaults, keeping identity and creation time.
    Reset,
}

impl Edit {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Edit::Load(_) => "load",
            Edit::UpdatePersonalInfo(_) => "update_personal_info",
            Edit::AddExperience(_) => "add_experience",
            Edit::UpdateExperience { .. } => "update_experience",
            Edit::DeleteExperience(_) => "delete_experience",
            Edit::AddEducation(_) => "add_education",
            Edit::UpdateEducation { .. } => "update_education",
            Edit::DeleteEducation(_) => "delete_education",
            Edit::AddSkill(_) => "add_skill",
            Edit::UpdateSkill { .. } => "update_skill",
            Edit::DeleteSkill(_) => "delete_skill",
            Edit::AddProject(_) => "add_project",
            Edit::UpdateProject { .. } => "update_project",
            Edit::DeleteProject(_) => "delete_project",
            Edit::AddCertification(_) => "add_certification",
            Edit::UpdateCertification { .. } => "update_certification",
            Edit::DeleteCertification(_) => "delete_certification",
            Edit::AddLanguage(_) => "add_language",
            Edit::UpdateLanguage { .. } => "update_language",
            Edit::DeleteLanguage(_) => "delete_language",
            Edit::UpdateTheme(_) => "update_theme",
            Edit::UpdateSections(_) => "update_sections",
            Edit::Reset => "reset",
        }
    }
}

/// Apply an edit, stamping `updated_at` with the current time.
///
/// Never mutates `doc`. Edits that change nothing (an unknown id, a
/// duplicate add, an empty patch) return an equal document.
pub fn apply(doc: &Document, edit: Edit) -> Document {
    apply_at(doc, edit, Utc::now())
}

/// Apply an edit with an explicit clock value.
pub fn apply_at(doc: &Document, edit: Edit, now: DateTime<Utc>) -> Document {
    transition(doc, edit, now).unwrap_or_else(|| doc.clone())
}

/// Apply an edit, returning `None` when the edit leaves the document unchanged.
pub fn transition(doc: &Document, edit: Edit, now: DateTime<Utc>) -> Option<Document> {
    let mut next = doc.clone();

    match edit {
        Edit::Load(loaded) => return (*loaded != *doc).then_some(*loaded),
        Edit::Reset => {
            let mut reset = Document::with_identity(doc.id.clone(), doc.created_at);
            reset.updated_at = doc.updated_at;
            if reset == *doc {
                return None;
            }
            reset.updated_at = now;
            return Some(reset);
        }
        Edit::UpdatePersonalInfo(patch) => patch.apply_to(&mut next.personal_info),

        Edit::AddExperience(entry) => add_entry(&mut next.experiences, entry),
        Edit::UpdateExperience { id, patch } => update_entry(&mut next.experiences, &id, &patch),
        Edit::DeleteExperience(id) => delete_entry(&mut next.experiences, &id),

        Edit::AddEducation(entry) => add_entry(&mut next.education, entry),
        Edit::UpdateEducation { id, patch } => update_entry(&mut next.education, &id, &patch),
        Edit::DeleteEducation(id) => delete_entry(&mut next.education, &id),

        Edit::AddSkill(entry) => add_entry(&mut next.skills, entry),
        Edit::UpdateSkill { id, patch } => update_entry(&mut next.skills, &id, &patch),
        Edit::DeleteSkill(id) => delete_entry(&mut next.skills, &id),

        Edit::AddProject(entry) => add_entry(&mut next.projects, entry),
        Edit::UpdateProject { id, patch } => update_entry(&mut next.projects, &id, &patch),
        Edit::DeleteProject(id) => delete_entry(&mut next.projects, &id),

        Edit::AddCertification(entry) => add_entry(&mut next.certifications, entry),
        Edit::UpdateCertification { id, patch } => {
            update_entry(&mut next.certifications, &id, &patch)
        }
        Edit::DeleteCertification(id) => delete_entry(&mut next.certifications, &id),

        Edit::AddLanguage(entry) => add_entry(&mut next.languages, entry),
        Edit::UpdateLanguage { id, patch } => update_entry(&mut next.languages, &id, &patch),
        Edit::DeleteLanguage(id) => delete_entry(&mut next.languages, &id),

        Edit::UpdateTheme(theme) => next.theme = theme,
        Edit::UpdateSections(patch) => patch.apply_to(&mut next.sections),
    }

    if next == *doc {
        return None;
    }
    next.updated_at = now;
    Some(next)
}

fn add_entry<T: Entry>(list: &mut Vec<T>, entry: T) {
    if list.iter().any(|e| e.id() == entry.id()) {
        log::warn!("Ignoring add of duplicate id '{}'", entry.id());
        return;
    }
    list.push(entry);
}

fn update_entry<T: Entry, P: Patch<T>>(list: &mut [T], id: &str, patch: &P) {
    if let Some(entry) = list.iter_mut().find(|e| e.id() == id) {
        patch.apply_to(entry);
    }
}

fn delete_entry<T: Entry>(list: &mut Vec<T>, id: &str) {
    list.retain(|e| e.id() != id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, Proficiency, Section};
    use chrono::Duration;

    fn sample() -> Document {
        let created = Utc::now() - Duration::days(3);
        let mut doc = Document::with_identity("cv-1", created);
        doc.experiences.push(Experience::new("e1", "Engineer", "Acme"));
        doc.languages
            .push(Language::new("l1", "English", Proficiency::Native));
        doc
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let doc = sample();
        let before = doc.clone();
        let _ = apply(&doc, Edit::DeleteExperience("e1".into()));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_then_delete_restores_document() {
        let doc = sample();
        let now = Utc::now();
        let added = apply_at(
            &doc,
            Edit::AddProject(Project::new("p1", "Compiler")),
            now,
        );
        assert_eq!(added.projects.len(), 1);

        let removed = apply_at(&added, Edit::DeleteProject("p1".into()), now);
        let mut expected = doc.clone();
        expected.updated_at = removed.updated_at;
        assert_eq!(removed, expected);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let doc = sample();
        let patch = ExperiencePatch {
            position: Some("CTO".into()),
            ..Default::default()
        };
        let updated = apply(
            &doc,
            Edit::UpdateExperience {
                id: "missing".into(),
                patch,
            },
        );
        assert_eq!(updated, doc);

        let deleted = apply(&doc, Edit::DeleteLanguage("missing".into()));
        assert_eq!(deleted.languages, doc.languages);
        assert_eq!(deleted.updated_at, doc.updated_at);
    }

    #[test]
    fn test_update_refreshes_timestamp() {
        let doc = sample();
        let now = Utc::now() + Duration::seconds(5);
        let next = apply_at(
            &doc,
            Edit::UpdateLanguage {
                id: "l1".into(),
                patch: LanguagePatch {
                    proficiency: Some(Proficiency::Professional),
                    ..Default::default()
                },
            },
            now,
        );
        assert_eq!(next.languages[0].proficiency, Proficiency::Professional);
        assert_eq!(next.updated_at, now);
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let doc = sample();
        let next = apply(
            &doc,
            Edit::AddExperience(Experience::new("e1", "Other", "Elsewhere")),
        );
        assert_eq!(next.experiences.len(), 1);
        assert_eq!(next.experiences[0].company, "Acme");
    }

    #[test]
    fn test_reset_preserves_identity() {
        let mut doc = sample();
        doc.personal_info.full_name = "Ada Lovelace".into();
        doc.sections.show_projects = false;

        let now = Utc::now();
        let reset = apply_at(&doc, Edit::Reset, now);
        assert_eq!(reset.id, doc.id);
        assert_eq!(reset.created_at, doc.created_at);
        assert_eq!(reset.updated_at, now);

        let mut expected = Document::with_identity(doc.id.clone(), doc.created_at);
        expected.updated_at = now;
        assert_eq!(reset, expected);
    }

    #[test]
    fn test_sections_patch_merges() {
        let doc = sample();
        let next = apply(
            &doc,
            Edit::UpdateSections(SectionsPatch::single(Section::Experience, false)),
        );
        assert!(!next.sections.show_experience);
        assert!(next.sections.show_skills);
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let doc = sample();
        let other = Document::with_identity("cv-2", Utc::now());
        let next = apply(&doc, Edit::Load(Box::new(other.clone())));
        assert_eq!(next, other);
    }

    #[test]
    fn test_transition_reports_noop() {
        let doc = sample();
        assert!(transition(&doc, Edit::DeleteSkill("nope".into()), Utc::now()).is_none());
        assert!(transition(&doc, Edit::DeleteExperience("e1".into()), Utc::now()).is_some());
    }
}
