//! Theme and section-visibility settings.

use serde::{Deserialize, Serialize};

/// Color palette of a theme. Values are CSS color strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub muted: String,
}

/// Layout variant tag carried by a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    #[default]
    Sidebar,
    Modern,
    Classic,
    Minimal,
}

/// A named color palette plus a layout variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub colors: Palette,
    #[serde(default)]
    pub layout: LayoutVariant,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            id: "professional-blue".to_string(),
            name: "Professional Blue".to_string(),
            colors: Palette {
                primary: "#1e40af".to_string(),
                secondary: "#3b82f6".to_string(),
                accent: "#60a5fa".to_string(),
                background: "#ffffff".to_string(),
                text: "#1f2937".to_string(),
                muted: "#6b7280".to_string(),
            },
            layout: LayoutVariant::Sidebar,
        }
    }
}

/// A document section that can be shown or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    PersonalInfo,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
}

impl Section {
    /// All sections in display order.
    pub const ALL: [Section; 7] = [
        Section::PersonalInfo,
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Certifications,
        Section::Languages,
    ];
}

/// Visibility flags for every document section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sections {
    pub show_personal_info: bool,
    pub show_experience: bool,
    pub show_education: bool,
    pub show_skills: bool,
    pub show_projects: bool,
    pub show_certifications: bool,
    pub show_languages: bool,
}

impl Sections {
    /// Whether a section is rendered.
    pub fn is_visible(&self, section: Section) -> bool {
        match section {
            Section::PersonalInfo => self.show_personal_info,
            Section::Experience => self.show_experience,
            Section::Education => self.show_education,
            Section::Skills => self.show_skills,
            Section::Projects => self.show_projects,
            Section::Certifications => self.show_certifications,
            Section::Languages => self.show_languages,
        }
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            show_personal_info: true,
            show_experience: true,
            show_education: true,
            show_skills: true,
            show_projects: true,
            show_certifications: true,
            show_languages: true,
        }
    }
}

patch_struct! {
    /// Partial update for [`Sections`].
    SectionsPatch for Sections {
        required {
            show_personal_info: bool,
            show_experience: bool,
            show_education: bool,
            show_skills: bool,
            show_projects: bool,
            show_certifications: bool,
            show_languages: bool,
        }
        optional {}
    }
}

impl SectionsPatch {
    /// A patch setting the visibility of a single section.
    pub fn single(section: Section, visible: bool) -> Self {
        let mut patch = Self::default();
        let flag = Some(visible);
        match section {
            Section::PersonalInfo => patch.show_personal_info = flag,
            Section::Experience => patch.show_experience = flag,
            Section::Education => patch.show_education = flag,
            Section::Skills => patch.show_skills = flag,
            Section::Projects => patch.show_projects = flag,
            Section::Certifications => patch.show_certifications = flag,
            Section::Languages => patch.show_languages = flag,
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patch;

    #[test]
    fn test_sections_default_all_visible() {
        let sections = Sections::default();
        assert!(Section::ALL.iter().all(|s| sections.is_visible(*s)));
    }

    #[test]
    fn test_sections_patch_single() {
        let mut sections = Sections::default();
        SectionsPatch::single(Section::Projects, false).apply_to(&mut sections);
        assert!(!sections.is_visible(Section::Projects));
        assert!(sections.is_visible(Section::Experience));
    }

    #[test]
    fn test_theme_serde_roundtrip_layout() {
        let json = serde_json::to_string(&Theme::default()).unwrap();
        assert!(json.contains("\"layout\":\"sidebar\""));
    }
}
