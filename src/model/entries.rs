//! List entries of a résumé: experience, education, skills and so on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A list element with an identity unique within its list.
pub trait Entry: Clone {
    /// Identity of the entry.
    fn id(&self) -> &str;
}

macro_rules! impl_entry {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Entry for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

/// A position held at a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub position: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub is_current_job: bool,
    #[serde(default)]
    pub description: String,
    /// Achievement lines; may contain inline markup.
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

impl Experience {
    /// Create an experience entry with empty details.
    pub fn new(
        id: impl Into<String>,
        position: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            position: position.into(),
            company: company.into(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            is_current_job: false,
            description: String::new(),
            achievements: Vec::new(),
            technologies: Vec::new(),
            company_logo: None,
        }
    }

    /// End date as displayed: "Present" for a current job.
    pub fn display_end_date(&self) -> &str {
        if self.is_current_job {
            "Present"
        } else {
            &self.end_date
        }
    }
}

/// A degree or course of study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coursework: Option<Vec<String>>,
}

impl Education {
    /// Create an education entry with empty details.
    pub fn new(
        id: impl Into<String>,
        degree: impl Into<String>,
        institution: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            degree: degree.into(),
            institution: institution.into(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            gpa: None,
            description: None,
            coursework: None,
        }
    }
}

/// Self-assessed skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

/// Grouping used when skills are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Language,
    Frontend,
    Backend,
    Cloud,
    Devops,
    Database,
    Testing,
    #[default]
    Tool,
    Soft,
}

impl SkillCategory {
    /// Heading shown above the category's skills.
    pub fn label(self) -> &'static str {
        match self {
            SkillCategory::Language => "Programming Languages",
            SkillCategory::Frontend => "Frontend",
            SkillCategory::Backend => "Backend",
            SkillCategory::Cloud | SkillCategory::Devops => "Cloud & DevOps",
            SkillCategory::Database => "Databases",
            SkillCategory::Testing => "Testing",
            SkillCategory::Tool => "Tools",
            SkillCategory::Soft => "Soft Skills",
        }
    }
}

/// A single skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Skill {
    /// Create a skill.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: SkillCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: SkillLevel::default(),
            category,
            icon: None,
        }
    }
}

/// A personal or professional project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl Project {
    /// Create a project with empty details.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            technologies: Vec::new(),
            start_date: String::new(),
            end_date: None,
            url: None,
            github: None,
            image: None,
            highlights: Vec::new(),
        }
    }
}

/// A certification or license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

impl Certification {
    /// Create a certification.
    pub fn new(id: impl Into<String>, name: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            issuer: issuer.into(),
            date: String::new(),
            expiration_date: None,
            url: None,
            credential_id: None,
        }
    }
}

/// Spoken-language proficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Basic,
    #[default]
    Conversational,
    Professional,
    Native,
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Proficiency::Basic => "Basic",
            Proficiency::Conversational => "Conversational",
            Proficiency::Professional => "Professional",
            Proficiency::Native => "Native",
        };
        f.write_str(label)
    }
}

/// A spoken language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub proficiency: Proficiency,
}

impl Language {
    /// Create a language entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>, proficiency: Proficiency) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            proficiency,
        }
    }
}

impl_entry!(Experience, Education, Skill, Project, Certification, Language);

patch_struct! {
    /// Partial update for an [`Experience`].
    ExperiencePatch for Experience {
        required {
            position: String,
            company: String,
            location: String,
            start_date: String,
            end_date: String,
            is_current_job: bool,
            description: String,
            achievements: Vec<String>,
            technologies: Vec<String>,
        }
        optional { company_logo: String }
    }
}

patch_struct! {
    /// Partial update for an [`Education`].
    EducationPatch for Education {
        required {
            degree: String,
            institution: String,
            location: String,
            start_date: String,
            end_date: String,
        }
        optional {
            gpa: String,
            description: String,
            coursework: Vec<String>,
        }
    }
}

patch_struct! {
    /// Partial update for a [`Skill`].
    SkillPatch for Skill {
        required {
            name: String,
            level: SkillLevel,
            category: SkillCategory,
        }
        optional { icon: String }
    }
}

patch_struct! {
    /// Partial update for a [`Project`].
    ProjectPatch for Project {
        required {
            name: String,
            description: String,
            technologies: Vec<String>,
            start_date: String,
            highlights: Vec<String>,
        }
        optional {
            end_date: String,
            url: String,
            github: String,
            image: String,
        }
    }
}

patch_struct! {
    /// Partial update for a [`Certification`].
    CertificationPatch for Certification {
        required {
            name: String,
            issuer: String,
            date: String,
        }
        optional {
            expiration_date: String,
            url: String,
            credential_id: String,
        }
    }
}

patch_struct! {
    /// Partial update for a [`Language`].
    LanguagePatch for Language {
        required {
            name: String,
            proficiency: Proficiency,
        }
        optional {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patch;

    #[test]
    fn test_experience_display_end_date() {
        let mut exp = Experience::new("e1", "Engineer", "Acme");
        exp.end_date = "2023".to_string();
        assert_eq!(exp.display_end_date(), "2023");

        exp.is_current_job = true;
        assert_eq!(exp.display_end_date(), "Present");
    }

    #[test]
    fn test_patch_overwrites_present_fields_only() {
        let mut exp = Experience::new("e1", "Engineer", "Acme");
        exp.location = "Lisbon".to_string();

        let patch = ExperiencePatch {
            position: Some("Senior Engineer".to_string()),
            company_logo: Some("/logos/acme.png".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut exp);

        assert_eq!(exp.position, "Senior Engineer");
        assert_eq!(exp.company, "Acme");
        assert_eq!(exp.location, "Lisbon");
        assert_eq!(exp.company_logo.as_deref(), Some("/logos/acme.png"));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(LanguagePatch::default().is_empty());
        let patch = LanguagePatch {
            proficiency: Some(Proficiency::Native),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_skill_serde_lowercase_enums() {
        let json = r#"{"id":"s1","name":"Rust","level":"expert","category":"backend"}"#;
        let skill: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(skill.level, SkillLevel::Expert);
        assert_eq!(skill.category, SkillCategory::Backend);
        assert_eq!(skill.category.label(), "Backend");
    }

    #[test]
    fn test_experience_camel_case_fields() {
        let mut exp = Experience::new("e1", "Engineer", "Acme");
        exp.is_current_job = true;
        let json = serde_json::to_string(&exp).unwrap();
        assert!(json.contains("\"isCurrentJob\":true"));
        assert!(json.contains("\"startDate\""));
        assert!(!json.contains("companyLogo"));
    }

    #[test]
    fn test_proficiency_display() {
        assert_eq!(Proficiency::Professional.to_string(), "Professional");
    }
}
