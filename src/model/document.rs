//! Document-level types.

use super::{Certification, Education, Entry, Experience, Language, Project, Sections, Skill, Theme};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A complete résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document identity, stable across resets
    pub id: String,

    /// Name, contact details and summary
    pub personal_info: PersonalInfo,

    #[serde(default)]
    pub experiences: Vec<Experience>,

    #[serde(default)]
    pub education: Vec<Education>,

    #[serde(default)]
    pub skills: Vec<Skill>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub certifications: Vec<Certification>,

    #[serde(default)]
    pub languages: Vec<Language>,

    /// Styling consumed by the renderer
    #[serde(default)]
    pub theme: Theme,

    /// Per-section visibility
    #[serde(default)]
    pub sections: Sections,

    /// Creation time, stable across resets
    pub created_at: DateTime<Utc>,

    /// Time of the last mutation
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a default document with a fresh identity.
    pub fn new() -> Self {
        Self::with_identity(uuid::Uuid::new_v4().to_string(), Utc::now())
    }

    /// Create a default document with the given identity and creation time.
    pub fn with_identity(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            personal_info: PersonalInfo::default(),
            experiences: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            languages: Vec::new(),
            theme: Theme::default(),
            sections: Sections::default(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Parse a document from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(text)
            .map_err(|e| Error::InvalidDocument(format!("Invalid JSON format: {}", e)))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check structural invariants: non-empty identity and unique ids per list.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidDocument("document id is empty".into()));
        }
        check_unique("experiences", &self.experiences)?;
        check_unique("education", &self.education)?;
        check_unique("skills", &self.skills)?;
        check_unique("projects", &self.projects)?;
        check_unique("certifications", &self.certifications)?;
        check_unique("languages", &self.languages)?;
        Ok(())
    }

    /// Every image URL referenced by the document.
    pub fn image_urls(&self) -> Vec<&str> {
        let mut urls = Vec::new();
        if let Some(ref img) = self.personal_info.profile_image {
            urls.push(img.as_str());
        }
        urls.extend(self.experiences.iter().filter_map(|e| e.company_logo.as_deref()));
        urls
    }

    /// Total number of list entries across all sections.
    pub fn entry_count(&self) -> usize {
        self.experiences.len()
            + self.education.len()
            + self.skills.len()
            + self.projects.len()
            + self.certifications.len()
            + self.languages.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn check_unique<T: Entry>(list_name: &str, entries: &[T]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.id()) {
            return Err(Error::InvalidDocument(format!(
                "duplicate id '{}' in {}",
                entry.id(),
                list_name
            )));
        }
    }
    Ok(())
}

/// Name, contact details and professional summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    /// LinkedIn handle (path under `linkedin.com/in/`)
    #[serde(default)]
    pub linkedin: String,
    /// GitHub handle
    #[serde(default)]
    pub github: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub summary: String,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        Self {
            id: "personal".to_string(),
            full_name: "Your Name".to_string(),
            title: "Professional Title".to_string(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            linkedin: String::new(),
            github: String::new(),
            website: None,
            profile_image: None,
            summary: String::new(),
        }
    }
}

patch_struct! {
    /// Partial update for [`PersonalInfo`].
    PersonalInfoPatch for PersonalInfo {
        required {
            full_name: String,
            title: String,
            email: String,
            phone: String,
            location: String,
            linkedin: String,
            github: String,
            summary: String,
        }
        optional {
            website: String,
            profile_image: String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Experience, Skill, SkillCategory};

    #[test]
    fn test_document_new_defaults() {
        let doc = Document::new();
        assert!(!doc.id.is_empty());
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(doc.entry_count(), 0);
        assert!(doc.sections.show_experience);
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut doc = Document::new();
        doc.skills.push(Skill::new("s1", "Rust", SkillCategory::Backend));
        doc.skills.push(Skill::new("s1", "Go", SkillCategory::Backend));

        let err = doc.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate id 's1' in skills"));
    }

    #[test]
    fn test_from_json_roundtrip() {
        let mut doc = Document::with_identity("cv-1", Utc::now());
        doc.experiences.push(Experience::new("e1", "Engineer", "Acme"));
        let json = serde_json::to_string(&doc).unwrap();

        let parsed = Document::from_json(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        assert!(matches!(
            Document::from_json("{\"hello\": 1}"),
            Err(Error::InvalidDocument(_))
        ));
        assert!(matches!(
            Document::from_json("not json"),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_image_urls() {
        let mut doc = Document::new();
        doc.personal_info.profile_image = Some("/me.jpg".to_string());
        let mut exp = Experience::new("e1", "Engineer", "Acme");
        exp.company_logo = Some("/acme.png".to_string());
        doc.experiences.push(exp);

        assert_eq!(doc.image_urls(), vec!["/me.jpg", "/acme.png"]);
    }
}
