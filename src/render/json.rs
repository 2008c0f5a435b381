//! Document serialization for storage and downloads.

use crate::error::Result;
use crate::model::Document;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Layout of serialized documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Two-space indentation, used for downloads
    #[default]
    Pretty,
    /// A single line, used for the auto-save slot
    Compact,
}

impl JsonFormat {
    fn write<T: Serialize>(self, value: &T, out: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            JsonFormat::Pretty => {
                let mut ser = Serializer::with_formatter(out, PrettyFormatter::with_indent(b"  "));
                value.serialize(&mut ser)
            }
            JsonFormat::Compact => value.serialize(&mut Serializer::new(out)),
        }
    }
}

/// Serialize `doc` with camelCase keys.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let mut out = Vec::with_capacity(2048);
    format.write(doc, &mut out)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Skill, SkillCategory};

    #[test]
    fn test_download_layout() {
        let mut doc = Document::new();
        doc.personal_info.full_name = "Grace Hopper".to_string();
        let text = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(text.starts_with("{\n  \""));
        assert!(text.contains("\n    \"fullName\": \"Grace Hopper\""));
    }

    #[test]
    fn test_autosave_layout_reloads() {
        let mut doc = Document::new();
        doc.skills.push(Skill::new("s1", "COBOL", SkillCategory::Backend));
        let text = to_json(&doc, JsonFormat::Compact).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_eq!(Document::from_json(&text).unwrap(), doc);
    }
}
