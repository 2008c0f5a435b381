//! # cvbuilder
//!
//! Single-page résumé builder for Rust.
//!
//! This library keeps a résumé as an immutable document edited through a
//! pure reducer, renders it into a styled visual tree, and exports that
//! tree as a print-ready PDF, a fixed 11 × 14 in captured PDF, or a PNG or
//! JPEG image.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cvbuilder::export::{Exporter, ExporterConfig, FileAssetLoader, ImageFormat, DirectorySink};
//! use cvbuilder::{surface_for, Document, RenderOptions, ROOT_ID};
//! use std::sync::Arc;
//!
//! # async fn run() -> cvbuilder::Result<()> {
//! let doc = Document::from_json(&std::fs::read_to_string("cv.json")?)?;
//! let surface = surface_for(&doc, &RenderOptions::default());
//!
//! let config = ExporterConfig::default();
//! let loader = Arc::new(FileAssetLoader::new("./public", config.asset_origin.clone()));
//! let exporter = Exporter::new(surface, loader, Arc::new(DirectorySink::new("out")), config);
//!
//! let result = exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Reducer document model**: tagged edits, partial patches, lenient id lookups
//! - **Visual tree renderer**: two-column layout, theme colors baked into inline styles
//! - **Print export**: print-only page sheet for A4, Letter or 11 × 14 in pages
//! - **Capture export**: built-in rasterizer, OKLCH-to-RGB pinning, guaranteed restore
//! - **Persistence**: JSON under a fixed key in a file or in-memory store

pub mod error;
pub mod export;
pub mod filename;
pub mod icons;
pub mod model;
pub mod raster;
pub mod render;
pub mod storage;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use error::{Error, Result};
pub use export::{
    ExportFormat, ExportJob, ExportOptions, ExportResult, ExportStrategy, Exporter,
    ExporterConfig, ImageFormat, PageSize,
};
pub use model::{
    apply, Certification, Document, Edit, Education, Experience, Language, PersonalInfo,
    Project, Sections, Skill, Theme,
};
pub use render::{render, JsonFormat, Presentation, RenderOptions, ROOT_ID};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Store, STORAGE_KEY};
pub use view::{Surface, VisualTree};

use std::path::Path;

/// Load a document from a JSON file.
///
/// # Example
///
/// ```no_run
/// use cvbuilder::load_file;
///
/// let doc = load_file("cv.json").unwrap();
/// println!("{}", doc.personal_info.full_name);
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    Document::from_json(&text)
}

/// Render a document onto a fresh surface with the base utility sheets.
pub fn surface_for(doc: &Document, options: &RenderOptions) -> Surface {
    Surface::new(render(doc, options))
}

/// Render a document as a standalone HTML page.
///
/// # Example
///
/// ```
/// use cvbuilder::{to_html, Document, RenderOptions};
///
/// let html = to_html(&Document::new(), &RenderOptions::default()).unwrap();
/// assert!(html.contains("id=\"cv-preview\""));
/// ```
pub fn to_html(doc: &Document, options: &RenderOptions) -> Result<String> {
    let surface = surface_for(doc, options);
    let title = format!("{} - CV", doc.personal_info.full_name);
    render::surface_to_html(&surface, &options.root_id, title.trim_start_matches(" - "))
}

/// Serialize a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    render::to_json(doc, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_for_has_root() {
        let surface = surface_for(&Document::new(), &RenderOptions::default());
        assert!(surface.find_root(ROOT_ID).is_ok());
        assert!(surface.has_sheet(view::palette::BASE_SHEET_ID));
    }

    #[test]
    fn test_to_html_contains_sheets() {
        let html = to_html(&Document::new(), &RenderOptions::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style data-sheet=\"utilities\">"));
    }

    #[test]
    fn test_load_file_missing() {
        let result = load_file("/nonexistent/cv.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_json_round_trip_through_helpers() {
        let doc = Document::new();
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }
}
