//! Rendering module for converting documents to visual trees and serialized forms.

mod html;
mod json;
mod options;
mod preview;

pub use html::{surface_to_html, to_html_document, to_html_fragment};
pub use json::{to_json, JsonFormat};
pub use options::{Presentation, RenderOptions, ROOT_ID};
pub use preview::{
    group_skills, render, PreviewRenderer, ENTRY_ATTR, EXPORT_CONTROLS_CLASS, ICON_ATTR,
    SECTION_ATTR,
};
