//! Rendering options and configuration.

/// Element id of the résumé root node.
pub const ROOT_ID: &str = "cv-preview";

/// Options for rendering a document into a visual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// How the root is framed on screen
    pub presentation: Presentation,

    /// Embed the export buttons inside the root
    pub export_controls: bool,

    /// Element id given to the root node
    pub root_id: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the presentation mode.
    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// Enable or disable the embedded export controls.
    pub fn with_export_controls(mut self, enabled: bool) -> Self {
        self.export_controls = enabled;
        self
    }

    /// Set the root element id.
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = id.into();
        self
    }

    /// Shorthand for fullscreen presentation.
    pub fn fullscreen(self) -> Self {
        self.with_presentation(Presentation::Fullscreen)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            presentation: Presentation::Embedded,
            export_controls: false,
            root_id: ROOT_ID.to_string(),
        }
    }
}

/// On-screen framing of the résumé. Content is identical in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    /// Centered, width-capped, with a drop shadow
    #[default]
    Embedded,
    /// Edge to edge
    Fullscreen,
}

impl Presentation {
    /// Utility classes applied to the root node.
    pub fn root_classes(self) -> &'static str {
        match self {
            Presentation::Embedded => "max-w-5xl mx-auto bg-white shadow-2xl min-h-screen",
            Presentation::Fullscreen => "w-full bg-white min-h-screen",
        }
    }
}
