//! Export options and configuration.

use super::assets::DEFAULT_ORIGIN;
use std::fmt;
use std::time::Duration;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Physical page size of a PDF export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// ISO A4, 210 × 297 mm
    #[default]
    A4,
    /// US Letter, 8.5 × 11 in
    Letter,
    /// Fixed 11 × 14 in single page
    Oversized,
}

impl PageSize {
    /// Width and height in points.
    pub fn points(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (8.5 * POINTS_PER_INCH, 11.0 * POINTS_PER_INCH),
            PageSize::Oversized => (11.0 * POINTS_PER_INCH, 14.0 * POINTS_PER_INCH),
        }
    }

    /// CSS `@page` size value.
    pub fn css_size(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "letter",
            PageSize::Oversized => "11in 14in",
        }
    }

    /// Filename suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
            PageSize::Oversized => "11x14",
        }
    }

    /// Parse `a4`, `letter` or `oversized`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            "oversized" | "11x14" => Some(PageSize::Oversized),
            _ => None,
        }
    }
}

/// Raster output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Parse `png`, `jpeg` or `jpg`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// Target format recorded on an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PdfA4,
    PdfLetter,
    /// Fixed 11 × 14 in page
    PdfFixed,
    Png,
    Jpeg,
}

impl From<PageSize> for ExportFormat {
    fn from(page: PageSize) -> Self {
        match page {
            PageSize::A4 => ExportFormat::PdfA4,
            PageSize::Letter => ExportFormat::PdfLetter,
            PageSize::Oversized => ExportFormat::PdfFixed,
        }
    }
}

impl From<ImageFormat> for ExportFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => ExportFormat::Png,
            ImageFormat::Jpeg => ExportFormat::Jpeg,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportFormat::PdfA4 => "PDF (A4)",
            ExportFormat::PdfLetter => "PDF (Letter)",
            ExportFormat::PdfFixed => "PDF (11x14)",
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
        };
        f.write_str(label)
    }
}

/// Which adapter produces a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportStrategy {
    /// Host print pipeline under an injected print sheet
    #[default]
    Print,
    /// Rasterize and embed the bitmap in a generated PDF
    Capture,
}

/// Options for a document export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Page size
    pub page: PageSize,

    /// Capture scale used when rasterizing
    pub quality: f32,

    /// Base filename, without date or extension
    pub filename: String,

    /// Adapter used to produce the PDF
    pub strategy: ExportStrategy,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page(mut self, page: PageSize) -> Self {
        self.page = page;
        self
    }

    /// Set the render quality (capture scale), clamped to `0.25..=4.0`.
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality.clamp(0.25, 4.0);
        self
    }

    /// Set the base filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the export strategy.
    pub fn with_strategy(mut self, strategy: ExportStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            quality: 2.0,
            filename: "CV".to_string(),
            strategy: ExportStrategy::Print,
        }
    }
}

/// Options passed to the rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixels per CSS pixel
    pub scale: f32,

    /// Canvas background color
    pub background: String,

    /// Load cross-origin images in CORS mode
    pub use_cors: bool,

    /// Draw cross-origin images that taint the canvas
    pub allow_taint: bool,

    /// Layout width available to the root, in CSS pixels
    pub window_width: u32,

    /// Largest accepted canvas side, in device pixels
    pub max_dimension: u32,
}

impl CaptureOptions {
    /// Create new capture options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capture scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the canvas background.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Enable or disable CORS image loading.
    pub fn with_cors(mut self, use_cors: bool) -> Self {
        self.use_cors = use_cors;
        self
    }

    /// Allow or forbid tainting the canvas.
    pub fn with_allow_taint(mut self, allow: bool) -> Self {
        self.allow_taint = allow;
        self
    }

    /// Set the layout width.
    pub fn with_window_width(mut self, width: u32) -> Self {
        self.window_width = width;
        self
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: "#ffffff".to_string(),
            use_cors: true,
            allow_taint: false,
            window_width: 1024,
            max_dimension: 16384,
        }
    }
}

/// Configuration of an [`crate::export::Exporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    /// Pause between the asset barrier and the print call
    pub settle_delay: Duration,

    /// How long a finished job's message stays visible
    pub message_duration: Duration,

    /// Origin used to resolve root-relative image paths
    pub asset_origin: String,

    /// Rasterizer settings for capture exports
    pub capture: CaptureOptions,

    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
}

impl ExporterConfig {
    /// Create new exporter configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the message display duration.
    pub fn with_message_duration(mut self, duration: Duration) -> Self {
        self.message_duration = duration;
        self
    }

    /// Set the asset origin.
    pub fn with_asset_origin(mut self, origin: impl Into<String>) -> Self {
        self.asset_origin = origin.into();
        self
    }

    /// Set the capture options.
    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            message_duration: Duration::from_secs(5),
            asset_origin: DEFAULT_ORIGIN.to_string(),
            capture: CaptureOptions::default(),
            jpeg_quality: 92,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_points() {
        assert_eq!(PageSize::Oversized.points(), (792.0, 1008.0));
        assert_eq!(PageSize::Letter.points(), (612.0, 792.0));
        assert_eq!(PageSize::parse("LETTER"), Some(PageSize::Letter));
        assert_eq!(PageSize::parse("a5"), None);
    }

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new()
            .with_page(PageSize::Letter)
            .with_quality(10.0)
            .with_filename("Ada CV");
        assert_eq!(options.page, PageSize::Letter);
        assert_eq!(options.quality, 4.0);
        assert_eq!(options.filename, "Ada CV");
        assert_eq!(options.strategy, ExportStrategy::Print);
    }

    #[test]
    fn test_exporter_config_defaults() {
        let config = ExporterConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(200));
        assert_eq!(config.message_duration, Duration::from_secs(5));
        assert!(config.capture.use_cors);
        assert!(!config.capture.allow_taint);
    }

    #[test]
    fn test_image_format() {
        assert_eq!(ImageFormat::parse("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::from(ImageFormat::Png).to_string(), "PNG");
    }
}
