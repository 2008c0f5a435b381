//! Export pipeline.
//!
//! Two adapters share one scoped-override primitive:
//!
//! - [`CaptureAdapter`]: asset barrier, color normalization, layout pinning,
//!   rasterize, restore, then optional PDF packaging.
//! - [`PrintAdapter`]: asset barrier, settle delay, print sheet, host print,
//!   restore.
//!
//! The [`Exporter`] drives both against a shared [`Surface`](crate::view::Surface),
//! publishes [`ExportJob`] progress and never lets two exports overlap.

mod assets;
mod capture;
mod job;
mod options;
mod orchestrator;
mod overrides;
mod pdf;
mod print;
mod sink;

#[cfg(feature = "http")]
pub use assets::HttpAssetLoader;
pub use assets::{
    origin_of, resolve_url, AssetBarrier, AssetLoader, AssetSet, AssetStatus, FallbackAssetLoader,
    FetchedAsset, FileAssetLoader, DEFAULT_ORIGIN,
};
pub use capture::{color_override_sheet, pin_layout, CaptureAdapter, COLOR_OVERRIDE_SHEET_ID};
pub use job::{ExportJob, JobState, Progress, Stage};
pub use options::{
    CaptureOptions, ExportFormat, ExportOptions, ExportStrategy, ExporterConfig, ImageFormat,
    PageSize, POINTS_PER_INCH,
};
pub use orchestrator::{encode_image, ExportResult, Exporter};
pub use overrides::ScopedOverride;
pub use pdf::{fit_to_page, image_to_pdf, Placement};
pub use print::{
    print_style_sheet, HtmlPrintHost, PageProfile, PrintAdapter, PrintHost, PrintJob, PRINT_SHEET_ID,
};
pub use sink::{Artifact, ArtifactSink, DirectorySink, MemorySink};
