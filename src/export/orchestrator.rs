//! Export orchestrator: drives the adapters and publishes job state.

use super::assets::{AssetBarrier, AssetLoader};
use super::capture::CaptureAdapter;
use super::job::{ExportJob, Stage};
use super::options::{
    CaptureOptions, ExportFormat, ExportOptions, ExportStrategy, ExporterConfig, ImageFormat, PageSize,
};
use super::print::{HtmlPrintHost, PageProfile, PrintAdapter, PrintHost};
use super::sink::{Artifact, ArtifactSink};
use crate::error::{Error, Result};
use crate::filename::{dated_name, direct_pdf_name};
use crate::model::Document;
use crate::raster::{BoxRasterizer, Rasterizer};
use crate::render::{render, RenderOptions};
use crate::view::Surface;
use chrono::{Local, NaiveDate};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Outcome of an export call. Exports never return `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub success: bool,
    pub message: String,
    /// Name of the produced artifact, on success
    pub filename: Option<String>,
}

impl ExportResult {
    fn ok(message: impl Into<String>, filename: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            filename: Some(filename),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            filename: None,
        }
    }
}

/// Releases the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs exports against one shared surface, one at a time.
pub struct Exporter {
    surface: Arc<Mutex<Surface>>,
    barrier: Arc<AssetBarrier>,
    rasterizer: Arc<dyn Rasterizer>,
    print_host: Arc<dyn PrintHost>,
    sink: Arc<dyn ArtifactSink>,
    config: ExporterConfig,
    busy: AtomicBool,
    generation: AtomicU64,
    job: Arc<watch::Sender<ExportJob>>,
    date: Option<NaiveDate>,
}

impl Exporter {
    /// Create an exporter with the built-in rasterizer and an HTML print host
    /// delivering to `sink`.
    pub fn new(
        surface: Surface,
        loader: Arc<dyn AssetLoader>,
        sink: Arc<dyn ArtifactSink>,
        config: ExporterConfig,
    ) -> Self {
        let barrier = AssetBarrier::new(loader, config.asset_origin.clone())
            .with_cors(config.capture.use_cors);
        let (job, _) = watch::channel(ExportJob::default());
        Self {
            surface: Arc::new(Mutex::new(surface)),
            barrier: Arc::new(barrier),
            rasterizer: Arc::new(BoxRasterizer::new()),
            print_host: Arc::new(HtmlPrintHost::new(sink.clone())),
            sink,
            config,
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            job: Arc::new(job),
            date: None,
        }
    }

    /// Replace the rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Replace the print host.
    pub fn with_print_host(mut self, host: Arc<dyn PrintHost>) -> Self {
        self.print_host = host;
        self
    }

    /// Use a fixed date in filenames instead of today's.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Shared handle to the surface.
    pub fn surface(&self) -> Arc<Mutex<Surface>> {
        self.surface.clone()
    }

    /// Re-render `doc` into the surface. Waits for any running export.
    pub async fn rerender(&self, doc: &Document, options: &RenderOptions) {
        let tree = render(doc, options);
        self.surface.lock().await.replace_tree(tree);
    }

    /// Observe job state.
    pub fn subscribe(&self) -> watch::Receiver<ExportJob> {
        self.job.subscribe()
    }

    /// Current job state.
    pub fn job(&self) -> ExportJob {
        self.job.borrow().clone()
    }

    /// Whether an export is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    fn capture_adapter(&self) -> CaptureAdapter {
        CaptureAdapter::new(self.barrier.clone(), self.rasterizer.clone())
    }

    fn print_adapter(&self) -> PrintAdapter {
        PrintAdapter::new(
            self.barrier.clone(),
            self.print_host.clone(),
            self.config.settle_delay,
        )
    }

    fn begin(&self, format: ExportFormat) -> Option<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Rejected {} export: another export is running", format);
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.job.send_replace(ExportJob::start(generation, format));
        log::debug!("Export #{} started ({})", generation, format);
        Some(BusyGuard(&self.busy))
    }

    fn advance(&self, stage: Stage) {
        self.job.send_modify(|job| job.advance(stage));
    }

    fn complete(&self, kind: &str, outcome: Result<String>) -> ExportResult {
        let result = match outcome {
            Ok(filename) => {
                log::info!("{} export finished: {}", kind, filename);
                ExportResult::ok(format!("{} exported successfully", kind), filename)
            }
            Err(e) => {
                log::error!("Failed to export {}: {}", kind, e);
                let message = match &e {
                    Error::RootNotFound(_) => e.to_string(),
                    _ => format!("Failed to generate {}. Please try again.", kind),
                };
                ExportResult::failed(message)
            }
        };

        let generation = self.generation.load(Ordering::Acquire);
        self.job
            .send_modify(|job| job.finish(result.success, result.message.clone()));
        self.schedule_clear(generation);
        result
    }

    fn schedule_clear(&self, generation: u64) {
        let job = self.job.clone();
        let duration = self.config.message_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            job.send_if_modified(|job| {
                if job.generation == generation && !job.is_running() {
                    job.clear();
                    true
                } else {
                    false
                }
            });
        });
    }

    fn busy_result() -> ExportResult {
        ExportResult::failed(Error::ExportInProgress.to_string())
    }

    /// Export a PDF of `target_id` with `options`.
    ///
    /// The print strategy hands the tree to the print host under the page
    /// profile for `options.page`; the capture strategy rasterizes at
    /// `options.quality` and packages the bitmap on that page size.
    pub async fn export_document(&self, target_id: &str, options: &ExportOptions) -> ExportResult {
        let Some(_guard) = self.begin(ExportFormat::from(options.page)) else {
            return Self::busy_result();
        };
        let filename = dated_name(&options.filename, self.today(), Some(options.page.suffix()), "pdf");
        let outcome = match options.strategy {
            ExportStrategy::Print => {
                let profile = PageProfile::for_page(options.page);
                self.print_pipeline(target_id, &profile, filename).await
            }
            ExportStrategy::Capture => {
                let capture = self.config.capture.clone().with_scale(options.quality);
                self.capture_pdf_pipeline(target_id, &capture, options.page, filename)
                    .await
            }
        };
        self.complete("PDF", outcome)
    }

    /// Export the fixed 11 × 14 in PDF through the print host.
    pub async fn export_oversized(&self, target_id: &str, base: &str) -> ExportResult {
        let Some(_guard) = self.begin(ExportFormat::PdfFixed) else {
            return Self::busy_result();
        };
        let filename = dated_name(base, self.today(), Some(PageSize::Oversized.suffix()), "pdf");
        let outcome = self
            .print_pipeline(target_id, &PageProfile::oversized(), filename)
            .await;
        self.complete("PDF", outcome)
    }

    /// Capture `target_id` straight into an 11 × 14 in PDF named after
    /// `full_name`.
    pub async fn export_direct_pdf(&self, target_id: &str, full_name: &str) -> ExportResult {
        let Some(_guard) = self.begin(ExportFormat::PdfFixed) else {
            return Self::busy_result();
        };
        let filename = direct_pdf_name(full_name, self.today());
        let capture = self.config.capture.clone();
        let outcome = self
            .capture_pdf_pipeline(target_id, &capture, PageSize::Oversized, filename)
            .await;
        self.complete("PDF", outcome)
    }

    /// Capture `target_id` as a PNG or JPEG image.
    pub async fn export_image(&self, target_id: &str, format: ImageFormat, base: &str) -> ExportResult {
        let Some(_guard) = self.begin(ExportFormat::from(format)) else {
            return Self::busy_result();
        };
        let filename = dated_name(base, self.today(), None, format.extension());
        let outcome = self.image_pipeline(target_id, format, filename).await;
        let kind = match format {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        };
        self.complete(kind, outcome)
    }

    async fn print_pipeline(&self, target_id: &str, profile: &PageProfile, filename: String) -> Result<String> {
        let mut surface = self.surface.lock().await;
        self.print_adapter()
            .print(&mut surface, target_id, profile, &filename, &|stage| self.advance(stage))
            .await?;
        Ok(filename)
    }

    async fn capture_pdf_pipeline(
        &self,
        target_id: &str,
        options: &CaptureOptions,
        page: PageSize,
        filename: String,
    ) -> Result<String> {
        let bytes = {
            let mut surface = self.surface.lock().await;
            self.capture_adapter()
                .capture_pdf(&mut surface, target_id, options, page, &filename, &|stage| {
                    self.advance(stage)
                })
                .await?
        };
        self.advance(Stage::Saving);
        self.sink
            .deliver(Artifact::new(filename.clone(), "application/pdf", bytes))
            .await?;
        Ok(filename)
    }

    async fn image_pipeline(&self, target_id: &str, format: ImageFormat, filename: String) -> Result<String> {
        let options = self.config.capture.clone();
        let bitmap = {
            let mut surface = self.surface.lock().await;
            self.capture_adapter()
                .capture(&mut surface, target_id, &options, &|stage| self.advance(stage))
                .await?
        };
        self.advance(Stage::Packaging);
        let bytes = encode_image(bitmap, format, self.config.jpeg_quality)?;
        self.advance(Stage::Saving);
        self.sink
            .deliver(Artifact::new(filename.clone(), format.mime(), bytes))
            .await?;
        Ok(filename)
    }
}

/// Encode a capture as PNG or JPEG. JPEG drops the alpha channel.
pub fn encode_image(bitmap: RgbaImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Png => {
            DynamicImage::ImageRgba8(bitmap).write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        }
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(bitmap).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100)).encode_image(&rgb)?;
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_encode_png_and_jpeg() {
        let bitmap = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let png = encode_image(bitmap.clone(), ImageFormat::Png, 92).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let jpeg = encode_image(bitmap, ImageFormat::Jpeg, 92).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_busy_result_message() {
        let result = Exporter::busy_result();
        assert!(!result.success);
        assert_eq!(result.message, "An export is already in progress");
    }
}
