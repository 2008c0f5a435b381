//! Integration tests for the export pipeline.

use async_trait::async_trait;
use chrono::NaiveDate;
use cvbuilder::export::{
    AssetBarrier, AssetLoader, CaptureAdapter, CaptureOptions, ExportJob, ExportOptions,
    ExportStrategy, Exporter, ExporterConfig, FetchedAsset, ImageFormat, JobState, MemorySink,
    PageProfile, PageSize, PrintAdapter, PrintHost, PrintJob, Stage, COLOR_OVERRIDE_SHEET_ID,
    DEFAULT_ORIGIN, PRINT_SHEET_ID,
};
use cvbuilder::model::{Edit, PersonalInfoPatch};
use cvbuilder::raster::{BoxRasterizer, RasterRequest, Rasterizer};
use cvbuilder::render::surface_to_html;
use cvbuilder::{apply, surface_for, Document, Error, RenderOptions, Result, Surface, ROOT_ID};
use image::{Rgba, RgbaImage};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn sample_document() -> Document {
    apply(
        &Document::new(),
        Edit::UpdatePersonalInfo(PersonalInfoPatch {
            full_name: Some("Ada Lovelace".into()),
            title: Some("Analyst".into()),
            ..Default::default()
        }),
    )
}

fn preview_surface(doc: &Document) -> Surface {
    surface_for(doc, &RenderOptions::new().with_export_controls(true))
}

/// Loader that never finds anything.
struct NoAssets;

#[async_trait]
impl AssetLoader for NoAssets {
    async fn load(&self, url: &str) -> Result<FetchedAsset> {
        Err(Error::Asset {
            url: url.to_string(),
            reason: "not found".to_string(),
        })
    }
}

/// Loader that holds every request until the gate opens, then fails it.
struct GatedLoader {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl AssetLoader for GatedLoader {
    async fn load(&self, url: &str) -> Result<FetchedAsset> {
        let rx = self.gate.lock().unwrap().take();
        if let Some(rx) = rx {
            let _ = rx.await;
        }
        Err(Error::Asset {
            url: url.to_string(),
            reason: "gate closed".to_string(),
        })
    }
}

/// Rasterizer returning a solid bitmap after an optional delay.
struct SolidRasterizer {
    delay: Duration,
}

#[async_trait]
impl Rasterizer for SolidRasterizer {
    async fn rasterize(&self, _request: RasterRequest<'_>) -> Result<RgbaImage> {
        tokio::time::sleep(self.delay).await;
        Ok(RgbaImage::from_pixel(20, 10, Rgba([30, 64, 175, 255])))
    }
}

/// Rasterizer that remembers the text of every tree it was handed.
struct RecordingRasterizer {
    delay: Duration,
    seen: Mutex<Vec<String>>,
}

impl RecordingRasterizer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Rasterizer for RecordingRasterizer {
    async fn rasterize(&self, request: RasterRequest<'_>) -> Result<RgbaImage> {
        let text = request.surface.tree().text_content(request.root);
        tokio::time::sleep(self.delay).await;
        self.seen.lock().unwrap().push(text);
        Ok(RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255])))
    }
}

/// Rasterizer that records whether the override sheet was installed, then fails.
#[derive(Default)]
struct FailingRasterizer {
    saw_override: Mutex<bool>,
}

#[async_trait]
impl Rasterizer for FailingRasterizer {
    async fn rasterize(&self, request: RasterRequest<'_>) -> Result<RgbaImage> {
        *self.saw_override.lock().unwrap() = request.surface.has_sheet(COLOR_OVERRIDE_SHEET_ID);
        Err(Error::Capture("canvas exploded".to_string()))
    }
}

/// Print host that records what it saw.
#[derive(Default)]
struct RecordingHost {
    titles: Mutex<Vec<String>>,
    saw_sheet: Mutex<Vec<bool>>,
}

#[async_trait]
impl PrintHost for RecordingHost {
    async fn print(&self, job: PrintJob<'_>) -> Result<()> {
        self.titles.lock().unwrap().push(job.title.to_string());
        self.saw_sheet
            .lock()
            .unwrap()
            .push(job.surface.has_sheet(PRINT_SHEET_ID));
        Ok(())
    }
}

/// Print host whose printer is unavailable.
#[derive(Default)]
struct FailingHost {
    saw_sheet: Mutex<bool>,
}

#[async_trait]
impl PrintHost for FailingHost {
    async fn print(&self, job: PrintJob<'_>) -> Result<()> {
        *self.saw_sheet.lock().unwrap() = job.surface.has_sheet(PRINT_SHEET_ID);
        Err(Error::Print("printer offline".to_string()))
    }
}

fn exporter(doc: &Document, sink: Arc<MemorySink>) -> Exporter {
    Exporter::new(preview_surface(doc), Arc::new(NoAssets), sink, ExporterConfig::new())
        .with_date(date())
}

async fn snapshot(exporter: &Exporter) -> String {
    let surface = exporter.surface();
    let surface = surface.lock().await;
    let ids: Vec<_> = surface.sheets().iter().map(|s| s.id().to_string()).collect();
    format!(
        "{:?}\n{}",
        ids,
        surface_to_html(&surface, ROOT_ID, "snapshot").unwrap()
    )
}

#[tokio::test]
async fn test_png_export_with_builtin_rasterizer() {
    let sink = Arc::new(MemorySink::new());
    let exporter = exporter(&sample_document(), sink.clone());

    let result = exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await;
    assert!(result.success, "{}", result.message);
    assert_eq!(result.message, "PNG exported successfully");
    assert_eq!(result.filename.as_deref(), Some("CV-2026-10-19.png"));

    let artifacts = sink.artifacts();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].mime, "image/png");
    let decoded = image::load_from_memory(&artifacts[0].bytes).unwrap();
    assert!(decoded.width() > 0 && decoded.height() > 0);
}

#[tokio::test]
async fn test_preview_needs_color_override() {
    let surface = preview_surface(&sample_document());
    let root = surface.find_root(ROOT_ID).unwrap();
    let assets = Default::default();
    let options = Default::default();
    let err = BoxRasterizer::new()
        .rasterize(RasterRequest {
            surface: &surface,
            root,
            assets: &assets,
            options: &options,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedColor(ref f) if f == "oklch"));
}

#[tokio::test]
async fn test_broken_profile_image_still_exports() {
    let doc = apply(
        &sample_document(),
        Edit::UpdatePersonalInfo(PersonalInfoPatch {
            profile_image: Some("/missing/portrait.jpg".into()),
            ..Default::default()
        }),
    );
    let sink = Arc::new(MemorySink::new());
    let exporter = exporter(&doc, sink.clone());

    let result = exporter.export_image(ROOT_ID, ImageFormat::Jpeg, "CV").await;
    assert!(result.success, "{}", result.message);
    assert_eq!(sink.filenames(), vec!["CV-2026-10-19.jpg".to_string()]);
    assert!(sink.artifacts()[0].bytes.starts_with(&[0xFF, 0xD8]));
}

#[tokio::test]
async fn test_failed_capture_restores_surface() {
    let sink = Arc::new(MemorySink::new());
    let rasterizer = Arc::new(FailingRasterizer::default());
    let exporter = exporter(&sample_document(), sink.clone()).with_rasterizer(rasterizer.clone());
    let before = snapshot(&exporter).await;

    let result = exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await;
    assert!(!result.success);
    assert_eq!(result.message, "Failed to generate PNG. Please try again.");
    assert!(*rasterizer.saw_override.lock().unwrap());

    assert_eq!(snapshot(&exporter).await, before);
    assert!(sink.artifacts().is_empty());
    assert!(!exporter.is_busy());
    assert_eq!(exporter.job().state, JobState::Failed);
}

#[tokio::test]
async fn test_missing_root_reports_element() {
    let exporter = exporter(&sample_document(), Arc::new(MemorySink::new()));
    let result = exporter
        .export_image("does-not-exist", ImageFormat::Png, "CV")
        .await;
    assert!(!result.success);
    assert_eq!(result.message, "Element not found: #does-not-exist");
}

#[tokio::test(start_paused = true)]
async fn test_second_export_rejected_while_running() {
    let exporter = exporter(&sample_document(), Arc::new(MemorySink::new())).with_rasterizer(
        Arc::new(SolidRasterizer {
            delay: Duration::from_millis(500),
        }),
    );

    let (first, second) = tokio::join!(
        exporter.export_image(ROOT_ID, ImageFormat::Png, "CV"),
        exporter.export_direct_pdf(ROOT_ID, "Ada Lovelace"),
    );
    assert!(first.success, "{}", first.message);
    assert!(!second.success);
    assert_eq!(second.message, "An export is already in progress");

    // The guard is released once the first export completes.
    let third = exporter.export_direct_pdf(ROOT_ID, "Ada Lovelace").await;
    assert!(third.success, "{}", third.message);
    assert_eq!(third.filename.as_deref(), Some("CV_Ada_2026-10-19.pdf"));
}

#[tokio::test(start_paused = true)]
async fn test_sequential_print_exports() {
    let host = Arc::new(RecordingHost::default());
    let exporter = exporter(&sample_document(), Arc::new(MemorySink::new()))
        .with_print_host(host.clone());
    let before = snapshot(&exporter).await;

    let a4 = exporter
        .export_document(ROOT_ID, &ExportOptions::new().with_page(PageSize::A4))
        .await;
    let letter = exporter
        .export_document(
            ROOT_ID,
            &ExportOptions::new()
                .with_page(PageSize::Letter)
                .with_filename("Ada CV"),
        )
        .await;

    assert!(a4.success && letter.success);
    assert_eq!(a4.filename.as_deref(), Some("CV-2026-10-19-a4.pdf"));
    assert_eq!(letter.filename.as_deref(), Some("Ada_CV-2026-10-19-letter.pdf"));
    assert_eq!(
        *host.titles.lock().unwrap(),
        vec!["CV-2026-10-19-a4.pdf", "Ada_CV-2026-10-19-letter.pdf"]
    );
    assert_eq!(*host.saw_sheet.lock().unwrap(), vec![true, true]);
    assert_eq!(snapshot(&exporter).await, before);
}

#[tokio::test(start_paused = true)]
async fn test_print_waits_for_settle_delay() {
    let host = Arc::new(RecordingHost::default());
    let exporter = exporter(&sample_document(), Arc::new(MemorySink::new()))
        .with_print_host(host.clone());

    let start = tokio::time::Instant::now();
    let result = exporter.export_oversized(ROOT_ID, "CV").await;
    assert!(result.success);
    assert_eq!(result.filename.as_deref(), Some("CV-2026-10-19-11x14.pdf"));
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_capture_strategy_pdf() {
    let sink = Arc::new(MemorySink::new());
    let exporter = exporter(&sample_document(), sink.clone()).with_rasterizer(Arc::new(
        SolidRasterizer {
            delay: Duration::ZERO,
        },
    ));
    let options = ExportOptions::new()
        .with_page(PageSize::Letter)
        .with_strategy(ExportStrategy::Capture);

    let result = exporter.export_document(ROOT_ID, &options).await;
    assert!(result.success, "{}", result.message);
    let artifacts = sink.artifacts();
    assert_eq!(artifacts[0].filename, "CV-2026-10-19-letter.pdf");
    assert_eq!(artifacts[0].mime, "application/pdf");
    assert!(artifacts[0].bytes.starts_with(b"%PDF-1.7"));
}

#[tokio::test(start_paused = true)]
async fn test_message_clears_after_five_seconds() {
    let exporter = exporter(&sample_document(), Arc::new(MemorySink::new())).with_rasterizer(
        Arc::new(SolidRasterizer {
            delay: Duration::ZERO,
        }),
    );

    let result = exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await;
    assert!(result.success);
    let job = exporter.job();
    assert_eq!(job.state, JobState::Succeeded);
    assert_eq!(job.progress, 100);
    assert_eq!(job.message.as_deref(), Some("PNG exported successfully"));

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert!(exporter.job().message.is_some());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let job = exporter.job();
    assert_eq!(job.state, JobState::Idle);
    assert_eq!(job.message, None);
}

#[tokio::test]
async fn test_barrier_holds_export_until_images_settle() {
    let doc = apply(
        &sample_document(),
        Edit::UpdatePersonalInfo(PersonalInfoPatch {
            profile_image: Some("/portrait.png".into()),
            ..Default::default()
        }),
    );
    let (open, gate) = oneshot::channel();
    let loader = Arc::new(GatedLoader {
        gate: Mutex::new(Some(gate)),
    });
    let exporter = Arc::new(
        Exporter::new(
            preview_surface(&doc),
            loader,
            Arc::new(MemorySink::new()),
            ExporterConfig::new(),
        )
        .with_rasterizer(Arc::new(SolidRasterizer {
            delay: Duration::ZERO,
        }))
        .with_date(date()),
    );

    let mut progress = exporter.subscribe();
    let task = {
        let exporter = exporter.clone();
        tokio::spawn(async move { exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await })
    };

    progress
        .wait_for(|job: &ExportJob| job.stage == Some(Stage::LoadingAssets))
        .await
        .unwrap();
    assert!(exporter.is_busy());
    assert!(!task.is_finished());

    open.send(()).unwrap();
    let result = task.await.unwrap();
    assert!(result.success, "{}", result.message);
    assert!(!exporter.is_busy());
}

#[tokio::test]
async fn test_rerender_after_export() {
    let exporter = exporter(&sample_document(), Arc::new(MemorySink::new())).with_rasterizer(
        Arc::new(SolidRasterizer {
            delay: Duration::ZERO,
        }),
    );
    assert!(exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await.success);

    let renamed = apply(
        &sample_document(),
        Edit::UpdatePersonalInfo(PersonalInfoPatch {
            full_name: Some("Grace Hopper".into()),
            ..Default::default()
        }),
    );
    exporter
        .rerender(&renamed, &RenderOptions::new().with_export_controls(true))
        .await;
    assert!(snapshot(&exporter).await.contains("Grace Hopper"));
}

fn renamed_document() -> Document {
    apply(
        &sample_document(),
        Edit::UpdatePersonalInfo(PersonalInfoPatch {
            full_name: Some("Grace Hopper".into()),
            ..Default::default()
        }),
    )
}

#[tokio::test(start_paused = true)]
async fn test_edit_waits_for_running_capture() {
    let rasterizer = Arc::new(RecordingRasterizer::new(Duration::from_millis(500)));
    let exporter = Arc::new(
        exporter(&sample_document(), Arc::new(MemorySink::new())).with_rasterizer(rasterizer.clone()),
    );

    let mut progress = exporter.subscribe();
    let export = {
        let exporter = exporter.clone();
        tokio::spawn(async move { exporter.export_image(ROOT_ID, ImageFormat::Png, "CV").await })
    };
    progress
        .wait_for(|job: &ExportJob| job.stage >= Some(Stage::Rendering))
        .await
        .unwrap();

    let edit = {
        let exporter = exporter.clone();
        tokio::spawn(async move {
            exporter
                .rerender(&renamed_document(), &RenderOptions::new().with_export_controls(true))
                .await
        })
    };
    tokio::task::yield_now().await;
    assert!(!edit.is_finished());

    let result = export.await.unwrap();
    edit.await.unwrap();
    assert!(result.success, "{}", result.message);

    let seen = rasterizer.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("Ada Lovelace"));
    assert!(!seen[0].contains("Grace Hopper"));
    assert!(snapshot(&exporter).await.contains("Grace Hopper"));
}

#[tokio::test(start_paused = true)]
async fn test_print_host_failure_restores_surface() {
    let host = Arc::new(FailingHost::default());
    let sink = Arc::new(MemorySink::new());
    let exporter = exporter(&sample_document(), sink.clone()).with_print_host(host.clone());
    let before = snapshot(&exporter).await;

    let result = exporter.export_oversized(ROOT_ID, "CV").await;
    assert!(!result.success);
    assert_eq!(result.message, "Failed to generate PDF. Please try again.");
    assert!(*host.saw_sheet.lock().unwrap());

    assert_eq!(snapshot(&exporter).await, before);
    assert!(!exporter.surface().lock().await.has_sheet(PRINT_SHEET_ID));
    assert!(sink.artifacts().is_empty());
    assert!(!exporter.is_busy());
    assert_eq!(exporter.job().state, JobState::Failed);
}

fn stage_recorder() -> (Arc<Mutex<Vec<(Stage, Duration)>>>, impl Fn(Stage) + Send + Sync) {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let start = tokio::time::Instant::now();
    let record = {
        let stages = stages.clone();
        move |stage| stages.lock().unwrap().push((stage, start.elapsed()))
    };
    (stages, record)
}

#[tokio::test(start_paused = true)]
async fn test_print_adapter_reports_stages() {
    let mut surface = preview_surface(&sample_document());
    let barrier = Arc::new(AssetBarrier::new(Arc::new(NoAssets), DEFAULT_ORIGIN));
    let adapter = PrintAdapter::new(
        barrier,
        Arc::new(RecordingHost::default()),
        Duration::from_millis(200),
    );
    let (stages, record) = stage_recorder();

    adapter
        .print(&mut surface, ROOT_ID, &PageProfile::oversized(), "CV.pdf", &record)
        .await
        .unwrap();

    let stages = stages.lock().unwrap().clone();
    let order: Vec<Stage> = stages.iter().map(|(s, _)| *s).collect();
    assert_eq!(order, vec![Stage::LoadingAssets, Stage::Styling, Stage::Saving]);
    assert!(stages[1].1 >= Duration::from_millis(200));
    assert!(!surface.has_sheet(PRINT_SHEET_ID));
}

#[tokio::test]
async fn test_capture_adapter_reports_stages() {
    let mut surface = preview_surface(&sample_document());
    let barrier = Arc::new(AssetBarrier::new(Arc::new(NoAssets), DEFAULT_ORIGIN));
    let adapter = CaptureAdapter::new(
        barrier,
        Arc::new(SolidRasterizer {
            delay: Duration::ZERO,
        }),
    );
    let (stages, record) = stage_recorder();

    let pdf = adapter
        .capture_pdf(
            &mut surface,
            ROOT_ID,
            &CaptureOptions::new(),
            PageSize::Oversized,
            "CV.pdf",
            &record,
        )
        .await
        .unwrap();
    assert!(pdf.starts_with(b"%PDF-1.7"));

    let order: Vec<Stage> = stages.lock().unwrap().iter().map(|(s, _)| *s).collect();
    assert_eq!(
        order,
        vec![Stage::LoadingAssets, Stage::Styling, Stage::Rendering, Stage::Packaging]
    );
    assert!(!surface.has_sheet(COLOR_OVERRIDE_SHEET_ID));
}

#[tokio::test]
async fn test_capture_adapter_missing_root_reports_nothing() {
    let mut surface = preview_surface(&sample_document());
    let barrier = Arc::new(AssetBarrier::new(Arc::new(NoAssets), DEFAULT_ORIGIN));
    let adapter = CaptureAdapter::new(barrier, Arc::new(FailingRasterizer::default()));
    let (stages, record) = stage_recorder();

    let err = adapter
        .capture(&mut surface, "nowhere", &CaptureOptions::new(), &record)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RootNotFound(_)));
    assert!(stages.lock().unwrap().is_empty());
}
