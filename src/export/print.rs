//! Print adapter: hand the root subtree to the host print pipeline.

use super::assets::AssetBarrier;
use super::job::{Progress, Stage};
use super::options::PageSize;
use super::overrides::ScopedOverride;
use super::sink::{Artifact, ArtifactSink};
use crate::error::{Error, Result};
use crate::render::{surface_to_html, EXPORT_CONTROLS_CLASS};
use crate::view::{Declaration, Media, Selector, StyleSheet, Surface};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Id of the injected print sheet.
pub const PRINT_SHEET_ID: &str = "print-page-style";

const MARGIN_BOXES: &[&str] = &[
    "top-left-corner",
    "top-left",
    "top-center",
    "top-right",
    "top-right-corner",
    "bottom-left-corner",
    "bottom-left",
    "bottom-center",
    "bottom-right",
    "bottom-right-corner",
];

/// Numeric constants of one print profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PageProfile {
    /// Physical page size
    pub page: PageSize,
    /// `@page` margin
    pub margin: String,
    /// Sidebar and main column widths
    pub columns: (String, String),
    /// Uniform downscale of the root, if any
    pub root_scale: Option<f32>,
    /// Shrink typography and spacing to favor a single page
    pub compact: bool,
}

impl PageProfile {
    /// Oversized 11 × 14 in page with aggressive compaction.
    pub fn oversized() -> Self {
        Self {
            page: PageSize::Oversized,
            margin: "0.1in".to_string(),
            columns: ("35%".to_string(), "65%".to_string()),
            root_scale: Some(0.95),
            compact: true,
        }
    }

    /// A standard page with generous margins and unscaled typography.
    pub fn standard(page: PageSize) -> Self {
        Self {
            page,
            margin: "0.5in".to_string(),
            columns: ("35%".to_string(), "65%".to_string()),
            root_scale: None,
            compact: false,
        }
    }

    /// The profile used for `page`.
    pub fn for_page(page: PageSize) -> Self {
        match page {
            PageSize::Oversized => Self::oversized(),
            other => Self::standard(other),
        }
    }

    /// Set the margin.
    pub fn with_margin(mut self, margin: impl Into<String>) -> Self {
        self.margin = margin.into();
        self
    }

    /// Set the root downscale.
    pub fn with_root_scale(mut self, scale: Option<f32>) -> Self {
        self.root_scale = scale;
        self
    }

    /// Enable or disable compaction.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

impl Default for PageProfile {
    fn default() -> Self {
        Self::oversized()
    }
}

fn imp(property: &str, value: &str) -> Declaration {
    Declaration::important(property, value)
}

/// Build the print-only sheet for `profile`, scoped to `#root_id`.
pub fn print_style_sheet(profile: &PageProfile, root_id: &str) -> StyleSheet {
    let blank_boxes: String = MARGIN_BOXES
        .iter()
        .map(|b| format!(" @{} {{ content: \"\"; }}", b))
        .collect();
    let page_rule = format!(
        "@page {{ size: {}; margin: {};{} }}",
        profile.page.css_size(),
        profile.margin,
        blank_boxes
    );

    let root = || Selector::id(root_id);
    let columns = format!("{} {}", profile.columns.0, profile.columns.1);
    let exact = || {
        vec![
            imp("-webkit-print-color-adjust", "exact"),
            imp("print-color-adjust", "exact"),
            imp("color-adjust", "exact"),
        ]
    };

    let mut sheet = StyleSheet::new(PRINT_SHEET_ID, Media::Print)
        .at_rule(page_rule)
        .rule(
            Selector::Raw("html::before, html::after, body::before, body::after".to_string()),
            vec![imp("display", "none"), imp("content", "none")],
        )
        .rule(
            Selector::tag("html"),
            vec![imp("margin", "0"), imp("padding", "0")],
        )
        .rule(
            Selector::tag("body"),
            vec![
                Declaration::new("margin", "0"),
                Declaration::new("padding", "0"),
                imp("background", "white"),
            ],
        )
        .rule(
            Selector::List(vec![
                Selector::class(EXPORT_CONTROLS_CLASS),
                Selector::Raw("[class*=\"export\"]".to_string()),
                Selector::tag("button"),
            ]),
            vec![imp("display", "none")],
        )
        .rule(
            root(),
            vec![
                imp("max-width", "none"),
                imp("margin", "0"),
                imp("width", "100%"),
                imp("box-shadow", "none"),
                imp("min-height", "auto"),
            ],
        )
        .rule(
            Selector::List(vec![Selector::class("grid-cols-1"), Selector::class("lg:grid-cols-3")]),
            vec![
                imp("grid-template-columns", &columns),
                imp("display", "grid"),
                imp("gap", "0"),
                imp("width", "100%"),
            ],
        )
        .rule(
            Selector::class("lg:col-span-1"),
            vec![imp("grid-column", "1 / 2"), imp("width", "100%"), imp("max-width", "none")],
        )
        .rule(
            Selector::class("lg:col-span-2"),
            vec![
                imp("grid-column", "2 / 3"),
                imp("width", "100%"),
                imp("max-width", "none"),
                imp("padding-right", "0"),
            ],
        )
        .rule(
            Selector::tag("img"),
            vec![
                imp("display", "block"),
                imp("max-width", "100%"),
                imp("height", "auto"),
                Declaration::new("break-inside", "avoid"),
            ],
        )
        .rule(Selector::Universal, exact())
        .rule(Selector::class("grid"), vec![imp("display", "grid")])
        .rule(Selector::class("flex"), vec![imp("display", "flex")])
        .rule(
            Selector::Universal,
            vec![imp("page-break-inside", "avoid"), imp("break-inside", "avoid")],
        );

    if profile.compact {
        add_compaction(&mut sheet);
    }

    if let Some(scale) = profile.root_scale {
        sheet.push_rule(
            root(),
            vec![
                Declaration::new("transform-origin", "top left"),
                Declaration::new("transform", format!("scale({})", scale)),
                imp("width", &format!("{:.2}%", 100.0 / scale)),
            ],
        );
    }
    sheet
}

fn add_compaction(sheet: &mut StyleSheet) {
    const FONT_SIZES: &[(&str, &str)] = &[
        ("text-3xl", "1.6rem"),
        ("text-2xl", "1.3rem"),
        ("text-xl", "1.1rem"),
        ("text-lg", "1rem"),
        ("text-base", "0.9rem"),
        ("text-sm", "0.8rem"),
        ("text-xs", "0.7rem"),
    ];
    const SPACING: &[(&str, &str, &str)] = &[
        ("p-8", "padding", "0.6rem"),
        ("p-6", "padding", "0.5rem"),
        ("mb-8", "margin-bottom", "0.4rem"),
        ("mb-6", "margin-bottom", "0.3rem"),
        ("mb-4", "margin-bottom", "0.2rem"),
        ("mb-2", "margin-bottom", "0.15rem"),
        ("w-32", "width", "5rem"),
        ("h-32", "height", "5rem"),
        ("gap-2", "gap", "0.15rem"),
        ("gap-3", "gap", "0.2rem"),
        ("gap-4", "gap", "0.25rem"),
    ];
    const STACKS: &[(&str, &str)] = &[("3", "0.2rem"), ("2", "0.15rem"), ("4", "0.25rem")];

    for (class, size) in FONT_SIZES {
        sheet.push_rule(Selector::class(class), vec![imp("font-size", size)]);
    }
    for (class, property, value) in SPACING {
        sheet.push_rule(Selector::class(class), vec![imp(property, value)]);
    }
    sheet.push_rule(
        Selector::class("lg:col-span-2").descendant(Selector::class("p-8")),
        vec![imp("padding", "0.4rem 0.3rem 0.4rem 0.4rem")],
    );
    sheet.push_rule(
        Selector::class("lg:col-span-1").descendant(Selector::class("p-8")),
        vec![imp("padding", "0.4rem")],
    );
    for (n, gap) in STACKS {
        sheet.push_rule(
            Selector::Raw(format!(".space-y-{} > * + *", n)),
            vec![imp("margin-top", gap)],
        );
    }
    sheet.push_rule(
        Selector::List(
            ["max-w-full", "max-w-7xl", "max-w-6xl", "max-w-5xl"]
                .iter()
                .map(|c| Selector::class(c))
                .collect(),
        ),
        vec![imp("max-width", "none"), imp("width", "100%"), imp("margin", "0")],
    );
    sheet.push_rule(
        Selector::List(vec![
            Selector::class("mx-auto"),
            Selector::class("ml-auto"),
            Selector::class("mr-auto"),
        ]),
        vec![imp("margin-left", "0"), imp("margin-right", "0")],
    );
    sheet.push_rule(Selector::tag("section"), vec![imp("margin-bottom", "0.3rem")]);
    sheet.push_rule(
        Selector::class("bg-gray-50"),
        vec![imp("margin-bottom", "0.2rem"), imp("padding", "0.4rem")],
    );
    sheet.push_rule(
        Selector::tag("li"),
        vec![imp("margin-bottom", "0.1rem"), imp("line-height", "1.2")],
    );
    sheet.push_rule(
        Selector::Raw(".flex-wrap > *".to_string()),
        vec![imp("margin-bottom", "0.1rem")],
    );
    sheet.push_rule(
        Selector::class("border-b-2"),
        vec![imp("margin-bottom", "0.2rem"), imp("padding-bottom", "0.15rem")],
    );
    sheet.push_rule(
        Selector::List(vec![Selector::class("bg-blue-700"), Selector::class("text-xs")]),
        vec![imp("padding", "0.1rem 0.3rem"), imp("font-size", "0.6rem")],
    );
}

/// What a print host receives.
#[derive(Clone, Copy)]
pub struct PrintJob<'a> {
    /// Surface with the print sheet installed
    pub surface: &'a Surface,
    /// Element id of the subtree to print
    pub root_id: &'a str,
    /// Document title, used as the suggested file name
    pub title: &'a str,
}

/// The host's native print pipeline.
#[async_trait]
pub trait PrintHost: Send + Sync {
    /// Print the job. Success means the print was handed off.
    async fn print(&self, job: PrintJob<'_>) -> Result<()>;
}

/// Writes a self-contained HTML document ready for print-to-PDF.
#[derive(Clone)]
pub struct HtmlPrintHost {
    sink: Arc<dyn ArtifactSink>,
}

impl HtmlPrintHost {
    /// Create a host delivering documents to `sink`.
    pub fn new(sink: Arc<dyn ArtifactSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl PrintHost for HtmlPrintHost {
    async fn print(&self, job: PrintJob<'_>) -> Result<()> {
        let html = surface_to_html(job.surface, job.root_id, job.title)?;
        let stem = job.title.strip_suffix(".pdf").unwrap_or(job.title);
        let location = self
            .sink
            .deliver(Artifact::new(
                format!("{}.html", stem),
                "text/html",
                html.into_bytes(),
            ))
            .await?;
        log::info!("Print document ready at {}", location);
        Ok(())
    }
}

/// Runs the barrier, settle delay and print sheet around a host print.
#[derive(Clone)]
pub struct PrintAdapter {
    barrier: Arc<AssetBarrier>,
    host: Arc<dyn PrintHost>,
    settle_delay: Duration,
}

impl PrintAdapter {
    /// Create an adapter.
    pub fn new(barrier: Arc<AssetBarrier>, host: Arc<dyn PrintHost>, settle_delay: Duration) -> Self {
        Self {
            barrier,
            host,
            settle_delay,
        }
    }

    /// Print `root_id` under `profile`'s sheet, then remove the sheet.
    pub async fn print(
        &self,
        surface: &mut Surface,
        root_id: &str,
        profile: &PageProfile,
        title: &str,
        progress: &Progress<'_>,
    ) -> Result<()> {
        let root = surface.find_root(root_id)?;
        progress(Stage::LoadingAssets);
        let images = surface.tree().images(root);
        self.barrier.settle(&images).await;
        tokio::time::sleep(self.settle_delay).await;

        progress(Stage::Styling);
        let mut scope = ScopedOverride::new(surface);
        scope.inject_sheet(print_style_sheet(profile, root_id));
        log::debug!("Printing #{} on {} page", root_id, profile.page.suffix());
        progress(Stage::Saving);
        let result = self
            .host
            .print(PrintJob {
                surface: &scope,
                root_id,
                title,
            })
            .await;
        scope.restore();
        result.map_err(|e| match e {
            Error::Print(_) => e,
            other => Error::Print(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_sheet() {
        let css = print_style_sheet(&PageProfile::oversized(), "cv-preview").to_css();
        assert!(css.starts_with("@page { size: 11in 14in; margin: 0.1in; @top-left-corner { content: \"\"; }"));
        assert!(css.contains("@bottom-right-corner { content: \"\"; } }\n@media print {\n"));
        assert!(css.contains(".lg\\:grid-cols-3 { grid-template-columns: 35% 65% !important;"));
        assert!(css.contains(".text-sm { font-size: 0.8rem !important; }"));
        assert!(css.contains("#cv-preview { transform-origin: top left; transform: scale(0.95); width: 105.26% !important; }"));
        assert!(css.contains("* { page-break-inside: avoid !important; break-inside: avoid !important; }"));
    }

    #[test]
    fn test_standard_sheet_is_not_compacted() {
        let profile = PageProfile::for_page(PageSize::Letter);
        let css = print_style_sheet(&profile, "cv-preview").to_css();
        assert!(css.starts_with("@page { size: letter; margin: 0.5in;"));
        assert!(!css.contains(".text-sm {"));
        assert!(!css.contains("scale("));
        assert!(css.contains(".export-controls, [class*=\"export\"], button { display: none !important; }"));
    }

    #[test]
    fn test_default_profile_is_oversized() {
        assert_eq!(PageProfile::default().page, PageSize::Oversized);
        assert_eq!(PageProfile::for_page(PageSize::A4).page, PageSize::A4);
    }
}
