//! Capture adapter: rasterize the root subtree and package it.

use super::assets::{AssetBarrier, AssetSet};
use super::job::{Progress, Stage};
use super::options::{CaptureOptions, PageSize};
use super::overrides::ScopedOverride;
use super::pdf::image_to_pdf;
use crate::error::Result;
use crate::raster::{RasterRequest, Rasterizer};
use crate::render::EXPORT_CONTROLS_CLASS;
use crate::view::palette::color_utility;
use crate::view::{Declaration, Media, NodeId, Selector, StyleSheet, Surface};
use image::RgbaImage;
use std::sync::Arc;

/// Id of the temporary color override sheet.
pub const COLOR_OVERRIDE_SHEET_ID: &str = "capture-color-override";

/// Desktop column proportions forced on the responsive grid.
pub const SIDEBAR_COLUMN: &str = "35%";
pub const MAIN_COLUMN: &str = "65%";

/// Build a sheet pinning every color utility used under `root` to RGB.
///
/// Rules are scoped to `#root_id` and its descendants, so the rest of the
/// surface keeps its OKLCH declarations.
pub fn color_override_sheet(surface: &Surface, root: NodeId, root_id: &str) -> StyleSheet {
    let mut sheet = StyleSheet::new(COLOR_OVERRIDE_SHEET_ID, Media::All);
    for class in surface.tree().classes_in(root) {
        let Some(utility) = color_utility(class) else {
            continue;
        };
        sheet.push_rule(
            Selector::List(vec![
                Selector::id(root_id).and(Selector::class(class)),
                Selector::id(root_id).descendant(Selector::class(class)),
            ]),
            vec![Declaration::important(utility.property, utility.rgb)],
        );
    }
    sheet
}

/// Pin the responsive layout to desktop proportions and hide controls.
pub fn pin_layout(scope: &mut ScopedOverride<'_>, root: NodeId) {
    let select = |scope: &ScopedOverride<'_>, selector: Selector| scope.tree().select(root, &selector);

    let controls = select(
        scope,
        Selector::List(vec![Selector::class(EXPORT_CONTROLS_CLASS), Selector::tag("button")]),
    );
    scope.set_styles(&controls, &[("display", "none")]);

    let grids = select(
        scope,
        Selector::List(vec![Selector::class("grid-cols-1"), Selector::class("lg:grid-cols-3")]),
    );
    let columns = format!("{} {}", SIDEBAR_COLUMN, MAIN_COLUMN);
    scope.set_styles(
        &grids,
        &[
            ("display", "grid"),
            ("grid-template-columns", columns.as_str()),
            ("gap", "0"),
            ("width", "100%"),
        ],
    );

    let sidebar = select(scope, Selector::class("lg:col-span-1"));
    scope.set_styles(&sidebar, &[("grid-column", "1 / 2"), ("width", "100%")]);

    let main = select(scope, Selector::class("lg:col-span-2"));
    scope.set_styles(&main, &[("grid-column", "2 / 3"), ("width", "100%")]);

    log::debug!(
        "Pinned layout: {} control(s) hidden, {} grid(s), {} touched node(s)",
        controls.len(),
        grids.len(),
        scope.touched()
    );
}

/// Rasterizes the root subtree under temporary overrides.
#[derive(Clone)]
pub struct CaptureAdapter {
    barrier: Arc<AssetBarrier>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl CaptureAdapter {
    /// Create an adapter.
    pub fn new(barrier: Arc<AssetBarrier>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self { barrier, rasterizer }
    }

    /// Wait for every image under `root_id` to settle.
    pub async fn settle_assets(&self, surface: &Surface, root_id: &str) -> Result<AssetSet> {
        let root = surface.find_root(root_id)?;
        let images = surface.tree().images(root);
        Ok(self.barrier.settle(&images).await)
    }

    /// Rasterize `root_id` with colors normalized and the layout pinned.
    ///
    /// The surface is restored before this returns, whether or not the
    /// rasterizer failed.
    pub async fn rasterize(
        &self,
        surface: &mut Surface,
        root_id: &str,
        assets: &AssetSet,
        options: &CaptureOptions,
        progress: &Progress<'_>,
    ) -> Result<RgbaImage> {
        let root = surface.find_root(root_id)?;
        progress(Stage::Styling);
        let sheet = color_override_sheet(surface, root, root_id);

        let mut scope = ScopedOverride::new(surface);
        scope.inject_sheet(sheet);
        pin_layout(&mut scope, root);

        let request = RasterRequest {
            surface: &scope,
            root,
            assets,
            options,
        };
        progress(Stage::Rendering);
        let result = self.rasterizer.rasterize(request).await;
        scope.restore();
        result
    }

    /// Full capture: asset barrier, then [`rasterize`](Self::rasterize).
    pub async fn capture(
        &self,
        surface: &mut Surface,
        root_id: &str,
        options: &CaptureOptions,
        progress: &Progress<'_>,
    ) -> Result<RgbaImage> {
        surface.find_root(root_id)?;
        progress(Stage::LoadingAssets);
        let assets = self.settle_assets(surface, root_id).await?;
        self.rasterize(surface, root_id, &assets, options, progress).await
    }

    /// Capture and package into a single-page PDF of `page` size.
    pub async fn capture_pdf(
        &self,
        surface: &mut Surface,
        root_id: &str,
        options: &CaptureOptions,
        page: PageSize,
        title: &str,
        progress: &Progress<'_>,
    ) -> Result<Vec<u8>> {
        let bitmap = self.capture(surface, root_id, options, progress).await?;
        progress(Stage::Packaging);
        image_to_pdf(&bitmap, page, title)
    }
}
