//! Rasterization of a visual tree subtree into a bitmap.
//!
//! The built-in [`BoxRasterizer`] resolves styles from the surface's
//! always-active sheets and inline styles, lays boxes out with `taffy` at
//! the capture window width, shapes text with `rustybuzz` and paints
//! backgrounds, borders, images and `fontdue` glyph masks.
//! Like a canvas renderer it only understands `rgb()`-family colors:
//! any other color function fails the capture with
//! [`Error::UnsupportedColor`](crate::Error::UnsupportedColor).

mod cascade;
pub mod color;
mod fonts;
mod layout;
mod paint;
mod text;

pub use cascade::{compute_styles, ComputedStyle, ROOT_FONT_SIZE};
pub use fonts::{FontBook, FontFace, FONT_DIR_ENV};
pub use layout::{parse_length, parse_px, Edges, LayoutBox, LayoutEngine, Length, TextLayout};
pub use paint::Painter;
pub use text::{Glyph, ShapedText, TextLine};

use crate::error::{Error, Result};
use crate::export::{AssetSet, CaptureOptions};
use crate::view::{NodeId, Surface};
use async_trait::async_trait;
use image::RgbaImage;
use std::sync::Arc;

/// Everything a rasterizer needs for one capture.
#[derive(Clone, Copy)]
pub struct RasterRequest<'a> {
    /// Surface holding the tree and its sheets
    pub surface: &'a Surface,
    /// Node to capture
    pub root: NodeId,
    /// Settled images
    pub assets: &'a AssetSet,
    /// Capture settings
    pub options: &'a CaptureOptions,
}

/// Turns a subtree into pixels.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterize `request.root` at `request.options.scale`.
    async fn rasterize(&self, request: RasterRequest<'_>) -> Result<RgbaImage>;
}

/// Box-model rasterizer drawing shaped text.
#[derive(Debug, Clone)]
pub struct BoxRasterizer {
    fonts: Arc<FontBook>,
}

impl Default for BoxRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxRasterizer {
    /// Create a rasterizer over the system font book.
    pub fn new() -> Self {
        Self {
            fonts: FontBook::system(),
        }
    }

    /// Use a specific font book.
    pub fn with_fonts(mut self, fonts: Arc<FontBook>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Fonts used for text.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Lay out the root and return its box.
    pub fn layout(&self, surface: &Surface, root: NodeId, window_width: u32) -> Result<Option<LayoutBox>> {
        let styles = compute_styles(surface, root);
        LayoutEngine::new(surface.tree(), &styles, &self.fonts).layout(root, window_width as f32)
    }

    /// Synchronous rasterization.
    pub fn render(&self, request: RasterRequest<'_>) -> Result<RgbaImage> {
        let RasterRequest {
            surface,
            root,
            assets,
            options,
        } = request;

        let styles = compute_styles(surface, root);
        let layout = LayoutEngine::new(surface.tree(), &styles, &self.fonts)
            .layout(root, options.window_width as f32)?
            .ok_or_else(|| Error::Capture("Element is not displayed".to_string()))?;

        let width = (layout.width * options.scale).ceil();
        let height = (layout.height * options.scale).ceil();
        if width < 1.0 || height < 1.0 {
            return Err(Error::Capture(format!(
                "Element has no area ({}x{})",
                width, height
            )));
        }
        let max = options.max_dimension as f32;
        if width > max || height > max {
            return Err(Error::Capture(format!(
                "Canvas of {}x{} exceeds the maximum of {}px per side",
                width, height, options.max_dimension
            )));
        }

        let background = color::parse_color(&options.background)?.unwrap_or(color::TRANSPARENT);
        log::debug!(
            "Rasterizing {} at {}x{} (scale {})",
            root,
            width,
            height,
            options.scale
        );

        let mut painter = Painter::new(
            width as u32,
            height as u32,
            background,
            options.scale,
            surface.tree(),
            &styles,
            assets,
        )
        .with_allow_taint(options.allow_taint)
        .with_origin(layout.x, layout.y);
        painter.paint(&layout)?;
        painter.finish()
    }
}

#[async_trait]
impl Rasterizer for BoxRasterizer {
    async fn rasterize(&self, request: RasterRequest<'_>) -> Result<RgbaImage> {
        self.render(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::AssetStatus;
    use crate::view::{Element, VisualTree};
    use image::{DynamicImage, Rgba};

    fn request<'a>(surface: &'a Surface, assets: &'a AssetSet, options: &'a CaptureOptions) -> RasterRequest<'a> {
        RasterRequest {
            surface,
            root: surface.tree().root(),
            assets,
            options,
        }
    }

    #[test]
    fn test_natural_size_times_scale() {
        let surface = Surface::new(VisualTree::from_element(
            Element::new("div")
                .style("width", "200px")
                .style("height", "100px")
                .style("background-color", "#ff0000"),
        ));
        let assets = AssetSet::new();
        let options = CaptureOptions::new().with_scale(2.0);
        let image = BoxRasterizer::new().render(request(&surface, &assets, &options)).unwrap();
        assert_eq!(image.dimensions(), (400, 200));
        assert_eq!(*image.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
    }

    fn name_card(name: &str) -> Surface {
        Surface::new(VisualTree::from_element(
            Element::new("div")
                .style("width", "300px")
                .style("background-color", "#ffffff")
                .style("color", "#000000")
                .text(name),
        ))
    }

    #[test]
    fn test_different_text_draws_different_pixels() {
        let rasterizer = BoxRasterizer::new();
        if rasterizer.fonts().is_empty() {
            return;
        }
        let assets = AssetSet::new();
        let options = CaptureOptions::new();
        let ada = name_card("Ada Lovelace");
        let other = name_card("Xyz Qwertyui");
        let a = rasterizer.render(request(&ada, &assets, &options)).unwrap();
        let b = rasterizer.render(request(&other, &assets, &options)).unwrap();
        assert_eq!(a.dimensions(), b.dimensions());
        assert_ne!(a.as_raw(), b.as_raw());

        let inked = a.pixels().filter(|p| p.0[0] < 128).count();
        assert!(inked > 20, "only {} dark pixels", inked);
    }

    #[test]
    fn test_text_without_fonts_leaves_box_blank() {
        let rasterizer = BoxRasterizer::new().with_fonts(Arc::new(FontBook::new()));
        let surface = name_card("Ada Lovelace");
        let assets = AssetSet::new();
        let options = CaptureOptions::new();
        let err = rasterizer
            .render(request(&surface, &assets, &options))
            .unwrap_err();
        // No measurable content, so the box has no height
        assert!(matches!(err, Error::Capture(_)));
    }

    #[test]
    fn test_oklch_utility_fails() {
        let surface = Surface::new(VisualTree::from_element(
            Element::new("div").class("bg-white h-12"),
        ));
        let assets = AssetSet::new();
        let options = CaptureOptions::new();
        let err = BoxRasterizer::new()
            .render(request(&surface, &assets, &options))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedColor(ref f) if f == "oklch"));
    }

    #[test]
    fn test_max_dimension() {
        let surface = Surface::new(VisualTree::from_element(
            Element::new("div").style("height", "100px"),
        ));
        let assets = AssetSet::new();
        let mut options = CaptureOptions::new().with_window_width(800);
        options.max_dimension = 500;
        let err = BoxRasterizer::new()
            .render(request(&surface, &assets, &options))
            .unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
    }

    #[test]
    fn test_tainted_image() {
        let surface = Surface::new(VisualTree::from_element(
            Element::new("div").style("width", "64px").child(
                Element::new("img")
                    .attr("src", "https://cdn.example.com/logo.png")
                    .attr("width", "48")
                    .attr("height", "48"),
            ),
        ));
        let mut assets = AssetSet::new();
        let logo = Arc::new(DynamicImage::new_rgba8(4, 4));
        assets.insert("https://cdn.example.com/logo.png", AssetStatus::Tainted(logo));

        let skipped = CaptureOptions::new();
        assert!(BoxRasterizer::new()
            .render(request(&surface, &assets, &skipped))
            .is_ok());

        let allowed = CaptureOptions::new().with_allow_taint(true);
        let err = BoxRasterizer::new()
            .render(request(&surface, &assets, &allowed))
            .unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
    }

    #[test]
    fn test_failed_image_left_blank() {
        let surface = Surface::new(VisualTree::from_element(
            Element::new("div").style("width", "64px").child(
                Element::new("img")
                    .attr("src", "/missing.png")
                    .attr("width", "48")
                    .attr("height", "48"),
            ),
        ));
        let mut assets = AssetSet::new();
        assets.insert("/missing.png", AssetStatus::Failed("404".into()));
        let options = CaptureOptions::new();
        let image = BoxRasterizer::new()
            .render(request(&surface, &assets, &options))
            .unwrap();
        assert_eq!(image.dimensions(), (64, 48));
        assert_eq!(*image.get_pixel(20, 20), Rgba([255, 255, 255, 255]));
    }
}
