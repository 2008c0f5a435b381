//! Painting laid-out boxes onto an RGBA canvas.

use super::cascade::ComputedStyle;
use super::color::{parse_color, parse_gradient, LinearGradient};
use super::layout::{parse_px, LayoutBox, TextLayout};
use crate::error::{Error, Result};
use crate::export::{AssetSet, AssetStatus};
use crate::render::ICON_ATTR;
use crate::view::VisualTree;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;

/// Face identity, glyph id and pixel size bits.
type GlyphKey = (usize, u16, u32);

/// A rasterized glyph coverage mask.
struct GlyphMask {
    metrics: fontdue::Metrics,
    coverage: Vec<u8>,
}

/// Paints boxes at a fixed device scale.
pub struct Painter<'a> {
    canvas: RgbaImage,
    scale: f32,
    tree: &'a VisualTree,
    styles: &'a [Option<ComputedStyle>],
    assets: &'a AssetSet,
    allow_taint: bool,
    tainted: bool,
    origin: (f32, f32),
    glyphs: HashMap<GlyphKey, Arc<GlyphMask>>,
}

impl<'a> Painter<'a> {
    /// Create a painter over a canvas filled with `background`.
    pub fn new(
        width: u32,
        height: u32,
        background: Rgba<u8>,
        scale: f32,
        tree: &'a VisualTree,
        styles: &'a [Option<ComputedStyle>],
        assets: &'a AssetSet,
    ) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, background),
            scale,
            tree,
            styles,
            assets,
            allow_taint: false,
            tainted: false,
            origin: (0.0, 0.0),
            glyphs: HashMap::new(),
        }
    }

    /// Draw cross-origin images, tainting the canvas.
    pub fn with_allow_taint(mut self, allow: bool) -> Self {
        self.allow_taint = allow;
        self
    }

    /// Offset subtracted from every box, in CSS pixels.
    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = (x, y);
        self
    }

    /// Paint a box and its descendants.
    pub fn paint(&mut self, layout: &LayoutBox) -> Result<()> {
        let styles = self.styles;
        let Some(style) = styles.get(layout.node.index()).and_then(Option::as_ref) else {
            return Ok(());
        };

        if style.is_visible() {
            self.paint_background(layout, style)?;
            self.paint_borders(layout, style)?;
            self.paint_content(layout, style)?;
        }
        for child in &layout.children {
            self.paint(child)?;
        }
        Ok(())
    }

    /// Finish painting.
    ///
    /// A canvas that drew a cross-origin image cannot be read back.
    pub fn finish(self) -> Result<RgbaImage> {
        if self.tainted {
            return Err(Error::Capture(
                "Tainted canvases may not be exported".to_string(),
            ));
        }
        Ok(self.canvas)
    }

    fn color_of(style: &ComputedStyle, property: &str) -> Result<Option<Rgba<u8>>> {
        match style.value(property) {
            Some(v) if property != "color" && v.trim().eq_ignore_ascii_case("currentcolor") => {
                Self::color_of(style, "color")
            }
            Some(v) => parse_color(&v),
            None => Ok(None),
        }
    }

    fn paint_background(&mut self, layout: &LayoutBox, style: &ComputedStyle) -> Result<()> {
        if let Some(image) = style.value("background-image") {
            if let Some(gradient) = parse_gradient(&image)? {
                self.fill_gradient(layout.x, layout.y, layout.width, layout.height, &gradient);
                return Ok(());
            }
        }
        if let Some(color) = Self::color_of(style, "background-color")? {
            self.fill_rect(layout.x, layout.y, layout.width, layout.height, color);
        }
        Ok(())
    }

    fn paint_borders(&mut self, layout: &LayoutBox, style: &ComputedStyle) -> Result<()> {
        let b = layout.border;
        if b.top + b.right + b.bottom + b.left <= 0.0 {
            return Ok(());
        }
        let side_color = |side: &str| -> Result<Option<Rgba<u8>>> {
            match Self::color_of(style, &format!("border-{}-color", side))? {
                Some(c) => Ok(Some(c)),
                None => Self::color_of(style, "color"),
            }
        };
        let (x, y, w, h) = (layout.x, layout.y, layout.width, layout.height);
        if let (true, Some(c)) = (b.top > 0.0, side_color("top")?) {
            self.fill_rect(x, y, w, b.top, c);
        }
        if let (true, Some(c)) = (b.bottom > 0.0, side_color("bottom")?) {
            self.fill_rect(x, y + h - b.bottom, w, b.bottom, c);
        }
        if let (true, Some(c)) = (b.left > 0.0, side_color("left")?) {
            self.fill_rect(x, y, b.left, h, c);
        }
        if let (true, Some(c)) = (b.right > 0.0, side_color("right")?) {
            self.fill_rect(x + w - b.right, y, b.right, h, c);
        }
        Ok(())
    }

    fn paint_content(&mut self, layout: &LayoutBox, style: &ComputedStyle) -> Result<()> {
        let tree = self.tree;
        let node = tree.node(layout.node);

        if let Some(text) = &layout.text {
            if let Some(color) = Self::color_of(style, "color")? {
                self.paint_text(text, color);
            }
        }

        if node.attr(ICON_ATTR).is_some() {
            if let Some(color) = Self::color_of(style, "color")? {
                let (cx, cy, _, _) = layout.content_rect();
                let inset = style.font_size * 0.1;
                let side = style.font_size - 2.0 * inset;
                self.fill_rect(cx + inset, cy + inset, side, side, color);
            }
        }

        if node.tag == "img" {
            if let Some(src) = node.attr("src") {
                self.paint_image(layout, src, style)?;
            }
        }
        Ok(())
    }

    fn paint_text(&mut self, text: &TextLayout, color: Rgba<u8>) {
        if color.0[3] == 0 {
            return;
        }
        let px = text.font_size * self.scale;
        let face_key = Arc::as_ptr(&text.face) as usize;
        for line in &text.lines {
            let baseline = (line.baseline - self.origin.1) * self.scale;
            for glyph in &line.glyphs {
                let key = (face_key, glyph.id, px.to_bits());
                let mask = self
                    .glyphs
                    .entry(key)
                    .or_insert_with(|| {
                        let (metrics, coverage) = text.face.raster().rasterize_indexed(glyph.id, px);
                        Arc::new(GlyphMask { metrics, coverage })
                    })
                    .clone();
                let pen = (line.x + glyph.x - self.origin.0) * self.scale;
                let left = (pen + mask.metrics.xmin as f32).round() as i64;
                let top = (baseline - glyph.y_offset * self.scale
                    - mask.metrics.ymin as f32
                    - mask.metrics.height as f32)
                    .round() as i64;
                self.draw_mask(&mask, left, top, color);
            }
        }
    }

    fn draw_mask(&mut self, mask: &GlyphMask, left: i64, top: i64, color: Rgba<u8>) {
        let (cw, ch) = (self.canvas.width() as i64, self.canvas.height() as i64);
        let width = mask.metrics.width;
        for (i, &coverage) in mask.coverage.iter().enumerate() {
            if coverage == 0 {
                continue;
            }
            let x = left + (i % width) as i64;
            let y = top + (i / width) as i64;
            if x < 0 || y < 0 || x >= cw || y >= ch {
                continue;
            }
            let alpha = (color.0[3] as u16 * coverage as u16 / 255) as u8;
            let src = Rgba([color.0[0], color.0[1], color.0[2], alpha]);
            blend(self.canvas.get_pixel_mut(x as u32, y as u32), src);
        }
    }

    fn paint_image(&mut self, layout: &LayoutBox, src: &str, style: &ComputedStyle) -> Result<()> {
        let assets = self.assets;
        let image = match assets.get(src) {
            Some(AssetStatus::Loaded(image)) => image.clone(),
            Some(AssetStatus::Tainted(image)) if self.allow_taint => {
                self.tainted = true;
                image.clone()
            }
            Some(AssetStatus::Tainted(_)) => {
                log::debug!("Skipping cross-origin image {}", src);
                return Ok(());
            }
            Some(AssetStatus::Failed(_)) | None => return Ok(()),
        };

        let (x, y, w, h) = layout.content_rect();
        let (dx, dy) = self.device(x, y);
        let dw = (w * self.scale).round().max(1.0) as u32;
        let dh = (h * self.scale).round().max(1.0) as u32;

        let resized = match style.get("object-fit") {
            Some("contain") => {
                let fitted = image.resize(dw, dh, FilterType::Triangle).to_rgba8();
                let mut framed = RgbaImage::new(dw, dh);
                let ox = (dw - fitted.width().min(dw)) / 2;
                let oy = (dh - fitted.height().min(dh)) / 2;
                imageops::overlay(&mut framed, &fitted, ox as i64, oy as i64);
                framed
            }
            _ => image.resize_to_fill(dw, dh, FilterType::Triangle).to_rgba8(),
        };

        let rounded = style
            .get("border-radius")
            .and_then(|r| parse_px(r, style.font_size))
            .map(|r| r * self.scale >= (dw.min(dh) as f32) / 2.0)
            .unwrap_or(false);
        if rounded {
            let masked = circle_mask(resized);
            imageops::overlay(&mut self.canvas, &masked, dx as i64, dy as i64);
        } else {
            imageops::overlay(&mut self.canvas, &resized, dx as i64, dy as i64);
        }
        Ok(())
    }

    fn device(&self, x: f32, y: f32) -> (i32, i32) {
        (
            ((x - self.origin.0) * self.scale).round() as i32,
            ((y - self.origin.1) * self.scale).round() as i32,
        )
    }

    /// Device-space pixel bounds of a CSS rectangle, clipped to the canvas.
    fn bounds(&self, x: f32, y: f32, w: f32, h: f32) -> Option<(u32, u32, u32, u32)> {
        let (x0, y0) = self.device(x, y);
        let (x1, y1) = self.device(x + w, y + h);
        let cw = self.canvas.width() as i32;
        let ch = self.canvas.height() as i32;
        let (x0, x1) = (x0.clamp(0, cw), x1.clamp(0, cw));
        let (y0, y1) = (y0.clamp(0, ch), y1.clamp(0, ch));
        (x1 > x0 && y1 > y0).then_some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
        if color.0[3] == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(x, y, w, h) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                blend(self.canvas.get_pixel_mut(px, py), color);
            }
        }
    }

    fn fill_gradient(&mut self, x: f32, y: f32, w: f32, h: f32, gradient: &LinearGradient) {
        let Some((x0, y0, x1, y1)) = self.bounds(x, y, w, h) else {
            return;
        };
        let (dx, dy) = gradient.direction;
        let (bw, bh) = ((x1 - x0) as f32, (y1 - y0) as f32);
        // Project each pixel onto the gradient line through the box center
        let extent = (dx * bw).abs() + (dy * bh).abs();
        for py in y0..y1 {
            for px in x0..x1 {
                let rx = (px - x0) as f32 - bw / 2.0;
                let ry = (py - y0) as f32 - bh / 2.0;
                let t = if extent > 0.0 {
                    (rx * dx + ry * dy) / extent + 0.5
                } else {
                    0.0
                };
                blend(self.canvas.get_pixel_mut(px, py), gradient.at(t));
            }
        }
    }
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as f32 / 255.0;
    if sa >= 1.0 {
        *dst = src;
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let mix = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(src.0[0], dst.0[0]),
        mix(src.0[1], dst.0[1]),
        mix(src.0[2], dst.0[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

fn circle_mask(mut image: RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let r2 = cx.min(cy).powi(2);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let (px, py) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
        if px * px + py * py > r2 {
            pixel.0[3] = 0;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend() {
        let mut dst = Rgba([255, 255, 255, 255]);
        blend(&mut dst, Rgba([0, 0, 0, 128]));
        assert_eq!(dst, Rgba([127, 127, 127, 255]));

        let mut dst = Rgba([10, 20, 30, 255]);
        blend(&mut dst, Rgba([200, 100, 50, 255]));
        assert_eq!(dst, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_circle_mask() {
        let masked = circle_mask(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255])));
        assert_eq!(masked.get_pixel(0, 0).0[3], 0);
        assert_eq!(masked.get_pixel(5, 5).0[3], 255);
    }
}
