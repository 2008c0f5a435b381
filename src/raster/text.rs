//! Text shaping and line breaking.

use super::fonts::FontFace;
use rustybuzz::{Feature, UnicodeBuffer};
use std::sync::{Arc, OnceLock};
use ttf_parser::Tag;
use unicode_linebreak::linebreaks;

fn features() -> &'static [Feature] {
    static FEATURES: OnceLock<Vec<Feature>> = OnceLock::new();
    FEATURES.get_or_init(|| {
        vec![
            Feature::new(Tag::from_bytes(b"liga"), 1, ..),
            Feature::new(Tag::from_bytes(b"kern"), 1, ..),
        ]
    })
}

/// A shaped glyph. `x` is relative to the start of its line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub id: u16,
    pub x: f32,
    pub y_offset: f32,
}

/// Text between two break opportunities.
#[derive(Debug, Clone)]
struct Segment {
    glyphs: Vec<Glyph>,
    /// Advance including trailing whitespace
    advance: f32,
    /// Advance without trailing whitespace
    width: f32,
}

/// One positioned line of glyphs, in CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Absolute y of the baseline
    pub baseline: f32,
    pub glyphs: Vec<Glyph>,
}

/// Line span over segment indices.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    start: usize,
    end: usize,
    width: f32,
}

/// Collapse whitespace runs the way HTML does for normal flow text.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text shaped once at a fixed size and wrappable at any width.
#[derive(Debug, Clone)]
pub struct ShapedText {
    face: Arc<FontFace>,
    font_size: f32,
    ascent: f32,
    descent: f32,
    segments: Vec<Segment>,
}

impl ShapedText {
    /// Shape `text` with `face` at `font_size` pixels.
    pub fn shape(face: Arc<FontFace>, text: &str, font_size: f32) -> Option<Self> {
        let text = collapse_whitespace(text);
        let (ascent, descent, segments) = {
            let shaping = face.shaping_face()?;
            let scale = font_size / shaping.units_per_em() as f32;
            let ascent = f32::from(shaping.ascender()) * scale;
            let descent = f32::from(shaping.descender()) * scale;

            let (_, space) = shape_run(&shaping, " ", scale);
            let mut segments = Vec::new();
            let mut start = 0;
            for (offset, _) in linebreaks(&text) {
                let piece = &text[start..offset];
                start = offset;
                if piece.is_empty() {
                    continue;
                }
                let word = piece.trim_end();
                let trailing = piece[word.len()..].chars().count() as f32;
                let (glyphs, width) = shape_run(&shaping, word, scale);
                segments.push(Segment {
                    glyphs,
                    advance: width + trailing * space,
                    width,
                });
            }
            (ascent, descent, segments)
        };
        Some(Self {
            face,
            font_size,
            ascent,
            descent,
            segments,
        })
    }

    /// Face the glyph ids belong to.
    pub fn face(&self) -> &Arc<FontFace> {
        &self.face
    }

    /// Size the text was shaped at, in CSS pixels.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Width of the widest unbreakable piece.
    pub fn min_content_width(&self) -> f32 {
        self.segments.iter().map(|s| s.width).fold(0.0, f32::max)
    }

    /// Width on a single line.
    pub fn max_content_width(&self) -> f32 {
        self.span_width(0, self.segments.len())
    }

    fn span_width(&self, start: usize, end: usize) -> f32 {
        match self.segments[start..end].split_last() {
            Some((last, rest)) => rest.iter().map(|s| s.advance).sum::<f32>() + last.width,
            None => 0.0,
        }
    }

    fn spans(&self, width: f32) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start = 0;
        let mut used = 0.0f32;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > start && used + segment.width > width + 0.01 {
                spans.push(Span {
                    start,
                    end: i,
                    width: self.span_width(start, i),
                });
                start = i;
                used = 0.0;
            }
            used += segment.advance;
        }
        if start < self.segments.len() {
            spans.push(Span {
                start,
                end: self.segments.len(),
                width: self.span_width(start, self.segments.len()),
            });
        }
        spans
    }

    /// Size of the text wrapped at `width`: widest line and line count.
    pub fn measure(&self, width: f32) -> (f32, usize) {
        let spans = self.spans(width);
        let widest = spans.iter().map(|s| s.width).fold(0.0, f32::max);
        (widest, spans.len())
    }

    /// Wrap into a box at `(x, y)` of `width`, with `align` one of
    /// `left`, `center` or `right`.
    pub fn lines(&self, x: f32, y: f32, width: f32, line_height: f32, align: &str) -> Vec<TextLine> {
        let half_leading = (line_height - (self.ascent - self.descent)) / 2.0;
        self.spans(width)
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let offset = match align {
                    "center" => (width - span.width) / 2.0,
                    "right" | "end" => width - span.width,
                    _ => 0.0,
                }
                .max(0.0);
                let mut pen = 0.0;
                let mut glyphs = Vec::new();
                for segment in &self.segments[span.start..span.end] {
                    glyphs.extend(segment.glyphs.iter().map(|g| Glyph { x: g.x + pen, ..*g }));
                    pen += segment.advance;
                }
                let top = y + i as f32 * line_height;
                TextLine {
                    x: x + offset,
                    y: top,
                    width: span.width,
                    height: line_height,
                    baseline: top + half_leading + self.ascent,
                    glyphs,
                }
            })
            .collect()
    }
}

fn shape_run(face: &rustybuzz::Face<'_>, text: &str, scale: f32) -> (Vec<Glyph>, f32) {
    if text.is_empty() {
        return (Vec::new(), 0.0);
    }
    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();
    let output = rustybuzz::shape(face, features(), buffer);

    let mut pen = 0.0;
    let mut glyphs = Vec::with_capacity(output.len());
    for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
        glyphs.push(Glyph {
            id: info.glyph_id as u16,
            x: pen + pos.x_offset as f32 * scale,
            y_offset: pos.y_offset as f32 * scale,
        });
        pen += pos.x_advance as f32 * scale;
    }
    (glyphs, pen)
}
