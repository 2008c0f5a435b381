//! Box layout on `taffy`, with shaped text as measured leaves.
//!
//! Every displayed view node becomes a taffy node. Text content becomes a
//! leaf child measured by the shaper, and runs of inline siblings inside a
//! block are wrapped in an anonymous wrapping flex row.

use super::cascade::{ComputedStyle, ROOT_FONT_SIZE};
use super::fonts::{FontBook, FontFace};
use super::text::{ShapedText, TextLine};
use crate::error::{Error, Result};
use crate::render::ICON_ATTR;
use crate::view::{NodeId, VisualTree};
use std::collections::HashMap;
use std::sync::Arc;
use taffy::prelude::*;
use taffy::geometry::MinMax;
use taffy::prelude::NodeId as TaffyId;
use taffy::style::{
    AlignItems, BoxSizing, Display, GridPlacement, GridTemplateComponent, MaxTrackSizingFunction,
    MinTrackSizingFunction, TrackSizingFunction,
};
use taffy::{Layout, TaffyError};

/// A CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
    Auto,
}

impl Length {
    /// Resolve against a reference size. `Auto` resolves to `None`.
    pub fn resolve(self, reference: f32) -> Option<f32> {
        match self {
            Length::Px(px) => Some(px),
            Length::Percent(pct) => Some(reference * pct / 100.0),
            Length::Auto => None,
        }
    }
}

/// Parse a length. Viewport units and expressions are not understood.
pub fn parse_length(value: &str, font_size: f32) -> Option<Length> {
    let value = value.trim();
    if value == "auto" {
        return Some(Length::Auto);
    }
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse().ok().map(Length::Percent);
    }
    parse_px(value, font_size).map(Length::Px)
}

/// Parse an absolute length into pixels.
pub fn parse_px(value: &str, font_size: f32) -> Option<f32> {
    let value = value.trim();
    if value == "0" {
        return Some(0.0);
    }
    let (number, factor) = if let Some(n) = value.strip_suffix("rem") {
        (n, ROOT_FONT_SIZE)
    } else if let Some(n) = value.strip_suffix("em") {
        (n, font_size)
    } else if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("pt") {
        (n, 96.0 / 72.0)
    } else if let Some(n) = value.strip_suffix("in") {
        (n, 96.0)
    } else {
        return None;
    };
    number.trim().parse::<f32>().ok().map(|n| n * factor)
}

/// Top, right, bottom and left values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl From<Rect<f32>> for Edges {
    fn from(rect: Rect<f32>) -> Self {
        Self {
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
            left: rect.left,
        }
    }
}

/// Wrapped text of one node.
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub face: Arc<FontFace>,
    pub font_size: f32,
    pub lines: Vec<TextLine>,
}

/// A laid-out node. Coordinates are absolute CSS pixels of the border box.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub node: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub border: Edges,
    pub padding: Edges,
    pub text: Option<TextLayout>,
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    fn new(node: NodeId, x: f32, y: f32, layout: &Layout) -> Self {
        Self {
            node,
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            border: layout.border.into(),
            padding: layout.padding.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Content box as `(x, y, width, height)`.
    pub fn content_rect(&self) -> (f32, f32, f32, f32) {
        (
            self.x + self.border.left + self.padding.left,
            self.y + self.border.top + self.padding.top,
            (self.width - self.border.horizontal() - self.padding.horizontal()).max(0.0),
            (self.height - self.border.vertical() - self.padding.vertical()).max(0.0),
        )
    }
}

/// Shaped text waiting for its final width.
struct TextLeaf {
    node: NodeId,
    shaped: ShapedText,
    line_height: f32,
    align: String,
}

impl TextLeaf {
    fn measure(&self, known: Size<Option<f32>>, available: Size<AvailableSpace>) -> Size<f32> {
        let limit = known.width.unwrap_or(match available.width {
            AvailableSpace::Definite(width) => width,
            AvailableSpace::MinContent => 0.0,
            AvailableSpace::MaxContent => f32::INFINITY,
        });
        let (widest, lines) = self.shaped.measure(limit);
        Size {
            width: known.width.unwrap_or(widest),
            height: known.height.unwrap_or(lines as f32 * self.line_height),
        }
    }
}

fn layout_error(e: TaffyError) -> Error {
    Error::Capture(format!("Layout failed: {}", e))
}

/// Builds and solves a taffy tree for a subtree given computed styles.
pub struct LayoutEngine<'a> {
    tree: &'a VisualTree,
    styles: &'a [Option<ComputedStyle>],
    fonts: &'a FontBook,
}

/// Taffy tree under construction. Text leaves carry an index into `texts`.
struct Builder {
    taffy: TaffyTree<usize>,
    texts: Vec<TextLeaf>,
    owners: HashMap<TaffyId, NodeId>,
}

impl Builder {
    /// Convert solved taffy nodes under `parent` into boxes. Taffy
    /// locations are relative to the parent's border box at `(ox, oy)`.
    fn collect(&self, parent: TaffyId, ox: f32, oy: f32, into: &mut LayoutBox) -> Result<()> {
        for child in self.taffy.children(parent).map_err(layout_error)? {
            let layout = self.taffy.layout(child).map_err(layout_error)?;
            let (x, y) = (ox + layout.location.x, oy + layout.location.y);
            if let Some(&node) = self.owners.get(&child) {
                let mut child_box = LayoutBox::new(node, x, y, layout);
                self.collect(child, x, y, &mut child_box)?;
                into.children.push(child_box);
            } else if let Some(text) = self.taffy.get_node_context(child).and_then(|i| self.texts.get(*i)) {
                debug_assert_eq!(text.node, into.node);
                into.text = Some(TextLayout {
                    face: text.shaped.face().clone(),
                    font_size: text.shaped.font_size(),
                    lines: text
                        .shaped
                        .lines(x, y, layout.size.width, text.line_height, &text.align),
                });
            } else {
                // Anonymous inline row
                self.collect(child, x, y, into)?;
            }
        }
        Ok(())
    }
}

impl<'a> LayoutEngine<'a> {
    /// Create an engine over computed styles indexed by node.
    pub fn new(tree: &'a VisualTree, styles: &'a [Option<ComputedStyle>], fonts: &'a FontBook) -> Self {
        Self { tree, styles, fonts }
    }

    fn style(&self, id: NodeId) -> Option<&'a ComputedStyle> {
        self.styles.get(id.index()).and_then(Option::as_ref)
    }

    /// Lay out `root` in a containing block `width` pixels wide.
    ///
    /// Returns `None` when the root is not displayed.
    pub fn layout(&self, root: NodeId, width: f32) -> Result<Option<LayoutBox>> {
        let mut builder = Builder {
            taffy: TaffyTree::new(),
            texts: Vec::new(),
            owners: HashMap::new(),
        };
        let Some(top) = self.build(&mut builder, root)? else {
            return Ok(None);
        };

        let texts = &builder.texts;
        builder
            .taffy
            .compute_layout_with_measure(
                top,
                Size {
                    width: AvailableSpace::Definite(width),
                    height: AvailableSpace::MaxContent,
                },
                |known, available, _node, context, _style| match context.and_then(|i| texts.get(*i)) {
                    Some(text) => text.measure(known, available),
                    None => Size::ZERO,
                },
            )
            .map_err(layout_error)?;

        let layout = builder.taffy.layout(top).map_err(layout_error)?;
        let (x, y) = (layout.location.x, layout.location.y);
        let mut root_box = LayoutBox::new(root, x, y, layout);
        builder.collect(top, x, y, &mut root_box)?;
        Ok(Some(root_box))
    }

    fn build(&self, b: &mut Builder, id: NodeId) -> Result<Option<TaffyId>> {
        let Some(style) = self.style(id) else {
            return Ok(None);
        };
        if !style.is_displayed() {
            return Ok(None);
        }
        let node = self.tree.node(id);
        let mut taffy_style = self.taffy_style(id, style);

        // (taffy node, participates in inline flow)
        let mut items: Vec<(TaffyId, bool)> = Vec::new();
        if let Some(text) = node.text.as_deref().filter(|t| !t.trim().is_empty()) {
            if let Some(leaf) = self.text_leaf(b, id, style, text)? {
                items.push((leaf, true));
            }
        }
        for child in node.children().iter().copied() {
            if let Some(child_node) = self.build(b, child)? {
                let inline = self.style(child).map(ComputedStyle::is_inline).unwrap_or(false);
                items.push((child_node, inline));
            }
        }

        let children = if taffy_style.display == Display::Block {
            let inline = items.iter().filter(|(_, inline)| *inline).count();
            if inline > 1 && inline == items.len() {
                taffy_style.display = Display::Flex;
                taffy_style.flex_wrap = FlexWrap::Wrap;
                taffy_style.align_items = Some(AlignItems::FlexStart);
                items.into_iter().map(|(n, _)| n).collect()
            } else {
                self.wrap_inline_runs(b, items)?
            }
        } else {
            items.into_iter().map(|(n, _)| n).collect()
        };

        let taffy_node = b
            .taffy
            .new_with_children(taffy_style, &children)
            .map_err(layout_error)?;
        b.owners.insert(taffy_node, id);
        Ok(Some(taffy_node))
    }

    fn text_leaf(&self, b: &mut Builder, id: NodeId, style: &ComputedStyle, text: &str) -> Result<Option<TaffyId>> {
        let Some(face) = self.fonts.resolve(style.font_family(), style.font_weight()) else {
            return Ok(None);
        };
        let Some(shaped) = ShapedText::shape(face, text, style.font_size) else {
            return Ok(None);
        };
        if shaped.is_empty() {
            return Ok(None);
        }
        let leaf = b
            .taffy
            .new_leaf_with_context(Style::default(), b.texts.len())
            .map_err(layout_error)?;
        b.texts.push(TextLeaf {
            node: id,
            shaped,
            line_height: style.line_height(),
            align: style.get("text-align").unwrap_or("left").to_string(),
        });
        Ok(Some(leaf))
    }

    /// Group consecutive inline items of a block into wrapping rows.
    fn wrap_inline_runs(&self, b: &mut Builder, items: Vec<(TaffyId, bool)>) -> Result<Vec<TaffyId>> {
        let row = Style {
            display: Display::Flex,
            flex_wrap: FlexWrap::Wrap,
            align_items: Some(AlignItems::FlexStart),
            ..Default::default()
        };
        let mut children = Vec::new();
        let mut run: Vec<TaffyId> = Vec::new();
        let mut flush = |run: &mut Vec<TaffyId>, children: &mut Vec<TaffyId>| -> Result<()> {
            match run.len() {
                0 => {}
                1 => children.append(run),
                _ => {
                    let wrapper = b
                        .taffy
                        .new_with_children(row.clone(), run)
                        .map_err(layout_error)?;
                    children.push(wrapper);
                    run.clear();
                }
            }
            Ok(())
        };
        for (node, inline) in items {
            if inline {
                run.push(node);
            } else {
                flush(&mut run, &mut children)?;
                children.push(node);
            }
        }
        flush(&mut run, &mut children)?;
        Ok(children)
    }

    fn taffy_style(&self, id: NodeId, style: &ComputedStyle) -> Style {
        let node = self.tree.node(id);
        let font_size = style.font_size;
        let length = |property: &str| style.get(property).and_then(|v| parse_length(v, font_size));
        let dimension = |property: &str| match length(property) {
            Some(Length::Px(px)) => Dimension::length(px),
            Some(Length::Percent(pct)) => Dimension::percent(pct / 100.0),
            _ => Dimension::auto(),
        };
        let length_percentage = |property: &str| match length(property) {
            Some(Length::Px(px)) => LengthPercentage::length(px),
            Some(Length::Percent(pct)) => LengthPercentage::percent(pct / 100.0),
            _ => LengthPercentage::length(0.0),
        };
        let margin = |property: &str| match length(property) {
            Some(Length::Px(px)) => LengthPercentageAuto::length(px),
            Some(Length::Percent(pct)) => LengthPercentageAuto::percent(pct / 100.0),
            Some(Length::Auto) => LengthPercentageAuto::auto(),
            None => LengthPercentageAuto::length(0.0),
        };
        let border = |side: &str| {
            let styled = style
                .get(&format!("border-{}-style", side))
                .map(|v| v != "none")
                .unwrap_or(false);
            let width = style
                .get(&format!("border-{}-width", side))
                .and_then(|v| parse_px(v, font_size))
                .filter(|_| styled)
                .unwrap_or(0.0);
            LengthPercentage::length(width)
        };
        let number = |property: &str| style.get(property).and_then(|v| v.trim().parse::<f32>().ok());

        let display = match style.display() {
            "flex" | "inline-flex" => Display::Flex,
            "grid" => Display::Grid,
            _ => Display::Block,
        };
        let flex_direction = match style.get("flex-direction") {
            Some("column") => FlexDirection::Column,
            Some("column-reverse") => FlexDirection::ColumnReverse,
            Some("row-reverse") => FlexDirection::RowReverse,
            _ => FlexDirection::Row,
        };

        let mut size = Size {
            width: dimension("width"),
            height: dimension("height"),
        };
        if node.tag == "img" {
            let attr = |name: &str| node.attr(name).and_then(|v| v.parse::<f32>().ok());
            if style.get("width").is_none() {
                if let Some(w) = attr("width") {
                    size.width = Dimension::length(w);
                }
            }
            if style.get("height").is_none() {
                if let Some(h) = attr("height") {
                    size.height = Dimension::length(h);
                }
            }
        } else if node.attr(ICON_ATTR).is_some() {
            if style.get("width").is_none() {
                size.width = Dimension::length(font_size);
            }
            if style.get("height").is_none() {
                size.height = Dimension::length(font_size);
            }
        }

        let mut taffy_style = Style {
            display,
            box_sizing: BoxSizing::BorderBox,
            size,
            min_size: Size {
                width: Dimension::auto(),
                height: dimension("min-height"),
            },
            max_size: Size {
                width: dimension("max-width"),
                height: Dimension::auto(),
            },
            margin: Rect {
                left: margin("margin-left"),
                right: margin("margin-right"),
                top: margin("margin-top"),
                bottom: margin("margin-bottom"),
            },
            padding: Rect {
                left: length_percentage("padding-left"),
                right: length_percentage("padding-right"),
                top: length_percentage("padding-top"),
                bottom: length_percentage("padding-bottom"),
            },
            border: Rect {
                left: border("left"),
                right: border("right"),
                top: border("top"),
                bottom: border("bottom"),
            },
            gap: Size {
                width: length_percentage("column-gap"),
                height: length_percentage("row-gap"),
            },
            flex_direction,
            flex_wrap: match style.get("flex-wrap") {
                Some("wrap") => FlexWrap::Wrap,
                _ => FlexWrap::NoWrap,
            },
            flex_grow: number("flex-grow").unwrap_or(0.0),
            flex_shrink: number("flex-shrink").unwrap_or(1.0),
            justify_content: match style.get("justify-content") {
                Some("center") => Some(JustifyContent::Center),
                Some("flex-end") | Some("end") => Some(JustifyContent::FlexEnd),
                Some("space-between") => Some(JustifyContent::SpaceBetween),
                Some("space-around") => Some(JustifyContent::SpaceAround),
                Some("flex-start") | Some("start") => Some(JustifyContent::FlexStart),
                _ => None,
            },
            align_items: match style.get("align-items") {
                Some("center") => Some(AlignItems::Center),
                Some("flex-start") | Some("start") => Some(AlignItems::FlexStart),
                Some("flex-end") | Some("end") => Some(AlignItems::FlexEnd),
                Some("baseline") => Some(AlignItems::Baseline),
                Some("stretch") => Some(AlignItems::Stretch),
                _ => None,
            },
            ..Default::default()
        };

        if display == Display::Grid {
            taffy_style.grid_template_columns = style
                .get("grid-template-columns")
                .map(|template| grid_tracks(template, font_size))
                .unwrap_or_default()
                .into_iter()
                .map(GridTemplateComponent::Single)
                .collect();
        }
        if let Some(value) = style.get("grid-column") {
            taffy_style.grid_column = grid_column(value);
        }

        // `space-y-*` and `space-x-*` separate the children of the node that
        // declares them, not of descendants inheriting the variable.
        let own = |prefix: &str, name: &str| {
            let declared = node.classes.iter().any(|c| c.starts_with(prefix)) || node.style.get(name).is_some();
            style
                .value(name)
                .filter(|_| declared)
                .and_then(|v| parse_px(&v, font_size))
        };
        if let Some(space) = own("space-y-", "--space-y") {
            if taffy_style.display == Display::Block {
                taffy_style.display = Display::Flex;
                taffy_style.flex_direction = FlexDirection::Column;
                taffy_style.gap.height = LengthPercentage::length(space);
            } else if taffy_style.flex_direction == FlexDirection::Column {
                taffy_style.gap.height = LengthPercentage::length(space);
            }
        }
        if let Some(space) = own("space-x-", "--space-x") {
            if taffy_style.display == Display::Flex && taffy_style.flex_direction == FlexDirection::Row {
                taffy_style.gap.width = LengthPercentage::length(space);
            }
        }
        taffy_style
    }
}

/// Track sizes of a `grid-template-columns` value.
///
/// `none` yields no explicit tracks, so items fall into one implicit
/// column.
pub fn grid_tracks(template: &str, font_size: f32) -> Vec<TrackSizingFunction> {
    let template = template.trim();
    if template == "none" {
        return Vec::new();
    }
    let mut tracks = Vec::new();
    for spec in super::color::split_top_level(template, ' ') {
        let spec = spec.trim();
        if let Some(inner) = spec.strip_prefix("repeat(").and_then(|r| r.strip_suffix(')')) {
            if let Some((count, track)) = inner.split_once(',') {
                let count = count.trim().parse::<usize>().unwrap_or(1).max(1);
                let track = grid_track(track.trim(), font_size);
                tracks.extend(std::iter::repeat(track).take(count));
            }
        } else if !spec.is_empty() {
            tracks.push(grid_track(spec, font_size));
        }
    }
    tracks
}

fn grid_track(spec: &str, font_size: f32) -> TrackSizingFunction {
    if let Some((min, max)) = spec
        .strip_prefix("minmax(")
        .and_then(|s| s.strip_suffix(')'))
        .and_then(|s| s.split_once(','))
    {
        return MinMax {
            min: min_track(min.trim(), font_size),
            max: max_track(max.trim(), font_size),
        };
    }
    let min = if spec.ends_with("fr") {
        auto()
    } else {
        min_track(spec, font_size)
    };
    MinMax {
        min,
        max: max_track(spec, font_size),
    }
}

fn min_track(spec: &str, font_size: f32) -> MinTrackSizingFunction {
    match parse_length(spec, font_size) {
        Some(Length::Px(px)) => length(px),
        Some(Length::Percent(pct)) => percent(pct / 100.0),
        _ => auto(),
    }
}

fn max_track(spec: &str, font_size: f32) -> MaxTrackSizingFunction {
    if let Some(fraction) = spec.strip_suffix("fr").and_then(|f| f.trim().parse::<f32>().ok()) {
        return fr(fraction);
    }
    match parse_length(spec, font_size) {
        Some(Length::Px(px)) => length(px),
        Some(Length::Percent(pct)) => percent(pct / 100.0),
        _ => auto(),
    }
}

/// Placement for a `grid-column` value such as `2 / 3`, `span 2` or
/// `1 / -1`. Spans below one are treated as one.
pub fn grid_column(value: &str) -> Line<GridPlacement> {
    fn part(value: &str) -> GridPlacement {
        let value = value.trim();
        if let Some(count) = value.strip_prefix("span") {
            return match count.trim().parse::<u16>() {
                Ok(n) => GridPlacement::Span(n.max(1)),
                Err(_) => GridPlacement::Auto,
            };
        }
        match value.parse::<i16>() {
            Ok(index) if index != 0 => line(index),
            _ => GridPlacement::Auto,
        }
    }
    match value.split_once('/') {
        Some((start, end)) => Line {
            start: part(start),
            end: part(end),
        },
        None => Line {
            start: part(value),
            end: GridPlacement::Auto,
        },
    }
}
