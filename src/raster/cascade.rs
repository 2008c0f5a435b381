//! Computed style resolution.
//!
//! Only sheets with [`Media::All`] take part: a capture has neither a
//! viewport nor a print context, so responsive and print rules never apply.

use crate::view::{Media, NodeId, Specificity, Surface, VisualTree};
use std::collections::HashMap;

/// Root font size in pixels.
pub const ROOT_FONT_SIZE: f32 = 16.0;

const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "text-align",
    "visibility",
];

const INLINE_TAGS: &[&str] = &["span", "a", "strong", "em", "b", "i", "img"];

/// Resolved style of one node.
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    props: HashMap<String, String>,
    /// Font size in pixels
    pub font_size: f32,
}

impl ComputedStyle {
    /// Raw property value.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.props.get(property).map(String::as_str)
    }

    /// Property value with `var()` references substituted.
    pub fn value(&self, property: &str) -> Option<String> {
        self.get(property).map(|v| self.substitute(v))
    }

    fn substitute(&self, value: &str) -> String {
        let mut out = value.to_string();
        // Bounded to guard against self-referencing variables
        for _ in 0..8 {
            let Some(start) = out.find("var(") else { break };
            let Some(len) = out[start..].find(')') else { break };
            let inner = &out[start + 4..start + len];
            let (name, fallback) = match inner.split_once(',') {
                Some((n, f)) => (n.trim(), f.trim()),
                None => (inner.trim(), ""),
            };
            let replacement = self.get(name).unwrap_or(fallback).to_string();
            out.replace_range(start..start + len + 1, &replacement);
        }
        out
    }

    /// The `display` value, defaulting by tag.
    pub fn display(&self) -> &str {
        self.get("display").unwrap_or("block")
    }

    /// Whether the node takes part in layout.
    pub fn is_displayed(&self) -> bool {
        self.display() != "none"
    }

    /// Whether the node lays out inline in a block context.
    pub fn is_inline(&self) -> bool {
        matches!(self.display(), "inline" | "inline-flex" | "inline-block")
    }

    /// Whether the node is visible when displayed.
    pub fn is_visible(&self) -> bool {
        self.get("visibility") != Some("hidden")
    }

    /// Line height in pixels.
    pub fn line_height(&self) -> f32 {
        match self.get("line-height") {
            Some(v) => match v.parse::<f32>() {
                Ok(multiplier) => multiplier * self.font_size,
                Err(_) => super::layout::parse_px(v, self.font_size).unwrap_or(self.font_size * 1.5),
            },
            None => self.font_size * 1.5,
        }
    }

    /// Numeric font weight.
    pub fn font_weight(&self) -> u16 {
        match self.get("font-weight") {
            Some("bold") | Some("bolder") => 700,
            Some(w) => w.parse().unwrap_or(400),
            None => 400,
        }
    }

    /// The `font-family` list, defaulting to sans-serif.
    pub fn font_family(&self) -> &str {
        self.get("font-family").unwrap_or("sans-serif")
    }

    fn set(&mut self, property: &str, value: &str) {
        for (p, v) in expand(property, value) {
            self.props.insert(p, v);
        }
    }
}

/// Expand shorthands into longhand properties.
fn expand(property: &str, value: &str) -> Vec<(String, String)> {
    let sides = ["top", "right", "bottom", "left"];
    let four = |prefix: &str, suffix: &str| -> Vec<(String, String)> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let pick = |i: usize| -> &str {
            match (parts.len(), i) {
                (1, _) => parts[0],
                (2, 0) | (2, 2) => parts[0],
                (2, _) => parts[1],
                (3, 3) => parts[1],
                (3, i) => parts[i],
                (_, i) => parts.get(i).copied().unwrap_or("0"),
            }
        };
        if parts.is_empty() {
            return Vec::new();
        }
        sides
            .iter()
            .enumerate()
            .map(|(i, side)| (format!("{}-{}{}", prefix, side, suffix), pick(i).to_string()))
            .collect()
    };

    match property {
        "padding" => four("padding", ""),
        "margin" => four("margin", ""),
        "border-width" => four("border", "-width"),
        "border-style" => four("border", "-style"),
        "border-color" => four("border", "-color"),
        "gap" => {
            let mut parts = value.split_whitespace();
            let row = parts.next().unwrap_or("0").to_string();
            let column = parts.next().map(str::to_string).unwrap_or_else(|| row.clone());
            vec![("row-gap".into(), row), ("column-gap".into(), column)]
        }
        "background" if value.contains("gradient(") => vec![
            ("background-image".into(), value.to_string()),
            ("background-color".into(), "transparent".into()),
        ],
        "background" => vec![
            ("background-color".into(), value.to_string()),
            ("background-image".into(), "none".into()),
        ],
        _ => vec![(property.to_string(), value.to_string())],
    }
}

/// Cascade rank: important, inline, specificity, source order.
type Rank = (bool, bool, Specificity, usize);

/// Computed styles for every node under `root`, indexed by [`NodeId::index`].
pub fn compute_styles(surface: &Surface, root: NodeId) -> Vec<Option<ComputedStyle>> {
    let tree = surface.tree();
    let mut styles: Vec<Option<ComputedStyle>> = vec![None; tree.len()];

    for id in tree.subtree(root) {
        let parent = tree
            .node(id)
            .parent()
            .filter(|_| id != root)
            .and_then(|p| styles[p.index()].as_ref());
        let computed = compute_one(surface, tree, id, parent);
        styles[id.index()] = Some(computed);
    }
    styles
}

fn compute_one(
    surface: &Surface,
    tree: &VisualTree,
    id: NodeId,
    parent: Option<&ComputedStyle>,
) -> ComputedStyle {
    let node = tree.node(id);
    let mut style = ComputedStyle {
        props: HashMap::new(),
        font_size: parent.map(|p| p.font_size).unwrap_or(ROOT_FONT_SIZE),
    };
    if let Some(parent) = parent {
        for (p, v) in &parent.props {
            if INHERITED.contains(&p.as_str()) || p.starts_with("--") {
                style.props.insert(p.clone(), v.clone());
            }
        }
    }
    if INLINE_TAGS.contains(&node.tag.as_str()) {
        style.props.insert("display".into(), "inline".into());
    }
    if matches!(node.tag.as_str(), "h1" | "h2" | "h3" | "strong" | "b") {
        style.props.insert("font-weight".into(), "700".into());
    }

    let mut declarations: Vec<(Rank, &str, String)> = Vec::new();
    let mut order = 0usize;
    for sheet in surface.sheets() {
        if sheet.media() != Media::All {
            continue;
        }
        for rule in sheet.rules() {
            let Some(specificity) = rule.selector.match_specificity(tree, id) else {
                order += rule.declarations.len();
                continue;
            };
            for decl in &rule.declarations {
                declarations.push((
                    (decl.important, false, specificity, order),
                    decl.property.as_str(),
                    decl.value.clone(),
                ));
                order += 1;
            }
        }
    }
    for (property, value) in node.style.iter() {
        let (value, important) = match value.strip_suffix("!important") {
            Some(v) => (v.trim_end().to_string(), true),
            None => (value.to_string(), false),
        };
        declarations.push(((important, true, (0, 0, 0), order), property, value));
        order += 1;
    }
    declarations.sort_by(|a, b| a.0.cmp(&b.0));

    let parent_font = style.font_size;
    for (_, property, value) in declarations {
        if value == "inherit" {
            continue;
        }
        style.set(property, &value);
    }
    if let Some(size) = style
        .props
        .get("font-size")
        .and_then(|v| super::layout::parse_px(v, parent_font))
    {
        style.font_size = size;
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Declaration, Element, Selector, StyleSheet, VisualTree};

    fn surface() -> Surface {
        Surface::new(VisualTree::from_element(
            Element::new("div")
                .id("cv-preview")
                .class("text-white text-sm")
                .child(Element::new("p").class("text-white").style("color", "#000000"))
                .child(Element::new("div").class("lg:col-span-1 p-8")),
        ))
    }

    #[test]
    fn test_inheritance_and_utilities() {
        let surface = surface();
        let styles = compute_styles(&surface, surface.tree().root());
        let root = styles[0].as_ref().unwrap();
        assert_eq!(root.get("color"), Some("oklch(100% 0 0)"));
        assert_eq!(root.font_size, 14.0);

        let p = styles[1].as_ref().unwrap();
        assert_eq!(p.get("color"), Some("#000000"));
        assert_eq!(p.font_size, 14.0);
        assert_eq!(p.display(), "block");
        assert_eq!(p.font_weight(), 400);
        assert_eq!(p.font_family(), "sans-serif");
    }

    #[test]
    fn test_font_weight_and_family_inherit() {
        let surface = Surface::new(VisualTree::from_element(
            Element::new("h1")
                .style("font-family", "Inter, sans-serif")
                .child(Element::new("span").text("Ada")),
        ));
        let styles = compute_styles(&surface, surface.tree().root());
        let span = styles[1].as_ref().unwrap();
        assert_eq!(span.font_weight(), 700);
        assert_eq!(span.font_family(), "Inter, sans-serif");
    }

    #[test]
    fn test_responsive_rules_ignored() {
        let surface = surface();
        let styles = compute_styles(&surface, surface.tree().root());
        let col = styles[2].as_ref().unwrap();
        assert_eq!(col.get("grid-column"), None);
        assert_eq!(col.get("padding-left"), Some("2rem"));
    }

    #[test]
    fn test_important_sheet_beats_inline() {
        let mut surface = surface();
        surface.inject_sheet(StyleSheet::new("pin", Media::All).rule(
            Selector::id("cv-preview").descendant(Selector::class("text-white")),
            vec![Declaration::important("color", "#ffffff")],
        ));
        let styles = compute_styles(&surface, surface.tree().root());
        assert_eq!(styles[1].as_ref().unwrap().get("color"), Some("#ffffff"));
    }

    #[test]
    fn test_var_substitution() {
        let tree = VisualTree::from_element(
            Element::new("div").class("bg-gradient-to-br from-blue-50 to-blue-100"),
        );
        let surface = Surface::new(tree);
        let styles = compute_styles(&surface, surface.tree().root());
        let image = styles[0].as_ref().unwrap().value("background-image").unwrap();
        assert!(image.starts_with("linear-gradient(to bottom right, oklch(97%"));
        assert!(!image.contains("var("));
    }

    #[test]
    fn test_expand_four_sides() {
        let sides = expand("padding", "1px 2px 3px");
        assert_eq!(sides[0], ("padding-top".to_string(), "1px".to_string()));
        assert_eq!(sides[1], ("padding-right".to_string(), "2px".to_string()));
        assert_eq!(sides[2], ("padding-bottom".to_string(), "3px".to_string()));
        assert_eq!(sides[3], ("padding-left".to_string(), "2px".to_string()));
    }
}
