//! HTML serialization of visual trees.

use crate::view::{NodeId, StyleSheet, Surface, VisualTree};
use std::fmt::Write as _;

const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "meta", "input"];

/// Serialize a subtree as an HTML fragment.
pub fn to_html_fragment(tree: &VisualTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, node, 0);
    out
}

/// Serialize a subtree and the given sheets as a standalone HTML document.
pub fn to_html_document(
    tree: &VisualTree,
    node: NodeId,
    sheets: &[StyleSheet],
    title: &str,
) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_text(title));
    for sheet in sheets {
        let _ = write!(
            out,
            "<style data-sheet=\"{}\">\n{}</style>\n",
            escape_attr(sheet.id()),
            sheet.to_css()
        );
    }
    out.push_str("</head>\n<body>\n");
    write_node(&mut out, tree, node, 0);
    out.push_str("</body>\n</html>\n");
    out
}

/// Serialize the subtree under `element_id` with every sheet active on the surface.
pub fn surface_to_html(surface: &Surface, element_id: &str, title: &str) -> crate::Result<String> {
    let root = surface.find_root(element_id)?;
    Ok(to_html_document(
        surface.tree(),
        root,
        surface.sheets(),
        title,
    ))
}

fn write_node(out: &mut String, tree: &VisualTree, id: NodeId, depth: usize) {
    let node = tree.node(id);
    let indent = "  ".repeat(depth);

    let _ = write!(out, "{}<{}", indent, node.tag);
    if let Some(element_id) = &node.element_id {
        let _ = write!(out, " id=\"{}\"", escape_attr(element_id));
    }
    if !node.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape_attr(&node.classes.join(" ")));
    }
    if !node.style.is_empty() {
        let _ = write!(out, " style=\"{}\"", escape_attr(&node.style.css_text()));
    }
    for (name, value) in &node.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }

    if VOID_ELEMENTS.contains(&node.tag.as_str()) {
        out.push_str(">\n");
        return;
    }
    out.push('>');

    if node.children().is_empty() {
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
        }
        let _ = writeln!(out, "</{}>", node.tag);
        return;
    }

    out.push('\n');
    if let Some(text) = &node.text {
        let _ = writeln!(out, "{}  {}", indent, escape_text(text));
    }
    for child in node.children() {
        write_node(out, tree, *child, depth + 1);
    }
    let _ = writeln!(out, "{}</{}>", indent, node.tag);
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
