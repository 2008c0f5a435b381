//! Scoped surface overrides with guaranteed restore.

use crate::view::{NodeId, StyleSheet, Surface};
use std::ops::Deref;

/// Temporary inline-style and style-sheet changes to a [`Surface`].
///
/// Every node touched through the guard has its original inline style
/// recorded on first touch; injected sheets are tracked by id. Dropping
/// the guard puts the surface back exactly as it was, on every exit path.
pub struct ScopedOverride<'a> {
    surface: &'a mut Surface,
    saved_styles: Vec<(NodeId, String)>,
    injected: Vec<String>,
    displaced: Vec<StyleSheet>,
}

impl<'a> ScopedOverride<'a> {
    /// Start a scope over `surface`.
    pub fn new(surface: &'a mut Surface) -> Self {
        Self {
            surface,
            saved_styles: Vec::new(),
            injected: Vec::new(),
            displaced: Vec::new(),
        }
    }

    /// Set an inline declaration on `node` for the lifetime of the scope.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if !self.saved_styles.iter().any(|(n, _)| *n == node) {
            let original = self.surface.tree().node(node).style.css_text();
            self.saved_styles.push((node, original));
        }
        self.surface
            .tree_mut()
            .node_mut(node)
            .style
            .set(property, value);
    }

    /// Set the same declarations on every node in `nodes`.
    pub fn set_styles(&mut self, nodes: &[NodeId], declarations: &[(&str, &str)]) {
        for node in nodes {
            for (property, value) in declarations {
                self.set_style(*node, property, value);
            }
        }
    }

    /// Add a sheet for the lifetime of the scope.
    pub fn inject_sheet(&mut self, sheet: StyleSheet) {
        let id = sheet.id().to_string();
        if !self.injected.contains(&id) {
            if let Some(previous) = self.surface.remove_sheet(&id) {
                self.displaced.push(previous);
            }
            self.injected.push(id);
        }
        self.surface.inject_sheet(sheet);
    }

    /// Number of nodes whose inline style is overridden.
    pub fn touched(&self) -> usize {
        self.saved_styles.len()
    }

    /// End the scope now. Equivalent to dropping the guard.
    pub fn restore(self) {}

    fn restore_in_place(&mut self) {
        for (node, css_text) in self.saved_styles.drain(..).rev() {
            self.surface
                .tree_mut()
                .node_mut(node)
                .style
                .set_css_text(&css_text);
        }
        for id in self.injected.drain(..) {
            self.surface.remove_sheet(&id);
        }
        for sheet in self.displaced.drain(..) {
            self.surface.inject_sheet(sheet);
        }
        log::debug!("Restored surface after scoped override");
    }
}

impl Deref for ScopedOverride<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl Drop for ScopedOverride<'_> {
    fn drop(&mut self) {
        self.restore_in_place();
    }
}
