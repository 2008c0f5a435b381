//! The host surface: one visual tree plus the active style sheet list.

use super::palette;
use super::{NodeId, StyleSheet, VisualTree};
use crate::error::{Error, Result};

/// A rendered tree together with its style sheets.
///
/// Export adapters mutate the surface in place (inline styles, injected
/// sheets); see [`crate::export::ScopedOverride`] for the guarded way to
/// do so.
#[derive(Debug, Clone)]
pub struct Surface {
    tree: VisualTree,
    sheets: Vec<StyleSheet>,
}

impl Surface {
    /// Create a surface with the base utility sheets installed.
    pub fn new(tree: VisualTree) -> Self {
        Self {
            tree,
            sheets: palette::base_sheets(),
        }
    }

    /// Create a surface with exactly the given sheets.
    pub fn with_sheets(tree: VisualTree, sheets: Vec<StyleSheet>) -> Self {
        Self { tree, sheets }
    }

    /// The visual tree.
    pub fn tree(&self) -> &VisualTree {
        &self.tree
    }

    /// Mutable access to the visual tree.
    pub fn tree_mut(&mut self) -> &mut VisualTree {
        &mut self.tree
    }

    /// Swap in a freshly rendered tree, keeping the sheets.
    pub fn replace_tree(&mut self, tree: VisualTree) {
        self.tree = tree;
    }

    /// Active sheets in cascade order.
    pub fn sheets(&self) -> &[StyleSheet] {
        &self.sheets
    }

    /// Whether a sheet with `id` is active.
    pub fn has_sheet(&self, id: &str) -> bool {
        self.sheets.iter().any(|s| s.id() == id)
    }

    /// Append a sheet, replacing one with the same id.
    pub fn inject_sheet(&mut self, sheet: StyleSheet) {
        self.sheets.retain(|s| s.id() != sheet.id());
        self.sheets.push(sheet);
    }

    /// Remove the sheet with `id`, returning it.
    pub fn remove_sheet(&mut self, id: &str) -> Option<StyleSheet> {
        let pos = self.sheets.iter().position(|s| s.id() == id)?;
        Some(self.sheets.remove(pos))
    }

    /// Locate the node carrying `element_id`.
    pub fn find_root(&self, element_id: &str) -> Result<NodeId> {
        self.tree
            .find_by_element_id(element_id)
            .ok_or_else(|| Error::RootNotFound(element_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Element, Media};

    #[test]
    fn test_inject_and_remove_sheet() {
        let mut surface = Surface::new(VisualTree::from_element(Element::new("div").id("root")));
        let base = surface.sheets().len();

        surface.inject_sheet(StyleSheet::new("override", Media::All));
        surface.inject_sheet(StyleSheet::new("override", Media::Print));
        assert_eq!(surface.sheets().len(), base + 1);
        assert_eq!(surface.sheets()[base].media(), Media::Print);

        assert!(surface.remove_sheet("override").is_some());
        assert!(surface.remove_sheet("override").is_none());
        assert_eq!(surface.sheets().len(), base);
    }

    #[test]
    fn test_find_root() {
        let surface = Surface::new(VisualTree::from_element(Element::new("div").id("root")));
        assert!(surface.find_root("root").is_ok());
        assert!(matches!(
            surface.find_root("cv-preview"),
            Err(Error::RootNotFound(id)) if id == "cv-preview"
        ));
    }
}
