//! Visual tree, style sheets and the host surface they live on.

pub mod palette;
mod style;
mod surface;
mod tree;

pub use style::{escape_ident, Declaration, Media, Rule, Selector, Specificity, StyleSheet};
pub use surface::Surface;
pub use tree::{Element, InlineStyle, Node, NodeId, VisualTree};
