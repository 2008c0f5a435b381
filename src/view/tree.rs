//! Arena-backed visual tree.

use super::Selector;
use std::fmt;

/// Index of a node inside a [`VisualTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in tree order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inline style declarations of a node, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `prop: value; prop: value` declaration list.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::new();
        style.set_css_text(css_text);
        style
    }

    /// Value of a property, if set.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing an existing value in place.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| p == property) {
            Some(entry) => entry.1 = value,
            None => self.declarations.push((property.to_string(), value)),
        }
    }

    /// Remove a property.
    pub fn remove(&mut self, property: &str) {
        self.declarations.retain(|(p, _)| p != property);
    }

    /// Whether no property is set.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate over `(property, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Serialized declaration list, as found in a `style` attribute.
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace every declaration with those parsed from `css_text`.
    pub fn set_css_text(&mut self, css_text: &str) {
        self.declarations.clear();
        for decl in css_text.split(';') {
            if let Some((property, value)) = decl.split_once(':') {
                let property = property.trim();
                let value = value.trim();
                if !property.is_empty() && !value.is_empty() {
                    self.set(property, value);
                }
            }
        }
    }
}

/// A node in the visual tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Element name (`div`, `img`, `h2`, ...)
    pub tag: String,
    /// Externally addressable element id
    pub element_id: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// Inline style
    pub style: InlineStyle,
    /// Other attributes (`src`, `href`, `alt`, ...)
    pub attrs: Vec<(String, String)>,
    /// Text content preceding the children
    pub text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child node ids in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent node id.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Owned element description used to build a [`VisualTree`].
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    element_id: Option<String>,
    classes: Vec<String>,
    style: InlineStyle,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element with the given tag.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// Set the element id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    /// Append whitespace-separated classes.
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    /// Set an inline style property.
    pub fn style(mut self, property: &str, value: impl Into<String>) -> Self {
        self.style.set(property, value);
        self
    }

    /// Set an attribute.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child when present.
    pub fn child_opt(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child {
            self.children.push(child);
        }
        self
    }

    /// Append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A rendered tree of styled nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    nodes: Vec<Node>,
}

impl VisualTree {
    /// Flatten an element description into a tree. The element becomes the root.
    pub fn from_element(root: Element) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(root, None);
        tree
    }

    fn push(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: element.tag,
            element_id: element.element_id,
            classes: element.classes,
            style: element.style,
            attrs: element.attrs,
            text: element.text,
            parent,
            children: Vec::new(),
        });
        for child in element.children {
            let child_id = self.push(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// The top-level node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Iterate over the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, move |p| self.node(*p).parent)
    }

    /// The node followed by all its descendants, in document order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        out
    }

    /// Find the node carrying `element_id`.
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.element_id.as_deref() == Some(element_id))
            .map(NodeId)
    }

    /// Descendants of `scope` (excluding `scope`) matching `selector`.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.subtree(scope)
            .into_iter()
            .skip(1)
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// Image nodes under `scope` with their `src`.
    pub fn images(&self, scope: NodeId) -> Vec<(NodeId, String)> {
        self.subtree(scope)
            .into_iter()
            .filter_map(|id| {
                let node = self.node(id);
                (node.tag == "img")
                    .then(|| node.attr("src").map(|src| (id, src.to_string())))
                    .flatten()
            })
            .collect()
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| self.node(n).text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Every distinct class used under `scope`, including `scope` itself.
    pub fn classes_in(&self, scope: NodeId) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for id in self.subtree(scope) {
            for class in &self.node(id).classes {
                if !seen.contains(&class.as_str()) {
                    seen.push(class);
                }
            }
        }
        seen
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
