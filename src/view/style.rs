//! Style sheets, selectors and declarations.

use super::{NodeId, VisualTree};
use std::fmt::Write as _;

/// Media condition under which a sheet applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Media {
    /// Always active
    All,
    /// Active only while printing
    Print,
    /// Active when the viewport is at least this many pixels wide
    MinWidth(u32),
}

impl Media {
    fn prelude(self) -> Option<String> {
        match self {
            Media::All => None,
            Media::Print => Some("@media print".to_string()),
            Media::MinWidth(px) => Some(format!("@media (min-width: {}px)", px)),
        }
    }
}

/// A selector over visual tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `*`
    Universal,
    /// `div`
    Tag(String),
    /// `.name`
    Class(String),
    /// `#name`
    Id(String),
    /// `ancestor descendant`
    Descendant(Box<Selector>, Box<Selector>),
    /// `#a.b`, every part matching the same node
    Compound(Vec<Selector>),
    /// `a, b`
    List(Vec<Selector>),
    /// Selector text emitted verbatim and never matched against the tree
    Raw(String),
}

/// Selector specificity as `(ids, classes, tags)`.
pub type Specificity = (u32, u32, u32);

impl Selector {
    /// `.class`
    pub fn class(name: &str) -> Self {
        Selector::Class(name.to_string())
    }

    /// `#id`
    pub fn id(name: &str) -> Self {
        Selector::Id(name.to_string())
    }

    /// `tag`
    pub fn tag(name: &str) -> Self {
        Selector::Tag(name.to_string())
    }

    /// `selfother`, both on the same node
    pub fn and(self, other: Selector) -> Self {
        match self {
            Selector::Compound(mut parts) => {
                parts.push(other);
                Selector::Compound(parts)
            }
            first => Selector::Compound(vec![first, other]),
        }
    }

    /// `self inner`
    pub fn descendant(self, inner: Selector) -> Self {
        Selector::Descendant(Box::new(self), Box::new(inner))
    }

    /// Whether `node` matches.
    pub fn matches(&self, tree: &VisualTree, node: NodeId) -> bool {
        self.match_specificity(tree, node).is_some()
    }

    /// Specificity of the best matching branch, or `None` when `node` does not match.
    pub fn match_specificity(&self, tree: &VisualTree, node: NodeId) -> Option<Specificity> {
        let n = tree.node(node);
        match self {
            Selector::Universal => Some((0, 0, 0)),
            Selector::Tag(tag) => (n.tag == *tag).then_some((0, 0, 1)),
            Selector::Class(class) => n.has_class(class).then_some((0, 1, 0)),
            Selector::Id(id) => (n.element_id.as_deref() == Some(id)).then_some((1, 0, 0)),
            Selector::Descendant(ancestor, inner) => {
                let own = inner.match_specificity(tree, node)?;
                let up = tree
                    .ancestors(node)
                    .filter_map(|a| ancestor.match_specificity(tree, a))
                    .max()?;
                Some((own.0 + up.0, own.1 + up.1, own.2 + up.2))
            }
            Selector::Compound(parts) => parts.iter().try_fold((0, 0, 0), |acc, part| {
                let s = part.match_specificity(tree, node)?;
                Some((acc.0 + s.0, acc.1 + s.1, acc.2 + s.2))
            }),
            Selector::List(list) => list
                .iter()
                .filter_map(|s| s.match_specificity(tree, node))
                .max(),
            Selector::Raw(_) => None,
        }
    }

    /// CSS text of the selector.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Universal => "*".to_string(),
            Selector::Tag(tag) => tag.clone(),
            Selector::Class(class) => format!(".{}", escape_ident(class)),
            Selector::Id(id) => format!("#{}", escape_ident(id)),
            Selector::Descendant(a, b) => format!("{} {}", a.to_css(), b.to_css()),
            Selector::Compound(parts) => parts.iter().map(Selector::to_css).collect(),
            Selector::List(list) => list
                .iter()
                .map(Selector::to_css)
                .collect::<Vec<_>>()
                .join(", "),
            Selector::Raw(text) => text.clone(),
        }
    }
}

/// Escape an identifier for use in a selector (`lg:col-span-1` becomes `lg\:col-span-1`).
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for c in ident.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    /// A normal declaration.
    pub fn new(property: &str, value: impl Into<String>) -> Self {
        Self {
            property: property.to_string(),
            value: value.into(),
            important: false,
        }
    }

    /// An `!important` declaration.
    pub fn important(property: &str, value: impl Into<String>) -> Self {
        Self {
            important: true,
            ..Self::new(property, value)
        }
    }
}

/// A selector with its declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
}

/// An identified style sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    id: String,
    media: Media,
    at_rules: Vec<String>,
    rules: Vec<Rule>,
}

impl StyleSheet {
    /// Create an empty sheet.
    pub fn new(id: impl Into<String>, media: Media) -> Self {
        Self {
            id: id.into(),
            media,
            at_rules: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Sheet identifier, unique within a surface.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Media condition.
    pub fn media(&self) -> Media {
        self.media
    }

    /// Rules in source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Raw at-rules emitted ahead of the rules (`@page { ... }`).
    pub fn at_rules(&self) -> &[String] {
        &self.at_rules
    }

    /// Append a rule.
    pub fn rule(mut self, selector: Selector, declarations: Vec<Declaration>) -> Self {
        self.push_rule(selector, declarations);
        self
    }

    /// Append a raw at-rule.
    pub fn at_rule(mut self, text: impl Into<String>) -> Self {
        self.at_rules.push(text.into());
        self
    }

    /// Append a rule in place.
    pub fn push_rule(&mut self, selector: Selector, declarations: Vec<Declaration>) {
        self.rules.push(Rule {
            selector,
            declarations,
        });
    }

    /// Whether the sheet holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.at_rules.is_empty()
    }

    /// CSS text of the sheet.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for at_rule in &self.at_rules {
            out.push_str(at_rule);
            out.push('\n');
        }
        let prelude = self.media.prelude();
        let indent = if prelude.is_some() { "  " } else { "" };
        if let Some(prelude) = &prelude {
            let _ = writeln!(out, "{} {{", prelude);
        }
        for rule in &self.rules {
            let _ = write!(out, "{}{} {{", indent, rule.selector.to_css());
            for decl in &rule.declarations {
                let bang = if decl.important { " !important" } else { "" };
                let _ = write!(out, " {}: {}{};", decl.property, decl.value, bang);
            }
            out.push_str(" }\n");
        }
        if prelude.is_some() {
            out.push_str("}\n");
        }
        out
    }
}
