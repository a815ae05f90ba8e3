//! Stylesheet syntax tree: the shape every analysis pass operates on.
//!
//! The tree is deliberately small: ordered nodes, where a node is a style
//! rule, an at-rule, or a comment. Comments are first-class because the
//! `uncss:ignore` directive lives in them. Serialization back to CSS text
//! goes through [`std::fmt::Display`] and preserves node order exactly.

use serde::Serialize;
use std::fmt;

/// An ordered sequence of top-level nodes, as produced by [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

/// A single node in the stylesheet tree.
///
/// Modeled as a closed enum so every pass is forced to handle all node
/// kinds exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Comment(Comment),
}

/// A style rule: comma-separated selectors plus a declaration block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub position: Option<Position>,
}

/// Any `@`-rule.
///
/// `children` holds nested nodes for conditional groups (`@media`,
/// `@supports`) and for `@keyframes` (whose children are stop rules such
/// as `from` or `30%`). Declaration-bodied at-rules (`@font-face`,
/// `@page`) store their declarations directly. Statement at-rules
/// (`@import`, `@charset`) have `has_block == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    pub children: Vec<Node>,
    pub declarations: Vec<Declaration>,
    pub has_block: bool,
    pub position: Option<Position>,
}

impl AtRule {
    /// True for `@keyframes` and its vendor-prefixed variants
    /// (`@-webkit-keyframes`, ...).
    pub fn is_keyframes(&self) -> bool {
        self.name.ends_with("keyframes")
    }

    /// True for conditional group rules whose children are full nodes and
    /// which the filtering pass recurses into.
    pub fn is_conditional(&self) -> bool {
        self.name == "media" || self.name == "supports" || self.name.ends_with("document")
    }
}

/// A CSS comment. `text` is the content between `/*` and `*/`, trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub position: Option<Position>,
}

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// Source location of a node, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Stylesheet {
    /// Parse CSS source into a tree. Convenience wrapper around
    /// [`crate::parse::parse_stylesheet`].
    pub fn parse(source: &str) -> crate::error::UncssResult<Self> {
        crate::parse::parse_stylesheet(source)
    }

    /// Serialize the tree back to CSS text.
    pub fn to_css(&self) -> String {
        self.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_node(f, node, 0)?;
        }
        Ok(())
    }
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    match node {
        Node::Comment(comment) => {
            indent(f, depth)?;
            writeln!(f, "/* {} */", comment.text)
        }
        Node::Rule(rule) => {
            indent(f, depth)?;
            writeln!(f, "{} {{", rule.selectors.join(", "))?;
            write_declarations(f, &rule.declarations, depth + 1)?;
            indent(f, depth)?;
            writeln!(f, "}}")
        }
        Node::AtRule(at) => {
            indent(f, depth)?;
            if !at.has_block {
                return if at.params.is_empty() {
                    writeln!(f, "@{};", at.name)
                } else {
                    writeln!(f, "@{} {};", at.name, at.params)
                };
            }
            if at.params.is_empty() {
                writeln!(f, "@{} {{", at.name)?;
            } else {
                writeln!(f, "@{} {} {{", at.name, at.params)?;
            }
            write_declarations(f, &at.declarations, depth + 1)?;
            for child in &at.children {
                write_node(f, child, depth + 1)?;
            }
            indent(f, depth)?;
            writeln!(f, "}}")
        }
    }
}

fn write_declarations(
    f: &mut fmt::Formatter<'_>,
    declarations: &[Declaration],
    depth: usize,
) -> fmt::Result {
    for decl in declarations {
        indent(f, depth)?;
        writeln!(f, "{}: {};", decl.property, decl.value)?;
    }
    Ok(())
}
