//! The raw parse tree.
//!
//! pest hands back a stream of pairs whose shape mirrors the grammar. We
//! reshape that stream into an owned [`ParseNode`] tree, running the
//! transform pass bottom-up as each node is completed, so that by the time
//! a node reaches the AST builder its operator runs have already been
//! rotated into operator-rooted subtrees.

use std::fmt::Write as _;

use pest::iterators::Pair;

use rheac_util::SourcePosition;

use crate::grammar::Rule;
use crate::transform;

/// One node of the (transformed) parse tree.
#[derive(Debug)]
pub struct ParseNode {
    /// The grammar rule this node was produced by
    pub rule: Rule,
    /// The matched source text; cleared when a transform repurposes the node
    pub text: String,
    /// Where the match started
    pub position: SourcePosition,
    /// Child nodes, in match order
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// Does this node carry the given rule tag?
    pub fn is(&self, rule: Rule) -> bool {
        self.rule == rule
    }

    /// The rule tag as a display name, used in diagnostics.
    pub fn name(&self) -> String {
        format!("{:?}", self.rule)
    }

    /// Render an indented dump of the subtree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, level: usize) {
        let _ = write!(out, "{:indent$}{}", "", self.name(), indent = level);
        if !self.text.is_empty() && self.children.is_empty() {
            let _ = write!(out, " \"{}\"", self.text);
        }
        out.push('\n');
        for child in &self.children {
            child.dump_into(out, level + 2);
        }
    }
}

/// Convert a pest pair into a transformed [`ParseNode`] subtree.
///
/// Returns `None` when the transform pass discards the node (lookahead
/// artifacts and absent else-blocks).
pub fn build(pair: Pair<'_, Rule>, source: &str) -> Option<ParseNode> {
    let rule = pair.as_rule();
    let (line, column) = pair.line_col();
    let byte = pair.as_span().start();
    let text = pair.as_str().to_string();
    let position = SourcePosition::new(source, line as u32, column as u32, byte);

    let children = pair
        .into_inner()
        .filter_map(|inner| build(inner, source))
        .collect();

    transform::apply(ParseNode {
        rule,
        text,
        position,
        children,
    })
}
