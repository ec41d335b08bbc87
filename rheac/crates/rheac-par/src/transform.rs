//! Parse-tree rewriters.
//!
//! PEG grammars cannot express left recursion, so binary runs come out of
//! the parser flat: `[operand, op, operand, op, operand]`. The rewriters
//! here rotate those runs into operator-rooted trees, fold single-child
//! wrapper nodes, and delete nodes that exist only as grammar scaffolding.
//! They run bottom-up, as each node's children are completed.
//!
//! The ternary and typecheck rewriters match the binary one today; they
//! stay separate so per-operator processing can diverge later.

use crate::grammar::Rule;
use crate::parse_tree::ParseNode;

/// Apply the transform appropriate for `node`'s rule.
///
/// Returns `None` when the node should not reach the AST builder at all.
pub fn apply(node: ParseNode) -> Option<ParseNode> {
    match node.rule {
        Rule::exponential_binop
        | Rule::multiplicative_binop
        | Rule::additive_binop
        | Rule::shift_binop
        | Rule::relation_binop
        | Rule::bitwise_binop
        | Rule::boolean_binop => Some(binop_rearrange(node)),

        Rule::cast_op | Rule::type_check_op => Some(typecheck_rearrange(node)),

        Rule::unary_prefix_op => Some(unary_rearrange(node)),
        Rule::postfix_op => Some(postfix_rearrange(node)),
        Rule::ternary_op => Some(ternary_transform(node)),

        Rule::else_block => else_rearrange(node),
        Rule::variable_declaration => Some(fold_one(node)),

        // The end-of-input marker is a grammar artifact.
        Rule::EOI => discard_subtree(node),

        _ => Some(node),
    }
}

/// Rotate a flat binary run into a left-leaning operator tree.
///
/// A single child folds into the parent; otherwise the rightmost operand
/// and its operator are popped, the operator becomes the new root with
/// (rest-of-run, rhs) as children, and the rest of the run is rotated
/// recursively.
fn binop_rearrange(mut node: ParseNode) -> ParseNode {
    if node.children.len() == 1 {
        return node.children.pop().unwrap();
    }

    node.text.clear();

    let rhs = node.children.pop().unwrap();
    let mut op = node.children.pop().unwrap();

    op.children.push(binop_rearrange(node));
    op.children.push(rhs);
    op
}

/// Rotation for binary operations whose RHS is a typename (`as`, `is`).
fn typecheck_rearrange(mut node: ParseNode) -> ParseNode {
    if node.children.len() == 1 {
        return node.children.pop().unwrap();
    }

    node.text.clear();

    let rhs = node.children.pop().unwrap();
    let mut op = node.children.pop().unwrap();

    op.children.push(typecheck_rearrange(node));
    op.children.push(rhs);
    op
}

/// Promote a prefix operator over its operand.
fn unary_rearrange(mut node: ParseNode) -> ParseNode {
    if node.children.len() == 1 {
        return node.children.pop().unwrap();
    }

    node.text.clear();

    let operand = node.children.pop().unwrap();
    let mut op = node.children.pop().unwrap();

    op.children.push(operand);
    op
}

/// Bring the *last* postfix step of a chain to the top, making the earlier
/// steps its trailing child. `a[i](x)` becomes a call node whose final
/// child is the subscript node.
fn postfix_rearrange(mut node: ParseNode) -> ParseNode {
    if node.children.len() == 1 {
        return node.children.pop().unwrap();
    }

    node.text.clear();

    let mut postfix = node.children.pop().unwrap();
    postfix.children.push(postfix_rearrange(node));
    postfix
}

/// The ternary keywords generate no nodes, so a full conditional is already
/// just `[condition, then, else]`; a degenerate one folds to its child.
fn ternary_transform(mut node: ParseNode) -> ParseNode {
    if node.children.len() == 1 {
        return node.children.pop().unwrap();
    }

    node.text.clear();
    node
}

/// An absent else-block is deleted; a present one is unwrapped to its body.
fn else_rearrange(mut node: ParseNode) -> Option<ParseNode> {
    if node.children.is_empty() {
        None
    } else {
        Some(node.children.remove(0))
    }
}

/// Replace a single-child wrapper with that child.
fn fold_one(mut node: ParseNode) -> ParseNode {
    if node.children.len() == 1 {
        node.children.pop().unwrap()
    } else {
        node
    }
}

/// Blank a node that only exists because of how the grammar is written.
fn discard_subtree(_node: ParseNode) -> Option<ParseNode> {
    None
}
