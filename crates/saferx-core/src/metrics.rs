//! Structural risk metrics over a parsed pattern.
//!
//! Two numbers predict most catastrophic backtracking: how deeply unbounded
//! quantifiers nest (star height) and how many times nested bounded
//! quantifiers can multiply the work (repetition cost).

use crate::ast::Node;
use crate::types::RiskProfile;

/// Repetition factor charged for an unbounded quantifier.
///
/// Larger than any `u32` bound, so one `*` or `+` outweighs any product of
/// finite bounds that fits below it.
pub const UNBOUNDED_REPETITION: u64 = 1 << 32;

/// Repetition cost saturates here instead of overflowing.
pub const REPETITION_CEILING: u64 = 1 << 48;

/// Compute the full risk profile of a tree.
pub fn evaluate(root: &Node) -> RiskProfile {
    RiskProfile {
        star_height: star_height(root),
        repetition_cost: repetition_cost(root),
        finite_repetition_cost: finite_repetition_cost(root),
        has_backreference: any_node(root, Node::is_backreference),
    }
}

/// Maximum number of unbounded quantifiers enclosing any position.
pub fn star_height(node: &Node) -> u32 {
    let inner = node.children().iter().map(star_height).max().unwrap_or(0);
    match node {
        Node::Repeat { max: None, .. } => inner + 1,
        _ => inner,
    }
}

/// Largest product of quantifier upper bounds along any root to leaf path.
///
/// Unbounded quantifiers are charged [`UNBOUNDED_REPETITION`].
pub fn repetition_cost(node: &Node) -> u64 {
    product_of_bounds(node, UNBOUNDED_REPETITION)
}

/// Like [`repetition_cost`], but unbounded quantifiers count as 1.
pub fn finite_repetition_cost(node: &Node) -> u64 {
    product_of_bounds(node, 1)
}

fn product_of_bounds(node: &Node, unbounded: u64) -> u64 {
    let inner = node
        .children()
        .iter()
        .map(|child| product_of_bounds(child, unbounded))
        .max()
        .unwrap_or(1);
    match node {
        Node::Repeat { max, .. } => {
            let factor = match max {
                Some(max) => u64::from(*max).max(1),
                None => unbounded,
            };
            inner.saturating_mul(factor).min(REPETITION_CEILING)
        }
        _ => inner,
    }
}

/// Whether any node in the tree satisfies `predicate`.
///
/// Stops at the first match. Predicates can be OR-ed together to answer
/// several structural questions in one walk.
pub fn any_node<F>(root: &Node, predicate: F) -> bool
where
    F: Fn(&Node) -> bool,
{
    fn walk<F: Fn(&Node) -> bool>(node: &Node, predicate: &F) -> bool {
        predicate(node) || node.children().iter().any(|child| walk(child, predicate))
    }
    walk(root, &predicate)
}
