// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared subtree walkers for the analyses.
//!
//! Two traversal shapes cover every scan the engine performs:
//!
//! - [`walk_subtree`] — plain pre-order over a whole subtree.
//!
//! - [`walk_stopping_at_lambdas`] — pre-order that visits nested lambda
//!   nodes but never descends into their bodies. Callback scans use this:
//!   a call written inside a nested callback belongs to that callback's own
//!   analysis, not to the enclosing one.
//!
//! Both call the visitor on the entry node first.

use crate::syntax_model::{NodeId, SyntaxKind, SyntaxTree};

/// Pre-order walk of `node` and all of its descendants.
pub(crate) fn walk_subtree<F>(tree: &SyntaxTree, node: NodeId, f: &mut F)
where
    F: FnMut(NodeId),
{
    f(node);
    for &child in tree.children(node) {
        walk_subtree(tree, child, f);
    }
}

/// Pre-order walk that does not enter lambda bodies below the entry node.
///
/// The entry node itself may be anything, including a lambda — its children
/// are walked; only lambdas *encountered during* the walk act as barriers.
pub(crate) fn walk_stopping_at_lambdas<F>(tree: &SyntaxTree, node: NodeId, f: &mut F)
where
    F: FnMut(NodeId),
{
    f(node);
    for &child in tree.children(node) {
        walk_below(tree, child, f);
    }
}

fn walk_below<F>(tree: &SyntaxTree, node: NodeId, f: &mut F)
where
    F: FnMut(NodeId),
{
    f(node);
    if tree.kind(node) == SyntaxKind::Lambda {
        return;
    }
    for &child in tree.children(node) {
        walk_below(tree, child, f);
    }
}
