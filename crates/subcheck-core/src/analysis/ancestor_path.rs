// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Kind-template matching over a node's ancestor chain.
//!
//! An argument matcher is only meaningful as a literal argument of a call or
//! an element access. This module finds the smallest enclosing expression of
//! either shape by comparing the matcher node's ancestors, position by
//! position, against declared kind templates. The walk is purely structural:
//! no symbol information is consulted.
//!
//! A matcher in any other syntactic position (a local initializer, a return
//! value, an arithmetic operand…) matches no template and yields `None`.
//! Callers treat that as "unsupported shape, leave it alone" — deliberately
//! silent, so exotic-but-legal code never produces a false positive.

use crate::syntax_model::{NodeId, SyntaxKind, SyntaxTree};

/// Ancestor chain of an argument inside an ordinary call.
pub const CALL_ARGUMENT_PATH: &[SyntaxKind] = &[
    SyntaxKind::Argument,
    SyntaxKind::ArgumentList,
    SyntaxKind::Invocation,
];

/// Ancestor chain of an argument inside an element access.
pub const INDEXER_ARGUMENT_PATH: &[SyntaxKind] = &[
    SyntaxKind::Argument,
    SyntaxKind::BracketedArgumentList,
    SyntaxKind::ElementAccess,
];

/// The two templates every matcher lookup tries, in order.
pub const ENCLOSING_EXPRESSION_PATHS: &[&[SyntaxKind]] =
    &[CALL_ARGUMENT_PATH, INDEXER_ARGUMENT_PATH];

/// Finds the enclosing expression of `node` by template.
///
/// Each template is an ordered sequence of ancestor kinds. A template
/// matches iff every position matches before the ancestor chain runs out;
/// the node at the template's last position is returned. The first matching
/// template wins. `None` means no template matched.
#[must_use]
pub fn find_enclosing_expression(
    tree: &SyntaxTree,
    node: NodeId,
    templates: &[&[SyntaxKind]],
) -> Option<NodeId> {
    templates
        .iter()
        .find_map(|template| match_template(tree, node, template))
}

fn match_template(tree: &SyntaxTree, node: NodeId, template: &[SyntaxKind]) -> Option<NodeId> {
    let mut current = node;
    let mut matched = None;
    for &expected in template {
        let ancestor = tree.parent(current)?;
        if tree.kind(ancestor) != expected {
            return None;
        }
        matched = Some(ancestor);
        current = ancestor;
    }
    matched
}
