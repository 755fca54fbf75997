// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Extraction of the calls a when-configurator or in-order assertion
//! configures.
//!
//! `sub.When(x => x.Bar(1))` configures `x.Bar(1)`; the analyses need that
//! inner call, not the `When` invocation itself. Three callback shapes are
//! recognized:
//!
//! - an inline lambda — every call/element-access expression in its body is
//!   yielded, without entering nested lambdas;
//! - a bare method reference — resolved and followed exactly one hop to its
//!   declaration body, which is scanned under the same rule (references
//!   inside that body are *not* followed; the engine's cost stays linear in
//!   source size);
//! - anything else — an empty result. Unrecognized callback syntax may be a
//!   perfectly legal pattern outside this analysis's coverage, so the
//!   failure is silent.

use crate::analysis_host::AnalysisContext;
use crate::symbol_model::SymbolKind;
use crate::syntax_model::{NodeId, SyntaxKind, SyntaxTree};
use crate::tree_walker::walk_stopping_at_lambdas;

/// The configured calls of a when-configurator invocation.
///
/// The callback is the first argument in the reduced extension form
/// (`sub.When(cb)`) and the second in the ordinary form
/// (`SubstituteExtensions.When(sub, cb)`).
pub(crate) fn find_for_when_expression(
    ctx: &AnalysisContext<'_>,
    invocation: NodeId,
    is_extension: bool,
) -> Vec<NodeId> {
    let Some(callback) = when_callback_argument(ctx.tree, invocation, is_extension) else {
        return Vec::new();
    };
    configured_calls(ctx, callback)
}

/// The configured calls of an in-order assertion's sole callback argument.
pub(crate) fn find_for_received_in_order(
    ctx: &AnalysisContext<'_>,
    invocation: NodeId,
) -> Vec<NodeId> {
    let Some(callback) = ctx.tree.invocation_arguments(invocation).first().copied() else {
        return Vec::new();
    };
    configured_calls(ctx, callback)
}

/// Selects the callback argument of a when-configurator invocation.
pub(crate) fn when_callback_argument(
    tree: &SyntaxTree,
    invocation: NodeId,
    is_extension: bool,
) -> Option<NodeId> {
    let arguments = tree.invocation_arguments(invocation);
    let index = usize::from(!is_extension);
    arguments.get(index).copied()
}

/// Extracts call-like expressions from a callback of any recognized shape.
pub(crate) fn configured_calls(ctx: &AnalysisContext<'_>, callback: NodeId) -> Vec<NodeId> {
    match ctx.tree.kind(callback) {
        SyntaxKind::Lambda => collect_call_like(ctx.tree, callback),
        SyntaxKind::Identifier | SyntaxKind::MemberAccess => {
            method_reference_body(ctx, callback)
                .map(|body| collect_call_like(ctx.tree, body))
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Resolves a bare method reference to its declaration body, one hop only.
fn method_reference_body(ctx: &AnalysisContext<'_>, callback: NodeId) -> Option<NodeId> {
    let symbol = ctx.semantics.resolve(callback)?;
    if symbol.kind != SymbolKind::Method {
        return None;
    }
    ctx.semantics.method_body(&symbol)
}

/// Pre-order collection of invocation, element-access, and bare
/// member-access nodes, stopping at nested lambdas. A member access that is
/// the callee of an invocation is part of that invocation, not a separate
/// configured call.
fn collect_call_like(tree: &SyntaxTree, body: NodeId) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk_stopping_at_lambdas(tree, body, &mut |node| match tree.kind(node) {
        SyntaxKind::Invocation | SyntaxKind::ElementAccess => found.push(node),
        SyntaxKind::MemberAccess if !tree.is_invocation_callee(node) => found.push(node),
        _ => {}
    });
    found
}

/// The node a configured-call diagnostic should point at.
///
/// A yielded member access whose symbol is a method is the callee of a call
/// written elsewhere (or a method group); the interesting node is its
/// wrapping parent. Everything else already is the substitution node.
pub(crate) fn actual_substitution_node(ctx: &AnalysisContext<'_>, node: NodeId) -> NodeId {
    if ctx.tree.kind(node) == SyntaxKind::MemberAccess
        && ctx
            .semantics
            .resolve(node)
            .is_some_and(|s| s.kind == SymbolKind::Method)
    {
        ctx.tree.parent(node).unwrap_or(node)
    } else {
        node
    }
}
