// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Validation of call-info accesses inside setup callbacks.
//!
//! A setup like `sub.Bar(1).Returns(callInfo => callInfo.ArgAt<int>(0))`
//! hands the callback a call-info object exposing the stubbed call's
//! arguments. The runtime only discovers a bad access when the callback
//! executes; statically, the stubbed call's declared parameter list is right
//! there. This module checks the three access families against it:
//!
//! - **position accesses** — `callInfo.ArgAt<T>(p)`: `p` must be a declared
//!   position, and `T` must be that parameter's type;
//! - **by-type accesses** — `callInfo.Arg<T>()`: exactly one parameter of
//!   type `T` must exist, otherwise the lookup is unsatisfiable or
//!   ambiguous;
//! - **indexer accesses** — `callInfo[p]`, optionally cast or assigned to:
//!   `p` must be declared, a cast must name the parameter's type, and an
//!   assignment requires a `ref`/`out` parameter and a compatible value.
//!
//! Positions that are not integer literals are unknown at analysis time and
//! skipped rather than flagged. Accesses reached through the `ArgTypes`/
//! `Args` helper methods are only range-checked: their element types are the
//! helper's, not the stubbed call's.
//!
//! The whole validator is gated on the callback's static type being a
//! single-parameter delegate over the library's call-info type; anything
//! else (constant returns, property stubs, multi-parameter delegates) is out
//! of scope and skipped silently.

use crate::analysis::emit;
use crate::analysis::roles::{CALL_INFO_TYPE, SymbolRoles};
use crate::analysis_host::AnalysisContext;
use crate::diagnostics::DiagnosticId;
use crate::symbol_model::{Parameter, RefKind, Symbol, SymbolKind, TypeRef};
use crate::syntax_model::{NodeId, SyntaxKind};
use crate::tree_walker::walk_stopping_at_lambdas;
use ecow::eco_format;

/// Entry point for a setup-classified invocation.
pub(crate) fn analyze_setup_invocation(
    ctx: &AnalysisContext<'_>,
    invocation: NodeId,
    symbol: &Symbol,
) {
    let Some((stubbed, callbacks)) = setup_parts(ctx, invocation, symbol) else {
        return;
    };
    let Some(&first_callback) = callbacks.first() else {
        return;
    };
    if !is_call_info_callback(ctx, first_callback) {
        return;
    }

    let Some(target) = ctx.semantics.resolve(stubbed) else {
        return;
    };
    if !matches!(target.kind, SymbolKind::Method | SymbolKind::Indexer) {
        return;
    }

    for callback in callbacks {
        let context = scan_callback(ctx, callback);
        validate(ctx, &target, &context);
    }
}

/// Splits a setup invocation into the stubbed expression and the callback
/// arguments, for both the reduced extension form
/// (`sub.Bar(…).Returns(cb)`) and the ordinary static form
/// (`SubstituteExtensions.Returns(sub.Bar(…), cb)`).
pub(crate) fn setup_parts(
    ctx: &AnalysisContext<'_>,
    invocation: NodeId,
    symbol: &Symbol,
) -> Option<(NodeId, Vec<NodeId>)> {
    let arguments = ctx.tree.invocation_arguments(invocation);
    if symbol.is_extension {
        let callee = ctx.tree.invocation_callee(invocation)?;
        let stubbed = ctx.tree.member_access_receiver(callee)?;
        Some((stubbed, arguments))
    } else {
        let (&stubbed, callbacks) = arguments.split_first()?;
        Some((stubbed, callbacks.to_vec()))
    }
}

/// The applicability gate: a single-parameter delegate over call-info.
fn is_call_info_callback(ctx: &AnalysisContext<'_>, callback: NodeId) -> bool {
    let Some(ty) = ctx.semantics.type_of(callback) else {
        return false;
    };
    let Some(parameters) = ctx.semantics.delegate_parameters(&ty) else {
        return false;
    };
    matches!(parameters.as_slice(), [parameter] if parameter == &TypeRef::new(CALL_INFO_TYPE))
}

/// One `ArgAt`-style access.
struct PositionAccess {
    node: NodeId,
    position: Option<i64>,
    requested: Option<TypeRef>,
}

/// One `Arg`-style access.
struct TypeAccess {
    node: NodeId,
    requested: TypeRef,
}

/// One indexer access, with whatever wraps it.
struct IndexerAccess {
    node: NodeId,
    position: Option<i64>,
    cast: Option<TypeRef>,
    assigned_value: Option<NodeId>,
    /// False for accesses derived from `ArgTypes`/`Args` helpers.
    verify_cast_and_assignment: bool,
}

/// The accesses discovered in one callback body.
#[derive(Default)]
struct CallInfoContext {
    position_accesses: Vec<PositionAccess>,
    type_accesses: Vec<TypeAccess>,
    indexer_accesses: Vec<IndexerAccess>,
}

/// Scans a callback body for the three access families. Lambda bodies are
/// walked directly; a bare method reference is followed one hop.
fn scan_callback(ctx: &AnalysisContext<'_>, callback: NodeId) -> CallInfoContext {
    let mut context = CallInfoContext::default();
    let body = match ctx.tree.kind(callback) {
        SyntaxKind::Lambda => Some(callback),
        SyntaxKind::Identifier | SyntaxKind::MemberAccess => ctx
            .semantics
            .resolve(callback)
            .filter(|s| s.kind == SymbolKind::Method)
            .and_then(|s| ctx.semantics.method_body(&s)),
        _ => None,
    };
    let Some(body) = body else {
        return context;
    };

    walk_stopping_at_lambdas(ctx.tree, body, &mut |node| match ctx.tree.kind(node) {
        SyntaxKind::Invocation => collect_accessor_invocation(ctx, node, &mut context),
        SyntaxKind::ElementAccess => collect_indexer_access(ctx, node, &mut context),
        _ => {}
    });
    context
}

fn collect_accessor_invocation(
    ctx: &AnalysisContext<'_>,
    node: NodeId,
    context: &mut CallInfoContext,
) {
    let Some(symbol) = ctx.semantics.resolve(node) else {
        return;
    };
    if !symbol.is_call_info_accessor() {
        return;
    }
    match symbol.name.as_str() {
        "ArgAt" => context.position_accesses.push(PositionAccess {
            node,
            position: literal_position(ctx, ctx.tree.invocation_arguments(node).first().copied()),
            requested: symbol.type_arguments.first().cloned(),
        }),
        "Arg" => {
            if let Some(requested) = symbol.type_arguments.first().cloned() {
                context.type_accesses.push(TypeAccess { node, requested });
            }
        }
        _ => {}
    }
}

fn collect_indexer_access(
    ctx: &AnalysisContext<'_>,
    node: NodeId,
    context: &mut CallInfoContext,
) {
    let verify = if is_call_info_indexer(ctx, node) {
        true
    } else if is_helper_collection_access(ctx, node) {
        false
    } else {
        return;
    };

    let (cast, assigned_value) = wrapping_of(ctx, node);
    context.indexer_accesses.push(IndexerAccess {
        node,
        position: literal_position(ctx, ctx.tree.element_access_arguments(node).first().copied()),
        cast,
        assigned_value,
        verify_cast_and_assignment: verify,
    });
}

/// `callInfo[…]` — the element access resolves to the call-info indexer, or
/// the receiver's static type is the call-info type.
fn is_call_info_indexer(ctx: &AnalysisContext<'_>, node: NodeId) -> bool {
    if ctx
        .semantics
        .resolve(node)
        .is_some_and(|s| s.containing_type.eq_ignore_ascii_case(CALL_INFO_TYPE))
    {
        return true;
    }
    ctx.tree
        .element_access_receiver(node)
        .and_then(|receiver| ctx.semantics.type_of(receiver))
        .is_some_and(|ty| ty == TypeRef::new(CALL_INFO_TYPE))
}

/// `callInfo.ArgTypes()[…]` / `callInfo.Args()[…]` — range-checked only.
fn is_helper_collection_access(ctx: &AnalysisContext<'_>, node: NodeId) -> bool {
    ctx.tree
        .element_access_receiver(node)
        .filter(|&r| ctx.tree.kind(r) == SyntaxKind::Invocation)
        .and_then(|r| ctx.semantics.resolve(r))
        .is_some_and(|s| {
            s.is_call_info_accessor() && matches!(s.name.as_str(), "ArgTypes" | "Args")
        })
}

/// The cast target and assigned value wrapping an access, if any.
fn wrapping_of(ctx: &AnalysisContext<'_>, node: NodeId) -> (Option<TypeRef>, Option<NodeId>) {
    let Some(parent) = ctx.tree.parent(node) else {
        return (None, None);
    };
    match ctx.tree.kind(parent) {
        SyntaxKind::SafeCast | SyntaxKind::UnsafeCast => {
            (ctx.tree.cast_target(parent).cloned(), None)
        }
        SyntaxKind::Assignment => {
            let assigned = ctx
                .tree
                .assignment_parts(parent)
                .filter(|&(target, _)| target == node)
                .map(|(_, value)| value);
            (None, assigned)
        }
        _ => (None, None),
    }
}

fn literal_position(ctx: &AnalysisContext<'_>, argument: Option<NodeId>) -> Option<i64> {
    argument.and_then(|a| ctx.tree.int_value(a))
}

/// Applies the rule table against the stubbed target's parameter list.
fn validate(ctx: &AnalysisContext<'_>, target: &Symbol, context: &CallInfoContext) {
    let member_id = target.qualified_name();
    let parameters = &target.parameters;

    for access in &context.position_accesses {
        let Some(position) = access.position else {
            // Unknown at analysis time; skip, not flag.
            continue;
        };
        let Some(parameter) = parameter_at(parameters, position) else {
            emit(
                ctx,
                DiagnosticId::CallInfoArgumentOutOfRange,
                eco_format!("There is no argument at position {position} to this call."),
                ctx.tree.span(access.node),
                Some(member_id.as_str()),
            );
            continue;
        };
        if let Some(requested) = &access.requested
            && requested != &parameter.ty
        {
            emit(
                ctx,
                DiagnosticId::CallInfoCouldNotConvertParameterAtPosition,
                eco_format!(
                    "Couldn't convert parameter at position {position} to type {requested}."
                ),
                ctx.tree.span(access.node),
                Some(member_id.as_str()),
            );
        }
    }

    for access in &context.type_accesses {
        let matching = parameters
            .iter()
            .filter(|p| p.ty == access.requested)
            .count();
        match matching {
            0 => emit(
                ctx,
                DiagnosticId::CallInfoCouldNotFindArgumentToThisCall,
                eco_format!(
                    "Can not find an argument of type {} to this call.",
                    access.requested
                ),
                ctx.tree.span(access.node),
                Some(member_id.as_str()),
            ),
            1 => {}
            _ => emit(
                ctx,
                DiagnosticId::CallInfoMoreThanOneArgumentOfType,
                eco_format!(
                    "There is more than one argument of type {} to this call.",
                    access.requested
                ),
                ctx.tree.span(access.node),
                Some(member_id.as_str()),
            ),
        }
    }

    for access in &context.indexer_accesses {
        let Some(position) = access.position else {
            continue;
        };
        let Some(parameter) = parameter_at(parameters, position) else {
            emit(
                ctx,
                DiagnosticId::CallInfoArgumentOutOfRange,
                eco_format!("There is no argument at position {position} to this call."),
                ctx.tree.span(access.node),
                Some(member_id.as_str()),
            );
            continue;
        };
        if !access.verify_cast_and_assignment {
            continue;
        }
        if let Some(cast) = &access.cast
            && cast != &parameter.ty
        {
            emit(
                ctx,
                DiagnosticId::CallInfoCouldNotConvertParameterAtPosition,
                eco_format!("Couldn't convert parameter at position {position} to type {cast}."),
                ctx.tree.span(access.node),
                Some(member_id.as_str()),
            );
            continue;
        }
        if let Some(assigned) = access.assigned_value {
            if !matches!(parameter.ref_kind, RefKind::Ref | RefKind::Out) {
                emit(
                    ctx,
                    DiagnosticId::CallInfoArgumentIsNotOutOrRef,
                    eco_format!(
                        "Could not set argument {position} (of type {}) because it is not an out or ref argument.",
                        parameter.ty
                    ),
                    ctx.tree.span(access.node),
                    Some(member_id.as_str()),
                );
                continue;
            }
            if let Some(assigned_ty) = ctx.semantics.type_of(assigned)
                && !ctx.semantics.is_assignable(&assigned_ty, &parameter.ty)
            {
                emit(
                    ctx,
                    DiagnosticId::CallInfoArgumentSetWithIncompatibleValue,
                    eco_format!(
                        "Could not set value of type {assigned_ty} to argument {position} (expected type {}) because the types are incompatible.",
                        parameter.ty
                    ),
                    ctx.tree.span(access.node),
                    Some(member_id.as_str()),
                );
            }
        }
    }
}

fn parameter_at(parameters: &[Parameter], position: i64) -> Option<&Parameter> {
    usize::try_from(position)
        .ok()
        .and_then(|index| parameters.get(index))
}
