// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Interceptability of substituted members.
//!
//! A substitute works by generating a dynamic proxy that overrides the
//! configured member at runtime. That is only possible for interface,
//! abstract, and virtual members — and, across assembly boundaries, only
//! when an internal member's assembly grants visibility to the proxy
//! generator. Configuring anything else compiles fine and then silently
//! calls the real implementation, which is exactly the kind of lie this
//! analysis exists to catch.
//!
//! The verdict is computed per node visit and never cached: symbols are
//! host-owned facts, and the same member can appear under different nodes.

use crate::analysis::emit;
use crate::analysis::substitution_finder::actual_substitution_node;
use crate::analysis_host::{AnalysisContext, SemanticModel};
use crate::diagnostics::DiagnosticId;
use crate::symbol_model::{Accessibility, Symbol, Virtuality};
use crate::syntax_model::NodeId;
use ecow::eco_format;

/// The proxy-generation assembly an internals grant must name.
pub const PROXY_GENERATOR_ASSEMBLY: &str = "DynamicProxyGenAssembly2";

/// Whether a member can be overridden by the proxy generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptabilityVerdict {
    /// Interface, abstract, or virtual non-sealed member.
    Interceptable,
    /// Static, sealed-override, or plain member.
    NonVirtual,
    /// Overridable, but internal without a grant the proxy can use.
    InternalWithoutVisibility,
}

/// Classifies a resolved member.
#[must_use]
pub fn classify_member(semantics: &dyn SemanticModel, symbol: &Symbol) -> InterceptabilityVerdict {
    match symbol.virtuality {
        Virtuality::Static | Virtuality::SealedOverride | Virtuality::NonVirtual => {
            InterceptabilityVerdict::NonVirtual
        }
        Virtuality::Virtual | Virtuality::Abstract | Virtuality::InterfaceMember => {
            if symbol.accessibility == Accessibility::Internal
                && !semantics
                    .internals_visible_to(&symbol.containing_assembly, PROXY_GENERATOR_ASSEMBLY)
            {
                InterceptabilityVerdict::InternalWithoutVisibility
            } else {
                InterceptabilityVerdict::Interceptable
            }
        }
    }
}

/// Which diagnostic pair a check reports into.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SpecificationFamily {
    /// Setup and when-configured calls.
    Setup,
    /// Members wrapped by a received assertion.
    Received,
}

impl SpecificationFamily {
    const fn non_virtual(self) -> DiagnosticId {
        match self {
            Self::Setup => DiagnosticId::NonVirtualSetupSpecification,
            Self::Received => DiagnosticId::NonVirtualReceivedSetupSpecification,
        }
    }

    const fn internal(self) -> DiagnosticId {
        match self {
            Self::Setup => DiagnosticId::InternalSetupSpecification,
            Self::Received => DiagnosticId::InternalReceivedSetupSpecification,
        }
    }
}

/// Checks one substituted node and reports into `family`.
///
/// The diagnostic points at the actual substitution node — a member access
/// that resolved to a method is promoted to its wrapping invocation, so the
/// location covers the call the user wrote.
pub(crate) fn check_substituted_node(
    ctx: &AnalysisContext<'_>,
    node: NodeId,
    family: SpecificationFamily,
) {
    let location = ctx.tree.span(actual_substitution_node(ctx, node));

    // A compile-time literal can never be intercepted, symbol or not.
    if ctx.tree.kind(node).is_literal() {
        emit(
            ctx,
            family.non_virtual(),
            non_virtual_message(&ctx.tree.display_name(node)),
            location,
            None,
        );
        return;
    }

    let Some(symbol) = ctx.semantics.resolve(node) else {
        return;
    };
    let member_id = symbol.qualified_name();
    match classify_member(ctx.semantics, &symbol) {
        InterceptabilityVerdict::Interceptable => {}
        InterceptabilityVerdict::NonVirtual => emit(
            ctx,
            family.non_virtual(),
            non_virtual_message(&symbol.name),
            location,
            Some(member_id.as_str()),
        ),
        InterceptabilityVerdict::InternalWithoutVisibility => emit(
            ctx,
            family.internal(),
            eco_format!(
                "Internal member {} can not be intercepted without a visibility grant to {PROXY_GENERATOR_ASSEMBLY}.",
                symbol.name
            ),
            location,
            Some(member_id.as_str()),
        ),
    }
}

fn non_virtual_message(name: &str) -> ecow::EcoString {
    eco_format!(
        "Member {name} can not be intercepted. Only interface members and virtual, overriding, and abstract members can be intercepted."
    )
}
