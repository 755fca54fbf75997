// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The misuse analyses and their compilation lifecycle.
//!
//! The host drives three phases per compilation:
//!
//! 1. [`CompilationAnalysis::begin`] — once, with the referenced assembly
//!    list; evaluates the awaited-when version gate and creates fresh
//!    tracker state.
//! 2. [`CompilationAnalysis::visit_node`] — for every syntax node, in any
//!    order, from any thread. Only invocation nodes are inspected; a node
//!    whose symbol does not resolve short-circuits that node only.
//! 3. [`CompilationAnalysis::finish`] — once, after all visits. Consuming
//!    `self` makes running it early a type error rather than a data race.
//!
//! [`analyze`] wraps the three phases for hosts (and tests) that just want
//! to hand over a compilation and collect diagnostics.
//!
//! Every diagnostic funnels through one emission point that consults the
//! compilation's suppression set first.

pub mod ancestor_path;
pub mod awaited_when;
pub mod interceptability;
pub mod roles;

pub(crate) mod call_info;
pub(crate) mod matcher_tracker;
pub(crate) mod substitution_finder;


use crate::analysis_host::{AnalysisContext, Compilation, DiagnosticSink, SemanticModel};
use crate::diagnostics::{Diagnostic, DiagnosticId};
use crate::symbol_model::{AssemblyRef, SymbolKind};
use crate::syntax_model::{NodeId, Span, SyntaxKind};
use ecow::EcoString;
use self::awaited_when::AwaitedWhenDetector;
use self::interceptability::SpecificationFamily;
use self::matcher_tracker::MatcherTracker;
use self::roles::{SemanticRole, classify};
use tracing::trace;

/// One compilation's worth of analysis state.
///
/// Everything except the matcher tracker is stateless; the tracker guards
/// its accumulation behind a mutex, so `visit_node` takes `&self` and the
/// whole value is `Sync`.
#[derive(Debug)]
pub struct CompilationAnalysis {
    tracker: MatcherTracker,
    awaited_when: AwaitedWhenDetector,
}

impl CompilationAnalysis {
    /// Starts analysis for one compilation.
    #[must_use]
    pub fn begin(referenced_assemblies: &[AssemblyRef]) -> Self {
        Self {
            tracker: MatcherTracker::new(),
            awaited_when: AwaitedWhenDetector::from_references(referenced_assemblies),
        }
    }

    /// Per-node hook. Safe to call concurrently for distinct nodes.
    pub fn visit_node(&self, ctx: &AnalysisContext<'_>, node: NodeId) {
        if ctx.tree.kind(node) != SyntaxKind::Invocation {
            return;
        }
        let Some(symbol) = ctx.semantics.resolve(node) else {
            return;
        };
        if symbol.kind != SymbolKind::Method {
            return;
        }

        let role = classify(&symbol);
        trace!(member = %symbol.name, ?role, "classified invocation");
        match role {
            SemanticRole::ArgMatcher => self.tracker.record_matcher(ctx, node),
            SemanticRole::Setup => {
                call_info::analyze_setup_invocation(ctx, node, &symbol);
                if let Some((stubbed, _)) = call_info::setup_parts(ctx, node, &symbol) {
                    interceptability::check_substituted_node(
                        ctx,
                        stubbed,
                        SpecificationFamily::Setup,
                    );
                }
            }
            SemanticRole::WhenConfigurator => {
                self.tracker.record_when(ctx, node, &symbol);
                for configured in
                    substitution_finder::find_for_when_expression(ctx, node, symbol.is_extension)
                {
                    interceptability::check_substituted_node(
                        ctx,
                        configured,
                        SpecificationFamily::Setup,
                    );
                }
                self.awaited_when.check_when_invocation(ctx, node, &symbol);
            }
            SemanticRole::InOrderAssertion => self.tracker.record_in_order(ctx, node),
            SemanticRole::ReceivedAssertion => check_received_wrapped_member(ctx, node),
            SemanticRole::CallInfoAccessor | SemanticRole::Unclassified => {}
        }
    }

    /// Once-per-compilation finalization; the host must have joined all
    /// node-visit callbacks first.
    pub fn finish(self, ctx: &AnalysisContext<'_>) {
        self.tracker.finish(ctx);
    }
}

/// Runs a whole compilation through the analysis: every node visited once,
/// then finalization.
///
/// # Examples
///
/// ```
/// use subcheck_core::prelude::*;
/// use subcheck_core::symbol_model::TypeRef;
///
/// struct NoSemantics;
/// impl SemanticModel for NoSemantics {
///     fn resolve(&self, _: NodeId) -> Option<Symbol> {
///         None
///     }
///     fn type_of(&self, _: NodeId) -> Option<TypeRef> {
///         None
///     }
///     fn delegate_parameters(&self, _: &TypeRef) -> Option<Vec<TypeRef>> {
///         None
///     }
///     fn method_body(&self, _: &Symbol) -> Option<NodeId> {
///         None
///     }
/// }
///
/// let mut builder = TreeBuilder::new();
/// let root = builder.compilation_unit(vec![], Span::default());
/// let compilation = Compilation::new(builder.finish(root));
/// let sink = DiagnosticCollector::new();
/// subcheck_core::analysis::analyze(&compilation, &NoSemantics, &sink);
/// assert!(sink.into_diagnostics().is_empty());
/// ```
pub fn analyze(compilation: &Compilation, semantics: &dyn SemanticModel, sink: &dyn DiagnosticSink) {
    let ctx = AnalysisContext::new(compilation, semantics, sink);
    let analysis = CompilationAnalysis::begin(&compilation.referenced_assemblies);
    crate::tree_walker::walk_subtree(&compilation.tree, compilation.tree.root(), &mut |node| {
        analysis.visit_node(&ctx, node);
    });
    analysis.finish(&ctx);
}

/// The member wrapped by a received assertion: `sub.Received().Bar(…)` or
/// `sub.Received()[…]`. The received call is the receiver; the wrapping
/// access is the asserted member.
fn check_received_wrapped_member(ctx: &AnalysisContext<'_>, received_invocation: NodeId) {
    let Some(parent) = ctx.tree.parent(received_invocation) else {
        return;
    };
    let wrapped = match ctx.tree.kind(parent) {
        SyntaxKind::MemberAccess
            if ctx.tree.member_access_receiver(parent) == Some(received_invocation) =>
        {
            Some(parent)
        }
        SyntaxKind::ElementAccess
            if ctx.tree.element_access_receiver(parent) == Some(received_invocation) =>
        {
            Some(parent)
        }
        _ => None,
    };
    if let Some(wrapped) = wrapped {
        interceptability::check_substituted_node(ctx, wrapped, SpecificationFamily::Received);
    }
}

/// Single emission point: suppression check, then the sink.
pub(crate) fn emit(
    ctx: &AnalysisContext<'_>,
    id: DiagnosticId,
    message: EcoString,
    span: Span,
    member_id: Option<&str>,
) {
    if let Some(member) = member_id
        && ctx.suppressions.is_suppressed(member, id)
    {
        trace!(member, id = id.as_str(), "diagnostic suppressed");
        return;
    }
    ctx.sink.report(Diagnostic::warning(id, message, span));
}
