// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Detection of awaited calls inside when-configurator callbacks.
//!
//! `sub.When(async x => await x.RunAsync()).Do(…)` looks right and is not:
//! the callback's await executes the target call on the spot, so the
//! configurator has nothing to intercept. The library only behaves usefully
//! here from the release that added async `When` overloads onward, so the
//! detector is gated once per compilation on the referenced library version
//! — below the minimum it registers nothing and costs nothing.
//!
//! A callback that resolves to an async method symbol but whose body
//! contains no suspension point is left alone, as is a callback whose body
//! the host cannot produce: the bug class is "awaiting defeats deferred
//! execution", not "the callback is async".

use crate::analysis::emit;
use crate::analysis::roles::LIBRARY_ASSEMBLY;
use crate::analysis::substitution_finder::when_callback_argument;
use crate::analysis_host::AnalysisContext;
use crate::diagnostics::DiagnosticId;
use crate::symbol_model::{AssemblyRef, LibraryVersion, Symbol, SymbolKind};
use crate::syntax_model::{NodeId, SyntaxKind};
use crate::tree_walker::walk_stopping_at_lambdas;
use tracing::debug;

/// First library version whose when-configurators accept async callbacks.
pub const MINIMUM_LIBRARY_VERSION: LibraryVersion = LibraryVersion::new(4, 1, 0);

/// Version-gated detector state, fixed at compilation start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AwaitedWhenDetector {
    enabled: bool,
}

impl AwaitedWhenDetector {
    /// Evaluates the version gate once per compilation.
    pub(crate) fn from_references(references: &[AssemblyRef]) -> Self {
        let enabled = references.iter().any(|reference| {
            reference.name.eq_ignore_ascii_case(LIBRARY_ASSEMBLY)
                && reference.version >= MINIMUM_LIBRARY_VERSION
        });
        if !enabled {
            debug!(
                minimum = %MINIMUM_LIBRARY_VERSION,
                "awaited-when detection disabled; no qualifying library reference"
            );
        }
        Self { enabled }
    }

    /// Per-node hook for a when-configurator invocation.
    pub(crate) fn check_when_invocation(
        &self,
        ctx: &AnalysisContext<'_>,
        invocation: NodeId,
        symbol: &Symbol,
    ) {
        if !self.enabled {
            return;
        }
        let Some(callback) =
            when_callback_argument(ctx.tree, invocation, symbol.is_extension)
        else {
            return;
        };
        let Some(callback_symbol) = ctx.semantics.resolve(callback) else {
            return;
        };
        if callback_symbol.kind != SymbolKind::Method || !callback_symbol.is_async {
            return;
        }

        let body = if ctx.tree.kind(callback) == SyntaxKind::Lambda {
            Some(callback)
        } else {
            ctx.semantics.method_body(&callback_symbol)
        };
        let Some(body) = body else {
            // No body to inspect; cannot tell whether anything is awaited.
            return;
        };
        if contains_await(ctx, body) {
            let member_id = callback_symbol.qualified_name();
            emit(
                ctx,
                DiagnosticId::AwaitedWhenCall,
                "Awaited call inside a When callback executes immediately instead of being configured; call the member without awaiting it.".into(),
                ctx.tree.span(callback),
                Some(member_id.as_str()),
            );
        }
    }
}

fn contains_await(ctx: &AnalysisContext<'_>, body: NodeId) -> bool {
    let mut found = false;
    walk_stopping_at_lambdas(ctx.tree, body, &mut |node| {
        found |= ctx.tree.kind(node) == SyntaxKind::Await;
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_host::{Compilation, DiagnosticCollector};
    use crate::diagnostics::Diagnostic;
    use crate::symbol_model::Symbol;
    use crate::syntax_model::{Span, SyntaxTree, TreeBuilder};
    use crate::test_support::{FakeSemanticModel, library};

    fn span() -> Span {
        Span::default()
    }

    fn qualifying_reference() -> AssemblyRef {
        AssemblyRef::new("NSubstitute", LibraryVersion::new(4, 1, 0))
    }

    /// `sub.When(callback)` where the callback is an async lambda whose body
    /// awaits `x.RunAsync()`. Returns (tree, when invocation, callback).
    fn awaiting_when(callback_span: Span) -> (SyntaxTree, NodeId, NodeId) {
        let mut b = TreeBuilder::new();
        let x = b.identifier("x", span());
        let run = b.member_access(x, "RunAsync", span());
        let run_call = b.invocation(run, vec![], span());
        let awaited = b.await_expression(run_call, span());
        let callback = b.lambda(vec![awaited], callback_span);

        let sub = b.identifier("sub", span());
        let when_access = b.member_access(sub, "When", span());
        let when_call = b.invocation(when_access, vec![callback], span());
        let root = b.compilation_unit(vec![when_call], span());
        (b.finish(root), when_call, callback)
    }

    fn async_lambda_symbol() -> Symbol {
        Symbol::method("<lambda>", "Tests.FooTests", "Tests").as_async()
    }

    fn run_detector(
        tree: SyntaxTree,
        model: &FakeSemanticModel,
        references: Vec<AssemblyRef>,
        when_call: NodeId,
    ) -> Vec<Diagnostic> {
        let compilation = Compilation::new(tree).with_references(references);
        let sink = DiagnosticCollector::new();
        let ctx = AnalysisContext::new(&compilation, model, &sink);
        let detector = AwaitedWhenDetector::from_references(&compilation.referenced_assemblies);
        detector.check_when_invocation(&ctx, when_call, &library::when_configurator());
        sink.into_diagnostics()
    }

    #[test]
    fn awaited_async_callback_is_reported_at_the_callback() {
        let (tree, when_call, callback) = awaiting_when(Span::new(9, 40));
        let mut model = FakeSemanticModel::new();
        model.set_symbol(callback, async_lambda_symbol());

        let diagnostics = run_detector(tree, &model, vec![qualifying_reference()], when_call);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, DiagnosticId::AwaitedWhenCall);
        assert_eq!(diagnostics[0].span, Span::new(9, 40));
    }

    #[test]
    fn version_gate_is_absolute() {
        let (tree, when_call, callback) = awaiting_when(span());
        let mut model = FakeSemanticModel::new();
        model.set_symbol(callback, async_lambda_symbol());

        let below = AssemblyRef::new("NSubstitute", LibraryVersion::new(4, 0, 2));
        let diagnostics = run_detector(tree, &model, vec![below], when_call);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn unrelated_assembly_does_not_enable_the_gate() {
        let (tree, when_call, callback) = awaiting_when(span());
        let mut model = FakeSemanticModel::new();
        model.set_symbol(callback, async_lambda_symbol());

        let other = AssemblyRef::new("SomeOtherMocks", LibraryVersion::new(9, 0, 0));
        assert!(run_detector(tree, &model, vec![other], when_call).is_empty());
    }

    #[test]
    fn async_callback_without_suspension_is_not_flagged() {
        // async x => x.RunAsync()  — async, but nothing awaited.
        let mut b = TreeBuilder::new();
        let x = b.identifier("x", span());
        let run = b.member_access(x, "RunAsync", span());
        let run_call = b.invocation(run, vec![], span());
        let callback = b.lambda(vec![run_call], span());
        let sub = b.identifier("sub", span());
        let when_access = b.member_access(sub, "When", span());
        let when_call = b.invocation(when_access, vec![callback], span());
        let root = b.compilation_unit(vec![when_call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(callback, async_lambda_symbol());

        assert!(
            run_detector(tree, &model, vec![qualifying_reference()], when_call).is_empty()
        );
    }

    #[test]
    fn synchronous_callback_is_not_flagged() {
        let (tree, when_call, callback) = awaiting_when(span());
        let mut model = FakeSemanticModel::new();
        model.set_symbol(
            callback,
            Symbol::method("<lambda>", "Tests.FooTests", "Tests"),
        );

        assert!(
            run_detector(tree, &model, vec![qualifying_reference()], when_call).is_empty()
        );
    }

    #[test]
    fn async_method_reference_is_followed_one_hop() {
        // sub.When(HandleAsync) where HandleAsync's body awaits.
        let mut b = TreeBuilder::new();
        let x = b.identifier("x", span());
        let run = b.member_access(x, "RunAsync", span());
        let run_call = b.invocation(run, vec![], span());
        let awaited = b.await_expression(run_call, span());
        let body = b.lambda(vec![awaited], span());

        let reference = b.identifier("HandleAsync", Span::new(15, 26));
        let sub = b.identifier("sub", span());
        let when_access = b.member_access(sub, "When", span());
        let when_call = b.invocation(when_access, vec![reference], span());
        let root = b.compilation_unit(vec![when_call, body], span());
        let tree = b.finish(root);

        let handler = Symbol::method("HandleAsync", "Tests.FooTests", "Tests").as_async();
        let mut model = FakeSemanticModel::new();
        model.set_symbol(reference, handler.clone());
        model.set_method_body(&handler, body);

        let diagnostics = run_detector(tree, &model, vec![qualifying_reference()], when_call);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span, Span::new(15, 26));
    }

    #[test]
    fn method_reference_without_known_body_is_skipped() {
        let mut b = TreeBuilder::new();
        let reference = b.identifier("HandleAsync", span());
        let sub = b.identifier("sub", span());
        let when_access = b.member_access(sub, "When", span());
        let when_call = b.invocation(when_access, vec![reference], span());
        let root = b.compilation_unit(vec![when_call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(
            reference,
            Symbol::method("HandleAsync", "Tests.FooTests", "Tests").as_async(),
        );

        assert!(
            run_detector(tree, &model, vec![qualifying_reference()], when_call).is_empty()
        );
    }
}
