// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Compilation-scoped tracking of argument-matcher usage.
//!
//! Whether a matcher is misused cannot be decided at the node that contains
//! it: `sub.Bar(Arg.Any<int>())` is fine when the same `sub.Bar(…)` call is
//! later configured by a when-configurator, and the when-configurator may be
//! visited before, after, or concurrently with the matcher node. So the
//! tracker accumulates two kinds of evidence across every node visit of one
//! compilation:
//!
//! - enclosing expressions that are *pending* — they contain a matcher and
//!   no setup/received pairing was visible locally;
//! - enclosing expressions *confirmed* as configured by a when-configurator
//!   or an in-order assertion.
//!
//! Finalization, which the host runs after all node visits have completed,
//! resolves the difference: every pending matcher whose enclosing expression
//! was never confirmed is reported, in the order the matchers were recorded.
//!
//! State is guarded by a mutex; visits may come from any thread. The
//! happened-before edge between the last visit and finalization is the
//! host's to guarantee — finalization consumes the tracker, so the type
//! system rules out further recording.

use crate::analysis::ancestor_path::{ENCLOSING_EXPRESSION_PATHS, find_enclosing_expression};
use crate::analysis::emit;
use crate::analysis::roles::SymbolRoles;
use crate::analysis::substitution_finder::{
    actual_substitution_node, find_for_received_in_order, find_for_when_expression,
};
use crate::analysis_host::AnalysisContext;
use crate::diagnostics::DiagnosticId;
use crate::symbol_model::Symbol;
use crate::syntax_model::{NodeId, Span, SyntaxKind};
use ecow::EcoString;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// A matcher occurrence waiting for its enclosing call to be confirmed.
#[derive(Debug, Clone)]
struct PendingMatcher {
    span: Span,
    /// Suppression identity: the enclosing call's member, when resolvable.
    member_id: Option<EcoString>,
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Enclosing expressions confirmed by a when-configurator.
    when_paired: HashSet<NodeId>,
    /// Enclosing expressions confirmed by an in-order assertion.
    in_order_paired: HashSet<NodeId>,
    /// Matchers per enclosing expression, in recorded order. BTreeMap keeps
    /// finalization deterministic across runs.
    pending: BTreeMap<NodeId, Vec<PendingMatcher>>,
}

/// The compilation-wide matcher-misuse state machine.
#[derive(Debug, Default)]
pub(crate) struct MatcherTracker {
    state: Mutex<TrackerState>,
}

impl MatcherTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Per-node hook for an invocation classified as an argument matcher.
    pub(crate) fn record_matcher(&self, ctx: &AnalysisContext<'_>, matcher: NodeId) {
        let Some(enclosing) =
            find_enclosing_expression(ctx.tree, matcher, ENCLOSING_EXPRESSION_PATHS)
        else {
            // Unsupported syntactic position; not diagnosed.
            return;
        };

        if is_followed_by_setup_invocation(ctx, enclosing)
            || is_preceded_by_received_invocation(ctx, enclosing)
        {
            return;
        }

        let member_id = ctx
            .semantics
            .resolve(enclosing)
            .map(|s| s.qualified_name());
        let pending = PendingMatcher {
            span: ctx.tree.span(matcher),
            member_id,
        };
        self.lock().pending.entry(enclosing).or_default().push(pending);
    }

    /// Per-node hook for a when-configurator invocation: every call it
    /// configures is a confirmed enclosing expression.
    pub(crate) fn record_when(
        &self,
        ctx: &AnalysisContext<'_>,
        invocation: NodeId,
        symbol: &Symbol,
    ) {
        let confirmed: Vec<NodeId> =
            find_for_when_expression(ctx, invocation, symbol.is_extension)
                .into_iter()
                .map(|node| actual_substitution_node(ctx, node))
                .collect();
        self.lock().when_paired.extend(confirmed);
    }

    /// Per-node hook for an in-order assertion invocation.
    pub(crate) fn record_in_order(&self, ctx: &AnalysisContext<'_>, invocation: NodeId) {
        let confirmed: Vec<NodeId> = find_for_received_in_order(ctx, invocation)
            .into_iter()
            .map(|node| actual_substitution_node(ctx, node))
            .collect();
        self.lock().in_order_paired.extend(confirmed);
    }

    /// Once-per-compilation finalization: reports every pending matcher whose
    /// enclosing expression was never confirmed.
    pub(crate) fn finish(self, ctx: &AnalysisContext<'_>) {
        let state = self
            .state
            .into_inner()
            .expect("matcher tracker lock poisoned");

        for (enclosing, matchers) in state.pending {
            if state.when_paired.contains(&enclosing)
                || state.in_order_paired.contains(&enclosing)
            {
                continue;
            }
            for matcher in matchers {
                emit(
                    ctx,
                    DiagnosticId::ArgumentMatcherUsedOutsideOfCall,
                    "Argument matcher used outside of a call to a configured or asserted substitute member.".into(),
                    matcher.span,
                    matcher.member_id.as_deref(),
                );
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().expect("matcher tracker lock poisoned")
    }
}

/// Whether `enclosing` is immediately consumed by a setup invocation —
/// either as the receiver of a reduced extension call
/// (`sub.Bar(…).Returns(…)`) or as an argument of the ordinary static form
/// (`SubstituteExtensions.Returns(sub.Bar(…), …)`).
fn is_followed_by_setup_invocation(ctx: &AnalysisContext<'_>, enclosing: NodeId) -> bool {
    let Some(parent) = ctx.tree.parent(enclosing) else {
        return false;
    };
    let wrapping_invocation = match ctx.tree.kind(parent) {
        SyntaxKind::MemberAccess => ctx
            .tree
            .parent(parent)
            .filter(|&gp| ctx.tree.kind(gp) == SyntaxKind::Invocation),
        SyntaxKind::Argument => ctx
            .tree
            .parent(parent)
            .filter(|&list| ctx.tree.kind(list) == SyntaxKind::ArgumentList)
            .and_then(|list| ctx.tree.parent(list))
            .filter(|&inv| ctx.tree.kind(inv) == SyntaxKind::Invocation),
        _ => None,
    };
    wrapping_invocation
        .and_then(|inv| ctx.semantics.resolve(inv))
        .is_some_and(|s| s.is_setup_like())
}

/// Whether `enclosing`'s own receiver chain starts with a received
/// assertion (`sub.Received().Bar(…)`, `sub.Received()[…]`).
fn is_preceded_by_received_invocation(ctx: &AnalysisContext<'_>, enclosing: NodeId) -> bool {
    let receiver = match ctx.tree.kind(enclosing) {
        SyntaxKind::Invocation => ctx
            .tree
            .invocation_callee(enclosing)
            .filter(|&c| ctx.tree.kind(c) == SyntaxKind::MemberAccess)
            .and_then(|c| ctx.tree.member_access_receiver(c)),
        SyntaxKind::ElementAccess => ctx.tree.element_access_receiver(enclosing),
        _ => None,
    };
    receiver
        .filter(|&r| ctx.tree.kind(r) == SyntaxKind::Invocation)
        .and_then(|r| ctx.semantics.resolve(r))
        .is_some_and(|s| s.is_received_like())
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

    struct Scenario {
        tree: SyntaxTree,
        model: FakeSemanticModel,
    }

    impl Scenario {
        fn run(self, drive: impl FnOnce(&AnalysisContext<'_>, &MatcherTracker)) -> Vec<Diagnostic> {
            let compilation = Compilation::new(self.tree);
            let sink = DiagnosticCollector::new();
            let ctx = AnalysisContext::new(&compilation, &self.model, &sink);
            let tracker = MatcherTracker::new();
            drive(&ctx, &tracker);
            tracker.finish(&ctx);
            sink.into_diagnostics()
        }
    }

    /// Builds `sub.Bar(Arg.Any<int>())` and returns the matcher and the
    /// enclosing call.
    fn build_matcher_call(b: &mut TreeBuilder, matcher_span: Span) -> (NodeId, NodeId) {
        let arg = b.identifier("Arg", span());
        let any = b.member_access(arg, "Any", span());
        let matcher = b.invocation(any, vec![], matcher_span);

        let sub = b.identifier("sub", span());
        let bar = b.member_access(sub, "Bar", span());
        let call = b.invocation(bar, vec![matcher], span());
        (matcher, call)
    }

    #[test]
    fn bare_matcher_argument_is_reported_at_the_matcher() {
        let mut b = TreeBuilder::new();
        let (matcher, call) = build_matcher_call(&mut b, Span::new(10, 25));
        let root = b.compilation_unit(vec![call], span());
        let tree = b.finish(root);

        let model = FakeSemanticModel::new();
        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
        });

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].id,
            DiagnosticId::ArgumentMatcherUsedOutsideOfCall
        );
        assert_eq!(diagnostics[0].span, Span::new(10, 25));
    }

    #[test]
    fn matcher_followed_by_setup_is_not_reported() {
        let mut b = TreeBuilder::new();
        let (matcher, call) = build_matcher_call(&mut b, span());
        let returns_access = b.member_access(call, "Returns", span());
        let value = b.numeric_literal(1, span());
        let returns_call = b.invocation(returns_access, vec![value], span());
        let root = b.compilation_unit(vec![returns_call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(returns_call, library::returns());

        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
        });
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn matcher_in_ordinary_setup_argument_is_not_reported() {
        // SubstituteExtensions.Returns(sub.Bar(Arg.Any<int>()), 1)
        let mut b = TreeBuilder::new();
        let (matcher, call) = build_matcher_call(&mut b, span());
        let extensions = b.identifier("SubstituteExtensions", span());
        let returns_access = b.member_access(extensions, "Returns", span());
        let value = b.numeric_literal(1, span());
        let returns_call = b.invocation(returns_access, vec![call, value], span());
        let root = b.compilation_unit(vec![returns_call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(returns_call, library::returns_ordinary());

        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
        });
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn matcher_preceded_by_received_is_not_reported() {
        // sub.Received().Bar(Arg.Any<int>())
        let mut b = TreeBuilder::new();
        let arg = b.identifier("Arg", span());
        let any = b.member_access(arg, "Any", span());
        let matcher = b.invocation(any, vec![], span());

        let sub = b.identifier("sub", span());
        let received_access = b.member_access(sub, "Received", span());
        let received_call = b.invocation(received_access, vec![], span());
        let bar = b.member_access(received_call, "Bar", span());
        let call = b.invocation(bar, vec![matcher], span());
        let root = b.compilation_unit(vec![call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(received_call, library::received());

        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
        });
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn when_pairing_wins_regardless_of_visit_order() {
        // sub.When(x => x.Bar(Arg.Any<int>()))
        let mut b = TreeBuilder::new();
        let (matcher, bar_call) = build_matcher_call(&mut b, span());
        let callback = b.lambda(vec![bar_call], span());
        let sub = b.identifier("sub", span());
        let when_access = b.member_access(sub, "When", span());
        let when_call = b.invocation(when_access, vec![callback], span());
        let root = b.compilation_unit(vec![when_call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(when_call, library::when_configurator());

        // Matcher first, when-configurator second.
        let diagnostics = Scenario {
            tree: tree.clone(),
            model,
        }
        .run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
            tracker.record_when(ctx, when_call, &library::when_configurator());
        });
        assert!(diagnostics.is_empty());

        // Reverse visit order must not change the outcome.
        let mut model = FakeSemanticModel::new();
        model.set_symbol(when_call, library::when_configurator());
        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_when(ctx, when_call, &library::when_configurator());
            tracker.record_matcher(ctx, matcher);
        });
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn in_order_pairing_confirms_enclosing_calls() {
        // Received.InOrder(() => { sub.Bar(Arg.Any<int>()); })
        let mut b = TreeBuilder::new();
        let (matcher, bar_call) = build_matcher_call(&mut b, span());
        let callback = b.lambda(vec![bar_call], span());
        let received = b.identifier("Received", span());
        let in_order_access = b.member_access(received, "InOrder", span());
        let in_order_call = b.invocation(in_order_access, vec![callback], span());
        let root = b.compilation_unit(vec![in_order_call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        model.set_symbol(in_order_call, library::in_order());

        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
            tracker.record_in_order(ctx, in_order_call);
        });
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn multiple_matchers_report_in_recorded_order() {
        let mut b = TreeBuilder::new();
        let arg1 = b.identifier("Arg", span());
        let any1 = b.member_access(arg1, "Any", span());
        let matcher1 = b.invocation(any1, vec![], Span::new(10, 20));

        let arg2 = b.identifier("Arg", span());
        let is2 = b.member_access(arg2, "Is", span());
        let matcher2 = b.invocation(is2, vec![], Span::new(30, 40));

        let sub = b.identifier("sub", span());
        let bar = b.member_access(sub, "Bar", span());
        let call = b.invocation(bar, vec![matcher1, matcher2], span());
        let root = b.compilation_unit(vec![call], span());
        let tree = b.finish(root);

        let model = FakeSemanticModel::new();
        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher1);
            tracker.record_matcher(ctx, matcher2);
        });

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].span, Span::new(10, 20));
        assert_eq!(diagnostics[1].span, Span::new(30, 40));
    }

    #[test]
    fn unsupported_matcher_position_is_silently_ignored() {
        // var m = Arg.Any<int>();
        let mut b = TreeBuilder::new();
        let arg = b.identifier("Arg", span());
        let any = b.member_access(arg, "Any", span());
        let matcher = b.invocation(any, vec![], span());
        let local = b.identifier("m", span());
        let assignment = b.assignment(local, matcher, span());
        let root = b.compilation_unit(vec![assignment], span());
        let tree = b.finish(root);

        let model = FakeSemanticModel::new();
        let diagnostics = Scenario { tree, model }.run(|ctx, tracker| {
            tracker.record_matcher(ctx, matcher);
        });
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn suppressed_member_reports_nothing() {
        let mut b = TreeBuilder::new();
        let (matcher, call) = build_matcher_call(&mut b, span());
        let root = b.compilation_unit(vec![call], span());
        let tree = b.finish(root);

        let mut model = FakeSemanticModel::new();
        let bar = Symbol::method("Bar", "Tests.IFoo", "Tests");
        model.set_symbol(call, bar);

        let mut compilation = Compilation::new(tree);
        compilation.suppressions.suppress(
            "Tests.IFoo.Bar",
            DiagnosticId::ArgumentMatcherUsedOutsideOfCall,
        );
        let sink = DiagnosticCollector::new();
        let ctx = AnalysisContext::new(&compilation, &model, &sink);
        let tracker = MatcherTracker::new();
        tracker.record_matcher(&ctx, matcher);
        tracker.finish(&ctx);

        assert!(sink.into_diagnostics().is_empty());
    }

    #[test]
    fn concurrent_recording_is_safe() {
        let mut b = TreeBuilder::new();
        let mut matchers = Vec::new();
        let mut calls = Vec::new();
        for i in 0..16u32 {
            let arg = b.identifier("Arg", span());
            let any = b.member_access(arg, "Any", span());
            let matcher = b.invocation(any, vec![], Span::new(i * 10, i * 10 + 5));
            let sub = b.identifier("sub", span());
            let bar = b.member_access(sub, "Bar", span());
            let call = b.invocation(bar, vec![matcher], span());
            matchers.push(matcher);
            calls.push(call);
        }
        let root = b.compilation_unit(calls, span());
        let tree = b.finish(root);

        let compilation = Compilation::new(tree);
        let model = FakeSemanticModel::new();
        let sink = DiagnosticCollector::new();
        let ctx = AnalysisContext::new(&compilation, &model, &sink);
        let tracker = MatcherTracker::new();

        std::thread::scope(|scope| {
            for &matcher in &matchers {
                let ctx = &ctx;
                let tracker = &tracker;
                scope.spawn(move || tracker.record_matcher(ctx, matcher));
            }
        });
        tracker.finish(&ctx);

        assert_eq!(sink.into_diagnostics().len(), 16);
    }
}
