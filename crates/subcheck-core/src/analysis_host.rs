// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The boundary with the host analysis framework.
//!
//! The engine is embedded: a compiler front end owns parsing and symbol
//! resolution and drives node visits, possibly in parallel. Everything it
//! must provide is captured by two traits — [`SemanticModel`] for
//! symbol/type queries and [`DiagnosticSink`] for reporting — plus the
//! per-compilation facts in [`Compilation`]. [`AnalysisContext`] bundles the
//! borrowed pieces a single visit needs.
//!
//! Nothing here performs I/O, blocks, or retains state across visits; both
//! traits must be safe to call from concurrent node-visit callbacks.

use crate::diagnostics::Diagnostic;
use crate::suppression::SuppressionSet;
use crate::symbol_model::{AssemblyRef, Symbol, TypeRef};
use crate::syntax_model::{NodeId, SyntaxTree};
use std::sync::Mutex;

/// Symbol and type queries answered by the host compiler.
///
/// Queries are best-effort: `None` anywhere means "the host could not
/// resolve this", which the analyses treat as not applicable and skip
/// silently. A resolution failure never aborts a compilation-wide scan.
pub trait SemanticModel: Sync {
    /// Resolves a node to at most one symbol.
    fn resolve(&self, node: NodeId) -> Option<Symbol>;

    /// The static type of an expression node.
    fn type_of(&self, node: NodeId) -> Option<TypeRef>;

    /// If `ty` is a delegate type, its parameter types in order.
    fn delegate_parameters(&self, ty: &TypeRef) -> Option<Vec<TypeRef>>;

    /// The body of `symbol`'s declaration, when it is declared in this
    /// compilation. This is the engine's single interprocedural hop: bodies
    /// returned here are scanned, references inside them are not followed.
    fn method_body(&self, symbol: &Symbol) -> Option<NodeId>;

    /// Whether a value of type `source` is assignable to `target`.
    ///
    /// Defaults to type equality; hosts with conversion info can widen it.
    fn is_assignable(&self, source: &TypeRef, target: &TypeRef) -> bool {
        source == target
    }

    /// Whether `assembly` declares an internals-visibility grant for
    /// `grantee`.
    fn internals_visible_to(&self, assembly: &str, grantee: &str) -> bool {
        let _ = (assembly, grantee);
        false
    }
}

/// Receives diagnostics as the analyses produce them.
///
/// Called from arbitrarily many concurrent node visits; implementations
/// synchronize internally.
pub trait DiagnosticSink: Sync {
    /// Reports one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// A mutex-backed [`DiagnosticSink`] that collects into a `Vec`.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    collected: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the collector and returns everything reported so far.
    ///
    /// # Panics
    ///
    /// Panics if a reporting thread panicked while holding the lock.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.collected
            .into_inner()
            .expect("diagnostic collector lock poisoned")
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&self, diagnostic: Diagnostic) {
        self.collected
            .lock()
            .expect("diagnostic collector lock poisoned")
            .push(diagnostic);
    }
}

/// Per-compilation facts the host supplies once, before any node visit.
#[derive(Debug)]
pub struct Compilation {
    /// The normalized syntax tree for this compilation.
    pub tree: SyntaxTree,
    /// Referenced assemblies with their declared versions.
    pub referenced_assemblies: Vec<AssemblyRef>,
    /// Externally loaded suppressions.
    pub suppressions: SuppressionSet,
}

impl Compilation {
    /// A compilation over `tree` with no references and no suppressions.
    #[must_use]
    pub fn new(tree: SyntaxTree) -> Self {
        Self {
            tree,
            referenced_assemblies: Vec::new(),
            suppressions: SuppressionSet::new(),
        }
    }

    /// Sets the referenced assembly list.
    #[must_use]
    pub fn with_references(mut self, referenced_assemblies: Vec<AssemblyRef>) -> Self {
        self.referenced_assemblies = referenced_assemblies;
        self
    }

    /// Sets the suppression set.
    #[must_use]
    pub fn with_suppressions(mut self, suppressions: SuppressionSet) -> Self {
        self.suppressions = suppressions;
        self
    }
}

/// The borrowed context a single node visit runs against.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    /// The compilation's normalized tree.
    pub tree: &'a SyntaxTree,
    /// The host's symbol/type queries.
    pub semantics: &'a dyn SemanticModel,
    /// Suppressions consulted before every emission.
    pub suppressions: &'a SuppressionSet,
    /// Where diagnostics go.
    pub sink: &'a dyn DiagnosticSink,
}

impl<'a> AnalysisContext<'a> {
    /// Builds a context over a compilation and the host services.
    #[must_use]
    pub fn new(
        compilation: &'a Compilation,
        semantics: &'a dyn SemanticModel,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            tree: &compilation.tree,
            semantics,
            suppressions: &compilation.suppressions,
            sink,
        }
    }
}
