// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Subcheck analysis engine.
//!
//! This crate contains the host-neutral core of the analysis:
//! - Normalized syntax and symbol models (adapter-built, engine-consumed)
//! - Semantic classification of calls against the mock library's API
//! - The misuse analyses: matcher tracking, interceptability,
//!   call-info validation, awaited-when detection
//!
//! Hosts drive the engine through [`analysis::CompilationAnalysis`] (or the
//! one-shot [`analysis::analyze`]) and receive diagnostics through their
//! [`analysis_host::DiagnosticSink`].

#![doc = include_str!("../../../README.md")]

pub mod analysis;
pub mod analysis_host;
pub mod diagnostics;
pub mod suppression;
pub mod symbol_model;
pub mod syntax_model;

mod tree_walker;

#[cfg(test)]
pub(crate) mod test_support;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::analysis::{CompilationAnalysis, analyze};
    pub use crate::analysis_host::{
        AnalysisContext, Compilation, DiagnosticCollector, DiagnosticSink, SemanticModel,
    };
    pub use crate::diagnostics::{Diagnostic, DiagnosticId, Severity};
    pub use crate::suppression::SuppressionSet;
    pub use crate::symbol_model::{AssemblyRef, LibraryVersion, Symbol};
    pub use crate::syntax_model::{NodeId, Span, SyntaxTree, TreeBuilder};
}
