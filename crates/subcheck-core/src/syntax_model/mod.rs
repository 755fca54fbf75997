// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The normalized syntax model the engine analyzes.
//!
//! The engine never consumes a front end's concrete parse tree. A thin
//! adapter on the host side lowers whatever the compiler produced into
//! [`SyntaxTree`] — a small arena of expression-shaped nodes — and the
//! analyses work purely against that. One tree covers one compilation; the
//! tree's [`NodeId`]s are the identity the misuse tracker correlates on.
//!
//! See [`TreeBuilder`] for how adapters (and tests) assemble trees.

mod span;
mod tree;

pub use span::Span;
pub use tree::{NodeId, SyntaxKind, SyntaxTree, TreeBuilder};
