// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Externally supplied diagnostic suppressions.
//!
//! Hosts load a suppression file (format and location are their business,
//! hence the `Deserialize` derive) and hand the engine the resulting lookup.
//! The engine consults it immediately before every emission: a suppressed
//! `(member, diagnostic)` pair never reaches the sink.
//!
//! Member identities are `ContainingType.MemberName`, matching
//! [`Symbol::qualified_name`](crate::symbol_model::Symbol::qualified_name).

use crate::diagnostics::DiagnosticId;
use serde::Deserialize;
use std::collections::HashMap;

/// Fully-qualified-member → suppressed-diagnostic-ids lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SuppressionSet {
    entries: HashMap<String, Vec<String>>,
}

impl SuppressionSet {
    /// An empty set that suppresses nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a suppression for one member/diagnostic pair.
    pub fn suppress(&mut self, member_id: impl Into<String>, id: DiagnosticId) {
        self.entries
            .entry(member_id.into())
            .or_default()
            .push(id.as_str().to_owned());
    }

    /// Whether `id` is suppressed for `member_id`.
    #[must_use]
    pub fn is_suppressed(&self, member_id: &str, id: DiagnosticId) -> bool {
        self.entries
            .get(member_id)
            .is_some_and(|ids| ids.iter().any(|s| s == id.as_str()))
    }

    /// Whether the set contains no suppressions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
