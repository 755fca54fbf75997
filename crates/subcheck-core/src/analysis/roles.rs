// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Classification of resolved symbols against the mock library's API surface.
//!
//! The registry is closed: a fixed list of member names, each valid only
//! under specific containing types inside the library's own assembly. A
//! user-defined method that happens to be called `Returns` classifies as
//! [`SemanticRole::Unclassified`] because its containing type and assembly
//! do not match — that check is what keeps every downstream analysis free of
//! false positives on unrelated code.
//!
//! Assembly and containing-type comparisons are case-insensitive; member
//! name comparison is exact.

use crate::symbol_model::Symbol;

/// The library assembly all classified members must live in.
pub const LIBRARY_ASSEMBLY: &str = "NSubstitute";

/// Containing type of the argument-matcher factories.
pub const ARG_TYPE: &str = "NSubstitute.Arg";

/// Compatibility-shim surface for the matcher factories.
pub const ARG_COMPAT_TYPE: &str = "NSubstitute.Arg.Compat";

/// Containing type of the substitute extension methods.
pub const SUBSTITUTE_EXTENSIONS_TYPE: &str = "NSubstitute.SubstituteExtensions";

/// Containing type of the exception-throwing setup extensions.
pub const EXCEPTION_EXTENSIONS_TYPE: &str = "NSubstitute.ExceptionExtensions.ExceptionExtensions";

/// Containing type of the in-order assertion entry point.
pub const RECEIVED_TYPE: &str = "NSubstitute.Received";

/// The call-info type passed into setup callbacks.
pub const CALL_INFO_TYPE: &str = "NSubstitute.Core.CallInfo";

/// The semantic role a resolved symbol plays in the library's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticRole {
    /// Argument-matcher factory (`Arg.Any`, `Arg.Is`).
    ArgMatcher,
    /// Return/throw configuration of a prior call.
    Setup,
    /// Assertion that a call did or did not happen.
    ReceivedAssertion,
    /// Associates a callback with a described call pattern.
    WhenConfigurator,
    /// Ordered received assertion over a callback.
    InOrderAssertion,
    /// Accessor on the call-info object inside a callback.
    CallInfoAccessor,
    /// Anything else.
    Unclassified,
}

/// One registry row: member name, allowed containing types, role.
struct Registration {
    name: &'static str,
    containing_types: &'static [&'static str],
    role: SemanticRole,
}

const REGISTRY: &[Registration] = &[
    // Argument-matcher factories; both live on the main and the compat surface.
    Registration {
        name: "Any",
        containing_types: &[ARG_TYPE, ARG_COMPAT_TYPE],
        role: SemanticRole::ArgMatcher,
    },
    Registration {
        name: "Is",
        containing_types: &[ARG_TYPE, ARG_COMPAT_TYPE],
        role: SemanticRole::ArgMatcher,
    },
    // Return-configuring setups.
    Registration {
        name: "Returns",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::Setup,
    },
    Registration {
        name: "ReturnsForAnyArgs",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::Setup,
    },
    // Throw-configuring setups.
    Registration {
        name: "Throws",
        containing_types: &[EXCEPTION_EXTENSIONS_TYPE],
        role: SemanticRole::Setup,
    },
    Registration {
        name: "ThrowsForAnyArgs",
        containing_types: &[EXCEPTION_EXTENSIONS_TYPE],
        role: SemanticRole::Setup,
    },
    Registration {
        name: "ThrowsAsync",
        containing_types: &[EXCEPTION_EXTENSIONS_TYPE],
        role: SemanticRole::Setup,
    },
    Registration {
        name: "ThrowsAsyncForAnyArgs",
        containing_types: &[EXCEPTION_EXTENSIONS_TYPE],
        role: SemanticRole::Setup,
    },
    // Received assertions.
    Registration {
        name: "Received",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::ReceivedAssertion,
    },
    Registration {
        name: "DidNotReceive",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::ReceivedAssertion,
    },
    Registration {
        name: "ReceivedWithAnyArgs",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::ReceivedAssertion,
    },
    Registration {
        name: "DidNotReceiveWithAnyArgs",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::ReceivedAssertion,
    },
    // When-configurators.
    Registration {
        name: "When",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::WhenConfigurator,
    },
    Registration {
        name: "WhenForAnyArgs",
        containing_types: &[SUBSTITUTE_EXTENSIONS_TYPE],
        role: SemanticRole::WhenConfigurator,
    },
    // In-order assertion.
    Registration {
        name: "InOrder",
        containing_types: &[RECEIVED_TYPE],
        role: SemanticRole::InOrderAssertion,
    },
    // Call-info accessors.
    Registration {
        name: "Arg",
        containing_types: &[CALL_INFO_TYPE],
        role: SemanticRole::CallInfoAccessor,
    },
    Registration {
        name: "ArgAt",
        containing_types: &[CALL_INFO_TYPE],
        role: SemanticRole::CallInfoAccessor,
    },
    Registration {
        name: "ArgTypes",
        containing_types: &[CALL_INFO_TYPE],
        role: SemanticRole::CallInfoAccessor,
    },
    Registration {
        name: "Args",
        containing_types: &[CALL_INFO_TYPE],
        role: SemanticRole::CallInfoAccessor,
    },
];

/// Classifies a resolved symbol. Pure; safe to call from concurrent visits.
#[must_use]
pub fn classify(symbol: &Symbol) -> SemanticRole {
    if !symbol
        .containing_assembly
        .eq_ignore_ascii_case(LIBRARY_ASSEMBLY)
    {
        return SemanticRole::Unclassified;
    }
    for registration in REGISTRY {
        if registration.name == symbol.name
            && registration
                .containing_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&symbol.containing_type))
        {
            return registration.role;
        }
    }
    SemanticRole::Unclassified
}

/// Role predicates on [`Symbol`], shared by every analysis.
pub trait SymbolRoles {
    /// The symbol's [`SemanticRole`].
    fn role(&self) -> SemanticRole;

    /// Matcher factory?
    fn is_arg_matcher(&self) -> bool {
        self.role() == SemanticRole::ArgMatcher
    }

    /// Return- or throw-configuring setup?
    fn is_setup_like(&self) -> bool {
        self.role() == SemanticRole::Setup
    }

    /// Received-style assertion?
    fn is_received_like(&self) -> bool {
        self.role() == SemanticRole::ReceivedAssertion
    }

    /// When-configurator?
    fn is_when_like(&self) -> bool {
        self.role() == SemanticRole::WhenConfigurator
    }

    /// In-order assertion?
    fn is_received_in_order(&self) -> bool {
        self.role() == SemanticRole::InOrderAssertion
    }

    /// Call-info accessor?
    fn is_call_info_accessor(&self) -> bool {
        self.role() == SemanticRole::CallInfoAccessor
    }
}

impl SymbolRoles for Symbol {
    fn role(&self) -> SemanticRole {
        classify(self)
    }
}
