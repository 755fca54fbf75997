// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Resolved-symbol facts supplied by the host compiler.
//!
//! The engine does not reconstruct a type system. It needs just enough
//! symbol information to classify calls against the mock library's API
//! surface and to decide interceptability: name, containing type and
//! assembly, the declared parameter list, virtuality, and accessibility.
//! Hosts produce [`Symbol`] values from their own semantic model; the engine
//! treats them as immutable facts for the duration of one node visit.

use ecow::EcoString;
use miette::Diagnostic;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What sort of member a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// An ordinary or extension method.
    Method,
    /// A property getter/setter pair.
    Property,
    /// An indexer.
    Indexer,
    /// A local, parameter, or field.
    Local,
    /// Anything else the host resolved but the engine has no use for.
    Other,
}

/// How an argument is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// By value.
    Value,
    /// By reference, readable and writable.
    Ref,
    /// By reference, write-only from the callee's perspective.
    Out,
}

/// Whether a dynamic proxy can override a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Virtuality {
    /// Declared `virtual` and not sealed.
    Virtual,
    /// Declared `abstract`.
    Abstract,
    /// A member of an interface.
    InterfaceMember,
    /// An override that re-seals the member.
    SealedOverride,
    /// A plain, non-overridable member.
    NonVirtual,
    /// A static member.
    Static,
}

/// Declared accessibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Protected,
    Internal,
    Private,
}

/// A fully qualified type name.
///
/// Comparison is case-insensitive, matching how the mock library's metadata
/// names are looked up across front ends.
#[derive(Debug, Clone, Eq)]
pub struct TypeRef {
    name: EcoString,
}

impl TypeRef {
    /// Creates a type reference from a fully qualified name.
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self { name: name.into() }
    }

    /// The fully qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One declared parameter of a method or indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Zero-based position.
    pub position: usize,
    /// Declared type.
    pub ty: TypeRef,
    /// How the argument is passed.
    pub ref_kind: RefKind,
}

impl Parameter {
    /// A by-value parameter.
    #[must_use]
    pub fn new(position: usize, ty: impl Into<TypeRef>) -> Self {
        Self {
            position,
            ty: ty.into(),
            ref_kind: RefKind::Value,
        }
    }

    /// Marks the parameter as `ref` or `out`.
    #[must_use]
    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }
}

impl From<&str> for Parameter {
    /// Shorthand for tests and adapters: a by-value parameter at position 0.
    fn from(ty: &str) -> Self {
        Self::new(0, ty)
    }
}

/// A member symbol as resolved by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Simple member name.
    pub name: EcoString,
    /// Member kind.
    pub kind: SymbolKind,
    /// Fully qualified containing type.
    pub containing_type: EcoString,
    /// Containing assembly name.
    pub containing_assembly: EcoString,
    /// Declared parameters, ordered by position.
    pub parameters: Vec<Parameter>,
    /// Overridability of the member.
    pub virtuality: Virtuality,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Generic type arguments at the use site, if any.
    pub type_arguments: Vec<TypeRef>,
    /// Whether the call site used the reduced extension form, where the
    /// receiver is written before the dot instead of as the first argument.
    pub is_extension: bool,
    /// Whether the member's declared return behavior is asynchronous.
    pub is_async: bool,
}

impl Symbol {
    /// A method symbol with the given name, containing type, and assembly.
    #[must_use]
    pub fn method(
        name: impl Into<EcoString>,
        containing_type: impl Into<EcoString>,
        containing_assembly: impl Into<EcoString>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Method,
            containing_type: containing_type.into(),
            containing_assembly: containing_assembly.into(),
            parameters: Vec::new(),
            virtuality: Virtuality::NonVirtual,
            accessibility: Accessibility::Public,
            type_arguments: Vec::new(),
            is_extension: false,
            is_async: false,
        }
    }

    /// Same as [`Symbol::method`] with a different kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SymbolKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the declared parameter list, fixing up positions.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters
            .into_iter()
            .enumerate()
            .map(|(i, p)| Parameter { position: i, ..p })
            .collect();
        self
    }

    /// Sets the virtuality.
    #[must_use]
    pub fn with_virtuality(mut self, virtuality: Virtuality) -> Self {
        self.virtuality = virtuality;
        self
    }

    /// Sets the accessibility.
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Sets the use-site generic type arguments.
    #[must_use]
    pub fn with_type_arguments(mut self, type_arguments: Vec<TypeRef>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    /// Marks the symbol as a reduced extension call.
    #[must_use]
    pub fn as_extension(mut self) -> Self {
        self.is_extension = true;
        self
    }

    /// Marks the symbol as asynchronous.
    #[must_use]
    pub fn as_async(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// `ContainingType.Name`, the identity used for suppression lookups.
    #[must_use]
    pub fn qualified_name(&self) -> EcoString {
        let mut id = self.containing_type.clone();
        id.push('.');
        id.push_str(&self.name);
        id
    }
}

/// A referenced assembly with its declared version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRef {
    /// Assembly name.
    pub name: EcoString,
    /// Declared version.
    pub version: LibraryVersion,
}

impl AssemblyRef {
    /// Creates an assembly reference.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, version: LibraryVersion) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

/// A `major.minor.patch` version, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LibraryVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl LibraryVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for LibraryVersion {
    type Err = VersionParseError;

    /// Parses `"4.1.0"`-style strings. A missing patch component defaults
    /// to zero, matching how assembly metadata often omits it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut component = |name: &'static str| -> Result<u32, VersionParseError> {
            match parts.next() {
                None => Ok(0),
                Some(text) => {
                    text.parse()
                        .map_err(|_| VersionParseError::InvalidComponent {
                            component: name,
                            text: text.into(),
                        })
                }
            }
        };

        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let major = component("major")?;
        let minor = component("minor")?;
        let patch = component("patch")?;
        if parts.next().is_some() {
            return Err(VersionParseError::TooManyComponents { text: s.into() });
        }
        Ok(Self::new(major, minor, patch))
    }
}

/// Failure to parse a declared library version.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum VersionParseError {
    /// The version string was empty.
    #[error("empty version string")]
    Empty,

    /// A component was not a number.
    #[error("invalid {component} version component '{text}'")]
    InvalidComponent {
        /// Which component failed.
        component: &'static str,
        /// The offending text.
        text: EcoString,
    },

    /// More than three dotted components.
    #[error("too many version components in '{text}'")]
    TooManyComponents {
        /// The offending text.
        text: EcoString,
    },
}
