// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for the analysis tests.
//!
//! Tests build real [`SyntaxTree`](crate::syntax_model::SyntaxTree)s with
//! [`TreeBuilder`](crate::syntax_model::TreeBuilder) and answer symbol
//! queries from [`FakeSemanticModel`], an in-memory [`SemanticModel`] backed
//! by plain maps. The [`library`] submodule holds constructors for the mock
//! library's own API symbols so each test states only what is specific to it.

use crate::analysis_host::SemanticModel;
use crate::symbol_model::{Symbol, TypeRef};
use crate::syntax_model::NodeId;
use std::collections::{HashMap, HashSet};

/// In-memory semantic model for tests.
#[derive(Debug, Default)]
pub(crate) struct FakeSemanticModel {
    symbols: HashMap<NodeId, Symbol>,
    types: HashMap<NodeId, TypeRef>,
    bodies: HashMap<String, NodeId>,
    delegates: HashMap<String, Vec<TypeRef>>,
    grants: HashSet<(String, String)>,
    assignable: HashSet<(String, String)>,
}

impl FakeSemanticModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Node `node` resolves to `symbol`.
    pub(crate) fn set_symbol(&mut self, node: NodeId, symbol: Symbol) {
        self.symbols.insert(node, symbol);
    }

    /// Node `node` has static type `ty`.
    pub(crate) fn set_type(&mut self, node: NodeId, ty: impl Into<TypeRef>) {
        self.types.insert(node, ty.into());
    }

    /// `symbol`'s declaration body is `body`.
    pub(crate) fn set_method_body(&mut self, symbol: &Symbol, body: NodeId) {
        self.bodies
            .insert(symbol.qualified_name().to_lowercase().to_string(), body);
    }

    /// `ty` is a delegate with the given parameter types.
    pub(crate) fn set_delegate(&mut self, ty: &str, parameters: Vec<TypeRef>) {
        self.delegates.insert(ty.to_lowercase(), parameters);
    }

    /// `assembly` grants internals visibility to `grantee`.
    pub(crate) fn grant_internals(&mut self, assembly: &str, grantee: &str) {
        self.grants
            .insert((assembly.to_lowercase(), grantee.to_lowercase()));
    }

    /// Values of type `source` are assignable to `target` (beyond equality).
    pub(crate) fn allow_assignment(&mut self, source: &str, target: &str) {
        self.assignable
            .insert((source.to_lowercase(), target.to_lowercase()));
    }
}

impl SemanticModel for FakeSemanticModel {
    fn resolve(&self, node: NodeId) -> Option<Symbol> {
        self.symbols.get(&node).cloned()
    }

    fn type_of(&self, node: NodeId) -> Option<TypeRef> {
        self.types.get(&node).cloned()
    }

    fn delegate_parameters(&self, ty: &TypeRef) -> Option<Vec<TypeRef>> {
        self.delegates.get(&ty.name().to_lowercase()).cloned()
    }

    fn method_body(&self, symbol: &Symbol) -> Option<NodeId> {
        self.bodies
            .get(symbol.qualified_name().to_lowercase().as_str())
            .copied()
    }

    fn is_assignable(&self, source: &TypeRef, target: &TypeRef) -> bool {
        source == target
            || self.assignable.contains(&(
                source.name().to_lowercase(),
                target.name().to_lowercase(),
            ))
    }

    fn internals_visible_to(&self, assembly: &str, grantee: &str) -> bool {
        self.grants
            .contains(&(assembly.to_lowercase(), grantee.to_lowercase()))
    }
}

/// Symbols of the mock library's own API surface.
pub(crate) mod library {
    use crate::analysis::roles::{
        ARG_TYPE, CALL_INFO_TYPE, LIBRARY_ASSEMBLY, RECEIVED_TYPE, SUBSTITUTE_EXTENSIONS_TYPE,
    };
    use crate::symbol_model::{Symbol, TypeRef};

    /// `Arg.Any<T>()`.
    pub(crate) fn arg_any() -> Symbol {
        Symbol::method("Any", ARG_TYPE, LIBRARY_ASSEMBLY)
    }

    /// `Returns` in the reduced extension form.
    pub(crate) fn returns() -> Symbol {
        Symbol::method("Returns", SUBSTITUTE_EXTENSIONS_TYPE, LIBRARY_ASSEMBLY).as_extension()
    }

    /// `Returns` invoked as an ordinary static method.
    pub(crate) fn returns_ordinary() -> Symbol {
        Symbol::method("Returns", SUBSTITUTE_EXTENSIONS_TYPE, LIBRARY_ASSEMBLY)
    }

    /// `When` in the reduced extension form.
    pub(crate) fn when_configurator() -> Symbol {
        Symbol::method("When", SUBSTITUTE_EXTENSIONS_TYPE, LIBRARY_ASSEMBLY).as_extension()
    }

    /// `Received()` in the reduced extension form.
    pub(crate) fn received() -> Symbol {
        Symbol::method("Received", SUBSTITUTE_EXTENSIONS_TYPE, LIBRARY_ASSEMBLY).as_extension()
    }

    /// `Received.InOrder(callback)`.
    pub(crate) fn in_order() -> Symbol {
        Symbol::method("InOrder", RECEIVED_TYPE, LIBRARY_ASSEMBLY)
    }

    /// `callInfo.ArgAt<T>(position)`.
    pub(crate) fn call_info_arg_at(ty: &str) -> Symbol {
        Symbol::method("ArgAt", CALL_INFO_TYPE, LIBRARY_ASSEMBLY)
            .with_type_arguments(vec![TypeRef::new(ty)])
    }

    /// `callInfo.Arg<T>()`.
    pub(crate) fn call_info_arg(ty: &str) -> Symbol {
        Symbol::method("Arg", CALL_INFO_TYPE, LIBRARY_ASSEMBLY)
            .with_type_arguments(vec![TypeRef::new(ty)])
    }

    /// `callInfo.ArgTypes()`.
    pub(crate) fn call_info_arg_types() -> Symbol {
        Symbol::method("ArgTypes", CALL_INFO_TYPE, LIBRARY_ASSEMBLY)
    }

    /// The indexer on the call-info type.
    pub(crate) fn call_info_indexer() -> Symbol {
        Symbol::method("this[]", CALL_INFO_TYPE, LIBRARY_ASSEMBLY)
            .with_kind(crate::symbol_model::SymbolKind::Indexer)
    }
}
