// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The normalized syntax tree.
//!
//! Front-end adapters lower their concrete parse trees into this arena-backed
//! representation; the analysis engine never sees front-end node types. The
//! node vocabulary is deliberately small: it covers exactly the expression
//! shapes the misuse analyses inspect (calls, member and element accesses,
//! callbacks, casts, assignments, awaits, literals) and nothing else. An
//! adapter maps any other syntax onto its children or leaves it out; the
//! engine treats unknown surroundings as "not applicable".
//!
//! Trees are built bottom-up with [`TreeBuilder`] and immutable afterwards.
//! Nodes are addressed by [`NodeId`], which doubles as the correlation key
//! the misuse tracker uses across node visits.

use crate::symbol_model::TypeRef;
use crate::syntax_model::Span;
use ecow::EcoString;

/// The syntactic kind of a normalized node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// The single root; translation units hang beneath it.
    CompilationUnit,
    /// A call: `callee(args)`. Children: callee, [`SyntaxKind::ArgumentList`].
    Invocation,
    /// `receiver.Name`. Child: receiver; the member name is a payload.
    MemberAccess,
    /// `receiver[args]`. Children: receiver, [`SyntaxKind::BracketedArgumentList`].
    ElementAccess,
    /// Wrapper around a single argument expression.
    Argument,
    /// Parenthesized argument list of an invocation.
    ArgumentList,
    /// Bracketed argument list of an element access.
    BracketedArgumentList,
    /// An inline callback; children are the body expressions in order.
    Lambda,
    /// `target = value`. Children: target, value.
    Assignment,
    /// A conversion that yields null on failure (`expr as T`). Child: operand.
    SafeCast,
    /// A conversion that throws on failure (`(T)expr`). Child: operand.
    UnsafeCast,
    /// `await expr`. Child: operand.
    Await,
    /// A bare name, including bare method references.
    Identifier,
    /// Numeric literal; the value rides as a payload.
    NumericLiteral,
    /// Character literal.
    CharacterLiteral,
    /// String literal.
    StringLiteral,
    /// `true`.
    TrueLiteral,
    /// `false`.
    FalseLiteral,
}

impl SyntaxKind {
    /// Whether this kind is a compile-time literal.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::NumericLiteral
                | Self::CharacterLiteral
                | Self::StringLiteral
                | Self::TrueLiteral
                | Self::FalseLiteral
        )
    }
}

/// Index of a node within its [`SyntaxTree`].
///
/// Ids are dense and stable for the lifetime of the tree, so they serve as
/// map/set keys for cross-node correlation within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Member/identifier name, or literal source text.
    name: Option<EcoString>,
    /// Value of a numeric literal, when it is an integer.
    int_value: Option<i64>,
    /// Target type of a cast node.
    cast_type: Option<TypeRef>,
}

/// An immutable normalized syntax tree for one compilation.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    /// The root node (always [`SyntaxKind::CompilationUnit`] in adapter-built
    /// trees, but the engine does not rely on that).
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty. Built trees always have a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids, in allocation order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "trees with more than u32::MAX nodes are not supported"
    )]
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// The kind of `node`.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self.nodes[node.index()].kind
    }

    /// The source span of `node`.
    #[must_use]
    pub fn span(&self, node: NodeId) -> Span {
        self.nodes[node.index()].span
    }

    /// The parent of `node`, if it is not the root.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    /// The ordered children of `node`.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    /// Walks from the parent of `node` up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&n| self.parent(n))
    }

    /// Member or identifier name, or literal source text.
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<&EcoString> {
        self.nodes[node.index()].name.as_ref()
    }

    /// Integer value of a numeric literal node.
    #[must_use]
    pub fn int_value(&self, node: NodeId) -> Option<i64> {
        self.nodes[node.index()].int_value
    }

    /// Target type of a [`SyntaxKind::SafeCast`] or [`SyntaxKind::UnsafeCast`].
    #[must_use]
    pub fn cast_target(&self, node: NodeId) -> Option<&TypeRef> {
        self.nodes[node.index()].cast_type.as_ref()
    }

    /// Best-effort display text for diagnostics about `node`: the member or
    /// identifier name, the literal text, or a kind-derived placeholder.
    #[must_use]
    pub fn display_name(&self, node: NodeId) -> EcoString {
        if let Some(name) = self.name(node) {
            return name.clone();
        }
        match self.kind(node) {
            SyntaxKind::TrueLiteral => "true".into(),
            SyntaxKind::FalseLiteral => "false".into(),
            SyntaxKind::Invocation => self
                .invocation_callee(node)
                .map_or_else(|| "<call>".into(), |c| self.display_name(c)),
            _ => "<expression>".into(),
        }
    }

    // ── Shape accessors ───────────────────────────────────────────────────

    /// The callee expression of an invocation.
    #[must_use]
    pub fn invocation_callee(&self, node: NodeId) -> Option<NodeId> {
        if self.kind(node) != SyntaxKind::Invocation {
            return None;
        }
        self.children(node).first().copied()
    }

    /// The unwrapped argument expressions of an invocation, in order.
    #[must_use]
    pub fn invocation_arguments(&self, node: NodeId) -> Vec<NodeId> {
        if self.kind(node) != SyntaxKind::Invocation {
            return Vec::new();
        }
        self.children(node)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == SyntaxKind::ArgumentList)
            .map(|list| self.unwrap_arguments(list))
            .unwrap_or_default()
    }

    /// The receiver expression of an element access.
    #[must_use]
    pub fn element_access_receiver(&self, node: NodeId) -> Option<NodeId> {
        if self.kind(node) != SyntaxKind::ElementAccess {
            return None;
        }
        self.children(node).first().copied()
    }

    /// The unwrapped index expressions of an element access, in order.
    #[must_use]
    pub fn element_access_arguments(&self, node: NodeId) -> Vec<NodeId> {
        if self.kind(node) != SyntaxKind::ElementAccess {
            return Vec::new();
        }
        self.children(node)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == SyntaxKind::BracketedArgumentList)
            .map(|list| self.unwrap_arguments(list))
            .unwrap_or_default()
    }

    fn unwrap_arguments(&self, list: NodeId) -> Vec<NodeId> {
        self.children(list)
            .iter()
            .filter_map(|&arg| {
                if self.kind(arg) == SyntaxKind::Argument {
                    self.children(arg).first().copied()
                } else {
                    Some(arg)
                }
            })
            .collect()
    }

    /// The receiver expression of a member access.
    #[must_use]
    pub fn member_access_receiver(&self, node: NodeId) -> Option<NodeId> {
        if self.kind(node) != SyntaxKind::MemberAccess {
            return None;
        }
        self.children(node).first().copied()
    }

    /// The body expressions of a lambda, in order.
    #[must_use]
    pub fn lambda_body(&self, node: NodeId) -> &[NodeId] {
        if self.kind(node) == SyntaxKind::Lambda {
            self.children(node)
        } else {
            &[]
        }
    }

    /// The `(target, value)` pair of an assignment.
    #[must_use]
    pub fn assignment_parts(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        if self.kind(node) != SyntaxKind::Assignment {
            return None;
        }
        match self.children(node) {
            [target, value] => Some((*target, *value)),
            _ => None,
        }
    }

    /// The operand of a cast or await node.
    #[must_use]
    pub fn unary_operand(&self, node: NodeId) -> Option<NodeId> {
        match self.kind(node) {
            SyntaxKind::SafeCast | SyntaxKind::UnsafeCast | SyntaxKind::Await => {
                self.children(node).first().copied()
            }
            _ => None,
        }
    }

    /// Whether `node` is the callee position of an invocation.
    #[must_use]
    pub fn is_invocation_callee(&self, node: NodeId) -> bool {
        self.parent(node).is_some_and(|p| {
            self.kind(p) == SyntaxKind::Invocation && self.invocation_callee(p) == Some(node)
        })
    }
}

/// Bottom-up builder for [`SyntaxTree`].
///
/// Leaves are created first, then wrapped by their parents; `finish` seals
/// the tree. Argument wrapping (`Argument` / `ArgumentList`) is inserted by
/// the invocation and element-access constructors, so adapters only supply
/// the argument expressions.
///
/// # Panics
///
/// Builder methods panic when a node is attached to two parents and when
/// `finish` is handed a non-root node; both are adapter bugs, not
/// recoverable states.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: SyntaxKind, span: Span, children: Vec<NodeId>) -> NodeId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "trees with more than u32::MAX nodes are not supported"
        )]
        let id = NodeId(self.nodes.len() as u32);
        for &child in &children {
            let data = &mut self.nodes[child.index()];
            assert!(
                data.parent.is_none(),
                "node attached to a second parent: {child:?}"
            );
            data.parent = Some(id);
        }
        self.nodes.push(NodeData {
            kind,
            span,
            parent: None,
            children,
            name: None,
            int_value: None,
            cast_type: None,
        });
        id
    }

    /// A bare identifier.
    pub fn identifier(&mut self, name: impl Into<EcoString>, span: Span) -> NodeId {
        let id = self.push(SyntaxKind::Identifier, span, Vec::new());
        self.nodes[id.index()].name = Some(name.into());
        id
    }

    /// `receiver.name`.
    pub fn member_access(
        &mut self,
        receiver: NodeId,
        name: impl Into<EcoString>,
        span: Span,
    ) -> NodeId {
        let id = self.push(SyntaxKind::MemberAccess, span, vec![receiver]);
        self.nodes[id.index()].name = Some(name.into());
        id
    }

    /// `callee(args)` — each argument expression is wrapped in an `Argument`
    /// node under a single `ArgumentList`.
    pub fn invocation(&mut self, callee: NodeId, args: Vec<NodeId>, span: Span) -> NodeId {
        let list = self.argument_list(SyntaxKind::ArgumentList, args, span);
        self.push(SyntaxKind::Invocation, span, vec![callee, list])
    }

    /// `receiver[args]`.
    pub fn element_access(&mut self, receiver: NodeId, args: Vec<NodeId>, span: Span) -> NodeId {
        let list = self.argument_list(SyntaxKind::BracketedArgumentList, args, span);
        self.push(SyntaxKind::ElementAccess, span, vec![receiver, list])
    }

    fn argument_list(&mut self, kind: SyntaxKind, args: Vec<NodeId>, span: Span) -> NodeId {
        let wrapped = args
            .into_iter()
            .map(|arg| {
                let arg_span = self.nodes[arg.index()].span;
                self.push(SyntaxKind::Argument, arg_span, vec![arg])
            })
            .collect();
        self.push(kind, span, wrapped)
    }

    /// An inline callback with the given body expressions.
    pub fn lambda(&mut self, body: Vec<NodeId>, span: Span) -> NodeId {
        self.push(SyntaxKind::Lambda, span, body)
    }

    /// `target = value`.
    pub fn assignment(&mut self, target: NodeId, value: NodeId, span: Span) -> NodeId {
        self.push(SyntaxKind::Assignment, span, vec![target, value])
    }

    /// `operand as ty`.
    pub fn safe_cast(&mut self, operand: NodeId, ty: TypeRef, span: Span) -> NodeId {
        let id = self.push(SyntaxKind::SafeCast, span, vec![operand]);
        self.nodes[id.index()].cast_type = Some(ty);
        id
    }

    /// `(ty)operand`.
    pub fn unsafe_cast(&mut self, operand: NodeId, ty: TypeRef, span: Span) -> NodeId {
        let id = self.push(SyntaxKind::UnsafeCast, span, vec![operand]);
        self.nodes[id.index()].cast_type = Some(ty);
        id
    }

    /// `await operand`.
    pub fn await_expression(&mut self, operand: NodeId, span: Span) -> NodeId {
        self.push(SyntaxKind::Await, span, vec![operand])
    }

    /// An integer literal.
    pub fn numeric_literal(&mut self, value: i64, span: Span) -> NodeId {
        let id = self.push(SyntaxKind::NumericLiteral, span, Vec::new());
        self.nodes[id.index()].int_value = Some(value);
        self.nodes[id.index()].name = Some(value.to_string().into());
        id
    }

    /// A string literal with its source text.
    pub fn string_literal(&mut self, text: impl Into<EcoString>, span: Span) -> NodeId {
        let id = self.push(SyntaxKind::StringLiteral, span, Vec::new());
        self.nodes[id.index()].name = Some(text.into());
        id
    }

    /// A character literal.
    pub fn char_literal(&mut self, c: char, span: Span) -> NodeId {
        let id = self.push(SyntaxKind::CharacterLiteral, span, Vec::new());
        let mut text = EcoString::new();
        text.push(c);
        self.nodes[id.index()].name = Some(text);
        id
    }

    /// `true` or `false`.
    pub fn bool_literal(&mut self, value: bool, span: Span) -> NodeId {
        let kind = if value {
            SyntaxKind::TrueLiteral
        } else {
            SyntaxKind::FalseLiteral
        };
        self.push(kind, span, Vec::new())
    }

    /// A compilation-unit root over the given top-level expressions.
    pub fn compilation_unit(&mut self, children: Vec<NodeId>, span: Span) -> NodeId {
        self.push(SyntaxKind::CompilationUnit, span, children)
    }

    /// Seals the tree with `root` at the top.
    #[must_use]
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        assert!(
            self.nodes[root.index()].parent.is_none(),
            "finish called with a non-root node"
        );
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}
