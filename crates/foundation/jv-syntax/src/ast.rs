//! Arena-backed syntax tree shared by every module of one analysis run

use crate::{LiteralValue, NodeKind, PropertyKind};
use jv_intern::{Interner, Symbol};
use jv_span::{FileId, FileSpan, Span};
use la_arena::{Arena, Idx};
use std::iter;

/// Handle to a node in an [`Ast`]
pub type NodeId = Idx<Node>;

/// Handle to a shared object property list
pub type PropertyListId = Idx<PropertyList>;

/// Upper bound on known-value chain length before it is treated as cyclic
pub const MAX_VALUE_CHAIN: usize = 1024;

/// A syntax node with its resolution state
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Kind and syntactic children
    pub kind: NodeKind,
    /// Source location
    pub span: FileSpan,
    /// Known value: the node this expression statically evaluates to.
    /// For properties this is the property's value expression.
    pub value: Option<NodeId>,
    /// Shared property list of the object value
    pub properties: Option<PropertyListId>,
}

/// Append-only list of `Property` nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyList {
    /// Properties in insertion order
    pub items: Vec<NodeId>,
}

/// Syntax tree storage
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Arena<Node>,
    property_lists: Arena<PropertyList>,
    interner: Interner,
}

impl Ast {
    /// Creates an empty tree with its own interner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree sharing `interner`
    #[must_use]
    pub fn with_interner(interner: Interner) -> Self {
        Self {
            interner,
            ..Self::default()
        }
    }

    /// The interner for identifier names
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Intern a name
    pub fn intern(&self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    /// Resolve a symbol to its text
    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    /// Allocates a node without a known value
    pub fn alloc(&mut self, kind: NodeKind, span: FileSpan) -> NodeId {
        self.nodes.alloc(Node {
            kind,
            span,
            value: None,
            properties: None,
        })
    }

    /// Allocates an identifier node
    pub fn alloc_identifier(&mut self, name: &str, span: FileSpan) -> NodeId {
        let name = self.intern(name);
        self.alloc(NodeKind::Identifier { name }, span)
    }

    /// Allocates a literal node
    pub fn alloc_literal(&mut self, value: impl Into<LiteralValue>, span: FileSpan) -> NodeId {
        self.alloc(
            NodeKind::Literal {
                value: value.into(),
            },
            span,
        )
    }

    /// Allocates an object literal owning a fresh property list
    pub fn alloc_object(&mut self, properties: Vec<NodeId>, span: FileSpan) -> NodeId {
        let list = self.property_lists.alloc(PropertyList { items: properties });
        let id = self.alloc(NodeKind::ObjectExpression, span);
        self.nodes[id].properties = Some(list);
        id
    }

    /// Allocates a plain `key: value` property
    pub fn alloc_property(&mut self, key: NodeId, value: NodeId, span: FileSpan) -> NodeId {
        let id = self.alloc(
            NodeKind::Property {
                key,
                computed: false,
                kind: PropertyKind::Init,
                method: false,
                shorthand: false,
            },
            span,
        );
        self.nodes[id].value = Some(value);
        id
    }

    /// Gets a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Gets a node mutably
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Gets a node's kind
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    /// Gets a node's source location
    #[must_use]
    pub fn span(&self, id: NodeId) -> FileSpan {
        self.nodes[id].span
    }

    /// Name of an identifier node
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Identifier { name } => Some(self.name(*name)),
            _ => None,
        }
    }

    /// Gets a node's known value
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].value
    }

    /// Overwrites a node's known value
    pub fn set_value(&mut self, id: NodeId, value: NodeId) {
        self.nodes[id].value = Some(value);
    }

    /// Follows known values from `id`, yielding `id` first
    ///
    /// The walk stops after [`MAX_VALUE_CHAIN`] steps.
    pub fn value_chain(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(Some(id), |current| self.nodes[*current].value).take(MAX_VALUE_CHAIN)
    }

    /// The end of the known-value chain starting at `id`
    ///
    /// Returns `None` if the chain does not end within [`MAX_VALUE_CHAIN`] steps.
    #[must_use]
    pub fn final_value(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..MAX_VALUE_CHAIN {
            match self.nodes[current].value {
                Some(next) => current = next,
                None => return Some(current),
            }
        }
        None
    }

    /// Property list of an object-valued node
    pub fn properties(&self, id: NodeId) -> &[NodeId] {
        match self.nodes[id].properties {
            Some(list) => &self.property_lists[list].items,
            None => &[],
        }
    }

    /// Property list handle of a node
    #[must_use]
    pub fn property_list(&self, id: NodeId) -> Option<PropertyListId> {
        self.nodes[id].properties
    }

    /// Items of a property list
    pub fn property_list_items(&self, list: PropertyListId) -> &[NodeId] {
        &self.property_lists[list].items
    }

    /// Shares `list` with `id`, so both observe the same properties
    pub fn share_properties(&mut self, id: NodeId, list: PropertyListId) {
        self.nodes[id].properties = Some(list);
    }

    /// Returns the node's property list, creating an empty one if needed
    pub fn ensure_property_list(&mut self, id: NodeId) -> PropertyListId {
        if let Some(list) = self.nodes[id].properties {
            return list;
        }
        let list = self.property_lists.alloc(PropertyList::default());
        self.nodes[id].properties = Some(list);
        list
    }

    /// Appends a property to a list
    pub fn push_property(&mut self, list: PropertyListId, property: NodeId) {
        self.property_lists[list].items.push(property);
    }

    /// Replaces the property at `index` of a list
    pub fn replace_property(&mut self, list: PropertyListId, index: usize, property: NodeId) {
        if let Some(slot) = self.property_lists[list].items.get_mut(index) {
            *slot = property;
        }
    }

    /// Syntactic children: kind fields, then a property's value, then an object's properties
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[id];
        let mut children = node.kind.children();
        match node.kind {
            NodeKind::Property { .. } => children.extend(node.value),
            NodeKind::ObjectExpression => children.extend_from_slice(self.properties(id)),
            _ => {}
        }
        children
    }

    /// Number of allocated nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes were allocated
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }
}

/// Span used for nodes that have no source text
pub fn synthetic_span(file: FileId) -> FileSpan {
    FileSpan::new(file, Span::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeclarationKind, NodeTag};

    fn span() -> FileSpan {
        synthetic_span(FileId::new(0))
    }

    #[test]
    fn test_value_chain_follows_known_values() {
        let mut ast = Ast::new();
        let two = ast.alloc_literal(2, span());
        let a = ast.alloc_identifier("a", span());
        let b = ast.alloc_identifier("b", span());
        ast.set_value(a, two);
        ast.set_value(b, a);

        assert_eq!(ast.value_chain(b).collect::<Vec<_>>(), vec![b, a, two]);
        assert_eq!(ast.final_value(b), Some(two));
        assert_eq!(ast.final_value(two), Some(two));
    }

    #[test]
    fn test_cyclic_chain_has_no_final_value() {
        let mut ast = Ast::new();
        let a = ast.alloc_identifier("a", span());
        let b = ast.alloc_identifier("b", span());
        ast.set_value(a, b);
        ast.set_value(b, a);
        assert_eq!(ast.final_value(a), None);
    }

    #[test]
    fn test_declaration_children_follow_field_order() {
        let mut ast = Ast::new();
        let id = ast.alloc_identifier("a", span());
        let init = ast.alloc_literal(1, span());
        let declarator = ast.alloc(NodeKind::VariableDeclarator { id, init: Some(init) }, span());
        let declaration = ast.alloc(
            NodeKind::VariableDeclaration {
                kind: DeclarationKind::Var,
                declarations: vec![declarator],
            },
            span(),
        );

        assert_eq!(ast.kind(declaration).tag(), NodeTag::VariableDeclaration);
        assert_eq!(ast.children(declaration), vec![declarator]);
        assert_eq!(ast.children(declarator), vec![id, init]);
    }

    #[test]
    fn test_shared_property_list() {
        let mut ast = Ast::new();
        let object = ast.alloc_object(Vec::new(), span());
        let alias = ast.alloc_identifier("t", span());
        let list = ast.ensure_property_list(object);
        ast.share_properties(alias, list);

        let key = ast.alloc_identifier("a", span());
        let value = ast.alloc_literal(1, span());
        let property = ast.alloc_property(key, value, span());
        ast.push_property(list, property);

        assert_eq!(ast.properties(object), &[property]);
        assert_eq!(ast.properties(alias), &[property]);
        assert_eq!(ast.children(object), vec![property]);
        assert_eq!(ast.children(property), vec![key, value]);
    }
}
