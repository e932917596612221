//! Scope tree and binding store

use indexmap::IndexMap;
use jv_intern::Symbol;
use jv_syntax::{Ast, NodeId};
use la_arena::{Arena, Idx};
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Unique identifier for a scope
pub type ScopeId = Idx<ScopeData>;

type BindingMap = IndexMap<Symbol, Binding, FxBuildHasher>;

/// What introduced a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Module top level
    Global,
    /// Function body, including its parameters
    Function,
}

/// A name bound in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Bound name
    pub name: Symbol,
    /// Canonical identifier node; its known value is the binding's value
    pub node: NodeId,
}

/// A scope in the source code
#[derive(Debug, Clone)]
pub struct ScopeData {
    /// Parent scope (None for the global scope)
    pub parent: Option<ScopeId>,
    /// What introduced the scope
    pub kind: ScopeKind,
    /// Node that owns the scope (program or function)
    pub block: NodeId,
    /// Declared names, in declaration order
    pub bindings: BindingMap,
    /// Environment-provided names such as `module` and implicit globals
    pub implicit: BindingMap,
}

/// Tree of all scopes in one module
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Arena<ScopeData>,
    global: ScopeId,
    by_block: FxHashMap<NodeId, ScopeId>,
}

impl ScopeTree {
    /// Create a tree holding only the global scope of `program`
    pub fn new(program: NodeId) -> Self {
        let mut scopes = Arena::new();
        let global = scopes.alloc(ScopeData {
            parent: None,
            kind: ScopeKind::Global,
            block: program,
            bindings: BindingMap::default(),
            implicit: BindingMap::default(),
        });
        let mut by_block = FxHashMap::default();
        by_block.insert(program, global);
        Self {
            scopes,
            global,
            by_block,
        }
    }

    /// The module's global scope
    pub fn global(&self) -> ScopeId {
        self.global
    }

    /// Create a new child scope owned by `block`
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind, block: NodeId) -> ScopeId {
        let id = self.scopes.alloc(ScopeData {
            parent: Some(parent),
            kind,
            block,
            bindings: BindingMap::default(),
            implicit: BindingMap::default(),
        });
        self.by_block.insert(block, id);
        id
    }

    /// The scope owned by `block`, if one was created
    pub fn acquire(&self, block: NodeId) -> Option<ScopeId> {
        self.by_block.get(&block).copied()
    }

    /// Get scope data
    pub fn get(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id]
    }

    /// Parent of a scope
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id].parent
    }

    /// Kind of a scope
    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes[id].kind
    }

    /// Declared bindings of a scope, in declaration order
    pub fn bindings(&self, id: ScopeId) -> impl Iterator<Item = Binding> + '_ {
        self.scopes[id].bindings.values().copied()
    }

    /// Number of scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always false: the global scope exists from construction
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Create (or return the existing) binding for `name` local to `scope`
    ///
    /// `node` becomes the canonical node only when the name is new.
    pub fn declare(&mut self, scope: ScopeId, name: Symbol, node: NodeId) -> Binding {
        *self.scopes[scope]
            .bindings
            .entry(name)
            .or_insert(Binding { name, node })
    }

    /// Create (or return the existing) environment-provided binding in `scope`
    pub fn declare_implicit(&mut self, scope: ScopeId, name: Symbol, node: NodeId) -> Binding {
        *self.scopes[scope]
            .implicit
            .entry(name)
            .or_insert(Binding { name, node })
    }

    /// Find the binding for `name` visible from `scope`
    ///
    /// Each scope is checked for a declared binding, then an implicit one, before
    /// moving to its parent.
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<Binding> {
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            let data = &self.scopes[scope_id];
            if let Some(binding) = data.bindings.get(&name).or_else(|| data.implicit.get(&name)) {
                return Some(*binding);
            }
            current = data.parent;
        }
        None
    }

    /// [`Self::lookup`] by text; names never interned cannot be bound
    pub fn lookup_str(&self, ast: &Ast, scope: ScopeId, name: &str) -> Option<Binding> {
        let sym = ast.interner().get(name)?;
        self.lookup(scope, sym)
    }

    /// Overwrite a binding's known value
    pub fn set(&self, ast: &mut Ast, binding: Binding, value: NodeId) {
        ast.set_value(binding.node, value);
    }

    /// A binding's known value
    pub fn value(&self, ast: &Ast, binding: Binding) -> Option<NodeId> {
        ast.value(binding.node)
    }
}
