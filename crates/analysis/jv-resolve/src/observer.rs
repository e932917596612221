//! Callbacks for resolved nodes

use jv_scope::ScopeId;
use jv_syntax::{Ast, NodeId};

/// Receives every node as soon as its resolution completes
///
/// Scope ids are local to the module the node belongs to; `ast.span(node).file`
/// identifies that module.
pub trait Observer {
    /// Called once per resolved node, children before parents
    fn on_resolved(&mut self, ast: &Ast, scope: ScopeId, node: NodeId);
}

impl<F> Observer for F
where
    F: FnMut(&Ast, ScopeId, NodeId),
{
    fn on_resolved(&mut self, ast: &Ast, scope: ScopeId, node: NodeId) {
        self(ast, scope, node);
    }
}
