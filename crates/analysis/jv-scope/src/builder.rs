//! Builds the scope tree for one module

use crate::{ScopeId, ScopeKind, ScopeTree};
use std::mem;
use jv_syntax::{Ast, NodeId, NodeKind};
use tracing::trace;

/// Walk the program rooted at `root` and record every scope and declaration
///
/// Declarations hoist to the nearest function (or global) scope. Identifiers that are
/// assigned to, or used as a `for-in`/`for-of` target, without any visible declaration
/// become implicit globals.
pub fn build_scopes(ast: &Ast, root: NodeId) -> ScopeTree {
    let mut tree = ScopeTree::new(root);
    let mut builder = ScopeBuilder {
        ast,
        tree: &mut tree,
        pending: Vec::new(),
    };
    builder.walk(root);
    builder.finish();
    tree
}

struct ScopeBuilder<'ast, 'tree> {
    ast: &'ast Ast,
    tree: &'tree mut ScopeTree,
    /// Undeclared assignment targets, resolved once every declaration is known
    pending: Vec<(ScopeId, NodeId)>,
}

impl ScopeBuilder<'_, '_> {
    fn walk(&mut self, root: NodeId) {
        let global = self.tree.global();
        let mut stack = vec![(root, global)];

        while let Some((node, scope)) = stack.pop() {
            let inner = self.visit(node, scope);
            let children = self.ast.children(node);
            stack.extend(children.into_iter().rev().map(|child| (child, inner)));
        }
    }

    /// Record what `node` declares; returns the scope its children live in
    fn visit(&mut self, node: NodeId, scope: ScopeId) -> ScopeId {
        match self.ast.kind(node) {
            NodeKind::VariableDeclarator { id, .. } => {
                self.declare(scope, *id);
                scope
            }
            NodeKind::FunctionDeclaration { id, params, .. } => {
                if let Some(id) = id {
                    self.declare(scope, *id);
                }
                let inner = self.tree.create_child(scope, ScopeKind::Function, node);
                self.declare_all(inner, params);
                inner
            }
            NodeKind::FunctionExpression { id, params, .. } => {
                let inner = self.tree.create_child(scope, ScopeKind::Function, node);
                if let Some(id) = id {
                    self.declare(inner, *id);
                }
                self.declare_all(inner, params);
                inner
            }
            NodeKind::ArrowFunctionExpression { params, .. } => {
                let inner = self.tree.create_child(scope, ScopeKind::Function, node);
                self.declare_all(inner, params);
                inner
            }
            NodeKind::CatchClause { param: Some(param), .. } => {
                self.declare(scope, *param);
                scope
            }
            NodeKind::AssignmentExpression { left: target, .. }
            | NodeKind::ForInStatement { left: target, .. }
            | NodeKind::ForOfStatement { left: target, .. } => {
                if matches!(self.ast.kind(*target), NodeKind::Identifier { .. }) {
                    self.pending.push((scope, *target));
                }
                scope
            }
            _ => scope,
        }
    }

    fn declare_all(&mut self, scope: ScopeId, params: &[NodeId]) {
        for param in params {
            self.declare(scope, *param);
        }
    }

    /// Declare `target` if it is a plain identifier; patterns are not bound
    fn declare(&mut self, scope: ScopeId, target: NodeId) {
        if let NodeKind::Identifier { name } = self.ast.kind(target) {
            let binding = self.tree.declare(scope, *name, target);
            trace!(name = self.ast.name(*name), first = binding.node == target, "declare");
        }
    }

    fn finish(&mut self) {
        let global = self.tree.global();
        for (scope, target) in mem::take(&mut self.pending) {
            let NodeKind::Identifier { name } = self.ast.kind(target) else {
                continue;
            };
            if self.tree.lookup(scope, *name).is_none() {
                trace!(name = self.ast.name(*name), "implicit global");
                self.tree.declare_implicit(global, *name, target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jv_parser::parse_source;
    use jv_span::FileId;

    fn build(source: &str) -> (Ast, NodeId, ScopeTree) {
        let mut ast = Ast::new();
        let root = parse_source(&mut ast, FileId::new(0), "test.js", source)
            .into_root()
            .unwrap();
        let tree = build_scopes(&ast, root);
        (ast, root, tree)
    }

    fn functions(ast: &Ast) -> Vec<NodeId> {
        ast.iter()
            .filter(|(_, node)| node.kind.is_function())
            .map(|(id, _)| id)
            .collect()
    }

    fn global_names(ast: &Ast, tree: &ScopeTree) -> Vec<String> {
        tree.bindings(tree.global())
            .map(|binding| ast.name(binding.name).to_string())
            .collect()
    }

    #[test]
    fn test_var_let_const_declare_in_global() {
        let (ast, _, tree) = build("var a = 1; let b; const c = a;");
        assert_eq!(global_names(&ast, &tree), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_first_declaration_is_canonical() {
        let (ast, _, tree) = build("var a = 1; var a = 2;");
        let binding = tree.lookup_str(&ast, tree.global(), "a").unwrap();
        let first = ast
            .iter()
            .find(|(_, node)| matches!(node.kind, NodeKind::Identifier { .. }))
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(binding.node, first);
    }

    #[test]
    fn test_function_scopes() {
        let (ast, _, tree) = build("function f(x) { var y = x; } var g = function h(z) {}; var k = (w) => w;");
        assert_eq!(global_names(&ast, &tree), vec!["f", "g", "k"]);
        assert_eq!(tree.len(), 4);

        let function_nodes = functions(&ast);
        assert_eq!(function_nodes.len(), 3);
        for function in &function_nodes {
            let scope = tree.acquire(*function).unwrap();
            assert_eq!(tree.kind(scope), ScopeKind::Function);
            assert_eq!(tree.parent(scope), Some(tree.global()));
        }

        let names = |scope| {
            tree.bindings(scope)
                .map(|binding| ast.name(binding.name).to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(tree.acquire(function_nodes[0]).unwrap()), vec!["x", "y"]);
        assert_eq!(names(tree.acquire(function_nodes[1]).unwrap()), vec!["h", "z"]);
        assert_eq!(names(tree.acquire(function_nodes[2]).unwrap()), vec!["w"]);
        assert!(tree.lookup_str(&ast, tree.global(), "h").is_none());
    }

    #[test]
    fn test_var_in_block_hoists_to_function() {
        let (ast, _, tree) = build("if (1) { var a = 1; } function f() { for (var i = 0; i; i++) {} }");
        assert_eq!(global_names(&ast, &tree), vec!["a", "f"]);
        let function = functions(&ast)[0];
        let scope = tree.acquire(function).unwrap();
        assert!(tree.lookup_str(&ast, scope, "i").is_some());
        assert!(tree.lookup_str(&ast, tree.global(), "i").is_none());
    }

    #[test]
    fn test_catch_param_declares() {
        let (ast, _, tree) = build("try {} catch (e) {}");
        assert_eq!(global_names(&ast, &tree), vec!["e"]);
    }

    #[test]
    fn test_undeclared_assignment_becomes_implicit_global() {
        let (ast, _, tree) = build("a = 3; function f() { b = 1; var c; c = 2; } for (k in {}) {}");
        let global = tree.global();
        assert!(global_names(&ast, &tree).iter().all(|name| name == "f"));

        let implicit: Vec<_> = tree
            .get(global)
            .implicit
            .values()
            .map(|binding| ast.name(binding.name).to_string())
            .collect();
        assert_eq!(implicit, vec!["a", "b", "k"]);
        assert!(tree.lookup_str(&ast, global, "a").is_some());
    }

    #[test]
    fn test_declared_later_is_not_implicit() {
        let (_, _, tree) = build("a = 1; var a;");
        assert!(tree.get(tree.global()).implicit.is_empty());
    }
}
