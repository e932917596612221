//! JavaScript language adapter
//!
//! Parses with the tree-sitter JavaScript grammar and lowers the concrete tree to
//! ESTree-shaped [`jv_syntax::NodeKind`] nodes.

mod literal;
mod lower;

use anyhow::Result;
use jv_span::FileId;
use jv_syntax::{Ast, Language, NodeId};
use tree_sitter::{Parser, Tree};

pub use literal::{parse_number, unescape_string};
pub use lower::MAX_LOWERING_DEPTH;

/// JavaScript language implementation
pub struct JavaScriptLanguage;

impl JavaScriptLanguage {
    /// Creates a new JavaScript language adapter
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptLanguage {
    fn default() -> Self {
        Self::new()
    }
}

impl Language for JavaScriptLanguage {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &[&'static str] {
        &["js", "cjs", "mjs"]
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_javascript::LANGUAGE.into()
    }

    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.tree_sitter_language())?;

        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter parse failed"))
    }

    fn lower(&self, tree: &Tree, source: &str, file: FileId, ast: &mut Ast) -> NodeId {
        lower::lower_program(ast, source, file, tree.root_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jv_syntax::{
        AssignmentOperator, DeclarationKind, LiteralValue, LogicalOperator, NodeKind, NodeTag,
    };

    fn lower_source(source: &str) -> (Ast, NodeId) {
        let language = JavaScriptLanguage::new();
        let tree = language.parse(source).unwrap();
        assert!(!tree.root_node().has_error(), "unexpected syntax error in {source}");
        let mut ast = Ast::new();
        let root = language.lower(&tree, source, FileId::new(0), &mut ast);
        (ast, root)
    }

    fn body(ast: &Ast, root: NodeId) -> Vec<NodeId> {
        match ast.kind(root) {
            NodeKind::Program { body } => body.clone(),
            other => panic!("expected program, got {other:?}"),
        }
    }

    fn expression(ast: &Ast, statement: NodeId) -> NodeId {
        match ast.kind(statement) {
            NodeKind::ExpressionStatement { expression } => *expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_declarations() {
        let (ast, root) = lower_source("var a = 2, b; const c = 'x';");
        let statements = body(&ast, root);
        assert_eq!(statements.len(), 2);

        let NodeKind::VariableDeclaration { kind, declarations } = ast.kind(statements[0]) else {
            panic!("expected declaration");
        };
        assert_eq!(*kind, DeclarationKind::Var);
        assert_eq!(declarations.len(), 2);
        let NodeKind::VariableDeclarator { id, init } = ast.kind(declarations[0]) else {
            panic!("expected declarator");
        };
        assert_eq!(ast.identifier_name(*id), Some("a"));
        let init = init.unwrap();
        assert_eq!(
            ast.kind(init),
            &NodeKind::Literal {
                value: LiteralValue::Number(2.0)
            }
        );

        let NodeKind::VariableDeclaration { kind, .. } = ast.kind(statements[1]) else {
            panic!("expected declaration");
        };
        assert_eq!(*kind, DeclarationKind::Const);
    }

    #[test]
    fn test_member_forms() {
        let (ast, root) = lower_source("a.b; a['b']; a[0];");
        let statements = body(&ast, root);
        let computed: Vec<bool> = statements
            .iter()
            .map(|statement| match ast.kind(expression(&ast, *statement)) {
                NodeKind::MemberExpression { computed, .. } => *computed,
                other => panic!("expected member, got {other:?}"),
            })
            .collect();
        assert_eq!(computed, vec![false, true, true]);
    }

    #[test]
    fn test_sequence_keeps_source_order() {
        let (ast, root) = lower_source("a, b, c, d;");
        let statements = body(&ast, root);
        let NodeKind::SequenceExpression { expressions } = ast.kind(expression(&ast, statements[0]))
        else {
            panic!("expected sequence expression");
        };
        let names: Vec<_> = expressions
            .iter()
            .map(|&part| ast.identifier_name(part))
            .collect();
        assert_eq!(names, [Some("a"), Some("b"), Some("c"), Some("d")]);
    }

    #[test]
    fn test_nesting_past_the_limit_is_opaque() {
        let depth = MAX_LOWERING_DEPTH + 10;
        let (ast, root) = lower_source(&format!("{}1{};", "[".repeat(depth), "]".repeat(depth)));
        let statements = body(&ast, root);

        let mut current = expression(&ast, statements[0]);
        let mut levels = 0;
        while let NodeKind::ArrayExpression { elements } = ast.kind(current) {
            current = elements[0].unwrap();
            levels += 1;
        }
        assert_eq!(ast.kind(current).tag(), NodeTag::Unsupported);
        assert_eq!(levels, MAX_LOWERING_DEPTH - 1);
    }

    #[test]
    fn test_parentheses_vanish_and_logical_split() {
        let (ast, root) = lower_source("(a && (b));");
        let statements = body(&ast, root);
        let NodeKind::LogicalExpression { operator, right, .. } =
            ast.kind(expression(&ast, statements[0]))
        else {
            panic!("expected logical expression");
        };
        assert_eq!(*operator, LogicalOperator::And);
        assert_eq!(ast.identifier_name(*right), Some("b"));
    }

    #[test]
    fn test_object_literal_properties() {
        let (ast, root) = lower_source("x = { a: 1, 'b': 2, c, d() {} };");
        let statements = body(&ast, root);
        let NodeKind::AssignmentExpression { operator, right, .. } =
            ast.kind(expression(&ast, statements[0]))
        else {
            panic!("expected assignment");
        };
        assert_eq!(*operator, AssignmentOperator::Assign);
        let properties = ast.properties(*right);
        assert_eq!(properties.len(), 4);

        let tags: Vec<NodeTag> = properties
            .iter()
            .map(|property| ast.kind(ast.value(*property).unwrap()).tag())
            .collect();
        assert_eq!(
            tags,
            vec![
                NodeTag::Literal,
                NodeTag::Literal,
                NodeTag::Identifier,
                NodeTag::FunctionExpression
            ]
        );
        let NodeKind::Property { key, .. } = ast.kind(properties[1]) else {
            panic!("expected property");
        };
        assert_eq!(
            ast.kind(*key),
            &NodeKind::Literal {
                value: LiteralValue::String("b".to_string())
            }
        );
    }

    #[test]
    fn test_array_holes() {
        let (ast, root) = lower_source("[1, , 3];");
        let statements = body(&ast, root);
        let NodeKind::ArrayExpression { elements } = ast.kind(expression(&ast, statements[0]))
        else {
            panic!("expected array");
        };
        assert_eq!(elements.len(), 3);
        assert!(elements[1].is_none());
    }

    #[test]
    fn test_unsupported_syntax_is_opaque() {
        let (ast, root) = lower_source("class A {}");
        let statements = body(&ast, root);
        assert_eq!(ast.kind(statements[0]).tag(), NodeTag::Unsupported);
    }

    #[test]
    fn test_function_shapes() {
        let (ast, root) = lower_source("function f(a, b) { return a; } var g = (x) => x;");
        let statements = body(&ast, root);
        let NodeKind::FunctionDeclaration { id, params, .. } = ast.kind(statements[0]) else {
            panic!("expected function declaration");
        };
        assert_eq!(ast.identifier_name(id.unwrap()), Some("f"));
        assert_eq!(params.len(), 2);

        let NodeKind::VariableDeclaration { declarations, .. } = ast.kind(statements[1]) else {
            panic!("expected declaration");
        };
        let NodeKind::VariableDeclarator { init, .. } = ast.kind(declarations[0]) else {
            panic!("expected declarator");
        };
        let NodeKind::ArrowFunctionExpression {
            params, expression, ..
        } = ast.kind(init.unwrap())
        else {
            panic!("expected arrow function");
        };
        assert_eq!(params.len(), 1);
        assert!(*expression);
    }
}
