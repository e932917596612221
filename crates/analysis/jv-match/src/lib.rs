//! Structural matching of resolved nodes against query patterns
//!
//! A [`Pattern`] constrains only what it names. Identifiers and properties that carry a
//! known value can be matched either as themselves or through that value, and property
//! constraints are existential: each pattern property must match some property of the
//! candidate, in any order.

mod builder;

pub use builder::Patterns;
use jv_syntax::{Ast, NodeId, Pattern, ShapePattern};

/// Recursion limit for nested patterns and known-value fallthrough
pub const MAX_MATCH_DEPTH: usize = 256;

/// Test whether `candidate` satisfies `pattern`
pub fn matches(ast: &Ast, candidate: NodeId, pattern: &Pattern) -> bool {
    Matcher { ast }.matches(candidate, pattern, 0)
}

/// Find the first node of `candidates` satisfying `pattern`
pub fn find(ast: &Ast, candidates: &[NodeId], pattern: &Pattern) -> Option<NodeId> {
    candidates
        .iter()
        .copied()
        .find(|candidate| matches(ast, *candidate, pattern))
}

struct Matcher<'ast> {
    ast: &'ast Ast,
}

impl Matcher<'_> {
    fn matches(&self, candidate: NodeId, pattern: &Pattern, depth: usize) -> bool {
        if depth > MAX_MATCH_DEPTH {
            return false;
        }
        if self.matches_node(candidate, pattern, depth) {
            return true;
        }

        let node = self.ast.node(candidate);
        match node.value {
            Some(value) if node.kind.holds_value() && value != candidate => {
                self.matches(value, pattern, depth + 1)
            }
            _ => false,
        }
    }

    fn matches_node(&self, candidate: NodeId, pattern: &Pattern, depth: usize) -> bool {
        match pattern {
            Pattern::Any => true,
            Pattern::Node(expected) => *expected == candidate,
            Pattern::Shape(shape) => self.matches_shape(candidate, shape, depth),
        }
    }

    fn matches_shape(&self, candidate: NodeId, shape: &ShapePattern, depth: usize) -> bool {
        let node = self.ast.node(candidate);

        if let Some(kind) = &shape.kind {
            let mut child = |child: NodeId, pattern: &Pattern| self.matches(child, pattern, depth + 1);
            if !kind.matches_kind(&node.kind, &mut child) {
                return false;
            }
        }

        // Absent on the candidate means unconstrained.
        let value_matches = match (&shape.value, node.value) {
            (Some(expected), Some(value)) => self.matches(value, expected, depth + 1),
            _ => true,
        };
        if !value_matches {
            return false;
        }

        if let (Some(expected), Some(list)) = (&shape.properties, node.properties) {
            let items = self.ast.property_list_items(list);
            return expected.iter().all(|property| {
                items
                    .iter()
                    .any(|item| self.matches(*item, property, depth + 1))
            });
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jv_parser::parse_source;
    use jv_span::{FileId, FileSpan};
    use jv_syntax::{
        IdentifierPattern, KindPattern, LiteralPattern, LiteralValue, MemberExpressionPattern, NodeKind,
        synthetic_span,
    };

    fn span() -> FileSpan {
        synthetic_span(FileId::new(0))
    }

    fn first_of(ast: &Ast, predicate: impl Fn(&NodeKind) -> bool) -> NodeId {
        ast.iter()
            .find(|(_, node)| predicate(&node.kind))
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn test_identity_and_any() {
        let mut ast = Ast::new();
        let two = ast.alloc_literal(2, span());
        let three = ast.alloc_literal(3, span());
        assert!(matches(&ast, two, &Pattern::Node(two)));
        assert!(!matches(&ast, two, &Pattern::Node(three)));
        assert!(matches(&ast, two, &Pattern::Any));
    }

    #[test]
    fn test_primitive_fields_compare_by_equality() {
        let mut ast = Ast::new();
        let two = ast.alloc_literal(2, span());
        let patterns = Patterns::new(ast.interner());
        assert!(matches(&ast, two, &patterns.lit(2)));
        assert!(!matches(&ast, two, &patterns.lit(3)));
        assert!(!matches(&ast, two, &patterns.lit("2")));
        assert!(!matches(&ast, two, &patterns.ident("a")));

        let unconstrained = Pattern::kind(KindPattern::Literal(LiteralPattern::default()));
        assert!(matches(&ast, two, &unconstrained));
    }

    #[test]
    fn test_subset_of_constrained_keys() {
        let mut ast = Ast::new();
        let root = parse_source(&mut ast, FileId::new(0), "test.js", "a.b;")
            .into_root()
            .unwrap();
        let member = first_of(&ast, |kind| matches!(kind, NodeKind::MemberExpression { .. }));
        let patterns = Patterns::new(ast.interner());

        assert!(matches(&ast, member, &patterns.member(patterns.ident("a"), patterns.ident("b"))));
        assert!(matches(&ast, member, &patterns.member(Pattern::Any, patterns.ident("b"))));
        assert!(!matches(&ast, member, &patterns.member(patterns.ident("a"), patterns.ident("c"))));

        let computed = Pattern::kind(KindPattern::MemberExpression(MemberExpressionPattern {
            computed: Some(true),
            ..MemberExpressionPattern::default()
        }));
        assert!(!matches(&ast, member, &computed));
        assert!(!matches(&ast, root, &patterns.member(Pattern::Any, Pattern::Any)));
    }

    #[test]
    fn test_identifier_matches_through_known_value() {
        let mut ast = Ast::new();
        let two = ast.alloc_literal(2, span());
        let a = ast.alloc_identifier("a", span());
        let b = ast.alloc_identifier("b", span());
        ast.set_value(a, two);
        ast.set_value(b, a);
        let patterns = Patterns::new(ast.interner());

        assert!(matches(&ast, b, &patterns.ident("b")));
        assert!(matches(&ast, b, &patterns.ident("a")));
        assert!(matches(&ast, b, &patterns.lit(2)));
        assert!(matches(&ast, b, &Pattern::Node(two)));
        assert!(!matches(&ast, two, &patterns.ident("a")));
    }

    #[test]
    fn test_value_constraint_absent_on_candidate_passes() {
        let mut ast = Ast::new();
        let a = ast.alloc_identifier("a", span());
        let b = ast.alloc_identifier("b", span());
        let one = ast.alloc_literal(1, span());
        let two = ast.alloc_literal(2, span());
        ast.set_value(b, two);
        let patterns = Patterns::new(ast.interner());

        assert!(matches(&ast, a, &patterns.ident("a").with_value(patterns.lit(1))));
        assert!(!matches(&ast, b, &patterns.ident("b").with_value(Pattern::Node(one))));
        assert!(matches(&ast, b, &patterns.ident("b").with_value(Pattern::Node(two))));
    }

    #[test]
    fn test_properties_are_existential() {
        let mut ast = Ast::new();
        parse_source(&mut ast, FileId::new(0), "test.js", "({a: 1, b: 'x', c: [1]});")
            .into_root()
            .unwrap();
        let object = first_of(&ast, |kind| matches!(kind, NodeKind::ObjectExpression));
        let patterns = Patterns::new(ast.interner());

        let subset = patterns.object(vec![
            patterns.prop("c", Pattern::Any),
            patterns.prop("a", patterns.lit(1)),
        ]);
        assert!(matches(&ast, object, &subset));

        let wrong_value = patterns.object(vec![patterns.prop("a", patterns.lit(2))]);
        assert!(!matches(&ast, object, &wrong_value));

        let missing = patterns.object(vec![patterns.prop("d", Pattern::Any)]);
        assert!(!matches(&ast, object, &missing));

        assert!(matches(&ast, object, &patterns.object(Vec::new())));
    }

    #[test]
    fn test_list_fields_match_positionally() {
        let mut ast = Ast::new();
        parse_source(&mut ast, FileId::new(0), "test.js", "f(1, 'two');")
            .into_root()
            .unwrap();
        let call = first_of(&ast, |kind| matches!(kind, NodeKind::CallExpression { .. }));
        let patterns = Patterns::new(ast.interner());

        assert!(matches(&ast, call, &patterns.call(patterns.ident("f"), vec![patterns.lit(1)])));
        assert!(matches(
            &ast,
            call,
            &patterns.call(Pattern::Any, vec![Pattern::Any, patterns.lit("two")])
        ));
        assert!(!matches(&ast, call, &patterns.call(Pattern::Any, vec![patterns.lit("two")])));
        assert!(!matches(&ast, call, &patterns.new_expr(Pattern::Any, Vec::new())));
    }

    #[test]
    fn test_cyclic_values_terminate() {
        let mut ast = Ast::new();
        let a = ast.alloc_identifier("a", span());
        let b = ast.alloc_identifier("b", span());
        ast.set_value(a, b);
        ast.set_value(b, a);
        let patterns = Patterns::new(ast.interner());
        assert!(!matches(&ast, a, &patterns.lit(LiteralValue::Null)));
        assert!(matches(&ast, a, &patterns.ident("b")));
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut ast = Ast::new();
        let one = ast.alloc_literal(1, span());
        let two = ast.alloc_literal(2, span());
        let again = ast.alloc_literal(2, span());
        let patterns = Patterns::new(ast.interner());
        assert_eq!(find(&ast, &[one, two, again], &patterns.lit(2)), Some(two));
        assert_eq!(find(&ast, &[one], &patterns.lit(2)), None);

        let pattern = Pattern::kind(KindPattern::Identifier(IdentifierPattern::default()));
        assert_eq!(find(&ast, &[one, two], &pattern), None);
    }
}
