//! Shorthand constructors for common query patterns

use jv_intern::Interner;
use jv_syntax::{
    ArrayExpressionPattern, BlockStatementPattern, CallExpressionPattern, FunctionDeclarationPattern,
    FunctionExpressionPattern, IdentifierPattern, KindPattern, LiteralPattern, LiteralValue,
    MemberExpressionPattern, NewExpressionPattern, NodeId, ObjectExpressionPattern, Pattern, PropertyPattern,
};

/// Builds patterns, interning names as needed
#[derive(Debug, Clone, Copy)]
pub struct Patterns<'interner> {
    interner: &'interner Interner,
}

impl<'interner> Patterns<'interner> {
    /// Create a builder over `interner`
    pub fn new(interner: &'interner Interner) -> Self {
        Self { interner }
    }

    /// Identifier with the given name
    pub fn ident(&self, name: &str) -> Pattern {
        Pattern::kind(KindPattern::Identifier(IdentifierPattern {
            name: Some(self.interner.intern(name)),
        }))
    }

    /// Literal with the given value
    pub fn lit(&self, value: impl Into<LiteralValue>) -> Pattern {
        Pattern::kind(KindPattern::Literal(LiteralPattern {
            value: Some(value.into()),
        }))
    }

    /// `object.property` or `object[property]`
    pub fn member(&self, object: Pattern, property: Pattern) -> Pattern {
        Pattern::kind(KindPattern::MemberExpression(MemberExpressionPattern {
            object: Some(Box::new(object)),
            property: Some(Box::new(property)),
            computed: None,
        }))
    }

    /// Call whose leading arguments match `arguments`
    pub fn call(&self, callee: Pattern, arguments: Vec<Pattern>) -> Pattern {
        Pattern::kind(KindPattern::CallExpression(CallExpressionPattern {
            callee: Some(Box::new(callee)),
            arguments: Some(arguments),
        }))
    }

    /// `new` expression whose leading arguments match `arguments`
    pub fn new_expr(&self, callee: Pattern, arguments: Vec<Pattern>) -> Pattern {
        Pattern::kind(KindPattern::NewExpression(NewExpressionPattern {
            callee: Some(Box::new(callee)),
            arguments: Some(arguments),
        }))
    }

    /// `require('<specifier>')`
    pub fn require(&self, specifier: &str) -> Pattern {
        self.call(self.ident("require"), vec![self.lit(specifier)])
    }

    /// Any function expression
    pub fn func(&self) -> Pattern {
        Pattern::kind(KindPattern::FunctionExpression(FunctionExpressionPattern::default()))
    }

    /// Function declaration with the given name
    pub fn func_decl(&self, name: &str) -> Pattern {
        Pattern::kind(KindPattern::FunctionDeclaration(FunctionDeclarationPattern {
            id: Some(Box::new(self.ident(name))),
            ..FunctionDeclarationPattern::default()
        }))
    }

    /// Any block statement
    pub fn block(&self) -> Pattern {
        Pattern::kind(KindPattern::BlockStatement(BlockStatementPattern::default()))
    }

    /// Array whose leading elements match `elements`
    pub fn array(&self, elements: Vec<Pattern>) -> Pattern {
        Pattern::kind(KindPattern::ArrayExpression(ArrayExpressionPattern {
            elements: Some(elements),
        }))
    }

    /// Object having at least the given properties
    pub fn object(&self, properties: Vec<Pattern>) -> Pattern {
        Pattern::kind(KindPattern::ObjectExpression(ObjectExpressionPattern {}))
            .with_properties(properties)
    }

    /// `name: value` with an identifier key
    pub fn prop(&self, name: &str, value: Pattern) -> Pattern {
        self.prop_with_key(self.ident(name), value)
    }

    /// Property with an arbitrary key pattern
    pub fn prop_with_key(&self, key: Pattern, value: Pattern) -> Pattern {
        Pattern::kind(KindPattern::Property(PropertyPattern {
            key: Some(Box::new(key)),
            ..PropertyPattern::default()
        }))
        .with_value(value)
    }

    /// Any node
    pub fn any(&self) -> Pattern {
        Pattern::Any
    }

    /// Exactly `node`
    pub fn node(&self, node: NodeId) -> Pattern {
        Pattern::Node(node)
    }
}
