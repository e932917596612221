//! Node kinds, operators and literal values

use crate::{NodeId, Pattern};
use derive_more::Display;
use jv_derive::Shape;
use jv_intern::Symbol;

/// Every syntactic form the engine understands
///
/// Child fields are declared in evaluation order; traversal and resolution visit them
/// in that order. Object literal properties and known values live on the [`crate::Node`]
/// rather than here, because they are mutated as resolution discovers information.
#[derive(Debug, Clone, PartialEq, Shape)]
#[shape(id_type = "NodeId", pattern = "Pattern", kind_pattern = "KindPattern", tag = "NodeTag")]
pub enum NodeKind {
    /// Root of one source file
    Program {
        /// Top-level statements
        body: Vec<NodeId>,
    },
    /// Expression evaluated for effect
    ExpressionStatement {
        /// The expression
        expression: NodeId,
    },
    /// `var`, `let` or `const` declaration
    VariableDeclaration {
        /// Declaration keyword
        kind: DeclarationKind,
        /// Declarators in source order
        declarations: Vec<NodeId>,
    },
    /// `id = init` inside a declaration
    VariableDeclarator {
        /// Binding target
        id: NodeId,
        /// Initializer
        init: Option<NodeId>,
    },
    /// `{ ... }`
    BlockStatement {
        /// Statements
        body: Vec<NodeId>,
    },
    /// `;`
    EmptyStatement,
    /// `if (test) consequent else alternate`
    IfStatement {
        /// Condition
        test: NodeId,
        /// Then branch
        consequent: NodeId,
        /// Else branch
        alternate: Option<NodeId>,
    },
    /// `for (init; test; update) body`
    ForStatement {
        /// Initializer declaration or expression
        init: Option<NodeId>,
        /// Loop condition
        test: Option<NodeId>,
        /// Update expression
        update: Option<NodeId>,
        /// Loop body
        body: NodeId,
    },
    /// `for (left in right) body`
    ForInStatement {
        /// Iteration target
        left: NodeId,
        /// Iterated object
        right: NodeId,
        /// Loop body
        body: NodeId,
    },
    /// `for (left of right) body`
    ForOfStatement {
        /// Iteration target
        left: NodeId,
        /// Iterated value
        right: NodeId,
        /// Loop body
        body: NodeId,
    },
    /// `while (test) body`
    WhileStatement {
        /// Loop condition
        test: NodeId,
        /// Loop body
        body: NodeId,
    },
    /// `do body while (test)`
    DoWhileStatement {
        /// Loop body
        body: NodeId,
        /// Loop condition
        test: NodeId,
    },
    /// `continue label;`
    ContinueStatement {
        /// Target label
        label: Option<NodeId>,
    },
    /// `break label;`
    BreakStatement {
        /// Target label
        label: Option<NodeId>,
    },
    /// `label: body`
    LabeledStatement {
        /// Label identifier
        label: NodeId,
        /// Labeled statement
        body: NodeId,
    },
    /// `switch (discriminant) { cases }`
    SwitchStatement {
        /// Switched value
        discriminant: NodeId,
        /// `case` and `default` clauses
        cases: Vec<NodeId>,
    },
    /// `case test: consequent` or `default: consequent`
    SwitchCase {
        /// Case value, absent for `default`
        test: Option<NodeId>,
        /// Clause statements
        consequent: Vec<NodeId>,
    },
    /// `try block catch handler finally finalizer`
    TryStatement {
        /// Guarded block
        block: NodeId,
        /// Catch clause
        handler: Option<NodeId>,
        /// Finally block
        finalizer: Option<NodeId>,
    },
    /// `catch (param) body`
    CatchClause {
        /// Caught value binding
        param: Option<NodeId>,
        /// Handler block
        body: NodeId,
    },
    /// `return argument;`
    ReturnStatement {
        /// Returned value
        argument: Option<NodeId>,
    },
    /// `throw argument;`
    ThrowStatement {
        /// Thrown value
        argument: NodeId,
    },
    /// `debugger;`
    DebuggerStatement,
    /// `function id(params) body`
    FunctionDeclaration {
        /// Function name
        id: Option<NodeId>,
        /// Parameters
        params: Vec<NodeId>,
        /// Body block
        body: NodeId,
        /// `function*`
        generator: bool,
        /// `async function`
        is_async: bool,
    },
    /// `function id(params) body` in expression position
    FunctionExpression {
        /// Optional name, visible only inside the function
        id: Option<NodeId>,
        /// Parameters
        params: Vec<NodeId>,
        /// Body block
        body: NodeId,
        /// `function*`
        generator: bool,
        /// `async function`
        is_async: bool,
    },
    /// `(params) => body`
    ArrowFunctionExpression {
        /// Parameters
        params: Vec<NodeId>,
        /// Body block or expression
        body: NodeId,
        /// Whether `body` is an expression
        expression: bool,
        /// `async (...) =>`
        is_async: bool,
    },
    /// `this`
    ThisExpression,
    /// A name
    Identifier {
        /// The name
        name: Symbol,
    },
    /// A literal constant
    Literal {
        /// Decoded value
        value: LiteralValue,
    },
    /// `[a, , b]`
    ArrayExpression {
        /// Elements, `None` for holes
        elements: Vec<Option<NodeId>>,
    },
    /// `{ ... }`; properties live in the node's property list
    ObjectExpression,
    /// `key: value` inside an object literal; the value lives in the node's value slot
    Property {
        /// Property key
        key: NodeId,
        /// `[key]: value`
        computed: bool,
        /// Plain, getter or setter
        kind: PropertyKind,
        /// `key() {}`
        method: bool,
        /// `{ key }`
        shorthand: bool,
    },
    /// `a, b`
    SequenceExpression {
        /// Expressions in order
        expressions: Vec<NodeId>,
    },
    /// `op argument`
    UnaryExpression {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        argument: NodeId,
    },
    /// `++argument` or `argument--`
    UpdateExpression {
        /// Operator
        operator: UpdateOperator,
        /// Whether the operator precedes the operand
        prefix: bool,
        /// Operand
        argument: NodeId,
    },
    /// `left op right`
    BinaryExpression {
        /// Operator
        operator: BinaryOperator,
        /// Left operand
        left: NodeId,
        /// Right operand
        right: NodeId,
    },
    /// `left && right`, `left || right`, `left ?? right`
    LogicalExpression {
        /// Operator
        operator: LogicalOperator,
        /// Left operand
        left: NodeId,
        /// Right operand
        right: NodeId,
    },
    /// `left = right` and compound assignments
    AssignmentExpression {
        /// Operator
        operator: AssignmentOperator,
        /// Assignment target
        left: NodeId,
        /// Assigned value
        right: NodeId,
    },
    /// `test ? consequent : alternate`
    ConditionalExpression {
        /// Condition
        test: NodeId,
        /// Value when true
        consequent: NodeId,
        /// Value when false
        alternate: NodeId,
    },
    /// `callee(arguments)`
    CallExpression {
        /// Called expression
        callee: NodeId,
        /// Arguments
        arguments: Vec<NodeId>,
    },
    /// `new callee(arguments)`
    NewExpression {
        /// Constructor expression
        callee: NodeId,
        /// Arguments
        arguments: Vec<NodeId>,
    },
    /// `object.property` or `object[property]`
    MemberExpression {
        /// Accessed object
        object: NodeId,
        /// Property name or computed key
        property: NodeId,
        /// Whether the bracket form was used
        computed: bool,
    },
    /// Syntax outside the supported set, kept opaque
    Unsupported {
        /// Concrete syntax kind that was not lowered
        kind: Symbol,
    },
}

impl LiteralValue {
    /// The string a property key with this value is stored under
    ///
    /// Strings are used as-is and numbers use JavaScript's number-to-string form.
    /// Other literals do not name a property statically.
    pub fn property_key(&self) -> Option<String> {
        match self {
            Self::String(text) => Some(text.clone()),
            Self::Number(number) => Some(number_to_string(*number)),
            Self::Null | Self::Bool(_) | Self::Regex { .. } => None,
        }
    }
}

/// Format a number the way JavaScript's `String(number)` does for common values
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i128)
    } else {
        format!("{value}")
    }
}

/// Whether `text` can be written as an identifier (and so as a bare property key)
pub fn is_identifier_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|rest| rest.is_alphanumeric() || rest == '_' || rest == '$')
}

impl NodeKind {
    /// Whether this kind carries a known value that the matcher may look through
    pub fn holds_value(&self) -> bool {
        matches!(self, Self::Identifier { .. } | Self::Property { .. })
    }

    /// Whether this kind introduces its own function scope
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration { .. }
                | Self::FunctionExpression { .. }
                | Self::ArrowFunctionExpression { .. }
        )
    }
}

/// Decoded literal value
#[derive(Debug, Clone, PartialEq, Display)]
pub enum LiteralValue {
    /// `null`
    #[display("null")]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any numeric literal
    Number(f64),
    /// String literal, escapes decoded
    #[display("{_0:?}")]
    String(String),
    /// `/pattern/flags`
    #[display("/{pattern}/{flags}")]
    Regex {
        /// Pattern body
        pattern: String,
        /// Flags
        flags: String,
    },
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DeclarationKind {
    /// `var`
    #[display("var")]
    Var,
    /// `let`
    #[display("let")]
    Let,
    /// `const`
    #[display("const")]
    Const,
}

/// Object literal property kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PropertyKind {
    /// `key: value`
    #[display("init")]
    Init,
    /// `get key() {}`
    #[display("get")]
    Get,
    /// `set key(v) {}`
    #[display("set")]
    Set,
}

/// Prefix unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UnaryOperator {
    /// `-`
    #[display("-")]
    Minus,
    /// `+`
    #[display("+")]
    Plus,
    /// `!`
    #[display("!")]
    Not,
    /// `~`
    #[display("~")]
    BitNot,
    /// `typeof`
    #[display("typeof")]
    Typeof,
    /// `void`
    #[display("void")]
    Void,
    /// `delete`
    #[display("delete")]
    Delete,
}

impl UnaryOperator {
    /// Parse an operator token
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "-" => Self::Minus,
            "+" => Self::Plus,
            "!" => Self::Not,
            "~" => Self::BitNot,
            "typeof" => Self::Typeof,
            "void" => Self::Void,
            "delete" => Self::Delete,
            _ => return None,
        })
    }

    /// Whether the operator is a keyword that needs a separating space
    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Typeof | Self::Void | Self::Delete)
    }
}

/// `++` and `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UpdateOperator {
    /// `++`
    #[display("++")]
    Increment,
    /// `--`
    #[display("--")]
    Decrement,
}

impl UpdateOperator {
    /// Parse an operator token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "++" => Some(Self::Increment),
            "--" => Some(Self::Decrement),
            _ => None,
        }
    }
}

/// Non-short-circuit binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOperator {
    /// `==`
    #[display("==")]
    Eq,
    /// `!=`
    #[display("!=")]
    NotEq,
    /// `===`
    #[display("===")]
    StrictEq,
    /// `!==`
    #[display("!==")]
    StrictNotEq,
    /// `<`
    #[display("<")]
    Lt,
    /// `<=`
    #[display("<=")]
    LtEq,
    /// `>`
    #[display(">")]
    Gt,
    /// `>=`
    #[display(">=")]
    GtEq,
    /// `<<`
    #[display("<<")]
    Shl,
    /// `>>`
    #[display(">>")]
    Shr,
    /// `>>>`
    #[display(">>>")]
    UShr,
    /// `+`
    #[display("+")]
    Add,
    /// `-`
    #[display("-")]
    Sub,
    /// `*`
    #[display("*")]
    Mul,
    /// `/`
    #[display("/")]
    Div,
    /// `%`
    #[display("%")]
    Rem,
    /// `**`
    #[display("**")]
    Exp,
    /// `|`
    #[display("|")]
    BitOr,
    /// `^`
    #[display("^")]
    BitXor,
    /// `&`
    #[display("&")]
    BitAnd,
    /// `in`
    #[display("in")]
    In,
    /// `instanceof`
    #[display("instanceof")]
    Instanceof,
}

impl BinaryOperator {
    /// Parse an operator token
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "==" => Self::Eq,
            "!=" => Self::NotEq,
            "===" => Self::StrictEq,
            "!==" => Self::StrictNotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            ">>>" => Self::UShr,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "**" => Self::Exp,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "&" => Self::BitAnd,
            "in" => Self::In,
            "instanceof" => Self::Instanceof,
            _ => return None,
        })
    }
}

/// Short-circuit operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LogicalOperator {
    /// `&&`
    #[display("&&")]
    And,
    /// `||`
    #[display("||")]
    Or,
    /// `??`
    #[display("??")]
    Coalesce,
}

impl LogicalOperator {
    /// Parse an operator token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            "??" => Some(Self::Coalesce),
            _ => None,
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AssignmentOperator {
    /// `=`
    #[display("=")]
    Assign,
    /// `+=`
    #[display("+=")]
    Add,
    /// `-=`
    #[display("-=")]
    Sub,
    /// `*=`
    #[display("*=")]
    Mul,
    /// `/=`
    #[display("/=")]
    Div,
    /// `%=`
    #[display("%=")]
    Rem,
    /// `**=`
    #[display("**=")]
    Exp,
    /// `<<=`
    #[display("<<=")]
    Shl,
    /// `>>=`
    #[display(">>=")]
    Shr,
    /// `>>>=`
    #[display(">>>=")]
    UShr,
    /// `|=`
    #[display("|=")]
    BitOr,
    /// `^=`
    #[display("^=")]
    BitXor,
    /// `&=`
    #[display("&=")]
    BitAnd,
    /// `&&=`
    #[display("&&=")]
    And,
    /// `||=`
    #[display("||=")]
    Or,
    /// `??=`
    #[display("??=")]
    Coalesce,
}

impl AssignmentOperator {
    /// Parse an operator token
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Self::Assign,
            "+=" => Self::Add,
            "-=" => Self::Sub,
            "*=" => Self::Mul,
            "/=" => Self::Div,
            "%=" => Self::Rem,
            "**=" => Self::Exp,
            "<<=" => Self::Shl,
            ">>=" => Self::Shr,
            ">>>=" => Self::UShr,
            "|=" => Self::BitOr,
            "^=" => Self::BitXor,
            "&=" => Self::BitAnd,
            "&&=" => Self::And,
            "||=" => Self::Or,
            "??=" => Self::Coalesce,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(42.0), "42");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_is_identifier_name() {
        assert!(is_identifier_name("a"));
        assert!(is_identifier_name("$el_1"));
        assert!(!is_identifier_name("1a"));
        assert!(!is_identifier_name("a-b"));
        assert!(!is_identifier_name(""));
    }

    #[test]
    fn test_property_key() {
        assert_eq!(LiteralValue::from("a").property_key().as_deref(), Some("a"));
        assert_eq!(LiteralValue::from(3).property_key().as_deref(), Some("3"));
        assert_eq!(LiteralValue::Null.property_key(), None);
    }
}
