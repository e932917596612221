//! tree-sitter JavaScript → ESTree-shaped node lowering

use crate::literal::{parse_number, unescape_string};
use jv_span::{FileId, FileSpan, Span};
use jv_syntax::{
    AssignmentOperator, Ast, BinaryOperator, DeclarationKind, LiteralValue, LogicalOperator,
    NodeId, NodeKind, PropertyKind, UnaryOperator, UpdateOperator,
};
use tree_sitter::Node;

/// Statements and expressions nested deeper than this are lowered as opaque nodes
pub const MAX_LOWERING_DEPTH: usize = 512;

/// Lowering state for one source file
struct LoweringContext<'ctx> {
    ast: &'ctx mut Ast,
    source: &'ctx str,
    file: FileId,
    depth: usize,
}

impl LoweringContext<'_> {
    fn span(&self, node: Node<'_>) -> FileSpan {
        FileSpan::new(
            self.file,
            Span::new(node.start_byte() as u32, node.end_byte() as u32),
        )
    }

    fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn alloc(&mut self, kind: NodeKind, node: Node<'_>) -> NodeId {
        let span = self.span(node);
        self.ast.alloc(kind, span)
    }

    fn identifier(&mut self, node: Node<'_>) -> NodeId {
        let name = self.ast.intern(self.text(node));
        self.alloc(NodeKind::Identifier { name }, node)
    }

    fn literal(&mut self, value: LiteralValue, node: Node<'_>) -> NodeId {
        self.alloc(NodeKind::Literal { value }, node)
    }

    fn unsupported(&mut self, node: Node<'_>) -> NodeId {
        let kind = self.ast.intern(node.kind());
        self.alloc(NodeKind::Unsupported { kind }, node)
    }

    /// Run `lower` one level deeper; past [`MAX_LOWERING_DEPTH`] the node stays opaque
    fn nested(&mut self, node: Node<'_>, lower: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        if self.depth >= MAX_LOWERING_DEPTH {
            return self.unsupported(node);
        }
        self.depth += 1;
        let id = lower(self);
        self.depth -= 1;
        id
    }
}

/// Lower a `program` node
pub(crate) fn lower_program(ast: &mut Ast, source: &str, file: FileId, root: Node<'_>) -> NodeId {
    let mut ctx = LoweringContext {
        ast,
        source,
        file,
        depth: 0,
    };
    let body = named_children(root)
        .into_iter()
        .filter(|child| child.kind() != "hash_bang_line")
        .map(|child| lower_statement(&mut ctx, child))
        .collect();
    ctx.alloc(NodeKind::Program { body }, root)
}

/// Named children without comments
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// All children, including anonymous tokens
fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Whether an anonymous token with the given text is a direct child
fn has_token(node: Node<'_>, token: &str) -> bool {
    all_children(node)
        .iter()
        .any(|child| !child.is_named() && child.kind() == token)
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node).into_iter().next()
}

fn lower_statements(ctx: &mut LoweringContext<'_>, nodes: Vec<Node<'_>>) -> Vec<NodeId> {
    nodes
        .into_iter()
        .map(|child| lower_statement(ctx, child))
        .collect()
}

fn lower_statement(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    ctx.nested(node, |deeper| lower_statement_kind(deeper, node))
}

fn lower_statement_kind(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    match node.kind() {
        "expression_statement" => {
            let Some(inner) = first_named(node) else {
                return ctx.alloc(NodeKind::EmptyStatement, node);
            };
            let expression = lower_expression(ctx, inner);
            ctx.alloc(NodeKind::ExpressionStatement { expression }, node)
        }
        "variable_declaration" => lower_declaration(ctx, node, DeclarationKind::Var),
        "lexical_declaration" => {
            let kind = if ctx.text(node).starts_with("const") {
                DeclarationKind::Const
            } else {
                DeclarationKind::Let
            };
            lower_declaration(ctx, node, kind)
        }
        "statement_block" => {
            let body = lower_statements(ctx, named_children(node));
            ctx.alloc(NodeKind::BlockStatement { body }, node)
        }
        "empty_statement" => ctx.alloc(NodeKind::EmptyStatement, node),
        "if_statement" => {
            let test = lower_field_expression(ctx, node, "condition");
            let consequent = lower_field_statement(ctx, node, "consequence");
            let alternate = node
                .child_by_field_name("alternative")
                .map(|clause| match first_named(clause) {
                    Some(statement) if clause.kind() == "else_clause" => {
                        lower_statement(ctx, statement)
                    }
                    _ => lower_statement(ctx, clause),
                });
            ctx.alloc(
                NodeKind::IfStatement {
                    test,
                    consequent,
                    alternate,
                },
                node,
            )
        }
        "for_statement" => lower_for(ctx, node),
        "for_in_statement" => lower_for_in(ctx, node),
        "while_statement" => {
            let test = lower_field_expression(ctx, node, "condition");
            let body = lower_field_statement(ctx, node, "body");
            ctx.alloc(NodeKind::WhileStatement { test, body }, node)
        }
        "do_statement" => {
            let body = lower_field_statement(ctx, node, "body");
            let test = lower_field_expression(ctx, node, "condition");
            ctx.alloc(NodeKind::DoWhileStatement { body, test }, node)
        }
        "break_statement" | "continue_statement" => {
            let label = node
                .child_by_field_name("label")
                .map(|label| ctx.identifier(label));
            let kind = if node.kind() == "break_statement" {
                NodeKind::BreakStatement { label }
            } else {
                NodeKind::ContinueStatement { label }
            };
            ctx.alloc(kind, node)
        }
        "labeled_statement" => {
            let Some(label_node) = node.child_by_field_name("label") else {
                return ctx.unsupported(node);
            };
            let label = ctx.identifier(label_node);
            let body = lower_field_statement(ctx, node, "body");
            ctx.alloc(NodeKind::LabeledStatement { label, body }, node)
        }
        "switch_statement" => lower_switch(ctx, node),
        "try_statement" => lower_try(ctx, node),
        "return_statement" => {
            let argument = first_named(node).map(|value| lower_expression(ctx, value));
            ctx.alloc(NodeKind::ReturnStatement { argument }, node)
        }
        "throw_statement" => match first_named(node) {
            Some(value) => {
                let argument = lower_expression(ctx, value);
                ctx.alloc(NodeKind::ThrowStatement { argument }, node)
            }
            None => ctx.unsupported(node),
        },
        "debugger_statement" => ctx.alloc(NodeKind::DebuggerStatement, node),
        "function_declaration" | "generator_function_declaration" => {
            lower_function(ctx, node, FunctionForm::Declaration)
        }
        _ => ctx.unsupported(node),
    }
}

fn lower_field_statement(ctx: &mut LoweringContext<'_>, node: Node<'_>, field: &str) -> NodeId {
    match node.child_by_field_name(field) {
        Some(child) => lower_statement(ctx, child),
        None => ctx.unsupported(node),
    }
}

fn lower_field_expression(ctx: &mut LoweringContext<'_>, node: Node<'_>, field: &str) -> NodeId {
    match node.child_by_field_name(field) {
        Some(child) => lower_expression(ctx, child),
        None => ctx.unsupported(node),
    }
}

fn lower_declaration(
    ctx: &mut LoweringContext<'_>,
    node: Node<'_>,
    kind: DeclarationKind,
) -> NodeId {
    let declarations = named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "variable_declarator")
        .map(|declarator| {
            let id = match declarator.child_by_field_name("name") {
                Some(name) => lower_pattern(ctx, name),
                None => ctx.unsupported(declarator),
            };
            let init = declarator
                .child_by_field_name("value")
                .map(|value| lower_expression(ctx, value));
            ctx.alloc(NodeKind::VariableDeclarator { id, init }, declarator)
        })
        .collect();
    ctx.alloc(NodeKind::VariableDeclaration { kind, declarations }, node)
}

/// Lower a clause of a `for` header that may be wrapped in a statement
fn lower_for_clause(ctx: &mut LoweringContext<'_>, clause: Option<Node<'_>>) -> Option<NodeId> {
    let clause = clause.filter(Node::is_named)?;
    match clause.kind() {
        "empty_statement" => None,
        "variable_declaration" | "lexical_declaration" => Some(lower_statement(ctx, clause)),
        "expression_statement" => first_named(clause).map(|inner| lower_expression(ctx, inner)),
        _ => Some(lower_expression(ctx, clause)),
    }
}

fn lower_for(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let init = lower_for_clause(ctx, node.child_by_field_name("initializer"));
    let test = lower_for_clause(ctx, node.child_by_field_name("condition"));
    let update = lower_for_clause(ctx, node.child_by_field_name("increment"));
    let body = lower_field_statement(ctx, node, "body");
    ctx.alloc(
        NodeKind::ForStatement {
            init,
            test,
            update,
            body,
        },
        node,
    )
}

fn lower_for_in(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let Some(left_node) = node.child_by_field_name("left") else {
        return ctx.unsupported(node);
    };
    let declaration_kind = node
        .child_by_field_name("kind")
        .map(|kind| match ctx.text(kind) {
            "let" => DeclarationKind::Let,
            "const" => DeclarationKind::Const,
            _ => DeclarationKind::Var,
        });
    let left = match declaration_kind {
        Some(kind) => {
            let id = lower_pattern(ctx, left_node);
            let declarator = ctx.alloc(NodeKind::VariableDeclarator { id, init: None }, left_node);
            ctx.alloc(
                NodeKind::VariableDeclaration {
                    kind,
                    declarations: vec![declarator],
                },
                left_node,
            )
        }
        None => lower_expression(ctx, left_node),
    };
    let right = lower_field_expression(ctx, node, "right");
    let body = lower_field_statement(ctx, node, "body");
    let kind = if has_token(node, "of") {
        NodeKind::ForOfStatement { left, right, body }
    } else {
        NodeKind::ForInStatement { left, right, body }
    };
    ctx.alloc(kind, node)
}

fn lower_switch(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let discriminant = lower_field_expression(ctx, node, "value");
    let clauses = node
        .child_by_field_name("body")
        .map(named_children)
        .unwrap_or_default();
    let cases = clauses
        .into_iter()
        .map(|clause| {
            let value = clause.child_by_field_name("value");
            let test = value.map(|value| lower_expression(ctx, value));
            let statements = named_children(clause)
                .into_iter()
                .filter(|child| value.is_none_or(|value| value.id() != child.id()))
                .collect();
            let consequent = lower_statements(ctx, statements);
            ctx.alloc(NodeKind::SwitchCase { test, consequent }, clause)
        })
        .collect();
    ctx.alloc(
        NodeKind::SwitchStatement {
            discriminant,
            cases,
        },
        node,
    )
}

fn lower_try(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let block = lower_field_statement(ctx, node, "body");
    let handler = node.child_by_field_name("handler").map(|clause| {
        let param = clause
            .child_by_field_name("parameter")
            .map(|param| lower_pattern(ctx, param));
        let body = lower_field_statement(ctx, clause, "body");
        ctx.alloc(NodeKind::CatchClause { param, body }, clause)
    });
    let finalizer = node
        .child_by_field_name("finalizer")
        .map(|clause| lower_field_statement(ctx, clause, "body"));
    ctx.alloc(
        NodeKind::TryStatement {
            block,
            handler,
            finalizer,
        },
        node,
    )
}

/// Binding targets: plain identifiers are supported, destructuring is opaque
fn lower_pattern(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    match node.kind() {
        "identifier" | "undefined" => ctx.identifier(node),
        _ => ctx.unsupported(node),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionForm {
    Declaration,
    Expression,
    /// Object literal method; the name belongs to the property key
    Method,
}

fn lower_parameters(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> Vec<NodeId> {
    node.child_by_field_name("parameters")
        .map(named_children)
        .unwrap_or_default()
        .into_iter()
        .map(|param| lower_pattern(ctx, param))
        .collect()
}

fn lower_function(ctx: &mut LoweringContext<'_>, node: Node<'_>, form: FunctionForm) -> NodeId {
    let id = match form {
        FunctionForm::Method => None,
        FunctionForm::Declaration | FunctionForm::Expression => node
            .child_by_field_name("name")
            .map(|name| ctx.identifier(name)),
    };
    let params = lower_parameters(ctx, node);
    let body = lower_field_statement(ctx, node, "body");
    let generator = node.kind().starts_with("generator") || has_token(node, "*");
    let is_async = has_token(node, "async");
    let kind = match form {
        FunctionForm::Declaration => NodeKind::FunctionDeclaration {
            id,
            params,
            body,
            generator,
            is_async,
        },
        FunctionForm::Expression | FunctionForm::Method => NodeKind::FunctionExpression {
            id,
            params,
            body,
            generator,
            is_async,
        },
    };
    ctx.alloc(kind, node)
}

fn lower_arrow(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let params = match node.child_by_field_name("parameter") {
        Some(param) => vec![lower_pattern(ctx, param)],
        None => lower_parameters(ctx, node),
    };
    let (body, expression) = match node.child_by_field_name("body") {
        Some(body) if body.kind() == "statement_block" => (lower_statement(ctx, body), false),
        Some(body) => (lower_expression(ctx, body), true),
        None => (ctx.unsupported(node), true),
    };
    let is_async = has_token(node, "async");
    ctx.alloc(
        NodeKind::ArrowFunctionExpression {
            params,
            body,
            expression,
            is_async,
        },
        node,
    )
}

fn lower_expression(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    ctx.nested(node, |deeper| lower_expression_kind(deeper, node))
}

fn lower_expression_kind(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    match node.kind() {
        "parenthesized_expression" => match first_named(node) {
            Some(inner) => lower_expression(ctx, inner),
            None => ctx.unsupported(node),
        },
        "identifier"
        | "property_identifier"
        | "shorthand_property_identifier"
        | "statement_identifier"
        | "undefined" => ctx.identifier(node),
        "number" => match parse_number(ctx.text(node)) {
            Some(number) => ctx.literal(LiteralValue::Number(number), node),
            None => ctx.unsupported(node),
        },
        "string" => {
            let value = unescape_string(ctx.text(node));
            ctx.literal(LiteralValue::String(value), node)
        }
        "template_string" => {
            let substituted = named_children(node)
                .iter()
                .any(|child| child.kind() == "template_substitution");
            if substituted {
                ctx.unsupported(node)
            } else {
                let value = unescape_string(ctx.text(node));
                ctx.literal(LiteralValue::String(value), node)
            }
        }
        "regex" => {
            let pattern = node
                .child_by_field_name("pattern")
                .map(|part| ctx.text(part).to_string())
                .unwrap_or_default();
            let flags = node
                .child_by_field_name("flags")
                .map(|part| ctx.text(part).to_string())
                .unwrap_or_default();
            ctx.literal(LiteralValue::Regex { pattern, flags }, node)
        }
        "true" => ctx.literal(LiteralValue::Bool(true), node),
        "false" => ctx.literal(LiteralValue::Bool(false), node),
        "null" => ctx.literal(LiteralValue::Null, node),
        "this" => ctx.alloc(NodeKind::ThisExpression, node),
        "array" => lower_array(ctx, node),
        "object" => lower_object(ctx, node),
        "function_expression" | "function" | "generator_function" => {
            lower_function(ctx, node, FunctionForm::Expression)
        }
        "arrow_function" => lower_arrow(ctx, node),
        "call_expression" => {
            let callee = lower_field_expression(ctx, node, "function");
            let arguments = node
                .child_by_field_name("arguments")
                .map(|args| lower_arguments(ctx, args))
                .unwrap_or_default();
            ctx.alloc(NodeKind::CallExpression { callee, arguments }, node)
        }
        "new_expression" => {
            let callee = lower_field_expression(ctx, node, "constructor");
            let arguments = node
                .child_by_field_name("arguments")
                .map(|args| lower_arguments(ctx, args))
                .unwrap_or_default();
            ctx.alloc(NodeKind::NewExpression { callee, arguments }, node)
        }
        "member_expression" => {
            let object = lower_field_expression(ctx, node, "object");
            let property = match node.child_by_field_name("property") {
                Some(property) if property.kind() == "property_identifier" => {
                    ctx.identifier(property)
                }
                Some(property) => ctx.unsupported(property),
                None => ctx.unsupported(node),
            };
            ctx.alloc(
                NodeKind::MemberExpression {
                    object,
                    property,
                    computed: false,
                },
                node,
            )
        }
        "subscript_expression" => {
            let object = lower_field_expression(ctx, node, "object");
            let property = lower_field_expression(ctx, node, "index");
            ctx.alloc(
                NodeKind::MemberExpression {
                    object,
                    property,
                    computed: true,
                },
                node,
            )
        }
        "assignment_expression" | "augmented_assignment_expression" => {
            let operator = match node.child_by_field_name("operator") {
                Some(token) => AssignmentOperator::from_token(ctx.text(token)),
                None => Some(AssignmentOperator::Assign),
            };
            let Some(operator) = operator else {
                return ctx.unsupported(node);
            };
            let left = match node.child_by_field_name("left") {
                Some(left) if matches!(left.kind(), "object_pattern" | "array_pattern") => {
                    ctx.unsupported(left)
                }
                Some(left) => lower_expression(ctx, left),
                None => ctx.unsupported(node),
            };
            let right = lower_field_expression(ctx, node, "right");
            ctx.alloc(
                NodeKind::AssignmentExpression {
                    operator,
                    left,
                    right,
                },
                node,
            )
        }
        "binary_expression" => {
            let token = node
                .child_by_field_name("operator")
                .map(|token| ctx.text(token).to_string())
                .unwrap_or_default();
            let left = lower_field_expression(ctx, node, "left");
            let right = lower_field_expression(ctx, node, "right");
            if let Some(operator) = LogicalOperator::from_token(&token) {
                ctx.alloc(
                    NodeKind::LogicalExpression {
                        operator,
                        left,
                        right,
                    },
                    node,
                )
            } else if let Some(operator) = BinaryOperator::from_token(&token) {
                ctx.alloc(
                    NodeKind::BinaryExpression {
                        operator,
                        left,
                        right,
                    },
                    node,
                )
            } else {
                ctx.unsupported(node)
            }
        }
        "unary_expression" => {
            let operator = node
                .child_by_field_name("operator")
                .and_then(|token| UnaryOperator::from_token(ctx.text(token)));
            let Some(operator) = operator else {
                return ctx.unsupported(node);
            };
            let argument = lower_field_expression(ctx, node, "argument");
            ctx.alloc(NodeKind::UnaryExpression { operator, argument }, node)
        }
        "update_expression" => {
            let Some(token) = node.child_by_field_name("operator") else {
                return ctx.unsupported(node);
            };
            let Some(operator) = UpdateOperator::from_token(ctx.text(token)) else {
                return ctx.unsupported(node);
            };
            let prefix = token.start_byte() == node.start_byte();
            let argument = lower_field_expression(ctx, node, "argument");
            ctx.alloc(
                NodeKind::UpdateExpression {
                    operator,
                    prefix,
                    argument,
                },
                node,
            )
        }
        "ternary_expression" => {
            let test = lower_field_expression(ctx, node, "condition");
            let consequent = lower_field_expression(ctx, node, "consequence");
            let alternate = lower_field_expression(ctx, node, "alternative");
            ctx.alloc(
                NodeKind::ConditionalExpression {
                    test,
                    consequent,
                    alternate,
                },
                node,
            )
        }
        "sequence_expression" => {
            let mut parts = Vec::new();
            flatten_sequence(node, &mut parts);
            let expressions = parts
                .into_iter()
                .map(|part| lower_expression(ctx, part))
                .collect();
            ctx.alloc(NodeKind::SequenceExpression { expressions }, node)
        }
        _ => ctx.unsupported(node),
    }
}

/// Older grammars nest sequences as `left, right` pairs
fn flatten_sequence<'tree>(node: Node<'tree>, parts: &mut Vec<Node<'tree>>) {
    let mut pending = named_children(node);
    pending.reverse();
    while let Some(current) = pending.pop() {
        if current.kind() == "sequence_expression" {
            pending.extend(named_children(current).into_iter().rev());
        } else {
            parts.push(current);
        }
    }
}

fn lower_arguments(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> Vec<NodeId> {
    if node.kind() == "arguments" {
        named_children(node)
            .into_iter()
            .map(|argument| lower_expression(ctx, argument))
            .collect()
    } else {
        vec![lower_expression(ctx, node)]
    }
}

fn lower_array(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let mut elements = Vec::new();
    let mut pending: Option<Option<NodeId>> = None;
    for child in all_children(node) {
        match child.kind() {
            "[" | "comment" => {}
            "," => elements.push(pending.take().unwrap_or(None)),
            "]" => {
                if let Some(element) = pending.take() {
                    elements.push(element);
                }
            }
            _ => pending = Some(Some(lower_expression(ctx, child))),
        }
    }
    ctx.alloc(NodeKind::ArrayExpression { elements }, node)
}

fn lower_object(ctx: &mut LoweringContext<'_>, node: Node<'_>) -> NodeId {
    let properties = named_children(node)
        .into_iter()
        .map(|member| lower_property(ctx, member))
        .collect();
    let span = ctx.span(node);
    ctx.ast.alloc_object(properties, span)
}

/// Lower a property key, returning the key node and whether it is computed
fn lower_property_key(ctx: &mut LoweringContext<'_>, key: Node<'_>) -> (NodeId, bool) {
    match key.kind() {
        "computed_property_name" => match first_named(key) {
            Some(inner) => (lower_expression(ctx, inner), true),
            None => (ctx.unsupported(key), true),
        },
        "property_identifier" | "identifier" | "private_property_identifier" => {
            (ctx.identifier(key), false)
        }
        _ => (lower_expression(ctx, key), false),
    }
}

fn lower_property(ctx: &mut LoweringContext<'_>, member: Node<'_>) -> NodeId {
    let (key, value, computed, kind, method, shorthand) = match member.kind() {
        "pair" => {
            let (key, computed) = match member.child_by_field_name("key") {
                Some(key) => lower_property_key(ctx, key),
                None => (ctx.unsupported(member), false),
            };
            let value = lower_field_expression(ctx, member, "value");
            (key, value, computed, PropertyKind::Init, false, false)
        }
        "shorthand_property_identifier" => {
            let key = ctx.identifier(member);
            let value = ctx.identifier(member);
            (key, value, false, PropertyKind::Init, false, true)
        }
        "method_definition" => {
            let (key, computed) = match member.child_by_field_name("name") {
                Some(name) => lower_property_key(ctx, name),
                None => (ctx.unsupported(member), false),
            };
            let accessor = all_children(member)
                .into_iter()
                .take_while(|child| !child.is_named())
                .find_map(|child| match child.kind() {
                    "get" => Some(PropertyKind::Get),
                    "set" => Some(PropertyKind::Set),
                    _ => None,
                });
            let value = lower_function(ctx, member, FunctionForm::Method);
            let kind = accessor.unwrap_or(PropertyKind::Init);
            (key, value, computed, kind, accessor.is_none(), false)
        }
        _ => return ctx.unsupported(member),
    };

    let id = ctx.alloc(
        NodeKind::Property {
            key,
            computed,
            kind,
            method,
            shorthand,
        },
        member,
    );
    ctx.ast.set_value(id, value);
    id
}
