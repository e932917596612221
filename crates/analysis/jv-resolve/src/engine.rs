//! Per-kind resolution rules

use crate::ResolutionContext;
use crate::error::ResolveError;
use crate::module;
use jv_match::Patterns;
use jv_scope::{ScopeId, ScopeKind, ScopeTree};
use jv_span::FileId;
use jv_syntax::{
    AssignmentOperator, Ast, KindPattern, LiteralValue, NodeId, NodeKind, Pattern, PropertyPattern,
    is_identifier_name, number_to_string,
};
use std::path::Path;
use tracing::{debug, trace};

/// What a member access on a known value refers to
enum MemberTarget {
    /// Property of an object, by name
    Key(String),
    /// Element of an array
    Element(NodeId),
}

/// Resolves the nodes of one module
pub(crate) struct Resolver<'cx, 'obs> {
    cx: &'cx mut ResolutionContext<'obs>,
    scopes: &'cx mut ScopeTree,
    file: FileId,
    path: &'cx Path,
    depth: usize,
}

impl<'cx, 'obs> Resolver<'cx, 'obs> {
    pub(crate) fn new(
        cx: &'cx mut ResolutionContext<'obs>,
        file: FileId,
        path: &'cx Path,
        scopes: &'cx mut ScopeTree,
    ) -> Self {
        Self {
            cx,
            scopes,
            file,
            path,
            depth: 0,
        }
    }

    fn ast(&self) -> &Ast {
        &self.cx.ast
    }

    fn ast_mut(&mut self) -> &mut Ast {
        &mut self.cx.ast
    }

    /// Resolve `node` in `scope`, returning the node it statically evaluates to
    ///
    /// Failures are reported and yield `node` unchanged. Nodes owned by another module
    /// were resolved by that module's pass and are returned as they are.
    pub(crate) fn resolve(&mut self, scope: ScopeId, node: NodeId) -> NodeId {
        let span = self.ast().span(node);
        if span.file != self.file {
            return node;
        }

        let limit = self.cx.options.max_nesting_depth;
        let outcome = if self.depth >= limit {
            Err(ResolveError::NestingTooDeep { limit, span })
        } else {
            self.depth += 1;
            let outcome = self.resolve_kind(scope, node);
            self.depth -= 1;
            outcome
        };

        match outcome {
            Ok(resolved) => {
                trace!(kind = %self.ast().kind(node).tag(), ?node, ?resolved, "resolved");
                self.cx.notify(scope, resolved);
                resolved
            }
            Err(error) => {
                self.cx.report(&error);
                node
            }
        }
    }

    fn resolve_kind(&mut self, scope: ScopeId, node: NodeId) -> Result<NodeId, ResolveError> {
        let kind = self.ast().kind(node).clone();
        match kind {
            NodeKind::Identifier { name } => Ok(self
                .scopes
                .lookup(scope, name)
                .map_or(node, |binding| binding.node)),
            NodeKind::Literal { .. }
            | NodeKind::ThisExpression
            | NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement => Ok(node),
            NodeKind::VariableDeclarator { id, init } => Ok(self.declarator(scope, node, id, init)),
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => Ok(self.assignment(scope, node, operator, left, right)),
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => self.member(scope, node, object, property, computed),
            NodeKind::CallExpression { callee, arguments } => {
                let (callee, arguments) = self.call_parts(scope, callee, arguments);
                self.set_kind(
                    node,
                    NodeKind::CallExpression {
                        callee,
                        arguments: arguments.clone(),
                    },
                );
                Ok(self.follow_require(node, callee, &arguments))
            }
            NodeKind::NewExpression { callee, arguments } => {
                let (callee, arguments) = self.call_parts(scope, callee, arguments);
                self.set_kind(
                    node,
                    NodeKind::NewExpression {
                        callee,
                        arguments: arguments.clone(),
                    },
                );
                Ok(self.follow_require(node, callee, &arguments))
            }
            NodeKind::FunctionDeclaration { .. }
            | NodeKind::FunctionExpression { .. }
            | NodeKind::ArrowFunctionExpression { .. } => Ok(self.function(scope, node, kind)),
            NodeKind::Property { key, computed, .. } => Ok(self.property(scope, node, key, computed)),
            NodeKind::ObjectExpression => Ok(self.object(scope, node)),
            NodeKind::Unsupported { kind: syntax } => Err(ResolveError::UnsupportedNode {
                kind: self.ast().name(syntax).to_string(),
                span: self.ast().span(node),
            }),
            other @ (NodeKind::Program { .. }
            | NodeKind::ExpressionStatement { .. }
            | NodeKind::VariableDeclaration { .. }
            | NodeKind::BlockStatement { .. }
            | NodeKind::IfStatement { .. }
            | NodeKind::ForStatement { .. }
            | NodeKind::ForInStatement { .. }
            | NodeKind::ForOfStatement { .. }
            | NodeKind::WhileStatement { .. }
            | NodeKind::DoWhileStatement { .. }
            | NodeKind::ContinueStatement { .. }
            | NodeKind::BreakStatement { .. }
            | NodeKind::LabeledStatement { .. }
            | NodeKind::SwitchStatement { .. }
            | NodeKind::SwitchCase { .. }
            | NodeKind::TryStatement { .. }
            | NodeKind::CatchClause { .. }
            | NodeKind::ReturnStatement { .. }
            | NodeKind::ThrowStatement { .. }
            | NodeKind::ArrayExpression { .. }
            | NodeKind::SequenceExpression { .. }
            | NodeKind::UnaryExpression { .. }
            | NodeKind::UpdateExpression { .. }
            | NodeKind::BinaryExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::ConditionalExpression { .. }) => Ok(self.pass_through(scope, node, other)),
        }
    }

    fn set_kind(&mut self, node: NodeId, kind: NodeKind) {
        self.ast_mut().node_mut(node).kind = kind;
    }

    /// Resolve every child in field order and write the results back
    fn pass_through(&mut self, scope: ScopeId, node: NodeId, mut kind: NodeKind) -> NodeId {
        for slot in kind.child_slots_mut() {
            *slot = self.resolve(scope, *slot);
        }
        self.set_kind(node, kind);
        node
    }

    /// Make `value` the known value of `target`
    ///
    /// Only identifiers and properties hold values. A value whose chain already passes
    /// through `target` is replaced by the end of that chain, so chains stay acyclic.
    /// Objects share their property list with the target.
    fn bind_value(&mut self, target: NodeId, value: NodeId) {
        if target == value || !self.ast().kind(target).holds_value() {
            return;
        }
        let mut value = value;
        if self.ast().value_chain(value).any(|step| step == target) {
            match self.ast().final_value(value) {
                Some(end) if end != target => value = end,
                _ => return,
            }
        }

        self.ast_mut().set_value(target, value);
        let object = self
            .ast()
            .final_value(value)
            .filter(|end| matches!(self.ast().kind(*end), NodeKind::ObjectExpression));
        if let Some(object) = object {
            let list = self.ast_mut().ensure_property_list(object);
            self.ast_mut().share_properties(target, list);
        }
    }

    fn declarator(&mut self, scope: ScopeId, node: NodeId, id: NodeId, init: Option<NodeId>) -> NodeId {
        let id = self.resolve(scope, id);
        let init = init.map(|init| self.resolve(scope, init));
        self.set_kind(node, NodeKind::VariableDeclarator { id, init });
        // `var a;` keeps whatever `a` already holds.
        if let Some(init) = init {
            self.bind_value(id, init);
        }
        node
    }

    fn assignment(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        operator: AssignmentOperator,
        left: NodeId,
        right: NodeId,
    ) -> NodeId {
        let left = self.resolve(scope, left);
        let right = self.resolve(scope, right);
        self.set_kind(
            node,
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            },
        );
        if operator == AssignmentOperator::Assign {
            self.bind_value(left, right);
        } else {
            self.bind_value(left, node);
        }
        node
    }

    fn member(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        object: NodeId,
        property: NodeId,
        computed: bool,
    ) -> Result<NodeId, ResolveError> {
        let object = self.resolve(scope, object);
        let property = if computed {
            self.resolve(scope, property)
        } else {
            property
        };
        self.set_kind(
            node,
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            },
        );

        let value = self
            .ast()
            .final_value(object)
            .ok_or_else(|| ResolveError::UnboundedValueChain {
                span: self.ast().span(object),
            })?;
        let target = match self.ast().kind(value) {
            NodeKind::ObjectExpression => self.member_key(property, computed).map(MemberTarget::Key),
            NodeKind::ArrayExpression { elements } => self
                .array_index(property, computed)
                .and_then(|index| elements.get(index).copied().flatten())
                .map(MemberTarget::Element),
            _ => None,
        };
        Ok(match target {
            Some(MemberTarget::Key(key)) => self.find_or_create_property(value, &key, node),
            Some(MemberTarget::Element(element)) => element,
            None => node,
        })
    }

    /// Static property name of a member access
    fn member_key(&self, property: NodeId, computed: bool) -> Option<String> {
        let ast = self.ast();
        if !computed {
            return ast.identifier_name(property).map(str::to_string);
        }
        match ast.kind(ast.final_value(property)?) {
            NodeKind::Literal { value } => value.property_key(),
            _ => None,
        }
    }

    /// Static array index of a member access
    fn array_index(&self, property: NodeId, computed: bool) -> Option<usize> {
        if !computed {
            return None;
        }
        let ast = self.ast();
        match ast.kind(ast.final_value(property)?) {
            NodeKind::Literal {
                value: LiteralValue::Number(number),
            } if *number >= 0.0 && number.fract() == 0.0 && *number <= f64::from(u32::MAX) => {
                Some(*number as usize)
            }
            NodeKind::Literal {
                value: LiteralValue::String(text),
            } => text
                .parse::<u32>()
                .ok()
                .filter(|index| index.to_string() == *text)
                .map(|index| index as usize),
            _ => None,
        }
    }

    /// The property of `object` named `key`, appending `key: undefined` if absent
    fn find_or_create_property(&mut self, object: NodeId, key: &str, member: NodeId) -> NodeId {
        let list = self.ast_mut().ensure_property_list(object);
        let found = {
            let ast = self.ast();
            let patterns = Patterns::new(ast.interner());
            let keys = key_patterns(&patterns, key);
            ast.property_list_items(list).iter().copied().find(|item| {
                keys.iter()
                    .any(|pattern| jv_match::matches(ast, *item, pattern))
            })
        };
        if let Some(property) = found {
            return property;
        }

        let span = self.ast().span(member);
        let key_node = if is_identifier_name(key) {
            self.ast_mut().alloc_identifier(key, span)
        } else {
            self.ast_mut().alloc_literal(key, span)
        };
        let placeholder = self.ast_mut().alloc_identifier("undefined", span);
        let property = self.ast_mut().alloc_property(key_node, placeholder, span);
        self.ast_mut().push_property(list, property);
        trace!(key, "synthesized property");
        property
    }

    fn call_parts(&mut self, scope: ScopeId, callee: NodeId, arguments: Vec<NodeId>) -> (NodeId, Vec<NodeId>) {
        let callee = self.resolve(scope, callee);
        let arguments = arguments
            .into_iter()
            .map(|argument| self.resolve(scope, argument))
            .collect();
        (callee, arguments)
    }

    /// Replace `require('<relative>')` by the required module's exports
    fn follow_require(&mut self, node: NodeId, callee: NodeId, arguments: &[NodeId]) -> NodeId {
        if !self.cx.options.follow_requires || self.ast().identifier_name(callee) != Some("require") {
            return node;
        }
        let Some(specifier) = arguments.first().and_then(|argument| self.string_value(*argument)) else {
            return node;
        };

        match module::follow_require(self.cx, &specifier, self.path) {
            Ok(exports) => exports,
            Err(error) => {
                debug!(specifier, %error, "require not followed");
                node
            }
        }
    }

    fn string_value(&self, node: NodeId) -> Option<String> {
        let ast = self.ast();
        match ast.kind(ast.final_value(node)?) {
            NodeKind::Literal {
                value: LiteralValue::String(text),
            } => Some(text.clone()),
            _ => None,
        }
    }

    fn function(&mut self, scope: ScopeId, node: NodeId, kind: NodeKind) -> NodeId {
        let inner = match self.scopes.acquire(node) {
            Some(inner) => inner,
            None => self.scopes.create_child(scope, ScopeKind::Function, node),
        };

        match kind {
            NodeKind::FunctionDeclaration {
                id,
                params,
                body,
                generator,
                is_async,
            } => {
                let id = id.map(|id| self.resolve(scope, id));
                self.parameters(scope, inner, &params);
                let body = self.resolve(inner, body);
                self.set_kind(
                    node,
                    NodeKind::FunctionDeclaration {
                        id,
                        params,
                        body,
                        generator,
                        is_async,
                    },
                );
                if let Some(id) = id {
                    self.bind_value(id, node);
                }
            }
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                generator,
                is_async,
            } => {
                // The name of a function expression is only visible inside it.
                if let Some(name) = id {
                    let name = self.resolve(inner, name);
                    self.bind_value(name, node);
                }
                self.parameters(scope, inner, &params);
                let body = self.resolve(inner, body);
                self.set_kind(
                    node,
                    NodeKind::FunctionExpression {
                        id,
                        params,
                        body,
                        generator,
                        is_async,
                    },
                );
            }
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression,
                is_async,
            } => {
                self.parameters(scope, inner, &params);
                let body = self.resolve(inner, body);
                self.set_kind(
                    node,
                    NodeKind::ArrowFunctionExpression {
                        params,
                        body,
                        expression,
                        is_async,
                    },
                );
            }
            other => {
                self.set_kind(node, other);
            }
        }
        node
    }

    /// Resolve parameters in the enclosing scope and bind them, still unknown, inside
    fn parameters(&mut self, outer: ScopeId, inner: ScopeId, params: &[NodeId]) {
        for param in params {
            self.resolve(outer, *param);
            if let NodeKind::Identifier { name } = self.ast().kind(*param) {
                let name = *name;
                self.scopes.declare(inner, name, *param);
            }
        }
    }

    fn property(&mut self, scope: ScopeId, node: NodeId, key: NodeId, computed: bool) -> NodeId {
        if computed {
            let key = self.resolve(scope, key);
            if let NodeKind::Property { key: slot, .. } = &mut self.ast_mut().node_mut(node).kind {
                *slot = key;
            }
        }
        if let Some(value) = self.ast().value(node) {
            let resolved = self.resolve(scope, value);
            self.bind_value(node, resolved);
        }
        node
    }

    fn object(&mut self, scope: ScopeId, node: NodeId) -> NodeId {
        let Some(list) = self.ast().property_list(node) else {
            return node;
        };
        let items = self.ast().property_list_items(list).to_vec();
        for (index, item) in items.into_iter().enumerate() {
            let resolved = self.resolve(scope, item);
            if resolved != item {
                self.ast_mut().replace_property(list, index, resolved);
            }
        }
        node
    }
}

/// Patterns for a non-computed property stored under `key`
fn key_patterns(patterns: &Patterns<'_>, key: &str) -> Vec<Pattern> {
    let mut keys = vec![patterns.lit(key)];
    if is_identifier_name(key) {
        keys.push(patterns.ident(key));
    }
    let numeric = key
        .parse::<f64>()
        .ok()
        .filter(|number| number_to_string(*number) == key);
    if let Some(number) = numeric {
        keys.push(patterns.lit(number));
    }
    keys.into_iter()
        .map(|key_pattern| {
            Pattern::kind(KindPattern::Property(PropertyPattern {
                key: Some(Box::new(key_pattern)),
                computed: Some(false),
                ..PropertyPattern::default()
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{DiagnosticKind, ModuleAnalysis, ResolutionContext, ResolveOptions};
    use jv_match::{Patterns, matches};
    use jv_scope::ScopeId;
    use jv_syntax::{Ast, NodeId, NodeKind};
    use jv_vfs::VirtualFileSystem;
    use std::cell::RefCell;
    use std::path::Path;

    fn analyze(source: &str) -> (ResolutionContext<'static>, ModuleAnalysis) {
        let mut cx = ResolutionContext::new(ResolveOptions::default());
        let module = cx.analyze_source(source, Path::new("/project/main.js")).unwrap();
        (cx, module)
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

    fn binding(cx: &ResolutionContext<'_>, module: &ModuleAnalysis, name: &str) -> NodeId {
        module
            .scopes
            .lookup_str(cx.ast(), module.scopes.global(), name)
            .unwrap()
            .node
    }

    fn known_values(ast: &Ast) -> Vec<(NodeId, Option<NodeId>)> {
        ast.iter().map(|(id, node)| (id, node.value)).collect()
    }

    #[test]
    fn test_declaration_propagates_value() {
        let (cx, module) = analyze("var a = 2;\nvar b = a;");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let b = binding(&cx, &module, "b");

        assert!(matches(ast, b, &patterns.lit(2)));
        let end = ast.final_value(b).unwrap();
        assert!(matches!(ast.kind(end), NodeKind::Literal { .. }));

        let NodeKind::VariableDeclaration { declarations, .. } = ast.kind(body(ast, module.root)[1]) else {
            panic!("expected declaration");
        };
        let NodeKind::VariableDeclarator { init, .. } = ast.kind(declarations[0]) else {
            panic!("expected declarator");
        };
        assert_eq!(*init, Some(binding(&cx, &module, "a")));
    }

    #[test]
    fn test_reassignment_overwrites() {
        let (cx, module) = analyze("a = 3;\na");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let statements = body(ast, module.root);

        let a = binding(&cx, &module, "a");
        assert_eq!(expression(ast, statements[1]), a);
        assert!(matches(ast, a, &patterns.lit(3)));

        let (cx, module) = analyze("var a = 2; a = 3; a = 4;");
        let a = binding(&cx, &module, "a");
        assert!(matches(cx.ast(), a, &Patterns::new(cx.ast().interner()).lit(4)));
    }

    #[test]
    fn test_conditional_assignment_is_unconditional() {
        let (cx, module) = analyze("var a = 1; if (x) { a = 2; }");
        let a = binding(&cx, &module, "a");
        assert!(matches(cx.ast(), a, &Patterns::new(cx.ast().interner()).lit(2)));
    }

    #[test]
    fn test_declarator_without_init_keeps_value() {
        let (cx, module) = analyze("var a = 1; var a;");
        let a = binding(&cx, &module, "a");
        assert!(matches(cx.ast(), a, &Patterns::new(cx.ast().interner()).lit(1)));
    }

    #[test]
    fn test_compound_assignment_binds_expression() {
        let (cx, module) = analyze("var a = 1; a += 2;");
        let ast = cx.ast();
        let a = binding(&cx, &module, "a");
        let end = ast.final_value(a).unwrap();
        assert!(matches!(ast.kind(end), NodeKind::AssignmentExpression { .. }));
    }

    #[test]
    fn test_member_synthesis() {
        let (cx, module) = analyze("var t = {a: 2};\nt.a = 3;\nt.a;");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let statements = body(ast, module.root);

        let last = expression(ast, statements[2]);
        assert!(matches(ast, last, &patterns.lit(3)));
        assert!(matches(ast, last, &patterns.prop("a", patterns.lit(3))));

        let t = binding(&cx, &module, "t");
        assert_eq!(ast.properties(t).len(), 1);
        let object = ast.final_value(t).unwrap();
        assert_eq!(ast.properties(object), ast.properties(t));
    }

    #[test]
    fn test_member_first_touch_creates_once() {
        let (cx, module) = analyze("var o = {};\no.x;\no.x = 1;\no['x'];\no['a-b'] = 2;");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let o = binding(&cx, &module, "o");

        assert_eq!(ast.properties(o).len(), 2);
        let statements = body(ast, module.root);
        assert!(matches(ast, expression(ast, statements[3]), &patterns.lit(1)));

        let second = ast.properties(o)[1];
        let NodeKind::Property { key, .. } = ast.kind(second) else {
            panic!("expected property");
        };
        assert!(matches(ast, *key, &patterns.lit("a-b")));
    }

    #[test]
    fn test_member_keys_normalize_numbers_and_computed_values() {
        let (cx, module) = analyze("var o = {0: 'zero', k: 'kay'};\no[0];\nvar name = 'k';\no[name];\no[unknown];");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let statements = body(ast, module.root);

        assert!(matches(ast, expression(ast, statements[1]), &patterns.lit("zero")));
        assert!(matches(ast, expression(ast, statements[3]), &patterns.lit("kay")));
        let unresolved = expression(ast, statements[4]);
        assert!(matches!(ast.kind(unresolved), NodeKind::MemberExpression { .. }));
        assert_eq!(ast.properties(binding(&cx, &module, "o")).len(), 2);
    }

    #[test]
    fn test_nested_objects() {
        let (cx, module) = analyze("var a = ({a: {b: 2}, c: function () {}});\na.a.b = 3;\na.a.c = 4;");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let a = binding(&cx, &module, "a");

        let expected = patterns.object(vec![
            patterns.prop(
                "a",
                patterns.object(vec![patterns.prop("b", patterns.lit(3)), patterns.prop("c", patterns.lit(4))]),
            ),
            patterns.prop("c", patterns.func()),
        ]);
        assert!(matches(ast, a, &expected));
    }

    #[test]
    fn test_array_indexing() {
        let (cx, module) = analyze("[1,2,3,4][0];\n[1,2][5];\n[1,2]['1'];\n[1,2][-1];");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let statements = body(ast, module.root);

        assert!(matches(ast, expression(ast, statements[0]), &patterns.lit(1)));
        assert!(matches!(
            ast.kind(expression(ast, statements[1])),
            NodeKind::MemberExpression { .. }
        ));
        assert!(matches(ast, expression(ast, statements[2]), &patterns.lit(2)));
        assert!(matches!(
            ast.kind(expression(ast, statements[3])),
            NodeKind::MemberExpression { .. }
        ));
    }

    #[test]
    fn test_call_resolves_callee() {
        let (cx, module) = analyze("var a = function (b) {b;};\na(2)");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let statements = body(ast, module.root);
        let a = binding(&cx, &module, "a");

        let call = expression(ast, statements[1]);
        assert!(matches(ast, call, &patterns.call(patterns.node(a), Vec::new())));
        assert!(matches(ast, call, &patterns.call(patterns.func(), vec![patterns.lit(2)])));
    }

    #[test]
    fn test_function_declaration_binds_name() {
        let (cx, module) = analyze("function foo(x) { x = 1; return x; }\nfoo;");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let foo = binding(&cx, &module, "foo");

        assert!(matches(ast, foo, &patterns.func_decl("foo")));
        let statements = body(ast, module.root);
        assert!(matches(ast, statements[0], &patterns.func_decl("foo")));

        let function = ast.final_value(foo).unwrap();
        let scope = module.scopes.acquire(function).unwrap();
        let param = module.scopes.lookup_str(ast, scope, "x").unwrap();
        assert!(matches(ast, param.node, &patterns.lit(1)));
        assert!(module.scopes.lookup_str(ast, module.scopes.global(), "x").is_none());
    }

    #[test]
    fn test_function_scope_shadows_outer() {
        let (cx, module) = analyze("var a = 1;\nfunction f(a) { a = 2; }\nvar g = () => { a = 3; };");
        let a = binding(&cx, &module, "a");
        assert!(matches(cx.ast(), a, &Patterns::new(cx.ast().interner()).lit(3)));
    }

    #[test]
    fn test_function_expression_name_is_local() {
        let (cx, module) = analyze("var f = function g() { return g; };
g;");
        let ast = cx.ast();
        let global = module.scopes.global();
        assert!(module.scopes.lookup_str(ast, global, "g").is_none());

        let function = ast.final_value(binding(&cx, &module, "f")).unwrap();
        let scope = module.scopes.acquire(function).unwrap();
        let name = module.scopes.lookup_str(ast, scope, "g").unwrap();
        assert_eq!(ast.final_value(name.node), Some(function));
    }

    #[test]
    fn test_alias_sees_later_reassignment() {
        let (cx, module) = analyze("var a = 2;\nvar b = a;\na = 3;");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        assert!(matches(ast, binding(&cx, &module, "a"), &patterns.lit(3)));
        assert!(matches(ast, binding(&cx, &module, "b"), &patterns.lit(3)));
    }

    #[test]
    fn test_module_object_is_injected() {
        let (cx, module) = analyze("module.exports = {answer: 42};");
        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let exports = module.exports.unwrap();
        assert!(matches(ast, exports, &patterns.object(vec![patterns.prop("answer", patterns.lit(42))])));

        let (cx, module) = analyze("var exports = 5;");
        assert!(matches(cx.ast(), module.exports.unwrap(), &Patterns::new(cx.ast().interner()).lit(5)));
    }

    #[test]
    fn test_unsupported_node_is_reported() {
        let (cx, module) = analyze("var a = 1;\nclass A {}\nvar b = a;");
        let diagnostics = cx.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnsupportedNode);
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[0].file.ends_with("main.js"));

        let b = binding(&cx, &module, "b");
        assert!(matches(cx.ast(), b, &Patterns::new(cx.ast().interner()).lit(1)));
    }

    #[test]
    fn test_nesting_limit_is_reported() {
        let options = ResolveOptions {
            max_nesting_depth: 4,
            ..ResolveOptions::default()
        };
        let mut cx = ResolutionContext::new(options);
        let module = cx
            .analyze_source("x = (((((((1 + 2) + 3) + 4) + 5) + 6) + 7) + 8);", Path::new("/deep.js"))
            .unwrap();
        assert!(!cx.diagnostics().is_empty());
        assert!(cx
            .diagnostics()
            .iter()
            .all(|diagnostic| diagnostic.kind == DiagnosticKind::Resolution));
        assert!(matches!(cx.ast().kind(module.root), NodeKind::Program { .. }));
    }

    #[test]
    fn test_observer_sees_every_resolved_node() {
        let seen = RefCell::new(Vec::new());
        let mut cx = ResolutionContext::new(ResolveOptions::default())
            .with_observer(|_: &Ast, _: ScopeId, node: NodeId| seen.borrow_mut().push(node));
        let module = cx.analyze_source("var a = 2; a;", Path::new("/obs.js")).unwrap();
        let root = module.root;
        drop(cx);

        let seen = seen.into_inner();
        assert_eq!(seen.last(), Some(&root));
        assert!(seen.len() >= 6);
    }

    #[test]
    fn test_resolving_twice_is_idempotent() {
        let source = "var t = {a: 2};\nt.a = 3;\nt.b;\nvar u = t.a;\nfunction f(x) { return x; }\nvar n = [1, 2][1];";
        let (mut cx, mut module) = analyze(source);
        let before = known_values(cx.ast());
        let nodes = cx.ast().len();

        cx.resolve_module(&mut module);
        assert_eq!(known_values(cx.ast()), before);
        assert_eq!(cx.ast().len(), nodes);
    }

    #[test]
    fn test_cross_module_export() {
        let vfs = VirtualFileSystem::new();
        vfs.add_file("/project/lib/value.js", "module.exports = 2;").unwrap();
        let mut cx = ResolutionContext::with_vfs(vfs, ResolveOptions::default());
        let module = cx
            .analyze_source("var test = require('./lib/value');", Path::new("/project/main.js"))
            .unwrap();

        let ast = cx.ast();
        let test = binding(&cx, &module, "test");
        assert!(matches(ast, test, &Patterns::new(ast.interner()).lit(2)));
        assert!(cx.is_visited(Path::new("/project/lib/value.js")));
    }

    #[test]
    fn test_require_not_followed_when_disabled() {
        let vfs = VirtualFileSystem::new();
        vfs.add_file("/project/value.js", "module.exports = 2;").unwrap();
        let options = ResolveOptions {
            follow_requires: false,
            ..ResolveOptions::default()
        };
        let mut cx = ResolutionContext::with_vfs(vfs, options);
        let module = cx
            .analyze_source("var test = require('./value');", Path::new("/project/main.js"))
            .unwrap();

        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let test = binding(&cx, &module, "test");
        assert!(matches(ast, test, &patterns.require("./value")));
        assert!(!cx.is_visited(Path::new("/project/value.js")));
    }

    #[test]
    fn test_non_relative_requires_are_skipped() {
        let vfs = VirtualFileSystem::new();
        vfs.add_file("/project/data.json", "{}").unwrap();
        let mut cx = ResolutionContext::with_vfs(vfs, ResolveOptions::default());
        let module = cx
            .analyze_source(
                "var fs = require('fs');\nvar data = require('./data.json');\nvar pkg = require('lodash');\nvar gone = require('./missing');",
                Path::new("/project/main.js"),
            )
            .unwrap();

        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        for name in ["fs", "data", "pkg", "gone"] {
            let node = binding(&cx, &module, name);
            assert!(matches(ast, node, &patterns.call(patterns.ident("require"), Vec::new())), "{name}");
        }
        assert!(cx.diagnostics().is_empty());
    }

    #[test]
    fn test_module_cycle_terminates() {
        let vfs = VirtualFileSystem::new();
        vfs.add_file("/project/a.js", "var b = require('./b');\nmodule.exports = 1;").unwrap();
        vfs.add_file("/project/b.js", "var a = require('./a');\nmodule.exports = a;").unwrap();
        let mut cx = ResolutionContext::with_vfs(vfs, ResolveOptions::default());
        let source = cx.vfs().read_path("/project/a.js").unwrap().1;
        let module = cx.analyze_source(&source, Path::new("/project/a.js")).unwrap();

        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let b = binding(&cx, &module, "b");
        assert!(matches(ast, b, &patterns.require("./a")));
        assert!(matches(ast, module.exports.unwrap(), &patterns.lit(1)));
    }

    #[test]
    fn test_module_depth_limit() {
        let vfs = VirtualFileSystem::new();
        vfs.add_file("/project/one.js", "module.exports = require('./two');").unwrap();
        vfs.add_file("/project/two.js", "module.exports = 2;").unwrap();
        let options = ResolveOptions {
            max_module_depth: Some(1),
            ..ResolveOptions::default()
        };
        let mut cx = ResolutionContext::with_vfs(vfs, options);
        let module = cx
            .analyze_source("var one = require('./one');", Path::new("/project/main.js"))
            .unwrap();

        let ast = cx.ast();
        let patterns = Patterns::new(ast.interner());
        let one = binding(&cx, &module, "one");
        assert!(matches(ast, one, &patterns.require("./two")));
        assert!(!cx.is_visited(Path::new("/project/two.js")));
    }
}
