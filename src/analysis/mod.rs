//! Call-site analysis.
//!
//! This is the host side of the codec: it walks a parsed file in source
//! order, works out just enough about each expression to build
//! [`CallSite`]s, runs the encoder on every method and static call, and
//! records the resulting keys as the calls' types so that later calls
//! (and variables assigned from them) carry them along.
//!
//! What it infers is deliberately small:
//!
//! - `new X` → `\Ns\X`
//! - `$this`, `self`, `static` → the enclosing class
//! - typed parameters → their class hints
//! - `$var` → whatever was last assigned to it in the current scope
//! - `$this->prop` → the property's declared type, or whatever was last
//!   assigned to it anywhere in the class (usually `setUp()`)
//! - a recognised call → its key
//!
//! Anything else is untyped.  Functions, methods, and closures each get a
//! fresh variable scope; closures copy their `use` captures and arrow
//! functions copy the whole enclosing scope.
use std::collections::HashMap;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::sequence::TokenSeparatedSequence;
use mago_syntax::ast::*;

use crate::codec::encoder::MEMBER_CALL_MARKER;
use crate::codec::{self, CallArgument, CallSite, ChainState};
use crate::parser::{extract_hint_string, hint_class_names, qualify_name};
use crate::types::{AnalyzedCall, ByteSpan, FileAnalysis, TypedExpression};

/// Variable name (with `$`) → candidate types.
type Scope = HashMap<String, Vec<String>>;

/// `name` when `object->selector` is `$this->name`.
fn this_property<'a>(
    object: &Expression<'_>,
    selector: &'a ClassLikeMemberSelector<'a>,
) -> Option<&'a str> {
    let Expression::Variable(Variable::Direct(dv)) = object else {
        return None;
    };
    match selector {
        ClassLikeMemberSelector::Identifier(ident) if dv.name == "$this" => Some(ident.value),
        _ => None,
    }
}

fn byte_span(span: Span) -> ByteSpan {
    ByteSpan::new(span.start.offset, span.end.offset)
}

/// Walks one file and collects a [`FileAnalysis`].
pub struct Analyzer<'m> {
    use_map: &'m HashMap<String, String>,
    namespace: Option<String>,
    /// FQNs (with leading `\`) of the enclosing class-likes, innermost
    /// last.  `None` for anonymous classes.
    classes: Vec<Option<String>>,
    /// Property name (without `$`) → candidate types, one table per
    /// entry of `classes`.
    properties: Vec<Scope>,
    scopes: Vec<Scope>,
    out: FileAnalysis,
}

impl<'m> Analyzer<'m> {
    pub fn new(use_map: &'m HashMap<String, String>) -> Self {
        Self {
            use_map,
            namespace: None,
            classes: Vec::new(),
            properties: Vec::new(),
            scopes: vec![Scope::new()],
            out: FileAnalysis::default(),
        }
    }

    /// Analyse a file's top-level statements.
    pub fn analyze<'a>(mut self, statements: impl Iterator<Item = &'a Statement<'a>>) -> FileAnalysis {
        self.statements(statements);
        self.out
    }

    // ─── Scopes ─────────────────────────────────────────────────────────

    fn scope(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn lookup(&self, var: &str) -> Vec<String> {
        self.scopes
            .last()
            .and_then(|s| s.get(var))
            .cloned()
            .unwrap_or_default()
    }

    fn bind(&mut self, var: &str, types: Vec<String>) {
        if types.is_empty() {
            self.scope().remove(var);
        } else {
            self.scope().insert(var.to_string(), types);
        }
    }

    fn with_scope(&mut self, scope: Scope, body: impl FnOnce(&mut Self)) {
        self.scopes.push(scope);
        body(self);
        self.scopes.pop();
    }

    fn current_class(&self) -> Option<String> {
        self.classes.last().cloned().flatten()
    }

    fn property_types(&self, name: &str) -> Vec<String> {
        self.properties
            .last()
            .and_then(|p| p.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn bind_property(&mut self, name: &str, types: Vec<String>) {
        let Some(table) = self.properties.last_mut() else {
            return;
        };
        if types.is_empty() {
            table.remove(name);
        } else {
            table.insert(name.to_string(), types);
        }
    }

    /// Candidate types of a hint such as `?Foo|Bar`.
    fn hint_types(&self, hint: &Hint<'_>) -> Vec<String> {
        let hint_str = extract_hint_string(hint);
        hint_class_names(&hint_str)
            .into_iter()
            .filter_map(|name| self.class_reference(name))
            .collect()
    }

    /// Qualify a class reference as written in source.
    fn class_reference(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case("self") || name.eq_ignore_ascii_case("static") {
            return self.current_class();
        }
        if name.eq_ignore_ascii_case("parent") {
            return None;
        }
        Some(qualify_name(name, self.use_map, self.namespace.as_deref()))
    }

    fn bind_parameters(&mut self, parameter_list: &FunctionLikeParameterList<'_>) {
        for param in parameter_list.parameters.iter() {
            let Some(hint) = &param.hint else {
                continue;
            };
            let types = self.hint_types(hint);
            self.bind(param.variable.name, types);
        }
    }

    // ─── Statements ─────────────────────────────────────────────────────

    fn statements<'a>(&mut self, statements: impl Iterator<Item = &'a Statement<'a>>) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement<'a>(&mut self, statement: &'a Statement<'a>) {
        match statement {
            Statement::Namespace(ns) => {
                let previous = self.namespace.take();
                self.namespace = ns
                    .name
                    .as_ref()
                    .map(|ident| ident.value().to_string())
                    .filter(|name| !name.is_empty());
                self.statements(ns.statements().iter());
                self.namespace = previous;
            }
            Statement::Class(class) => {
                let fqn = self.declared_fqn(class.name.value);
                self.class_like(Some(fqn), class.members.iter())
            }
            Statement::Trait(trait_def) => {
                let fqn = self.declared_fqn(trait_def.name.value);
                self.class_like(Some(fqn), trait_def.members.iter())
            }
            Statement::Enum(enum_def) => {
                let fqn = self.declared_fqn(enum_def.name.value);
                self.class_like(Some(fqn), enum_def.members.iter())
            }
            Statement::Function(func) => {
                self.with_scope(Scope::new(), |this| {
                    this.bind_parameters(&func.parameter_list);
                    this.statements(func.body.statements.iter());
                });
            }
            Statement::Expression(expr_stmt) => {
                self.expression(expr_stmt.expression);
            }
            Statement::Return(ret) => {
                if let Some(value) = ret.value {
                    self.expression(value);
                }
            }
            Statement::Echo(echo) => {
                for value in echo.values.iter() {
                    self.expression(value);
                }
            }
            Statement::Block(block) => self.statements(block.statements.iter()),
            Statement::If(if_stmt) => {
                self.expression(if_stmt.condition);
                match &if_stmt.body {
                    IfBody::Statement(body) => {
                        self.statement(body.statement);
                        for else_if in body.else_if_clauses.iter() {
                            self.expression(else_if.condition);
                            self.statement(else_if.statement);
                        }
                        if let Some(else_clause) = &body.else_clause {
                            self.statement(else_clause.statement);
                        }
                    }
                    IfBody::ColonDelimited(body) => {
                        self.statements(body.statements.iter());
                        for else_if in body.else_if_clauses.iter() {
                            self.expression(else_if.condition);
                            self.statements(else_if.statements.iter());
                        }
                        if let Some(else_clause) = &body.else_clause {
                            self.statements(else_clause.statements.iter());
                        }
                    }
                }
            }
            Statement::Foreach(foreach) => {
                self.expression(foreach.expression);
                for inner in foreach.body.statements() {
                    self.statement(inner);
                }
            }
            Statement::For(for_stmt) => {
                for init_expr in for_stmt.initializations.iter() {
                    self.expression(init_expr);
                }
                for condition in for_stmt.conditions.iter() {
                    self.expression(condition);
                }
                match &for_stmt.body {
                    ForBody::Statement(inner) => self.statement(inner),
                    ForBody::ColonDelimited(body) => self.statements(body.statements.iter()),
                }
                for increment in for_stmt.increments.iter() {
                    self.expression(increment);
                }
            }
            Statement::While(while_stmt) => {
                self.expression(while_stmt.condition);
                match &while_stmt.body {
                    WhileBody::Statement(inner) => self.statement(inner),
                    WhileBody::ColonDelimited(body) => self.statements(body.statements.iter()),
                }
            }
            Statement::DoWhile(dw) => {
                self.statement(dw.statement);
                self.expression(dw.condition);
            }
            Statement::Try(try_stmt) => {
                self.statements(try_stmt.block.statements.iter());
                for catch in try_stmt.catch_clauses.iter() {
                    self.statements(catch.block.statements.iter());
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.statements(finally.block.statements.iter());
                }
            }
            Statement::Switch(switch) => {
                self.expression(switch.expression);
                match &switch.body {
                    SwitchBody::BraceDelimited(body) => {
                        for case in body.cases.iter() {
                            self.statements(case.statements().iter());
                        }
                    }
                    SwitchBody::ColonDelimited(body) => {
                        for case in body.cases.iter() {
                            self.statements(case.statements().iter());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// FQN of a class-like declared in the current namespace.
    fn declared_fqn(&self, short_name: &str) -> String {
        qualify_name(short_name, &HashMap::new(), self.namespace.as_deref())
    }

    /// Walk a class-like body.  Typed property declarations seed the
    /// property table; methods are then walked in source order, so an
    /// assignment in `setUp()` types the property for the methods after it.
    fn class_like<'a>(
        &mut self,
        fqn: Option<String>,
        members: impl Iterator<Item = &'a ClassLikeMember<'a>> + std::clone::Clone,
    ) {
        self.classes.push(fqn.clone());
        self.properties.push(Scope::new());

        for member in members.clone() {
            let ClassLikeMember::Property(property) = member else {
                continue;
            };
            let Some(hint) = property.hint() else {
                continue;
            };
            let types = self.hint_types(hint);
            for var in property.variables() {
                self.bind_property(var.name.trim_start_matches('$'), types.clone());
            }
        }

        for member in members {
            let ClassLikeMember::Method(method) = member else {
                continue;
            };
            let MethodBody::Concrete(block) = &method.body else {
                continue;
            };
            let is_static = method.modifiers.iter().any(|m| m.is_static());

            let mut scope = Scope::new();
            if !is_static && let Some(fqn) = &fqn {
                scope.insert("$this".to_string(), vec![fqn.clone()]);
            }
            self.with_scope(scope, |this| {
                this.bind_parameters(&method.parameter_list);
                this.statements(block.statements.iter());
            });
        }

        self.properties.pop();
        self.classes.pop();
    }

    // ─── Expressions ────────────────────────────────────────────────────

    /// Analyse an expression and return its candidate types.  Non-empty
    /// results are recorded as a [`TypedExpression`].
    fn expression<'a>(&mut self, expr: &'a Expression<'a>) -> Vec<String> {
        let types = self.expression_types(expr);
        self.record_typed(expr.span(), &types);
        types
    }

    fn record_typed(&mut self, span: Span, types: &[String]) {
        if !types.is_empty() {
            self.out.typed.push(TypedExpression {
                span: byte_span(span),
                types: types.to_vec(),
            });
        }
    }

    fn expression_types<'a>(&mut self, expr: &'a Expression<'a>) -> Vec<String> {
        match expr {
            Expression::Parenthesized(p) => self.expression(p.expression),
            Expression::Variable(Variable::Direct(dv)) => self.lookup(dv.name),
            Expression::Assignment(a) => {
                let types = self.expression(a.rhs);
                match a.lhs {
                    Expression::Variable(Variable::Direct(dv)) if a.operator.is_assign() => {
                        self.bind(dv.name, types.clone());
                        self.record_typed(a.lhs.span(), &types);
                    }
                    Expression::Access(Access::Property(pa)) if a.operator.is_assign() => {
                        match this_property(pa.object, &pa.property) {
                            Some(name) => {
                                self.bind_property(name, types.clone());
                                self.record_typed(a.lhs.span(), &types);
                            }
                            None => {
                                self.expression(a.lhs);
                            }
                        }
                    }
                    lhs => {
                        self.expression(lhs);
                    }
                }
                types
            }
            Expression::Instantiation(inst) => {
                if let Some(ref args) = inst.argument_list {
                    self.arguments(&args.arguments);
                }
                let class = match inst.class {
                    Expression::Identifier(ident) => self.class_reference(ident.value()),
                    Expression::Self_(_) | Expression::Static(_) => self.current_class(),
                    _ => None,
                };
                class.into_iter().collect()
            }
            Expression::Call(call) => self.call(call),
            Expression::AnonymousClass(class) => {
                if let Some(ref args) = class.argument_list {
                    self.arguments(&args.arguments);
                }
                self.class_like(None, class.members.iter());
                Vec::new()
            }
            Expression::Closure(closure) => {
                let mut scope = Scope::new();
                if let Some(this) = self.scopes.last().and_then(|s| s.get("$this")) {
                    scope.insert("$this".to_string(), this.clone());
                }
                if let Some(ref use_clause) = closure.use_clause {
                    for use_var in use_clause.variables.iter() {
                        let name = use_var.variable.name;
                        let types = self.lookup(name);
                        if !types.is_empty() {
                            scope.insert(name.to_string(), types);
                        }
                    }
                }
                self.with_scope(scope, |this| {
                    this.bind_parameters(&closure.parameter_list);
                    this.statements(closure.body.statements.iter());
                });
                Vec::new()
            }
            Expression::ArrowFunction(arrow) => {
                let scope = self.scopes.last().cloned().unwrap_or_default();
                self.with_scope(scope, |this| {
                    this.bind_parameters(&arrow.parameter_list);
                    this.expression(arrow.expression);
                });
                Vec::new()
            }
            Expression::Conditional(cond) => {
                self.expression(cond.condition);
                let mut types = match cond.then {
                    Some(then) => self.expression(then),
                    None => Vec::new(),
                };
                for t in self.expression(cond.r#else) {
                    if !types.contains(&t) {
                        types.push(t);
                    }
                }
                types
            }
            Expression::Binary(bin) => {
                self.expression(bin.lhs);
                self.expression(bin.rhs);
                Vec::new()
            }
            Expression::UnaryPrefix(u) => {
                self.expression(u.operand);
                Vec::new()
            }
            Expression::UnaryPostfix(u) => {
                self.expression(u.operand);
                Vec::new()
            }
            Expression::Clone(c) => self.expression(c.object),
            Expression::Throw(t) => {
                self.expression(t.exception);
                Vec::new()
            }
            Expression::Array(arr) => {
                self.array_elements(arr.elements.iter());
                Vec::new()
            }
            Expression::LegacyArray(arr) => {
                self.array_elements(arr.elements.iter());
                Vec::new()
            }
            Expression::Match(m) => {
                self.expression(m.expression);
                for arm in m.arms.iter() {
                    self.expression(arm.expression());
                }
                Vec::new()
            }
            Expression::Access(access) => {
                match access {
                    Access::Property(pa) => {
                        self.expression(pa.object);
                        if let Some(name) = this_property(pa.object, &pa.property) {
                            return self.property_types(name);
                        }
                    }
                    Access::NullSafeProperty(pa) => {
                        self.expression(pa.object);
                        if let Some(name) = this_property(pa.object, &pa.property) {
                            return self.property_types(name);
                        }
                    }
                    Access::StaticProperty(pa) => {
                        self.expression(pa.class);
                    }
                    Access::ClassConstant(pa) => {
                        self.expression(pa.class);
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn array_elements<'a>(&mut self, elements: impl Iterator<Item = &'a ArrayElement<'a>>) {
        for elem in elements {
            match elem {
                ArrayElement::KeyValue(kv) => {
                    self.expression(kv.key);
                    self.expression(kv.value);
                }
                ArrayElement::Value(v) => {
                    self.expression(v.value);
                }
                ArrayElement::Variadic(v) => {
                    self.expression(v.value);
                }
                ArrayElement::Missing(_) => {}
            }
        }
    }

    // ─── Calls ──────────────────────────────────────────────────────────

    /// Turn call arguments into encoder arguments, analysing each one.
    /// Also returns the span of the first argument's string contents when
    /// it is a string literal.
    fn arguments<'a>(
        &mut self,
        arguments: &'a TokenSeparatedSequence<'a, Argument<'a>>,
    ) -> (Vec<CallArgument>, Option<ByteSpan>) {
        let mut out = Vec::new();
        let mut literal_span = None;

        for (i, arg) in arguments.iter().enumerate() {
            let value = match arg {
                Argument::Positional(pos) => pos.value,
                Argument::Named(named) => named.value,
            };
            if let Expression::Literal(Literal::String(lit_str)) = value {
                let contents = lit_str.value.unwrap_or_default();
                if i == 0 {
                    let span = lit_str.span();
                    let (start, end) = (span.start.offset, span.end.offset);
                    literal_span = Some(if end >= start + 2 {
                        ByteSpan::new(start + 1, end - 1)
                    } else {
                        ByteSpan::new(start, end)
                    });
                }
                out.push(CallArgument::StringLiteral(contents.to_string()));
                continue;
            }
            let types = self.expression(value);
            out.push(if types.is_empty() {
                CallArgument::Other
            } else {
                CallArgument::Typed(types)
            });
        }

        (out, literal_span)
    }

    fn call<'a>(&mut self, call: &'a Call<'a>) -> Vec<String> {
        match call {
            Call::Function(fc) => {
                self.arguments(&fc.argument_list.arguments);
                Vec::new()
            }
            Call::StaticMethod(sc) => {
                let class = match sc.class {
                    Expression::Identifier(ident) => self.class_reference(ident.value()),
                    Expression::Self_(_) | Expression::Static(_) => self.current_class(),
                    other => {
                        self.expression(other);
                        None
                    }
                };
                let (arguments, literal_span) = self.arguments(&sc.argument_list.arguments);
                let (Some(class), ClassLikeMemberSelector::Identifier(ident)) = (class, &sc.method)
                else {
                    return Vec::new();
                };
                let signature = format!("{}C{}.{}", MEMBER_CALL_MARKER, class, ident.value);
                let site = CallSite::new(signature, arguments);
                self.record_call(call.span(), ident.span(), ident.value, site, literal_span, Vec::new())
            }
            Call::Method(mc) => {
                self.member_call(call, mc.object, &mc.method, &mc.argument_list.arguments)
            }
            Call::NullSafeMethod(mc) => {
                self.member_call(call, mc.object, &mc.method, &mc.argument_list.arguments)
            }
        }
    }

    fn member_call<'a>(
        &mut self,
        call: &'a Call<'a>,
        object: &'a Expression<'a>,
        selector: &'a ClassLikeMemberSelector<'a>,
        arguments: &'a TokenSeparatedSequence<'a, Argument<'a>>,
    ) -> Vec<String> {
        let receiver_types = self.expression(object);
        let (arguments, literal_span) = self.arguments(arguments);
        let ClassLikeMemberSelector::Identifier(ident) = selector else {
            return Vec::new();
        };

        let signature = format!(
            "{}{}.{}",
            MEMBER_CALL_MARKER,
            receiver_types.join("|"),
            ident.value
        );
        let site = CallSite::new(signature, arguments)
            .with_chain(ChainState::from_receiver_types(&receiver_types));
        self.record_call(
            call.span(),
            ident.span(),
            ident.value,
            site,
            literal_span,
            receiver_types,
        )
    }

    /// Encode the call site, record it, and return the call's types.
    fn record_call(
        &mut self,
        span: Span,
        name_span: Span,
        method: &str,
        site: CallSite,
        literal_span: Option<ByteSpan>,
        receiver_types: Vec<String>,
    ) -> Vec<String> {
        let key = codec::encode_key(&site);
        self.out.calls.push(AnalyzedCall {
            span: byte_span(span),
            name_span: byte_span(name_span),
            method: method.to_string(),
            signature: site.signature,
            literal_span,
            receiver_types,
            key: key.clone(),
        });
        key.into_iter().collect()
    }
}
