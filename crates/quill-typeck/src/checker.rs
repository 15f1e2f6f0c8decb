//! The type checker walk.

use quill_ast::{CaptureParam, Field, FnExpr, IfExpr, Node, Tree, VarDef};
use quill_symbols::{Context, Environment};
use quill_token::{Location, Signedness, TokenKind};
use quill_types::{is_assignable_to, promoted, Param, StructField, Type, TypeValue};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::diagnostics::DiagnosticSink;

/// Rebuilds a parsed tree with every node's attribute resolved to a
/// type, reporting recoverable failures into the sink.
pub struct TypeChecker<'a> {
    sink: &'a mut DiagnosticSink,
}

impl<'a> TypeChecker<'a> {
    /// Create a checker reporting into `sink`.
    pub fn new(sink: &'a mut DiagnosticSink) -> Self {
        TypeChecker { sink }
    }

    fn diag(&mut self, message: String, location: Location) {
        self.sink.report(message, location);
    }

    /// Identifier resolution for the current context. The context's own
    /// table wins; `var` and `fn` fall back to each other so function
    /// values and called variables both resolve.
    fn resolve(&self, env: &Environment, name: &str) -> Option<Type> {
        match env.context {
            Context::Type => env.types.lookup(name).cloned(),
            Context::Var => {
                env.vars.lookup(name).or_else(|| env.fns.lookup(name)).cloned()
            }
            Context::Fn => {
                env.fns.lookup(name).or_else(|| env.vars.lookup(name)).cloned()
            }
        }
    }

    /// Check one node, producing the typed node.
    pub fn check(&mut self, node: &Node<()>, env: &Environment) -> Node<Type> {
        trace!(context = %env.context, location = %node.location(), "type checking");
        let location = node.location();
        let (kind, ty) = match node.kind() {
            Tree::Unit => (Tree::Unit, Type::unknown()),

            Tree::Int(lit) => {
                let ty = match lit.signedness {
                    Signedness::Unspecified => Type::int(true, 64),
                    signedness => match lit.width {
                        8 | 16 | 32 | 64 => {
                            Type::int(signedness == Signedness::Signed, lit.width)
                        }
                        width => {
                            self.diag(
                                format!(
                                    "illegal integer literal width {width}, should be 8, 16, 32, or 64"
                                ),
                                location,
                            );
                            Type::unknown()
                        }
                    },
                };
                (Tree::Int(*lit), ty)
            }

            Tree::Float(lit) => {
                let ty = match lit.width {
                    32 | 64 => Type::float(lit.width),
                    width => {
                        self.diag(
                            format!(
                                "illegal floating point literal width {width}, should be 32 or 64"
                            ),
                            location,
                        );
                        Type::unknown()
                    }
                };
                (Tree::Float(*lit), ty)
            }

            Tree::Str(value) => (Tree::Str(value.clone()), Type::strlit(value.len() as u64)),

            Tree::True => (Tree::True, Type::boolean()),
            Tree::False => (Tree::False, Type::boolean()),

            Tree::Ident(name) => {
                let ty = match self.resolve(env, name) {
                    Some(ty) => ty,
                    None => {
                        self.diag(
                            format!(
                                "no type information for \"{name}\" in context {}",
                                env.context
                            ),
                            location,
                        );
                        Type::unknown()
                    }
                };
                (Tree::Ident(name.clone()), ty)
            }

            Tree::PrimType(kind) => (Tree::PrimType(*kind), primitive_type(*kind)),

            Tree::Block(stmts) => self.check_block(stmts, env),

            Tree::Data(items) => {
                let typed: Vec<_> = items.iter().map(|item| self.check(item, env)).collect();
                let ty = data_type(&typed);
                (Tree::Data(typed), ty)
            }

            Tree::UnaryOp { op, operand } => {
                let operand = self.check(operand, env);
                let ty = operand.attribute().decay();
                (Tree::UnaryOp { op: *op, operand }, ty)
            }

            Tree::BinOp { op, lhs, rhs } => {
                let lhs = self.check(lhs, env);
                let rhs = self.check(rhs, env);
                let left = lhs.attribute().decay();
                let right = rhs.attribute().decay();
                let ty = if is_comparison_op(*op) {
                    Type::boolean()
                } else {
                    promoted(&left, &right)
                        .unwrap_or_else(|| Type::new(TypeValue::Variant(vec![left, right])))
                };
                (Tree::BinOp { op: *op, lhs, rhs }, ty)
            }

            Tree::Invoc { target, arguments } => {
                // a bare invocation in value position is a call
                let context = if env.context == Context::Var { Context::Fn } else { env.context };
                if context == Context::Type {
                    self.check_type_invoc(target, arguments, env, location)
                } else {
                    self.check_fn_invoc(target, arguments, env, location)
                }
            }

            Tree::If(if_expr) => self.check_if(if_expr, env),

            Tree::Elif { test, body } => {
                self.diag("unfolded \"elif\" branch reached the type checker".to_string(), location);
                let test = self.check(test, env);
                let body = self.check(body, env);
                (Tree::Elif { test, body }, Type::unknown())
            }

            Tree::Else { body } => {
                self.diag("unfolded \"else\" branch reached the type checker".to_string(), location);
                let body = self.check(body, env);
                (Tree::Else { body }, Type::unknown())
            }

            Tree::FnExpr(fn_expr) => self.check_fn_expr(fn_expr, env),

            Tree::VarDef(def) => self.check_var_def(def, env, location),

            Tree::For { var, iterable, body } => {
                let iterable = self.check(iterable, &env.with_context(Context::Var));
                let element = match iterable.attribute().decay().value() {
                    TypeValue::Array { value, .. }
                    | TypeValue::Dynarr { value, .. }
                    | TypeValue::Slice { value, .. } => value.clone(),
                    TypeValue::Strlit { .. } | TypeValue::Str { .. } => Type::character(),
                    TypeValue::Unknown => Type::unknown(),
                    other => {
                        self.diag(
                            format!("cannot iterate over a value of type \"{other}\""),
                            iterable.location(),
                        );
                        Type::unknown()
                    }
                };
                let mut inner = env.clone();
                inner.vars.insert(var.clone(), element);
                let body = self.check(body, &inner);
                (Tree::For { var: var.clone(), iterable, body }, Type::void())
            }

            Tree::While { test, body } => {
                let test = self.check(test, env);
                self.expect_bool(&test, "while condition");
                let body = self.check(body, env);
                (Tree::While { test, body }, Type::void())
            }

            Tree::Break => (Tree::Break, Type::void()),
            Tree::Continue => (Tree::Continue, Type::void()),

            Tree::Return(value) => {
                let value = value.as_ref().map(|v| self.check(v, &env.with_context(Context::Var)));
                let ty = value.as_ref().map_or_else(Type::void, |v| v.attribute().decay());
                (Tree::Return(value), ty)
            }

            Tree::Yield(value) => {
                let value = value.as_ref().map(|v| self.check(v, &env.with_context(Context::Var)));
                let ty = value.as_ref().map_or_else(Type::void, |v| v.attribute().decay());
                (Tree::Yield(value), ty)
            }

            Tree::Struct(fields) => {
                let type_env = env.with_context(Context::Type);
                let typed: Vec<Field<Type>> = fields
                    .iter()
                    .map(|f| Field { name: f.name.clone(), ty: self.check(&f.ty, &type_env) })
                    .collect();
                let ty = Type::new(TypeValue::Struct(
                    typed
                        .iter()
                        .map(|f| StructField {
                            name: f.name.clone(),
                            ty: f.ty.attribute().clone(),
                        })
                        .collect(),
                ));
                (Tree::Struct(typed), ty)
            }

            Tree::DefType { name, body } => {
                let body = self.check(body, &env.with_context(Context::Type));
                let ty = Type::nominal(name.clone(), body.attribute().clone());
                (Tree::DefType { name: name.clone(), body }, ty)
            }

            Tree::LetType { name, body } => {
                let body = self.check(body, &env.with_context(Context::Type));
                let ty = body.attribute().clone();
                (Tree::LetType { name: name.clone(), body }, ty)
            }

            Tree::Template { params, body } => {
                let type_env = env.with_context(Context::Type);
                let params: Vec<Field<Type>> = params
                    .iter()
                    .map(|f| Field { name: f.name.clone(), ty: self.check(&f.ty, &type_env) })
                    .collect();
                let body = self.check(body, env);
                // template elaboration happens at instantiation time
                (Tree::Template { params, body }, Type::unknown())
            }

            Tree::TypeExpr(inner) => {
                let inner = self.check(inner, &env.with_context(Context::Type));
                let ty = inner.attribute().clone();
                (Tree::TypeExpr(inner), ty)
            }

            Tree::Assign { lhs, rhs } => {
                let var_env = env.with_context(Context::Var);
                let lhs = self.check(lhs, &var_env);
                let mut rhs = self.check(rhs, &var_env);
                if let TypeValue::Ptr { value, .. } = lhs.attribute().value() {
                    adapt_literal(&mut rhs, value);
                }
                match lhs.attribute().value() {
                    TypeValue::Ptr { value, .. } => {
                        if !is_assignable_to(&rhs.attribute().decay(), value) {
                            self.diag(
                                format!(
                                    "can't assign value of type \"{}\" to value of type \"{}\"",
                                    rhs.attribute().decay(),
                                    value
                                ),
                                location,
                            );
                        }
                    }
                    TypeValue::Unknown => {}
                    other => {
                        self.diag(
                            format!("cannot assign to a value of type \"{other}\" (not an l-value)"),
                            lhs.location(),
                        );
                    }
                }
                (Tree::Assign { lhs, rhs }, Type::void())
            }
        };
        Node::new(kind, location, ty)
    }

    fn expect_bool(&mut self, test: &Node<Type>, what: &str) {
        if !is_assignable_to(&test.attribute().decay(), &Type::boolean()) {
            self.diag(
                format!("{what} of type \"{}\" is not a bool", test.attribute().decay()),
                test.location(),
            );
        }
    }

    /// Statements in source order, a fresh scope, and a first-declaration
    /// map for duplicate detection. The block's type is the type of its
    /// last statement.
    fn check_block(&mut self, stmts: &[Node<()>], env: &Environment) -> (Tree<Type>, Type) {
        let mut scope = env.clone();
        let mut declared_at: FxHashMap<String, Location> = FxHashMap::default();
        let mut typed_stmts = Vec::with_capacity(stmts.len());
        let mut last = Type::unknown();

        for stmt in stmts {
            let typed = self.check(stmt, &scope);
            match stmt.kind() {
                Tree::LetType { name, .. } | Tree::DefType { name, .. } => {
                    self.declare(
                        &mut declared_at,
                        format!("T:{name}"),
                        format!("duplicate type name \"{name}\""),
                        stmt.location(),
                    );
                    scope.types.insert(name.clone(), typed.attribute().clone());
                }
                Tree::VarDef(def) => {
                    self.declare(
                        &mut declared_at,
                        format!("V:{}", def.name),
                        format!("duplicate variable declaration of \"{}\"", def.name),
                        stmt.location(),
                    );
                    let ty = typed.attribute().clone();
                    scope.vars.insert(def.name.clone(), ty.clone());
                    // function-valued definitions are callable by name
                    let value = ty.decay();
                    if matches!(value.value(), TypeValue::Function(_)) {
                        scope.fns.insert(def.name.clone(), value);
                    }
                }
                _ => {}
            }
            last = typed.attribute().clone();
            typed_stmts.push(typed);
        }

        (Tree::Block(typed_stmts), last)
    }

    fn declare(
        &mut self,
        declared_at: &mut FxHashMap<String, Location>,
        key: String,
        message: String,
        location: Location,
    ) {
        if let Some(previous) = declared_at.get(&key) {
            self.diag(
                format!("{message} (with previous declaration at {previous})"),
                location,
            );
        } else {
            declared_at.insert(key, location);
        }
    }

    fn check_if(&mut self, if_expr: &IfExpr<()>, env: &Environment) -> (Tree<Type>, Type) {
        let tests: Vec<_> = if_expr.elif_tests.iter().map(|t| self.check(t, env)).collect();
        for test in &tests {
            self.expect_bool(test, "if condition");
        }
        let branches: Vec<_> =
            if_expr.elif_branches.iter().map(|b| self.check(b, env)).collect();
        let else_branch = if_expr.else_branch.as_ref().map(|e| self.check(e, env));

        let mut branch_types: Vec<Type> =
            branches.iter().map(|b| b.attribute().decay()).collect();
        match &else_branch {
            Some(e) => branch_types.push(e.attribute().decay()),
            None => branch_types.push(Type::void()),
        }
        let ty = join_types(branch_types);

        (Tree::If(IfExpr { elif_tests: tests, elif_branches: branches, else_branch }), ty)
    }

    fn check_fn_expr(&mut self, fn_expr: &FnExpr<()>, env: &Environment) -> (Tree<Type>, Type) {
        let type_env = env.with_context(Context::Type);
        let mut inner = env.clone();
        let mut params = Vec::with_capacity(fn_expr.arg_names.len());
        let mut arg_types = Vec::with_capacity(fn_expr.arg_types.len());

        for (name, ty_node) in fn_expr.arg_names.iter().zip(&fn_expr.arg_types) {
            let typed = self.check(ty_node, &type_env);
            let param_ty = typed.attribute().clone();
            inner.vars.insert(name.clone(), param_ty.clone());
            params.push(Param { name: name.clone(), ty: param_ty });
            arg_types.push(typed);
        }

        let result_type = fn_expr.result_type.as_ref().map(|r| self.check(r, &type_env));
        let body = self.check(&fn_expr.body, &inner);
        let body_ty = body.attribute().decay();

        let result = match &result_type {
            Some(declared) => {
                let declared_ty = declared.attribute().clone();
                if !is_assignable_to(&body_ty, &declared_ty) {
                    self.diag(
                        format!(
                            "function body of type \"{body_ty}\" is not assignable to declared result type \"{declared_ty}\""
                        ),
                        fn_expr.body.location(),
                    );
                }
                declared_ty
            }
            None => body_ty,
        };

        let captures: Vec<CaptureParam<Type>> = fn_expr
            .captures
            .iter()
            .map(|c| CaptureParam {
                by_var: c.by_var,
                name: c.name.clone(),
                init: c.init.as_ref().map(|i| self.check(i, env)),
            })
            .collect();

        let ty = Type::function(result, params.clone());
        (
            Tree::FnExpr(FnExpr {
                arg_names: fn_expr.arg_names.clone(),
                arg_types,
                result_type,
                body,
                captures,
            }),
            ty,
        )
    }

    fn check_var_def(
        &mut self,
        def: &VarDef<()>,
        env: &Environment,
        location: Location,
    ) -> (Tree<Type>, Type) {
        let declared_type =
            def.declared_type.as_ref().map(|t| self.check(t, &env.with_context(Context::Type)));
        let mut rhs =
            def.rhs.as_ref().map(|r| self.check(r, &env.with_context(Context::Var)));

        let decl_ty = declared_type.as_ref().map(|t| t.attribute().clone());

        if let (Some(decl), Some(rhs_node)) = (&decl_ty, rhs.as_mut()) {
            adapt_literal(rhs_node, decl);
        }

        let ty = match (&decl_ty, rhs.as_ref().map(|r| r.attribute().clone())) {
            (Some(decl), Some(deduced)) => {
                if !is_assignable_to(&deduced.decay(), decl) {
                    self.diag(
                        format!(
                            "can't assign value of type \"{}\" to value of type \"{decl}\"",
                            deduced.decay()
                        ),
                        location,
                    );
                }
                Type::ptr(decl.clone())
            }
            (None, Some(deduced)) => Type::ptr(deduced.decay()),
            (Some(decl), None) => Type::ptr(decl.clone()),
            (None, None) => Type::unknown(),
        };

        (
            Tree::VarDef(VarDef { name: def.name.clone(), declared_type, rhs }),
            ty,
        )
    }

    fn check_fn_invoc(
        &mut self,
        target: &Node<()>,
        arguments: &[Node<()>],
        env: &Environment,
        location: Location,
    ) -> (Tree<Type>, Type) {
        let target = self.check(target, &env.with_context(Context::Fn));
        let arg_env = env.with_context(Context::Var);
        let typed_args: Vec<_> = arguments.iter().map(|a| self.check(a, &arg_env)).collect();

        let target_ty = target.attribute().decay();
        let result = match target_ty.value() {
            TypeValue::Function(fn_ty) => {
                if typed_args.len() != fn_ty.params.len() {
                    self.diag(
                        format!(
                            "mismatch between actual and formal parameters: expected {} argument(s), got {}",
                            fn_ty.params.len(),
                            typed_args.len()
                        ),
                        location,
                    );
                } else {
                    for (actual, formal) in typed_args.iter().zip(&fn_ty.params) {
                        if !is_assignable_to(&actual.attribute().decay(), &formal.ty) {
                            self.diag(
                                format!(
                                    "argument of type \"{}\" is not assignable to parameter \"{}\" of type \"{}\"",
                                    actual.attribute().decay(),
                                    formal.name,
                                    formal.ty
                                ),
                                actual.location(),
                            );
                        }
                    }
                }
                fn_ty.result.clone()
            }
            TypeValue::Unknown => Type::unknown(),
            other => {
                self.diag(format!("expected function type, got \"{other}\""), location);
                Type::unknown()
            }
        };

        (Tree::Invoc { target, arguments: typed_args }, result)
    }

    fn check_type_invoc(
        &mut self,
        target: &Node<()>,
        arguments: &[Node<()>],
        env: &Environment,
        location: Location,
    ) -> (Tree<Type>, Type) {
        let type_env = env.with_context(Context::Type);
        let target = self.check(target, &type_env);
        let typed_args: Vec<_> = arguments.iter().map(|a| self.check(a, &type_env)).collect();

        let single_arg = |checker: &mut Self, what: &str| -> Option<Type> {
            if typed_args.len() == 1 {
                Some(typed_args[0].attribute().clone())
            } else {
                checker.diag(
                    format!(
                        "{what} accepts a single value type argument, but got {} arguments",
                        typed_args.len()
                    ),
                    location,
                );
                None
            }
        };

        let ty = match target.attribute().value() {
            TypeValue::Ptr { allocator, .. } => match single_arg(self, "pointer generic type \"ptr()\"") {
                Some(value) => Type::new(TypeValue::Ptr { value, allocator: allocator.clone() }),
                None => Type::unknown(),
            },
            TypeValue::Dynarr { allocator, .. } => {
                match single_arg(self, "dynamic array generic type \"dynarr()\"") {
                    Some(value) => {
                        Type::new(TypeValue::Dynarr { value, allocator: allocator.clone() })
                    }
                    None => Type::unknown(),
                }
            }
            TypeValue::Strlit { .. } => {
                let mut size = 0;
                if typed_args.len() != 1 {
                    self.diag(
                        format!(
                            "string literal generic type \"strlit()\" accepts a single length argument, but got {} arguments",
                            typed_args.len()
                        ),
                        location,
                    );
                } else if let Tree::Int(lit) = typed_args[0].kind() {
                    size = lit.value;
                } else {
                    self.diag(
                        "string literal generic type \"strlit()\" takes an integer literal length"
                            .to_string(),
                        typed_args[0].location(),
                    );
                }
                Type::strlit(size)
            }
            TypeValue::Function(_) => {
                if typed_args.is_empty() {
                    self.diag(
                        "function generic type \"fn()\" accepts at least the result type"
                            .to_string(),
                        location,
                    );
                    Type::unknown()
                } else {
                    let result = typed_args[0].attribute().clone();
                    let params = typed_args[1..]
                        .iter()
                        .enumerate()
                        .map(|(i, arg)| Param {
                            name: format!("arg{i}"),
                            ty: arg.attribute().clone(),
                        })
                        .collect();
                    Type::function(result, params)
                }
            }
            TypeValue::Unknown => Type::unknown(),
            other => {
                self.diag(format!("expected generic type, got \"{other}\""), location);
                Type::unknown()
            }
        };

        (Tree::Invoc { target, arguments: typed_args }, ty)
    }
}

/// An unsuffixed numeric literal adopts the numeric type it is being
/// matched against, so `var x: int = 42` elaborates the literal at
/// `i32` rather than the `i64` default.
fn adapt_literal(node: &mut Node<Type>, target: &Type) {
    let adapts = match (node.kind(), target.value()) {
        (Tree::Int(lit), TypeValue::Int { .. } | TypeValue::Float { .. }) => {
            lit.signedness == Signedness::Unspecified
        }
        (Tree::Float(_), TypeValue::Float { .. }) => true,
        _ => false,
    };
    if adapts {
        *node = Node::new(node.kind().clone(), node.location(), target.clone());
    }
}

/// Comparison, membership, and identity operators produce `bool`.
fn is_comparison_op(op: TokenKind) -> bool {
    matches!(
        op,
        TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::Leq
            | TokenKind::Geq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::In
            | TokenKind::Is
    )
}

/// A data list is an array when every element agrees, a tuple otherwise.
fn data_type(items: &[Node<Type>]) -> Type {
    let Some(first) = items.first() else {
        return Type::void();
    };
    let first_ty = first.attribute().clone();
    if items.iter().all(|item| item.attribute() == &first_ty) {
        Type::array(first_ty, vec![items.len() as u64])
    } else {
        Type::new(TypeValue::Tuple(
            items
                .iter()
                .map(|item| quill_types::TupleField { name: None, ty: item.attribute().clone() })
                .collect(),
        ))
    }
}

/// Fold a set of branch types into their promotion, or a variant of the
/// lot when no promotion exists.
fn join_types(types: Vec<Type>) -> Type {
    let Some(first) = types.first() else {
        return Type::unknown();
    };
    let mut acc = first.clone();
    for ty in &types[1..] {
        match promoted(&acc, ty) {
            Some(p) => acc = p,
            None => return Type::new(TypeValue::Variant(types.clone())),
        }
    }
    acc
}

/// The type denoted by a built-in type name.
fn primitive_type(kind: TokenKind) -> Type {
    match kind {
        TokenKind::Byte | TokenKind::I8 => Type::int(true, 8),
        TokenKind::Short | TokenKind::I16 => Type::int(true, 16),
        TokenKind::Int | TokenKind::I32 => Type::int(true, 32),
        TokenKind::Long | TokenKind::I64 => Type::int(true, 64),
        TokenKind::Ubyte | TokenKind::U8 => Type::int(false, 8),
        TokenKind::Ushort | TokenKind::U16 => Type::int(false, 16),
        TokenKind::Uint | TokenKind::U32 => Type::int(false, 32),
        TokenKind::Ulong | TokenKind::U64 => Type::int(false, 64),
        TokenKind::F32 => Type::float(32),
        TokenKind::F64 => Type::float(64),
        TokenKind::Char => Type::character(),
        TokenKind::Bool => Type::boolean(),
        TokenKind::String => Type::string(),
        TokenKind::Ptr => Type::ptr(Type::void()),
        TokenKind::Array => Type::array(Type::void(), vec![]),
        TokenKind::Dynarr => Type::dynarr(Type::void()),
        TokenKind::Slice => {
            Type::new(TypeValue::Slice { value: Type::void(), begin: 0, end: 0, stride: 0 })
        }
        TokenKind::Variant => Type::new(TypeValue::Variant(vec![])),
        TokenKind::Tuple => Type::new(TypeValue::Tuple(vec![])),
        TokenKind::Fn => Type::function(Type::void(), vec![]),
        _ => Type::unknown(),
    }
}
