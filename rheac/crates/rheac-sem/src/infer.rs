//! The type inference engine.
//!
//! A visitor walk installs, for every AST node it understands, a *lazy*
//! type: a thunk that computes the node's type on demand, possibly by
//! resolving child thunks. Laziness is what permits forward references
//! and recursive types; nothing is computed until a consumer asks.
//!
//! The engine borrows the AST for its whole lifetime, so the inference
//! table can never outlive the tree it indexes.

use rustc_hash::FxHashMap;

use rheac_par::ast::*;
use rheac_par::visitor::Visitor;
use rheac_util::{Handler, ScopeError, TypeError, TypeResult};

use crate::mapper::{resolve_typename, TypeMapper};
use crate::scope::{DeclarationType, ScopeTree};
use crate::types::{compatible, BasicType, SimpleType, TypeInfo};

type Thunk<'ast> = Box<dyn Fn(&TypeEngine<'ast>) -> TypeResult<TypeInfo> + 'ast>;

/// A lazily computed type: how to produce the type, bound to the engine
/// and node it will be evaluated against.
pub struct InferredType<'ast> {
    thunk: Thunk<'ast>,
}

impl<'ast> InferredType<'ast> {
    pub fn new(f: impl Fn(&TypeEngine<'ast>) -> TypeResult<TypeInfo> + 'ast) -> Self {
        Self { thunk: Box::new(f) }
    }

    /// A thunk that always yields the same type.
    pub fn constant(info: TypeInfo) -> Self {
        Self::new(move |_| Ok(info.clone()))
    }

    pub fn evaluate(&self, engine: &TypeEngine<'ast>) -> TypeResult<TypeInfo> {
        (self.thunk)(engine)
    }
}

/// Tracks every inferred type in a compilation unit: expressions,
/// declarations, function returns, and so on.
pub struct TypeEngine<'ast> {
    pub mapper: TypeMapper,
    pub scopes: ScopeTree,
    /// Non-fatal diagnostics gathered during the walk
    pub handler: Handler,
    inferred: FxHashMap<NodeId, InferredType<'ast>>,
}

impl<'ast> Default for TypeEngine<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> TypeEngine<'ast> {
    pub fn new() -> Self {
        Self {
            mapper: TypeMapper::new(),
            scopes: ScopeTree::new(),
            handler: Handler::new(),
            inferred: FxHashMap::default(),
        }
    }

    /// Walk a whole unit, installing thunks and populating scopes. The
    /// first duplicate declaration aborts the walk.
    pub fn run(&mut self, unit: &'ast Unit) -> Result<(), ScopeError> {
        let mut visitor = InferenceVisitor {
            engine: self,
            failure: None,
        };
        visitor.hoist_functions(unit.statements());
        for stmt in unit.statements() {
            stmt.accept(&mut visitor);
        }
        match visitor.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Walk a single statement; used by tests and the driver's line mode.
    pub fn run_statement(&mut self, stmt: &'ast Statement) -> Result<(), ScopeError> {
        let mut visitor = InferenceVisitor {
            engine: self,
            failure: None,
        };
        visitor.hoist_functions(std::slice::from_ref(stmt));
        stmt.accept(&mut visitor);
        match visitor.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Resolve a node's type. Nodes the walk installed nothing for are
    /// `Unknown` rather than an error.
    pub fn type_of(&self, id: NodeId) -> TypeResult<TypeInfo> {
        match self.inferred.get(&id) {
            Some(inferred) => inferred.evaluate(self),
            None => Ok(TypeInfo::Unknown),
        }
    }

    /// Resolve an AST typename against this unit's type registry.
    pub fn resolve(&self, typename: &Typename) -> TypeInfo {
        resolve_typename(&self.mapper, typename)
    }

    /// Force every installed thunk, surfacing the first inference error.
    pub fn check(&self) -> TypeResult<()> {
        for inferred in self.inferred.values() {
            inferred.evaluate(self)?;
        }
        Ok(())
    }

    /// The function return-type sub-pass: collect the type of every
    /// `return` in a body, however deeply nested.
    pub fn potential_return_types(&self, body: &'ast Statement) -> TypeResult<Vec<TypeInfo>> {
        let mut collector = ReturnCollector::default();
        body.accept(&mut collector);

        let mut types = Vec::new();
        for id in collector.returns {
            types.push(self.type_of(id)?);
        }
        Ok(types)
    }
}

/// Collects the value types of every `return` statement in a function
/// body. A dedicated visitor, because returns may be arbitrarily nested
/// in control flow.
#[derive(Default)]
pub struct ReturnCollector {
    /// Node ids of the returned value expressions, in source order
    pub returns: Vec<NodeId>,
}

impl<'ast> Visitor<'ast> for ReturnCollector {
    type Output = ();

    fn visit_return(&mut self, _node: &'ast Statement, expr: &'ast Expression) {
        self.returns.push(expr.id);
    }

    fn visit_block(&mut self, _node: &'ast Statement, stmts: &'ast [Statement]) {
        for s in stmts {
            s.accept(self);
        }
    }

    fn visit_if(&mut self, _node: &'ast Statement, stmt: &'ast IfStmt) {
        if let Some(t) = &stmt.then_case {
            t.accept(self);
        }
        if let Some(e) = &stmt.else_case {
            e.accept(self);
        }
    }

    fn visit_while(&mut self, _node: &'ast Statement, stmt: &'ast WhileStmt) {
        stmt.body.accept(self);
    }

    fn visit_for(&mut self, _node: &'ast Statement, stmt: &'ast ForStmt) {
        stmt.body.accept(self);
    }

    fn visit_with(&mut self, _node: &'ast Statement, stmt: &'ast WithStmt) {
        stmt.body.accept(self);
    }

    fn visit_match(&mut self, _node: &'ast Statement, stmt: &'ast MatchStmt) {
        for case in &stmt.cases {
            match case {
                MatchCase::On { body, .. }
                | MatchCase::When { body, .. }
                | MatchCase::Type { body, .. }
                | MatchCase::Default { body } => body.accept(self),
            }
        }
    }

    fn visit_try(&mut self, _node: &'ast Statement, stmt: &'ast TryStmt) {
        stmt.body.accept(self);
        for catch in &stmt.catches {
            catch.body.accept(self);
        }
        if let Some(f) = &stmt.finally {
            f.accept(self);
        }
    }

    fn visit_def(&mut self, _node: &'ast Statement, def: &'ast FunctionDef) {
        def.body.accept(self);
    }

    fn visit_generic_def(&mut self, _node: &'ast Statement, def: &'ast GenericFunctionDef) {
        def.def.body.accept(self);
    }
}

/// The walk that installs inference thunks and builds the scope tree.
struct InferenceVisitor<'e, 'ast> {
    engine: &'e mut TypeEngine<'ast>,
    failure: Option<ScopeError>,
}

impl<'e, 'ast> InferenceVisitor<'e, 'ast> {
    fn install(&mut self, id: NodeId, inferred: InferredType<'ast>) {
        self.engine.inferred.insert(id, inferred);
    }

    fn install_nothing(&mut self, id: NodeId) {
        self.install(id, InferredType::constant(TypeInfo::Nothing));
    }

    fn declare(
        &mut self,
        name: &str,
        node: NodeId,
        kind: DeclarationType,
        pos: &rheac_util::SourcePosition,
    ) {
        // Shadowing an outer binding is legal, but worth a warning for
        // value bindings.
        let shadows = !self.engine.scopes.is_local(name)
            && self.engine.scopes.lookup(name).is_some()
            && matches!(
                kind,
                DeclarationType::Variable | DeclarationType::Constant
            );
        if shadows {
            self.engine.handler.warning(
                format!("declaration of `{}` shadows an outer binding", name),
                pos.clone(),
            );
        }

        if let Err(err) = self.engine.scopes.declare(name, node, kind, pos) {
            if self.failure.is_none() {
                self.failure = Some(err);
            }
        }
    }

    fn define_type(&mut self, name: &str, info: TypeInfo, pos: &rheac_util::SourcePosition) {
        if !self.engine.mapper.add_type_definition(name, info) {
            if self.failure.is_none() {
                self.failure = Some(ScopeError::DuplicateDeclaration {
                    position: pos.clone(),
                    name: name.to_string(),
                });
            }
        }
    }

    /// Declare the function-like names of a statement run before walking
    /// it, so a use may precede its definition within the same scope.
    fn hoist_functions(&mut self, stmts: &'ast [Statement]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Def(def) => {
                    self.declare(&def.name, stmt.id, DeclarationType::Function, &stmt.pos);
                }
                StmtKind::GenericDef(def) => {
                    self.declare(&def.def.name, stmt.id, DeclarationType::Generic, &stmt.pos);
                }
                StmtKind::Extern(name) => {
                    self.declare(name, stmt.id, DeclarationType::Function, &stmt.pos);
                }
                _ => {}
            }
        }
    }

    /// Shared walk for concrete and generic function definitions.
    fn walk_def(
        &mut self,
        node: &'ast Statement,
        def: &'ast FunctionDef,
        declaration: DeclarationType,
    ) {
        // The name is usually already hoisted; declare it here only when
        // the definition sits somewhere the hoisting pass does not scan.
        if !self.engine.scopes.is_local(&def.name) {
            self.declare(&def.name, node.id, declaration, &node.pos);
        }

        self.engine.scopes.begin(Some(&def.name));
        if let Some(args) = &def.arguments {
            for pair in &args.arguments {
                self.declare(&pair.name, pair.id, DeclarationType::Variable, &pair.pos);
                let typename = &pair.value;
                self.install(pair.id, InferredType::new(move |e| Ok(e.resolve(typename))));
            }
        }
        for condition in &def.conditions {
            condition.predicate.accept(self);
        }
        def.body.accept(self);
        self.engine.scopes.end();

        // The return type comes from the annotation when present;
        // predicates have an implied boolean return; otherwise the
        // return-collection sub-pass decides.
        match (&def.return_type, def.kind) {
            (Some(typename), _) => {
                let tn = typename;
                self.install(node.id, InferredType::new(move |e| Ok(e.resolve(tn))));
            }
            (None, FunctionKind::Predicate) => {
                self.install(node.id, InferredType::constant(TypeInfo::boolean()));
            }
            (None, _) => {
                let body: &'ast Statement = &def.body;
                let pos = node.pos.clone();
                self.install(
                    node.id,
                    InferredType::new(move |e| {
                        let types = e.potential_return_types(body)?;
                        match types.split_first() {
                            None => Ok(TypeInfo::Nothing),
                            Some((first, rest)) => match rest.iter().find(|t| *t != first) {
                                Some(disagreeing) => Err(TypeError::Mismatch {
                                    position: pos.clone(),
                                    expected: first.to_string(),
                                    actual: disagreeing.to_string(),
                                }),
                                None => Ok(first.clone()),
                            },
                        }
                    }),
                );
            }
        }
    }
}

impl<'e, 'ast> Visitor<'ast> for InferenceVisitor<'e, 'ast> {
    type Output = ();

    // Literals carry their obvious types.
    fn visit_integer(&mut self, node: &'ast Expression, _value: i32) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::Integer, true, true)),
        );
    }

    fn visit_byte(&mut self, node: &'ast Expression, _value: i8) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::Byte, true, true)),
        );
    }

    fn visit_long(&mut self, node: &'ast Expression, _value: i64) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::Long, true, true)),
        );
    }

    fn visit_unsigned_integer(&mut self, node: &'ast Expression, _value: u32) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::UnsignedInteger, true, true)),
        );
    }

    fn visit_unsigned_byte(&mut self, node: &'ast Expression, _value: u8) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::UnsignedByte, true, true)),
        );
    }

    fn visit_unsigned_long(&mut self, node: &'ast Expression, _value: u64) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::UnsignedLong, true, true)),
        );
    }

    fn visit_float(&mut self, node: &'ast Expression, _value: f32) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::Float, true, false)),
        );
    }

    fn visit_double(&mut self, node: &'ast Expression, _value: f64) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::Double, true, false)),
        );
    }

    fn visit_boolean(&mut self, node: &'ast Expression, _value: bool) {
        self.install(node.id, InferredType::constant(TypeInfo::boolean()));
    }

    fn visit_string(&mut self, node: &'ast Expression, _value: &'ast str) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::String, false, false)),
        );
    }

    fn visit_symbol(&mut self, node: &'ast Expression, _value: &'ast str) {
        self.install(
            node.id,
            InferredType::constant(TypeInfo::simple(BasicType::Symbol, false, false)),
        );
    }

    fn visit_nothing(&mut self, node: &'ast Expression) {
        self.install(node.id, InferredType::constant(TypeInfo::Nothing));
    }

    // Identifiers resolve through the scope chain to their declaring
    // node's inferred type. The declaration is found now, while the
    // cursor is in the right scope; its type is still computed lazily.
    fn visit_identifier(&mut self, node: &'ast Expression, name: &'ast str) {
        match self.engine.scopes.lookup(name) {
            Some(entry) => {
                let declaration = entry.node;
                self.install(node.id, InferredType::new(move |e| e.type_of(declaration)));
            }
            None => {
                self.install(node.id, InferredType::constant(TypeInfo::Unknown));
            }
        }
    }

    // Cross-module names stay unknown; module resolution is the driver's
    // concern, not this unit's.
    fn visit_fully_qualified(&mut self, node: &'ast Expression, _parts: &'ast [String]) {
        self.install(node.id, InferredType::constant(TypeInfo::Unknown));
    }

    fn visit_relative_identifier(&mut self, node: &'ast Expression, _inner: &'ast Expression) {
        self.install(node.id, InferredType::constant(TypeInfo::Unknown));
    }

    fn visit_binary_op(&mut self, node: &'ast Expression, expr: &'ast BinaryExpr) {
        expr.left.accept(self);
        expr.right.accept(self);

        let op = expr.op;
        let left = expr.left.id;
        let right = expr.right.id;
        self.install(
            node.id,
            InferredType::new(move |e| {
                let lt = e.type_of(left)?;
                let rt = e.type_of(right)?;
                Ok(match op {
                    BinaryOperator::Equals
                    | BinaryOperator::NotEqual
                    | BinaryOperator::LessThan
                    | BinaryOperator::GreaterThan
                    | BinaryOperator::LessThanOrEqual
                    | BinaryOperator::GreaterThanOrEqual
                    | BinaryOperator::BooleanAnd
                    | BinaryOperator::BooleanOr => TypeInfo::boolean(),
                    BinaryOperator::LeftShift
                    | BinaryOperator::RightShift
                    | BinaryOperator::BitAnd
                    | BinaryOperator::BitOr
                    | BinaryOperator::BitXor => {
                        if lt.is_integral() && rt.is_integral() {
                            lt
                        } else {
                            TypeInfo::Unknown
                        }
                    }
                    _ => {
                        if compatible(&lt, &rt) {
                            lt
                        } else {
                            TypeInfo::Unknown
                        }
                    }
                })
            }),
        );
    }

    fn visit_unary_op(&mut self, node: &'ast Expression, expr: &'ast UnaryExpr) {
        expr.operand.accept(self);

        let op = expr.op;
        let operand = expr.operand.id;
        self.install(
            node.id,
            InferredType::new(move |e| {
                let t = e.type_of(operand)?;
                Ok(match op {
                    UnaryOperator::Plus => {
                        if t.is_numeric() {
                            t
                        } else {
                            TypeInfo::Unknown
                        }
                    }
                    UnaryOperator::Minus => match t {
                        TypeInfo::Simple(s) if s.is_numeric => {
                            let flipped = match s.basic {
                                BasicType::UnsignedByte => BasicType::Byte,
                                BasicType::UnsignedInteger => BasicType::Integer,
                                BasicType::UnsignedLong => BasicType::Long,
                                other => other,
                            };
                            TypeInfo::Simple(SimpleType::new(flipped, true, s.is_integral))
                        }
                        _ => TypeInfo::Unknown,
                    },
                    UnaryOperator::BooleanNot => TypeInfo::boolean(),
                    UnaryOperator::Coerce => TypeInfo::promoted(),
                    UnaryOperator::BitNot
                    | UnaryOperator::Dereference
                    | UnaryOperator::Ref
                    | UnaryOperator::Ptr => t,
                })
            }),
        );
    }

    fn visit_ternary_op(&mut self, node: &'ast Expression, expr: &'ast TernaryExpr) {
        expr.condition.accept(self);
        expr.true_branch.accept(self);
        expr.false_branch.accept(self);

        let true_branch = expr.true_branch.id;
        let false_branch = expr.false_branch.id;
        self.install(
            node.id,
            InferredType::new(move |e| {
                let t = e.type_of(true_branch)?;
                let f = e.type_of(false_branch)?;
                Ok(if t == f { t } else { TypeInfo::Unknown })
            }),
        );
    }

    fn visit_member(&mut self, _node: &'ast Expression, expr: &'ast MemberExpr) {
        // The member name resolves against the object's fields, not the
        // scope chain, so only the object is walked.
        expr.object.accept(self);
    }

    fn visit_subscript(&mut self, _node: &'ast Expression, expr: &'ast SubscriptExpr) {
        expr.container.accept(self);
        expr.index.accept(self);
    }

    fn visit_cast(&mut self, node: &'ast Expression, expr: &'ast CastExpr) {
        expr.left.accept(self);
        let typename: &'ast Typename = &expr.right;
        self.install(node.id, InferredType::new(move |e| Ok(e.resolve(typename))));
    }

    fn visit_type_check(&mut self, node: &'ast Expression, expr: &'ast TypeCheckExpr) {
        expr.left.accept(self);
        self.install(node.id, InferredType::constant(TypeInfo::boolean()));
    }

    fn visit_array(&mut self, _node: &'ast Expression, items: &'ast [Expression]) {
        for item in items {
            item.accept(self);
        }
    }

    fn visit_list(&mut self, _node: &'ast Expression, items: &'ast [Expression]) {
        for item in items {
            item.accept(self);
        }
    }

    fn visit_tuple(&mut self, _node: &'ast Expression, items: &'ast [Expression]) {
        for item in items {
            item.accept(self);
        }
    }

    fn visit_dictionary(&mut self, _node: &'ast Expression, entries: &'ast [DictionaryEntry]) {
        for entry in entries {
            entry.value.accept(self);
        }
    }

    fn visit_call(&mut self, _node: &'ast Expression, call: &'ast CallExpr) {
        call.target.accept(self);
        for argument in &call.arguments {
            match argument {
                CallArgument::Positional(e) => e.accept(self),
                CallArgument::Named(n) => n.value.accept(self),
            }
        }
    }

    // Predicates have an implied boolean result.
    fn visit_predicate_call(&mut self, node: &'ast Expression, call: &'ast PredicateCallExpr) {
        for argument in &call.arguments {
            argument.accept(self);
        }
        self.install(node.id, InferredType::constant(TypeInfo::boolean()));
    }

    fn visit_constructor(&mut self, _node: &'ast Expression, ctor: &'ast ConstructorExpr) {
        for argument in &ctor.arguments {
            match argument {
                CallArgument::Positional(e) => e.accept(self),
                CallArgument::Named(n) => n.value.accept(self),
            }
        }
    }

    // Statements

    fn visit_bare_expression(&mut self, node: &'ast Statement, expr: &'ast Expression) {
        expr.accept(self);
        let inner = expr.id;
        self.install(node.id, InferredType::new(move |e| e.type_of(inner)));
    }

    fn visit_block(&mut self, node: &'ast Statement, stmts: &'ast [Statement]) {
        self.engine.scopes.begin(None);
        self.hoist_functions(stmts);
        for stmt in stmts {
            stmt.accept(self);
        }
        self.engine.scopes.end();
        self.install_nothing(node.id);
    }

    fn visit_assign(&mut self, node: &'ast Statement, stmt: &'ast AssignStmt) {
        stmt.lhs.accept(self);
        stmt.rhs.accept(self);
        self.install_nothing(node.id);
    }

    fn visit_compound_assign(&mut self, node: &'ast Statement, stmt: &'ast CompoundAssignStmt) {
        stmt.lhs.accept(self);
        stmt.rhs.accept(self);
        self.install_nothing(node.id);
    }

    // A type declaration binds the name to the declared typename.
    fn visit_type_declaration(&mut self, node: &'ast Statement, stmt: &'ast TypeDeclStmt) {
        let name = stmt.lhs.identifier_name().unwrap_or_default().to_string();
        self.declare(&name, node.id, DeclarationType::Variable, &node.pos);

        let typename = &stmt.rhs;
        self.install(node.id, InferredType::new(move |e| Ok(e.resolve(typename))));
        self.install(
            stmt.lhs.id,
            InferredType::new(move |e| Ok(e.resolve(typename))),
        );
    }

    // A variable declaration binds the name to the RHS's inferred type.
    fn visit_variable(&mut self, node: &'ast Statement, stmt: &'ast BindingStmt) {
        stmt.rhs.accept(self);

        let name = stmt.lhs.identifier_name().unwrap_or_default().to_string();
        self.declare(&name, node.id, DeclarationType::Variable, &node.pos);

        let rhs = stmt.rhs.id;
        self.install(node.id, InferredType::new(move |e| e.type_of(rhs)));
        self.install(stmt.lhs.id, InferredType::new(move |e| e.type_of(rhs)));
    }

    // Same as a variable, but the declaration is marked immutable.
    fn visit_constant(&mut self, node: &'ast Statement, stmt: &'ast BindingStmt) {
        stmt.rhs.accept(self);

        let name = stmt.lhs.identifier_name().unwrap_or_default().to_string();
        self.declare(&name, node.id, DeclarationType::Constant, &node.pos);

        let rhs = stmt.rhs.id;
        self.install(node.id, InferredType::new(move |e| e.type_of(rhs)));
        self.install(stmt.lhs.id, InferredType::new(move |e| e.type_of(rhs)));
    }

    fn visit_do(&mut self, node: &'ast Statement, expr: &'ast Expression) {
        expr.accept(self);
        self.install_nothing(node.id);
    }

    fn visit_if(&mut self, node: &'ast Statement, stmt: &'ast IfStmt) {
        stmt.condition.accept(self);
        if let Some(t) = &stmt.then_case {
            t.accept(self);
        }
        if let Some(e) = &stmt.else_case {
            e.accept(self);
        }
        self.install_nothing(node.id);
    }

    fn visit_while(&mut self, node: &'ast Statement, stmt: &'ast WhileStmt) {
        stmt.condition.accept(self);
        stmt.body.accept(self);
        self.install_nothing(node.id);
    }

    fn visit_for(&mut self, node: &'ast Statement, stmt: &'ast ForStmt) {
        stmt.range.accept(self);
        self.engine.scopes.begin(None);
        self.declare(&stmt.index, node.id, DeclarationType::Variable, &node.pos);
        stmt.body.accept(self);
        self.engine.scopes.end();
        self.install_nothing(node.id);
    }

    fn visit_with(&mut self, node: &'ast Statement, stmt: &'ast WithStmt) {
        for predicate in &stmt.predicates {
            predicate.accept(self);
        }
        stmt.body.accept(self);
        self.install_nothing(node.id);
    }

    fn visit_break(&mut self, node: &'ast Statement) {
        self.install_nothing(node.id);
    }

    fn visit_continue(&mut self, node: &'ast Statement) {
        self.install_nothing(node.id);
    }

    fn visit_match(&mut self, node: &'ast Statement, stmt: &'ast MatchStmt) {
        stmt.target.accept(self);
        for case in &stmt.cases {
            match case {
                MatchCase::On { value, body } => {
                    value.accept(self);
                    body.accept(self);
                }
                MatchCase::When { predicate, body } => {
                    predicate.accept(self);
                    body.accept(self);
                }
                MatchCase::Type { body, .. } => body.accept(self),
                MatchCase::Default { body } => body.accept(self),
            }
        }
        self.install_nothing(node.id);
    }

    fn visit_throw(&mut self, node: &'ast Statement, expr: &'ast Expression) {
        expr.accept(self);
        self.install_nothing(node.id);
    }

    fn visit_try(&mut self, node: &'ast Statement, stmt: &'ast TryStmt) {
        stmt.body.accept(self);
        for catch in &stmt.catches {
            // The caught exception is visible inside the catch body.
            self.engine.scopes.begin(None);
            let pair = &catch.catch_type;
            self.declare(&pair.name, pair.id, DeclarationType::Variable, &pair.pos);
            let typename = &pair.value;
            self.install(pair.id, InferredType::new(move |e| Ok(e.resolve(typename))));
            catch.body.accept(self);
            self.engine.scopes.end();
        }
        if let Some(f) = &stmt.finally {
            f.accept(self);
        }
        self.install_nothing(node.id);
    }

    fn visit_return(&mut self, node: &'ast Statement, expr: &'ast Expression) {
        expr.accept(self);
        self.install_nothing(node.id);
    }

    // Extern names are hoisted with the function declarations.
    fn visit_extern(&mut self, node: &'ast Statement, _name: &'ast str) {
        self.install_nothing(node.id);
    }

    fn visit_alias(&mut self, node: &'ast Statement, stmt: &'ast AliasStmt) {
        self.declare(&stmt.name, node.id, DeclarationType::Alias, &node.pos);
        let resolved = self.engine.resolve(&stmt.original);
        self.define_type(&stmt.name, resolved, &node.pos);
        self.install_nothing(node.id);
    }

    // Enum values are symbols; the enum's name types as symbol-valued.
    fn visit_enum(&mut self, node: &'ast Statement, stmt: &'ast EnumStmt) {
        self.declare(&stmt.name, node.id, DeclarationType::Enum, &node.pos);
        self.define_type(
            &stmt.name,
            TypeInfo::simple(BasicType::Symbol, false, false),
            &node.pos,
        );
        self.install_nothing(node.id);
    }

    fn visit_structure(&mut self, node: &'ast Statement, stmt: &'ast StructureStmt) {
        self.declare(&stmt.name, node.id, DeclarationType::Structure, &node.pos);

        let mut fields = indexmap::IndexMap::new();
        for pair in &stmt.fields {
            fields.insert(pair.name.clone(), self.engine.resolve(&pair.value));
        }
        self.define_type(
            &stmt.name,
            TypeInfo::Structure(crate::types::StructureType { fields }),
            &node.pos,
        );
        self.install_nothing(node.id);
    }

    fn visit_def(&mut self, node: &'ast Statement, def: &'ast FunctionDef) {
        self.walk_def(node, def, DeclarationType::Function);
    }

    fn visit_generic_def(&mut self, node: &'ast Statement, def: &'ast GenericFunctionDef) {
        self.walk_def(node, &def.def, DeclarationType::Generic);
    }

    fn visit_concept_def(&mut self, node: &'ast Statement, def: &'ast ConceptDef) {
        self.declare(&def.name, node.id, DeclarationType::Concept, &node.pos);
        self.install_nothing(node.id);
    }

    fn visit_module_def(&mut self, node: &'ast Statement, _name: &'ast ModuleName) {
        self.install_nothing(node.id);
    }

    fn visit_use(&mut self, node: &'ast Statement, _name: &'ast ModuleName) {
        self.install_nothing(node.id);
    }

    fn visit_import(&mut self, node: &'ast Statement, _stmt: &'ast ImportStmt) {
        self.install_nothing(node.id);
    }

    fn visit_export(&mut self, node: &'ast Statement, _names: &'ast [String]) {
        self.install_nothing(node.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rheac_par::{parse_statement, parse_unit};

    fn bare_expr_id(stmt: &Statement) -> NodeId {
        match &stmt.kind {
            StmtKind::BareExpression(e) => e.id,
            other => panic!("expected bare expression, got {:?}", other),
        }
    }

    fn infer_bare(source: &str) -> TypeInfo {
        let stmt = parse_statement(source, "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run_statement(&stmt).unwrap();
        engine.type_of(bare_expr_id(&stmt)).unwrap()
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(infer_bare("42;"), TypeInfo::simple(BasicType::Integer, true, true));
        assert_eq!(infer_bare("42_l;"), TypeInfo::simple(BasicType::Long, true, true));
        assert_eq!(
            infer_bare("1.5;"),
            TypeInfo::simple(BasicType::Double, true, false)
        );
        assert_eq!(infer_bare("1.5_f;"), TypeInfo::simple(BasicType::Float, true, false));
        assert_eq!(infer_bare("true;"), TypeInfo::boolean());
        assert_eq!(
            infer_bare("\"s\";"),
            TypeInfo::simple(BasicType::String, false, false)
        );
        assert_eq!(
            infer_bare("@sym;"),
            TypeInfo::simple(BasicType::Symbol, false, false)
        );
        assert_eq!(infer_bare("nothing;"), TypeInfo::Nothing);
    }

    #[test]
    fn test_literal_flags() {
        match infer_bare("42;") {
            TypeInfo::Simple(s) => {
                assert!(s.is_numeric);
                assert!(s.is_integral);
            }
            other => panic!("unexpected {:?}", other),
        }
        match infer_bare("1.5;") {
            TypeInfo::Simple(s) => {
                assert!(s.is_numeric);
                assert!(!s.is_integral);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_binary_op_compatible_yields_left() {
        assert_eq!(
            infer_bare("1 + 2;"),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
    }

    #[test]
    fn test_binary_op_incompatible_yields_unknown() {
        assert_eq!(infer_bare("1 + 1.5;"), TypeInfo::Unknown);
    }

    #[test]
    fn test_relational_and_boolean_yield_boolean() {
        assert_eq!(infer_bare("1 < 2;"), TypeInfo::boolean());
        assert_eq!(infer_bare("1 == 2;"), TypeInfo::boolean());
        assert_eq!(infer_bare("true and false;"), TypeInfo::boolean());
    }

    #[test]
    fn test_shift_requires_integral() {
        assert_eq!(
            infer_bare("1 << 2;"),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
        assert_eq!(infer_bare("1.5 << 2;"), TypeInfo::Unknown);
    }

    #[test]
    fn test_unary_minus_flips_unsigned() {
        assert_eq!(
            infer_bare("-(7_u);"),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
        assert_eq!(
            infer_bare("-(7_ub);"),
            TypeInfo::simple(BasicType::Byte, true, true)
        );
        assert_eq!(
            infer_bare("-(7_ul);"),
            TypeInfo::simple(BasicType::Long, true, true)
        );
    }

    #[test]
    fn test_unary_not_and_coerce() {
        assert_eq!(infer_bare("not x;"), TypeInfo::boolean());
        assert_eq!(infer_bare("^1;"), TypeInfo::promoted());
    }

    #[test]
    fn test_ternary_requires_matching_branches() {
        assert_eq!(
            infer_bare("(if c then 1 else 2);"),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
        assert_eq!(infer_bare("(if c then 1 else 2.5);"), TypeInfo::Unknown);
    }

    #[test]
    fn test_cast_and_typecheck() {
        assert_eq!(
            infer_bare("x as long;"),
            TypeInfo::simple(BasicType::Long, true, true)
        );
        assert_eq!(infer_bare("x is long;"), TypeInfo::boolean());
    }

    #[test]
    fn test_identifier_resolves_through_declaration() {
        let stmt = parse_statement("{ var x = 42; do x; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run_statement(&stmt).unwrap();

        let StmtKind::Block(stmts) = &stmt.kind else {
            panic!("expected block")
        };
        let StmtKind::Do(use_expr) = &stmts[1].kind else {
            panic!("expected do")
        };
        assert_eq!(
            engine.type_of(use_expr.id).unwrap(),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
    }

    #[test]
    fn test_type_declaration_binds_declared_type() {
        let stmt = parse_statement("{ var x as string; do x; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run_statement(&stmt).unwrap();

        let StmtKind::Block(stmts) = &stmt.kind else {
            panic!("expected block")
        };
        let StmtKind::Do(use_expr) = &stmts[1].kind else {
            panic!("expected do")
        };
        assert_eq!(
            engine.type_of(use_expr.id).unwrap(),
            TypeInfo::simple(BasicType::String, false, false)
        );
    }

    #[test]
    fn test_unresolved_identifier_is_unknown() {
        assert_eq!(infer_bare("mystery;"), TypeInfo::Unknown);
    }

    #[test]
    fn test_duplicate_declaration_is_error() {
        let stmt = parse_statement("{ var x = 1; var x = 2; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        assert!(engine.run_statement(&stmt).is_err());
    }

    #[test]
    fn test_function_overloads_are_not_duplicates() {
        let unit = parse_unit(
            "def f { a: integer } = { return 1; } def f { s: string } = { return 2; }",
            "test",
        )
        .unwrap();
        let mut engine = TypeEngine::new();
        assert!(engine.run(&unit).is_ok());
    }

    #[test]
    fn test_def_return_type_from_annotation() {
        let unit = parse_unit("def f [long] = { return 1_l; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let def = &unit.statements()[0];
        assert_eq!(
            engine.type_of(def.id).unwrap(),
            TypeInfo::simple(BasicType::Long, true, true)
        );
    }

    #[test]
    fn test_def_return_type_collected_from_body() {
        let unit = parse_unit("def f = { return 42; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let def = &unit.statements()[0];
        assert_eq!(
            engine.type_of(def.id).unwrap(),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
    }

    #[test]
    fn test_def_without_returns_is_nothing() {
        let unit = parse_unit("def f = { do x; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let def = &unit.statements()[0];
        assert_eq!(engine.type_of(def.id).unwrap(), TypeInfo::Nothing);
    }

    #[test]
    fn test_def_disagreeing_returns_is_error() {
        let unit = parse_unit(
            "def f = { if c { return 1; } else { return 1.5; } }",
            "test",
        )
        .unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let def = &unit.statements()[0];
        assert!(engine.type_of(def.id).is_err());
    }

    #[test]
    fn test_forward_reference_to_later_function() {
        let unit = parse_unit(
            "def a = { return b; } def b [long] = { return 1_l; }",
            "test",
        )
        .unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        // `a` returns whatever `b` is, and `b` is declared after `a`.
        let a = &unit.statements()[0];
        assert_eq!(
            engine.type_of(a.id).unwrap(),
            TypeInfo::simple(BasicType::Long, true, true)
        );
    }

    #[test]
    fn test_predicate_def_is_boolean() {
        let unit = parse_unit("def ready? = { return true; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let def = &unit.statements()[0];
        assert_eq!(engine.type_of(def.id).unwrap(), TypeInfo::boolean());
    }

    #[test]
    fn test_return_collector_sub_pass() {
        let unit = parse_unit("def f = { return 42; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let StmtKind::Def(def) = &unit.statements()[0].kind else {
            panic!("expected def")
        };
        let types = engine.potential_return_types(&def.body).unwrap();
        assert_eq!(
            types,
            vec![TypeInfo::simple(BasicType::Integer, true, true)]
        );
    }

    #[test]
    fn test_return_collector_descends_nested_control_flow() {
        let unit = parse_unit(
            "def f = { while c { if d { return 1; } } return 2; }",
            "test",
        )
        .unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let StmtKind::Def(def) = &unit.statements()[0].kind else {
            panic!("expected def")
        };
        let types = engine.potential_return_types(&def.body).unwrap();
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_function_arguments_are_typed_in_body() {
        let unit = parse_unit("def f { a: integer } = { return a; }", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        let def = &unit.statements()[0];
        assert_eq!(
            engine.type_of(def.id).unwrap(),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
    }

    #[test]
    fn test_structure_declaration_registers_type() {
        let unit = parse_unit(
            "type Person = { name: string, age: integer }; def f = { var p as Person; do p; }",
            "test",
        )
        .unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        match engine.mapper.get_type_for("Person") {
            TypeInfo::Structure(s) => {
                let names: Vec<_> = s.fields.keys().cloned().collect();
                assert_eq!(names, vec!["name".to_string(), "age".to_string()]);
            }
            other => panic!("expected structure, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_registers_resolved_type() {
        let unit = parse_unit("type Id = integer;", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run(&unit).unwrap();

        assert_eq!(
            engine.mapper.get_type_for("Id"),
            TypeInfo::simple(BasicType::Integer, true, true)
        );
    }

    #[test]
    fn test_predicate_call_is_boolean() {
        let stmt = parse_statement("with (ready?) do x;", "test").unwrap();
        let mut engine = TypeEngine::new();
        engine.run_statement(&stmt).unwrap();

        let StmtKind::With(with) = &stmt.kind else {
            panic!("expected with")
        };
        assert_eq!(
            engine.type_of(with.predicates[0].id).unwrap(),
            TypeInfo::boolean()
        );
    }
}
