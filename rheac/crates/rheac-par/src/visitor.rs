//! The visitor framework.
//!
//! Compiler passes (type inference, return-type collection, code
//! generation) traverse the AST through a single [`Visitor`] trait. Every
//! node kind has its own `visit_*` method with a no-op default, so a pass
//! overrides only what it cares about. The visitor's result carrier is an
//! associated type; each pass instantiates it over its own result.
//!
//! Dispatch happens in the `accept` methods on [`Expression`] and
//! [`Statement`], which match on the closed kind sums.

use crate::ast::*;

/// A traversal over the AST. All methods default to producing
/// `Output::default()` without descending; passes that need recursion
/// call `accept` on child nodes themselves.
pub trait Visitor<'ast> {
    /// The pass-specific result carrier.
    type Output: Default;

    // Literals
    fn visit_integer(&mut self, _node: &'ast Expression, _value: i32) -> Self::Output {
        Self::Output::default()
    }
    fn visit_byte(&mut self, _node: &'ast Expression, _value: i8) -> Self::Output {
        Self::Output::default()
    }
    fn visit_long(&mut self, _node: &'ast Expression, _value: i64) -> Self::Output {
        Self::Output::default()
    }
    fn visit_unsigned_integer(&mut self, _node: &'ast Expression, _value: u32) -> Self::Output {
        Self::Output::default()
    }
    fn visit_unsigned_byte(&mut self, _node: &'ast Expression, _value: u8) -> Self::Output {
        Self::Output::default()
    }
    fn visit_unsigned_long(&mut self, _node: &'ast Expression, _value: u64) -> Self::Output {
        Self::Output::default()
    }
    fn visit_float(&mut self, _node: &'ast Expression, _value: f32) -> Self::Output {
        Self::Output::default()
    }
    fn visit_double(&mut self, _node: &'ast Expression, _value: f64) -> Self::Output {
        Self::Output::default()
    }
    fn visit_boolean(&mut self, _node: &'ast Expression, _value: bool) -> Self::Output {
        Self::Output::default()
    }
    fn visit_string(&mut self, _node: &'ast Expression, _value: &'ast str) -> Self::Output {
        Self::Output::default()
    }
    fn visit_symbol(&mut self, _node: &'ast Expression, _value: &'ast str) -> Self::Output {
        Self::Output::default()
    }
    fn visit_nothing(&mut self, _node: &'ast Expression) -> Self::Output {
        Self::Output::default()
    }

    // Identifiers
    fn visit_identifier(&mut self, _node: &'ast Expression, _name: &'ast str) -> Self::Output {
        Self::Output::default()
    }
    fn visit_fully_qualified(
        &mut self,
        _node: &'ast Expression,
        _parts: &'ast [String],
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_relative_identifier(
        &mut self,
        _node: &'ast Expression,
        _inner: &'ast Expression,
    ) -> Self::Output {
        Self::Output::default()
    }

    // Operators
    fn visit_binary_op(&mut self, _node: &'ast Expression, _expr: &'ast BinaryExpr) -> Self::Output {
        Self::Output::default()
    }
    fn visit_unary_op(&mut self, _node: &'ast Expression, _expr: &'ast UnaryExpr) -> Self::Output {
        Self::Output::default()
    }
    fn visit_ternary_op(
        &mut self,
        _node: &'ast Expression,
        _expr: &'ast TernaryExpr,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_member(&mut self, _node: &'ast Expression, _expr: &'ast MemberExpr) -> Self::Output {
        Self::Output::default()
    }
    fn visit_subscript(
        &mut self,
        _node: &'ast Expression,
        _expr: &'ast SubscriptExpr,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_cast(&mut self, _node: &'ast Expression, _expr: &'ast CastExpr) -> Self::Output {
        Self::Output::default()
    }
    fn visit_type_check(
        &mut self,
        _node: &'ast Expression,
        _expr: &'ast TypeCheckExpr,
    ) -> Self::Output {
        Self::Output::default()
    }

    // Containers
    fn visit_array(&mut self, _node: &'ast Expression, _items: &'ast [Expression]) -> Self::Output {
        Self::Output::default()
    }
    fn visit_list(&mut self, _node: &'ast Expression, _items: &'ast [Expression]) -> Self::Output {
        Self::Output::default()
    }
    fn visit_tuple(&mut self, _node: &'ast Expression, _items: &'ast [Expression]) -> Self::Output {
        Self::Output::default()
    }
    fn visit_symbol_list(
        &mut self,
        _node: &'ast Expression,
        _symbols: &'ast [String],
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_dictionary(
        &mut self,
        _node: &'ast Expression,
        _entries: &'ast [DictionaryEntry],
    ) -> Self::Output {
        Self::Output::default()
    }

    // Calls
    fn visit_call(&mut self, _node: &'ast Expression, _call: &'ast CallExpr) -> Self::Output {
        Self::Output::default()
    }
    fn visit_predicate_call(
        &mut self,
        _node: &'ast Expression,
        _call: &'ast PredicateCallExpr,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_constructor(
        &mut self,
        _node: &'ast Expression,
        _ctor: &'ast ConstructorExpr,
    ) -> Self::Output {
        Self::Output::default()
    }

    // Statements
    fn visit_bare_expression(
        &mut self,
        _node: &'ast Statement,
        _expr: &'ast Expression,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_block(&mut self, _node: &'ast Statement, _stmts: &'ast [Statement]) -> Self::Output {
        Self::Output::default()
    }
    fn visit_assign(&mut self, _node: &'ast Statement, _stmt: &'ast AssignStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_compound_assign(
        &mut self,
        _node: &'ast Statement,
        _stmt: &'ast CompoundAssignStmt,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_type_declaration(
        &mut self,
        _node: &'ast Statement,
        _stmt: &'ast TypeDeclStmt,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_variable(&mut self, _node: &'ast Statement, _stmt: &'ast BindingStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_constant(&mut self, _node: &'ast Statement, _stmt: &'ast BindingStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_do(&mut self, _node: &'ast Statement, _expr: &'ast Expression) -> Self::Output {
        Self::Output::default()
    }
    fn visit_if(&mut self, _node: &'ast Statement, _stmt: &'ast IfStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_while(&mut self, _node: &'ast Statement, _stmt: &'ast WhileStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_for(&mut self, _node: &'ast Statement, _stmt: &'ast ForStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_with(&mut self, _node: &'ast Statement, _stmt: &'ast WithStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_break(&mut self, _node: &'ast Statement) -> Self::Output {
        Self::Output::default()
    }
    fn visit_continue(&mut self, _node: &'ast Statement) -> Self::Output {
        Self::Output::default()
    }
    fn visit_match(&mut self, _node: &'ast Statement, _stmt: &'ast MatchStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_throw(&mut self, _node: &'ast Statement, _expr: &'ast Expression) -> Self::Output {
        Self::Output::default()
    }
    fn visit_try(&mut self, _node: &'ast Statement, _stmt: &'ast TryStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_return(&mut self, _node: &'ast Statement, _expr: &'ast Expression) -> Self::Output {
        Self::Output::default()
    }
    fn visit_extern(&mut self, _node: &'ast Statement, _name: &'ast str) -> Self::Output {
        Self::Output::default()
    }
    fn visit_alias(&mut self, _node: &'ast Statement, _stmt: &'ast AliasStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_enum(&mut self, _node: &'ast Statement, _stmt: &'ast EnumStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_structure(
        &mut self,
        _node: &'ast Statement,
        _stmt: &'ast StructureStmt,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_def(&mut self, _node: &'ast Statement, _def: &'ast FunctionDef) -> Self::Output {
        Self::Output::default()
    }
    fn visit_generic_def(
        &mut self,
        _node: &'ast Statement,
        _def: &'ast GenericFunctionDef,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_concept_def(
        &mut self,
        _node: &'ast Statement,
        _def: &'ast ConceptDef,
    ) -> Self::Output {
        Self::Output::default()
    }
    fn visit_module_def(&mut self, _node: &'ast Statement, _name: &'ast ModuleName) -> Self::Output {
        Self::Output::default()
    }
    fn visit_use(&mut self, _node: &'ast Statement, _name: &'ast ModuleName) -> Self::Output {
        Self::Output::default()
    }
    fn visit_import(&mut self, _node: &'ast Statement, _stmt: &'ast ImportStmt) -> Self::Output {
        Self::Output::default()
    }
    fn visit_export(&mut self, _node: &'ast Statement, _names: &'ast [String]) -> Self::Output {
        Self::Output::default()
    }
}

impl Expression {
    /// Double-dispatch entry: route to the visitor method for this kind.
    pub fn accept<'ast, V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) -> V::Output {
        match &self.kind {
            ExprKind::Integer(x) => v.visit_integer(self, *x),
            ExprKind::Byte(x) => v.visit_byte(self, *x),
            ExprKind::Long(x) => v.visit_long(self, *x),
            ExprKind::UnsignedInteger(x) => v.visit_unsigned_integer(self, *x),
            ExprKind::UnsignedByte(x) => v.visit_unsigned_byte(self, *x),
            ExprKind::UnsignedLong(x) => v.visit_unsigned_long(self, *x),
            ExprKind::Float(x) => v.visit_float(self, *x),
            ExprKind::Double(x) => v.visit_double(self, *x),
            ExprKind::Boolean(x) => v.visit_boolean(self, *x),
            ExprKind::String(x) => v.visit_string(self, x),
            ExprKind::Symbol(x) => v.visit_symbol(self, x),
            ExprKind::Nothing => v.visit_nothing(self),
            ExprKind::Identifier(name) => v.visit_identifier(self, name),
            ExprKind::FullyQualified(parts) => v.visit_fully_qualified(self, parts),
            ExprKind::RelativeIdentifier(inner) => v.visit_relative_identifier(self, inner),
            ExprKind::BinaryOp(e) => v.visit_binary_op(self, e),
            ExprKind::UnaryOp(e) => v.visit_unary_op(self, e),
            ExprKind::TernaryOp(e) => v.visit_ternary_op(self, e),
            ExprKind::Member(e) => v.visit_member(self, e),
            ExprKind::Subscript(e) => v.visit_subscript(self, e),
            ExprKind::Cast(e) => v.visit_cast(self, e),
            ExprKind::TypeCheck(e) => v.visit_type_check(self, e),
            ExprKind::Array(items) => v.visit_array(self, items),
            ExprKind::List(items) => v.visit_list(self, items),
            ExprKind::Tuple(items) => v.visit_tuple(self, items),
            ExprKind::SymbolList(symbols) => v.visit_symbol_list(self, symbols),
            ExprKind::Dictionary(entries) => v.visit_dictionary(self, entries),
            ExprKind::Call(e) => v.visit_call(self, e),
            ExprKind::PredicateCall(e) => v.visit_predicate_call(self, e),
            ExprKind::Constructor(e) => v.visit_constructor(self, e),
        }
    }
}

impl Statement {
    /// Double-dispatch entry: route to the visitor method for this kind.
    pub fn accept<'ast, V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) -> V::Output {
        match &self.kind {
            StmtKind::BareExpression(e) => v.visit_bare_expression(self, e),
            StmtKind::Block(stmts) => v.visit_block(self, stmts),
            StmtKind::Assign(s) => v.visit_assign(self, s),
            StmtKind::CompoundAssign(s) => v.visit_compound_assign(self, s),
            StmtKind::TypeDeclaration(s) => v.visit_type_declaration(self, s),
            StmtKind::Variable(s) => v.visit_variable(self, s),
            StmtKind::Constant(s) => v.visit_constant(self, s),
            StmtKind::Do(e) => v.visit_do(self, e),
            StmtKind::If(s) => v.visit_if(self, s),
            StmtKind::While(s) => v.visit_while(self, s),
            StmtKind::For(s) => v.visit_for(self, s),
            StmtKind::With(s) => v.visit_with(self, s),
            StmtKind::Break => v.visit_break(self),
            StmtKind::Continue => v.visit_continue(self),
            StmtKind::Match(s) => v.visit_match(self, s),
            StmtKind::Throw(e) => v.visit_throw(self, e),
            StmtKind::Try(s) => v.visit_try(self, s),
            StmtKind::Return(e) => v.visit_return(self, e),
            StmtKind::Extern(name) => v.visit_extern(self, name),
            StmtKind::Alias(s) => v.visit_alias(self, s),
            StmtKind::Enum(s) => v.visit_enum(self, s),
            StmtKind::Structure(s) => v.visit_structure(self, s),
            StmtKind::Def(d) => v.visit_def(self, d),
            StmtKind::GenericDef(d) => v.visit_generic_def(self, d),
            StmtKind::ConceptDef(d) => v.visit_concept_def(self, d),
            StmtKind::ModuleDef(m) => v.visit_module_def(self, m),
            StmtKind::Use(m) => v.visit_use(self, m),
            StmtKind::Import(s) => v.visit_import(self, s),
            StmtKind::Export(names) => v.visit_export(self, names),
        }
    }
}

/// Drive a visitor over every top-level statement of a unit.
pub fn walk_unit<'ast, V: Visitor<'ast>>(v: &mut V, unit: &'ast Unit) {
    for stmt in unit.statements() {
        stmt.accept(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_statement;

    /// A visitor that counts the return statements it is shown,
    /// descending through blocks and ifs only.
    #[derive(Default)]
    struct ReturnCounter {
        count: usize,
    }

    impl<'ast> Visitor<'ast> for ReturnCounter {
        type Output = ();

        fn visit_return(&mut self, _node: &'ast Statement, _expr: &'ast Expression) {
            self.count += 1;
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
    }

    #[test]
    fn test_partial_visitor_only_sees_overridden_nodes() {
        let stmt = parse_statement(
            "{ return 1; if x { return 2; } else { return 3; } do y; }",
            "test",
        )
        .unwrap();

        let mut counter = ReturnCounter::default();
        stmt.accept(&mut counter);
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn test_default_methods_are_no_ops() {
        let stmt = parse_statement("do foo;", "test").unwrap();
        let mut counter = ReturnCounter::default();
        stmt.accept(&mut counter);
        assert_eq!(counter.count, 0);
    }
}
