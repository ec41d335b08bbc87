//! The mangled-symbol table.
//!
//! After a unit parses, every concrete function definition contributes a
//! linker symbol: mangled name → (defining node, signature). Generic
//! definitions contribute nothing until instantiated, and unchecked
//! functions appear under their bare names.

use indexmap::IndexMap;

use rheac_par::ast::*;
use rheac_par::visitor::Visitor;
use rheac_util::{MangleError, MangleResult};

use crate::mangle::mangle_function_name;
use crate::mapper::{resolve_typename, TypeMapper};
use crate::types::{FunctionType, TypeInfo};

/// One mangled symbol: the AST node that defines it and its signature.
#[derive(Debug, Clone)]
pub struct SymbolRecord {
    pub node: NodeId,
    pub signature: FunctionType,
}

/// All mangled symbols of one compilation unit, in definition order.
#[derive(Debug, Default)]
pub struct MangledSymbolTable {
    entries: IndexMap<String, SymbolRecord>,
}

impl MangledSymbolTable {
    pub fn get(&self, mangled: &str) -> Option<&SymbolRecord> {
        self.entries.get(mangled)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolRecord)> {
        self.entries.iter()
    }
}

/// Build the signature of a concrete definition by resolving its
/// annotations through the mapper. A predicate with no annotation returns
/// boolean; anything else unannotated returns nothing.
fn signature_of(mapper: &TypeMapper, def: &FunctionDef) -> FunctionType {
    let mut argument_types = IndexMap::new();
    if let Some(args) = &def.arguments {
        for pair in &args.arguments {
            argument_types.insert(pair.name.clone(), resolve_typename(mapper, &pair.value));
        }
    }

    let return_type = match (&def.return_type, def.kind) {
        (Some(tn), _) => resolve_typename(mapper, tn),
        (None, FunctionKind::Predicate) => TypeInfo::boolean(),
        (None, _) => TypeInfo::Nothing,
    };

    FunctionType {
        argument_types,
        return_type: Box::new(return_type),
    }
}

/// Walks a unit collecting mangled symbols for every concrete function
/// definition, nested ones included.
struct SymbolCollector<'m> {
    mapper: &'m TypeMapper,
    table: MangledSymbolTable,
    failure: Option<MangleError>,
}

impl<'m> SymbolCollector<'m> {
    fn record(&mut self, node: NodeId, def: &FunctionDef) {
        if self.failure.is_some() {
            return;
        }

        let signature = signature_of(self.mapper, def);
        match mangle_function_name(&def.name, &signature, def.kind) {
            Ok(mangled) => {
                self.table.entries.insert(mangled, SymbolRecord { node, signature });
            }
            Err(err) => self.failure = Some(err),
        }
    }
}

impl<'m, 'ast> Visitor<'ast> for SymbolCollector<'m> {
    type Output = ();

    fn visit_def(&mut self, node: &'ast Statement, def: &'ast FunctionDef) {
        self.record(node.id, def);
        def.body.accept(self);
    }

    // Generic definitions only contribute once instantiated.
    fn visit_generic_def(&mut self, _node: &'ast Statement, def: &'ast GenericFunctionDef) {
        def.def.body.accept(self);
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
}

/// Collect the mangled-symbol table of a unit.
pub fn collect_symbols(unit: &Unit, mapper: &TypeMapper) -> MangleResult<MangledSymbolTable> {
    let mut collector = SymbolCollector {
        mapper,
        table: MangledSymbolTable::default(),
        failure: None,
    };
    for stmt in unit.statements() {
        stmt.accept(&mut collector);
    }

    match collector.failure {
        Some(err) => Err(err),
        None => Ok(collector.table),
    }
}
