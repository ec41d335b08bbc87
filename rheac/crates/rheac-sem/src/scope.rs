//! The scope tree and symbol tables.
//!
//! Scopes form a rooted tree whose root is the module's global scope. A
//! cursor tracks the scope currently being analyzed; `end` moves the
//! cursor up without deleting the child, so later passes (and tests) can
//! still query inner scopes. Each scope maps identifier names to the AST
//! node that declared them. Function names may be declared repeatedly in
//! one scope (an overload set); every other kind is a duplicate error.

use rustc_hash::FxHashMap;

use rheac_par::ast::NodeId;
use rheac_util::{ScopeError, ScopeResult, SourcePosition};

/// Identity of a scope within the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// The kind of declaration a symbol-table entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationType {
    Variable,
    Constant,
    Function,
    Generic,
    Structure,
    Enum,
    Alias,
    Concept,
}

impl DeclarationType {
    /// Only functions may share a name within one scope.
    pub fn is_overloadable(self) -> bool {
        matches!(self, DeclarationType::Function)
    }
}

/// One entry in a scope's symbol table: how to use a declaration.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    /// The defining occurrence in the AST
    pub node: NodeId,
    pub kind: DeclarationType,
}

/// A single scope node.
#[derive(Debug)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    symbols: FxHashMap<String, Vec<SymbolEntry>>,
}

impl Scope {
    fn new(name: String, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            symbols: FxHashMap::default(),
        }
    }
}

/// The scope tree for one compilation unit.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    cursor: ScopeId,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new("<global>".into(), None)],
            cursor: ScopeId(0),
        }
    }

    /// The scope the cursor is in.
    pub fn current(&self) -> ScopeId {
        self.cursor
    }

    /// The root (global) scope.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Push a new child scope under the cursor and move into it.
    pub fn begin(&mut self, name: Option<&str>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let name = name.unwrap_or("<anonymous>").to_string();
        self.scopes.push(Scope::new(name, Some(self.cursor)));
        self.scopes[self.cursor.0 as usize].children.push(id);
        self.cursor = id;
        id
    }

    /// Move the cursor to the parent. The child stays in the tree.
    pub fn end(&mut self) {
        if let Some(parent) = self.scope(self.cursor).parent {
            self.cursor = parent;
        }
    }

    /// Record a declaration in the current scope. Redeclaring a name is an
    /// error unless both the existing and the new declaration are
    /// overloadable (function overload set).
    pub fn declare(
        &mut self,
        name: &str,
        node: NodeId,
        kind: DeclarationType,
        position: &SourcePosition,
    ) -> ScopeResult<()> {
        let scope = &mut self.scopes[self.cursor.0 as usize];
        let entries = scope.symbols.entry(name.to_string()).or_default();

        if let Some(existing) = entries.first() {
            if !(existing.kind.is_overloadable() && kind.is_overloadable()) {
                return Err(ScopeError::DuplicateDeclaration {
                    position: position.clone(),
                    name: name.to_string(),
                });
            }
        }

        entries.push(SymbolEntry {
            name: name.to_string(),
            node,
            kind,
        });
        Ok(())
    }

    /// Find the nearest declaration of `name`, walking the parent chain
    /// from the cursor.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        let mut current = Some(self.cursor);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(entries) = scope.symbols.get(name) {
                return entries.first();
            }
            current = scope.parent;
        }
        None
    }

    /// Every declaration of `name` visible in the nearest declaring scope
    /// (the overload set for functions).
    pub fn lookup_overloads(&self, name: &str) -> Option<&[SymbolEntry]> {
        let mut current = Some(self.cursor);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(entries) = scope.symbols.get(name) {
                return Some(entries);
            }
            current = scope.parent;
        }
        None
    }

    /// Is `name` declared in the current scope itself?
    pub fn is_local(&self, name: &str) -> bool {
        self.scope(self.cursor).symbols.contains_key(name)
    }
}
