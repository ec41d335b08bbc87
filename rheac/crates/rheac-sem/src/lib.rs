//! rheac-sem - Semantic analysis.
//!
//! The mid-end of the compiler: the type system, the per-unit typename
//! registry, lexical scopes and symbol tables, the lazy type inference
//! engine, and function name mangling. Everything here operates on the
//! AST produced by `rheac-par` and is owned by a single compilation unit;
//! nothing is shared across units.

pub mod infer;
pub mod mangle;
pub mod mapper;
pub mod scope;
pub mod symbols;
pub mod types;

mod edge_cases;

pub use infer::{InferredType, ReturnCollector, TypeEngine};
pub use mangle::mangle_function_name;
pub use mapper::{resolve_typename, TypeMapper};
pub use scope::{DeclarationType, ScopeTree, SymbolEntry};
pub use symbols::{collect_symbols, MangledSymbolTable, SymbolRecord};
pub use types::{compatible, BasicType, FunctionType, SimpleType, StructureType, TypeInfo};
