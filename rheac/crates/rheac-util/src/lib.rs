//! rheac-util - Core Utilities and Foundation Types
//!
//! Foundation types shared by every phase of the Rhea compiler front-end:
//! source positions, diagnostics, the error taxonomy, and the stable
//! symbol hash. Nothing in this crate knows about the grammar or the AST;
//! the phase crates (`rheac-par`, `rheac-sem`) build on top of it.

pub mod diagnostic;
pub mod error;
pub mod hash;
pub mod span;

mod edge_cases;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::{
    BuildError, BuildResult, MangleError, MangleResult, ParseError, ScopeError, ScopeResult,
    TypeError, TypeResult,
};
pub use hash::symbol_hash;
pub use span::SourcePosition;
