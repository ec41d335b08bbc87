//! The error taxonomy for the compiler front-end.
//!
//! Every kind of failure a phase can produce lives here, one enum per
//! concern. Errors are surfaced to the driver immediately; no phase
//! recovers locally.

use thiserror::Error;

use crate::span::SourcePosition;

/// A failure reported by the PEG engine while recognizing source text.
#[derive(Debug, Error)]
#[error("{position}: parse error: {message}")]
pub struct ParseError {
    /// Where the engine gave up
    pub position: SourcePosition,
    /// The engine's description of what it expected
    pub message: String,
}

/// Errors raised while lowering a parse tree into the AST.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The builder met a grammar rule it does not handle
    #[error("unimplemented parse node type: {tag}")]
    UnimplementedTag { tag: String },

    /// A construct that parses but is semantically invalid
    #[error("{position}: syntax error: {message}")]
    Syntax {
        position: SourcePosition,
        message: String,
    },
}

/// Errors raised by the type inference engine.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Two places disagreed about a type
    #[error("{position}: type mismatch: expected {expected}, found {actual}")]
    Mismatch {
        position: SourcePosition,
        expected: String,
        actual: String,
    },
}

/// Errors raised on symbol-table insertion.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A non-overloadable name was declared twice in one scope
    #[error("{position}: duplicate declaration of `{name}`")]
    DuplicateDeclaration {
        position: SourcePosition,
        name: String,
    },
}

/// Errors raised by the name mangler.
#[derive(Debug, Error)]
pub enum MangleError {
    /// A type with no mangling rule appeared in a signature
    #[error("cannot mangle type `{type_name}` in a function signature")]
    Unmangleable { type_name: String },
}

/// Result alias for the AST builder
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Result alias for inference operations
pub type TypeResult<T> = std::result::Result<T, TypeError>;

/// Result alias for scope operations
pub type ScopeResult<T> = std::result::Result<T, ScopeError>;

/// Result alias for mangling operations
pub type MangleResult<T> = std::result::Result<T, MangleError>;
