//! Error and warning reporting infrastructure.
//!
//! A [`Handler`] collects [`Diagnostic`] values as a compilation unit is
//! processed. Collection never aborts the unit by itself; fatal conditions
//! travel through the error taxonomy in [`crate::error`] instead, and the
//! driver decides what to print.

use std::cell::RefCell;
use std::fmt;

use crate::span::SourcePosition;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that fails the unit
    Error,
    /// A warning that does not fail the unit
    Warning,
    /// Additional context attached by a pass
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with severity and source location
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level
    pub level: Level,
    /// Main diagnostic message
    pub message: String,
    /// Where in the source the diagnostic points
    pub position: SourcePosition,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            position,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.level, self.message)
    }
}

/// Collects diagnostics for one compilation unit.
///
/// Interior mutability lets passes that only hold a shared reference
/// report problems without threading `&mut` everywhere.
///
/// # Examples
///
/// ```
/// use rheac_util::{Handler, SourcePosition};
///
/// let handler = Handler::new();
/// handler.error("duplicate declaration of `x`", SourcePosition::dummy());
/// assert!(handler.has_errors());
/// ```
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error diagnostic
    pub fn error(&self, message: impl Into<String>, position: SourcePosition) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::error(message, position));
    }

    /// Record a warning diagnostic
    pub fn warning(&self, message: impl Into<String>, position: SourcePosition) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::warning(message, position));
    }

    /// Has at least one error been recorded?
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of recorded diagnostics of any level
    pub fn count(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// Drain all recorded diagnostics, leaving the handler empty
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }
}
