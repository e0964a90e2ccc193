//! Diagnostics produced while traversing declarations.
//!
//! Every diagnostic carries an [`ErrorLevel`]. Whether a run failed is decided
//! from the levels alone: anything above [`ErrorLevel::Warning`] is hard.

use serde::Serialize;

use crate::source::{NodeInfo, SourceSpan};

/// Diagnostic severity levels, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorLevel {
    Warning,
    Error,
    Fatal,
}

impl std::fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorLevel::Warning => write!(f, "warning"),
            ErrorLevel::Error => write!(f, "error"),
            ErrorLevel::Fatal => write!(f, "fatal"),
        }
    }
}

/// Why a redeclaration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
pub enum RedefKind {
    #[error("duplicate definition")]
    DuplicateDef,
    #[error("redeclared as a different kind of symbol")]
    DiffKindRedecl,
    #[error("identifier without linkage")]
    NoLinkageOld,
    #[error("conflicting linkage")]
    DisagreeLinkage,
}

/// What went wrong, independent of severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed input the traversal can't make sense of.
    #[error("{message}")]
    InvalidAst { message: String, location: SourceSpan },

    #[error("redefinition of '{name}': {kind}")]
    Redefinition {
        name: String,
        kind: RedefKind,
        new: SourceSpan,
        old: SourceSpan,
    },

    #[error("type mismatch: {reason}")]
    TypeMismatch {
        reason: String,
        first: SourceSpan,
        second: SourceSpan,
    },

    #[error("{message}")]
    Other { message: String, location: SourceSpan },
}

/// A diagnostic: kind plus severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{level}: {kind}")]
pub struct CError {
    pub level: ErrorLevel,
    pub kind: ErrorKind,
}

impl CError {
    pub fn new(level: ErrorLevel, kind: ErrorKind) -> Self {
        CError { level, kind }
    }

    pub fn invalid_ast(info: &NodeInfo, message: impl Into<String>) -> Self {
        CError::new(
            ErrorLevel::Error,
            ErrorKind::InvalidAst {
                message: message.into(),
                location: info.span,
            },
        )
    }

    pub fn redefinition(level: ErrorLevel, name: impl Into<String>, kind: RedefKind, new: &NodeInfo, old: &NodeInfo) -> Self {
        CError::new(
            level,
            ErrorKind::Redefinition {
                name: name.into(),
                kind,
                new: new.span,
                old: old.span,
            },
        )
    }

    pub fn other(level: ErrorLevel, info: &NodeInfo, message: impl Into<String>) -> Self {
        CError::new(
            level,
            ErrorKind::Other {
                message: message.into(),
                location: info.span,
            },
        )
    }

    pub fn is_hard(&self) -> bool {
        self.level > ErrorLevel::Warning
    }

    pub fn with_level(mut self, level: ErrorLevel) -> Self {
        self.level = level;
        self
    }

    /// Primary location: where the offending (new) construct is.
    pub fn location(&self) -> SourceSpan {
        match &self.kind {
            ErrorKind::InvalidAst { location, .. } => *location,
            ErrorKind::Redefinition { new, .. } => *new,
            ErrorKind::TypeMismatch { first, .. } => *first,
            ErrorKind::Other { location, .. } => *location,
        }
    }

    /// Secondary location, e.g. the previous declaration of a redefined name.
    pub fn related(&self) -> Option<SourceSpan> {
        match &self.kind {
            ErrorKind::Redefinition { old, .. } => Some(*old),
            ErrorKind::TypeMismatch { second, .. } => Some(*second),
            _ => None,
        }
    }

    pub fn redef_kind(&self) -> Option<RedefKind> {
        match &self.kind {
            ErrorKind::Redefinition { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result of a type compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct TypeMismatch {
    pub reason: String,
    pub first: NodeInfo,
    pub second: NodeInfo,
}

impl From<TypeMismatch> for CError {
    fn from(mismatch: TypeMismatch) -> Self {
        CError::new(
            ErrorLevel::Error,
            ErrorKind::TypeMismatch {
                reason: mismatch.reason,
                first: mismatch.first.span,
                second: mismatch.second.span,
            },
        )
    }
}

pub fn had_hard_errors(errors: &[CError]) -> bool {
    errors.iter().any(CError::is_hard)
}

/// Render diagnostics one per line, with the related location when there is one.
pub fn format_diagnostics(errors: &[CError]) -> String {
    errors
        .iter()
        .map(|e| match e.related() {
            Some(related) => format!("{} at {} (previous at {})", e, e.location(), related),
            None => format!("{} at {}", e, e.location()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
