//! Error handling for itemforge

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A 1-based line/column position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Core error type used throughout itemforge
///
/// Every variant except [`ForgeError::Config`] describes a failure scoped to a
/// single item: the batch runner records it against that item and moves on.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ForgeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid descriptor {}: {message}", .path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error("Parse error at {location}: {message}")]
    Parse {
        message: String,
        location: SourceLocation,
    },

    #[error("Namespace '{namespace}' not found")]
    NamespaceNotFound { namespace: String },

    #[error("Class '{class}' not found in namespace '{namespace}'")]
    ClassNotFound { class: String, namespace: String },

    #[error("Ambiguous {kind} '{name}': found {count} candidates")]
    Ambiguous {
        kind: String,
        name: String,
        count: usize,
    },

    #[error("Class '{class}' must derive from '{expected}', found '{found}'")]
    BaseTypeMismatch {
        class: String,
        expected: String,
        found: String,
    },

    #[error("Unsupported syntax: {feature}")]
    UnsupportedSyntax { feature: String },

    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ForgeError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new descriptor error
    pub fn descriptor(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Descriptor {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a parse error at a 1-based position
    pub fn parse_at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    pub fn namespace_not_found(namespace: impl Into<String>) -> Self {
        Self::NamespaceNotFound {
            namespace: namespace.into(),
        }
    }

    pub fn class_not_found(class: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::ClassNotFound {
            class: class.into(),
            namespace: namespace.into(),
        }
    }

    pub fn ambiguous(kind: impl Into<String>, name: impl Into<String>, count: usize) -> Self {
        Self::Ambiguous {
            kind: kind.into(),
            name: name.into(),
            count,
        }
    }

    pub fn base_type_mismatch(
        class: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::BaseTypeMismatch {
            class: class.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unsupported_syntax(feature: impl Into<String>) -> Self {
        Self::UnsupportedSyntax {
            feature: feature.into(),
        }
    }

    pub fn invalid_identifier(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short machine-readable category, used in logs and the CLI report.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::Descriptor { .. } => "descriptor",
            Self::Parse { .. } => "parse",
            Self::NamespaceNotFound { .. } | Self::ClassNotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
            Self::BaseTypeMismatch { .. } => "base_type",
            Self::UnsupportedSyntax { .. } => "unsupported",
            Self::InvalidIdentifier { .. } => "identifier",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for convenience
pub type ForgeResult<T> = Result<T, ForgeError>;
