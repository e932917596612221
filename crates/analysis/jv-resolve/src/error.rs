//! Resolution errors and recorded diagnostics

use jv_parser::ParseError;
use jv_span::FileSpan;
use jv_vfs::ResolveFailure;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while resolving a single node
///
/// These never abort a run: the node is reported and left in its unresolved form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Syntax the engine has no rule for
    #[error("unsupported node kind `{kind}`")]
    UnsupportedNode {
        /// Concrete syntax kind
        kind: String,
        /// Location of the node
        span: FileSpan,
    },

    /// Nesting exceeded the configured depth
    #[error("expression nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Configured limit
        limit: usize,
        /// Location of the first node past the limit
        span: FileSpan,
    },

    /// A known-value chain did not end within its step bound
    #[error("known-value chain does not terminate")]
    UnboundedValueChain {
        /// Location of the node whose value was chased
        span: FileSpan,
    },
}

impl ResolveError {
    /// Location the error is reported at
    pub fn span(&self) -> FileSpan {
        match self {
            Self::UnsupportedNode { span, .. }
            | Self::NestingTooDeep { span, .. }
            | Self::UnboundedValueChain { span } => *span,
        }
    }

    /// Diagnostic category
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::UnsupportedNode { .. } => DiagnosticKind::UnsupportedNode,
            Self::NestingTooDeep { .. } | Self::UnboundedValueChain { .. } => DiagnosticKind::Resolution,
        }
    }
}

/// Why a `require` call was not replaced by a module's exports
///
/// Callers treat every variant as "value unknown".
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Following requires is switched off
    #[error("following requires is disabled")]
    Disabled,

    /// Bare package specifier
    #[error("'{specifier}' is not a relative path")]
    NotRelative {
        /// The specifier as written
        specifier: String,
    },

    /// JSON modules are not analyzed
    #[error("'{specifier}' names a JSON file")]
    Json {
        /// The specifier as written
        specifier: String,
    },

    /// Built-in platform module
    #[error("'{specifier}' is a core module")]
    Core {
        /// The specifier as written
        specifier: String,
    },

    /// No file matched the specifier
    #[error(transparent)]
    NotFound(#[from] ResolveFailure),

    /// Path already analyzed in this run
    #[error("'{}' was already visited", path.display())]
    AlreadyVisited {
        /// Normalized module path
        path: PathBuf,
    },

    /// Too many nested module analyses
    #[error("module nesting exceeds {limit}")]
    TooDeep {
        /// Configured limit
        limit: usize,
    },

    /// The file could not be read
    #[error("cannot read '{}': {message}", path.display())]
    Read {
        /// Module path
        path: PathBuf,
        /// Underlying error
        message: String,
    },

    /// The file did not parse
    #[error("cannot parse '{}'", path.display())]
    Parse {
        /// Module path
        path: PathBuf,
        /// First parse error
        #[source]
        source: ParseError,
    },

    /// Neither `exports` nor `module.exports` has a value
    #[error("'{}' exports no value", path.display())]
    NoExports {
        /// Module path
        path: PathBuf,
    },
}

/// Category of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A node kind without a resolution rule
    UnsupportedNode,
    /// A node whose resolution failed
    Resolution,
}

/// A non-fatal problem found during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Human readable message
    pub message: String,
    /// File the node belongs to
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}:{}: {}", self.file, self.line, self.column, self.message)
    }
}
