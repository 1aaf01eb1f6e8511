//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Run completed (failures only change this with `--strict`) |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments or configuration |
//! | 4 | `Incomplete` | `--strict` run where a site or document failed |
//!
//! Without `--strict` a run that reached the end exits 0 even when documents
//! failed; the summary on stdout lists them.

use docmirror_core::Error as CoreError;
use std::fmt;
use std::process::ExitCode;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or configuration (exit code 2).
    Usage = 2,

    /// The run finished but a site aborted or a document failed (exit code 4).
    Incomplete = 4,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Create an `ExitCode` from this category.
    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::Incomplete => "incomplete mirror",
        }
    }

    /// Category for a docmirror-core error surfacing at the top level.
    #[must_use]
    pub const fn from_core(err: &CoreError) -> Self {
        match err {
            CoreError::Config(_) | CoreError::Serialization(_) => Self::Usage,
            CoreError::Fetch { .. } | CoreError::Parse(_) | CoreError::Network(_) => {
                Self::Incomplete
            },
            CoreError::Io(_) => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Internal, source)
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create an incomplete-run error.
    pub fn incomplete(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Incomplete, source)
    }

    /// Exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        self.category.as_exit_code()
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let category = ErrorCategory::from_core(&err);
        Self::new(category, err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}
