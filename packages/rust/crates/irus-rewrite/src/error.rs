//! Error types for rewriting, conversion and rule-set management.

use std::path::PathBuf;

use irus_io::IoError;
use thiserror::Error;

use crate::types::AppliedRule;

/// Failure of a single rewrite call.
///
/// Both variants are authoring defects in the rule set; retrying with the
/// same rules reproduces them.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// A rule's pattern or replacement template does not compile.
    #[error("rule #{index} [{category}] failed to compile (pattern `{pattern}`): {reason}")]
    RuleCompilation {
        /// Position of the rule in its set.
        index: usize,
        /// Category of the offending rule.
        category: String,
        /// Pattern as authored.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A rule compiled but its template is invalid against an actual match.
    #[error("rule #{index} [{category}] failed to apply (pattern `{pattern}`): {reason}")]
    RuleApplication {
        /// Position of the rule in its set.
        index: usize,
        /// Category of the offending rule.
        category: String,
        /// Pattern as authored.
        pattern: String,
        /// What went wrong.
        reason: String,
        /// Rules that fired before the failure. Diagnostic only.
        applied_before: Vec<AppliedRule>,
    },
}

impl RewriteError {
    /// Category of the rule that failed.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::RuleCompilation { category, .. } | Self::RuleApplication { category, .. } => {
                category
            }
        }
    }

    /// Pattern of the rule that failed.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::RuleCompilation { pattern, .. } | Self::RuleApplication { pattern, .. } => {
                pattern
            }
        }
    }
}

/// Failure of a file-level conversion (read, rewrite, write).
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    InputRead {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// The converted file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// The destination would overwrite the source.
    #[error("refusing to overwrite source file {}", .0.display())]
    SameAsInput(PathBuf),

    /// The rewrite itself failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Errors loading, validating or persisting rule sets.
#[derive(Error, Debug)]
pub enum RuleSetError {
    /// Reading or writing a rule-set file failed.
    #[error("rule set I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON/YAML/TOML for a rule set.
    #[error("failed to parse rule set {}: {reason}", path.display())]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Serializing a rule set failed.
    #[error("failed to serialize rule set '{name}': {reason}")]
    Serialize {
        /// Rule-set name.
        name: String,
        /// Serializer message.
        reason: String,
    },

    /// Structural validation failed (missing name, empty pattern, ...).
    #[error("invalid rule set: {0}")]
    Invalid(String),

    /// The file extension is not one of json, yaml, yml, toml.
    #[error("unsupported rule set format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// No rule set with that name is registered.
    #[error("rule set not found: {0}")]
    NotFound(String),

    /// Built-in rule sets cannot be replaced or deleted.
    #[error("rule set '{0}' is built in and cannot be modified")]
    BuiltinProtected(String),
}

/// Errors that stop a batch before any file is processed.
#[derive(Error, Debug)]
pub enum BatchError {
    /// `max_workers` was zero.
    #[error("max_workers must be at least 1")]
    InvalidWorkers,

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
