#![allow(clippy::doc_markdown)]

//! irus-rewrite - Rule-based source rewriting for IRUS
//!
//! Converts Windows-targeted automation scripts for macOS, Linux or a
//! cross-platform runtime by applying ordered textual rewrite rules.
//!
//! # Features
//!
//! - **Ordered rules**: literal or regex rules, each seeing the output of the previous one
//! - **Replacement templates**: `\1`, `\g<name>` and `${name}` group references
//! - **Boilerplate**: helper blocks prepended when converted code needs them
//! - **Anti-pattern scan**: read-only warnings for leftovers the rules cannot fix
//! - **Rule-set files**: JSON, YAML or TOML, plus a registry with built-in sets
//! - **Batch conversion**: parallel processing with per-file failure isolation
//!
//! Regex patterns follow the `regex` crate syntax rather than Python's `re`:
//! look-around assertions and backreferences are not available, and a rule
//! using them is reported as a compilation error.
//!
//! # Architecture
//!
//! ```text
//! irus-rewrite/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── error.rs     # RewriteError, ConvertError, RuleSetError, BatchError
//! ├── types.rs     # TargetPlatform, RewriteRequest, RewriteOutcome
//! ├── template.rs  # Replacement template parsing
//! ├── rule.rs      # RewriteRule and CompiledRule
//! ├── rule_set.rs  # RuleSet, Boilerplate, CompiledRuleSet, file formats
//! ├── builtin.rs   # Built-in rule sets
//! ├── registry.rs  # RuleSetRegistry (built-ins + user files)
//! ├── warnings.rs  # AntiPatternScanner
//! ├── header.rs    # Generated header block
//! ├── rewriter.rs  # The rewrite pass
//! ├── diff.rs      # Unified diff previews
//! ├── convert.rs   # Single-file conversion
//! └── batch.rs     # Parallel batch conversion and source discovery
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use irus_rewrite::{RewriteRequest, Rewriter, TargetPlatform, builtin_for_platform};
//!
//! let rules = builtin_for_platform(TargetPlatform::MacOs);
//! let request = RewriteRequest::new("fishing.py", TargetPlatform::MacOs, chrono::Utc::now());
//! let outcome = Rewriter::rewrite("import pyautogui\npyautogui.click()\n", &rules, &request)?;
//!
//! // Batch conversion
//! let compiled = rules.compile()?;
//! let files = discover_sources(Path::new("bots"), &DiscoveryOptions::default());
//! let options = BatchOptions::new(TargetPlatform::MacOs, chrono::Utc::now());
//! let summary = convert_batch(&files, &compiled, &options)?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod batch;
mod builtin;
mod convert;
mod diff;
mod error;
mod header;
mod registry;
mod rewriter;
mod rule;
mod rule_set;
mod template;
mod types;
mod warnings;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::{BatchError, ConvertError, RewriteError, RuleSetError};
pub use rewriter::Rewriter;
pub use rule::{CompiledRule, MatcherKind, RewriteRule};
pub use rule_set::{Boilerplate, CompiledRuleSet, RuleSet, RuleSetFormat};
pub use types::{
    AppliedRule, RewriteOutcome, RewriteRequest, RewriteStats, RewriteWarning, TargetPlatform,
    WarningCategory,
};

// Rule-set management
pub use builtin::{BUILTIN_AUTHOR, BUILTIN_NAMES, builtin_for_platform, builtin_rule_sets};
pub use registry::{RegistryEntry, RuleSetRegistry, RuleSetSource};

// Scanning and header
pub use header::{HeaderInfo, prepend_header, render_header};
pub use warnings::AntiPatternScanner;

// File conversion
pub use convert::{
    ConvertOptions, FileConversion, convert_file, default_output_path, format_report,
    output_file_name, preview_file,
};

// Batch conversion
pub use batch::{
    BatchFailure, BatchOptions, BatchProgress, BatchSuccess, BatchSummary, DEFAULT_MAX_WORKERS,
    DEFAULT_OUTPUT_DIR, DiscoveryOptions, convert_batch, convert_batch_with_progress,
    discover_sources,
};

// Size limit applied when reading sources
pub use irus_io::DEFAULT_MAX_FILE_SIZE;

// Re-export diff utility for external use
pub use diff::generate_unified_diff;
