//! Core types for rewrite jobs.
//!
//! Defines the request handed to the rewriter and the outcome it reports.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform a conversion targets.
///
/// Selects the header wording and which anti-pattern warnings apply; it does
/// not change how rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetPlatform {
    /// Apple macOS (Quartz / pynput based replacements).
    #[default]
    #[serde(rename = "macOS", alias = "macos", alias = "mac", alias = "darwin")]
    MacOs,
    /// Linux desktops.
    #[serde(rename = "Linux", alias = "linux")]
    Linux,
    /// Code expected to run on any desktop OS.
    #[serde(
        rename = "Cross-Platform",
        alias = "cross-platform",
        alias = "cross_platform",
        alias = "crossplatform"
    )]
    CrossPlatform,
}

impl TargetPlatform {
    /// All platforms, in display order.
    pub const ALL: [Self; 3] = [Self::MacOs, Self::Linux, Self::CrossPlatform];

    /// Display label (`macOS`, `Linux`, `Cross-Platform`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::CrossPlatform => "Cross-Platform",
        }
    }

    /// Lowercase form used in output file names.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::CrossPlatform => "cross-platform",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macos" | "mac" | "darwin" | "osx" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "cross-platform" | "cross_platform" | "crossplatform" | "cross" => {
                Ok(Self::CrossPlatform)
            }
            other => Err(format!(
                "unknown target platform '{other}' (expected macOS, Linux or Cross-Platform)"
            )),
        }
    }
}

/// Per-job inputs besides the source text and the rule set.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    /// File name shown in the generated header.
    pub source_name: String,
    /// Conversion target.
    pub target_platform: TargetPlatform,
    /// Timestamp written into the header. Supplied by the caller so that the
    /// rewrite itself stays deterministic.
    pub generated_at: DateTime<Utc>,
    /// Whether to prepend the generated header block.
    pub inject_header: bool,
}

impl RewriteRequest {
    /// Request with the header enabled.
    pub fn new(
        source_name: impl Into<String>,
        target_platform: TargetPlatform,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            target_platform,
            generated_at,
            inject_header: true,
        }
    }

    /// Disable or enable the generated header.
    #[must_use]
    pub fn with_header(mut self, inject_header: bool) -> Self {
        self.inject_header = inject_header;
        self
    }
}

/// A rule that matched and fired during a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRule {
    /// Position of the rule in its rule set (0-indexed).
    pub index: usize,
    /// Rule category tag.
    pub category: String,
    /// Pattern as authored.
    pub pattern: String,
    /// Rule description, if any.
    pub description: Option<String>,
    /// Number of matches replaced.
    pub matches: usize,
}

/// Class of an anti-pattern warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    /// API or module not available on the target platform.
    Compatibility,
    /// Path literal inconsistent with the target.
    Path,
    /// Busy loops and similar.
    Performance,
    /// Dynamic code execution.
    Security,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compatibility => "compatibility",
            Self::Path => "path",
            Self::Performance => "performance",
            Self::Security => "security",
        })
    }
}

/// Finding from the post-rewrite anti-pattern scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteWarning {
    /// Stable identifier (e.g. `W001`).
    pub code: String,
    /// Warning class.
    pub category: WarningCategory,
    /// Human-readable message.
    pub message: String,
    /// Number of occurrences found in the output.
    pub occurrences: usize,
}

/// Size bookkeeping for a rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Lines in the source text.
    pub original_lines: usize,
    /// Lines in the output text (header included).
    pub output_lines: usize,
    /// Output length minus source length, in bytes.
    pub size_delta: i64,
    /// Total matches replaced across all applied rules.
    pub replacements: usize,
}

/// Result of a successful rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteOutcome {
    /// Fully rewritten text, header included.
    pub output_text: String,
    /// Rules that fired, in application order.
    pub applied_rules: Vec<AppliedRule>,
    /// Names of boilerplate blocks that were injected.
    pub injected_boilerplate: Vec<String>,
    /// Anti-pattern findings.
    pub warnings: Vec<RewriteWarning>,
    /// Size bookkeeping.
    pub stats: RewriteStats,
}

impl RewriteOutcome {
    /// Categories of the applied rules, in application order.
    #[must_use]
    pub fn applied_categories(&self) -> Vec<&str> {
        self.applied_rules
            .iter()
            .map(|rule| rule.category.as_str())
            .collect()
    }
}
