//! Post-rewrite anti-pattern scan.
//!
//! Read-only: findings are reported, the text is never touched. Patterns
//! are compiled once on first use.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{RewriteWarning, TargetPlatform, WarningCategory};

use TargetPlatform::{CrossPlatform, Linux, MacOs};

const ALL: &[TargetPlatform] = &[MacOs, Linux, CrossPlatform];

struct WarningPattern {
    code: &'static str,
    category: WarningCategory,
    pattern: &'static str,
    /// `{name}` is the first capture group (or whole match), `{platform}` the target label.
    message: &'static str,
    platforms: &'static [TargetPlatform],
    /// One warning per distinct matched name instead of one aggregate.
    per_name: bool,
    /// Suppress entirely when this substring is present.
    unless_present: Option<&'static str>,
}

static WARNING_PATTERNS: &[WarningPattern] = &[
    WarningPattern {
        code: "W001",
        category: WarningCategory::Compatibility,
        pattern: r"\b(win32api|win32gui|win32con|win32ui|win32clipboard|winsound|msvcrt|winreg)\b",
        message: "'{name}' is Windows-specific - may need a {platform} alternative",
        platforms: ALL,
        per_name: true,
        unless_present: None,
    },
    WarningPattern {
        code: "W002",
        category: WarningCategory::Compatibility,
        pattern: r"\bwindll\.",
        message: "ctypes.windll calls are not available on {platform}",
        platforms: ALL,
        per_name: false,
        unless_present: None,
    },
    WarningPattern {
        code: "W003",
        category: WarningCategory::Path,
        pattern: r"\b[A-Za-z]:\\",
        message: "Windows drive paths found - check file paths for {platform} compatibility",
        platforms: ALL,
        per_name: false,
        unless_present: None,
    },
    WarningPattern {
        code: "W004",
        category: WarningCategory::Path,
        pattern: r"\\\\",
        message: "Escaped backslash separators found - use '/' or pathlib on {platform}",
        platforms: &[MacOs, Linux],
        per_name: false,
        unless_present: None,
    },
    WarningPattern {
        code: "W005",
        category: WarningCategory::Compatibility,
        pattern: r"\b(pyautogui|pydirectinput|pywinauto|mss)\b",
        message: "'{name}' is still referenced - review the {platform} conversion manually",
        platforms: &[MacOs],
        per_name: true,
        unless_present: None,
    },
    WarningPattern {
        code: "W006",
        category: WarningCategory::Compatibility,
        pattern: r"\b(Quartz|AppKit|Cocoa|CoreGraphics)\b",
        message: "'{name}' is macOS-only and will not import on {platform}",
        platforms: &[Linux, CrossPlatform],
        per_name: true,
        unless_present: None,
    },
    WarningPattern {
        code: "W007",
        category: WarningCategory::Performance,
        pattern: r"\bwhile\s+True\s*:",
        message: "Busy waiting loop detected - consider adding sleep delays",
        platforms: ALL,
        per_name: false,
        unless_present: Some("time.sleep"),
    },
    WarningPattern {
        code: "W008",
        category: WarningCategory::Security,
        pattern: r"\b(eval|exec)\s*\(",
        message: "Dynamic code execution via {name}() - review for security risks",
        platforms: ALL,
        per_name: true,
        unless_present: None,
    },
];

static COMPILED_PATTERNS: Lazy<Vec<(&'static WarningPattern, Regex)>> = Lazy::new(|| {
    WARNING_PATTERNS
        .iter()
        .filter_map(|entry| match Regex::new(entry.pattern) {
            Ok(regex) => Some((entry, regex)),
            Err(error) => {
                tracing::error!(code = entry.code, %error, "warning pattern failed to compile");
                None
            }
        })
        .collect()
});

/// Anti-pattern scanner for rewritten scripts.
pub struct AntiPatternScanner;

impl AntiPatternScanner {
    /// Scan `text` for findings relevant to `platform`, in table order.
    #[must_use]
    pub fn scan(text: &str, platform: TargetPlatform) -> Vec<RewriteWarning> {
        let mut warnings = Vec::new();

        for (entry, regex) in COMPILED_PATTERNS.iter() {
            if !entry.platforms.contains(&platform) {
                continue;
            }
            if entry.unless_present.is_some_and(|s| text.contains(s)) {
                continue;
            }

            if entry.per_name {
                let mut by_name: BTreeMap<&str, usize> = BTreeMap::new();
                for caps in regex.captures_iter(text) {
                    let name = caps.get(1).or_else(|| caps.get(0)).map_or("", |m| m.as_str());
                    *by_name.entry(name).or_default() += 1;
                }
                for (name, occurrences) in by_name {
                    warnings.push(build(entry, platform, name, occurrences));
                }
            } else {
                let occurrences = regex.find_iter(text).count();
                if occurrences > 0 {
                    warnings.push(build(entry, platform, "", occurrences));
                }
            }
        }

        warnings
    }

    /// Whether `text` has any finding for `platform`.
    #[must_use]
    pub fn is_clean(text: &str, platform: TargetPlatform) -> bool {
        Self::scan(text, platform).is_empty()
    }
}

fn build(
    entry: &WarningPattern,
    platform: TargetPlatform,
    name: &str,
    occurrences: usize,
) -> RewriteWarning {
    RewriteWarning {
        code: entry.code.to_string(),
        category: entry.category,
        message: entry
            .message
            .replace("{name}", name)
            .replace("{platform}", platform.label()),
        occurrences,
    }
}
