//! The rewrite pass.
//!
//! Applies a compiled rule set to one in-memory buffer: rules in order,
//! boilerplate injection, anti-pattern scan, header. No I/O happens here.

use std::fmt::Write as _;

use crate::error::RewriteError;
use crate::header::{HeaderInfo, prepend_header};
use crate::rule_set::{CompiledRuleSet, RuleSet};
use crate::types::{AppliedRule, RewriteOutcome, RewriteRequest, RewriteStats};
use crate::warnings::AntiPatternScanner;

/// Rule-based source rewriter.
///
/// # Example
///
/// ```rust,ignore
/// use irus_rewrite::{RewriteRequest, RewriteRule, Rewriter, RuleSet, TargetPlatform};
///
/// let rules = RuleSet::new("demo", TargetPlatform::MacOs)
///     .with_rule(RewriteRule::regex("import", "import pyautogui", "from pynput import mouse"));
/// let request = RewriteRequest::new("bot.py", TargetPlatform::MacOs, chrono::Utc::now());
/// let outcome = Rewriter::rewrite("import pyautogui\n", &rules, &request)?;
/// assert!(outcome.output_text.contains("from pynput import mouse"));
/// ```
pub struct Rewriter;

impl Rewriter {
    /// Compile `rule_set` and rewrite `source_text` with it.
    ///
    /// # Errors
    /// `RuleCompilation` if any rule fails to compile (nothing is applied),
    /// `RuleApplication` if a firing rule's template references a missing group.
    pub fn rewrite(
        source_text: &str,
        rule_set: &RuleSet,
        request: &RewriteRequest,
    ) -> Result<RewriteOutcome, RewriteError> {
        let compiled = rule_set.compile()?;
        Self::rewrite_compiled(source_text, &compiled, request)
    }

    /// Rewrite `source_text` with an already compiled rule set.
    ///
    /// # Errors
    /// `RuleApplication` if a firing rule's template references a missing group.
    pub fn rewrite_compiled(
        source_text: &str,
        rule_set: &CompiledRuleSet,
        request: &RewriteRequest,
    ) -> Result<RewriteOutcome, RewriteError> {
        let mut output = source_text.to_string();
        let mut applied_rules: Vec<AppliedRule> = Vec::new();

        for compiled in rule_set.rules() {
            let rule = compiled.rule();
            match compiled.apply(&output) {
                Ok(Some(applied)) => {
                    tracing::trace!(
                        index = compiled.index(),
                        category = %rule.category,
                        matches = applied.matches,
                        "rule fired"
                    );
                    applied_rules.push(AppliedRule {
                        index: compiled.index(),
                        category: rule.category.clone(),
                        pattern: rule.pattern.clone(),
                        description: rule.description.clone(),
                        matches: applied.matches,
                    });
                    output = applied.text;
                }
                Ok(None) => {}
                Err(reason) => {
                    return Err(RewriteError::RuleApplication {
                        index: compiled.index(),
                        category: rule.category.clone(),
                        pattern: rule.pattern.clone(),
                        reason,
                        applied_before: applied_rules,
                    });
                }
            }
        }

        let (output, injected_boilerplate) = inject_boilerplate(output, rule_set);
        let warnings = AntiPatternScanner::scan(&output, request.target_platform);

        let output_text = if request.inject_header {
            let info = HeaderInfo {
                source_name: &request.source_name,
                target_platform: request.target_platform,
                rule_set: rule_set.name(),
                generated_at: request.generated_at,
                rules_applied: applied_rules.len(),
            };
            prepend_header(&info, &output)
        } else {
            output
        };

        let stats = RewriteStats {
            original_lines: source_text.lines().count(),
            output_lines: output_text.lines().count(),
            size_delta: signed_len(&output_text) - signed_len(source_text),
            replacements: applied_rules.iter().map(|r| r.matches).sum(),
        };

        tracing::debug!(
            source = %request.source_name,
            rule_set = %rule_set.name(),
            applied = applied_rules.len(),
            warnings = warnings.len(),
            "rewrite complete"
        );

        Ok(RewriteOutcome {
            output_text,
            applied_rules,
            injected_boilerplate,
            warnings,
            stats,
        })
    }

    /// Format an outcome for display.
    ///
    /// Returns a human-readable summary; `diff` is appended when given.
    #[must_use]
    pub fn format_result(
        outcome: &RewriteOutcome,
        path: Option<&str>,
        diff: Option<&str>,
    ) -> String {
        let mut output = String::new();

        if let Some(p) = path {
            let _ = writeln!(output, "// CONVERT: {p}");
        }
        let _ = writeln!(output, "// Rules applied: {}", outcome.applied_rules.len());
        let _ = writeln!(output, "// Replacements: {}", outcome.stats.replacements);

        if outcome.applied_rules.is_empty() {
            output.push_str("[No rules matched]\n");
        } else {
            output.push_str("\n// Applied:\n");
            for rule in &outcome.applied_rules {
                let _ = writeln!(
                    output,
                    "#{} [{}] `{}` x{}",
                    rule.index, rule.category, rule.pattern, rule.matches
                );
            }
        }

        if !outcome.injected_boilerplate.is_empty() {
            let _ = writeln!(
                output,
                "\n// Boilerplate: {}",
                outcome.injected_boilerplate.join(", ")
            );
        }

        if !outcome.warnings.is_empty() {
            output.push_str("\n// Warnings:\n");
            for warning in &outcome.warnings {
                let _ = writeln!(
                    output,
                    "{} [{}] {} (x{})",
                    warning.code, warning.category, warning.message, warning.occurrences
                );
            }
        }

        if let Some(diff) = diff.filter(|d| !d.is_empty()) {
            output.push_str("\n// Diff:\n");
            output.push_str(diff);
        }

        output
    }
}

/// Prepend triggered boilerplate blocks, keeping a leading shebang first.
fn inject_boilerplate(text: String, rule_set: &CompiledRuleSet) -> (String, Vec<String>) {
    let triggered: Vec<_> = rule_set
        .boilerplate()
        .iter()
        .filter(|block| block.is_triggered(&text))
        .collect();

    if triggered.is_empty() {
        return (text, Vec::new());
    }

    let mut blocks = String::new();
    for block in &triggered {
        blocks.push_str(block.code.trim_end_matches('\n'));
        blocks.push_str("\n\n");
    }
    let names = triggered.iter().map(|block| block.name.clone()).collect();

    let injected = match text.strip_prefix("#!").and_then(|_| text.split_once('\n')) {
        Some((shebang, rest)) => format!("{shebang}\n{blocks}{rest}"),
        None => format!("{blocks}{text}"),
    };
    (injected, names)
}

fn signed_len(text: &str) -> i64 {
    i64::try_from(text.len()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RewriteRule;
    use crate::rule_set::Boilerplate;
    use crate::types::TargetPlatform;
    use chrono::{DateTime, Utc};

    fn request() -> RewriteRequest {
        let at: DateTime<Utc> = DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default();
        RewriteRequest::new("bot.py", TargetPlatform::MacOs, at).with_header(false)
    }

    #[test]
    fn test_boilerplate_injected_once_after_rules() {
        let rules = RuleSet::new("demo", TargetPlatform::MacOs)
            .with_rule(RewriteRule::regex(
                "mouse",
                r"pyautogui\.click\(\)",
                "mouse_controller.click(Button.left, 1)",
            ))
            .with_boilerplate(Boilerplate::new(
                "mouse controller",
                "mouse_controller",
                "from pynput import mouse\nmouse_controller = mouse.Controller()\n",
            ))
            .with_boilerplate(
                Boilerplate::new("time import", "time.sleep", "import time").unless("import time"),
            );

        let outcome =
            Rewriter::rewrite("pyautogui.click()\n", &rules, &request()).expect("rewrite");
        assert_eq!(outcome.injected_boilerplate, vec!["mouse controller"]);
        assert_eq!(
            outcome.output_text,
            "from pynput import mouse\nmouse_controller = mouse.Controller()\n\n\
             mouse_controller.click(Button.left, 1)\n"
        );
    }

    #[test]
    fn test_boilerplate_after_shebang() {
        let rules = RuleSet::new("demo", TargetPlatform::Linux).with_boilerplate(
            Boilerplate::new("time import", "time.sleep", "import time").unless("import time"),
        );
        let outcome =
            Rewriter::rewrite("#!/usr/bin/env python\ntime.sleep(1)\n", &rules, &request())
                .expect("rewrite");
        assert_eq!(
            outcome.output_text,
            "#!/usr/bin/env python\nimport time\n\ntime.sleep(1)\n"
        );
    }

    #[test]
    fn test_stats() {
        let rules = RuleSet::new("demo", TargetPlatform::MacOs)
            .with_rule(RewriteRule::literal("path", "\\\\", "/"));
        let outcome = Rewriter::rewrite("a\\\\b\\\\c\n", &rules, &request()).expect("rewrite");
        assert_eq!(outcome.output_text, "a/b/c\n");
        assert_eq!(outcome.stats.replacements, 2);
        assert_eq!(outcome.stats.size_delta, -2);
        assert_eq!(outcome.stats.original_lines, 1);
    }

    #[test]
    fn test_format_result() {
        let rules = RuleSet::new("demo", TargetPlatform::MacOs)
            .with_rule(RewriteRule::regex("import", "import win32api", "import subprocess"));
        let outcome = Rewriter::rewrite("import win32api\n", &rules, &request()).expect("rewrite");

        let formatted = Rewriter::format_result(&outcome, Some("bot.py"), Some("-a\n+b\n"));
        assert!(formatted.contains("CONVERT: bot.py"));
        assert!(formatted.contains("Rules applied: 1"));
        assert!(formatted.contains("#0 [import]"));
        assert!(formatted.contains("Diff:"));
    }
}
