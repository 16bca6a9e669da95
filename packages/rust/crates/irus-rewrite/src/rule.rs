//! Rewrite rules and their compiled form.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RewriteError;
use crate::template::ReplacementTemplate;

/// How a rule's pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Regular expression; the replacement is a template.
    #[default]
    Regex,
    /// Plain substring; the replacement is inserted verbatim.
    Literal,
}

/// A single textual substitution rule as authored in a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Class of change (`import`, `path_conversion`, ...).
    #[serde(alias = "type")]
    pub category: String,
    /// Pattern interpretation. Defaults to regex.
    #[serde(default)]
    pub matcher: MatcherKind,
    /// Substring or regular expression to find.
    ///
    /// Regex patterns use the `regex` crate dialect, not Python's `re`: there
    /// are no backreferences or look-around, and a pattern using them fails
    /// with `RewriteError::RuleCompilation`. Inline flags such as `(?m)` and
    /// named groups `(?P<name>...)` work as usual.
    pub pattern: String,
    /// Replacement text or template.
    #[serde(default)]
    pub replacement: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RewriteRule {
    /// Regex rule.
    pub fn regex(
        category: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            matcher: MatcherKind::Regex,
            pattern: pattern.into(),
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Literal substring rule.
    pub fn literal(
        category: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            matcher: MatcherKind::Literal,
            ..Self::regex(category, pattern, replacement)
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
enum CompiledMatcher {
    Literal,
    Regex {
        regex: Regex,
        template: ReplacementTemplate,
    },
}

/// A rule whose pattern and template have been validated.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    index: usize,
    rule: RewriteRule,
    matcher: CompiledMatcher,
}

/// Text produced by a rule that fired.
pub(crate) struct Applied {
    pub(crate) text: String,
    pub(crate) matches: usize,
}

impl CompiledRule {
    /// Compile the rule at position `index` of its set.
    ///
    /// # Errors
    /// `RewriteError::RuleCompilation` for an empty pattern, an invalid
    /// regex, or a malformed replacement template.
    pub fn compile(index: usize, rule: &RewriteRule) -> Result<Self, RewriteError> {
        let fail = |reason: String| RewriteError::RuleCompilation {
            index,
            category: rule.category.clone(),
            pattern: rule.pattern.clone(),
            reason,
        };

        if rule.pattern.is_empty() {
            return Err(fail("pattern is empty".to_string()));
        }

        let matcher = match rule.matcher {
            MatcherKind::Literal => CompiledMatcher::Literal,
            MatcherKind::Regex => {
                let regex = Regex::new(&rule.pattern).map_err(|e| fail(e.to_string()))?;
                let template = ReplacementTemplate::parse(&rule.replacement)
                    .map_err(|e| fail(format!("invalid replacement template: {e}")))?;
                CompiledMatcher::Regex { regex, template }
            }
        };

        Ok(Self {
            index,
            rule: rule.clone(),
            matcher,
        })
    }

    /// Position of the rule in its set.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The rule as authored.
    #[must_use]
    pub fn rule(&self) -> &RewriteRule {
        &self.rule
    }

    /// Replace every match in `text`.
    ///
    /// Returns `Ok(None)` when nothing matches. An `Err` carries the reason
    /// the template cannot be expanded against the pattern.
    pub(crate) fn apply(&self, text: &str) -> Result<Option<Applied>, String> {
        match &self.matcher {
            CompiledMatcher::Literal => {
                let matches = text.matches(self.rule.pattern.as_str()).count();
                if matches == 0 {
                    return Ok(None);
                }
                Ok(Some(Applied {
                    text: text.replace(&self.rule.pattern, &self.rule.replacement),
                    matches,
                }))
            }
            CompiledMatcher::Regex { regex, template } => {
                let matches = regex.find_iter(text).count();
                if matches == 0 {
                    return Ok(None);
                }
                if let Some(reason) = template.missing_group(regex) {
                    return Err(reason);
                }
                Ok(Some(Applied {
                    text: regex.replace_all(text, template).into_owned(),
                    matches,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rule_replaces_all() {
        let rule = RewriteRule::literal("path_conversion", "\\\\", "/");
        let compiled = CompiledRule::compile(0, &rule).expect("compiles");
        let applied = compiled
            .apply(r#"p = "C:\\Users\\bot""#)
            .expect("applies")
            .expect("matches");
        assert_eq!(applied.text, r#"p = "C:/Users/bot""#);
        assert_eq!(applied.matches, 2);
    }

    #[test]
    fn test_literal_replacement_is_verbatim() {
        let rule = RewriteRule::literal("note", "x", r"\1");
        let compiled = CompiledRule::compile(0, &rule).expect("compiles");
        let applied = compiled.apply("x").expect("applies").expect("matches");
        assert_eq!(applied.text, r"\1");
    }

    #[test]
    fn test_no_match_returns_none() {
        let rule = RewriteRule::regex("call", r"pyautogui\.\w+", "x");
        let compiled = CompiledRule::compile(3, &rule).expect("compiles");
        assert!(compiled.apply("print('idle')").expect("applies").is_none());
        assert_eq!(compiled.index(), 3);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let rule = RewriteRule::literal("broken", "", "x");
        let err = CompiledRule::compile(1, &rule).expect_err("empty pattern");
        assert!(matches!(err, RewriteError::RuleCompilation { index: 1, .. }));
    }

    #[test]
    fn test_invalid_template_is_compilation_error() {
        let rule = RewriteRule::regex("call", "a", r"\z");
        let err = CompiledRule::compile(0, &rule).expect_err("bad escape");
        assert_eq!(err.category(), "call");
    }

    #[test]
    fn test_type_alias_deserializes() {
        let rule: RewriteRule = serde_json::from_str(
            r#"{"type": "import_replacement", "pattern": "import win32api",
                "replacement": "", "matcher": "literal"}"#,
        )
        .expect("deserialize");
        assert_eq!(rule.category, "import_replacement");
        assert_eq!(rule.matcher, MatcherKind::Literal);
    }
}
