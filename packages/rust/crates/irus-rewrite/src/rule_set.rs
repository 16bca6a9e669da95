//! Rule sets: named, ordered collections of rewrite rules.
//!
//! A rule set is authored as a plain record (JSON, YAML or TOML) and
//! compiled once per run into an immutable [`CompiledRuleSet`] that workers
//! share by reference.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RewriteError, RuleSetError};
use crate::rule::{CompiledRule, RewriteRule};
use crate::types::TargetPlatform;

/// Helper code prepended when one of its triggers appears in the rewritten text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boilerplate {
    /// Name reported in the outcome.
    pub name: String,
    /// Substrings, any of which triggers the block. A single string is accepted.
    #[serde(deserialize_with = "one_or_many")]
    pub when: Vec<String>,
    /// Substring whose presence suppresses the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless: Option<String>,
    /// Code to inject.
    pub code: String,
}

impl Boilerplate {
    /// Block injected whenever `when` is present.
    pub fn new(name: impl Into<String>, when: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            when: vec![when.into()],
            unless: None,
            code: code.into(),
        }
    }

    /// Add another trigger.
    #[must_use]
    pub fn or_when(mut self, when: impl Into<String>) -> Self {
        self.when.push(when.into());
        self
    }

    /// Suppress the block when `unless` is already present.
    #[must_use]
    pub fn unless(mut self, unless: impl Into<String>) -> Self {
        self.unless = Some(unless.into());
        self
    }

    /// Whether the block should be injected into `text`.
    #[must_use]
    pub fn is_triggered(&self, text: &str) -> bool {
        self.when.iter().any(|w| text.contains(w.as_str()))
            && !self.unless.as_ref().is_some_and(|u| text.contains(u.as_str()))
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(single) => vec![single],
        OneOrMany::Many(many) => many,
    })
}

/// A named, ordered collection of rewrite rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Unique name (registry key).
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Author of the set.
    #[serde(default = "default_author")]
    pub author: String,
    /// Version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// Creation date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Grouping label shown in listings (`Gaming`, `Web`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Platform the set converts to.
    #[serde(default)]
    pub target_platform: TargetPlatform,
    /// Rules, applied in order.
    pub rules: Vec<RewriteRule>,
    /// Helper blocks injected after the rules run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boilerplate: Vec<Boilerplate>,
}

fn default_author() -> String {
    "User".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

/// On-disk encoding of a rule-set file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl RuleSetFormat {
    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

impl RuleSet {
    /// Empty rule set for `target_platform`.
    pub fn new(name: impl Into<String>, target_platform: TargetPlatform) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            author: default_author(),
            version: default_version(),
            created: None,
            category: None,
            target_platform,
            rules: Vec::new(),
            boilerplate: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: RewriteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a boilerplate block.
    #[must_use]
    pub fn with_boilerplate(mut self, block: Boilerplate) -> Self {
        self.boilerplate.push(block);
        self
    }

    /// File stem used when persisting (`Gaming Macro` -> `gaming_macro`).
    ///
    /// Only `[a-z0-9_-]` survive; anything else becomes `_`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.name
            .trim()
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                c @ ('a'..='z' | '0'..='9' | '-' | '_') => c,
                _ => '_',
            })
            .collect()
    }

    /// Structural checks that do not need a regex engine.
    ///
    /// # Errors
    /// `RuleSetError::Invalid` naming the first problem found.
    pub fn validate(&self) -> Result<(), RuleSetError> {
        if self.name.trim().is_empty() {
            return Err(RuleSetError::Invalid("rule set name is empty".to_string()));
        }
        if self.name.contains(['/', '\\']) || self.name.contains("..") {
            return Err(RuleSetError::Invalid(format!(
                "rule set name '{}' looks like a path",
                self.name
            )));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.category.trim().is_empty() {
                return Err(RuleSetError::Invalid(format!(
                    "rule #{index} in '{}' has no category",
                    self.name
                )));
            }
            if rule.pattern.is_empty() {
                return Err(RuleSetError::Invalid(format!(
                    "rule #{index} [{}] in '{}' has an empty pattern",
                    rule.category, self.name
                )));
            }
        }
        for block in &self.boilerplate {
            if block.name.trim().is_empty()
                || block.when.is_empty()
                || block.when.iter().any(String::is_empty)
            {
                return Err(RuleSetError::Invalid(format!(
                    "boilerplate block in '{}' needs a name and a trigger",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Compile every rule, in order.
    ///
    /// # Errors
    /// `RewriteError::RuleCompilation` for the first rule that fails.
    pub fn compile(&self) -> Result<CompiledRuleSet, RewriteError> {
        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| CompiledRule::compile(index, rule))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rule_set = %self.name, rules = rules.len(), "compiled rule set");

        Ok(CompiledRuleSet {
            name: self.name.clone(),
            target_platform: self.target_platform,
            rules,
            boilerplate: self.boilerplate.clone(),
        })
    }

    /// Load and validate a rule set from a `.json`, `.yaml`/`.yml` or `.toml` file.
    ///
    /// # Errors
    /// `UnsupportedFormat`, `Io`, `Parse` or `Invalid`.
    pub fn from_path(path: &Path) -> Result<Self, RuleSetError> {
        let format = RuleSetFormat::from_path(path)
            .ok_or_else(|| RuleSetError::UnsupportedFormat(path.to_path_buf()))?;
        let raw = std::fs::read_to_string(path).map_err(|source| RuleSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, format, path)
    }

    /// Parse and validate a rule set from text. `origin` is only used in errors.
    ///
    /// # Errors
    /// `Parse` or `Invalid`.
    pub fn parse(raw: &str, format: RuleSetFormat, origin: &Path) -> Result<Self, RuleSetError> {
        let parse_err = |reason: String| RuleSetError::Parse {
            path: origin.to_path_buf(),
            reason,
        };
        let rule_set: Self = match format {
            RuleSetFormat::Json => serde_json::from_str(raw).map_err(|e| parse_err(e.to_string()))?,
            RuleSetFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string()))?,
            RuleSetFormat::Toml => toml::from_str(raw).map_err(|e| parse_err(e.to_string()))?,
        };
        rule_set.validate()?;
        Ok(rule_set)
    }

    /// Pretty JSON export.
    ///
    /// # Errors
    /// `RuleSetError::Serialize` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, RuleSetError> {
        serde_json::to_string_pretty(self).map_err(|e| RuleSetError::Serialize {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Write the set to `path`, encoded by its extension (JSON when unknown).
    ///
    /// # Errors
    /// `Serialize` or `Io`.
    pub fn save(&self, path: &Path) -> Result<(), RuleSetError> {
        let serialize_err = |reason: String| RuleSetError::Serialize {
            name: self.name.clone(),
            reason,
        };
        let body = match RuleSetFormat::from_path(path).unwrap_or(RuleSetFormat::Json) {
            RuleSetFormat::Json => self.to_json_pretty()?,
            RuleSetFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| serialize_err(e.to_string()))?
            }
            RuleSetFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| serialize_err(e.to_string()))?
            }
        };
        irus_io::write_text(path, &body).map_err(|e| RuleSetError::Io {
            path: path.to_path_buf(),
            source: match e {
                irus_io::IoError::System(source) => source,
                other => std::io::Error::other(other.to_string()),
            },
        })
    }
}

/// A rule set ready to run. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    name: String,
    target_platform: TargetPlatform,
    rules: Vec<CompiledRule>,
    boilerplate: Vec<Boilerplate>,
}

impl CompiledRuleSet {
    /// Name of the source rule set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform the rule set was authored for.
    #[must_use]
    pub fn target_platform(&self) -> TargetPlatform {
        self.target_platform
    }

    /// Compiled rules, in order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Boilerplate blocks, in order.
    #[must_use]
    pub fn boilerplate(&self) -> &[Boilerplate] {
        &self.boilerplate
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_compiled_rule_set_is_shareable() {
        assert_send_sync::<CompiledRuleSet>();
    }

    #[test]
    fn test_file_stem() {
        let set = RuleSet::new("Gaming Macro", TargetPlatform::MacOs);
        assert_eq!(set.file_stem(), "gaming_macro");
        let odd = RuleSet::new("Web: Chrome (v2)", TargetPlatform::Linux);
        assert_eq!(odd.file_stem(), "web__chrome__v2_");
    }

    #[test]
    fn test_boilerplate_trigger() {
        let block =
            Boilerplate::new("time import", "time.sleep", "import time").unless("import time");
        assert!(block.is_triggered("time.sleep(1)"));
        assert!(!block.is_triggered("import time\ntime.sleep(1)"));
        assert!(!block.is_triggered("print(1)"));

        let either = Boilerplate::new("helpers", "is_key_pressed(", "def helpers(): ...")
            .or_when("wait_for_key(");
        assert!(either.is_triggered("wait_for_key('f')"));
    }

    #[test]
    fn test_boilerplate_trigger_accepts_string_or_list() {
        let single: Boilerplate =
            serde_yaml::from_str("name: t\nwhen: time.sleep\ncode: import time\n").expect("single");
        assert_eq!(single.when, vec!["time.sleep"]);
        let many: Boilerplate = serde_json::from_str(
            r#"{"name": "k", "when": ["is_key_pressed(", "wait_for_key("], "code": "x"}"#,
        )
        .expect("list");
        assert_eq!(many.when.len(), 2);
    }

    #[test]
    fn test_validate_rejects_empty_pattern() {
        let set = RuleSet::new("Broken", TargetPlatform::Linux)
            .with_rule(RewriteRule::literal("path", "", "/"));
        assert!(matches!(set.validate(), Err(RuleSetError::Invalid(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            RuleSetFormat::from_path(Path::new("a/rules.YML")),
            Some(RuleSetFormat::Yaml)
        );
        assert_eq!(RuleSetFormat::from_path(Path::new("rules.txt")), None);
    }

    #[test]
    fn test_legacy_template_shape_parses() {
        let raw = r##"{
            "name": "Basic macOS",
            "description": "Basic Windows to macOS conversion",
            "author": "IRUS Team",
            "version": "1.0",
            "created": "2025-01-01",
            "category": "macOS",
            "rules": [
                {"type": "import_replacement", "pattern": "import win32api",
                 "replacement": "# import win32api",
                 "description": "Replace Windows-specific imports"}
            ]
        }"##;
        let set = RuleSet::parse(raw, RuleSetFormat::Json, Path::new("basic.json"))
            .expect("parses");
        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.rules[0].category, "import_replacement");
        assert_eq!(set.target_platform, TargetPlatform::MacOs);
    }
}
