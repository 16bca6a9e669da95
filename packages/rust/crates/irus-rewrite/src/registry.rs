//! Rule-set registry: built-ins plus user files from a templates directory.

use std::path::{Path, PathBuf};

use crate::builtin::{builtin_rule_sets, is_builtin};
use crate::error::RuleSetError;
use crate::rule_set::{RuleSet, RuleSetFormat};
use crate::types::TargetPlatform;

/// Where a registered rule set came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSetSource {
    /// Shipped with IRUS.
    Builtin,
    /// Loaded from (or saved to) this file.
    File(PathBuf),
}

/// A registered rule set.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// The rule set.
    pub rule_set: RuleSet,
    /// Its origin.
    pub source: RuleSetSource,
}

/// Named rule sets available for conversion.
///
/// Built-ins are listed first in their fixed order, user sets follow sorted
/// by file name.
#[derive(Debug, Clone)]
pub struct RuleSetRegistry {
    templates_dir: Option<PathBuf>,
    entries: Vec<RegistryEntry>,
}

impl Default for RuleSetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleSetRegistry {
    /// Registry holding only the built-in sets.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates_dir: None,
            entries: builtin_rule_sets()
                .into_iter()
                .map(|rule_set| RegistryEntry {
                    rule_set,
                    source: RuleSetSource::Builtin,
                })
                .collect(),
        }
    }

    /// Built-ins plus every rule-set file in `templates_dir`.
    ///
    /// A missing directory yields just the built-ins. Files that fail to
    /// load, or that reuse an existing name, are logged and skipped.
    #[must_use]
    pub fn load(templates_dir: &Path) -> Self {
        let mut registry = Self::builtin();
        registry.templates_dir = Some(templates_dir.to_path_buf());

        let Ok(read_dir) = std::fs::read_dir(templates_dir) else {
            tracing::debug!(dir = %templates_dir.display(), "no templates directory");
            return registry;
        };

        let mut files: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && RuleSetFormat::from_path(path).is_some())
            .collect();
        files.sort();

        for path in files {
            match RuleSet::from_path(&path) {
                Ok(rule_set) if registry.contains(&rule_set.name) => {
                    tracing::warn!(
                        path = %path.display(),
                        name = %rule_set.name,
                        "duplicate rule set name, skipping"
                    );
                }
                Ok(rule_set) => {
                    tracing::debug!(
                        path = %path.display(),
                        name = %rule_set.name,
                        "loaded rule set"
                    );
                    registry.entries.push(RegistryEntry {
                        rule_set,
                        source: RuleSetSource::File(path),
                    });
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "error loading rule set");
                }
            }
        }

        registry
    }

    /// Directory user sets are persisted to, if any.
    #[must_use]
    pub fn templates_dir(&self) -> Option<&Path> {
        self.templates_dir.as_deref()
    }

    /// Registered names, in listing order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.rule_set.name.as_str())
            .collect()
    }

    /// All entries, in listing order.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Look up a set by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.entry(name).map(|entry| &entry.rule_set)
    }

    /// Look up a set by exact name, or fail with `NotFound`.
    ///
    /// # Errors
    /// `RuleSetError::NotFound`.
    pub fn require(&self, name: &str) -> Result<&RuleSet, RuleSetError> {
        self.get(name)
            .ok_or_else(|| RuleSetError::NotFound(name.to_string()))
    }

    /// The full built-in converter for `platform`.
    #[must_use]
    pub fn get_for_platform(&self, platform: TargetPlatform) -> Option<&RuleSet> {
        self.entries
            .iter()
            .find(|entry| {
                entry.source == RuleSetSource::Builtin && entry.rule_set.name == platform.label()
            })
            .map(|entry| &entry.rule_set)
    }

    /// Whether `name` belongs to a built-in set.
    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        is_builtin(name)
    }

    /// Persist `rule_set` as `<templates_dir>/<file_stem>.json` and register it,
    /// replacing a user set of the same name.
    ///
    /// # Errors
    /// `BuiltinProtected`, `Invalid` (including a registry without a
    /// templates directory), `Serialize` or `Io`.
    pub fn create(&mut self, rule_set: RuleSet) -> Result<PathBuf, RuleSetError> {
        if is_builtin(&rule_set.name) {
            return Err(RuleSetError::BuiltinProtected(rule_set.name));
        }
        rule_set.validate()?;
        let dir = self.templates_dir.as_ref().ok_or_else(|| {
            RuleSetError::Invalid("registry has no templates directory".to_string())
        })?;

        let path = dir.join(format!("{}.json", rule_set.file_stem()));
        rule_set.save(&path)?;
        tracing::info!(name = %rule_set.name, path = %path.display(), "saved rule set");

        let entry = RegistryEntry {
            rule_set,
            source: RuleSetSource::File(path.clone()),
        };
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.rule_set.name == entry.rule_set.name)
        {
            Some(existing) => {
                if let RuleSetSource::File(old) = &existing.source
                    && *old != path
                {
                    remove_file(old)?;
                }
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
        Ok(path)
    }

    /// Load a rule-set file and register a copy in the templates directory.
    ///
    /// # Errors
    /// Anything [`RuleSet::from_path`] or [`Self::create`] returns.
    pub fn import(&mut self, path: &Path) -> Result<String, RuleSetError> {
        let rule_set = RuleSet::from_path(path)?;
        let name = rule_set.name.clone();
        self.create(rule_set)?;
        Ok(name)
    }

    /// Write the named set to `path`, encoded by extension.
    ///
    /// # Errors
    /// `NotFound`, `Serialize` or `Io`.
    pub fn export(&self, name: &str, path: &Path) -> Result<(), RuleSetError> {
        self.require(name)?.save(path)
    }

    /// Unregister a user set and remove its file.
    ///
    /// # Errors
    /// `BuiltinProtected`, `NotFound` or `Io`.
    pub fn delete(&mut self, name: &str) -> Result<(), RuleSetError> {
        if is_builtin(name) {
            return Err(RuleSetError::BuiltinProtected(name.to_string()));
        }
        let position = self
            .entries
            .iter()
            .position(|entry| entry.rule_set.name == name)
            .ok_or_else(|| RuleSetError::NotFound(name.to_string()))?;

        if let RuleSetSource::File(path) = &self.entries[position].source {
            remove_file(path)?;
        }
        self.entries.remove(position);
        tracing::info!(name, "deleted rule set");
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.rule_set.name == name)
    }
}

fn remove_file(path: &Path) -> Result<(), RuleSetError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(RuleSetError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BUILTIN_NAMES;
    use crate::rule::RewriteRule;
    use tempfile::TempDir;

    fn custom(name: &str) -> RuleSet {
        RuleSet::new(name, TargetPlatform::Linux)
            .with_rule(RewriteRule::literal("path_conversion", "C:\\\\", "/"))
    }

    #[test]
    fn test_builtin_registry() {
        let registry = RuleSetRegistry::builtin();
        assert_eq!(registry.names(), BUILTIN_NAMES);
        assert!(registry.templates_dir().is_none());
        let linux = registry
            .get_for_platform(TargetPlatform::Linux)
            .expect("linux set");
        assert_eq!(linux.name, "Linux");
    }

    #[test]
    fn test_create_requires_templates_dir() {
        let mut registry = RuleSetRegistry::builtin();
        let err = registry.create(custom("Mine")).expect_err("no dir");
        assert!(matches!(err, RuleSetError::Invalid(_)));
    }

    #[test]
    fn test_create_replaces_existing_user_set() {
        let temp = TempDir::new().expect("tempdir");
        let mut registry = RuleSetRegistry::load(temp.path());

        registry.create(custom("My Bot")).expect("create");
        let updated = custom("My Bot").with_description("v2");
        let path = registry.create(updated).expect("update");

        assert_eq!(path, temp.path().join("my_bot.json"));
        assert_eq!(registry.names().len(), BUILTIN_NAMES.len() + 1);
        assert_eq!(registry.get("My Bot").expect("registered").description, "v2");
    }
}
