//! Runtime settings loader for the irus CLI.
//!
//! Two optional YAML files are read, `<root>/irus.yaml` then
//! `<config home>/irus/settings.yaml`, and merged field by field with the
//! user file winning.

use std::path::{Path, PathBuf};

use irus_rewrite::{
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_DIR, DiscoveryOptions,
    TargetPlatform,
};
use serde::Deserialize;

const SYSTEM_SETTINGS_FILE: &str = "irus.yaml";
const USER_SETTINGS_FILE: &str = "irus/settings.yaml";
const TEMPLATES_DIR: &str = "irus/templates";
const DEFAULT_CONFIG_HOME: &str = ".config";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IrusSettings {
    #[serde(default)]
    pub conversion: ConversionSettings,
    #[serde(default)]
    pub batch: BatchSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionSettings {
    pub default_platform: Option<TargetPlatform>,
    pub default_rule_set: Option<String>,
    pub templates_dir: Option<PathBuf>,
    pub max_file_size: Option<u64>,
    pub inject_header: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchSettings {
    pub max_workers: Option<usize>,
    pub file_pattern: Option<String>,
    pub skip_dirs: Option<Vec<String>>,
    pub output_dir_name: Option<String>,
}

impl IrusSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            conversion: self.conversion.merge(overlay.conversion),
            batch: self.batch.merge(overlay.batch),
        }
    }

    /// Platform used when neither `--platform` nor a rule set decides it.
    #[must_use]
    pub fn default_platform(&self) -> TargetPlatform {
        self.conversion.default_platform.unwrap_or_default()
    }

    /// Per-file size limit.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.conversion.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Whether converted files get the generated header.
    #[must_use]
    pub fn inject_header(&self) -> bool {
        self.conversion.inject_header.unwrap_or(true)
    }

    /// Batch pool size.
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.batch.max_workers.unwrap_or(DEFAULT_MAX_WORKERS)
    }

    /// Folder created beside batch inputs.
    #[must_use]
    pub fn output_dir_name(&self) -> String {
        self.batch
            .output_dir_name
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }

    /// Discovery options with configured pattern and skip dirs.
    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        let defaults = DiscoveryOptions::default();
        DiscoveryOptions {
            file_pattern: self
                .batch
                .file_pattern
                .clone()
                .unwrap_or(defaults.file_pattern),
            skip_dirs: self.batch.skip_dirs.clone().unwrap_or(defaults.skip_dirs),
        }
    }

    /// Directory holding user rule sets. [`load_settings`] always fills it.
    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        self.conversion
            .templates_dir
            .clone()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_HOME).join(TEMPLATES_DIR))
    }
}

impl ConversionSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            default_platform: overlay.default_platform.or(self.default_platform),
            default_rule_set: overlay.default_rule_set.or(self.default_rule_set),
            templates_dir: overlay.templates_dir.or(self.templates_dir),
            max_file_size: overlay.max_file_size.or(self.max_file_size),
            inject_header: overlay.inject_header.or(self.inject_header),
        }
    }
}

impl BatchSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            max_workers: overlay.max_workers.or(self.max_workers),
            file_pattern: overlay.file_pattern.or(self.file_pattern),
            skip_dirs: overlay.skip_dirs.or(self.skip_dirs),
            output_dir_name: overlay.output_dir_name.or(self.output_dir_name),
        }
    }
}

/// Where settings files and user rule sets are looked up.
///
/// `root` comes from `IRUS_ROOT` (falling back to the working directory);
/// the config home from `--conf`, then `IRUS_CONFIG_HOME`, then `.config`.
/// Relative paths resolve against `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    root: PathBuf,
    config_home: PathBuf,
}

impl ConfigLocation {
    /// Build from the environment, with an optional `--conf` override.
    #[must_use]
    pub fn from_env(conf: Option<&Path>) -> Self {
        let root = env_path("IRUS_ROOT")
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let config_home = conf
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| env_path("IRUS_CONFIG_HOME"))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME));
        Self::new(root, config_home)
    }

    /// Explicit root and config home.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config_home: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_home = root.join(config_home.into());
        Self { root, config_home }
    }

    /// `<root>/irus.yaml`
    #[must_use]
    pub fn system_settings(&self) -> PathBuf {
        self.root.join(SYSTEM_SETTINGS_FILE)
    }

    /// `<config home>/irus/settings.yaml`
    #[must_use]
    pub fn user_settings(&self) -> PathBuf {
        self.config_home.join(USER_SETTINGS_FILE)
    }

    /// `<config home>/irus/templates`
    #[must_use]
    pub fn default_templates_dir(&self) -> PathBuf {
        self.config_home.join(TEMPLATES_DIR)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Load merged settings for `location` and pin the templates directory.
///
/// A configured relative `templates_dir` resolves against the root.
pub fn load_settings(location: &ConfigLocation) -> IrusSettings {
    let mut settings =
        load_settings_from_paths(&location.system_settings(), &location.user_settings());
    settings.conversion.templates_dir = Some(match settings.conversion.templates_dir.take() {
        Some(dir) => location.root.join(dir),
        None => location.default_templates_dir(),
    });
    settings
}

/// Merge a system and a user file. Missing or unreadable files count as empty.
pub fn load_settings_from_paths(system: &Path, user: &Path) -> IrusSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> IrusSettings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return IrusSettings::default();
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "settings file unreadable, skipped");
            return IrusSettings::default();
        }
    };
    serde_yaml::from_str(&raw).unwrap_or_else(|error| {
        tracing::warn!(path = %path.display(), %error, "settings file is not valid yaml, skipped");
        IrusSettings::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_home_resolves_against_root() {
        let location = ConfigLocation::new("/srv/bots", "conf");
        assert_eq!(location.system_settings(), PathBuf::from("/srv/bots/irus.yaml"));
        assert_eq!(
            location.user_settings(),
            PathBuf::from("/srv/bots/conf/irus/settings.yaml")
        );
        assert_eq!(
            location.default_templates_dir(),
            PathBuf::from("/srv/bots/conf/irus/templates")
        );
    }

    #[test]
    fn test_absolute_config_home_kept() {
        let location = ConfigLocation::new("/srv/bots", "/etc/xdg");
        assert_eq!(
            location.user_settings(),
            PathBuf::from("/etc/xdg/irus/settings.yaml")
        );
    }

    #[test]
    fn test_load_pins_default_templates_dir() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let location = ConfigLocation::new(temp_dir.path(), ".config");
        let settings = load_settings(&location);
        assert_eq!(settings.templates_dir(), location.default_templates_dir());
    }
}
