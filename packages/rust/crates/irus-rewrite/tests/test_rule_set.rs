//! Tests for rule_set module - definition files.

use std::path::Path;

use tempfile::TempDir;

use irus_rewrite::{
    Boilerplate, MatcherKind, RewriteRule, RuleSet, RuleSetError, RuleSetFormat, TargetPlatform,
};

fn sample() -> RuleSet {
    RuleSet::new("Fishing Bot", TargetPlatform::Linux)
        .with_description("Fishing macro conversion")
        .with_rule(
            RewriteRule::regex("import", r"(?m)^import win32api$", "import subprocess")
                .describe("Replace win32api"),
        )
        .with_rule(RewriteRule::literal("path_conversion", "\\\\", "/"))
        .with_boilerplate(
            Boilerplate::new("time import", "time.sleep", "import time").unless("import time"),
        )
}

#[test]
fn test_round_trip_every_format() {
    let dir = TempDir::new().expect("Create temp dir");
    for file in ["fishing.json", "fishing.yaml", "fishing.yml", "fishing.toml"] {
        let path = dir.path().join(file);
        sample().save(&path).expect("save");
        let loaded = RuleSet::from_path(&path).expect("load");
        assert_eq!(loaded, sample(), "round trip through {file}");
    }
}

#[test]
fn test_minimal_yaml_defaults() {
    let raw = "\
name: Minimal
rules:
  - category: path_conversion
    matcher: literal
    pattern: 'C:\\'
    replacement: /
";
    let rule_set =
        RuleSet::parse(raw, RuleSetFormat::Yaml, Path::new("minimal.yaml")).expect("parse");
    assert_eq!(rule_set.author, "User");
    assert_eq!(rule_set.version, "1.0");
    assert_eq!(rule_set.target_platform, TargetPlatform::MacOs);
    assert_eq!(rule_set.rules[0].matcher, MatcherKind::Literal);
    assert_eq!(rule_set.rules[0].pattern, "C:\\");
}

#[test]
fn test_toml_definition() {
    let raw = r#"
name = "Toml Set"
target_platform = "Cross-Platform"

[[rules]]
category = "terminal"
pattern = 'os\.system\("cls"\)'
replacement = 'os.system("clear")'
"#;
    let rule_set = RuleSet::parse(raw, RuleSetFormat::Toml, Path::new("set.toml")).expect("parse");
    assert_eq!(rule_set.target_platform, TargetPlatform::CrossPlatform);
    rule_set.compile().expect("compiles");
}

#[test]
fn test_validation_errors() {
    let raw = r#"{"name": "Broken", "rules": [{"category": "x", "pattern": ""}]}"#;
    let err = RuleSet::parse(raw, RuleSetFormat::Json, Path::new("broken.json"))
        .expect_err("empty pattern");
    assert!(matches!(err, RuleSetError::Invalid(_)));

    let err = RuleSet::parse("{not json", RuleSetFormat::Json, Path::new("bad.json"))
        .expect_err("malformed");
    assert!(matches!(err, RuleSetError::Parse { .. }));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().expect("Create temp dir");
    let path = dir.path().join("rules.ini");
    std::fs::write(&path, "name=x").expect("Write file");
    let err = RuleSet::from_path(&path).expect_err("unsupported");
    assert!(matches!(err, RuleSetError::UnsupportedFormat(_)));
}

#[test]
fn test_file_stem() {
    assert_eq!(sample().file_stem(), "fishing_bot");
}
