//! End-to-end tests for the irus subcommands, driven through the parser.

use std::fs;
use std::path::Path;

use clap::Parser;
use irus_cli::{Cli, IrusSettings, run};

fn settings_with_templates(dir: &Path) -> IrusSettings {
    let mut settings = IrusSettings::default();
    settings.conversion.templates_dir = Some(dir.join("templates"));
    settings
}

fn run_args(args: &[&str], settings: &IrusSettings) -> (anyhow::Result<()>, String) {
    let cli = Cli::try_parse_from(args).expect("parse command line");
    let mut out = Vec::new();
    let result = run(cli, settings, &mut out);
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn test_convert_writes_platform_suffixed_file() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let input = temp_dir.path().join("bot.py");
    fs::write(&input, "import pyautogui\npyautogui.click()\n").expect("write input");

    let (result, report) = run_args(
        &["irus", "convert", input.to_str().expect("utf-8 path")],
        &settings,
    );
    result.expect("convert succeeds");

    let output = temp_dir.path().join("bot_macos.py");
    let converted = fs::read_to_string(&output).expect("output written");
    assert!(converted.contains("mouse_controller.click(Button.left, 1)"));
    assert!(!converted.contains("pyautogui"));
    assert!(report.contains("// Written:"));
}

#[test]
fn test_convert_dry_run_writes_nothing() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let input = temp_dir.path().join("bot.py");
    fs::write(&input, "import win32api\n").expect("write input");

    let (result, report) = run_args(
        &[
            "irus",
            "convert",
            input.to_str().expect("utf-8 path"),
            "--platform",
            "linux",
            "--dry-run",
            "--diff",
        ],
        &settings,
    );
    result.expect("dry run succeeds");

    assert!(!temp_dir.path().join("bot_linux.py").exists());
    assert!(report.contains("Dry run"));
    assert!(report.contains("+import subprocess"));
}

#[test]
fn test_convert_refuses_to_overwrite_input() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let input = temp_dir.path().join("bot.py");
    fs::write(&input, "import win32api\n").expect("write input");
    let input_str = input.to_str().expect("utf-8 path");

    let (result, _) = run_args(&["irus", "convert", input_str, "-o", input_str], &settings);
    assert!(result.is_err());
    assert_eq!(
        fs::read_to_string(&input).expect("input intact"),
        "import win32api\n"
    );
}

#[test]
fn test_batch_directory_summary() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let scripts = temp_dir.path().join("scripts");
    fs::create_dir_all(&scripts).expect("create scripts dir");
    fs::write(scripts.join("a.py"), "import win32api\n").expect("write a");
    fs::write(scripts.join("b.py"), "import winsound\n").expect("write b");
    fs::write(scripts.join("notes.txt"), "not a script\n").expect("write notes");

    let (result, report) = run_args(
        &[
            "irus",
            "batch",
            scripts.to_str().expect("utf-8 path"),
            "--platform",
            "Linux",
            "--workers",
            "2",
        ],
        &settings,
    );
    result.expect("batch succeeds");

    assert!(report.contains("// BATCH: 2 files"));
    assert!(report.contains("Succeeded: 2  Failed: 0"));
    let out_dir = scripts.join("converted_batch");
    assert!(out_dir.join("a_linux.py").exists());
    assert!(out_dir.join("b_linux.py").exists());
    assert!(!out_dir.join("notes_linux.txt").exists());
}

#[test]
fn test_batch_with_missing_file_reports_and_fails() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let present = temp_dir.path().join("present.py");
    let missing = temp_dir.path().join("missing.py");
    fs::write(&present, "import win32api\n").expect("write present");

    let (result, report) = run_args(
        &[
            "irus",
            "batch",
            present.to_str().expect("utf-8 path"),
            missing.to_str().expect("utf-8 path"),
        ],
        &settings,
    );

    assert!(result.is_err());
    assert!(report.contains("Succeeded: 1  Failed: 1"));
    assert!(report.contains("FAIL"));
    assert!(
        temp_dir
            .path()
            .join("converted_batch")
            .join("present_macos.py")
            .exists()
    );
}

#[test]
fn test_rules_list_and_show_builtins() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());

    let (result, listing) = run_args(&["irus", "rules", "list"], &settings);
    result.expect("list succeeds");
    for name in ["macOS", "Linux", "Cross-Platform", "Web Automation"] {
        assert!(listing.contains(name), "missing {name} in listing");
    }
    assert!(listing.contains("built-in"));

    let (result, shown) = run_args(&["irus", "rules", "show", "Linux"], &settings);
    result.expect("show succeeds");
    let json: serde_json::Value = serde_json::from_str(&shown).expect("show prints json");
    assert_eq!(json["name"], "Linux");
}

#[test]
fn test_rules_export_import_delete() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let custom = temp_dir.path().join("custom.yaml");
    fs::write(
        &custom,
        r#"name: Office Bot
target_platform: Linux
rules:
  - pattern: "winsound"
    replacement: "subprocess"
    category: "Audio"
"#,
    )
    .expect("write custom set");

    let (result, _) = run_args(
        &["irus", "rules", "import", custom.to_str().expect("utf-8 path")],
        &settings,
    );
    result.expect("import succeeds");
    assert!(temp_dir.path().join("templates/office_bot.json").exists());

    let exported = temp_dir.path().join("exported.toml");
    let (result, _) = run_args(
        &[
            "irus",
            "rules",
            "export",
            "Office Bot",
            exported.to_str().expect("utf-8 path"),
        ],
        &settings,
    );
    result.expect("export succeeds");
    assert!(
        fs::read_to_string(&exported)
            .expect("exported file")
            .contains("Office Bot")
    );

    let (result, _) = run_args(&["irus", "rules", "delete", "Office Bot"], &settings);
    result.expect("delete succeeds");
    assert!(!temp_dir.path().join("templates/office_bot.json").exists());

    let (result, _) = run_args(&["irus", "rules", "delete", "macOS"], &settings);
    assert!(result.is_err());
}

#[test]
fn test_named_rule_set_decides_platform() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let settings = settings_with_templates(temp_dir.path());
    let input = temp_dir.path().join("scraper.py");
    fs::write(&input, "driver = webdriver.Chrome()\n").expect("write input");

    let (result, _) = run_args(
        &[
            "irus",
            "convert",
            input.to_str().expect("utf-8 path"),
            "--rule-set",
            "Web Automation",
        ],
        &settings,
    );
    result.expect("convert succeeds");

    let converted = fs::read_to_string(temp_dir.path().join("scraper_cross-platform.py"))
        .expect("output written");
    assert!(converted.contains("webdriver.Chrome(options=chrome_options)"));
}
