//! Single-file conversion: read, rewrite, write.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use irus_io::{DEFAULT_MAX_FILE_SIZE, read_text_safe, write_text};

use crate::diff::generate_unified_diff;
use crate::error::ConvertError;
use crate::rewriter::Rewriter;
use crate::rule_set::CompiledRuleSet;
use crate::types::{RewriteOutcome, RewriteRequest, TargetPlatform};

/// Options for one file conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Conversion target (drives warnings, header and output naming).
    pub target_platform: TargetPlatform,
    /// Inputs above this size are rejected.
    pub max_file_size: u64,
    /// Prepend the generated header.
    pub inject_header: bool,
    /// Rewrite but do not write.
    pub dry_run: bool,
    /// Timestamp written into the header.
    pub generated_at: DateTime<Utc>,
}

impl ConvertOptions {
    /// Defaults for `target_platform` stamped with `generated_at`.
    #[must_use]
    pub fn new(target_platform: TargetPlatform, generated_at: DateTime<Utc>) -> Self {
        Self {
            target_platform,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            inject_header: true,
            dry_run: false,
            generated_at,
        }
    }
}

/// Result of converting one file.
#[derive(Debug, Clone)]
pub struct FileConversion {
    /// Source file.
    pub input_path: PathBuf,
    /// Destination (written only when `written` is true).
    pub output_path: PathBuf,
    /// Normalized source text as read.
    pub source_text: String,
    /// Rewrite result.
    pub outcome: RewriteOutcome,
    /// Whether the output was written to disk.
    pub written: bool,
}

impl FileConversion {
    /// Unified diff between source and output.
    #[must_use]
    pub fn diff(&self) -> String {
        generate_unified_diff(
            &self.source_text,
            &self.outcome.output_text,
            &self.input_path.display().to_string(),
            &self.output_path.display().to_string(),
        )
    }
}

/// `<stem>_<platform-slug><ext>` for `input`.
#[must_use]
pub fn output_file_name(input: &Path, platform: TargetPlatform) -> String {
    let stem = input
        .file_stem()
        .map_or_else(|| "converted".into(), |s| s.to_string_lossy());
    match input.extension() {
        Some(ext) => format!("{stem}_{}.{}", platform.slug(), ext.to_string_lossy()),
        None => format!("{stem}_{}", platform.slug()),
    }
}

/// Default output path: next to the input, named by [`output_file_name`].
#[must_use]
pub fn default_output_path(input: &Path, platform: TargetPlatform) -> PathBuf {
    input.with_file_name(output_file_name(input, platform))
}

/// Convert `input` and write the result.
///
/// `output` defaults to [`default_output_path`]. With `dry_run` nothing is
/// written.
///
/// # Errors
/// `SameAsInput` if the destination is the source, `InputRead`,
/// `Rewrite` or `OutputWrite`.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    rule_set: &CompiledRuleSet,
    options: &ConvertOptions,
) -> Result<FileConversion, ConvertError> {
    let output_path = output.map_or_else(
        || default_output_path(input, options.target_platform),
        Path::to_path_buf,
    );
    if same_file(input, &output_path) {
        return Err(ConvertError::SameAsInput(input.to_path_buf()));
    }
    convert_to(input, output_path, rule_set, options)
}

/// Convert `input` without writing anything.
///
/// # Errors
/// `InputRead` or `Rewrite`.
pub fn preview_file(
    input: &Path,
    rule_set: &CompiledRuleSet,
    options: &ConvertOptions,
) -> Result<FileConversion, ConvertError> {
    let options = ConvertOptions {
        dry_run: true,
        ..options.clone()
    };
    convert_to(
        input,
        default_output_path(input, options.target_platform),
        rule_set,
        &options,
    )
}

/// Human-readable report, optionally followed by the unified diff.
#[must_use]
pub fn format_report(conversion: &FileConversion, with_diff: bool) -> String {
    let diff = with_diff.then(|| conversion.diff());
    let mut report = Rewriter::format_result(
        &conversion.outcome,
        Some(&conversion.input_path.display().to_string()),
        diff.as_deref(),
    );
    if conversion.written {
        let _ = writeln!(report, "\n// Written: {}", conversion.output_path.display());
    } else {
        report.push_str("\n[Dry run - nothing written]\n");
    }
    report
}

/// Read, rewrite and (unless dry-run) write to `output_path`.
pub(crate) fn convert_to(
    input: &Path,
    output_path: PathBuf,
    rule_set: &CompiledRuleSet,
    options: &ConvertOptions,
) -> Result<FileConversion, ConvertError> {
    let source_text =
        read_text_safe(input, options.max_file_size).map_err(|source| ConvertError::InputRead {
            path: input.to_path_buf(),
            source,
        })?;

    let source_name = input
        .file_name()
        .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
    let request = RewriteRequest::new(source_name, options.target_platform, options.generated_at)
        .with_header(options.inject_header);

    let outcome = Rewriter::rewrite_compiled(&source_text, rule_set, &request)?;

    let written = if options.dry_run {
        false
    } else {
        write_text(&output_path, &outcome.output_text).map_err(|source| {
            ConvertError::OutputWrite {
                path: output_path.clone(),
                source,
            }
        })?;
        true
    };

    tracing::debug!(
        input = %input.display(),
        output = %output_path.display(),
        applied = outcome.applied_rules.len(),
        written,
        "converted file"
    );

    Ok(FileConversion {
        input_path: input.to_path_buf(),
        output_path,
        source_text,
        outcome,
        written,
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RewriteRule;
    use crate::rule_set::RuleSet;
    use tempfile::TempDir;

    fn options() -> ConvertOptions {
        let at = DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default();
        ConvertOptions::new(TargetPlatform::MacOs, at)
    }

    fn rules() -> CompiledRuleSet {
        RuleSet::new("demo", TargetPlatform::MacOs)
            .with_rule(RewriteRule::regex("import", r"import win32api", "import subprocess"))
            .compile()
            .expect("compile")
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("dir/bot.py"), TargetPlatform::MacOs),
            "bot_macos.py"
        );
        assert_eq!(
            output_file_name(Path::new("run"), TargetPlatform::CrossPlatform),
            "run_cross-platform"
        );
        assert_eq!(
            default_output_path(Path::new("dir/bot.py"), TargetPlatform::Linux),
            Path::new("dir/bot_linux.py")
        );
    }

    #[test]
    fn test_convert_writes_next_to_input() {
        let temp = TempDir::new().expect("tempdir");
        let input = temp.path().join("bot.py");
        std::fs::write(&input, "import win32api\r\n").expect("write");

        let conversion = convert_file(&input, None, &rules(), &options()).expect("convert");
        assert!(conversion.written);
        assert_eq!(conversion.output_path, temp.path().join("bot_macos.py"));

        let written = std::fs::read_to_string(&conversion.output_path).expect("read");
        assert!(written.starts_with("#!/usr/bin/env python3\n"));
        assert!(written.ends_with("import subprocess\n"));
        assert_eq!(
            std::fs::read_to_string(&input).expect("input"),
            "import win32api\r\n"
        );
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let temp = TempDir::new().expect("tempdir");
        let input = temp.path().join("bot.py");
        std::fs::write(&input, "x = 1\n").expect("write");

        let err = convert_file(&input, Some(&input), &rules(), &options()).expect_err("same file");
        assert!(matches!(err, ConvertError::SameAsInput(_)));
    }

    #[test]
    fn test_preview_writes_nothing() {
        let temp = TempDir::new().expect("tempdir");
        let input = temp.path().join("bot.py");
        std::fs::write(&input, "import win32api\n").expect("write");

        let conversion = preview_file(&input, &rules(), &options()).expect("preview");
        assert!(!conversion.written);
        assert!(!conversion.output_path.exists());

        let report = format_report(&conversion, true);
        assert!(report.contains("Rules applied: 1"));
        assert!(report.contains("+import subprocess"));
        assert!(report.contains("Dry run"));
    }

    #[test]
    fn test_missing_input_is_read_error() {
        let temp = TempDir::new().expect("tempdir");
        let err = convert_file(&temp.path().join("absent.py"), None, &rules(), &options())
            .expect_err("missing");
        assert!(matches!(err, ConvertError::InputRead { .. }));
    }

    #[test]
    fn test_cp1252_input_is_not_written() {
        let temp = TempDir::new().expect("tempdir");
        let input = temp.path().join("bot.py");
        std::fs::write(&input, b"# caf\xe9 bot\nimport win32api\n").expect("write");

        let err = convert_file(&input, None, &rules(), &options()).expect_err("not utf-8");
        assert!(matches!(
            err,
            ConvertError::InputRead {
                source: irus_io::IoError::InvalidUtf8 { valid_up_to: 5 },
                ..
            }
        ));
        assert!(!temp.path().join("bot_macos.py").exists());
    }
}
