//! Subcommand implementations. Reports go to the supplied writer, logs to tracing.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;

use irus_rewrite::{
    BatchOptions, BatchSummary, ConvertOptions, RuleSet, RuleSetRegistry, RuleSetSource,
    TargetPlatform, convert_batch_with_progress, convert_file, discover_sources, format_report,
};

use crate::cli::{Cli, Command, RuleSelection, RulesCommand};
use crate::settings::IrusSettings;

/// Dispatch a parsed command line.
///
/// # Errors
/// Any failure of the selected subcommand.
pub fn run(cli: Cli, settings: &IrusSettings, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Command::Convert {
            input,
            output,
            rules,
            no_header,
            dry_run,
            diff,
        } => run_convert(
            &input,
            output.as_deref(),
            &rules,
            ConvertFlags {
                no_header,
                dry_run,
                diff,
            },
            settings,
            out,
        ),
        Command::Batch {
            paths,
            rules,
            workers,
            output_root,
            pattern,
            dry_run,
        } => run_batch(
            &paths,
            &rules,
            BatchFlags {
                workers,
                output_root,
                pattern,
                dry_run,
            },
            settings,
            out,
        ),
        Command::Rules { action } => run_rules(action, settings, out),
    }
}

/// Switches of `irus convert`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertFlags {
    /// Skip the generated header.
    pub no_header: bool,
    /// Report without writing.
    pub dry_run: bool,
    /// Append a unified diff.
    pub diff: bool,
}

/// Options of `irus batch` that override settings.
#[derive(Debug, Clone, Default)]
pub struct BatchFlags {
    /// Worker threads.
    pub workers: Option<usize>,
    /// Single output directory.
    pub output_root: Option<PathBuf>,
    /// Glob for directory inputs.
    pub pattern: Option<String>,
    /// Report without writing.
    pub dry_run: bool,
}

/// Convert one file and print its report.
///
/// # Errors
/// Rule-set resolution or conversion failure.
pub fn run_convert(
    input: &Path,
    output: Option<&Path>,
    selection: &RuleSelection,
    flags: ConvertFlags,
    settings: &IrusSettings,
    out: &mut dyn Write,
) -> Result<()> {
    let registry = RuleSetRegistry::load(&settings.templates_dir());
    let (rule_set, platform) = resolve_rule_set(&registry, selection, settings)?;
    let compiled = rule_set
        .compile()
        .with_context(|| format!("rule set '{}' does not compile", rule_set.name))?;

    let options = ConvertOptions {
        target_platform: platform,
        max_file_size: settings.max_file_size(),
        inject_header: settings.inject_header() && !flags.no_header,
        dry_run: flags.dry_run,
        generated_at: Utc::now(),
    };
    let conversion = convert_file(input, output, &compiled, &options)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    write!(out, "{}", format_report(&conversion, flags.diff))?;
    Ok(())
}

/// Convert every source under `paths` and print a summary.
///
/// # Errors
/// Rule-set resolution failure, no sources found, an invalid pool size, or
/// at least one file failing.
pub fn run_batch(
    paths: &[PathBuf],
    selection: &RuleSelection,
    flags: BatchFlags,
    settings: &IrusSettings,
    out: &mut dyn Write,
) -> Result<()> {
    let registry = RuleSetRegistry::load(&settings.templates_dir());
    let (rule_set, platform) = resolve_rule_set(&registry, selection, settings)?;
    let compiled = rule_set
        .compile()
        .with_context(|| format!("rule set '{}' does not compile", rule_set.name))?;

    let mut discovery = settings.discovery_options();
    if let Some(pattern) = flags.pattern {
        discovery.file_pattern = pattern;
    }

    let mut seen = HashSet::new();
    let files: Vec<PathBuf> = paths
        .iter()
        .flat_map(|path| {
            if path.is_dir() {
                discover_sources(path, &discovery)
            } else {
                vec![path.clone()]
            }
        })
        .filter(|path| seen.insert(path.clone()))
        .collect();
    if files.is_empty() {
        bail!("no source files found matching '{}'", discovery.file_pattern);
    }

    let mut options = BatchOptions::new(platform, Utc::now());
    options.max_workers = flags.workers.unwrap_or_else(|| settings.max_workers());
    options.output_root = flags.output_root;
    options.output_dir_name = settings.output_dir_name();
    options.max_file_size = settings.max_file_size();
    options.inject_header = settings.inject_header();
    options.dry_run = flags.dry_run;

    let summary = convert_batch_with_progress(&files, &compiled, &options, |progress| {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            path = %progress.path.display(),
            ok = progress.succeeded,
            "converted"
        );
    })
    .context("batch conversion could not start")?;

    write_batch_summary(&summary, &rule_set.name, options.dry_run, out)?;
    if !summary.failed.is_empty() {
        bail!(
            "{} of {} files failed to convert",
            summary.failed.len(),
            summary.total()
        );
    }
    Ok(())
}

fn write_batch_summary(
    summary: &BatchSummary,
    rule_set: &str,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(
        out,
        "// BATCH: {} files with '{rule_set}'{}",
        summary.total(),
        if dry_run { " (dry run)" } else { "" }
    )?;
    writeln!(
        out,
        "// Succeeded: {}  Failed: {}  Success rate: {:.1}%",
        summary.succeeded.len(),
        summary.failed.len(),
        summary.success_rate() * 100.0
    )?;
    for success in &summary.succeeded {
        writeln!(
            out,
            "OK   {} -> {} ({} rules, {} warnings)",
            success.input_path.display(),
            success.output_path.display(),
            success.applied_rules_count,
            success.warnings_count
        )?;
    }
    for failure in &summary.failed {
        writeln!(
            out,
            "FAIL {}: {}",
            failure.input_path.display(),
            failure.error_message
        )?;
    }
    if !summary.category_counts.is_empty() {
        writeln!(out, "\n// Rules fired by category:")?;
        for (category, count) in &summary.category_counts {
            writeln!(out, "{category}: {count}")?;
        }
    }
    Ok(())
}

/// Rule-set management.
///
/// # Errors
/// Registry failures (unknown name, protected built-in, unreadable file).
pub fn run_rules(action: RulesCommand, settings: &IrusSettings, out: &mut dyn Write) -> Result<()> {
    let mut registry = RuleSetRegistry::load(&settings.templates_dir());
    match action {
        RulesCommand::List => {
            for entry in registry.entries() {
                let origin = match &entry.source {
                    RuleSetSource::Builtin => "built-in".to_string(),
                    RuleSetSource::File(path) => path.display().to_string(),
                };
                writeln!(
                    out,
                    "{:<16} {:<15} {:>3} rules  [{origin}]  {}",
                    entry.rule_set.name,
                    entry.rule_set.target_platform.label(),
                    entry.rule_set.rules.len(),
                    entry.rule_set.description
                )?;
            }
        }
        RulesCommand::Show { name } => {
            let json = registry.require(&name)?.to_json_pretty()?;
            writeln!(out, "{json}")?;
        }
        RulesCommand::Export { name, path } => {
            registry.export(&name, &path)?;
            writeln!(out, "Exported '{name}' to {}", path.display())?;
        }
        RulesCommand::Import { path } => {
            let name = registry
                .import(&path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            writeln!(out, "Imported '{name}'")?;
        }
        RulesCommand::Delete { name } => {
            registry.delete(&name)?;
            writeln!(out, "Deleted '{name}'")?;
        }
    }
    Ok(())
}

/// Pick the rule set and target platform.
///
/// A rules file or named set decides the platform unless `--platform` is
/// given. Without either, the configured default set is used, falling back
/// to the built-in converter for the platform.
fn resolve_rule_set(
    registry: &RuleSetRegistry,
    selection: &RuleSelection,
    settings: &IrusSettings,
) -> Result<(RuleSet, TargetPlatform)> {
    let chosen = if let Some(path) = &selection.rules_file {
        Some(
            RuleSet::from_path(path)
                .with_context(|| format!("failed to load rules file {}", path.display()))?,
        )
    } else if let Some(name) = &selection.rule_set {
        Some(registry.require(name)?.clone())
    } else {
        None
    };

    if let Some(rule_set) = chosen {
        let platform = selection.platform.unwrap_or(rule_set.target_platform);
        return Ok((rule_set, platform));
    }

    let platform = selection
        .platform
        .unwrap_or_else(|| settings.default_platform());
    if selection.platform.is_none()
        && let Some(name) = &settings.conversion.default_rule_set
    {
        let rule_set = registry
            .require(name)
            .context("configured default_rule_set is not registered")?
            .clone();
        let platform = settings
            .conversion
            .default_platform
            .unwrap_or(rule_set.target_platform);
        return Ok((rule_set, platform));
    }

    let rule_set = registry
        .get_for_platform(platform)
        .cloned()
        .with_context(|| format!("no built-in rule set for {platform}"))?;
    Ok((rule_set, platform))
}
