//! Batch conversion - many independent files under one worker pool.
//!
//! Every file is read, rewritten and written by a rayon worker. A file's
//! failure is recorded and never stops its siblings. Results come back in
//! input order regardless of completion order.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use globset::Glob;
use irus_io::DEFAULT_MAX_FILE_SIZE;
use rayon::prelude::*;

use crate::convert::{ConvertOptions, FileConversion, convert_to, output_file_name};
use crate::error::{BatchError, ConvertError};
use crate::rule_set::CompiledRuleSet;
use crate::types::TargetPlatform;

/// Default worker count.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Default name of the per-directory output folder.
pub const DEFAULT_OUTPUT_DIR: &str = "converted_batch";

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Conversion target.
    pub target_platform: TargetPlatform,
    /// Pool size, at least 1.
    pub max_workers: usize,
    /// Write every output into this directory instead of next to its input.
    pub output_root: Option<PathBuf>,
    /// Folder created beside each input when `output_root` is unset.
    pub output_dir_name: String,
    /// Per-file size limit.
    pub max_file_size: u64,
    /// Rewrite everything, write nothing.
    pub dry_run: bool,
    /// Prepend the generated header.
    pub inject_header: bool,
    /// Timestamp shared by every header in the run.
    pub generated_at: DateTime<Utc>,
}

impl BatchOptions {
    /// Defaults for `target_platform` stamped with `generated_at`.
    #[must_use]
    pub fn new(target_platform: TargetPlatform, generated_at: DateTime<Utc>) -> Self {
        Self {
            target_platform,
            max_workers: DEFAULT_MAX_WORKERS,
            output_root: None,
            output_dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            dry_run: false,
            inject_header: true,
            generated_at,
        }
    }

    /// Where the converted form of `input` goes.
    #[must_use]
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let file_name = output_file_name(input, self.target_platform);
        match &self.output_root {
            Some(root) => root.join(file_name),
            None => input
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(&self.output_dir_name)
                .join(file_name),
        }
    }

    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            target_platform: self.target_platform,
            max_file_size: self.max_file_size,
            inject_header: self.inject_header,
            dry_run: self.dry_run,
            generated_at: self.generated_at,
        }
    }
}

/// A file that converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSuccess {
    /// Source file.
    pub input_path: PathBuf,
    /// Destination (not written on dry runs).
    pub output_path: PathBuf,
    /// Number of rules that fired.
    pub applied_rules_count: usize,
    /// Number of warnings raised.
    pub warnings_count: usize,
}

/// A file that did not convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Source file.
    pub input_path: PathBuf,
    /// Rendered error.
    pub error_message: String,
}

/// Aggregated batch result.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Successful conversions, in input order.
    pub succeeded: Vec<BatchSuccess>,
    /// Failed conversions, in input order.
    pub failed: Vec<BatchFailure>,
    /// Fired-rule counts per category across succeeded files.
    pub category_counts: BTreeMap<String, usize>,
}

impl BatchSummary {
    /// Files attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Fraction of files that converted, `0.0` for an empty batch.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.succeeded.len() as f64 / total as f64,
        }
    }
}

/// Progress report passed to the callback after each file.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// Files finished so far, including this one.
    pub completed: usize,
    /// Files in the batch.
    pub total: usize,
    /// File just finished.
    pub path: &'a Path,
    /// Whether it converted.
    pub succeeded: bool,
}

/// Convert every path in `paths`.
///
/// # Errors
/// `InvalidWorkers` or `ThreadPool`; per-file problems are reported in the
/// summary instead.
pub fn convert_batch(
    paths: &[PathBuf],
    rule_set: &CompiledRuleSet,
    options: &BatchOptions,
) -> Result<BatchSummary, BatchError> {
    convert_batch_with_progress(paths, rule_set, options, |_| {})
}

/// [`convert_batch`] with a callback invoked from worker threads after each file.
///
/// # Errors
/// `InvalidWorkers` or `ThreadPool`.
pub fn convert_batch_with_progress<F>(
    paths: &[PathBuf],
    rule_set: &CompiledRuleSet,
    options: &BatchOptions,
    on_progress: F,
) -> Result<BatchSummary, BatchError>
where
    F: Fn(&BatchProgress<'_>) + Sync,
{
    if options.max_workers == 0 {
        return Err(BatchError::InvalidWorkers);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.max_workers)
        .build()
        .map_err(|e| BatchError::ThreadPool(e.to_string()))?;

    let total = paths.len();
    let completed = AtomicUsize::new(0);
    let category_counts: DashMap<String, usize> = DashMap::new();
    let convert_options = options.convert_options();

    tracing::info!(
        files = total,
        workers = options.max_workers,
        rule_set = %rule_set.name(),
        dry_run = options.dry_run,
        "starting batch conversion"
    );

    let results: Vec<Result<BatchSuccess, BatchFailure>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let result = convert_to(
                    path,
                    options.output_path_for(path),
                    rule_set,
                    &convert_options,
                );
                let succeeded = result.is_ok();
                let entry = summarize(path, result, &category_counts);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                on_progress(&BatchProgress {
                    completed: done,
                    total,
                    path,
                    succeeded,
                });
                entry
            })
            .collect()
    });

    let mut summary = BatchSummary {
        category_counts: category_counts.into_iter().collect(),
        ..BatchSummary::default()
    };
    for result in results {
        match result {
            Ok(success) => summary.succeeded.push(success),
            Err(failure) => summary.failed.push(failure),
        }
    }

    tracing::info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        "batch conversion finished"
    );
    Ok(summary)
}

fn summarize(
    path: &Path,
    result: Result<FileConversion, ConvertError>,
    category_counts: &DashMap<String, usize>,
) -> Result<BatchSuccess, BatchFailure> {
    match result {
        Ok(conversion) => {
            for rule in &conversion.outcome.applied_rules {
                *category_counts.entry(rule.category.clone()).or_insert(0) += 1;
            }
            Ok(BatchSuccess {
                input_path: conversion.input_path,
                output_path: conversion.output_path,
                applied_rules_count: conversion.outcome.applied_rules.len(),
                warnings_count: conversion.outcome.warnings.len(),
            })
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "batch file failed");
            Err(BatchFailure {
                input_path: path.to_path_buf(),
                error_message: error.to_string(),
            })
        }
    }
}

/// Options for [`discover_sources`].
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Glob matched against paths relative to the root.
    pub file_pattern: String,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            file_pattern: "**/*.py".to_string(),
            skip_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                DEFAULT_OUTPUT_DIR.to_string(),
            ],
        }
    }
}

/// Files under `root` matching the pattern, sorted.
///
/// Honours `.gitignore`. A file `root` is returned as-is. An invalid glob
/// falls back to matching everything, with a warning.
#[must_use]
pub fn discover_sources(root: &Path, options: &DiscoveryOptions) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let matcher = match Glob::new(&options.file_pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(error) => {
            tracing::warn!(pattern = %options.file_pattern, %error, "invalid file pattern");
            None
        }
    };

    let mut files: Vec<PathBuf> = ignore::WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path.as_path());
            !in_skipped_dir(relative, &options.skip_dirs)
                && matcher.as_ref().is_none_or(|m| m.is_match(relative))
        })
        .collect();

    files.sort();
    tracing::debug!(root = %root.display(), files = files.len(), "discovered sources");
    files
}

fn in_skipped_dir(relative: &Path, skip_dirs: &[String]) -> bool {
    relative.parent().is_some_and(|parent| {
        parent.components().any(|component| match component {
            Component::Normal(name) => skip_dirs.iter().any(|skip| name == skip.as_str()),
            _ => false,
        })
    })
}
