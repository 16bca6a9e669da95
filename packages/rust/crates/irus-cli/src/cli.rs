use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use irus_rewrite::TargetPlatform;

#[derive(Parser, Debug)]
#[command(name = "irus")]
#[command(about = "Convert Windows automation scripts for macOS, Linux or cross-platform use.")]
pub struct Cli {
    /// Override config directory (settings and user rule sets live under `<DIR>/irus`).
    #[arg(long, global = true)]
    pub conf: Option<PathBuf>,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which rule set to convert with.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleSelection {
    /// Target platform (macOS, Linux, Cross-Platform).
    #[arg(long, value_parser = parse_platform)]
    pub platform: Option<TargetPlatform>,

    /// Registered rule set name.
    #[arg(long, conflicts_with = "rules_file")]
    pub rule_set: Option<String>,

    /// Rule-set file (.json, .yaml, .yml, .toml).
    #[arg(long)]
    pub rules_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert one script.
    Convert {
        /// Script to convert.
        input: PathBuf,

        /// Output path (default: `<stem>_<platform><ext>` next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleSelection,

        /// Do not prepend the generated header.
        #[arg(long)]
        no_header: bool,

        /// Report without writing.
        #[arg(long)]
        dry_run: bool,

        /// Append a unified diff to the report.
        #[arg(long)]
        diff: bool,
    },
    /// Convert many scripts in parallel. Directories are searched for sources.
    Batch {
        /// Files or directories.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        rules: RuleSelection,

        /// Worker threads (default: 4).
        #[arg(long)]
        workers: Option<usize>,

        /// Write every output into this directory.
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Glob for directory inputs (default: **/*.py).
        #[arg(long)]
        pattern: Option<String>,

        /// Report without writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage rule sets.
    Rules {
        #[command(subcommand)]
        action: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List registered rule sets.
    List,
    /// Print a rule set as JSON.
    Show {
        /// Rule set name.
        name: String,
    },
    /// Write a rule set to a file (format from extension).
    Export {
        /// Rule set name.
        name: String,
        /// Destination file.
        path: PathBuf,
    },
    /// Copy a rule-set file into the templates directory.
    Import {
        /// Source file.
        path: PathBuf,
    },
    /// Delete a user rule set.
    Delete {
        /// Rule set name.
        name: String,
    },
}

fn parse_platform(raw: &str) -> Result<TargetPlatform, String> {
    raw.parse()
}
