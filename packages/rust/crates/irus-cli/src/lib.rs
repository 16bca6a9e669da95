//! irus CLI library: settings loading and subcommand implementations.
//!
//! The binary in `main.rs` only parses arguments, sets up logging and
//! dispatches to [`run`].

#![allow(missing_docs)]

mod cli;
mod commands;
mod settings;

pub use cli::{Cli, Command, RuleSelection, RulesCommand};
pub use commands::{BatchFlags, ConvertFlags, run, run_batch, run_convert, run_rules};
pub use settings::{
    BatchSettings, ConfigLocation, ConversionSettings, IrusSettings, load_settings,
    load_settings_from_paths,
};
