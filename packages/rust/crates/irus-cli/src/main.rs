//! irus CLI: convert, batch, or manage rule sets.
//!
//! Logs go to stderr. `RUST_LOG` overrides the default filter.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use irus_cli::{Cli, ConfigLocation, load_settings, run};

const DEFAULT_FILTER: &str = "irus=info,irus_cli=info,irus_rewrite=info,irus_io=warn";
const VERBOSE_FILTER: &str = "irus=debug,irus_cli=debug,irus_rewrite=debug,irus_io=debug";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let location = ConfigLocation::from_env(cli.conf.as_deref());
    let settings = load_settings(&location);
    tracing::debug!(templates = %settings.templates_dir().display(), "settings loaded");

    run(cli, &settings, &mut std::io::stdout().lock())
}
