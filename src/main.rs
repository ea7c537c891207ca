#![warn(clippy::all, clippy::pedantic)]

use aethel_console::app::{apply_cli_overrides, dispatch};
use aethel_console::cli::Cli;
use aethel_console::config::Config;
use aethel_console::observability::{LogTarget, init_logging};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS (wss:// and https:// backends).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let mut config = Config::load_or_init()?;
    apply_cli_overrides(&cli, &mut config)?;

    let target = if cli.subcommand().is_interactive() {
        LogTarget::File(config.log_file_path())
    } else {
        LogTarget::Stderr
    };
    init_logging(&config.observability, &target)?;

    dispatch(cli, config).await
}
