use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::Arc;

use super::style;
use super::tail::run_tail;
use crate::audio::{AudioPayload, SubprocessMicrophone};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::transport::TransportClient;

/// Apply flags that outrank both the config file and the environment.
pub fn apply_cli_overrides(cli: &Cli, config: &mut Config) -> Result<()> {
    if let Some(url) = cli.backend.as_deref() {
        config.backend.base_url = url.trim().to_string();
        config.validate()?;
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.subcommand() {
        Commands::Console => {
            crate::console::run_console(&config, Arc::new(SubprocessMicrophone)).await
        }
        Commands::Tail => run_tail(&config).await,
        Commands::Send { text } => send_text(&config, &text).await,
        Commands::Upload { path, mime } => upload_file(&config, &path, mime.as_deref()).await,
    }
}

async fn send_text(config: &Config, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("nothing to send");
    }
    let client = TransportClient::new(config)?;
    client.http().send_response(text).await?;
    println!("{} {}", style::success("✓"), style::dim("response delivered"));
    Ok(())
}

async fn upload_file(config: &Config, path: &Path, mime: Option<&str>) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", path.display());
    }
    let file_name = path
        .file_name()
        .map_or_else(|| "recording".to_string(), |n| n.to_string_lossy().into_owned());
    let mime_type = mime.map_or_else(|| guess_mime(path).to_string(), str::to_string);
    let payload = AudioPayload::new(bytes, mime_type, file_name);

    let client = TransportClient::new(config)?;
    client.http().send_audio(&payload).await?;
    println!(
        "{} {} {}",
        style::success("✓"),
        style::dim("uploaded"),
        payload.file_name
    );
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg" | "oga") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}
