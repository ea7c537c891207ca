use anyhow::Result;
use std::fmt::Write as _;

use super::style;
use crate::config::Config;
use crate::coordinator::{PromptCoordinator, PromptTransition};
use crate::scratchpad::{IngestOutcome, Scratchpad, ScratchpadStore};
use crate::transport::{ConnectionStatus, TransportClient};

const RESULT_PREVIEW_CHARS: usize = 60;

/// Follow the snapshot stream without a TUI. Runs until Ctrl-C or until the
/// listener stops.
pub async fn run_tail(config: &Config) -> Result<()> {
    let client = TransportClient::new(config)?;
    let (connection, mut frames) = client.connect();
    let mut status = connection.status();
    let store = ScratchpadStore::new();
    let view = store.reader();
    let mut prompt = PromptCoordinator::new(None);

    println!(
        "{} {}",
        style::header("tailing"),
        style::dim(&client.endpoints().snapshots)
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::warn!("ctrl-c handler failed: {e}");
                }
                break;
            }
            Ok(()) = status.changed() => {
                let line = connection_line(&status.borrow_and_update());
                println!("{line}");
            }
            frame = frames.recv() => {
                let Some(raw) = frame else { break };
                let IngestOutcome::Applied { revision } = store.ingest(&raw) else {
                    println!("{}", style::warning("ignored malformed snapshot"));
                    continue;
                };
                let current = view.current();
                let Some(snapshot) = current.snapshot() else { continue };
                println!("{}", summary_line(snapshot, revision));
                match prompt.observe(snapshot) {
                    PromptTransition::Opened | PromptTransition::Replaced => {
                        if let Some(request) = snapshot.active_ui_action() {
                            println!("{}", prompt_line(request.message_text(), request.choices()));
                        }
                    }
                    PromptTransition::Resolved => println!("{}", style::success("prompt resolved")),
                    _ => {}
                }
            }
        }
    }

    connection.close().await;
    Ok(())
}

fn connection_line(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connecting => style::dim("connecting…"),
        ConnectionStatus::Connected => style::success("connected"),
        ConnectionStatus::Reconnecting { attempt, delay } => style::warning(format!(
            "connection lost; retry {attempt} in {:.1}s",
            delay.as_secs_f32()
        )),
        ConnectionStatus::Closed => style::error("disconnected"),
    }
}

fn prompt_line(message: &str, choices: Option<&[String]>) -> String {
    match choices {
        Some(options) => format!(
            "{} {message} [{}]",
            style::accent("agent asks:"),
            options.join(" / ")
        ),
        None => format!("{} {message}", style::accent("agent asks:")),
    }
}

/// `#<revision> <status> iter <n> | steps <n> (last: ...) | plan <done>/<total> done`
pub fn summary_line(snapshot: &Scratchpad, revision: u64) -> String {
    let mut line = format!("#{revision}");
    if let Some(meta) = snapshot.meta.as_ref() {
        if let Some(status) = meta.status.as_deref() {
            let _ = write!(line, " {status}");
        }
        if let Some(iteration) = meta.iteration_count {
            let _ = write!(line, " iter {iteration}");
        }
    }

    let _ = write!(line, " | steps {}", snapshot.steps.len());
    if let Some(last) = snapshot.steps.last() {
        let action = last.action_name().unwrap_or("in progress");
        let result = crate::notifications::preview(last.result_text(), RESULT_PREVIEW_CHARS);
        if result.is_empty() {
            let _ = write!(line, " (last: {action})");
        } else {
            let _ = write!(line, " (last: {action} {result})");
        }
    }

    let done = snapshot.plan.iter().filter(|item| item.is_done()).count();
    let _ = write!(line, " | plan {done}/{} done", snapshot.plan.len());
    if snapshot.active_ui_action().is_some() {
        line.push_str(" | awaiting input");
    }
    line
}
