//! Microphone access.
//!
//! The default source records through a system command, the way most
//! terminals without native audio bindings do it:
//!
//! - **SoX** (`rec`): preferred when available.
//! - **arecord**: Linux ALSA fallback.
//!
//! Both write raw signed 16-bit little-endian PCM to stdout; every read from
//! that pipe becomes one data chunk.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc;

use crate::error::AudioError;

const READ_BUFFER_BYTES: usize = 4096;

/// How long a freshly started capture program may stay silent before the
/// device counts as open.
const SETTLE_WINDOW: Duration = Duration::from_millis(300);

/// Upper bound on collecting a failed program's stderr.
const STDERR_GRACE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackendKind {
    /// Try SoX first, then arecord.
    #[default]
    Auto,
    Sox,
    Arecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub backend: CaptureBackendKind,

    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// 1 = mono, 2 = stereo.
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_channels() -> u16 {
    1
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: CaptureBackendKind::Auto,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source and stream
// ---------------------------------------------------------------------------

pub type OpenFuture<'a> =
    Pin<Box<dyn Future<Output = Result<MicrophoneStream, AudioError>> + Send + 'a>>;

/// Grants microphone access. `open` is called afresh for every recording;
/// nothing about a previous grant is cached. It resolves once the device
/// is actually capturing, or with the reason it is not.
pub trait MicrophoneSource: Send + Sync {
    fn open<'a>(&'a self, config: &'a AudioConfig) -> OpenFuture<'a>;
}

/// An open microphone. Chunks arrive in capture order. Dropping the stream
/// releases the device.
pub struct MicrophoneStream {
    chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    child: Option<Child>,
}

impl MicrophoneStream {
    /// A stream fed by something other than a capture process.
    pub fn from_channel(chunks: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
        Self {
            chunks,
            child: None,
        }
    }

    /// Next chunk, or `None` once the device has stopped producing.
    pub async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.chunks.recv().await
    }

    /// A chunk that has already been delivered, without waiting.
    pub fn try_next_chunk(&mut self) -> Option<Vec<u8>> {
        self.chunks.try_recv().ok()
    }
}

impl Drop for MicrophoneStream {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut()
            && let Err(e) = child.start_kill()
        {
            tracing::debug!("capture process already gone: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Subprocess capture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureProgram {
    Sox,
    Arecord,
}

impl CaptureProgram {
    fn binary(self) -> &'static str {
        match self {
            Self::Sox => "rec",
            Self::Arecord => "arecord",
        }
    }

    fn command(self, config: &AudioConfig) -> Command {
        let mut cmd = Command::new(self.binary());
        self.configure(&mut cmd, config);
        cmd
    }

    fn configure(self, cmd: &mut Command, config: &AudioConfig) {
        match self {
            Self::Sox => {
                cmd.arg("-q")
                    .arg("-r")
                    .arg(config.sample_rate.to_string())
                    .arg("-c")
                    .arg(config.channels.to_string())
                    .arg("-b")
                    .arg("16")
                    .arg("-e")
                    .arg("signed-integer")
                    .arg("-L")
                    .arg("-t")
                    .arg("raw")
                    .arg("-");
            }
            Self::Arecord => {
                cmd.arg("-q")
                    .arg("-f")
                    .arg("S16_LE")
                    .arg("-r")
                    .arg(config.sample_rate.to_string())
                    .arg("-c")
                    .arg(config.channels.to_string())
                    .arg("-t")
                    .arg("raw");
            }
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
    }
}

/// Records through SoX `rec` or ALSA `arecord`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubprocessMicrophone;

impl SubprocessMicrophone {
    fn candidates(kind: CaptureBackendKind) -> &'static [CaptureProgram] {
        match kind {
            CaptureBackendKind::Auto => &[CaptureProgram::Sox, CaptureProgram::Arecord],
            CaptureBackendKind::Sox => &[CaptureProgram::Sox],
            CaptureBackendKind::Arecord => &[CaptureProgram::Arecord],
        }
    }
}

impl MicrophoneSource for SubprocessMicrophone {
    fn open<'a>(&'a self, config: &'a AudioConfig) -> OpenFuture<'a> {
        Box::pin(async move {
            let mut missing = Vec::new();
            let mut device_error = None;
            for &program in Self::candidates(config.backend) {
                match start_capture(program, program.command(config)).await {
                    Ok(stream) => {
                        tracing::info!(
                            backend = program.binary(),
                            sample_rate = config.sample_rate,
                            channels = config.channels,
                            "microphone opened"
                        );
                        return Ok(stream);
                    }
                    Err(CaptureStart::NotInstalled) => missing.push(program.binary()),
                    Err(CaptureStart::Failed(e @ AudioError::DeviceUnavailable(_))) => {
                        tracing::warn!(backend = program.binary(), "capture device failed: {e}");
                        device_error = Some(e);
                    }
                    Err(CaptureStart::Failed(e)) => return Err(e),
                }
            }
            Err(device_error.unwrap_or_else(|| {
                AudioError::DeviceUnavailable(format!(
                    "none of {} found; install SoX (rec) or ALSA (arecord)",
                    missing.join(", ")
                ))
            }))
        })
    }
}

enum CaptureStart {
    NotInstalled,
    Failed(AudioError),
}

/// Spawn one capture program and wait until it either delivers audio,
/// stays alive through the settle window, or exits.
async fn start_capture(
    program: CaptureProgram,
    mut cmd: Command,
) -> Result<MicrophoneStream, CaptureStart> {
    let name = program.binary();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(CaptureStart::NotInstalled),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(CaptureStart::Failed(AudioError::PermissionDenied(format!(
                "{name}: {e}"
            ))));
        }
        Err(e) => {
            return Err(CaptureStart::Failed(AudioError::Capture(format!(
                "failed to start {name}: {e}"
            ))));
        }
    };

    let missing_pipe =
        || CaptureStart::Failed(AudioError::Capture(format!("{name} has no output pipes")));
    let mut stdout = child.stdout.take().ok_or_else(missing_pipe)?;
    let stderr = child.stderr.take().ok_or_else(missing_pipe)?;

    let mut first = vec![0u8; READ_BUFFER_BYTES];
    let first_read = tokio::select! {
        read = stdout.read(&mut first) => Some(read),
        () = tokio::time::sleep(SETTLE_WINDOW) => None,
    };

    let first_chunk = match first_read {
        Some(Ok(0)) => {
            let message = collect_stderr(stderr).await;
            let status = match tokio::time::timeout(STDERR_GRACE, child.wait()).await {
                Ok(Ok(status)) => status.to_string(),
                _ => "no exit status".to_string(),
            };
            return Err(CaptureStart::Failed(classify_exit(name, &status, &message)));
        }
        Some(Ok(n)) => {
            first.truncate(n);
            Some(first)
        }
        Some(Err(e)) => {
            return Err(CaptureStart::Failed(AudioError::Capture(format!(
                "{name} read failed: {e}"
            ))));
        }
        None => None,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    if let Some(chunk) = first_chunk {
        let _ = tx.send(chunk);
    }
    tokio::spawn(pump_chunks(stdout, tx));
    tokio::spawn(log_stderr(name, stderr));
    Ok(MicrophoneStream {
        chunks: rx,
        child: Some(child),
    })
}

/// A program that closed its output before any audio never had the device.
fn classify_exit(name: &str, status: &str, stderr: &str) -> AudioError {
    let detail = if stderr.is_empty() {
        format!("{name} exited before capturing ({status})")
    } else {
        format!("{name} exited before capturing ({status}): {stderr}")
    };
    let lowered = stderr.to_ascii_lowercase();
    if lowered.contains("permission denied") || lowered.contains("not permitted") {
        AudioError::PermissionDenied(detail)
    } else {
        AudioError::DeviceUnavailable(detail)
    }
}

async fn collect_stderr(mut stderr: ChildStderr) -> String {
    let mut text = String::new();
    let _ = tokio::time::timeout(STDERR_GRACE, stderr.read_to_string(&mut text)).await;
    text.trim().to_string()
}

async fn log_stderr(name: &'static str, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(backend = name, "{line}");
    }
}

async fn pump_chunks<R>(mut stdout: R, tx: mpsc::UnboundedSender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_BYTES];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("microphone read failed: {e}");
                break;
            }
        }
    }
}
