use std::sync::Arc;
use std::time::Instant;

use crate::audio::capture::{AudioConfig, MicrophoneSource, MicrophoneStream};
use crate::audio::wav::AudioPayload;
use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRecording,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StopOutcome {
    NotRecording,
    /// Recording ended without any captured data.
    Empty,
    Finished(AudioPayload),
}

/// What the open microphone produced while recording.
#[derive(Debug, PartialEq, Eq)]
pub enum RecorderEvent {
    Chunk(Vec<u8>),
    /// The device stopped producing data on its own.
    Ended,
}

struct RecordingSession {
    stream: MicrophoneStream,
    chunks: Vec<Vec<u8>>,
    started_at: Instant,
}

/// Two-state recorder. At most one session exists; the microphone is held
/// only while `Recording`.
pub struct AudioRecorder {
    source: Arc<dyn MicrophoneSource>,
    config: AudioConfig,
    session: Option<RecordingSession>,
}

impl AudioRecorder {
    pub fn new(source: Arc<dyn MicrophoneSource>, config: AudioConfig) -> Self {
        Self {
            source,
            config,
            session: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        if self.session.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn buffered_chunks(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.chunks.len())
    }

    /// Acquire the microphone and start buffering. On failure the recorder
    /// stays idle and nothing is held.
    pub async fn start_recording(&mut self) -> Result<StartOutcome, AudioError> {
        if self.session.is_some() {
            return Ok(StartOutcome::AlreadyRecording);
        }
        let stream = self.source.open(&self.config).await?;
        self.session = Some(RecordingSession {
            stream,
            chunks: Vec::new(),
            started_at: Instant::now(),
        });
        Ok(StartOutcome::Started)
    }

    /// Append a chunk to the current buffer. Ignored when idle.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> bool {
        match self.session.as_mut() {
            Some(session) if !chunk.is_empty() => {
                session.chunks.push(chunk);
                true
            }
            _ => false,
        }
    }

    /// Wait for the next device event. Never resolves while idle, so it can
    /// sit in a `select!` next to other event sources.
    pub async fn next_event(&mut self) -> RecorderEvent {
        match self.session.as_mut() {
            Some(session) => match session.stream.next_chunk().await {
                Some(chunk) => RecorderEvent::Chunk(chunk),
                None => RecorderEvent::Ended,
            },
            None => std::future::pending().await,
        }
    }

    /// Release the microphone and drop whatever was buffered.
    pub fn cancel_recording(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Stop, release the microphone and assemble the buffered chunks.
    pub fn stop_recording(&mut self) -> StopOutcome {
        let Some(mut session) = self.session.take() else {
            return StopOutcome::NotRecording;
        };
        // Data the device already delivered belongs to this recording.
        while let Some(chunk) = session.stream.try_next_chunk() {
            if !chunk.is_empty() {
                session.chunks.push(chunk);
            }
        }
        let RecordingSession {
            stream,
            chunks,
            started_at,
        } = session;
        drop(stream);

        tracing::info!(
            chunks = chunks.len(),
            elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "recording stopped"
        );

        if chunks.is_empty() {
            StopOutcome::Empty
        } else {
            StopOutcome::Finished(AudioPayload::wav_from_chunks(&chunks, &self.config))
        }
    }
}
