use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::audio::recorder::{AudioRecorder, RecorderEvent, StartOutcome, StopOutcome};
use crate::audio::wav::AudioPayload;
use crate::notifications::{Notification, NotificationSender};
use crate::transport::Outbound;

/// Microphone toggle and fire-and-forget upload of finished recordings.
pub struct AudioPipeline {
    recorder: AudioRecorder,
    outbound: Arc<dyn Outbound>,
    notices: NotificationSender,
}

impl AudioPipeline {
    pub fn new(
        recorder: AudioRecorder,
        outbound: Arc<dyn Outbound>,
        notices: NotificationSender,
    ) -> Self {
        Self {
            recorder,
            outbound,
            notices,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Start when idle, stop and send when recording.
    pub async fn toggle(&mut self) -> Option<JoinHandle<()>> {
        if self.recorder.is_recording() {
            self.stop()
        } else {
            self.start().await;
            None
        }
    }

    pub async fn start(&mut self) {
        match self.recorder.start_recording().await {
            Ok(StartOutcome::Started) => {
                self.notify(Notification::info("recording… press Ctrl-R to send"));
            }
            Ok(StartOutcome::AlreadyRecording) => {}
            Err(e) => {
                tracing::warn!("microphone unavailable: {e}");
                self.notify(Notification::error(format!("cannot record: {e}")));
            }
        }
    }

    pub fn stop(&mut self) -> Option<JoinHandle<()>> {
        match self.recorder.stop_recording() {
            StopOutcome::Finished(payload) => Some(self.upload(payload)),
            StopOutcome::Empty => {
                self.notify(Notification::warning("no audio captured; nothing sent"));
                None
            }
            StopOutcome::NotRecording => None,
        }
    }

    /// Drop the current recording without sending it.
    pub fn discard(&mut self) {
        if self.recorder.cancel_recording() {
            self.notify(Notification::info("recording discarded"));
        }
    }

    pub async fn next_event(&mut self) -> RecorderEvent {
        self.recorder.next_event().await
    }

    /// Feed a device event back. A device that stops on its own ends the
    /// recording as if the user had stopped it.
    pub fn handle_event(&mut self, event: RecorderEvent) -> Option<JoinHandle<()>> {
        match event {
            RecorderEvent::Chunk(chunk) => {
                self.recorder.push_chunk(chunk);
                None
            }
            RecorderEvent::Ended => {
                tracing::warn!("microphone stopped producing audio");
                self.notify(Notification::warning("microphone closed; recording stopped"));
                self.stop()
            }
        }
    }

    fn upload(&self, payload: AudioPayload) -> JoinHandle<()> {
        let outbound = Arc::clone(&self.outbound);
        let notices = self.notices.clone();
        tokio::spawn(async move {
            let size = payload.len();
            match outbound.send_audio(&payload).await {
                Ok(()) => {
                    tracing::info!(bytes = size, "recording uploaded");
                    let _ = notices.send(Notification::info(format!(
                        "recording sent ({} KiB)",
                        size.div_ceil(1024)
                    )));
                }
                Err(e) => {
                    tracing::warn!("recording upload failed: {e}");
                    let _ = notices.send(Notification::error(format!("recording not sent: {e}")));
                }
            }
        })
    }

    fn notify(&self, notice: Notification) {
        let _ = self.notices.send(notice);
    }
}
