use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

use crate::audio::{AudioPipeline, AudioRecorder, MicrophoneSource, RecorderEvent};
use crate::config::Config;
use crate::coordinator::{PromptCoordinator, PromptTransition};
use crate::dispatch::CommandDispatcher;
use crate::notifications::{Notification, NotificationReceiver, notification_channel};
use crate::scratchpad::{IngestOutcome, ScratchpadReader, ScratchpadStore};
use crate::transport::{ConnectionStatus, Outbound, TransportClient};

use super::handlers::{ConsoleAction, handle_key};
use super::render;
use super::state::ConsoleState;

const TICK: Duration = Duration::from_millis(250);

/// The console minus the terminal: owns the store and routes every input
/// to the component responsible for it.
pub struct ConsoleSession {
    store: ScratchpadStore,
    view: ScratchpadReader,
    dispatcher: CommandDispatcher,
    audio: AudioPipeline,
    pub state: ConsoleState,
}

impl ConsoleSession {
    pub fn new(
        config: &Config,
        outbound: Arc<dyn Outbound>,
        microphone: Arc<dyn MicrophoneSource>,
    ) -> (Self, NotificationReceiver) {
        let (notices_tx, notices_rx) = notification_channel();
        let recorder = AudioRecorder::new(microphone, config.audio.clone());
        let store = ScratchpadStore::new();
        let session = Self {
            view: store.reader(),
            store,
            dispatcher: CommandDispatcher::new(Arc::clone(&outbound), notices_tx.clone()),
            audio: AudioPipeline::new(recorder, outbound, notices_tx),
            state: ConsoleState::new(PromptCoordinator::new(config.prompt.confirm_timeout())),
        };
        (session, notices_rx)
    }

    pub fn store(&self) -> &ScratchpadStore {
        &self.store
    }

    /// One inbound snapshot. Applied snapshots are shown to the coordinator
    /// before the next frame is read.
    pub fn handle_frame(&mut self, raw: &str) -> Option<PromptTransition> {
        match self.store.ingest(raw) {
            IngestOutcome::Applied { .. } => Some(self.state.apply_view(self.view.current())),
            IngestOutcome::Discarded(_) => None,
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        match handle_key(&mut self.state, key) {
            ConsoleAction::None => {}
            ConsoleAction::Quit => self.state.should_quit = true,
            ConsoleAction::SubmitInput => {
                let state = &mut self.state;
                self.dispatcher
                    .submit_input(&mut state.input, &mut state.prompt);
            }
            ConsoleAction::SubmitOption(index) => {
                self.dispatcher.submit_option(&mut self.state.prompt, index);
            }
            ConsoleAction::ToggleRecording => {
                self.audio.toggle().await;
                self.state.recording = self.audio.is_recording();
            }
        }
    }

    pub fn handle_audio(&mut self, event: RecorderEvent) {
        self.audio.handle_event(event);
        self.state.recording = self.audio.is_recording();
    }

    pub fn handle_tick(&mut self, now: Instant) {
        self.state.loading.advance();
        if let Some(PromptTransition::Reprompt) = self.state.prompt.check_timeout(now) {
            self.state.push_notice(Notification::warning(
                "the agent has not picked up your answer; you can answer again",
            ));
        }
    }

    /// Stop any recording without sending it.
    fn shutdown(&mut self) {
        if self.audio.is_recording() {
            tracing::info!("discarding in-progress recording on exit");
            self.audio.discard();
        }
    }
}

/// Restores the terminal on drop, including on early return.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = crossterm::execute!(stdout, EnterAlternateScreen) {
            let _ = terminal::disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the full-screen console until the user quits.
pub async fn run_console(config: &Config, microphone: Arc<dyn MicrophoneSource>) -> Result<()> {
    let client = Arc::new(TransportClient::new(config)?);
    tracing::info!(backend = %config.backend.base_url, "starting console");

    let (connection, frames) = client.connect();
    let status = connection.status();
    let (mut session, notices) = ConsoleSession::new(config, client, microphone);

    let result = match TerminalGuard::enter() {
        Ok(mut guard) => {
            main_loop(&mut guard.terminal, &mut session, frames, status, notices).await
        }
        Err(e) => Err(e),
    };

    session.shutdown();
    connection.close().await;
    tracing::info!("console closed");
    result
}

async fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut ConsoleSession,
    mut frames: tokio::sync::mpsc::Receiver<String>,
    mut status: tokio::sync::watch::Receiver<ConnectionStatus>,
    mut notices: NotificationReceiver,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            render::draw_ui(area, frame.buffer_mut(), &session.state);
        })?;

        if session.state.should_quit {
            return Ok(());
        }

        tokio::select! {
            Some(raw) = frames.recv() => {
                session.handle_frame(&raw);
            }
            Ok(()) = status.changed() => {
                session.state.connection = status.borrow_and_update().clone();
            }
            Some(event) = events.next() => match event? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    session.handle_key(key).await;
                }
                _ => {}
            },
            Some(notice) = notices.recv() => session.state.push_notice(notice),
            event = session.audio.next_event() => session.handle_audio(event),
            _ = tick.tick() => session.handle_tick(Instant::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioPayload;
    use crate::audio::recorder::test_support::FakeMicrophone;
    use crate::transport::OutboundFuture;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        responses: Mutex<Vec<String>>,
        uploads: Mutex<Vec<AudioPayload>>,
    }

    impl Outbound for Recorded {
        fn send_response<'a>(&'a self, text: &'a str) -> OutboundFuture<'a> {
            Box::pin(async move {
                self.responses.lock().unwrap().push(text.to_string());
                Ok(())
            })
        }

        fn send_audio<'a>(&'a self, payload: &'a AudioPayload) -> OutboundFuture<'a> {
            Box::pin(async move {
                self.uploads.lock().unwrap().push(payload.clone());
                Ok(())
            })
        }
    }

    fn session() -> (ConsoleSession, Arc<Recorded>, Arc<FakeMicrophone>, NotificationReceiver) {
        let outbound = Arc::new(Recorded::default());
        let mic = Arc::new(FakeMicrophone::default());
        let (session, notices) = ConsoleSession::new(&Config::default(), outbound.clone(), mic.clone());
        (session, outbound, mic, notices)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(session: &mut ConsoleSession, text: &str) {
        for c in text.chars() {
            session.handle_key(key(KeyCode::Char(c))).await;
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    const PROMPT: &str = r#"{"steps":[],"plan":[],"ui_action":{"type":"confirm","message":"Move?","options":["Yes","No"]}}"#;
    const CLEAR: &str = r#"{"steps":[{"step_id":1,"action":"fs_move","result":"ok"}],"plan":[]}"#;

    #[tokio::test]
    async fn command_is_sent_and_input_cleared() {
        let (mut session, outbound, _mic, _notices) = session();
        session.handle_frame(CLEAR);
        type_text(&mut session, "organize downloads").await;
        session.handle_key(key(KeyCode::Enter)).await;
        assert!(session.state.input.value.is_empty());

        settle().await;
        assert_eq!(*outbound.responses.lock().unwrap(), ["organize downloads"]);
    }

    #[tokio::test]
    async fn option_answer_keeps_modal_until_backend_clears_it() {
        let (mut session, outbound, _mic, _notices) = session();
        assert_eq!(session.handle_frame(PROMPT), Some(PromptTransition::Opened));

        session.handle_key(key(KeyCode::Tab)).await;
        session.handle_key(key(KeyCode::Enter)).await;
        settle().await;
        assert_eq!(*outbound.responses.lock().unwrap(), ["No"]);
        assert!(session.state.prompt.is_awaiting());

        assert_eq!(session.handle_frame(PROMPT), Some(PromptTransition::Unchanged));
        assert_eq!(session.handle_frame(CLEAR), Some(PromptTransition::Resolved));
        assert!(!session.state.prompt.is_awaiting());
    }

    #[tokio::test]
    async fn malformed_frame_keeps_last_snapshot() {
        let (mut session, _outbound, _mic, _notices) = session();
        session.handle_frame(CLEAR);
        let before = session.store().current().revision();
        assert_eq!(session.handle_frame("{not json"), None);
        assert_eq!(session.store().current().revision(), before);
        assert!(session.state.snapshot().is_some());
    }

    #[tokio::test]
    async fn console_view_follows_every_applied_snapshot() {
        let (mut session, _outbound, _mic, _notices) = session();
        session.handle_frame(CLEAR);
        session.handle_frame(PROMPT);
        assert_eq!(session.state.view.revision(), 2);
        assert_eq!(session.store().current().revision(), 2);
        let shown = session.state.snapshot().unwrap();
        assert!(shown.steps.is_empty());
        assert!(shown.active_ui_action().is_some());
    }

    #[tokio::test]
    async fn ctrl_r_records_and_uploads() {
        let (mut session, outbound, mic, _notices) = session();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);

        session.handle_key(ctrl_r).await;
        assert!(session.state.recording);
        mic.feed(&[1, 0, 2, 0]);
        let event = session.audio.next_event().await;
        session.handle_audio(event);

        session.handle_key(ctrl_r).await;
        assert!(!session.state.recording);
        settle().await;
        assert_eq!(outbound.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn quit_discards_recording() {
        let (mut session, outbound, mic, _notices) = session();
        session.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)).await;
        mic.feed(&[1, 1]);
        session.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)).await;
        assert!(session.state.should_quit);

        session.shutdown();
        settle().await;
        assert!(!mic.is_held());
        assert!(outbound.uploads.lock().unwrap().is_empty());
    }
}
