//! Placeholder for the panes before the first snapshot has been applied.

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use super::super::theme;
use crate::transport::ConnectionStatus;

const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Animation phase, stepped once per UI tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadingIndicator {
    ticks: usize,
}

impl LoadingIndicator {
    pub fn advance(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    pub fn frame(self) -> &'static str {
        FRAMES[self.ticks % FRAMES.len()]
    }
}

/// "Loading..." plus what the snapshot socket is doing right now.
pub struct LoadingPlaceholder<'a> {
    indicator: LoadingIndicator,
    connection: &'a ConnectionStatus,
}

impl<'a> LoadingPlaceholder<'a> {
    pub fn new(indicator: LoadingIndicator, connection: &'a ConnectionStatus) -> Self {
        Self {
            indicator,
            connection,
        }
    }

    fn detail(&self) -> Span<'static> {
        match self.connection {
            ConnectionStatus::Connecting => {
                Span::styled("connecting to the agent", theme::dim_style())
            }
            ConnectionStatus::Connected => {
                Span::styled("waiting for the first snapshot", theme::dim_style())
            }
            ConnectionStatus::Reconnecting { attempt, delay } => Span::styled(
                format!(
                    "backend unreachable; retry {attempt} in {:.1}s",
                    delay.as_secs_f32()
                ),
                theme::warning_style(),
            ),
            ConnectionStatus::Closed => Span::styled("not connected", theme::error_style()),
        }
    }
}

impl Widget for LoadingPlaceholder<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let mut lines = vec![Line::from(vec![
            Span::styled(self.indicator.frame(), theme::title_style()),
            Span::styled(" Loading...", theme::input_style()),
        ])];
        if area.height > 1 {
            lines.push(Line::from(self.detail()));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
