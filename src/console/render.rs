use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use crate::coordinator::ActivePrompt;
use crate::notifications::NoticeLevel;
use crate::scratchpad::{ExecutionStep, PlanItem, Scratchpad};
use crate::transport::ConnectionStatus;

use super::state::ConsoleState;
use super::theme;
use super::widgets::{LoadingPlaceholder, OptionButtons, TextInputWidget};

const MIC_INDICATOR_WIDTH: u16 = 10;

pub fn draw_ui(area: Rect, buf: &mut Buffer, state: &ConsoleState) {
    let vertical = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(3),    // Timeline + plan
        Constraint::Length(3), // Command input
        Constraint::Length(1), // Notifications
        Constraint::Length(1), // Keybindings
    ])
    .split(area);

    header_line(state).render(vertical[0], buf);

    match state.snapshot() {
        Some(snapshot) => render_panes(vertical[1], buf, snapshot),
        None => {
            let inner = centered_rect(vertical[1], 48, 2);
            LoadingPlaceholder::new(state.loading, &state.connection).render(inner, buf);
        }
    }

    render_input(vertical[2], buf, state);
    notice_line(state).render(vertical[3], buf);
    Line::from(Span::styled(keybinding_text(state), theme::keybinding_style()))
        .render(vertical[4], buf);

    if let Some(prompt) = state.prompt.active() {
        render_modal(vertical[1], buf, prompt, state.selected_option);
    }
}

fn header_line(state: &ConsoleState) -> Line<'static> {
    let mut spans = vec![Span::styled(" Aethel Console ", theme::title_style())];

    if let Some(meta) = state.snapshot().and_then(|s| s.meta.as_ref()) {
        if let Some(session) = meta.session_id.as_deref() {
            spans.push(Span::styled(format!(" session {session}"), theme::dim_style()));
        }
        if let Some(status) = meta.status.as_deref() {
            spans.push(Span::styled(format!("  {status}"), theme::heading_style()));
        }
        if let Some(iteration) = meta.iteration_count {
            spans.push(Span::styled(
                format!("  iteration {iteration}"),
                theme::dim_style(),
            ));
        }
    }

    let (label, style) = connection_label(&state.connection);
    spans.push(Span::raw("  "));
    spans.push(Span::styled(label, style));
    Line::from(spans)
}

fn connection_label(status: &ConnectionStatus) -> (String, Style) {
    match status {
        ConnectionStatus::Connecting => ("○ connecting".into(), theme::warning_style()),
        ConnectionStatus::Connected => ("● connected".into(), theme::success_style()),
        ConnectionStatus::Reconnecting { attempt, delay } => (
            format!(
                "○ reconnecting in {:.1}s (attempt {attempt})",
                delay.as_secs_f32()
            ),
            theme::warning_style(),
        ),
        ConnectionStatus::Closed => ("✕ disconnected".into(), theme::error_style()),
    }
}

fn render_panes(area: Rect, buf: &mut Buffer, snapshot: &Scratchpad) {
    let horizontal =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);

    let log_block = pane_block(" Execution Log ");
    let log_inner = log_block.inner(horizontal[0]);
    log_block.render(horizontal[0], buf);

    // Newest steps stay visible at the bottom.
    let visible = usize::from(log_inner.height);
    let skip = snapshot.steps.len().saturating_sub(visible);
    let step_lines: Vec<Line> = snapshot.steps.iter().skip(skip).map(step_line).collect();
    if step_lines.is_empty() {
        Line::from(Span::styled("no steps yet", theme::dim_style())).render(log_inner, buf);
    } else {
        Paragraph::new(step_lines).render(log_inner, buf);
    }

    let plan_block = pane_block(" Current Plan ");
    let plan_inner = plan_block.inner(horizontal[1]);
    plan_block.render(horizontal[1], buf);

    let plan_lines: Vec<Line> = snapshot.plan.iter().map(plan_line).collect();
    if plan_lines.is_empty() {
        Line::from(Span::styled("no plan yet", theme::dim_style())).render(plan_inner, buf);
    } else {
        Paragraph::new(plan_lines)
            .wrap(Wrap { trim: true })
            .render(plan_inner, buf);
    }
}

fn pane_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(title, theme::heading_style()))
}

pub(crate) fn action_icon(action: Option<&str>) -> &'static str {
    match action {
        Some("fs_move") => "📂",
        Some("kg_search") => "🔍",
        Some("ask_user") => "❓",
        _ => "⚙",
    }
}

fn step_line(step: &ExecutionStep) -> Line<'_> {
    let action = step.action_name();
    let mut spans = vec![Span::raw(format!("{} ", action_icon(action)))];
    match action {
        Some(name) => spans.push(Span::styled(name, theme::selected_style())),
        None => spans.push(Span::styled(
            "in progress",
            theme::dim_style().add_modifier(Modifier::ITALIC),
        )),
    }
    if let Some(phase) = step.phase.as_deref().filter(|p| !p.is_empty()) {
        spans.push(Span::styled(format!(" [{phase}]"), theme::dim_style()));
    }
    let result = step.result_text();
    if !result.is_empty() {
        spans.push(Span::styled(format!("  {result}"), theme::input_style()));
    }
    Line::from(spans)
}

fn plan_line(item: &PlanItem) -> Line<'_> {
    if item.is_done() {
        Line::from(vec![
            Span::styled("[x] ", theme::success_style()),
            Span::styled(item.description.as_str(), theme::plan_done_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[ ] ", theme::dim_style()),
            Span::styled(item.description.as_str(), theme::plan_pending_style()),
        ])
    }
}

fn render_input(area: Rect, buf: &mut Buffer, state: &ConsoleState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(" Command ", theme::heading_style()));
    let inner = block.inner(area);
    block.render(area, buf);

    let columns =
        Layout::horizontal([Constraint::Min(4), Constraint::Length(MIC_INDICATOR_WIDTH)])
            .split(inner);

    let focused = state.options().is_empty();
    TextInputWidget::new(&state.input, ">", focused)
        .placeholder(if state.prompt.is_awaiting() {
            "type your answer"
        } else {
            "type a command"
        })
        .render(columns[0], buf);

    let mic = if state.recording {
        Span::styled("● REC", theme::recording_style())
    } else {
        Span::styled("🎤 off", theme::dim_style())
    };
    Line::from(mic).right_aligned().render(columns[1], buf);
}

fn notice_line(state: &ConsoleState) -> Line<'_> {
    let Some(notice) = state.latest_notice() else {
        return Line::default();
    };
    let style = match notice.level {
        NoticeLevel::Info => theme::dim_style(),
        NoticeLevel::Warning => theme::warning_style(),
        NoticeLevel::Error => theme::error_style(),
    };
    Line::from(vec![
        Span::styled(
            format!(" {} ", notice.at.format("%H:%M:%S")),
            theme::dim_style(),
        ),
        Span::styled(notice.message.as_str(), style),
    ])
}

fn keybinding_text(state: &ConsoleState) -> String {
    let mut keys = Vec::new();
    if state.options().is_empty() {
        keys.push("Enter Send");
    } else {
        keys.push("←→/Tab Choose");
        keys.push("Enter Confirm");
    }
    keys.push(if state.recording {
        "Ctrl-R Stop & send"
    } else {
        "Ctrl-R Record"
    });
    keys.push("Ctrl-Q Quit");
    format!(" {}", keys.join("  "))
}

fn render_modal(area: Rect, buf: &mut Buffer, prompt: &ActivePrompt, selected: usize) {
    let request = &prompt.request;
    let width = modal_width(area.width);
    let height = 9.min(area.height);
    let modal = centered_rect(area, width, height);

    Clear.render(modal, buf);
    let title = match request.title_text() {
        "" => " Agent needs input ".to_string(),
        title => format!(" {title} "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::modal_border_style())
        .title(Span::styled(title, theme::modal_border_style()));
    let inner = block.inner(modal);
    block.render(modal, buf);

    let rows = Layout::vertical([
        Constraint::Min(1),    // Message
        Constraint::Length(1), // Options or hint
        Constraint::Length(1), // Submission status
    ])
    .split(inner);

    Paragraph::new(request.message_text())
        .style(theme::input_style())
        .wrap(Wrap { trim: true })
        .render(rows[0], buf);

    match prompt.choices() {
        Some(options) => OptionButtons::new(options, selected).render(rows[1], buf),
        None => Line::from(Span::styled(
            "type your answer below and press Enter",
            theme::dim_style(),
        ))
        .centered()
        .render(rows[1], buf),
    }

    let status = if let Some(submitted) = prompt.submitted.as_ref() {
        Span::styled(
            format!("sent \"{}\", waiting for the agent…", submitted.text),
            theme::dim_style(),
        )
    } else if prompt.reprompted {
        Span::styled(
            "no confirmation from the agent yet; answer again",
            theme::warning_style(),
        )
    } else {
        Span::raw("")
    };
    Line::from(status).centered().render(rows[2], buf);
}

/// Three fifths of the pane, at least 30 columns, never wider than the pane.
fn modal_width(available: u16) -> u16 {
    let share = u32::from(available) * 3 / 5;
    u16::try_from(share)
        .unwrap_or(available)
        .max(30)
        .min(available)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::PromptCoordinator;
    use crate::notifications::Notification;
    use crate::scratchpad::ScratchpadStore;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn render(state: &ConsoleState) -> Buffer {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw_ui(frame.area(), frame.buffer_mut(), state))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn state_with(raw: &str) -> ConsoleState {
        let store = ScratchpadStore::new();
        assert!(store.ingest(raw).is_applied());
        let mut state = ConsoleState::new(PromptCoordinator::default());
        state.apply_view(store.current());
        state
    }

    const WORKING: &str = r#"{
        "steps": [
            {"step_id": 1, "action": "fs_move", "result": "moved a.txt", "phase": "act"},
            {"step_id": 2, "action": "", "result": ""}
        ],
        "plan": [
            {"id": "p1", "description": "Scan inbox", "status": "done"},
            {"id": "p2", "description": "Move files", "status": "pending"}
        ],
        "meta": {"session_id": "s-42", "status": "RUNNING", "iteration_count": 3}
    }"#;

    #[test]
    fn loading_until_first_snapshot() {
        let state = ConsoleState::new(PromptCoordinator::default());
        let screen = text(&render(&state));
        assert!(screen.contains("Loading..."));
        assert!(screen.contains("connecting to the agent"));
        assert!(!screen.contains("Execution Log"));
    }

    #[test]
    fn timeline_and_plan_render() {
        let state = state_with(WORKING);
        let buf = render(&state);
        let screen = text(&buf);

        assert!(screen.contains("Execution Log"));
        assert!(screen.contains("fs_move"));
        assert!(screen.contains("moved a.txt"));
        assert!(screen.contains("in progress"));
        assert!(screen.contains("[x] Scan inbox"));
        assert!(screen.contains("[ ] Move files"));
        assert!(screen.contains("session s-42"));
        assert!(screen.contains("iteration 3"));
        assert!(
            buf.content
                .iter()
                .any(|cell| cell.modifier.contains(Modifier::CROSSED_OUT))
        );
    }

    #[test]
    fn nothing_crossed_out_without_done_items() {
        let state = state_with(
            r#"{"steps":[],"plan":[{"id":1,"description":"Think","status":"in_progress"}]}"#,
        );
        let buf = render(&state);
        assert!(text(&buf).contains("[ ] Think"));
        assert!(
            !buf.content
                .iter()
                .any(|cell| cell.modifier.contains(Modifier::CROSSED_OUT))
        );
    }

    #[test]
    fn modal_shows_options() {
        let state = state_with(
            r#"{"steps":[],"plan":[],"ui_action":{"type":"confirm","title":"Confirm move","message":"Move 3 files?","options":["Yes","No"]}}"#,
        );
        let screen = text(&render(&state));
        assert!(screen.contains("Confirm move"));
        assert!(screen.contains("Move 3 files?"));
        assert!(screen.contains("[ Yes ]"));
        assert!(screen.contains("[ No ]"));
        assert!(screen.contains("Enter Confirm"));
    }

    #[test]
    fn free_text_modal_points_at_input() {
        let state = state_with(
            r#"{"steps":[],"plan":[],"ui_action":{"type":"input","message":"Which folder?"}}"#,
        );
        let screen = text(&render(&state));
        assert!(screen.contains("Agent needs input"));
        assert!(screen.contains("type your answer below"));
    }

    #[test]
    fn header_and_footer_reflect_connection_and_notices() {
        let mut state = state_with(WORKING);
        state.connection = ConnectionStatus::Reconnecting {
            attempt: 2,
            delay: Duration::from_secs(1),
        };
        state.recording = true;
        state.push_notice(Notification::error("not delivered: timeout"));
        let screen = text(&render(&state));
        assert!(screen.contains("reconnecting in 1.0s (attempt 2)"));
        assert!(screen.contains("● REC"));
        assert!(screen.contains("not delivered: timeout"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let state = state_with(WORKING);
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw_ui(frame.area(), frame.buffer_mut(), &state))
            .unwrap();
    }

    #[test]
    fn modal_width_scales_without_overflow() {
        assert_eq!(modal_width(100), 60);
        assert_eq!(modal_width(40), 30);
        assert_eq!(modal_width(20), 20);
        assert_eq!(modal_width(30_000), 18_000);
        assert_eq!(modal_width(u16::MAX), 39_321);
    }

    #[test]
    fn icons_follow_action() {
        assert_eq!(action_icon(Some("fs_move")), "📂");
        assert_eq!(action_icon(Some("kg_search")), "🔍");
        assert_eq!(action_icon(Some("ask_user")), "❓");
        assert_eq!(action_icon(Some("summarize")), "⚙");
        assert_eq!(action_icon(None), "⚙");
    }
}
