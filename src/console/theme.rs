use ratatui::style::{Color, Modifier, Style};

pub const PRIMARY: Color = Color::Cyan;
pub const ACCENT: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const DIM: Color = Color::DarkGray;
pub const TEXT: Color = Color::White;
pub const RECORDING: Color = Color::LightRed;

pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn heading_style() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn success_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn warning_style() -> Style {
    Style::default().fg(WARNING)
}

pub fn dim_style() -> Style {
    Style::default().fg(DIM)
}

pub fn input_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn cursor_style() -> Style {
    Style::default().fg(Color::Black).bg(TEXT)
}

pub fn border_style() -> Style {
    Style::default().fg(DIM)
}

pub fn modal_border_style() -> Style {
    Style::default().fg(WARNING).add_modifier(Modifier::BOLD)
}

pub fn plan_done_style() -> Style {
    Style::default()
        .fg(DIM)
        .add_modifier(Modifier::CROSSED_OUT)
}

pub fn plan_pending_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn button_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn button_selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn recording_style() -> Style {
    Style::default().fg(RECORDING).add_modifier(Modifier::BOLD)
}

pub fn keybinding_style() -> Style {
    Style::default().fg(DIM)
}
