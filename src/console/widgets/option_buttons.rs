use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::theme;

/// A horizontal row of choices with one highlighted.
pub struct OptionButtons<'a> {
    pub options: &'a [String],
    pub selected: usize,
}

impl<'a> OptionButtons<'a> {
    pub fn new(options: &'a [String], selected: usize) -> Self {
        Self { options, selected }
    }
}

impl Widget for OptionButtons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || self.options.is_empty() {
            return;
        }

        let mut spans = Vec::with_capacity(self.options.len() * 2);
        for (idx, option) in self.options.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if idx == self.selected {
                theme::button_selected_style()
            } else {
                theme::button_style()
            };
            spans.push(Span::styled(format!("[ {option} ]"), style));
        }
        Line::from(spans).centered().render(area, buf);
    }
}
