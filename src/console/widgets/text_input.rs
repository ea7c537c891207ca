use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::theme;

/// Single-line command input. `cursor` is a byte offset on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(initial: &str) -> Self {
        Self {
            value: initial.to_string(),
            cursor: initial.len(),
        }
    }

    pub fn insert(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.value.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.value.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Blank or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Hand the current text over and leave the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
    }
}

/// Renders a `TextInput` on one line, highlighting the cursor cell when
/// focused and showing `placeholder` while empty.
pub struct TextInputWidget<'a> {
    pub input: &'a TextInput,
    pub prompt: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
}

impl<'a> TextInputWidget<'a> {
    pub fn new(input: &'a TextInput, prompt: &'a str, focused: bool) -> Self {
        Self {
            input,
            prompt,
            placeholder: "",
            focused,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for TextInputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 4 {
            return;
        }

        let prompt_style = if self.focused {
            theme::selected_style()
        } else {
            theme::dim_style()
        };
        let mut spans = vec![Span::styled(format!("{} ", self.prompt), prompt_style)];

        if self.input.value.is_empty() {
            if self.focused {
                spans.push(Span::styled(" ", theme::cursor_style()));
            }
            spans.push(Span::styled(self.placeholder, theme::dim_style()));
        } else if self.focused {
            let (before, at_cursor, after) = split_at_cursor(&self.input.value, self.input.cursor);
            spans.push(Span::styled(before, theme::input_style()));
            spans.push(Span::styled(at_cursor, theme::cursor_style()));
            spans.push(Span::styled(after, theme::input_style()));
        } else {
            spans.push(Span::styled(self.input.value.as_str(), theme::dim_style()));
        }

        Line::from(spans).render(area, buf);
    }
}

fn split_at_cursor(value: &str, cursor: usize) -> (String, String, String) {
    let cursor = cursor.min(value.len());
    let (before, rest) = value.split_at(cursor);
    let mut rest_chars = rest.chars();
    let at = rest_chars.next().map_or_else(|| " ".to_string(), String::from);
    (before.to_string(), at, rest_chars.collect())
}
