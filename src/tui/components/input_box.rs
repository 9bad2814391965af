//! # InputBox Component
//!
//! Multi-line free-text editor shown while the session accepts free text.
//!
//! The buffer and cursor are internal state. `read_only` is a prop set by the
//! parent while an exchange is in flight: the pending text stays visible but
//! edits are ignored. Submitting does not clear the buffer; the parent replaces
//! it with the controller's draft once the exchange finishes.
//!
//! Text is hard-wrapped at the inner width by display columns, so every byte
//! offset in the buffer maps to exactly one screen cell.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
const MAX_VISIBLE_LINES: u16 = 5;
/// Offset from area edge to content (border + padding)
const CONTENT_OFFSET_X: u16 = 2;
const CONTENT_OFFSET_Y: u16 = 1;

const DEFAULT_WIDTH: u16 = 80;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User pressed Enter on a non-blank buffer
    Submit(String),
    /// Text content changed
    ContentChanged,
}

/// One wrapped screen row: a byte range of the buffer, excluding any newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Row {
    start: usize,
    end: usize,
}

fn char_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    textwrap::core::display_width(c.encode_utf8(&mut buf))
}

/// Hard-wrap `text` into rows of at most `width` display columns.
/// Always returns at least one row; an empty logical line is one empty row.
fn wrap_rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut used = 0;
        for (offset, c) in line.char_indices() {
            let w = char_width(c);
            if used + w > width && used > 0 {
                rows.push(Row {
                    start: row_start,
                    end: line_start + offset,
                });
                row_start = line_start + offset;
                used = 0;
            }
            used += w;
        }
        rows.push(Row {
            start: row_start,
            end: line_start + line.len(),
        });
        line_start += line.len() + 1;
    }
    rows
}

/// Row count as a screen height, saturating at `u16::MAX`.
fn row_count(rows: &[Row]) -> u16 {
    u16::try_from(rows.len()).unwrap_or(u16::MAX)
}

/// Index of the row holding the cursor at byte offset `pos`.
fn row_of(rows: &[Row], pos: usize) -> usize {
    rows.iter()
        .rposition(|row| row.start <= pos)
        .unwrap_or(0)
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

/// Multi-line text input.
pub struct InputBox {
    buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// First visible wrapped row
    scroll_offset: u16,
    /// Inner width from the last render, used for vertical cursor movement
    last_inner_width: u16,
    /// Prop: ignore edits and dim the text
    pub read_only: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            last_inner_width: DEFAULT_WIDTH - HORIZONTAL_OVERHEAD,
            read_only: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer, placing the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
        self.scroll_offset = 0;
    }

    /// Required height for the current buffer, clamped to the visible line limit.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        let rows = row_count(&wrap_rows(&self.buffer, inner));
        rows.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn update_scroll_offset(&mut self, cursor_row: u16, total_rows: u16) {
        if total_rows <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
        } else if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if cursor_row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = cursor_row.saturating_add(1) - MAX_VISIBLE_LINES;
        }
    }

    /// Move the cursor one row up or down, keeping its display column.
    fn move_vertically(&mut self, down: bool) -> bool {
        let rows = wrap_rows(&self.buffer, self.last_inner_width);
        let current = row_of(&rows, self.cursor);
        let target = match (down, current) {
            (false, 0) => return false,
            (false, i) => i - 1,
            (true, i) if i + 1 >= rows.len() => return false,
            (true, i) => i + 1,
        };
        let column: usize = self.buffer[rows[current].start..self.cursor]
            .chars()
            .map(char_width)
            .sum();

        let Row { start, end } = rows[target];
        let mut pos = start;
        let mut used = 0;
        for (offset, c) in self.buffer[start..end].char_indices() {
            let w = char_width(c);
            if used + w > column {
                break;
            }
            used += w;
            pos = start + offset + c.len_utf8();
        }
        self.cursor = pos;
        true
    }

    fn edit(&mut self, event: &TuiEvent) -> Option<InputEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Terminals deliver pasted line breaks as \r
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            _ => None,
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        self.last_inner_width = inner.max(1);

        let rows = wrap_rows(&self.buffer, inner);
        let cursor_row = row_of(&rows, self.cursor);
        let cursor_row_u16 = u16::try_from(cursor_row).unwrap_or(u16::MAX);
        self.update_scroll_offset(cursor_row_u16, row_count(&rows));

        let visible: Vec<Line> = rows
            .iter()
            .skip(self.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(|row| Line::raw(self.buffer[row.start..row.end].to_string()))
            .collect();

        let (title, text_style) = if self.read_only {
            (
                " Sending… ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::DIM),
            )
        } else {
            (
                " Message (Enter to send, Ctrl+J for newline) ",
                Style::default().fg(Color::Green),
            )
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .padding(Padding::horizontal(1));
        frame.render_widget(Paragraph::new(visible).style(text_style).block(block), area);

        if !self.read_only {
            let row = rows[cursor_row];
            let column: usize = self.buffer[row.start..self.cursor]
                .chars()
                .map(char_width)
                .sum();
            let max_x = area.right().saturating_sub(CONTENT_OFFSET_X);
            let x = (area.x + CONTENT_OFFSET_X).saturating_add(column as u16).min(max_x);
            let y = area.y + CONTENT_OFFSET_Y + cursor_row_u16.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.read_only {
            return None;
        }
        match event {
            TuiEvent::Submit => {
                (!self.buffer.trim().is_empty()).then(|| InputEvent::Submit(self.buffer.clone()))
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                None
            }
            TuiEvent::CursorUp => {
                self.move_vertically(false);
                None
            }
            TuiEvent::CursorDown => {
                self.move_vertically(true);
                None
            }
            other => self.edit(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(input: &mut InputBox, text: &str) {
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = InputBox::new();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        type_str(&mut input, "bc");
        assert_eq!(input.text(), "abc");

        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.text(), "ab");
    }

    #[test]
    fn backspace_at_start_is_a_no_op() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn edits_respect_multibyte_chars() {
        let mut input = InputBox::new();
        type_str(&mut input, "héllo");
        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::CursorRight);
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.text(), "hllo");
    }

    #[test]
    fn submit_keeps_buffer() {
        let mut input = InputBox::new();
        type_str(&mut input, "hello");
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("hello".to_string()))
        );
        assert_eq!(input.text(), "hello");
    }

    #[test]
    fn blank_buffer_is_not_submitted() {
        let mut input = InputBox::new();
        type_str(&mut input, "  \n ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn read_only_ignores_edits_and_submit() {
        let mut input = InputBox::new();
        input.set_text("pending");
        input.read_only = true;
        assert_eq!(input.handle_event(&TuiEvent::InputChar('x')), None);
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.text(), "pending");
    }

    #[test]
    fn paste_normalizes_carriage_returns() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\r\nb\rc".to_string()));
        assert_eq!(input.text(), "a\nb\nc");
    }

    #[test]
    fn set_text_moves_cursor_to_end() {
        let mut input = InputBox::new();
        input.set_text("abc");
        type_str(&mut input, "d");
        assert_eq!(input.text(), "abcd");
        input.set_text("");
        assert_eq!(input.text(), "");
    }

    #[test]
    fn wrap_rows_splits_lines_and_width() {
        let rows = wrap_rows("abcdef\n\nxy", 4);
        assert_eq!(
            rows,
            vec![
                Row { start: 0, end: 4 },
                Row { start: 4, end: 6 },
                Row { start: 7, end: 7 },
                Row { start: 8, end: 10 },
            ]
        );
    }

    #[test]
    fn cursor_at_row_boundary_belongs_to_next_row() {
        let rows = wrap_rows("abcdef", 4);
        assert_eq!(row_of(&rows, 4), 1);
        assert_eq!(row_of(&rows, 3), 0);
    }

    #[test]
    fn height_grows_then_clamps() {
        let mut input = InputBox::new();
        assert_eq!(input.calculate_height(40), 1 + VERTICAL_OVERHEAD);
        input.set_text("a\nb\nc");
        assert_eq!(input.calculate_height(40), 3 + VERTICAL_OVERHEAD);
        input.set_text("1\n2\n3\n4\n5\n6\n7\n8");
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn huge_paste_keeps_height_clamped() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste(vec!["x"; 70_000].join("\n")));
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
        assert_eq!(row_count(&wrap_rows(input.text(), 36)), u16::MAX);
    }

    #[test]
    fn vertical_movement_keeps_column() {
        let mut input = InputBox::new();
        input.set_text("abcd\nxy\nlonger");
        // Cursor at end of "longer" (column 6) → up lands at end of "xy"
        input.handle_event(&TuiEvent::CursorUp);
        type_str(&mut input, "!");
        assert_eq!(input.text(), "abcd\nxy!\nlonger");
        input.handle_event(&TuiEvent::CursorUp);
        input.handle_event(&TuiEvent::CursorHome);
        type_str(&mut input, ">");
        assert_eq!(input.text(), ">abcd\nxy!\nlonger");
    }

    #[test]
    fn render_shows_text_and_hint() {
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        let mut input = InputBox::new();
        input.set_text("build a blog");
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("build a blog"));
        assert!(text.contains("Enter to send"));
    }
}
