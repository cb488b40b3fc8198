//! # InputBox Component
//!
//! Multi-line text input. Enter submits, Shift+Enter (or Ctrl+J) inserts a
//! line break, and the box grows up to `MAX_VISIBLE_LINES` before scrolling
//! internally.
//!
//! Text is hard-wrapped by display width rather than at word boundaries, so
//! every byte of the buffer maps to exactly one screen cell and the cursor
//! position can be computed without approximation.
//!
//! The `disabled` prop mirrors the request phase: while a reply is pending,
//! keystrokes are ignored and no cursor is shown.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
/// Content rows shown before the box scrolls internally
pub const MAX_VISIBLE_LINES: u16 = 5;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed on non-blank text; the buffer has been cleared.
    Submit(String),
    ContentChanged,
}

/// A byte range of the buffer that occupies one screen row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Row {
    start: usize,
    end: usize,
}

/// Splits `text` into screen rows no wider than `width` cells.
/// Always returns at least one row.
fn layout_rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut start = line_start;
        let mut used = 0;
        for (i, c) in line.char_indices() {
            let w = c.width().unwrap_or(0);
            if used + w > width && used > 0 {
                rows.push(Row {
                    start,
                    end: line_start + i,
                });
                start = line_start + i;
                used = 0;
            }
            used += w;
        }
        rows.push(Row {
            start,
            end: line_start + line.len(),
        });
        line_start += line.len() + 1;
    }
    rows
}

fn display_width(s: &str) -> u16 {
    s.chars()
        .map(|c| c.width().unwrap_or(0) as u16)
        .fold(0, u16::saturating_add)
}

/// Rows visible at once, as an index-sized count.
const VISIBLE_ROWS: usize = MAX_VISIBLE_LINES as usize;

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

pub struct InputBox {
    pub buffer: String,
    /// Ignore all input while true (Prop)
    pub disabled: bool,
    /// Cursor as a byte offset into `buffer`
    cursor: usize,
    /// First visible row when the content is taller than the box
    scroll_offset: usize,
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
            disabled: false,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    fn inner_width(area_width: u16) -> u16 {
        area_width.saturating_sub(HORIZONTAL_OVERHEAD)
    }

    /// Box height for the current buffer at `area_width`, borders included.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = layout_rows(&self.buffer, Self::inner_width(area_width)).len();
        rows.clamp(1, VISIBLE_ROWS) as u16 + VERTICAL_OVERHEAD
    }

    /// (row, column) of the cursor within the wrapped text.
    fn cursor_cell(&self, rows: &[Row]) -> (usize, u16) {
        let idx = rows
            .iter()
            .rposition(|r| r.start <= self.cursor)
            .unwrap_or(0);
        let row = rows[idx];
        let col_end = self.cursor.min(row.end);
        (idx, display_width(&self.buffer[row.start..col_end]))
    }

    fn keep_cursor_visible(&mut self, cursor_row: usize, total_rows: usize) {
        if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if cursor_row >= self.scroll_offset + VISIBLE_ROWS {
            self.scroll_offset = cursor_row + 1 - VISIBLE_ROWS;
        }
        let max_scroll = total_rows.saturating_sub(VISIBLE_ROWS);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = layout_rows(&self.buffer, Self::inner_width(area.width));
        let (cursor_row, cursor_col) = self.cursor_cell(&rows);
        self.keep_cursor_visible(cursor_row, rows.len());

        let lines: Vec<Line> = rows
            .iter()
            .skip(self.scroll_offset)
            .take(VISIBLE_ROWS)
            .map(|r| Line::raw(&self.buffer[r.start..r.end]))
            .collect();

        let (title, style) = if self.disabled {
            ("Waiting for reply...", Style::default().fg(Color::DarkGray))
        } else {
            ("Message", Style::default().fg(Color::Green))
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .padding(Padding::horizontal(1));

        frame.render_widget(Paragraph::new(lines).block(block).style(style), area);

        if !self.disabled {
            // Border + padding before the first content cell
            let x = area.x.saturating_add(2).saturating_add(cursor_col);
            let y = area
                .y
                .saturating_add(1)
                .saturating_add(cursor_row.saturating_sub(self.scroll_offset) as u16);
            let max_x = area.right().saturating_sub(2);
            frame.set_cursor_position((x.min(max_x), y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                let mut utf8 = [0u8; 4];
                self.insert(c.encode_utf8(&mut utf8));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Normalize CRLF from some terminals' bracketed paste
                self.insert(&text.replace("\r\n", "\n").replace('\r', "\n"));
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
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit if !self.buffer.trim().is_empty() => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll_offset = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
