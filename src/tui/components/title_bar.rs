//! # TitleBar Component
//!
//! Single-line header: app name, backend address, and the current status
//! message. Stateless; every field is a prop.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub const APP_TITLE: &str = "MiniChat AI";

pub struct TitleBar {
    /// Where the client sends requests (e.g. "http://127.0.0.1:3000")
    pub backend_url: String,
    /// Transient status (e.g. "Waiting for reply...", "Chat cleared")
    pub status_message: String,
}

impl TitleBar {
    pub fn new(backend_url: String, status_message: String) -> Self {
        Self {
            backend_url,
            status_message,
        }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                APP_TITLE,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({})", self.backend_url),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::raw(self.status_message.clone()));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
