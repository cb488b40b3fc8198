//! # Landing Page Component
//!
//! Welcome placeholder shown while the conversation is empty.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub const WELCOME_HEADING: &str = "Welcome to MiniChat AI";
pub const WELCOME_HINT: &str = "Start a conversation by typing a message below";

pub struct LandingPage;

impl Component for LandingPage {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                WELCOME_HEADING,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                WELCOME_HINT,
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Enter to send · Shift+Enter for a new line · Ctrl+L to clear · Esc to quit",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )),
        ];

        // Center the block vertically
        let [text_area] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            text_area,
        );
    }
}
