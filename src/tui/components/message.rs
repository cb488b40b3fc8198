use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::message::{ChatMessage, Role};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders one chat message in a rounded box.
///
/// Assistant replies are rendered as markdown; user and system text is shown
/// verbatim so whatever the user typed is what they see.
///
/// Height is measured with `Paragraph::line_count` over the exact same
/// paragraph that `render` draws, so the parent `MessageList` can lay out
/// its scroll canvas without rendering first.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage) -> Self {
        Self { message }
    }

    /// Rows needed to draw `message` at `width`, borders included.
    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders + padding; still occupy a row
            return 1;
        }
        let lines = u16::try_from(body(message).line_count(content_width)).unwrap_or(u16::MAX);
        lines.max(1).saturating_add(VERTICAL_OVERHEAD)
    }
}

pub fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Assistant => Style::default().fg(Color::Blue),
        Role::System => Style::default().fg(Color::Yellow),
    }
}

fn base_color(role: Role) -> Color {
    role_style(role).fg.unwrap_or(Color::Reset)
}

fn body(message: &ChatMessage) -> Paragraph<'static> {
    let content = message.content.trim();
    let text = match message.role {
        Role::Assistant => markdown::render(content, base_color(message.role)),
        Role::User | Role::System => {
            Text::styled(content.to_owned(), role_style(message.role))
        }
    };
    Paragraph::new(text).wrap(Wrap { trim: false })
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = role_style(self.message.role);
        let border_style = style.add_modifier(Modifier::DIM);

        let block = Block::bordered()
            .title(self.message.role.label())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        body(self.message).render(inner, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Transient "assistant is typing" box. Never stored in the conversation.
pub struct TypingIndicator {
    /// Animation tick; selects how many dots are lit.
    pub frame: usize,
}

impl TypingIndicator {
    pub const HEIGHT: u16 = 1 + VERTICAL_OVERHEAD;
    pub const LABEL: &'static str = "typing";
}

impl Widget for TypingIndicator {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = role_style(Role::Assistant);
        let block = Block::bordered()
            .title(Role::Assistant.label())
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .title_style(style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let dots = ".".repeat(self.frame % 3 + 1);
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(format!("{}{}", Self::LABEL, dots))
            .style(style.add_modifier(Modifier::ITALIC))
            .render(inner, buf);
    }
}
