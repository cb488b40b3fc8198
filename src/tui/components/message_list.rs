//! # Conversation scroll view
//!
//! Scrollable view of the conversation.
//!
//! ## Architecture
//!
//! `MessageList` is rebuilt on every frame. It borrows
//! `&'a mut MessageListState` (persistent state) plus the messages and the
//! loading flag as props.
//!
//! Messages never change once appended, so their measured heights are cached
//! and only new messages are measured. The cache is dropped when the width
//! changes or the list shrinks (clear chat).
//!
//! While a request is in flight a `TypingIndicator` is drawn after the last
//! message. It is purely presentational and never enters the message list.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::ChatMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{Message, TypingIndicator};
use crate::tui::event::TuiEvent;

/// Scroll position and height cache that outlive a frame.
/// Owned by `TuiState`.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on every frame
    pub stick_to_bottom: bool,
    /// Viewport rows seen by the last render
    pub viewport_height: u16,
    /// Whether the typing indicator was part of the last layout
    shown_indicator: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            shown_indicator: false,
        }
    }

    fn max_offset(&self, canvas_height: u16) -> u16 {
        canvas_height.saturating_sub(self.viewport_height)
    }

    /// Keep the offset within the canvas after a resize or a clear.
    pub fn clamp_scroll(&mut self, canvas_height: u16) {
        let max_y = self.max_offset(canvas_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let canvas = self
            .layout
            .total_height()
            .saturating_add(self.indicator_height());
        let max_y = self.max_offset(canvas);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    fn indicator_height(&self) -> u16 {
        if self.shown_indicator {
            TypingIndicator::HEIGHT
        } else {
            0
        }
    }
}

/// The transcript, newest at the bottom.
/// Borrows the persistent state for one frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [ChatMessage],
    pub is_loading: bool,
    /// Animation tick for the typing indicator
    pub tick: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [ChatMessage],
        is_loading: bool,
        tick: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            tick,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let num_items = self.messages.len();

        // Any change to what is listed scrolls back to the newest message
        if num_items != self.state.layout.message_count
            || self.is_loading != self.state.shown_indicator
        {
            self.state.stick_to_bottom = true;
        }

        // 1. Update the layout cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(num_items, content_width);
        layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(Message::calculate_height(message, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(num_items, content_width);
        self.state.shown_indicator = self.is_loading;

        let total_height = self.state.layout.total_height();
        let canvas_height = total_height.saturating_add(self.state.indicator_height());

        // 2. Pin or clamp before choosing which messages to draw
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            let bottom = self.state.max_offset(canvas_height);
            self.state.scroll_state.set_offset(Position { x: 0, y: bottom });
        } else {
            self.state.clamp_scroll(canvas_height);
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };
        for i in visible_range {
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            scroll_view.render_widget(Message::new(&self.messages[i]), rect);
            y_offset = y_offset.saturating_add(height);
        }

        if self.is_loading {
            let rect = Rect::new(0, total_height, content_width, TypingIndicator::HEIGHT);
            scroll_view.render_widget(TypingIndicator { frame: self.tick }, rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on the state: `MessageList` is rebuilt every frame and
/// cannot hold the scroll position itself.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let upward = match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                true
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                true
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                false
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                false
            }
            _ => return None,
        };
        // Scrolling up detaches from the bottom; scrolling down may re-attach
        if upward {
            self.stick_to_bottom = false;
        } else {
            self.repin_if_at_bottom();
        }
        None
    }
}

/// Cached message heights at a given width.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running sum of `heights`; entry i is the bottom edge of message i
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
        }
    }

    /// How many leading cached heights are still valid.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Messages overlapping the viewport, padded by half a screen each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let pad = viewport_height / 2;
        let top = scroll_offset.saturating_sub(pad);
        let bottom = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(pad);

        // prefix_heights[i] is the bottom edge of message i
        let first = self.prefix_heights.partition_point(|&edge| edge <= top);
        let last = self.prefix_heights.partition_point(|&edge| edge < bottom);
        first..(last + 1).min(self.prefix_heights.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut MessageListState, messages: &[ChatMessage], loading: bool, height: u16) -> String {
        let backend = TestBackend::new(40, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, messages, loading, 0).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3; 5];
        cache.update_metadata(5, 80);

        assert_eq!(cache.reusable_count(5, 80), 5);
        // New message appended: all old heights still valid
        assert_eq!(cache.reusable_count(6, 80), 5);
        // Width changed
        assert_eq!(cache.reusable_count(5, 40), 0);
        // List shrank (cleared)
        assert_eq!(cache.reusable_count(2, 80), 0);
    }

    #[test]
    fn test_prefix_heights_and_visible_range() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3, 4, 5, 6];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.prefix_heights, vec![3, 7, 12, 18]);
        assert_eq!(cache.total_height(), 18);

        // Viewport of 4 rows at offset 8, padded by 2 each way: rows 6..14
        assert_eq!(cache.visible_range(8, 4), 1..4);
    }

    #[test]
    fn test_typing_indicator_shown_only_while_loading() {
        let messages = vec![ChatMessage::user("Hello")];
        let mut state = MessageListState::new();

        let text = draw(&mut state, &messages, true, 10);
        assert!(text.contains("Hello"));
        assert!(text.contains(TypingIndicator::LABEL));

        let text = draw(&mut state, &messages, false, 10);
        assert!(!text.contains(TypingIndicator::LABEL));
    }

    #[test]
    fn test_new_message_repins_to_bottom() {
        let mut messages: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("message {}", i)))
            .collect();
        let mut state = MessageListState::new();
        draw(&mut state, &messages, false, 6);

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        messages.push(ChatMessage::assistant("newest"));
        let text = draw(&mut state, &messages, false, 6);
        assert!(state.stick_to_bottom);
        assert!(text.contains("newest"));
    }

    #[test]
    fn test_tall_conversation_renders_without_overflow() {
        let tall = "line\n".repeat(3000);
        let messages: Vec<ChatMessage> = (0..23).map(|_| ChatMessage::user(tall.clone())).collect();
        let mut state = MessageListState::new();

        draw(&mut state, &messages, true, 20);

        assert_eq!(state.layout.total_height(), u16::MAX);
        assert!(state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, u16::MAX - 20);
    }

    #[test]
    fn test_scroll_down_at_bottom_repins() {
        let messages: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("message {}", i)))
            .collect();
        let mut state = MessageListState::new();
        draw(&mut state, &messages, false, 6);

        state.handle_event(&TuiEvent::ScrollUp);
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }
}
