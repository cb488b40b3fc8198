use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Props are struct fields; persistent state is borrowed in (`&mut State`)
/// so the component itself can be rebuilt every frame.
///
/// `render` takes `&mut self` so components can update caches (message
/// heights, scroll offsets) during the render pass, in the spirit of
/// ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
