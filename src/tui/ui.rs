use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{LandingPage, MessageList, TitleBar};

/// Lays out the whole screen: title bar, conversation (or the welcome
/// placeholder while it is empty), and the input box.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, tick: usize) {
    use Constraint::{Length, Min};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let [title_area, main_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(input_height)]).areas(frame.area());

    TitleBar::new(app.backend_url.clone(), app.status_message.clone()).render(frame, title_area);

    if app.conversation.is_empty() {
        LandingPage.render(frame, main_area);
    } else {
        MessageList::new(
            &mut tui.message_list,
            app.conversation.messages(),
            app.is_loading(),
            tick,
        )
        .render(frame, main_area);
    }

    tui.input_box.render(frame, input_area);
}
