//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Request flow
//!
//! ```text
//! Enter ─► InputBox ─► Action::Submit ─► update() ─► Effect::SendRequest
//!                                                        │
//!                       tokio::spawn(BackendClient::send)◄┘
//!                                   │
//!      Action::ReplyReceived / RequestFailed ─► mpsc ─► update()
//! ```
//!
//! ## Redraw Strategy
//!
//! While a reply is pending the loop redraws every ~250ms to animate the
//! typing indicator. Otherwise it sleeps up to 500ms and only redraws on
//! input, resize, or a background result.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::api::BackendClient;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::message::ChatMessage;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const LOADING_TICK: Duration = Duration::from_millis(250);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
        }
    }
}

/// Enables mouse wheel, bracketed paste and the keyboard enhancement
/// protocol for the lifetime of the guard.
struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty protocol is what makes Shift+Enter distinguishable from Enter.
        // Terminals that don't support it ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBar,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Runs the chat client until the user quits. Must be called from inside a
/// tokio runtime; backend calls are spawned onto it.
pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new();
    let client = BackendClient::new(app.backend_url.clone());
    info!("Chat client using backend {}", client.endpoint());

    let mut terminal = ratatui::init();
    let guard = TerminalModeGuard::new();
    if let Err(e) = &guard {
        warn!("Could not enable terminal modes: {}", e);
    }

    let result = event_loop(&mut terminal, &mut app, &mut tui, &client);

    drop(guard);
    ratatui::restore();
    info!("Chat client exiting");
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    tui: &mut TuiState,
    client: &BackendClient,
) -> std::io::Result<()> {
    // Background request results come back as Actions
    let (tx, rx) = mpsc::channel::<Action>();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        tui.input_box.disabled = app.is_loading();

        if app.is_loading() {
            needs_redraw = true;
        }
        if needs_redraw {
            let tick = (start_time.elapsed().as_millis() / LOADING_TICK.as_millis()) as usize;
            terminal.draw(|f| ui::draw_ui(f, app, tui, tick))?;
            needs_redraw = false;
        }

        let timeout = if app.is_loading() { LOADING_TICK } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain everything pending before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match event {
                TuiEvent::Resize => continue,
                TuiEvent::Quit => Some(Action::Quit),
                TuiEvent::ClearChat => {
                    tui.message_list = MessageListState::new();
                    Some(Action::ClearChat)
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&event);
                    None
                }
                other => match tui.input_box.handle_event(&other) {
                    Some(InputEvent::Submit(text)) => Some(Action::Submit(text)),
                    Some(InputEvent::ContentChanged) | None => None,
                },
            };

            if let Some(action) = action
                && dispatch(app, action, client, &tx)
            {
                return Ok(());
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(app, action, client, &tx) {
                return Ok(());
            }
        }
    }
}

/// Applies an action and performs its effect. Returns true on quit.
fn dispatch(
    app: &mut App,
    action: Action,
    client: &BackendClient,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SendRequest(messages) => {
            spawn_request(client.clone(), messages, tx.clone());
            false
        }
    }
}

fn spawn_request(client: BackendClient, messages: Vec<ChatMessage>, tx: mpsc::Sender<Action>) {
    info!("Spawning backend request ({} messages)", messages.len());
    tokio::spawn(async move {
        let started = Instant::now();
        let action = match client.send(&messages).await {
            Ok(reply) => {
                info!(
                    "Backend replied in {}ms ({} chars)",
                    started.elapsed().as_millis(),
                    reply.len()
                );
                Action::ReplyReceived(reply)
            }
            Err(e) => Action::RequestFailed(e.to_string()),
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver backend result: receiver dropped");
        }
    });
}
