//! # TUI Components
//!
//! ```text
//! components/
//! ├── title_bar.rs     (app name, backend, status)
//! ├── landing.rs       (welcome placeholder for an empty conversation)
//! ├── message.rs       (one message box + typing indicator)
//! ├── message_list.rs  (scrollable conversation, layout cache)
//! └── input_box.rs     (multi-line input, disabled while sending)
//! ```
//!
//! Stateless components (`TitleBar`, `LandingPage`, `Message`) take all data
//! as props. Stateful ones keep their persistent state in `TuiState` and
//! implement `EventHandler`.

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub use input_box::{InputBox, InputEvent};
pub mod landing;
pub use landing::LandingPage;
pub mod message;
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
