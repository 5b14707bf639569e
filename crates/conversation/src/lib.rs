//! Conversation engine for gymbot.
//!
//! - **format**: renders schedules as text
//! - **input**: resolves raw text into commands or free text
//! - **menu**: button labels and keyboard builders
//! - **state**: per-user dialogue states
//! - **machine**: the pure transition function
//! - **controller**: per-user session table, storage I/O around transitions
//! - **dispatcher**: channel message loop, one task per event

pub mod controller;
pub mod dispatcher;
pub mod format;
pub mod input;
pub mod machine;
pub mod menu;
pub mod state;

pub use controller::SessionController;
pub use dispatcher::Dispatcher;
pub use format::Formatter;
pub use input::{Command, Input};
pub use machine::{Outcome, Transition, transition};
pub use state::{ConvState, EditFlow};
