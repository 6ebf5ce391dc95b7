//! Ratatui front-end for the registration session. It only ever talks to the
//! [`crate::SessionStore`] through its public operations: the session list,
//! the registration/edit form, the QR preview, and the export screen.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
