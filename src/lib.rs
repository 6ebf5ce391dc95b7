//! Core library surface for the Team Roster Manager.
//!
//! The session store is the heart of the crate: an ordered collection of
//! registration entries that persists to a single SQLite session file and
//! renders CSV exports and printable rosters. The terminal UI in [`ui`] is a
//! thin collaborator layered on top of the same public API.
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod qr;
pub mod store;
pub mod ui;

pub use config::Config;
pub use error::StoreError;
pub use export::{full_csv, roster_csv, RosterOrder};
pub use logging::init_logging;

/// The domain types other layers manipulate.
pub use models::{Entry, EntryId};

/// The session store and the events it publishes.
pub use store::{SessionStore, StoreEvent, SubscriptionId};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
