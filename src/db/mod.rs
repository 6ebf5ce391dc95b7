//! Persistence for the registration session, split across logical submodules.

mod connection;
mod entries;

pub use connection::{open_read_only, open_session};
pub use entries::{read_session, write_session};
