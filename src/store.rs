//! The session store: the ordered, in-memory collection of registrations plus
//! its persistence lifecycle and exports.
//!
//! Caller-facing operations never fail. `load` leaves the collection alone
//! when nothing usable is on disk, `save` (and therefore `add`/`update`) only
//! logs write failures, and exports report failure as `None`. Each of those
//! wraps a `try_*` counterpart returning [`StoreError`] so the failure path
//! stays testable. Observers registered through [`SessionStore::subscribe`]
//! hear about every load, mutation and save outcome.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::db::{read_session, write_session};
use crate::error::StoreError;
use crate::export::{full_csv, roster_csv, RosterOrder};
use crate::models::{Entry, EntryId};

/// File name of the full registration export.
pub const CSV_FILE_NAME: &str = "registrations.csv";
/// File name of the roster sorted by jersey number.
pub const ROSTER_BY_NUMBER_FILE_NAME: &str = "roster_by_number.csv";
/// File name of the roster sorted by grade.
pub const ROSTER_BY_GRADE_FILE_NAME: &str = "roster_by_grade.csv";

/// Something observers may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The collection was replaced from durable storage.
    Loaded { count: usize },
    Added(EntryId),
    Updated(EntryId),
    Saved,
    /// A save failed; the in-memory collection is unaffected.
    SaveFailed(String),
}

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// In-memory registrations backed by a single session file.
pub struct SessionStore {
    entries: Vec<Entry>,
    next_control_number: i64,
    session_file: PathBuf,
    export_dir: PathBuf,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
}

impl SessionStore {
    /// Create an empty store. Nothing is read from `session_file` until
    /// [`SessionStore::load`] runs.
    pub fn new(session_file: impl Into<PathBuf>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            next_control_number: 1,
            session_file: session_file.into(),
            export_dir: export_dir.into(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One past the highest control number currently held, or 1 when empty.
    pub fn next_control_number(&self) -> i64 {
        self.next_control_number
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// A blank registration pre-numbered with the next control number.
    pub fn draft(&self) -> Entry {
        Entry::new(self.next_control_number)
    }

    /// Register a callback for store events.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    /// Replace the collection with the persisted session. A missing or
    /// unreadable session file leaves the current collection untouched.
    pub fn load(&mut self) {
        if let Err(err) = self.try_load() {
            match err {
                StoreError::Missing(path) => {
                    debug!(path = %path.display(), "no saved session to resume");
                }
                other => {
                    warn!(
                        path = %self.session_file.display(),
                        error = %error_chain(&other),
                        "could not read saved session"
                    );
                }
            }
        }
    }

    /// Like [`SessionStore::load`], but reports why nothing was loaded.
    /// Returns the number of entries now held.
    pub fn try_load(&mut self) -> Result<usize, StoreError> {
        let entries = read_session(&self.session_file)?;
        let count = entries.len();

        self.entries = entries;
        self.recompute_next_control_number();
        info!(count, path = %self.session_file.display(), "session loaded");
        self.notify(StoreEvent::Loaded { count });

        Ok(count)
    }

    /// Persist the whole collection, overwriting the session file. Failures
    /// are logged and announced to observers, never returned.
    pub fn save(&mut self) {
        match self.try_save() {
            Ok(()) => self.notify(StoreEvent::Saved),
            Err(err) => {
                let message = error_chain(&err);
                error!(
                    path = %self.session_file.display(),
                    error = %message,
                    "failed to save session"
                );
                self.notify(StoreEvent::SaveFailed(message));
            }
        }
    }

    /// Like [`SessionStore::save`], but returns the failure instead of
    /// logging it. Observers are not notified.
    pub fn try_save(&self) -> Result<(), StoreError> {
        write_session(&self.session_file, &self.entries)?;
        debug!(
            count = self.entries.len(),
            path = %self.session_file.display(),
            "session saved"
        );
        Ok(())
    }

    /// Append `entry` and persist. Duplicate ids or control numbers are not
    /// checked.
    pub fn add(&mut self, entry: Entry) {
        let id = entry.id();
        self.entries.push(entry);
        self.recompute_next_control_number();
        self.notify(StoreEvent::Added(id));
        self.save();
    }

    /// Replace the entry sharing `entry`'s id, in place, and persist. Unknown
    /// ids are ignored; update never inserts.
    pub fn update(&mut self, entry: Entry) {
        let id = entry.id();
        let Some(slot) = self.entries.iter_mut().find(|existing| existing.id() == id) else {
            debug!(%id, "update ignored, no entry with that id");
            return;
        };

        *slot = entry;
        self.recompute_next_control_number();
        self.notify(StoreEvent::Updated(id));
        self.save();
    }

    /// Write the full CSV export, returning its path, or `None` on failure.
    pub fn export_csv(&self) -> Option<PathBuf> {
        log_export(self.try_export_csv())
    }

    /// Write the roster sorted by jersey number (as text).
    pub fn roster_by_number(&self) -> Option<PathBuf> {
        log_export(self.try_roster_by_number())
    }

    /// Write the roster sorted by grade (as text).
    pub fn roster_by_grade(&self) -> Option<PathBuf> {
        log_export(self.try_roster_by_grade())
    }

    pub fn try_export_csv(&self) -> Result<PathBuf, StoreError> {
        self.write_export(CSV_FILE_NAME, &full_csv(&self.entries))
    }

    pub fn try_roster_by_number(&self) -> Result<PathBuf, StoreError> {
        self.write_export(
            ROSTER_BY_NUMBER_FILE_NAME,
            &roster_csv(&self.entries, RosterOrder::JerseyNumber),
        )
    }

    pub fn try_roster_by_grade(&self) -> Result<PathBuf, StoreError> {
        self.write_export(
            ROSTER_BY_GRADE_FILE_NAME,
            &roster_csv(&self.entries, RosterOrder::Grade),
        )
    }

    fn write_export(&self, file_name: &str, contents: &str) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.export_dir)
            .map_err(|err| StoreError::io(&self.export_dir, err))?;

        let path = self.export_dir.join(file_name);
        fs::write(&path, contents).map_err(|err| StoreError::io(&path, err))?;
        Ok(path)
    }

    fn recompute_next_control_number(&mut self) {
        self.next_control_number = self
            .entries
            .iter()
            .map(|entry| entry.control_number)
            .max()
            .map_or(1, |max| max.saturating_add(1));
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

fn log_export(result: Result<PathBuf, StoreError>) -> Option<PathBuf> {
    match result {
        Ok(path) => {
            info!(path = %path.display(), "export written");
            Some(path)
        }
        Err(err) => {
            error!(error = %error_chain(&err), "export failed");
            None
        }
    }
}

/// Flatten an error and its sources into one line for logs and status text.
fn error_chain(err: &StoreError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
