use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures inside the session store. Callers of the fire-and-forget store API
/// never see these; they surface through the `try_*` methods, the log, and
/// [`crate::StoreEvent::SaveFailed`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file {0} does not exist")]
    Missing(PathBuf),

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session database error")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
