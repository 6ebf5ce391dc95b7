use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::StoreError;

/// Open (creating if needed) a session database at `path` and make sure the
/// `entries` table exists. The `position` column is the collection order; the
/// id is deliberately not unique at the schema level because the store never
/// checks for duplicate adds either.
pub fn open_session(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
    }

    let conn = Connection::open(path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            position INTEGER PRIMARY KEY,
            id TEXT NOT NULL,
            control_number INTEGER NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            jersey_number TEXT NOT NULL,
            grade TEXT NOT NULL,
            school TEXT NOT NULL,
            sport TEXT NOT NULL,
            team TEXT NOT NULL,
            parent_first_name TEXT NOT NULL,
            parent_last_name TEXT NOT NULL,
            parent_phone TEXT NOT NULL,
            parent_email TEXT NOT NULL,
            eight_by_ten TEXT NOT NULL,
            team_photo TEXT NOT NULL,
            silver_package TEXT NOT NULL,
            digital_copy TEXT NOT NULL,
            banner TEXT NOT NULL,
            flex TEXT NOT NULL,
            frame TEXT NOT NULL,
            payment_type TEXT NOT NULL,
            payment_amount TEXT NOT NULL,
            notes TEXT NOT NULL,
            qr_image BLOB
        )",
        [],
    )?;

    Ok(conn)
}

/// Open an existing session database without creating or migrating anything.
pub fn open_read_only(path: &Path) -> Result<Connection, StoreError> {
    if !path.is_file() {
        return Err(StoreError::Missing(path.to_path_buf()));
    }
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?)
}
