use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::connection::{open_read_only, open_session};
use crate::error::StoreError;
use crate::models::{Entry, EntryId};

const SELECT_ENTRIES: &str = "SELECT id, control_number, first_name, last_name, jersey_number,
        grade, school, sport, team, parent_first_name, parent_last_name, parent_phone,
        parent_email, eight_by_ten, team_photo, silver_package, digital_copy, banner, flex,
        frame, payment_type, payment_amount, notes, qr_image
     FROM entries
     ORDER BY position";

const INSERT_ENTRY: &str = "INSERT INTO entries (position, id, control_number, first_name,
        last_name, jersey_number, grade, school, sport, team, parent_first_name,
        parent_last_name, parent_phone, parent_email, eight_by_ten, team_photo,
        silver_package, digital_copy, banner, flex, frame, payment_type, payment_amount,
        notes, qr_image)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
        ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)";

/// Read the whole persisted collection in its saved order.
pub fn read_session(path: &Path) -> Result<Vec<Entry>, StoreError> {
    let conn = open_read_only(path)?;
    let mut stmt = conn.prepare(SELECT_ENTRIES)?;

    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Replace the persisted collection with `entries`. The document is built in a
/// sibling temp file and renamed over `path`, so a failed write never leaves a
/// half-written session behind and prior content is always fully replaced.
pub fn write_session(path: &Path, entries: &[Entry]) -> Result<(), StoreError> {
    let temp = temp_path(path);
    remove_stale(&temp)?;

    {
        let mut conn = open_session(&temp)?;
        insert_entries(&mut conn, entries)?;
    }

    fs::rename(&temp, path).map_err(|err| {
        let _ = fs::remove_file(&temp);
        StoreError::io(path, err)
    })
}

fn insert_entries(conn: &mut Connection, entries: &[Entry]) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(INSERT_ENTRY)?;
        for (position, entry) in entries.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                entry.id().to_string(),
                entry.control_number,
                entry.first_name,
                entry.last_name,
                entry.jersey_number,
                entry.grade,
                entry.school,
                entry.sport,
                entry.team,
                entry.parent_first_name,
                entry.parent_last_name,
                entry.parent_phone,
                entry.parent_email,
                entry.eight_by_ten,
                entry.team_photo,
                entry.silver_package,
                entry.digital_copy,
                entry.banner,
                entry.flex,
                entry.frame,
                entry.payment_type,
                entry.payment_amount,
                entry.notes,
                entry.qr_image,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let raw_id: String = row.get(0)?;
    let id = EntryId::parse(&raw_id)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;

    let mut entry = Entry::with_id(id, row.get(1)?);
    entry.first_name = row.get(2)?;
    entry.last_name = row.get(3)?;
    entry.jersey_number = row.get(4)?;
    entry.grade = row.get(5)?;
    entry.school = row.get(6)?;
    entry.sport = row.get(7)?;
    entry.team = row.get(8)?;
    entry.parent_first_name = row.get(9)?;
    entry.parent_last_name = row.get(10)?;
    entry.parent_phone = row.get(11)?;
    entry.parent_email = row.get(12)?;
    entry.eight_by_ten = row.get(13)?;
    entry.team_photo = row.get(14)?;
    entry.silver_package = row.get(15)?;
    entry.digital_copy = row.get(16)?;
    entry.banner = row.get(17)?;
    entry.flex = row.get(18)?;
    entry.frame = row.get(19)?;
    entry.payment_type = row.get(20)?;
    entry.payment_amount = row.get(21)?;
    entry.notes = row.get(22)?;
    entry.qr_image = row.get(23)?;
    Ok(entry)
}

/// `session.sqlite` -> `session.sqlite.tmp`, next to the real file.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("session"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn remove_stale(temp: &Path) -> Result<(), StoreError> {
    match fs::remove_file(temp) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StoreError::io(temp, err)),
    }
}
