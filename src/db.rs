use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use rusqlite::{params, Connection};

use crate::docs;
use crate::models::{JobRecord, JobStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";
const COLUMNS: &str = "id, status, position, link, date, cover_letter, notes, folder";

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            StoreError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Sqlite(value)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Io(value)
    }
}

/// SQLite-backed job application store for the desktop variant.
///
/// Rows carry a durable surrogate id; each application additionally owns a
/// document folder under `docs_root`, created at insert time and removed
/// (best-effort) together with the row.
pub struct JobStore {
    conn: Connection,
    docs_root: PathBuf,
}

impl JobStore {
    pub fn open(db_path: &Path, docs_root: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn, docs_root };
        store.bootstrap()?;
        Ok(store)
    }

    pub fn in_memory(docs_root: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, docs_root };
        store.bootstrap()?;
        Ok(store)
    }

    fn bootstrap(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                status TEXT NOT NULL,
                position TEXT NOT NULL,
                link TEXT NOT NULL,
                date TEXT NOT NULL,
                cover_letter TEXT NOT NULL,
                notes TEXT NOT NULL,
                folder TEXT
            )",
            (),
        )?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<JobRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM jobs ORDER BY id"))?;
        let rows = stmt.query_map((), |row| map_row(row))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn get(&self, id: i64) -> Result<Option<JobRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM jobs WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], |row| map_row(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Inserts a new application. Status starts at `In Progress`, the date
    /// is fixed to today, and a document folder is created up front. If the
    /// folder cannot be created the row is still inserted with no folder.
    pub fn add(
        &self,
        position: &str,
        link: &str,
        cover_letter: bool,
        notes: &str,
    ) -> Result<JobRecord, StoreError> {
        let now = Local::now();
        let date = now.date_naive();
        let folder = self.create_document_folder(position, now);
        self.conn.execute(
            "INSERT INTO jobs (status, position, link, date, cover_letter, notes, folder)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                JobStatus::InProgress.as_str(),
                position,
                link,
                date.format(DATE_FORMAT).to_string(),
                encode_cover_letter(cover_letter),
                notes,
                folder.as_ref().map(|p| p.to_string_lossy().to_string()),
            ],
        )?;
        Ok(JobRecord {
            id: self.conn.last_insert_rowid(),
            status: JobStatus::InProgress,
            position: position.to_string(),
            link: link.to_string(),
            date,
            cover_letter,
            notes: notes.to_string(),
            folder,
        })
    }

    // An unmatched id matches zero rows in each of the setters below;
    // deliberately not reported.

    pub fn set_status(&self, id: i64, status: JobStatus) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE jobs SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(())
    }

    pub fn set_cover_letter(&self, id: i64, cover_letter: bool) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE jobs SET cover_letter = ?1 WHERE id = ?2",
            params![encode_cover_letter(cover_letter), id],
        )?;
        Ok(())
    }

    pub fn set_notes(&self, id: i64, notes: &str) -> Result<(), StoreError> {
        self.conn
            .execute("UPDATE jobs SET notes = ?1 WHERE id = ?2", params![notes, id])?;
        Ok(())
    }

    /// Removes the row and, best-effort, its document folder. A folder that
    /// is already gone (or fails to delete) never blocks the row deletion.
    pub fn remove(&self, id: i64) -> Result<(), StoreError> {
        if let Some(job) = self.get(id)? {
            if let Some(folder) = &job.folder {
                docs::remove_folder(folder);
            }
        }
        self.conn
            .execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn create_document_folder(&self, position: &str, now: DateTime<Local>) -> Option<PathBuf> {
        let folder = self.docs_root.join(docs::folder_name(position, now));
        match fs::create_dir_all(&folder) {
            Ok(()) => Some(folder),
            Err(err) => {
                log::warn!(
                    "failed to create document folder path={} err={err}",
                    folder.display()
                );
                None
            }
        }
    }
}

fn encode_cover_letter(cover_letter: bool) -> &'static str {
    if cover_letter {
        "Yes"
    } else {
        "No"
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<JobRecord> {
    let status_text: String = row.get(1)?;
    let status = JobStatus::parse(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown status: {status_text}").into(),
        )
    })?;
    let date_text: String = row.get(4)?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(err))
    })?;
    let cover_letter: String = row.get(5)?;
    let folder: Option<String> = row.get(7)?;
    Ok(JobRecord {
        id: row.get(0)?,
        status,
        position: row.get(2)?,
        link: row.get(3)?,
        date,
        cover_letter: cover_letter == "Yes",
        notes: row.get(6)?,
        folder: folder.map(PathBuf::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store(dir: &tempfile::TempDir) -> JobStore {
        JobStore::in_memory(dir.path().to_path_buf()).expect("open store")
    }

    #[test]
    fn add_defaults_status_and_date_and_creates_the_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let job = store
            .add("Optics Engineer", "http://example.com/job/42", false, "")
            .expect("add job");

        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.date, Local::now().date_naive());
        let folder = job.folder.expect("folder recorded");
        assert!(folder.exists());
        assert!(folder.starts_with(dir.path()));
        assert!(folder
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Optics Engineer_"));
    }

    #[test]
    fn ids_are_durable_and_list_returns_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);

        let first = store.add("Engineer", "http://a", false, "").expect("add");
        let second = store.add("Analyst", "http://b", true, "").expect("add");
        assert!(second.id > first.id);

        let jobs = store.list().expect("list");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, first.id);
        assert_eq!(jobs[1].position, "Analyst");
        assert!(jobs[1].cover_letter);
    }

    #[test]
    fn set_status_persists_and_unmatched_ids_are_no_ops() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let job = store.add("Engineer", "http://a", false, "").expect("add");

        store
            .set_status(job.id, JobStatus::Rejected)
            .expect("set status");
        // Any state may move to any other state.
        store
            .set_status(job.id, JobStatus::InProgress)
            .expect("set status");
        store
            .set_status(job.id, JobStatus::Accepted)
            .expect("set status");

        let loaded = store.get(job.id).expect("get").expect("job exists");
        assert_eq!(loaded.status, JobStatus::Accepted);

        store
            .set_status(9999, JobStatus::Rejected)
            .expect("no-op on unmatched id");
        assert_eq!(store.list().expect("list").len(), 1);
    }

    #[test]
    fn targeted_updates_touch_only_their_column() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let target = store.add("Engineer", "http://a", false, "old").expect("add");
        let other = store.add("Analyst", "http://b", false, "keep").expect("add");

        store.set_notes(target.id, "met the team").expect("set notes");
        store
            .set_cover_letter(target.id, true)
            .expect("set cover letter");

        let loaded = store.get(target.id).expect("get").expect("job exists");
        assert_eq!(loaded.notes, "met the team");
        assert!(loaded.cover_letter);
        assert_eq!(loaded.status, target.status);
        assert_eq!(loaded.date, target.date);
        assert_eq!(loaded.link, target.link);

        let untouched = store.get(other.id).expect("get").expect("job exists");
        assert_eq!(untouched.notes, "keep");
        assert!(!untouched.cover_letter);
    }

    #[test]
    fn remove_deletes_the_row_and_its_document_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let job = store.add("Engineer", "http://a", false, "").expect("add");
        let folder = job.folder.clone().expect("folder recorded");
        fs::write(folder.join("resume.pdf"), b"v1").unwrap();

        store.remove(job.id).expect("remove");
        assert!(store.get(job.id).expect("get").is_none());
        assert!(!folder.exists());
    }

    #[test]
    fn remove_still_deletes_the_row_when_the_folder_is_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        let job = store.add("Engineer", "http://a", false, "").expect("add");
        fs::remove_dir_all(job.folder.clone().expect("folder recorded")).unwrap();

        store.remove(job.id).expect("remove");
        assert!(store.get(job.id).expect("get").is_none());
    }

    #[test]
    fn remove_with_an_unmatched_id_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        store.add("Engineer", "http://a", false, "").expect("add");

        store.remove(9999).expect("no-op remove");
        assert_eq!(store.list().expect("list").len(), 1);
    }

    #[test]
    fn a_row_with_an_unknown_status_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir);
        store
            .conn
            .execute(
                "INSERT INTO jobs (status, position, link, date, cover_letter, notes, folder)
                 VALUES ('Ghosted', 'Engineer', 'http://a', '2026-03-05', 'No', '', NULL)",
                (),
            )
            .unwrap();

        assert!(store.list().is_err());
    }
}
