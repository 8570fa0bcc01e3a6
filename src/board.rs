use std::io;
use std::path::{Path, PathBuf};

use crate::db::{JobStore, StoreError};
use crate::docs;
use crate::models::{JobRecord, JobStatus};

/// The desktop shell's view of the job store.
///
/// Holds a snapshot of the current rows and re-reads the store after every
/// mutation, so widgets rendering `jobs()` can never index into a
/// collection taken before the last change.
pub struct JobBoard {
    store: JobStore,
    jobs: Vec<JobRecord>,
}

impl JobBoard {
    pub fn open(db_path: &Path, docs_root: PathBuf) -> Result<Self, StoreError> {
        Self::from_store(JobStore::open(db_path, docs_root)?)
    }

    pub fn in_memory(docs_root: PathBuf) -> Result<Self, StoreError> {
        Self::from_store(JobStore::in_memory(docs_root)?)
    }

    fn from_store(store: JobStore) -> Result<Self, StoreError> {
        let jobs = store.list()?;
        Ok(Self { store, jobs })
    }

    /// Current snapshot, valid until the next mutating call.
    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn get(&self, id: i64) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.jobs = self.store.list()?;
        Ok(())
    }

    pub fn add(
        &mut self,
        position: &str,
        link: &str,
        cover_letter: bool,
        notes: &str,
    ) -> Result<JobRecord, StoreError> {
        let job = self.store.add(position, link, cover_letter, notes)?;
        self.refresh()?;
        Ok(job)
    }

    pub fn set_status(&mut self, id: i64, status: JobStatus) -> Result<(), StoreError> {
        self.store.set_status(id, status)?;
        self.refresh()
    }

    pub fn set_cover_letter(&mut self, id: i64, cover_letter: bool) -> Result<(), StoreError> {
        self.store.set_cover_letter(id, cover_letter)?;
        self.refresh()
    }

    pub fn set_notes(&mut self, id: i64, notes: &str) -> Result<(), StoreError> {
        self.store.set_notes(id, notes)?;
        self.refresh()
    }

    /// Copies an externally chosen file into the record's document folder.
    /// The stored folder path is the sole handle; a record without one
    /// (folder creation failed at add time) cannot take uploads.
    pub fn upload_document(&mut self, id: i64, source: &Path) -> Result<PathBuf, StoreError> {
        let folder = match self.store.get(id)?.and_then(|job| job.folder) {
            Some(folder) => folder,
            None => {
                return Err(StoreError::Io(io::Error::other(
                    "no document folder for this application",
                )))
            }
        };
        let dest = docs::upload(&folder, source)?;
        self.refresh()?;
        Ok(dest)
    }

    /// Lists the record's uploaded documents. A folder that was removed
    /// externally surfaces as an error for the shell to report.
    pub fn documents(&self, id: i64) -> Result<Vec<PathBuf>, StoreError> {
        match self.get(id).and_then(|job| job.folder.clone()) {
            Some(folder) => Ok(docs::documents(&folder)?),
            None => Err(StoreError::Io(io::Error::other(
                "no document folder for this application",
            ))),
        }
    }

    pub fn remove(&mut self, id: i64) -> Result<(), StoreError> {
        self.store.remove(id)?;
        self.refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_board(dir: &tempfile::TempDir) -> JobBoard {
        JobBoard::in_memory(dir.path().to_path_buf()).expect("open board")
    }

    #[test]
    fn snapshot_reflects_every_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = make_board(&dir);
        assert!(board.jobs().is_empty());

        let first = board.add("Engineer", "http://a", false, "").expect("add");
        let second = board.add("Analyst", "http://b", false, "").expect("add");
        assert_eq!(board.jobs().len(), 2);

        board
            .set_status(first.id, JobStatus::Rejected)
            .expect("set status");
        assert_eq!(board.get(first.id).expect("in snapshot").status, JobStatus::Rejected);

        board.remove(first.id).expect("remove");
        // The snapshot is refreshed, never left holding the deleted row.
        assert_eq!(board.jobs().len(), 1);
        assert!(board.get(first.id).is_none());
        assert_eq!(board.jobs()[0].id, second.id);
    }

    #[test]
    fn set_notes_and_cover_letter_show_up_in_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = make_board(&dir);
        let job = board.add("Engineer", "http://a", false, "").expect("add");

        board.set_notes(job.id, "sent follow-up").expect("set notes");
        board.set_cover_letter(job.id, true).expect("set cover letter");

        let snapshot = board.get(job.id).expect("in snapshot");
        assert_eq!(snapshot.notes, "sent follow-up");
        assert!(snapshot.cover_letter);
    }

    #[test]
    fn upload_and_documents_use_the_stored_folder_handle() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = make_board(&dir);
        let job = board.add("Engineer", "http://a", false, "").expect("add");

        let source = dir.path().join("resume.pdf");
        fs::write(&source, b"v1").unwrap();
        let dest = board.upload_document(job.id, &source).expect("upload");
        assert!(dest.ends_with("resume.pdf"));

        let files = board.documents(job.id).expect("list documents");
        assert_eq!(files, vec![dest]);
    }

    #[test]
    fn documents_reports_an_error_when_the_folder_was_removed_externally() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = make_board(&dir);
        let job = board.add("Engineer", "http://a", false, "").expect("add");
        fs::remove_dir_all(job.folder.expect("folder recorded")).unwrap();

        assert!(board.documents(job.id).is_err());

        // Upload recreates the folder through the same stored handle.
        let source = dir.path().join("resume.pdf");
        fs::write(&source, b"v1").unwrap();
        board.upload_document(job.id, &source).expect("upload");
        assert_eq!(board.documents(job.id).expect("list documents").len(), 1);
    }

    #[test]
    fn documents_for_an_unknown_id_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let board = make_board(&dir);
        assert!(board.documents(42).is_err());
    }
}
