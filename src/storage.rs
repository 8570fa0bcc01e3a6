use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use crate::models::{JobApplication, JobStatus, Task};

pub const TASKS_FILE: &str = "job_search_tasks.txt";
pub const JOBS_FILE: &str = "job_applications.txt";

const DELIMITER: char = '|';
const DONE_MARKER: &str = "[X]";
const OPEN_MARKER: &str = "[ ]";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Malformed { file: &'static str, line: usize },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Malformed { file, line } => {
                write!(f, "malformed record in {file} at line {line}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

/// Flat-file record store. Both collections are rewritten wholesale on
/// every save; deletion is expressed by saving a shorter collection.
///
/// Records are pipe-delimited with no escaping, so a field value that
/// contains `|` corrupts its row on reload. Known limitation of the format.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.root.join(TASKS_FILE)
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.root.join(JOBS_FILE)
    }

    /// Loads the whole task collection. A missing file is an empty
    /// collection; a row that does not split into exactly three fields
    /// fails the load.
    pub fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let path = self.tasks_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(path)?;
        let mut tasks = Vec::new();
        for (index, line) in text.lines().enumerate() {
            tasks.push(decode_task(line, index + 1)?);
        }
        Ok(tasks)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let mut out = String::new();
        for task in tasks {
            encode_task(task, &mut out);
        }
        self.write_atomic(self.tasks_path(), out.as_bytes())
    }

    /// Loads the whole job collection. A missing file is an empty
    /// collection. Rows that do not decode into exactly six well-formed
    /// fields are discarded, keeping the rest of the file loadable.
    pub fn load_jobs(&self) -> Result<Vec<JobApplication>, StorageError> {
        let path = self.jobs_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(path)?;
        let mut jobs = Vec::new();
        for (index, line) in text.lines().enumerate() {
            match decode_job(line) {
                Some(job) => jobs.push(job),
                None => {
                    log::warn!("discarding malformed job row file={JOBS_FILE} line={}", index + 1);
                }
            }
        }
        Ok(jobs)
    }

    pub fn save_jobs(&self, jobs: &[JobApplication]) -> Result<(), StorageError> {
        let mut out = String::new();
        for job in jobs {
            encode_job(job, &mut out);
        }
        self.write_atomic(self.jobs_path(), out.as_bytes())
    }

    fn write_atomic(&self, path: PathBuf, bytes: &[u8]) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

fn encode_task(task: &Task, out: &mut String) {
    let marker = if task.done { DONE_MARKER } else { OPEN_MARKER };
    out.push_str(marker);
    out.push(DELIMITER);
    out.push_str(&task.category);
    out.push(DELIMITER);
    out.push_str(&task.description);
    out.push('\n');
}

fn decode_task(line: &str, line_number: usize) -> Result<Task, StorageError> {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() != 3 {
        return Err(StorageError::Malformed {
            file: TASKS_FILE,
            line: line_number,
        });
    }
    Ok(Task {
        id: 0,
        done: parts[0] == DONE_MARKER,
        category: parts[1].to_string(),
        description: parts[2].to_string(),
    })
}

fn encode_job(job: &JobApplication, out: &mut String) {
    out.push_str(job.status.as_str());
    out.push(DELIMITER);
    out.push_str(&job.company);
    out.push(DELIMITER);
    out.push_str(&job.position);
    out.push(DELIMITER);
    out.push_str(&job.link);
    out.push(DELIMITER);
    out.push_str(&job.date.format(DATE_FORMAT).to_string());
    out.push(DELIMITER);
    out.push_str(&job.notes);
    out.push('\n');
}

fn decode_job(line: &str) -> Option<JobApplication> {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() != 6 {
        return None;
    }
    let status = JobStatus::parse(parts[0])?;
    let date = chrono::NaiveDate::parse_from_str(parts[4], DATE_FORMAT).ok()?;
    Some(JobApplication {
        id: 0,
        status,
        company: parts[1].to_string(),
        position: parts[2].to_string(),
        link: parts[3].to_string(),
        date,
        notes: parts[5].to_string(),
    })
}
