use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::models::{JobApplication, JobStatus, RecordId, Task};
use crate::state::TrackerState;
use crate::storage::{Storage, StorageError};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// What the web shell provides to the command layer: where the data lives
/// and how to surface a flash message after a successful mutation.
/// Production shells implement this; tests use a recording fake.
pub trait ShellCtx {
    fn data_dir(&self) -> Result<PathBuf, StorageError>;
    fn flash(&self, message: &str);
}

/// Full tracker contents, returned to the shell for re-render. The shell
/// must not keep this across mutations; every mutating command hands back
/// a fresh collection.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrackerPayload {
    pub tasks: Vec<Task>,
    pub jobs: Vec<JobApplication>,
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn open_storage(ctx: &impl ShellCtx) -> Result<Storage, StorageError> {
    let storage = Storage::new(ctx.data_dir()?);
    storage.ensure_dirs()?;
    Ok(storage)
}

fn persist(ctx: &impl ShellCtx, state: &TrackerState) -> Result<(), StorageError> {
    let storage = open_storage(ctx)?;
    storage.save_tasks(&state.tasks())?;
    storage.save_jobs(&state.jobs())?;
    Ok(())
}

/// Reloads both collections from disk into the state and returns them.
/// Ids handed out before this call are invalidated.
pub fn load_all(ctx: &impl ShellCtx, state: &TrackerState) -> CommandResult<TrackerPayload> {
    let storage = match open_storage(ctx) {
        Ok(storage) => storage,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    let tasks = match storage.load_tasks() {
        Ok(tasks) => tasks,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    let jobs = match storage.load_jobs() {
        Ok(jobs) => jobs,
        Err(error) => return err(&format!("storage error: {error}")),
    };
    state.replace(tasks, jobs);
    ok(TrackerPayload {
        tasks: state.tasks(),
        jobs: state.jobs(),
    })
}

pub fn add_task(
    ctx: &impl ShellCtx,
    state: &TrackerState,
    category: &str,
    description: &str,
) -> CommandResult<Vec<Task>> {
    if category.is_empty() || description.is_empty() {
        // An incomplete form submission is ignored, not reported.
        return ok(state.tasks());
    }
    state.add_task(Task {
        id: 0,
        done: false,
        category: category.to_string(),
        description: description.to_string(),
    });
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ctx.flash("Task added successfully!");
    ok(state.tasks())
}

pub fn complete_task(
    ctx: &impl ShellCtx,
    state: &TrackerState,
    task_id: RecordId,
) -> CommandResult<Vec<Task>> {
    if state.complete_task(task_id).is_some() {
        if let Err(error) = persist(ctx, state) {
            return err(&format!("storage error: {error}"));
        }
        ctx.flash("Task marked as complete!");
    }
    ok(state.tasks())
}

pub fn remove_task(
    ctx: &impl ShellCtx,
    state: &TrackerState,
    task_id: RecordId,
) -> CommandResult<Vec<Task>> {
    if state.remove_task(task_id) {
        if let Err(error) = persist(ctx, state) {
            return err(&format!("storage error: {error}"));
        }
        ctx.flash("Task removed successfully!");
    }
    ok(state.tasks())
}

pub fn add_job(
    ctx: &impl ShellCtx,
    state: &TrackerState,
    company: &str,
    position: &str,
    link: &str,
    notes: &str,
) -> CommandResult<Vec<JobApplication>> {
    if company.is_empty() || position.is_empty() || link.is_empty() {
        return ok(state.jobs());
    }
    state.add_job(JobApplication {
        id: 0,
        status: JobStatus::InProgress,
        company: company.to_string(),
        position: position.to_string(),
        link: link.to_string(),
        date: Local::now().date_naive(),
        notes: notes.to_string(),
    });
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ctx.flash("Job application added successfully!");
    ok(state.jobs())
}

pub fn mark_job_status(
    ctx: &impl ShellCtx,
    state: &TrackerState,
    job_id: RecordId,
    status: JobStatus,
) -> CommandResult<Vec<JobApplication>> {
    if state.set_job_status(job_id, status).is_some() {
        if let Err(error) = persist(ctx, state) {
            return err(&format!("storage error: {error}"));
        }
        ctx.flash("Job status updated successfully!");
    }
    ok(state.jobs())
}

pub fn remove_job(
    ctx: &impl ShellCtx,
    state: &TrackerState,
    job_id: RecordId,
) -> CommandResult<Vec<JobApplication>> {
    if state.remove_job(job_id) {
        if let Err(error) = persist(ctx, state) {
            return err(&format!("storage error: {error}"));
        }
        ctx.flash("Job application removed successfully!");
    }
    ok(state.jobs())
}

fn export_default_path(root: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    root.join("exports").join(format!("jobtrail-{stamp}.csv"))
}

fn write_atomic_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    fs::create_dir_all(
        path.parent()
            .ok_or_else(|| StorageError::Io(std::io::Error::other("invalid export path")))?,
    )?;
    fs::write(&tmp, bytes)?;
    fs::rename(tmp, path)?;
    Ok(())
}

fn csv_escape(value: &str) -> String {
    // Minimal CSV escaping: wrap in quotes and double any existing quotes.
    let escaped = value.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

/// Writes the current job applications to a timestamped CSV file under
/// `exports/` and returns its path.
pub fn export_jobs_csv(ctx: &impl ShellCtx, state: &TrackerState) -> CommandResult<String> {
    let root = match ctx.data_dir() {
        Ok(path) => path,
        Err(error) => return err(&format!("storage error: {error}")),
    };

    let path = export_default_path(&root);
    let mut out = String::new();
    out.push_str("Status,Company,Position,Link,Date,Notes\n");
    for job in state.jobs() {
        out.push_str(&csv_escape(job.status.as_str()));
        out.push(',');
        out.push_str(&csv_escape(&job.company));
        out.push(',');
        out.push_str(&csv_escape(&job.position));
        out.push(',');
        out.push_str(&csv_escape(&job.link));
        out.push(',');
        out.push_str(&job.date.format("%Y-%m-%d").to_string());
        out.push(',');
        out.push_str(&csv_escape(&job.notes));
        out.push('\n');
    }

    if let Err(error) = write_atomic_bytes(&path, out.as_bytes()) {
        return err(&format!("export error: {error}"));
    }

    ctx.flash(&format!("Data exported to {}!", path.display()));
    ok(path.to_string_lossy().to_string())
}
