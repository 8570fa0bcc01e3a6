use std::sync::{Arc, Mutex};

use crate::models::{JobApplication, JobStatus, RecordId, Task};

/// In-memory collections for the flat-file tracker.
///
/// Owns the only live copy of the records; shells get cloned snapshots and
/// must refetch after every mutation. Surrogate ids are backfilled on
/// intake (records loaded from disk arrive with `id == 0`) and assigned on
/// add, so mutations address records by id rather than by position and
/// survive the index shift a deletion causes.
#[derive(Clone)]
pub struct TrackerState {
    inner: Arc<Mutex<TrackerData>>,
}

impl TrackerState {
    pub fn new(tasks: Vec<Task>, jobs: Vec<JobApplication>) -> Self {
        let mut data = TrackerData {
            tasks,
            jobs,
            next_id: 1,
        };
        data.assign_missing_ids();
        Self {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn jobs(&self) -> Vec<JobApplication> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.jobs.clone()
    }

    /// Wholesale refresh after a reload from disk. Ids are re-assigned;
    /// ids handed out before this call no longer address anything.
    pub fn replace(&self, tasks: Vec<Task>, jobs: Vec<JobApplication>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
        guard.jobs = jobs;
        guard.assign_missing_ids();
    }

    pub fn add_task(&self, mut task: Task) -> Task {
        let mut guard = self.inner.lock().expect("state poisoned");
        task.id = guard.take_id();
        guard.tasks.push(task.clone());
        task
    }

    pub fn complete_task(&self, task_id: RecordId) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.done = true;
        Some(task.clone())
    }

    /// Returns whether a task was actually removed; unknown ids leave the
    /// collection untouched.
    pub fn remove_task(&self, task_id: RecordId) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.tasks.len();
        guard.tasks.retain(|task| task.id != task_id);
        guard.tasks.len() < before
    }

    pub fn add_job(&self, mut job: JobApplication) -> JobApplication {
        let mut guard = self.inner.lock().expect("state poisoned");
        job.id = guard.take_id();
        guard.jobs.push(job.clone());
        job
    }

    pub fn set_job_status(&self, job_id: RecordId, status: JobStatus) -> Option<JobApplication> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let job = guard.jobs.iter_mut().find(|j| j.id == job_id)?;
        job.status = status;
        Some(job.clone())
    }

    pub fn remove_job(&self, job_id: RecordId) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.jobs.len();
        guard.jobs.retain(|job| job.id != job_id);
        guard.jobs.len() < before
    }
}

struct TrackerData {
    tasks: Vec<Task>,
    jobs: Vec<JobApplication>,
    next_id: RecordId,
}

impl TrackerData {
    fn take_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn assign_missing_ids(&mut self) {
        let highest = self
            .tasks
            .iter()
            .map(|task| task.id)
            .chain(self.jobs.iter().map(|job| job.id))
            .max()
            .unwrap_or(0);
        if self.next_id <= highest {
            self.next_id = highest + 1;
        }
        for index in 0..self.tasks.len() {
            if self.tasks[index].id == 0 {
                self.tasks[index].id = self.take_id();
            }
        }
        for index in 0..self.jobs.len() {
            if self.jobs[index].id == 0 {
                self.jobs[index].id = self.take_id();
            }
        }
    }
}
