use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate id for flat-file records. Assigned in memory by the tracker
/// state (backfilled on load, counted up on add) and never written to the
/// backing file, so the pipe-delimited format stays id-less.
pub type RecordId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    Rejected,
    Accepted,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [
        JobStatus::InProgress,
        JobStatus::Rejected,
        JobStatus::Accepted,
    ];

    /// Canonical text form, shared by the flat file, the database column,
    /// CSV export and JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "In Progress",
            JobStatus::Rejected => "Rejected",
            JobStatus::Accepted => "Accepted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "In Progress" => Some(JobStatus::InProgress),
            "Rejected" => Some(JobStatus::Rejected),
            "Accepted" => Some(JobStatus::Accepted),
            _ => None,
        }
    }
}

/// A job-search todo item, persisted as `marker|category|description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    #[serde(default)]
    pub id: RecordId,
    pub done: bool,
    pub category: String,
    pub description: String,
}

/// A job application as the flat-file store keeps it, persisted as
/// `status|company|position|link|date|notes`. `date` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobApplication {
    #[serde(default)]
    pub id: RecordId,
    pub status: JobStatus,
    pub company: String,
    pub position: String,
    pub link: String,
    pub date: NaiveDate,
    pub notes: String,
}

/// A job application row in the database variant. `id` is the durable
/// SQLite surrogate key; `folder` points at the record's document folder
/// when one exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobRecord {
    pub id: i64,
    pub status: JobStatus,
    pub position: String,
    pub link: String,
    pub date: NaiveDate,
    pub cover_letter: bool,
    pub notes: String,
    pub folder: Option<PathBuf>,
}
