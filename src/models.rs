use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// Autoincrement job key. Always rendered as a five digit, zero padded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct JobId(pub i64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl Serialize for JobId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Registration request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub email: String,
    pub first: String,
    pub last: String,
    pub phone: String,
    pub education: i64,
}

/// Stored user, as read back for checks.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_email: String,
    pub max_education: i64,
}

/// New job posting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    pub creator: String,
    pub title: String,
    pub description: String,
    pub min_education: i64,
    pub min_experience: i64,
    pub salary: i64,
}

/// Partial update of a job. Empty strings and zeros mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobChanges {
    pub creator: String,
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub min_education: i64,
    pub min_experience: i64,
    pub salary: i64,
    pub is_open: Option<bool>,
}

impl JobChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.min_education == 0
            && self.min_experience == 0
            && self.salary == 0
            && self.is_open.is_none()
    }
}

/// Full job record returned by the detail lookup.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobDetail {
    pub job_id: JobId,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub min_education: i64,
    pub min_experience: i64,
    pub salary: i64,
    pub is_open: bool,
    pub date_posted: String,
}

/// Row returned by every job search.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobSummary {
    pub job_id: JobId,
    pub title: String,
    pub is_open: bool,
    pub date_posted: String,
}

/// Filters for the general job search. Zero / empty fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub user_email: String,
    pub posted: String,
    pub experience: i64,
    pub education: i64,
    pub salary: i64,
    pub keyword: String,
}

/// Application for a job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub email: String,
    pub job_id: String,
}

/// A user asking about one job: detail view or candidate listing.
#[derive(Debug, Clone, Default)]
pub struct JobLookup {
    pub email: String,
    pub job_id: String,
}

/// Result of a successful application. `warning` is set when the applicant
/// falls short of the job's education requirement.
#[derive(Debug, Clone)]
pub struct Application {
    pub job_id: JobId,
    pub warning: Option<String>,
}

/// Public profile of an applicant, shown to the job's creator.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Candidate {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub applied_date: String,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
