use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{Application, Candidate, JobDetail, JobId, JobSummary};

pub const NO_MATCHING_JOBS: &str = "No matching jobs found";
pub const NO_APPLICANTS: &str = "No applicants found";

/// Successful outcome of a task, in the JSON shape both the CLI and the HTTP API emit.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TaskReply {
    Registered {
        success: String,
    },
    Created {
        job_id: JobId,
    },
    Modified {
        modified_job_id: JobId,
    },
    Applied {
        applied_job_id: JobId,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    Detail(JobDetail),
    Summaries(Vec<JobSummary>),
    Candidates(Vec<Candidate>),
    Warning {
        warning: String,
    },
}

impl TaskReply {
    pub fn registered(email: &str) -> Self {
        TaskReply::Registered {
            success: format!("Registered user {email}"),
        }
    }

    /// An empty search is reported as a warning, not as an empty list.
    pub fn summaries(jobs: Vec<JobSummary>) -> Self {
        if jobs.is_empty() {
            TaskReply::Warning {
                warning: NO_MATCHING_JOBS.into(),
            }
        } else {
            TaskReply::Summaries(jobs)
        }
    }

    pub fn candidates(candidates: Vec<Candidate>) -> Self {
        if candidates.is_empty() {
            TaskReply::Warning {
                warning: NO_APPLICANTS.into(),
            }
        } else {
            TaskReply::Candidates(candidates)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TaskReply::Registered { .. } | TaskReply::Created { .. } | TaskReply::Applied { .. } => {
                StatusCode::CREATED
            }
            _ => StatusCode::OK,
        }
    }
}

impl From<Application> for TaskReply {
    fn from(a: Application) -> Self {
        TaskReply::Applied {
            applied_job_id: a.job_id,
            warning: a.warning,
        }
    }
}

impl IntoResponse for TaskReply {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
