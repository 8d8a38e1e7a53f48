use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    errors::AppError,
    jobs::{
        dto::{AppliedQuery, CandidatesQuery, DetailQuery, OfferedQuery, SearchQuery},
        services,
    },
    models::{JobChanges, JobPosting, SearchCriteria, Submission},
    reply::TaskReply,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_jobs))
        .route("/search/detail", get(job_detail))
        .route("/search/offered", get(search_offered))
        .route("/search/applied", get(search_applied))
        .route("/search/candidates", get(list_candidates))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/job/create", post(create_job))
        .route("/job/modify", put(modify_job))
        .route("/job/submit", post(submit_application))
}

#[instrument(skip(state))]
pub async fn search_jobs(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<TaskReply, AppError> {
    let Query(q) = query?;
    let criteria = SearchCriteria::try_from(q)?;
    let jobs = services::search_jobs(&state.db, criteria).await?;
    Ok(TaskReply::summaries(jobs))
}

#[instrument(skip(state))]
pub async fn job_detail(
    State(state): State<AppState>,
    query: Result<Query<DetailQuery>, QueryRejection>,
) -> Result<TaskReply, AppError> {
    let Query(q) = query?;
    let job = services::job_detail(&state.db, q.into()).await?;
    Ok(TaskReply::Detail(job))
}

#[instrument(skip(state))]
pub async fn search_offered(
    State(state): State<AppState>,
    query: Result<Query<OfferedQuery>, QueryRejection>,
) -> Result<TaskReply, AppError> {
    let Query(q) = query?;
    let jobs = services::search_offered(&state.db, &q.creator).await?;
    Ok(TaskReply::summaries(jobs))
}

#[instrument(skip(state))]
pub async fn search_applied(
    State(state): State<AppState>,
    query: Result<Query<AppliedQuery>, QueryRejection>,
) -> Result<TaskReply, AppError> {
    let Query(q) = query?;
    let jobs = services::search_applied(&state.db, &q.user_email).await?;
    Ok(TaskReply::summaries(jobs))
}

#[instrument(skip(state))]
pub async fn list_candidates(
    State(state): State<AppState>,
    query: Result<Query<CandidatesQuery>, QueryRejection>,
) -> Result<TaskReply, AppError> {
    let Query(q) = query?;
    let candidates = services::list_candidates(&state.db, q.into()).await?;
    Ok(TaskReply::candidates(candidates))
}

#[instrument(skip(state, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    payload: Result<Json<JobPosting>, JsonRejection>,
) -> Result<TaskReply, AppError> {
    let Json(job) = payload?;
    let job_id = services::create_job(&state.db, job).await?;
    Ok(TaskReply::Created { job_id })
}

#[instrument(skip(state, payload))]
pub async fn modify_job(
    State(state): State<AppState>,
    payload: Result<Json<JobChanges>, JsonRejection>,
) -> Result<TaskReply, AppError> {
    let Json(changes) = payload?;
    let modified_job_id = services::modify_job(&state.db, changes).await?;
    Ok(TaskReply::Modified { modified_job_id })
}

#[instrument(skip(state, payload))]
pub async fn submit_application(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<TaskReply, AppError> {
    let Json(submission) = payload?;
    let applied = services::submit_application(&state.db, submission).await?;
    Ok(applied.into())
}
