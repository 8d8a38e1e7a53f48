use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::db::now_timestamp;
use crate::errors::AppError;
use crate::jobs::repo;
use crate::models::{
    normalize_email, Application, Candidate, JobChanges, JobDetail, JobId, JobLookup, JobPosting,
    JobSummary, SearchCriteria, Submission,
};
use crate::users::services::require_user;
use crate::validation;

pub const EDUCATION_WARNING: &str = "Applied but user education is less than job requires";

#[instrument(skip(db, job), fields(creator = %job.creator))]
pub async fn create_job(db: &SqlitePool, mut job: JobPosting) -> Result<JobId, AppError> {
    job.creator = normalize_email(&job.creator);
    validation::validate_job_posting(&job)?;
    require_user(db, &job.creator).await?;

    let id = repo::insert(db, &job, &now_timestamp()?).await?;
    info!(job_id = %id, creator = %job.creator, "job created");
    Ok(id)
}

#[instrument(skip(db, criteria), fields(user = %criteria.user_email))]
pub async fn search_jobs(
    db: &SqlitePool,
    mut criteria: SearchCriteria,
) -> Result<Vec<JobSummary>, AppError> {
    criteria.user_email = normalize_email(&criteria.user_email);
    validation::validate_search_criteria(&criteria)?;
    require_user(db, &criteria.user_email).await?;
    repo::search(db, &criteria).await
}

/// Jobs created by `email`.
pub async fn search_offered(db: &SqlitePool, email: &str) -> Result<Vec<JobSummary>, AppError> {
    let email = normalize_email(email);
    validation::validate_email(&email)?;
    require_user(db, &email).await?;
    repo::offered_by(db, &email).await
}

/// Jobs `email` has applied for.
pub async fn search_applied(db: &SqlitePool, email: &str) -> Result<Vec<JobSummary>, AppError> {
    let email = normalize_email(email);
    validation::validate_email(&email)?;
    require_user(db, &email).await?;
    repo::applied_by(db, &email).await
}

pub async fn job_detail(db: &SqlitePool, mut lookup: JobLookup) -> Result<JobDetail, AppError> {
    lookup.email = normalize_email(&lookup.email);
    let id = validation::validate_job_lookup(&lookup)?;
    require_user(db, &lookup.email).await?;
    repo::find_by_id(db, id).await?.ok_or(AppError::JobNotFound)
}

/// Check `email` created job `id`. Unknown jobs are reported before ownership.
async fn require_creator(db: &SqlitePool, id: JobId, email: &str) -> Result<(), AppError> {
    let created_by = repo::creator_of(db, id).await?.ok_or(AppError::JobNotFound)?;
    if !created_by.eq_ignore_ascii_case(email) {
        warn!(job_id = %id, user = %email, "not the job creator");
        return Err(AppError::NotCreator);
    }
    Ok(())
}

#[instrument(skip(db, changes), fields(creator = %changes.creator, job_id = %changes.job_id))]
pub async fn modify_job(db: &SqlitePool, mut changes: JobChanges) -> Result<JobId, AppError> {
    changes.creator = normalize_email(&changes.creator);
    let id = validation::validate_job_changes(&changes)?;
    require_user(db, &changes.creator).await?;
    require_creator(db, id, &changes.creator).await?;

    repo::update(db, id, &changes).await?;
    info!(job_id = %id, "job modified");
    Ok(id)
}

#[instrument(skip(db, submission), fields(email = %submission.email, job_id = %submission.job_id))]
pub async fn submit_application(
    db: &SqlitePool,
    mut submission: Submission,
) -> Result<Application, AppError> {
    submission.email = normalize_email(&submission.email);
    let id = validation::validate_submission(&submission)?;
    let applicant = require_user(db, &submission.email).await?;

    let min_education =
        repo::record_application(db, id, &submission.email, &now_timestamp()?).await?;
    info!(job_id = %id, email = %submission.email, "application recorded");

    let warning = (applicant.max_education < min_education).then(|| {
        warn!(
            job_id = %id,
            email = %applicant.user_email,
            required = min_education,
            actual = applicant.max_education,
            "applicant below education requirement"
        );
        EDUCATION_WARNING.to_string()
    });
    Ok(Application {
        job_id: id,
        warning,
    })
}

/// Applicants for a job. Only the job's creator may see them.
pub async fn list_candidates(db: &SqlitePool, mut lookup: JobLookup) -> Result<Vec<Candidate>, AppError> {
    lookup.email = normalize_email(&lookup.email);
    let id = validation::validate_job_lookup(&lookup)?;
    require_user(db, &lookup.email).await?;
    require_creator(db, id, &lookup.email).await?;
    repo::candidates(db, id).await
}
