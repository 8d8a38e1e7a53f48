use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{Candidate, JobChanges, JobDetail, JobId, JobPosting, JobSummary, SearchCriteria};

const SUMMARY_COLUMNS: &str =
    "SELECT j.id AS job_id, j.title, j.is_open, substr(j.created, 1, 10) AS date_posted FROM jobs j";
const NEWEST_FIRST: &str = " ORDER BY j.created DESC, j.id DESC";

/// Insert a job and return its new id. Runs in a transaction so the id read
/// back belongs to this insert.
pub async fn insert(db: &SqlitePool, job: &JobPosting, created: &str) -> Result<JobId, AppError> {
    let mut tx = db.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO jobs (created_by, title, description, min_education, min_experience, salary, is_open, created)
        VALUES (?, ?, ?, ?, ?, ?, TRUE, ?)
        RETURNING id
        "#,
    )
    .bind(&job.creator)
    .bind(&job.title)
    .bind(&job.description)
    .bind(job.min_education)
    .bind(job.min_experience)
    .bind(job.salary)
    .bind(created)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(JobId(id))
}

fn push_condition(qb: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool, condition: &str) {
    qb.push(if *has_where { " AND " } else { " WHERE " });
    qb.push(condition);
    *has_where = true;
}

/// Keyword text is matched literally, so LIKE wildcards in it are escaped.
fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// General search. Each non-empty / non-zero criterion adds one conjunct.
pub async fn search(db: &SqlitePool, criteria: &SearchCriteria) -> Result<Vec<JobSummary>, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new(SUMMARY_COLUMNS);
    let mut has_where = false;

    if !criteria.posted.is_empty() {
        push_condition(&mut qb, &mut has_where, "j.created >= ");
        qb.push_bind(criteria.posted.clone());
    }
    if criteria.experience != 0 {
        push_condition(&mut qb, &mut has_where, "j.min_experience <= ");
        qb.push_bind(criteria.experience);
    }
    if criteria.education != 0 {
        push_condition(&mut qb, &mut has_where, "j.min_education <= ");
        qb.push_bind(criteria.education);
    }
    if criteria.salary != 0 {
        push_condition(&mut qb, &mut has_where, "j.salary >= ");
        qb.push_bind(criteria.salary);
    }
    if !criteria.keyword.is_empty() {
        push_condition(&mut qb, &mut has_where, "j.title LIKE '%' || ");
        qb.push_bind(escape_like(&criteria.keyword));
        qb.push(" || '%' ESCAPE '\\'");
    }
    qb.push(NEWEST_FIRST);

    let rows = qb.build_query_as::<JobSummary>().fetch_all(db).await?;
    Ok(rows)
}

pub async fn offered_by(db: &SqlitePool, email: &str) -> Result<Vec<JobSummary>, AppError> {
    let sql = format!("{SUMMARY_COLUMNS} WHERE j.created_by = ?{NEWEST_FIRST}");
    let rows = sqlx::query_as::<_, JobSummary>(&sql)
        .bind(email)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn applied_by(db: &SqlitePool, email: &str) -> Result<Vec<JobSummary>, AppError> {
    let sql = format!(
        "{SUMMARY_COLUMNS} WHERE j.id IN (SELECT job_id FROM job_applications WHERE user_email = ?){NEWEST_FIRST}"
    );
    let rows = sqlx::query_as::<_, JobSummary>(&sql)
        .bind(email)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &SqlitePool, id: JobId) -> Result<Option<JobDetail>, AppError> {
    let job = sqlx::query_as::<_, JobDetail>(
        r#"
        SELECT id AS job_id, created_by AS creator, title, description,
               min_education, min_experience, salary, is_open,
               substr(created, 1, 10) AS date_posted
        FROM jobs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(job)
}

pub async fn creator_of(db: &SqlitePool, id: JobId) -> Result<Option<String>, AppError> {
    let creator = sqlx::query_scalar::<_, String>("SELECT created_by FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(creator)
}

/// Overwrite only the supplied columns. Callers reject empty change sets first.
pub async fn update(db: &SqlitePool, id: JobId, changes: &JobChanges) -> Result<u64, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE jobs SET ");
    {
        let mut set = qb.separated(", ");
        if !changes.title.is_empty() {
            set.push("title = ").push_bind_unseparated(changes.title.clone());
        }
        if !changes.description.is_empty() {
            set.push("description = ")
                .push_bind_unseparated(changes.description.clone());
        }
        if changes.min_education != 0 {
            set.push("min_education = ")
                .push_bind_unseparated(changes.min_education);
        }
        if changes.min_experience != 0 {
            set.push("min_experience = ")
                .push_bind_unseparated(changes.min_experience);
        }
        if changes.salary != 0 {
            set.push("salary = ").push_bind_unseparated(changes.salary);
        }
        if let Some(open) = changes.is_open {
            set.push("is_open = ").push_bind_unseparated(open);
        }
    }
    qb.push(" WHERE id = ").push_bind(id);

    let result = qb.build().execute(db).await?;
    Ok(result.rows_affected())
}

/// Record an application inside a transaction, after checking the job is
/// still open. Returns the job's minimum education level.
pub async fn record_application(
    db: &SqlitePool,
    id: JobId,
    email: &str,
    applied_at: &str,
) -> Result<i64, AppError> {
    let mut tx = db.begin().await?;
    let job = sqlx::query_as::<_, (i64, bool)>("SELECT min_education, is_open FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((min_education, is_open)) = job else {
        return Err(AppError::JobNotFound);
    };
    if !is_open {
        return Err(AppError::JobFilled);
    }

    let inserted =
        sqlx::query("INSERT INTO job_applications (job_id, user_email, apply_time) VALUES (?, ?, ?)")
            .bind(id)
            .bind(email)
            .bind(applied_at)
            .execute(&mut *tx)
            .await;
    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::AlreadyApplied)
        }
        Err(e) => return Err(e.into()),
    }
    tx.commit().await?;
    Ok(min_education)
}

pub async fn candidates(db: &SqlitePool, id: JobId) -> Result<Vec<Candidate>, AppError> {
    let rows = sqlx::query_as::<_, Candidate>(
        r#"
        SELECT u.user_email AS email,
               u.first_name || ' ' || u.last_name AS name,
               u.phone,
               substr(a.apply_time, 1, 10) AS applied_date
        FROM job_applications a
        JOIN users u ON u.user_email = a.user_email
        WHERE a.job_id = ?
        ORDER BY a.apply_time, a.id
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
