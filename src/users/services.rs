use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::db::now_timestamp;
use crate::errors::AppError;
use crate::models::{normalize_email, NewUser, User};
use crate::validation::validate_new_user;

/// Register a new user. Returns the stored (lower-cased) email.
#[instrument(skip(db, user), fields(email = %user.email))]
pub async fn register_user(db: &SqlitePool, mut user: NewUser) -> Result<String, AppError> {
    user.email = normalize_email(&user.email);
    validate_new_user(&user)?;

    if User::find_by_email(db, &user.email).await?.is_some() {
        warn!(email = %user.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    User::create(db, &user, &now_timestamp()?).await?;
    info!(email = %user.email, "user registered");
    Ok(user.email)
}

/// Load a registered user or fail with `UnknownUser`.
pub async fn require_user(db: &SqlitePool, email: &str) -> Result<User, AppError> {
    User::find_by_email(db, email)
        .await?
        .ok_or(AppError::UnknownUser)
}
