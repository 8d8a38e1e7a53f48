use crate::errors::AppError;
use crate::models::{NewUser, User};
use sqlx::SqlitePool;

impl User {
    /// Find a user by (already lower-cased) email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_email, max_education
            FROM users
            WHERE user_email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. A unique-key collision is reported as a duplicate email.
    pub async fn create(db: &SqlitePool, user: &NewUser, created: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_email, first_name, last_name, phone, max_education, created)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.first)
        .bind(&user.last)
        .bind(&user.phone)
        .bind(user.education)
        .bind(created)
        .execute(db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }
}
