use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{errors::AppError, models::NewUser, reply::TaskReply, state::AppState, users::services};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<TaskReply, AppError> {
    let Json(user) = payload?;
    let email = services::register_user(&state.db, user).await?;
    Ok(TaskReply::registered(&email))
}
