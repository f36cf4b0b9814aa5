use std::{future::Future, time::Duration};

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::{ApiError, StoreError},
    state::AppState,
    users::dto::{User, UserSearch},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_or_search_users))
        .route("/v1/users/:id", get(get_user))
}

/// Bounds a store call by the configured request deadline.
async fn within_deadline<T>(
    state: &AppState,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    let limit = Duration::from_secs(state.config.request_timeout_secs);
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

/// GET /v1/users[?email=...]
///
/// Without `email` returns every user as an array; with it, the single matching user.
#[instrument(skip(state))]
pub async fn list_or_search_users(
    State(state): State<AppState>,
    search: Result<Query<UserSearch>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(search) = search
        .map_err(|e| ApiError::validation("invalid query string").with_cause(e.body_text()))?;

    match search.email {
        Some(raw) => {
            let email = raw.trim();
            if email.is_empty() {
                return Err(ApiError::validation("email must not be empty"));
            }
            let user = within_deadline(&state, state.users.get_user_by_email(email))
                .await
                .map_err(|e| ApiError::from_store(e, "Failed to fetch user"))?;
            info!(user_id = %user.id, "user found by email");
            Ok(Json(user).into_response())
        }
        None => {
            let users = within_deadline(&state, state.users.list_users())
                .await
                .map_err(|e| ApiError::from_store(e, "Failed to fetch users"))?;
            info!(count = users.len(), "users listed");
            Ok(Json(users).into_response())
        }
    }
}

/// GET /v1/users/:id
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = within_deadline(&state, state.users.get_user_by_id(&id))
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch user"))?;
    Ok(Json(user))
}
