pub mod dto;
pub mod handlers;
pub mod repo;
mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgUserStore, UserStore};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
