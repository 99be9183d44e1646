use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create))
        .route("/user/:user", get(handlers::list_by_user))
        .route("/review", post(handlers::post_review))
        .route("/:id", put(handlers::update).delete(handlers::delete))
}
