use axum::{
    routing::{post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod guard;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use dto::PublicUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::signup))
        .route("/authenticate", post(handlers::authenticate))
        .route("/password/:id", put(handlers::change_password))
        .route("/logout", post(handlers::logout))
        .route(
            "/:id",
            put(handlers::update_profile).delete(handlers::delete_account),
        )
}
