use axum::{routing::post, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resetrequest", post(handlers::reset_request))
        .route("/resetpass", post(handlers::reset_password))
        .route("/checktoken", post(handlers::check_token))
        .route("/forgotusername", post(handlers::forgot_username))
}
