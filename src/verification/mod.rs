use axum::{routing::post, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sendmail", post(handlers::send_code))
        .route("/sentcheck", post(handlers::sent_check))
        .route("/verify", post(handlers::verify_code))
}
