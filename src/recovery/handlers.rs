use axum::{extract::State, Json};
use rand::{rngs::OsRng, RngCore};
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{password::hash_password, repo::User},
    email::{password_reset_email, username_recovery_email},
    error::ApiError,
    recovery::dto::{CheckTokenRequest, ForgotUsernameRequest, FoundResponse, ResetPasswordRequest, ResetRequest},
    recovery::repo::ResetToken,
    state::AppState,
};

/// Same window as the verification-code flow.
const TOKEN_TTL_MINUTES: i64 = 11;

/// 32 random bytes, hex encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[instrument(skip(state, payload))]
pub async fn reset_request(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(email), Some(link)) = (payload.email, payload.link) else {
        return Err(ApiError::validation("send all fields"));
    };

    // no session required: this is the forgotten-credentials path
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::validation("no user exists"))?;

    let token = generate_token();
    ResetToken::upsert(&state.db, user.id, &token).await?;

    let reset_link = format!("{link}/{token}");
    state
        .mailer
        .send(&email, "Reset Password", &password_reset_email(&reset_link))
        .await?;

    info!(user_id = %user.id, "reset token issued");
    Ok(Json(json!({ "success": "true", "link": reset_link })))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(password), Some(token)) = (payload.password, payload.token) else {
        return Err(ApiError::validation("send all fields"));
    };

    let pending = ResetToken::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::validation("no token found"))?;

    if OffsetDateTime::now_utc() - pending.created_at > Duration::minutes(TOKEN_TTL_MINUTES) {
        ResetToken::delete(&state.db, pending.user_id).await?;
        warn!(user_id = %pending.user_id, "reset token expired");
        return Err(ApiError::Expired("token expired".into()));
    }

    let user = User::find_by_id(&state.db, pending.user_id)
        .await?
        .ok_or_else(|| ApiError::validation("no user found"))?;

    let password_hash = hash_password(&password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;
    // single-use: the token dies with the successful reset
    ResetToken::delete(&state.db, pending.user_id).await?;

    info!(user_id = %user.id, "password reset completed");
    Ok(Json(json!({ "message": "success" })))
}

#[instrument(skip(state, payload))]
pub async fn check_token(
    State(state): State<AppState>,
    Json(payload): Json<CheckTokenRequest>,
) -> Result<Json<FoundResponse>, ApiError> {
    let Some(token) = payload.token else {
        return Err(ApiError::validation("no token provided"));
    };
    let found = ResetToken::exists(&state.db, &token).await?;
    Ok(Json(FoundResponse { found }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_username(
    State(state): State<AppState>,
    Json(payload): Json<ForgotUsernameRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(email) = payload.email else {
        return Err(ApiError::validation("no email provided"));
    };

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::validation("User does not exist"))?;

    state
        .mailer
        .send(
            &email,
            "Username Recovery",
            &username_recovery_email(&user.username),
        )
        .await?;

    info!(user_id = %user.id, "username recovery email sent");
    Ok(Json(json!({ "success": "true" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn reset_link_concatenation() {
        let link = format!("{}/{}", "https://habster.app/reset", "abc123");
        assert_eq!(link, "https://habster.app/reset/abc123");
    }
}
