use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use rand::Rng;
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{guard::verify_by_email, repo::User, PublicUser},
    email::verification_email,
    error::ApiError,
    state::AppState,
    verification::dto::{EmailRequest, SentResponse, VerifyRequest},
    verification::repo::VerificationCode,
};

/// The email promises 10 minutes; the check allows 11.
const CODE_TTL_MINUTES: i64 = 11;

/// Uniformly random 6-digit code; digits are independent, so leading zeros
/// are as likely as anything else.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[instrument(skip(state, jar, payload))]
pub async fn send_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(email) = payload.email else {
        return Err(ApiError::validation("no email provided"));
    };

    let user_id = verify_by_email(&state, &jar, &email).await?;

    let code = generate_code();
    VerificationCode::upsert(&state.db, &email, &code).await?;

    state
        .mailer
        .send(&email, "Email Verification", &verification_email(&code))
        .await?;

    info!(user_id = %user_id, "verification code issued");
    Ok(Json(json!({ "success": "true" })))
}

#[instrument(skip(state, jar, payload))]
pub async fn sent_check(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<SentResponse>, ApiError> {
    let Some(email) = payload.email else {
        return Err(ApiError::validation("no email provided"));
    };

    verify_by_email(&state, &jar, &email).await?;

    let sent = VerificationCode::exists(&state.db, &email).await?;
    Ok(Json(SentResponse { sent }))
}

#[instrument(skip(state, jar, payload))]
pub async fn verify_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let (Some(email), Some(code)) = (payload.email, payload.code) else {
        return Err(ApiError::validation("Send all required fields"));
    };

    let user_id = verify_by_email(&state, &jar, &email).await?;

    let pending = VerificationCode::find(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::validation("No code was issued"))?;

    // a wrong value is a plain failure, however old the code is
    if pending.code != code {
        warn!(user_id = %user_id, "verification code mismatch");
        return Err(ApiError::validation("Verification failed"));
    }

    if OffsetDateTime::now_utc() - pending.updated_at > Duration::minutes(CODE_TTL_MINUTES) {
        VerificationCode::delete(&state.db, &email).await?;
        warn!(user_id = %user_id, "verification code expired");
        return Err(ApiError::Expired("this code has expired".into()));
    }

    let user = User::mark_verified(&state.db, &email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("verified user disappeared mid-flow"))?;
    VerificationCode::delete(&state.db, &email).await?;

    info!(user_id = %user.id, "email verified");
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn leading_zeros_occur() {
        // each draw starts with '0' with probability 1/10
        let some_zero = (0..500).any(|_| generate_code().starts_with('0'));
        assert!(some_zero);
    }

    #[test]
    fn expiry_window_is_eleven_minutes() {
        let issued = OffsetDateTime::now_utc() - Duration::minutes(10);
        assert!(OffsetDateTime::now_utc() - issued <= Duration::minutes(CODE_TTL_MINUTES));
        let stale = OffsetDateTime::now_utc() - Duration::minutes(12);
        assert!(OffsetDateTime::now_utc() - stale > Duration::minutes(CODE_TTL_MINUTES));
    }
}
