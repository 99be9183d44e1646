use axum::extract::FromRef;
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::{JwtKeys, AUTH_COOKIE};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::habits::repo::Habit;
use crate::state::AppState;

/// Pulls the session cookie, checks signature and expiry, and yields the
/// embedded user id. The accept/reject decision is the return value of this
/// call; nothing is deferred to a callback.
fn session_user(state: &AppState, jar: &CookieJar) -> Result<Uuid, ApiError> {
    let cookie = jar.get(AUTH_COOKIE).ok_or_else(ApiError::invalid_token)?;
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(cookie.value()).map_err(|_| {
        warn!("session cookie failed verification");
        ApiError::invalid_token()
    })?;
    Ok(claims.sub)
}

/// Session must belong to the user with the caller-supplied username.
pub async fn verify_by_username(
    state: &AppState,
    jar: &CookieJar,
    username: &str,
) -> Result<Uuid, ApiError> {
    let user_id = session_user(state, jar)?;
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(ApiError::invalid_token)?;
    if user.username != username {
        warn!(user_id = %user_id, claimed = %username, "username mismatch");
        return Err(ApiError::invalid_token());
    }
    Ok(user_id)
}

/// Session must belong to the user with the caller-supplied email.
pub async fn verify_by_email(
    state: &AppState,
    jar: &CookieJar,
    email: &str,
) -> Result<Uuid, ApiError> {
    let user_id = session_user(state, jar)?;
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(ApiError::invalid_token)?;
    if user.email != email {
        warn!(user_id = %user_id, "email mismatch");
        return Err(ApiError::invalid_token());
    }
    Ok(user_id)
}

/// Session must belong to the owner of the target habit.
pub async fn verify_habit_owner(
    state: &AppState,
    jar: &CookieJar,
    habit_id: Uuid,
) -> Result<Uuid, ApiError> {
    let user_id = session_user(state, jar)?;
    let owner = Habit::owner(&state.db, habit_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Habit not found"))?;
    if owner != user_id {
        warn!(user_id = %user_id, habit_id = %habit_id, "ownership mismatch");
        return Err(ApiError::invalid_token());
    }
    Ok(habit_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let state = AppState::fake();
        let jar = CookieJar::new();
        assert!(matches!(
            session_user(&state, &jar),
            Err(ApiError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn garbage_cookie_is_rejected() {
        let state = AppState::fake();
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, "nonsense"));
        assert!(matches!(
            session_user(&state, &jar),
            Err(ApiError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn valid_cookie_yields_the_signed_user() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign_session(user_id).expect("sign");
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, token));
        assert_eq!(session_user(&state, &jar).expect("accept"), user_id);
    }

    #[tokio::test]
    async fn cookie_signed_elsewhere_is_rejected() {
        use jsonwebtoken::{DecodingKey, EncodingKey};
        let state = AppState::fake();
        let foreign = JwtKeys {
            encoding: EncodingKey::from_secret(b"other"),
            decoding: DecodingKey::from_secret(b"other"),
            ttl: std::time::Duration::from_secs(60),
        };
        let token = foreign.sign_session(Uuid::new_v4()).expect("sign");
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, token));
        assert!(session_user(&state, &jar).is_err());
    }
}
