use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ChangePasswordRequest, LoginRequest, PublicUser, SignupRequest, UpdateProfileRequest},
        guard::verify_by_username,
        jwt::{clear_session_cookie, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    habits::repo::Habit,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Combined duplicate message matching the legacy client's expectations.
async fn duplicate_error(
    state: &AppState,
    username: &str,
    email: &str,
    exclude: Option<uuid::Uuid>,
) -> Result<Option<String>, ApiError> {
    let mut error = String::new();
    if let Some(found) = User::find_by_username(&state.db, username).await? {
        if Some(found.id) != exclude {
            error.push_str("username taken");
        }
    }
    if let Some(found) = User::find_by_email(&state.db, email).await? {
        if Some(found.id) != exclude {
            if !error.is_empty() {
                error.push_str(" and ");
            }
            error.push_str("email already registered");
        }
    }
    Ok((!error.is_empty()).then_some(error))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<PublicUser>), ApiError> {
    let (Some(user_id), Some(email), Some(password), Some(username)) = (
        payload.user_id,
        payload.email,
        payload.password,
        payload.username,
    ) else {
        return Err(ApiError::validation("Send all required fields"));
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email on signup");
        return Err(ApiError::validation("invalid email"));
    }

    if let Some(message) = duplicate_error(&state, &username, &email, None).await? {
        warn!(username = %username, "signup conflict");
        return Err(ApiError::Conflict(message));
    }

    let password_hash = hash_password(&password)?;
    let user = User::create(&state.db, user_id, &username, &email, &password_hash).await?;

    // every fresh account starts with one example habit
    Habit::create_demo(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(user.id)?;
    let jar = jar.add(keys.session_cookie(token));

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, jar, Json(PublicUser::from(user))))
}

#[instrument(skip(state, jar, payload))]
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<PublicUser>), ApiError> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(ApiError::validation("Send all required fields"));
    };

    let bad_credentials = || ApiError::Auth("username or password are incorrect".into());

    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| {
            warn!(username = %username, "login unknown username");
            bad_credentials()
        })?;

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login wrong password");
        return Err(bad_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(user.id)?;
    let jar = jar.add(keys.session_cookie(token));

    info!(user_id = %user.id, "user logged in");
    Ok((StatusCode::CREATED, jar, Json(PublicUser::from(user))))
}

#[instrument(skip(state, jar, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Path(username): Path<String>,
    jar: CookieJar,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let (Some(password), Some(old_password)) = (payload.password, payload.old_password) else {
        return Err(ApiError::validation("send both old and new passwords"));
    };

    let user_id = verify_by_username(&state, &jar, &username).await?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    if !verify_password(&old_password, &user.password_hash)? {
        warn!(user_id = %user_id, "password change with wrong old password");
        return Err(ApiError::validation("old password is incorrect"));
    }

    let password_hash = hash_password(&password)?;
    let updated = User::update_password(&state.db, user_id, &password_hash).await?;

    info!(user_id = %user_id, "password changed");
    Ok(Json(PublicUser::from(updated)))
}

#[instrument(skip(state, jar, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    jar: CookieJar,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let (Some(new_username), Some(new_email)) = (payload.username, payload.email) else {
        return Err(ApiError::validation("send all information"));
    };

    if !is_valid_email(&new_email) {
        return Err(ApiError::validation("invalid email"));
    }

    let user_id = verify_by_username(&state, &jar, &username).await?;

    let current = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    if let Some(message) = duplicate_error(&state, &new_username, &new_email, Some(user_id)).await?
    {
        return Err(ApiError::Conflict(message));
    }

    // a changed address has to be verified again
    let verified = current.verified && current.email == new_email;
    let updated =
        User::update_profile(&state.db, user_id, &new_username, &new_email, verified).await?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(PublicUser::from(updated)))
}

#[instrument(skip(state, jar))]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let user_id = verify_by_username(&state, &jar, &username).await?;

    // habits and reset tokens cascade with the user row
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    info!(user_id = %user_id, "account deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(clear_session_cookie());
    (jar, Json(json!({ "message": "Logged out successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.io"));
        assert!(!is_valid_email("nope"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x"));
    }
}
