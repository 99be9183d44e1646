use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;

/// Signup body. Fields are optional so a missing one surfaces as the
/// legacy "Send all required fields" 400 instead of a decode rejection.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    #[serde(rename = "passWord")]
    pub password: Option<String>,
    #[serde(rename = "userName")]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: Option<String>,
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "userName")]
    pub username: Option<String>,
    pub email: Option<String>,
}

/// User shape returned to the client. The legacy client keys everything by
/// username and reads it from the `userID` field, so that is what goes there.
/// The password hash is never echoed.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub username: String,
    pub email: String,
    pub verified: bool,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.username.clone(),
            username: user.username,
            email: user.email,
            verified: user.verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_omits_the_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            verified: false,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains(r#""userName":"alice""#));
        assert!(json.contains(r#""verified":false"#));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn signup_request_tolerates_missing_fields() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(req.user_id.is_none());
        assert!(req.username.is_none());
        assert_eq!(req.email.as_deref(), Some("a@x.com"));
    }
}
