use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::habits::repo::Habit;

/// Habit create body. `userID` carries the caller's username, which the
/// ownership guard resolves to the real id.
#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub desc: Option<String>,
    pub archived: Option<bool>,
    pub success: Option<bool>,
    pub discrete: Option<bool>,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub duration: Option<i64>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub desc: Option<String>,
    pub archived: Option<bool>,
    pub discrete: Option<bool>,
    pub duration: Option<i64>,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<i64>,
    pub success: Option<bool>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub review: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub desc: String,
    pub archived: bool,
    pub success: bool,
    pub discrete: bool,
    pub duration: i64,
    #[serde(rename = "lastLogin")]
    pub last_login: i64,
    pub text: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Habit> for HabitResponse {
    fn from(habit: Habit) -> Self {
        Self {
            id: habit.id,
            user_id: habit.user_id,
            desc: habit.description,
            archived: habit.archived,
            success: habit.success,
            discrete: habit.discrete,
            duration: habit.duration,
            last_login: habit.last_login,
            text: habit.body_text,
            created_at: habit.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_json_uses_legacy_field_names() {
        let habit = Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            description: "Read".into(),
            archived: false,
            success: true,
            discrete: false,
            duration: 15,
            last_login: 3,
            body_text: "".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&HabitResponse::from(habit)).unwrap();
        assert!(json.contains(r#""desc":"Read""#));
        assert!(json.contains(r#""lastLogin":3"#));
        assert!(json.contains(r#""userID""#));
        assert!(!json.contains("body_text"));
    }

    #[test]
    fn false_booleans_still_count_as_present() {
        let req: CreateHabitRequest = serde_json::from_str(
            r#"{"desc":"d","archived":false,"success":false,"discrete":false,"userID":"alice","duration":5}"#,
        )
        .unwrap();
        assert_eq!(req.archived, Some(false));
        assert_eq!(req.success, Some(false));
    }
}
