use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::guard::{verify_by_username, verify_habit_owner},
    error::ApiError,
    habits::dto::{CreateHabitRequest, HabitResponse, ReviewRequest, UpdateHabitRequest},
    habits::repo::{Habit, HabitChanges, NewHabit, Review},
    state::AppState,
};

#[instrument(skip(state, jar))]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    jar: CookieJar,
) -> Result<Json<Vec<HabitResponse>>, ApiError> {
    let user_id = verify_by_username(&state, &jar, &username).await?;

    let habits = Habit::list_by_user(&state.db, user_id).await?;
    Ok(Json(habits.into_iter().map(HabitResponse::from).collect()))
}

#[instrument(skip(state, jar, payload))]
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), ApiError> {
    let (Some(desc), Some(archived), Some(success), Some(discrete), Some(username), Some(duration)) = (
        payload.desc,
        payload.archived,
        payload.success,
        payload.discrete,
        payload.user_id,
        payload.duration,
    ) else {
        return Err(ApiError::validation("Send all required fields"));
    };

    let user_id = verify_by_username(&state, &jar, &username).await?;

    let habit = Habit::create(
        &state.db,
        NewHabit {
            user_id,
            description: &desc,
            archived,
            success,
            discrete,
            duration,
            body_text: payload.text.as_deref().unwrap_or(""),
        },
    )
    .await?;

    info!(user_id = %user_id, habit_id = %habit.id, "habit created");
    Ok((StatusCode::CREATED, Json(HabitResponse::from(habit))))
}

#[instrument(skip(state, jar, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(desc), Some(archived), Some(discrete), Some(duration), Some(last_login)) = (
        payload.desc,
        payload.archived,
        payload.discrete,
        payload.duration,
        payload.last_login,
    ) else {
        return Err(ApiError::validation("Send all required fields"));
    };

    let habit_id = verify_habit_owner(&state, &jar, id).await?;

    let updated = Habit::update(
        &state.db,
        habit_id,
        HabitChanges {
            description: &desc,
            archived,
            discrete,
            duration,
            last_login,
            success: payload.success,
            body_text: payload.text.as_deref(),
        },
    )
    .await?;

    if updated.is_none() {
        return Err(ApiError::not_found("Habit not found"));
    }

    info!(habit_id = %habit_id, "habit updated");
    Ok(Json(json!({ "message": "Habit updated successfully" })))
}

#[instrument(skip(state, jar))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let habit_id = verify_habit_owner(&state, &jar, id).await?;

    if !Habit::delete(&state.db, habit_id).await? {
        return Err(ApiError::not_found("Habit not found"));
    }

    info!(habit_id = %habit_id, "habit deleted");
    Ok(Json(json!({ "message": "Habit deleted successfully" })))
}

/// Reviews with a `userID` (username) must prove ownership of it; without
/// one the review is stored anonymously.
#[instrument(skip(state, jar, payload))]
pub async fn post_review(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(review) = payload.review else {
        return Err(ApiError::validation("Send all required fields"));
    };

    let user_id = match payload.user_id {
        Some(username) => Some(verify_by_username(&state, &jar, &username).await?),
        None => None,
    };

    Review::create(&state.db, &review, user_id).await?;

    info!(anonymous = user_id.is_none(), "review added");
    Ok(Json(json!({ "message": "Review added successfully" })))
}
