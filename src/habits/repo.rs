use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Habit record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub archived: bool,
    pub success: bool,
    pub discrete: bool,
    pub duration: i64,
    pub last_login: i64,
    pub body_text: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const HABIT_COLUMNS: &str = "id, user_id, description, archived, success, discrete, duration, \
                             last_login, body_text, created_at, updated_at";

pub struct NewHabit<'a> {
    pub user_id: Uuid,
    pub description: &'a str,
    pub archived: bool,
    pub success: bool,
    pub discrete: bool,
    pub duration: i64,
    pub body_text: &'a str,
}

pub struct HabitChanges<'a> {
    pub description: &'a str,
    pub archived: bool,
    pub discrete: bool,
    pub duration: i64,
    pub last_login: i64,
    pub success: Option<bool>,
    pub body_text: Option<&'a str>,
}

impl Habit {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Habit>> {
        let rows = sqlx::query_as::<_, Habit>(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn owner(db: &PgPool, habit_id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM habits WHERE id = $1")
            .bind(habit_id)
            .fetch_optional(db)
            .await?;
        Ok(row.map(|(user_id,)| user_id))
    }

    pub async fn create(db: &PgPool, new: NewHabit<'_>) -> anyhow::Result<Habit> {
        let habit = sqlx::query_as::<_, Habit>(&format!(
            r#"
            INSERT INTO habits (user_id, description, archived, success, discrete, duration, last_login, body_text)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.description)
        .bind(new.archived)
        .bind(new.success)
        .bind(new.discrete)
        .bind(new.duration)
        .bind(new.body_text)
        .fetch_one(db)
        .await?;
        Ok(habit)
    }

    /// Seed habit for fresh accounts, backdated so the client renders it
    /// with some history.
    pub async fn create_demo(db: &PgPool, user_id: Uuid) -> anyhow::Result<Habit> {
        let habit = sqlx::query_as::<_, Habit>(&format!(
            r#"
            INSERT INTO habits (user_id, description, archived, success, discrete, duration, last_login, body_text, created_at)
            VALUES ($1, 'Demo Habit', false, false, false, 10, 4,
                    'This is a demo habit, feel free to deleted and make your own :-)',
                    now() - interval '5 days')
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(habit)
    }

    pub async fn update(
        db: &PgPool,
        habit_id: Uuid,
        changes: HabitChanges<'_>,
    ) -> anyhow::Result<Option<Habit>> {
        let habit = sqlx::query_as::<_, Habit>(&format!(
            r#"
            UPDATE habits
            SET description = $2, archived = $3, discrete = $4, duration = $5, last_login = $6,
                success = COALESCE($7, success), body_text = COALESCE($8, body_text),
                updated_at = now()
            WHERE id = $1
            RETURNING {HABIT_COLUMNS}
            "#
        ))
        .bind(habit_id)
        .bind(changes.description)
        .bind(changes.archived)
        .bind(changes.discrete)
        .bind(changes.duration)
        .bind(changes.last_login)
        .bind(changes.success)
        .bind(changes.body_text)
        .fetch_optional(db)
        .await?;
        Ok(habit)
    }

    pub async fn delete(db: &PgPool, habit_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(habit_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Free-form feedback left by users; may be anonymous.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub review: String,
    pub user_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

impl Review {
    pub async fn create(
        db: &PgPool,
        review: &str,
        user_id: Option<Uuid>,
    ) -> anyhow::Result<Review> {
        let row = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (review, user_id)
            VALUES ($1, $2)
            RETURNING id, review, user_id, created_at
            "#,
        )
        .bind(review)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}
