use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Pending password-reset token; at most one per user.
#[derive(Debug, Clone, FromRow)]
pub struct ResetToken {
    pub user_id: Uuid,
    pub token: String,
    pub created_at: OffsetDateTime,
}

impl ResetToken {
    /// Single-statement upsert; a repeat request replaces the token and
    /// restarts its expiry window.
    pub async fn upsert(db: &PgPool, user_id: Uuid, token: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reset_tokens (user_id, token, created_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, created_at = now()
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find_by_token(db: &PgPool, token: &str) -> anyhow::Result<Option<ResetToken>> {
        let row = sqlx::query_as::<_, ResetToken>(
            "SELECT user_id, token, created_at FROM reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn exists(db: &PgPool, token: &str) -> anyhow::Result<bool> {
        Ok(Self::find_by_token(db, token).await?.is_some())
    }

    /// No-op when the row is already gone.
    pub async fn delete(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
