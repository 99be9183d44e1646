use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Pending verification code; at most one per email address.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationCode {
    pub email: String,
    pub code: String,
    pub updated_at: OffsetDateTime,
}

impl VerificationCode {
    /// Single-statement upsert so concurrent issuance cannot leave two
    /// pending rows; a repeat resets both the code and the timer.
    pub async fn upsert(db: &PgPool, email: &str, code: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (email, code, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (email)
            DO UPDATE SET code = EXCLUDED.code, updated_at = now()
            "#,
        )
        .bind(email)
        .bind(code)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find(db: &PgPool, email: &str) -> anyhow::Result<Option<VerificationCode>> {
        let row = sqlx::query_as::<_, VerificationCode>(
            "SELECT email, code, updated_at FROM verification_codes WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn exists(db: &PgPool, email: &str) -> anyhow::Result<bool> {
        Ok(Self::find(db, email).await?.is_some())
    }

    /// No-op when the row is already gone.
    pub async fn delete(db: &PgPool, email: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM verification_codes WHERE email = $1")
            .bind(email)
            .execute(db)
            .await?;
        Ok(())
    }
}
