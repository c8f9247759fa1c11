use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{ResumeFormat, ResumeRow, ResumeSummary};

pub struct NewResume<'a> {
    pub user_id: Uuid,
    pub resume_data: Option<&'a Value>,
    pub resume_url: &'a str,
    pub filename: Option<&'a str>,
    pub format: ResumeFormat,
}

/// Allocates the caller's next version and inserts the record in one
/// transaction.
///
/// The counter upsert takes a row lock, so concurrent generations for the
/// same user serialize on it and always get distinct versions. The counter
/// is seeded from existing rows on first use and never decremented, so
/// versions of deleted resumes are not handed out again.
pub async fn insert_next_version(pool: &PgPool, new: NewResume<'_>) -> sqlx::Result<ResumeRow> {
    let mut tx = pool.begin().await?;

    let version: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO resume_version_counters (user_id, last_version)
        VALUES ($1, COALESCE((SELECT MAX(version) FROM resumes WHERE user_id = $1), 0) + 1)
        ON CONFLICT (user_id)
        DO UPDATE SET last_version = resume_version_counters.last_version + 1
        RETURNING last_version
        "#,
    )
    .bind(new.user_id)
    .fetch_one(&mut *tx)
    .await?;

    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (user_id, version, resume_data, resume_url, filename, format)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(new.user_id)
    .bind(version)
    .bind(new.resume_data)
    .bind(new.resume_url)
    .bind(new.filename)
    .bind(new.format.as_str())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

pub async fn list_history(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<ResumeSummary>> {
    sqlx::query_as(
        r#"
        SELECT id, version, resume_url, filename, format, ats_score, created_at
        FROM resumes
        WHERE user_id = $1
        ORDER BY created_at DESC, version DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn find_version(
    pool: &PgPool,
    user_id: Uuid,
    version: i32,
) -> sqlx::Result<Option<ResumeRow>> {
    sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 AND version = $2")
        .bind(user_id)
        .bind(version)
        .fetch_optional(pool)
        .await
}

pub async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<Option<ResumeRow>> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
