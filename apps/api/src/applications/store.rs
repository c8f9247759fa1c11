use sqlx::PgPool;
use uuid::Uuid;

use crate::models::application::{ApplicationRow, ApplicationStatus};

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    company: &str,
    role: &str,
    resume_version: Option<i32>,
) -> sqlx::Result<ApplicationRow> {
    sqlx::query_as(
        r#"
        INSERT INTO applications (user_id, company, role, resume_version)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(company)
    .bind(role)
    .bind(resume_version)
    .fetch_one(pool)
    .await
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<ApplicationRow>> {
    sqlx::query_as("SELECT * FROM applications WHERE user_id = $1 ORDER BY applied_date DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    status: ApplicationStatus,
) -> sqlx::Result<Option<ApplicationRow>> {
    sqlx::query_as(
        "UPDATE applications SET status = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await
}

pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
