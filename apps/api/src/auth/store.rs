use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::UserRow;

pub struct NewUser<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn username_exists(pool: &PgPool, username: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

pub async fn insert_user(pool: &PgPool, user: NewUser<'_>) -> sqlx::Result<UserRow> {
    sqlx::query_as(
        r#"
        INSERT INTO users (name, username, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user.name)
    .bind(user.username)
    .bind(user.email)
    .bind(user.password_hash)
    .fetch_one(pool)
    .await
}

pub async fn set_reset_otp(
    pool: &PgPool,
    user_id: Uuid,
    otp_hash: &str,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET reset_otp_hash = $1, reset_otp_expires_at = $2 WHERE id = $3")
        .bind(otp_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Sets the new password and clears the pending OTP in one statement.
pub async fn reset_password(pool: &PgPool, user_id: Uuid, password_hash: &str) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, reset_otp_hash = NULL, reset_otp_expires_at = NULL
        WHERE id = $2
        "#,
    )
    .bind(password_hash)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
pub async fn insert_test_user(pool: &PgPool, username: &str) -> Uuid {
    let email = format!("{username}@example.com");
    let user = NewUser {
        name: username,
        username,
        email: &email,
        password_hash: "not-a-real-hash",
    };
    insert_user(pool, user).await.unwrap().id
}
