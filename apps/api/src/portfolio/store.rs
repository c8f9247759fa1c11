use sqlx::types::Json;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::unique_violation;
use crate::models::portfolio::PortfolioRow;
use crate::portfolio::data::PortfolioData;

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    portfolio_id: &str,
    template: &str,
    data: &PortfolioData,
) -> sqlx::Result<PortfolioRow> {
    sqlx::query_as(
        r#"
        INSERT INTO portfolios (
            user_id, portfolio_id, template, personal_info, experience, education, projects,
            skills, certifications, achievements, languages, deployed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now())
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(portfolio_id)
    .bind(template)
    .bind(Json(data.personal_info()))
    .bind(Json(&data.experience))
    .bind(Json(&data.education))
    .bind(Json(&data.projects))
    .bind(&data.skills)
    .bind(&data.certifications)
    .bind(&data.achievements)
    .bind(&data.languages)
    .fetch_one(pool)
    .await
}

/// Attempts made before a colliding short id is reported as an error.
const ID_ATTEMPTS: usize = 5;

const PORTFOLIO_ID_KEY: &str = "portfolios_portfolio_id_key";

/// Inserts a portfolio under the first id from `next_id` that is not already taken.
pub async fn insert_with_fresh_id(
    pool: &PgPool,
    user_id: Uuid,
    template: &str,
    data: &PortfolioData,
    mut next_id: impl FnMut() -> String,
) -> sqlx::Result<PortfolioRow> {
    let mut attempt = 1;
    loop {
        let portfolio_id = next_id();
        match insert(pool, user_id, &portfolio_id, template, data).await {
            Err(e) if attempt < ID_ATTEMPTS && unique_violation(&e) == Some(PORTFOLIO_ID_KEY) => {
                warn!("Portfolio id {portfolio_id} already taken, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<PortfolioRow>> {
    sqlx::query_as("SELECT * FROM portfolios WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn find_owned(
    pool: &PgPool,
    portfolio_id: &str,
    user_id: Uuid,
) -> sqlx::Result<Option<PortfolioRow>> {
    sqlx::query_as("SELECT * FROM portfolios WHERE portfolio_id = $1 AND user_id = $2")
        .bind(portfolio_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Rewrites the editable columns of an owned portfolio.
pub async fn update_owned(
    pool: &PgPool,
    portfolio_id: &str,
    user_id: Uuid,
    template: &str,
    data: &PortfolioData,
) -> sqlx::Result<Option<PortfolioRow>> {
    sqlx::query_as(
        r#"
        UPDATE portfolios
        SET template = $3, personal_info = $4, experience = $5, education = $6,
            projects = $7, skills = $8, certifications = $9, achievements = $10,
            languages = $11, updated_at = now()
        WHERE portfolio_id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .bind(user_id)
    .bind(template)
    .bind(Json(data.personal_info()))
    .bind(Json(&data.experience))
    .bind(Json(&data.education))
    .bind(Json(&data.projects))
    .bind(&data.skills)
    .bind(&data.certifications)
    .bind(&data.achievements)
    .bind(&data.languages)
    .fetch_optional(pool)
    .await
}

pub async fn delete_owned(
    pool: &PgPool,
    portfolio_id: &str,
    user_id: Uuid,
) -> sqlx::Result<Option<PortfolioRow>> {
    sqlx::query_as("DELETE FROM portfolios WHERE portfolio_id = $1 AND user_id = $2 RETURNING *")
        .bind(portfolio_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Counts one view of a published portfolio and returns the updated record.
/// The increment happens in a single statement, so concurrent views never
/// overwrite each other.
pub async fn record_view(pool: &PgPool, portfolio_id: &str) -> sqlx::Result<Option<PortfolioRow>> {
    sqlx::query_as(
        r#"
        UPDATE portfolios
        SET views = views + 1
        WHERE portfolio_id = $1 AND is_published
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_published(pool: &PgPool, portfolio_id: &str) -> sqlx::Result<Option<PortfolioRow>> {
    sqlx::query_as("SELECT * FROM portfolios WHERE portfolio_id = $1 AND is_published")
        .bind(portfolio_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_site_url(pool: &PgPool, id: Uuid, site_url: &str) -> sqlx::Result<PortfolioRow> {
    sqlx::query_as(
        "UPDATE portfolios SET site_url = $2, deployed_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(site_url)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::insert_test_user;

    fn sample_data() -> PortfolioData {
        PortfolioData {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            ..Default::default()
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_view_counts_each_visit(pool: PgPool) {
        let user = insert_test_user(&pool, "asha").await;
        let row = insert(&pool, user, "ab12cd34", "template1", &sample_data())
            .await
            .unwrap();
        assert_eq!(row.views, 0);
        assert!(row.is_published);

        let first = record_view(&pool, "ab12cd34").await.unwrap().unwrap();
        let second = record_view(&pool, "ab12cd34").await.unwrap().unwrap();
        assert_eq!((first.views, second.views), (1, 2));

        let fetched = find_published(&pool, "ab12cd34").await.unwrap().unwrap();
        assert_eq!(fetched.views, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_view_skips_unknown_and_unpublished(pool: PgPool) {
        let user = insert_test_user(&pool, "asha").await;
        insert(&pool, user, "hidden01", "template1", &sample_data())
            .await
            .unwrap();
        sqlx::query("UPDATE portfolios SET is_published = FALSE WHERE portfolio_id = 'hidden01'")
            .execute(&pool)
            .await
            .unwrap();

        assert!(record_view(&pool, "hidden01").await.unwrap().is_none());
        assert!(record_view(&pool, "missing0").await.unwrap().is_none());

        let views: i32 =
            sqlx::query_scalar("SELECT views FROM portfolios WHERE portfolio_id = 'hidden01'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(views, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_colliding_portfolio_id_is_regenerated(pool: PgPool) {
        let user = insert_test_user(&pool, "asha").await;
        insert(&pool, user, "taken000", "template1", &sample_data())
            .await
            .unwrap();

        let mut ids = vec!["fresh000", "taken000", "taken000"];
        let row = insert_with_fresh_id(&pool, user, "template2", &sample_data(), || {
            ids.pop().unwrap_or("unused00").to_string()
        })
        .await
        .unwrap();

        assert_eq!(row.portfolio_id, "fresh000");
        assert_eq!(row.template, "template2");
        assert_eq!(list_by_user(&pool, user).await.unwrap().len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_portfolio_id_retries_are_bounded(pool: PgPool) {
        let user = insert_test_user(&pool, "asha").await;
        insert(&pool, user, "taken000", "template1", &sample_data())
            .await
            .unwrap();

        let mut calls = 0;
        let err = insert_with_fresh_id(&pool, user, "template1", &sample_data(), || {
            calls += 1;
            "taken000".to_string()
        })
        .await
        .unwrap_err();

        assert_eq!(unique_violation(&err), Some(PORTFOLIO_ID_KEY));
        assert_eq!(calls, ID_ATTEMPTS);
    }
}
