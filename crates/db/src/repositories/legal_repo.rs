//! Repository for the `legal_pages` table.

use sqlx::PgPool;

use crate::models::legal::{LegalPage, UpsertLegalPage};

const COLUMNS: &str = "id, slug, title, content, created_at, updated_at";

pub struct LegalPageRepo;

impl LegalPageRepo {
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<LegalPage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM legal_pages WHERE slug = $1");
        sqlx::query_as::<_, LegalPage>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<LegalPage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM legal_pages ORDER BY title");
        sqlx::query_as::<_, LegalPage>(&query).fetch_all(pool).await
    }

    /// Insert the page or replace title and content at the same slug.
    pub async fn upsert(pool: &PgPool, input: &UpsertLegalPage) -> Result<LegalPage, sqlx::Error> {
        let query = format!(
            "INSERT INTO legal_pages (slug, title, content)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_legal_pages_slug DO UPDATE SET
                title = EXCLUDED.title,
                content = EXCLUDED.content
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LegalPage>(&query)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }
}
