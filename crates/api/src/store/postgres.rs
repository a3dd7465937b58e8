//! Postgres-backed site store

use async_trait::async_trait;
use sqlx::PgPool;

use sitegate_shared::{NewSite, Site, SiteError, SiteResult};

use super::SiteStore;

/// [`SiteStore`] implementation over a Postgres `sites` table.
#[derive(Clone)]
pub struct PgSiteStore {
    pool: PgPool,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteStore for PgSiteStore {
    async fn get_by_id(&self, id: i64) -> SiteResult<Site> {
        let site: Option<Site> = sqlx::query_as(
            "SELECT id, domain, name, created_at, updated_at FROM sites WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        site.ok_or_else(|| SiteError::NotFound(format!("site id {}", id)))
    }

    async fn find_by_domain(&self, domain: &str) -> SiteResult<Vec<Site>> {
        let sites = sqlx::query_as(
            r#"
            SELECT id, domain, name, created_at, updated_at
            FROM sites
            WHERE lower(domain) = lower($1)
            ORDER BY id
            "#,
        )
        .bind(domain)
        .fetch_all(&self.pool)
        .await?;

        Ok(sites)
    }

    async fn all_sites(&self) -> SiteResult<Vec<Site>> {
        let sites = sqlx::query_as(
            "SELECT id, domain, name, created_at, updated_at FROM sites ORDER BY domain",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sites)
    }

    async fn create(&self, site: NewSite) -> SiteResult<Site> {
        let site = sqlx::query_as(
            r#"
            INSERT INTO sites (domain, name)
            VALUES ($1, $2)
            RETURNING id, domain, name, created_at, updated_at
            "#,
        )
        .bind(&site.domain)
        .bind(&site.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(site)
    }

    async fn update(&self, id: i64, site: NewSite) -> SiteResult<Site> {
        let updated: Option<Site> = sqlx::query_as(
            r#"
            UPDATE sites
            SET domain = $2, name = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, domain, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&site.domain)
        .bind(&site.name)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| SiteError::NotFound(format!("site id {}", id)))
    }

    async fn delete(&self, id: i64) -> SiteResult<()> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SiteError::NotFound(format!("site id {}", id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> SiteResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
