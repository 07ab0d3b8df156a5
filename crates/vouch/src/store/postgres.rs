//! PostgreSQL identity store.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use vouch_common::{IdentityId, Result, VerifiedIdentity, VouchError};

use super::IdentityStore;

#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    discord_id: String,
    verified_at: DateTime<Utc>,
}

impl From<IdentityRow> for VerifiedIdentity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: IdentityId::new(row.discord_id),
            verified_at: row.verified_at,
        }
    }
}

/// `verified_identities` table behind a connection pool
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    /// Open a pool against `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(unavailable)?;

        Ok(Self { pool })
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| VouchError::StoreUnavailable(e.to_string()))
    }

    /// Round-trip a trivial query, for readiness checks
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

fn unavailable(e: sqlx::Error) -> VouchError {
    VouchError::StoreUnavailable(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl IdentityStore for PgIdentityStore {
    async fn create(&self, id: &IdentityId) -> Result<VerifiedIdentity> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "INSERT INTO verified_identities (discord_id) VALUES ($1) \
             RETURNING discord_id, verified_at",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                VouchError::AlreadyExists(id.to_string())
            } else {
                unavailable(e)
            }
        })?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(VouchError::Invariant(format!(
                "insert for {} returned no row",
                id
            ))),
        }
    }

    async fn delete(&self, id: &IdentityId) -> Result<()> {
        let result = sqlx::query("DELETE FROM verified_identities WHERE discord_id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(VouchError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<VerifiedIdentity>> {
        let rows: Vec<IdentityRow> = sqlx::query_as(
            "SELECT discord_id, verified_at FROM verified_identities ORDER BY verified_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(VerifiedIdentity::from).collect())
    }
}
