//! Star schema repository: table creation and population from staging

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::postgres::schema::{POPULATE_STEPS, STAR_SCHEMA};
use crate::data::types::{NormalizeSummary, TableLoad};

/// Create all dimension and fact tables (idempotent)
pub async fn create_tables(pool: &PgPool) -> Result<(), PostgresError> {
    let mut tx = pool.begin().await?;
    for sql in STAR_SCHEMA {
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::debug!(tables = STAR_SCHEMA.len(), "Star schema ensured");
    Ok(())
}

/// Run every populate step in one transaction
pub async fn populate(pool: &PgPool) -> Result<NormalizeSummary, PostgresError> {
    let mut tx = pool.begin().await?;
    let mut summary = NormalizeSummary::default();

    for step in POPULATE_STEPS {
        let rows = sqlx::query(step.sql)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!(table = step.table, rows, "Populated star table");
        summary.tables.push(TableLoad {
            table: step.table,
            rows,
        });
    }

    tx.commit().await?;
    Ok(summary)
}
