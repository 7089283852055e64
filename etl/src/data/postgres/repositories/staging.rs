//! Staging repository for the `temp_data` landing table

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::config::StagingMode;
use crate::core::constants::POSTGRES_MAX_BIND_PARAMS;
use crate::data::postgres::PostgresError;
use crate::data::postgres::schema::{CREATE_STAGING_TABLE, STAGING_COLUMNS, STAGING_TABLE};
use crate::data::types::StagingRow;

/// Rows per multi-row INSERT so one statement stays under the bind limit
pub fn rows_per_statement() -> usize {
    POSTGRES_MAX_BIND_PARAMS / STAGING_COLUMNS.len()
}

/// Create `temp_data` if it does not exist
pub async fn create_staging_table(pool: &PgPool) -> Result<(), PostgresError> {
    sqlx::query(CREATE_STAGING_TABLE).execute(pool).await?;
    tracing::debug!(table = STAGING_TABLE, "Staging table ensured");
    Ok(())
}

fn insert_prefix() -> String {
    format!(
        "INSERT INTO {} ({}) ",
        STAGING_TABLE,
        STAGING_COLUMNS.join(", ")
    )
}

/// Bulk insert validated rows in a single transaction
///
/// The whole load commits or nothing does; an error anywhere drops the
/// transaction, which rolls it back.
pub async fn load_rows(
    pool: &PgPool,
    rows: &[StagingRow],
    mode: StagingMode,
) -> Result<u64, PostgresError> {
    let mut tx = pool.begin().await?;

    match mode {
        StagingMode::Append => {}
        StagingMode::Truncate => {
            sqlx::query(&format!("TRUNCATE TABLE {}", STAGING_TABLE))
                .execute(&mut *tx)
                .await?;
            tracing::debug!(table = STAGING_TABLE, "Staging table truncated");
        }
        StagingMode::RequireEmpty => {
            let (existing,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", STAGING_TABLE))
                    .fetch_one(&mut *tx)
                    .await?;
            if existing > 0 {
                return Err(PostgresError::Conflict(format!(
                    "{} already holds {} rows (staging mode is require-empty)",
                    STAGING_TABLE, existing
                )));
            }
        }
    }

    let prefix = insert_prefix();
    let mut inserted: u64 = 0;

    for chunk in rows.chunks(rows_per_statement()) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(&prefix);
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.id)
                .push_bind(row.item_code.as_deref())
                .push_bind(row.item_name.as_deref())
                .push_bind(row.fiche_no.as_deref())
                .push_bind(row.date)
                .push_bind(row.amount)
                .push_bind(row.price)
                .push_bind(row.line_net_total)
                .push_bind(row.line_net)
                .push_bind(row.branch_nr)
                .push_bind(row.branch.as_deref())
                .push_bind(row.salesman.as_deref())
                .push_bind(row.city.as_deref())
                .push_bind(row.region.as_deref())
                .push_bind(row.latitude)
                .push_bind(row.longitude)
                .push_bind(row.client_code.to_string())
                .push_bind(row.client_name.as_deref())
                .push_bind(row.brand_code.as_deref())
                .push_bind(row.brand.as_deref())
                .push_bind(row.category_name1.as_deref())
                .push_bind(row.category_name2.as_deref())
                .push_bind(row.category_name3.as_deref())
                .push_bind(row.start_date)
                .push_bind(row.end_date)
                .push_bind(row.gender.as_deref());
        });

        let result = builder.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
        tracing::debug!(
            chunk_rows = chunk.len(),
            inserted,
            "Staging chunk inserted"
        );
    }

    tx.commit().await?;
    Ok(inserted)
}
