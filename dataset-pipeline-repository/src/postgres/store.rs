//! PostgreSQL store implementation.
//!
//! This module provides the concrete implementation of `RelationalStore`
//! using a sqlx connection pool.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::{debug, info, instrument};

use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::interfaces::RelationalStore;
use crate::postgres::sql;
use dataset_pipeline_shared::{CellValue, ColumnType, Dataset};

/// PostgreSQL-backed relational store.
///
/// # Example
///
/// ```ignore
/// let store = PostgresStore::connect_lazy("postgres://localhost/pipeline", &StoreConfig::default())?;
/// let written = store.replace_table("table_m3", &dataset).await?;
/// ```
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store whose connections are opened on first use.
    ///
    /// Only the URL is validated here. An unreachable server surfaces as
    /// `StoreError::ConnectionError` from the first operation, once the
    /// configured acquire timeout has elapsed.
    pub fn connect_lazy(url: &str, config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(url)
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout.as_secs(),
            "Created PostgreSQL connection pool"
        );

        Ok(Self { pool })
    }

    fn bind_cell<'q>(
        query: Query<'q, Postgres, PgArguments>,
        value: &CellValue,
        kind: ColumnType,
    ) -> Query<'q, Postgres, PgArguments> {
        match kind {
            ColumnType::Integer => query.bind(value.as_i64()),
            ColumnType::Float => query.bind(value.as_f64()),
            ColumnType::Boolean => query.bind(value.as_bool()),
            ColumnType::Text => query.bind((!value.is_null()).then(|| value.to_string())),
        }
    }

    fn decode_cell(row: &PgRow, index: usize, kind: ColumnType) -> Result<CellValue, StoreError> {
        let value: CellValue = match kind {
            ColumnType::Integer => row.try_get::<Option<i64>, _>(index)?.into(),
            ColumnType::Float => row.try_get::<Option<f64>, _>(index)?.into(),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(index)?.into(),
            ColumnType::Text => row.try_get::<Option<String>, _>(index)?.into(),
        };
        Ok(value)
    }

    /// Insert errors are write failures unless the store went away.
    fn write_error(err: sqlx::Error) -> StoreError {
        match StoreError::from(err) {
            StoreError::QueryError(msg) => StoreError::write(msg),
            other => other,
        }
    }
}

#[async_trait]
impl RelationalStore for PostgresStore {
    /// Drop, recreate and fill the table inside one transaction.
    ///
    /// PostgreSQL DDL is transactional, so on any failure the previous table
    /// (if there was one) is left exactly as it was.
    #[instrument(skip(self, dataset), fields(rows = dataset.len(), columns = dataset.width()))]
    async fn replace_table(&self, table: &str, dataset: &Dataset) -> Result<u64, StoreError> {
        let columns = dataset.columns();
        let kinds = dataset.column_types();

        let drop_sql = sql::drop_table_sql(table)?;
        let create_sql = sql::create_table_sql(table, columns, &kinds)?;
        let batch_rows = sql::rows_per_insert(columns.len());

        let mut tx = self.pool.begin().await?;

        sqlx::query(&drop_sql).execute(&mut *tx).await?;
        sqlx::query(&create_sql).execute(&mut *tx).await?;
        debug!(table = %table, "Recreated table");

        let mut written = 0u64;
        for chunk in dataset.rows().chunks(batch_rows) {
            let insert_sql = sql::insert_sql(table, columns, chunk.len())?;
            let mut query = sqlx::query(&insert_sql);
            for row in chunk {
                for (value, kind) in row.iter().zip(&kinds) {
                    query = Self::bind_cell(query, value, *kind);
                }
            }
            let result = query.execute(&mut *tx).await.map_err(Self::write_error)?;
            written += result.rows_affected();
            debug!(table = %table, written = written, "Inserted batch");
        }

        tx.commit().await?;

        info!(table = %table, rows = written, "Replaced table");
        Ok(written)
    }

    #[instrument(skip(self))]
    async fn read_table(&self, table: &str) -> Result<Dataset, StoreError> {
        let described: Vec<(String, String)> = sqlx::query_as(sql::COLUMNS_SQL)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        if described.is_empty() {
            return Err(StoreError::table_not_found(table));
        }

        let columns: Vec<(String, ColumnType)> = described
            .into_iter()
            .map(|(name, data_type)| {
                let kind = sql::stored_kind(&data_type);
                (name, kind)
            })
            .collect();

        let select_sql = sql::select_sql(table, &columns)?;
        let rows = sqlx::query(&select_sql).fetch_all(&self.pool).await?;

        let names = columns.iter().map(|(name, _)| name.clone()).collect();
        let mut dataset = Dataset::new(names).map_err(|e| StoreError::decode(e.to_string()))?;

        for row in &rows {
            let values = columns
                .iter()
                .enumerate()
                .map(|(index, (_, kind))| Self::decode_cell(row, index, *kind))
                .collect::<Result<Vec<_>, _>>()?;
            dataset
                .push_row(values)
                .map_err(|e| StoreError::decode(e.to_string()))?;
        }

        info!(table = %table, rows = dataset.len(), "Read table");
        Ok(dataset)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }
}
