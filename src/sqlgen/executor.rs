//! Read-only execution of generated SQL against Postgres.
//!
//! Generated statements are untrusted model output, so every run happens
//! inside a transaction forced to READ ONLY and is rolled back afterward.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{json, Map, Value};
use sqlx::postgres::{PgColumn, PgPool, PgPoolOptions, PgRow};
use sqlx::types::BigDecimal;
use sqlx::{Column, Row, TypeInfo};
use tracing::debug;

/// One result row as a JSON object keyed by column name
pub type SqlRow = Map<String, Value>;

/// Trait for running one generated statement
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute the statement with read semantics and return its rows
    async fn run(&self, sql: &str) -> Result<Vec<SqlRow>>;
}

/// Postgres executor backed by a shared connection pool
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(4).connect(url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    async fn run(&self, sql: &str) -> Result<Vec<SqlRow>> {
        debug!("Executing generated SQL: {}", sql);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query(sql).fetch_all(&mut *tx).await?;
        tx.rollback().await?;

        rows.iter().map(row_to_json).collect()
    }
}

fn row_to_json(row: &PgRow) -> Result<SqlRow> {
    let mut out = Map::new();
    for column in row.columns() {
        out.insert(column.name().to_string(), column_to_json(row, column)?);
    }
    Ok(out)
}

/// Convert one column to JSON with lossless text representation for types
/// JSON cannot carry natively (dates, timestamps, numerics). Truncation or
/// coercion here would corrupt the explanation prompt.
fn column_to_json(row: &PgRow, column: &PgColumn) -> Result<Value> {
    let idx = column.ordinal();
    let type_name = column.type_info().name();

    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| json!(v)),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| json!(v)),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(|v| json!(v)),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| json!(v)),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(|v| json!(v)),
        "NUMERIC" => row
            .try_get::<Option<BigDecimal>, _>(idx)?
            .map(|v| Value::String(v.to_string())),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(idx)?
            .map(|v| Value::String(v.to_string())),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)?
            .map(|v| Value::String(v.to_string())),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(|v| Value::String(v.to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| Value::String(v.to_rfc3339())),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => row
            .try_get::<Option<String>, _>(idx)?
            .map(Value::String),
        other => match row.try_get::<Option<String>, _>(idx) {
            Ok(v) => v.map(Value::String),
            Err(_) => {
                return Err(Error::SqlPath(format!(
                    "Unsupported column type '{}' in query result",
                    other
                )))
            }
        },
    };

    Ok(value.unwrap_or(Value::Null))
}
