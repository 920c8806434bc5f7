//! Store implementation over tokio-postgres.

use anyhow::Context;
use serde_json::Value;
use sync_core::{DestinationRow, Store};
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;
use tracing::{debug, info};

/// Connection options for the destination database.
#[derive(Debug, Clone)]
pub struct StoreOpts {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Destination table name
    pub table: String,
    /// Rows per INSERT statement
    pub batch_size: usize,
}

/// PostgreSQL implementation of [`Store`], bound to one table.
pub struct PostgresStore {
    client: tokio_postgres::Client,
    table: String,
    batch_size: usize,
}

impl PostgresStore {
    /// Connect and spawn the connection driver task.
    pub async fn connect(opts: &StoreOpts) -> anyhow::Result<Self> {
        let (client, connection) = tokio_postgres::connect(&opts.database_url, NoTls)
            .await
            .context("Failed to connect to destination database")?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {e}");
            }
        });

        info!("Connected to destination database");
        Ok(PostgresStore {
            client,
            table: opts.table.clone(),
            batch_size: opts.batch_size.max(1),
        })
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    async fn read_lookup_column(&self, column: &str) -> anyhow::Result<Vec<Option<String>>> {
        let query = format!("SELECT {column} FROM {}", self.table);
        debug!("Reading lookup column with: {query}");
        let rows = self
            .client
            .query(&query, &[])
            .await
            .with_context(|| format!("Failed to read column '{column}' from '{}'", self.table))?;

        rows.iter()
            .map(|row| {
                row.try_get::<_, Option<String>>(0)
                    .with_context(|| format!("Column '{column}' is not readable as text"))
            })
            .collect()
    }

    async fn next_id(&self) -> anyhow::Result<i64> {
        let query = format!(
            "SELECT (COALESCE(MAX(id), 0) + 1)::BIGINT FROM {}",
            self.table
        );
        let row = self
            .client
            .query_one(&query, &[])
            .await
            .with_context(|| format!("Failed to fetch next id from '{}'", self.table))?;
        Ok(row.try_get(0)?)
    }

    async fn insert_rows(&self, rows: &[DestinationRow]) -> anyhow::Result<usize> {
        let mut written = 0usize;

        for chunk in rows.chunks(self.batch_size) {
            let columns: Vec<&str> = chunk[0].columns().collect();
            let statement = build_insert_statement(&self.table, &columns, chunk.len());

            let mut boxed: Vec<Box<dyn ToSql + Sync + Send>> = Vec::new();
            for row in chunk {
                boxed.push(Box::new(row.id()));
                for (column, value) in row.columns().zip(row.values()) {
                    boxed.push(bind_value(column, value)?);
                }
            }
            let params: Vec<&(dyn ToSql + Sync)> = boxed
                .iter()
                .map(|b| b.as_ref() as &(dyn ToSql + Sync))
                .collect();

            let count = self
                .client
                .execute(&statement, &params)
                .await
                .with_context(|| format!("Failed to insert batch into '{}'", self.table))?;
            written += count as usize;
        }

        info!("Inserted {written} row(s) into '{}'", self.table);
        Ok(written)
    }
}

/// Multi-row INSERT with positional parameters, `id` first.
fn build_insert_statement(table: &str, columns: &[&str], row_count: usize) -> String {
    let width = columns.len() + 1;
    let mut column_list = String::from("id");
    for column in columns {
        column_list.push_str(", ");
        column_list.push_str(column);
    }

    let mut placeholders = Vec::with_capacity(row_count);
    for row in 0..row_count {
        let params: Vec<String> = (1..=width).map(|i| format!("${}", row * width + i)).collect();
        placeholders.push(format!("({})", params.join(", ")));
    }

    format!(
        "INSERT INTO {table} ({column_list}) VALUES {}",
        placeholders.join(", ")
    )
}

/// Map a normalized JSON scalar onto a SQL parameter.
fn bind_value(column: &str, value: &Value) -> anyhow::Result<Box<dyn ToSql + Sync + Send>> {
    match value {
        Value::Null => Ok(Box::new(Option::<String>::None)),
        Value::Bool(b) => Ok(Box::new(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Box::new(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Box::new(f))
            } else {
                anyhow::bail!("Numeric value in column '{column}' is out of range: {n}")
            }
        }
        Value::String(s) => Ok(Box::new(s.clone())),
        // Normalization flattens objects and arrays before rows reach the store.
        other => anyhow::bail!("Unsupported value in column '{column}': {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_insert_statement_single_row() {
        let statement = build_insert_statement("school", &["external_id", "name"], 1);
        assert_eq!(
            statement,
            "INSERT INTO school (id, external_id, name) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_build_insert_statement_multi_row() {
        let statement = build_insert_statement("school", &["giga_id_school"], 3);
        assert_eq!(
            statement,
            "INSERT INTO school (id, giga_id_school) VALUES ($1, $2), ($3, $4), ($5, $6)"
        );
    }

    #[test]
    fn test_bind_value_accepts_scalars() {
        assert!(bind_value("name", &json!("Escola Azul")).is_ok());
        assert!(bind_value("lat", &json!(12.5)).is_ok());
        assert!(bind_value("count", &json!(42)).is_ok());
        assert!(bind_value("active", &json!(true)).is_ok());
        assert!(bind_value("address", &Value::Null).is_ok());
    }

    #[test]
    fn test_bind_value_rejects_structured_values() {
        assert!(bind_value("feature_flags", &json!({"a": 1})).is_err());
        assert!(bind_value("tags", &json!([1, 2])).is_err());
    }
}
