//! PostgreSQL database provider implementation

use crate::database::traits::{
    ConnectionParams, Connector, DatabaseError, DatabaseProvider, PoolLimits,
};
use crate::schema::{ColumnInfo, FieldInfo, KeyRole, QueryResult, SchemaMap};
use async_trait::async_trait;
use sqlx::postgres::{
    PgColumn, PgConnectOptions, PgDatabaseError, PgErrorPosition, PgPoolOptions, PgRow,
};
use sqlx::{Column, Executor, PgPool, Row, Statement, TypeInfo, ValueRef};

/// Catalog query listing every column of every base table in `public`,
/// tagged with the key constraint it belongs to
const SCHEMA_QUERY: &str = r#"
    SELECT
        t.table_name::text AS table_name,
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.is_nullable::text AS is_nullable,
        c.column_default::text AS column_default,
        CASE
            WHEN pk.column_name IS NOT NULL THEN 'PRIMARY KEY'
            WHEN fk.column_name IS NOT NULL THEN 'FOREIGN KEY'
            ELSE ''
        END AS key_type
    FROM information_schema.tables t
    JOIN information_schema.columns c
      ON c.table_schema = t.table_schema
     AND c.table_name = t.table_name
    LEFT JOIN (
        SELECT DISTINCT kcu.table_name, kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON tc.constraint_name = kcu.constraint_name
         AND tc.table_schema = kcu.table_schema
        WHERE tc.table_schema = 'public'
          AND tc.constraint_type = 'PRIMARY KEY'
    ) pk
      ON pk.table_name = c.table_name
     AND pk.column_name = c.column_name
    LEFT JOIN (
        SELECT DISTINCT kcu.table_name, kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON tc.constraint_name = kcu.constraint_name
         AND tc.table_schema = kcu.table_schema
        WHERE tc.table_schema = 'public'
          AND tc.constraint_type = 'FOREIGN KEY'
    ) fk
      ON fk.table_name = c.table_name
     AND fk.column_name = c.column_name
    WHERE t.table_schema = 'public'
      AND t.table_type = 'BASE TABLE'
    ORDER BY t.table_name, c.ordinal_position
"#;

/// Opens PostgreSQL pools from client-supplied parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnector;

#[async_trait]
impl Connector for PostgresConnector {
    type Provider = PostgresProvider;

    async fn connect(
        &self,
        params: &ConnectionParams,
        limits: PoolLimits,
    ) -> Result<PostgresProvider, DatabaseError> {
        let options = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .database(&params.database)
            .username(&params.username)
            .password(&params.password);

        let pool = PgPoolOptions::new()
            .max_connections(limits.max_connections)
            .acquire_timeout(limits.connect_timeout)
            .idle_timeout(limits.idle_timeout)
            .connect_with(options)
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;

        Ok(PostgresProvider::new(pool))
    }
}

/// PostgreSQL database provider
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    /// Create a new PostgreSQL provider
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert a PostgreSQL row to a JSON object
    fn row_to_json(row: &PgRow) -> Result<serde_json::Value, DatabaseError> {
        let mut map = serde_json::Map::new();

        for column in row.columns() {
            let index = column.ordinal();
            let type_name = column.type_info().name();

            let value: serde_json::Value = match type_name {
                "BOOL" => {
                    let val: Option<bool> = row.try_get(index)?;
                    val.map(serde_json::Value::Bool).unwrap_or(serde_json::Value::Null)
                }
                "INT2" => {
                    let val: Option<i16> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::Number(v.into())).unwrap_or(serde_json::Value::Null)
                }
                "INT4" => {
                    let val: Option<i32> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::Number(v.into())).unwrap_or(serde_json::Value::Null)
                }
                "INT8" => {
                    let val: Option<i64> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::Number(v.into())).unwrap_or(serde_json::Value::Null)
                }
                "OID" => {
                    let val: Option<sqlx::postgres::types::Oid> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::Number(v.0.into())).unwrap_or(serde_json::Value::Null)
                }
                "FLOAT4" => {
                    let val: Option<f32> = row.try_get(index)?;
                    val.and_then(|v| serde_json::Number::from_f64(v as f64))
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
                "FLOAT8" => {
                    let val: Option<f64> = row.try_get(index)?;
                    val.and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
                "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "BPCHAR" => {
                    let val: Option<String> = row.try_get(index)?;
                    val.map(serde_json::Value::String).unwrap_or(serde_json::Value::Null)
                }
                "BYTEA" => {
                    let val: Option<Vec<u8>> = row.try_get(index)?;
                    val.map(|bytes| {
                        serde_json::Value::String(format!("[BLOB: {} bytes]", bytes.len()))
                    }).unwrap_or(serde_json::Value::Null)
                }
                "TIMESTAMPTZ" => {
                    let val: Option<chrono::DateTime<chrono::Utc>> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::String(v.to_rfc3339()))
                        .unwrap_or(serde_json::Value::Null)
                }
                "TIMESTAMP" => {
                    let val: Option<chrono::NaiveDateTime> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::String(v.to_string()))
                        .unwrap_or(serde_json::Value::Null)
                }
                "DATE" => {
                    let val: Option<chrono::NaiveDate> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::String(v.to_string()))
                        .unwrap_or(serde_json::Value::Null)
                }
                "TIME" => {
                    let val: Option<chrono::NaiveTime> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::String(v.to_string()))
                        .unwrap_or(serde_json::Value::Null)
                }
                "JSON" | "JSONB" => {
                    let val: Option<serde_json::Value> = row.try_get(index)?;
                    val.unwrap_or(serde_json::Value::Null)
                }
                "UUID" => {
                    let val: Option<uuid::Uuid> = row.try_get(index)?;
                    val.map(|v| serde_json::Value::String(v.to_string()))
                        .unwrap_or(serde_json::Value::Null)
                }
                _ => {
                    // numeric, interval, arrays, inet and the rest: PostgreSQL's text form
                    let raw = row.try_get_raw(index)?;
                    if raw.is_null() {
                        serde_json::Value::Null
                    } else {
                        let text = raw
                            .as_str()
                            .map_err(|error| DatabaseError::Serialization(error.to_string()))?;
                        serde_json::Value::String(text.to_string())
                    }
                }
            };

            map.insert(column.name().to_string(), value);
        }

        Ok(serde_json::Value::Object(map))
    }

    /// Field metadata for a set of result columns
    fn fields_of(columns: &[PgColumn]) -> Vec<FieldInfo> {
        columns
            .iter()
            .map(|column| FieldInfo {
                name: column.name().to_string(),
                data_type_id: column.type_info().oid().map(|oid| oid.0).unwrap_or(0),
            })
            .collect()
    }

    /// Describe the result columns of a statement without fetching rows
    async fn describe_fields(&self, sql: &str) -> Result<Vec<FieldInfo>, DatabaseError> {
        let statement = (&self.pool).prepare(sql).await.map_err(execution_error)?;
        Ok(Self::fields_of(statement.columns()))
    }
}

/// Convert a sqlx error raised while running client SQL
///
/// Database-reported failures keep their SQLSTATE code and error position.
fn execution_error(error: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(database_error) = &error {
        let position = database_error
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|postgres_error| match postgres_error.position() {
                Some(PgErrorPosition::Original(position)) => Some(position),
                _ => None,
            });

        return DatabaseError::Execution {
            message: database_error.message().to_string(),
            code: database_error.code().map(|code| code.into_owned()),
            position,
        };
    }

    DatabaseError::from(error)
}

/// One row of the schema catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
struct SchemaRow {
    table_name: String,
    column: ColumnInfo,
}

/// Group catalog rows into a table → columns map
///
/// Rows must arrive in column declaration order within each table.
fn group_schema_rows(rows: Vec<SchemaRow>) -> SchemaMap {
    let mut schema = SchemaMap::new();
    for row in rows {
        schema.entry(row.table_name).or_default().push(row.column);
    }
    schema
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;
        Ok(())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        let start_time = std::time::Instant::now();

        // Simple protocol: every value comes back as text, several statements are allowed
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(execution_error)?;

        let execution_time = start_time.elapsed().as_millis() as u64;

        let fields = match rows.first() {
            Some(row) => Self::fields_of(row.columns()),
            None => self.describe_fields(sql).await.unwrap_or_else(|error| {
                tracing::debug!("Could not describe empty result: {}", error);
                Vec::new()
            }),
        };

        let json_rows: Vec<serde_json::Value> = rows
            .iter()
            .map(Self::row_to_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult {
            row_count: json_rows.len() as u64,
            rows: json_rows,
            execution_time,
            fields,
        })
    }

    async fn introspect_schema(&self) -> Result<SchemaMap, DatabaseError> {
        let rows = sqlx::query(SCHEMA_QUERY).fetch_all(&self.pool).await?;

        let schema_rows = rows
            .iter()
            .map(|row| {
                let is_nullable: String = row.try_get("is_nullable")?;
                let key_type: String = row.try_get("key_type")?;

                Ok(SchemaRow {
                    table_name: row.try_get("table_name")?,
                    column: ColumnInfo {
                        name: row.try_get("column_name")?,
                        data_type: row.try_get("data_type")?,
                        nullable: is_nullable == "YES",
                        default_value: row.try_get("column_default")?,
                        key_type: KeyRole::from_tag(&key_type),
                    },
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(group_schema_rows(schema_rows))
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}
