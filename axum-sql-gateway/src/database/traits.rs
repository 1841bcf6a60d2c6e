//! Database provider traits
//!
//! These traits define the seam between the gateway and a concrete database
//! client. A [`Connector`] opens pooled handles from client-supplied
//! parameters; a [`DatabaseProvider`] is one such handle.

use crate::schema::{QueryResult, SchemaMap};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Validated parameters for opening a pooled connection
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Fixed limits applied to every pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Maximum concurrent sessions per pool
    pub max_connections: u32,

    /// How long to wait for a session to be established
    pub connect_timeout: Duration,

    /// How long an unused session stays open
    pub idle_timeout: Duration,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// Opens pooled database handles
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Handle type produced by this connector
    type Provider: DatabaseProvider;

    /// Establish a pool for the given parameters
    ///
    /// The returned handle has not been checked yet; callers run
    /// [`DatabaseProvider::ping`] before accepting it.
    async fn connect(
        &self,
        params: &ConnectionParams,
        limits: PoolLimits,
    ) -> Result<Self::Provider, DatabaseError>;
}

/// A live pooled handle to one database
#[async_trait]
pub trait DatabaseProvider: Send + Sync + 'static {
    /// Run a trivial query to verify the database answers
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Execute SQL text verbatim
    ///
    /// # Returns
    ///
    /// Rows keyed by column name, field metadata and execution time
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, DatabaseError>;

    /// Describe all base tables in the default schema
    async fn introspect_schema(&self) -> Result<SchemaMap, DatabaseError>;

    /// Release every session held by this handle
    async fn close(&self) -> Result<(), DatabaseError>;
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The pool could not be established or the liveness check failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The database rejected a statement
    #[error("{message}")]
    Execution {
        /// Message reported by the database
        message: String,

        /// SQLSTATE code, if the database reported one
        code: Option<String>,

        /// 1-based character offset of the error within the statement
        position: Option<usize>,
    },

    /// Generic database error
    #[error("Database error: {0}")]
    Query(String),

    /// A value could not be converted to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}

/// Translate a SQLSTATE code into a readable message
///
/// Unknown codes fall back to the database's own message.
pub fn describe_error_code(code: Option<&str>, message: &str) -> String {
    match code {
        Some("42P01") => "Table does not exist".to_string(),
        Some("42703") => "Column does not exist".to_string(),
        Some("42601") => "Syntax error in SQL query".to_string(),
        Some("42804") => "Data type mismatch".to_string(),
        _ => message.to_string(),
    }
}
