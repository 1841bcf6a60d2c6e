//! # axum-sql-gateway
//!
//! A thin HTTP gateway that lets a browser open connections to remote
//! PostgreSQL databases, run read-only queries and inspect their schema.
//!
//! ## Features
//!
//! - Per-client pooled connections kept in a bounded in-memory registry
//! - Read-only query gate in front of every statement
//! - Schema discovery with primary and foreign key tagging
//! - Database errors translated into readable messages with error positions
//! - Embedded browser client
//!
//! ## Security Warning
//!
//! **This is a development tool only!**
//!
//! - No authentication/authorization built-in
//! - The read-only gate is a keyword heuristic, not a SQL parser, and a
//!   request may carry several `;`-separated statements; connect with a
//!   database role that only has read privileges
//! - Should never be exposed in production or public networks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum_sql_gateway::SqlGatewayLayer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = SqlGatewayLayer::postgres("");
//!     let registry = gateway.registry();
//!
//!     let app = Router::new().merge(gateway.into_router());
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//!
//!     registry.close_all().await;
//! }
//! ```

// Public modules
pub mod api;
pub mod database;
pub mod error;
pub mod frontend;
pub mod gate;
pub mod layer;
pub mod registry;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

// Public exports
pub use error::{GatewayError, Result};
pub use gate::{classify, Verdict};
pub use layer::SqlGatewayLayer;
pub use registry::{ConnectionId, ConnectionRegistry, RegistryConfig};
pub use schema::{ColumnInfo, FieldInfo, KeyRole, QueryResult, SchemaMap};

// Re-export database providers
pub use database::traits::{ConnectionParams, Connector, DatabaseError, DatabaseProvider, PoolLimits};

#[cfg(feature = "postgres")]
pub use database::postgres::{PostgresConnector, PostgresProvider};
