//! Database abstraction layer
//!
//! This module provides a database-agnostic interface for opening pooled
//! connections, running queries and discovering schema.

pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export the main traits
pub use traits::{ConnectionParams, Connector, DatabaseError, DatabaseProvider, PoolLimits};
