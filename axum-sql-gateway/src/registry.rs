//! Connection registry
//!
//! Owns every pooled database handle opened through the gateway. Handles are
//! keyed by an opaque random identifier and evicted oldest-first once the
//! registry grows past its capacity. Closing a handle is always the
//! registry's job; callers only ever borrow handles through [`Arc`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::traits::{ConnectionParams, Connector, DatabaseProvider, PoolLimits};
use crate::error::GatewayError;
use crate::schema::{ConnectRequest, ServerInfo};

/// Default number of handles kept before the oldest one is evicted
pub const DEFAULT_CAPACITY: usize = 100;

/// Default PostgreSQL port used when the client does not send one
pub const DEFAULT_PORT: u16 = 5432;

/// Opaque identifier of a registry entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(format!("conn_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for ConnectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Registry limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of open handles
    pub capacity: usize,

    /// Limits applied to every pool the registry opens
    pub pool_limits: PoolLimits,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            pool_limits: PoolLimits::default(),
        }
    }
}

/// Handles plus their insertion order
struct Entries<P> {
    handles: HashMap<ConnectionId, Arc<P>>,
    order: VecDeque<ConnectionId>,
}

impl<P> Entries<P> {
    fn new() -> Self {
        Self {
            handles: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn take(&mut self, id: &str) -> Option<Arc<P>> {
        let handle = self.handles.remove(id)?;
        self.order.retain(|entry| entry.as_str() != id);
        Some(handle)
    }
}

/// In-memory map from identifiers to pooled handles
pub struct ConnectionRegistry<C: Connector> {
    connector: C,
    config: RegistryConfig,
    entries: Mutex<Entries<C::Provider>>,
}

impl<C: Connector> ConnectionRegistry<C> {
    /// Create an empty registry with the default limits
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, RegistryConfig::default())
    }

    /// Create an empty registry with custom limits
    pub fn with_config(connector: C, config: RegistryConfig) -> Self {
        Self {
            connector,
            config,
            entries: Mutex::new(Entries::new()),
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Open, check and register a new pooled handle
    ///
    /// Fails with [`GatewayError::Validation`] if any of host, database,
    /// username or password is missing, and with
    /// [`GatewayError::Connection`] if the pool cannot be opened or does not
    /// answer the liveness check. Neither failure touches the registry.
    pub async fn create(
        &self,
        request: ConnectRequest,
    ) -> Result<(ConnectionId, ServerInfo), GatewayError> {
        let params = validate(request)?;

        let handle = self
            .connector
            .connect(&params, self.config.pool_limits)
            .await
            .map_err(|error| GatewayError::Connection(error.to_string()))?;

        if let Err(error) = handle.ping().await {
            if let Err(close_error) = handle.close().await {
                tracing::warn!(error = %close_error, "Failed to close pool after liveness check failure");
            }
            return Err(GatewayError::Connection(error.to_string()));
        }

        let id = ConnectionId::generate();

        // Insert and evict under one lock so the cap holds under concurrent connects
        let evicted = {
            let mut entries = self.entries.lock().await;
            entries.handles.insert(id.clone(), Arc::new(handle));
            entries.order.push_back(id.clone());

            let mut evicted = Vec::new();
            while entries.order.len() > self.config.capacity {
                let Some(oldest) = entries.order.pop_front() else {
                    break;
                };
                if let Some(handle) = entries.handles.remove(&oldest) {
                    evicted.push((oldest, handle));
                }
            }
            evicted
        };

        for (oldest, handle) in evicted {
            tracing::info!(connection_id = %oldest, "Evicting oldest connection");
            if let Err(error) = handle.close().await {
                tracing::warn!(connection_id = %oldest, error = %error, "Failed to close evicted connection");
            }
        }

        tracing::info!(
            connection_id = %id,
            host = %params.host,
            database = %params.database,
            username = %params.username,
            "Connection registered"
        );

        let server_info = ServerInfo {
            host: params.host,
            database: params.database,
            username: params.username,
        };

        Ok((id, server_info))
    }

    /// Look up a handle without changing the registry
    pub async fn lookup(&self, id: &str) -> Option<Arc<C::Provider>> {
        self.entries.lock().await.handles.get(id).cloned()
    }

    /// Close and forget a handle; unknown identifiers are ignored
    pub async fn remove(&self, id: &str) -> Result<(), GatewayError> {
        let handle = self.entries.lock().await.take(id);

        let Some(handle) = handle else {
            tracing::debug!(connection_id = %id, "Disconnect for unknown connection");
            return Ok(());
        };

        handle
            .close()
            .await
            .map_err(|error| GatewayError::Internal(error.to_string()))?;

        tracing::info!(connection_id = %id, "Connection closed");
        Ok(())
    }

    /// Close every handle, logging failures and continuing with the rest
    ///
    /// # Returns
    ///
    /// The number of handles closed without error
    pub async fn close_all(&self) -> usize {
        let drained: Vec<(ConnectionId, Arc<C::Provider>)> = {
            let mut entries = self.entries.lock().await;
            entries.order.clear();
            let drained = entries.handles.drain().collect();
            drained
        };

        let mut closed = 0;
        for (id, handle) in drained {
            match handle.close().await {
                Ok(()) => closed += 1,
                Err(error) => {
                    tracing::warn!(connection_id = %id, error = %error, "Failed to close connection");
                }
            }
        }

        tracing::info!(closed, "Closed all connections");
        closed
    }

    /// Number of open handles
    pub async fn len(&self) -> usize {
        self.entries.lock().await.handles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Identifiers in insertion order, oldest first
    pub async fn ids(&self) -> Vec<ConnectionId> {
        self.entries.lock().await.order.iter().cloned().collect()
    }
}

/// Check that every required field is present and non-empty
fn validate(request: ConnectRequest) -> Result<ConnectionParams, GatewayError> {
    fn present(value: Option<String>) -> Option<String> {
        value.filter(|value| !value.is_empty())
    }

    let host = present(request.host);
    let database = present(request.database);
    let username = present(request.username);
    let password = present(request.password);

    match (host, database, username, password) {
        (Some(host), Some(database), Some(username), Some(password)) => Ok(ConnectionParams {
            host,
            port: request.port.unwrap_or(DEFAULT_PORT),
            database,
            username,
            password,
        }),
        (host, database, username, password) => {
            let missing = [
                ("host", host.is_none()),
                ("database", database.is_none()),
                ("username", username.is_none()),
                ("password", password.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, is_missing)| is_missing.then_some(field))
            .collect();

            Err(GatewayError::Validation { missing })
        }
    }
}
