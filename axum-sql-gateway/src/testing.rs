//! In-memory database double used by unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::database::traits::{
    ConnectionParams, Connector, DatabaseError, DatabaseProvider, PoolLimits,
};
use crate::schema::{ColumnInfo, ConnectRequest, FieldInfo, KeyRole, QueryResult, SchemaMap};

/// A complete, valid connect request
pub fn connect_request() -> ConnectRequest {
    ConnectRequest {
        host: Some("db.internal".into()),
        port: None,
        database: Some("app".into()),
        username: Some("reader".into()),
        password: Some("secret".into()),
    }
}

/// Observable state of one fake pool
#[derive(Default)]
pub struct FakeState {
    pub closed: AtomicBool,
    pub close_attempts: AtomicUsize,
    pub executed: Mutex<Vec<String>>,
}

#[derive(Default)]
struct Recorded {
    providers: Vec<Arc<FakeState>>,
    last_connect: Option<(ConnectionParams, PoolLimits)>,
    connect_count: usize,
}

/// Connector that hands out [`FakeProvider`]s and records what it did
#[derive(Clone, Default)]
pub struct FakeConnector {
    fail_connect: bool,
    fail_ping: bool,
    fail_close: bool,
    fail_schema: bool,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeConnector {
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn failing_schema(mut self) -> Self {
        self.fail_schema = true;
        self
    }

    /// State of every provider created so far, in creation order
    pub fn providers(&self) -> Vec<Arc<FakeState>> {
        self.recorded.lock().unwrap().providers.clone()
    }

    pub fn last_connect(&self) -> Option<(ConnectionParams, PoolLimits)> {
        self.recorded.lock().unwrap().last_connect.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.recorded.lock().unwrap().connect_count
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Provider = FakeProvider;

    async fn connect(
        &self,
        params: &ConnectionParams,
        limits: PoolLimits,
    ) -> Result<FakeProvider, DatabaseError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.connect_count += 1;
        recorded.last_connect = Some((params.clone(), limits));

        if self.fail_connect {
            return Err(DatabaseError::Connection("connection refused".into()));
        }

        let state = Arc::new(FakeState::default());
        recorded.providers.push(state.clone());

        Ok(FakeProvider {
            state,
            fail_ping: self.fail_ping,
            fail_close: self.fail_close,
            fail_schema: self.fail_schema,
        })
    }
}

/// Provider answering every query with a single `{ "x": 1 }` row
///
/// Statements mentioning `missing_table` fail like an unknown relation.
pub struct FakeProvider {
    state: Arc<FakeState>,
    fail_ping: bool,
    fail_close: bool,
    fail_schema: bool,
}

#[async_trait]
impl DatabaseProvider for FakeProvider {
    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.fail_ping {
            return Err(DatabaseError::Connection("liveness check failed".into()));
        }
        Ok(())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        self.state.executed.lock().unwrap().push(sql.to_string());

        if sql.contains("missing_table") {
            return Err(DatabaseError::Execution {
                message: "relation \"missing_table\" does not exist".into(),
                code: Some("42P01".into()),
                position: Some(15),
            });
        }

        Ok(QueryResult {
            rows: vec![serde_json::json!({ "x": 1 })],
            row_count: 1,
            execution_time: 0,
            fields: vec![FieldInfo {
                name: "x".into(),
                data_type_id: 23,
            }],
        })
    }

    async fn introspect_schema(&self) -> Result<SchemaMap, DatabaseError> {
        if self.fail_schema {
            return Err(DatabaseError::Query("permission denied for schema public".into()));
        }

        let column = |name: &str, data_type: &str, key_type| ColumnInfo {
            name: name.into(),
            data_type: data_type.into(),
            nullable: key_type == KeyRole::None,
            default_value: None,
            key_type,
        };

        let mut schema = SchemaMap::new();
        schema.insert(
            "users".into(),
            vec![
                column("id", "integer", KeyRole::PrimaryKey),
                column("email", "text", KeyRole::None),
            ],
        );
        schema.insert(
            "orders".into(),
            vec![
                column("id", "integer", KeyRole::PrimaryKey),
                column("user_id", "integer", KeyRole::ForeignKey),
            ],
        );
        Ok(schema)
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        self.state.close_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(DatabaseError::Query("close failed".into()));
        }
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
