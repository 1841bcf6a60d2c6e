//! Request and response types for the gateway API
//!
//! These types describe the JSON bodies exchanged with the browser client and
//! the schema information discovered at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema of a database: table name mapped to its columns in declaration order
pub type SchemaMap = BTreeMap<String, Vec<ColumnInfo>>;

/// Information about a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Declared SQL data type (e.g., "integer", "character varying")
    pub data_type: String,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Key constraint the column participates in
    pub key_type: KeyRole,
}

/// Key constraint role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyRole {
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
    #[default]
    #[serde(rename = "")]
    None,
}

impl KeyRole {
    /// Parse the key role tag produced by the introspection query
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "PRIMARY KEY" => KeyRole::PrimaryKey,
            "FOREIGN KEY" => KeyRole::ForeignKey,
            _ => KeyRole::None,
        }
    }
}

/// Connection parameters sent by the client
///
/// Every field is optional on the wire so that missing values can be reported
/// as a validation error instead of a deserialization failure.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConnectRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// Non-secret connection parameters echoed back after a successful connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub host: String,
    pub database: String,
    pub username: String,
}

/// Response from a successful connect
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    pub connection_id: String,
    pub message: String,
    pub server_info: ServerInfo,
}

/// Request to execute a SQL query on an open connection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub connection_id: Option<String>,
    pub query: Option<String>,
}

/// Request referencing an open connection (schema, disconnect)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub connection_id: Option<String>,
}

/// Metadata for one column of a query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Column name
    pub name: String,

    /// Database-native type identifier (PostgreSQL type OID)
    #[serde(rename = "dataTypeID")]
    pub data_type_id: u32,
}

/// Result from executing a query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Rows returned, keyed by column name
    pub rows: Vec<serde_json::Value>,

    /// Number of rows returned
    pub row_count: u64,

    /// Query execution time in milliseconds
    pub execution_time: u64,

    /// Column metadata in result order
    pub fields: Vec<FieldInfo>,
}

/// Successful query response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: QueryResult,
}

/// Successful schema response
#[derive(Debug, Clone, Serialize)]
pub struct SchemaResponse {
    pub success: bool,
    pub schema: SchemaMap,
}

/// Generic acknowledgement (disconnect)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_role_serializes_to_constraint_tags() {
        assert_eq!(serde_json::to_value(KeyRole::PrimaryKey).unwrap(), "PRIMARY KEY");
        assert_eq!(serde_json::to_value(KeyRole::ForeignKey).unwrap(), "FOREIGN KEY");
        assert_eq!(serde_json::to_value(KeyRole::None).unwrap(), "");
        assert_eq!(KeyRole::from_tag("FOREIGN KEY"), KeyRole::ForeignKey);
        assert_eq!(KeyRole::from_tag("UNIQUE"), KeyRole::None);
    }

    #[test]
    fn query_response_uses_client_field_names() {
        let response = QueryResponse {
            success: true,
            result: QueryResult {
                rows: vec![serde_json::json!({ "x": 1 })],
                row_count: 1,
                execution_time: 3,
                fields: vec![FieldInfo {
                    name: "x".to_string(),
                    data_type_id: 23,
                }],
            },
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["rowCount"], 1);
        assert_eq!(value["executionTime"], 3);
        assert_eq!(value["fields"][0]["dataTypeID"], 23);
        assert_eq!(value["rows"][0]["x"], 1);
    }

    #[test]
    fn connect_request_debug_hides_password() {
        let request = ConnectRequest {
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("hunter2"));
    }
}
