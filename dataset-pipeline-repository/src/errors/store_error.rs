//! Relational store error types.

use thiserror::Error;

/// SQLSTATE raised by PostgreSQL when a relation does not exist.
const UNDEFINED_TABLE: &str = "42P01";

/// Errors that can occur during relational store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A statement was rejected by the store.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The requested table does not exist.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The dataset cannot be represented as a table.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Writing rows failed.
    #[error("Write error: {0}")]
    WriteError(String),

    /// A stored value could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a table not found error.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound(table.into())
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => Self::ConnectionError(err.to_string()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNDEFINED_TABLE) => {
                Self::TableNotFound(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DecodeError(err.to_string())
            }
            _ => Self::QueryError(err.to_string()),
        }
    }
}
