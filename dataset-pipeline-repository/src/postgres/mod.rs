//! PostgreSQL implementation of the relational store.

mod sql;
mod store;

pub use store::PostgresStore;
