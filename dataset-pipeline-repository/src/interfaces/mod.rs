//! Interface definitions for the pipeline's external collaborators.
//!
//! The stages depend on these traits rather than on concrete clients, which
//! allows for dependency injection and in-memory implementations in tests.

mod relational_store;
mod search_engine_client;

pub use relational_store::RelationalStore;
pub use search_engine_client::SearchEngineClient;
