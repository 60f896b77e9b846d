//! # Dataset Pipeline Shared
//!
//! Value types shared by every stage of the dataset pipeline: the in-memory
//! [`Dataset`], its [`CellValue`]s, column-name normalization and the
//! [`SearchDocument`] handed to the search engine.

pub mod column;
pub mod dataset;
pub mod document;

pub use column::normalize_column_name;
pub use dataset::{is_missing_marker, CellValue, ColumnType, Dataset, DatasetError};
pub use document::SearchDocument;
