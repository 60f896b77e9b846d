//! Cleaner stage.
//!
//! Turns the intermediate artifact into the clean artifact: every record
//! gets an `id`, exact duplicates go, column names are normalized and rows
//! with missing values are dropped.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::artifact;
use crate::errors::PipelineError;
use dataset_pipeline_shared::{normalize_column_name, CellValue, Dataset};

/// Name of the identifier column before normalization.
pub const ID_COLUMN: &str = "ID";

/// When the identifier column is added relative to duplicate removal.
///
/// With `BeforeDedup` the ids take part in row equality, so no row is ever an
/// exact duplicate of another. `AfterDedup` compares data columns only and
/// numbers the surviving rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdAssignment {
    BeforeDedup,
    #[default]
    AfterDedup,
}

impl IdAssignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeDedup => "before_dedup",
            Self::AfterDedup => "after_dedup",
        }
    }
}

impl fmt::Display for IdAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before_dedup" => Ok(Self::BeforeDedup),
            "after_dedup" => Ok(Self::AfterDedup),
            other => Err(format!(
                "unknown id assignment '{}', expected before_dedup or after_dedup",
                other
            )),
        }
    }
}

/// Counts collected while cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub initial_count: usize,
    /// Rows removed as exact duplicates.
    pub duplicate_count: usize,
    /// Missing cells across the deduplicated table.
    pub missing_count: usize,
    /// Rows removed for holding at least one missing cell.
    pub incomplete_rows: usize,
    pub final_count: usize,
}

/// Clean a dataset.
///
/// `final_count == initial_count - duplicate_count - incomplete_rows` holds
/// for every successful call.
///
/// An existing column whose name normalizes to `id` is treated as the
/// identifier column and renumbered in place, so cleaning a clean artifact
/// again leaves it unchanged apart from the ids.
///
/// # Errors
///
/// Returns `PipelineError::FormatError` if a column name normalizes to
/// nothing or to the same name as another column.
pub fn clean(
    mut dataset: Dataset,
    id_assignment: IdAssignment,
) -> Result<(Dataset, CleaningStats), PipelineError> {
    let initial_count = dataset.len();
    let existing_id = find_id_column(&dataset);

    let duplicate_count = match id_assignment {
        IdAssignment::BeforeDedup => {
            assign_ids(&mut dataset, existing_id)?;
            dataset.drop_duplicate_rows()
        }
        IdAssignment::AfterDedup => {
            let removed = match existing_id {
                Some(id) => dataset.drop_duplicate_rows_by(|row| {
                    row.iter()
                        .enumerate()
                        .filter(|(index, _)| *index != id)
                        .map(|(_, value)| value.clone())
                        .collect::<Vec<CellValue>>()
                }),
                None => dataset.drop_duplicate_rows(),
            };
            assign_ids(&mut dataset, existing_id)?;
            removed
        }
    };

    normalize_columns(&mut dataset)?;

    let missing_count = dataset.missing_count();
    let incomplete_rows = dataset.drop_incomplete_rows();

    let stats = CleaningStats {
        initial_count,
        duplicate_count,
        missing_count,
        incomplete_rows,
        final_count: dataset.len(),
    };
    Ok((dataset, stats))
}

/// Position of the first column that normalizes to `id`.
fn find_id_column(dataset: &Dataset) -> Option<usize> {
    let id = normalize_column_name(ID_COLUMN);
    dataset
        .columns()
        .iter()
        .position(|column| normalize_column_name(column) == id)
}

/// Number the rows 1..N, reusing `existing` as the identifier column if given.
fn assign_ids(dataset: &mut Dataset, existing: Option<usize>) -> Result<(), PipelineError> {
    let ids = (1..=dataset.len() as i64).map(CellValue::Integer).collect();
    match existing {
        Some(index) => dataset.set_column(index, ids),
        None => dataset.append_column(ID_COLUMN, ids),
    }
    .map_err(|e| PipelineError::format(format!("cannot assign identifiers: {}", e)))
}

fn normalize_columns(dataset: &mut Dataset) -> Result<(), PipelineError> {
    let mut normalized: HashMap<String, &str> = HashMap::with_capacity(dataset.width());
    for column in dataset.columns() {
        let name = normalize_column_name(column);
        if name.is_empty() {
            return Err(PipelineError::format(format!(
                "column '{}' has no characters left after normalization",
                column
            )));
        }
        if let Some(previous) = normalized.insert(name.clone(), column) {
            return Err(PipelineError::format(format!(
                "columns '{}' and '{}' both normalize to '{}'",
                previous, column, name
            )));
        }
    }

    dataset
        .rename_columns(normalize_column_name)
        .map_err(|e| PipelineError::format(e.to_string()))
}

/// Configuration for the cleaner.
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Intermediate artifact to read.
    pub input_path: PathBuf,
    /// Clean artifact to write.
    pub output_path: PathBuf,
    pub id_assignment: IdAssignment,
}

/// Outcome of a clean run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub output_path: PathBuf,
    pub stats: CleaningStats,
}

impl fmt::Display for CleanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Preprocessed data: removed {} duplicates and {} missing values. Final record count: {}.",
            self.stats.duplicate_count, self.stats.missing_count, self.stats.final_count
        )
    }
}

/// Stage that cleans the intermediate artifact into the clean artifact.
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Run the stage.
    ///
    /// # Errors
    ///
    /// * `PipelineError::FormatError` - The intermediate artifact is missing or malformed
    /// * `PipelineError::IoError` - The clean artifact cannot be written
    #[instrument(skip(self), fields(
        input = %self.config.input_path.display(),
        output = %self.config.output_path.display(),
        id_assignment = %self.config.id_assignment,
    ))]
    pub fn run(&self) -> Result<CleanReport, PipelineError> {
        let dataset = artifact::read_dataset(&self.config.input_path)?;
        let (cleaned, stats) = clean(dataset, self.config.id_assignment)?;

        info!(
            initial = stats.initial_count,
            duplicates = stats.duplicate_count,
            missing = stats.missing_count,
            incomplete_rows = stats.incomplete_rows,
            remaining = stats.final_count,
            "Cleaned dataset"
        );

        artifact::write_dataset(&self.config.output_path, &cleaned)?;

        Ok(CleanReport {
            output_path: self.config.output_path.clone(),
            stats,
        })
    }
}
