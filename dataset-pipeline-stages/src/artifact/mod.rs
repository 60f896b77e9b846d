//! Delimited file artifacts.
//!
//! Stages hand data to each other through comma-separated files with a
//! header row. Reading infers one scalar type per column; writing renders
//! values so that reading the file back yields the same dataset.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use dataset_pipeline_shared::{CellValue, ColumnType, Dataset};

/// Read a whole delimited file into a dataset.
///
/// # Errors
///
/// Returns `PipelineError::FormatError` if the file does not exist, has no
/// header row, or contains a malformed or ragged record.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_dataset(path: &Path) -> Result<Dataset, PipelineError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            PipelineError::format(format!("file not found: {}", path.display()))
        }
        _ => PipelineError::format(format!("cannot open {}: {}", path.display(), e)),
    })?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    if headers.is_empty() {
        return Err(PipelineError::format(format!(
            "no columns to parse from {}",
            path.display()
        )));
    }

    let records = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(|e| parse_error(path, e))?;

    let kinds: Vec<ColumnType> = (0..headers.len())
        .map(|col| ColumnType::infer(records.iter().map(|r| r.get(col).unwrap_or(""))))
        .collect();

    let rows: Vec<Vec<CellValue>> = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&kinds)
                .map(|(field, kind)| CellValue::parse(field, *kind))
                .collect()
        })
        .collect();

    let dataset = Dataset::from_rows(repair_headers(headers), rows)
        .map_err(|e| PipelineError::format(format!("{}: {}", path.display(), e)))?;

    debug!(rows = dataset.len(), columns = dataset.width(), "Read artifact");
    Ok(dataset)
}

/// Write a dataset as a delimited file with a header row.
///
/// The file is written next to its destination and renamed into place, so
/// a reader never observes a partially written artifact. Missing parent
/// directories are created.
#[instrument(skip_all, fields(path = %path.display(), rows = dataset.len()))]
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    let result = write_records(&staging, dataset).and_then(|()| {
        fs::rename(&staging, path)?;
        Ok(())
    });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_records(path: &Path, dataset: &Dataset) -> Result<(), PipelineError> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(io::Error::from)?;

    writer
        .write_record(dataset.columns())
        .map_err(io::Error::from)?;

    for row in dataset.rows() {
        writer
            .write_record(row.iter().map(|value| value.to_string()))
            .map_err(io::Error::from)?;
    }

    writer.flush()?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn parse_error(path: &Path, err: csv::Error) -> PipelineError {
    PipelineError::format(format!("cannot parse {}: {}", path.display(), err))
}

/// Give every column a distinct, non-empty name.
///
/// Blank headers become `Unnamed: {position}`; a repeated name `x` becomes
/// `x.1`, `x.2` and so on.
fn repair_headers(headers: Vec<String>) -> Vec<String> {
    let original: HashSet<String> = headers.iter().cloned().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    headers
        .into_iter()
        .enumerate()
        .map(|(position, header)| {
            let base = if header.is_empty() {
                format!("Unnamed: {}", position)
            } else {
                header
            };

            let mut name = base.clone();
            while used.contains(&name) {
                let suffix = suffixes.entry(base.clone()).or_insert(0);
                *suffix += 1;
                let candidate = format!("{}.{}", base, suffix);
                if !original.contains(&candidate) {
                    name = candidate;
                }
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
