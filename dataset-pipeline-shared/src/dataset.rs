//! In-memory tabular dataset.
//!
//! A [`Dataset`] is an ordered list of rows over an ordered list of column
//! names. Every stage of the pipeline reads one dataset, transforms it and
//! hands a new one to the next stage; there is no shared mutable table.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;
use thiserror::Error;

/// Textual markers that are read as a missing value.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Whether a raw field should be read as a missing value.
pub fn is_missing_marker(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw)
}

/// Errors raised when a dataset would become structurally inconsistent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// A row does not have one value per column.
    #[error("Row {row} has {actual} values, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A new column does not have one value per row.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share a name.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Column {index} out of range for {width} columns")]
    ColumnOutOfRange { index: usize, width: usize },
}

/// Scalar type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    /// Infer the type of a column from its raw textual fields.
    ///
    /// Missing markers are ignored. A column with no present values is `Text`.
    pub fn infer<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut integer = true;
        let mut float = true;
        let mut boolean = true;
        let mut seen = false;

        for field in fields {
            if is_missing_marker(field) {
                continue;
            }
            seen = true;
            let trimmed = field.trim();
            integer = integer && trimmed.parse::<i64>().is_ok();
            float = float && trimmed.parse::<f64>().is_ok();
            boolean = boolean && parse_bool(trimmed).is_some();
            if !integer && !float && !boolean {
                return Self::Text;
            }
        }

        match (seen, integer, float, boolean) {
            (false, ..) => Self::Text,
            (true, true, _, _) => Self::Integer,
            (true, false, true, _) => Self::Float,
            (true, false, false, true) => Self::Boolean,
            _ => Self::Text,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A single scalar cell.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl CellValue {
    /// Parse a raw field as a value of the given column type.
    ///
    /// Fields that do not parse as the requested type fall back to text, so a
    /// caller that inferred the type with [`ColumnType::infer`] never loses data.
    pub fn parse(raw: &str, kind: ColumnType) -> Self {
        if is_missing_marker(raw) {
            return Self::Null;
        }
        let trimmed = raw.trim();
        match kind {
            ColumnType::Integer => trimmed
                .parse()
                .map(Self::Integer)
                .unwrap_or_else(|_| Self::Text(raw.to_string())),
            ColumnType::Float => trimmed
                .parse()
                .map(Self::Float)
                .unwrap_or_else(|_| Self::Text(raw.to_string())),
            ColumnType::Boolean => parse_bool(trimmed)
                .map(Self::Boolean)
                .unwrap_or_else(|| Self::Text(raw.to_string())),
            ColumnType::Text => Self::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Boolean(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a JSON value for a search document body.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(v) => Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean(v) => Value::Bool(*v),
            Self::Text(v) => Value::String(v.clone()),
        }
    }

    fn float_key(v: f64) -> u64 {
        if v == 0.0 {
            0.0f64.to_bits()
        } else if v.is_nan() {
            f64::NAN.to_bits()
        } else {
            v.to_bits()
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => Self::float_key(*a) == Self::float_key(*b),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Integer(v) => v.hash(state),
            Self::Float(v) => Self::float_key(*v).hash(state),
            Self::Boolean(v) => v.hash(state),
            Self::Text(v) => v.hash(state),
        }
    }
}

/// Renders the value the way it is written to a delimited artifact.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(true) => f.write_str("True"),
            Self::Boolean(false) => f.write_str("False"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// An ordered set of records over named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Create an empty dataset with the given columns.
    pub fn new(columns: Vec<String>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(DatasetError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a dataset from columns and rows, checking every row's width.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(columns)?;
        dataset.rows.reserve(rows.len());
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), DatasetError> {
        if row.len() != self.columns.len() {
            return Err(DatasetError::RowWidthMismatch {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Type of a column derived from the values it currently holds.
    ///
    /// Integer and float values mixed in one column widen to `Float`; any
    /// other mix, or a column of nulls only, is `Text`.
    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut kind: Option<ColumnType> = None;
        for value in self.column_values(index) {
            let value_kind = match value {
                CellValue::Null => continue,
                CellValue::Integer(_) => ColumnType::Integer,
                CellValue::Float(_) => ColumnType::Float,
                CellValue::Boolean(_) => ColumnType::Boolean,
                CellValue::Text(_) => return ColumnType::Text,
            };
            kind = match (kind, value_kind) {
                (None, k) => Some(k),
                (Some(a), b) if a == b => Some(a),
                (Some(ColumnType::Integer), ColumnType::Float)
                | (Some(ColumnType::Float), ColumnType::Integer) => Some(ColumnType::Float),
                _ => return ColumnType::Text,
            };
        }
        kind.unwrap_or(ColumnType::Text)
    }

    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.width()).map(|i| self.column_type(i)).collect()
    }

    /// Append a column holding one value per existing row.
    pub fn append_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<CellValue>,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        if self.column_index(&name).is_some() {
            return Err(DatasetError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(DatasetError::ColumnLengthMismatch {
                column: name,
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name);
        Ok(())
    }

    /// Overwrite the values of an existing column, one per row.
    pub fn set_column(&mut self, index: usize, values: Vec<CellValue>) -> Result<(), DatasetError> {
        let Some(name) = self.columns.get(index) else {
            return Err(DatasetError::ColumnOutOfRange {
                index,
                width: self.columns.len(),
            });
        };
        if values.len() != self.rows.len() {
            return Err(DatasetError::ColumnLengthMismatch {
                column: name.clone(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
        Ok(())
    }

    /// Replace every column name with `rename(name)`.
    ///
    /// Fails without modifying the dataset if two renamed columns collide.
    pub fn rename_columns<F>(&mut self, rename: F) -> Result<(), DatasetError>
    where
        F: Fn(&str) -> String,
    {
        let renamed: Vec<String> = self.columns.iter().map(|c| rename(c.as_str())).collect();
        let mut seen = HashSet::with_capacity(renamed.len());
        for name in &renamed {
            if !seen.insert(name.as_str()) {
                return Err(DatasetError::DuplicateColumn(name.clone()));
            }
        }
        self.columns = renamed;
        Ok(())
    }

    /// Keep only rows for which `keep` returns true. Returns the number removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Remove rows equal in every column to an earlier row. Returns the number removed.
    pub fn drop_duplicate_rows(&mut self) -> usize {
        self.drop_duplicate_rows_by(|row| row.to_vec())
    }

    /// Remove rows whose `key` equals that of an earlier row. Returns the number removed.
    pub fn drop_duplicate_rows_by<F, K>(&mut self, key: F) -> usize
    where
        F: Fn(&[CellValue]) -> K,
        K: Eq + Hash,
    {
        let mut seen: HashSet<K> = HashSet::with_capacity(self.rows.len());
        self.retain_rows(|row| seen.insert(key(row)))
    }

    /// Total count of null cells across all columns.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|v| v.is_null()).count())
            .sum()
    }

    /// Remove every row holding at least one null. Returns the number removed.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        self.retain_rows(|row| !row.iter().any(CellValue::is_null))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_column_types() {
        assert_eq!(ColumnType::infer(["1", "2", ""]), ColumnType::Integer);
        assert_eq!(ColumnType::infer(["1", "2.5"]), ColumnType::Float);
        assert_eq!(ColumnType::infer(["True", "false", "NA"]), ColumnType::Boolean);
        assert_eq!(ColumnType::infer(["1", "abc"]), ColumnType::Text);
        assert_eq!(ColumnType::infer(["", "NaN"]), ColumnType::Text);
    }

    #[test]
    fn test_parse_missing_markers() {
        for marker in ["", "NA", "NaN", "null", "None"] {
            assert!(CellValue::parse(marker, ColumnType::Integer).is_null());
        }
        assert_eq!(
            CellValue::parse(" 42 ", ColumnType::Integer),
            CellValue::Integer(42)
        );
        assert_eq!(
            CellValue::parse("Hello", ColumnType::Text),
            CellValue::Text("Hello".to_string())
        );
    }

    #[test]
    fn test_display_matches_artifact_format() {
        assert_eq!(CellValue::Float(7.0).to_string(), "7.0");
        assert_eq!(CellValue::Float(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Boolean(true).to_string(), "True");
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn test_float_equality_is_total() {
        assert_eq!(CellValue::Float(0.0), CellValue::Float(-0.0));
        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(CellValue::Integer(3).to_json(), serde_json::json!(3));
        assert_eq!(CellValue::Float(f64::INFINITY).to_json(), Value::Null);
        assert_eq!(CellValue::Text("x".into()).to_json(), serde_json::json!("x"));
    }

    #[test]
    fn test_row_width_checked() {
        let result = Dataset::from_rows(cols(&["a", "b"]), vec![vec![1i64.into()]]);
        assert!(matches!(
            result,
            Err(DatasetError::RowWidthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        assert!(matches!(
            Dataset::new(cols(&["a", "a"])),
            Err(DatasetError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let mut ds = Dataset::from_rows(
            cols(&["a", "b"]),
            vec![
                vec![1i64.into(), "x".into()],
                vec![2i64.into(), "y".into()],
                vec![1i64.into(), "x".into()],
            ],
        )
        .unwrap();

        assert_eq!(ds.drop_duplicate_rows(), 1);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1][0], CellValue::Integer(2));
    }

    #[test]
    fn test_drop_duplicates_by_key_ignores_other_columns() {
        let mut ds = Dataset::from_rows(
            cols(&["id", "b"]),
            vec![
                vec![1i64.into(), "x".into()],
                vec![2i64.into(), "x".into()],
                vec![3i64.into(), "y".into()],
            ],
        )
        .unwrap();

        assert_eq!(ds.drop_duplicate_rows_by(|row| row[1].clone()), 1);
        assert_eq!(ds.column_values(0).collect::<Vec<_>>(), vec![&CellValue::Integer(1), &CellValue::Integer(3)]);
    }

    #[test]
    fn test_set_column() {
        let mut ds = Dataset::from_rows(
            cols(&["id", "b"]),
            vec![vec![7i64.into(), "x".into()], vec![9i64.into(), "y".into()]],
        )
        .unwrap();

        ds.set_column(0, vec![1i64.into(), 2i64.into()]).unwrap();
        assert_eq!(ds.rows()[1][0], CellValue::Integer(2));

        assert!(matches!(
            ds.set_column(0, vec![1i64.into()]),
            Err(DatasetError::ColumnLengthMismatch { .. })
        ));
        assert!(matches!(
            ds.set_column(5, vec![]),
            Err(DatasetError::ColumnOutOfRange { index: 5, width: 2 })
        ));
    }

    #[test]
    fn test_missing_count_and_drop() {
        let mut ds = Dataset::from_rows(
            cols(&["a", "b"]),
            vec![
                vec![CellValue::Null, CellValue::Null],
                vec![1i64.into(), CellValue::Null],
                vec![2i64.into(), 3i64.into()],
            ],
        )
        .unwrap();

        assert_eq!(ds.missing_count(), 3);
        assert_eq!(ds.drop_incomplete_rows(), 2);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_column_type_from_values() {
        let ds = Dataset::from_rows(
            cols(&["i", "f", "t", "n"]),
            vec![
                vec![1i64.into(), 1i64.into(), "a".into(), CellValue::Null],
                vec![2i64.into(), 2.5f64.into(), 3i64.into(), CellValue::Null],
            ],
        )
        .unwrap();

        assert_eq!(
            ds.column_types(),
            vec![
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Text,
                ColumnType::Text
            ]
        );
    }

    #[test]
    fn test_append_and_rename_columns() {
        let mut ds =
            Dataset::from_rows(cols(&["User Name"]), vec![vec!["ann".into()], vec!["bo".into()]])
                .unwrap();

        ds.append_column("ID", vec![1i64.into(), 2i64.into()]).unwrap();
        ds.rename_columns(|c| c.to_lowercase().replace(' ', "_")).unwrap();

        assert_eq!(ds.columns(), &["user_name".to_string(), "id".to_string()]);
        assert_eq!(ds.rows()[1][1], CellValue::Integer(2));
    }

    #[test]
    fn test_rename_collision_leaves_dataset_untouched() {
        let mut ds = Dataset::new(cols(&["A", "a"])).unwrap();
        let result = ds.rename_columns(|c| c.to_lowercase());
        assert!(matches!(result, Err(DatasetError::DuplicateColumn(_))));
        assert_eq!(ds.columns(), &["A".to_string(), "a".to_string()]);
    }
}
