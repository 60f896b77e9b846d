//! SQL statement builders for the PostgreSQL store.
//!
//! Identifiers are always double-quoted so that source column names are kept
//! verbatim, including case, spaces and punctuation.

use dataset_pipeline_shared::ColumnType;

use crate::errors::StoreError;

/// PostgreSQL truncates identifiers longer than this many bytes.
const MAX_IDENTIFIER_BYTES: usize = 63;

/// Upper bound on bind parameters in one statement.
const MAX_BIND_PARAMS: usize = 65_535;

/// Lists the columns of a table in the current schema, in declared order.
pub(crate) const COLUMNS_SQL: &str = "SELECT column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = current_schema() AND table_name::text = $1 \
     ORDER BY ordinal_position";

/// Quote an identifier, rejecting names PostgreSQL would alter or refuse.
pub(crate) fn quote_ident(name: &str) -> Result<String, StoreError> {
    if name.is_empty() {
        return Err(StoreError::invalid_schema("empty identifier"));
    }
    if name.len() > MAX_IDENTIFIER_BYTES {
        return Err(StoreError::invalid_schema(format!(
            "identifier '{}' exceeds {} bytes",
            name, MAX_IDENTIFIER_BYTES
        )));
    }
    if name.contains('\0') {
        return Err(StoreError::invalid_schema(format!(
            "identifier '{}' contains a NUL byte",
            name.escape_default()
        )));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

pub(crate) fn sql_type(kind: ColumnType) -> &'static str {
    match kind {
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "DOUBLE PRECISION",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Text => "TEXT",
    }
}

/// Map an `information_schema` data type to the column type it is read back as.
pub(crate) fn stored_kind(data_type: &str) -> ColumnType {
    match data_type {
        "bigint" | "integer" | "smallint" => ColumnType::Integer,
        "double precision" | "real" | "numeric" => ColumnType::Float,
        "boolean" => ColumnType::Boolean,
        _ => ColumnType::Text,
    }
}

pub(crate) fn drop_table_sql(table: &str) -> Result<String, StoreError> {
    Ok(format!("DROP TABLE IF EXISTS {}", quote_ident(table)?))
}

pub(crate) fn create_table_sql(
    table: &str,
    columns: &[String],
    kinds: &[ColumnType],
) -> Result<String, StoreError> {
    if columns.is_empty() {
        return Err(StoreError::invalid_schema(format!(
            "table '{}' would have no columns",
            table
        )));
    }
    let definitions = columns
        .iter()
        .zip(kinds)
        .map(|(name, kind)| -> Result<String, StoreError> {
            Ok(format!("{} {}", quote_ident(name)?, sql_type(*kind)))
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_ident(table)?,
        definitions.join(", ")
    ))
}

/// Number of rows that fit in one multi-row INSERT for a table of `width` columns.
pub(crate) fn rows_per_insert(width: usize) -> usize {
    (MAX_BIND_PARAMS / width.max(1)).max(1)
}

/// Build `INSERT INTO t (c1, c2) VALUES ($1, $2), ($3, $4), ...` for `rows` rows.
pub(crate) fn insert_sql(
    table: &str,
    columns: &[String],
    rows: usize,
) -> Result<String, StoreError> {
    let names = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Result<Vec<_>, _>>()?;
    let width = columns.len();

    let tuples: Vec<String> = (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect();

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table)?,
        names.join(", "),
        tuples.join(", ")
    ))
}

/// Select every column cast to the type it is decoded as.
pub(crate) fn select_sql(
    table: &str,
    columns: &[(String, ColumnType)],
) -> Result<String, StoreError> {
    let projections = columns
        .iter()
        .map(|(name, kind)| -> Result<String, StoreError> {
            let ident = quote_ident(name)?;
            let cast = match kind {
                ColumnType::Integer => "bigint",
                ColumnType::Float => "double precision",
                ColumnType::Boolean => "boolean",
                ColumnType::Text => "text",
            };
            Ok(format!("{}::{} AS {}", ident, cast, ident))
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(format!(
        "SELECT {} FROM {}",
        projections.join(", "),
        quote_ident(table)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quote_ident_keeps_name_verbatim() {
        assert_eq!(quote_ident("User Name").unwrap(), "\"User Name\"");
        assert_eq!(quote_ident("say \"hi\"").unwrap(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_quote_ident_rejects_invalid_names() {
        assert!(matches!(quote_ident(""), Err(StoreError::InvalidSchema(_))));
        let long = "x".repeat(64);
        assert!(matches!(quote_ident(&long), Err(StoreError::InvalidSchema(_))));
        assert!(quote_ident(&"x".repeat(63)).is_ok());
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql(
            "table_m3",
            &cols(&["Name", "Age", "Score", "Active"]),
            &[
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Boolean,
            ],
        )
        .unwrap();

        assert_eq!(
            sql,
            "CREATE TABLE \"table_m3\" (\"Name\" TEXT, \"Age\" BIGINT, \
             \"Score\" DOUBLE PRECISION, \"Active\" BOOLEAN)"
        );
    }

    #[test]
    fn test_create_table_requires_columns() {
        assert!(matches!(
            create_table_sql("t", &[], &[]),
            Err(StoreError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_insert_sql_numbers_parameters_across_rows() {
        let sql = insert_sql("t", &cols(&["a", "b"]), 2).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn test_rows_per_insert_respects_bind_limit() {
        assert_eq!(rows_per_insert(1), 65_535);
        assert_eq!(rows_per_insert(10), 6_553);
        assert!(rows_per_insert(10) * 10 <= 65_535);
        assert_eq!(rows_per_insert(0), 65_535);
        assert_eq!(rows_per_insert(100_000), 1);
    }

    #[test]
    fn test_select_sql_casts_columns() {
        let sql = select_sql(
            "t",
            &[
                ("Age".to_string(), ColumnType::Integer),
                ("Name".to_string(), ColumnType::Text),
            ],
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT \"Age\"::bigint AS \"Age\", \"Name\"::text AS \"Name\" FROM \"t\""
        );
    }

    #[test]
    fn test_stored_kind_mapping() {
        assert_eq!(stored_kind("integer"), ColumnType::Integer);
        assert_eq!(stored_kind("double precision"), ColumnType::Float);
        assert_eq!(stored_kind("boolean"), ColumnType::Boolean);
        assert_eq!(stored_kind("character varying"), ColumnType::Text);
        assert_eq!(stored_kind("timestamp without time zone"), ColumnType::Text);
    }
}
