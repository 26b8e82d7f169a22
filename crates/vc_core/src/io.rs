//! CSV reading and writing
//!
//! Two readers are provided: [`read_raw_csv`] keeps every cell as text (the
//! cleaner does its own typing), and [`read_typed_csv`] infers a storage type
//! per column the way a spreadsheet-style loader would.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use tracing::{debug, warn};

use crate::errors::{DataError, Result};
use crate::table::{Column, Table};

/// Cell spellings treated as missing on read
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(raw: &str) -> bool {
    NA_MARKERS.contains(&raw)
}

/// Decode bytes as UTF-8, falling back to one code point per byte.
pub fn decode_lossless(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            warn!(
                "input is not valid UTF-8 (first bad byte at {}), decoding byte-wise",
                err.valid_up_to()
            );
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Header plus text cells, with short rows padded and long rows truncated
fn read_cells(path: &Path) -> Result<(Vec<String>, Vec<Vec<Option<String>>>)> {
    let bytes = read_bytes(path)?;
    let text = decode_lossless(&bytes);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = header.len();
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    let mut truncated = 0usize;

    for record in reader.records() {
        let record = record?;
        if record.len() > width {
            truncated += 1;
        }
        for (idx, column) in columns.iter_mut().enumerate() {
            let cell = record
                .get(idx)
                .filter(|raw| !is_na(raw))
                .map(str::to_string);
            column.push(cell);
        }
    }

    if truncated > 0 {
        warn!("{} rows had more fields than the header and were truncated", truncated);
    }

    Ok((header, columns))
}

/// Load a CSV with every column as nullable text
pub fn read_raw_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let (header, cells) = read_cells(path)?;
    let table = Table::from_columns(header.into_iter().zip(cells.into_iter().map(Column::Text)))?;
    debug!(
        "read {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Load a CSV, inferring each column's storage type
pub fn read_typed_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let (header, cells) = read_cells(path)?;
    let table = Table::from_columns(header.into_iter().zip(cells.into_iter().map(infer_column)))?;
    debug!(
        "read {} rows x {} typed columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Pick the narrowest storage type that holds every value.
///
/// `True`/`False` only become bool when no value is missing, integers only
/// become int when no value is missing, otherwise numeric text becomes float.
pub fn infer_column(values: Vec<Option<String>>) -> Column {
    let has_null = values.iter().any(Option::is_none);
    let present = || values.iter().flatten();

    if values.is_empty() || present().next().is_none() {
        return Column::Float(vec![None; values.len()]);
    }

    if !has_null && present().all(|v| v == "True" || v == "False") {
        return Column::Bool(values.iter().flatten().map(|v| v == "True").collect());
    }

    if !has_null && present().all(|v| v.parse::<i64>().is_ok()) {
        return Column::Int(
            values
                .iter()
                .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
                .collect(),
        );
    }

    if present().all(|v| v.parse::<f64>().is_ok()) {
        return Column::Float(
            values
                .iter()
                .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
                .collect(),
        );
    }

    Column::Text(values)
}

/// Write a table as CSV with a header row and no index column
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record(table.names())?;

    let columns: Vec<&Column> = table.columns().map(|(_, c)| c).collect();
    let mut record = Vec::with_capacity(columns.len());
    for row in 0..table.n_rows() {
        record.clear();
        record.extend(columns.iter().map(|c| c.render(row)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(content: &[u8]) -> std::io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content)?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read_raw_csv("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn test_raw_read_pads_short_rows() -> anyhow::Result<()> {
        let file = write_fixture(b"a,b,c\n1,2,3\n4,5\n6,7,8,9\n")?;
        let table = read_raw_csv(file.path())?;

        assert_eq!(table.n_rows(), 3);
        let c = table.column("c")?.as_text().unwrap();
        assert_eq!(c[1], None);
        assert_eq!(c[2].as_deref(), Some("8"));
        Ok(())
    }

    #[test]
    fn test_latin1_fallback() -> anyhow::Result<()> {
        let file = write_fixture(b"name\nCaf\xe9\n")?;
        let table = read_raw_csv(file.path())?;
        let name = table.column("name")?.as_text().unwrap();
        assert_eq!(name[0].as_deref(), Some("Caf\u{e9}"));
        Ok(())
    }

    #[test]
    fn test_infer_types() {
        let col = |v: &[Option<&str>]| infer_column(v.iter().map(|s| s.map(String::from)).collect());

        assert_eq!(col(&[Some("1"), Some("2")]).dtype(), DType::Int);
        assert_eq!(col(&[Some("1"), None]).dtype(), DType::Float);
        assert_eq!(col(&[Some("1.0"), Some("2")]).dtype(), DType::Float);
        assert_eq!(col(&[Some("True"), Some("False")]).dtype(), DType::Bool);
        assert_eq!(col(&[Some("True"), None]).dtype(), DType::Text);
        assert_eq!(col(&[Some("x"), Some("2")]).dtype(), DType::Text);
        assert_eq!(col(&[None, None]).dtype(), DType::Float);
    }

    #[test]
    fn test_write_then_read_keeps_types() -> anyhow::Result<()> {
        let table = Table::from_columns(vec![
            ("amount", Column::Float(vec![Some(1_250_000.0), Some(0.0)])),
            ("flag", Column::Bool(vec![true, false])),
            ("label", Column::Text(vec![Some("a,b".into()), None])),
        ])?;
        let file = NamedTempFile::new()?;
        write_csv(&table, file.path())?;

        let text = std::fs::read_to_string(file.path())?;
        assert!(text.starts_with("amount,flag,label\n1250000.0,True,\"a,b\"\n"));

        let back = read_typed_csv(file.path())?;
        assert_eq!(back.column("amount")?.dtype(), DType::Float);
        assert_eq!(back.column("flag")?.dtype(), DType::Bool);
        assert_eq!(back.column("label")?.dtype(), DType::Text);
        Ok(())
    }
}
