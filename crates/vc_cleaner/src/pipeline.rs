//! Ordered cleaning and feature-engineering pipeline
//!
//! Step order is part of the output contract: later steps depend on the
//! dtypes and row set left by earlier ones, and the column layout of the
//! cleaned file follows directly from it.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};
use vc_core::{infer_column, read_raw_csv, write_csv, Column, DType, Table};

use crate::categories::expand_categories;
use crate::config::CleanerConfig;
use crate::dates::{
    add_day_delta, coerce_date_column, month_names, normalize_founded_month,
    normalize_founded_quarter, normalize_founded_year,
};
use crate::encoding::one_hot;
use crate::errors::{CleanerError, Result};
use crate::funding::normalize_funding;
use crate::names::repair_names;
use crate::schema::*;

/// Row and column counts of one cleaning run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub input_rows: usize,
    pub numeric_columns: usize,
    pub duplicate_rows: usize,
    pub empty_rows: usize,
    pub names_repaired: usize,
    pub missing_permalink_rows: usize,
    pub missing_year_rows: usize,
    pub null_rows: usize,
    pub category_columns: usize,
    pub output_rows: usize,
    pub output_columns: usize,
}

/// Data cleaner
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Read `input`, clean it and write the result to `output`
    pub fn run(&self, input: &Path, output: &Path) -> Result<CleanSummary> {
        info!("Importing dataset: {}", input.display());
        let raw = read_raw_csv(input)?;
        info!("Loaded {} rows x {} columns", raw.n_rows(), raw.n_cols());

        let (cleaned, summary) = self.clean(raw)?;

        info!("Saving cleaned dataset to: {}", output.display());
        write_csv(&cleaned, output)?;
        if output.exists() {
            info!("Created {}", output.display());
        } else {
            warn!("{} was not found after writing", output.display());
        }

        Ok(summary)
    }

    /// Apply every step in order to a raw, all-text table
    pub fn clean(&self, mut table: Table) -> Result<(Table, CleanSummary)> {
        let mut summary = CleanSummary {
            input_rows: table.n_rows(),
            ..Default::default()
        };

        summary.numeric_columns =
            type_numeric_columns(&mut table).map_err(CleanerError::at("numeric typing"))?;
        debug!("Typed {} raw columns as numeric", summary.numeric_columns);

        // Deduplication and empty rows
        let (duplicates, empties) = drop_duplicates_and_empty(&mut table);
        summary.duplicate_rows = duplicates;
        summary.empty_rows = empties;
        info!("Dropped {} duplicate and {} empty rows", duplicates, empties);

        // Header whitespace
        table
            .rename_all(|name| name.trim().to_string())
            .map_err(CleanerError::at("strip column names"))?;

        // Missing names
        summary.names_repaired = repair_names(&mut table, &self.config.name_repairs)
            .map_err(CleanerError::at("repair names"))?;
        info!("Repaired {} missing names", summary.names_repaired);

        // Permalink is the record key
        let keep: Vec<bool> = table
            .text(PERMALINK)
            .map_err(CleanerError::at("permalink filter"))?
            .iter()
            .map(Option::is_some)
            .collect();
        summary.missing_permalink_rows = table.retain_rows(&keep);
        debug!("Dropped {} rows without permalink", summary.missing_permalink_rows);

        normalize_funding(&mut table).map_err(CleanerError::at("funding totals"))?;

        normalize_founded_month(&mut table).map_err(CleanerError::at("founded month"))?;
        normalize_founded_quarter(&mut table).map_err(CleanerError::at("founded quarter"))?;
        summary.missing_year_rows =
            normalize_founded_year(&mut table).map_err(CleanerError::at("founded year"))?;
        info!(
            "Normalized founding dates, dropped {} rows without founded_year",
            summary.missing_year_rows
        );

        let categories =
            expand_categories(&mut table).map_err(CleanerError::at("category expansion"))?;
        summary.category_columns = categories.len();
        info!("Expanded category_list into {} indicator columns", categories.len());

        for name in DATE_COLUMNS {
            let failed =
                coerce_date_column(&mut table, name).map_err(CleanerError::at("date coercion"))?;
            if failed > 0 {
                debug!("{}: {} unparsable dates set to null", name, failed);
            }
        }
        add_day_delta(&mut table, DAYS_TO_FUNDING, FOUNDED_AT, FIRST_FUNDING_AT)
            .map_err(CleanerError::at("days to funding"))?;

        fill_status(&mut table).map_err(CleanerError::at("status default"))?;

        for name in CATEGORICAL {
            table
                .mark_categorical(name)
                .map_err(CleanerError::at("categorical typing"))?;
        }

        let months = month_names(&table).map_err(CleanerError::at("month feature"))?;
        table
            .push_column(MONTH_FOUNDED, Column::Text(months))
            .map_err(CleanerError::at("month feature"))?;
        table
            .drop_column(FOUNDED_MONTH)
            .map_err(CleanerError::at("month feature"))?;

        let mut encoded = 0;
        for (column, prefix, drop) in [
            (MONTH_FOUNDED, "month", true),
            (FOUNDED_QUARTER, "quarter", false),
            (STATE_CODE, "state", false),
            (FOUNDED_YEAR, "year", false),
        ] {
            encoded += one_hot(&mut table, column, prefix, drop)
                .map_err(CleanerError::at("one-hot encoding"))?
                .len();
        }
        info!("Added {} one-hot indicator columns", encoded);

        add_day_delta(&mut table, FUNDING_DAYS, FIRST_FUNDING_AT, LAST_FUNDING_AT)
            .map_err(CleanerError::at("funding days"))?;

        summary.null_rows = drop_nulls(&mut table, &REQUIRED).map_err(CleanerError::at("null sweep"))?;
        info!("Dropped {} rows with missing required values", summary.null_rows);

        normalize_market(&mut table).map_err(CleanerError::at("market names"))?;

        summary.output_rows = table.n_rows();
        summary.output_columns = table.n_cols();
        info!(
            "Cleaned dataset: {} rows x {} columns",
            summary.output_rows, summary.output_columns
        );

        Ok((table, summary))
    }
}

/// Give every raw column outside [`PARSED_COLUMNS`] the numeric type its
/// values support. A column with any missing cell becomes float.
/// Returns the number of columns retyped.
pub fn type_numeric_columns(table: &mut Table) -> vc_core::Result<usize> {
    let candidates: Vec<String> = table
        .columns()
        .filter(|(name, column)| {
            column.dtype() == DType::Text && !PARSED_COLUMNS.contains(&name.trim())
        })
        .map(|(name, _)| name.to_string())
        .collect();

    let mut typed = 0;
    for name in candidates {
        let column = infer_column(table.text(&name)?.to_vec());
        if matches!(column.dtype(), DType::Float | DType::Int) {
            table.replace_column(&name, column)?;
            typed += 1;
        }
    }
    Ok(typed)
}

/// Drop exact duplicate rows (first occurrence wins), then all-null rows
pub fn drop_duplicates_and_empty(table: &mut Table) -> (usize, usize) {
    let mut seen = HashSet::with_capacity(table.n_rows());
    let unique: Vec<bool> = (0..table.n_rows()).map(|i| seen.insert(table.row(i))).collect();
    let duplicates = table.retain_rows(&unique);

    let non_empty: Vec<bool> = (0..table.n_rows())
        .map(|i| table.row(i).iter().any(|cell| !cell.is_null()))
        .collect();
    let empties = table.retain_rows(&non_empty);

    (duplicates, empties)
}

fn fill_status(table: &mut Table) -> vc_core::Result<()> {
    let status = table
        .text(STATUS)?
        .iter()
        .map(|s| Some(s.clone().unwrap_or_else(|| PENDING.to_string())))
        .collect();
    table.replace_column(STATUS, Column::Text(status))?;
    Ok(())
}

/// Drop rows with a null in any of `columns`; returns rows removed
pub fn drop_nulls(table: &mut Table, columns: &[&str]) -> vc_core::Result<usize> {
    let mut keep = vec![true; table.n_rows()];
    for name in columns {
        let column = table.column(name)?;
        for (row, flag) in keep.iter_mut().enumerate() {
            if column.is_null(row) {
                *flag = false;
            }
        }
    }
    Ok(table.retain_rows(&keep))
}

fn normalize_market(table: &mut Table) -> vc_core::Result<()> {
    let market = table
        .text(MARKET)?
        .iter()
        .map(|m| m.as_deref().map(|m| m.trim().to_lowercase()))
        .collect();
    table.replace_column(MARKET, Column::Text(market))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_then_empty_rows() {
        let mut table = Table::from_columns(vec![
            ("a", Column::Text(vec![Some("1".into()), Some("1".into()), None, None])),
            ("b", Column::Text(vec![Some("x".into()), Some("x".into()), None, None])),
        ])
        .unwrap();

        let (dups, empties) = drop_duplicates_and_empty(&mut table);
        assert_eq!((dups, empties), (2, 1));
        assert_eq!(table.n_rows(), 1);
        assert_eq!(table.source_rows(), &[0]);
    }

    #[test]
    fn test_numeric_typing_skips_parsed_columns() {
        let text = |v: &[Option<&str>]| Column::Text(v.iter().map(|s| s.map(String::from)).collect());
        let mut table = Table::from_columns(vec![
            ("seed", text(&[Some("1750000"), None])),
            ("funding_rounds", text(&[Some("1"), Some("2")])),
            ("region", text(&[Some("SF Bay Area"), None])),
            (" funding_total_usd ", text(&[Some("100"), None])),
            ("founded_year", text(&[Some("2012"), None])),
        ])
        .unwrap();

        assert_eq!(type_numeric_columns(&mut table).unwrap(), 2);
        assert_eq!(table.float("seed").unwrap(), &[Some(1_750_000.0), None]);
        assert_eq!(table.int("funding_rounds").unwrap(), &[Some(1), Some(2)]);
        assert_eq!(table.column("region").unwrap().dtype(), DType::Text);
        assert_eq!(table.column(" funding_total_usd ").unwrap().dtype(), DType::Text);
        assert_eq!(table.column("founded_year").unwrap().dtype(), DType::Text);
    }

    #[test]
    fn test_drop_nulls_checks_every_column() {
        let mut table = Table::from_columns(vec![
            ("a", Column::Float(vec![Some(1.0), None, Some(3.0)])),
            ("b", Column::Text(vec![Some("x".into()), Some("y".into()), None])),
        ])
        .unwrap();
        assert_eq!(drop_nulls(&mut table, &["a", "b"]).unwrap(), 2);
        assert_eq!(table.source_rows(), &[0]);
    }
}
