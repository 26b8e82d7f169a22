//! In-memory columnar table
//!
//! Columns are typed vectors with explicit nulls. Every table keeps the
//! zero-based data-row index each row had in its source file, so rows can be
//! addressed by a stable identifier after filtering and deduplication.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::{DataError, Result};

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Text,
    Float,
    Int,
    Bool,
    Date,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Text => "text",
            DType::Float => "float",
            DType::Int => "int",
            DType::Bool => "bool",
            DType::Date => "date",
        };
        f.write_str(name)
    }
}

/// A single typed column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Bool(Vec<bool>),
    Date(Vec<Option<NaiveDate>>),
}

/// Hashable, totally ordered view of one cell.
///
/// Float cells are rendered to their text form; categorical handling never
/// sees float columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cell {
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
    Text(String),
    Null,
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Text(s) => f.write_str(s),
            Cell::Null => Ok(()),
        }
    }
}

/// Render a float so that it always reads back as a float.
pub fn format_float(value: f64) -> String {
    let mut out = value.to_string();
    if value.is_finite() && !out.contains('.') {
        out.push_str(".0");
    }
    out
}

fn filter_vec<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(v, _)| v.clone())
        .collect()
}

fn take_vec<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Column::Text(_) => DType::Text,
            Column::Float(_) => DType::Float,
            Column::Int(_) => DType::Int,
            Column::Bool(_) => DType::Bool,
            Column::Date(_) => DType::Date,
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Text(v) => v[row].is_none(),
            Column::Float(v) => v[row].map_or(true, f64::is_nan),
            Column::Int(v) => v[row].is_none(),
            Column::Bool(_) => false,
            Column::Date(v) => v[row].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_null(i)).count()
    }

    pub fn cell(&self, row: usize) -> Cell {
        if self.is_null(row) {
            return Cell::Null;
        }
        match self {
            Column::Text(v) => v[row].clone().map_or(Cell::Null, Cell::Text),
            Column::Float(v) => v[row].map_or(Cell::Null, |x| Cell::Text(format_float(x))),
            Column::Int(v) => v[row].map_or(Cell::Null, Cell::Int),
            Column::Bool(v) => Cell::Bool(v[row]),
            Column::Date(v) => v[row].map_or(Cell::Null, Cell::Date),
        }
    }

    /// CSV text of one cell; nulls render empty.
    pub fn render(&self, row: usize) -> String {
        match self {
            Column::Float(v) => v[row]
                .filter(|x| !x.is_nan())
                .map(format_float)
                .unwrap_or_default(),
            _ => self.cell(row).to_string(),
        }
    }

    /// Sorted distinct non-null cells
    pub fn distinct(&self) -> Vec<Cell> {
        let set: BTreeSet<Cell> = (0..self.len())
            .map(|i| self.cell(i))
            .filter(|c| !c.is_null())
            .collect();
        set.into_iter().collect()
    }

    pub fn filter(&self, keep: &[bool]) -> Column {
        match self {
            Column::Text(v) => Column::Text(filter_vec(v, keep)),
            Column::Float(v) => Column::Float(filter_vec(v, keep)),
            Column::Int(v) => Column::Int(filter_vec(v, keep)),
            Column::Bool(v) => Column::Bool(filter_vec(v, keep)),
            Column::Date(v) => Column::Date(filter_vec(v, keep)),
        }
    }

    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Text(v) => Column::Text(take_vec(v, indices)),
            Column::Float(v) => Column::Float(take_vec(v, indices)),
            Column::Int(v) => Column::Int(take_vec(v, indices)),
            Column::Bool(v) => Column::Bool(take_vec(v, indices)),
            Column::Date(v) => Column::Date(take_vec(v, indices)),
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&[Option<i64>]> {
        match self {
            Column::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Column::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&[Option<NaiveDate>]> {
        match self {
            Column::Date(v) => Some(v),
            _ => None,
        }
    }
}

/// Named, equally sized columns plus per-row source indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    source_rows: Vec<usize>,
    levels: BTreeMap<String, Vec<Cell>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns; source rows are numbered from zero
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    /// Replace the source-row identifiers
    pub fn with_source_rows(mut self, source_rows: Vec<usize>) -> Result<Self> {
        if !self.columns.is_empty() && source_rows.len() != self.n_rows() {
            return Err(DataError::Schema(format!(
                "{} source rows for a table of {} rows",
                source_rows.len(),
                self.n_rows()
            )));
        }
        self.source_rows = source_rows;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.source_rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    fn typed<'a, T: ?Sized>(
        &'a self,
        name: &str,
        expected: DType,
        view: impl FnOnce(&'a Column) -> Option<&'a T>,
    ) -> Result<&'a T> {
        let column = self.column(name)?;
        view(column).ok_or_else(|| {
            DataError::Schema(format!(
                "column {name} is {}, expected {expected}",
                column.dtype()
            ))
        })
    }

    pub fn text(&self, name: &str) -> Result<&[Option<String>]> {
        self.typed(name, DType::Text, Column::as_text)
    }

    pub fn float(&self, name: &str) -> Result<&[Option<f64>]> {
        self.typed(name, DType::Float, Column::as_float)
    }

    pub fn int(&self, name: &str) -> Result<&[Option<i64>]> {
        self.typed(name, DType::Int, Column::as_int)
    }

    pub fn date(&self, name: &str) -> Result<&[Option<NaiveDate>]> {
        self.typed(name, DType::Date, Column::as_date)
    }

    /// Append a new column at the right edge
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(DataError::Schema(format!("duplicate column: {name}")));
        }
        if self.columns.is_empty() && self.source_rows.is_empty() {
            self.source_rows = (0..column.len()).collect();
        } else if column.len() != self.n_rows() {
            return Err(DataError::Schema(format!(
                "column {name} has {} rows, table has {}",
                column.len(),
                self.n_rows()
            )));
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Swap a column's contents in place, keeping its position
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
        if column.len() != self.n_rows() {
            return Err(DataError::Schema(format!(
                "replacement for {name} has {} rows, table has {}",
                column.len(),
                self.n_rows()
            )));
        }
        Ok(std::mem::replace(&mut self.columns[idx], column))
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
        self.names.remove(idx);
        self.levels.remove(name);
        Ok(self.columns.remove(idx))
    }

    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.drop_column(name)?;
        }
        Ok(())
    }

    /// Rewrite every column name; renames that collide are rejected
    pub fn rename_all<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> String,
    {
        let renamed: Vec<String> = self.names.iter().map(|n| f(n)).collect();
        let unique: BTreeSet<&String> = renamed.iter().collect();
        if unique.len() != renamed.len() {
            return Err(DataError::Schema("column rename produced duplicates".into()));
        }
        self.levels = std::mem::take(&mut self.levels)
            .into_iter()
            .map(|(name, lv)| (f(&name), lv))
            .collect();
        self.names = renamed;
        Ok(())
    }

    /// Keep rows whose mask entry is true; returns the number removed
    pub fn retain_rows(&mut self, keep: &[bool]) -> usize {
        debug_assert_eq!(keep.len(), self.n_rows());
        let before = self.n_rows();
        for column in &mut self.columns {
            *column = column.filter(keep);
        }
        self.source_rows = filter_vec(&self.source_rows, keep);
        before - self.n_rows()
    }

    /// Gather rows by index; indices may repeat
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            source_rows: take_vec(&self.source_rows, indices),
            levels: self.levels.clone(),
        }
    }

    /// Cells of one row, left to right
    pub fn row(&self, row: usize) -> Vec<Cell> {
        self.columns.iter().map(|c| c.cell(row)).collect()
    }

    /// Freeze a column's category levels at its current distinct values
    pub fn mark_categorical(&mut self, name: &str) -> Result<()> {
        let levels = self.column(name)?.distinct();
        self.levels.insert(name.to_string(), levels);
        Ok(())
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    /// Frozen levels if the column is categorical
    pub fn levels(&self, name: &str) -> Option<&[Cell]> {
        self.levels.get(name).map(Vec::as_slice)
    }
}
