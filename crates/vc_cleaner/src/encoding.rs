//! Drop-first one-hot encoding of table columns

use vc_core::{Cell, Column, Result, Table};

/// Append `prefix_level` bool columns for every level but the first.
///
/// Levels are the column's frozen categorical levels when it has them,
/// otherwise its sorted distinct non-null values. Nulls get no indicator.
/// Returns the names of the indicator columns added.
pub fn one_hot(
    table: &mut Table,
    column: &str,
    prefix: &str,
    drop_original: bool,
) -> Result<Vec<String>> {
    let source = table.column(column)?;
    let levels: Vec<Cell> = match table.levels(column) {
        Some(levels) => levels.to_vec(),
        None => source.distinct(),
    };
    let cells: Vec<Cell> = (0..source.len()).map(|row| source.cell(row)).collect();

    let mut added = Vec::with_capacity(levels.len().saturating_sub(1));
    for level in levels.iter().skip(1) {
        let name = format!("{prefix}_{level}");
        let values = cells.iter().map(|cell| cell == level).collect();
        table.push_column(name.clone(), Column::Bool(values))?;
        added.push(name);
    }

    if drop_original {
        table.drop_column(column)?;
    }

    tracing::debug!(
        "one-hot {} -> {} indicator columns ({} levels)",
        column,
        added.len(),
        levels.len()
    );
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months() -> Table {
        Table::from_columns(vec![(
            "month_founded",
            Column::Text(vec![
                Some("".into()),
                Some("Mar".into()),
                Some("Jan".into()),
                Some("Mar".into()),
                None,
            ]),
        )])
        .unwrap()
    }

    #[test]
    fn test_drop_first_leaves_k_minus_one_columns() {
        let mut table = months();
        let added = one_hot(&mut table, "month_founded", "month", true).unwrap();

        // levels: "", "Jan", "Mar" -> the empty reference level is dropped
        assert_eq!(added, vec!["month_Jan", "month_Mar"]);
        assert!(!table.has_column("month_founded"));

        let jan = table.column("month_Jan").unwrap().as_bool().unwrap();
        let mar = table.column("month_Mar").unwrap().as_bool().unwrap();
        assert_eq!(jan, &[false, false, true, false, false]);
        assert_eq!(mar, &[false, true, false, true, false]);
    }

    #[test]
    fn test_keep_original_and_numeric_level_order() {
        let mut table = Table::from_columns(vec![(
            "founded_year",
            Column::Int(vec![Some(2010), Some(999), Some(2010)]),
        )])
        .unwrap();
        table.mark_categorical("founded_year").unwrap();

        let added = one_hot(&mut table, "founded_year", "year", false).unwrap();
        assert_eq!(added, vec!["year_2010"]);
        assert!(table.has_column("founded_year"));
    }

    #[test]
    fn test_single_level_adds_nothing() {
        let mut table = Table::from_columns(vec![(
            "founded_quarter",
            Column::Text(vec![Some("Q1".into()), Some("Q1".into())]),
        )])
        .unwrap();
        let added = one_hot(&mut table, "founded_quarter", "quarter", false).unwrap();
        assert!(added.is_empty());
    }
}
