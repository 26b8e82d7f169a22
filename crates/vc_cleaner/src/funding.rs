//! Currency normalization for `funding_total_usd`

use vc_core::{Column, DataError, Result, Table};

use crate::schema::FUNDING_TOTAL_USD;

/// Placeholder used by the source data for "no disclosed amount"
pub const NO_AMOUNT: &str = "-";

/// Parse a thousands-separated USD amount.
///
/// Missing values and the `-` placeholder both become `0.0`.
pub fn parse_funding_total(raw: Option<&str>) -> std::result::Result<f64, String> {
    let cleaned = match raw {
        Some(raw) => raw.trim().replace(',', ""),
        None => return Ok(0.0),
    };
    if cleaned.is_empty() || cleaned == NO_AMOUNT {
        return Ok(0.0);
    }
    let value: f64 = cleaned.parse().map_err(|e| format!("not a number: {e}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("amount out of range: {value}"));
    }
    Ok(value)
}

/// Replace the text column with parsed floats; any bad amount aborts.
pub fn normalize_funding(table: &mut Table) -> Result<()> {
    let values = table
        .text(FUNDING_TOTAL_USD)?
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            parse_funding_total(raw.as_deref())
                .map(Some)
                .map_err(|reason| DataError::Parse {
                    column: FUNDING_TOTAL_USD.to_string(),
                    row: table.source_rows()[row],
                    value: raw.clone().unwrap_or_default(),
                    reason,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    table.replace_column(FUNDING_TOTAL_USD, Column::Float(values))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(parse_funding_total(Some("1,250,000")), Ok(1_250_000.0));
        assert_eq!(parse_funding_total(Some(" 17,50,000 ")), Ok(1_750_000.0));
    }

    #[test]
    fn test_placeholder_and_missing_are_zero() {
        assert_eq!(parse_funding_total(Some("-")), Ok(0.0));
        assert_eq!(parse_funding_total(Some(" - ")), Ok(0.0));
        assert_eq!(parse_funding_total(None), Ok(0.0));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_funding_total(Some("ten dollars")).is_err());
        assert!(parse_funding_total(Some("-5")).is_err());
        assert!(parse_funding_total(Some("inf")).is_err());
    }

    #[test]
    fn test_normalize_reports_row() {
        let mut table = Table::from_columns(vec![(
            FUNDING_TOTAL_USD,
            Column::Text(vec![Some("1,000".into()), Some("oops".into())]),
        )])
        .unwrap();

        match normalize_funding(&mut table) {
            Err(DataError::Parse { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
