//! Founded-date normalization and date-delta features

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use vc_core::{Column, DataError, Result, Table};

use crate::schema::{FOUNDED_MONTH, FOUNDED_QUARTER, FOUNDED_YEAR};

/// Three-letter month names; index 0 is deliberately empty.
pub const MONTH_ABBR: [&str; 13] = [
    "", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Representable timestamp range of the source tooling; dates outside it are unparsable.
const MIN_YEAR: i32 = 1677;
const MAX_YEAR: i32 = 2262;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_error(column: &str, row: usize, value: &str, reason: impl Into<String>) -> DataError {
    DataError::Parse {
        column: column.to_string(),
        row,
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Abbreviation for a month number; 0 and out-of-range map to "".
pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBR.get(month as usize).copied().unwrap_or_default()
}

/// Parse `YYYY-MM` into (year, month)
pub fn parse_year_month(raw: &str) -> std::result::Result<(i32, u32), String> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM: {e}"))?;
    Ok((date.year(), date.month()))
}

/// `2012-Q3` -> `Q3`
pub fn quarter_suffix(raw: &str) -> std::result::Result<String, String> {
    raw.split('-')
        .nth(1)
        .map(|q| q.trim().to_string())
        .ok_or_else(|| "expected YYYY-Qn".to_string())
}

/// Accepts `2012` and `2012.0`
pub fn parse_year(raw: &str) -> std::result::Result<i64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("not a year: {e}"))?;
    if value.fract() != 0.0 || !(0.0..=9999.0).contains(&value) {
        return Err(format!("not a year: {value}"));
    }
    Ok(value as i64)
}

/// Lenient date parsing; anything unrecognised or out of range is `None`.
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })?;
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

/// Whole days from `start` to `end`, null if either side is null
pub fn days_between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<f64> {
    Some((end? - start?).num_days() as f64)
}

/// Normalize `founded_month` to `YYYY-MM`; a malformed value aborts.
pub fn normalize_founded_month(table: &mut Table) -> Result<()> {
    let rows = table.source_rows();
    let values = table
        .text(FOUNDED_MONTH)?
        .iter()
        .enumerate()
        .map(|(i, raw)| match raw {
            None => Ok(None),
            Some(raw) => parse_year_month(raw)
                .map(|(y, m)| Some(format!("{y:04}-{m:02}")))
                .map_err(|reason| parse_error(FOUNDED_MONTH, rows[i], raw, reason)),
        })
        .collect::<Result<Vec<_>>>()?;
    table.replace_column(FOUNDED_MONTH, Column::Text(values))?;
    Ok(())
}

/// Reduce `founded_quarter` to its `Qn` suffix
pub fn normalize_founded_quarter(table: &mut Table) -> Result<()> {
    let rows = table.source_rows();
    let values = table
        .text(FOUNDED_QUARTER)?
        .iter()
        .enumerate()
        .map(|(i, raw)| match raw {
            None => Ok(None),
            Some(raw) => quarter_suffix(raw)
                .map(Some)
                .map_err(|reason| parse_error(FOUNDED_QUARTER, rows[i], raw, reason)),
        })
        .collect::<Result<Vec<_>>>()?;
    table.replace_column(FOUNDED_QUARTER, Column::Text(values))?;
    Ok(())
}

/// Type `founded_year` as an integer and drop rows without one.
/// Returns the number of rows dropped.
pub fn normalize_founded_year(table: &mut Table) -> Result<usize> {
    let rows = table.source_rows();
    let values = table
        .text(FOUNDED_YEAR)?
        .iter()
        .enumerate()
        .map(|(i, raw)| match raw {
            None => Ok(None),
            Some(raw) => parse_year(raw)
                .map(Some)
                .map_err(|reason| parse_error(FOUNDED_YEAR, rows[i], raw, reason)),
        })
        .collect::<Result<Vec<_>>>()?;

    let keep: Vec<bool> = values.iter().map(Option::is_some).collect();
    table.replace_column(FOUNDED_YEAR, Column::Int(values))?;
    Ok(table.retain_rows(&keep))
}

/// Coerce a text column to dates; unparsable cells become null.
/// Returns the number of non-empty cells that failed to parse.
pub fn coerce_date_column(table: &mut Table, name: &str) -> Result<usize> {
    let raw = table.text(name)?;
    let mut failed = 0;
    let dates: Vec<Option<NaiveDate>> = raw
        .iter()
        .map(|cell| {
            let parsed = cell.as_deref().and_then(coerce_date);
            if cell.is_some() && parsed.is_none() {
                failed += 1;
            }
            parsed
        })
        .collect();
    table.replace_column(name, Column::Date(dates))?;
    Ok(failed)
}

/// Add a float column of day differences `end - start`
pub fn add_day_delta(table: &mut Table, name: &str, start: &str, end: &str) -> Result<()> {
    let deltas: Vec<Option<f64>> = table
        .date(start)?
        .iter()
        .zip(table.date(end)?)
        .map(|(&s, &e)| days_between(s, e))
        .collect();
    table.push_column(name, Column::Float(deltas))
}

/// Month abbreviation of each `founded_month`; missing months give "".
pub fn month_names(table: &Table) -> Result<Vec<Option<String>>> {
    let rows = table.source_rows();
    table
        .text(FOUNDED_MONTH)?
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let month = match raw {
                None => 0,
                Some(raw) => parse_year_month(raw)
                    .map(|(_, m)| m)
                    .map_err(|reason| parse_error(FOUNDED_MONTH, rows[i], raw, reason))?,
            };
            Ok(Some(month_abbreviation(month).to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_abbreviation_zero_is_empty() {
        assert_eq!(month_abbreviation(0), "");
        assert_eq!(month_abbreviation(1), "Jan");
        assert_eq!(month_abbreviation(12), "Dec");
        assert_eq!(month_abbreviation(13), "");
    }

    #[test]
    fn test_year_month_and_quarter() {
        assert_eq!(parse_year_month("2012-06"), Ok((2012, 6)));
        assert!(parse_year_month("June 2012").is_err());
        assert_eq!(quarter_suffix("2012-Q3").as_deref(), Ok("Q3"));
        assert!(quarter_suffix("Q3").is_err());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2012"), Ok(2012));
        assert_eq!(parse_year("2012.0"), Ok(2012));
        assert!(parse_year("2012.5").is_err());
        assert!(parse_year("soon").is_err());
    }

    #[test]
    fn test_coerce_date() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(coerce_date("2012-06-30"), d(2012, 6, 30));
        assert_eq!(coerce_date("2012-06-30 00:00:00"), d(2012, 6, 30));
        assert_eq!(coerce_date("0019-11-20"), None);
        assert_eq!(coerce_date("not a date"), None);
    }

    #[test]
    fn test_days_between_propagates_null() {
        let a = NaiveDate::from_ymd_opt(2012, 1, 1);
        let b = NaiveDate::from_ymd_opt(2012, 3, 1);
        assert_eq!(days_between(a, b), Some(60.0));
        assert_eq!(days_between(None, b), None);
    }

    #[test]
    fn test_founded_year_drops_missing() {
        let mut table = Table::from_columns(vec![(
            FOUNDED_YEAR,
            Column::Text(vec![Some("2001".into()), None, Some("1999.0".into())]),
        )])
        .unwrap();

        let dropped = normalize_founded_year(&mut table).unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(table.int(FOUNDED_YEAR).unwrap(), &[Some(2001), Some(1999)]);
        assert_eq!(table.source_rows(), &[0, 2]);
    }
}
