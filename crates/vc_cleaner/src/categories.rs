//! Expansion of the pipe-delimited `category_list` into indicator columns

use std::collections::{BTreeMap, BTreeSet};
use vc_core::{Column, Result, Table};

use crate::schema::CATEGORY_LIST;

/// Token produced for a record with no category list
pub const MISSING_TOKEN: &str = "nan";

/// Prefix applied when a category token collides with an existing column
pub const COLLISION_PREFIX: &str = "category_";

/// `|Mobile Games|fintech|` -> `["mobile_games", "fintech"]`
pub fn category_tokens(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or(MISSING_TOKEN)
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|token| token.replace(' ', "_").to_lowercase().trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Replace `category_list` with one bool column per distinct token.
///
/// Columns are appended in sorted token order. Returns the new column names.
pub fn expand_categories(table: &mut Table) -> Result<Vec<String>> {
    let per_row: Vec<Vec<String>> = table
        .text(CATEGORY_LIST)?
        .iter()
        .map(|raw| category_tokens(raw.as_deref()))
        .collect();

    let vocabulary: BTreeSet<&str> = per_row.iter().flatten().map(String::as_str).collect();
    let index: BTreeMap<&str, usize> = vocabulary.iter().enumerate().map(|(i, t)| (*t, i)).collect();

    let n_rows = table.n_rows();
    let mut indicators = vec![vec![false; n_rows]; vocabulary.len()];
    for (row, tokens) in per_row.iter().enumerate() {
        for token in tokens {
            indicators[index[token.as_str()]][row] = true;
        }
    }

    table.drop_column(CATEGORY_LIST)?;

    let mut added = Vec::with_capacity(vocabulary.len());
    for (token, values) in vocabulary.iter().zip(indicators) {
        let name = if table.has_column(token) {
            tracing::warn!("category {:?} collides with an existing column", token);
            format!("{COLLISION_PREFIX}{token}")
        } else {
            token.to_string()
        };
        table.push_column(name.clone(), Column::Bool(values))?;
        added.push(name);
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        assert_eq!(category_tokens(Some("|fintech|mobile|")), vec!["fintech", "mobile"]);
        assert_eq!(
            category_tokens(Some("Mobile Games|E-Commerce")),
            vec!["mobile_games", "e-commerce"]
        );
        assert_eq!(category_tokens(None), vec!["nan"]);
        assert!(category_tokens(Some("|")).is_empty());
    }

    #[test]
    fn test_expansion_sets_only_own_tokens() {
        let mut table = Table::from_columns(vec![
            ("market", Column::Text(vec![Some("x".into()), Some("y".into())])),
            (
                CATEGORY_LIST,
                Column::Text(vec![Some("|fintech|mobile|".into()), Some("|games|".into())]),
            ),
        ])
        .unwrap();

        let added = expand_categories(&mut table).unwrap();

        assert_eq!(added, vec!["fintech", "games", "mobile"]);
        assert!(!table.has_column(CATEGORY_LIST));
        let col = |n: &str| table.column(n).unwrap().as_bool().unwrap().to_vec();
        assert_eq!(col("fintech"), vec![true, false]);
        assert_eq!(col("mobile"), vec![true, false]);
        assert_eq!(col("games"), vec![false, true]);
    }

    #[test]
    fn test_collision_gets_prefix() {
        let mut table = Table::from_columns(vec![
            ("market", Column::Text(vec![Some("x".into())])),
            (CATEGORY_LIST, Column::Text(vec![Some("market".into())])),
        ])
        .unwrap();

        let added = expand_categories(&mut table).unwrap();
        assert_eq!(added, vec!["category_market"]);
    }
}
