//! Company-name repair

use vc_core::{Column, Result, Table};

use crate::config::NameRepair;
use crate::schema::{HOMEPAGE_URL, NAME, PERMALINK};

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// `http://zeuux.com` -> `Zeuux`
pub fn name_from_homepage(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split('.').next().unwrap_or_default();
    if host.is_empty() {
        None
    } else {
        Some(title_case(host))
    }
}

/// Fill missing names for the listed records; returns how many were filled.
pub fn repair_names(table: &mut Table, repairs: &[NameRepair]) -> Result<usize> {
    let mut names = table.text(NAME)?.to_vec();
    let homepages = table.text(HOMEPAGE_URL)?;
    let permalinks = table.text(PERMALINK)?;
    let source_rows = table.source_rows();

    let mut repaired = 0;
    for (row, name) in names.iter_mut().enumerate() {
        if name.is_some() {
            continue;
        }
        let permalink = permalinks[row].as_deref();
        if !repairs.iter().any(|r| r.matches(permalink, source_rows[row])) {
            continue;
        }
        match homepages[row].as_deref().and_then(name_from_homepage) {
            Some(derived) => {
                tracing::debug!("row {}: name repaired as {:?}", source_rows[row], derived);
                *name = Some(derived);
                repaired += 1;
            }
            None => tracing::warn!(
                "row {}: listed for name repair but has no usable homepage_url",
                source_rows[row]
            ),
        }
    }

    table.replace_column(NAME, Column::Text(names))?;
    Ok(repaired)
}
