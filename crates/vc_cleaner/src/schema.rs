//! Column names of the raw funding dataset and the derived features

pub const NAME: &str = "name";
pub const PERMALINK: &str = "permalink";
pub const HOMEPAGE_URL: &str = "homepage_url";
pub const CATEGORY_LIST: &str = "category_list";
pub const MARKET: &str = "market";
pub const FUNDING_TOTAL_USD: &str = "funding_total_usd";
pub const STATUS: &str = "status";
pub const COUNTRY_CODE: &str = "country_code";
pub const STATE_CODE: &str = "state_code";
pub const CITY: &str = "city";
pub const FOUNDED_AT: &str = "founded_at";
pub const FOUNDED_MONTH: &str = "founded_month";
pub const FOUNDED_QUARTER: &str = "founded_quarter";
pub const FOUNDED_YEAR: &str = "founded_year";
pub const FIRST_FUNDING_AT: &str = "first_funding_at";
pub const LAST_FUNDING_AT: &str = "last_funding_at";

pub const DAYS_TO_FUNDING: &str = "days_to_funding";
pub const FUNDING_DAYS: &str = "funding_days";
pub const MONTH_FOUNDED: &str = "month_founded";

/// Status assigned to records without one
pub const PENDING: &str = "pending";

/// Columns typed as categorical before encoding
pub const CATEGORICAL: [&str; 7] = [
    MARKET,
    STATUS,
    COUNTRY_CODE,
    STATE_CODE,
    FOUNDED_MONTH,
    FOUNDED_QUARTER,
    FOUNDED_YEAR,
];

/// Raw timestamp columns coerced to dates
pub const DATE_COLUMNS: [&str; 3] = [FOUNDED_AT, FIRST_FUNDING_AT, LAST_FUNDING_AT];

/// Rows missing any of these are dropped at the end
pub const REQUIRED: [&str; 4] = [MARKET, CITY, DAYS_TO_FUNDING, FUNDING_DAYS];

/// Raw columns the pipeline parses itself; they stay text on read
pub const PARSED_COLUMNS: [&str; 16] = [
    NAME,
    PERMALINK,
    HOMEPAGE_URL,
    CATEGORY_LIST,
    MARKET,
    FUNDING_TOTAL_USD,
    STATUS,
    COUNTRY_CODE,
    STATE_CODE,
    CITY,
    FOUNDED_AT,
    FOUNDED_MONTH,
    FOUNDED_QUARTER,
    FOUNDED_YEAR,
    FIRST_FUNDING_AT,
    LAST_FUNDING_AT,
];
