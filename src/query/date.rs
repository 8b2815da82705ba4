//! Date search token validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted search grammar: `YYYY-MM-DD` with mandatory leading zeros.
///
/// Day-of-month is not checked against the month, so `2023-02-31` passes.
pub const DATE_PATTERN: &str = r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$";

/// Message returned to callers whose search token is rejected.
pub const USAGE_MESSAGE: &str = "Search should be formatted with search?date=yyyy-mm-dd";

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_PATTERN).expect("valid regex"));

/// Check whether `candidate` is a `YYYY-MM-DD` date token.
pub fn is_valid_date(candidate: &str) -> bool {
    DATE_RE.is_match(candidate)
}

/// A search token that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDate(String);

impl SearchDate {
    /// Validate `candidate`, returning `None` when it is malformed.
    pub fn parse(candidate: &str) -> Option<Self> {
        is_valid_date(candidate).then(|| Self(candidate.to_string()))
    }

    /// The validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
