//! Stock summary record shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which record shape the configured table stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RecordShape {
    /// Flat summary items.
    Summary,
    /// Summary nested under a (symbol, time) compound key.
    #[default]
    Envelope,
}

/// A single stock quote summary as collected by the scraper.
///
/// Every attribute is optional because the store does not enforce a schema.
/// A present attribute with the wrong type fails decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Summary {
    /// Company name.
    pub name: Option<String>,
    /// Ticker symbol.
    pub stock_symbol: Option<String>,
    /// Last trade price.
    pub price: Option<Decimal>,
    /// Change from previous close, in currency.
    pub dollar_change: Option<Decimal>,
    /// Change from previous close, in percent.
    pub percent_change: Option<Decimal>,
    /// Previous session close.
    pub previous_close: Option<Decimal>,
    /// Session open.
    pub open: Option<Decimal>,
    /// Best bid.
    pub bid_price: Option<Decimal>,
    /// Size at best bid.
    pub bid_quantity: Option<i64>,
    /// Best ask.
    pub ask_price: Option<Decimal>,
    /// Size at best ask.
    pub ask_quantity: Option<i64>,
    pub day_range_low: Option<Decimal>,
    pub day_range_high: Option<Decimal>,
    pub year_range_low: Option<Decimal>,
    pub year_range_high: Option<Decimal>,
    /// Session volume.
    pub volume: Option<i64>,
    /// Average daily volume.
    pub average_volume: Option<i64>,
    pub market_cap: Option<Decimal>,
    pub beta: Option<Decimal>,
    pub price_earnings_ratio: Option<Decimal>,
    pub earnings_per_share: Option<Decimal>,
    /// Free-form earnings date as published (e.g. "Jul 25, 2023").
    pub earnings_date: Option<String>,
    pub forward_dividend: Option<Decimal>,
    pub forward_dividend_yield: Option<Decimal>,
    /// Free-form ex-dividend date as published.
    pub ex_dividend_date: Option<String>,
    /// One-year analyst target.
    pub year_target_estimate: Option<Decimal>,
    /// Symbol the scraper was asked for (may differ from `stock_symbol`).
    pub queried_symbol: Option<String>,
    /// When the scraper captured this summary.
    pub data_collected_on: Option<DateTime<Utc>>,
}

/// Summary keyed by symbol and collection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    /// Nested summary attributes.
    #[serde(default)]
    pub summary: Summary,
    /// Partition key.
    pub stock_symbol: String,
    /// Sort key; the date search matches against this attribute.
    pub time: String,
}

/// Decoded result set in whichever shape the table stores.
///
/// Serializes as a bare JSON array either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    /// Flat summaries.
    Summary(Vec<Summary>),
    /// Keyed envelopes.
    Envelope(Vec<Envelope>),
}

impl Records {
    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Records::Summary(r) => r.len(),
            Records::Envelope(r) => r.len(),
        }
    }
}
