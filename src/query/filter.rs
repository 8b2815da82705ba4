//! Server-side filter expressions for scans.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use super::date::SearchDate;
use crate::store::ScanRequest;

/// Placeholder bound to the attribute name.
const NAME_PLACEHOLDER: &str = "#0";
/// Placeholder bound to the operand value.
const VALUE_PLACEHOLDER: &str = ":0";

/// A filter evaluated by the store, never on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// `contains(attribute, value)`: substring match on a string attribute.
    Contains {
        /// Attribute the predicate reads.
        attribute: String,
        /// Substring that must occur in the attribute.
        value: String,
    },
}

impl FilterExpression {
    /// Build a substring-containment predicate.
    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        FilterExpression::Contains {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Expression text with placeholders, e.g. `contains(#0, :0)`.
    pub fn expression(&self) -> String {
        match self {
            FilterExpression::Contains { .. } => {
                format!("contains({}, {})", NAME_PLACEHOLDER, VALUE_PLACEHOLDER)
            }
        }
    }

    /// Placeholder to attribute-name bindings.
    pub fn attribute_names(&self) -> HashMap<String, String> {
        match self {
            FilterExpression::Contains { attribute, .. } => {
                HashMap::from([(NAME_PLACEHOLDER.to_string(), attribute.clone())])
            }
        }
    }

    /// Placeholder to operand bindings.
    pub fn attribute_values(&self) -> HashMap<String, AttributeValue> {
        match self {
            FilterExpression::Contains { value, .. } => HashMap::from([(
                VALUE_PLACEHOLDER.to_string(),
                AttributeValue::S(value.clone()),
            )]),
        }
    }
}

/// Scan request for items whose `attribute` contains the validated date.
pub fn date_search_request(
    table: impl Into<String>,
    attribute: impl Into<String>,
    date: &SearchDate,
) -> ScanRequest {
    ScanRequest {
        table: table.into(),
        filter: Some(FilterExpression::contains(attribute, date.as_str())),
        start_key: None,
    }
}
