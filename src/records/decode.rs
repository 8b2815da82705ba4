//! Conversion of raw DynamoDB items into typed records.
//!
//! Items are first lowered into `serde_json::Value` (numbers keep their
//! textual precision up to what `serde_json::Number` holds) and then
//! deserialized into the target record type.

use aws_sdk_dynamodb::types::AttributeValue;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::DecodeError;
use crate::store::Item;

/// Decode every item of one page, failing on the first mismatch.
pub fn decode_items<R: DeserializeOwned>(items: Vec<Item>) -> Result<Vec<R>, DecodeError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_item(index, item))
        .collect()
}

/// Decode a single item.
pub fn decode_item<R: DeserializeOwned>(index: usize, item: Item) -> Result<R, DecodeError> {
    let value = item_to_json(&item).map_err(|(attribute, reason)| DecodeError::Attribute {
        index,
        attribute,
        reason,
    })?;

    serde_json::from_value(value).map_err(|e| DecodeError::Shape {
        index,
        reason: e.to_string(),
    })
}

/// Lower an item into a JSON object. Errors carry the dotted attribute path.
pub fn item_to_json(item: &Item) -> Result<Value, (String, String)> {
    let mut map = Map::with_capacity(item.len());
    for (name, attr) in item {
        map.insert(name.clone(), attribute_to_json(name, attr)?);
    }
    Ok(Value::Object(map))
}

fn attribute_to_json(path: &str, attr: &AttributeValue) -> Result<Value, (String, String)> {
    let value = match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(path, n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::M(m) => {
            let mut map = Map::with_capacity(m.len());
            for (name, inner) in m {
                let inner_path = format!("{}.{}", path, name);
                map.insert(name.clone(), attribute_to_json(&inner_path, inner)?);
            }
            Value::Object(map)
        }
        AttributeValue::L(list) => Value::Array(
            list.iter()
                .enumerate()
                .map(|(i, inner)| attribute_to_json(&format!("{}[{}]", path, i), inner))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(
            set.iter()
                .map(|n| parse_number(path, n).map(Value::Number))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::B(_) | AttributeValue::Bs(_) => {
            return Err((path.to_string(), "binary attributes are not supported".to_string()))
        }
        _ => return Err((path.to_string(), "unknown attribute type".to_string())),
    };
    Ok(value)
}

fn parse_number(path: &str, raw: &str) -> Result<Number, (String, String)> {
    raw.trim()
        .parse::<Number>()
        .map_err(|e| (path.to_string(), format!("invalid number `{}`: {}", raw, e)))
}
