//! Query-string normalization and condition compilation.
//!
//! Raw listing parameters arrive as untyped strings ("ram=8", "price=100-200",
//! "color=red|space-gray"). `normalize` turns each into a tagged [`QueryValue`]
//! and `compile` maps the typed values through the key-map into match
//! conditions plus a sort specification.

use crate::schema::KeyMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attributes coerced to booleans on the way in.
pub const BOOLEAN_KEYS: [&str; 6] = [
    "quickCharge",
    "wirelessCharge",
    "fiveG",
    "nfc",
    "externalStorage",
    "freeCargo",
];

/// Attributes that accept pipe-separated value lists.
pub const MULTI_VALUE_KEYS: [&str; 16] = [
    "color",
    "storage",
    "ram",
    "os",
    "screenResulation",
    "screenRefreshRate",
    "screenResolutionStandard",
    "mainCameraPixel",
    "frontCameraPixel",
    "screenTechnology",
    "internalStorage",
    "gpu",
    "cpu",
    "guarantyType",
    "brand",
    "model",
];

/// Attributes parsed as "bottom-top" inclusive ranges.
pub const RANGE_KEYS: [&str; 3] = ["price", "rating", "screenSize"];

pub const PAGINATE_KEYS: [&str; 3] = ["limit", "page", "skip"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Number(i64),
    Bool(bool),
    Text(String),
    List(Vec<ListItem>),
}

pub fn normalize(raw: &BTreeMap<String, String>) -> BTreeMap<String, QueryValue> {
    raw.iter()
        .map(|(key, value)| (key.clone(), normalize_value(key, value)))
        .collect()
}

fn normalize_value(key: &str, raw: &str) -> QueryValue {
    let parts: Vec<&str> = raw.split('|').collect();
    if parts.len() > 1 {
        return QueryValue::List(parts.into_iter().map(list_item).collect());
    }
    // Hyphenated words become spaced words ("space-gray" -> "space gray");
    // values with a leading number ("100-200") must survive for range parsing.
    if raw.contains('-') && leading_number(raw).is_none() {
        return QueryValue::Text(parts[0].replace('-', " "));
    }
    if BOOLEAN_KEYS.contains(&key) {
        return QueryValue::Bool(raw == "true");
    }
    if !raw.contains('-') {
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return QueryValue::Number(n as i64);
            }
        }
    }
    QueryValue::Text(raw.to_string())
}

fn list_item(element: &str) -> ListItem {
    if element.contains('-') {
        return ListItem::Text(element.replace('-', " "));
    }
    match element.parse::<f64>() {
        Ok(n) if n.is_finite() => ListItem::Number(n as i64),
        _ => ListItem::Text(element.to_string()),
    }
}

// Longest numeric prefix, the shape check that keeps "100-200" out of the
// word-restoring branch while "space-gray" still qualifies.
fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        let numeric = c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'));
        if !numeric {
            break;
        }
        end = i + c.len_utf8();
    }
    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    Eq(QueryValue),
    Between { bottom: f64, top: f64 },
    In(Vec<ListItem>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub path: String,
    pub direction: Direction,
}

impl SortSpec {
    pub fn new(path: &str, direction: Direction) -> SortSpec {
        SortSpec {
            path: path.to_string(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompiledQuery {
    /// Joined-document path -> constraint.
    pub conditions: BTreeMap<String, Condition>,
    /// Explicit sort; the executor falls back to creation time descending.
    pub sort: Option<SortSpec>,
    pub page: u64,
    pub limit: u64,
}

pub const DEFAULT_LIMIT: u64 = 100;

pub fn compile(params: &BTreeMap<String, QueryValue>, key_map: &KeyMap) -> CompiledQuery {
    let mut conditions = BTreeMap::new();
    for (key, value) in params {
        if PAGINATE_KEYS.contains(&key.as_str()) || key == "sort" {
            continue;
        }
        if RANGE_KEYS.contains(&key.as_str()) {
            // price constrains the nested selling price, not the price object
            let lookup = if key == "price" { "sellingPrice" } else { key.as_str() };
            if let (Some(path), Some((bottom, top))) = (key_map.get(lookup), range_bounds(value)) {
                conditions.insert(path.clone(), Condition::Between { bottom, top });
            }
        } else if MULTI_VALUE_KEYS.contains(&key.as_str()) {
            let Some(path) = key_map.get(key) else {
                continue;
            };
            let condition = match value {
                QueryValue::List(items) => Condition::In(items.clone()),
                other => Condition::Eq(other.clone()),
            };
            conditions.insert(path.clone(), condition);
        } else if let Some(path) = key_map.get(key) {
            conditions.insert(path.clone(), Condition::Eq(value.clone()));
        }
        // unmapped keys drop silently
    }

    CompiledQuery {
        conditions,
        sort: params.get("sort").and_then(sort_spec),
        page: positive_or(params.get("page"), 1),
        limit: positive_or(params.get("limit"), DEFAULT_LIMIT),
    }
}

fn positive_or(value: Option<&QueryValue>, default: u64) -> u64 {
    match value {
        Some(QueryValue::Number(n)) if *n >= 1 => *n as u64,
        _ => default,
    }
}

// "bottom-top" with the smaller literal always the floor; a single bound
// collapses to bottom == top.
fn range_bounds(value: &QueryValue) -> Option<(f64, f64)> {
    match value {
        QueryValue::Number(n) => Some((*n as f64, *n as f64)),
        QueryValue::Text(raw) => {
            let mut bounds: Vec<f64> = raw
                .split('-')
                .filter_map(|part| part.parse::<f64>().ok())
                .filter(|n| n.is_finite())
                .collect();
            if bounds.is_empty() {
                return None;
            }
            bounds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            Some((bounds[0], *bounds.last().unwrap()))
        }
        _ => None,
    }
}

fn sort_spec(value: &QueryValue) -> Option<SortSpec> {
    let QueryValue::Text(name) = value else {
        return None;
    };
    let (path, direction) = match name.as_str() {
        "PRICE_BY_ASC" => ("price.sellingPrice", Direction::Asc),
        "PRICE_BY_DESC" => ("price.sellingPrice", Direction::Desc),
        "MOST_RECENT" => ("createdAt", Direction::Desc),
        "MOST_POPULER" => ("numberOfRating", Direction::Desc),
        "MOST_RATED" => ("averageRating", Direction::Desc),
        "MOST_COMMENTED" => ("numberOfComments", Direction::Desc),
        "MOST_VIEWED" => ("viewCount", Direction::Desc),
        _ => return None,
    };
    Some(SortSpec::new(path, direction))
}
