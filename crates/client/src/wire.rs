//! Backend wire format: response envelopes and misspelled field names.
//!
//! The backend serves `neme` for wood type names and `descrioption` for
//! product descriptions. Every rename between wire and model names lives here.

use serde_json::{Map, Value};
use timberdesk_core::{Entity, Page};

use crate::error::RequestError;

/// `(wire name, model name)` pairs per collection.
const fn field_renames(entity: Entity) -> &'static [(&'static str, &'static str)] {
    match entity {
        Entity::WoodTypes => &[("neme", "name")],
        Entity::Products => &[("descrioption", "description")],
        _ => &[],
    }
}

/// Rename wire fields to model names in a record from `entity`.
///
/// When both spellings are present the correctly spelled one wins.
pub fn normalize_inbound(entity: Entity, value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    for &(wire, model) in field_renames(entity) {
        rename(map, wire, model);
    }
}

/// Rename model fields to wire names in a request body for `entity`.
pub fn denormalize_outbound(entity: Entity, value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    for &(wire, model) in field_renames(entity) {
        rename(map, model, wire);
    }
}

fn rename(map: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(v) = map.remove(from) {
        if !map.contains_key(to) {
            map.insert(to.to_owned(), v);
        }
    }
}

/// Unwrap `{ data: [...], pagination: { total, offset, limit } }`.
///
/// # Errors
/// Returns `UnexpectedShape` if `data` is missing or not an array.
pub fn unwrap_page(
    body: Value,
    requested_offset: u64,
    requested_limit: u64,
) -> Result<Page<Value>, RequestError> {
    let Value::Object(mut envelope) = body else {
        return Err(RequestError::UnexpectedShape("page body is not an object".to_owned()));
    };
    let items = match envelope.remove("data") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(RequestError::UnexpectedShape(format!(
                "page `data` is not an array: {}",
                type_name(&other)
            )));
        },
        None => return Err(RequestError::UnexpectedShape("page body has no `data`".to_owned())),
    };
    let pagination = envelope.get("pagination");
    let field = |name: &str| pagination.and_then(|p| p.get(name)).and_then(Value::as_u64);

    Ok(Page {
        total: field("total").unwrap_or(items.len() as u64),
        offset: field("offset").unwrap_or(requested_offset),
        limit: field("limit").unwrap_or(requested_limit),
        items,
    })
}

/// Accept either a bare record or `{ data: record }`.
#[must_use]
pub fn unwrap_single(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        },
        other => other,
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
