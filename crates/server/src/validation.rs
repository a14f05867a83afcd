//! Request validation for the catalog endpoints.
//!
//! Bodies are checked field by field against a whitelist so that every
//! violated constraint is reported at once, in the order fields are declared.

use std::collections::HashMap;

use serde_json::{Map, Value};

use service::catalog::{CreaturePatch, NewCreature};
use service::pagination::Pagination;

pub type Violations = Vec<String>;

const CREATE_FIELDS: [&str; 4] = ["name", "kind", "vitality", "images"];

/// Decode a raw request body into a JSON object. An empty body reads as `{}`.
pub fn parse_body(raw: &[u8]) -> Result<Map<String, Value>, Violations> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(vec!["request body must be a JSON object".to_string()]),
        Err(_) => Err(vec!["request body must be valid JSON".to_string()]),
    }
}

pub fn new_creature(body: &Map<String, Value>) -> Result<NewCreature, Violations> {
    let mut errors = unknown_properties(body);

    let name = required_text(body, "name", &mut errors);
    let kind = required_text(body, "kind", &mut errors);
    let vitality = optional_count(body, "vitality", &mut errors);
    let images = optional_images(body, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewCreature {
        name: name.unwrap_or_default(),
        kind: kind.unwrap_or_default(),
        vitality,
        images,
    })
}

pub fn creature_patch(body: &Map<String, Value>) -> Result<CreaturePatch, Violations> {
    let mut errors = unknown_properties(body);

    let name = optional_text(body, "name", &mut errors);
    let kind = optional_text(body, "kind", &mut errors);
    let vitality = optional_count(body, "vitality", &mut errors);
    let images = optional_images(body, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(CreaturePatch { name, kind, vitality, images })
}

/// `limit` and `page` query parameters; both optional non-negative integers.
pub fn pagination(query: &HashMap<String, String>) -> Result<Pagination, Violations> {
    let mut errors = Vec::new();
    let mut keys: Vec<&String> = query.keys().filter(|k| !matches!(k.as_str(), "limit" | "page")).collect();
    keys.sort();
    errors.extend(keys.into_iter().map(|k| format!("property {k} should not exist")));

    let limit = query_count(query, "limit", &mut errors);
    let page = query_count(query, "page", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Pagination { limit, page })
}

pub fn path_id(raw: &str) -> Result<i64, Violations> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| vec!["id must be an integer number".to_string()])
}

fn unknown_properties(body: &Map<String, Value>) -> Violations {
    body.keys()
        .filter(|k| !CREATE_FIELDS.contains(&k.as_str()))
        .map(|k| format!("property {k} should not exist"))
        .collect()
}

/// `null` is treated the same as an absent field.
fn present<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

fn required_text(body: &Map<String, Value>, field: &str, errors: &mut Violations) -> Option<String> {
    match present(body, field) {
        None => {
            errors.push(format!("{field} must be a string"));
            errors.push(format!("{field} should not be empty"));
            None
        }
        Some(value) => text(value, field, errors),
    }
}

fn optional_text(body: &Map<String, Value>, field: &str, errors: &mut Violations) -> Option<String> {
    present(body, field).and_then(|value| text(value, field, errors))
}

fn text(value: &Value, field: &str, errors: &mut Violations) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => {
            errors.push(format!("{field} should not be empty"));
            None
        }
        Value::String(s) => Some(s.clone()),
        _ => {
            errors.push(format!("{field} must be a string"));
            None
        }
    }
}

fn optional_count(body: &Map<String, Value>, field: &str, errors: &mut Violations) -> Option<u32> {
    let value = present(body, field)?;
    // `5.0` counts as an integer; `as` saturates out-of-range floats
    let whole = value
        .as_i64()
        .or_else(|| value.as_u64().map(|_| i64::MAX))
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));
    let Some(n) = whole else {
        errors.push(format!("{field} must be an integer number"));
        return None;
    };
    count_in_range(n, field, errors)
}

fn query_count(query: &HashMap<String, String>, field: &str, errors: &mut Violations) -> Option<u32> {
    let raw = query.get(field)?;
    let Ok(n) = raw.trim().parse::<i64>() else {
        errors.push(format!("{field} must be an integer number"));
        return None;
    };
    count_in_range(n, field, errors)
}

fn count_in_range(n: i64, field: &str, errors: &mut Violations) -> Option<u32> {
    if n < 0 {
        errors.push(format!("{field} must not be less than 0"));
        return None;
    }
    match u32::try_from(n) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(format!("{field} must not be greater than {}", u32::MAX));
            None
        }
    }
}

fn optional_images(body: &Map<String, Value>, errors: &mut Violations) -> Option<Vec<String>> {
    let value = present(body, "images")?;
    let Value::Array(items) = value else {
        errors.push("images must be an array".to_string());
        return None;
    };
    let images: Option<Vec<String>> = items.iter().map(|v| v.as_str().map(str::to_string)).collect();
    if images.is_none() {
        errors.push("each value in images must be a string".to_string());
    }
    images
}
