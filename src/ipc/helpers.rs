use serde::de::DeserializeOwned;

use super::error::err;
use super::types::Request;

/// Reads a required string param, or produces the `bad_params` reply.
pub fn require_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(err(&req.id, "bad_params", format!("{key} must not be empty"), None)),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

pub fn require_f64(req: &Request, key: &str) -> Result<f64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing numeric {key}"), None))
}

/// Decodes `params[key]`, or the whole params object when `key` is `None`.
pub fn decode<T: DeserializeOwned>(req: &Request, key: Option<&str>) -> Result<T, serde_json::Value> {
    let raw = match key {
        Some(k) => match req.params.get(k) {
            Some(v) => v.clone(),
            None => return Err(err(&req.id, "bad_params", format!("missing {k}"), None)),
        },
        None if req.params.is_null() => serde_json::Value::Object(Default::default()),
        None => req.params.clone(),
    };
    serde_json::from_value(raw).map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}
