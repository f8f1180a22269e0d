use std::collections::BTreeMap;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{decode, require_f64, require_str};
use crate::ipc::types::{AppState, Request};
use crate::services::certificate::local_certificate;
use crate::services::content::{fallback_drill, fallback_module, fallback_quiz, Generated};
use crate::services::weather::Coordinates;
use crate::services::{ServiceError, Services};
use serde_json::json;

const DEFAULT_AGE: u8 = 12;

fn services<'a>(state: &'a AppState, req: &Request) -> Result<&'a Services, serde_json::Value> {
    state.services.as_ref().ok_or_else(|| {
        err(
            &req.id,
            "service_not_configured",
            "service clients are unavailable",
            None,
        )
    })
}

fn service_err(req: &Request, e: &ServiceError) -> serde_json::Value {
    err(
        &req.id,
        e.code(),
        e.to_string(),
        Some(json!({ "transient": e.is_transient() })),
    )
}

fn coordinates(req: &Request) -> Result<Coordinates, serde_json::Value> {
    let latitude = require_f64(req, "latitude")?;
    let longitude = require_f64(req, "longitude")?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(err(
            &req.id,
            "bad_params",
            format!("coordinates out of range: {latitude}, {longitude}"),
            None,
        ));
    }
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

fn topic_and_age(req: &Request) -> Result<(String, u8), serde_json::Value> {
    let topic = require_str(req, "topic")?.trim().to_string();
    let age = match req.params.get("age") {
        None | Some(serde_json::Value::Null) => DEFAULT_AGE,
        Some(v) => match v.as_u64() {
            Some(a) if (3..=120).contains(&a) => a as u8,
            _ => return Err(err(&req.id, "bad_params", "age must be between 3 and 120", None)),
        },
    };
    Ok((topic, age))
}

fn handle_weather_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    let at = match coordinates(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let svc = match services(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.runtime.block_on(svc.weather.current(at)) {
        Ok(snapshot) => ok(&req.id, json!({ "weather": snapshot })),
        Err(e) => service_err(req, &e),
    }
}

fn handle_weather_alerts(state: &mut AppState, req: &Request) -> serde_json::Value {
    let at = match coordinates(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let svc = match services(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.runtime.block_on(svc.weather.alerts(at)) {
        Ok(alerts) => ok(&req.id, json!({ "alerts": alerts })),
        Err(e) => service_err(req, &e),
    }
}

/// Answers a content request; any failure is answered with the fixed fallback.
fn generated<T: serde::Serialize>(
    req: &Request,
    what: &str,
    result: Result<T, ServiceError>,
    fallback: impl FnOnce() -> T,
) -> serde_json::Value {
    let out = Generated::or_fallback(result, fallback);
    if let Some(reason) = &out.reason {
        tracing::warn!(what, reason = %reason, "content generation failed; serving fallback");
    }
    ok(&req.id, json!(out))
}

fn handle_content(state: &mut AppState, req: &Request, kind: &str) -> serde_json::Value {
    let (topic, age) = match topic_and_age(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let svc = state.services.as_ref();
    let unavailable = || ServiceError::NotConfigured("service clients");
    match kind {
        "quiz" => {
            let result = match svc {
                Some(s) => state.runtime.block_on(s.content.quiz(&topic, age)),
                None => Err(unavailable()),
            };
            generated(req, kind, result, || fallback_quiz(&topic))
        }
        "drill" => {
            let result = match svc {
                Some(s) => state.runtime.block_on(s.content.drill(&topic, age)),
                None => Err(unavailable()),
            };
            generated(req, kind, result, || fallback_drill(&topic))
        }
        _ => {
            let result = match svc {
                Some(s) => state.runtime.block_on(s.content.module(&topic, age)),
                None => Err(unavailable()),
            };
            generated(req, kind, result, || fallback_module(&topic))
        }
    }
}

fn handle_certificate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw: BTreeMap<String, serde_json::Value> = match decode(req, Some("fields")) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fields: BTreeMap<String, String> = raw
        .into_iter()
        .map(|(k, v)| {
            let text = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, text)
        })
        .collect();

    let result = match state.services.as_ref() {
        Some(s) => state.runtime.block_on(s.certificate.generate(&fields)),
        None => Err(ServiceError::NotConfigured("service clients")),
    };
    match result {
        Ok(cert) => ok(&req.id, json!({ "certificate": cert, "fallback": false })),
        Err(e) => {
            tracing::warn!(error = %e, "certificate service failed; generating locally");
            ok(
                &req.id,
                json!({
                    "certificate": local_certificate(&fields),
                    "fallback": true,
                    "reason": e.to_string(),
                }),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "weather.current" => Some(handle_weather_current(state, req)),
        "weather.alerts" => Some(handle_weather_alerts(state, req)),
        "content.quiz" => Some(handle_content(state, req, "quiz")),
        "content.drill" => Some(handle_content(state, req, "drill")),
        "content.module" => Some(handle_content(state, req, "module")),
        "certificate.generate" => Some(handle_certificate(state, req)),
        _ => None,
    }
}
