use crate::collections::COLLECTION_NAMES;
use crate::ipc::error::{err, invalid, no_workspace, ok};
use crate::ipc::helpers::{decode, require_str};
use crate::ipc::types::{AppState, Request};
use crate::store::{Entity, PersistentStore};
use serde_json::json;

const CRUD_OPS: [&str; 6] = ["list", "read", "create", "update", "remove", "clear"];

fn handle_op<T: Entity>(
    store: &mut PersistentStore<T>,
    op: &str,
    req: &Request,
) -> serde_json::Value {
    match op {
        "list" => ok(
            &req.id,
            json!({ "items": store.list(), "degraded": store.is_degraded() }),
        ),
        "read" => {
            let id = match require_str(req, "id") {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            let item = store.read(id);
            ok(&req.id, json!({ "found": item.is_some(), "item": item }))
        }
        "create" => {
            let draft: T::Draft = match decode(req, Some("item")) {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            match store.create(draft) {
                Ok(item) => ok(
                    &req.id,
                    json!({ "item": item, "persisted": !store.is_degraded() }),
                ),
                Err(e) => invalid(&req.id, &e),
            }
        }
        "update" => {
            let id = match require_str(req, "id") {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            let patch: T::Patch = match decode(req, Some("patch")) {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            match store.update(id, patch) {
                Ok(item) => ok(&req.id, json!({ "found": item.is_some(), "item": item })),
                Err(e) => invalid(&req.id, &e),
            }
        }
        "remove" => {
            let id = match require_str(req, "id") {
                Ok(v) => v,
                Err(resp) => return resp,
            };
            let found = store.remove(id);
            ok(&req.id, json!({ "found": found }))
        }
        "clear" => {
            store.clear();
            ok(&req.id, json!({ "items": store.list() }))
        }
        _ => err(
            &req.id,
            "not_implemented",
            format!("unknown method: {}", req.method),
            None,
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let (collection, op) = req.method.split_once('.')?;
    if !COLLECTION_NAMES.contains(&collection) || !CRUD_OPS.contains(&op) {
        return None;
    }
    let Some(c) = state.collections.as_mut() else {
        return Some(no_workspace(&req.id));
    };
    let resp = match collection {
        "incidents" => handle_op(&mut c.incidents, op, req),
        "personnel" => handle_op(&mut c.personnel, op, req),
        "resources" => handle_op(&mut c.resources, op, req),
        "activities" => handle_op(&mut c.activities, op, req),
        "modules" => handle_op(&mut c.modules, op, req),
        "notifications" => handle_op(&mut c.notifications, op, req),
        "badges" => handle_op(&mut c.badges, op, req),
        _ => return None,
    };
    Some(resp)
}
