use crate::ipc::error::{no_workspace, ok};
use crate::ipc::helpers::{decode, require_str};
use crate::ipc::types::{AppState, Request};
use crate::notifications::{self, NotificationCenter, NotificationFilter};
use serde_json::json;

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_ref() else {
        return no_workspace(&req.id);
    };
    let criteria: NotificationFilter = match decode(req, None) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let items = c.notifications.list();
    ok(
        &req.id,
        json!({
            "items": notifications::filter(items, &criteria),
            "unreadCount": notifications::unread_count(items),
        }),
    )
}

fn handle_mark_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    let id = match require_str(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut center = NotificationCenter::new(&mut c.notifications);
    let found = center.mark_as_read(id);
    ok(
        &req.id,
        json!({ "found": found, "unreadCount": center.unread_count() }),
    )
}

fn handle_mark_all_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    let mut center = NotificationCenter::new(&mut c.notifications);
    let updated = center.mark_all_as_read();
    ok(
        &req.id,
        json!({ "updated": updated, "unreadCount": center.unread_count() }),
    )
}

fn handle_dismiss(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    let id = match require_str(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut center = NotificationCenter::new(&mut c.notifications);
    let found = center.dismiss(id);
    ok(
        &req.id,
        json!({ "found": found, "unreadCount": center.unread_count() }),
    )
}

fn handle_unread_count(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_ref() else {
        return no_workspace(&req.id);
    };
    ok(
        &req.id,
        json!({ "unreadCount": notifications::unread_count(c.notifications.list()) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notifications.filter" => Some(handle_filter(state, req)),
        "notifications.markRead" => Some(handle_mark_read(state, req)),
        "notifications.markAllRead" => Some(handle_mark_all_read(state, req)),
        "notifications.dismiss" => Some(handle_dismiss(state, req)),
        "notifications.unreadCount" => Some(handle_unread_count(state, req)),
        _ => None,
    }
}
