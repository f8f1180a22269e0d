use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::helpers::require_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let degraded: Vec<_> = state
        .collections
        .as_ref()
        .map(|c| c.degraded())
        .unwrap_or_default()
        .into_iter()
        .map(|(name, reason)| json!({ "collection": name, "reason": reason }))
        .collect();
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "persistent": state.persistent,
            "degraded": degraded,
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match require_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    match state.open_workspace(&path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "persistent": state.persistent,
            }),
        ),
        Err(e) => err(&req.id, "workspace_open_failed", format!("{e:#}"), None),
    }
}

fn handle_workspace_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let was_open = state.workspace.is_some();
    state.close_workspace();
    ok(&req.id, json!({ "closed": was_open }))
}

fn handle_workspace_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(collections) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    collections.reset_all();
    tracing::info!("all collections reset to seed data");
    ok(&req.id, json!({ "reset": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.close" => Some(handle_workspace_close(state, req)),
        "workspace.reset" => Some(handle_workspace_reset(state, req)),
        _ => None,
    }
}
