use crate::backup;
use crate::ipc::error::{err, no_workspace, ok};
use crate::ipc::helpers::require_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_ref() else {
        return no_workspace(&req.id);
    };
    let out_path = match require_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    match backup::export_bundle(&c.snapshot(), &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "outPath": out_path.to_string_lossy(),
                "bundleFormat": summary.bundle_format,
                "collectionCount": summary.collection_count,
                "recordCount": summary.record_count,
                "sha256": summary.sha256,
            }),
        ),
        Err(e) => err(&req.id, "backup_export_failed", format!("{e:#}"), None),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(c) = state.collections.as_mut() else {
        return no_workspace(&req.id);
    };
    let in_path = match require_str(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    let bundle = match backup::read_bundle(&in_path) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "backup_import_failed", format!("{e:#}"), None),
    };
    let restored: serde_json::Map<String, serde_json::Value> = c
        .restore(bundle.collections)
        .into_iter()
        .map(|(name, count)| (name.to_string(), json!(count)))
        .collect();
    tracing::info!(
        path = %in_path.to_string_lossy(),
        collections = restored.len(),
        "backup restored"
    );
    ok(
        &req.id,
        json!({
            "bundleFormatDetected": bundle.bundle_format_detected,
            "restored": restored,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, req)),
        "backup.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
