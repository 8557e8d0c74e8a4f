//! `/api/state/*` routes — snapshot export and restore.
//!
//! The shell persists the encoded snapshot to localStorage after every
//! mutation and restores it on page load, before any other request.

use crate::game::state::{with_engine, with_engine_mut};
use crate::routes::util::{get_param, parse_form_body};

/// Handle GET /api/state
/// Returns the snapshot as JSON.
pub fn handle_state_get(_query: &str) -> String {
    with_engine(|e| e.export_json())
}

/// Handle GET /api/state/persist
/// Returns the snapshot as URL-safe base64 for localStorage.
pub fn handle_persist_get(_query: &str) -> String {
    with_engine(|e| e.encode_snapshot())
}

/// Handle POST /api/state/restore
/// Body: state={base64} (or the raw base64 string).
pub fn handle_restore_post(body: &str) -> String {
    let params = parse_form_body(body);
    let state_b64 = get_param(&params, "state").unwrap_or(body.trim());
    match with_engine_mut(|e| e.restore_encoded(state_b64)) {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    }
}

/// Handle POST /api/state/import
/// Body: a JSON snapshot as produced by GET /api/state.
pub fn handle_import_post(body: &str) -> String {
    match with_engine_mut(|e| e.import_json(body)) {
        Ok(()) => {
            r#"<span class="text-emerald-600">Game state imported successfully</span>"#.to_string()
        }
        Err(e) => format!(r#"<span class="text-pp-red">Import failed: {}</span>"#, e),
    }
}
