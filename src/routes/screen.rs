//! `/api/screen` routes — read and switch the active tab.

use serde_json::json;

use crate::game::state::{with_engine, with_engine_mut};
use crate::routes::util::{engine_error, get_param, parse_form_body};

/// Handle GET /api/screen
/// Returns `{"active":"<tag>"}`.
pub fn handle_screen_get(_query: &str) -> String {
    let active = with_engine(|e| e.active_tab());
    json!({ "active": active }).to_string()
}

/// Handle POST /api/screen
/// Body: tab={tag}. Returns the same JSON as GET on success, an error span
/// for unknown tags (the active tab is left unchanged).
pub fn handle_screen_post(body: &str) -> String {
    let params = parse_form_body(body);
    let tab = get_param(&params, "tab").unwrap_or("");
    match with_engine_mut(|e| e.set_active_tab(tab)) {
        Ok(active) => json!({ "active": active }).to_string(),
        Err(err) => engine_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::screen::Screen;
    use crate::game::state::{Engine, replace_engine};

    #[test]
    fn switch_tabs() {
        replace_engine(Engine::default());
        assert_eq!(handle_screen_get(""), r#"{"active":"home"}"#);
        assert_eq!(handle_screen_post("tab=spin"), r#"{"active":"spin"}"#);
        assert_eq!(handle_screen_post("tab=spin"), r#"{"active":"spin"}"#);
        assert_eq!(handle_screen_get(""), r#"{"active":"spin"}"#);
        replace_engine(Engine::default());
    }

    #[test]
    fn unknown_tab_is_rejected() {
        replace_engine(Engine::default());
        let html = handle_screen_post("tab=lottery");
        assert!(html.contains("unknown screen `lottery`"));
        assert_eq!(with_engine(|e| e.active_tab()), Screen::Home);
        replace_engine(Engine::default());
    }
}
