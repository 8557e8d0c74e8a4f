//! `/api/training/*` and `/api/tick` routes — starting, collecting and
//! refreshing training sessions.

use crate::game::state::{with_engine, with_engine_mut};
use crate::routes::slots::{render_countdown, render_slot_card};
use crate::routes::util::{engine_error, error_span, get_param, parse_form_body, parse_query, slot_param};

// ── POST /api/training ─────────────────────────────────────────────

/// Handle POST /api/training
/// Body params:
///   - action=start&slot={n}    → begin a 24h session
///   - action=collect&slot={n}  → collect a finished session
///
/// Returns the re-rendered slot card. Rejected transitions prepend an
/// error line to the unchanged card.
pub fn handle_training_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id = match slot_param(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };

    let outcome = match get_param(&params, "action").unwrap_or("") {
        "start" => with_engine_mut(|e| e.start_training(id).map(|_| ())),
        "collect" => with_engine_mut(|e| e.collect(id).map(|_| ())),
        _ => return error_span("Unknown training action"),
    };

    let card = with_engine(|e| {
        e.registry()
            .get_slot(id)
            .map(|slot| render_slot_card(slot, e.now()))
    });
    match (outcome, card) {
        (Ok(()), Ok(card)) => card,
        (Err(err), Ok(card)) => format!("{}{}", engine_error(&err), card),
        (_, Err(err)) => engine_error(&err),
    }
}

// ── GET /api/training/countdown ────────────────────────────────────

/// Handle GET /api/training/countdown?slot={n}
/// Returns just the countdown block for one slot (empty while idle).
pub fn handle_countdown_get(query: &str) -> String {
    let params = parse_query(query);
    let id = match slot_param(&params) {
        Ok(id) => id,
        Err(html) => return html,
    };
    with_engine(|e| match e.registry().get_slot(id) {
        Ok(slot) => render_countdown(slot, e.now()),
        Err(err) => engine_error(&err),
    })
}

// ── POST /api/tick ─────────────────────────────────────────────────

/// Handle POST /api/tick
/// Refreshes every watched countdown against one clock read and returns them
/// as a JSON array. An empty array means the shell can stop its interval.
pub fn handle_tick_post(_body: &str) -> String {
    let views = with_engine(|e| e.tick());
    serde_json::to_string(&views).unwrap_or_else(|_| "[]".to_string())
}
