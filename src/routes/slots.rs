//! `/api/slots` routes — the pet slot list on the Pets screen.

use crate::game::clock::Timestamp;
use crate::game::slots::{PetSlot, SlotRegistry};
use crate::game::state::{with_engine, with_engine_mut};
use crate::game::training::TrainingState;
use crate::routes::util::{engine_error, error_span, escape_html, get_param, parse_form_body, slot_param};

// ── GET /api/slots ─────────────────────────────────────────────────

/// Handle GET /api/slots
/// Returns the full slot list HTML, including the "New Slot" button while
/// there is room.
pub fn handle_slots_get(_query: &str) -> String {
    with_engine(|e| render_slot_list(e.registry(), e.now()))
}

// ── POST /api/slots ────────────────────────────────────────────────

/// Handle POST /api/slots
/// Body params:
///   - action=create                     → open a new slot
///   - action=remove&slot={n}            → free a slot (discards training)
///   - action=assign&slot={n}&name={s}   → name the pet in a slot
///
/// Returns the re-rendered slot list, prefixed by an error line when the
/// action was rejected.
pub fn handle_slots_post(body: &str) -> String {
    let params = parse_form_body(body);
    let action = get_param(&params, "action").unwrap_or("");

    let outcome = match action {
        "create" => with_engine_mut(|e| e.create_slot().map(|_| ())),
        "remove" => match slot_param(&params) {
            Ok(id) => with_engine_mut(|e| e.remove_slot(id)),
            Err(html) => return html,
        },
        "assign" => match slot_param(&params) {
            Ok(id) => {
                let name = get_param(&params, "name").unwrap_or("");
                with_engine_mut(|e| e.assign_pet(id, name))
            }
            Err(html) => return html,
        },
        _ => return error_span("Unknown slot action"),
    };

    let list = with_engine(|e| render_slot_list(e.registry(), e.now()));
    match outcome {
        Ok(()) => list,
        Err(err) => format!("{}{}", engine_error(&err), list),
    }
}

// ── Rendering ──────────────────────────────────────────────────────

pub fn render_slot_list(registry: &SlotRegistry, now: Timestamp) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div id="pet-slots" class="grid grid-cols-1 gap-3">"#);

    for slot in registry.list_slots() {
        html.push_str(&render_slot_card(slot, now));
    }

    if registry.is_full() {
        html.push_str(&format!(
            r#"<p class="text-xs text-center text-slate-500">All {} slots in use</p>"#,
            registry.capacity()
        ));
    } else {
        html.push_str(
            r##"<button class="rounded-lg border-2 border-dashed border-pp-purple py-3 text-pp-purple font-bold" hx-post="/api/slots" hx-vals='{"action":"create"}' hx-target="#pet-slots" hx-swap="outerHTML">+ New Slot</button>"##,
        );
    }

    html.push_str("</div>");
    html
}

/// One slot card. The countdown block is refreshed separately by the tick
/// loop, so it carries its own id.
pub fn render_slot_card(slot: &PetSlot, now: Timestamp) -> String {
    let mut html = String::with_capacity(768);
    let name = slot
        .pet
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "Empty slot".to_string());

    html.push_str(&format!(
        r#"<div id="slot-{id}" class="rounded-lg bg-pp-card p-3 flex flex-col gap-2">"#,
        id = slot.id
    ));
    html.push_str(&format!(r#"<p class="font-bold">{}</p>"#, name));

    match slot.training_state(now) {
        TrainingState::Idle => {
            html.push_str(&format!(
                r##"<button class="bg-pp-purple text-white rounded py-1" hx-post="/api/training" hx-vals='{{"action":"start","slot":"{id}"}}' hx-target="#slot-{id}" hx-swap="outerHTML">Train (24h)</button>"##,
                id = slot.id
            ));
        }
        TrainingState::Training => {
            html.push_str(&render_countdown(slot, now));
        }
        TrainingState::ReadyToCollect => {
            html.push_str(&render_countdown(slot, now));
            html.push_str(&format!(
                r##"<button class="bg-emerald-500 text-white rounded py-1" hx-post="/api/training" hx-vals='{{"action":"collect","slot":"{id}"}}' hx-target="#slot-{id}" hx-swap="outerHTML">Collect</button>"##,
                id = slot.id
            ));
        }
    }

    html.push_str("</div>");
    html
}

/// Countdown text plus progress bar. Empty for idle slots.
pub fn render_countdown(slot: &PetSlot, now: Timestamp) -> String {
    let Some(view) = slot.countdown(now) else {
        return String::new();
    };
    let pct = (view.progress * 100.0).round() as u32;
    let label = if view.is_complete {
        "Training complete!".to_string()
    } else {
        format!("Training: <strong>{}</strong>", view.formatted)
    };
    format!(
        r#"<div id="countdown-{id}" data-complete="{done}"><p class="text-sm">{label}</p><div class="h-2 rounded bg-slate-200"><div class="h-2 rounded bg-pp-purple" style="width: {pct}%"></div></div></div>"#,
        id = slot.id,
        done = view.is_complete,
        label = label,
        pct = pct
    )
}
