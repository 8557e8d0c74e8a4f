//! In-browser checks, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use pixel_pets::game::clock::{Clock, SystemClock};
use pixel_pets::{handle_request, navigate};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn date_now_backs_the_system_clock() {
    assert!(SystemClock.now_ms() > 1_577_836_800_000);
}

#[wasm_bindgen_test]
fn training_from_the_worker_bridge() {
    let html = handle_request("POST", "/api/slots", "", "action=create");
    assert!(html.contains("slot-1"));
    let html = handle_request("POST", "/api/training", "", "action=start&slot=1");
    assert!(html.contains("Training:"));
    assert!(navigate("/pets").contains(r#""redirected":true"#));
}
