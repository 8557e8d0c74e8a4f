//! Game progression engine — pet slots, training timers, countdowns and the
//! active screen. State lives in WASM memory (thread_local) for the lifetime
//! of the Web Worker; see `state`.

pub mod clock;
pub mod countdown;
pub mod screen;
pub mod slots;
pub mod state;
pub mod ticker;
pub mod training;
