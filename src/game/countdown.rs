//! Countdown derivation — remaining time, `HH:MM:SS` text and a progress
//! fraction for one training session.
//!
//! Pure: no clock reads, no state. Callers take one `now` snapshot per tick
//! and pass it to every derivation so fields of the same view never tear.
//! Out-of-range inputs (clock skew, targets already in the past) are clamped,
//! never reported as errors.

use serde::Serialize;

use crate::config::TRAINING_DURATION_MS;
use crate::game::clock::Timestamp;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownView {
    pub time_left_ms: u64,
    pub formatted: String,
    /// Fraction of the session elapsed, always within `[0, 1]`.
    pub progress: f64,
    pub is_complete: bool,
}

/// Derive the view for `target` using the standard 24h session length.
///
/// `None` means there is no active countdown. That is deliberately not the
/// same thing as a complete one.
pub fn derive(target: Option<Timestamp>, now: Timestamp) -> Option<CountdownView> {
    derive_with_duration(target, now, TRAINING_DURATION_MS)
}

/// Derive the view for `target` against an explicit session length.
pub fn derive_with_duration(
    target: Option<Timestamp>,
    now: Timestamp,
    total_ms: u64,
) -> Option<CountdownView> {
    let target = target?;
    let time_left_ms = target.saturating_sub(now);
    let is_complete = time_left_ms == 0;

    Some(CountdownView {
        time_left_ms,
        formatted: format_hms(time_left_ms),
        progress: progress(time_left_ms, total_ms),
        is_complete,
    })
}

/// Zero-padded `HH:MM:SS`. Hours do not wrap at 24.
pub fn format_hms(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn progress(time_left_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return if time_left_ms == 0 { 1.0 } else { 0.0 };
    }
    (1.0 - time_left_ms as f64 / total_ms as f64).clamp(0.0, 1.0)
}
