//! Sampling scheduler - timestamps at which frames are captured.

/// Smallest accepted pulse, in milliseconds.
pub const MIN_PULSE_MS: i64 = 100;
/// Largest accepted pulse, in milliseconds.
pub const MAX_PULSE_MS: i64 = 300_000;
/// Pulse used when the caller does not supply one.
pub const DEFAULT_PULSE_MS: i64 = 1_000;

/// Clamp a caller-supplied pulse into the accepted range, applying the
/// default when omitted. Applied at the ingestion boundary so the scheduler
/// itself only ever sees sane pulses.
pub fn clamp_pulse(pulse_ms: Option<i64>) -> i64 {
    pulse_ms
        .unwrap_or(DEFAULT_PULSE_MS)
        .clamp(MIN_PULSE_MS, MAX_PULSE_MS)
}

/// Compute the ordered capture timestamps (in seconds) for a video.
///
/// Starts at 0 and steps by the pulse until the duration is reached; the
/// duration itself is never emitted. Pure and deterministic: identical
/// inputs always yield an identical schedule, which is what makes
/// re-triggering reproducible.
pub fn schedule(duration_ms: i64, pulse_ms: i64) -> Vec<f64> {
    if duration_ms <= 0 || pulse_ms <= 0 {
        return Vec::new();
    }

    let duration_seconds = duration_ms as f64 / 1000.0;
    let pulse_seconds = pulse_ms as f64 / 1000.0;

    let mut timestamps = Vec::new();
    let mut t = 0.0;
    while t < duration_seconds {
        timestamps.push(t);
        t += pulse_seconds;
    }

    timestamps
}
