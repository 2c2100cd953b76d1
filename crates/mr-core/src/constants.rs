/// Weight given to films with no similarity score. Non-zero so unscored
/// films stay reachable in the roulette draw, but strongly disfavored.
pub const UNSCORED_WEIGHT: f64 = 0.1;

/// Neutral midpoint on the 0–100 chaos axis, used when an unscored film
/// needs a concrete value (preset checks, reroll distance).
pub const NEUTRAL_CHAOS: f64 = 50.0;

/// Floor for the scalar band width during deck narrowing (chaos units).
pub const MIN_CHAOS_BAND: f64 = 10.0;

/// Floor for the vibe band width during deck narrowing (fractional units).
pub const MIN_VIBE_BAND: f64 = 0.08;

/// Positive guard so the scalar weight function never sees a zero or
/// negative band.
pub const CHAOS_BAND_GUARD: f64 = 1.0;

/// Positive guard for the vibe band.
pub const VIBE_BAND_GUARD: f64 = 0.01;

/// Maximum number of weighted draws per deck rebuild.
pub const DECK_MAX: usize = 80;

/// Reroll closeness band on the chaos axis. Tighter than any variety level.
pub const REROLL_CHAOS_BAND: f64 = 8.0;

/// Reroll closeness band in vibe distance.
pub const REROLL_VIBE_BAND: f64 = 0.08;
