//! Gaussian similarity weighting between a film's scores and the session
//! target, in one of two schemes: the scalar 0–100 chaos axis, or the
//! normalized cursed/spooky/cozy triangle. Higher weight means more likely
//! to be drawn; weight decays smoothly with distance and never hits zero
//! for unscored films.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CHAOS_BAND_GUARD, MIN_CHAOS_BAND, MIN_VIBE_BAND, NEUTRAL_CHAOS, UNSCORED_WEIGHT,
    VIBE_BAND_GUARD,
};
use crate::film::{Film, VibeMix};

/// Taste mode, mapping to a scalar chaos target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Order,
    #[default]
    Mix,
    Chaos,
}

impl Mode {
    pub fn target_chaos(self) -> f64 {
        match self {
            Self::Order => 15.0,
            Self::Mix => 50.0,
            Self::Chaos => 85.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Mix => "mix",
            Self::Chaos => "chaos",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "order" => Self::Order,
            "chaos" => Self::Chaos,
            _ => Self::Mix,
        }
    }
}

/// Variety band setting. Controls how sharply weight decays with distance
/// from the target, and how fast the deck builder narrows per draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variety {
    #[default]
    Tight,
    Medium,
    Wide,
}

impl Variety {
    /// Initial band width in the scalar scheme (chaos units).
    pub fn chaos_band(self) -> f64 {
        match self {
            Self::Tight => 8.0,
            Self::Medium => 18.0,
            Self::Wide => 35.0,
        }
    }

    /// Per-draw narrowing decrement in the scalar scheme. Tighter variety
    /// narrows faster.
    pub fn chaos_decrement(self) -> f64 {
        match self {
            Self::Tight => 0.6,
            Self::Medium => 0.4,
            Self::Wide => 0.2,
        }
    }

    /// Initial band width in the vibe scheme (fractional distance).
    pub fn vibe_band(self) -> f64 {
        match self {
            Self::Tight => 0.10,
            Self::Medium => 0.18,
            Self::Wide => 0.30,
        }
    }

    pub fn vibe_decrement(self) -> f64 {
        match self {
            Self::Tight => 0.008,
            Self::Medium => 0.005,
            Self::Wide => 0.003,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tight => "T",
            Self::Medium => "M",
            Self::Wide => "W",
        }
    }

    /// Parse the UI state strings `T`/`M`/`W` (case-insensitive; full
    /// words accepted). Unknown input lands on Tight, the UI default.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "m" | "medium" => Self::Medium,
            "w" | "wide" => Self::Wide,
            _ => Self::Tight,
        }
    }
}

/// The user's desired vibe: a point on the chaos axis or in the vibe
/// triangle. Never persisted across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Chaos(f64),
    Vibe(VibeMix),
}

impl Target {
    /// Initial band width for this scheme at the given variety setting.
    pub fn initial_band(&self, variety: Variety) -> f64 {
        match self {
            Self::Chaos(_) => variety.chaos_band(),
            Self::Vibe(_) => variety.vibe_band(),
        }
    }

    /// Narrow a band by one draw's decrement, clamped at the scheme floor
    /// so late draws keep nonzero spread.
    pub fn narrow_band(&self, band: f64, variety: Variety) -> f64 {
        match self {
            Self::Chaos(_) => (band - variety.chaos_decrement()).max(MIN_CHAOS_BAND),
            Self::Vibe(_) => (band - variety.vibe_decrement()).max(MIN_VIBE_BAND),
        }
    }
}

/// Scalar scheme weight: Gaussian falloff from the target. An unscored
/// film gets the fixed low `UNSCORED_WEIGHT` rather than zero.
pub fn chaos_weight(chaos: Option<f64>, target: f64, band: f64) -> f64 {
    let Some(value) = chaos else {
        return UNSCORED_WEIGHT;
    };
    let band = band.max(CHAOS_BAND_GUARD);
    let d = (value - target) / band;
    (-0.5 * d * d).exp()
}

/// Euclidean distance between two mixes after normalization, with each
/// component scaled to the 0–1 fractional range.
pub fn vibe_distance(a: VibeMix, b: VibeMix) -> f64 {
    let a = a.normalized();
    let b = b.normalized();
    let dc = (a.cursed - b.cursed) / 100.0;
    let ds = (a.spooky - b.spooky) / 100.0;
    let dz = (a.cozy - b.cozy) / 100.0;
    (dc * dc + ds * ds + dz * dz).sqrt()
}

/// Vibe scheme weight: Gaussian falloff in normalized triangle distance.
pub fn vibe_weight(vibe: Option<VibeMix>, target: VibeMix, band: f64) -> f64 {
    let Some(mix) = vibe else {
        return UNSCORED_WEIGHT;
    };
    let band = band.max(VIBE_BAND_GUARD);
    let d = vibe_distance(mix, target) / band;
    (-0.5 * d * d).exp()
}

/// Weight of a film against a target under the target's scheme.
pub fn weight_for(film: &Film, target: &Target, band: f64) -> f64 {
    match target {
        Target::Chaos(t) => chaos_weight(film.chaos, *t, band),
        Target::Vibe(t) => vibe_weight(film.vibe, *t, band),
    }
}

/// Distance from a film to a target in the target's scheme, substituting
/// the neutral value when the film is unscored. Scalar distances are in
/// chaos units, vibe distances fractional.
pub fn distance_to(film: &Film, target: &Target) -> f64 {
    match target {
        Target::Chaos(t) => (film.chaos.unwrap_or(NEUTRAL_CHAOS) - t).abs(),
        Target::Vibe(t) => vibe_distance(film.vibe.unwrap_or(VibeMix::NEUTRAL), *t),
    }
}

/// Distance between two films in the target's scheme, for "close to the
/// last pick" reroll pooling.
pub fn distance_between(a: &Film, b: &Film, target: &Target) -> f64 {
    match target {
        Target::Chaos(_) => {
            (a.chaos.unwrap_or(NEUTRAL_CHAOS) - b.chaos.unwrap_or(NEUTRAL_CHAOS)).abs()
        }
        Target::Vibe(_) => vibe_distance(
            a.vibe.unwrap_or(VibeMix::NEUTRAL),
            b.vibe.unwrap_or(VibeMix::NEUTRAL),
        ),
    }
}
