//! Movie-roulette selection core.
//!
//! Deals a weighted-random film from a pre-shuffled deck biased toward a
//! moving taste target: a scalar "chaos" score or a cursed/spooky/cozy
//! vibe triangle, filtered by presets, themes, content toggles, and a
//! per-day banish list.
//!
//! Zero I/O — pure math and state with an injected RNG, no opinions about
//! persistence or rendering.

pub mod banish;
pub mod constants;
pub mod deck;
pub mod film;
pub mod filter;
pub mod session;
pub mod similarity;
pub mod time;

pub use banish::BanishList;
pub use constants::{DECK_MAX, NEUTRAL_CHAOS, UNSCORED_WEIGHT};
pub use deck::build_deck;
pub use film::{Film, Flags, VibeMix};
pub use filter::{ContentFilters, Filters, Preset, PresetThresholds, Theme};
pub use session::Session;
pub use similarity::{Mode, Target, Variety, weight_for};
pub use time::{day_key, today_key};
