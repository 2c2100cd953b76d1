//! Candidate filtering: preset hard rules, theme selection, content-safety
//! toggles, and the daily exclusion set, composed by logical AND with a
//! relaxation chain that guarantees a non-empty candidate set whenever the
//! catalog has at least one film.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::NEUTRAL_CHAOS;
use crate::film::{Film, Flags};

/// Single-flag theme selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    All,
    Witchy,
    BodyHorror,
    Folk,
    FoundFootage,
    Neon,
}

impl Theme {
    pub fn passes(self, flags: &Flags) -> bool {
        match self {
            Self::All => true,
            Self::Witchy => flags.theme_witchy,
            Self::BodyHorror => flags.theme_body_horror,
            Self::Folk => flags.theme_folk,
            Self::FoundFootage => flags.theme_found_footage,
            Self::Neon => flags.theme_neon,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Witchy => "witch",
            Self::BodyHorror => "body",
            Self::Folk => "folk",
            Self::FoundFootage => "found",
            Self::Neon => "neon",
        }
    }

    /// Parse the UI state strings; unknown input means no theme filter.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "witch" | "witchy" => Self::Witchy,
            "body" => Self::BodyHorror,
            "folk" => Self::Folk,
            "found" => Self::FoundFootage,
            "neon" => Self::Neon,
            _ => Self::All,
        }
    }
}

/// Independently togglable content-safety exclusions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilters {
    pub no_gore: bool,
    pub no_sexual_violence: bool,
    pub no_kids_in_peril: bool,
}

impl ContentFilters {
    pub fn passes(self, flags: &Flags) -> bool {
        if self.no_gore && flags.extreme_gore {
            return false;
        }
        if self.no_sexual_violence && flags.sexual_violence {
            return false;
        }
        if self.no_kids_in_peril && flags.kids_in_peril {
            return false;
        }
        true
    }
}

/// Named hard-filter bundle overriding fine-grained toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Cozy,
    Midnight,
    Folk,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cozy => "cozy",
            Self::Midnight => "midnight",
            Self::Folk => "folk",
        }
    }

    pub fn from_str_lossy(s: &str) -> Option<Self> {
        match s {
            "cozy" => Some(Self::Cozy),
            "midnight" => Some(Self::Midnight),
            "folk" => Some(Self::Folk),
            _ => None,
        }
    }
}

/// Tuned-by-trial preset cutoffs. Defaults mirror the curated values the
/// picker shipped with; callers may override.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetThresholds {
    /// Cozy: maximum intensity score.
    pub cozy_max_chaos: f64,
    /// Cozy (vibe scheme): minimum cozy share, 0–1.
    pub cozy_min_cozy_share: f64,
    /// Midnight: minimum intensity with exactly one thematic flag.
    pub midnight_single_flag_min: f64,
    /// Midnight: minimum intensity with two or more thematic flags.
    pub midnight_multi_flag_min: f64,
}

impl Default for PresetThresholds {
    fn default() -> Self {
        Self {
            cozy_max_chaos: 45.0,
            cozy_min_cozy_share: 0.5,
            midnight_single_flag_min: 70.0,
            midnight_multi_flag_min: 60.0,
        }
    }
}

/// Intensity score used by preset rules: the chaos score when present,
/// the cursed+spooky share under the vibe scheme, else the neutral
/// midpoint.
fn intensity(film: &Film) -> f64 {
    match film.chaos {
        Some(c) => c,
        None => match film.vibe {
            Some(mix) => mix.intensity(),
            None => NEUTRAL_CHAOS,
        },
    }
}

fn preset_pass(film: &Film, preset: Option<Preset>, th: &PresetThresholds) -> bool {
    let Some(preset) = preset else {
        return true;
    };
    let f = &film.flags;
    match preset {
        Preset::Midnight => {
            let count = [
                f.theme_neon,
                f.extreme_gore,
                f.theme_body_horror,
                f.theme_found_footage,
                f.theme_witchy,
            ]
            .iter()
            .filter(|&&b| b)
            .count();
            match count {
                0 => false,
                1 => intensity(film) >= th.midnight_single_flag_min,
                _ => intensity(film) >= th.midnight_multi_flag_min,
            }
        }
        Preset::Cozy => {
            if f.extreme_gore || f.sexual_violence {
                return false;
            }
            let cozy_enough = film
                .vibe
                .map(|mix| mix.cozy_share() >= th.cozy_min_cozy_share)
                .unwrap_or(false);
            intensity(film) <= th.cozy_max_chaos || cozy_enough
        }
        Preset::Folk => f.theme_folk || f.theme_witchy,
    }
}

/// The composed filter state for one session.
#[derive(Clone, Debug, Default)]
pub struct Filters {
    pub preset: Option<Preset>,
    pub theme: Theme,
    pub content: ContentFilters,
    pub thresholds: PresetThresholds,
}

impl Filters {
    /// Full predicate: preset AND not-banished AND theme AND content.
    /// Depends only on the film and the active state, never on prior calls.
    pub fn is_candidate(&self, film: &Film, banished: &HashSet<String>) -> bool {
        preset_pass(film, self.preset, &self.thresholds)
            && !banished.contains(&film.identity_key())
            && self.theme.passes(&film.flags)
            && self.content.passes(&film.flags)
    }

    /// Predicates that apply to rerolls: everything except the daily
    /// exclusion, which only gates the deck.
    pub fn passes_soft(&self, film: &Film) -> bool {
        preset_pass(film, self.preset, &self.thresholds)
            && self.theme.passes(&film.flags)
            && self.content.passes(&film.flags)
    }

    /// Candidate indices with the relaxation chain: full predicate, then
    /// preset+exclusion only, then the entire list. Never empty for a
    /// non-empty catalog.
    pub fn candidates(&self, films: &[Film], banished: &HashSet<String>) -> Vec<usize> {
        let full: Vec<usize> = films
            .iter()
            .enumerate()
            .filter(|(_, m)| self.is_candidate(m, banished))
            .map(|(i, _)| i)
            .collect();
        if !full.is_empty() {
            return full;
        }

        let relaxed: Vec<usize> = films
            .iter()
            .enumerate()
            .filter(|(_, m)| {
                preset_pass(m, self.preset, &self.thresholds)
                    && !banished.contains(&m.identity_key())
            })
            .map(|(i, _)| i)
            .collect();
        if !relaxed.is_empty() {
            return relaxed;
        }

        (0..films.len()).collect()
    }
}
