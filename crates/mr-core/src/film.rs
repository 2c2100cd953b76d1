use serde::{Deserialize, Serialize};

/// Named content/theme tags on a film. Absent flags are false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub theme_witchy: bool,
    #[serde(default)]
    pub theme_body_horror: bool,
    #[serde(default)]
    pub theme_folk: bool,
    #[serde(default)]
    pub theme_found_footage: bool,
    #[serde(default)]
    pub theme_neon: bool,
    #[serde(default)]
    pub extreme_gore: bool,
    #[serde(default)]
    pub sexual_violence: bool,
    #[serde(default)]
    pub kids_in_peril: bool,
}

impl Flags {
    /// Build flags from short data-file tokens (`witchy`, `body`, `folk`,
    /// `found`, `neon`, `gore`, `sv`, `kids`). Unknown tokens are ignored.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut flags = Self::default();
        for token in tokens {
            flags.set_token(token);
        }
        flags
    }

    /// Set a single flag by its short token. Returns false for unknown tokens.
    pub fn set_token(&mut self, token: &str) -> bool {
        match token {
            "witchy" => self.theme_witchy = true,
            "body" => self.theme_body_horror = true,
            "folk" => self.theme_folk = true,
            "found" => self.theme_found_footage = true,
            "neon" => self.theme_neon = true,
            "gore" => self.extreme_gore = true,
            "sv" => self.sexual_violence = true,
            "kids" => self.kids_in_peril = true,
            _ => return false,
        }
        true
    }

    /// Merge another flag set in, OR-wise. Used by curation overrides,
    /// which may add flags but never clear them.
    pub fn merge(&mut self, other: Flags) {
        self.theme_witchy |= other.theme_witchy;
        self.theme_body_horror |= other.theme_body_horror;
        self.theme_folk |= other.theme_folk;
        self.theme_found_footage |= other.theme_found_footage;
        self.theme_neon |= other.theme_neon;
        self.extreme_gore |= other.extreme_gore;
        self.sexual_violence |= other.sexual_violence;
        self.kids_in_peril |= other.kids_in_peril;
    }
}

/// An unnormalized cursed/spooky/cozy composition (scheme B similarity
/// space). Raw components are non-negative but need not sum to anything.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VibeMix {
    pub cursed: f64,
    pub spooky: f64,
    pub cozy: f64,
}

impl VibeMix {
    /// Default split for films with no vibe scores.
    pub const NEUTRAL: VibeMix = VibeMix {
        cursed: 33.0,
        spooky: 33.0,
        cozy: 34.0,
    };

    pub fn new(cursed: f64, spooky: f64, cozy: f64) -> Self {
        Self {
            cursed,
            spooky,
            cozy,
        }
    }

    /// Percentages summing to 100. Negative components clamp to zero; a
    /// zero sum falls back to the neutral split. Idempotent within
    /// rounding tolerance.
    pub fn normalized(self) -> VibeMix {
        let cursed = self.cursed.max(0.0);
        let spooky = self.spooky.max(0.0);
        let cozy = self.cozy.max(0.0);
        let sum = cursed + spooky + cozy;
        if sum <= 0.0 || !sum.is_finite() {
            return Self::NEUTRAL;
        }
        VibeMix {
            cursed: cursed / sum * 100.0,
            spooky: spooky / sum * 100.0,
            cozy: cozy / sum * 100.0,
        }
    }

    /// Cozy component as a 0–1 fraction of the normalized mix.
    pub fn cozy_share(self) -> f64 {
        self.normalized().cozy / 100.0
    }

    /// Combined cursed+spooky intensity on the 0–100 scale.
    pub fn intensity(self) -> f64 {
        let n = self.normalized();
        n.cursed + n.spooky
    }
}

/// The unit of selection. Similarity attributes are `Option`s: `None`
/// means the enrichment pipeline never scored this film, and every
/// consumer must branch on that explicitly rather than defaulting in
/// place.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub chaos: Option<f64>,
    #[serde(default)]
    pub vibe: Option<VibeMix>,
    #[serde(default)]
    pub flags: Flags,
}

impl Film {
    /// Minimal film for construction sites that only care about identity.
    pub fn titled(title: &str, year: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            year: year.map(str::to_string),
            ..Self::default()
        }
    }

    /// Identity key for exclusion and dedup: `title::year`, case-sensitive,
    /// with an empty year slot when the year is unknown. Two films with the
    /// same key are indistinguishable to the exclusion store.
    pub fn identity_key(&self) -> String {
        format!("{}::{}", self.title, self.year.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_includes_year() {
        let film = Film::titled("Begotten", Some("1989"));
        assert_eq!(film.identity_key(), "Begotten::1989");
    }

    #[test]
    fn test_identity_key_missing_year() {
        let film = Film::titled("Ghostwatch", None);
        assert_eq!(film.identity_key(), "Ghostwatch::");
    }

    #[test]
    fn test_identity_key_case_sensitive() {
        let a = Film::titled("Zardoz", Some("1974"));
        let b = Film::titled("zardoz", Some("1974"));
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_flags_from_tokens() {
        let flags = Flags::from_tokens(["gore", "witchy", "bogus"]);
        assert!(flags.extreme_gore);
        assert!(flags.theme_witchy);
        assert!(!flags.theme_neon);
        assert!(!flags.sexual_violence);
    }

    #[test]
    fn test_flags_merge_is_additive() {
        let mut flags = Flags::from_tokens(["neon"]);
        flags.merge(Flags::from_tokens(["gore"]));
        assert!(flags.theme_neon);
        assert!(flags.extreme_gore);
    }

    #[test]
    fn test_normalize_sums_to_100() {
        let mix = VibeMix::new(2.0, 1.0, 1.0).normalized();
        assert!((mix.cursed + mix.spooky + mix.cozy - 100.0).abs() < 1e-9);
        assert!((mix.cursed - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_clamps_negatives() {
        let mix = VibeMix::new(-5.0, 0.0, 10.0).normalized();
        assert_eq!(mix.cursed, 0.0);
        assert!((mix.cozy - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_zero_sum_is_neutral() {
        assert_eq!(VibeMix::new(0.0, 0.0, 0.0).normalized(), VibeMix::NEUTRAL);
        assert_eq!(VibeMix::new(-1.0, -2.0, 0.0).normalized(), VibeMix::NEUTRAL);
    }

    #[test]
    fn test_intensity_is_complement_of_cozy() {
        let mix = VibeMix::new(40.0, 30.0, 30.0);
        assert!((mix.intensity() + mix.normalized().cozy - 100.0).abs() < 1e-9);
    }
}
