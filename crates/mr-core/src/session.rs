//! One selection session: the catalog, the user's current taste state,
//! the deck, the last pick, and the injected RNG, all in one explicit
//! context object. All entry points are synchronous and infallible; every
//! degenerate state degrades to a valid pick, and only an empty catalog
//! yields `None`.

use rand::Rng;

use crate::banish::BanishList;
use crate::constants::{REROLL_CHAOS_BAND, REROLL_VIBE_BAND};
use crate::deck::build_deck;
use crate::film::{Film, VibeMix};
use crate::filter::{ContentFilters, Filters, Preset, Theme};
use crate::similarity::{Mode, Target, Variety, distance_between, distance_to};

pub struct Session<R: Rng> {
    films: Vec<Film>,
    mode: Mode,
    variety: Variety,
    filters: Filters,
    vibe_target: Option<VibeMix>,
    banished: BanishList,
    deck: Vec<usize>,
    last_pick: Option<usize>,
    today: String,
    rng: R,
}

impl<R: Rng> Session<R> {
    /// Start a session over a catalog with default taste state (mix mode,
    /// tight variety, no filters) and an immediately built deck. `today`
    /// is passed in so callers and tests control the clock.
    pub fn new(films: Vec<Film>, today: &str, rng: R) -> Self {
        let mut session = Self {
            films,
            mode: Mode::default(),
            variety: Variety::default(),
            filters: Filters::default(),
            vibe_target: None,
            banished: BanishList::empty(today),
            deck: Vec::new(),
            last_pick: None,
            today: today.to_string(),
            rng,
        };
        session.rebuild_deck();
        session
    }

    /// Active selection target: the explicit vibe triple when one has been
    /// set, otherwise the scalar target implied by the mode.
    pub fn target(&self) -> Target {
        match self.vibe_target {
            Some(mix) => Target::Vibe(mix),
            None => Target::Chaos(self.mode.target_chaos()),
        }
    }

    pub fn rebuild_deck(&mut self) {
        let banished = self.banished.active_set(&self.today);
        let target = self.target();
        self.deck = build_deck(
            &self.films,
            &self.filters,
            &banished,
            &target,
            self.variety,
            &mut self.rng,
        );
    }

    // --- Control setters; each rebuilds the deck as a side effect ---

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.rebuild_deck();
    }

    pub fn set_variety(&mut self, variety: Variety) {
        self.variety = variety;
        self.rebuild_deck();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.filters.theme = theme;
        self.rebuild_deck();
    }

    pub fn set_preset(&mut self, preset: Option<Preset>) {
        self.filters.preset = preset;
        self.rebuild_deck();
    }

    pub fn set_content(&mut self, content: ContentFilters) {
        self.filters.content = content;
        self.rebuild_deck();
    }

    /// Switch to the 3-axis scheme with an explicit target mix.
    pub fn set_vibe_target(&mut self, mix: VibeMix) {
        self.vibe_target = Some(mix);
        self.rebuild_deck();
    }

    /// Back to the scalar scheme driven by the mode.
    pub fn clear_vibe_target(&mut self) {
        self.vibe_target = None;
        self.rebuild_deck();
    }

    // --- Dealing ---

    /// Deal the next film off the deck, rebuilding first when it has run
    /// dry. A stale or out-of-range entry (possible when a checkpointed
    /// deck outlives a catalog edit) falls back to a uniform random index.
    /// `None` only when the catalog is empty.
    pub fn deal_index(&mut self) -> Option<usize> {
        if self.films.is_empty() {
            return None;
        }
        if self.deck.is_empty() {
            self.rebuild_deck();
        }
        let idx = match self.deck.pop() {
            Some(i) if i < self.films.len() => i,
            _ => self.rng.random_range(0..self.films.len()),
        };
        self.last_pick = Some(idx);
        Some(idx)
    }

    pub fn deal_one(&mut self) -> Option<&Film> {
        let idx = self.deal_index()?;
        Some(&self.films[idx])
    }

    /// Pick a film near the last one without consuming the deck. The pool
    /// is films (minus the last pick) that pass the soft filters and sit
    /// within the fixed reroll band of the target or the last pick; it
    /// relaxes to soft-filter passers, then to everything else. A
    /// single-film catalog can only repeat itself.
    pub fn reroll_index(&mut self) -> Option<usize> {
        let Some(last) = self.last_pick.filter(|&i| i < self.films.len()) else {
            return self.deal_index();
        };

        let target = self.target();
        let band = match target {
            Target::Chaos(_) => REROLL_CHAOS_BAND,
            Target::Vibe(_) => REROLL_VIBE_BAND,
        };

        let films = &self.films;
        let last_film = &films[last];
        let mut pool: Vec<usize> = (0..films.len())
            .filter(|&i| i != last)
            .filter(|&i| self.filters.passes_soft(&films[i]))
            .filter(|&i| {
                distance_to(&films[i], &target) <= band
                    || distance_between(&films[i], last_film, &target) <= band
            })
            .collect();

        if pool.is_empty() {
            pool = (0..films.len())
                .filter(|&i| i != last)
                .filter(|&i| self.filters.passes_soft(&films[i]))
                .collect();
        }
        if pool.is_empty() {
            pool = (0..films.len()).filter(|&i| i != last).collect();
        }
        if pool.is_empty() {
            // Nothing but the last pick exists.
            return Some(last);
        }

        let idx = pool[self.rng.random_range(0..pool.len())];
        self.last_pick = Some(idx);
        Some(idx)
    }

    pub fn reroll_nearby(&mut self) -> Option<&Film> {
        let idx = self.reroll_index()?;
        Some(&self.films[idx])
    }

    // --- Daily exclusion ---

    /// Banish the last pick for the rest of the day, then rebuild and
    /// auto-deal. Returns the fresh pick, or `None` when there is no last
    /// pick (or no films).
    pub fn banish_last(&mut self) -> Option<usize> {
        let last = self.last_pick.filter(|&i| i < self.films.len())?;
        let key = self.films[last].identity_key();
        self.banished.banish(key, &self.today);
        self.rebuild_deck();
        self.deal_index()
    }

    /// Undo the most recent banish (LIFO) and rebuild. No auto-deal.
    /// Returns the restored key.
    pub fn undo_banish(&mut self) -> Option<String> {
        let undone = self.banished.undo(&self.today)?;
        self.rebuild_deck();
        Some(undone)
    }

    // --- State access and checkpointing ---

    pub fn films(&self) -> &[Film] {
        &self.films
    }

    pub fn film(&self, idx: usize) -> Option<&Film> {
        self.films.get(idx)
    }

    pub fn deck(&self) -> &[usize] {
        &self.deck
    }

    pub fn last_pick(&self) -> Option<usize> {
        self.last_pick
    }

    pub fn banished(&self) -> &BanishList {
        &self.banished
    }

    pub fn today(&self) -> &str {
        &self.today
    }

    /// Films passing the full predicate right now, without the relaxation
    /// chain. Purely informational.
    pub fn candidate_count(&self) -> usize {
        let banished = self.banished.active_set(&self.today);
        self.films
            .iter()
            .filter(|m| self.filters.is_candidate(m, &banished))
            .count()
    }

    /// Replace the deck with a checkpointed one (from a previous run).
    /// Entries are validated lazily at deal time.
    pub fn restore_deck(&mut self, deck: Vec<usize>) {
        self.deck = deck;
    }

    /// Restore a persisted exclusion list and rebuild. A list dated other
    /// than today is kept but contributes nothing until it is reset by
    /// the next banish.
    pub fn restore_banished(&mut self, banished: BanishList) {
        self.banished = banished;
        self.rebuild_deck();
    }

    pub fn restore_last_pick(&mut self, idx: Option<usize>) {
        self.last_pick = idx.filter(|&i| i < self.films.len());
    }
}
