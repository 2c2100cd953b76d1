//! Deck construction: a uniform shuffle of the candidate set refined into
//! an ordered run of weighted draws without replacement, with the band
//! narrowing after every draw so early picks hug the target and later
//! picks spread out.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::DECK_MAX;
use crate::film::Film;
use crate::filter::Filters;
use crate::similarity::{Target, Variety, weight_for};

/// Build a deck of film indices, strongest-biased draws first. The deck is
/// consumed back-to-front by the dealer, so the draw order here is the
/// reverse of deal order only in the sense that `pop()` takes the last
/// element; every entry went through the same weighting.
///
/// Non-empty whenever `films` is non-empty: the filter chain never
/// relaxes to nothing, and an empty weighted run falls back to the
/// shuffled candidate list.
pub fn build_deck(
    films: &[Film],
    filters: &Filters,
    banished: &HashSet<String>,
    target: &Target,
    variety: Variety,
    rng: &mut impl Rng,
) -> Vec<usize> {
    if films.is_empty() {
        return Vec::new();
    }

    let mut cands = filters.candidates(films, banished);
    // Unbiased Fisher-Yates; correctness requirement, not style.
    cands.shuffle(rng);

    let mut band = target.initial_band(variety);
    let mut remaining = cands.clone();
    let mut deck = Vec::with_capacity(DECK_MAX.min(remaining.len()));

    for _ in 0..DECK_MAX.min(cands.len()) {
        if remaining.is_empty() {
            break;
        }
        let pos = roulette_draw(films, &remaining, target, band, rng);
        deck.push(remaining.remove(pos));
        band = target.narrow_band(band, variety);
    }

    if deck.is_empty() { cands } else { deck }
}

/// Cumulative-weight roulette over the remaining candidates: one uniform
/// value scaled to the weight total, subtracting weights in array order.
/// A degenerate (zero/negative/non-finite) total falls back to a uniform
/// pick rather than failing.
fn roulette_draw(
    films: &[Film],
    remaining: &[usize],
    target: &Target,
    band: f64,
    rng: &mut impl Rng,
) -> usize {
    let weights: Vec<f64> = remaining
        .iter()
        .map(|&i| weight_for(&films[i], target, band))
        .collect();
    let total: f64 = weights.iter().sum();

    if !(total > 0.0) || !total.is_finite() {
        return rng.random_range(0..remaining.len());
    }

    let mut r = rng.random::<f64>() * total;
    for (pos, w) in weights.iter().enumerate() {
        r -= w;
        if r <= 0.0 {
            return pos;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::film::Flags;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn catalog(chaos_values: &[Option<f64>]) -> Vec<Film> {
        chaos_values
            .iter()
            .enumerate()
            .map(|(i, &chaos)| Film {
                title: format!("film-{i}"),
                chaos,
                ..Film::default()
            })
            .collect()
    }

    #[test]
    fn test_deck_nonempty_for_nonempty_catalog() {
        let films = catalog(&[Some(10.0)]);
        let deck = build_deck(
            &films,
            &Filters::default(),
            &HashSet::new(),
            &Target::Chaos(85.0),
            Variety::Tight,
            &mut rng(),
        );
        assert_eq!(deck, vec![0]);
    }

    #[test]
    fn test_deck_empty_for_empty_catalog() {
        let deck = build_deck(
            &[],
            &Filters::default(),
            &HashSet::new(),
            &Target::Chaos(50.0),
            Variety::Tight,
            &mut rng(),
        );
        assert!(deck.is_empty());
    }

    #[test]
    fn test_deck_has_no_duplicates() {
        let films = catalog(&[Some(10.0), Some(30.0), Some(50.0), Some(70.0), Some(90.0), None]);
        let deck = build_deck(
            &films,
            &Filters::default(),
            &HashSet::new(),
            &Target::Chaos(50.0),
            Variety::Medium,
            &mut rng(),
        );
        let unique: HashSet<usize> = deck.iter().copied().collect();
        assert_eq!(unique.len(), deck.len());
        assert_eq!(deck.len(), films.len());
    }

    #[test]
    fn test_deck_caps_at_max() {
        let films = catalog(&vec![Some(50.0); 200]);
        let deck = build_deck(
            &films,
            &Filters::default(),
            &HashSet::new(),
            &Target::Chaos(50.0),
            Variety::Wide,
            &mut rng(),
        );
        assert_eq!(deck.len(), DECK_MAX);
    }

    #[test]
    fn test_early_draws_favor_target() {
        // Weighted sampling without replacement takes the best-matching
        // candidates first, so the head of the deck (the earliest draws)
        // should sit closer to the target than the tail on average.
        // Check across seeds to keep the assertion robust.
        let chaos: Vec<Option<f64>> = (0..100).map(|i| Some(i as f64)).collect();
        let films = catalog(&chaos);
        let mut closer = 0;
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let deck = build_deck(
                &films,
                &Filters::default(),
                &HashSet::new(),
                &Target::Chaos(85.0),
                Variety::Tight,
                &mut rng,
            );
            let head: f64 = deck[..10]
                .iter()
                .map(|&i| (films[i].chaos.unwrap() - 85.0).abs())
                .sum();
            let tail: f64 = deck[deck.len() - 10..]
                .iter()
                .map(|&i| (films[i].chaos.unwrap() - 85.0).abs())
                .sum();
            if head <= tail {
                closer += 1;
            }
        }
        assert!(closer >= 15, "head closer to target in {closer}/20 runs");
    }

    #[test]
    fn test_all_unscored_still_builds() {
        // Every weight is the fixed unscored constant; the roulette total
        // is positive and the full deck materializes.
        let films = catalog(&[None, None, None]);
        let deck = build_deck(
            &films,
            &Filters::default(),
            &HashSet::new(),
            &Target::Chaos(15.0),
            Variety::Tight,
            &mut rng(),
        );
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn test_banished_films_left_out() {
        let films = catalog(&[Some(10.0), Some(20.0), Some(30.0)]);
        let banished: HashSet<String> = [films[1].identity_key()].into();
        let deck = build_deck(
            &films,
            &Filters::default(),
            &banished,
            &Target::Chaos(20.0),
            Variety::Medium,
            &mut rng(),
        );
        assert!(!deck.contains(&1));
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_gore_flag_respected() {
        let mut films = catalog(&[Some(40.0), Some(42.0)]);
        films[0].flags = Flags::from_tokens(["gore"]);
        let filters = Filters {
            content: crate::filter::ContentFilters {
                no_gore: true,
                ..Default::default()
            },
            ..Filters::default()
        };
        let deck = build_deck(
            &films,
            &filters,
            &HashSet::new(),
            &Target::Chaos(40.0),
            Variety::Tight,
            &mut rng(),
        );
        assert_eq!(deck, vec![1]);
    }
}
