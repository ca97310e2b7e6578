//! Random stat generation.
//!
//! Draws a type from a fixed eight-entry pool, hit points from `[50, 149]`
//! and both damage texts from `[10, 39]` and `[30, 79]`. Names, artwork and
//! move descriptions are never touched.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::{CardDescription, ElementType};

/// The types the randomizer draws from.
pub const RANDOM_TYPES: [ElementType; 8] = [
    ElementType::Fire,
    ElementType::Water,
    ElementType::Grass,
    ElementType::Electric,
    ElementType::Psychic,
    ElementType::Fighting,
    ElementType::Dark,
    ElementType::Steel,
];

/// Produce a copy of `card` with freshly drawn stats.
pub fn randomize<R: Rng + ?Sized>(card: &CardDescription, rng: &mut R) -> CardDescription {
    let mut next = card.clone();
    let element = RANDOM_TYPES
        .choose(rng)
        .copied()
        .unwrap_or(ElementType::Normal);
    next.element_type = element.as_str().to_string();
    next.hit_points = rng.gen_range(50..150);
    next.move_one.damage = rng.gen_range(10..40).to_string();
    next.move_two.damage = rng.gen_range(30..80).to_string();
    next
}

/// [`randomize`] using the thread-local generator.
pub fn randomize_thread(card: &CardDescription) -> CardDescription {
    randomize(card, &mut rand::thread_rng())
}
