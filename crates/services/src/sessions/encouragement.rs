use rand::Rng;
use rand::seq::IndexedRandom;

/// Consecutive misses before an encouragement message is shown.
pub const ENCOURAGEMENT_STREAK: u32 = 3;

/// Fixed set of supportive messages.
pub const ENCOURAGEMENTS: &[&str] = &[
    "Mistakes are how the learning sticks. Keep going!",
    "Tough stretch. Every miss lands in your review set, so none of it is wasted.",
    "Take a breath. You are closer than it feels.",
    "Even experts miss a few in a row. Next one!",
    "Slow down and read the question once more. You've got this.",
];

/// Picks one message uniformly when `wrong_streak` has reached the threshold.
pub(crate) fn encouragement_for<R: Rng + ?Sized>(
    wrong_streak: u32,
    rng: &mut R,
) -> Option<&'static str> {
    if wrong_streak < ENCOURAGEMENT_STREAK {
        return None;
    }
    ENCOURAGEMENTS.choose(rng).copied()
}
