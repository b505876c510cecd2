//! Property-based tests for the Dice Engine

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::dice::{roll_ability_scores, roll_dice, DiceNotation, DiceRoller};

proptest! {
    /// Property: a sum of `count` dice lies in `[count, count * sides]`
    #[test]
    fn prop_roll_dice_in_range(seed in any::<u64>(), sides in 1u32..=100, count in 1u32..=20) {
        let mut rng = StdRng::seed_from_u64(seed);
        let total = roll_dice(&mut rng, sides, count);
        prop_assert!(total >= count as i32);
        prop_assert!(total <= (count * sides) as i32);
    }

    /// Property: ability scores are bounded and come back sorted descending
    #[test]
    fn prop_ability_scores_sorted_and_bounded(seed in any::<u64>(), n in 0usize..=12) {
        let mut rng = StdRng::seed_from_u64(seed);
        let scores = roll_ability_scores(&mut rng, n);

        prop_assert_eq!(scores.len(), n);
        prop_assert!(scores.iter().all(|s| (3..=18).contains(s)));
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Property: display output parses back to the same notation
    #[test]
    fn prop_notation_display_reparses(count in 1u32..=100, sides in 1u32..=1000, modifier in -50i32..=50) {
        let notation = DiceNotation::new(count, sides, modifier).unwrap();
        let reparsed = DiceNotation::parse(&notation.to_string()).unwrap();
        prop_assert_eq!(reparsed, notation);
    }

    /// Property: a roll's total stays within the notation's bounds
    #[test]
    fn prop_roll_within_notation_bounds(seed in any::<u64>(), count in 1u32..=10, sides in 1u32..=20, modifier in -5i32..=5) {
        let notation = DiceNotation::new(count, sides, modifier).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let result = DiceRoller::new().roll_with_rng(&notation, &mut rng);

        prop_assert_eq!(result.rolls.len(), count as usize);
        prop_assert!(result.total >= notation.min_result());
        prop_assert!(result.total <= notation.max_result());
    }
}
