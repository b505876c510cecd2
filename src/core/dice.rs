//! Dice Engine
//!
//! Uniform dice rolls, hit-die notation and the 4d6-drop-lowest ability roll.
//!
//! Supported notation:
//! - Plain dice: d6, d8, d10, d20
//! - Compound dice: 2d6, 3d8+5, 4d6-2
//! - Percentile: d%, d100
//!
//! ## Examples
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use rpg_builder::core::dice::{DiceNotation, DiceRoller};
//!
//! let notation = DiceNotation::parse("d10").unwrap();
//! assert_eq!(notation.sides, 10);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let result = DiceRoller::new().roll_with_rng(&notation, &mut rng);
//! assert!((1..=10).contains(&result.total));
//! ```
//!
//! Nothing here keeps state between calls. Randomness comes from the caller's
//! RNG, so production code passes `rand::thread_rng()` (not reproducible) and
//! tests pass a seeded `StdRng`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while parsing dice notation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),

    #[error("Invalid dice count: must be between 1 and {max}, got {got}")]
    InvalidCount { max: u32, got: u32 },

    #[error("Invalid dice sides: must be between 1 and {max}, got {got}")]
    InvalidSides { max: u32, got: u32 },

    #[error("Empty notation")]
    EmptyNotation,
}

pub type DiceResult<T> = Result<T, DiceError>;

/// Dice drawn per ability score in the standard roll
pub const ABILITY_DICE: usize = 4;

/// Faces on each ability die
pub const ABILITY_DIE_SIDES: u32 = 6;

// ============================================================================
// Free Functions
// ============================================================================

/// Sum of `count` independent draws from `[1, sides]`.
///
/// A zero `sides` or `count` yields 0 rather than panicking.
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R, sides: u32, count: u32) -> i32 {
    if sides == 0 {
        return 0;
    }
    (0..count).map(|_| rng.gen_range(1..=sides) as i32).sum()
}

/// One ability score: four d6 with exactly one lowest die discarded.
pub fn roll_ability_score<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    let mut dice: Vec<i32> = (0..ABILITY_DICE)
        .map(|_| rng.gen_range(1..=ABILITY_DIE_SIDES) as i32)
        .collect();
    dice.sort_unstable();
    // Ties at the minimum still only drop a single die.
    dice[1..].iter().sum()
}

/// `n` ability scores, sorted descending.
pub fn roll_ability_scores<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<i32> {
    let mut scores: Vec<i32> = (0..n).map(|_| roll_ability_score(rng)).collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores
}

// ============================================================================
// Dice Notation
// ============================================================================

/// Parsed dice notation with count, sides, and modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceNotation {
    /// Number of dice to roll
    pub count: u32,
    /// Faces per die
    pub sides: u32,
    /// Flat modifier added after rolling
    pub modifier: i32,
}

impl DiceNotation {
    /// Maximum number of dice allowed in a single roll
    pub const MAX_DICE_COUNT: u32 = 100;
    /// Maximum faces per die; keeps every total within `i32`
    pub const MAX_SIDES: u32 = 1000;

    pub fn new(count: u32, sides: u32, modifier: i32) -> DiceResult<Self> {
        if count == 0 || count > Self::MAX_DICE_COUNT {
            return Err(DiceError::InvalidCount {
                max: Self::MAX_DICE_COUNT,
                got: count,
            });
        }
        if sides == 0 || sides > Self::MAX_SIDES {
            return Err(DiceError::InvalidSides {
                max: Self::MAX_SIDES,
                got: sides,
            });
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// Parse a dice notation string
    ///
    /// - "d10" -> 1d10
    /// - "2d6" -> 2d6
    /// - "3d8+5" -> 3d8+5
    /// - "d20-2" -> 1d20-2
    /// - "d%" -> 1d100
    pub fn parse(notation: &str) -> DiceResult<Self> {
        let notation = notation.trim().to_lowercase();

        if notation.is_empty() {
            return Err(DiceError::EmptyNotation);
        }

        let notation = notation.replace("d%", "d100");
        let invalid = || DiceError::InvalidNotation(notation.clone());

        let d_pos = notation.find('d').ok_or_else(invalid)?;

        let count_str = &notation[..d_pos];
        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str.parse().map_err(|_| invalid())?
        };

        let rest = &notation[d_pos + 1..];
        let (sides_str, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
            Some(pos) => {
                // Keep the sign with the modifier so "-2" parses as negative.
                let modifier_str = rest[pos..].trim_start_matches('+');
                let modifier: i32 = modifier_str.parse().map_err(|_| invalid())?;
                (&rest[..pos], modifier)
            }
            None => (rest, 0),
        };

        let sides: u32 = sides_str.parse().map_err(|_| invalid())?;

        Self::new(count, sides, modifier)
    }

    pub fn min_result(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    pub fn max_result(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.count, self.sides),
            m if m > 0 => write!(f, "{}d{}+{}", self.count, self.sides, m),
            m => write!(f, "{}d{}{}", self.count, self.sides, m),
        }
    }
}

impl std::str::FromStr for DiceNotation {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Roll Results
// ============================================================================

/// Complete result of a dice roll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResult {
    pub notation: DiceNotation,
    /// Individual die faces in roll order
    pub rolls: Vec<u32>,
    /// Sum of all dice (before modifier)
    pub subtotal: i32,
    /// Final total (after modifier)
    pub total: i32,
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rolls: Vec<String> = self.rolls.iter().map(|r| r.to_string()).collect();
        write!(f, "{}: [{}] = {}", self.notation, rolls.join(", "), self.total)
    }
}

// ============================================================================
// Dice Roller
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct DiceRoller;

impl DiceRoller {
    pub fn new() -> Self {
        Self
    }

    /// Roll using the thread-local RNG
    pub fn roll(&self, notation: &DiceNotation) -> RollResult {
        self.roll_with_rng(notation, &mut rand::thread_rng())
    }

    pub fn roll_with_rng<R: Rng + ?Sized>(&self, notation: &DiceNotation, rng: &mut R) -> RollResult {
        let rolls: Vec<u32> = (0..notation.count)
            .map(|_| rng.gen_range(1..=notation.sides))
            .collect();
        let subtotal: i32 = rolls.iter().map(|&r| r as i32).sum();

        RollResult {
            notation: notation.clone(),
            rolls,
            subtotal,
            total: subtotal + notation.modifier,
        }
    }

    /// Parse then roll with the caller's RNG
    pub fn quick_roll<R: Rng + ?Sized>(&self, notation: &str, rng: &mut R) -> DiceResult<RollResult> {
        let parsed = DiceNotation::parse(notation)?;
        Ok(self.roll_with_rng(&parsed, rng))
    }
}

// ============================================================================
// Tests
// ============================================================================
