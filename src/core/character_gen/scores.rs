//! Score Generator
//!
//! Produces the candidate score list that assignment draws from. Three
//! methods: dice rolling with a reroll budget, the rule table's standard
//! array, and point buy against the cost table.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{CharacterGenError, Result};
use crate::core::dice::roll_ability_scores;
use crate::core::rules::schema::PointBuyTable;
use crate::core::rules::RuleSet;

/// How a score list should be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreMethod {
    /// 4d6 drop lowest for each attribute
    Roll,
    /// The rule table's fixed list
    Standard,
    /// Point buy with the given per-slot targets
    PointBuy(Vec<i32>),
}

/// Produce a descending score list in one call.
pub fn generate_scores<R: Rng + ?Sized>(
    rules: &RuleSet,
    method: &ScoreMethod,
    rng: &mut R,
) -> Result<Vec<i32>> {
    let mut scores = match method {
        ScoreMethod::Roll => roll_ability_scores(rng, rules.attribute_count()),
        ScoreMethod::Standard => standard_array(rules)?,
        ScoreMethod::PointBuy(targets) => {
            let mut session = PointBuy::from_rules(rules)?;
            if targets.len() != session.slots() {
                return Err(CharacterGenError::ScoreListLength {
                    expected: session.slots(),
                    got: targets.len(),
                });
            }
            for (slot, &score) in targets.iter().enumerate() {
                session.set_score(slot, score)?;
            }
            session.finish()
        }
    };
    scores.sort_unstable_by(|a, b| b.cmp(a));
    log::debug!("Generated scores {scores:?} via {method:?}");
    Ok(scores)
}

/// The fixed standard array from the stats file, highest first.
pub fn standard_array(rules: &RuleSet) -> Result<Vec<i32>> {
    let mut scores = rules
        .standard_array()
        .ok_or(CharacterGenError::StandardArrayUnavailable)?
        .to_vec();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    Ok(scores)
}

// ============================================================================
// Dice Rolling
// ============================================================================

/// A rolled score list with a limited number of rerolls.
#[derive(Debug, Clone)]
pub struct DiceRollSession {
    scores: Vec<i32>,
    slots: usize,
    rerolls_left: u32,
}

impl DiceRollSession {
    /// Roll `slots` scores immediately.
    pub fn new<R: Rng + ?Sized>(slots: usize, rerolls: u32, rng: &mut R) -> Self {
        Self {
            scores: roll_ability_scores(rng, slots),
            slots,
            rerolls_left: rerolls,
        }
    }

    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    pub fn rerolls_remaining(&self) -> u32 {
        self.rerolls_left
    }

    /// Discard the current list and roll a new one. Once the budget is spent
    /// the current list stays.
    pub fn reroll<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&[i32]> {
        if self.rerolls_left == 0 {
            return Err(CharacterGenError::RerollsExhausted);
        }
        self.rerolls_left -= 1;
        self.scores = roll_ability_scores(rng, self.slots);
        Ok(&self.scores)
    }

    pub fn finish(self) -> Vec<i32> {
        self.scores
    }
}

// ============================================================================
// Point Buy
// ============================================================================

/// Interactive point-buy state: one score per slot and the points left.
///
/// Every edit is checked before it is applied; a rejected edit leaves the
/// session as it was.
#[derive(Debug, Clone)]
pub struct PointBuy {
    table: PointBuyTable,
    scores: Vec<i32>,
    remaining: u32,
}

impl PointBuy {
    /// All slots start at the table's cheapest score with the full budget
    /// unspent. Only cost differences are charged from there.
    pub fn new(table: PointBuyTable, slots: usize) -> Self {
        Self {
            remaining: table.budget(),
            scores: vec![table.min_score(); slots],
            table,
        }
    }

    pub fn from_rules(rules: &RuleSet) -> Result<Self> {
        let table = rules
            .point_buy()
            .ok_or(CharacterGenError::PointBuyUnavailable)?;
        Ok(Self::new(table.clone(), rules.attribute_count()))
    }

    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    pub fn slots(&self) -> usize {
        self.scores.len()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn table(&self) -> &PointBuyTable {
        &self.table
    }

    /// Change one slot to `score`, paying or refunding the cost difference.
    /// Returns the points left.
    pub fn set_score(&mut self, slot: usize, score: i32) -> Result<u32> {
        let current = *self
            .scores
            .get(slot)
            .ok_or(CharacterGenError::SlotOutOfRange {
                slot,
                len: self.scores.len(),
            })?;

        let out_of_range = CharacterGenError::ScoreOutOfRange {
            score,
            min: self.table.min_score(),
            max: self.table.max_score(),
        };
        if score < self.table.min_score() || score > self.table.max_score() {
            return Err(out_of_range);
        }
        let new_cost = self.table.cost(score).ok_or(out_of_range)?;
        let old_cost = self.table.cost(current).unwrap_or(0);

        let remaining = if new_cost >= old_cost {
            let needed = new_cost - old_cost;
            if needed > self.remaining {
                return Err(CharacterGenError::InsufficientPoints {
                    needed,
                    available: self.remaining,
                });
            }
            self.remaining - needed
        } else {
            self.remaining + (old_cost - new_cost)
        };

        self.scores[slot] = score;
        self.remaining = remaining;
        Ok(remaining)
    }

    pub fn raise(&mut self, slot: usize) -> Result<u32> {
        let current = self.current(slot)?;
        self.set_score(slot, current + 1)
    }

    pub fn lower(&mut self, slot: usize) -> Result<u32> {
        let current = self.current(slot)?;
        self.set_score(slot, current - 1)
    }

    /// The per-slot list; unspent points are forfeited.
    pub fn finish(self) -> Vec<i32> {
        self.scores
    }

    fn current(&self, slot: usize) -> Result<i32> {
        self.scores
            .get(slot)
            .copied()
            .ok_or(CharacterGenError::SlotOutOfRange {
                slot,
                len: self.scores.len(),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
