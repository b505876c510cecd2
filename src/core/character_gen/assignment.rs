//! Assignment Engine
//!
//! Moves a character's score pool onto its attributes, either by the role's
//! priority table or one pick at a time, then layers racial bonuses on top.
//! Each operation validates everything up front and commits in one step, so
//! a failure leaves the character exactly as it was.

use std::collections::BTreeSet;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::character::Character;
use super::{CharacterGenError, GenerationConfig, Result};
use crate::core::rules::RuleSet;

/// Outcome of an automatic assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoAssignReport {
    /// Attribute and the score it received, in catalog order
    pub assigned: Vec<(String, i32)>,
    /// Attributes whose priority pointed past the end of the score list
    pub skipped: Vec<String>,
}

/// Outcome of applying racial bonuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusReport {
    /// Fixed bonus added to each attribute
    pub racial: Vec<(String, i32)>,
    /// Attributes that received a flexible +1, in pick order
    pub flexible: Vec<String>,
}

/// Give each attribute the score at its role priority index.
///
/// The pool is indexed, not consumed. An index past the end of the pool is
/// logged and the attribute keeps its current score.
pub fn assign_automatic(
    character: &mut Character,
    rules: &RuleSet,
    config: &GenerationConfig,
) -> Result<AutoAssignReport> {
    let role = rules
        .role(character.role())
        .ok_or_else(|| CharacterGenError::UnknownRole(character.role().to_string()))?;

    let expected = character.attributes().len();
    let pool = character.score_list();
    if pool.len() != expected {
        return Err(CharacterGenError::ScoreListLength {
            expected,
            got: pool.len(),
        });
    }

    if config.strict_priorities {
        let ranks: BTreeSet<usize> = role.priorities.values().copied().collect();
        let is_permutation = role.priorities.len() == expected
            && ranks.len() == expected
            && ranks.iter().all(|&rank| rank < expected);
        if !is_permutation {
            return Err(CharacterGenError::PriorityConflict {
                role: character.role().to_string(),
                count: expected,
            });
        }
    }

    let mut report = AutoAssignReport::default();
    for attribute in character.attributes().keys() {
        let rank = role
            .priority(attribute)
            .ok_or_else(|| CharacterGenError::PriorityLookup {
                role: character.role().to_string(),
                attribute: attribute.clone(),
            })?;
        match pool.get(rank) {
            Some(&score) => report.assigned.push((attribute.clone(), score)),
            None => {
                log::warn!(
                    "{} priority {} for {} is past the end of a {}-score list; skipping",
                    character.role(),
                    rank,
                    attribute,
                    pool.len()
                );
                report.skipped.push(attribute.clone());
            }
        }
    }

    character.set_attributes(report.assigned.iter().map(|(a, s)| (a.as_str(), *s)))?;
    character.mark_all_assigned();
    log::debug!("Auto-assigned {} scores for {}", report.assigned.len(), character.name());
    Ok(report)
}

/// Give one still-unassigned attribute one value from the pool.
///
/// Returns how many scores remain; assignment is complete at zero.
pub fn assign_manual(character: &mut Character, attribute: &str, value: i32) -> Result<usize> {
    if !character.attributes().contains_key(attribute) {
        return Err(CharacterGenError::InvalidAttribute(attribute.to_string()));
    }
    if character.is_assigned(attribute) {
        return Err(CharacterGenError::AttributeAlreadyAssigned(attribute.to_string()));
    }
    if !character.score_list().contains(&value) {
        return Err(CharacterGenError::ScoreUnavailable(value));
    }

    character.take_score(value);
    character.set_attribute(attribute, value)?;
    character.mark_assigned(attribute);
    Ok(character.score_list().len())
}

/// Add the race's fixed bonuses, then any flexible +1 picks.
pub fn apply_bonuses<R: Rng + ?Sized>(
    character: &mut Character,
    rules: &RuleSet,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<BonusReport> {
    let race = rules
        .race(character.race())
        .ok_or_else(|| CharacterGenError::UnknownRace(character.race().to_string()))?;

    let mut updated = character.attributes().clone();
    let mut report = BonusReport::default();
    for (attribute, score) in updated.iter_mut() {
        let bonus = race
            .bonus(attribute)
            .ok_or_else(|| CharacterGenError::BonusLookup {
                race: character.race().to_string(),
                attribute: attribute.clone(),
            })?;
        *score += bonus;
        report.racial.push((attribute.clone(), bonus));
    }

    let attributes: Vec<String> = updated.keys().cloned().collect();
    let picks = race.flexible_bonuses as usize;
    if picks > 0 && !attributes.is_empty() {
        report.flexible = if config.allow_repeat_flexible_bonus {
            (0..picks)
                .filter_map(|_| attributes.choose(rng).cloned())
                .collect()
        } else {
            if picks > attributes.len() {
                log::warn!(
                    "{} grants {} distinct flexible bonuses but only {} attributes exist",
                    character.race(),
                    picks,
                    attributes.len()
                );
            }
            index::sample(rng, attributes.len(), picks.min(attributes.len()))
                .into_iter()
                .map(|i| attributes[i].clone())
                .collect()
        };
        for attribute in &report.flexible {
            if let Some(score) = updated.get_mut(attribute) {
                *score += 1;
            }
        }
    }

    character.set_attributes(updated.iter().map(|(a, s)| (a.as_str(), *s)))?;
    if !report.flexible.is_empty() {
        log::info!("{} flexible bonus picks: {:?}", character.name(), report.flexible);
    }
    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================
