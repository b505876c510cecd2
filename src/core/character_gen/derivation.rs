//! Derivation Engine
//!
//! Values computed from scores and the role tables: ability modifiers, skill
//! values, hit points, armor class, proficiency bonus and level progression.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::character::{Character, SpecialRules, CONSTITUTION};
use super::{CharacterGenError, Result};
use crate::core::dice::{DiceNotation, DiceRoller};
use crate::core::rules::RuleSet;

/// Standard modifier: `floor((score - 10) / 2)`, rounding toward negative
/// infinity for scores below 10.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Recompute the modifier and skill maps (and armor class) from the scores.
pub fn set_modifiers(character: &mut Character) {
    character.refresh_derived();
}

/// Armor class for a given Dexterity score.
pub fn armor_class(dexterity: i32) -> i32 {
    super::character::BASE_ARMOR_CLASS + ability_modifier(dexterity)
}

/// Starting hit points: the role's base plus the Constitution modifier.
pub fn assign_hit_points(character: &mut Character, rules: &RuleSet) -> Result<i32> {
    let constitution = character
        .attribute(CONSTITUTION)
        .ok_or_else(|| CharacterGenError::UnknownAttribute(CONSTITUTION.to_string()))?;
    let role = rules
        .role(character.role())
        .ok_or_else(|| CharacterGenError::UnknownRole(character.role().to_string()))?;

    let hit_points = role.hitpoints_base + ability_modifier(constitution);
    character.set_hit_points(hit_points);
    character.refresh_derived();
    Ok(hit_points)
}

/// Fill in every derived value for the character's current scores and level.
pub fn derive_stats(character: &mut Character, rules: &RuleSet) -> Result<()> {
    let role = rules
        .role(character.role())
        .ok_or_else(|| CharacterGenError::UnknownRole(character.role().to_string()))?;
    let entry = role
        .level(character.level())
        .ok_or_else(|| CharacterGenError::MissingLevel {
            role: character.role().to_string(),
            level: character.level(),
        })?;
    let proficiency_bonus = entry.proficiency_bonus;

    set_modifiers(character);
    assign_hit_points(character, rules)?;
    character.set_proficiency_bonus(proficiency_bonus);
    Ok(())
}

// ============================================================================
// Level Progression
// ============================================================================

/// What changed on a level-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpReport {
    pub level: u32,
    /// Face shown on the hit die
    pub hit_die_roll: i32,
    /// Hit points added (die plus Constitution modifier)
    pub hit_point_gain: i32,
    pub hit_points: i32,
    pub proficiency_bonus: i32,
    /// Role rules granted at the new level
    pub new_rules: Vec<String>,
    /// Role abilities now in effect
    pub abilities: Vec<String>,
}

/// Advance one level.
///
/// Every lookup is resolved before the character is touched, so a missing
/// level entry or bad hit die leaves it unchanged.
pub fn level_up<R: Rng + ?Sized>(
    character: &mut Character,
    rules: &RuleSet,
    rng: &mut R,
) -> Result<LevelUpReport> {
    let role_name = character.role().to_string();
    let role = rules
        .role(&role_name)
        .ok_or_else(|| CharacterGenError::UnknownRole(role_name.clone()))?;
    let next_level = character.level() + 1;
    let entry = role
        .level(next_level)
        .ok_or_else(|| CharacterGenError::MissingLevel {
            role: role_name.clone(),
            level: next_level,
        })?;
    let hit_die = DiceNotation::parse(character.hit_die()).map_err(|source| {
        CharacterGenError::InvalidHitDie {
            role: role_name.clone(),
            hit_die: character.hit_die().to_string(),
            source,
        }
    })?;
    if character.attribute(CONSTITUTION).is_none() {
        return Err(CharacterGenError::UnknownAttribute(CONSTITUTION.to_string()));
    }

    character.set_level(next_level);
    set_modifiers(character);

    let roll = DiceRoller::new().roll_with_rng(&hit_die, rng);
    let constitution_mod = character.modifier(CONSTITUTION).unwrap_or(0);
    let gain = roll.total + constitution_mod;
    character.set_hit_points(character.hit_points() + gain);

    let rules_mut = character.special_rules_mut();
    rules_mut.extend(SpecialRules::ROLE_RULES, entry.special_rules.iter().cloned());
    rules_mut.replace(SpecialRules::ROLE_ABILITIES, entry.other.clone());
    character.set_proficiency_bonus(entry.proficiency_bonus);

    log::info!(
        "{} reached level {} ({} +{} hit points from {})",
        character.name(),
        next_level,
        role_name,
        gain,
        roll
    );

    Ok(LevelUpReport {
        level: next_level,
        hit_die_roll: roll.total,
        hit_point_gain: gain,
        hit_points: character.hit_points(),
        proficiency_bonus: entry.proficiency_bonus,
        new_rules: entry.special_rules.clone(),
        abilities: entry.other.clone(),
    })
}

// ============================================================================
// Tests
// ============================================================================
