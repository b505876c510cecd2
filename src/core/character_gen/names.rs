//! Names and fully random characters

use rand::seq::SliceRandom;
use rand::Rng;

use super::character::Character;
use super::{assignment, derivation};
use super::{CharacterGenError, GenerationConfig, Result};
use crate::core::dice::roll_ability_scores;
use crate::core::rules::RuleSet;

/// Pick a name for `race`.
///
/// Uses the race's own pool; a race without one draws from the combined
/// pools of its major races, and failing that from the common pool.
pub fn random_name<R: Rng + ?Sized>(rules: &RuleSet, race: &str, rng: &mut R) -> Result<String> {
    let pools = rules.names();
    if let Some(name) = pools.for_race(race).and_then(|pool| pool.choose(rng)) {
        return Ok(name.clone());
    }

    let heritage: Vec<&String> = rules
        .race(race)
        .map(|stats| {
            stats
                .major_races
                .iter()
                .filter_map(|major| pools.for_race(major))
                .flatten()
                .collect()
        })
        .unwrap_or_default();
    if let Some(name) = heritage.choose(rng) {
        return Ok((*name).clone());
    }

    pools
        .common()
        .choose(rng)
        .cloned()
        .ok_or_else(|| CharacterGenError::EmptyNamePool(race.to_string()))
}

fn pick<'a, R: Rng + ?Sized>(options: &'a [String], what: &str, rng: &mut R) -> Result<&'a str> {
    options
        .choose(rng)
        .map(String::as_str)
        .ok_or_else(|| CharacterGenError::InvalidOption(format!("no {what} to choose from")))
}

/// Roll a complete character: random race, role, background and name,
/// rolled scores assigned by role priority, racial bonuses and derived stats.
pub fn random_character<R: Rng + ?Sized>(
    rules: &RuleSet,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Character> {
    let race = pick(rules.race_names(), "races", rng)?;
    let role = pick(rules.role_names(), "roles", rng)?;
    let background = rules.background_names().choose(rng).map(String::as_str);
    let name = random_name(rules, race, rng)?;

    let mut character = Character::new(rules, &name, race, role, background)?;
    character.set_score_list(roll_ability_scores(rng, rules.attribute_count()))?;
    assignment::assign_automatic(&mut character, rules, config)?;
    assignment::apply_bonuses(&mut character, rules, config, rng)?;
    derivation::derive_stats(&mut character, rules)?;

    log::info!(
        "Rolled random character {} ({} {})",
        character.name(),
        character.race(),
        character.role()
    );
    Ok(character)
}
