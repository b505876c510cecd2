//! Typed rule-table schema
//!
//! The JSON rule files key per-attribute numbers by concatenated names
//! (`DexterityBonus`, `StrengthPriority`). Those keys are folded into
//! per-attribute maps while deserializing, so nothing downstream builds
//! string keys at lookup time.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suffix on race keys carrying an attribute bonus
pub const BONUS_SUFFIX: &str = "Bonus";
/// Suffix on role keys carrying an attribute priority index
pub const PRIORITY_SUFFIX: &str = "Priority";
/// Suffix on name-pool keys
pub const NAMES_SUFFIX: &str = "_names";
/// Prefix of the fallback name pool
pub const COMMON_POOL: &str = "Common";

/// Proficiency type -> granted proficiencies
pub type ProficiencyMap = IndexMap<String, Vec<String>>;

// ============================================================================
// Catalog
// ============================================================================

/// Contents of the catalog file: the names everything else is keyed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "Attributes")]
    pub attributes: Vec<String>,
    #[serde(rename = "Races")]
    pub races: Vec<String>,
    #[serde(rename = "Roles")]
    pub roles: Vec<String>,
    #[serde(rename = "Backgrounds")]
    pub backgrounds: Vec<String>,
    /// Skill -> the attribute it draws its modifier from, in sheet order
    #[serde(rename = "Skills")]
    pub skills: IndexMap<String, String>,
    #[serde(rename = "Proficiency Types", default)]
    pub proficiency_types: Vec<String>,
}

impl Catalog {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

// ============================================================================
// Lineage (race) stats
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRaceStats")]
pub struct RaceStats {
    pub size: String,
    pub speed: u32,
    /// Attribute -> bonus; may be zero or negative
    pub bonuses: IndexMap<String, i32>,
    pub languages: Vec<String>,
    pub proficiencies: ProficiencyMap,
    pub special_rules: Vec<String>,
    /// Parent lineages whose name pools this race borrows from
    pub major_races: Vec<String>,
    pub description: String,
    /// Extra +1 picks on random attributes (mixed heritage)
    pub flexible_bonuses: u32,
}

impl RaceStats {
    pub fn bonus(&self, attribute: &str) -> Option<i32> {
        self.bonuses.get(attribute).copied()
    }
}

#[derive(Deserialize)]
struct RawRaceStats {
    #[serde(rename = "Size")]
    size: String,
    #[serde(rename = "Speed")]
    speed: u32,
    #[serde(rename = "Languages", default)]
    languages: Vec<String>,
    #[serde(rename = "Proficiencies", default)]
    proficiencies: ProficiencyMap,
    #[serde(rename = "Special Rules", default)]
    special_rules: Vec<String>,
    #[serde(rename = "majorRace", default)]
    major_races: Vec<String>,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Flexible Bonuses", default)]
    flexible_bonuses: u32,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

impl TryFrom<RawRaceStats> for RaceStats {
    type Error = String;

    fn try_from(raw: RawRaceStats) -> Result<Self, Self::Error> {
        let bonuses = fold_suffixed(&raw.rest, BONUS_SUFFIX, |key, value| {
            value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| format!("{key} must be an integer, got {value}"))
        })?;

        Ok(Self {
            size: raw.size,
            speed: raw.speed,
            bonuses,
            languages: raw.languages,
            proficiencies: raw.proficiencies,
            special_rules: raw.special_rules,
            major_races: raw.major_races,
            description: raw.description,
            flexible_bonuses: raw.flexible_bonuses,
        })
    }
}

// ============================================================================
// Role (class) stats
// ============================================================================

/// One row of a role's level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    #[serde(rename = "Proficiency Bonus")]
    pub proficiency_bonus: i32,
    #[serde(rename = "Special Rules", default)]
    pub special_rules: Vec<String>,
    /// Abilities text; replaces the previous level's on level-up
    #[serde(rename = "Other", default)]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRoleStats")]
pub struct RoleStats {
    /// Dice notation, e.g. "d10"
    pub hit_die: String,
    pub hitpoints_base: i32,
    /// Attribute -> rank in the descending score list (0 = highest)
    pub priorities: IndexMap<String, usize>,
    pub levels: BTreeMap<u32, LevelEntry>,
    pub equipment: Vec<String>,
    pub proficiencies: ProficiencyMap,
}

impl RoleStats {
    pub fn priority(&self, attribute: &str) -> Option<usize> {
        self.priorities.get(attribute).copied()
    }

    pub fn level(&self, level: u32) -> Option<&LevelEntry> {
        self.levels.get(&level)
    }

    pub fn max_level(&self) -> Option<u32> {
        self.levels.keys().next_back().copied()
    }
}

#[derive(Deserialize)]
struct RawRoleStats {
    #[serde(rename = "Hit Die")]
    hit_die: String,
    #[serde(rename = "HitpointsBase")]
    hitpoints_base: i32,
    /// Keyed by level number as a string
    #[serde(rename = "Levels")]
    levels: BTreeMap<String, LevelEntry>,
    #[serde(rename = "Equipment", default)]
    equipment: Vec<String>,
    #[serde(rename = "Proficiencies", default)]
    proficiencies: ProficiencyMap,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

impl TryFrom<RawRoleStats> for RoleStats {
    type Error = String;

    fn try_from(raw: RawRoleStats) -> Result<Self, Self::Error> {
        let priorities = fold_suffixed(&raw.rest, PRIORITY_SUFFIX, |key, value| {
            value
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| format!("{key} must be a non-negative integer, got {value}"))
        })?;

        let levels = raw
            .levels
            .into_iter()
            .map(|(key, entry)| {
                key.trim()
                    .parse::<u32>()
                    .map(|level| (level, entry))
                    .map_err(|_| format!("level key {key:?} is not a level number"))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            hit_die: raw.hit_die,
            hitpoints_base: raw.hitpoints_base,
            priorities,
            levels,
            equipment: raw.equipment,
            proficiencies: raw.proficiencies,
        })
    }
}

// ============================================================================
// Background stats
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundStats {
    #[serde(rename = "Proficiencies", default)]
    pub proficiencies: ProficiencyMap,
    #[serde(rename = "Languages", default)]
    pub languages: Vec<String>,
    #[serde(rename = "Equipment", default)]
    pub equipment: Vec<String>,
    /// One-line feature text
    #[serde(rename = "Feature", default)]
    pub feature: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

// ============================================================================
// Point buy
// ============================================================================

/// Score -> point cost, plus the total budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointBuyTable {
    costs: BTreeMap<i32, u32>,
    budget: u32,
}

impl PointBuyTable {
    /// `None` when the cost table is empty
    pub fn new(costs: BTreeMap<i32, u32>, budget: u32) -> Option<Self> {
        if costs.is_empty() {
            return None;
        }
        Some(Self { costs, budget })
    }

    pub fn cost(&self, score: i32) -> Option<u32> {
        self.costs.get(&score).copied()
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn min_score(&self) -> i32 {
        self.costs.keys().next().copied().unwrap_or_default()
    }

    pub fn max_score(&self) -> i32 {
        self.costs.keys().next_back().copied().unwrap_or_default()
    }

    pub fn costs(&self) -> &BTreeMap<i32, u32> {
        &self.costs
    }
}

// ============================================================================
// Name pools
// ============================================================================

/// Candidate names per race plus a common fallback pool
#[derive(Debug, Clone, Default)]
pub struct NamePools {
    by_race: IndexMap<String, Vec<String>>,
    common: Vec<String>,
}

impl NamePools {
    /// Build from the `<Race>_names` keyed object of the names file.
    /// Keys without the suffix are ignored.
    pub fn from_entries(entries: IndexMap<String, Vec<String>>) -> Self {
        let mut pools = Self::default();
        for (key, names) in entries {
            let Some(prefix) = strip_suffix_ignore_case(&key, NAMES_SUFFIX) else {
                log::debug!("Ignoring name pool key without {NAMES_SUFFIX} suffix: {key}");
                continue;
            };
            if prefix.eq_ignore_ascii_case(COMMON_POOL) {
                pools.common.extend(names);
            } else {
                pools.by_race.insert(prefix.to_string(), names);
            }
        }
        pools
    }

    pub fn for_race(&self, race: &str) -> Option<&[String]> {
        self.by_race.get(race).map(Vec::as_slice)
    }

    pub fn common(&self) -> &[String] {
        &self.common
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Collect `<Attribute><suffix>` keys into an attribute-keyed map.
fn fold_suffixed<T>(
    rest: &BTreeMap<String, Value>,
    suffix: &str,
    convert: impl Fn(&str, &Value) -> Result<T, String>,
) -> Result<IndexMap<String, T>, String> {
    let mut folded = IndexMap::new();
    for (key, value) in rest {
        match key.strip_suffix(suffix) {
            Some(attribute) if !attribute.is_empty() => {
                folded.insert(attribute.to_string(), convert(key, value)?);
            }
            _ => log::debug!("Ignoring unrecognised rule key: {key}"),
        }
    }
    Ok(folded)
}

fn strip_suffix_ignore_case<'a>(key: &'a str, suffix: &str) -> Option<&'a str> {
    let split = key.len().checked_sub(suffix.len())?;
    if !key.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = key.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
