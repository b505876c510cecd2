//! Character Entity
//!
//! A single character sheet. The attribute map always holds exactly the
//! catalog's attributes, and every score change recomputes the modifier map,
//! the skill map and armor class before returning, so derived values can never
//! be observed stale.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::derivation::ability_modifier;
use super::{CharacterGenError, Result};
use crate::core::rules::schema::ProficiencyMap;
use crate::core::rules::RuleSet;

/// Attribute whose modifier feeds armor class
pub const DEXTERITY: &str = "Dexterity";

/// Attribute whose modifier feeds hit points
pub const CONSTITUTION: &str = "Constitution";

/// Base armor class before the Dexterity modifier
pub const BASE_ARMOR_CLASS: i32 = 10;

// ============================================================================
// Special Rules
// ============================================================================

/// Narrative rules grouped into named buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialRules(BTreeMap<String, Vec<String>>);

impl SpecialRules {
    pub const RACE_RULES: &'static str = "Race Rules";
    pub const ROLE_RULES: &'static str = "Role Rules";
    pub const ROLE_ABILITIES: &'static str = "Role Abilities";
    pub const BACKGROUND_FEATURE: &'static str = "Background Feature";
    pub const OTHER: &'static str = "Other";

    pub fn new() -> Self {
        let mut rules = Self::default();
        rules.0.insert(Self::OTHER.to_string(), Vec::new());
        rules
    }

    pub fn get(&self, bucket: &str) -> &[String] {
        self.0.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append to a bucket, creating it if needed
    pub fn extend<I>(&mut self, bucket: &str, rules: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.0.entry(bucket.to_string()).or_default().extend(rules);
    }

    pub fn replace(&mut self, bucket: &str, rules: Vec<String>) {
        self.0.insert(bucket.to_string(), rules);
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

// ============================================================================
// Character
// ============================================================================

#[derive(Debug, Clone)]
pub struct Character {
    name: String,
    race: String,
    role: String,
    background: Option<String>,

    score_list: Vec<i32>,
    unassigned: Vec<String>,

    attributes: IndexMap<String, i32>,
    modifiers: IndexMap<String, i32>,
    skills: IndexMap<String, i32>,
    skill_sources: IndexMap<String, String>,

    hit_points: i32,
    armor_class: i32,
    level: u32,
    experience: u32,
    proficiency_bonus: i32,

    size: String,
    speed: u32,
    hit_die: String,

    languages: Vec<String>,
    equipment: Vec<String>,
    proficiencies: ProficiencyMap,
    special_rules: SpecialRules,
}

impl Character {
    /// Build a level-1 character with every attribute at zero and the
    /// default race, role and background grants applied.
    pub fn new(
        rules: &RuleSet,
        name: &str,
        race: &str,
        role: &str,
        background: Option<&str>,
    ) -> Result<Self> {
        let race_stats = rules
            .race(race)
            .ok_or_else(|| CharacterGenError::UnknownRace(race.to_string()))?;
        let role_stats = rules
            .role(role)
            .ok_or_else(|| CharacterGenError::UnknownRole(role.to_string()))?;
        let background_stats = match background {
            Some(bg) => Some(
                rules
                    .background(bg)
                    .ok_or_else(|| CharacterGenError::UnknownBackground(bg.to_string()))?,
            ),
            None => None,
        };
        let first_level = role_stats
            .level(1)
            .ok_or_else(|| CharacterGenError::MissingLevel {
                role: role.to_string(),
                level: 1,
            })?;

        let mut proficiencies: ProficiencyMap = rules
            .proficiency_types()
            .iter()
            .map(|kind| (kind.clone(), Vec::new()))
            .collect();
        let mut grants = vec![&race_stats.proficiencies, &role_stats.proficiencies];
        if let Some(bg) = background_stats {
            grants.push(&bg.proficiencies);
        }
        for grant in grants {
            for (kind, items) in grant {
                merge_unique(proficiencies.entry(kind.clone()).or_default(), items);
            }
        }

        let mut languages = Vec::new();
        merge_unique(&mut languages, &race_stats.languages);

        let mut equipment = role_stats.equipment.clone();

        let mut special_rules = SpecialRules::new();
        special_rules.replace(SpecialRules::RACE_RULES, race_stats.special_rules.clone());
        special_rules.replace(SpecialRules::ROLE_RULES, first_level.special_rules.clone());
        special_rules.replace(SpecialRules::ROLE_ABILITIES, first_level.other.clone());

        if let Some(bg) = background_stats {
            merge_unique(&mut languages, &bg.languages);
            equipment.extend(bg.equipment.iter().cloned());
            if !bg.feature.is_empty() {
                special_rules.replace(SpecialRules::BACKGROUND_FEATURE, vec![bg.feature.clone()]);
            }
        }

        let attributes: IndexMap<String, i32> =
            rules.attributes().iter().map(|a| (a.clone(), 0)).collect();

        let mut character = Self {
            name: name.to_string(),
            race: race.to_string(),
            role: role.to_string(),
            background: background.map(str::to_string),
            score_list: Vec::new(),
            unassigned: rules.attributes().to_vec(),
            attributes,
            modifiers: IndexMap::new(),
            skills: IndexMap::new(),
            skill_sources: rules.skills().clone(),
            hit_points: 0,
            armor_class: BASE_ARMOR_CLASS,
            level: 1,
            experience: 0,
            proficiency_bonus: first_level.proficiency_bonus,
            size: race_stats.size.clone(),
            speed: race_stats.speed,
            hit_die: role_stats.hit_die.clone(),
            languages,
            equipment,
            proficiencies,
            special_rules,
        };
        character.refresh_derived();

        log::debug!(
            "Created {} the {} {} ({})",
            character.name,
            character.race,
            character.role,
            character.background.as_deref().unwrap_or("no background")
        );
        Ok(character)
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn race(&self) -> &str {
        &self.race
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    // ------------------------------------------------------------------------
    // Scores
    // ------------------------------------------------------------------------

    pub fn attributes(&self) -> &IndexMap<String, i32> {
        &self.attributes
    }

    pub fn attribute(&self, attribute: &str) -> Option<i32> {
        self.attributes.get(attribute).copied()
    }

    /// Set one score. The attribute must already exist on the sheet.
    pub fn set_attribute(&mut self, attribute: &str, value: i32) -> Result<()> {
        let slot = self
            .attributes
            .get_mut(attribute)
            .ok_or_else(|| CharacterGenError::InvalidAttribute(attribute.to_string()))?;
        *slot = value;
        self.refresh_derived();
        Ok(())
    }

    /// Overwrite several scores at once. Unknown names are rejected before
    /// anything changes; attributes not mentioned keep their value.
    pub fn set_attributes<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, i32)>,
    {
        let values: Vec<(&str, i32)> = values.into_iter().collect();
        if let Some((unknown, _)) = values.iter().find(|(a, _)| !self.attributes.contains_key(*a)) {
            return Err(CharacterGenError::InvalidAttribute(unknown.to_string()));
        }
        for (attribute, value) in values {
            if let Some(slot) = self.attributes.get_mut(attribute) {
                *slot = value;
            }
        }
        self.refresh_derived();
        Ok(())
    }

    pub fn modifiers(&self) -> &IndexMap<String, i32> {
        &self.modifiers
    }

    pub fn modifier(&self, attribute: &str) -> Option<i32> {
        self.modifiers.get(attribute).copied()
    }

    pub fn skills(&self) -> &IndexMap<String, i32> {
        &self.skills
    }

    pub fn skill(&self, skill: &str) -> Option<i32> {
        self.skills.get(skill).copied()
    }

    /// Remaining candidate scores, highest first
    pub fn score_list(&self) -> &[i32] {
        &self.score_list
    }

    /// Load a fresh score pool. Every attribute becomes unassigned again.
    pub fn set_score_list(&mut self, mut scores: Vec<i32>) -> Result<()> {
        if scores.len() != self.attributes.len() {
            return Err(CharacterGenError::ScoreListLength {
                expected: self.attributes.len(),
                got: scores.len(),
            });
        }
        scores.sort_unstable_by(|a, b| b.cmp(a));
        self.score_list = scores;
        self.unassigned = self.attributes.keys().cloned().collect();
        Ok(())
    }

    /// Attributes still waiting for a manual pick
    pub fn unassigned_attributes(&self) -> &[String] {
        &self.unassigned
    }

    pub fn is_assigned(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute) && !self.unassigned.iter().any(|a| a == attribute)
    }

    pub(crate) fn take_score(&mut self, value: i32) -> bool {
        match self.score_list.iter().position(|&s| s == value) {
            Some(pos) => {
                self.score_list.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_assigned(&mut self, attribute: &str) {
        self.unassigned.retain(|a| a != attribute);
    }

    pub(crate) fn mark_all_assigned(&mut self) {
        self.unassigned.clear();
    }

    /// Recompute modifiers, skills and armor class from the current scores.
    pub fn refresh_derived(&mut self) {
        self.modifiers = self
            .attributes
            .iter()
            .map(|(attribute, &score)| (attribute.clone(), ability_modifier(score)))
            .collect();

        let modifiers = &self.modifiers;
        self.skills = self
            .skill_sources
            .iter()
            .filter_map(|(skill, attribute)| {
                modifiers.get(attribute).map(|&m| (skill.clone(), m))
            })
            .collect();

        self.armor_class = BASE_ARMOR_CLASS + self.modifier(DEXTERITY).unwrap_or(0);
    }

    // ------------------------------------------------------------------------
    // Vital statistics
    // ------------------------------------------------------------------------

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn set_hit_points(&mut self, hit_points: i32) {
        self.hit_points = hit_points;
    }

    pub fn armor_class(&self) -> i32 {
        self.armor_class
    }

    /// Override armor class. It is recomputed from Dexterity the next time
    /// derived values refresh, which every score change triggers.
    pub fn set_armor_class(&mut self, armor_class: i32) {
        self.armor_class = armor_class;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn set_experience(&mut self, experience: u32) {
        self.experience = experience;
    }

    pub fn add_experience(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(amount);
    }

    pub fn proficiency_bonus(&self) -> i32 {
        self.proficiency_bonus
    }

    pub fn set_proficiency_bonus(&mut self, bonus: i32) {
        self.proficiency_bonus = bonus;
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn set_size(&mut self, size: impl Into<String>) {
        self.size = size.into();
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed;
    }

    pub fn hit_die(&self) -> &str {
        &self.hit_die
    }

    // ------------------------------------------------------------------------
    // Grants
    // ------------------------------------------------------------------------

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.languages = languages;
    }

    pub fn add_languages<I: IntoIterator<Item = String>>(&mut self, languages: I) {
        self.languages.extend(languages);
    }

    pub fn equipment(&self) -> &[String] {
        &self.equipment
    }

    pub fn set_equipment(&mut self, equipment: Vec<String>) {
        self.equipment = equipment;
    }

    pub fn add_equipment<I: IntoIterator<Item = String>>(&mut self, items: I) {
        self.equipment.extend(items);
    }

    pub fn proficiencies(&self) -> &ProficiencyMap {
        &self.proficiencies
    }

    pub fn set_proficiencies(&mut self, proficiencies: ProficiencyMap) {
        self.proficiencies = proficiencies;
    }

    /// Append to a proficiency category, creating it if needed
    pub fn add_proficiencies<I: IntoIterator<Item = String>>(&mut self, kind: &str, items: I) {
        self.proficiencies
            .entry(kind.to_string())
            .or_default()
            .extend(items);
    }

    pub fn special_rules(&self) -> &SpecialRules {
        &self.special_rules
    }

    pub fn special_rules_mut(&mut self) -> &mut SpecialRules {
        &mut self.special_rules
    }

    pub fn set_special_rules(&mut self, rules: SpecialRules) {
        self.special_rules = rules;
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Race: {}", self.race)?;
        writeln!(f, "Class: {}", self.role)?;
        writeln!(f, "Background: {}", self.background.as_deref().unwrap_or("None"))?;
        writeln!(f, "Level: {}", self.level)?;
        for (attribute, score) in &self.attributes {
            let modifier = self.modifiers.get(attribute).copied().unwrap_or(0);
            writeln!(f, "{attribute}: {score} ({modifier:+})")?;
        }
        writeln!(f, "Armor Class: {}", self.armor_class)?;
        write!(f, "Hitpoints: {}", self.hit_points)
    }
}

fn merge_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
