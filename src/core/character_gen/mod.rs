//! Character Generation Module
//!
//! The character-assembly pipeline:
//! - `scores`: candidate score lists (rolled, standard array, point buy)
//! - `assignment`: mapping scores onto attributes, racial bonuses
//! - `derivation`: modifiers, skills, hit points, armor class, level-up
//! - `persistence`: JSON character records
//! - `names`: name pools and fully random characters
//!
//! [`CharacterBuilder`] bundles the pipeline behind one handle holding the
//! shared rule tables. Nothing in here prints; every step returns a
//! [`Result`] and the caller decides how to present failures.

pub mod assignment;
pub mod character;
pub mod derivation;
pub mod names;
pub mod persistence;
pub mod scores;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dice::DiceError;
use crate::core::rules::{RuleSet, RulesError};

pub use assignment::{AutoAssignReport, BonusReport};
pub use character::{Character, SpecialRules};
pub use derivation::{ability_modifier, LevelUpReport};
pub use persistence::{CharacterRecord, SaveMode};
pub use scores::{DiceRollSession, PointBuy, ScoreMethod};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum CharacterGenError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    // -- lookups against loaded tables --
    #[error("Unknown race: {0}")]
    UnknownRace(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown background: {0}")]
    UnknownBackground(String),

    #[error("This character has no {0} attribute")]
    UnknownAttribute(String),

    #[error("Role {role} has no level table entry for level {level}")]
    MissingLevel { role: String, level: u32 },

    #[error("Role {role} has no {attribute} priority")]
    PriorityLookup { role: String, attribute: String },

    #[error("Race {race} has no {attribute} bonus")]
    BonusLookup { race: String, attribute: String },

    #[error("Role {role} has an unusable hit die {hit_die:?}: {source}")]
    InvalidHitDie {
        role: String,
        hit_die: String,
        #[source]
        source: DiceError,
    },

    #[error("No names available for race {0}")]
    EmptyNamePool(String),

    #[error("The rule tables define no standard array")]
    StandardArrayUnavailable,

    #[error("The rule tables define no point-buy table")]
    PointBuyUnavailable,

    // -- caller input --
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Attribute {0} has already been assigned")]
    AttributeAlreadyAssigned(String),

    #[error("Score {0} is not available in the score pool")]
    ScoreUnavailable(i32),

    #[error("Score {score} is outside the allowed range {min}..={max}")]
    ScoreOutOfRange { score: i32, min: i32, max: i32 },

    #[error("Score slot {slot} does not exist ({len} slots)")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error("Insufficient points: need {needed}, have {available}")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("No rerolls remaining")]
    RerollsExhausted,

    #[error("Expected {expected} scores, got {got}")]
    ScoreListLength { expected: usize, got: usize },

    #[error("Role {role} priorities are not a permutation of 0..{count}")]
    PriorityConflict { role: String, count: usize },

    // -- storage --
    #[error("No character record at {}", .0.display())]
    RecordNotFound(PathBuf),

    #[error("A character record already exists at {}", .0.display())]
    RecordExists(PathBuf),

    #[error("Character record {origin} is corrupt: {source}")]
    RecordCorrupt {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode character record for {name}: {source}")]
    RecordEncode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rule tables unusable; abort startup
    FatalConfig,
    /// A name the character references is absent from the tables
    Lookup,
    /// Caller input out of domain; retry with corrected input
    Validation,
    /// Record storage failed
    Io,
}

impl CharacterGenError {
    pub fn kind(&self) -> ErrorKind {
        use CharacterGenError::*;
        match self {
            Rules(_) => ErrorKind::FatalConfig,
            UnknownRace(_)
            | UnknownRole(_)
            | UnknownBackground(_)
            | UnknownAttribute(_)
            | MissingLevel { .. }
            | PriorityLookup { .. }
            | BonusLookup { .. }
            | InvalidHitDie { .. }
            | EmptyNamePool(_)
            | StandardArrayUnavailable
            | PointBuyUnavailable => ErrorKind::Lookup,
            InvalidAttribute(_)
            | InvalidOption(_)
            | AttributeAlreadyAssigned(_)
            | ScoreUnavailable(_)
            | ScoreOutOfRange { .. }
            | SlotOutOfRange { .. }
            | InsufficientPoints { .. }
            | RerollsExhausted
            | ScoreListLength { .. }
            | PriorityConflict { .. } => ErrorKind::Validation,
            RecordNotFound(_)
            | RecordExists(_)
            | RecordCorrupt { .. }
            | RecordEncode { .. }
            | Io { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, CharacterGenError>;

// ============================================================================
// Generation Policy
// ============================================================================

/// Knobs for behaviour the rule tables leave open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Rerolls allowed after the first dice roll
    pub rerolls: u32,
    /// Whether the mixed-heritage +1 picks may land on the same attribute
    pub allow_repeat_flexible_bonus: bool,
    /// Reject role priority tables that are not a permutation of the score ranks
    pub strict_priorities: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rerolls: 2,
            allow_repeat_flexible_bonus: true,
            strict_priorities: false,
        }
    }
}

// ============================================================================
// Pipeline Facade
// ============================================================================

/// Entry point for a presentation layer: one handle over the shared rule
/// tables and generation policy.
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    rules: Arc<RuleSet>,
    config: GenerationConfig,
}

impl CharacterBuilder {
    pub fn new(rules: Arc<RuleSet>, config: GenerationConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn create_character(
        &self,
        name: &str,
        race: &str,
        role: &str,
        background: Option<&str>,
    ) -> Result<Character> {
        Character::new(&self.rules, name, race, role, background)
    }

    pub fn generate_scores<R: Rng + ?Sized>(&self, method: &ScoreMethod, rng: &mut R) -> Result<Vec<i32>> {
        scores::generate_scores(&self.rules, method, rng)
    }

    pub fn roll_session<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRollSession {
        DiceRollSession::new(self.rules.attribute_count(), self.config.rerolls, rng)
    }

    pub fn point_buy(&self) -> Result<PointBuy> {
        PointBuy::from_rules(&self.rules)
    }

    pub fn assign_automatic(&self, character: &mut Character) -> Result<AutoAssignReport> {
        assignment::assign_automatic(character, &self.rules, &self.config)
    }

    /// Returns how many scores are still waiting in the pool
    pub fn assign_manual(&self, character: &mut Character, attribute: &str, value: i32) -> Result<usize> {
        assignment::assign_manual(character, attribute, value)
    }

    pub fn apply_bonuses<R: Rng + ?Sized>(&self, character: &mut Character, rng: &mut R) -> Result<BonusReport> {
        assignment::apply_bonuses(character, &self.rules, &self.config, rng)
    }

    pub fn derive_stats(&self, character: &mut Character) -> Result<()> {
        derivation::derive_stats(character, &self.rules)
    }

    pub fn level_up<R: Rng + ?Sized>(&self, character: &mut Character, rng: &mut R) -> Result<LevelUpReport> {
        derivation::level_up(character, &self.rules, rng)
    }

    pub fn save(&self, character: &Character, destination: &Path, overwrite: bool) -> Result<()> {
        let mode = if overwrite {
            SaveMode::Overwrite
        } else {
            SaveMode::CreateNew
        };
        persistence::save(character, destination, mode)
    }

    pub fn load(&self, source: &Path) -> Result<Character> {
        persistence::load(&self.rules, source)
    }

    pub fn random_name<R: Rng + ?Sized>(&self, race: &str, rng: &mut R) -> Result<String> {
        names::random_name(&self.rules, race, rng)
    }

    pub fn random_character<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Character> {
        names::random_character(&self.rules, &self.config, rng)
    }
}
