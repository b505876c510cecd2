//! Test Fixtures
//!
//! Provides shared helpers for building rule tables, builders and characters
//! at known points in the pipeline.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use crate::core::character_gen::{Character, CharacterBuilder, GenerationConfig};
use crate::core::rules::RuleSet;

/// Scores used wherever a test needs a known pool
pub const STANDARD_POOL: [i32; 6] = [15, 14, 13, 12, 10, 8];

// =============================================================================
// Rule Fixtures
// =============================================================================

/// The bundled rule tables.
pub fn test_rules() -> Arc<RuleSet> {
    Arc::new(RuleSet::bundled().expect("bundled rule tables should load"))
}

const CATALOG_JSON: &str = include_str!("../../../data/rpgData.json");
const STATS_JSON: &str = include_str!("../../../data/statsData.json");
const NAMES_JSON: &str = include_str!("../../../data/namesData.json");

/// The bundled tables with edits applied to the parsed catalog, stats and
/// names documents before validation.
pub fn edited_rules(
    edit: impl FnOnce(&mut serde_json::Value, &mut serde_json::Value, &mut serde_json::Value),
) -> Arc<RuleSet> {
    let mut catalog: serde_json::Value = serde_json::from_str(CATALOG_JSON).expect("catalog json");
    let mut stats: serde_json::Value = serde_json::from_str(STATS_JSON).expect("stats json");
    let mut names: serde_json::Value = serde_json::from_str(NAMES_JSON).expect("names json");
    edit(&mut catalog, &mut stats, &mut names);
    let rules = RuleSet::from_json_strs(&catalog.to_string(), &stats.to_string(), &names.to_string())
        .expect("edited rule tables should load");
    Arc::new(rules)
}

/// A builder over the bundled tables with default policy.
pub fn test_builder() -> CharacterBuilder {
    CharacterBuilder::new(test_rules(), GenerationConfig::default())
}

/// A builder with a custom policy.
pub fn builder_with(config: GenerationConfig) -> CharacterBuilder {
    CharacterBuilder::new(test_rules(), config)
}

/// Deterministic random source.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Scratch directory that is removed when dropped.
pub fn scratch_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

// =============================================================================
// Character Fixtures
// =============================================================================

/// A fresh character with the standard pool loaded but nothing assigned.
pub fn pooled_character(builder: &CharacterBuilder, race: &str, role: &str) -> Character {
    let mut character = builder
        .create_character("Test Hero", race, role, Some("Soldier"))
        .expect("fixture character should build");
    character
        .set_score_list(STANDARD_POOL.to_vec())
        .expect("standard pool matches attribute count");
    character
}

/// A character taken through automatic assignment, bonuses and derivation.
pub fn finished_character(builder: &CharacterBuilder, race: &str, role: &str, seed: u64) -> Character {
    let mut rng = seeded_rng(seed);
    let mut character = pooled_character(builder, race, role);
    builder.assign_automatic(&mut character).expect("auto assignment");
    builder.apply_bonuses(&mut character, &mut rng).expect("bonuses");
    builder.derive_stats(&mut character).expect("derived stats");
    character
}
