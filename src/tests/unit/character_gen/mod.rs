//! Character Generation Unit Tests
//!
//! ## Test Coverage
//!
//! ### Creation (`creation_tests`)
//! - Default grants per race, role and background
//! - Unknown identities rejected
//!
//! ### Scores (`scores_tests`)
//! - Point-buy budget, bounds and rejection without change
//! - Standard array and dice sessions
//! - Missing score tables
//!
//! ### Assignment (`assignment_tests`)
//! - Priority-driven automatic assignment, skips and strict mode
//! - Manual assignment as a bijection
//! - Racial and flexible bonuses
//!
//! ### Progression (`progression_tests`)
//! - Hit points, armor class and proficiency bonus
//! - Level-up rolls and level-table effects
//!
//! ### Persistence (`persistence_tests`)
//! - Round trips, save modes and load failures
//!
//! ### Builder (`builder_tests`)
//! - Random characters and names
//! - Error classification
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test tests::unit::character_gen
//! ```

mod creation_tests;
mod progression_tests;
mod scores_tests;
