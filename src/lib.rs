/// rpg-builder - Tabletop RPG Character Builder
///
/// Core library for building characters from tabular rule data: rule
/// loading, ability scores, assignment, derived stats, level progression
/// and character records.

pub mod config;
pub mod core;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
