//! Rule Data Store
//!
//! Loads the three rule files (catalog, stats, name pools) into an immutable
//! [`RuleSet`]. Construction is all-or-nothing: a missing required section,
//! unreadable file or malformed record aborts the load.
//!
//! The store has no mutation API. Share it between components with
//! `Arc<RuleSet>`.

pub mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use schema::{
    BackgroundStats, Catalog, LevelEntry, NamePools, PointBuyTable, ProficiencyMap, RaceStats,
    RoleStats,
};

/// Catalog of attributes, races, roles, backgrounds and skills
pub const CATALOG_FILE: &str = "rpgData.json";
/// Per-race, per-role and per-background stats plus score tables
pub const STATS_FILE: &str = "statsData.json";
/// Name pools
pub const NAMES_FILE: &str = "namesData.json";

const CATALOG_SECTIONS: &[&str] = &["Attributes", "Races", "Roles", "Backgrounds", "Skills"];
const STATS_SECTIONS: &[&str] = &["RaceStats", "RoleStats", "BackgroundStats"];

const BUNDLED_CATALOG: &str = include_str!("../../../data/rpgData.json");
const BUNDLED_STATS: &str = include_str!("../../../data/statsData.json");
const BUNDLED_NAMES: &str = include_str!("../../../data/namesData.json");

// ============================================================================
// Error Types
// ============================================================================

/// Failures while building a [`RuleSet`]. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("{file} is missing a {section} section")]
    MissingSection { file: String, section: String },

    #[error("{file} must contain a JSON object at the top level")]
    NotAnObject { file: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, RulesError>;

// ============================================================================
// File layouts
// ============================================================================

#[derive(Deserialize)]
struct StatsFile {
    #[serde(rename = "RaceStats")]
    race_stats: IndexMap<String, RaceStats>,
    #[serde(rename = "RoleStats")]
    role_stats: IndexMap<String, RoleStats>,
    #[serde(rename = "BackgroundStats")]
    background_stats: IndexMap<String, BackgroundStats>,
    /// Score (as a string key) -> point cost
    #[serde(rename = "PointsCost", default)]
    points_cost: Option<BTreeMap<String, u32>>,
    #[serde(rename = "PointsTotal", default)]
    points_total: Option<u32>,
    #[serde(rename = "StandardPoints", default)]
    standard_points: Option<Vec<i32>>,
}

// ============================================================================
// RuleSet
// ============================================================================

/// The loaded, validated rule tables
#[derive(Debug, Clone)]
pub struct RuleSet {
    catalog: Catalog,
    races: IndexMap<String, RaceStats>,
    roles: IndexMap<String, RoleStats>,
    backgrounds: IndexMap<String, BackgroundStats>,
    point_buy: Option<PointBuyTable>,
    standard_array: Option<Vec<i32>>,
    names: NamePools,
}

impl RuleSet {
    /// Load `rpgData.json`, `statsData.json` and `namesData.json` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        log::info!("Loading rule tables from {}", dir.display());

        let catalog = read_source(&dir.join(CATALOG_FILE))?;
        let stats = read_source(&dir.join(STATS_FILE))?;
        let names = read_source(&dir.join(NAMES_FILE))?;

        Self::from_json_strs(&catalog, &stats, &names)
    }

    /// The rule tables shipped in `data/`, compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json_strs(BUNDLED_CATALOG, BUNDLED_STATS, BUNDLED_NAMES)
    }

    /// Parse and validate rule tables from in-memory JSON sources.
    pub fn from_json_strs(catalog: &str, stats: &str, names: &str) -> Result<Self> {
        let catalog: Catalog = parse_sections(CATALOG_FILE, catalog, CATALOG_SECTIONS)?;
        let stats: StatsFile = parse_sections(STATS_FILE, stats, STATS_SECTIONS)?;
        let names: IndexMap<String, Vec<String>> = parse_sections(NAMES_FILE, names, &[])?;

        let point_buy = match (stats.points_cost, stats.points_total) {
            (Some(costs), Some(total)) => {
                let table = PointBuyTable::new(parse_point_costs(costs)?, total);
                if table.is_none() {
                    log::warn!("{STATS_FILE} has an empty PointsCost table; point buy disabled");
                }
                table
            }
            (None, None) => None,
            (Some(_), None) => {
                log::warn!("{STATS_FILE} has PointsCost but no PointsTotal; point buy disabled");
                None
            }
            (None, Some(_)) => {
                log::warn!("{STATS_FILE} has PointsTotal but no PointsCost; point buy disabled");
                None
            }
        };

        let rules = Self {
            catalog,
            races: stats.race_stats,
            roles: stats.role_stats,
            backgrounds: stats.background_stats,
            point_buy,
            standard_array: stats.standard_points,
            names: NamePools::from_entries(names),
        };
        rules.report_gaps();

        log::info!(
            "Rule tables ready: {} attributes, {} races, {} roles, {} backgrounds",
            rules.catalog.attributes.len(),
            rules.races.len(),
            rules.roles.len(),
            rules.backgrounds.len()
        );
        Ok(rules)
    }

    /// Log catalog entries that have no stats and stats keyed by unknown
    /// attributes. These only fail once a character actually uses them.
    fn report_gaps(&self) {
        for race in &self.catalog.races {
            if !self.races.contains_key(race) {
                log::warn!("Race {race} is listed in {CATALOG_FILE} but has no RaceStats entry");
            }
        }
        for role in &self.catalog.roles {
            if !self.roles.contains_key(role) {
                log::warn!("Role {role} is listed in {CATALOG_FILE} but has no RoleStats entry");
            }
        }
        for background in &self.catalog.backgrounds {
            if !self.backgrounds.contains_key(background) {
                log::warn!(
                    "Background {background} is listed in {CATALOG_FILE} but has no BackgroundStats entry"
                );
            }
        }
        for (name, race) in &self.races {
            for attribute in race.bonuses.keys() {
                if !self.catalog.has_attribute(attribute) {
                    log::warn!("Race {name} has a bonus for unknown attribute {attribute}");
                }
            }
        }
        for (name, role) in &self.roles {
            for attribute in role.priorities.keys() {
                if !self.catalog.has_attribute(attribute) {
                    log::warn!("Role {name} has a priority for unknown attribute {attribute}");
                }
            }
        }
        for (skill, attribute) in &self.catalog.skills {
            if !self.catalog.has_attribute(attribute) {
                log::warn!("Skill {skill} depends on unknown attribute {attribute}");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Attribute names in catalog order
    pub fn attributes(&self) -> &[String] {
        &self.catalog.attributes
    }

    pub fn attribute_count(&self) -> usize {
        self.catalog.attributes.len()
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.catalog.has_attribute(attribute)
    }

    pub fn race_names(&self) -> &[String] {
        &self.catalog.races
    }

    pub fn role_names(&self) -> &[String] {
        &self.catalog.roles
    }

    pub fn background_names(&self) -> &[String] {
        &self.catalog.backgrounds
    }

    pub fn skills(&self) -> &IndexMap<String, String> {
        &self.catalog.skills
    }

    pub fn proficiency_types(&self) -> &[String] {
        &self.catalog.proficiency_types
    }

    pub fn race(&self, name: &str) -> Option<&RaceStats> {
        self.races.get(name)
    }

    pub fn role(&self, name: &str) -> Option<&RoleStats> {
        self.roles.get(name)
    }

    pub fn background(&self, name: &str) -> Option<&BackgroundStats> {
        self.backgrounds.get(name)
    }

    pub fn point_buy(&self) -> Option<&PointBuyTable> {
        self.point_buy.as_ref()
    }

    pub fn standard_array(&self) -> Option<&[i32]> {
        self.standard_array.as_deref()
    }

    pub fn names(&self) -> &NamePools {
        &self.names
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `text` as a JSON object, check the required top-level keys, then
/// decode into the typed layout.
fn parse_sections<T: DeserializeOwned>(file: &str, text: &str, required: &[&str]) -> Result<T> {
    let value: Value = serde_json::from_str(text).map_err(|source| RulesError::Parse {
        file: file.to_string(),
        source,
    })?;

    let object = value.as_object().ok_or_else(|| RulesError::NotAnObject {
        file: file.to_string(),
    })?;

    if let Some(missing) = required.iter().find(|key| !object.contains_key(**key)) {
        log::error!("{file} is missing a {missing} section");
        return Err(RulesError::MissingSection {
            file: file.to_string(),
            section: missing.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|source| RulesError::Parse {
        file: file.to_string(),
        source,
    })
}

fn parse_point_costs(raw: BTreeMap<String, u32>) -> Result<BTreeMap<i32, u32>> {
    raw.into_iter()
        .map(|(score, cost)| {
            score
                .trim()
                .parse::<i32>()
                .map(|score| (score, cost))
                .map_err(|_| RulesError::Parse {
                    file: STATS_FILE.to_string(),
                    source: serde::de::Error::custom(format!(
                        "PointsCost key {score:?} is not a score"
                    )),
                })
        })
        .collect()
}
