//! Persistence Codec
//!
//! Characters are stored as pretty-printed JSON with sorted keys and
//! four-space indentation. Loading rebuilds the character from its race,
//! role and background first, then lets every persisted field override the
//! defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::character::{Character, SpecialRules};
use super::{CharacterGenError, Result};
use crate::core::rules::schema::ProficiencyMap;
use crate::core::rules::RuleSet;

const INDENT: &[u8] = b"    ";

/// Whether a save may replace an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    CreateNew,
    Overwrite,
}

/// On-disk shape of a character. Fields are declared in key order so the
/// output is sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    #[serde(rename = "AC")]
    pub armor_class: i32,
    #[serde(rename = "Attributes")]
    pub attributes: BTreeMap<String, i32>,
    #[serde(rename = "Background", default)]
    pub background: Option<String>,
    #[serde(rename = "Equipment", default)]
    pub equipment: Vec<String>,
    #[serde(rename = "Hitpoints")]
    pub hit_points: i32,
    #[serde(rename = "Languages", default)]
    pub languages: Vec<String>,
    #[serde(rename = "Level")]
    pub level: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Proficiencies", default)]
    pub proficiencies: BTreeMap<String, Vec<String>>,
    #[serde(rename = "Proficiency Bonus")]
    pub proficiency_bonus: i32,
    #[serde(rename = "Race")]
    pub race: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "SpecialRules", default)]
    pub special_rules: BTreeMap<String, RuleList>,
    #[serde(rename = "Speed")]
    pub speed: u32,
    #[serde(rename = "XP", default)]
    pub experience: u32,
}

/// A special-rules bucket. Older records store single-entry buckets as a
/// bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleList {
    Many(Vec<String>),
    One(String),
}

impl RuleList {
    fn into_vec(self) -> Vec<String> {
        match self {
            RuleList::Many(rules) => rules,
            RuleList::One(rule) if rule.is_empty() => Vec::new(),
            RuleList::One(rule) => vec![rule],
        }
    }
}

impl CharacterRecord {
    pub fn from_character(character: &Character) -> Self {
        Self {
            armor_class: character.armor_class(),
            attributes: character
                .attributes()
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            background: character.background().map(str::to_string),
            equipment: character.equipment().to_vec(),
            hit_points: character.hit_points(),
            languages: character.languages().to_vec(),
            level: character.level(),
            name: character.name().to_string(),
            proficiencies: character
                .proficiencies()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            proficiency_bonus: character.proficiency_bonus(),
            race: character.race().to_string(),
            role: character.role().to_string(),
            size: character.size().to_string(),
            special_rules: character
                .special_rules()
                .buckets()
                .map(|(k, v)| (k.to_string(), RuleList::Many(v.to_vec())))
                .collect(),
            speed: character.speed(),
            experience: character.experience(),
        }
    }

    /// Rebuild a character, letting every stored field win over the
    /// defaults its race, role and background would grant.
    pub fn into_character(self, rules: &RuleSet) -> Result<Character> {
        let mut character = Character::new(
            rules,
            &self.name,
            &self.race,
            &self.role,
            self.background.as_deref(),
        )?;

        let missing: Vec<&String> = character
            .attributes()
            .keys()
            .filter(|a| !self.attributes.contains_key(*a))
            .collect();
        if !missing.is_empty() {
            log::warn!("Record for {} lacks attributes {:?}; left at 0", self.name, missing);
        }
        character.set_attributes(self.attributes.iter().map(|(k, v)| (k.as_str(), *v)))?;
        character.mark_all_assigned();

        let mut proficiencies = self.proficiencies;
        let mut ordered = ProficiencyMap::new();
        for kind in rules.proficiency_types() {
            if let Some(items) = proficiencies.remove(kind) {
                ordered.insert(kind.clone(), items);
            }
        }
        ordered.extend(proficiencies);

        let mut special_rules = SpecialRules::default();
        for (bucket, list) in self.special_rules {
            special_rules.replace(&bucket, list.into_vec());
        }

        character.set_hit_points(self.hit_points);
        character.set_special_rules(special_rules);
        character.set_equipment(self.equipment);
        character.set_languages(self.languages);
        character.set_proficiencies(ordered);
        character.set_size(self.size);
        character.set_speed(self.speed);
        character.set_level(self.level);
        character.set_experience(self.experience);
        character.set_armor_class(self.armor_class);
        character.set_proficiency_bonus(self.proficiency_bonus);
        Ok(character)
    }
}

// ============================================================================
// Text codec
// ============================================================================

pub fn serialize(character: &Character) -> Result<String> {
    let record = CharacterRecord::from_character(character);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    record
        .serialize(&mut serializer)
        .map_err(|source| CharacterGenError::RecordEncode {
            name: character.name().to_string(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub fn deserialize(rules: &RuleSet, text: &str) -> Result<Character> {
    parse_record(text, "<memory>")?.into_character(rules)
}

fn parse_record(text: &str, origin: &str) -> Result<CharacterRecord> {
    serde_json::from_str(text).map_err(|source| CharacterGenError::RecordCorrupt {
        origin: origin.to_string(),
        source,
    })
}

// ============================================================================
// Files
// ============================================================================

/// Write a record atomically: the JSON lands in a temp file beside the
/// destination and is moved into place only once fully written.
pub fn save(character: &Character, destination: &Path, mode: SaveMode) -> Result<()> {
    if mode == SaveMode::CreateNew && destination.exists() {
        return Err(CharacterGenError::RecordExists(destination.to_path_buf()));
    }

    let text = serialize(character)?;
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
    tmp.write_all(text.as_bytes()).map_err(io_error(tmp.path()))?;
    tmp.as_file().sync_all().map_err(io_error(tmp.path()))?;

    let persisted = match mode {
        SaveMode::CreateNew => tmp.persist_noclobber(destination),
        SaveMode::Overwrite => tmp.persist(destination),
    };
    persisted.map_err(|err| match err.error.kind() {
        IoErrorKind::AlreadyExists => CharacterGenError::RecordExists(destination.to_path_buf()),
        _ => CharacterGenError::Io {
            path: destination.to_path_buf(),
            source: err.error,
        },
    })?;

    log::info!("Saved {} to {}", character.name(), destination.display());
    Ok(())
}

pub fn load(rules: &RuleSet, source: &Path) -> Result<Character> {
    let text = fs::read_to_string(source).map_err(|err| match err.kind() {
        IoErrorKind::NotFound => CharacterGenError::RecordNotFound(source.to_path_buf()),
        _ => CharacterGenError::Io {
            path: source.to_path_buf(),
            source: err,
        },
    })?;
    let record = parse_record(&text, &source.display().to_string())?;
    let character = record.into_character(rules)?;
    log::info!("Loaded {} from {}", character.name(), source.display());
    Ok(character)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CharacterGenError {
    let path = path.to_path_buf();
    move |source| CharacterGenError::Io { path, source }
}

/// Default file name for a character inside `dir`
pub fn default_path(dir: &Path, character: &Character) -> PathBuf {
    let stem: String = character
        .name()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "character".to_string() } else { stem };
    dir.join(format!("{stem}.json"))
}

// ============================================================================
// Tests
// ============================================================================
