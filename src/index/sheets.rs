//! Curator-maintained overrides fed into index construction

use crate::catalog::{MonsterId, SeriesId};
use crate::error::FindError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicknameOverride {
    pub monster_id: MonsterId,
    pub nickname: String,
}

/// A name that applies to every member of the monster's tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreenameOverride {
    pub monster_id: MonsterId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAlias {
    pub series_id: SeriesId,
    pub alias: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierOverride {
    pub monster_id: MonsterId,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Co-occurrence rule: a monster carrying every `when` modifier also gets `add`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplacementRule {
    pub when: Vec<String>,
    pub add: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CuratorSheets {
    #[serde(default)]
    pub nicknames: Vec<NicknameOverride>,
    #[serde(default)]
    pub treenames: Vec<TreenameOverride>,
    #[serde(default)]
    pub series_aliases: Vec<SeriesAlias>,
    #[serde(default)]
    pub modifier_overrides: Vec<ModifierOverride>,
    /// Trees whose members all share the base's name tokens
    #[serde(default)]
    pub consistent_name_trees: Vec<MonsterId>,
    #[serde(default)]
    pub replacements: Vec<ReplacementRule>,
}

/// Load curator sheets from a JSON file
pub fn load_sheets(path: &Path) -> Result<CuratorSheets, FindError> {
    let data = fs::read_to_string(path)?;
    let sheets: CuratorSheets = serde_json::from_str(&data)?;
    info!(
        "Loaded curator sheets {}: {} nicknames, {} treenames, {} series aliases",
        path.display(),
        sheets.nicknames.len(),
        sheets.treenames.len(),
        sheets.series_aliases.len()
    );
    Ok(sheets)
}
