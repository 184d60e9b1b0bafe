//! Catalog record types as they appear in a snapshot file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MonsterId = u32;
pub type SeriesId = u32;
pub type AwakeningId = u32;

/// Elemental attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Fire,
    Water,
    Wood,
    Light,
    Dark,
    Nil,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Fire,
        Attribute::Water,
        Attribute::Wood,
        Attribute::Light,
        Attribute::Dark,
        Attribute::Nil,
    ];

    /// One-letter query code (`r`, `b`, `g`, `l`, `d`, `x`)
    pub fn code(self) -> char {
        match self {
            Attribute::Fire => 'r',
            Attribute::Water => 'b',
            Attribute::Wood => 'g',
            Attribute::Light => 'l',
            Attribute::Dark => 'd',
            Attribute::Nil => 'x',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Attribute::ALL.into_iter().find(|a| a.code() == code)
    }

    /// Long query aliases, colour name first
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Attribute::Fire => &["red", "fire"],
            Attribute::Water => &["blue", "water"],
            Attribute::Wood => &["green", "wood"],
            Attribute::Light => &["light", "yellow"],
            Attribute::Dark => &["dark", "purple"],
            Attribute::Nil => &["nil", "none"],
        }
    }

    /// Resolve a single-attribute query value (`r`, `red`, `fire`, ...)
    pub fn from_alias(value: &str) -> Option<Self> {
        let mut chars = value.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Attribute::from_code(c);
        }
        Attribute::ALL
            .into_iter()
            .find(|a| a.aliases().contains(&value))
    }
}

/// Category type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonsterType {
    Evolve,
    Balanced,
    Physical,
    Healer,
    Dragon,
    God,
    Attacker,
    Devil,
    Machine,
    Awoken,
    Enhance,
    Vendor,
}

impl MonsterType {
    /// Material types are fodder rather than playable cards
    pub fn is_material(self) -> bool {
        matches!(
            self,
            MonsterType::Evolve | MonsterType::Awoken | MonsterType::Enhance | MonsterType::Vendor
        )
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            MonsterType::Evolve => &["evomat", "evolve"],
            MonsterType::Balanced => &["balanced", "bal"],
            MonsterType::Physical => &["physical", "phys"],
            MonsterType::Healer => &["healer", "heal"],
            MonsterType::Dragon => &["dragon", "drag"],
            MonsterType::God => &["god"],
            MonsterType::Attacker => &["attacker", "atk"],
            MonsterType::Devil => &["devil", "dev"],
            MonsterType::Machine => &["machine", "mach"],
            MonsterType::Awoken => &["awokenmat", "awakenmat"],
            MonsterType::Enhance => &["enhance", "fodder"],
            MonsterType::Vendor => &["vendor", "redeemable"],
        }
    }
}

/// Server a record is visible on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Server {
    #[default]
    Combined,
    Na,
    Jp,
}

impl std::str::FromStr for Server {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "combined" | "all" => Ok(Server::Combined),
            "na" | "us" => Ok(Server::Na),
            "jp" | "ja" => Ok(Server::Jp),
            other => Err(format!("unknown server '{}'", other)),
        }
    }
}

/// Evolution edge category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionKind {
    #[default]
    Normal,
    Reversible,
    Reincarnated,
    SuperReincarnated,
    Pixel,
}

/// Series classification used by the ranker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Regular,
    Event,
    Seasonal,
    Ghcollab,
    Collab,
    Lowpriority,
}

impl SeriesType {
    /// Ranking weight; higher sorts first
    pub fn priority(series_type: Option<SeriesType>) -> u8 {
        match series_type {
            Some(SeriesType::Regular) | Some(SeriesType::Event) => 4,
            Some(SeriesType::Seasonal) => 3,
            Some(SeriesType::Ghcollab) => 2,
            Some(SeriesType::Collab) => 1,
            Some(SeriesType::Lowpriority) | None => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAdjustments {
    #[serde(default)]
    pub hp: i64,
    #[serde(default)]
    pub atk: i64,
    #[serde(default)]
    pub rcv: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwakeningDef {
    pub id: AwakeningId,
    pub name: String,
    #[serde(default)]
    pub adjustments: StatAdjustments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub name: String,
    #[serde(default)]
    pub series_type: Option<SeriesType>,
}

/// One awakening slot on a monster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwakeningSlot {
    pub awakening_id: AwakeningId,
    #[serde(default)]
    pub is_super: bool,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub hp: i64,
    #[serde(default)]
    pub atk: i64,
    #[serde(default)]
    pub rcv: i64,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub sell_mp: i64,
    #[serde(default)]
    pub sell_gold: i64,
    #[serde(default)]
    pub fodder_exp: i64,
    #[serde(default)]
    pub limit_mult: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub monster_no_na: MonsterId,
    pub monster_no_jp: MonsterId,
    pub name_en: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    #[serde(default)]
    pub name_ja: Option<String>,
    pub attr1: Attribute,
    #[serde(default)]
    pub attr2: Option<Attribute>,
    #[serde(default)]
    pub attr3: Option<Attribute>,
    #[serde(default)]
    pub types: Vec<MonsterType>,
    #[serde(default)]
    pub series_id: Option<SeriesId>,
    #[serde(default)]
    pub awakenings: Vec<AwakeningSlot>,
    pub rarity: u32,
    #[serde(default = "default_true")]
    pub on_na: bool,
    #[serde(default = "default_true")]
    pub on_jp: bool,
    #[serde(default)]
    pub in_rem: bool,
    #[serde(default)]
    pub in_pem: bool,
    #[serde(default)]
    pub in_vem: bool,
    #[serde(default)]
    pub is_farmable: bool,
    #[serde(default)]
    pub is_equip: bool,
    #[serde(default)]
    pub is_inheritable: bool,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub evo_gem_id: Option<MonsterId>,
}

fn default_true() -> bool {
    true
}

impl Monster {
    pub fn on_server(&self, server: Server) -> bool {
        match server {
            Server::Combined => true,
            Server::Na => self.on_na,
            Server::Jp => self.on_jp,
        }
    }

    pub fn in_randombox(&self) -> bool {
        self.in_rem || self.in_pem || self.in_vem
    }

    /// Normal (non-super) awakening ids in slot order
    pub fn normal_awakenings(&self) -> impl Iterator<Item = AwakeningId> + '_ {
        self.awakenings
            .iter()
            .filter(|a| !a.is_super)
            .map(|a| a.awakening_id)
    }

    pub fn super_awakenings(&self) -> impl Iterator<Item = AwakeningId> + '_ {
        self.awakenings
            .iter()
            .filter(|a| a.is_super)
            .map(|a| a.awakening_id)
    }

    pub fn has_attribute(&self, attr: Attribute) -> bool {
        self.attr1 == attr || self.attr2 == Some(attr) || self.attr3 == Some(attr)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    pub from: MonsterId,
    pub to: MonsterId,
    #[serde(default)]
    pub kind: EvolutionKind,
    #[serde(default)]
    pub materials: Vec<MonsterId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub from: MonsterId,
    pub to: MonsterId,
}

/// An exchange recipe: `required` can be traded for `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub target: MonsterId,
    #[serde(default)]
    pub required: Vec<MonsterId>,
    pub server: Server,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl Exchange {
    /// Contracts with no end date stay in the shop indefinitely
    pub fn is_permanent(&self) -> bool {
        self.end.is_none()
    }

    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && self.end.map_or(true, |end| at < end)
    }
}

/// Everything a refresh hands to the index: the raw catalog tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub monsters: Vec<Monster>,
    #[serde(default)]
    pub awakenings: Vec<AwakeningDef>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
    #[serde(default)]
    pub transforms: Vec<Transform>,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
}
