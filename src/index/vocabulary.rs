//! Built-in modifier vocabulary
//!
//! These tables are the categorical words the index attaches to monsters
//! (attribute, type, evolution, awakening and misc codes) and the fixed
//! awakening equivalence table used by multiple-awakening tokens.

use crate::catalog::{Attribute, AwakeningId, MonsterType};

/// Modifiers that are legal as trailing tokens after a name
pub const SUFFIXES: &[&str] = &["equip", "assist", "eq"];

pub const MONSTER: &str = "monster";

pub const BASE: &[&str] = &["base"];
pub const EVOLVED: &[&str] = &["evo", "evolved"];
pub const REVERSIBLE: &[&str] = &["uevo", "uvo", "ult", "ultimate"];
pub const REINCARNATED: &[&str] = &["revo", "reincarnated", "rebirth"];
pub const SUPER_REINCARNATED: &[&str] = &["srevo", "superrevo", "superreincarnated"];
pub const PIXEL: &[&str] = &["pixel", "px", "dot"];
pub const AWOKEN: &[&str] = &["awoken", "awo", "awake"];
pub const EQUIP: &[&str] = &["equip", "assist", "eq"];
pub const TRANSFORM: &[&str] = &["transform", "trans", "xform"];
pub const NEWEST: &[&str] = &["new"];
pub const EVO_GEM: &[&str] = &["gem", "evogem"];

pub const FARMABLE: &[&str] = &["farmable", "farm"];
pub const RANDOMBOX: &[&str] = &["rem", "gacha", "pull"];
pub const EXCHANGE: &[&str] = &["exchange", "mp", "shop"];
pub const PERMANENT_EXCHANGE: &[&str] = &["permexchange", "permshop"];
pub const INHERITABLE: &[&str] = &["inheritable", "inherit"];
pub const NA_ONLY: &[&str] = &["naonly"];
pub const JP_ONLY: &[&str] = &["jponly"];
pub const COLLAB: &[&str] = &["collab"];
pub const SEASONAL: &[&str] = &["seasonal"];
pub const EVENT: &[&str] = &["event"];

/// Name words that carry no identifying weight
pub const STOP_WORDS: &[&str] = &["the", "of", "and", "a", "an", "in", "on", "to", "for"];

/// Query aliases for awakenings, keyed by awakening id
pub const AWAKENING_ALIASES: &[(AwakeningId, &[&str])] = &[
    (10, &["br", "bindres", "bind"]),
    (11, &["blindres", "blind"]),
    (12, &["jammerres", "jammer"]),
    (13, &["poisonres", "poison"]),
    (19, &["te", "time", "extend"]),
    (21, &["sb", "skillboost"]),
    (27, &["tpa", "2w"]),
    (28, &["sbr", "skillbindres"]),
    (43, &["7c", "7combo"]),
    (48, &["vdp"]),
    (52, &["br+", "bindres+"]),
    (53, &["te+", "time+"]),
    (56, &["sb+", "skillboost+"]),
    (68, &["blindres+", "blind+"]),
    (69, &["jammerres+", "jammer+"]),
    (70, &["poisonres+", "poison+"]),
    (96, &["10c", "10combo"]),
    (106, &["unbindable", "unbind"]),
];

/// "Plus" awakenings and how many of the plain awakening they count as:
/// `(plus_id, plain_id, count)`
pub const AWAKENING_EQUIVALENCES: &[(AwakeningId, AwakeningId, u32)] = &[
    (52, 10, 2),
    (53, 19, 2),
    (56, 21, 2),
    (68, 11, 2),
    (69, 12, 2),
    (70, 13, 2),
    (106, 10, 2),
];

pub fn awakening_aliases(id: AwakeningId) -> &'static [&'static str] {
    AWAKENING_ALIASES
        .iter()
        .find(|(aid, _)| *aid == id)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// How many `target` awakenings a slot holding `slot` is worth
pub fn awakening_weight(slot: AwakeningId, target: AwakeningId) -> u32 {
    if slot == target {
        return 1;
    }
    AWAKENING_EQUIVALENCES
        .iter()
        .find(|(plus, plain, _)| *plus == slot && *plain == target)
        .map(|(_, _, count)| *count)
        .unwrap_or(0)
}

/// All words the index may attach as modifiers regardless of catalog content.
///
/// Name words that collide with these are demoted to fluff.
pub fn builtin_modifier_words() -> impl Iterator<Item = &'static str> {
    let groups: [&'static [&'static str]; 22] = [
        SUFFIXES,
        BASE,
        EVOLVED,
        REVERSIBLE,
        REINCARNATED,
        SUPER_REINCARNATED,
        PIXEL,
        AWOKEN,
        EQUIP,
        TRANSFORM,
        NEWEST,
        EVO_GEM,
        FARMABLE,
        RANDOMBOX,
        EXCHANGE,
        PERMANENT_EXCHANGE,
        INHERITABLE,
        NA_ONLY,
        JP_ONLY,
        COLLAB,
        SEASONAL,
        EVENT,
    ];
    let attributes = Attribute::ALL.into_iter().flat_map(|a| a.aliases().iter().copied());
    let types = [
        MonsterType::Evolve,
        MonsterType::Balanced,
        MonsterType::Physical,
        MonsterType::Healer,
        MonsterType::Dragon,
        MonsterType::God,
        MonsterType::Attacker,
        MonsterType::Devil,
        MonsterType::Machine,
        MonsterType::Awoken,
        MonsterType::Enhance,
        MonsterType::Vendor,
    ]
    .into_iter()
    .flat_map(|t| t.aliases().iter().copied());

    groups
        .into_iter()
        .flat_map(|g| g.iter().copied())
        .chain(attributes)
        .chain(types)
        .chain(std::iter::once(MONSTER))
}
