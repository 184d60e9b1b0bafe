//! Special token recognizers and their predicates
//!
//! Each recognizer is a full-match regex plus a closed table of aliases.
//! A value the regex accepts but whose alias is unknown is not special and
//! falls through to the next recognizer (eventually becoming a regular token).

use super::matches::{MatchKind, TokenMatch};
use super::similarity::{jaro_winkler, EPSILON, MODIFIER_PREFIX_WEIGHT};
use crate::catalog::{Attribute, AwakeningId, Monster, MonsterGraph, MonsterId};
use crate::index::vocabulary::awakening_weight;
use crate::index::MonsterIndex;
use crate::text;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<attr>[a-z]+):(?P<cmp>[<>=]+)(?P<num>\d+(?:\.\d+)?)(?P<mult>[kmb])?$")
        .expect("Failed to compile numeric attribute regex")
});

static STRING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<attr>[a-z]+):(?:(?P<mode>[rg=])?"(?P<quoted>[^"]*)"|(?P<bare>[^"\s]+))$"#)
        .expect("Failed to compile string attribute regex")
});

static BOOL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<attr>[a-z]+):(?P<value>[a-z0-9]+)$")
        .expect("Failed to compile boolean attribute regex")
});

static MULTI_AWAKENING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<count>\d+)-(?P<sa>sa-)?(?P<name>.+)$")
        .expect("Failed to compile multiple awakening regex")
});

static MULTI_ATTR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<a>[rbgldx])/(?P<b>[rbgldx])(?:/(?P<c>[rbgldx]))?$")
        .expect("Failed to compile multi-attribute regex")
});

static ID_RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<lo>\d+)-(?P<hi>\d*)$").expect("Failed to compile id range regex")
});

const FALSY: &[&str] = &["0", "false", "no"];

/// Numeric fields reachable from a `<attr>:<cmp><number>` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericAttr {
    Hp,
    Atk,
    Rcv,
    Rarity,
    Cost,
    SellMp,
    SellGold,
    FodderExp,
    Level,
    LimitBreak,
    Id,
    AwakeningCount,
}

impl NumericAttr {
    pub fn from_alias(alias: &str) -> Option<Self> {
        let attr = match alias {
            "hp" | "maxhp" => NumericAttr::Hp,
            "atk" | "maxatk" => NumericAttr::Atk,
            "rcv" | "maxrcv" => NumericAttr::Rcv,
            "rarity" | "stars" => NumericAttr::Rarity,
            "cost" => NumericAttr::Cost,
            "sellmp" => NumericAttr::SellMp,
            "sellgold" | "sellcoin" => NumericAttr::SellGold,
            "exp" | "fodderexp" => NumericAttr::FodderExp,
            "level" | "maxlevel" | "lv" => NumericAttr::Level,
            "lb" | "limitbreak" => NumericAttr::LimitBreak,
            "id" => NumericAttr::Id,
            "awakenings" | "awakes" => NumericAttr::AwakeningCount,
            _ => return None,
        };
        Some(attr)
    }

    pub fn value(self, monster: &Monster) -> f64 {
        let stats = &monster.stats;
        match self {
            NumericAttr::Hp => stats.hp as f64,
            NumericAttr::Atk => stats.atk as f64,
            NumericAttr::Rcv => stats.rcv as f64,
            NumericAttr::Rarity => monster.rarity as f64,
            NumericAttr::Cost => stats.cost as f64,
            NumericAttr::SellMp => stats.sell_mp as f64,
            NumericAttr::SellGold => stats.sell_gold as f64,
            NumericAttr::FodderExp => stats.fodder_exp as f64,
            NumericAttr::Level => stats.level as f64,
            NumericAttr::LimitBreak => stats.limit_mult as f64,
            NumericAttr::Id => monster.id as f64,
            NumericAttr::AwakeningCount => monster.normal_awakenings().count() as f64,
        }
    }
}

/// Any non-empty combination of `<`, `>` and `=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    pub lt: bool,
    pub gt: bool,
    pub eq: bool,
}

impl Comparator {
    fn parse(raw: &str) -> Self {
        Self {
            lt: raw.contains('<'),
            gt: raw.contains('>'),
            eq: raw.contains('='),
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        (self.lt && lhs < rhs) || (self.gt && lhs > rhs) || (self.eq && lhs == rhs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericCondition {
    pub attr: NumericAttr,
    pub cmp: Comparator,
    pub rhs: f64,
}

impl NumericCondition {
    pub fn matches(&self, token: &str, monster: &Monster) -> (f64, Option<TokenMatch>) {
        let value = self.attr.value(monster);
        if self.cmp.holds(value, self.rhs) {
            (
                1.0,
                Some(TokenMatch::new(token, &value.to_string(), MatchKind::Special, 1.0)),
            )
        } else {
            (0.0, None)
        }
    }
}

/// Text fields reachable from a `<attr>:<string>` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringAttr {
    Name,
    JpName,
    Series,
}

impl StringAttr {
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "name" | "n" => Some(StringAttr::Name),
            "jpname" | "ja" => Some(StringAttr::JpName),
            "series" | "sname" => Some(StringAttr::Series),
            _ => None,
        }
    }

    /// Field values for this alias, folded the way queries are
    pub fn values(self, monster: &Monster, graph: &MonsterGraph) -> Vec<String> {
        let fold = |s: &String| text::fold(s).replace(',', "");
        match self {
            StringAttr::Name => std::iter::once(&monster.name_en)
                .chain(monster.alt_names.iter())
                .map(fold)
                .collect(),
            StringAttr::JpName => monster.name_ja.iter().map(fold).collect(),
            StringAttr::Series => graph
                .series_of(monster)
                .map(|s| vec![fold(&s.name)])
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StringMode {
    Exact,
    /// `None` when the pattern failed to compile; never matches
    Regex(Option<Regex>),
    Glob(Option<glob::Pattern>),
    Substring,
}

#[derive(Debug, Clone)]
pub struct StringCondition {
    pub attr: StringAttr,
    pub mode: StringMode,
    pub needle: String,
}

impl StringCondition {
    pub fn matches(
        &self,
        token: &str,
        monster: &Monster,
        graph: &MonsterGraph,
        threshold: f64,
    ) -> (f64, Option<TokenMatch>) {
        let values = self.attr.values(monster, graph);
        let hit = |value: &String| (1.0, Some(TokenMatch::new(token, value, MatchKind::Special, 1.0)));

        let result = match &self.mode {
            StringMode::Exact => values.iter().find(|v| **v == self.needle).map(hit),
            StringMode::Regex(Some(re)) => values.iter().find(|v| re.is_match(v)).map(hit),
            StringMode::Glob(Some(pattern)) => values.iter().find(|v| pattern.matches(v)).map(hit),
            StringMode::Regex(None) | StringMode::Glob(None) => None,
            StringMode::Substring => values
                .iter()
                .find(|v| v.contains(&self.needle))
                .map(hit)
                .or_else(|| self.best_partial(token, &values, threshold)),
        };
        result.unwrap_or((0.0, None))
    }

    /// Best Jaro–Winkler score over the fields and their words, if above the threshold
    fn best_partial(
        &self,
        token: &str,
        values: &[String],
        threshold: f64,
    ) -> Option<(f64, Option<TokenMatch>)> {
        let mut best: Option<(f64, &str)> = None;
        for value in values {
            let words = value.split_whitespace();
            for candidate in std::iter::once(value.as_str()).chain(words) {
                let score = jaro_winkler(&self.needle, candidate, MODIFIER_PREFIX_WEIGHT);
                if best.map_or(true, |(b, _)| score > b) {
                    best = Some((score, candidate));
                }
            }
        }
        best.filter(|(score, _)| *score > threshold).map(|(score, candidate)| {
            (
                score,
                Some(TokenMatch::new(token, candidate, MatchKind::Special, score)),
            )
        })
    }
}

/// Flags reachable from a `<attr>:<bool>` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolAttr {
    Farmable,
    RandomBox,
    Inheritable,
    Equip,
    OnNa,
    OnJp,
    Exchange,
    EvoGem,
}

impl BoolAttr {
    pub fn from_alias(alias: &str) -> Option<Self> {
        let attr = match alias {
            "farmable" | "farm" => BoolAttr::Farmable,
            "rem" | "gacha" => BoolAttr::RandomBox,
            "inheritable" | "inherit" => BoolAttr::Inheritable,
            "equip" | "assist" => BoolAttr::Equip,
            "onna" | "na" => BoolAttr::OnNa,
            "onjp" | "jp" => BoolAttr::OnJp,
            "exchange" | "mp" => BoolAttr::Exchange,
            "gem" | "evogem" => BoolAttr::EvoGem,
            _ => return None,
        };
        Some(attr)
    }

    pub fn value(self, monster: &Monster, graph: &MonsterGraph) -> bool {
        match self {
            BoolAttr::Farmable => monster.is_farmable,
            BoolAttr::RandomBox => monster.in_randombox(),
            BoolAttr::Inheritable => monster.is_inheritable,
            BoolAttr::Equip => monster.is_equip,
            BoolAttr::OnNa => monster.on_na,
            BoolAttr::OnJp => monster.on_jp,
            BoolAttr::Exchange => graph.is_exchange_target_at(monster.id, Utc::now()),
            BoolAttr::EvoGem => graph.is_evo_gem(monster.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolCondition {
    pub attr: BoolAttr,
    pub wanted: bool,
}

/// `<count>-[sa-]<awakening>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiAwakening {
    pub count: u32,
    pub awakening: AwakeningId,
    /// One super awakening may count toward the total
    pub allow_super: bool,
}

impl MultiAwakening {
    pub fn matches(&self, token: &str, monster: &Monster) -> (f64, Option<TokenMatch>) {
        let mut total: u32 = monster
            .normal_awakenings()
            .map(|slot| awakening_weight(slot, self.awakening))
            .sum();
        if self.allow_super {
            total += monster
                .super_awakenings()
                .map(|slot| awakening_weight(slot, self.awakening))
                .max()
                .unwrap_or(0);
        }
        if total >= self.count {
            (
                1.0,
                Some(TokenMatch::new(token, &total.to_string(), MatchKind::Special, 1.0)),
            )
        } else {
            (0.0, None)
        }
    }
}

/// Attribute tokens: `r` or `r/b` or `r/b/g`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePattern {
    pub attrs: Vec<Attribute>,
}

impl AttributePattern {
    pub fn matches(&self, token: &str, monster: &Monster) -> (f64, Option<TokenMatch>) {
        let hit = |score: f64, what: &str| {
            let m = TokenMatch::new(token, what, MatchKind::Special, score);
            let m = if score < 1.0 { m.non_negatable() } else { m };
            (score, Some(m))
        };
        let sub_is = |attr: Attribute| {
            monster.attr2 == Some(attr) || (attr == Attribute::Nil && monster.attr2.is_none())
        };

        match self.attrs.as_slice() {
            [main] => {
                if monster.attr1 == *main {
                    hit(1.0, "main")
                } else if monster.attr2 == Some(*main) {
                    hit(1.0 - EPSILON / 2.0, "sub")
                } else if monster.attr3 == Some(*main) {
                    hit(1.0 - EPSILON, "third")
                } else {
                    (0.0, None)
                }
            }
            [main, sub] => {
                if monster.attr1 != *main {
                    (0.0, None)
                } else if sub_is(*sub) {
                    hit(1.0, "main/sub")
                } else if monster.attr3 == Some(*sub) {
                    hit(1.0 - EPSILON / 2.0, "main/third")
                } else {
                    (0.0, None)
                }
            }
            [main, sub, third] => {
                if monster.attr1 == *main && sub_is(*sub) && monster.attr3 == Some(*third) {
                    hit(1.0, "main/sub/third")
                } else {
                    (0.0, None)
                }
            }
            _ => (0.0, None),
        }
    }
}

/// Recognized non-subquery special tokens
#[derive(Debug, Clone)]
pub enum Special {
    Numeric(NumericCondition),
    Text(StringCondition),
    Bool(BoolCondition),
    MultiAwakening(MultiAwakening),
    Attribute(AttributePattern),
    IdRange { lo: MonsterId, hi: MonsterId },
}

impl Special {
    pub fn matches(
        &self,
        token: &str,
        monster: &Monster,
        graph: &MonsterGraph,
        token_threshold: f64,
    ) -> (f64, Option<TokenMatch>) {
        match self {
            Special::Numeric(cond) => cond.matches(token, monster),
            Special::Text(cond) => cond.matches(token, monster, graph, token_threshold),
            Special::Bool(cond) => {
                if cond.attr.value(monster, graph) == cond.wanted {
                    (
                        1.0,
                        Some(TokenMatch::new(token, &cond.wanted.to_string(), MatchKind::Special, 1.0)),
                    )
                } else {
                    (0.0, None)
                }
            }
            Special::MultiAwakening(cond) => cond.matches(token, monster),
            Special::Attribute(pattern) => pattern.matches(token, monster),
            Special::IdRange { lo, hi } => {
                if (*lo..=*hi).contains(&monster.id) {
                    (
                        1.0,
                        Some(TokenMatch::new(token, &monster.id.to_string(), MatchKind::Special, 1.0)),
                    )
                } else {
                    (0.0, None)
                }
            }
        }
    }
}

pub fn recognize_numeric(value: &str) -> Option<Special> {
    let caps = NUMERIC_PATTERN.captures(value)?;
    let attr = NumericAttr::from_alias(&caps["attr"])?;
    let number: f64 = caps["num"].parse().ok()?;
    let scale = match caps.name("mult").map(|m| m.as_str()) {
        Some("k") => 1e3,
        Some("m") => 1e6,
        Some("b") => 1e9,
        _ => 1.0,
    };
    Some(Special::Numeric(NumericCondition {
        attr,
        cmp: Comparator::parse(&caps["cmp"]),
        rhs: number * scale,
    }))
}

pub fn recognize_string(value: &str) -> Option<Special> {
    let caps = STRING_PATTERN.captures(value)?;
    let attr = StringAttr::from_alias(&caps["attr"])?;
    let (needle, mode) = match (caps.name("quoted"), caps.name("bare")) {
        (Some(quoted), _) => (quoted.as_str().to_string(), caps.name("mode").map(|m| m.as_str())),
        (None, Some(bare)) => (bare.as_str().to_string(), None),
        (None, None) => return None,
    };
    let mode = match mode {
        Some("=") => StringMode::Exact,
        Some("r") => StringMode::Regex(
            Regex::new(&needle)
                .map_err(|e| warn!("Invalid regex in '{}': {}", value, e))
                .ok(),
        ),
        Some("g") => StringMode::Glob(
            glob::Pattern::new(&needle)
                .map_err(|e| warn!("Invalid glob in '{}': {}", value, e))
                .ok(),
        ),
        _ => StringMode::Substring,
    };
    Some(Special::Text(StringCondition { attr, mode, needle }))
}

pub fn recognize_bool(value: &str) -> Option<Special> {
    let caps = BOOL_PATTERN.captures(value)?;
    let attr = BoolAttr::from_alias(&caps["attr"])?;
    let wanted = !FALSY.contains(&&caps["value"]);
    Some(Special::Bool(BoolCondition { attr, wanted }))
}

pub fn recognize_multi_awakening(value: &str, index: &MonsterIndex) -> Option<Special> {
    let caps = MULTI_AWAKENING_PATTERN.captures(value)?;
    let count: u32 = caps["count"].parse().ok()?;
    let awakening = index.resolve_awakening(&caps["name"])?;
    Some(Special::MultiAwakening(MultiAwakening {
        count,
        awakening,
        allow_super: caps.name("sa").is_some(),
    }))
}

/// One-letter code or long alias (`r`, `red`, `fire`)
pub fn recognize_single_attribute(value: &str) -> Option<Special> {
    let attr = Attribute::from_alias(value)?;
    Some(Special::Attribute(AttributePattern { attrs: vec![attr] }))
}

pub fn recognize_multi_attribute(value: &str) -> Option<Special> {
    let caps = MULTI_ATTR_PATTERN.captures(value)?;
    let attrs = ["a", "b", "c"]
        .iter()
        .filter_map(|group| caps.name(group))
        .map(|m| m.as_str().chars().next().and_then(Attribute::from_code))
        .collect::<Option<Vec<_>>>()?;
    Some(Special::Attribute(AttributePattern { attrs }))
}

pub fn recognize_id_range(value: &str) -> Option<Special> {
    let caps = ID_RANGE_PATTERN.captures(value)?;
    let lo: MonsterId = caps["lo"].parse().ok()?;
    let hi = match &caps["hi"] {
        "" => MonsterId::MAX,
        hi => hi.parse().ok()?,
    };
    Some(Special::IdRange { lo, hi })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{monster, sonia_catalog, CatalogBuilder};
    use crate::catalog::{Attribute, Stats};

    #[test]
    fn test_numeric_comparators() {
        let m = monster(1, "Star").rarity(9).build();
        let check = |q: &str| match recognize_numeric(q) {
            Some(Special::Numeric(cond)) => cond.matches(q, &m).0 > 0.0,
            _ => panic!("{} should be numeric", q),
        };
        assert!(check("rarity:=9"));
        assert!(check("rarity:>=9"));
        assert!(check("rarity:<=9"));
        assert!(!check("rarity:>9"));
        assert!(!check("rarity:<9"));
        assert!(check("rarity:<>8"));
    }

    #[test]
    fn test_numeric_multiplier_suffix() {
        let m = monster(1, "Tank")
            .stats(Stats {
                hp: 12_000,
                ..Default::default()
            })
            .build();
        let Some(Special::Numeric(cond)) = recognize_numeric("hp:>10k") else {
            panic!("expected numeric");
        };
        assert_eq!(cond.rhs, 10_000.0);
        assert!(cond.matches("hp:>10k", &m).0 > 0.0);
        assert!(recognize_numeric("bogus:>5").is_none());
    }

    #[test]
    fn test_string_modes() {
        let graph = sonia_catalog().graph();
        let m = graph.get_monster(1234).unwrap();
        let matches = |q: &str| match recognize_string(q) {
            Some(Special::Text(cond)) => cond.matches(q, m, &graph, 0.8).0,
            _ => panic!("{} should be a string token", q),
        };
        assert_eq!(matches("name:scarlet"), 1.0);
        assert_eq!(matches(r#"name:="awoken scarlet red sonia""#), 1.0);
        assert_eq!(matches(r#"name:="scarlet red sonia""#), 0.0);
        assert_eq!(matches(r#"name:r"^awoken .*sonia$""#), 1.0);
        assert_eq!(matches(r#"name:g"*red*""#), 1.0);
        assert_eq!(matches("series:dragonbound"), 1.0);
        assert!(matches("name:scarlett") > 0.8);
    }

    #[test]
    fn test_malformed_regex_never_matches() {
        let graph = sonia_catalog().graph();
        let m = graph.get_monster(1234).unwrap();
        let q = r#"name:r"(unclosed""#;
        let Some(Special::Text(cond)) = recognize_string(q) else {
            panic!("expected string token");
        };
        assert!(matches!(cond.mode, StringMode::Regex(None)));
        assert_eq!(cond.matches(q, m, &graph, 0.8).0, 0.0);
    }

    #[test]
    fn test_bool_literals() {
        let Some(Special::Bool(cond)) = recognize_bool("farmable:no") else {
            panic!("expected bool");
        };
        assert!(!cond.wanted);
        let Some(Special::Bool(cond)) = recognize_bool("farmable:yes") else {
            panic!("expected bool");
        };
        assert!(cond.wanted);
        assert!(recognize_bool("sonia:1").is_none());
    }

    #[test]
    fn test_multi_awakening_counts_plus_forms() {
        let snapshot = CatalogBuilder::new()
            .monster(monster(1, "Booster").awakenings(&[21, 56]))
            .monster(monster(2, "Super Booster").awakenings(&[21]).super_awakenings(&[21, 56]))
            .snapshot();
        let index = &snapshot.index;
        let Some(Special::MultiAwakening(plain)) = recognize_multi_awakening("3-sb", index) else {
            panic!("expected awakening token");
        };
        let Some(Special::MultiAwakening(with_super)) = recognize_multi_awakening("3-sa-sb", index)
        else {
            panic!("expected awakening token");
        };
        let booster = snapshot.graph.get_monster(1).unwrap();
        let super_booster = snapshot.graph.get_monster(2).unwrap();
        assert!(plain.matches("3-sb", booster).0 > 0.0);
        assert_eq!(plain.matches("3-sb", super_booster).0, 0.0);
        assert!(with_super.matches("3-sa-sb", super_booster).0 > 0.0);
        assert!(recognize_multi_awakening("3-notanawakening", index).is_none());
    }

    #[test]
    fn test_single_attribute_scores() {
        let m = monster(1, "Dual")
            .attrs(Attribute::Fire, Some(Attribute::Water))
            .third(Attribute::Wood)
            .build();
        let score = |q: &str| match recognize_single_attribute(q) {
            Some(Special::Attribute(p)) => p.matches(q, &m),
            _ => panic!("expected attribute"),
        };
        assert_eq!(score("r").0, 1.0);
        let (sub, sub_match) = score("b");
        assert!(sub < 1.0 && sub > 1.0 - EPSILON);
        assert!(!sub_match.unwrap().can_negate);
        assert!(score("g").0 < sub);
        assert_eq!(score("d").0, 0.0);

        assert_eq!(score("fire").0, 1.0);
        assert_eq!(score("red").0, 1.0);
        assert_eq!(score("water").0, sub);
        assert_eq!(score("purple").0, 0.0);
        assert!(recognize_single_attribute("a").is_none());
        assert!(recognize_single_attribute("sonia").is_none());
    }

    #[test]
    fn test_multi_attribute_permutations() {
        let dual = monster(1, "Dual").attrs(Attribute::Fire, Some(Attribute::Water)).build();
        let mono = monster(2, "Mono").attrs(Attribute::Fire, None).build();
        let score = |q: &str, m: &Monster| match recognize_multi_attribute(q) {
            Some(Special::Attribute(p)) => p.matches(q, m).0,
            _ => panic!("expected attribute"),
        };
        assert_eq!(score("r/b", &dual), 1.0);
        assert_eq!(score("b/r", &dual), 0.0);
        assert_eq!(score("r/x", &mono), 1.0);
        assert_eq!(score("r/x", &dual), 0.0);
    }

    #[test]
    fn test_id_range() {
        let m = monster(1500, "Ranged").build();
        let Some(range) = recognize_id_range("1000-2000") else {
            panic!("expected range");
        };
        let graph = CatalogBuilder::new().graph();
        assert_eq!(range.matches("1000-2000", &m, &graph, 0.8).0, 1.0);
        let Some(open) = recognize_id_range("1600-") else {
            panic!("expected range");
        };
        assert_eq!(open.matches("1600-", &m, &graph, 0.8).0, 0.0);
        assert!(recognize_id_range("12-ab").is_none());
    }
}
