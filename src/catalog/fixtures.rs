//! Small hand-built catalogs for unit and scenario tests

use super::graph::MonsterGraph;
use super::types::*;
use crate::index::CuratorSheets;
use crate::index::sheets::NicknameOverride;
use crate::snapshot::Snapshot;
use chrono::{DateTime, Duration, Utc};

pub struct MonsterBuilder {
    monster: Monster,
}

/// A fire monster of rarity 1 with matching regional ids
pub fn monster(id: MonsterId, name: &str) -> MonsterBuilder {
    MonsterBuilder {
        monster: Monster {
            id,
            monster_no_na: id,
            monster_no_jp: id,
            name_en: name.to_string(),
            alt_names: Vec::new(),
            name_ja: None,
            attr1: Attribute::Fire,
            attr2: None,
            attr3: None,
            types: Vec::new(),
            series_id: None,
            awakenings: Vec::new(),
            rarity: 1,
            on_na: true,
            on_jp: true,
            in_rem: false,
            in_pem: false,
            in_vem: false,
            is_farmable: false,
            is_equip: false,
            is_inheritable: false,
            stats: Stats::default(),
            evo_gem_id: None,
        },
    }
}

impl MonsterBuilder {
    pub fn ids(mut self, na: MonsterId, jp: MonsterId) -> Self {
        self.monster.monster_no_na = na;
        self.monster.monster_no_jp = jp;
        self
    }

    pub fn attrs(mut self, main: Attribute, sub: Option<Attribute>) -> Self {
        self.monster.attr1 = main;
        self.monster.attr2 = sub;
        self
    }

    pub fn third(mut self, attr: Attribute) -> Self {
        self.monster.attr3 = Some(attr);
        self
    }

    pub fn types(mut self, types: &[MonsterType]) -> Self {
        self.monster.types = types.to_vec();
        self
    }

    pub fn series(mut self, id: SeriesId) -> Self {
        self.monster.series_id = Some(id);
        self
    }

    pub fn awakenings(mut self, ids: &[AwakeningId]) -> Self {
        let start = self.monster.awakenings.len() as u32;
        self.monster
            .awakenings
            .extend(ids.iter().enumerate().map(|(i, &id)| AwakeningSlot {
                awakening_id: id,
                is_super: false,
                order: start + i as u32,
            }));
        self
    }

    pub fn super_awakenings(mut self, ids: &[AwakeningId]) -> Self {
        let start = self.monster.awakenings.len() as u32;
        self.monster
            .awakenings
            .extend(ids.iter().enumerate().map(|(i, &id)| AwakeningSlot {
                awakening_id: id,
                is_super: true,
                order: start + i as u32,
            }));
        self
    }

    pub fn rarity(mut self, rarity: u32) -> Self {
        self.monster.rarity = rarity;
        self
    }

    pub fn alt_name(mut self, name: &str) -> Self {
        self.monster.alt_names.push(name.to_string());
        self
    }

    pub fn rem(mut self) -> Self {
        self.monster.in_rem = true;
        self
    }

    pub fn farmable(mut self) -> Self {
        self.monster.is_farmable = true;
        self
    }

    pub fn equip(mut self) -> Self {
        self.monster.is_equip = true;
        self
    }

    pub fn inheritable(mut self) -> Self {
        self.monster.is_inheritable = true;
        self
    }

    pub fn servers(mut self, na: bool, jp: bool) -> Self {
        self.monster.on_na = na;
        self.monster.on_jp = jp;
        self
    }

    pub fn evo_gem(mut self, gem: MonsterId) -> Self {
        self.monster.evo_gem_id = Some(gem);
        self
    }

    pub fn stats(mut self, stats: Stats) -> Self {
        self.monster.stats = stats;
        self
    }

    pub fn build(self) -> Monster {
        self.monster
    }
}

#[derive(Default)]
pub struct CatalogBuilder {
    catalog: CatalogSnapshot,
    sheets: CuratorSheets,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
            .awakening(10, "Resistance-Bind")
            .awakening(19, "Extend Time")
            .awakening(21, "Skill Boost")
            .awakening(27, "Two-Pronged Attack")
            .awakening(52, "Resistance-Bind+")
            .awakening(56, "Skill Boost+")
            .awakening(106, "Unbindable")
    }

    pub fn monster(mut self, monster: MonsterBuilder) -> Self {
        self.catalog.monsters.push(monster.build());
        self
    }

    pub fn awakening(mut self, id: AwakeningId, name: &str) -> Self {
        self.catalog.awakenings.push(AwakeningDef {
            id,
            name: name.to_string(),
            adjustments: StatAdjustments::default(),
        });
        self
    }

    pub fn series(mut self, id: SeriesId, name: &str, series_type: SeriesType) -> Self {
        self.catalog.series.push(Series {
            id,
            name: name.to_string(),
            series_type: Some(series_type),
        });
        self
    }

    pub fn evolution(
        mut self,
        from: MonsterId,
        to: MonsterId,
        kind: EvolutionKind,
        materials: &[MonsterId],
    ) -> Self {
        self.catalog.evolutions.push(Evolution {
            from,
            to,
            kind,
            materials: materials.to_vec(),
        });
        self
    }

    pub fn transform(mut self, from: MonsterId, to: MonsterId) -> Self {
        self.catalog.transforms.push(Transform { from, to });
        self
    }

    /// Exchange contract that started a day ago; `permanent` leaves it open-ended
    pub fn exchange(self, target: MonsterId, required: &[MonsterId], permanent: bool) -> Self {
        let start = Utc::now() - Duration::days(1);
        let end = (!permanent).then(|| Utc::now() + Duration::days(30));
        self.exchange_between(target, required, start, end)
    }

    /// Exchange contract that closed a day ago
    pub fn expired_exchange(self, target: MonsterId, required: &[MonsterId]) -> Self {
        let start = Utc::now() - Duration::days(30);
        let end = Some(Utc::now() - Duration::days(1));
        self.exchange_between(target, required, start, end)
    }

    pub fn exchange_between(
        mut self,
        target: MonsterId,
        required: &[MonsterId],
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.catalog.exchanges.push(Exchange {
            target,
            required: required.to_vec(),
            server: Server::Na,
            start,
            end,
        });
        self
    }

    pub fn nickname(mut self, id: MonsterId, nickname: &str) -> Self {
        self.sheets.nicknames.push(NicknameOverride {
            monster_id: id,
            nickname: nickname.to_string(),
        });
        self
    }

    pub fn sheets(mut self, sheets: CuratorSheets) -> Self {
        self.sheets = sheets;
        self
    }

    pub fn catalog(&self) -> CatalogSnapshot {
        self.catalog.clone()
    }

    pub fn graph(&self) -> MonsterGraph {
        MonsterGraph::build(self.catalog()).expect("fixture catalog is consistent")
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::build(self.catalog(), &self.sheets).expect("fixture catalog is consistent")
    }
}

/// The Sonia tree: base 1230, evo 1231, awoken 1234 (needs 1240) and
/// reincarnated 1235, plus the material 1240 and the base's evo gem 1241.
pub fn sonia_catalog() -> CatalogBuilder {
    CatalogBuilder::new()
        .series(1, "Dragonbound", SeriesType::Regular)
        .monster(
            monster(1230, "Sonia")
                .attrs(Attribute::Fire, Some(Attribute::Dark))
                .types(&[MonsterType::Dragon])
                .series(1)
                .rarity(6)
                .rem()
                .evo_gem(1241),
        )
        .monster(
            monster(1231, "Goddess of Power, Sonia")
                .attrs(Attribute::Fire, Some(Attribute::Dark))
                .types(&[MonsterType::Dragon, MonsterType::God])
                .series(1)
                .rarity(7)
                .awakenings(&[21, 10]),
        )
        .monster(
            monster(1234, "Awoken Scarlet, Red Sonia")
                .attrs(Attribute::Fire, Some(Attribute::Dark))
                .types(&[MonsterType::Dragon, MonsterType::God])
                .series(1)
                .rarity(8)
                .awakenings(&[21, 21, 19])
                .inheritable(),
        )
        .monster(
            monster(1235, "Reincarnated Sonia, The Crimson Dragoness")
                .attrs(Attribute::Fire, Some(Attribute::Dark))
                .types(&[MonsterType::Dragon, MonsterType::God])
                .series(1)
                .rarity(8)
                .awakenings(&[21, 10, 27])
                .super_awakenings(&[56]),
        )
        .monster(
            monster(1240, "Flame Mask")
                .types(&[MonsterType::Evolve])
                .rarity(4)
                .farmable(),
        )
        .monster(
            monster(1241, "Sonia's Gem")
                .types(&[MonsterType::Evolve])
                .rarity(5),
        )
        .evolution(1230, 1231, EvolutionKind::Normal, &[])
        .evolution(1231, 1234, EvolutionKind::Normal, &[1240])
        .evolution(1231, 1235, EvolutionKind::Reincarnated, &[])
}
