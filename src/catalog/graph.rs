//! Read model over the catalog: monsters plus their evolution,
//! transformation, material, evo-gem and exchange relationships.
//!
//! Nodes live in a map keyed by id and carry adjacency sets. Base monsters
//! and alt-form lists are computed once at build time so the query path only
//! does lookups.

use super::types::*;
use crate::error::FindError;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone)]
struct Node {
    /// Index into `evolutions` of the edge that produces this monster
    prev_evo: Option<usize>,
    next_evos: BTreeSet<MonsterId>,
    transforms_to: BTreeSet<MonsterId>,
    transforms_from: BTreeSet<MonsterId>,
    material_of: BTreeSet<MonsterId>,
    gem_of: Option<MonsterId>,
    exchange_from: Vec<usize>,
    exchange_for: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct MonsterGraph {
    monsters: BTreeMap<MonsterId, Monster>,
    nodes: HashMap<MonsterId, Node>,
    evolutions: Vec<Evolution>,
    exchanges: Vec<Exchange>,
    series: HashMap<SeriesId, Series>,
    awakenings: HashMap<AwakeningId, AwakeningDef>,
    base_ids: HashMap<MonsterId, MonsterId>,
    alt_ids: HashMap<MonsterId, Vec<MonsterId>>,
    evo_depth: HashMap<MonsterId, u32>,
}

impl MonsterGraph {
    /// Build the graph, rejecting snapshots with dangling references
    pub fn build(snapshot: CatalogSnapshot) -> Result<Self, FindError> {
        let CatalogSnapshot {
            monsters: monster_list,
            awakenings,
            series,
            evolutions,
            transforms,
            exchanges,
        } = snapshot;

        let series: HashMap<SeriesId, Series> = series.into_iter().map(|s| (s.id, s)).collect();
        let awakenings: HashMap<AwakeningId, AwakeningDef> =
            awakenings.into_iter().map(|a| (a.id, a)).collect();

        let mut monsters = BTreeMap::new();
        for monster in monster_list {
            if let Some(series_id) = monster.series_id {
                if !series.contains_key(&series_id) {
                    return Err(FindError::UnknownSeries {
                        id: series_id,
                        monster: monster.id,
                    });
                }
            }
            if let Some(slot) = monster
                .awakenings
                .iter()
                .find(|slot| !awakenings.contains_key(&slot.awakening_id))
            {
                return Err(FindError::UnknownAwakening {
                    id: slot.awakening_id,
                    monster: monster.id,
                });
            }
            let id = monster.id;
            if monsters.insert(id, monster).is_some() {
                return Err(FindError::DuplicateMonster(id));
            }
        }

        let check = |id: MonsterId, context: String| -> Result<(), FindError> {
            if monsters.contains_key(&id) {
                Ok(())
            } else {
                Err(FindError::UnknownMonster { id, context })
            }
        };

        let mut nodes: HashMap<MonsterId, Node> =
            monsters.keys().map(|&id| (id, Node::default())).collect();

        for monster in monsters.values() {
            if let Some(gem) = monster.evo_gem_id {
                check(gem, format!("evo gem of {}", monster.id))?;
            }
        }
        for monster in monsters.values() {
            if let Some(gem) = monster.evo_gem_id {
                if let Some(node) = nodes.get_mut(&gem) {
                    node.gem_of = Some(monster.id);
                }
            }
        }

        for (idx, evo) in evolutions.iter().enumerate() {
            let context = format!("evolution {} -> {}", evo.from, evo.to);
            check(evo.from, context.clone())?;
            check(evo.to, context.clone())?;
            for &mat in &evo.materials {
                check(mat, context.clone())?;
            }

            if let Some(node) = nodes.get_mut(&evo.to) {
                match node.prev_evo {
                    Some(existing) if evolutions[existing].from <= evo.from => {
                        warn!(
                            "Monster {} has several evolution sources; keeping {}",
                            evo.to, evolutions[existing].from
                        );
                    }
                    _ => node.prev_evo = Some(idx),
                }
            }
            if let Some(node) = nodes.get_mut(&evo.from) {
                node.next_evos.insert(evo.to);
            }
            for &mat in &evo.materials {
                if let Some(node) = nodes.get_mut(&mat) {
                    node.material_of.insert(evo.to);
                }
            }
        }

        for t in &transforms {
            let context = format!("transform {} -> {}", t.from, t.to);
            check(t.from, context.clone())?;
            check(t.to, context)?;
            if let Some(node) = nodes.get_mut(&t.from) {
                node.transforms_to.insert(t.to);
            }
            if let Some(node) = nodes.get_mut(&t.to) {
                node.transforms_from.insert(t.from);
            }
        }

        for (idx, ex) in exchanges.iter().enumerate() {
            let context = format!("exchange for {}", ex.target);
            check(ex.target, context.clone())?;
            for &req in &ex.required {
                check(req, context.clone())?;
            }
            if let Some(node) = nodes.get_mut(&ex.target) {
                node.exchange_from.push(idx);
            }
            for &req in &ex.required {
                if let Some(node) = nodes.get_mut(&req) {
                    node.exchange_for.push(idx);
                }
            }
        }

        let mut graph = Self {
            monsters,
            nodes,
            evolutions,
            exchanges,
            series,
            awakenings,
            base_ids: HashMap::new(),
            alt_ids: HashMap::new(),
            evo_depth: HashMap::new(),
        };
        graph.compute_trees();

        debug!(
            "Built monster graph: {} monsters, {} trees",
            graph.monsters.len(),
            graph.alt_ids.len()
        );
        Ok(graph)
    }

    fn compute_trees(&mut self) {
        let ids: Vec<MonsterId> = self.monsters.keys().copied().collect();
        for &id in &ids {
            let base = self.walk_to_base(id);
            self.base_ids.insert(id, base);
            let depth = self.walk_evo_depth(id);
            self.evo_depth.insert(id, depth);
        }

        let bases: BTreeSet<MonsterId> = self.base_ids.values().copied().collect();
        for base in bases {
            let tree = self.walk_tree(base);
            self.alt_ids.insert(base, tree);
        }
    }

    /// Walk back to the tree root.
    ///
    /// Each step prefers a transform source with a smaller id, then the
    /// evolution source. Revisiting a node means a cycle; the smallest id
    /// seen on the walk is the base.
    fn walk_to_base(&self, id: MonsterId) -> MonsterId {
        let mut cur = id;
        let mut seen = BTreeSet::new();
        loop {
            if !seen.insert(cur) {
                return seen.first().copied().unwrap_or(cur);
            }
            let Some(node) = self.nodes.get(&cur) else {
                return cur;
            };
            if let Some(&prev) = node.transforms_from.first() {
                if prev < cur {
                    cur = prev;
                    continue;
                }
            }
            if let Some(idx) = node.prev_evo {
                cur = self.evolutions[idx].from;
                continue;
            }
            return cur;
        }
    }

    fn walk_evo_depth(&self, id: MonsterId) -> u32 {
        let mut depth = 0;
        let mut cur = id;
        let mut seen = BTreeSet::from([id]);
        while let Some(prev) = self.prev_evo_id(cur) {
            if !seen.insert(prev) {
                break;
            }
            depth += 1;
            cur = prev;
        }
        depth
    }

    /// Pre-order walk from a base along evolutions and transforms, children in id order
    fn walk_tree(&self, base: MonsterId) -> Vec<MonsterId> {
        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![base];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(node) = self.nodes.get(&id) {
                let children: BTreeSet<MonsterId> = node
                    .next_evos
                    .iter()
                    .chain(node.transforms_to.iter())
                    .copied()
                    .filter(|c| !seen.contains(c))
                    .collect();
                stack.extend(children.into_iter().rev());
            }
        }
        order
    }

    pub fn get_monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn get_all_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    pub fn get_series(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(&id)
    }

    pub fn series_of(&self, monster: &Monster) -> Option<&Series> {
        monster.series_id.and_then(|id| self.series.get(&id))
    }

    pub fn series_type_of(&self, monster: &Monster) -> Option<SeriesType> {
        self.series_of(monster).and_then(|s| s.series_type)
    }

    pub fn get_awakening(&self, id: AwakeningId) -> Option<&AwakeningDef> {
        self.awakenings.get(&id)
    }

    pub fn all_awakenings(&self) -> impl Iterator<Item = &AwakeningDef> {
        self.awakenings.values()
    }

    pub fn get_base_id(&self, id: MonsterId) -> MonsterId {
        self.base_ids.get(&id).copied().unwrap_or(id)
    }

    pub fn get_base_monster<'a>(&'a self, monster: &'a Monster) -> &'a Monster {
        self.get_monster(self.get_base_id(monster.id))
            .unwrap_or(monster)
    }

    /// Every member of the monster's tree, base first, in a stable order
    pub fn get_alt_ids(&self, id: MonsterId) -> &[MonsterId] {
        self.alt_ids
            .get(&self.get_base_id(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn prev_evo_id(&self, id: MonsterId) -> Option<MonsterId> {
        self.nodes
            .get(&id)
            .and_then(|n| n.prev_evo)
            .map(|idx| self.evolutions[idx].from)
    }

    pub fn evolution_kind(&self, id: MonsterId) -> Option<EvolutionKind> {
        self.nodes
            .get(&id)
            .and_then(|n| n.prev_evo)
            .map(|idx| self.evolutions[idx].kind)
    }

    pub fn transforms_to(&self, id: MonsterId) -> impl Iterator<Item = MonsterId> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.transforms_to.iter().copied())
    }

    pub fn transforms_from(&self, id: MonsterId) -> impl Iterator<Item = MonsterId> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.transforms_from.iter().copied())
    }

    /// Monsters whose evolution consumes this one
    pub fn material_of(&self, id: MonsterId) -> impl Iterator<Item = MonsterId> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.material_of.iter().copied())
    }

    /// Materials consumed to evolve into this monster
    pub fn get_evo_materials(&self, id: MonsterId) -> &[MonsterId] {
        self.nodes
            .get(&id)
            .and_then(|n| n.prev_evo)
            .map(|idx| self.evolutions[idx].materials.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_evo_gem(&self, monster: &Monster) -> Option<&Monster> {
        monster.evo_gem_id.and_then(|id| self.get_monster(id))
    }

    /// The monster this one is the evo gem of
    pub fn evo_gem_of(&self, id: MonsterId) -> Option<MonsterId> {
        self.nodes.get(&id).and_then(|n| n.gem_of)
    }

    pub fn is_evo_gem(&self, id: MonsterId) -> bool {
        self.evo_gem_of(id).is_some()
    }

    /// Contracts that produce this monster
    pub fn exchange_from(&self, id: MonsterId) -> impl Iterator<Item = &Exchange> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(move |n| n.exchange_from.iter().map(move |&i| &self.exchanges[i]))
    }

    /// Contracts that consume this monster
    pub fn exchange_for(&self, id: MonsterId) -> impl Iterator<Item = &Exchange> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(move |n| n.exchange_for.iter().map(move |&i| &self.exchanges[i]))
    }

    /// Some contract producing this monster is open at `at`
    pub fn is_exchange_target_at(&self, id: MonsterId, at: DateTime<Utc>) -> bool {
        self.exchange_from(id).any(|ex| ex.is_active_at(at))
    }

    /// The monster followed by its evolution ancestors, nearest first
    pub fn evo_chain(&self, id: MonsterId) -> Vec<MonsterId> {
        let mut chain = vec![id];
        let mut cur = id;
        while let Some(prev) = self.prev_evo_id(cur) {
            if chain.contains(&prev) {
                break;
            }
            chain.push(prev);
            cur = prev;
        }
        chain
    }

    pub fn is_base(&self, id: MonsterId) -> bool {
        self.get_base_id(id) == id
    }

    /// No smaller-id monster transforms into this one
    pub fn is_transform_base(&self, id: MonsterId) -> bool {
        self.transforms_from(id).all(|from| from > id)
    }

    pub fn is_reincarnated(&self, id: MonsterId) -> bool {
        matches!(
            self.evolution_kind(id),
            Some(EvolutionKind::Reincarnated) | Some(EvolutionKind::SuperReincarnated)
        )
    }

    pub fn is_farmable_evo(&self, id: MonsterId) -> bool {
        self.evo_chain(id)
            .iter()
            .filter_map(|m| self.get_monster(*m))
            .any(|m| m.is_farmable)
    }

    pub fn is_rem_evo(&self, id: MonsterId) -> bool {
        self.evo_chain(id)
            .iter()
            .filter_map(|m| self.get_monster(*m))
            .any(|m| m.in_randombox())
    }

    pub fn is_permanent_exchange_evo(&self, id: MonsterId) -> bool {
        self.evo_chain(id)
            .iter()
            .any(|m| self.exchange_from(*m).any(Exchange::is_permanent))
    }

    pub fn evo_depth(&self, id: MonsterId) -> u32 {
        self.evo_depth.get(&id).copied().unwrap_or(0)
    }

    /// `max(base rarity + evolution depth, own rarity)`
    pub fn adjusted_rarity(&self, monster: &Monster) -> u32 {
        let base = self.get_base_monster(monster);
        (base.rarity + self.evo_depth(monster.id)).max(monster.rarity)
    }

    /// Highest id in the tree, i.e. the newest form
    pub fn is_newest_in_tree(&self, id: MonsterId) -> bool {
        self.get_alt_ids(id).iter().max() == Some(&id)
    }
}
