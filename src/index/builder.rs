//! Index construction from a catalog graph plus curator sheets

use super::sheets::CuratorSheets;
use super::vocabulary::{self, STOP_WORDS, SUFFIXES};
use super::{MonsterIndex, MonsterTokens, LONG_MODIFIER_LEN};
use crate::catalog::{EvolutionKind, Monster, MonsterGraph, MonsterId, SeriesType};
use crate::text;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Build the index as of now
pub fn build_index(graph: &MonsterGraph, sheets: &CuratorSheets) -> MonsterIndex {
    build_index_at(graph, sheets, Utc::now())
}

/// Build the index with an explicit clock for exchange activity
pub fn build_index_at(
    graph: &MonsterGraph,
    sheets: &CuratorSheets,
    now: DateTime<Utc>,
) -> MonsterIndex {
    let mut builder = IndexBuilder {
        graph,
        now,
        builtin: vocabulary::builtin_modifier_words().collect(),
        tokens: BTreeMap::new(),
        multi_word: BTreeSet::new(),
        mwt_to_len: HashMap::new(),
        series_nicknames: BTreeMap::new(),
    };

    for monster in graph.get_all_monsters() {
        let mut tokens = MonsterTokens::default();
        builder.add_name_tokens(monster, &mut tokens);
        builder.tokens.insert(monster.id, tokens);
    }

    // only display-name words are shared across a tree, never ids
    builder.propagate_consistent_names(&sheets.consistent_name_trees);

    for monster in graph.get_all_monsters() {
        let modifiers = builder.modifiers_for(monster);
        if let Some(tokens) = builder.tokens.get_mut(&monster.id) {
            IndexBuilder::add_id_tokens(monster, tokens);
            tokens.modifiers = modifiers;
        }
    }

    builder.add_manual_tokens(sheets);
    builder.add_series_aliases(sheets);
    let replacements = builder.apply_replacements(sheets);
    builder.apply_overrides(sheets);

    builder.finish(replacements)
}

struct IndexBuilder<'a> {
    graph: &'a MonsterGraph,
    now: DateTime<Utc>,
    builtin: HashSet<&'static str>,
    tokens: BTreeMap<MonsterId, MonsterTokens>,
    multi_word: BTreeSet<Vec<String>>,
    mwt_to_len: HashMap<String, usize>,
    series_nicknames: BTreeMap<String, BTreeSet<u32>>,
}

impl<'a> IndexBuilder<'a> {
    /// Name and fluff tokens from the display names.
    ///
    /// With several comma-separated parts, the parts with the fewest words
    /// are the identifying ones and the rest is fluff. Stop words and words
    /// that are also built-in modifiers are always fluff.
    fn add_name_tokens(&self, monster: &Monster, tokens: &mut MonsterTokens) {
        let parts = text::name_parts(&monster.name_en);
        let fewest = parts.iter().map(Vec::len).min().unwrap_or(0);

        for part in &parts {
            let important = parts.len() == 1 || part.len() == fewest;
            for word in part {
                if !important || STOP_WORDS.contains(&word.as_str()) || self.builtin.contains(word.as_str())
                {
                    tokens.fluff.insert(word.clone());
                } else {
                    tokens.name.insert(word.clone());
                }
            }
        }

        let alternates = monster.alt_names.iter().chain(monster.name_ja.iter());
        for alt in alternates {
            for word in text::name_words(alt) {
                tokens.fluff.insert(word);
            }
        }

        let name = tokens.name.clone();
        tokens.fluff.retain(|w| !name.contains(w));
    }

    fn add_id_tokens(monster: &Monster, tokens: &mut MonsterTokens) {
        tokens.name.insert(monster.id.to_string());
        tokens.name.insert(monster.monster_no_na.to_string());
        if monster.monster_no_na != monster.monster_no_jp {
            tokens.name.insert(format!("na{}", monster.monster_no_na));
            tokens.name.insert(format!("jp{}", monster.monster_no_jp));
        }
    }

    fn modifiers_for(&self, monster: &Monster) -> BTreeSet<String> {
        let graph = self.graph;
        let id = monster.id;
        let mut mods = BTreeSet::new();
        let mut add = |words: &[&str]| {
            for w in words {
                mods.insert((*w).to_string());
            }
        };

        add(&[vocabulary::MONSTER]);

        let main = monster.attr1.code();
        add(&[main.to_string().as_str()]);
        add(monster.attr1.aliases());
        if let Some(sub) = monster.attr2 {
            add(&[format!("{}{}", main, sub.code()).as_str()]);
        }

        for t in &monster.types {
            add(t.aliases());
        }

        if graph.is_base(id) {
            add(vocabulary::BASE);
        } else {
            add(vocabulary::EVOLVED);
        }
        match graph.evolution_kind(id) {
            Some(EvolutionKind::Reversible) => add(vocabulary::REVERSIBLE),
            Some(EvolutionKind::Reincarnated) => add(vocabulary::REINCARNATED),
            Some(EvolutionKind::SuperReincarnated) => {
                add(vocabulary::REINCARNATED);
                add(vocabulary::SUPER_REINCARNATED);
            }
            Some(EvolutionKind::Pixel) => add(vocabulary::PIXEL),
            Some(EvolutionKind::Normal) | None => {}
        }
        if text::name_words(&monster.name_en).iter().any(|w| w == "awoken") {
            add(vocabulary::AWOKEN);
        }
        if monster.is_equip {
            add(vocabulary::EQUIP);
        }
        if !graph.is_transform_base(id) {
            add(vocabulary::TRANSFORM);
        }
        if graph.get_alt_ids(id).len() > 1 && graph.is_newest_in_tree(id) {
            add(vocabulary::NEWEST);
        }
        if graph.is_evo_gem(id) {
            add(vocabulary::EVO_GEM);
        }

        if graph.is_farmable_evo(id) {
            add(vocabulary::FARMABLE);
        }
        if graph.is_rem_evo(id) {
            add(vocabulary::RANDOMBOX);
        }
        if graph.is_exchange_target_at(id, self.now) {
            add(vocabulary::EXCHANGE);
        }
        if graph.is_permanent_exchange_evo(id) {
            add(vocabulary::PERMANENT_EXCHANGE);
        }
        if monster.is_inheritable {
            add(vocabulary::INHERITABLE);
        }
        if monster.on_na && !monster.on_jp {
            add(vocabulary::NA_ONLY);
        }
        if monster.on_jp && !monster.on_na {
            add(vocabulary::JP_ONLY);
        }
        match graph.series_type_of(monster) {
            Some(SeriesType::Collab) | Some(SeriesType::Ghcollab) => add(vocabulary::COLLAB),
            Some(SeriesType::Seasonal) => add(vocabulary::SEASONAL),
            Some(SeriesType::Event) => add(vocabulary::EVENT),
            _ => {}
        }
        add(&[format!("{}*", monster.rarity).as_str()]);

        for awakening in monster.normal_awakenings() {
            for alias in self.awakening_codes(awakening) {
                mods.insert(alias);
            }
        }
        for awakening in monster.super_awakenings() {
            for alias in self.awakening_codes(awakening) {
                mods.insert(format!("sa-{}", alias));
            }
        }

        mods
    }

    /// Built-in aliases, or the folded catalog name when there are none
    fn awakening_codes(&self, id: u32) -> Vec<String> {
        let aliases = vocabulary::awakening_aliases(id);
        if !aliases.is_empty() {
            return aliases.iter().map(|a| a.to_string()).collect();
        }
        self.graph
            .get_awakening(id)
            .map(|def| vec![text::name_words(&def.name).concat()])
            .unwrap_or_default()
    }

    fn propagate_consistent_names(&mut self, trees: &[MonsterId]) {
        for &member in trees {
            let base = self.graph.get_base_id(member);
            let Some(base_names) = self.tokens.get(&base).map(|t| t.name.clone()) else {
                continue;
            };
            for alt in self.graph.get_alt_ids(base) {
                if let Some(tokens) = self.tokens.get_mut(alt) {
                    tokens.name.extend(base_names.iter().cloned());
                    tokens.fluff.retain(|w| !base_names.contains(w));
                }
            }
        }
    }

    /// Register a curator phrase. Multi-word phrases yield the spaced and
    /// the joined form; both count as tokens of `words.len()` words.
    fn phrase_tokens(&mut self, phrase: &str) -> Vec<String> {
        let words = text::name_words(phrase);
        match words.len() {
            0 => Vec::new(),
            1 => words,
            n => {
                let spaced = words.join(" ");
                let joined = words.concat();
                self.mwt_to_len.insert(spaced.clone(), n);
                self.mwt_to_len.insert(joined.clone(), n);
                self.multi_word.insert(words);
                vec![spaced, joined]
            }
        }
    }

    fn add_manual_tokens(&mut self, sheets: &CuratorSheets) {
        for nick in &sheets.nicknames {
            let phrases = self.phrase_tokens(&nick.nickname);
            match self.tokens.get_mut(&nick.monster_id) {
                Some(tokens) => tokens.manual.extend(phrases),
                None => debug!("Nickname '{}' targets unknown monster {}", nick.nickname, nick.monster_id),
            }
        }

        for tree in &sheets.treenames {
            let phrases = self.phrase_tokens(&tree.name);
            for alt in self.graph.get_alt_ids(tree.monster_id) {
                if let Some(tokens) = self.tokens.get_mut(alt) {
                    tokens.manual.extend(phrases.iter().cloned());
                }
            }
        }
    }

    fn add_series_aliases(&mut self, sheets: &CuratorSheets) {
        for alias in &sheets.series_aliases {
            let phrases = self.phrase_tokens(&alias.alias);
            for phrase in &phrases {
                self.series_nicknames
                    .entry(phrase.clone())
                    .or_default()
                    .insert(alias.series_id);
            }
            let members: Vec<MonsterId> = self
                .graph
                .get_all_monsters()
                .filter(|m| m.series_id == Some(alias.series_id))
                .map(|m| m.id)
                .collect();
            for id in members {
                if let Some(tokens) = self.tokens.get_mut(&id) {
                    tokens.modifiers.extend(phrases.iter().cloned());
                }
            }
        }
    }

    fn apply_replacements(&mut self, sheets: &CuratorSheets) -> Vec<(BTreeSet<String>, BTreeSet<String>)> {
        let rules: Vec<(BTreeSet<String>, BTreeSet<String>)> = sheets
            .replacements
            .iter()
            .map(|r| {
                let when = r.when.iter().map(|w| text::fold(w)).collect();
                let add = r.add.iter().map(|w| text::fold(w)).collect();
                (when, add)
            })
            .filter(|(when, _): &(BTreeSet<String>, BTreeSet<String>)| !when.is_empty())
            .collect();

        for tokens in self.tokens.values_mut() {
            for (when, add) in &rules {
                if when.is_subset(&tokens.modifiers) {
                    tokens.modifiers.extend(add.iter().cloned());
                }
            }
        }
        rules
    }

    fn apply_overrides(&mut self, sheets: &CuratorSheets) {
        for ov in &sheets.modifier_overrides {
            let Some(tokens) = self.tokens.get_mut(&ov.monster_id) else {
                debug!("Modifier override targets unknown monster {}", ov.monster_id);
                continue;
            };
            for word in &ov.add {
                tokens.modifiers.insert(text::fold(word));
            }
            for word in &ov.remove {
                tokens.modifiers.remove(&text::fold(word));
            }
        }
    }

    fn finish(self, replacements: Vec<(BTreeSet<String>, BTreeSet<String>)>) -> MonsterIndex {
        let mut index = MonsterIndex::default();

        for (&id, tokens) in &self.tokens {
            for t in &tokens.name {
                index.name_tokens.entry(t.clone()).or_default().insert(id);
            }
            for t in &tokens.fluff {
                index.fluff_tokens.entry(t.clone()).or_default().insert(id);
            }
            for t in &tokens.manual {
                index.manual.entry(t.clone()).or_default().insert(id);
            }
            index.all_modifiers.extend(tokens.modifiers.iter().cloned());
        }

        let names: BTreeSet<String> = index
            .name_tokens
            .keys()
            .chain(index.fluff_tokens.keys())
            .chain(index.manual.keys())
            .cloned()
            .collect();
        index.all_name_tokens = names.into_iter().collect();

        index.long_modifiers = index
            .all_modifiers
            .iter()
            .filter(|m| m.chars().count() >= LONG_MODIFIER_LEN)
            .cloned()
            .collect();

        let mut multi_word: Vec<Vec<String>> = self.multi_word.into_iter().collect();
        multi_word.sort_by(|a, b| {
            let a_chars: usize = a.iter().map(String::len).sum();
            let b_chars: usize = b.iter().map(String::len).sum();
            b.len()
                .cmp(&a.len())
                .then(b_chars.cmp(&a_chars))
                .then_with(|| a.cmp(b))
        });
        index.multi_word_tokens = multi_word;
        index.mwt_to_len = self.mwt_to_len;
        index.suffixes = SUFFIXES.iter().map(|s| s.to_string()).collect();
        index.replacement_tokens = replacements;
        index.series_nicknames = self.series_nicknames;

        for (id, aliases) in vocabulary::AWAKENING_ALIASES {
            for alias in *aliases {
                index.awakening_aliases.insert(alias.to_string(), *id);
            }
        }
        let mut defs: Vec<_> = self.graph.all_awakenings().collect();
        defs.sort_by_key(|def| def.id);
        for def in defs {
            let folded = text::name_words(&def.name).concat();
            if !folded.is_empty() {
                index.awakening_aliases.entry(folded).or_insert(def.id);
            }
        }

        index.tokens = self.tokens.into_iter().collect();

        info!(
            "Built monster index: {} monsters, {} name tokens, {} modifiers, {} multi-word tokens",
            index.tokens.len(),
            index.all_name_tokens.len(),
            index.all_modifiers.len(),
            index.multi_word_tokens.len()
        );
        index
    }
}
