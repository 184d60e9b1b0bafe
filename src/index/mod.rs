//! Token index over a catalog snapshot
//!
//! Built once per catalog load by [`builder::build_index`] and read-only
//! afterwards. Each monster owns four token sets (name, fluff, manual,
//! modifiers); the global tables below are derived from them.

pub mod builder;
pub mod sheets;
pub mod vocabulary;

use crate::catalog::{AwakeningId, MonsterId, SeriesId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use builder::build_index;
pub use sheets::{load_sheets, CuratorSheets};

/// Modifiers at least this long may be matched fuzzily from a prefix position
pub const LONG_MODIFIER_LEN: usize = 8;

/// The four token sets of one monster
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonsterTokens {
    pub name: BTreeSet<String>,
    pub fluff: BTreeSet<String>,
    pub manual: BTreeSet<String>,
    pub modifiers: BTreeSet<String>,
}

static EMPTY_IDS: BTreeSet<MonsterId> = BTreeSet::new();

#[derive(Debug, Clone, Default)]
pub struct MonsterIndex {
    pub(crate) tokens: HashMap<MonsterId, MonsterTokens>,
    pub(crate) name_tokens: HashMap<String, BTreeSet<MonsterId>>,
    pub(crate) fluff_tokens: HashMap<String, BTreeSet<MonsterId>>,
    pub(crate) manual: HashMap<String, BTreeSet<MonsterId>>,
    pub(crate) all_name_tokens: Vec<String>,
    pub(crate) all_modifiers: BTreeSet<String>,
    pub(crate) long_modifiers: Vec<String>,
    pub(crate) multi_word_tokens: Vec<Vec<String>>,
    pub(crate) mwt_to_len: HashMap<String, usize>,
    pub(crate) suffixes: BTreeSet<String>,
    pub(crate) replacement_tokens: Vec<(BTreeSet<String>, BTreeSet<String>)>,
    pub(crate) series_nicknames: BTreeMap<String, BTreeSet<SeriesId>>,
    pub(crate) awakening_aliases: HashMap<String, AwakeningId>,
}

impl MonsterIndex {
    pub fn tokens_for(&self, id: MonsterId) -> Option<&MonsterTokens> {
        self.tokens.get(&id)
    }

    pub fn modifiers_of(&self, id: MonsterId) -> Option<&BTreeSet<String>> {
        self.tokens.get(&id).map(|t| &t.modifiers)
    }

    pub fn name_token_monsters(&self, token: &str) -> &BTreeSet<MonsterId> {
        self.name_tokens.get(token).unwrap_or(&EMPTY_IDS)
    }

    pub fn fluff_token_monsters(&self, token: &str) -> &BTreeSet<MonsterId> {
        self.fluff_tokens.get(token).unwrap_or(&EMPTY_IDS)
    }

    pub fn manual_token_monsters(&self, token: &str) -> &BTreeSet<MonsterId> {
        self.manual.get(token).unwrap_or(&EMPTY_IDS)
    }

    /// Whether curators assigned this token to any monster
    pub fn has_manual_entry(&self, token: &str) -> bool {
        self.manual.contains_key(token)
    }

    /// Every name, fluff and manual token, sorted
    pub fn all_name_tokens(&self) -> &[String] {
        &self.all_name_tokens
    }

    pub fn is_name_token(&self, token: &str) -> bool {
        self.all_name_tokens
            .binary_search_by(|t| t.as_str().cmp(token))
            .is_ok()
    }

    pub fn all_modifiers(&self) -> &BTreeSet<String> {
        &self.all_modifiers
    }

    pub fn is_modifier(&self, token: &str) -> bool {
        self.all_modifiers.contains(token)
    }

    pub fn long_modifiers(&self) -> &[String] {
        &self.long_modifiers
    }

    /// Registered phrases, longest first (word count, then characters)
    pub fn multi_word_tokens(&self) -> &[Vec<String>] {
        &self.multi_word_tokens
    }

    /// Word count of a registered multi-word token, in either joined form
    pub fn mwt_len(&self, token: &str) -> Option<usize> {
        self.mwt_to_len.get(token).copied()
    }

    pub fn suffixes(&self) -> &BTreeSet<String> {
        &self.suffixes
    }

    pub fn replacement_tokens(&self) -> &[(BTreeSet<String>, BTreeSet<String>)] {
        &self.replacement_tokens
    }

    pub fn series_for_nickname(&self, nickname: &str) -> Option<&BTreeSet<SeriesId>> {
        self.series_nicknames.get(nickname)
    }

    pub fn resolve_awakening(&self, alias: &str) -> Option<AwakeningId> {
        self.awakening_aliases.get(alias).copied()
    }
}
