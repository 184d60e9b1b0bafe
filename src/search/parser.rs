//! Query Parser & Preprocessor
//!
//! Normalizes a raw query, pulls out `--flag` settings, protects quoted and
//! bracketed pieces from splitting, and tokenizes on whitespace.

use crate::catalog::Server;
use crate::config::FinderConfig;
use crate::text;
use std::collections::BTreeMap;

/// Placeholder for spaces that must not split a token
const SENTINEL: char = '\0';

/// Out-of-band `--name` / `--name:{value}` flags found in a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySettings {
    pub flags: BTreeMap<String, Option<String>>,
}

impl QuerySettings {
    fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn server(&self) -> Option<Server> {
        if let Some(Some(value)) = self.flags.get("server") {
            if let Ok(server) = value.parse() {
                return Some(server);
            }
        }
        if self.has("na") {
            Some(Server::Na)
        } else if self.has("jp") {
            Some(Server::Jp)
        } else {
            None
        }
    }

    pub fn na_prio(&self) -> Option<bool> {
        toggle(self.has("naprio"), self.has("nonaprio"))
    }

    pub fn ormod_prio(&self) -> Option<bool> {
        toggle(self.has("ormodprio"), self.has("noormodprio"))
    }

    /// The config with this query's overrides applied
    pub fn apply(&self, config: &FinderConfig) -> FinderConfig {
        let mut effective = config.clone();
        if let Some(server) = self.server() {
            effective.server = server;
        }
        if let Some(na_prio) = self.na_prio() {
            effective.na_prio = na_prio;
        }
        if let Some(ormod_prio) = self.ormod_prio() {
            effective.ormod_prio = ormod_prio;
        }
        effective
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

/// Parsed and processed search query
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// Original unmodified query
    pub original: String,
    /// Folded text the tokens were cut from
    pub normalized: String,
    /// Raw tokens, before multi-word merging
    pub tokens: Vec<String>,
    pub settings: QuerySettings,
}

/// Query parser and preprocessor
pub struct QueryParser;

impl QueryParser {
    /// Parse a search query into its components
    pub fn parse(query: &str) -> ParsedQuery {
        let stripped = Self::strip_comments(query);
        let normalized: String = text::fold(&stripped).chars().filter(|&c| c != ',').collect();
        let requoted = Self::requote_single_quotes(&normalized);
        let protected = Self::protect_spaces(&requoted);

        let mut settings = QuerySettings::default();
        let mut tokens = Vec::new();
        for piece in protected.split_whitespace() {
            let piece = piece.replace(SENTINEL, " ");
            if let Some((name, value)) = Self::parse_flag(&piece) {
                settings.flags.insert(name, value);
            } else {
                tokens.push(piece);
            }
        }

        ParsedQuery {
            original: query.to_string(),
            normalized,
            tokens,
            settings,
        }
    }

    /// Drop everything from `//` to the end of each line
    fn strip_comments(query: &str) -> String {
        query
            .lines()
            .map(|line| line.split("//").next().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Turn `'...'` into `"..."` when the quotes sit on token boundaries
    fn requote_single_quotes(query: &str) -> String {
        let chars: Vec<char> = query.chars().collect();
        let mut out: Vec<char> = chars.clone();
        let mut i = 0;
        while i < chars.len() {
            let at_start = chars[i] == '\'' && (i == 0 || chars[i - 1].is_whitespace());
            if at_start {
                let close = (i + 1..chars.len()).find(|&j| {
                    chars[j] == '\''
                        && j > i + 1
                        && (j + 1 == chars.len() || chars[j + 1].is_whitespace())
                });
                if let Some(j) = close {
                    if !chars[i + 1..j].iter().any(|&c| c == '"') {
                        out[i] = '"';
                        out[j] = '"';
                        i = j + 1;
                        continue;
                    }
                }
            }
            i += 1;
        }
        out.into_iter().collect()
    }

    /// Replace spaces inside quotes, parentheses and brackets with the sentinel
    fn protect_spaces(query: &str) -> String {
        let mut depth = 0usize;
        let mut in_quotes = false;
        query
            .chars()
            .map(|c| match c {
                '"' => {
                    in_quotes = !in_quotes;
                    c
                }
                '(' | '[' if !in_quotes => {
                    depth += 1;
                    c
                }
                ')' | ']' if !in_quotes => {
                    depth = depth.saturating_sub(1);
                    c
                }
                c if c.is_whitespace() && (in_quotes || depth > 0) => SENTINEL,
                c => c,
            })
            .collect()
    }

    /// `--name` or `--name:{value}` (braces optional)
    fn parse_flag(token: &str) -> Option<(String, Option<String>)> {
        let body = token.strip_prefix("--")?;
        if body.is_empty() {
            return None;
        }
        match body.split_once(':') {
            Some((name, value)) => {
                let value = value.trim_start_matches('{').trim_end_matches('}');
                Some((name.to_string(), Some(value.to_string())))
            }
            None => Some((body.to_string(), None)),
        }
    }
}
