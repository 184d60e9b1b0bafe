//! CLI mode implementation
//!
//! Subcommands run one query and print JSON; with no subcommand the binary
//! serves JSON-line requests on stdio.

use clap::{Args, Parser, Subcommand};
use find_monster::catalog::{MonsterId, Server};
use find_monster::config::FinderConfig;
use std::path::PathBuf;

/// find-monster CLI
#[derive(Parser, Debug)]
#[command(name = "find-monster")]
#[command(about = "Fuzzy monster lookup over a catalog snapshot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Catalog snapshot (JSON)
    #[arg(long, global = true, env = "FIND_MONSTER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Curator sheets (JSON)
    #[arg(long, global = true, env = "FIND_MONSTER_SHEETS")]
    pub sheets: Option<PathBuf>,

    /// Server view: combined, na or jp
    #[arg(long, global = true)]
    pub server: Option<Server>,

    /// Prefer monsters released on NA on ties
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub na_prio: Option<bool>,

    /// Prefer earlier branches of `[...]` tokens
    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub ormod_prio: Option<bool>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the best match
    Find(QueryArgs),
    /// Print every match, best first
    FindAll(FindAllArgs),
    /// Print the best match with its scoring map and candidate set
    Debug(QueryArgs),
    /// Print a monster's name, fluff, manual and modifier tokens
    Tokens(TokensArgs),
}

/// Query words; negated tokens such as `-awoken` are accepted as-is
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
    pub query: Vec<String>,
}

impl QueryArgs {
    pub fn text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Args, Debug, Clone)]
pub struct FindAllArgs {
    /// Maximum number of results
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TokensArgs {
    /// Monster id
    pub id: MonsterId,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply(&self, mut config: FinderConfig) -> FinderConfig {
        if let Some(server) = self.server {
            config.server = server;
        }
        if let Some(na_prio) = self.na_prio {
            config.na_prio = na_prio;
        }
        if let Some(ormod_prio) = self.ormod_prio {
            config.ormod_prio = ormod_prio;
        }
        config
    }
}
