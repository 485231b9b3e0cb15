use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "csdash - Counter-Strike brackets, match stats and series")]
pub struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[command(rename_all = "lower_case")]
pub enum Command {
    /// Rebuild a tournament bracket into upper/lower rounds and the grand final
    Bracket {
        /// PandaScore tournament id
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        tournament: Option<u64>,
        /// Bracket JSON as returned by /tournaments/{id}/brackets
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Per-map and overall player stats for one match
    Stats {
        #[arg(value_enum)]
        source: StatsSource,
        /// Upstream match id
        #[arg(short, long = "match", conflicts_with = "file", required_unless_present = "file")]
        match_id: Option<String>,
        /// Raw stats payload saved from the source
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        teams: TeamArgs,
        #[arg(long)]
        json: bool,
    },
    /// Group tournaments into series events, ongoing first
    Series {
        /// Tournament list JSON; fetches running, upcoming and past lists when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Region flagged as local
        #[arg(short, long, default_value = esports_api::series::DEFAULT_REGION)]
        region: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSource {
    Faceit,
    Pandascore,
    Graphql,
}

/// The two teams as the caller knows them. Upstream ids are matched against these.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TeamArgs {
    #[arg(long)]
    pub team1_id: Option<String>,
    #[arg(long)]
    pub team1_name: Option<String>,
    #[arg(long)]
    pub team2_id: Option<String>,
    #[arg(long)]
    pub team2_name: Option<String>,
}
