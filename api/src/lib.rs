pub mod bracket;
pub mod client;
pub mod faceit;
pub mod graphql;
pub mod pandascore;
pub mod series;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Bracket domain types, independent of the PandaScore wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Match {
    pub id: u64,
    pub name: Option<String>,
    /// Back-references to the matches feeding this one. Empty for first-round matches.
    pub previous_matches: Vec<PreviousMatch>,
    /// 0–2 entries; slots fill in once feeder matches resolve.
    pub opponents: Vec<Opponent>,
    pub results: Vec<MatchResult>,
    pub status: MatchStatus,
    pub winner_id: Option<u64>,
    pub number_of_games: u8,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Match {
    /// True when any incoming reference is fed by the loser of another match.
    pub fn has_loser_feed(&self) -> bool {
        self.previous_matches.iter().any(|p| p.kind == FeedKind::Loser)
    }

    pub fn score_for(&self, team_id: u64) -> Option<u32> {
        self.results.iter().find(|r| r.team_id == team_id).map(|r| r.score)
    }

    pub fn winner(&self) -> Option<&Opponent> {
        let winner_id = self.winner_id?;
        self.opponents.iter().find(|o| o.id == winner_id)
    }

    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviousMatch {
    pub kind: FeedKind,
    pub match_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Winner,
    Loser,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Opponent {
    pub id: u64,
    pub name: String,
    pub acronym: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub team_id: u64,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    NotStarted,
    Running,
    Finished,
    Canceled,
}

impl MatchStatus {
    /// Unknown states ("postponed", missing) are treated as not started.
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => MatchStatus::Running,
            "finished" => MatchStatus::Finished,
            "canceled" | "cancelled" => MatchStatus::Canceled,
            _ => MatchStatus::NotStarted,
        }
    }
}

/// Matches sharing one computed depth on one side of the bracket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketRound {
    pub label: String, // "UB Semifinal", "LB Round 2", "Final" ...
    pub depth: u32,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedBracket {
    /// Ascending by depth.
    pub upper: Vec<BracketRound>,
    /// Ascending by depth. Empty for single-elimination brackets.
    pub lower: Vec<BracketRound>,
    pub grand_final: Option<Match>,
}

impl ParsedBracket {
    pub fn is_double_elimination(&self) -> bool {
        !self.lower.is_empty()
    }

    /// Every match id in the bracket: upper rounds, lower rounds, then the grand final.
    pub fn match_ids(&self) -> Vec<u64> {
        self.upper
            .iter()
            .chain(&self.lower)
            .flat_map(|r| r.matches.iter().map(|m| m.id))
            .chain(self.grand_final.as_ref().map(|m| m.id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Match statistics: one shape for all three upstream sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatColumn {
    Kills,
    Deaths,
    Assists,
    KdDiff,
    KdRatio,
    HsPercent,
    KrRatio,
    Mvps,
    Adr,
    Kast,
    Rating,
    TripleKills,
    QuadroKills,
    PentaKills,
}

impl StatColumn {
    pub fn key(&self) -> &'static str {
        match self {
            StatColumn::Kills => "kills",
            StatColumn::Deaths => "deaths",
            StatColumn::Assists => "assists",
            StatColumn::KdDiff => "kdDiff",
            StatColumn::KdRatio => "kdRatio",
            StatColumn::HsPercent => "hsPercent",
            StatColumn::KrRatio => "krRatio",
            StatColumn::Mvps => "mvps",
            StatColumn::Adr => "adr",
            StatColumn::Kast => "kast",
            StatColumn::Rating => "rating",
            StatColumn::TripleKills => "tripleKills",
            StatColumn::QuadroKills => "quadroKills",
            StatColumn::PentaKills => "pentaKills",
        }
    }

    /// Short column header for tables.
    pub fn label(&self) -> &'static str {
        match self {
            StatColumn::Kills => "K",
            StatColumn::Deaths => "D",
            StatColumn::Assists => "A",
            StatColumn::KdDiff => "+/-",
            StatColumn::KdRatio => "K/D",
            StatColumn::HsPercent => "HS%",
            StatColumn::KrRatio => "K/R",
            StatColumn::Mvps => "MVP",
            StatColumn::Adr => "ADR",
            StatColumn::Kast => "KAST",
            StatColumn::Rating => "Rating",
            StatColumn::TripleKills => "3K",
            StatColumn::QuadroKills => "4K",
            StatColumn::PentaKills => "5K",
        }
    }
}

/// One player on one map. Optional metrics stay `None` when the source doesn't provide them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPlayerStat {
    pub player_id: String,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kd_diff: i64,
    pub kd_ratio: f64,
    pub hs_percent: Option<f64>,
    pub kr_ratio: Option<f64>,
    pub mvps: Option<u32>,
    pub adr: Option<f64>,
    pub kast: Option<f64>,
    pub rating: Option<f64>,
    pub triple_kills: Option<u32>,
    pub quadro_kills: Option<u32>,
    pub penta_kills: Option<u32>,
}

impl NormalizedPlayerStat {
    /// Base record with the derived K/D fields filled in.
    pub fn new(player_id: impl Into<String>, name: impl Into<String>, kills: u32, deaths: u32, assists: u32) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            kills,
            deaths,
            assists,
            kd_diff: kd_diff(kills, deaths),
            kd_ratio: kd_ratio(kills, deaths),
            ..Default::default()
        }
    }
}

pub fn kd_diff(kills: u32, deaths: u32) -> i64 {
    i64::from(kills) - i64::from(deaths)
}

/// Kills per death; an undefeated player is rated by raw kill count.
pub fn kd_ratio(kills: u32, deaths: u32) -> f64 {
    if deaths > 0 {
        f64::from(kills) / f64::from(deaths)
    } else {
        f64::from(kills)
    }
}

pub fn hs_percent(headshots: u32, kills: u32) -> f64 {
    if kills > 0 {
        100.0 * f64::from(headshots) / f64::from(kills)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfScores {
    pub first_half: (u32, u32),
    pub second_half: (u32, u32),
    pub overtime: Option<(u32, u32)>,
}

/// A team's player rows split by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SidePlayers {
    pub ct: Vec<NormalizedPlayerStat>,
    pub t: Vec<NormalizedPlayerStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMapStats {
    pub name: String,
    /// 1-indexed position within the match.
    pub number: u32,
    pub team1_score: u32,
    pub team2_score: u32,
    pub team1_win: bool,
    pub team2_win: bool,
    pub halves: Option<HalfScores>,
    pub team1_players: Vec<NormalizedPlayerStat>,
    pub team2_players: Vec<NormalizedPlayerStat>,
    pub team1_sides: Option<SidePlayers>,
    pub team2_sides: Option<SidePlayers>,
}

impl NormalizedMapStats {
    pub fn players(&self, side: TeamSide) -> &[NormalizedPlayerStat] {
        match side {
            TeamSide::Team1 => &self.team1_players,
            TeamSide::Team2 => &self.team2_players,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMatchStats {
    pub team1: TeamRef,
    pub team2: TeamRef,
    pub maps: Vec<NormalizedMapStats>,
    /// Only columns this source actually populates. Consumers must not assume others.
    pub available_columns: Vec<StatColumn>,
    pub has_side_split: bool,
}

impl NormalizedMatchStats {
    pub fn has_column(&self, column: StatColumn) -> bool {
        self.available_columns.contains(&column)
    }

    /// The cross-map "Overall" rows for one team, sorted for display.
    pub fn overall(&self, side: TeamSide) -> Vec<NormalizedPlayerStat> {
        let mut rows = stats::aggregate(&self.maps, side);
        stats::sort_for_display(&mut rows, &self.available_columns);
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamSide {
    Team1,
    Team2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRef {
    pub id: Option<String>,
    pub name: String,
    pub logo: Option<String>,
}

impl TeamRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: Some(id.into()), name: name.into(), logo: None }
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

/// The two teams of a match, as known to the caller. Upstream rows are mapped onto these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamContext {
    pub team1: TeamRef,
    pub team2: TeamRef,
}

impl TeamContext {
    pub fn new(team1: TeamRef, team2: TeamRef) -> Self {
        Self { team1, team2 }
    }

    /// Resolve an upstream team id to a side. `None` when the id matches neither team.
    pub fn side_of(&self, team_id: &str) -> Option<TeamSide> {
        if self.team1.matches_id(team_id) {
            Some(TeamSide::Team1)
        } else if self.team2.matches_id(team_id) {
            Some(TeamSide::Team2)
        } else {
            None
        }
    }

    fn has_ids(&self) -> bool {
        self.team1.id.is_some() && self.team2.id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tournaments and series
// ---------------------------------------------------------------------------

/// Best first: S < A < ... < Unranked in `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    #[default]
    Unranked,
}

impl Tier {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" => Tier::S,
            "a" => Tier::A,
            "b" => Tier::B,
            "c" => Tier::C,
            "d" => Tier::D,
            _ => Tier::Unranked,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
            Tier::Unranked => "-",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Ongoing,
    Upcoming,
    Completed,
}

impl TournamentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Completed => "completed",
        }
    }
}

/// A tournament (one stage of a series), as listed by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TournamentSummary {
    pub id: u64,
    pub name: String,
    pub serie_id: Option<u64>,
    pub serie_name: Option<String>,
    pub league_name: String,
    pub league_image_url: Option<String>,
    pub tier: Tier,
    pub region: Option<String>,
    pub begin_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedTournament {
    pub tournament: TournamentSummary,
    pub status: TournamentStatus,
    pub region_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesGroupEvent {
    /// The serie id, or the tournament id for standalone tournaments.
    pub id: u64,
    /// Set when `id` is a tournament id rather than a serie id.
    pub is_standalone: bool,
    pub name: String,
    pub league_image_url: Option<String>,
    pub tier: Tier,
    pub region_match: bool,
    pub begin_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: TournamentStatus,
    pub stage_count: usize,
    pub tournament_ids: Vec<u64>,
}
