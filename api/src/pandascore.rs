/// PandaScore REST wire types: serde shapes for deserializing PandaScore responses.
/// These map to our clean domain types via the From impls in client.rs, and the
/// per-game player stats feed the normalizer in stats.rs.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Bracket  (GET /tournaments/{id}/brackets)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsMatch {
    pub id: u64,
    pub name: Option<String>,
    #[serde(default)]
    pub previous_matches: Vec<PsPreviousMatch>,
    #[serde(default)]
    pub opponents: Vec<PsOpponentSlot>,
    #[serde(default)]
    pub results: Vec<PsResult>,
    pub status: Option<String>, // "not_started" | "running" | "finished" | "canceled" | "postponed"
    pub winner_id: Option<u64>,
    pub number_of_games: Option<u8>,
    pub scheduled_at: Option<String>, // ISO 8601
    pub begin_at: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsPreviousMatch {
    #[serde(rename = "type")]
    pub kind: String, // "winner" | "loser"
    pub match_id: u64,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsOpponentSlot {
    #[serde(rename = "type")]
    pub kind: Option<String>, // "Team" | "Player"
    pub opponent: Option<PsTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTeam {
    pub id: u64,
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsResult {
    pub team_id: Option<u64>,
    pub score: Option<u32>,
}

// ---------------------------------------------------------------------------
// Tournaments  (GET /csgo/tournaments/{running,upcoming,past})
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTournament {
    pub id: u64,
    pub name: Option<String>,
    pub serie_id: Option<u64>,
    pub serie: Option<PsSerie>,
    pub league: Option<PsLeague>,
    pub tier: Option<String>, // "s" | "a" | "b" | "c" | "d" | "unranked"
    pub region: Option<String>,
    pub begin_at: Option<String>,
    pub end_at: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsSerie {
    pub id: u64,
    pub name: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsLeague {
    pub id: u64,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Games with player stats  (GET /csgo/matches/{id}/games)
// ---------------------------------------------------------------------------

/// The games of one match. Unplayed games come back with no team rows.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(transparent)]
pub struct GamesPayload {
    pub games: Vec<PsGame>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsGame {
    pub id: u64,
    pub position: Option<u32>,
    pub status: Option<String>,
    pub map: Option<PsMap>,
    pub winner: Option<PsGameWinner>,
    #[serde(default)]
    pub teams: Vec<PsGameTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsMap {
    pub id: Option<u64>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsGameWinner {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsGameTeam {
    pub team: Option<PsTeam>,
    pub score: Option<u32>,
    #[serde(default)]
    pub players: Vec<PsGamePlayer>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsGamePlayer {
    pub player: Option<PsPlayer>,
    #[serde(flatten)]
    pub stats: PsPlayerStats,
    pub counter_terrorists: Option<PsPlayerStats>,
    pub terrorists: Option<PsPlayerStats>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsPlayer {
    pub id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsPlayerStats {
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub assists: Option<u32>,
    pub headshots: Option<u32>,
    pub adr: Option<f64>,
    pub kast: Option<f64>,
    pub rating: Option<f64>,
}
