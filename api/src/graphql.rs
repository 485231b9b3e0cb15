/// Wire types for the GraphQL stats API.
/// Player stats come back flat (one row per player per game) and are joined
/// against the games list by `gameId` / `teamId` in stats.rs.
use serde::{Deserialize, Serialize};

pub const MATCH_STATS_QUERY: &str = r#"
query MatchStats($matchId: ID!) {
  match(id: $matchId) {
    games { id number mapName winnerTeamId teamScores { teamId score } }
    playerStats { gameId teamId playerId playerName kills deaths assists headshots adr rating }
  }
}
"#;

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize, Default)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct MatchStatsData {
    #[serde(rename = "match")]
    pub match_stats: Option<PlayerStatsPayload>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsPayload {
    #[serde(default)]
    pub games: Vec<GqlGame>,
    #[serde(default)]
    pub player_stats: Vec<GqlPlayerGameStat>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GqlGame {
    pub id: String,
    pub number: Option<u32>,
    pub map_name: Option<String>,
    pub winner_team_id: Option<String>,
    #[serde(default)]
    pub team_scores: Vec<GqlTeamScore>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GqlTeamScore {
    pub team_id: String,
    pub score: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GqlPlayerGameStat {
    pub game_id: String,
    pub team_id: String,
    pub player_id: String,
    pub player_name: Option<String>,
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub assists: Option<u32>,
    pub headshots: Option<u32>,
    pub adr: Option<f64>,
    pub rating: Option<f64>,
}
