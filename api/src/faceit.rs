/// FACEIT Data API wire types (GET /matches/{id}/stats).
///
/// FACEIT reports every stat as a string keyed by a display name ("Kills", "K/R Ratio"),
/// and occasionally as a bare number. The accessors below parse either form and fall
/// back to zero, so one corrupt field never blanks a player's row.
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub type StatMap = HashMap<String, Value>;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchStatsResponse {
    /// One entry per map played.
    #[serde(default)]
    pub rounds: Vec<FaceitRound>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FaceitRound {
    pub match_id: Option<String>,
    pub match_round: Option<Value>, // "1", "2" ...
    #[serde(default)]
    pub round_stats: StatMap, // "Map", "Score", "Winner", "Rounds"
    #[serde(default)]
    pub teams: Vec<FaceitTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FaceitTeam {
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_stats: StatMap, // "Team", "Final Score", "Team Win", "First Half Score" ...
    #[serde(default)]
    pub players: Vec<FaceitPlayer>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FaceitPlayer {
    pub player_id: Option<String>,
    pub nickname: Option<String>,
    #[serde(default)]
    pub player_stats: StatMap,
}

/// Numeric value of a string-or-number field. `None` when absent or unparseable.
pub fn value_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn stat_f64(stats: &StatMap, key: &str) -> f64 {
    stats.get(key).and_then(value_f64).unwrap_or_default()
}

pub fn stat_u32(stats: &StatMap, key: &str) -> u32 {
    let v = stat_f64(stats, key);
    if v > 0.0 { v as u32 } else { 0 }
}

/// Whether the field is present with a parseable value.
pub fn has_stat(stats: &StatMap, key: &str) -> bool {
    stats.get(key).and_then(value_f64).is_some()
}

pub fn stat_str<'a>(stats: &'a StatMap, key: &str) -> Option<&'a str> {
    stats.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}
