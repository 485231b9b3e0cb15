//! Per-map, per-player stats normalized from three upstream shapes, plus the
//! cross-map "Overall" aggregation.
use crate::faceit::{self, FaceitPlayer, FaceitRound, FaceitTeam, MatchStatsResponse};
use crate::graphql::{GqlGame, GqlPlayerGameStat, PlayerStatsPayload};
use crate::pandascore::{GamesPayload, PsGame, PsGamePlayer, PsGameTeam, PsPlayerStats};
use crate::{
    HalfScores, NormalizedMapStats, NormalizedMatchStats, NormalizedPlayerStat, SidePlayers,
    StatColumn, TeamContext, TeamRef, TeamSide, hs_percent, kd_diff, kd_ratio,
};
use log::debug;
use std::collections::HashMap;

pub const FACEIT_COLUMNS: &[StatColumn] = &[
    StatColumn::Kills,
    StatColumn::Deaths,
    StatColumn::Assists,
    StatColumn::KdDiff,
    StatColumn::KdRatio,
    StatColumn::HsPercent,
    StatColumn::KrRatio,
    StatColumn::Mvps,
    StatColumn::TripleKills,
    StatColumn::QuadroKills,
    StatColumn::PentaKills,
];

pub const PANDASCORE_COLUMNS: &[StatColumn] = &[
    StatColumn::Kills,
    StatColumn::Deaths,
    StatColumn::Assists,
    StatColumn::KdDiff,
    StatColumn::KdRatio,
    StatColumn::HsPercent,
    StatColumn::Adr,
    StatColumn::Kast,
    StatColumn::Rating,
];

pub const GRAPHQL_COLUMNS: &[StatColumn] = &[
    StatColumn::Kills,
    StatColumn::Deaths,
    StatColumn::Assists,
    StatColumn::KdDiff,
    StatColumn::KdRatio,
    StatColumn::HsPercent,
    StatColumn::Adr,
    StatColumn::Rating,
];

/// An upstream stats payload that can be turned into the unified match stats view.
///
/// Returns `None` when the payload has no played maps.
pub trait NormalizeStats {
    fn normalize(&self, teams: &TeamContext) -> Option<NormalizedMatchStats>;
}

/// Any of the supported upstream payloads.
#[derive(Debug, Clone)]
pub enum StatsPayload {
    Faceit(MatchStatsResponse),
    PandaScore(GamesPayload),
    Graphql(PlayerStatsPayload),
}

impl NormalizeStats for StatsPayload {
    fn normalize(&self, teams: &TeamContext) -> Option<NormalizedMatchStats> {
        match self {
            StatsPayload::Faceit(raw) => raw.normalize(teams),
            StatsPayload::PandaScore(raw) => raw.normalize(teams),
            StatsPayload::Graphql(raw) => raw.normalize(teams),
        }
    }
}

// ---------------------------------------------------------------------------
// FACEIT: rounds → teams → players, string-valued stats
// ---------------------------------------------------------------------------

impl NormalizeStats for MatchStatsResponse {
    fn normalize(&self, teams: &TeamContext) -> Option<NormalizedMatchStats> {
        if self.rounds.is_empty() {
            return None;
        }

        let mut team1 = teams.team1.clone();
        let mut team2 = teams.team2.clone();
        let mut maps = Vec::with_capacity(self.rounds.len());

        for (i, round) in self.rounds.iter().enumerate() {
            let (t1, t2) = split_teams(&round.teams, |t| t.team_id.as_deref(), teams);
            fill_name(&mut team1, t1.and_then(|t| faceit::stat_str(&t.team_stats, "Team")));
            fill_name(&mut team2, t2.and_then(|t| faceit::stat_str(&t.team_stats, "Team")));
            maps.push(faceit_map(i, round, t1, t2));
        }
        maps.sort_by_key(|m| m.number);

        Some(NormalizedMatchStats {
            team1,
            team2,
            maps,
            available_columns: FACEIT_COLUMNS.to_vec(),
            has_side_split: false,
        })
    }
}

fn faceit_map(
    i: usize,
    round: &FaceitRound,
    t1: Option<&FaceitTeam>,
    t2: Option<&FaceitTeam>,
) -> NormalizedMapStats {
    let score = |t: Option<&FaceitTeam>| t.map_or(0, |t| faceit::stat_u32(&t.team_stats, "Final Score"));
    let team1_score = score(t1);
    let team2_score = score(t2);

    let winner = faceit::stat_str(&round.round_stats, "Winner");
    let (team1_win, team2_win) = win_flags(
        winner,
        t1.and_then(|t| t.team_id.as_deref()),
        t2.and_then(|t| t.team_id.as_deref()),
        team1_score,
        team2_score,
    );

    let number = round
        .match_round
        .as_ref()
        .and_then(faceit::value_f64)
        .filter(|n| *n >= 1.0)
        .map_or(i as u32 + 1, |n| n as u32);

    let players = |t: Option<&FaceitTeam>| -> Vec<NormalizedPlayerStat> {
        t.map(|t| t.players.iter().map(faceit_player).collect()).unwrap_or_default()
    };

    NormalizedMapStats {
        name: pretty_map_name(faceit::stat_str(&round.round_stats, "Map").unwrap_or_default()),
        number,
        team1_score,
        team2_score,
        team1_win,
        team2_win,
        halves: t1.zip(t2).and_then(|(a, b)| faceit_halves(a, b)),
        team1_players: players(t1),
        team2_players: players(t2),
        team1_sides: None,
        team2_sides: None,
    }
}

fn faceit_halves(t1: &FaceitTeam, t2: &FaceitTeam) -> Option<HalfScores> {
    let (a, b) = (&t1.team_stats, &t2.team_stats);
    if !faceit::has_stat(a, "First Half Score") || !faceit::has_stat(b, "First Half Score") {
        return None;
    }
    let pair = |key: &str| (faceit::stat_u32(a, key), faceit::stat_u32(b, key));
    let overtime = pair("Overtime score");
    Some(HalfScores {
        first_half: pair("First Half Score"),
        second_half: pair("Second Half Score"),
        overtime: (overtime != (0, 0)).then_some(overtime),
    })
}

fn faceit_player(p: &FaceitPlayer) -> NormalizedPlayerStat {
    let s = &p.player_stats;
    let kills = faceit::stat_u32(s, "Kills");
    let headshots = faceit::stat_u32(s, "Headshots");
    NormalizedPlayerStat {
        hs_percent: Some(hs_percent(headshots, kills)),
        kr_ratio: Some(faceit::stat_f64(s, "K/R Ratio")),
        mvps: Some(faceit::stat_u32(s, "MVPs")),
        triple_kills: Some(faceit::stat_u32(s, "Triple Kills")),
        quadro_kills: Some(faceit::stat_u32(s, "Quadro Kills")),
        penta_kills: Some(faceit::stat_u32(s, "Penta Kills")),
        ..NormalizedPlayerStat::new(
            p.player_id.clone().unwrap_or_default(),
            p.nickname.clone().unwrap_or_default(),
            kills,
            faceit::stat_u32(s, "Deaths"),
            faceit::stat_u32(s, "Assists"),
        )
    }
}

// ---------------------------------------------------------------------------
// PandaScore: games → teams → players, typed fields
// ---------------------------------------------------------------------------

impl NormalizeStats for GamesPayload {
    fn normalize(&self, teams: &TeamContext) -> Option<NormalizedMatchStats> {
        let mut played: Vec<(usize, &PsGame)> = self
            .games
            .iter()
            .filter(|g| !g.teams.is_empty())
            .enumerate()
            .collect();
        if played.is_empty() {
            return None;
        }
        played.sort_by_key(|(i, g)| g.position.unwrap_or(*i as u32 + 1));

        let mut team1 = teams.team1.clone();
        let mut team2 = teams.team2.clone();
        let mut maps = Vec::with_capacity(played.len());

        for (i, game) in played {
            let team_id = |t: &PsGameTeam| t.team.as_ref().map(|team| team.id.to_string());
            let ids: Vec<Option<String>> = game.teams.iter().map(team_id).collect();
            let (t1, t2) = split_teams_indexed(&ids, teams);
            let t1 = t1.map(|idx| &game.teams[idx]);
            let t2 = t2.map(|idx| &game.teams[idx]);

            fill_name(&mut team1, t1.and_then(|t| t.team.as_ref()?.name.as_deref()));
            fill_name(&mut team2, t2.and_then(|t| t.team.as_ref()?.name.as_deref()));

            let team1_score = t1.and_then(|t| t.score).unwrap_or_default();
            let team2_score = t2.and_then(|t| t.score).unwrap_or_default();
            let winner = game.winner.as_ref().and_then(|w| w.id).map(|id| id.to_string());
            let (team1_win, team2_win) = win_flags(
                winner.as_deref(),
                t1.and_then(team_id).as_deref(),
                t2.and_then(team_id).as_deref(),
                team1_score,
                team2_score,
            );

            let players = |t: Option<&PsGameTeam>| -> Vec<NormalizedPlayerStat> {
                t.map(|t| t.players.iter().map(|p| pandascore_player(p, &p.stats)).collect())
                    .unwrap_or_default()
            };

            maps.push(NormalizedMapStats {
                name: pretty_map_name(
                    game.map.as_ref().and_then(|m| m.name.as_deref()).unwrap_or_default(),
                ),
                number: game.position.unwrap_or(i as u32 + 1),
                team1_score,
                team2_score,
                team1_win,
                team2_win,
                halves: None,
                team1_players: players(t1),
                team2_players: players(t2),
                team1_sides: t1.and_then(pandascore_sides),
                team2_sides: t2.and_then(pandascore_sides),
            });
        }

        let has_side_split = maps
            .iter()
            .any(|m| m.team1_sides.is_some() || m.team2_sides.is_some());

        Some(NormalizedMatchStats {
            team1,
            team2,
            maps,
            available_columns: PANDASCORE_COLUMNS.to_vec(),
            has_side_split,
        })
    }
}

fn pandascore_player(p: &PsGamePlayer, stats: &PsPlayerStats) -> NormalizedPlayerStat {
    let (id, name) = p
        .player
        .as_ref()
        .map(|pl| (pl.id.to_string(), pl.name.clone().unwrap_or_default()))
        .unwrap_or_default();
    let kills = stats.kills.unwrap_or_default();
    NormalizedPlayerStat {
        hs_percent: Some(hs_percent(stats.headshots.unwrap_or_default(), kills)),
        adr: stats.adr,
        kast: stats.kast,
        rating: stats.rating,
        ..NormalizedPlayerStat::new(
            id,
            name,
            kills,
            stats.deaths.unwrap_or_default(),
            stats.assists.unwrap_or_default(),
        )
    }
}

/// Side rows only when every player on the team reports both sides.
fn pandascore_sides(team: &PsGameTeam) -> Option<SidePlayers> {
    if team.players.is_empty() {
        return None;
    }
    let mut sides = SidePlayers::default();
    for p in &team.players {
        let (ct, t) = p.counter_terrorists.as_ref().zip(p.terrorists.as_ref())?;
        sides.ct.push(pandascore_player(p, ct));
        sides.t.push(pandascore_player(p, t));
    }
    Some(sides)
}

// ---------------------------------------------------------------------------
// GraphQL: flat per-player-per-game rows joined against the games list
// ---------------------------------------------------------------------------

impl NormalizeStats for PlayerStatsPayload {
    fn normalize(&self, teams: &TeamContext) -> Option<NormalizedMatchStats> {
        if self.games.is_empty() {
            return None;
        }

        let mut by_game: HashMap<&str, Vec<&GqlPlayerGameStat>> = HashMap::new();
        for row in &self.player_stats {
            by_game.entry(row.game_id.as_str()).or_default().push(row);
        }

        let mut games: Vec<(usize, &GqlGame)> = self.games.iter().enumerate().collect();
        games.sort_by_key(|(i, g)| g.number.unwrap_or(*i as u32 + 1));

        let maps: Vec<NormalizedMapStats> = games
            .into_iter()
            .map(|(i, game)| {
                let rows = by_game.remove(game.id.as_str()).unwrap_or_default();
                graphql_map(i, game, &rows, teams)
            })
            .collect();

        let orphaned: usize = by_game.values().map(Vec::len).sum();
        if orphaned > 0 {
            debug!("skipped {orphaned} player stat rows with no matching game");
        }

        Some(NormalizedMatchStats {
            team1: teams.team1.clone(),
            team2: teams.team2.clone(),
            maps,
            available_columns: GRAPHQL_COLUMNS.to_vec(),
            has_side_split: false,
        })
    }
}

fn graphql_map(
    i: usize,
    game: &GqlGame,
    rows: &[&GqlPlayerGameStat],
    teams: &TeamContext,
) -> NormalizedMapStats {
    let score_ids: Vec<Option<String>> =
        game.team_scores.iter().map(|s| Some(s.team_id.clone())).collect();
    let (s1, s2) = split_teams_indexed(&score_ids, teams);
    let team1_id = s1.map(|idx| game.team_scores[idx].team_id.as_str());
    let team2_id = s2.map(|idx| game.team_scores[idx].team_id.as_str());
    let score = |idx: Option<usize>| idx.and_then(|i| game.team_scores[i].score).unwrap_or_default();
    let (team1_score, team2_score) = (score(s1), score(s2));

    let side_of = |team_id: &str| {
        teams.side_of(team_id).or(if Some(team_id) == team1_id {
            Some(TeamSide::Team1)
        } else if Some(team_id) == team2_id {
            Some(TeamSide::Team2)
        } else {
            None
        })
    };

    let mut team1_players = Vec::new();
    let mut team2_players = Vec::new();
    for row in rows {
        match side_of(&row.team_id) {
            Some(TeamSide::Team1) => team1_players.push(graphql_player(row)),
            Some(TeamSide::Team2) => team2_players.push(graphql_player(row)),
            None => debug!(
                "game {}: player {} has unknown team {}",
                game.id, row.player_id, row.team_id
            ),
        }
    }

    let (team1_win, team2_win) = win_flags(
        game.winner_team_id.as_deref(),
        team1_id,
        team2_id,
        team1_score,
        team2_score,
    );

    NormalizedMapStats {
        name: pretty_map_name(game.map_name.as_deref().unwrap_or_default()),
        number: game.number.unwrap_or(i as u32 + 1),
        team1_score,
        team2_score,
        team1_win,
        team2_win,
        halves: None,
        team1_players,
        team2_players,
        team1_sides: None,
        team2_sides: None,
    }
}

fn graphql_player(row: &GqlPlayerGameStat) -> NormalizedPlayerStat {
    let kills = row.kills.unwrap_or_default();
    NormalizedPlayerStat {
        hs_percent: Some(hs_percent(row.headshots.unwrap_or_default(), kills)),
        adr: row.adr,
        rating: row.rating,
        ..NormalizedPlayerStat::new(
            row.player_id.clone(),
            row.player_name.clone().unwrap_or_default(),
            kills,
            row.deaths.unwrap_or_default(),
            row.assists.unwrap_or_default(),
        )
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Pick the rows for team 1 and team 2: by id when the context knows the ids,
/// otherwise by position.
fn split_teams<'a, T>(
    items: &'a [T],
    id_of: impl Fn(&T) -> Option<&str>,
    teams: &TeamContext,
) -> (Option<&'a T>, Option<&'a T>) {
    let ids: Vec<Option<String>> = items.iter().map(|t| id_of(t).map(str::to_owned)).collect();
    let (a, b) = split_teams_indexed(&ids, teams);
    (a.map(|i| &items[i]), b.map(|i| &items[i]))
}

fn split_teams_indexed(ids: &[Option<String>], teams: &TeamContext) -> (Option<usize>, Option<usize>) {
    if teams.has_ids() {
        let find = |side: TeamSide| {
            ids.iter()
                .position(|id| id.as_deref().and_then(|id| teams.side_of(id)) == Some(side))
        };
        let (a, b) = (find(TeamSide::Team1), find(TeamSide::Team2));
        if a.is_some() || b.is_some() {
            return (a, b);
        }
    }
    let first = (!ids.is_empty()).then_some(0);
    let second = (ids.len() > 1).then_some(1);
    (first, second)
}

fn fill_name(team: &mut TeamRef, upstream: Option<&str>) {
    if team.name.is_empty()
        && let Some(name) = upstream
    {
        team.name = name.to_owned();
    }
}

/// Win flags from the upstream winner id, falling back to the scores. A tie marks neither.
fn win_flags(
    winner: Option<&str>,
    team1_id: Option<&str>,
    team2_id: Option<&str>,
    team1_score: u32,
    team2_score: u32,
) -> (bool, bool) {
    if let Some(w) = winner {
        if team1_id == Some(w) {
            return (true, false);
        }
        if team2_id == Some(w) {
            return (false, true);
        }
    }
    (team1_score > team2_score, team2_score > team1_score)
}

/// "de_mirage" → "Mirage".
pub fn pretty_map_name(raw: &str) -> String {
    let name = raw
        .trim()
        .trim_start_matches("de_")
        .trim_start_matches("cs_");
    let mut chars = name.chars();
    match chars.next() {
        None => "TBD".to_owned(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

// ---------------------------------------------------------------------------
// Cross-map aggregation
// ---------------------------------------------------------------------------

/// Merge one team's rows across all maps into a single "Overall" row per player.
///
/// Counts are summed and K/D recomputed from the totals. HS% is weighted by kills.
/// K/R, ADR, KAST and rating have no reliable per-map weight and are averaged
/// over the maps that report them.
pub fn aggregate(maps: &[NormalizedMapStats], side: TeamSide) -> Vec<NormalizedPlayerStat> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, Totals> = HashMap::new();

    for map in maps {
        for p in map.players(side) {
            totals
                .entry(p.player_id.as_str())
                .or_insert_with(|| {
                    order.push(p.player_id.as_str());
                    Totals::new(p)
                })
                .add(p);
        }
    }

    order
        .into_iter()
        .filter_map(|id| totals.remove(id))
        .map(Totals::finish)
        .collect()
}

/// Rating descending when the source has ratings, kills descending otherwise.
pub fn sort_for_display(rows: &mut [NormalizedPlayerStat], columns: &[StatColumn]) {
    if columns.contains(&StatColumn::Rating) {
        rows.sort_by(|a, b| {
            let key = |p: &NormalizedPlayerStat| p.rating.unwrap_or(f64::NEG_INFINITY);
            key(b).total_cmp(&key(a))
        });
    } else {
        rows.sort_by(|a, b| b.kills.cmp(&a.kills));
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Debug, Default)]
struct Totals {
    player_id: String,
    name: String,
    kills: u32,
    deaths: u32,
    assists: u32,
    /// Σ(kills × hs%) and Σkills over maps that report HS%.
    hs_weighted: Option<(f64, f64)>,
    mvps: Option<u32>,
    triple_kills: Option<u32>,
    quadro_kills: Option<u32>,
    penta_kills: Option<u32>,
    kr_ratio: Mean,
    adr: Mean,
    kast: Mean,
    rating: Mean,
}

impl Totals {
    fn new(first: &NormalizedPlayerStat) -> Self {
        Self {
            player_id: first.player_id.clone(),
            name: first.name.clone(),
            ..Default::default()
        }
    }

    fn add(&mut self, p: &NormalizedPlayerStat) {
        self.kills = self.kills.saturating_add(p.kills);
        self.deaths = self.deaths.saturating_add(p.deaths);
        self.assists = self.assists.saturating_add(p.assists);
        if let Some(hs) = p.hs_percent {
            let (sum, kills) = self.hs_weighted.get_or_insert((0.0, 0.0));
            *sum += f64::from(p.kills) * hs;
            *kills += f64::from(p.kills);
        }
        add_count(&mut self.mvps, p.mvps);
        add_count(&mut self.triple_kills, p.triple_kills);
        add_count(&mut self.quadro_kills, p.quadro_kills);
        add_count(&mut self.penta_kills, p.penta_kills);
        self.kr_ratio.push(p.kr_ratio);
        self.adr.push(p.adr);
        self.kast.push(p.kast);
        self.rating.push(p.rating);
    }

    fn finish(self) -> NormalizedPlayerStat {
        NormalizedPlayerStat {
            player_id: self.player_id,
            name: self.name,
            kills: self.kills,
            deaths: self.deaths,
            assists: self.assists,
            kd_diff: kd_diff(self.kills, self.deaths),
            kd_ratio: kd_ratio(self.kills, self.deaths),
            hs_percent: self
                .hs_weighted
                .map(|(sum, kills)| if kills > 0.0 { sum / kills } else { 0.0 }),
            kr_ratio: self.kr_ratio.value(),
            mvps: self.mvps,
            adr: self.adr.value(),
            kast: self.kast.value(),
            rating: self.rating.value(),
            triple_kills: self.triple_kills,
            quadro_kills: self.quadro_kills,
            penta_kills: self.penta_kills,
        }
    }
}

fn add_count(total: &mut Option<u32>, value: Option<u32>) {
    if let Some(v) = value {
        *total = Some(total.unwrap_or_default().saturating_add(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> TeamContext {
        TeamContext::new(TeamRef::new("t1", "Vitality"), TeamRef::new("t2", "Spirit"))
    }

    fn row(id: &str, kills: u32, deaths: u32, hs: f64) -> NormalizedPlayerStat {
        NormalizedPlayerStat {
            hs_percent: Some(hs),
            ..NormalizedPlayerStat::new(id, id.to_uppercase(), kills, deaths, 3)
        }
    }

    fn map_with(team1: Vec<NormalizedPlayerStat>) -> NormalizedMapStats {
        NormalizedMapStats { team1_players: team1, ..Default::default() }
    }

    fn faceit_payload() -> MatchStatsResponse {
        serde_json::from_value(json!({
            "rounds": [{
                "match_round": "1",
                "round_stats": { "Map": "de_mirage", "Winner": "t2", "Score": "11 / 13" },
                "teams": [
                    {
                        "team_id": "t2",
                        "team_stats": { "Team": "team_donk", "Final Score": "13", "First Half Score": "7", "Second Half Score": "6", "Overtime score": "0" },
                        "players": [{ "player_id": "p2", "nickname": "donk", "player_stats": { "Kills": "25", "Deaths": "14", "Assists": "4", "Headshots": "10", "K/R Ratio": "1.04", "MVPs": "6", "Triple Kills": "2", "Quadro Kills": "1", "Penta Kills": "0" } }]
                    },
                    {
                        "team_id": "t1",
                        "team_stats": { "Team": "team_zywoo", "Final Score": 11, "First Half Score": "5", "Second Half Score": "6", "Overtime score": "0" },
                        "players": [{ "player_id": "p1", "nickname": "ZywOo", "player_stats": { "Kills": "15", "Deaths": "0", "Assists": "2", "Headshots": "6" } }]
                    }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn kd_fields_are_zero_safe() {
        let p = NormalizedPlayerStat::new("p", "p", 12, 0, 0);
        assert_eq!(p.kd_ratio, 12.0);
        assert_eq!(p.kd_diff, 12);

        let p = NormalizedPlayerStat::new("p", "p", 10, 20, 0);
        assert_eq!(p.kd_ratio, 0.5);
        assert_eq!(p.kd_diff, -10);
    }

    #[test]
    fn headshot_percent_is_zero_without_kills() {
        assert_eq!(hs_percent(0, 0), 0.0);
        assert_eq!(hs_percent(5, 10), 50.0);
    }

    #[test]
    fn faceit_string_stats_become_numbers() {
        let stats = faceit_payload().normalize(&ctx()).unwrap();
        let map = &stats.maps[0];

        // Team rows come back in upstream order t2, t1; ids put them on the right side.
        assert_eq!(map.team1_players[0].name, "ZywOo");
        assert_eq!(map.team1_players[0].kills, 15);
        assert_eq!(map.team1_players[0].kd_ratio, 15.0);
        assert_eq!(map.team2_players[0].kills, 25);
        assert_eq!(map.team2_players[0].mvps, Some(6));
        assert_eq!(map.team2_players[0].hs_percent, Some(40.0));
        assert_eq!(map.team2_players[0].kr_ratio, Some(1.04));
        assert_eq!(map.team2_players[0].adr, None);

        assert_eq!(map.name, "Mirage");
        assert_eq!(map.number, 1);
        assert_eq!((map.team1_score, map.team2_score), (11, 13));
        assert!(!map.team1_win && map.team2_win);
        let halves = map.halves.unwrap();
        assert_eq!(halves.first_half, (5, 7));
        assert_eq!(halves.overtime, None);

        assert!(stats.has_column(StatColumn::Mvps));
        assert!(!stats.has_column(StatColumn::Rating));
        assert!(!stats.has_side_split);
        assert_eq!(stats.team1.name, "Vitality");
    }

    #[test]
    fn faceit_without_rounds_is_none() {
        assert!(MatchStatsResponse::default().normalize(&ctx()).is_none());
    }

    #[test]
    fn faceit_without_context_ids_maps_by_position_and_fills_names() {
        let stats = faceit_payload().normalize(&TeamContext::default()).unwrap();
        assert_eq!(stats.team1.name, "team_donk");
        assert_eq!(stats.team2.name, "team_zywoo");
        assert_eq!(stats.maps[0].team1_players[0].name, "donk");
    }

    #[test]
    fn pandascore_games_normalize_with_sides() {
        let payload: GamesPayload = serde_json::from_value(json!([
            { "id": 2, "position": 2, "status": "not_started", "teams": [] },
            {
                "id": 1, "position": 1, "status": "finished",
                "map": { "id": 5, "name": "Nuke" },
                "winner": { "id": 100, "type": "Team" },
                "teams": [
                    { "team": { "id": 100, "name": "Vitality" }, "score": 13, "players": [
                        { "player": { "id": 1, "name": "ZywOo" }, "kills": 20, "deaths": 10, "assists": 5, "headshots": 8, "adr": 95.5, "kast": 80.0, "rating": 1.45,
                          "counter_terrorists": { "kills": 12, "deaths": 4, "assists": 2, "headshots": 5, "adr": 101.0, "kast": 85.0, "rating": 1.6 },
                          "terrorists": { "kills": 8, "deaths": 6, "assists": 3, "headshots": 3, "adr": 90.0, "kast": 75.0, "rating": 1.3 } }
                    ]},
                    { "team": { "id": 200, "name": "Spirit" }, "score": 9, "players": [
                        { "player": { "id": 2, "name": "donk" }, "kills": 18, "deaths": 15, "assists": 1, "headshots": 9, "adr": 88.0, "kast": 70.0, "rating": 1.1 }
                    ]}
                ]
            }
        ]))
        .unwrap();
        let teams = TeamContext::new(TeamRef::new("100", ""), TeamRef::new("200", ""));
        let stats = payload.normalize(&teams).unwrap();

        assert_eq!(stats.maps.len(), 1);
        let map = &stats.maps[0];
        assert_eq!(map.name, "Nuke");
        assert!(map.team1_win);
        assert_eq!(map.team1_players[0].hs_percent, Some(40.0));
        assert_eq!(map.team1_players[0].rating, Some(1.45));
        assert_eq!(map.team1_players[0].mvps, None);

        let sides = map.team1_sides.as_ref().unwrap();
        assert_eq!(sides.ct[0].kills, 12);
        assert_eq!(sides.t[0].kd_diff, 2);
        assert!(map.team2_sides.is_none(), "donk has no side rows");
        assert!(stats.has_side_split);
        assert_eq!(stats.team1.name, "Vitality");
        assert!(stats.has_column(StatColumn::Kast));
        assert!(!stats.has_column(StatColumn::KrRatio));
    }

    #[test]
    fn pandascore_with_no_played_games_is_none() {
        let payload: GamesPayload =
            serde_json::from_value(json!([{ "id": 1, "status": "not_started" }])).unwrap();
        assert!(payload.normalize(&ctx()).is_none());
    }

    #[test]
    fn graphql_rows_join_by_game_and_team() {
        let payload: PlayerStatsPayload = serde_json::from_value(json!({
            "games": [
                { "id": "g2", "number": 2, "mapName": "de_ancient", "teamScores": [{ "teamId": "t1", "score": 8 }, { "teamId": "t2", "score": 13 }] },
                { "id": "g1", "number": 1, "mapName": "de_inferno", "winnerTeamId": "t1", "teamScores": [{ "teamId": "t1", "score": 13 }, { "teamId": "t2", "score": 5 }] }
            ],
            "playerStats": [
                { "gameId": "g1", "teamId": "t1", "playerId": "p1", "playerName": "ZywOo", "kills": 22, "deaths": 9, "assists": 4, "headshots": 11, "adr": 110.2, "rating": 1.7 },
                { "gameId": "g1", "teamId": "t2", "playerId": "p2", "playerName": "donk", "kills": 12, "deaths": 18, "assists": 2, "headshots": 3, "adr": 70.0, "rating": 0.8 },
                { "gameId": "g2", "teamId": "t2", "playerId": "p2", "playerName": "donk", "kills": 24, "deaths": 12, "assists": 2, "headshots": 12 },
                { "gameId": "g9", "teamId": "t1", "playerId": "p1", "kills": 99 },
                { "gameId": "g1", "teamId": "t3", "playerId": "p9", "kills": 99 }
            ]
        }))
        .unwrap();
        let stats = payload.normalize(&ctx()).unwrap();

        assert_eq!(stats.maps.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["Inferno", "Ancient"]);
        let first = &stats.maps[0];
        assert_eq!(first.team1_players.len(), 1);
        assert_eq!(first.team2_players.len(), 1);
        assert!(first.team1_win);
        let second = &stats.maps[1];
        assert!(second.team2_win, "higher score wins without a winner id");
        assert_eq!(second.team2_players[0].adr, None);
        assert!(!stats.has_column(StatColumn::Kast));
    }

    #[test]
    fn aggregate_sums_counts_and_recomputes_ratio() {
        let maps = vec![
            map_with(vec![row("a", 20, 10, 45.0)]),
            map_with(vec![row("a", 20, 10, 45.0)]),
            map_with(vec![row("a", 20, 10, 45.0)]),
        ];
        let overall = aggregate(&maps, TeamSide::Team1);
        assert_eq!(overall.len(), 1);
        let a = &overall[0];
        assert_eq!((a.kills, a.deaths, a.assists), (60, 30, 9));
        assert_eq!(a.kd_ratio, 2.0);
        assert_eq!(a.kd_diff, 30);
        assert_eq!(a.hs_percent, Some(45.0));
    }

    #[test]
    fn aggregate_saturates_oversized_counts() {
        let round = |n: &str| {
            json!({
                "match_round": n,
                "teams": [{
                    "team_id": "t1",
                    "players": [{ "player_id": "p1", "nickname": "ZywOo", "player_stats": {
                        "Kills": "4000000000", "Deaths": "4000000000", "Assists": "1", "Headshots": "4000000000", "MVPs": "4000000000"
                    } }]
                }]
            })
        };
        let payload: MatchStatsResponse =
            serde_json::from_value(json!({ "rounds": [round("1"), round("2")] })).unwrap();
        let stats = payload.normalize(&ctx()).unwrap();
        let overall = stats.overall(TeamSide::Team1);
        assert_eq!(overall[0].kills, u32::MAX);
        assert_eq!(overall[0].deaths, u32::MAX);
        assert_eq!(overall[0].assists, 2);
        assert_eq!(overall[0].mvps, Some(u32::MAX));
        assert_eq!(overall[0].hs_percent, Some(100.0));
    }

    #[test]
    fn faceit_overtime_detection_handles_large_scores() {
        let team = |id: &str| {
            json!({
                "team_id": id,
                "team_stats": {
                    "First Half Score": "6", "Second Half Score": "6", "Overtime score": "4294967295"
                },
                "players": []
            })
        };
        let payload: MatchStatsResponse =
            serde_json::from_value(json!({ "rounds": [{ "teams": [team("t1"), team("t2")] }] })).unwrap();
        let stats = payload.normalize(&ctx()).unwrap();
        let halves = stats.maps[0].halves.unwrap();
        assert_eq!(halves.overtime, Some((u32::MAX, u32::MAX)));
    }

    #[test]
    fn faceit_maps_follow_round_number() {
        let payload: MatchStatsResponse = serde_json::from_value(json!({
            "rounds": [
                { "match_round": "2", "round_stats": { "Map": "de_nuke" } },
                { "match_round": "1", "round_stats": { "Map": "de_mirage" } }
            ]
        }))
        .unwrap();
        let stats = payload.normalize(&ctx()).unwrap();
        let order: Vec<(u32, &str)> = stats.maps.iter().map(|m| (m.number, m.name.as_str())).collect();
        assert_eq!(order, vec![(1, "Mirage"), (2, "Nuke")]);
    }

    #[test]
    fn aggregate_weights_headshots_by_kills() {
        let maps = vec![map_with(vec![row("a", 10, 5, 50.0)]), map_with(vec![row("a", 30, 5, 10.0)])];
        let overall = aggregate(&maps, TeamSide::Team1);
        assert_eq!(overall[0].hs_percent, Some(20.0));
    }

    #[test]
    fn aggregate_averages_rate_metrics_and_keeps_absent_ones_absent() {
        let mut m1 = row("a", 10, 10, 0.0);
        m1.rating = Some(1.0);
        m1.adr = Some(80.0);
        let mut m2 = row("a", 10, 10, 0.0);
        m2.rating = Some(1.5);
        let overall = aggregate(&[map_with(vec![m1]), map_with(vec![m2])], TeamSide::Team1);
        assert_eq!(overall[0].rating, Some(1.25));
        assert_eq!(overall[0].adr, Some(80.0));
        assert_eq!(overall[0].kast, None);
        assert_eq!(overall[0].mvps, None);
    }

    #[test]
    fn aggregate_keeps_first_appearance_order() {
        let maps = vec![
            map_with(vec![row("b", 1, 1, 0.0), row("a", 1, 1, 0.0)]),
            map_with(vec![row("c", 1, 1, 0.0), row("a", 1, 1, 0.0)]),
        ];
        let ids: Vec<String> = aggregate(&maps, TeamSide::Team1).into_iter().map(|p| p.player_id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(aggregate(&maps, TeamSide::Team2).is_empty());
    }

    #[test]
    fn sort_prefers_rating_then_kills() {
        let mut rows = vec![row("a", 30, 1, 0.0), row("b", 10, 1, 0.0)];
        rows[0].rating = Some(0.9);
        rows[1].rating = Some(1.3);

        sort_for_display(&mut rows, PANDASCORE_COLUMNS);
        assert_eq!(rows[0].player_id, "b");

        sort_for_display(&mut rows, FACEIT_COLUMNS);
        assert_eq!(rows[0].player_id, "a");
    }

    #[test]
    fn overall_is_sorted_for_display() {
        let stats = NormalizedMatchStats {
            maps: vec![map_with(vec![row("a", 5, 1, 0.0), row("b", 9, 1, 0.0)])],
            available_columns: FACEIT_COLUMNS.to_vec(),
            ..Default::default()
        };
        let overall = stats.overall(TeamSide::Team1);
        assert_eq!(overall[0].player_id, "b");
    }

    #[test]
    fn map_names_are_prettified() {
        assert_eq!(pretty_map_name("de_dust2"), "Dust2");
        assert_eq!(pretty_map_name("Overpass"), "Overpass");
        assert_eq!(pretty_map_name(""), "TBD");
    }

    #[test]
    fn stats_payload_dispatches() {
        let payload = StatsPayload::Faceit(faceit_payload());
        assert_eq!(payload.normalize(&ctx()).unwrap().available_columns, FACEIT_COLUMNS);
        assert!(StatsPayload::Graphql(PlayerStatsPayload::default()).normalize(&ctx()).is_none());
    }
}
