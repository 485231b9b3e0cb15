use chrono::{DateTime, Utc};
use esports_api::{
    BracketRound, Match, MatchStatus, NormalizedMatchStats, NormalizedPlayerStat, ParsedBracket,
    SeriesGroupEvent, StatColumn, TeamSide,
};
use serde::Serialize;
use std::fmt::Write;

const NAME_WIDTH: usize = 14;
const PLAYER_WIDTH: usize = 16;

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

pub fn bracket(parsed: &ParsedBracket) -> String {
    let mut out = String::new();
    let kind = if parsed.is_double_elimination() { "double elimination" } else { "single elimination" };
    let _ = writeln!(out, "Bracket ({kind}, {} matches)", parsed.match_ids().len());

    section(&mut out, "Upper bracket", &parsed.upper);
    section(&mut out, "Lower bracket", &parsed.lower);

    if let Some(gf) = &parsed.grand_final {
        let _ = writeln!(out, "\nGrand Final");
        let _ = writeln!(out, "  {}", match_line(gf));
    }
    out
}

fn section(out: &mut String, title: &str, rounds: &[BracketRound]) {
    if rounds.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    for round in rounds {
        let _ = writeln!(out, "  {}", round.label);
        for m in &round.matches {
            let _ = writeln!(out, "    {}", match_line(m));
        }
    }
}

fn match_line(m: &Match) -> String {
    let status = match m.status {
        MatchStatus::NotStarted => "SCH",
        MatchStatus::Running => "LIVE",
        MatchStatus::Finished => "FNL",
        MatchStatus::Canceled => "CNL",
    };
    let side = |idx: usize| -> (String, String) {
        match m.opponents.get(idx) {
            Some(o) => {
                let name = o.acronym.clone().unwrap_or_else(|| o.name.clone());
                let marker = if m.winner_id == Some(o.id) { "*" } else { " " };
                let score = m.score_for(o.id).map_or("-".to_string(), |s| s.to_string());
                (format!("{marker}{}", pad_name(&name, NAME_WIDTH)), score)
            }
            None => (format!(" {}", pad_name("TBD", NAME_WIDTH)), "-".to_string()),
        }
    };
    let (top, top_score) = side(0);
    let (bottom, bottom_score) = side(1);
    let when = m
        .scheduled_at
        .map(|t| format!("  {}", t.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!(
        "#{:<8} {top} {top_score:>2} - {bottom_score:<2} {bottom} BO{} {status}{when}",
        m.id, m.number_of_games
    )
}

fn pad_name(name: &str, max: usize) -> String {
    let mut s: String = name.chars().take(max).collect();
    while s.chars().count() < max {
        s.push(' ');
    }
    s
}

// ---------------------------------------------------------------------------
// Match stats
// ---------------------------------------------------------------------------

/// `--json` shape of the stats command: the normalized maps plus both overall tables.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport<'a> {
    #[serde(flatten)]
    pub stats: &'a NormalizedMatchStats,
    pub team1_overall: Vec<NormalizedPlayerStat>,
    pub team2_overall: Vec<NormalizedPlayerStat>,
}

impl<'a> StatsReport<'a> {
    pub fn new(stats: &'a NormalizedMatchStats) -> Self {
        Self {
            stats,
            team1_overall: stats.overall(TeamSide::Team1),
            team2_overall: stats.overall(TeamSide::Team2),
        }
    }
}

pub fn stats(stats: &NormalizedMatchStats) -> String {
    let mut out = String::new();
    let columns = &stats.available_columns;
    let team1 = team_name(&stats.team1.name, "Team 1");
    let team2 = team_name(&stats.team2.name, "Team 2");
    let (won1, won2) = stats.maps.iter().fold((0, 0), |(a, b), m| {
        (a + u32::from(m.team1_win), b + u32::from(m.team2_win))
    });
    let _ = writeln!(out, "{team1} {won1} - {won2} {team2}");

    for map in &stats.maps {
        let _ = writeln!(
            out,
            "\nMap {}: {}  {} - {}",
            map.number, map.name, map.team1_score, map.team2_score
        );
        if let Some(h) = &map.halves {
            let mut halves = format!(
                "  halves {}-{} / {}-{}",
                h.first_half.0, h.first_half.1, h.second_half.0, h.second_half.1
            );
            if let Some((a, b)) = h.overtime {
                let _ = write!(halves, " / OT {a}-{b}");
            }
            let _ = writeln!(out, "{halves}");
        }
        table(&mut out, team1, map.players(TeamSide::Team1), columns);
        table(&mut out, team2, map.players(TeamSide::Team2), columns);
    }

    if stats.maps.len() > 1 {
        let _ = writeln!(out, "\nOverall");
        table(&mut out, team1, &stats.overall(TeamSide::Team1), columns);
        table(&mut out, team2, &stats.overall(TeamSide::Team2), columns);
    }
    out
}

fn team_name<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.trim().is_empty() { fallback } else { name }
}

fn table(out: &mut String, team: &str, rows: &[NormalizedPlayerStat], columns: &[StatColumn]) {
    let mut header = format!("  {}", pad_name(team, PLAYER_WIDTH));
    for c in columns {
        let _ = write!(header, " {:>6}", c.label());
    }
    let _ = writeln!(out, "{}", header.trim_end());
    for row in rows {
        let mut line = format!("  {}", pad_name(&row.name, PLAYER_WIDTH));
        for c in columns {
            let _ = write!(line, " {:>6}", cell(row, *c));
        }
        let _ = writeln!(out, "{line}");
    }
}

fn cell(row: &NormalizedPlayerStat, column: StatColumn) -> String {
    fn opt<T>(v: Option<T>, f: impl Fn(T) -> String) -> String {
        v.map(f).unwrap_or_else(|| "-".to_string())
    }
    match column {
        StatColumn::Kills => row.kills.to_string(),
        StatColumn::Deaths => row.deaths.to_string(),
        StatColumn::Assists => row.assists.to_string(),
        StatColumn::KdDiff => format!("{:+}", row.kd_diff),
        StatColumn::KdRatio => format!("{:.2}", row.kd_ratio),
        StatColumn::HsPercent => opt(row.hs_percent, |v| format!("{v:.0}%")),
        StatColumn::KrRatio => opt(row.kr_ratio, |v| format!("{v:.2}")),
        StatColumn::Mvps => opt(row.mvps, |v| v.to_string()),
        StatColumn::Adr => opt(row.adr, |v| format!("{v:.1}")),
        StatColumn::Kast => opt(row.kast, |v| format!("{v:.1}%")),
        StatColumn::Rating => opt(row.rating, |v| format!("{v:.2}")),
        StatColumn::TripleKills => opt(row.triple_kills, |v| v.to_string()),
        StatColumn::QuadroKills => opt(row.quadro_kills, |v| v.to_string()),
        StatColumn::PentaKills => opt(row.penta_kills, |v| v.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

pub fn series(events: &[SeriesGroupEvent], region: &str) -> String {
    let mut out = String::new();
    if events.is_empty() {
        let _ = writeln!(out, "No tournaments.");
        return out;
    }
    for e in events {
        let stages = if e.stage_count == 1 { String::new() } else { format!("  ({} stages)", e.stage_count) };
        let local = if e.region_match { format!("  [{region}]") } else { String::new() };
        let _ = writeln!(
            out,
            "{:<9} {:>1}  {}{stages}  {} - {}{local}",
            e.status.label(),
            e.tier,
            e.name,
            day(e.begin_at),
            day(e.end_at),
        );
    }
    out
}

fn day(t: Option<DateTime<Utc>>) -> String {
    t.map_or("?".to_string(), |t| t.format("%Y-%m-%d").to_string())
}
