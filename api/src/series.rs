//! Tournament status and series grouping.
//!
//! A series (e.g. "IEM Cologne 2026") is usually split into several PandaScore
//! tournaments, one per stage. The dashboard lists series, so stages are folded
//! into one `SeriesGroupEvent` each.
use crate::{AnnotatedTournament, SeriesGroupEvent, Tier, TournamentStatus, TournamentSummary};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_REGION: &str = "NA";

impl TournamentStatus {
    /// Status relative to `now`. A tournament without a begin date hasn't begun;
    /// one without an end date hasn't ended.
    pub fn at(
        begin_at: Option<DateTime<Utc>>,
        end_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        match begin_at {
            Some(begin) if begin <= now => match end_at {
                Some(end) if end <= now => TournamentStatus::Completed,
                _ => TournamentStatus::Ongoing,
            },
            _ => TournamentStatus::Upcoming,
        }
    }
}

/// Attach status and the region flag to each tournament.
pub fn annotate(
    tournaments: Vec<TournamentSummary>,
    now: DateTime<Utc>,
    region: &str,
) -> Vec<AnnotatedTournament> {
    tournaments
        .into_iter()
        .map(|tournament| {
            let status = TournamentStatus::at(tournament.begin_at, tournament.end_at, now);
            let region_match = tournament
                .region
                .as_deref()
                .is_some_and(|r| r.trim().eq_ignore_ascii_case(region));
            AnnotatedTournament { tournament, status, region_match }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Serie(u64),
    Standalone(u64),
}

impl GroupKey {
    fn of(t: &TournamentSummary) -> Self {
        match t.serie_id {
            Some(id) => GroupKey::Serie(id),
            None => GroupKey::Standalone(t.id),
        }
    }

    fn id(self) -> u64 {
        match self {
            GroupKey::Serie(id) | GroupKey::Standalone(id) => id,
        }
    }
}

/// Fold stages sharing a serie into one event. Tournaments without a serie stand alone.
/// Events come out in order of first appearance.
pub fn group_by_series(tournaments: &[AnnotatedTournament]) -> Vec<SeriesGroupEvent> {
    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: HashMap<GroupKey, Vec<&AnnotatedTournament>> = HashMap::new();
    for t in tournaments {
        let key = GroupKey::of(&t.tournament);
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(t);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key).map(|members| build_event(key, &members)))
        .collect()
}

fn build_event(key: GroupKey, members: &[&AnnotatedTournament]) -> SeriesGroupEvent {
    let first = &members[0].tournament;

    let name = if members.len() == 1 {
        join_name(&[
            first.league_name.as_str(),
            first.serie_name.as_deref().unwrap_or_default(),
            first.name.as_str(),
        ])
    } else {
        let serie = members
            .iter()
            .find_map(|m| m.tournament.serie_name.as_deref())
            .unwrap_or_default();
        let name = join_name(&[first.league_name.as_str(), serie]);
        if name.is_empty() { first.name.clone() } else { name }
    };

    let status = if members.iter().any(|m| m.status == TournamentStatus::Ongoing) {
        TournamentStatus::Ongoing
    } else if members.iter().any(|m| m.status == TournamentStatus::Upcoming) {
        TournamentStatus::Upcoming
    } else {
        TournamentStatus::Completed
    };

    SeriesGroupEvent {
        id: key.id(),
        is_standalone: matches!(key, GroupKey::Standalone(_)),
        name,
        league_image_url: members
            .iter()
            .find_map(|m| m.tournament.league_image_url.clone()),
        tier: members
            .iter()
            .map(|m| m.tournament.tier)
            .min()
            .unwrap_or(Tier::Unranked),
        region_match: members.iter().any(|m| m.region_match),
        begin_at: members.iter().filter_map(|m| m.tournament.begin_at).min(),
        end_at: members.iter().filter_map(|m| m.tournament.end_at).max(),
        status,
        stage_count: members.len(),
        tournament_ids: members.iter().map(|m| m.tournament.id).collect(),
    }
}

fn join_name(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Dashboard order: ongoing, upcoming, completed; then best tier; then earliest start.
pub fn sort_events(events: &mut [SeriesGroupEvent]) {
    events.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then(a.tier.cmp(&b.tier))
            .then_with(|| match (a.begin_at, b.begin_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}
