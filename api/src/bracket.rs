//! Double-elimination bracket reconstruction.
//!
//! The upstream bracket endpoint returns a flat, unordered list of matches where each
//! match only knows which matches feed it (`winner` or `loser` of a previous match).
//! This module rebuilds the visual structure from that: per-match depth, upper/lower
//! side, the grand final, and labeled rounds.
use crate::{BracketRound, FeedKind, Match, ParsedBracket};
use log::debug;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    /// The previous-match references loop back on themselves.
    Cycle { match_id: u64 },
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::Cycle { match_id } => {
                write!(f, "bracket feeder graph has a cycle through match {match_id}")
            }
        }
    }
}

impl std::error::Error for BracketError {}

/// Rebuild the bracket structure from a flat match list.
///
/// Returns `Ok(None)` for an empty list. Every input match ends up in exactly one of
/// the upper rounds, the lower rounds, or the grand final.
pub fn parse_bracket(matches: &[Match]) -> Result<Option<ParsedBracket>, BracketError> {
    if matches.is_empty() {
        return Ok(None);
    }

    let graph = FeedGraph::build(matches);
    let depths = graph.depths()?;
    let lower = graph.classify_lower(&depths);

    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let mut grand_final = graph.find_grand_final(&depths, &lower, max_depth);

    let mut upper_groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut lower_groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for idx in graph.by_depth(&depths) {
        if Some(idx) == grand_final {
            continue;
        }
        let groups = if lower[idx] { &mut lower_groups } else { &mut upper_groups };
        groups.entry(depths[idx]).or_default().push(idx);
    }

    // Without a lower bracket, the lone deepest match is just the final.
    if lower_groups.is_empty()
        && let Some(idx) = grand_final
        && !lower[idx]
    {
        upper_groups.entry(depths[idx]).or_default().push(idx);
        grand_final = None;
    }

    let single_elimination = lower_groups.is_empty();
    let upper_labels = upper_round_labels(&upper_groups, single_elimination);
    let lower_labels = lower_round_labels(lower_groups.len());

    let build = |groups: BTreeMap<u32, Vec<usize>>, labels: Vec<String>| -> Vec<BracketRound> {
        groups
            .into_iter()
            .zip(labels)
            .map(|((depth, idxs), label)| BracketRound {
                label,
                depth,
                matches: idxs.into_iter().map(|i| matches[i].clone()).collect(),
            })
            .collect()
    };

    Ok(Some(ParsedBracket {
        upper: build(upper_groups, upper_labels),
        lower: build(lower_groups, lower_labels),
        grand_final: grand_final.map(|i| matches[i].clone()),
    }))
}

/// Depth of every match keyed by id: 0 for first-round matches, otherwise one more than
/// the deepest feeder. Duplicate ids report the first entry.
pub fn match_depths(matches: &[Match]) -> Result<HashMap<u64, u32>, BracketError> {
    let graph = FeedGraph::build(matches);
    let depths = graph.depths()?;
    Ok(graph
        .index
        .iter()
        .map(|(&id, &idx)| (id, depths[idx]))
        .collect())
}

// ---------------------------------------------------------------------------
// Feeder graph
// ---------------------------------------------------------------------------

/// One node per input entry. Edges point from a feeder to the match it feeds.
struct FeedGraph<'a> {
    matches: &'a [Match],
    /// Match id → first input position carrying that id.
    index: HashMap<u64, usize>,
    /// Per node: (feed kind, resolved feeder). `None` = the feeder isn't in the input.
    feeders: Vec<Vec<(FeedKind, Option<usize>)>>,
}

impl<'a> FeedGraph<'a> {
    fn build(matches: &'a [Match]) -> Self {
        let mut index = HashMap::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            index.entry(m.id).or_insert(i);
        }

        let feeders = matches
            .iter()
            .map(|m| {
                m.previous_matches
                    .iter()
                    .map(|p| {
                        let resolved = index.get(&p.match_id).copied();
                        if resolved.is_none() {
                            debug!("match {} references unknown match {}", m.id, p.match_id);
                        }
                        (p.kind, resolved)
                    })
                    .collect()
            })
            .collect();

        Self { matches, index, feeders }
    }

    /// Kahn's algorithm over the feeder edges. Unknown feeders count as depth 0.
    fn depths(&self) -> Result<Vec<u32>, BracketError> {
        let n = self.matches.len();
        let mut pending = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, feeders) in self.feeders.iter().enumerate() {
            for &(_, feeder) in feeders {
                if let Some(f) = feeder {
                    pending[i] += 1;
                    dependents[f].push(i);
                }
            }
        }

        let mut depths = vec![0u32; n];
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut visited = 0;

        while let Some(i) = queue.pop_front() {
            visited += 1;
            if !self.feeders[i].is_empty() {
                let deepest = self.feeders[i]
                    .iter()
                    .map(|&(_, feeder)| feeder.map_or(0, |f| depths[f]))
                    .max()
                    .unwrap_or(0);
                depths[i] = deepest + 1;
            }
            for &d in &dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    queue.push_back(d);
                }
            }
        }

        if visited < n {
            let stuck = (0..n).find(|&i| pending[i] > 0).unwrap_or(0);
            return Err(BracketError::Cycle { match_id: self.matches[stuck].id });
        }
        Ok(depths)
    }

    /// Node indices ordered by ascending depth, input order within a depth.
    fn by_depth(&self, depths: &[u32]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.matches.len()).collect();
        order.sort_by_key(|&i| (depths[i], i));
        order
    }

    /// A match is lower bracket if it is fed by a loser, or if the winner of a
    /// lower-bracket match feeds it. Ascending depth order settles feeders first.
    fn classify_lower(&self, depths: &[u32]) -> Vec<bool> {
        let mut lower = vec![false; self.matches.len()];
        for i in self.by_depth(depths) {
            lower[i] = self.matches[i].has_loser_feed()
                || self.feeders[i].iter().any(|&(kind, feeder)| {
                    kind == FeedKind::Winner && feeder.is_some_and(|f| lower[f])
                });
        }
        lower
    }

    /// Prefer a deepest match where the upper and lower brackets converge. Failing
    /// that, a lone deepest match is taken as the final.
    fn find_grand_final(&self, depths: &[u32], lower: &[bool], max_depth: u32) -> Option<usize> {
        let deepest: Vec<usize> = (0..self.matches.len())
            .filter(|&i| depths[i] == max_depth)
            .collect();

        let converging = deepest.iter().copied().find(|&i| {
            let feeders = &self.feeders[i];
            let resolved = || feeders.iter().filter_map(|&(_, f)| f);
            feeders.len() >= 2
                && resolved().any(|f| !lower[f])
                && resolved().any(|f| lower[f])
        });

        match (converging, deepest.as_slice()) {
            (Some(i), _) => Some(i),
            (None, [only]) => Some(*only),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Round labels
// ---------------------------------------------------------------------------

fn upper_round_labels(groups: &BTreeMap<u32, Vec<usize>>, single_elimination: bool) -> Vec<String> {
    let n = groups.len();
    if n == 1 {
        return vec!["Final".to_owned()];
    }

    groups
        .values()
        .enumerate()
        .map(|(i, idxs)| {
            let label = match n - 1 - i {
                0 => "UB Final".to_owned(),
                1 => "UB Semifinal".to_owned(),
                // Irregular bracket sizes would make "Quarterfinal" misleading.
                2 if idxs.len() == 4 => "UB Quarterfinal".to_owned(),
                _ => format!("UB Round {}", i + 1),
            };
            if single_elimination {
                label.trim_start_matches("UB ").to_owned()
            } else {
                label
            }
        })
        .collect()
}

fn lower_round_labels(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            if i + 1 == n {
                "LB Final".to_owned()
            } else {
                format!("LB Round {}", i + 1)
            }
        })
        .collect()
}
