use crate::cli::StatsSource;
use anyhow::{Context, Result};
use esports_api::Match;
use esports_api::TournamentSummary;
use esports_api::client::EsportsApi;
use esports_api::pandascore::{PsMatch, PsTournament};
use esports_api::stats::StatsPayload;
use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Where a command's input comes from: a saved payload or the live API.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a, Id> {
    File(&'a Path),
    Live(Id),
}

impl<'a, Id: Copy> Input<'a, Id> {
    /// `file` wins over `id`; clap already rejects both being set.
    pub fn pick(file: Option<&'a Path>, id: Option<Id>) -> Result<Self> {
        match (file, id) {
            (Some(path), _) => Ok(Input::File(path)),
            (None, Some(id)) => Ok(Input::Live(id)),
            (None, None) => anyhow::bail!("either an id or --file is required"),
        }
    }
}

pub struct Loader {
    client: EsportsApi,
}

impl Loader {
    pub fn new(client: EsportsApi) -> Self {
        Self { client }
    }

    pub async fn bracket(&self, input: Input<'_, u64>) -> Result<Vec<Match>> {
        match input {
            Input::File(path) => {
                let raw: Vec<PsMatch> = read_json(path)?;
                Ok(raw.into_iter().map(Match::from).collect())
            }
            Input::Live(tournament_id) => {
                debug!("loading bracket for tournament {tournament_id}");
                self.client
                    .fetch_bracket(tournament_id)
                    .await
                    .with_context(|| format!("fetching bracket of tournament {tournament_id}"))
            }
        }
    }

    pub async fn stats(&self, source: StatsSource, input: Input<'_, &str>) -> Result<StatsPayload> {
        let payload = match (source, input) {
            (StatsSource::Faceit, Input::File(path)) => StatsPayload::Faceit(read_json(path)?),
            (StatsSource::Pandascore, Input::File(path)) => StatsPayload::PandaScore(read_json(path)?),
            (StatsSource::Graphql, Input::File(path)) => StatsPayload::Graphql(read_graphql(path)?),
            (StatsSource::Faceit, Input::Live(id)) => {
                debug!("loading FACEIT stats for {id}");
                StatsPayload::Faceit(
                    self.client
                        .fetch_faceit_stats(id)
                        .await
                        .with_context(|| format!("fetching FACEIT stats of match {id}"))?,
                )
            }
            (StatsSource::Pandascore, Input::Live(id)) => {
                let match_id: u64 = id
                    .parse()
                    .with_context(|| format!("PandaScore match ids are numeric, got {id:?}"))?;
                debug!("loading PandaScore games for {match_id}");
                StatsPayload::PandaScore(
                    self.client
                        .fetch_pandascore_games(match_id)
                        .await
                        .with_context(|| format!("fetching PandaScore games of match {match_id}"))?,
                )
            }
            (StatsSource::Graphql, Input::Live(id)) => {
                debug!("loading GraphQL stats for {id}");
                StatsPayload::Graphql(
                    self.client
                        .fetch_graphql_stats(id)
                        .await
                        .with_context(|| format!("fetching GraphQL stats of match {id}"))?,
                )
            }
        };
        Ok(payload)
    }

    pub async fn tournaments(&self, file: Option<&Path>) -> Result<Vec<TournamentSummary>> {
        match file {
            Some(path) => {
                let raw: Vec<PsTournament> = read_json(path)?;
                Ok(raw.into_iter().map(TournamentSummary::from).collect())
            }
            None => {
                debug!("loading running, upcoming and past tournaments");
                self.client.fetch_tournaments().await.context("fetching tournaments")
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Saved GraphQL payloads may be the full `{ "data": { "match": .. } }` envelope
/// or just the inner match object.
fn read_graphql(path: &Path) -> Result<esports_api::graphql::PlayerStatsPayload> {
    let value: serde_json::Value = read_json(path)?;
    let inner = value
        .pointer("/data/match")
        .cloned()
        .unwrap_or(value);
    serde_json::from_value(inner).with_context(|| format!("parsing {}", path.display()))
}
