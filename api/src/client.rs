use crate::faceit::MatchStatsResponse;
use crate::graphql::{
    GraphqlRequest, GraphqlResponse, MATCH_STATS_QUERY, MatchStatsData, PlayerStatsPayload,
};
use crate::pandascore::{GamesPayload, PsMatch, PsTeam, PsTournament};
use crate::{
    FeedKind, Match, MatchResult, MatchStatus, Opponent, PreviousMatch, Tier, TournamentSummary,
};
use chrono::{DateTime, Utc};
use futures_util::future::{join_all, try_join_all};
use log::debug;
use reqwest::{Client, RequestBuilder};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const PANDASCORE_BASE: &str = "https://api.pandascore.co";
const FACEIT_BASE: &str = "https://open.faceit.com/data/v4";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// PandaScore's page size ceiling.
const PER_PAGE: u32 = 100;

/// Endpoints, credentials and timeout for the upstream APIs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub pandascore_base: String,
    pub pandascore_token: Option<String>,
    pub faceit_base: String,
    pub faceit_api_key: Option<String>,
    pub graphql_url: Option<String>,
    pub graphql_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            pandascore_base: PANDASCORE_BASE.to_owned(),
            pandascore_token: None,
            faceit_base: FACEIT_BASE.to_owned(),
            faceit_api_key: None,
            graphql_url: None,
            graphql_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Read configuration from the environment. Unset or blank variables keep the defaults.
    ///
    /// `PANDASCORE_TOKEN`, `PANDASCORE_BASE_URL`, `FACEIT_API_KEY`, `FACEIT_BASE_URL`,
    /// `CS_GRAPHQL_URL`, `CS_GRAPHQL_TOKEN`, `CS_API_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pandascore_base: env_var("PANDASCORE_BASE_URL").unwrap_or(defaults.pandascore_base),
            pandascore_token: env_var("PANDASCORE_TOKEN"),
            faceit_base: env_var("FACEIT_BASE_URL").unwrap_or(defaults.faceit_base),
            faceit_api_key: env_var("FACEIT_API_KEY"),
            graphql_url: env_var("CS_GRAPHQL_URL"),
            graphql_token: env_var("CS_GRAPHQL_TOKEN"),
            timeout: env_var("CS_API_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .map_or(defaults.timeout, Duration::from_secs),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Client for the PandaScore, FACEIT and GraphQL stats APIs.
#[derive(Debug, Clone)]
pub struct EsportsApi {
    client: Client,
    config: ApiConfig,
}

impl Default for EsportsApi {
    fn default() -> Self {
        Self::with_config(ApiConfig::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Graphql(String),
    NotFound(String),
    Config(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Graphql(msg) => write!(f, "GraphQL error: {msg}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl EsportsApi {
    pub fn new() -> Self {
        Self::with_config(ApiConfig::from_env())
    }

    pub fn with_config(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("csdash/0.1 (esports dashboard)")
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Fetch every match of a tournament's bracket, mapped to domain matches.
    pub async fn fetch_bracket(&self, tournament_id: u64) -> ApiResult<Vec<Match>> {
        let url = format!(
            "{}/tournaments/{tournament_id}/brackets?per_page={PER_PAGE}",
            self.config.pandascore_base
        );
        let raw: Vec<PsMatch> = self.get(self.pandascore(&url)?, &url).await?;
        debug!("tournament {tournament_id}: {} bracket matches", raw.len());
        Ok(raw.into_iter().map(Match::from).collect())
    }

    /// Fetch several brackets at once. Results come back in the order of `tournament_ids`.
    pub async fn fetch_brackets(&self, tournament_ids: &[u64]) -> Vec<(u64, ApiResult<Vec<Match>>)> {
        let results = join_all(tournament_ids.iter().map(|&id| self.fetch_bracket(id))).await;
        tournament_ids.iter().copied().zip(results).collect()
    }

    /// Running, upcoming and past CS tournaments, fetched concurrently and de-duplicated.
    pub async fn fetch_tournaments(&self) -> ApiResult<Vec<TournamentSummary>> {
        let lists = try_join_all(
            ["running", "upcoming", "past"]
                .into_iter()
                .map(|kind| self.fetch_tournament_list(kind)),
        )
        .await?;

        let mut seen = HashSet::new();
        Ok(lists
            .into_iter()
            .flatten()
            .filter(|t| seen.insert(t.id))
            .map(TournamentSummary::from)
            .collect())
    }

    async fn fetch_tournament_list(&self, kind: &str) -> ApiResult<Vec<PsTournament>> {
        let url = format!(
            "{}/csgo/tournaments/{kind}?per_page={PER_PAGE}",
            self.config.pandascore_base
        );
        self.get(self.pandascore(&url)?, &url).await
    }

    /// Per-game player stats of a match from PandaScore.
    pub async fn fetch_pandascore_games(&self, match_id: u64) -> ApiResult<GamesPayload> {
        let url = format!("{}/csgo/matches/{match_id}/games", self.config.pandascore_base);
        self.get(self.pandascore(&url)?, &url).await
    }

    /// Per-map match stats from the FACEIT Data API.
    pub async fn fetch_faceit_stats(&self, match_id: &str) -> ApiResult<MatchStatsResponse> {
        let key = self
            .config
            .faceit_api_key
            .as_deref()
            .ok_or_else(|| ApiError::Config("FACEIT_API_KEY is not set".into()))?;
        let url = format!("{}/matches/{match_id}/stats", self.config.faceit_base);
        self.get(self.client.get(&url).bearer_auth(key), &url).await
    }

    /// Flat player stats and games list of a match from the GraphQL API.
    pub async fn fetch_graphql_stats(&self, match_id: &str) -> ApiResult<PlayerStatsPayload> {
        let url = self
            .config
            .graphql_url
            .as_deref()
            .ok_or_else(|| ApiError::Config("CS_GRAPHQL_URL is not set".into()))?;

        let body = GraphqlRequest {
            query: MATCH_STATS_QUERY,
            variables: serde_json::json!({ "matchId": match_id }),
        };
        let mut request = self.client.post(url).json(&body);
        if let Some(token) = &self.config.graphql_token {
            request = request.bearer_auth(token);
        }

        let raw: GraphqlResponse<MatchStatsData> = self.get(request, url).await?;
        match raw.data.and_then(|d| d.match_stats) {
            Some(payload) => Ok(payload),
            None if !raw.errors.is_empty() => Err(ApiError::Graphql(
                raw.errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
            None => Err(ApiError::NotFound(format!("no stats for match {match_id}"))),
        }
    }

    fn pandascore(&self, url: &str) -> ApiResult<RequestBuilder> {
        let token = self
            .config
            .pandascore_token
            .as_deref()
            .ok_or_else(|| ApiError::Config("PANDASCORE_TOKEN is not set".into()))?;
        Ok(self.client.get(url).bearer_auth(token))
    }

    /// Send the request and decode the body. 4xx responses decode as an empty default.
    async fn get<T: Default + serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> ApiResult<T> {
        let response = request
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    debug!("{url}: {e}, treating as empty");
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: PandaScore wire types → clean domain types
// ---------------------------------------------------------------------------

impl From<PsMatch> for Match {
    fn from(m: PsMatch) -> Self {
        let previous_matches = m
            .previous_matches
            .iter()
            .map(|p| PreviousMatch {
                kind: if p.kind.eq_ignore_ascii_case("loser") {
                    FeedKind::Loser
                } else {
                    FeedKind::Winner
                },
                match_id: p.match_id,
            })
            .collect();

        let opponents = m
            .opponents
            .into_iter()
            .filter_map(|slot| slot.opponent)
            .map(map_opponent)
            .collect();

        let results = m
            .results
            .iter()
            .filter_map(|r| {
                Some(MatchResult {
                    team_id: r.team_id?,
                    score: r.score.unwrap_or_default(),
                })
            })
            .collect();

        Match {
            id: m.id,
            name: m.name,
            previous_matches,
            opponents,
            results,
            status: m.status.as_deref().map(MatchStatus::parse).unwrap_or_default(),
            winner_id: m.winner_id,
            number_of_games: m.number_of_games.unwrap_or(1),
            scheduled_at: parse_timestamp(m.scheduled_at.as_deref())
                .or_else(|| parse_timestamp(m.begin_at.as_deref())),
        }
    }
}

fn map_opponent(t: PsTeam) -> Opponent {
    Opponent {
        id: t.id,
        name: t.name.unwrap_or_default(),
        acronym: t.acronym,
        image_url: t.image_url,
    }
}

impl From<PsTournament> for TournamentSummary {
    fn from(t: PsTournament) -> Self {
        let serie_name = t
            .serie
            .as_ref()
            .and_then(|s| s.full_name.clone().or_else(|| s.name.clone()))
            .filter(|n| !n.trim().is_empty());
        let (league_name, league_image_url) = t
            .league
            .map(|l| (l.name.unwrap_or_default(), l.image_url))
            .unwrap_or_default();

        TournamentSummary {
            id: t.id,
            name: t.name.unwrap_or_default(),
            serie_id: t.serie_id.or(t.serie.as_ref().map(|s| s.id)),
            serie_name,
            league_name,
            league_image_url,
            tier: t.tier.as_deref().map(Tier::parse).unwrap_or_default(),
            region: t.region,
            begin_at: parse_timestamp(t.begin_at.as_deref()),
            end_at: parse_timestamp(t.end_at.as_deref()),
        }
    }
}

fn parse_timestamp(s: Option<&str>) -> Option<DateTime<Utc>> {
    s.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> ApiConfig {
        ApiConfig {
            pandascore_base: server.url(),
            pandascore_token: Some("ps-token".into()),
            faceit_base: server.url(),
            faceit_api_key: Some("faceit-key".into()),
            graphql_url: Some(format!("{}/graphql", server.url())),
            ..Default::default()
        }
    }

    #[test]
    fn bracket_match_maps_feeds_opponents_and_status() {
        let raw: PsMatch = serde_json::from_value(serde_json::json!({
            "id": 10,
            "name": "Grand final: A vs B",
            "previous_matches": [
                { "type": "winner", "match_id": 8 },
                { "type": "loser", "match_id": 9 }
            ],
            "opponents": [
                { "type": "Team", "opponent": { "id": 1, "name": "Vitality", "acronym": "VIT" } },
                { "type": "Team", "opponent": { "id": 2, "name": "Spirit" } }
            ],
            "results": [{ "team_id": 1, "score": 3 }, { "team_id": 2, "score": 1 }],
            "status": "finished",
            "winner_id": 1,
            "number_of_games": 5,
            "scheduled_at": "2026-06-21T15:00:00Z"
        }))
        .unwrap();
        let m = Match::from(raw);

        assert_eq!(m.previous_matches[1], PreviousMatch { kind: FeedKind::Loser, match_id: 9 });
        assert!(m.has_loser_feed());
        assert_eq!(m.opponents.len(), 2);
        assert_eq!(m.winner().map(|o| o.name.as_str()), Some("Vitality"));
        assert_eq!(m.score_for(2), Some(1));
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.number_of_games, 5);
        assert_eq!(m.scheduled_at, Some(Utc.with_ymd_and_hms(2026, 6, 21, 15, 0, 0).unwrap()));
    }

    #[test]
    fn unresolved_bracket_match_has_empty_slots() {
        let raw: PsMatch = serde_json::from_value(serde_json::json!({
            "id": 11,
            "opponents": [],
            "status": "postponed",
            "winner_id": null,
            "scheduled_at": null
        }))
        .unwrap();
        let m = Match::from(raw);
        assert!(m.opponents.is_empty());
        assert_eq!(m.status, MatchStatus::NotStarted);
        assert!(m.winner().is_none());
        assert_eq!(m.number_of_games, 1);
    }

    #[test]
    fn tournament_maps_serie_league_and_tier() {
        let raw: PsTournament = serde_json::from_value(serde_json::json!({
            "id": 500,
            "name": "Playoffs",
            "serie_id": 42,
            "serie": { "id": 42, "name": "", "full_name": "Cologne 2026" },
            "league": { "id": 1, "name": "IEM", "image_url": "https://cdn/iem.png" },
            "tier": "s",
            "region": "EU",
            "begin_at": "2026-06-10T10:00:00Z",
            "end_at": null
        }))
        .unwrap();
        let t = TournamentSummary::from(raw);
        assert_eq!(t.serie_id, Some(42));
        assert_eq!(t.serie_name.as_deref(), Some("Cologne 2026"));
        assert_eq!(t.league_name, "IEM");
        assert_eq!(t.tier, Tier::S);
        assert!(t.begin_at.is_some());
        assert!(t.end_at.is_none());
    }

    #[tokio::test]
    async fn fetch_bracket_sends_token_and_maps_matches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tournaments/77/brackets")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer ps-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"previous_matches":[]},{"id":2,"previous_matches":[{"type":"winner","match_id":1}]}]"#)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        let matches = api.fetch_bracket(77).await.unwrap();
        mock.assert_async().await;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].previous_matches[0].match_id, 1);
    }

    #[tokio::test]
    async fn client_errors_decode_as_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tournaments/1/brackets")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        assert!(api.fetch_bracket(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_errors_surface() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/csgo/matches/5/games")
            .with_status(503)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        let err = api.fetch_pandascore_games(5).await.unwrap_err();
        assert!(matches!(err, ApiError::Api(_, _)), "got {err}");
    }

    #[tokio::test]
    async fn fetch_brackets_keeps_input_order_and_per_id_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tournaments/10/brackets")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"previous_matches":[]}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/tournaments/20/brackets")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        let results = api.fetch_brackets(&[20, 10]).await;
        let ids: Vec<u64> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![20, 10]);
        assert!(matches!(results[0].1, Err(ApiError::Api(_, _))));
        assert_eq!(results[1].1.as_ref().map(Vec::len).ok(), Some(1));
    }

    #[tokio::test]
    async fn missing_token_is_a_config_error() {
        let api = EsportsApi::with_config(ApiConfig::default());
        let err = api.fetch_bracket(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn tournaments_merge_all_three_lists_without_duplicates() {
        let mut server = mockito::Server::new_async().await;
        for (kind, body) in [
            ("running", r#"[{"id":1,"tier":"a"}]"#),
            ("upcoming", r#"[{"id":2},{"id":1}]"#),
            ("past", r#"[]"#),
        ] {
            server
                .mock("GET", format!("/csgo/tournaments/{kind}").as_str())
                .match_query(Matcher::Any)
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body)
                .create_async()
                .await;
        }

        let api = EsportsApi::with_config(config_for(&server));
        let tournaments = api.fetch_tournaments().await.unwrap();
        let ids: Vec<u64> = tournaments.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(tournaments[0].tier, Tier::A);
    }

    #[tokio::test]
    async fn faceit_stats_parse() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/matches/1-abc/stats")
            .match_header("authorization", "Bearer faceit-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"rounds":[{"match_round":"1","round_stats":{"Map":"de_nuke"},"teams":[]}]}"#)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        let stats = api.fetch_faceit_stats("1-abc").await.unwrap();
        assert_eq!(stats.rounds.len(), 1);
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":null,"errors":[{"message":"match not found"}]}"#)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        let err = api.fetch_graphql_stats("m1").await.unwrap_err();
        assert!(matches!(err, ApiError::Graphql(ref msg) if msg == "match not found"));
    }

    #[tokio::test]
    async fn graphql_payload_is_unwrapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(serde_json::json!({ "variables": { "matchId": "m1" } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"match":{"games":[{"id":"g1","number":1}],"playerStats":[]}}}"#)
            .create_async()
            .await;

        let api = EsportsApi::with_config(config_for(&server));
        let payload = api.fetch_graphql_stats("m1").await.unwrap();
        assert_eq!(payload.games.len(), 1);
    }
}
