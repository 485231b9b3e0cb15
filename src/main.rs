mod cli;
mod loader;
mod render;

use crate::cli::{Cli, Command, TeamArgs};
use crate::loader::{Input, Loader};
use anyhow::{Context, Result};
use clap::Parser;
use esports_api::bracket::parse_bracket;
use esports_api::client::EsportsApi;
use esports_api::series::{annotate, group_by_series, sort_events};
use esports_api::stats::NormalizeStats;
use esports_api::{TeamContext, TeamRef};
use log::{LevelFilter, debug, warn};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    better_panic::install();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loader = Loader::new(EsportsApi::new());
    let output = run(&loader, cli.command).await?;
    println!("{}", output.trim_end());
    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

async fn run(loader: &Loader, command: Command) -> Result<String> {
    match command {
        Command::Bracket { tournament, file, json } => {
            let matches = loader.bracket(Input::pick(file.as_deref(), tournament)?).await?;
            debug!("{} bracket matches loaded", matches.len());
            let Some(parsed) = parse_bracket(&matches).context("bracket has no valid round order")?
            else {
                return Ok("No bracket.".to_string());
            };
            if json { to_json(&parsed) } else { Ok(render::bracket(&parsed)) }
        }
        Command::Stats { source, match_id, file, teams, json } => {
            let payload = loader
                .stats(source, Input::pick(file.as_deref(), match_id.as_deref())?)
                .await?;
            let Some(stats) = payload.normalize(&team_context(teams)) else {
                warn!("no played maps in {source:?} payload");
                return Ok("No stats available.".to_string());
            };
            if json { to_json(&render::StatsReport::new(&stats)) } else { Ok(render::stats(&stats)) }
        }
        Command::Series { file, region, json } => {
            let tournaments = loader.tournaments(file.as_deref()).await?;
            let annotated = annotate(tournaments, chrono::Utc::now(), &region);
            let mut events = group_by_series(&annotated);
            sort_events(&mut events);
            if json { to_json(&events) } else { Ok(render::series(&events, &region)) }
        }
    }
}

/// Names left unset are filled from the payload by the normalizers.
fn team_context(teams: TeamArgs) -> TeamContext {
    let team = |id: Option<String>, name: Option<String>| TeamRef {
        id,
        name: name.unwrap_or_default(),
        logo: None,
    };
    TeamContext::new(
        team(teams.team1_id, teams.team1_name),
        team(teams.team2_id, teams.team2_name),
    )
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}
