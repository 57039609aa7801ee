mod args;
mod render;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use dashboard_client::{DashboardClient, DashboardConfig};
use dashboard_session::{DashboardSession, Section};
use scenario_store::{ScenarioCache, ScenarioStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use valuation_core::{HoldingInput, Ticker};

use args::{Cli, Command, PortfolioAction};

type Session = DashboardSession<DashboardClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dashboard_cli=info,dashboard_session=info".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = Cli::parse();
    let config = DashboardConfig::from_env();
    tracing::info!("Using dashboard API at {}", config.base_url);

    let client = DashboardClient::new(&config).context("failed to build API client")?;
    let store = ScenarioStore::new(ScenarioCache::with_snapshot(&config.scenario_state_file))
        .with_projection_years(config.projection_years);
    let mut session = DashboardSession::new(Arc::new(client), store);

    match cli.command {
        Command::Project {
            ticker,
            scenario,
            edits,
            fills,
            fresh,
        } => {
            load_ticker(&mut session, &ticker, fresh).await?;
            let store = session.store_mut();
            if let Some(name) = scenario {
                store.select_scenario(name);
            }
            for edit in edits {
                store.set_assumption(edit.metric, edit.year, edit.value)?;
            }
            for fill in fills {
                let written = store.forward_fill(fill.metric, fill.year)?;
                tracing::debug!("Filled {} later years of {}", written, fill.metric);
            }

            let store = session.store();
            print!("{}", render::scenario_table(store));
            print!("{}", render::issues(&store.validate_active()));
            println!();
            print!("{}", render::comparison(&store.comparison()));
        }
        Command::Info { ticker, mode } => {
            session.open(&ticker).await;
            session.load_details(mode).await;

            if let Some(info) = session.stock_info() {
                print!("{}", render::stock_info(info));
            }
            if let Some(metrics) = session.metrics() {
                print!("{}", render::metrics(metrics));
            }
            if let Some(financials) = session.financials() {
                println!("financials: {} top-level fields", json_width(financials));
            }
            if let Some((mode, charts)) = session.charts() {
                println!("charts ({}): {} top-level fields", mode, json_width(charts));
            }
            eprint!("{}", render::section_errors(session.errors()));
        }
        Command::Reset {
            ticker,
            scenario,
            all,
        } => {
            load_ticker(&mut session, &ticker, false).await?;
            let store = session.store_mut();
            if all {
                store.reset_all();
                println!("Cleared all scenarios for {}", ticker);
            } else {
                if let Some(name) = scenario {
                    store.select_scenario(name);
                }
                store.reset_active();
                println!("Cleared {} scenario for {}", store.active_name(), ticker);
            }
        }
        Command::Portfolio { action } => {
            run_portfolio(&mut session, action.unwrap_or(PortfolioAction::List)).await?;
        }
    }

    Ok(())
}

/// Load a ticker and fail if its base financials did not arrive.
async fn load_ticker(session: &mut Session, ticker: &Ticker, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        session.search(ticker.as_str()).await?;
    } else {
        session.open(ticker).await;
    }

    eprint!("{}", render::section_errors(session.errors()));
    if let Some(message) = session.errors().get(Section::Projections) {
        bail!("cannot project {}: {}", ticker, message);
    }
    Ok(())
}

async fn run_portfolio(session: &mut Session, action: PortfolioAction) -> anyhow::Result<()> {
    match action {
        PortfolioAction::List => session.load_portfolio().await,
        PortfolioAction::Add {
            ticker,
            shares,
            cost_basis,
        } => session
            .add_holding(&ticker, HoldingInput { shares, cost_basis })
            .await?,
        PortfolioAction::Update {
            ticker,
            shares,
            cost_basis,
        } => session
            .update_holding(&ticker, HoldingInput { shares, cost_basis })
            .await?,
        PortfolioAction::Remove { ticker } => session.remove_holding(&ticker).await?,
        PortfolioAction::Upload { file } => {
            let contents = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "holdings.csv".to_string());
            let summary = session.upload_holdings(&file_name, contents).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    match session.portfolio() {
        Some(portfolio) => print!("{}", render::portfolio(portfolio)),
        None => eprint!("{}", render::section_errors(session.errors())),
    }
    Ok(())
}

fn json_width(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Object(map) => map.len(),
        serde_json::Value::Array(items) => items.len(),
        _ => 1,
    }
}
