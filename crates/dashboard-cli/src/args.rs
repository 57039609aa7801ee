use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use projection_engine::AssumptionMetric;
use scenario_store::ScenarioName;
use valuation_core::{ChartMode, Ticker};

/// Bear/base/bull valuation projections from the command line.
#[derive(Parser)]
#[command(name = "valuation-dashboard", about = "Scenario-based stock valuation projections")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Edit and print a ticker's scenario projections.
    Project {
        ticker: Ticker,

        /// Scenario to edit and print (bear, base, bull).
        #[arg(long)]
        scenario: Option<ScenarioName>,

        /// Set an assumption, e.g. `revenue_growth:2026=10`. Repeatable.
        #[arg(long = "set", value_name = "METRIC:YEAR=VALUE")]
        edits: Vec<AssumptionEdit>,

        /// Copy a year's value into every later year, e.g. `pe_low:2026`. Repeatable.
        #[arg(long = "fill", value_name = "METRIC:YEAR")]
        fills: Vec<FillFrom>,

        /// Refetch everything and start the scenarios over.
        #[arg(long)]
        fresh: bool,
    },

    /// Print stock info, key metrics and what the financials/charts endpoints returned.
    Info {
        ticker: Ticker,

        #[arg(long, default_value = "quarterly")]
        mode: ChartMode,
    },

    /// Clear scenario assumptions for a ticker.
    Reset {
        ticker: Ticker,

        /// Scenario to clear when `--all` is not given.
        #[arg(long)]
        scenario: Option<ScenarioName>,

        /// Clear all three scenarios.
        #[arg(long)]
        all: bool,
    },

    /// Portfolio holdings.
    Portfolio {
        #[command(subcommand)]
        action: Option<PortfolioAction>,
    },
}

#[derive(Subcommand)]
pub enum PortfolioAction {
    List,
    Add {
        ticker: Ticker,
        shares: f64,
        cost_basis: f64,
    },
    Update {
        ticker: Ticker,
        shares: f64,
        cost_basis: f64,
    },
    Remove {
        ticker: Ticker,
    },
    /// Import a brokerage CSV export.
    Upload {
        file: PathBuf,
    },
}

/// `METRIC:YEAR=VALUE`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssumptionEdit {
    pub metric: AssumptionMetric,
    pub year: i32,
    pub value: f64,
}

impl FromStr for AssumptionEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected METRIC:YEAR=VALUE, got {:?}", s))?;
        let FillFrom { metric, year } = target.parse()?;
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid value {:?}", value))?;
        if !value.is_finite() {
            return Err(format!("invalid value {:?}", value));
        }
        Ok(Self { metric, year, value })
    }
}

/// `METRIC:YEAR`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillFrom {
    pub metric: AssumptionMetric,
    pub year: i32,
}

impl FromStr for FillFrom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (metric, year) = s
            .split_once(':')
            .ok_or_else(|| format!("expected METRIC:YEAR, got {:?}", s))?;
        let metric = metric.parse::<AssumptionMetric>().map_err(|e| e.to_string())?;
        let year = year
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid year {:?}", year))?;
        Ok(Self { metric, year })
    }
}
