use thiserror::Error;
use valuation_core::Ticker;

use projection_engine::AssumptionMetric;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("No ticker is loaded")]
    NotLoaded,

    #[error("Base financials for {requested} are not loaded")]
    BaseNotLoaded { requested: Ticker },

    #[error("{metric} cannot be set for {year} (allowed {first}-{last})")]
    YearOutOfRange {
        metric: AssumptionMetric,
        year: i32,
        first: i32,
        last: i32,
    },

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}
