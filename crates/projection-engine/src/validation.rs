use std::fmt;

use crate::{is_assumption_unset, AssumptionMetric, ProjectionHorizon, ScenarioAssumptions};

const MAX_PE_MULTIPLE: f64 = 200.0;

/// Something odd about an entered assumption. Purely informational: the
/// engine still computes with whatever was entered.
#[derive(Debug, Clone, PartialEq)]
pub enum AssumptionIssue {
    PeHighBelowLow { year: i32, low: f64, high: f64 },
    PeOutOfRange { metric: AssumptionMetric, year: i32, value: f64 },
    RevenueWipedOut { year: i32, growth: f64 },
    NegativeNetIncomeGrowth { year: i32, growth: f64 },
}

impl fmt::Display for AssumptionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssumptionIssue::PeHighBelowLow { year, low, high } => write!(
                f,
                "{}: P/E high ({}) is below P/E low ({})",
                year, high, low
            ),
            AssumptionIssue::PeOutOfRange { metric, year, value } => write!(
                f,
                "{}: {} must be between 0 and {} (got {})",
                year, metric, MAX_PE_MULTIPLE, value
            ),
            AssumptionIssue::RevenueWipedOut { year, growth } => write!(
                f,
                "{}: revenue growth of {}% leaves no revenue",
                year, growth
            ),
            AssumptionIssue::NegativeNetIncomeGrowth { year, growth } => write!(
                f,
                "{}: negative net income growth ({}%) is not supported and projects 0",
                year, growth
            ),
        }
    }
}

/// Check every entered (non-zero) assumption inside the horizon.
pub fn validate_assumptions(
    assumptions: &ScenarioAssumptions,
    horizon: &ProjectionHorizon,
) -> Vec<AssumptionIssue> {
    let mut issues = Vec::new();

    let pe_years = std::iter::once(horizon.current_year).chain(horizon.projection_years());
    for year in pe_years {
        let low = assumptions.get(AssumptionMetric::PeLow, year);
        let high = assumptions.get(AssumptionMetric::PeHigh, year);

        for (metric, value) in [(AssumptionMetric::PeLow, low), (AssumptionMetric::PeHigh, high)] {
            if !is_assumption_unset(value) && (value < 0.0 || value > MAX_PE_MULTIPLE) {
                issues.push(AssumptionIssue::PeOutOfRange { metric, year, value });
            }
        }
        if !is_assumption_unset(low) && !is_assumption_unset(high) && high < low {
            issues.push(AssumptionIssue::PeHighBelowLow { year, low, high });
        }
    }

    for year in horizon.projection_years() {
        let revenue_growth = assumptions.get(AssumptionMetric::RevenueGrowth, year);
        if !is_assumption_unset(revenue_growth) && revenue_growth <= -100.0 {
            issues.push(AssumptionIssue::RevenueWipedOut {
                year,
                growth: revenue_growth,
            });
        }

        let net_income_growth = assumptions.get(AssumptionMetric::NetIncomeGrowth, year);
        if !is_assumption_unset(net_income_growth) && net_income_growth < 0.0 {
            issues.push(AssumptionIssue::NegativeNetIncomeGrowth {
                year,
                growth: net_income_growth,
            });
        }
    }

    if !issues.is_empty() {
        tracing::debug!("Assumption validation found {} issue(s)", issues.len());
    }

    issues
}
