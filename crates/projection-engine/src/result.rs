use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outputs that could not be computed because an upstream value is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionWarning {
    /// No usable share count: EPS and share prices are suspended (reported as 0).
    SharesOutstandingUnavailable,
    /// No live price: CAGR is suspended (reported as 0).
    CurrentPriceUnavailable,
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionWarning::SharesOutstandingUnavailable => {
                f.write_str("shares outstanding unavailable, EPS projection suspended")
            }
            ProjectionWarning::CurrentPriceUnavailable => {
                f.write_str("current price unavailable, CAGR suspended")
            }
        }
    }
}

/// Derived outputs for one scenario, keyed by year.
///
/// `share_price_low`/`share_price_high` also carry the base year. CAGR is
/// only present from the second projection year onward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    #[serde(default)]
    pub revenue: BTreeMap<i32, f64>,
    #[serde(default)]
    pub net_income: BTreeMap<i32, f64>,
    #[serde(default)]
    pub net_income_margin: BTreeMap<i32, f64>,
    #[serde(default)]
    pub eps: BTreeMap<i32, f64>,
    #[serde(default)]
    pub share_price_low: BTreeMap<i32, f64>,
    #[serde(default)]
    pub share_price_high: BTreeMap<i32, f64>,
    #[serde(default)]
    pub cagr_low: BTreeMap<i32, f64>,
    #[serde(default)]
    pub cagr_high: BTreeMap<i32, f64>,
    #[serde(default)]
    pub warnings: Vec<ProjectionWarning>,
}

/// One column of a projection table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearProjection {
    pub year: i32,
    pub revenue: f64,
    pub net_income: f64,
    pub net_income_margin: f64,
    pub eps: f64,
    pub share_price_low: f64,
    pub share_price_high: f64,
    pub cagr_low: Option<f64>,
    pub cagr_high: Option<f64>,
}

/// Final-year price and return range, used to compare scenarios side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub final_year: i32,
    pub share_price_low: f64,
    pub share_price_high: f64,
    pub cagr_low: Option<f64>,
    pub cagr_high: Option<f64>,
}

impl ScenarioResult {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty()
            && self.net_income.is_empty()
            && self.share_price_low.is_empty()
            && self.share_price_high.is_empty()
    }

    /// Projected values for a projection year, `None` for years never computed.
    pub fn year(&self, year: i32) -> Option<YearProjection> {
        let revenue = *self.revenue.get(&year)?;
        Some(YearProjection {
            year,
            revenue,
            net_income: self.net_income.get(&year).copied().unwrap_or(0.0),
            net_income_margin: self.net_income_margin.get(&year).copied().unwrap_or(0.0),
            eps: self.eps.get(&year).copied().unwrap_or(0.0),
            share_price_low: self.share_price_low.get(&year).copied().unwrap_or(0.0),
            share_price_high: self.share_price_high.get(&year).copied().unwrap_or(0.0),
            cagr_low: self.cagr_low.get(&year).copied(),
            cagr_high: self.cagr_high.get(&year).copied(),
        })
    }

    /// All projection years in chronological order.
    pub fn years(&self) -> Vec<YearProjection> {
        self.revenue
            .keys()
            .filter_map(|year| self.year(*year))
            .collect()
    }

    pub fn summary(&self) -> Option<ScenarioSummary> {
        let last = self.years().pop()?;
        Some(ScenarioSummary {
            final_year: last.year,
            share_price_low: last.share_price_low,
            share_price_high: last.share_price_high,
            cagr_low: last.cagr_low,
            cagr_high: last.cagr_high,
        })
    }

    pub fn has_warning(&self, warning: ProjectionWarning) -> bool {
        self.warnings.contains(&warning)
    }
}
