use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of years projected past the base year unless configured otherwise.
pub const DEFAULT_PROJECTION_YEARS: u32 = 4;

/// Longest horizon a projection may cover.
pub const MAX_PROJECTION_YEARS: u32 = 50;

/// An assumption value of `0` means the user has not entered anything yet.
///
/// Zero is overloaded as "unset" rather than "flat": every projection that
/// reads an unset assumption yields `0`. Non-finite values are treated the
/// same way.
pub fn is_assumption_unset(value: f64) -> bool {
    !value.is_finite() || value == 0.0
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown assumption metric: {0}")]
pub struct UnknownMetric(pub String);

/// The four user-editable inputs of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionMetric {
    /// Percent growth over the previous year's projected revenue.
    RevenueGrowth,
    /// Percent growth over the previous year's projected net income.
    NetIncomeGrowth,
    /// Low-end P/E multiple.
    PeLow,
    /// High-end P/E multiple.
    PeHigh,
}

impl AssumptionMetric {
    pub const ALL: [AssumptionMetric; 4] = [
        AssumptionMetric::RevenueGrowth,
        AssumptionMetric::NetIncomeGrowth,
        AssumptionMetric::PeLow,
        AssumptionMetric::PeHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssumptionMetric::RevenueGrowth => "revenue_growth",
            AssumptionMetric::NetIncomeGrowth => "net_income_growth",
            AssumptionMetric::PeLow => "pe_low",
            AssumptionMetric::PeHigh => "pe_high",
        }
    }

    /// Only the P/E multiples have a value for the base (current) year.
    pub fn allows_current_year(&self) -> bool {
        matches!(self, AssumptionMetric::PeLow | AssumptionMetric::PeHigh)
    }

    pub fn is_growth(&self) -> bool {
        !self.allows_current_year()
    }
}

impl fmt::Display for AssumptionMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssumptionMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "revenue_growth" | "revenue" => Ok(AssumptionMetric::RevenueGrowth),
            "net_income_growth" | "net_income" => Ok(AssumptionMetric::NetIncomeGrowth),
            "pe_low" => Ok(AssumptionMetric::PeLow),
            "pe_high" => Ok(AssumptionMetric::PeHigh),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}

/// Which years a projection covers: the base year plus `years` after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionHorizon {
    pub current_year: i32,
    pub years: u32,
}

impl ProjectionHorizon {
    /// `years` is clamped to `1..=MAX_PROJECTION_YEARS`.
    pub fn new(current_year: i32, years: u32) -> Self {
        Self {
            current_year,
            years: years.clamp(1, MAX_PROJECTION_YEARS),
        }
    }

    pub fn with_default_years(current_year: i32) -> Self {
        Self::new(current_year, DEFAULT_PROJECTION_YEARS)
    }

    /// Projection years in chronological order, excluding the base year.
    pub fn projection_years(&self) -> impl Iterator<Item = i32> {
        let first = self.current_year + 1;
        first..first + self.years as i32
    }

    pub fn final_year(&self) -> i32 {
        self.current_year + self.years as i32
    }

    pub fn is_projection_year(&self, year: i32) -> bool {
        year > self.current_year && year <= self.final_year()
    }

    /// Whether `metric` may hold a value for `year` under this horizon.
    pub fn accepts(&self, metric: AssumptionMetric, year: i32) -> bool {
        self.is_projection_year(year)
            || (year == self.current_year && metric.allows_current_year())
    }
}

/// User-entered inputs for one scenario, keyed by year.
///
/// Year keys serialize as strings (`"2026"`), matching how the dashboard
/// labels its columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    #[serde(default)]
    pub revenue_growth: BTreeMap<i32, f64>,
    #[serde(default)]
    pub net_income_growth: BTreeMap<i32, f64>,
    #[serde(default)]
    pub pe_low: BTreeMap<i32, f64>,
    #[serde(default)]
    pub pe_high: BTreeMap<i32, f64>,
}

impl ScenarioAssumptions {
    pub fn values(&self, metric: AssumptionMetric) -> &BTreeMap<i32, f64> {
        match metric {
            AssumptionMetric::RevenueGrowth => &self.revenue_growth,
            AssumptionMetric::NetIncomeGrowth => &self.net_income_growth,
            AssumptionMetric::PeLow => &self.pe_low,
            AssumptionMetric::PeHigh => &self.pe_high,
        }
    }

    fn values_mut(&mut self, metric: AssumptionMetric) -> &mut BTreeMap<i32, f64> {
        match metric {
            AssumptionMetric::RevenueGrowth => &mut self.revenue_growth,
            AssumptionMetric::NetIncomeGrowth => &mut self.net_income_growth,
            AssumptionMetric::PeLow => &mut self.pe_low,
            AssumptionMetric::PeHigh => &mut self.pe_high,
        }
    }

    /// Value for `year`, `0` when nothing was entered.
    pub fn get(&self, metric: AssumptionMetric, year: i32) -> f64 {
        self.values(metric).get(&year).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, metric: AssumptionMetric, year: i32, value: f64) {
        self.values_mut(metric).insert(year, value);
    }

    /// Copy the value at `from_year` into every later projection year.
    ///
    /// The source year and anything before it are left alone. Returns how
    /// many years were written; filling from the final year writes none.
    pub fn forward_fill(
        &mut self,
        metric: AssumptionMetric,
        from_year: i32,
        horizon: &ProjectionHorizon,
    ) -> usize {
        if !horizon.accepts(metric, from_year) {
            return 0;
        }
        let value = self.get(metric, from_year);
        let targets: Vec<i32> = horizon
            .projection_years()
            .filter(|year| *year > from_year)
            .collect();
        let values = self.values_mut(metric);
        for year in &targets {
            values.insert(*year, value);
        }
        targets.len()
    }

    /// True when no metric holds a set (non-zero) value.
    pub fn is_empty(&self) -> bool {
        AssumptionMetric::ALL.iter().all(|metric| {
            self.values(*metric)
                .values()
                .all(|value| is_assumption_unset(*value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_years_are_clamped() {
        let horizon = ProjectionHorizon::new(2025, u32::MAX);
        assert_eq!(horizon.years, MAX_PROJECTION_YEARS);
        assert_eq!(horizon.final_year(), 2075);
        assert_eq!(horizon.projection_years().count(), 50);

        assert_eq!(ProjectionHorizon::new(2025, 0).final_year(), 2026);
    }

    #[test]
    fn test_unset_predicate() {
        assert!(is_assumption_unset(0.0));
        assert!(is_assumption_unset(-0.0));
        assert!(is_assumption_unset(f64::NAN));
        assert!(!is_assumption_unset(-5.0));
        assert!(!is_assumption_unset(0.01));
    }

    #[test]
    fn test_horizon_years() {
        let horizon = ProjectionHorizon::with_default_years(2025);
        let years: Vec<i32> = horizon.projection_years().collect();
        assert_eq!(years, vec![2026, 2027, 2028, 2029]);
        assert_eq!(horizon.final_year(), 2029);
        assert!(horizon.accepts(AssumptionMetric::PeLow, 2025));
        assert!(!horizon.accepts(AssumptionMetric::RevenueGrowth, 2025));
        assert!(!horizon.accepts(AssumptionMetric::PeHigh, 2030));
    }

    #[test]
    fn test_forward_fill_leaves_earlier_years() {
        let horizon = ProjectionHorizon::with_default_years(2025);
        let mut assumptions = ScenarioAssumptions::default();
        assumptions.set(AssumptionMetric::RevenueGrowth, 2026, 5.0);
        assumptions.set(AssumptionMetric::RevenueGrowth, 2027, 12.0);

        let written = assumptions.forward_fill(AssumptionMetric::RevenueGrowth, 2027, &horizon);

        assert_eq!(written, 2);
        assert_eq!(assumptions.get(AssumptionMetric::RevenueGrowth, 2026), 5.0);
        assert_eq!(assumptions.get(AssumptionMetric::RevenueGrowth, 2027), 12.0);
        assert_eq!(assumptions.get(AssumptionMetric::RevenueGrowth, 2028), 12.0);
        assert_eq!(assumptions.get(AssumptionMetric::RevenueGrowth, 2029), 12.0);
    }

    #[test]
    fn test_forward_fill_from_current_year_pe() {
        let horizon = ProjectionHorizon::with_default_years(2025);
        let mut assumptions = ScenarioAssumptions::default();
        assumptions.set(AssumptionMetric::PeLow, 2025, 18.0);

        let written = assumptions.forward_fill(AssumptionMetric::PeLow, 2025, &horizon);

        assert_eq!(written, 4);
        for year in horizon.projection_years() {
            assert_eq!(assumptions.get(AssumptionMetric::PeLow, year), 18.0);
        }
        assert_eq!(assumptions.get(AssumptionMetric::PeLow, 2025), 18.0);
    }

    #[test]
    fn test_forward_fill_edges() {
        let horizon = ProjectionHorizon::with_default_years(2025);
        let mut assumptions = ScenarioAssumptions::default();
        assumptions.set(AssumptionMetric::PeHigh, 2029, 30.0);
        assumptions.set(AssumptionMetric::RevenueGrowth, 2025, 9.0);

        assert_eq!(assumptions.forward_fill(AssumptionMetric::PeHigh, 2029, &horizon), 0);
        assert_eq!(
            assumptions.forward_fill(AssumptionMetric::RevenueGrowth, 2025, &horizon),
            0
        );
        assert_eq!(assumptions.get(AssumptionMetric::RevenueGrowth, 2026), 0.0);
    }

    #[test]
    fn test_year_keys_serialize_as_strings() {
        let mut assumptions = ScenarioAssumptions::default();
        assumptions.set(AssumptionMetric::PeHigh, 2026, 25.0);
        let json = serde_json::to_value(&assumptions).unwrap();
        assert_eq!(json["pe_high"]["2026"], 25.0);

        let back: ScenarioAssumptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, assumptions);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!(
            "Revenue-Growth".parse::<AssumptionMetric>().unwrap(),
            AssumptionMetric::RevenueGrowth
        );
        assert_eq!("pe_low".parse::<AssumptionMetric>().unwrap(), AssumptionMetric::PeLow);
        assert!("ev_ebitda".parse::<AssumptionMetric>().is_err());
        assert!(AssumptionMetric::NetIncomeGrowth.is_growth());
    }

    #[test]
    fn test_is_empty_ignores_zero_entries() {
        let mut assumptions = ScenarioAssumptions::default();
        assert!(assumptions.is_empty());
        assumptions.set(AssumptionMetric::PeLow, 2026, 0.0);
        assert!(assumptions.is_empty());
        assumptions.set(AssumptionMetric::PeLow, 2026, 15.0);
        assert!(!assumptions.is_empty());
    }
}
