use valuation_core::{is_usable, BaseFinancials, MarketInputs};

use crate::{
    is_assumption_unset, AssumptionMetric, ProjectionHorizon, ProjectionWarning,
    ScenarioAssumptions, ScenarioResult,
};

/// Years out from the base year before a CAGR is reported.
const MIN_CAGR_YEARS: i32 = 2;

/// Turns one scenario's assumptions into year-by-year projections.
///
/// Each year compounds off the previous year's *projected* revenue and net
/// income, so an unset year zeroes every year after it. All helpers are
/// total: missing, zero or non-finite inputs produce `0`, never an error.
pub struct ProjectionEngine;

impl ProjectionEngine {
    pub fn new() -> Self {
        Self
    }

    fn calculate_revenue(&self, previous_revenue: f64, growth: f64) -> f64 {
        if is_assumption_unset(growth) {
            return 0.0;
        }
        finite_or_zero(previous_revenue * (1.0 + growth / 100.0))
    }

    fn calculate_net_income(&self, previous_net_income: f64, growth: f64) -> f64 {
        // Negative growth is not supported and zeroes the year like an unset one.
        if is_assumption_unset(growth) || growth < 0.0 {
            return 0.0;
        }
        finite_or_zero(previous_net_income * (1.0 + growth / 100.0))
    }

    fn calculate_net_income_margin(&self, net_income: f64, revenue: f64) -> f64 {
        if revenue == 0.0 || !revenue.is_finite() {
            return 0.0;
        }
        finite_or_zero(net_income / revenue * 100.0)
    }

    fn calculate_eps(&self, net_income: f64, shares_outstanding: Option<f64>) -> f64 {
        match shares_outstanding {
            Some(shares) => finite_or_zero(net_income / shares),
            None => 0.0,
        }
    }

    fn calculate_share_price(&self, eps: f64, pe: f64) -> f64 {
        if eps == 0.0 || pe == 0.0 || !eps.is_finite() || !pe.is_finite() {
            return 0.0;
        }
        finite_or_zero(eps * pe)
    }

    fn calculate_cagr(&self, share_price: f64, current_price: Option<f64>, years: i32) -> f64 {
        let Some(current_price) = current_price else {
            return 0.0;
        };
        if years <= 0 || !is_usable(share_price) {
            return 0.0;
        }
        finite_or_zero(((share_price / current_price).powf(1.0 / years as f64) - 1.0) * 100.0)
    }

    /// Share count from stock info, falling back to the base record's own count.
    fn resolve_shares_outstanding(
        &self,
        base: &BaseFinancials,
        market: &MarketInputs,
    ) -> Option<f64> {
        market
            .shares_outstanding
            .filter(|v| is_usable(*v))
            .or_else(|| Some(base.shares_outstanding).filter(|v| is_usable(*v)))
    }

    /// Live price from stock info, falling back to the base record's price.
    fn resolve_current_price(&self, base: &BaseFinancials, market: &MarketInputs) -> Option<f64> {
        market
            .current_price
            .filter(|v| is_usable(*v))
            .or_else(|| Some(base.price).filter(|v| is_usable(*v)))
    }

    /// Full recompute of a scenario from the base year.
    pub fn project(
        &self,
        base: &BaseFinancials,
        market: &MarketInputs,
        assumptions: &ScenarioAssumptions,
        horizon: &ProjectionHorizon,
    ) -> ScenarioResult {
        let shares_outstanding = self.resolve_shares_outstanding(base, market);
        let current_price = self.resolve_current_price(base, market);

        let mut result = ScenarioResult::default();
        if shares_outstanding.is_none() {
            result
                .warnings
                .push(ProjectionWarning::SharesOutstandingUnavailable);
        }
        if current_price.is_none() {
            result.warnings.push(ProjectionWarning::CurrentPriceUnavailable);
        }

        // The base year is priced off actual EPS, not the recurrence.
        let current_year = horizon.current_year;
        result.share_price_low.insert(
            current_year,
            self.calculate_share_price(
                base.eps,
                assumptions.get(AssumptionMetric::PeLow, current_year),
            ),
        );
        result.share_price_high.insert(
            current_year,
            self.calculate_share_price(
                base.eps,
                assumptions.get(AssumptionMetric::PeHigh, current_year),
            ),
        );

        let mut previous_revenue = base.revenue;
        let mut previous_net_income = base.net_income;

        for (offset, year) in horizon.projection_years().enumerate() {
            let years_from_current = offset as i32 + 1;

            let revenue = self.calculate_revenue(
                previous_revenue,
                assumptions.get(AssumptionMetric::RevenueGrowth, year),
            );
            let net_income = self.calculate_net_income(
                previous_net_income,
                assumptions.get(AssumptionMetric::NetIncomeGrowth, year),
            );
            let margin = self.calculate_net_income_margin(net_income, revenue);
            let eps = self.calculate_eps(net_income, shares_outstanding);
            let price_low =
                self.calculate_share_price(eps, assumptions.get(AssumptionMetric::PeLow, year));
            let price_high =
                self.calculate_share_price(eps, assumptions.get(AssumptionMetric::PeHigh, year));

            result.revenue.insert(year, revenue);
            result.net_income.insert(year, net_income);
            result.net_income_margin.insert(year, margin);
            result.eps.insert(year, eps);
            result.share_price_low.insert(year, price_low);
            result.share_price_high.insert(year, price_high);

            if years_from_current >= MIN_CAGR_YEARS {
                result.cagr_low.insert(
                    year,
                    self.calculate_cagr(price_low, current_price, years_from_current),
                );
                result.cagr_high.insert(
                    year,
                    self.calculate_cagr(price_high, current_price, years_from_current),
                );
            }

            previous_revenue = revenue;
            previous_net_income = net_income;
        }

        tracing::debug!(
            "Projected {} for {} years from {} (warnings: {:?})",
            base.ticker,
            horizon.years,
            current_year,
            result.warnings
        );

        result
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
