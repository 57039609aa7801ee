use projection_engine::{
    validate_assumptions, AssumptionIssue, AssumptionMetric, ProjectionEngine, ProjectionHorizon,
    ScenarioSummary, DEFAULT_PROJECTION_YEARS,
};
use valuation_core::{BaseFinancials, MarketInputs, Ticker};

use crate::{Scenario, ScenarioCache, ScenarioError, ScenarioName, ScenarioSet};

/// What `load_for_ticker` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted set was restored as-is.
    Restored,
    /// Nothing was persisted; three empty scenarios were created.
    Initialized,
}

/// Explicit state container for the three-scenario projection.
///
/// The expected sequence for a ticker is `set_base_financials`, then
/// `load_for_ticker`, then any number of edits. Edits before the load has
/// settled are rejected, and nothing is persisted until then.
pub struct ScenarioStore {
    engine: ProjectionEngine,
    cache: ScenarioCache,
    projection_years: u32,
    base: Option<BaseFinancials>,
    horizon: Option<ProjectionHorizon>,
    market: Option<(Ticker, MarketInputs)>,
    /// Ticker whose scenarios are loaded; `None` until `load_for_ticker` succeeds.
    loaded: Option<Ticker>,
    scenarios: ScenarioSet,
}

impl ScenarioStore {
    pub fn new(cache: ScenarioCache) -> Self {
        Self {
            engine: ProjectionEngine::new(),
            cache,
            projection_years: DEFAULT_PROJECTION_YEARS,
            base: None,
            horizon: None,
            market: None,
            loaded: None,
            scenarios: ScenarioSet::default(),
        }
    }

    pub fn with_projection_years(mut self, years: u32) -> Self {
        self.projection_years = years.max(1);
        self
    }

    pub fn ticker(&self) -> Option<&Ticker> {
        self.loaded.as_ref()
    }

    pub fn base_financials(&self) -> Option<&BaseFinancials> {
        self.base.as_ref()
    }

    pub fn horizon(&self) -> Option<&ProjectionHorizon> {
        self.horizon.as_ref()
    }

    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    pub fn active_name(&self) -> ScenarioName {
        self.scenarios.active
    }

    pub fn active(&self) -> &Scenario {
        self.scenarios.active()
    }

    pub fn scenario(&self, name: ScenarioName) -> &Scenario {
        self.scenarios.get(name)
    }

    /// Install freshly fetched base financials.
    ///
    /// A different ticker unloads the current scenarios (they stay in the
    /// cache); the same ticker keeps them and refreshes their results.
    pub fn set_base_financials(&mut self, base: BaseFinancials) {
        let same_ticker = self.loaded.as_ref() == Some(&base.ticker);
        self.horizon = Some(ProjectionHorizon::new(base.data_year, self.projection_years));
        self.base = Some(base);

        if same_ticker {
            self.refresh_results();
        } else {
            self.loaded = None;
            self.scenarios = ScenarioSet::default();
        }
    }

    /// Drop the loaded ticker and its base data, e.g. after a failed fetch.
    /// Persisted scenarios are kept.
    pub fn unload(&mut self) {
        self.base = None;
        self.horizon = None;
        self.loaded = None;
        self.scenarios = ScenarioSet::default();
    }

    /// Install stock-info inputs for `ticker` and refresh computed results.
    pub fn set_market_inputs(&mut self, ticker: &Ticker, market: MarketInputs) {
        self.market = Some((ticker.clone(), market));
        if self.loaded.as_ref() == Some(ticker) {
            self.refresh_results();
        }
    }

    /// Restore persisted scenarios for `ticker`, or start from three empty ones.
    ///
    /// Base financials for the same ticker must already be installed.
    pub fn load_for_ticker(&mut self, ticker: &Ticker) -> Result<LoadOutcome, ScenarioError> {
        if self.base.as_ref().map(|b| &b.ticker) != Some(ticker) {
            return Err(ScenarioError::BaseNotLoaded {
                requested: ticker.clone(),
            });
        }

        let outcome = match self.cache.load(ticker) {
            Some(scenarios) => {
                self.scenarios = scenarios;
                LoadOutcome::Restored
            }
            None => {
                self.scenarios = ScenarioSet::default();
                LoadOutcome::Initialized
            }
        };
        self.loaded = Some(ticker.clone());

        tracing::info!("Loaded scenarios for {} ({:?})", ticker, outcome);
        Ok(outcome)
    }

    /// Switch the scenario being edited. Data is not touched.
    pub fn select_scenario(&mut self, name: ScenarioName) {
        self.scenarios.active = name;
        self.persist();
    }

    /// Write one assumption into the active scenario and recompute it.
    pub fn set_assumption(
        &mut self,
        metric: AssumptionMetric,
        year: i32,
        value: f64,
    ) -> Result<(), ScenarioError> {
        let horizon = self.editable_horizon()?;
        if !horizon.accepts(metric, year) {
            return Err(year_out_of_range(metric, year, &horizon));
        }

        let active = self.scenarios.active;
        self.scenarios
            .get_mut(active)
            .assumptions
            .set(metric, year, value);
        self.recompute(active);
        self.persist();
        Ok(())
    }

    /// Copy the active scenario's value at `from_year` into every later year.
    pub fn forward_fill(
        &mut self,
        metric: AssumptionMetric,
        from_year: i32,
    ) -> Result<usize, ScenarioError> {
        let horizon = self.editable_horizon()?;
        if !horizon.accepts(metric, from_year) {
            return Err(year_out_of_range(metric, from_year, &horizon));
        }

        let active = self.scenarios.active;
        let written = self
            .scenarios
            .get_mut(active)
            .assumptions
            .forward_fill(metric, from_year, &horizon);
        self.recompute(active);
        self.persist();
        Ok(written)
    }

    /// Clear the active scenario. The other two stay persisted; once all
    /// three are empty the ticker's entry is dropped.
    pub fn reset_active(&mut self) {
        let active = self.scenarios.active;
        *self.scenarios.get_mut(active) = Scenario::default();
        if self.scenarios.is_empty() {
            self.clear_persisted();
        } else {
            self.persist();
        }
    }

    /// Clear all three scenarios and drop the persisted entry for the ticker.
    pub fn reset_all(&mut self) {
        for name in ScenarioName::ALL {
            *self.scenarios.get_mut(name) = Scenario::default();
        }
        self.clear_persisted();
    }

    /// Forget whatever was persisted for `ticker`, e.g. ahead of a fresh search.
    pub fn discard_persisted(&mut self, ticker: &Ticker) {
        self.cache.clear(ticker);
    }

    /// Non-blocking sanity checks on the active scenario.
    pub fn validate_active(&self) -> Vec<AssumptionIssue> {
        match &self.horizon {
            Some(horizon) => validate_assumptions(&self.active().assumptions, horizon),
            None => Vec::new(),
        }
    }

    /// Final-year price ranges of all three scenarios.
    pub fn comparison(&self) -> Vec<(ScenarioName, Option<ScenarioSummary>)> {
        self.scenarios
            .iter()
            .map(|(name, scenario)| (name, scenario.result.summary()))
            .collect()
    }

    fn editable_horizon(&self) -> Result<ProjectionHorizon, ScenarioError> {
        if self.loaded.is_none() {
            return Err(ScenarioError::NotLoaded);
        }
        self.horizon.ok_or(ScenarioError::NotLoaded)
    }

    fn market_inputs(&self) -> MarketInputs {
        match (&self.market, &self.base) {
            (Some((ticker, market)), Some(base)) if *ticker == base.ticker => *market,
            _ => MarketInputs::default(),
        }
    }

    fn recompute(&mut self, name: ScenarioName) {
        let market = self.market_inputs();
        let (Some(base), Some(horizon)) = (self.base.as_ref(), self.horizon.as_ref()) else {
            return;
        };
        let scenario = self.scenarios.get_mut(name);
        scenario.result = self
            .engine
            .project(base, &market, &scenario.assumptions, horizon);
    }

    /// Recompute scenarios that already have results; reset ones stay empty.
    fn refresh_results(&mut self) {
        for name in ScenarioName::ALL {
            if !self.scenarios.get(name).result.is_empty() {
                self.recompute(name);
            }
        }
    }

    fn persist(&mut self) {
        if let Some(ticker) = &self.loaded {
            self.cache.save(ticker, &self.scenarios);
        }
    }

    fn clear_persisted(&mut self) {
        if let Some(ticker) = &self.loaded {
            self.cache.clear(ticker);
            tracing::debug!("Cleared persisted scenarios for {}", ticker);
        }
    }
}

fn year_out_of_range(
    metric: AssumptionMetric,
    year: i32,
    horizon: &ProjectionHorizon,
) -> ScenarioError {
    let first = if metric.allows_current_year() {
        horizon.current_year
    } else {
        horizon.current_year + 1
    };
    ScenarioError::YearOutOfRange {
        metric,
        year,
        first,
        last: horizon.final_year(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).unwrap()
    }

    fn base_financials(symbol: &str) -> BaseFinancials {
        BaseFinancials {
            ticker: ticker(symbol),
            price: 20.0,
            market_cap: 20_000_000_000.0,
            shares_outstanding: 1_000_000_000.0,
            revenue: 1_340_000_000.0,
            net_income: 870_000_000.0,
            net_income_margin: 64.925,
            eps: 0.87,
            data_year: 2025,
        }
    }

    /// Helper: store with base financials installed and scenarios loaded.
    fn loaded_store(symbol: &str) -> ScenarioStore {
        let mut store = ScenarioStore::new(ScenarioCache::in_memory());
        store.set_base_financials(base_financials(symbol));
        store.load_for_ticker(&ticker(symbol)).unwrap();
        store
    }

    #[test]
    fn test_edits_before_load_are_rejected() {
        let mut store = ScenarioStore::new(ScenarioCache::in_memory());
        assert_eq!(
            store.set_assumption(AssumptionMetric::RevenueGrowth, 2026, 10.0),
            Err(ScenarioError::NotLoaded)
        );
    }

    #[test]
    fn test_load_requires_matching_base_financials() {
        let mut store = ScenarioStore::new(ScenarioCache::in_memory());
        assert!(matches!(
            store.load_for_ticker(&ticker("AAPL")),
            Err(ScenarioError::BaseNotLoaded { .. })
        ));

        store.set_base_financials(base_financials("MSFT"));
        assert!(store.load_for_ticker(&ticker("AAPL")).is_err());
        assert_eq!(
            store.load_for_ticker(&ticker("MSFT")),
            Ok(LoadOutcome::Initialized)
        );
    }

    #[test]
    fn test_set_assumption_recomputes_active_only() {
        let mut store = loaded_store("ACME");
        store.select_scenario(ScenarioName::Bull);
        store
            .set_assumption(AssumptionMetric::RevenueGrowth, 2026, 10.0)
            .unwrap();

        let bull = store.scenario(ScenarioName::Bull);
        assert!((bull.result.revenue[&2026] - 1_474_000_000.0).abs() < 1e-3);
        assert!(store.scenario(ScenarioName::Bear).is_empty());
        assert!(store.scenario(ScenarioName::Base).is_empty());
    }

    #[test]
    fn test_scenarios_never_share_state() {
        let mut store = loaded_store("ACME");
        store.select_scenario(ScenarioName::Bear);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 10.0).unwrap();
        let bear_before = store.scenario(ScenarioName::Bear).clone();

        store.select_scenario(ScenarioName::Base);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 25.0).unwrap();
        store.select_scenario(ScenarioName::Bull);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 40.0).unwrap();

        assert_eq!(store.scenario(ScenarioName::Bear), &bear_before);
        assert_eq!(
            store
                .scenario(ScenarioName::Base)
                .assumptions
                .get(AssumptionMetric::PeLow, 2026),
            25.0
        );
    }

    #[test]
    fn test_year_validation() {
        let mut store = loaded_store("ACME");
        assert!(store.set_assumption(AssumptionMetric::PeLow, 2025, 18.0).is_ok());
        assert_eq!(
            store.set_assumption(AssumptionMetric::RevenueGrowth, 2025, 5.0),
            Err(ScenarioError::YearOutOfRange {
                metric: AssumptionMetric::RevenueGrowth,
                year: 2025,
                first: 2026,
                last: 2029,
            })
        );
        assert!(store.set_assumption(AssumptionMetric::PeHigh, 2030, 18.0).is_err());
    }

    #[test]
    fn test_forward_fill_recomputes() {
        let mut store = loaded_store("ACME");
        store
            .set_assumption(AssumptionMetric::RevenueGrowth, 2026, 10.0)
            .unwrap();
        let written = store
            .forward_fill(AssumptionMetric::RevenueGrowth, 2026)
            .unwrap();

        assert_eq!(written, 3);
        let result = &store.active().result;
        assert!(result.revenue[&2029] > result.revenue[&2028]);
    }

    #[test]
    fn test_persist_and_restore_round_trip() {
        let mut store = loaded_store("ACME");
        store.select_scenario(ScenarioName::Bear);
        store.set_assumption(AssumptionMetric::RevenueGrowth, 2026, 3.0).unwrap();
        store.select_scenario(ScenarioName::Bull);
        store.set_assumption(AssumptionMetric::PeHigh, 2025, 35.0).unwrap();
        let saved = store.scenarios().clone();

        // Navigate to another ticker and back.
        store.set_base_financials(base_financials("OTHER"));
        store.load_for_ticker(&ticker("OTHER")).unwrap();
        assert!(store.scenarios().is_empty());

        store.set_base_financials(base_financials("ACME"));
        assert_eq!(
            store.load_for_ticker(&ticker("ACME")),
            Ok(LoadOutcome::Restored)
        );
        assert_eq!(store.scenarios(), &saved);
        assert_eq!(store.active_name(), ScenarioName::Bull);
    }

    #[test]
    fn test_reset_active_keeps_other_scenarios() {
        let mut store = loaded_store("ACME");
        store.select_scenario(ScenarioName::Bear);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 10.0).unwrap();
        store.select_scenario(ScenarioName::Bull);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 30.0).unwrap();

        store.reset_active();

        assert!(store.scenario(ScenarioName::Bull).is_empty());
        assert!(!store.scenario(ScenarioName::Bear).is_empty());
    }

    #[test]
    fn test_reset_active_survives_navigation() {
        let mut store = loaded_store("ACME");
        store.select_scenario(ScenarioName::Bear);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 10.0).unwrap();
        store.select_scenario(ScenarioName::Bull);
        store.set_assumption(AssumptionMetric::PeLow, 2026, 30.0).unwrap();
        store.reset_active();

        store.set_base_financials(base_financials("OTHER"));
        store.load_for_ticker(&ticker("OTHER")).unwrap();
        store.set_base_financials(base_financials("ACME"));

        assert_eq!(
            store.load_for_ticker(&ticker("ACME")),
            Ok(LoadOutcome::Restored)
        );
        assert_eq!(
            store
                .scenario(ScenarioName::Bear)
                .assumptions
                .get(AssumptionMetric::PeLow, 2026),
            10.0
        );
        assert!(store.scenario(ScenarioName::Bull).is_empty());
    }

    #[test]
    fn test_reset_active_on_last_scenario_drops_entry() {
        let mut store = loaded_store("ACME");
        store.set_assumption(AssumptionMetric::PeLow, 2026, 10.0).unwrap();
        store.reset_active();

        store.set_base_financials(base_financials("OTHER"));
        store.set_base_financials(base_financials("ACME"));
        assert_eq!(
            store.load_for_ticker(&ticker("ACME")),
            Ok(LoadOutcome::Initialized)
        );
    }

    #[test]
    fn test_reset_all_clears_everything_and_persisted_entry() {
        let mut store = loaded_store("ACME");
        for name in ScenarioName::ALL {
            store.select_scenario(name);
            store
                .set_assumption(AssumptionMetric::NetIncomeGrowth, 2026, 5.0)
                .unwrap();
        }

        store.reset_all();

        assert!(store.scenarios().is_empty());
        store.set_base_financials(base_financials("ACME"));
        store.set_base_financials(base_financials("OTHER"));
        store.set_base_financials(base_financials("ACME"));
        assert_eq!(
            store.load_for_ticker(&ticker("ACME")),
            Ok(LoadOutcome::Initialized)
        );
    }

    #[test]
    fn test_market_inputs_refresh_existing_results() {
        let mut store = loaded_store("ACME");
        store
            .set_assumption(AssumptionMetric::NetIncomeGrowth, 2026, 10.0)
            .unwrap();
        let eps_before = store.active().result.eps[&2026];

        store.set_market_inputs(
            &ticker("ACME"),
            MarketInputs {
                shares_outstanding: Some(500_000_000.0),
                current_price: Some(20.0),
            },
        );

        let eps_after = store.active().result.eps[&2026];
        assert!((eps_after - eps_before * 2.0).abs() < 1e-9);
        assert!(store.scenario(ScenarioName::Bear).result.is_empty());
    }

    #[test]
    fn test_market_inputs_for_other_ticker_are_ignored() {
        let mut store = loaded_store("ACME");
        store
            .set_assumption(AssumptionMetric::NetIncomeGrowth, 2026, 10.0)
            .unwrap();
        let before = store.active().clone();

        store.set_market_inputs(
            &ticker("ZZZ"),
            MarketInputs {
                shares_outstanding: Some(1.0),
                current_price: Some(1.0),
            },
        );

        assert_eq!(store.active(), &before);
    }

    #[test]
    fn test_unload_blocks_edits_but_keeps_cache() {
        let mut store = loaded_store("ACME");
        store.set_assumption(AssumptionMetric::PeLow, 2026, 12.0).unwrap();

        store.unload();
        assert!(store.ticker().is_none());
        assert_eq!(
            store.set_assumption(AssumptionMetric::PeLow, 2026, 13.0),
            Err(ScenarioError::NotLoaded)
        );

        store.set_base_financials(base_financials("ACME"));
        assert_eq!(
            store.load_for_ticker(&ticker("ACME")),
            Ok(LoadOutcome::Restored)
        );
    }

    #[test]
    fn test_comparison_and_validation() {
        let mut store = loaded_store("ACME");
        store.set_assumption(AssumptionMetric::PeLow, 2026, 30.0).unwrap();
        store.set_assumption(AssumptionMetric::PeHigh, 2026, 20.0).unwrap();

        assert_eq!(store.validate_active().len(), 1);

        let comparison = store.comparison();
        assert_eq!(comparison.len(), 3);
        assert_eq!(comparison[1].0, ScenarioName::Base);
        assert_eq!(comparison[1].1.map(|s| s.final_year), Some(2029));
        assert!(comparison[0].1.is_none());
    }
}
