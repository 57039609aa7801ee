use std::sync::Arc;

use response_cache::ResponseCache;
use scenario_store::ScenarioStore;
use serde_json::Value;
use valuation_core::{
    ApiError, ChartMode, HoldingInput, MarketDataSource, MarketInputs, MetricsSnapshot,
    Portfolio, PortfolioSource, StockInfo, Ticker, ValuationError,
};

use crate::fetch::{self, TickerLoad};
use crate::sections::{describe_error, Section, SectionErrors};

/// Identifies one ticker load. Only the most recent token may write state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    ticker: Ticker,
    generation: u64,
}

impl RequestToken {
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer load started after this one; its results were dropped.
    Stale,
}

/// Everything the dashboard shows for the current ticker and the portfolio.
pub struct DashboardSession<S> {
    source: Arc<S>,
    cache: Arc<ResponseCache>,
    store: ScenarioStore,
    generation: u64,
    current: Option<RequestToken>,
    errors: SectionErrors,
    stock_info: Option<StockInfo>,
    metrics: Option<MetricsSnapshot>,
    financials: Option<Value>,
    charts: Option<(ChartMode, Value)>,
    portfolio: Option<Portfolio>,
}

impl<S> DashboardSession<S>
where
    S: MarketDataSource + PortfolioSource,
{
    pub fn new(source: Arc<S>, store: ScenarioStore) -> Self {
        Self {
            source,
            cache: Arc::new(ResponseCache::new()),
            store,
            generation: 0,
            current: None,
            errors: SectionErrors::default(),
            stock_info: None,
            metrics: None,
            financials: None,
            charts: None,
            portfolio: None,
        }
    }

    /// Share an existing response cache instead of starting empty.
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn ticker(&self) -> Option<&Ticker> {
        self.current.as_ref().map(RequestToken::ticker)
    }

    pub fn current_token(&self) -> Option<&RequestToken> {
        self.current.as_ref()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ScenarioStore {
        &mut self.store
    }

    pub fn errors(&self) -> &SectionErrors {
        &self.errors
    }

    pub fn stock_info(&self) -> Option<&StockInfo> {
        self.stock_info.as_ref()
    }

    pub fn metrics(&self) -> Option<&MetricsSnapshot> {
        self.metrics.as_ref()
    }

    pub fn financials(&self) -> Option<&Value> {
        self.financials.as_ref()
    }

    pub fn charts(&self) -> Option<(ChartMode, &Value)> {
        self.charts.as_ref().map(|(mode, value)| (*mode, value))
    }

    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref()
    }

    /// Start a load for `ticker` and make it the current request.
    ///
    /// With `fresh`, cached payloads and persisted scenarios for the ticker are
    /// discarded first.
    pub fn begin_load(&mut self, ticker: Ticker, fresh: bool) -> RequestToken {
        if fresh {
            self.cache.invalidate_ticker(&ticker);
            self.store.discard_persisted(&ticker);
        }

        self.generation += 1;
        let token = RequestToken {
            ticker,
            generation: self.generation,
        };

        self.errors.clear_ticker_sections();
        self.stock_info = None;
        self.metrics = None;
        self.financials = None;
        self.charts = None;
        self.current = Some(token.clone());

        tracing::info!(
            "Loading {} (request #{}{})",
            token.ticker,
            token.generation,
            if fresh { ", fresh" } else { "" }
        );
        token
    }

    /// Run the fetches for `token`. Does not touch session state.
    pub async fn fetch(&self, token: RequestToken) -> TickerLoad {
        fetch::fetch_ticker(self.source.as_ref(), &self.cache, token).await
    }

    /// Fold a settled load into the session, unless a newer load superseded it.
    pub fn apply(&mut self, load: TickerLoad) -> ApplyOutcome {
        if self.current.as_ref() != Some(&load.token) {
            tracing::warn!(
                "Discarding stale results for {} (request #{})",
                load.token.ticker,
                load.token.generation
            );
            return ApplyOutcome::Stale;
        }

        let ticker = load.token.ticker;

        match load.base {
            Ok(base) => {
                self.store.set_base_financials(base);
                match self.store.load_for_ticker(&ticker) {
                    Ok(_) => self.errors.clear(Section::Projections),
                    Err(e) => self.errors.set(Section::Projections, e.to_string()),
                }
            }
            Err(e) => {
                tracing::warn!("Base financials for {} failed: {}", ticker, e);
                self.store.unload();
                self.errors.set(
                    Section::Projections,
                    describe_error(Section::Projections, Some(&ticker), &e),
                );
            }
        }

        match load.stock_info {
            Ok(info) => {
                self.store
                    .set_market_inputs(&ticker, MarketInputs::from_stock_info(&info));
                self.stock_info = Some(info);
                self.errors.clear(Section::StockInfo);
            }
            Err(e) => {
                tracing::warn!("Stock info for {} failed: {}", ticker, e);
                self.errors.set(
                    Section::StockInfo,
                    describe_error(Section::StockInfo, Some(&ticker), &e),
                );
            }
        }

        ApplyOutcome::Applied
    }

    /// New search from user input: always refetches and starts scenarios over.
    pub async fn search(&mut self, input: &str) -> Result<ApplyOutcome, ValuationError> {
        let ticker = Ticker::parse(input)?;
        let token = self.begin_load(ticker, true);
        let load = self.fetch(token).await;
        Ok(self.apply(load))
    }

    /// Navigate to a ticker, reusing cached payloads and persisted scenarios.
    pub async fn open(&mut self, ticker: &Ticker) -> ApplyOutcome {
        let token = self.begin_load(ticker.clone(), false);
        let load = self.fetch(token).await;
        self.apply(load)
    }

    /// Refetch the current ticker's payloads. Scenarios are kept.
    pub async fn refresh(&mut self) -> Option<ApplyOutcome> {
        let ticker = self.ticker()?.clone();
        self.cache.invalidate_ticker(&ticker);
        Some(self.open(&ticker).await)
    }

    /// Load metrics, financials and charts for the current ticker concurrently.
    pub async fn load_details(&mut self, mode: ChartMode) {
        let Some(ticker) = self.ticker().cloned() else {
            return;
        };

        let source = self.source.as_ref();
        let cache = self.cache.as_ref();
        let (metrics, financials, charts) = tokio::join!(
            fetch::metrics(source, cache, &ticker),
            fetch::financials(source, cache, &ticker),
            fetch::charts(source, cache, &ticker, mode),
        );

        match metrics {
            Ok(metrics) => {
                self.metrics = Some(metrics);
                self.errors.clear(Section::Metrics);
            }
            Err(e) => self.record_failure(Section::Metrics, &ticker, &e),
        }
        match financials {
            Ok(financials) => {
                self.financials = Some(financials);
                self.errors.clear(Section::Financials);
            }
            Err(e) => self.record_failure(Section::Financials, &ticker, &e),
        }
        match charts {
            Ok(charts) => {
                self.charts = Some((mode, charts));
                self.errors.clear(Section::Charts);
            }
            Err(e) => self.record_failure(Section::Charts, &ticker, &e),
        }
    }

    pub async fn load_portfolio(&mut self) {
        match fetch::portfolio(self.source.as_ref(), &self.cache).await {
            Ok(portfolio) => {
                self.portfolio = Some(portfolio);
                self.errors.clear(Section::Portfolio);
            }
            Err(e) => {
                tracing::warn!("Portfolio load failed: {}", e);
                self.errors
                    .set(Section::Portfolio, describe_error(Section::Portfolio, None, &e));
            }
        }
    }

    pub async fn add_holding(&mut self, ticker: &Ticker, input: HoldingInput) -> Result<(), ApiError> {
        let result = self.source.add_holding(ticker, &input).await;
        self.after_portfolio_mutation(result).await
    }

    pub async fn update_holding(
        &mut self,
        ticker: &Ticker,
        input: HoldingInput,
    ) -> Result<(), ApiError> {
        let result = self.source.update_holding(ticker, &input).await;
        self.after_portfolio_mutation(result).await
    }

    pub async fn remove_holding(&mut self, ticker: &Ticker) -> Result<(), ApiError> {
        let result = self.source.remove_holding(ticker).await;
        self.after_portfolio_mutation(result).await
    }

    /// Upload a brokerage export and return the backend's import summary.
    pub async fn upload_holdings(
        &mut self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let summary = self.source.upload_holdings_csv(file_name, contents).await;
        self.after_portfolio_mutation(summary).await
    }

    /// Any successful mutation invalidates the cached portfolio and reloads it.
    async fn after_portfolio_mutation<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.cache.clear_portfolio();
                self.load_portfolio().await;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("Portfolio update failed: {}", e);
                self.errors
                    .set(Section::Portfolio, describe_error(Section::Portfolio, None, &e));
                Err(e)
            }
        }
    }

    fn record_failure(&mut self, section: Section, ticker: &Ticker, error: &ApiError) {
        tracing::warn!("Loading {} for {} failed: {}", section, ticker, error);
        self.errors
            .set(section, describe_error(section, Some(ticker), error));
    }
}
