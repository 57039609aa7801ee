//! Cache-first fetch helpers. They only borrow the source and the cache, so
//! several can run at once under `tokio::join!`.

use response_cache::ResponseCache;
use serde_json::Value;
use valuation_core::{
    ApiError, BaseFinancials, ChartMode, MarketDataSource, MetricsSnapshot, Portfolio,
    PortfolioSource, StockInfo, Ticker,
};

use crate::RequestToken;

/// Settled outcome of the two fetches behind a ticker load.
#[derive(Debug)]
pub struct TickerLoad {
    pub token: RequestToken,
    pub base: Result<BaseFinancials, ApiError>,
    pub stock_info: Result<StockInfo, ApiError>,
}

/// Fetch base financials and stock info concurrently; neither failure cancels the other.
pub(crate) async fn fetch_ticker<S>(source: &S, cache: &ResponseCache, token: RequestToken) -> TickerLoad
where
    S: MarketDataSource + ?Sized,
{
    let ticker = token.ticker();
    let (base, stock_info) = tokio::join!(
        base_financials(source, cache, ticker),
        stock_info(source, cache, ticker),
    );
    TickerLoad {
        token,
        base,
        stock_info,
    }
}

pub(crate) async fn base_financials<S>(
    source: &S,
    cache: &ResponseCache,
    ticker: &Ticker,
) -> Result<BaseFinancials, ApiError>
where
    S: MarketDataSource + ?Sized,
{
    if let Some(base) = cache.projections(ticker) {
        return Ok(base);
    }
    let base = source.fetch_base_financials(ticker).await?;
    cache.put_projections(ticker, base.clone());
    Ok(base)
}

pub(crate) async fn stock_info<S>(
    source: &S,
    cache: &ResponseCache,
    ticker: &Ticker,
) -> Result<StockInfo, ApiError>
where
    S: MarketDataSource + ?Sized,
{
    if let Some(info) = cache.stock_info(ticker) {
        return Ok(info);
    }
    let info = source.fetch_stock_info(ticker).await?;
    cache.put_stock_info(ticker, info.clone());
    Ok(info)
}

pub(crate) async fn metrics<S>(
    source: &S,
    cache: &ResponseCache,
    ticker: &Ticker,
) -> Result<MetricsSnapshot, ApiError>
where
    S: MarketDataSource + ?Sized,
{
    if let Some(metrics) = cache.metrics(ticker) {
        return Ok(metrics);
    }
    let metrics = source.fetch_metrics(ticker).await?;
    cache.put_metrics(ticker, metrics.clone());
    Ok(metrics)
}

pub(crate) async fn financials<S>(
    source: &S,
    cache: &ResponseCache,
    ticker: &Ticker,
) -> Result<Value, ApiError>
where
    S: MarketDataSource + ?Sized,
{
    if let Some(financials) = cache.financials(ticker) {
        return Ok(financials);
    }
    let financials = source.fetch_financials(ticker).await?;
    cache.put_financials(ticker, financials.clone());
    Ok(financials)
}

pub(crate) async fn charts<S>(
    source: &S,
    cache: &ResponseCache,
    ticker: &Ticker,
    mode: ChartMode,
) -> Result<Value, ApiError>
where
    S: MarketDataSource + ?Sized,
{
    if let Some(charts) = cache.charts(ticker, mode) {
        return Ok(charts);
    }
    let charts = source.fetch_charts(ticker, mode).await?;
    cache.put_charts(ticker, mode, charts.clone());
    Ok(charts)
}

pub(crate) async fn portfolio<S>(source: &S, cache: &ResponseCache) -> Result<Portfolio, ApiError>
where
    S: PortfolioSource + ?Sized,
{
    if let Some(portfolio) = cache.portfolio() {
        return Ok(portfolio);
    }
    let portfolio = source.fetch_portfolio().await?;
    cache.put_portfolio(portfolio.clone());
    Ok(portfolio)
}
