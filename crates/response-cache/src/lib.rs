//! Response Cache
//!
//! Ticker-keyed payload caches sitting in front of the dashboard API.
//! Stock info expires after five minutes; every other kind stays until it is
//! explicitly invalidated.

use std::fmt;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use valuation_core::{BaseFinancials, ChartMode, MetricsSnapshot, Portfolio, StockInfo, Ticker};

const STOCK_INFO_TTL_SECS: i64 = 300; // 5 minutes
const PORTFOLIO_KEY: &str = "PORTFOLIO";

/// Internal cache entry with timestamp
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Payload kinds held by [`ResponseCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Metrics,
    Projections,
    Financials,
    Charts,
    StockInfo,
    Portfolio,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Metrics => "metrics",
            CacheKind::Projections => "projections",
            CacheKind::Financials => "financials",
            CacheKind::Charts => "charts",
            CacheKind::StockInfo => "stock_info",
            CacheKind::Portfolio => "portfolio",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One kind of payload, keyed by string.
struct Slot<T> {
    kind: CacheKind,
    entries: DashMap<String, CacheEntry<T>>,
    ttl_secs: Option<i64>,
}

impl<T: Clone> Slot<T> {
    fn new(kind: CacheKind, ttl_secs: Option<i64>) -> Self {
        Self {
            kind,
            entries: DashMap::new(),
            ttl_secs,
        }
    }

    fn get(&self, key: &str) -> Option<T> {
        let expired = {
            let entry = self.entries.get(key)?;
            match self.ttl_secs {
                Some(ttl) => (Utc::now() - entry.cached_at).num_seconds() >= ttl,
                None => false,
            }
        };

        if expired {
            self.entries.remove(key);
            tracing::debug!("{} cache expired for {}", self.kind, key);
            return None;
        }

        tracing::debug!("{} cache hit for {}", self.kind, key);
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    fn put(&self, key: String, data: T, cached_at: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { data, cached_at });
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn retain(&self, keep: impl Fn(&str) -> bool) {
        self.entries.retain(|key, _| keep(key));
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

fn chart_key(ticker: &Ticker, mode: ChartMode) -> String {
    format!("{}_{}", ticker, mode)
}

/// Cached API payloads. Safe to share between tasks.
pub struct ResponseCache {
    metrics: Slot<MetricsSnapshot>,
    projections: Slot<BaseFinancials>,
    financials: Slot<Value>,
    charts: Slot<Value>,
    stock_info: Slot<StockInfo>,
    portfolio: Slot<Portfolio>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            metrics: Slot::new(CacheKind::Metrics, None),
            projections: Slot::new(CacheKind::Projections, None),
            financials: Slot::new(CacheKind::Financials, None),
            charts: Slot::new(CacheKind::Charts, None),
            stock_info: Slot::new(CacheKind::StockInfo, Some(STOCK_INFO_TTL_SECS)),
            portfolio: Slot::new(CacheKind::Portfolio, None),
        }
    }

    pub fn metrics(&self, ticker: &Ticker) -> Option<MetricsSnapshot> {
        self.metrics.get(ticker.as_str())
    }

    pub fn put_metrics(&self, ticker: &Ticker, metrics: MetricsSnapshot) {
        self.metrics.put(ticker.to_string(), metrics, Utc::now());
    }

    pub fn projections(&self, ticker: &Ticker) -> Option<BaseFinancials> {
        self.projections.get(ticker.as_str())
    }

    pub fn put_projections(&self, ticker: &Ticker, base: BaseFinancials) {
        self.projections.put(ticker.to_string(), base, Utc::now());
    }

    pub fn financials(&self, ticker: &Ticker) -> Option<Value> {
        self.financials.get(ticker.as_str())
    }

    pub fn put_financials(&self, ticker: &Ticker, financials: Value) {
        self.financials.put(ticker.to_string(), financials, Utc::now());
    }

    pub fn charts(&self, ticker: &Ticker, mode: ChartMode) -> Option<Value> {
        self.charts.get(&chart_key(ticker, mode))
    }

    pub fn put_charts(&self, ticker: &Ticker, mode: ChartMode, charts: Value) {
        self.charts.put(chart_key(ticker, mode), charts, Utc::now());
    }

    /// Stock info younger than five minutes.
    pub fn stock_info(&self, ticker: &Ticker) -> Option<StockInfo> {
        self.stock_info.get(ticker.as_str())
    }

    pub fn put_stock_info(&self, ticker: &Ticker, info: StockInfo) {
        self.put_stock_info_at(ticker, info, Utc::now());
    }

    /// Store stock info with an explicit fetch time.
    pub fn put_stock_info_at(&self, ticker: &Ticker, info: StockInfo, cached_at: DateTime<Utc>) {
        self.stock_info.put(ticker.to_string(), info, cached_at);
    }

    pub fn portfolio(&self) -> Option<Portfolio> {
        self.portfolio.get(PORTFOLIO_KEY)
    }

    pub fn put_portfolio(&self, portfolio: Portfolio) {
        self.portfolio.put(PORTFOLIO_KEY.to_string(), portfolio, Utc::now());
    }

    /// Whether an entry exists, ignoring expiry. Charts use the `TICKER_mode` key.
    pub fn contains(&self, kind: CacheKind, key: &str) -> bool {
        let key = key.to_uppercase();
        match kind {
            CacheKind::Metrics => self.metrics.contains(&key),
            CacheKind::Projections => self.projections.contains(&key),
            CacheKind::Financials => self.financials.contains(&key),
            CacheKind::Charts => self.charts.entries.iter().any(|e| e.key().eq_ignore_ascii_case(&key)),
            CacheKind::StockInfo => self.stock_info.contains(&key),
            CacheKind::Portfolio => self.portfolio.contains(PORTFOLIO_KEY),
        }
    }

    /// Drop every cached payload for `ticker`, all chart modes included.
    pub fn invalidate_ticker(&self, ticker: &Ticker) {
        let key = ticker.as_str();
        let removed = [
            self.metrics.remove(key),
            self.projections.remove(key),
            self.financials.remove(key),
            self.stock_info.remove(key),
        ]
        .iter()
        .filter(|r| **r)
        .count();

        let chart_prefix = format!("{}_", key);
        self.charts.retain(|k| !k.starts_with(&chart_prefix));

        tracing::debug!("Invalidated cached payloads for {} ({} kinds)", ticker, removed);
    }

    pub fn clear_portfolio(&self) {
        self.portfolio.clear();
        tracing::debug!("Cleared cached portfolio");
    }

    pub fn clear(&self) {
        self.metrics.clear();
        self.projections.clear();
        self.financials.clear();
        self.charts.clear();
        self.stock_info.clear();
        self.portfolio.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
