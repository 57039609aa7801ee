//! Plain-text rendering of session state.

use std::fmt::Write;

use dashboard_session::SectionErrors;
use projection_engine::{AssumptionIssue, AssumptionMetric, ScenarioSummary, YearProjection};
use scenario_store::{ScenarioName, ScenarioStore};
use valuation_core::format::{
    format_compact_currency, format_currency, format_multiple, format_optional, format_percent,
};
use valuation_core::{MetricsSnapshot, Portfolio, StockInfo};

type Column = fn(&YearProjection) -> Option<f64>;

pub fn section_errors(errors: &SectionErrors) -> String {
    let mut out = String::new();
    for (section, message) in errors.iter() {
        let _ = writeln!(out, "! {}: {}", section, message);
    }
    out
}

/// Assumptions and projected values of the active scenario, one column per year.
pub fn scenario_table(store: &ScenarioStore) -> String {
    let mut out = String::new();
    let (Some(base), Some(horizon)) = (store.base_financials(), store.horizon()) else {
        return out;
    };

    let name = store.active_name();
    let scenario = store.active();
    let _ = writeln!(
        out,
        "{} | {} scenario | base year {} | price {} | revenue {} | EPS {}",
        base.ticker,
        name,
        horizon.current_year,
        format_currency(base.price),
        format_compact_currency(base.revenue),
        format_currency(base.eps),
    );

    let years: Vec<i32> = std::iter::once(horizon.current_year)
        .chain(horizon.projection_years())
        .collect();

    let _ = write!(out, "{:<20}", "");
    for year in &years {
        let _ = write!(out, "{:>14}", year);
    }
    out.push('\n');

    for metric in AssumptionMetric::ALL {
        let _ = write!(out, "{:<20}", metric.as_str());
        for year in &years {
            let cell = if horizon.accepts(metric, *year) {
                let value = scenario.assumptions.get(metric, *year);
                if metric.is_growth() {
                    format_percent(value)
                } else {
                    format_multiple(value)
                }
            } else {
                "-".to_string()
            };
            let _ = write!(out, "{:>14}", cell);
        }
        out.push('\n');
    }

    let result = &scenario.result;
    let rows: [(&str, Column, fn(f64) -> String); 8] = [
        ("revenue", |p| Some(p.revenue), format_compact_currency),
        ("net income", |p| Some(p.net_income), format_compact_currency),
        ("net margin", |p| Some(p.net_income_margin), format_percent),
        ("eps", |p| Some(p.eps), format_currency),
        ("share price low", |p| Some(p.share_price_low), format_currency),
        ("share price high", |p| Some(p.share_price_high), format_currency),
        ("cagr low", |p| p.cagr_low, format_percent),
        ("cagr high", |p| p.cagr_high, format_percent),
    ];

    for (label, column, formatter) in rows {
        let _ = write!(out, "{:<20}", label);
        for year in &years {
            let cell = match result.year(*year) {
                Some(projection) => format_optional(column(&projection), formatter),
                None => "-".to_string(),
            };
            let _ = write!(out, "{:>14}", cell);
        }
        out.push('\n');
    }

    // The base year has prices only, priced off actual EPS.
    let _ = writeln!(
        out,
        "{} price range: {} - {}",
        horizon.current_year,
        format_optional(result.share_price_low.get(&horizon.current_year).copied(), format_currency),
        format_optional(result.share_price_high.get(&horizon.current_year).copied(), format_currency),
    );

    for warning in &result.warnings {
        let _ = writeln!(out, "warning: {}", warning);
    }
    out
}

pub fn issues(issues: &[AssumptionIssue]) -> String {
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(out, "check: {}", issue);
    }
    out
}

pub fn comparison(rows: &[(ScenarioName, Option<ScenarioSummary>)]) -> String {
    let mut out = String::new();
    for (name, summary) in rows {
        match summary {
            Some(s) => {
                let _ = writeln!(
                    out,
                    "{:<5} {}: {} - {} (CAGR {} - {})",
                    name,
                    s.final_year,
                    format_currency(s.share_price_low),
                    format_currency(s.share_price_high),
                    format_optional(s.cagr_low, format_percent),
                    format_optional(s.cagr_high, format_percent),
                );
            }
            None => {
                let _ = writeln!(out, "{:<5} no assumptions entered", name);
            }
        }
    }
    out
}

pub fn stock_info(info: &StockInfo) -> String {
    format!(
        "{} {}\n  price {} | market cap {} | shares {}\n  exchange {} | country {}\n",
        info.ticker,
        info.name.as_deref().unwrap_or(""),
        format_optional(info.price, format_currency),
        format_optional(info.market_cap, format_compact_currency),
        format_optional(info.shares_outstanding, valuation_core::format::format_compact),
        info.exchange.as_deref().unwrap_or("N/A"),
        info.country_code.as_deref().unwrap_or("N/A"),
    )
}

pub fn metrics(metrics: &MetricsSnapshot) -> String {
    let rows = [
        ("TTM P/E", metrics.ttm_pe, format_multiple as fn(f64) -> String),
        ("Forward P/E", metrics.forward_pe, format_multiple),
        ("2Y Forward P/E", metrics.two_year_forward_pe, format_multiple),
        ("TTM EPS growth", metrics.ttm_eps_growth, format_percent),
        ("CY EPS growth", metrics.current_year_eps_growth, format_percent),
        ("NY EPS growth", metrics.next_year_eps_growth, format_percent),
        ("TTM revenue growth", metrics.ttm_revenue_growth, format_percent),
        ("CY revenue growth", metrics.current_year_revenue_growth, format_percent),
        ("NY revenue growth", metrics.next_year_revenue_growth, format_percent),
        ("Gross margin", metrics.gross_margin, format_percent),
        ("Net margin", metrics.net_margin, format_percent),
        ("TTM P/S", metrics.ttm_ps_ratio, format_multiple),
        ("Forward P/S", metrics.forward_ps_ratio, format_multiple),
    ];

    let mut out = String::new();
    for (label, value, formatter) in rows {
        let _ = writeln!(out, "  {:<20}{:>12}", label, format_optional(value, formatter));
    }
    out
}

pub fn portfolio(portfolio: &Portfolio) -> String {
    if portfolio.holdings.is_empty() {
        return "No holdings\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8}{:>12}{:>14}{:>14}{:>16}{:>12}",
        "ticker", "shares", "cost basis", "price", "value", "gain"
    );
    for h in &portfolio.holdings {
        let _ = writeln!(
            out,
            "{:<8}{:>12.2}{:>14}{:>14}{:>16}{:>12}",
            h.ticker,
            h.shares,
            format_currency(h.cost_basis),
            format_optional(h.current_price, format_currency),
            format_optional(h.market_value, format_compact_currency),
            format_optional(h.gain_loss_percent, format_percent),
        );
    }
    if let Some(total) = portfolio.total_value {
        let _ = writeln!(
            out,
            "total {} ({})",
            format_compact_currency(total),
            format_optional(portfolio.total_gain_loss, format_compact_currency)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::{BaseFinancials, Ticker};

    #[test]
    fn test_scenario_table_shows_projection() {
        let mut store = ScenarioStore::new(scenario_store::ScenarioCache::in_memory());
        let ticker = Ticker::parse("ACME").unwrap();
        store.set_base_financials(BaseFinancials {
            ticker: ticker.clone(),
            price: 20.0,
            market_cap: 20_000_000_000.0,
            shares_outstanding: 1_000_000_000.0,
            revenue: 1_340_000_000.0,
            net_income: 870_000_000.0,
            net_income_margin: 64.925,
            eps: 0.87,
            data_year: 2025,
        });
        store.load_for_ticker(&ticker).unwrap();
        store.set_assumption(AssumptionMetric::PeLow, 2025, 20.0).unwrap();

        let table = scenario_table(&store);
        assert!(table.starts_with("ACME | base scenario | base year 2025"));
        assert!(table.contains("2025 price range: $17.40 - $0.00"));
        assert!(table.contains("2029"));
    }

    #[test]
    fn test_comparison_lists_empty_scenarios() {
        let rows = vec![(ScenarioName::Bear, None)];
        assert_eq!(comparison(&rows), "bear  no assumptions entered\n");
    }
}
