use std::fmt;

use valuation_core::{ApiError, Ticker};

/// Independently loaded parts of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Projections,
    StockInfo,
    Metrics,
    Financials,
    Charts,
    Portfolio,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Projections,
        Section::StockInfo,
        Section::Metrics,
        Section::Financials,
        Section::Charts,
        Section::Portfolio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Projections => "projections",
            Section::StockInfo => "stock info",
            Section::Metrics => "metrics",
            Section::Financials => "financials",
            Section::Charts => "charts",
            Section::Portfolio => "portfolio",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last error per section; `None` means the section loaded (or never tried).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionErrors {
    pub projections: Option<String>,
    pub stock_info: Option<String>,
    pub metrics: Option<String>,
    pub financials: Option<String>,
    pub charts: Option<String>,
    pub portfolio: Option<String>,
}

impl SectionErrors {
    pub fn get(&self, section: Section) -> Option<&str> {
        self.slot(section).as_deref()
    }

    pub fn set(&mut self, section: Section, message: impl Into<String>) {
        *self.slot_mut(section) = Some(message.into());
    }

    pub fn clear(&mut self, section: Section) {
        *self.slot_mut(section) = None;
    }

    /// Ticker-scoped sections; the portfolio error survives a ticker switch.
    pub fn clear_ticker_sections(&mut self) {
        for section in Section::ALL {
            if section != Section::Portfolio {
                self.clear(section);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> + '_ {
        Section::ALL
            .into_iter()
            .filter_map(|section| self.get(section).map(|message| (section, message)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn slot(&self, section: Section) -> &Option<String> {
        match section {
            Section::Projections => &self.projections,
            Section::StockInfo => &self.stock_info,
            Section::Metrics => &self.metrics,
            Section::Financials => &self.financials,
            Section::Charts => &self.charts,
            Section::Portfolio => &self.portfolio,
        }
    }

    fn slot_mut(&mut self, section: Section) -> &mut Option<String> {
        match section {
            Section::Projections => &mut self.projections,
            Section::StockInfo => &mut self.stock_info,
            Section::Metrics => &mut self.metrics,
            Section::Financials => &mut self.financials,
            Section::Charts => &mut self.charts,
            Section::Portfolio => &mut self.portfolio,
        }
    }
}

/// Message shown for a failed section load.
pub(crate) fn describe_error(section: Section, ticker: Option<&Ticker>, error: &ApiError) -> String {
    match ticker {
        Some(ticker) if error.is_not_found() => {
            format!("No {} found for {}", section, ticker)
        }
        _ => error.to_string(),
    }
}
