//! Scenario Data Models

use std::fmt;
use std::str::FromStr;

use projection_engine::{ScenarioAssumptions, ScenarioResult};
use serde::{Deserialize, Serialize};

use crate::ScenarioError;

/// One of the three parallel valuation cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioName {
    Bear,
    #[default]
    Base,
    Bull,
}

impl ScenarioName {
    pub const ALL: [ScenarioName; 3] = [ScenarioName::Bear, ScenarioName::Base, ScenarioName::Bull];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioName::Bear => "bear",
            ScenarioName::Base => "base",
            ScenarioName::Bull => "bull",
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ScenarioName {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bear" => Ok(ScenarioName::Bear),
            "base" => Ok(ScenarioName::Base),
            "bull" => Ok(ScenarioName::Bull),
            other => Err(ScenarioError::UnknownScenario(other.to_string())),
        }
    }
}

/// Assumptions and the projection derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub assumptions: ScenarioAssumptions,
    #[serde(default)]
    pub result: ScenarioResult,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.assumptions.is_empty() && self.result.is_empty()
    }
}

/// Exactly three independent scenarios plus the one being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    #[serde(default)]
    pub active: ScenarioName,
    #[serde(default)]
    pub bear: Scenario,
    #[serde(default)]
    pub base: Scenario,
    #[serde(default)]
    pub bull: Scenario,
}

impl ScenarioSet {
    pub fn get(&self, name: ScenarioName) -> &Scenario {
        match name {
            ScenarioName::Bear => &self.bear,
            ScenarioName::Base => &self.base,
            ScenarioName::Bull => &self.bull,
        }
    }

    pub fn get_mut(&mut self, name: ScenarioName) -> &mut Scenario {
        match name {
            ScenarioName::Bear => &mut self.bear,
            ScenarioName::Base => &mut self.base,
            ScenarioName::Bull => &mut self.bull,
        }
    }

    pub fn active(&self) -> &Scenario {
        self.get(self.active)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScenarioName, &Scenario)> {
        ScenarioName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, scenario)| scenario.is_empty())
    }
}
