use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PanelError;

pub const US_REGION: &str = "US";

pub const ALL_LABEL: &str = "<all>";

pub const DATE_LABEL_FORMAT: &str = "%b %d, %Y";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Confirmed,
        Metric::Deaths,
        Metric::Recovered,
        Metric::Active,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
            Metric::Active => "Active",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Metric {
    type Err = PanelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Metric::Confirmed),
            "deaths" => Ok(Metric::Deaths),
            "recovered" => Ok(Metric::Recovered),
            "active" => Ok(Metric::Active),
            _ => Err(PanelError::InvalidMetric(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    All,
    Named(String),
}

impl Scope {
    pub fn named(value: impl Into<String>) -> Self {
        Scope::Named(value.into())
    }

    pub fn label(&self) -> &str {
        match self {
            Scope::All => ALL_LABEL,
            Scope::Named(value) => value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    pub fn is_named(&self, value: &str) -> bool {
        matches!(self, Scope::Named(name) if name == value)
    }

    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            Scope::All
        } else {
            Scope::Named(trimmed.to_string())
        }
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label()
            .cmp(other.label())
            .then_with(|| other.is_all().cmp(&self.is_all()))
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Scope {
    type Err = PanelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PanelError::InvalidScope(value.to_string()));
        }
        if trimmed == ALL_LABEL {
            return Ok(Scope::All);
        }
        Ok(Scope::Named(trimmed.to_string()))
    }
}

impl TryFrom<String> for Scope {
    type Error = PanelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::All => ALL_LABEL.to_string(),
            Scope::Named(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Counts {
    pub confirmed: f64,
    pub deaths: f64,
    pub recovered: f64,
    pub active: f64,
}

impl Counts {
    pub fn new(confirmed: f64, deaths: f64, recovered: f64) -> Self {
        Self {
            confirmed,
            deaths,
            recovered,
            active: confirmed - deaths - recovered,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Confirmed => self.confirmed,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
            Metric::Active => self.active,
        }
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(self, rhs: Counts) -> Counts {
        Counts {
            confirmed: self.confirmed + rhs.confirmed,
            deaths: self.deaths + rhs.deaths,
            recovered: self.recovered + rhs.recovered,
            active: self.active + rhs.active,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, rhs: Counts) {
        *self = *self + rhs;
    }
}

impl Sub for Counts {
    type Output = Counts;

    fn sub(self, rhs: Counts) -> Counts {
        Counts {
            confirmed: self.confirmed - rhs.confirmed,
            deaths: self.deaths - rhs.deaths,
            recovered: self.recovered - rhs.recovered,
            active: self.active - rhs.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub region: String,
    pub sub_region: Scope,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub region: String,
    pub sub_region: Scope,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub label: String,
    #[serde(flatten)]
    pub new: Counts,
}

pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}
