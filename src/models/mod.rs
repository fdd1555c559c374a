use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_FORECAST_DAYS: u32 = 7;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    pub const ALL: [TemperatureUnit; 2] = [TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Celsius => "celsius",
        }
    }

    /// Units whose name starts with `input`, ignoring case and surrounding whitespace.
    pub fn completions(input: &str) -> Vec<TemperatureUnit> {
        let needle = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .filter(|unit| unit.as_str().starts_with(&needle))
            .collect()
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUnit(pub String);

impl fmt::Display for UnknownUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown temperature unit '{}'. Use one of: fahrenheit, celsius",
            self.0
        )
    }
}

impl std::error::Error for UnknownUnit {}

impl FromStr for TemperatureUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(UnknownUnit(s.to_string()));
        }
        match Self::completions(s).as_slice() {
            [unit] => Ok(*unit),
            _ => Err(UnknownUnit(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub forecast_days: u32,
    pub temperature_unit: TemperatureUnit,
}

impl ForecastQuery {
    pub fn new(
        latitude: f64,
        longitude: f64,
        forecast_days: u32,
        temperature_unit: TemperatureUnit,
    ) -> Self {
        Self {
            latitude,
            longitude,
            forecast_days,
            temperature_unit,
        }
    }

    /// Query parameters for the provider, minus the fixed `daily` and `timezone` pair.
    /// `f64`'s `Display` is the shortest representation that parses back to the same bits.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("forecast_days", self.forecast_days.to_string()),
            ("temperature_unit", self.temperature_unit.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastRow {
    pub date: NaiveDate,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
}
