//! Derived views of macroeconomic series
//!
//! Everything here is a pure function of already-fetched observations.

use crate::api::SeriesPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of the most recent observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
    Unknown,
}

impl Trend {
    /// Trend over the last three values
    ///
    /// Fewer than three values is `Unknown`. Identical values are `Flat`.
    /// A non-decreasing run is `Up`, a non-increasing run is `Down`, and a
    /// window that changes direction is `Unknown`.
    pub fn from_recent(values: &[f64]) -> Self {
        if values.len() < 3 {
            return Self::Unknown;
        }
        let recent = &values[values.len() - 3..];
        let steps: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();

        if steps.iter().all(|d| *d == 0.0) {
            Self::Flat
        } else if steps.iter().all(|d| *d >= 0.0) {
            Self::Up
        } else if steps.iter().all(|d| *d <= 0.0) {
            Self::Down
        } else {
            Self::Unknown
        }
    }
}

/// Latest reading of an indicator with its change from the prior reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub name: String,
    pub current_value: f64,
    pub previous_value: Option<f64>,
    /// Change as a percentage of the previous value
    pub change_pct: Option<f64>,
    pub trend: Trend,
    pub data_points: usize,
    pub as_of_date: NaiveDate,
}

impl IndicatorSnapshot {
    /// Summarize an ascending series; needs at least two points
    pub fn from_series(name: impl Into<String>, points: &[SeriesPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let latest = points.last()?;
        let previous = points.get(points.len() - 2)?;

        let change_pct = (previous.value != 0.0)
            .then(|| (latest.value - previous.value) / previous.value * 100.0);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();

        Some(Self {
            name: name.into(),
            current_value: latest.value,
            previous_value: Some(previous.value),
            change_pct,
            trend: Trend::from_recent(&values),
            data_points: points.len(),
            as_of_date: latest.date,
        })
    }
}

/// Coarse recession risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskLevel {
    fn from_factor_count(factors: usize) -> Self {
        match factors {
            0 => Self::Low,
            1 => Self::Moderate,
            2 => Self::Elevated,
            _ => Self::High,
        }
    }
}

/// Threshold-based recession risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecessionRisk {
    pub risk_level: RiskLevel,
    pub risk_factors: usize,
    pub risk_details: Vec<String>,
}

impl RecessionRisk {
    /// Count warning signs across three ascending series
    ///
    /// * an inverted 10Y-2Y spread at the latest reading
    /// * unemployment higher now than six readings ago (needs more than six)
    /// * industrial production falling on average over the last three
    ///   readings (needs more than three)
    ///
    /// Series that are empty or too short contribute nothing.
    pub fn assess(spread: &[f64], unemployment: &[f64], production: &[f64]) -> Self {
        let mut details = Vec::new();

        if let Some(latest) = spread.last().filter(|s| **s < 0.0) {
            details.push(format!("Yield curve is inverted: {latest:.2}%"));
        }

        if unemployment.len() > 6 {
            let window = &unemployment[unemployment.len() - 6..];
            let (first, last) = (window[0], window[5]);
            if last > first {
                details.push(format!("Unemployment rate is rising: {first:.1}% to {last:.1}%"));
            }
        }

        if production.len() > 3 {
            let window = &production[production.len() - 3..];
            let mean_step = (window[2] - window[0]) / 2.0;
            if mean_step < 0.0 {
                details.push("Industrial production is declining".to_string());
            }
        }

        Self {
            risk_level: RiskLevel::from_factor_count(details.len()),
            risk_factors: details.len(),
            risk_details: details,
        }
    }
}

/// A span during which the recession indicator was set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecessionPeriod {
    pub start: NaiveDate,
    /// First date the indicator cleared, or the last observation if it never did
    pub end: NaiveDate,
}

/// Recession spans in a USREC series (1 = recession, 0 = expansion)
pub fn recession_periods(usrec: &[SeriesPoint]) -> Vec<RecessionPeriod> {
    let mut periods = Vec::new();
    let mut started: Option<NaiveDate> = None;

    for point in usrec {
        match (point.value >= 0.5, started) {
            (true, None) => started = Some(point.date),
            (false, Some(start)) => {
                periods.push(RecessionPeriod {
                    start,
                    end: point.date,
                });
                started = None;
            }
            _ => {}
        }
    }

    if let (Some(start), Some(last)) = (started, usrec.last()) {
        periods.push(RecessionPeriod {
            start,
            end: last.date,
        });
    }

    periods
}
