//! Treasury yield curve shape and inversion checks

use crate::market::round2;
use serde::{Deserialize, Serialize};

/// Curve points closer than this (in percentage points) are flat
pub const FLAT_THRESHOLD: f64 = 0.1;

/// Treasury maturities tracked through Yahoo Finance yield indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenor {
    #[serde(rename = "13W")]
    W13,
    #[serde(rename = "5Y")]
    Y5,
    #[serde(rename = "10Y")]
    Y10,
    #[serde(rename = "30Y")]
    Y30,
}

impl Tenor {
    pub const ALL: [Tenor; 4] = [Tenor::W13, Tenor::Y5, Tenor::Y10, Tenor::Y30];

    /// Yahoo Finance yield index symbol
    pub fn ticker(self) -> &'static str {
        match self {
            Tenor::W13 => "^IRX",
            Tenor::Y5 => "^FVX",
            Tenor::Y10 => "^TNX",
            Tenor::Y30 => "^TYX",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tenor::W13 => "13W",
            Tenor::Y5 => "5Y",
            Tenor::Y10 => "10Y",
            Tenor::Y30 => "30Y",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tenor::W13 => "13-Week Treasury Yield",
            Tenor::Y5 => "5-Year Treasury Yield",
            Tenor::Y10 => "10-Year Treasury Yield",
            Tenor::Y30 => "30-Year Treasury Yield",
        }
    }
}

/// Latest yield for one maturity, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldCurvePoint {
    pub tenor: Tenor,
    pub yield_pct: f64,
}

fn yield_at(curve: &[YieldCurvePoint], tenor: Tenor) -> Option<f64> {
    curve.iter().find(|p| p.tenor == tenor).map(|p| p.yield_pct)
}

/// Overall shape of the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveShape {
    Normal,
    Flat,
    Inverted,
    Unknown,
}

impl CurveShape {
    /// Inverted when the short end yields more than the long end, flat when
    /// the two are within [`FLAT_THRESHOLD`], normal otherwise
    pub fn classify(short: Option<f64>, long: Option<f64>) -> Self {
        match (short, long) {
            (Some(short), Some(long)) if short > long => Self::Inverted,
            (Some(short), Some(long)) if (long - short).abs() < FLAT_THRESHOLD => Self::Flat,
            (Some(_), Some(_)) => Self::Normal,
            _ => Self::Unknown,
        }
    }

    /// Shape between the 13-week bill and the 30-year bond
    pub fn from_curve(curve: &[YieldCurvePoint]) -> Self {
        Self::classify(yield_at(curve, Tenor::W13), yield_at(curve, Tenor::Y30))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Flat => "flat",
            Self::Inverted => "inverted",
            Self::Unknown => "unknown",
        }
    }
}

/// Spread between a longer and a shorter maturity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadCheck {
    /// e.g. `"10Y-5Y"`
    pub name: String,
    /// Long minus short, rounded to 2 decimals
    pub spread: f64,
    pub inverted: bool,
}

/// Inversion checks across the tracked maturities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inversions {
    pub any_inverted: bool,
    pub details: Vec<SpreadCheck>,
}

impl Inversions {
    /// Pairs checked, as (long, short)
    pub const PAIRS: [(Tenor, Tenor); 3] = [
        (Tenor::Y10, Tenor::Y5),
        (Tenor::Y30, Tenor::Y10),
        (Tenor::Y10, Tenor::W13),
    ];

    /// Check each pair for which both yields are known
    pub fn from_curve(curve: &[YieldCurvePoint]) -> Self {
        let details: Vec<SpreadCheck> = Self::PAIRS
            .iter()
            .filter_map(|&(long, short)| {
                let spread = yield_at(curve, long)? - yield_at(curve, short)?;
                Some(SpreadCheck {
                    name: format!("{}-{}", long.label(), short.label()),
                    spread: round2(spread),
                    inverted: spread < 0.0,
                })
            })
            .collect();

        Self {
            any_inverted: details.iter().any(|d| d.inverted),
            details,
        }
    }

    pub fn spread(&self, name: &str) -> Option<f64> {
        self.details.iter().find(|d| d.name == name).map(|d| d.spread)
    }
}
