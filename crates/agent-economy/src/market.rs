//! Price-history summaries for indices, ETFs and futures

use crate::api::PriceBar;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent change from the first to the last close
///
/// `None` for an empty history; a single bar has no change.
pub fn period_change_pct(bars: &[PriceBar]) -> Option<f64> {
    let first = bars.first()?;
    let last = bars.last()?;
    if bars.len() < 2 || first.close == 0.0 {
        return Some(0.0);
    }
    Some((last.close / first.close - 1.0) * 100.0)
}

/// Period statistics, rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub period_high: f64,
    pub period_low: f64,
}

impl PriceStats {
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;

        let change = last.close - first.close;
        let change_pct = if first.close == 0.0 {
            0.0
        } else {
            change / first.close * 100.0
        };
        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        Some(Self {
            current_price: round2(last.close),
            price_change: round2(change),
            price_change_pct: round2(change_pct),
            period_high: round2(high),
            period_low: round2(low),
        })
    }
}

/// What kind of instrument a symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    Index,
    #[serde(rename = "Sector ETF")]
    SectorEtf,
    #[serde(rename = "Bond ETF")]
    BondEtf,
}

/// Last close and period change for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InstrumentKind,
    pub last_close: f64,
    pub period_change_pct: f64,
}

impl InstrumentSummary {
    pub fn from_bars(
        symbol: &str,
        name: &str,
        kind: InstrumentKind,
        bars: &[PriceBar],
    ) -> Option<Self> {
        Some(Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            kind,
            last_close: round2(bars.last()?.close),
            period_change_pct: round2(period_change_pct(bars)?),
        })
    }
}

/// Names and period changes, best performer first
///
/// Equal performers keep their input order.
pub fn rank_by_performance<'a, I>(items: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = &'a InstrumentSummary>,
{
    let mut ranked: Vec<(String, f64)> = items
        .into_iter()
        .map(|item| (item.name.clone(), item.period_change_pct))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}
