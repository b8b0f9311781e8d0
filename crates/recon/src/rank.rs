//! Best / worst sellers, optionally within a recurring month-day window.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::aggregate_iter;
use crate::model::SalesRecord;

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl FromStr for MonthDay {
    type Err = String;

    /// `MM-DD`. Feb 29 is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (m, d) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected MM-DD, got '{s}'"))?;
        let month: u32 = m.parse().map_err(|_| format!("bad month in '{s}'"))?;
        let day: u32 = d.parse().map_err(|_| format!("bad day in '{s}'"))?;
        // 2024 is a leap year, so every real month-day is valid in it.
        if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
            return Err(format!("no such month-day '{s}'"));
        }
        Ok(Self { month, day })
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Inclusive month-day range that recurs every year. When `start > end` the
/// window wraps over the new year (`12-20..01-05`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleWindow {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl SaleWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let md = MonthDay::of(date);
        if self.start <= self.end {
            self.start <= md && md <= self.end
        } else {
            md >= self.start || md <= self.end
        }
    }
}

impl FromStr for SaleWindow {
    type Err = String;

    /// `MM-DD..MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .ok_or_else(|| format!("expected MM-DD..MM-DD, got '{s}'"))?;
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

impl fmt::Display for SaleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Most,
    Least,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProduct {
    pub rank: usize,
    pub product_name: String,
    pub quantity: f64,
}

/// Aggregate sales (inside `window`, if given) and return the `limit` best or
/// worst sellers. Ties are broken by product key so output is stable.
///
/// With a window, sales without a parsed date are excluded.
pub fn rank_products(
    records: &[SalesRecord],
    window: Option<&SaleWindow>,
    limit: usize,
    order: RankOrder,
) -> Vec<RankedProduct> {
    let in_window = |r: &&SalesRecord| match (window, r.date) {
        (None, _) => true,
        (Some(w), Some(date)) => w.contains(date),
        (Some(_), None) => false,
    };

    if window.is_some() {
        let undated = records.iter().filter(|r| r.date.is_none()).count();
        if undated > 0 {
            debug!(undated, "sales without a date excluded from window");
        }
    }

    let totals = aggregate_iter(records.iter().filter(in_window));

    let mut ranked: Vec<(String, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| {
        let by_qty = match order {
            RankOrder::Most => b.1.partial_cmp(&a.1),
            RankOrder::Least => a.1.partial_cmp(&b.1),
        };
        by_qty.unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (product_name, quantity))| RankedProduct {
            rank: i + 1,
            product_name,
            quantity,
        })
        .collect()
}
