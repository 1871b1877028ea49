use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Bar width on the chart endpoint. Scans only ever ask for [`Interval::OneDay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

const INTERVALS: [(Interval, &str); 5] = [
    (Interval::OneMinute, "1m"),
    (Interval::FiveMinutes, "5m"),
    (Interval::FifteenMinutes, "15m"),
    (Interval::OneHour, "1h"),
    (Interval::OneDay, "1d"),
];

impl Interval {
    pub const fn as_str(self) -> &'static str {
        INTERVALS[self as usize].1
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(&INTERVALS, value).ok_or_else(|| ValidationError::InvalidInterval {
            value: value.trim().to_owned(),
        })
    }
}

/// How far back the chart endpoint goes (Yahoo's `range` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HistoryRange {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    #[default]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

/// Value, wire name and approximate B3 sessions covered.
const RANGES: [(HistoryRange, &str, usize); 5] = [
    (HistoryRange::OneMonth, "1mo", 21),
    (HistoryRange::ThreeMonths, "3mo", 63),
    (HistoryRange::SixMonths, "6mo", 125),
    (HistoryRange::OneYear, "1y", 248),
    (HistoryRange::TwoYears, "2y", 496),
];

impl HistoryRange {
    pub const fn as_str(self) -> &'static str {
        RANGES[self as usize].1
    }

    pub const fn trading_days(self) -> usize {
        RANGES[self as usize].2
    }
}

impl Display for HistoryRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let names = RANGES.map(|(range, name, _)| (range, name));
        lookup(&names, value).ok_or_else(|| ValidationError::InvalidRange {
            value: value.trim().to_owned(),
        })
    }
}

fn lookup<T: Copy>(table: &[(T, &str)], value: &str) -> Option<T> {
    let wanted = value.trim();
    table
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(wanted))
        .map(|(item, _)| *item)
}
