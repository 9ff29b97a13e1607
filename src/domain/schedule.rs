//! Rebalance scheduling.
//!
//! A "week-opening" date is the first axis date of its ISO week: the Monday,
//! or the next trading day when Monday is missing from the axis. Monthly,
//! quarterly and annual schedules take the first week-opening date inside
//! each eligible calendar month.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RebalanceFrequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl RebalanceFrequency {
    pub const ALL: [RebalanceFrequency; 5] = [
        RebalanceFrequency::Daily,
        RebalanceFrequency::Weekly,
        RebalanceFrequency::Monthly,
        RebalanceFrequency::Quarterly,
        RebalanceFrequency::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RebalanceFrequency::Daily => "daily",
            RebalanceFrequency::Weekly => "weekly",
            RebalanceFrequency::Monthly => "monthly",
            RebalanceFrequency::Quarterly => "quarterly",
            RebalanceFrequency::Annually => "annually",
        }
    }

    fn month_eligible(&self, month: u32) -> bool {
        match self {
            RebalanceFrequency::Daily
            | RebalanceFrequency::Weekly
            | RebalanceFrequency::Monthly => true,
            RebalanceFrequency::Quarterly => matches!(month, 1 | 4 | 7 | 10),
            RebalanceFrequency::Annually => month == 1,
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebalanceFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RebalanceFrequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "unknown rebalance frequency '{}' (expected daily, weekly, monthly, quarterly or annually)",
                    s.trim()
                )
            })
    }
}

/// Axis dates on which a strategy may recompute weights. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceSchedule {
    frequency: RebalanceFrequency,
    dates: BTreeSet<NaiveDate>,
}

impl RebalanceSchedule {
    pub fn build(dates: &[NaiveDate], frequency: RebalanceFrequency) -> Self {
        let openers = week_openers(dates);
        let selected: BTreeSet<NaiveDate> = match frequency {
            RebalanceFrequency::Daily => dates.iter().copied().collect(),
            RebalanceFrequency::Weekly => openers.into_iter().collect(),
            _ => {
                let mut seen_months = BTreeSet::new();
                openers
                    .into_iter()
                    .filter(|d| frequency.month_eligible(d.month()))
                    .filter(|d| seen_months.insert((d.year(), d.month())))
                    .collect()
            }
        };
        RebalanceSchedule {
            frequency,
            dates: selected,
        }
    }

    pub fn frequency(&self) -> RebalanceFrequency {
        self.frequency
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// First axis date of each ISO week. An axis that starts mid-week has no
/// opener for that partial week.
fn week_openers(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut previous_week = dates
        .first()
        .filter(|d| d.weekday() != Weekday::Mon)
        .map(|d| week_key(*d));
    for &d in dates {
        let key = week_key(d);
        if previous_week != Some(key) {
            out.push(d);
            previous_week = Some(key);
        }
    }
    out
}

fn week_key(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}
