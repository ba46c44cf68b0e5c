use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalibError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Calendar position, January = 1.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Simulation day standing in for the whole month. Months are taken as 30
    /// days long, so this is 15, 45, ..., 345 rather than a true day-of-year.
    pub fn representative_day(self) -> u32 {
        (self.number() - 1) * 30 + 15
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = CalibError;

    fn from_str(s: &str) -> Result<Self> {
        Month::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalibError::UnknownMonth(s.to_string()))
    }
}

/// Month to season-label mapping, usable in both directions.
///
/// Every season label is reached from exactly one month; that is checked when
/// the map is built, so `month_for` never has to pick between candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct SeasonMonthMap {
    by_month: BTreeMap<Month, String>,
    by_season: BTreeMap<String, Month>,
}

impl SeasonMonthMap {
    pub fn new<S, I>(pairs: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (Month, S)>,
    {
        let mut by_month = BTreeMap::new();
        for (month, season) in pairs {
            if by_month.insert(month, season.into()).is_some() {
                return Err(CalibError::InvalidInput(format!(
                    "{month} appears twice in seasons_by_month"
                )));
            }
        }

        let mut months_by_season: BTreeMap<&str, Vec<Month>> = BTreeMap::new();
        for (month, season) in &by_month {
            months_by_season.entry(season.as_str()).or_default().push(*month);
        }
        if let Some((season, months)) = months_by_season.iter().find(|(_, m)| m.len() > 1) {
            return Err(CalibError::AmbiguousSeasonMapping {
                season: season.to_string(),
                months: months.clone(),
            });
        }

        let by_season = by_month
            .iter()
            .map(|(month, season)| (season.clone(), *month))
            .collect();
        Ok(Self {
            by_month,
            by_season,
        })
    }

    pub fn month_for(&self, season: &str) -> Option<Month> {
        self.by_season.get(season).copied()
    }

    pub fn date_for(&self, season: &str) -> Option<u32> {
        self.month_for(season).map(Month::representative_day)
    }

    pub fn season_for(&self, month: Month) -> Option<&str> {
        self.by_month.get(&month).map(String::as_str)
    }

    /// Pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (Month, &str)> {
        self.by_month.iter().map(|(m, s)| (*m, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_month.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for SeasonMonthMap {
    type Error = CalibError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self> {
        let pairs = raw
            .into_iter()
            .map(|(month, season)| Ok((month.parse::<Month>()?, season)))
            .collect::<Result<Vec<_>>>()?;
        SeasonMonthMap::new(pairs)
    }
}

impl From<SeasonMonthMap> for BTreeMap<String, String> {
    fn from(map: SeasonMonthMap) -> Self {
        map.by_month
            .into_iter()
            .map(|(month, season)| (month.name().to_string(), season))
            .collect()
    }
}
