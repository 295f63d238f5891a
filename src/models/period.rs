//! Calendar periods and half-open date windows.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Issue cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Daily, Period::Weekly, Period::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Capitalized name used in issue titles.
    pub fn title(&self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(AppError::validation(format!(
                "unknown period '{other}', expected daily, weekly or monthly"
            ))),
        }
    }
}

/// Half-open interval `[start, end)` of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting empty or inverted ranges.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(AppError::validation(format!(
                "range start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering `period` and ending with `anchor` (inclusive).
    pub fn resolve(anchor: NaiveDate, period: Period) -> Result<Self> {
        let start = match period {
            Period::Daily => anchor.checked_sub_days(Days::new(1)),
            Period::Weekly => anchor.checked_sub_days(Days::new(7)),
            Period::Monthly => anchor.checked_sub_months(Months::new(1)),
        };
        let end = anchor.checked_add_days(Days::new(1));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(AppError::validation(format!(
                "anchor date {anchor} is out of range"
            ))),
        }
    }

    /// Parse a custom range.
    ///
    /// Accepts `YYYY-MM-DD..YYYY-MM-DD`, `YYYY-MM-DD-YYYY-MM-DD` and
    /// `last N days|weeks|months` (relative to `today`, which is included).
    pub fn parse_range(input: &str, today: NaiveDate) -> Result<Self> {
        let text = input.trim();
        let absolute = Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:\.\.|-)(\d{4}-\d{2}-\d{2})$")
            .map_err(|e| AppError::validation(e.to_string()))?;
        let relative = Regex::new(r"^last\s+(?:(\d+)\s+)?(day|week|month)s?$")
            .map_err(|e| AppError::validation(e.to_string()))?;

        if let Some(caps) = absolute.captures(text) {
            let start = parse_day(&caps[1])?;
            let end = parse_day(&caps[2])?;
            return Self::new(start, end);
        }

        if let Some(caps) = relative.captures(&text.to_ascii_lowercase()) {
            let count: u32 = match caps.get(1) {
                Some(n) => n
                    .as_str()
                    .parse()
                    .map_err(|_| AppError::validation(format!("bad count in '{text}'")))?,
                None => 1,
            };
            if count == 0 {
                return Err(AppError::validation("range length must be at least 1"));
            }
            let start = match &caps[2] {
                "day" => today.checked_sub_days(Days::new(u64::from(count))),
                "week" => today.checked_sub_days(Days::new(7 * u64::from(count))),
                _ => today.checked_sub_months(Months::new(count)),
            };
            let end = today.checked_add_days(Days::new(1));
            return match (start, end) {
                (Some(start), Some(end)) => Self::new(start, end),
                _ => Err(AppError::validation(format!("range '{text}' is out of range"))),
            };
        }

        Err(AppError::validation(format!(
            "range needs to be a phrase like 'last 2 weeks' or YYYY-MM-DD..YYYY-MM-DD, got '{text}'"
        )))
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Days in the window, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day < self.end)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::validation(format!("invalid date '{s}': {e}")))
}
