//! Inclusive date ranges used by listings, reports and export.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Inclusive `[from, to]` calendar range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> ResultEngine<Self> {
        if from > to {
            return Err(EngineError::InvalidDate(format!(
                "range start {from} is after its end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// The last `days` days ending at `today`, both ends included.
    pub fn last_days(days: u32, today: NaiveDate) -> ResultEngine<Self> {
        if days == 0 {
            return Err(EngineError::InvalidDate(
                "range must cover at least one day".to_string(),
            ));
        }
        let from = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| EngineError::InvalidDate(format!("{days} days before {today}")))?;
        Self::new(from, today)
    }

    /// Years 1 through 9999, the dates that sort correctly as stored text.
    #[must_use]
    pub fn all() -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
            to: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reversed_range_is_invalid() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 31)).is_err());
        let single = DateRange::new(date(2024, 2, 1), date(2024, 2, 1)).unwrap();
        assert!(single.contains(date(2024, 2, 1)));
    }

    #[test]
    fn last_days_includes_today() {
        let range = DateRange::last_days(30, date(2024, 3, 1)).unwrap();
        assert_eq!(range.from(), date(2024, 2, 1));
        assert_eq!(range.to(), date(2024, 3, 1));
        assert!(DateRange::last_days(0, date(2024, 3, 1)).is_err());
        assert_eq!(
            DateRange::last_days(1, date(2024, 3, 1)).unwrap().from(),
            date(2024, 3, 1)
        );
    }
}
