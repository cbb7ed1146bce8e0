use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use shared_types::AdjustPolicy;

use crate::RuleError;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2999;

/// A competence period (month/year an obligation refers to).
///
/// Obligations are filed in arrears: the due date always falls in the
/// month after the competence month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Competence {
    first_day: NaiveDate,
}

impl Competence {
    pub fn new(month: u32, year: i32) -> Result<Self, RuleError> {
        if !(1..=12).contains(&month) {
            return Err(RuleError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(RuleError::InvalidYear(year));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or(RuleError::InvalidYear(year))
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// First day of the month in which this competence is due
    pub fn filing_month(&self) -> NaiveDate {
        self.first_day + Months::new(1)
    }
}

/// Day of month a binding is due on, 1 through 31
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueDay(u32);

impl DueDay {
    pub fn new(day: u32) -> Result<Self, RuleError> {
        if (1..=31).contains(&day) {
            Ok(Self(day))
        } else {
            Err(RuleError::InvalidDueDay(day))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

fn days_in_month(first_day: NaiveDate) -> u32 {
    let next = first_day + Months::new(1);
    next.signed_duration_since(first_day).num_days() as u32
}

/// Due date before weekend adjustment.
///
/// A due day past the end of the filing month is clamped to its last day
/// (31 in April gives April 30).
pub fn unadjusted_due_date(due_day: DueDay, competence: Competence) -> NaiveDate {
    let first = competence.filing_month();
    let day = due_day.get().min(days_in_month(first));
    first + Days::new(u64::from(day - 1))
}

pub fn adjust_for_weekend(date: NaiveDate, policy: AdjustPolicy) -> NaiveDate {
    match (date.weekday(), policy) {
        (Weekday::Sat, AdjustPolicy::Anticipate) => date - Days::new(1),
        (Weekday::Sun, AdjustPolicy::Anticipate) => date - Days::new(2),
        (Weekday::Sat, AdjustPolicy::Postpone) => date + Days::new(2),
        (Weekday::Sun, AdjustPolicy::Postpone) => date + Days::new(1),
        _ => date,
    }
}

pub fn due_date(due_day: DueDay, policy: AdjustPolicy, competence: Competence) -> NaiveDate {
    adjust_for_weekend(unadjusted_due_date(due_day, competence), policy)
}

/// Due dates for the twelve competence months of `year`, in month order
pub fn annual_schedule(
    due_day: DueDay,
    policy: AdjustPolicy,
    year: i32,
) -> Result<Vec<(Competence, NaiveDate)>, RuleError> {
    (1..=12)
        .map(|month| {
            let competence = Competence::new(month, year)?;
            Ok((competence, due_date(due_day, policy, competence)))
        })
        .collect()
}
