use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The two daily flags tracked independently for every resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Hospitalization,
    OvernightAbsence,
}

impl StatusKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Hospitalization, Self::OvernightAbsence]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hospitalization => "Hospitalization",
            Self::OvernightAbsence => "Overnight Absence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub String);

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub String);

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar month being reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, StayError> {
        if !(1..=12).contains(&month) {
            return Err(StayError::InvalidMonth { year, month });
        }
        // The previous month end is read for continuity, so it must exist too.
        let representable = NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.pred_opt())
            .is_some();
        if !representable {
            return Err(StayError::InvalidMonth { year, month });
        }
        // The following month must also exist so `last_day` can be derived.
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        if NaiveDate::from_ymd_opt(next_year, next_month, 1).is_none() {
            return Err(StayError::InvalidMonth { year, month });
        }

        Ok(Self { year, month })
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|next| next - Duration::days(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(self) -> u32 {
        self.last_day().day()
    }

    /// The last day of the preceding month, used for continuity.
    pub fn previous_month_end(self) -> NaiveDate {
        self.first_day().pred_opt().unwrap_or(NaiveDate::MIN)
    }

    pub fn date(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn label(self, day: u32) -> DateLabel {
        DateLabel {
            month: self.month,
            day,
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl<'de> Deserialize<'de> for ReportMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            year: i32,
            month: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        ReportMonth::new(raw.year, raw.month).map_err(serde::de::Error::custom)
    }
}

/// Day label within a reported month, rendered as `MM/DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateLabel {
    month: u32,
    day: u32,
}

impl DateLabel {
    pub const fn month(self) -> u32 {
        self.month
    }

    pub const fn day(self) -> u32 {
        self.day
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

impl FromStr for DateLabel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (month, day) = trimmed
            .split_once('/')
            .ok_or_else(|| format!("'{raw}' is not an MM/DD label"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("'{raw}' has an invalid month"))?;
        let day: u32 = day
            .parse()
            .map_err(|_| format!("'{raw}' has an invalid day"))?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(format!("'{raw}' is out of range"));
        }

        Ok(Self { month, day })
    }
}

impl Serialize for DateLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Start of an interval. `Unbounded` means the run was already active on the
/// last day of the previous month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "label")]
pub enum IntervalStart {
    Unbounded,
    Day(DateLabel),
}

impl IntervalStart {
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub const fn label(self) -> Option<DateLabel> {
        match self {
            Self::Unbounded => None,
            Self::Day(label) => Some(label),
        }
    }
}

impl fmt::Display for IntervalStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => Ok(()),
            Self::Day(label) => label.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusInterval {
    pub kind: StatusKind,
    pub start: IntervalStart,
    pub end: DateLabel,
}

impl StatusInterval {
    /// True when the run was still active on the last day of `month`. The
    /// emitted `end` is truncated to that day either way.
    pub fn reaches_month_end(&self, month: ReportMonth) -> bool {
        self.end == month.label(month.days_in_month())
    }
}

impl fmt::Display for StatusInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.start, self.end)
    }
}

/// One resident's flags for one calendar day, entered upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatusRecord {
    pub resident_id: ResidentId,
    pub date: NaiveDate,
    #[serde(default)]
    pub hospitalization_active: bool,
    #[serde(default)]
    pub overnight_absence_active: bool,
}

impl DailyStatusRecord {
    pub fn is_active(&self, kind: StatusKind) -> bool {
        match kind {
            StatusKind::Hospitalization => self.hospitalization_active,
            StatusKind::OvernightAbsence => self.overnight_absence_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAccounting {
    pub resident_id: ResidentId,
    pub year: i32,
    pub month: u32,
    pub enrolled_days: u32,
}

/// Day-indexed flags for one status kind over one month.
///
/// Slot 0 holds the value on the last day of the previous month; slots
/// `1..=days_in_month` hold the month itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFlags {
    month: ReportMonth,
    slots: Vec<bool>,
}

impl MonthFlags {
    pub fn new(month: ReportMonth) -> Self {
        Self {
            month,
            slots: vec![false; month.days_in_month() as usize + 1],
        }
    }

    /// Builds flags from per-day values (index 0 is day 1). Values past the
    /// end of the month are ignored and missing days stay `false`.
    pub fn from_days(month: ReportMonth, previous_day: bool, days: &[bool]) -> Self {
        let mut flags = Self::new(month);
        flags.set_previous_day(previous_day);
        for (index, active) in days.iter().enumerate() {
            flags.set(index as u32 + 1, *active);
        }
        flags
    }

    pub fn month(&self) -> ReportMonth {
        self.month
    }

    pub fn days(&self) -> u32 {
        (self.slots.len() - 1) as u32
    }

    pub fn previous_day(&self) -> bool {
        self.slots[0]
    }

    pub fn set_previous_day(&mut self, active: bool) {
        self.slots[0] = active;
    }

    /// Day is 1-based; out-of-range days read as `false`.
    pub fn get(&self, day: u32) -> bool {
        if day == 0 {
            return false;
        }
        self.slots.get(day as usize).copied().unwrap_or(false)
    }

    /// Day is 1-based; out-of-range days are ignored.
    pub fn set(&mut self, day: u32, active: bool) {
        if day == 0 {
            return;
        }
        if let Some(slot) = self.slots.get_mut(day as usize) {
            *slot = active;
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StayError {
    #[error("{year}-{month:02} is not a valid reporting month")]
    InvalidMonth { year: i32, month: u32 },
    #[error("resident {resident_id} has more than one record for {date}")]
    DuplicateRecord {
        resident_id: ResidentId,
        date: NaiveDate,
    },
    #[error("report slots must be between 1 and {max}, got {requested}")]
    InvalidSlots { requested: usize, max: usize },
}
