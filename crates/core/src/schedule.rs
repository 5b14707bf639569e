//! Schedule domain model: week days, exercise entries and per-user schedules.
//!
//! A `UserSchedule` maps each `Weekday` to the ordered exercises planned for
//! that day. Days are kept in week order and a day never maps to an empty
//! list: removing the last entry drops the day key.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric user identifier (a Telegram user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The seven fixed day labels, ordered Monday to Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Canonical label, also the persisted key.
    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Day from its offset after Monday (0 = Monday).
    pub fn from_monday_offset(offset: u32) -> Option<Self> {
        Self::ALL.get(offset as usize).copied()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    /// Case-insensitive match against the labels, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownDay(wanted.to_string()))
    }
}

/// A positive weight, stored as a normalized decimal string (`62.5`, `60`).
///
/// Stored values go through [`Weight::parse`] on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Weight(String);

impl Weight {
    /// Parse user input. Accepts `,` as the decimal separator.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let text = trimmed.replace(',', ".");
        let value: f64 = text
            .parse()
            .map_err(|_| ValidationError::InvalidWeight(trimmed.to_string()))?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidWeight(trimmed.to_string()));
        }
        if value <= 0.0 {
            return Err(ValidationError::NonPositiveWeight);
        }
        Ok(Self(normalize_decimal(&text, value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Weight {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Weight> for String {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip a leading `+`, leading integer zeros, trailing fraction zeros and a
/// dangling decimal point. Exponent forms fall back to the float rendering.
fn normalize_decimal(text: &str, value: f64) -> String {
    let digits = text.trim_start_matches('+');
    if digits.contains(['e', 'E']) {
        return value.to_string();
    }
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    };
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// One planned exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEntry")]
pub struct ExerciseEntry {
    pub name: String,

    /// Absent means no weight recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl ExerciseEntry {
    /// Build an entry from user input; the name is trimmed and must be non-empty.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            weight: None,
        })
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Persisted entry shape, checked before it becomes an `ExerciseEntry`.
#[derive(Deserialize)]
struct StoredEntry {
    name: String,
    #[serde(default)]
    weight: Option<Weight>,
}

impl TryFrom<StoredEntry> for ExerciseEntry {
    type Error = ValidationError;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        let entry = Self::new(&stored.name)?;
        Ok(match stored.weight {
            Some(weight) => entry.with_weight(weight),
            None => entry,
        })
    }
}

/// Exercises for one day, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule(Vec<ExerciseEntry>);

impl DaySchedule {
    pub fn entries(&self) -> &[ExerciseEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate a 1-based choice and return the 0-based index.
    pub fn resolve_choice(&self, choice: i64) -> Result<usize, ValidationError> {
        if choice < 1 || choice as u64 > self.0.len() as u64 {
            return Err(ValidationError::OutOfRange {
                choice,
                max: self.0.len(),
            });
        }
        Ok((choice - 1) as usize)
    }
}

impl From<Vec<ExerciseEntry>> for DaySchedule {
    fn from(entries: Vec<ExerciseEntry>) -> Self {
        Self(entries)
    }
}

/// A user's whole week.
///
/// Deserialization drops days with no entries so a hand-edited file cannot
/// reintroduce an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Weekday, DaySchedule>",
    into = "BTreeMap<Weekday, DaySchedule>"
)]
pub struct UserSchedule {
    days: BTreeMap<Weekday, DaySchedule>,
}

impl UserSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day: Weekday) -> Option<&DaySchedule> {
        self.days.get(&day)
    }

    /// Days with at least one exercise, in week order.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        self.days.iter().map(|(day, schedule)| (*day, schedule))
    }

    pub fn weekdays(&self) -> Vec<Weekday> {
        self.days.keys().copied().collect()
    }

    pub fn exercise_count(&self) -> usize {
        self.days.values().map(DaySchedule::len).sum()
    }

    /// Append an exercise to the end of a day, creating the day if needed.
    pub fn add_entry(&mut self, day: Weekday, entry: ExerciseEntry) {
        self.days.entry(day).or_default().0.push(entry);
    }

    /// Set the weight of the entry at a 0-based index.
    pub fn set_weight(
        &mut self,
        day: Weekday,
        index: usize,
        weight: Weight,
    ) -> Result<&ExerciseEntry, ValidationError> {
        let schedule = self
            .days
            .get_mut(&day)
            .ok_or(ValidationError::DayNotInSchedule(day))?;
        let max = schedule.len();
        let entry = schedule
            .0
            .get_mut(index)
            .ok_or(ValidationError::OutOfRange {
                choice: index as i64 + 1,
                max,
            })?;
        entry.weight = Some(weight);
        Ok(entry)
    }

    /// Remove the entry at a 0-based index. Drops the day once it is empty.
    pub fn remove_entry(
        &mut self,
        day: Weekday,
        index: usize,
    ) -> Result<ExerciseEntry, ValidationError> {
        let schedule = self
            .days
            .get_mut(&day)
            .ok_or(ValidationError::DayNotInSchedule(day))?;
        if index >= schedule.len() {
            return Err(ValidationError::OutOfRange {
                choice: index as i64 + 1,
                max: schedule.len(),
            });
        }
        let removed = schedule.0.remove(index);
        if schedule.is_empty() {
            self.days.remove(&day);
        }
        Ok(removed)
    }
}

impl From<BTreeMap<Weekday, DaySchedule>> for UserSchedule {
    fn from(mut days: BTreeMap<Weekday, DaySchedule>) -> Self {
        days.retain(|_, schedule| !schedule.is_empty());
        Self { days }
    }
}

impl From<UserSchedule> for BTreeMap<Weekday, DaySchedule> {
    fn from(schedule: UserSchedule) -> Self {
        schedule.days
    }
}
