//! Schedule rendering: pure functions of the data model.

use gymbot_core::schedule::{DaySchedule, ExerciseEntry, UserSchedule, Weekday};

pub const EMPTY_SCHEDULE: &str =
    "Your workout schedule is empty. Add exercises from the edit menu.";

const HEADER: &str = "📅 Your workout schedule:";

/// Renders schedules with a fixed weight unit suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    unit: String,
}

impl Formatter {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Whole week, one block per day in week order.
    pub fn format_schedule(&self, schedule: &UserSchedule) -> String {
        if schedule.is_empty() {
            return EMPTY_SCHEDULE.to_string();
        }
        let blocks: Vec<String> = schedule
            .days()
            .map(|(day, exercises)| self.format_day(day, exercises))
            .collect();
        format!("{HEADER}\n\n{}", blocks.join("\n\n"))
    }

    /// `"<Day>:"` followed by the numbered exercises.
    pub fn format_day(&self, day: Weekday, exercises: &DaySchedule) -> String {
        let mut out = format!("{day}:");
        for line in self.numbered(exercises) {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }

    /// `"1. Squat"` lines, numbered from 1.
    pub fn numbered(&self, exercises: &DaySchedule) -> Vec<String> {
        exercises
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {}", i + 1, self.format_entry(entry)))
            .collect()
    }

    /// One exercise, with `(60 kg)` appended when a weight is set.
    pub fn format_entry(&self, entry: &ExerciseEntry) -> String {
        match &entry.weight {
            Some(weight) => format!("{} ({weight} {})", entry.name, self.unit),
            None => entry.name.clone(),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new("kg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymbot_core::schedule::Weight;
    use proptest::prelude::*;

    fn entry(name: &str) -> ExerciseEntry {
        ExerciseEntry::new(name).unwrap()
    }

    #[test]
    fn empty_schedule_message() {
        let fmt = Formatter::default();
        assert_eq!(fmt.format_schedule(&UserSchedule::new()), EMPTY_SCHEDULE);
    }

    #[test]
    fn single_day_block() {
        let fmt = Formatter::default();
        let mut schedule = UserSchedule::new();
        schedule.add_entry(Weekday::Monday, entry("Squat"));
        assert_eq!(
            fmt.format_schedule(&schedule),
            "📅 Your workout schedule:\n\nMonday:\n1. Squat"
        );
    }

    #[test]
    fn weights_and_ordering() {
        let fmt = Formatter::new("lb");
        let mut schedule = UserSchedule::new();
        schedule.add_entry(Weekday::Thursday, entry("Row"));
        schedule.add_entry(
            Weekday::Monday,
            entry("Squat").with_weight(Weight::parse("62.50").unwrap()),
        );
        schedule.add_entry(Weekday::Monday, entry("Plank"));

        let text = fmt.format_schedule(&schedule);
        assert_eq!(
            text,
            "📅 Your workout schedule:\n\n\
             Monday:\n1. Squat (62.5 lb)\n2. Plank\n\n\
             Thursday:\n1. Row"
        );
    }

    #[test]
    fn numbered_lines() {
        let fmt = Formatter::default();
        let day = DaySchedule::from(vec![entry("A"), entry("B")]);
        assert_eq!(fmt.numbered(&day), vec!["1. A", "2. B"]);
    }

    proptest! {
        #[test]
        fn formatting_is_deterministic(names in proptest::collection::vec("[a-z]{1,8}", 0..10), offsets in proptest::collection::vec(0u32..7, 10)) {
            let mut schedule = UserSchedule::new();
            for (name, offset) in names.iter().zip(offsets) {
                schedule.add_entry(Weekday::from_monday_offset(offset).unwrap(), entry(name));
            }
            let fmt = Formatter::default();
            let first = fmt.format_schedule(&schedule);
            prop_assert_eq!(&first, &fmt.format_schedule(&schedule));
            prop_assert_eq!(schedule.days().count() == 0, first == EMPTY_SCHEDULE);
        }
    }
}
