//! Menu labels and keyboard builders.
//!
//! Labels double as implicit commands: a user tapping "➕ Add exercise" sends
//! that exact text, which `Input::resolve` maps back to a `Command`.

use gymbot_core::schedule::Weekday;

pub const SHOW_SCHEDULE: &str = "📅 Show schedule";
pub const SHOW_TODAY: &str = "📆 Today";
pub const EDIT_SCHEDULE: &str = "✏️ Edit schedule";

pub const ADD_EXERCISE: &str = "➕ Add exercise";
pub const ADD_WEIGHT: &str = "🏋️ Add weight";
pub const DELETE_EXERCISE: &str = "🗑️ Delete exercise";
pub const BACK: &str = "🔙 Back";

pub fn main_menu() -> Vec<String> {
    labels(&[SHOW_SCHEDULE, SHOW_TODAY, EDIT_SCHEDULE])
}

pub fn edit_menu() -> Vec<String> {
    labels(&[ADD_EXERCISE, ADD_WEIGHT, DELETE_EXERCISE, BACK])
}

/// Day buttons followed by Back.
pub fn day_menu(days: &[Weekday]) -> Vec<String> {
    days.iter()
        .map(|day| day.label().to_string())
        .chain(std::iter::once(BACK.to_string()))
        .collect()
}

/// Buttons `1..=count` followed by Back.
pub fn number_menu(count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| n.to_string())
        .chain(std::iter::once(BACK.to_string()))
        .collect()
}

pub fn back_menu() -> Vec<String> {
    vec![BACK.to_string()]
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Compare typed text with a label, ignoring case and the leading emoji.
///
/// "show schedule" matches "📅 Show schedule" so terminal users do not have
/// to type emoji.
pub fn matches_label(text: &str, label: &str) -> bool {
    let text = text.trim();
    text == label || strip_decoration(text).eq_ignore_ascii_case(strip_decoration(label))
}

fn strip_decoration(s: &str) -> &str {
    s.trim_start_matches(|c: char| !c.is_alphanumeric()).trim()
}
