//! Conversation states. Scratch values chosen earlier in a flow travel
//! inside the variant that needs them.

use gymbot_core::schedule::Weekday;

/// Which edit flow picked the day / exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditFlow {
    Weight,
    Delete,
}

/// Where a user is in the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvState {
    #[default]
    Idle,
    /// Add-exercise flow: waiting for a week day label.
    AwaitingDay,
    /// Add-exercise flow: waiting for the exercise name.
    AwaitingExercise { day: Weekday },
    /// Weight flow: waiting for the weight of `exercise_num` (0-based).
    AwaitingWeight { day: Weekday, exercise_num: usize },
    /// Weight or delete flow: waiting for a day from the schedule.
    AwaitingEditDay { flow: EditFlow },
    /// Weight or delete flow: waiting for a 1-based exercise number.
    AwaitingEditChoice { flow: EditFlow, day: Weekday },
}

impl ConvState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConvState::Idle)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::AwaitingDay => "awaiting_day",
            ConvState::AwaitingExercise { .. } => "awaiting_exercise",
            ConvState::AwaitingWeight { .. } => "awaiting_weight",
            ConvState::AwaitingEditDay { .. } => "awaiting_edit_day",
            ConvState::AwaitingEditChoice { .. } => "awaiting_edit_choice",
        }
    }
}
