//! The conversation state machine.
//!
//! `transition` is pure: it reads the user's schedule but never touches
//! storage. The caller persists `Transition::write` first and commits
//! `Transition::next` only once that succeeded.
//!
//! Invalid input never moves the user: the same state is returned together
//! with the error text and the keyboard of that state (retry in place).

use crate::format::Formatter;
use crate::input::{Command, Input};
use crate::menu::{back_menu, day_menu, edit_menu, main_menu, number_menu};
use crate::state::{ConvState, EditFlow};
use gymbot_core::channel::Reply;
use gymbot_core::error::{EmptyCollectionError, ValidationError};
use gymbot_core::schedule::{ExerciseEntry, UserSchedule, Weekday, Weight};

pub const START_TEXT: &str = "Hi! I help you plan your weekly workouts. Choose an action:";
pub const MAIN_MENU_TEXT: &str = "Main menu:";
pub const EDIT_MENU_TEXT: &str = "Choose an action:";
pub const ASK_DAY_TEXT: &str = "Enter the day of the week:";
pub const CHOOSE_DAY_TEXT: &str = "Choose a day:";
pub const IDLE_HINT_TEXT: &str = "Choose an action from the menu.";

/// Everything a transition may look at besides the state and the input.
pub struct Context<'a> {
    pub schedule: &'a UserSchedule,
    pub formatter: &'a Formatter,
    pub today: Weekday,
}

/// How the input was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A prompt or an informational reply.
    Prompted,
    /// Input failed validation; state unchanged.
    Rejected(ValidationError),
    /// Nothing to operate on; back to idle.
    Abandoned(EmptyCollectionError),
    /// A flow finished and the schedule changed.
    Completed,
    /// "back" left a flow.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ConvState,
    pub reply: Reply,
    /// The full schedule to save, when the transition mutates it.
    pub write: Option<UserSchedule>,
    pub outcome: Outcome,
}

impl Transition {
    fn prompt(next: ConvState, text: impl Into<String>, menu: Vec<String>) -> Self {
        Self {
            next,
            reply: Reply::new(text, menu),
            write: None,
            outcome: Outcome::Prompted,
        }
    }

    fn idle(text: impl Into<String>, menu: Vec<String>) -> Self {
        Self::prompt(ConvState::Idle, text, menu)
    }

    fn reject(state: ConvState, err: ValidationError, ctx: &Context<'_>) -> Self {
        Self {
            next: state,
            reply: Reply::new(err.to_string(), menu_for(state, ctx.schedule)),
            write: None,
            outcome: Outcome::Rejected(err),
        }
    }

    fn abandon(err: EmptyCollectionError) -> Self {
        Self {
            next: ConvState::Idle,
            reply: Reply::new(err.to_string(), main_menu()),
            write: None,
            outcome: Outcome::Abandoned(err),
        }
    }

    fn complete(text: String, schedule: UserSchedule) -> Self {
        Self {
            next: ConvState::Idle,
            reply: Reply::new(text, main_menu()),
            write: Some(schedule),
            outcome: Outcome::Completed,
        }
    }
}

/// Compute the next state, reply and optional write for one input.
pub fn transition(state: &ConvState, input: &Input, ctx: &Context<'_>) -> Transition {
    match input {
        Input::Command(cmd) => on_command(*cmd, state, ctx),
        Input::Text(text) => on_text(*state, text, ctx),
    }
}

/// Commands other than Back abandon whatever flow is in progress.
fn on_command(cmd: Command, state: &ConvState, ctx: &Context<'_>) -> Transition {
    match cmd {
        Command::Back => Transition {
            next: ConvState::Idle,
            reply: Reply::new(MAIN_MENU_TEXT, main_menu()),
            write: None,
            outcome: if state.is_idle() {
                Outcome::Prompted
            } else {
                Outcome::Cancelled
            },
        },
        Command::Start => Transition::idle(START_TEXT, main_menu()),
        Command::ShowSchedule => {
            Transition::idle(ctx.formatter.format_schedule(ctx.schedule), main_menu())
        }
        Command::ShowToday => Transition::idle(today_text(ctx), main_menu()),
        Command::EditMenu => Transition::idle(EDIT_MENU_TEXT, edit_menu()),
        Command::AddExercise => {
            Transition::prompt(ConvState::AwaitingDay, ASK_DAY_TEXT, day_menu(&Weekday::ALL))
        }
        Command::AddWeight => start_edit(EditFlow::Weight, ctx),
        Command::DeleteExercise => start_edit(EditFlow::Delete, ctx),
    }
}

fn on_text(state: ConvState, text: &str, ctx: &Context<'_>) -> Transition {
    match state {
        ConvState::Idle => match Command::from_typed_label(text) {
            Some(cmd) => on_command(cmd, &state, ctx),
            None => Transition::idle(IDLE_HINT_TEXT, main_menu()),
        },
        ConvState::AwaitingDay => match text.parse::<Weekday>() {
            Ok(day) => Transition::prompt(
                ConvState::AwaitingExercise { day },
                format!("Now enter the exercise for {day}:"),
                back_menu(),
            ),
            Err(e) => Transition::reject(state, e, ctx),
        },
        ConvState::AwaitingExercise { day } => match ExerciseEntry::new(text) {
            Ok(entry) => {
                let text = format!("✅ {} added to {day}!", entry.name);
                let mut updated = ctx.schedule.clone();
                updated.add_entry(day, entry);
                Transition::complete(text, updated)
            }
            Err(e) => Transition::reject(state, e, ctx),
        },
        ConvState::AwaitingEditDay { flow } => choose_day(flow, text, ctx),
        ConvState::AwaitingEditChoice { flow, day } => choose_exercise(flow, day, text, ctx),
        ConvState::AwaitingWeight { day, exercise_num } => {
            set_weight(day, exercise_num, text, ctx)
        }
    }
}

fn start_edit(flow: EditFlow, ctx: &Context<'_>) -> Transition {
    if ctx.schedule.is_empty() {
        return Transition::abandon(EmptyCollectionError::NoDays);
    }
    Transition::prompt(
        ConvState::AwaitingEditDay { flow },
        CHOOSE_DAY_TEXT,
        day_menu(&ctx.schedule.weekdays()),
    )
}

fn choose_day(flow: EditFlow, text: &str, ctx: &Context<'_>) -> Transition {
    let state = ConvState::AwaitingEditDay { flow };
    let day = match text.parse::<Weekday>() {
        Ok(day) => day,
        Err(e) => return Transition::reject(state, e, ctx),
    };
    let Some(exercises) = ctx.schedule.day(day) else {
        return Transition::reject(state, ValidationError::DayNotInSchedule(day), ctx);
    };
    if exercises.is_empty() {
        return match flow {
            EditFlow::Weight => Transition::reject(state, ValidationError::EmptyDay(day), ctx),
            EditFlow::Delete => Transition::abandon(EmptyCollectionError::NoExercises(day)),
        };
    }

    let action = match flow {
        EditFlow::Weight => "set its weight",
        EditFlow::Delete => "delete it",
    };
    let text = format!(
        "Exercises on {day}:\n{}\n\nEnter the exercise number to {action}:",
        ctx.formatter.numbered(exercises).join("\n")
    );
    Transition::prompt(
        ConvState::AwaitingEditChoice { flow, day },
        text,
        number_menu(exercises.len()),
    )
}

fn choose_exercise(flow: EditFlow, day: Weekday, text: &str, ctx: &Context<'_>) -> Transition {
    let state = ConvState::AwaitingEditChoice { flow, day };
    // The day vanished since it was picked (file changed underneath us)
    let Some(exercises) = ctx.schedule.day(day) else {
        return Transition::abandon(EmptyCollectionError::NoExercises(day));
    };
    let index = match parse_choice(text).and_then(|choice| exercises.resolve_choice(choice)) {
        Ok(index) => index,
        Err(e) => return Transition::reject(state, e, ctx),
    };

    match flow {
        EditFlow::Weight => {
            let name = &exercises.entries()[index].name;
            Transition::prompt(
                ConvState::AwaitingWeight {
                    day,
                    exercise_num: index,
                },
                format!("Enter the weight for {name} in {}:", ctx.formatter.unit()),
                back_menu(),
            )
        }
        EditFlow::Delete => {
            let mut updated = ctx.schedule.clone();
            match updated.remove_entry(day, index) {
                Ok(removed) => Transition::complete(
                    format!("❌ Removed: {}", ctx.formatter.format_entry(&removed)),
                    updated,
                ),
                Err(e) => Transition::reject(state, e, ctx),
            }
        }
    }
}

fn set_weight(day: Weekday, exercise_num: usize, text: &str, ctx: &Context<'_>) -> Transition {
    let state = ConvState::AwaitingWeight { day, exercise_num };
    let weight = match Weight::parse(text) {
        Ok(weight) => weight,
        Err(e) => return Transition::reject(state, e, ctx),
    };
    let mut updated = ctx.schedule.clone();
    let text = match updated.set_weight(day, exercise_num, weight) {
        Ok(entry) => format!("✅ {}", ctx.formatter.format_entry(entry)),
        Err(_) => return Transition::abandon(EmptyCollectionError::NoExercises(day)),
    };
    Transition::complete(text, updated)
}

fn parse_choice(text: &str) -> Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber(text.trim().to_string()))
}

fn today_text(ctx: &Context<'_>) -> String {
    let today = ctx.today;
    match ctx.schedule.day(today) {
        Some(exercises) => format!(
            "🏋️ Today's workout\n\n{}",
            ctx.formatter.format_day(today, exercises)
        ),
        None => format!("Today is {today}. Nothing is planned, enjoy the rest day."),
    }
}

/// The keyboard a state shows while waiting for input.
pub fn menu_for(state: ConvState, schedule: &UserSchedule) -> Vec<String> {
    match state {
        ConvState::Idle => main_menu(),
        ConvState::AwaitingDay => day_menu(&Weekday::ALL),
        ConvState::AwaitingExercise { .. } | ConvState::AwaitingWeight { .. } => back_menu(),
        ConvState::AwaitingEditDay { .. } => day_menu(&schedule.weekdays()),
        ConvState::AwaitingEditChoice { day, .. } => {
            number_menu(schedule.day(day).map_or(0, |exercises| exercises.len()))
        }
    }
}
