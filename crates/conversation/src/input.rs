//! Inbound input: resolved once at the transport boundary.
//!
//! Slash commands and the exact text of menu buttons become `Input::Command`;
//! any other text is `Input::Text` and is interpreted by the current
//! conversation state. Loosely typed labels ("add weight") only count as
//! commands from the idle state, so an exercise may be named "Today".

use crate::menu;

/// Everything the user can ask for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    ShowSchedule,
    ShowToday,
    EditMenu,
    AddExercise,
    AddWeight,
    DeleteExercise,
    Back,
}

impl Command {
    const ALL: [Command; 8] = [
        Command::Start,
        Command::ShowSchedule,
        Command::ShowToday,
        Command::EditMenu,
        Command::AddExercise,
        Command::AddWeight,
        Command::DeleteExercise,
        Command::Back,
    ];

    /// Slash-command name without the leading `/`.
    pub fn slash(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::ShowSchedule => "schedule",
            Command::ShowToday => "today",
            Command::EditMenu => "edit",
            Command::AddExercise => "add",
            Command::AddWeight => "weight",
            Command::DeleteExercise => "delete",
            Command::Back => "back",
        }
    }

    /// The menu button that triggers this command, if any.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Command::Start => None,
            Command::ShowSchedule => Some(menu::SHOW_SCHEDULE),
            Command::ShowToday => Some(menu::SHOW_TODAY),
            Command::EditMenu => Some(menu::EDIT_SCHEDULE),
            Command::AddExercise => Some(menu::ADD_EXERCISE),
            Command::AddWeight => Some(menu::ADD_WEIGHT),
            Command::DeleteExercise => Some(menu::DELETE_EXERCISE),
            Command::Back => Some(menu::BACK),
        }
    }

    /// Parse `/name` or `/name@botname`, ignoring any trailing arguments.
    fn from_slash(text: &str) -> Option<Self> {
        let word = text.strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.slash().eq_ignore_ascii_case(name))
    }

    /// Exact button text, as a keyboard tap sends it.
    fn from_label(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.label() == Some(text))
    }

    /// A label typed by hand: case-insensitive, emoji optional.
    pub fn from_typed_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| {
            cmd.label()
                .is_some_and(|label| menu::matches_label(text, label))
        })
    }
}

/// A resolved user event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Text(String),
}

impl Input {
    /// Resolve raw text from the transport.
    ///
    /// `is_command` is the transport's own command flag (Telegram's
    /// `bot_command` entity); text starting with `/` is treated the same way.
    /// An unknown slash command falls through as plain text.
    pub fn resolve(text: &str, is_command: bool) -> Self {
        let trimmed = text.trim();
        if is_command || trimmed.starts_with('/') {
            if let Some(cmd) = Command::from_slash(trimmed) {
                return Input::Command(cmd);
            }
        }
        match Command::from_label(trimmed) {
            Some(cmd) => Input::Command(cmd),
            None => Input::Text(trimmed.to_string()),
        }
    }
}
