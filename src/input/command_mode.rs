use chrono::NaiveDate;

use crate::app::AppState;
use crate::ui::theme::Theme;

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Select(NaiveDate),
    Clear,
    Filter(bool),
    Theme(String),
    Help,
    Error(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(command_text) = trimmed.strip_prefix(':') else {
        return Command::Error("Commands must start with ':'".to_string());
    };
    let parts: Vec<&str> = command_text.split_whitespace().collect();

    if parts.is_empty() {
        return Command::Error("Empty command".to_string());
    }

    match parts[0] {
        "q" | "quit" => Command::Quit,
        "help" => Command::Help,
        "clear" => Command::Clear,
        "select" | "goto" => {
            if parts.len() < 2 {
                Command::Error("select requires a date argument".to_string())
            } else if let Ok(date) = NaiveDate::parse_from_str(parts[1], "%Y-%m-%d") {
                Command::Select(date)
            } else {
                Command::Error(format!("Invalid date format: {}", parts[1]))
            }
        }
        "filter" => match parts.get(1).copied() {
            Some("on") => Command::Filter(true),
            Some("off") => Command::Filter(false),
            Some(other) => Command::Error(format!("filter expects on or off, got {}", other)),
            None => Command::Error("filter requires on or off".to_string()),
        },
        "theme" => {
            if parts.len() < 2 {
                Command::Error("theme requires a theme name".to_string())
            } else {
                Command::Theme(parts[1].to_string())
            }
        }
        _ => Command::Error(format!("Unknown command: {}", parts[0])),
    }
}

/// Applies a parsed command. Returns `true` when the session should end.
pub fn execute(command: Command, state: &mut AppState) -> bool {
    match command {
        Command::Quit => return true,
        Command::Help => {
            state.show_help = true;
            state.help_scroll = 0;
        }
        Command::Clear => {
            state.clear_selection();
            state.status = None;
        }
        Command::Select(date) => {
            if state.select_date(date) {
                state.status = None;
            } else {
                state.set_error(format!("{} is not in {}", date, state.today.format("%B %Y")));
            }
        }
        Command::Filter(enabled) => {
            state.toggle_filter(enabled);
            state.set_info(if enabled { "Showing selected day only" } else { "Showing whole month" });
        }
        Command::Theme(name) => match Theme::find(&name) {
            Some(theme) => {
                state.theme = theme;
                state.set_info(format!("Theme set to {}", name));
            }
            None => state.set_error(format!(
                "Unknown theme {} (available: {})",
                name,
                Theme::available_themes().join(", ")
            )),
        },
        Command::Error(message) => {
            tracing::debug!("rejected command: {}", message);
            state.set_error(message);
        }
    }
    false
}
