use chrono::{Datelike, Days, NaiveDate};
use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};
use crate::calendar::recurring::last_day_of_month;

pub fn handle_key(key: KeyCode, state: &mut AppState) {
    match key {
        KeyCode::Char('h') | KeyCode::Left => move_by_days(state, -1),
        KeyCode::Char('l') | KeyCode::Right => move_by_days(state, 1),
        KeyCode::Char('j') | KeyCode::Down => move_by_days(state, 7),
        KeyCode::Char('k') | KeyCode::Up => move_by_days(state, -7),
        KeyCode::Char('t') => jump_to_today(state),
        KeyCode::Char('g') => move_to_start_of_month(state),
        KeyCode::Char('G') => move_to_end_of_month(state),
        KeyCode::Char('f') => toggle_filter(state),
        KeyCode::Esc => state.clear_selection(),
        KeyCode::Char(':') => enter_command_mode(state),
        KeyCode::Char('?') => show_help(state),
        _ => {}
    }
}

/// Moves the selection; the first move without a selection lands on today.
/// Moves that would leave the month are ignored.
fn move_by_days(state: &mut AppState, delta: i64) {
    let Some(current) = state.selected_date() else {
        jump_to_today(state);
        return;
    };

    let target = if delta >= 0 {
        current.checked_add_days(Days::new(delta.unsigned_abs()))
    } else {
        current.checked_sub_days(Days::new(delta.unsigned_abs()))
    };

    if let Some(date) = target {
        state.select_date(date);
    }
}

fn jump_to_today(state: &mut AppState) {
    let today = state.today;
    state.select_date(today);
}

fn move_to_start_of_month(state: &mut AppState) {
    if let Some(first) = NaiveDate::from_ymd_opt(state.today.year(), state.today.month(), 1) {
        state.select_date(first);
    }
}

fn move_to_end_of_month(state: &mut AppState) {
    if let Some(last) = last_day_of_month(state.today.year(), state.today.month()) {
        state.select_date(last);
    }
}

fn toggle_filter(state: &mut AppState) {
    let enabled = !state.selection.filter_selected_only;
    state.toggle_filter(enabled);
    if enabled && state.selected_date().is_none() {
        state.set_info("Filter on: select a day to narrow the list");
    } else {
        state.status = None;
    }
}

fn enter_command_mode(state: &mut AppState) {
    state.mode = Mode::Command;
    state.command_buffer = ":".to_string();
}

fn show_help(state: &mut AppState) {
    state.show_help = true;
    state.help_scroll = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DisplayZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn state_on(today: NaiveDate) -> AppState {
        AppState::new().with_zone(DisplayZone::Utc).with_today(today)
    }

    #[test]
    fn first_move_selects_today() {
        let mut state = state_on(date(2025, 1, 15));

        handle_key(KeyCode::Char('l'), &mut state);

        assert_eq!(state.selected_date(), Some(date(2025, 1, 15)));
    }

    #[test]
    fn h_key_moves_to_previous_day() {
        let mut state = state_on(date(2025, 1, 15));
        state.select_date(date(2025, 1, 15));

        handle_key(KeyCode::Char('h'), &mut state);

        assert_eq!(state.selected_date(), Some(date(2025, 1, 14)));
    }

    #[test]
    fn l_key_moves_to_next_day() {
        let mut state = state_on(date(2025, 1, 15));
        state.select_date(date(2025, 1, 15));

        handle_key(KeyCode::Char('l'), &mut state);

        assert_eq!(state.selected_date(), Some(date(2025, 1, 16)));
    }

    #[test]
    fn j_and_k_move_by_week() {
        let mut state = state_on(date(2025, 1, 15));
        state.select_date(date(2025, 1, 15));

        handle_key(KeyCode::Char('j'), &mut state);
        assert_eq!(state.selected_date(), Some(date(2025, 1, 22)));

        handle_key(KeyCode::Char('k'), &mut state);
        handle_key(KeyCode::Char('k'), &mut state);
        assert_eq!(state.selected_date(), Some(date(2025, 1, 8)));
    }

    #[test]
    fn moving_past_month_end_is_ignored() {
        let mut state = state_on(date(2025, 1, 15));
        state.select_date(date(2025, 1, 29));

        handle_key(KeyCode::Char('j'), &mut state);

        assert_eq!(state.selected_date(), Some(date(2025, 1, 29)));
    }

    #[test]
    fn g_and_shift_g_jump_to_month_edges() {
        let mut state = state_on(date(2024, 2, 10));

        handle_key(KeyCode::Char('g'), &mut state);
        assert_eq!(state.selected_date(), Some(date(2024, 2, 1)));

        handle_key(KeyCode::Char('G'), &mut state);
        assert_eq!(state.selected_date(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn f_key_toggles_filter() {
        let mut state = state_on(date(2025, 1, 15));

        handle_key(KeyCode::Char('f'), &mut state);
        assert!(state.selection.filter_selected_only);

        handle_key(KeyCode::Char('f'), &mut state);
        assert!(!state.selection.filter_selected_only);
    }

    #[test]
    fn esc_clears_selection() {
        let mut state = state_on(date(2025, 1, 15));
        state.select_date(date(2025, 1, 3));

        handle_key(KeyCode::Esc, &mut state);

        assert_eq!(state.selected_date(), None);
    }

    #[test]
    fn colon_enters_command_mode() {
        let mut state = state_on(date(2025, 1, 15));

        handle_key(KeyCode::Char(':'), &mut state);

        assert_eq!(state.mode, Mode::Command);
        assert_eq!(state.command_buffer, ":");
    }

    #[test]
    fn question_mark_opens_help() {
        let mut state = state_on(date(2025, 1, 15));

        handle_key(KeyCode::Char('?'), &mut state);

        assert!(state.show_help);
    }
}
