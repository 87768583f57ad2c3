use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use church_calendar::app::{AppState, Mode, StatusMessage};
use crate::tui::{calendar_views, dialogs};

pub fn ui(f: &mut Frame, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(main_chunks[1]);

    let calendar = app.calendar();

    let filter_label = if app.selection.filter_selected_only { "Selected day" } else { "Whole month" };
    let title_text = format!("Church Calendar - {} - {:?} Mode", filter_label, app.mode);

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, main_chunks[0]);

    calendar_views::month::render(f, app, &calendar, content_chunks[0]);
    calendar_views::event_list::render(f, app, &calendar, content_chunks[1]);

    let (status_text, status_color) = match (&app.mode, &app.status) {
        (Mode::Command, _) => (app.command_buffer.clone(), app.theme.command_mode),
        (_, Some(StatusMessage::Error(message))) => (message.clone(), app.theme.error),
        (_, Some(StatusMessage::Info(message))) => (message.clone(), app.theme.status_bar),
        (_, None) => (
            format!(
                "Activities this month: {} | Press 'q' to quit, '?' for help",
                calendar.month_events.len()
            ),
            app.theme.status_bar,
        ),
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .alignment(if matches!(app.mode, Mode::Command) { Alignment::Left } else { Alignment::Center })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, main_chunks[2]);

    if app.show_help {
        dialogs::help::render(f, app);
    }
}
