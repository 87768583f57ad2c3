use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use chrono::Datelike;
use church_calendar::{
    app::AppState,
    calendar::MonthCalendar,
    ui::month_view::{self, WEEKDAY_HEADERS},
};

pub fn render(f: &mut Frame, app: &AppState, calendar: &MonthCalendar<'_>, area: ratatui::layout::Rect) {
    let layout = month_view::calculate_layout(calendar);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(layout.title.clone(), Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(
            WEEKDAY_HEADERS
                .iter()
                .map(|name| Span::styled(format!(" {} ", name), Style::default().fg(app.theme.weekday_header)))
                .collect::<Vec<_>>(),
        ),
    ];

    for week in &layout.weeks {
        let mut day_spans = Vec::new();

        for day_cell in &week.days {
            let Some(date) = day_cell.date else {
                day_spans.push(Span::raw("     "));
                continue;
            };

            let mut style = Style::default();

            if day_cell.is_selected {
                style = style.bg(app.theme.selected_bg).fg(app.theme.selected_fg).add_modifier(Modifier::BOLD);
            } else if day_cell.is_today {
                style = style.fg(app.theme.today).add_modifier(Modifier::BOLD);
            } else if day_cell.has_events {
                style = style.fg(app.theme.event_day);
            }

            if day_cell.has_events {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            let marker = if day_cell.has_events { "•" } else { " " };
            day_spans.push(Span::styled(format!(" {:>2}{} ", date.day(), marker), style));
        }

        lines.push(Line::from(day_spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("hjkl", Style::default().fg(app.theme.title)),
        Span::raw(" = Select day | "),
        Span::styled("f", Style::default().fg(app.theme.today)),
        Span::raw(" = Selected day only | "),
        Span::styled("Esc", Style::default().fg(app.theme.error)),
        Span::raw(" = Clear"),
    ]));

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}
