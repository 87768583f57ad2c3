use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use church_calendar::{
    app::AppState,
    calendar::{recurring::is_synthetic, MonthCalendar},
    ui::month_view::{activities_heading, time_label},
};

pub fn render(f: &mut Frame, app: &AppState, calendar: &MonthCalendar<'_>, area: ratatui::layout::Rect) {
    let title = activities_heading(calendar, app.selected_date(), app.selection.filter_selected_only);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(title, Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
    ];

    if calendar.displayed_events.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("No activities found", Style::default().fg(app.theme.muted)),
        ]));
    }

    for event in &calendar.displayed_events {
        let title_style = if is_synthetic(event) {
            Style::default().fg(app.theme.service)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let mut spans = vec![
            Span::styled(time_label(event, app.zone), Style::default().fg(app.theme.today)),
            Span::raw("  "),
            Span::styled(event.title.as_str(), title_style),
        ];
        if event.requires_registration() {
            spans.push(Span::styled(" [registration]", Style::default().fg(app.theme.event_day)));
        }
        lines.push(Line::from(spans));

        let details: Vec<&str> = [event.category.as_deref(), event.location.as_deref()]
            .into_iter()
            .flatten()
            .filter(|detail| !detail.is_empty())
            .collect();
        if !details.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(details.join(" · "), Style::default().fg(app.theme.muted)),
            ]));
        }

        if let Some(description) = &event.description {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(description.as_str(), Style::default().fg(app.theme.muted)),
            ]));
        }
    }

    let content = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}
