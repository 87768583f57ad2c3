use chrono::{Datelike, NaiveDate};

use crate::calendar::{DayCell, DisplayZone, Event, MonthCalendar};

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub weeks: Vec<Week>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Week {
    pub days: Vec<DayCell>,
}

/// Splits the calendar grid into full rows of seven. The last row is padded
/// with blank cells so every row has a square in each weekday column.
pub fn calculate_layout(calendar: &MonthCalendar<'_>) -> MonthLayout {
    let weeks = calendar
        .weeks()
        .map(|row| {
            let mut days = row.to_vec();
            days.resize(7, DayCell::placeholder());
            Week { days }
        })
        .collect();

    MonthLayout {
        year: calendar.year(),
        month: calendar.month(),
        title: calendar.month_start.format("%B %Y").to_string(),
        weeks,
    }
}

/// Heading above the activity list.
pub fn activities_heading(calendar: &MonthCalendar<'_>, selected: Option<NaiveDate>, filtered: bool) -> String {
    match selected {
        Some(date) if filtered => format!("Activities on {}", date.format("%A, %B %-d, %Y")),
        _ => format!("Activities in {}", calendar.month_start.format("%B %Y")),
    }
}

pub fn time_label(event: &Event, zone: DisplayZone) -> String {
    event
        .starts_at(zone)
        .map(|start| start.format("%a %d %H:%M").to_string())
        .unwrap_or_default()
}

/// Plain-text rendering of the grid, used outside the terminal UI.
/// Selected days are bracketed and days with events carry a `*`.
pub fn render_text_grid(layout: &MonthLayout) -> Vec<String> {
    let mut lines = vec![
        format!("{:^35}", layout.title),
        WEEKDAY_HEADERS.iter().map(|h| format!(" {} ", h)).collect::<String>(),
    ];

    for week in &layout.weeks {
        let row: String = week.days.iter().map(text_cell).collect();
        lines.push(row.trim_end().to_string());
    }

    lines
}

fn text_cell(cell: &DayCell) -> String {
    let Some(date) = cell.date else {
        return "     ".to_string();
    };
    let marker = if cell.has_events { '*' } else { ' ' };
    if cell.is_selected {
        format!("[{:>2}]{}", date.day(), marker)
    } else {
        format!(" {:>2}{} ", date.day(), marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Selection;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn layout_has_title_and_month() {
        let calendar = MonthCalendar::build(&[], date(2024, 5, 15), &Selection::default(), DisplayZone::Utc);

        let layout = calculate_layout(&calendar);

        assert_eq!(layout.title, "May 2024");
        assert_eq!((layout.year, layout.month), (2024, 5));
    }

    #[test]
    fn each_week_has_seven_days() {
        let calendar = MonthCalendar::build(&[], date(2024, 3, 1), &Selection::default(), DisplayZone::Utc);

        let layout = calculate_layout(&calendar);

        assert_eq!(layout.weeks.len(), 6);
        for week in &layout.weeks {
            assert_eq!(week.days.len(), 7);
        }
    }

    #[test]
    fn first_day_sits_under_its_weekday_column() {
        // May 2024 starts on a Wednesday.
        let calendar = MonthCalendar::build(&[], date(2024, 5, 15), &Selection::default(), DisplayZone::Utc);

        let layout = calculate_layout(&calendar);
        let first_week = &layout.weeks[0].days;

        assert!(first_week[..3].iter().all(DayCell::is_placeholder));
        assert_eq!(first_week[3].date, Some(date(2024, 5, 1)));
        assert_eq!(WEEKDAY_HEADERS[3], "Wed");
    }

    #[test]
    fn heading_names_selected_day_only_when_filtering() {
        let calendar = MonthCalendar::build(&[], date(2024, 3, 1), &Selection::default(), DisplayZone::Utc);
        let selected = Some(date(2024, 3, 10));

        assert_eq!(activities_heading(&calendar, selected, false), "Activities in March 2024");
        assert_eq!(activities_heading(&calendar, selected, true), "Activities on Sunday, March 10, 2024");
        assert_eq!(activities_heading(&calendar, None, true), "Activities in March 2024");
    }

    #[test]
    fn text_grid_marks_selection_and_event_days() {
        let events = vec![Event::new("a", "Choir", "2024-09-03T18:00:00")];
        let selection = Selection {
            selected_date: Some(date(2024, 9, 1)),
            filter_selected_only: false,
        };
        let calendar = MonthCalendar::build(&events, date(2024, 9, 10), &selection, DisplayZone::Utc);

        let lines = render_text_grid(&calculate_layout(&calendar));

        assert_eq!(lines[1], " Sun  Mon  Tue  Wed  Thu  Fri  Sat ");
        assert_eq!(lines[2], "[ 1]   2    3*   4    5    6    7");
    }
}
