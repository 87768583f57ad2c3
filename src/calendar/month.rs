use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::event::{date_key, DisplayZone, Event};
use super::recurring::last_day_of_month;

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: Option<NaiveDate>,
    pub is_selected: bool,
    pub is_today: bool,
    pub has_events: bool,
}

impl DayCell {
    pub fn placeholder() -> Self {
        Self {
            date: None,
            is_selected: false,
            is_today: false,
            has_events: false,
        }
    }

    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::placeholder()
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.is_selected = selected;
        self
    }

    pub fn with_today(mut self, today: bool) -> Self {
        self.is_today = today;
        self
    }

    pub fn with_events(mut self, has_events: bool) -> Self {
        self.has_events = has_events;
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.date.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub selected_date: Option<NaiveDate>,
    pub filter_selected_only: bool,
}

impl Selection {
    pub fn select_day(&mut self, cell: &DayCell) {
        if let Some(date) = cell.date {
            self.selected_date = Some(date);
        }
    }

    pub fn toggle_filter(&mut self, enabled: bool) {
        self.filter_selected_only = enabled;
    }

    pub fn clear(&mut self) {
        self.selected_date = None;
    }

    pub fn selected_key(&self) -> Option<String> {
        self.selected_date.map(date_key)
    }
}

#[derive(Debug, Clone)]
pub struct MonthCalendar<'a> {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub events_by_date: HashMap<String, Vec<&'a Event>>,
    pub days: Vec<DayCell>,
    pub month_events: Vec<&'a Event>,
    pub displayed_events: Vec<&'a Event>,
}

impl<'a> MonthCalendar<'a> {
    pub fn build(
        events: &'a [Event],
        today: NaiveDate,
        selection: &Selection,
        zone: DisplayZone,
    ) -> Self {
        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = last_day_of_month(today.year(), today.month()).unwrap_or(month_start);

        let events_by_date = bucket_by_date(events, zone);
        let days = month_grid(month_start, month_end, today, selection.selected_date, &events_by_date);
        let month_events = events_in_range(events, month_start, month_end, zone);

        let displayed_events = match selection.selected_key() {
            Some(key) if selection.filter_selected_only => {
                events_by_date.get(&key).cloned().unwrap_or_default()
            }
            _ => month_events.clone(),
        };

        Self {
            month_start,
            month_end,
            events_by_date,
            days,
            month_events,
            displayed_events,
        }
    }

    pub fn year(&self) -> i32 {
        self.month_start.year()
    }

    pub fn month(&self) -> u32 {
        self.month_start.month()
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.days.chunks(7)
    }
}

/// Unparseable starts are left out. Buckets are ordered by start time.
pub fn bucket_by_date(events: &[Event], zone: DisplayZone) -> HashMap<String, Vec<&Event>> {
    let mut dated: Vec<(NaiveDateTime, &Event)> = events
        .iter()
        .filter_map(|event| match event.starts_at(zone) {
            Some(start) => Some((start, event)),
            None => {
                tracing::debug!("skipping event {} with unparseable start '{}'", event.id, event.start_at);
                None
            }
        })
        .collect();
    dated.sort_by_key(|(start, _)| *start);

    let mut buckets: HashMap<String, Vec<&Event>> = HashMap::new();
    for (start, event) in dated {
        buckets.entry(date_key(start.date())).or_default().push(event);
    }
    buckets
}

/// Grid cells for the month: one blank per weekday column before the 1st
/// (Sunday is column 0), then every day of the month.
pub fn month_grid(
    month_start: NaiveDate,
    month_end: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    events_by_date: &HashMap<String, Vec<&Event>>,
) -> Vec<DayCell> {
    let leading = month_start.weekday().num_days_from_sunday() as usize;
    let mut days = vec![DayCell::placeholder(); leading];

    for date in month_start.iter_days().take_while(|d| *d <= month_end) {
        days.push(
            DayCell::new(date)
                .with_selected(selected == Some(date))
                .with_today(date == today)
                .with_events(events_by_date.contains_key(&date_key(date))),
        );
    }

    days
}

pub fn events_in_range(
    events: &[Event],
    start: NaiveDate,
    end: NaiveDate,
    zone: DisplayZone,
) -> Vec<&Event> {
    let mut matching: Vec<(NaiveDateTime, &Event)> = events
        .iter()
        .filter_map(|event| event.starts_at(zone).map(|at| (at, event)))
        .filter(|(at, _)| at.date() >= start && at.date() <= end)
        .collect();
    matching.sort_by_key(|(at, _)| *at);
    matching.into_iter().map(|(_, event)| event).collect()
}
