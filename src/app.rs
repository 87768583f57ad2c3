use chrono::{Datelike, NaiveDate};

use crate::calendar::{
    merge_events, synthesize_year, DayCell, DisplayZone, Event, MonthCalendar, Selection,
};
use crate::storage::{Config, EventStore, StoreError};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// State of one calendar viewing session. The month on screen is always the
/// one containing `today`.
pub struct AppState {
    pub mode: Mode,
    pub today: NaiveDate,
    pub zone: DisplayZone,
    pub events: Vec<Event>,
    pub selection: Selection,
    pub command_buffer: String,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    pub help_scroll: usize,
    pub theme: Theme,
}

impl AppState {
    pub fn new() -> Self {
        let zone = DisplayZone::default();
        Self {
            mode: Mode::Normal,
            today: zone.today(),
            zone,
            events: Vec::new(),
            selection: Selection::default(),
            command_buffer: String::new(),
            status: None,
            show_help: false,
            help_scroll: 0,
            theme: Theme::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = EventStore::open(&config.storage.database)?;
        let zone = config.ui.timezone;
        let now = zone.now();

        let persisted = store.load_upcoming(now, zone)?;
        let synthetic = synthesize_year(&config.schedule, now.year());
        tracing::info!(
            "loaded {} upcoming events and {} recurring services",
            persisted.len(),
            synthetic.len()
        );

        Ok(Self::new()
            .with_zone(zone)
            .with_theme(Theme::get_by_name(&config.ui.theme))
            .with_events(merge_events(persisted, synthetic)))
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self.today = zone.today();
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn calendar(&self) -> MonthCalendar<'_> {
        MonthCalendar::build(&self.events, self.today, &self.selection, self.zone)
    }

    pub fn select_day(&mut self, cell: &DayCell) {
        self.selection.select_day(cell);
    }

    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        if date.year() != self.today.year() || date.month() != self.today.month() {
            return false;
        }
        self.select_day(&DayCell::new(date));
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn toggle_filter(&mut self, enabled: bool) {
        self.selection.toggle_filter(enabled);
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selection.selected_date
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Info(message.into()));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Error(message.into()));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
