pub mod event;
pub mod month;
pub mod recurring;

pub use event::{date_key, parse_start, DisplayZone, Event};
pub use month::{DayCell, MonthCalendar, Selection};
pub use recurring::{
    synthesize_monthly, synthesize_weekly, synthesize_year, MonthlyRule, MonthlyService,
    ServiceSchedule, ServiceTime, WeeklyService,
};

/// Events shown on the calendar page: the persisted ones followed by the
/// recurring services.
pub fn merge_events(persisted: Vec<Event>, synthetic: Vec<Event>) -> Vec<Event> {
    let mut merged = persisted;
    merged.extend(synthetic);
    merged
}
