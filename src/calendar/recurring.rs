use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::event::Event;

pub const SERVICE_CATEGORY: &str = "Service";

const WEEKLY_ID_PREFIX: &str = "synthetic";
const MONTHLY_ID_PREFIX: &str = "monthly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceTime {
    hour: u32,
    minute: u32,
}

impl ServiceTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn parse(input: &str) -> Option<Self> {
        let (hour, minute) = input.trim().split_once(':')?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return None;
        }
        Self::new(hour.parse().ok()?, minute.parse().ok()?)
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for ServiceTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid service time '{}', expected HH:MM", value))
    }
}

impl From<ServiceTime> for String {
    fn from(time: ServiceTime) -> Self {
        time.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyService {
    pub weekday: Weekday,
    pub time: ServiceTime,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthlyRule {
    FirstSunday,
    /// Two weeks after the first Sunday.
    ThirdSunday,
    SecondSaturday,
    LastFriday,
    LastSunday,
}

impl MonthlyRule {
    /// The day this rule lands on in the given month, or `None` when the
    /// computed day has spilled over into the next month.
    pub fn occurrence(&self, year: i32, month: u32) -> Option<NaiveDate> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = last_day_of_month(year, month)?;

        let candidate = match self {
            MonthlyRule::FirstSunday => first_weekday_on_or_after(first, Weekday::Sun),
            MonthlyRule::ThirdSunday => first_weekday_on_or_after(first, Weekday::Sun)
                .and_then(|sunday| sunday.checked_add_days(Days::new(14))),
            MonthlyRule::SecondSaturday => first_weekday_on_or_after(first, Weekday::Sat)
                .and_then(|saturday| saturday.checked_add_days(Days::new(7))),
            MonthlyRule::LastFriday => return last_weekday_on_or_before(last, Weekday::Fri),
            MonthlyRule::LastSunday => return last_weekday_on_or_before(last, Weekday::Sun),
        }?;

        (candidate.month() == month && candidate.year() == year).then_some(candidate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyService {
    /// Stable slug used in generated ids, e.g. `thanksgiving`.
    pub key: String,
    pub rule: MonthlyRule,
    pub time: ServiceTime,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_location: Option<String>,
    #[serde(default = "default_weekly")]
    pub weekly: Vec<WeeklyService>,
    #[serde(default = "default_monthly")]
    pub monthly: Vec<MonthlyService>,
}

fn default_weekly() -> Vec<WeeklyService> {
    ServiceSchedule::default().weekly
}

fn default_monthly() -> Vec<MonthlyService> {
    ServiceSchedule::default().monthly
}

impl ServiceSchedule {
    pub fn empty() -> Self {
        Self {
            church_location: None,
            weekly: Vec::new(),
            monthly: Vec::new(),
        }
    }

    /// One service per weekday; a later entry for the same weekday wins.
    pub fn weekly_slots(&self) -> HashMap<Weekday, &WeeklyService> {
        self.weekly
            .iter()
            .map(|service| (service.weekday, service))
            .collect()
    }

    fn service_event(&self, id_prefix: &str, date: NaiveDate, time: ServiceTime, title: &str) -> Option<Event> {
        let start = date.and_hms_opt(time.hour(), time.minute(), 0)?;
        let mut event = Event::new(
            format!("{}-{}", id_prefix, date.format("%Y-%m-%d")),
            title,
            start.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )
        .with_category(SERVICE_CATEGORY)
        .with_registration(false);
        event.location = self.church_location.clone();
        Some(event)
    }
}

impl Default for ServiceSchedule {
    fn default() -> Self {
        let weekly = [
            (Weekday::Sun, 10, 0, "Sunday Worship Service"),
            (Weekday::Tue, 18, 0, "Bible Study"),
            (Weekday::Wed, 18, 0, "Midweek Prayer Meeting"),
            (Weekday::Thu, 18, 0, "Choir Rehearsal"),
            (Weekday::Fri, 18, 0, "Friday Prayer Service"),
        ];
        let monthly = [
            ("thanksgiving", MonthlyRule::FirstSunday, 10, 0, "Thanksgiving Service"),
            ("youth-sunday", MonthlyRule::ThirdSunday, 10, 0, "Youth Sunday"),
            ("vigil", MonthlyRule::LastFriday, 22, 0, "Vigil & Holy Communion"),
            ("anointing", MonthlyRule::LastSunday, 10, 0, "Anointing Service"),
            ("yoruba-liberation", MonthlyRule::SecondSaturday, 6, 0, "Yoruba Liberation Hour"),
        ];

        Self {
            church_location: None,
            weekly: weekly
                .into_iter()
                .filter_map(|(weekday, hour, minute, title)| {
                    Some(WeeklyService {
                        weekday,
                        time: ServiceTime::new(hour, minute)?,
                        title: title.to_string(),
                    })
                })
                .collect(),
            monthly: monthly
                .into_iter()
                .filter_map(|(key, rule, hour, minute, title)| {
                    Some(MonthlyService {
                        key: key.to_string(),
                        rule,
                        time: ServiceTime::new(hour, minute)?,
                        title: title.to_string(),
                    })
                })
                .collect(),
        }
    }
}

/// Weeks start at the first Sunday on or after January 1st.
pub fn synthesize_weekly(schedule: &ServiceSchedule, year: i32) -> Vec<Event> {
    let slots = schedule.weekly_slots();
    if slots.is_empty() {
        return Vec::new();
    }

    let (Some(jan_first), Some(dec_last)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };
    let Some(mut sunday) = first_weekday_on_or_after(jan_first, Weekday::Sun) else {
        return Vec::new();
    };

    let mut events = Vec::new();
    while sunday <= dec_last {
        for offset in 0..7 {
            let Some(date) = sunday.checked_add_days(Days::new(offset)) else {
                continue;
            };
            if date.year() != year {
                continue;
            }
            let Some(service) = slots.get(&date.weekday()) else {
                continue;
            };
            let prefix = format!("{}-{}", WEEKLY_ID_PREFIX, weekday_slug(date.weekday()));
            events.extend(schedule.service_event(&prefix, date, service.time, &service.title));
        }

        let Some(next) = sunday.checked_add_days(Days::new(7)) else { break };
        sunday = next;
    }

    events
}

pub fn synthesize_monthly(schedule: &ServiceSchedule, year: i32) -> Vec<Event> {
    let mut events = Vec::new();

    for month in 1..=12 {
        for service in &schedule.monthly {
            let Some(date) = service.rule.occurrence(year, month) else {
                tracing::trace!("{} skipped in {}-{:02}", service.key, year, month);
                continue;
            };
            let prefix = format!("{}-{}", MONTHLY_ID_PREFIX, service.key);
            events.extend(schedule.service_event(&prefix, date, service.time, &service.title));
        }
    }

    events
}

pub fn synthesize_year(schedule: &ServiceSchedule, year: i32) -> Vec<Event> {
    let mut events = synthesize_weekly(schedule, year);
    events.extend(synthesize_monthly(schedule, year));
    tracing::debug!("synthesized {} service events for {}", events.len(), year);
    events
}

pub fn is_synthetic(event: &Event) -> bool {
    event.id.starts_with(&format!("{}-", WEEKLY_ID_PREFIX))
        || event.id.starts_with(&format!("{}-", MONTHLY_ID_PREFIX))
}

pub fn weekday_slug(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month_first.and_then(|d| d.pred_opt())
}

fn first_weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_sunday() - date.weekday().num_days_from_sunday()) % 7;
    date.checked_add_days(Days::new(ahead as u64))
}

fn last_weekday_on_or_before(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let behind = (7 + date.weekday().num_days_from_sunday() - weekday.num_days_from_sunday()) % 7;
    date.checked_sub_days(Days::new(behind as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::DisplayZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn start_of(event: &Event) -> chrono::NaiveDateTime {
        event.starts_at(DisplayZone::Utc).unwrap()
    }

    fn monthly_in(events: &[Event], key: &str, month: u32) -> Vec<String> {
        let prefix = format!("monthly-{}-", key);
        events
            .iter()
            .filter(|e| e.id.starts_with(&prefix) && start_of(e).month() == month)
            .map(|e| e.start_at.clone())
            .collect()
    }

    #[test]
    fn service_time_parses_hh_mm() {
        assert_eq!(ServiceTime::parse("06:00"), ServiceTime::new(6, 0));
        assert_eq!(ServiceTime::parse("22:30").map(|t| t.to_string()), Some("22:30".to_string()));
        assert!(ServiceTime::parse("24:00").is_none());
        assert!(ServiceTime::parse("10").is_none());
        assert!(ServiceTime::parse("10:5").is_none());
    }

    #[test]
    fn january_2024_monthly_services() {
        let events = synthesize_monthly(&ServiceSchedule::default(), 2024);

        assert_eq!(monthly_in(&events, "thanksgiving", 1), vec!["2024-01-07T10:00:00"]);
        assert_eq!(monthly_in(&events, "youth-sunday", 1), vec!["2024-01-21T10:00:00"]);
        assert_eq!(monthly_in(&events, "vigil", 1), vec!["2024-01-26T22:00:00"]);
        assert_eq!(monthly_in(&events, "anointing", 1), vec!["2024-01-28T10:00:00"]);
        assert_eq!(monthly_in(&events, "yoruba-liberation", 1), vec!["2024-01-13T06:00:00"]);
    }

    #[test]
    fn monthly_ids_combine_rule_and_date() {
        let events = synthesize_monthly(&ServiceSchedule::default(), 2024);

        assert!(events.iter().any(|e| e.id == "monthly-thanksgiving-2024-01-07"));
        assert!(events.iter().any(|e| e.id == "monthly-vigil-2024-01-26"));
    }

    #[test]
    fn youth_sunday_is_third_sunday_even_when_month_starts_on_sunday() {
        // September 2024 starts on a Sunday.
        assert_eq!(MonthlyRule::ThirdSunday.occurrence(2024, 9), Some(date(2024, 9, 15)));
    }

    #[test]
    fn second_saturday_when_month_starts_on_saturday() {
        // June 2024 starts on a Saturday.
        assert_eq!(MonthlyRule::SecondSaturday.occurrence(2024, 6), Some(date(2024, 6, 8)));
    }

    #[test]
    fn last_friday_when_month_ends_on_friday() {
        // May 2024 ends on a Friday.
        assert_eq!(MonthlyRule::LastFriday.occurrence(2024, 5), Some(date(2024, 5, 31)));
    }

    #[test]
    fn last_sunday_in_leap_february() {
        assert_eq!(MonthlyRule::LastSunday.occurrence(2024, 2), Some(date(2024, 2, 25)));
    }

    #[test]
    fn weekly_services_start_on_first_sunday_of_year() {
        let events = synthesize_weekly(&ServiceSchedule::default(), 2024);
        let first = &events[0];

        assert_eq!(first.id, "synthetic-sunday-2024-01-07");
        assert_eq!(first.start_at, "2024-01-07T10:00:00");
        assert_eq!(first.title, "Sunday Worship Service");
    }

    #[test]
    fn weekly_services_skip_days_after_december_31() {
        // The last week of 2024 starts on Sunday Dec 29; Wed-Fri are in 2025.
        let events = synthesize_weekly(&ServiceSchedule::default(), 2024);
        let last_week: Vec<_> = events
            .iter()
            .filter(|e| start_of(e).date() >= date(2024, 12, 29))
            .map(|e| e.id.as_str())
            .collect();

        assert_eq!(last_week, vec!["synthetic-sunday-2024-12-29", "synthetic-tuesday-2024-12-31"]);
    }

    #[test]
    fn synthetic_events_are_marked_as_services() {
        let mut schedule = ServiceSchedule::default();
        schedule.church_location = Some("Main Sanctuary".to_string());

        for event in synthesize_year(&schedule, 2025) {
            assert_eq!(event.category.as_deref(), Some(SERVICE_CATEGORY));
            assert_eq!(event.location.as_deref(), Some("Main Sanctuary"));
            assert_eq!(event.registration_required, Some(false));
            assert!(is_synthetic(&event));
        }
    }

    #[test]
    fn empty_schedule_yields_no_events() {
        assert!(synthesize_year(&ServiceSchedule::empty(), 2024).is_empty());
    }

    #[test]
    fn later_weekly_entry_replaces_earlier_one() {
        let mut schedule = ServiceSchedule::empty();
        for title in ["Early Service", "Late Service"] {
            schedule.weekly.push(WeeklyService {
                weekday: Weekday::Sun,
                time: ServiceTime::new(9, 0).unwrap(),
                title: title.to_string(),
            });
        }

        let events = synthesize_weekly(&schedule, 2024);

        assert_eq!(events.len(), 52);
        assert!(events.iter().all(|e| e.title == "Late Service"));
    }

    #[test]
    fn omitted_schedule_lists_fall_back_to_church_defaults() {
        let parsed: ServiceSchedule = toml::from_str(r#"
            church_location = "Main Sanctuary"
            monthly = []
        "#).unwrap();

        assert_eq!(parsed.weekly, ServiceSchedule::default().weekly);
        assert!(parsed.monthly.is_empty());
    }

    #[test]
    fn schedule_round_trips_through_toml() {
        let schedule = ServiceSchedule::default();
        let text = toml::to_string(&schedule).unwrap();
        let parsed: ServiceSchedule = toml::from_str(&text).unwrap();

        assert_eq!(parsed, schedule);
    }

    proptest! {
        #[test]
        fn weekly_events_stay_within_year(year in 1900i32..2200) {
            for event in synthesize_weekly(&ServiceSchedule::default(), year) {
                prop_assert_eq!(start_of(&event).year(), year);
            }
        }

        #[test]
        fn one_sunday_per_iterated_week(year in 1900i32..2200) {
            let events = synthesize_weekly(&ServiceSchedule::default(), year);
            let sundays: Vec<_> = events
                .iter()
                .filter(|e| e.id.starts_with("synthetic-sunday-"))
                .map(|e| start_of(e).date())
                .collect();

            let first = first_weekday_on_or_after(date(year, 1, 1), Weekday::Sun).unwrap();
            let expected_weeks = (date(year, 12, 31) - first).num_days() / 7 + 1;
            prop_assert_eq!(sundays.len() as i64, expected_weeks);
            prop_assert!(sundays.iter().all(|d| d.weekday() == Weekday::Sun));
            prop_assert!(sundays.windows(2).all(|w| (w[1] - w[0]).num_days() == 7));
        }

        #[test]
        fn last_friday_and_last_sunday_every_month(year in 1900i32..2200) {
            let events = synthesize_monthly(&ServiceSchedule::default(), year);
            for month in 1..=12 {
                prop_assert_eq!(monthly_in(&events, "vigil", month).len(), 1);
                prop_assert_eq!(monthly_in(&events, "anointing", month).len(), 1);
            }
        }

        #[test]
        fn youth_sunday_only_when_it_stays_in_month(year in 1900i32..2200, month in 1u32..=12) {
            let first_sunday = MonthlyRule::FirstSunday.occurrence(year, month).unwrap();
            let third = first_sunday + chrono::Duration::days(14);
            let events = synthesize_monthly(&ServiceSchedule::default(), year);

            let emitted = monthly_in(&events, "youth-sunday", month);
            prop_assert_eq!(emitted.len(), usize::from(third.month() == month));
        }

        #[test]
        fn synthesis_is_idempotent(year in 1900i32..2200) {
            let schedule = ServiceSchedule::default();
            prop_assert_eq!(synthesize_year(&schedule, year), synthesize_year(&schedule, year));
        }
    }
}
