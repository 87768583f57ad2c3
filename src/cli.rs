use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use church_calendar::{
    app::AppState,
    calendar::{parse_start, synthesize_year, Event, MonthCalendar},
    storage::{Config, EventStore},
    ui::month_view::{activities_heading, calculate_layout, render_text_grid, time_label},
};

pub const USAGE: &str = "Usage: church-calendar [--agenda [YYYY-MM-DD]] [--services [YEAR]] \
[--add TITLE START [--location L] [--category C] [--description D] [--registration]] \
[--delete ID] [--list] [--import FILE]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Interactive,
    Agenda(Option<NaiveDate>),
    Services(Option<i32>),
    Add(Event),
    Delete(String),
    List,
    Import(PathBuf),
    Help,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I>(args: I) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let Some(first) = args.next() else {
        return Ok(CliMode::Interactive);
    };

    let mode = match first.as_str() {
        "--agenda" => {
            let date = match args.next_if(|next| !next.starts_with("--")) {
                Some(value) => Some(
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", value))?,
                ),
                None => None,
            };
            CliMode::Agenda(date)
        }
        "--services" => {
            let year = match args.next_if(|next| !next.starts_with("--")) {
                Some(value) => Some(
                    value
                        .parse::<i32>()
                        .map_err(|_| format!("Invalid year '{}'.", value))?,
                ),
                None => None,
            };
            CliMode::Services(year)
        }
        "--add" => {
            let title = args.next().ok_or("--add requires a title")?;
            let start_at = args.next().ok_or("--add requires a start time")?;
            let mut event = Event::new(Uuid::new_v4().to_string(), title, start_at);

            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--location" => {
                        event = event.with_location(args.next().ok_or("--location requires a value")?);
                    }
                    "--category" => {
                        event = event.with_category(args.next().ok_or("--category requires a value")?);
                    }
                    "--description" => {
                        event = event.with_description(args.next().ok_or("--description requires a value")?);
                    }
                    "--registration" => event = event.with_registration(true),
                    _ => return Err(format!("Unknown argument: {}", flag)),
                }
            }
            CliMode::Add(event)
        }
        "--delete" => CliMode::Delete(args.next().ok_or("--delete requires an event id")?),
        "--list" => CliMode::List,
        "--import" => CliMode::Import(PathBuf::from(args.next().ok_or("--import requires a file")?)),
        "--help" | "-h" => CliMode::Help,
        _ => return Err(format!("Unknown argument: {}", first)),
    };

    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(mode)
}

pub fn run(mode: CliMode, config: &Config) -> anyhow::Result<()> {
    match mode {
        CliMode::Interactive => bail!("interactive mode runs in the terminal session"),
        CliMode::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliMode::Agenda(date) => run_agenda_mode(config, date),
        CliMode::Services(year) => {
            let year = year.unwrap_or_else(|| config.ui.timezone.today().year());
            print!("{}", format_services_text(config, year));
            Ok(())
        }
        CliMode::Add(event) => add_event(config, event),
        CliMode::Delete(id) => {
            let store = open_store(config)?;
            if store.delete_event(&id)? {
                tracing::info!("deleted event {}", id);
                println!("Deleted {}", id);
            } else {
                bail!("no event with id {}", id);
            }
            Ok(())
        }
        CliMode::List => {
            let store = open_store(config)?;
            for event in store.list_events()? {
                println!("{}  {:<25}  {}", event.id, event.start_at, event.title);
            }
            Ok(())
        }
        CliMode::Import(path) => {
            let (imported, skipped) = import_events(config, &path)?;
            println!("Imported {} events ({} will not appear on the calendar)", imported, skipped);
            Ok(())
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<EventStore> {
    EventStore::open(&config.storage.database).with_context(|| {
        format!("failed to open event database {}", config.storage.database.display())
    })
}

fn add_event(config: &Config, event: Event) -> anyhow::Result<()> {
    if parse_start(&event.start_at, config.ui.timezone).is_none() {
        bail!("'{}' is not an ISO 8601 timestamp", event.start_at);
    }
    let store = open_store(config)?;
    store.store_event(&event)?;
    tracing::info!("stored event {} ({})", event.id, event.title);
    println!("Added {}", event.id);
    Ok(())
}

/// Returns how many events were stored and how many of them have a start
/// that will keep them off the calendar.
fn import_events(config: &Config, path: &Path) -> anyhow::Result<(usize, usize)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of events", path.display()))?;

    let mut skipped = 0;
    for event in &events {
        if parse_start(&event.start_at, config.ui.timezone).is_none() {
            tracing::warn!("importing {} with unparseable start '{}'", event.id, event.start_at);
            skipped += 1;
        }
    }

    let mut store = open_store(config)?;
    let imported = store
        .store_events(&events)
        .with_context(|| format!("import of {} rolled back", path.display()))?;
    tracing::info!("imported {} events from {}", imported, path.display());
    Ok((imported, skipped))
}

pub fn run_agenda_mode(config: &Config, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let mut app = AppState::from_config(config)
        .context("failed to load calendar events")?;

    if let Some(date) = date {
        if !app.select_date(date) {
            bail!("{} is not in the current month", date);
        }
        app.toggle_filter(true);
    }

    let agenda = format_agenda_text(&app);
    display_with_pager(&agenda).context("failed to display agenda")
}

pub fn format_agenda_text(app: &AppState) -> String {
    let calendar = app.calendar();
    let mut lines = render_text_grid(&calculate_layout(&calendar));
    lines.push(String::new());
    lines.push(activities_heading(
        &calendar,
        app.selected_date(),
        app.selection.filter_selected_only,
    ));
    lines.push(String::new());
    lines.extend(activity_lines(&calendar, app));
    lines.push(String::new());
    lines.join("\n")
}

fn activity_lines(calendar: &MonthCalendar<'_>, app: &AppState) -> Vec<String> {
    if calendar.displayed_events.is_empty() {
        return vec!["No activities found".to_string()];
    }

    calendar
        .displayed_events
        .iter()
        .map(|event| {
            let mut line = format!("- {:<13} {}", time_label(event, app.zone), event.title);
            if let Some(location) = &event.location
                && !location.is_empty()
            {
                line.push_str(&format!(" @ {}", location));
            }
            if event.requires_registration() {
                line.push_str(" (registration required)");
            }
            line
        })
        .collect()
}

pub fn format_services_text(config: &Config, year: i32) -> String {
    let mut events: Vec<_> = synthesize_year(&config.schedule, year)
        .into_iter()
        .filter_map(|event| event.starts_at(config.ui.timezone).map(|at| (at, event)))
        .collect();
    events.sort_by_key(|(at, _)| *at);

    let mut text = format!("Recurring services for {}\n\n", year);
    for (at, event) in events {
        text.push_str(&format!("{}  {}\n", at.format("%a %Y-%m-%d %H:%M"), event.title));
    }
    text
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            print!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            print!("{text}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use church_calendar::calendar::DisplayZone;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.database = dir.path().join("events.db");
        config.ui.timezone = DisplayZone::Utc;
        config
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_starts_interactive_session() {
        assert_eq!(parse_args(args(&[])), Ok(CliMode::Interactive));
    }

    #[test]
    fn agenda_with_and_without_date() {
        assert_eq!(parse_args(args(&["--agenda"])), Ok(CliMode::Agenda(None)));
        assert_eq!(
            parse_args(args(&["--agenda", "2024-03-10"])),
            Ok(CliMode::Agenda(NaiveDate::from_ymd_opt(2024, 3, 10)))
        );
        assert!(parse_args(args(&["--agenda", "10/03/2024"])).is_err());
    }

    #[test]
    fn services_accepts_optional_year() {
        assert_eq!(parse_args(args(&["--services", "2024"])), Ok(CliMode::Services(Some(2024))));
        assert_eq!(parse_args(args(&["--services"])), Ok(CliMode::Services(None)));
    }

    #[test]
    fn add_collects_optional_fields() {
        let mode = parse_args(args(&[
            "--add", "Youth Retreat", "2024-07-12T09:00:00", "--location", "Camp Hill", "--registration",
        ]))
        .unwrap();

        let CliMode::Add(event) = mode else { panic!("expected add mode") };
        assert_eq!(event.title, "Youth Retreat");
        assert_eq!(event.location.as_deref(), Some("Camp Hill"));
        assert_eq!(event.registration_required, Some(true));
    }

    #[test]
    fn add_collects_description_and_category() {
        let mode = parse_args(args(&[
            "--add", "Food Drive", "2024-11-02", "--category", "Outreach", "--description", "Bring cans",
        ]))
        .unwrap();

        let CliMode::Add(event) = mode else { panic!("expected add mode") };
        assert_eq!(event.category.as_deref(), Some("Outreach"));
        assert_eq!(event.description.as_deref(), Some("Bring cans"));
    }

    #[test]
    fn add_rejects_unparseable_start() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let result = add_event(&config, Event::new("e1", "Picnic", "next sunday"));

        assert!(result.is_err());
        assert!(!config.storage.database.exists());
    }

    #[test]
    fn add_stores_valid_event() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        add_event(&config, Event::new("e1", "Picnic", "2024-06-01T12:00:00Z")).unwrap();

        let store = EventStore::open(&config.storage.database).unwrap();
        assert_eq!(store.list_events().unwrap().len(), 1);
    }

    #[test]
    fn import_counts_events_that_will_not_show() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let file = dir.path().join("events.json");
        std::fs::write(
            &file,
            r#"[
                {"id": "a", "title": "Revival", "start_at": "2024-08-01T19:00:00Z"},
                {"id": "b", "title": "Baptism", "start_at": "sometime in August"},
                {"id": "c", "title": "Retreat", "start_at": "2024-08-20"}
            ]"#,
        )
        .unwrap();

        let (imported, skipped) = import_events(&config, &file).unwrap();

        assert_eq!((imported, skipped), (3, 1));
        let store = EventStore::open(&config.storage.database).unwrap();
        assert_eq!(store.list_events().unwrap().len(), 3);
    }

    #[test]
    fn import_rejects_file_that_is_not_an_event_array() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let file = dir.path().join("events.json");
        std::fs::write(&file, r#"{"id": "a"}"#).unwrap();

        assert!(import_events(&config, &file).is_err());
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert!(parse_args(args(&["--sync"])).is_err());
        assert!(parse_args(args(&["--list", "extra"])).is_err());
    }

    #[test]
    fn agenda_text_lists_month_activities() {
        let app = AppState::new()
            .with_zone(DisplayZone::Utc)
            .with_today(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .with_events(vec![
                Event::new("a", "Choir Concert", "2024-03-10T18:00:00Z").with_location("Sanctuary"),
                Event::new("b", "Men's Breakfast", "2024-04-10T08:00:00Z"),
            ]);

        let text = format_agenda_text(&app);

        assert!(text.contains("March 2024"));
        assert!(text.contains("Choir Concert @ Sanctuary"));
        assert!(!text.contains("Men's Breakfast"));
    }

    #[test]
    fn agenda_text_reports_empty_month() {
        let app = AppState::new()
            .with_zone(DisplayZone::Utc)
            .with_today(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        assert!(format_agenda_text(&app).contains("No activities found"));
    }

    #[test]
    fn services_text_is_sorted_by_time() {
        let text = format_services_text(&Config::default(), 2024);
        let first_week: Vec<_> = text.lines().filter(|l| l.contains("2024-01-0")).collect();

        assert_eq!(
            first_week,
            vec![
                "Sun 2024-01-07 10:00  Sunday Worship Service",
                "Sun 2024-01-07 10:00  Thanksgiving Service",
                "Tue 2024-01-09 18:00  Bible Study",
            ]
        );
    }
}
