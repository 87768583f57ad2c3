use std::process::ExitCode;

use church_calendar::storage::Config;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{parse_cli_mode, CliMode, USAGE};
mod tui;
use tui::run_tui;

fn main() -> ExitCode {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Check the config file at {}", Config::config_path().display());
            tracing::error!("config load failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli_mode {
        CliMode::Interactive => run_tui(&config),
        mode => cli::run(mode, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "church-calendar.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("church-calendar started");
}
