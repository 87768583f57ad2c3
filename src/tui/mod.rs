mod calendar_views;
mod dialogs;
mod presentation;
mod session;

pub use session::run_tui;
