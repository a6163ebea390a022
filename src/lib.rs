/*!
A mock learning-management front end.

Course catalog, role-aware dashboards, and a single locally persisted
session. There is no real authentication anywhere in here; see
`session::SessionStore::login()`.
*/
use time::{format_description::FormatItem, macros::format_description};

pub mod catalog;
pub mod config;
pub mod course;
pub mod guard;
pub mod inter;
pub mod route;
pub mod session;
pub mod storage;
pub mod user;

/// Text form of assignment due dates.
pub const DATE_FMT: &[FormatItem] = format_description!("[year]-[month]-[day]");

pub fn log_level_from_env() -> simplelog::LevelFilter {
    use simplelog::LevelFilter;

    let mut level_string = match std::env::var("LOG_LEVEL") {
        Err(_) => { return LevelFilter::Warn; },
        Ok(s) => s,
    };

    level_string.make_ascii_lowercase();
    match level_string.as_str() {
        "max" => LevelFilter::max(),
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}
