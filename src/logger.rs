//! Terminal logging setup for lunahack

use chrono::Local;
use std::env;

/// Initialize logging.
///
/// Level precedence: explicit override (CLI `--log-level`), then the
/// `LUNAHACK_LOG_LEVEL` environment variable, then "info".
pub fn init(level_override: Option<&str>) {
    let level_str = match level_override {
        Some(level) => level.to_string(),
        None => env::var("LUNAHACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    };

    let level_filter = match level_str.as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    };

    // Custom format with 🌙 prefix so tool output and our own lines
    // are easy to tell apart in a scrolled-back terminal
    env_logger::Builder::new()
        .filter_level(level_filter)
        .format(|buf, record| {
            use std::io::Write;

            write!(buf, "🌙 ")?;
            write!(
                buf,
                "[{} {}] ",
                Local::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
            )?;
            writeln!(buf, "{}", record.args())
        })
        .init();
}
