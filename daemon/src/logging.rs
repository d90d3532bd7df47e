use log::LevelFilter;

/// Initialize structured, timestamped logging to stderr at `level`. The
/// `RUST_LOG` environment variable, when set, still takes precedence, per
/// `env_logger`'s usual convention.
pub fn init(level: &str) {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}
