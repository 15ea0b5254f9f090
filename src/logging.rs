use log::LevelFilter;

/// Initialize logging for the command-line tool.
///
/// Logs at `Info` by default or `Debug` if `debug_enabled` is set. An explicit `RUST_LOG`
/// overrides both.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    // A second initialization (e.g. from a test harness) is harmless, so ignore the error.
    let _ = builder.try_init();
    log::debug!("Logger initialized at {level:?} level");
}
