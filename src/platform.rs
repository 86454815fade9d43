//! Platform-specific configuration

/// Submit shortcut display for help text
/// Ctrl+S works on all platforms
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";

/// Client identifier sent with every submission, in place of a browser
/// user agent
pub fn user_agent() -> String {
    format!(
        "{}/{} ({}; {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Time zone of the client
/// - `TZ` when set (usually an IANA name such as `Europe/Berlin`)
/// - otherwise the local UTC offset, e.g. `+02:00`
pub fn time_zone() -> String {
    std::env::var("TZ")
        .ok()
        .map(|tz| tz.trim().trim_start_matches(':').to_string())
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| chrono::Local::now().format("%:z").to_string())
}
