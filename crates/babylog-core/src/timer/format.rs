//! Display helpers for elapsed durations.
//!
//! Pure transforms; nothing here feeds back into the engine.

/// `MM:SS`. Minutes are not wrapped, so 75 minutes renders as `75:03`.
pub fn format_clock(ms: u64) -> String {
    let total = ms / 1000;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// `H:MM:SS`, for activities that routinely exceed an hour.
pub fn format_long(ms: u64) -> String {
    let total = ms / 1000;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// `H:MM`, the summary form used for saved sleep records.
pub fn format_hours_minutes(ms: u64) -> String {
    let total = ms / 1000;
    format!("{}:{:02}", total / 3600, (total % 3600) / 60)
}
