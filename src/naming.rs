use regex::Regex;
use std::sync::LazyLock;

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]").expect("Internal Error: invalid bracket pattern")
});

/// Formats a duration as a coarse tag such as `[42m]` or `[1h5m]`.
///
/// Minutes are rounded up, so a 61 second clip is tagged `[2m]`. Hours are only
/// shown when non-zero, minutes are always shown.
pub fn format_duration_label(secs: f64) -> String {
    let total_minutes = (secs / 60.0).ceil() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("[{hours}h{minutes}m]")
    } else {
        format!("[{minutes}m]")
    }
}

/// Removes every well-formed `[...]` group from a file stem, then trims spaces
/// and underscores from both ends. An unterminated `[` is kept as is.
pub fn sanitize_stem(stem: &str) -> String {
    BRACKETED
        .replace_all(stem, "")
        .trim_matches([' ', '_'])
        .to_string()
}
