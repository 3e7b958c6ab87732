/// Format fractional seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Milliseconds are truncated, never rounded, and hours do not wrap.
/// Negative input is not supported.
pub fn format_timecode(seconds: f64) -> String {
    // Scaling before truncating keeps values like 1.2 at 1200ms instead of 1199.
    let total_millis = (seconds * 1000.0).floor() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;

    let (minutes, secs) = (total_secs / 60, total_secs % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
