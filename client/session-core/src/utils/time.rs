/// Render a second count as a zero-padded `MM:SS` clock.
/// Minutes are not capped at 60, so 3600 seconds renders as `60:00`.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
