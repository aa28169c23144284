use crate::types::{RunReport, format_start};

pub const SUMMARY_HEADER: &str = "          started          -    cmd    - elapsed";

/// Summary lines for a finished run: a blank line, the header, then one line
/// per command. Empty when nothing ran.
pub fn format_summary(report: &RunReport) -> Vec<String> {
    if report.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(report.len() + 2);
    lines.push(String::new());
    lines.push(SUMMARY_HEADER.to_string());
    for (command, result) in report.iter() {
        lines.push(format!(
            "{} - {} - {} seconds",
            format_start(result.start),
            command,
            result.elapsed
        ));
    }
    lines
}
