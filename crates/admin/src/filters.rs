//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Longest preview shown in list tables.
const PREVIEW_CHARS: usize = 80;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// First line of a long text, cut to fit a table cell.
///
/// Usage in templates: `{{ message.message|preview }}`
#[askama::filter_fn]
pub fn preview(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(preview_text(&value.to_string()))
}

fn preview_text(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or_default().trim();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut.trim_end())
    } else {
        line.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_first_line() {
        assert_eq!(preview_text("\n  Need a quote  \nfor 14 RMUs"), "Need a quote");
    }

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(100);
        let out = preview_text(&long);
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 1);
        assert!(out.ends_with('…'));
    }
}
