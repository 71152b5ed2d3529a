//! Terminal display utilities for CLI output formatting.
//!
//! Handles different screen sizes and wide Unicode text so tables and
//! excerpts never overflow the terminal.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal information with cached size and capabilities
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Default width when terminal size cannot be determined
pub const DEFAULT_WIDTH: usize = 100;

/// Get the global terminal information, initialized on first call
pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| Terminal {
        width: terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH),
        is_tty: io::stdout().is_terminal(),
    })
}

/// Get the current terminal width in characters
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

/// Columns `text` occupies on screen
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Truncate text to fit within `max_width` columns, appending `...` if cut
///
/// # Examples
///
/// ```
/// use multinetics_search::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }

    format!("{}...", fitting_prefix(text, max_width.saturating_sub(3)))
}

/// Truncate at the last word boundary that fits, falling back to a hard cut
pub fn truncate_at_word(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let kept = fitting_prefix(text, max_width.saturating_sub(3));
    let at_boundary = text[kept.len()..].starts_with(char::is_whitespace);
    let cut = match kept.rfind(' ') {
        _ if at_boundary => kept,
        Some(space) => &kept[..space],
        None => kept,
    };

    let cut = cut.trim_end();
    if cut.is_empty() {
        return truncate_with_ellipsis(text, max_width);
    }
    format!("{}...", cut)
}

/// Longest prefix of `text` at most `budget` columns wide
fn fitting_prefix(text: &str, budget: usize) -> &str {
    let mut used = 0;
    for (byte, c) in text.char_indices() {
        used += char_width(c);
        if used > budget {
            return &text[..byte];
        }
    }
    text
}

/// Column width configuration for table display
#[derive(Debug, Clone, Copy)]
pub struct ColumnConfig {
    pub min_width: usize,
    pub max_width: usize,
    pub weight: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            min_width: 1,
            max_width: usize::MAX,
            weight: 1,
        }
    }
}

impl ColumnConfig {
    /// Create a new column config with minimum width
    pub fn new(min_width: usize) -> Self {
        ColumnConfig {
            min_width,
            ..Default::default()
        }
    }

    /// Set the maximum width
    pub fn max(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set the weight for space distribution
    pub fn weight(mut self, weight: usize) -> Self {
        self.weight = weight;
        self
    }
}

/// Calculate column widths from a list of column configurations
///
/// Every column gets its minimum; leftover space is shared by weight, never
/// past a column's maximum.
pub fn calculate_dynamic_column_widths(
    terminal_width: usize,
    configs: &[ColumnConfig],
) -> Vec<usize> {
    let mut widths: Vec<usize> = configs.iter().map(|c| c.min_width).collect();
    if configs.is_empty() {
        return widths;
    }

    // One separator between neighbouring columns.
    let available = terminal_width.saturating_sub(configs.len() - 1);
    let min_sum: usize = widths.iter().sum();
    if min_sum >= available {
        return widths;
    }

    let mut remaining = available - min_sum;
    // Repeat while capped columns leave space for the others.
    loop {
        let open: Vec<usize> = (0..configs.len())
            .filter(|&i| configs[i].weight > 0 && widths[i] < configs[i].max_width)
            .collect();
        let total_weight: usize = open.iter().map(|&i| configs[i].weight).sum();
        if remaining == 0 || total_weight == 0 {
            break;
        }

        let mut given = 0;
        for &i in &open {
            let share = (remaining * configs[i].weight / total_weight).max(1);
            let room = configs[i].max_width.saturating_sub(widths[i]);
            let take = share.min(room).min(remaining - given);
            widths[i] += take;
            given += take;
        }
        if given == 0 {
            break;
        }
        remaining -= given;
    }

    widths
}

/// Widths for the title and authors columns of the results table
///
/// The remaining fixed columns (rank, volume, year, score) take about 30
/// columns including borders.
pub fn result_table_columns(terminal_width: usize) -> (usize, usize) {
    let configs = [
        ColumnConfig::new(24).max(90).weight(3),
        ColumnConfig::new(14).max(40).weight(1),
    ];
    let widths = calculate_dynamic_column_widths(terminal_width.saturating_sub(30), &configs);
    (widths[0], widths[1])
}

/// Relevance score as shown to users
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis_basic() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_with_ellipsis_empty() {
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 0), "");
        assert_eq!(truncate_with_ellipsis("Hello", 1), "...");
    }

    #[test]
    fn test_truncate_wide_characters() {
        // Each CJK character takes two columns.
        let cut = truncate_with_ellipsis("网络安全研究", 7);
        assert_eq!(cut, "网络...");
        assert!(display_width(&cut) <= 7);
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("The quick brown fox", 12), "The quick...");
        assert_eq!(truncate_at_word("Short", 12), "Short");
        assert_eq!(truncate_at_word("Unbreakableword", 8), "Unbre...");
    }

    #[test]
    fn test_truncate_at_word_multibyte() {
        let cut = truncate_at_word("Réseaux neuronaux profonds", 16);
        assert_eq!(cut, "Réseaux...");
    }

    #[test]
    fn test_dynamic_widths_respect_limits() {
        let configs = [
            ColumnConfig::new(10).max(20).weight(1),
            ColumnConfig::new(10).weight(1),
        ];
        let widths = calculate_dynamic_column_widths(100, &configs);
        assert_eq!(widths[0], 20);
        assert_eq!(widths.iter().sum::<usize>(), 99);
    }

    #[test]
    fn test_dynamic_widths_min_exceeded() {
        let configs = [ColumnConfig::new(30), ColumnConfig::new(30)];
        assert_eq!(calculate_dynamic_column_widths(50, &configs), vec![30, 30]);
        assert!(calculate_dynamic_column_widths(50, &[]).is_empty());
    }

    #[test]
    fn test_result_table_columns() {
        let (title, authors) = result_table_columns(120);
        assert!(title > authors);
        assert!(title + authors + 30 <= 120);

        let (title, authors) = result_table_columns(20);
        assert_eq!((title, authors), (24, 14));
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.4), "0.40");
        assert_eq!(format_score(0.0), "0.00");
    }
}
