//! Terminal rendering for the catalog CLI.
//!
//! Every function returns the text to print, so the caller decides where it
//! goes and whether colors are on.

use comfy_table::{Attribute, Cell, Table};
use owo_colors::OwoColorize;

use crate::engine::highlight::{annotate, Segment};
use crate::engine::insights::CorpusStats;
use crate::engine::{Corpus, FilterSet};
use crate::models::{FieldRef, MatchResult, Record, ResultSet};
use crate::utils::{
    format_score, result_table_columns, truncate_at_word, truncate_with_ellipsis,
};

/// Shown instead of results when the catalog has no articles at all
pub const NO_DATA_MESSAGE: &str = "No articles are available. Check the data file path.";

/// Status icons for different operations
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Status types for colored output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// One line prefixed with a status icon
pub fn status_line(status: Status, msg: &str, color: bool) -> String {
    let icon = status_icon(status);
    if !color {
        return format!("{} {}", icon, msg);
    }
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), msg),
        Status::Error => format!("{} {}", icon.red().bold(), msg),
        Status::Warning => format!("{} {}", icon.yellow().bold(), msg),
        Status::Info => format!("{} {}", icon.cyan().bold(), msg),
        Status::Search => format!("{} {}", icon.yellow(), msg),
    }
}

/// A section header
pub fn section(title: &str, color: bool) -> String {
    let header = format!("━━━ {} ━━━", title);
    if color {
        header.bold().cyan().to_string()
    } else {
        header
    }
}

/// Join segments, marking highlights with reverse video or `[...]` without color
pub fn paint_segments(segments: &[Segment], color: bool) -> String {
    let mut out = String::new();
    for segment in segments {
        match (segment.highlighted, color) {
            (false, _) => out.push_str(&segment.text),
            (true, true) => out.push_str(&segment.text.black().on_yellow().to_string()),
            (true, false) => {
                out.push('[');
                out.push_str(&segment.text);
                out.push(']');
            }
        }
    }
    out
}

/// Clip segments to about `max_chars` characters around the first highlight
///
/// Clipped ends are marked with a plain `...` segment.
pub fn excerpt(segments: &[Segment], max_chars: usize) -> Vec<Segment> {
    let lengths: Vec<usize> = segments.iter().map(|s| s.text.chars().count()).collect();
    let total: usize = lengths.iter().sum();
    if total <= max_chars {
        return segments.to_vec();
    }

    let first_hit: usize = segments
        .iter()
        .zip(&lengths)
        .take_while(|(s, _)| !s.highlighted)
        .map(|(_, len)| *len)
        .sum();
    let first_hit = first_hit.min(total);

    let end = (first_hit.saturating_sub(max_chars / 4) + max_chars).min(total);
    let start = end.saturating_sub(max_chars);

    let mut clipped = Vec::new();
    if start > 0 {
        clipped.push(plain("..."));
    }

    let mut offset = 0;
    for (segment, len) in segments.iter().zip(&lengths) {
        let (from, to) = (offset.max(start), (offset + len).min(end));
        if from < to {
            clipped.push(Segment {
                text: segment.text.chars().skip(from - offset).take(to - from).collect(),
                highlighted: segment.highlighted,
            });
        }
        offset += len;
    }

    if end < total {
        clipped.push(plain("..."));
    }
    clipped
}

fn plain(text: &str) -> Segment {
    Segment {
        text: text.to_string(),
        highlighted: false,
    }
}

/// Headline for a result set
pub fn results_summary(results: &ResultSet) -> String {
    if results.no_data {
        return NO_DATA_MESSAGE.to_string();
    }
    let query = results.query.trim();
    match (results.len(), query.is_empty()) {
        (0, true) => "No articles match the selected filters.".to_string(),
        (0, false) => format!("No articles match \"{}\".", query),
        (1, true) => "1 article".to_string(),
        (n, true) => format!("{} articles", n),
        (1, false) => format!("1 article matches \"{}\"", query),
        (n, false) => format!("{} articles match \"{}\"", n, query),
    }
}

fn year_cell(record: &Record) -> String {
    record.year.map(|y| y.to_string()).unwrap_or_default()
}

/// Results as a table sized to `terminal_width`
pub fn format_results_table(results: &ResultSet, terminal_width: usize) -> String {
    let (title_width, authors_width) = result_table_columns(terminal_width);
    let scored = !results.query.trim().is_empty();

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    let mut header = vec!["#", "Title", "Authors", "Issue", "Year"];
    if scored {
        header.push("Score");
    }
    table.set_header(header);

    for (rank, result) in results.iter().enumerate() {
        let record = &result.record;
        let mut row = vec![
            Cell::new(rank + 1),
            Cell::new(truncate_at_word(&record.title, title_width)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&record.author_line(), authors_width)),
            Cell::new(record.volume_label().unwrap_or_default()),
            Cell::new(year_cell(record)),
        ];
        if scored {
            row.push(Cell::new(format_score(result.score)));
        }
        table.add_row(row);
    }

    table.to_string()
}

/// Results as one block per record, optionally showing the matched text
pub fn format_results_cards(
    results: &ResultSet,
    terminal_width: usize,
    highlight: bool,
    color: bool,
) -> String {
    let scored = !results.query.trim().is_empty();
    let excerpt_width = terminal_width.saturating_sub(16).max(40);
    let mut out = String::new();

    for (rank, result) in results.iter().enumerate() {
        let record = &result.record;
        let title = if highlight {
            paint_field(result, FieldRef::title(), usize::MAX, color)
        } else if color {
            record.title.bold().to_string()
        } else {
            record.title.clone()
        };

        out.push_str(&format!("{}. {}", rank + 1, title));
        if scored {
            out.push_str(&format!("  ({})", format_score(result.score)));
        }
        out.push('\n');
        out.push_str(&format!("   {}\n", record.author_line()));

        let meta: Vec<String> = [
            record.volume_label(),
            record.year.map(|y| y.to_string()),
            record.has_pdf().then(|| "PDF".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !meta.is_empty() {
            out.push_str(&format!("   {}\n", meta.join(" · ")));
        }

        if highlight {
            for (field, _) in result.matched_spans.iter() {
                if *field == FieldRef::title() {
                    continue;
                }
                let painted = paint_field(result, *field, excerpt_width, color);
                out.push_str(&format!("   {}: {}\n", field, painted));
            }
        } else {
            if scored {
                let fields: Vec<&str> =
                    result.matched_spans.fields().iter().map(|f| f.name()).collect();
                out.push_str(&format!("   matched in {}\n", fields.join(", ")));
            }
            if !record.keywords.is_empty() {
                let shown: Vec<&str> =
                    record.keywords.iter().take(3).map(String::as_str).collect();
                out.push_str(&format!("   {}\n", shown.join(", ")));
            }
        }
        out.push('\n');
    }

    out
}

fn paint_field(result: &MatchResult, field: FieldRef, max_chars: usize, color: bool) -> String {
    let Some(text) = field.text(&result.record) else {
        return String::new();
    };
    let segments = annotate(text, result.matched_spans.spans_for(&field));
    paint_segments(&excerpt(&segments, max_chars), color)
}

/// Full detail view of one record
pub fn format_record(record: &Record, color: bool) -> String {
    let mut out = String::new();
    let title = if color {
        record.title.bold().blue().to_string()
    } else {
        record.title.clone()
    };
    out.push_str(&format!("{}\n", title));

    let mut line = |label: &str, value: &str| {
        if value.is_empty() {
            return;
        }
        let label = format!("{:<10}", format!("{}:", label));
        if color {
            out.push_str(&format!("  {} {}\n", label.dimmed(), value));
        } else {
            out.push_str(&format!("  {} {}\n", label, value));
        }
    };

    line("ID", &record.id);
    line("Authors", &record.author_line());
    line("Issue", &record.volume_label().unwrap_or_default());
    line("Year", &year_cell(record));
    line("Keywords", &record.keywords.join(", "));
    line("PDF", record.pdf_url.as_deref().unwrap_or_default());
    line("URL", record.article_url.as_deref().unwrap_or_default());

    if !record.abstract_text().is_empty() {
        out.push('\n');
        out.push_str(record.abstract_text());
        out.push('\n');
    }
    out
}

/// Selectable values for every declared filter key
pub fn format_filter_options(filters: &FilterSet, corpus: &Corpus, color: bool) -> String {
    let mut out = String::new();
    for key in filters.keys() {
        out.push_str(&section(key.name(), color));
        out.push('\n');

        let options = filters.options(key, corpus);
        if options.is_empty() {
            out.push_str("  (none)\n");
            continue;
        }
        for value in options {
            let selected = filters.get(key) == Some(value);
            let marker = if selected { "●" } else { "○" };
            out.push_str(&format!("  {} {:<12} {}\n", marker, value, key.label(value)));
        }
    }
    out
}

/// Catalog statistics
pub fn format_stats(stats: &CorpusStats, color: bool) -> String {
    let rows = [
        ("Articles", stats.articles.to_string()),
        ("Years covered", stats.year_span.to_string()),
        ("Topics", stats.topics.to_string()),
    ];
    rows.iter()
        .map(|(label, value)| {
            let value = if color {
                value.green().bold().to_string()
            } else {
                value.clone()
            };
            format!("{:<14} {}\n", label, value)
        })
        .collect()
}

/// Keyword counts, most frequent first
pub fn format_topics(topics: &[(String, usize)]) -> String {
    let width = topics
        .iter()
        .map(|(k, _)| k.chars().count())
        .max()
        .unwrap_or(0);
    topics
        .iter()
        .map(|(keyword, count)| format!("{:<width$}  {}\n", keyword, count, width = width))
        .collect()
}
