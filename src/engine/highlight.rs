//! Span-annotated rendering of matched field text.
//!
//! [`annotate`] is a pure function: the same text and spans always give the
//! same segments, and concatenating the segment texts gives back the input.

use serde::Serialize;

use crate::models::{FieldRef, MatchResult, Span};

/// A run of text that is either plain or highlighted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: false,
        }
    }

    fn highlighted(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: true,
        }
    }
}

/// Split `text` into plain and highlighted segments
///
/// Spans are character offsets, `end` exclusive. They are re-sorted, clamped
/// to the text, and overlapping or touching spans are merged, so no two
/// highlighted segments are ever adjacent.
pub fn annotate(text: &str, spans: &[Span]) -> Vec<Segment> {
    let merged = merge_spans(spans, text.chars().count());
    if merged.is_empty() {
        return vec![Segment::plain(text)];
    }

    // Byte offset of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let slice = |start: usize, end: usize| &text[bounds[start]..bounds[end]];

    let mut segments = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = 0;

    for span in &merged {
        if span.start > cursor {
            segments.push(Segment::plain(slice(cursor, span.start)));
        }
        segments.push(Segment::highlighted(slice(span.start, span.end)));
        cursor = span.end;
    }

    let char_count = bounds.len() - 1;
    if cursor < char_count {
        segments.push(Segment::plain(slice(cursor, char_count)));
    }

    segments
}

/// Annotate one field of a match result against the record's original text
///
/// Returns `None` if the record has no such field.
pub fn annotate_result(result: &MatchResult, field: FieldRef) -> Option<Vec<Segment>> {
    let text = field.text(&result.record)?;
    Some(annotate(text, result.matched_spans.spans_for(&field)))
}

/// Render segments as escaped HTML, wrapping highlights in `<mark class="highlight">`
pub fn to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        if segment.highlighted {
            html.push_str("<mark class=\"highlight\">");
            escape_into(&mut html, &segment.text);
            html.push_str("</mark>");
        } else {
            escape_into(&mut html, &segment.text);
        }
    }
    html
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Clamp to `len`, drop empty spans, sort, and coalesce overlaps and touches
fn merge_spans(spans: &[Span], len: usize) -> Vec<Span> {
    let mut sorted: Vec<Span> = spans
        .iter()
        .map(|s| Span::new(s.start.min(len), s.end.min(len)))
        .filter(|s| !s.is_empty())
        .collect();
    sorted.sort();

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}
