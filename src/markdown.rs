// src/markdown.rs

//! Markdown-lite formatting for chat bubbles.
//!
//! The HealthMed service emphasises terms with `**double asterisks**` and
//! separates paragraphs with literal newlines. Exactly those two forms are
//! interpreted, in that order; everything else is carried verbatim as span
//! content, so remote text can never smuggle styling into the transcript.

use once_cell::sync::Lazy;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// A run of text with a single emphasis state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            bold: false,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            bold: true,
        }
    }
}

/// Applies the `**bold**` substitution to a single line of text.
///
/// The pattern is non-greedy and repeatable; an unpaired `**` has no closing
/// marker and passes through literally.
pub fn format_line(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in BOLD_RE.captures_iter(line) {
        let marked = caps.get(0).unwrap();
        if marked.start() > cursor {
            segments.push(Segment::plain(&line[cursor..marked.start()]));
        }
        let inner = caps.get(1).unwrap().as_str();
        if !inner.is_empty() {
            segments.push(Segment::bold(inner));
        }
        cursor = marked.end();
    }

    if cursor < line.len() {
        segments.push(Segment::plain(&line[cursor..]));
    }

    segments
}

/// Applies both substitutions: bold runs within lines, newlines between them.
pub fn format_text(text: &str) -> Vec<Vec<Segment>> {
    text.split('\n').map(format_line).collect()
}

/// Greedy word wrap over segments, keeping emphasis intact across row
/// boundaries. Whitespace at a break point is swallowed; a single word wider
/// than the pane is hard-broken by character.
pub fn wrap_segments(segments: &[Segment], width: usize) -> Vec<Vec<Segment>> {
    if width == 0 {
        return vec![segments.to_vec()];
    }

    let mut rows: Vec<Vec<Segment>> = Vec::new();
    let mut row: Vec<Segment> = Vec::new();
    let mut row_width = 0usize;

    for segment in segments {
        for chunk in split_chunks(&segment.text) {
            let chunk_width = chunk.width();
            let is_space = chunk.chars().all(char::is_whitespace);

            if row_width + chunk_width > width && row_width > 0 {
                finish_row(&mut rows, &mut row);
                row_width = 0;
                if is_space {
                    continue;
                }
            }

            if chunk_width > width && row_width == 0 {
                let mut piece = String::new();
                let mut piece_width = 0usize;
                for ch in chunk.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if piece_width + ch_width > width && piece_width > 0 {
                        push_chunk(&mut row, &piece, segment.bold);
                        finish_row(&mut rows, &mut row);
                        piece.clear();
                        piece_width = 0;
                    }
                    piece.push(ch);
                    piece_width += ch_width;
                }
                if !piece.is_empty() {
                    push_chunk(&mut row, &piece, segment.bold);
                    row_width = piece_width;
                }
                continue;
            }

            push_chunk(&mut row, chunk, segment.bold);
            row_width += chunk_width;
        }
    }

    if !row.is_empty() {
        finish_row(&mut rows, &mut row);
    }
    if rows.is_empty() {
        rows.push(Vec::new());
    }
    rows
}

/// Renders `text` as styled lines wrapped to `width` columns. Bold runs get
/// `base` plus the BOLD modifier; everything else is `base` as given.
pub fn render_text(text: &str, width: usize, base: Style) -> Vec<Line<'static>> {
    let bold = base.add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    for logical in format_text(text) {
        for segments in wrap_segments(&logical, width) {
            if segments.is_empty() {
                lines.push(Line::from(""));
                continue;
            }
            let spans: Vec<Span<'static>> = segments
                .into_iter()
                .map(|segment| {
                    let style = if segment.bold { bold } else { base };
                    Span::styled(segment.text, style)
                })
                .collect();
            lines.push(Line::from(spans));
        }
    }

    lines
}

fn push_chunk(row: &mut Vec<Segment>, chunk: &str, bold: bool) {
    if let Some(last) = row.last_mut() {
        if last.bold == bold {
            last.text.push_str(chunk);
            return;
        }
    }
    row.push(Segment {
        text: chunk.to_string(),
        bold,
    });
}

fn finish_row(rows: &mut Vec<Vec<Segment>>, row: &mut Vec<Segment>) {
    while let Some(last) = row.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.len() == last.text.len() {
            break;
        }
        if trimmed.is_empty() {
            row.pop();
        } else {
            last.text = trimmed.to_string();
            break;
        }
    }
    rows.push(std::mem::take(row));
}

/// Splits text into alternating whitespace and word runs, preserving both.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                chunks.push(&text[start..idx]);
                start = idx;
                in_space = Some(is_space);
            }
            Some(_) => {}
            None => in_space = Some(is_space),
        }
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
