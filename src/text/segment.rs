// Question segmentation: carve raw exam-paper text into question units.
//
// Two independent passes run over the same text:
//
//   1. Top-level: a numbered marker at line start ("12.", "3)", "Q4:") opens a
//      question that runs to the next top-level marker or end of text.
//      Lettered sub-parts inside it stay in the body; they are recorded as
//      labels on the question but not split out here.
//   2. Sub-part: every "(a)", "(b)", ... anywhere in the text opens its own
//      unit, running to the next sub-part marker on the same line or the end
//      of that line.
//
// Results are concatenated (all top-level units, then all sub-part units),
// so a sub-part's text usually appears twice: once inside its parent and
// once on its own. Similarity scoring tolerates that noise, and missing a
// question is worse than seeing one twice.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::analysis::models::{Marker, Question};

/// Numbered marker at line start, with an optional "Q"/"Question" prefix and an
/// optional single trailing letter ("3a)"). Group 1 is the label, group 2 the
/// delimiter.
const TOP_LEVEL_PATTERN: &str = r"(?mi)^[ \t]*(?:q(?:uestion)?[ \t]*)?(\d+[a-z]?)([.):]|[ \t])";

/// Single lettered marker in parentheses. Group 1 is the letter.
const SUB_PART_PATTERN: &str = r"(?i)\(([a-z])\)";

static TOP_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOP_LEVEL_PATTERN).expect("top-level pattern compiles"));

static SUB_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SUB_PART_PATTERN).expect("sub-part pattern compiles"));

/// Byte range of one captured unit within the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Where the marker starts
    pub start: usize,
    /// Where the body starts (just past the marker)
    pub body_start: usize,
    /// Exclusive end of the body
    pub end: usize,
    pub marker: Marker,
}

impl Span {
    /// The trimmed body text of this span.
    pub fn body<'t>(&self, text: &'t str) -> &'t str {
        text.get(self.body_start..self.end).unwrap_or("").trim()
    }

    /// Build a question from this span with its body clipped at `limit`.
    ///
    /// Returns `None` when the clipped body is empty. The ordinal is left at
    /// zero; callers number questions once the final order is known.
    pub fn to_question(&self, text: &str, limit: usize, document_id: &str) -> Option<Question> {
        let end = self.end.min(limit);
        let body = text.get(self.body_start..end)?.trim();
        if body.is_empty() {
            return None;
        }

        let sub_parts = match self.marker {
            Marker::Numbered(_) => sub_part_labels(body),
            Marker::Lettered(_) => Vec::new(),
        };

        Some(Question {
            text: body.to_string(),
            document_id: document_id.to_string(),
            ordinal: 0,
            marker: self.marker.clone(),
            sub_parts,
        })
    }
}

/// Run the top-level pass.
pub fn top_level_spans(text: &str) -> Vec<Span> {
    let markers: Vec<(usize, usize, String)> = TOP_LEVEL
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let delimiter = caps.get(2)?;
            // "1.5 kg" at line start is a quantity, not question 1
            if delimiter.as_str() == "."
                && text[whole.end()..].starts_with(|c: char| c.is_ascii_digit())
            {
                return None;
            }
            Some((whole.start(), whole.end(), caps.get(1)?.as_str().to_string()))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, (start, body_start, label))| Span {
            start: *start,
            body_start: *body_start,
            end: markers.get(i + 1).map_or(text.len(), |next| next.0),
            marker: Marker::Numbered(label.clone()),
        })
        .filter(|span| !span.body(text).is_empty())
        .collect()
}

/// Run the sub-part pass.
pub fn sub_part_spans(text: &str) -> Vec<Span> {
    let markers: Vec<(usize, usize, char)> = lettered_markers(text);

    markers
        .iter()
        .enumerate()
        .map(|(i, &(start, body_start, label))| {
            let line_end = text[body_start..]
                .find('\n')
                .map_or(text.len(), |offset| body_start + offset);
            let end = match markers.get(i + 1) {
                Some(&(next_start, _, _)) if next_start < line_end => next_start,
                _ => line_end,
            };
            Span {
                start,
                body_start,
                end,
                marker: Marker::Lettered(label),
            }
        })
        .filter(|span| !span.body(text).is_empty())
        .collect()
}

/// Both passes, concatenated in pass order.
pub fn spans(text: &str) -> Vec<Span> {
    let mut all = top_level_spans(text);
    all.extend(sub_part_spans(text));
    all
}

/// Segment one document's text into ordered questions.
///
/// Never fails: text with no recognizable markers yields an empty list.
pub fn segment(document_id: &str, text: &str) -> Vec<Question> {
    number(
        spans(text)
            .iter()
            .filter_map(|span| span.to_question(text, text.len(), document_id)),
    )
}

/// Assign ordinals by emission order.
pub(crate) fn number(questions: impl IntoIterator<Item = Question>) -> Vec<Question> {
    questions
        .into_iter()
        .enumerate()
        .map(|(ordinal, mut question)| {
            question.ordinal = ordinal;
            question
        })
        .collect()
}

/// Lettered labels embedded in a question body, in order of appearance.
fn sub_part_labels(body: &str) -> Vec<char> {
    lettered_markers(body)
        .into_iter()
        .map(|(_, _, label)| label)
        .collect()
}

fn lettered_markers(text: &str) -> Vec<(usize, usize, char)> {
    SUB_PART
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?.as_str().chars().next()?.to_ascii_lowercase();
            Some((whole.start(), whole.end(), label))
        })
        .collect()
}
