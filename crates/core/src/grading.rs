//! Answer grading rules per question kind.

use std::collections::BTreeSet;

use crate::model::{Question, QuestionKind};

const SEPARATORS: &[char] = &[',', ';', '|', '、', '，', '；'];

/// A learner's answer to the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// One selected option (single choice).
    Choice(String),
    /// Every selected option (multiple choice).
    Choices(Vec<String>),
    /// Free text (fill in the blank).
    Text(String),
}

impl Response {
    /// Flatten the response to text, used when the shape does not match the question kind.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Choice(s) | Self::Text(s) => s.clone(),
            Self::Choices(items) => items.join(","),
        }
    }
}

/// Returns whether `response` answers `question` correctly.
///
/// - blank: trimmed, case-insensitive equality
/// - single: trimmed, exact equality
/// - multiple: set equality of chosen options, case-insensitive
#[must_use]
pub fn grade(question: &Question, response: &Response) -> bool {
    match question.kind() {
        QuestionKind::Blank => {
            response.as_text().trim().to_lowercase() == question.answer().trim().to_lowercase()
        }
        QuestionKind::Single => response.as_text().trim() == question.answer().trim(),
        QuestionKind::Multiple => {
            let options = question.options();
            let expected = answer_set(std::iter::once(question.answer()), options);
            let given = match response {
                Response::Choices(items) => answer_set(items.iter().map(String::as_str), options),
                Response::Choice(s) | Response::Text(s) => {
                    answer_set(std::iter::once(s.as_str()), options)
                }
            };
            !expected.is_empty() && expected == given
        }
    }
}

/// Normalize multiple-choice answers into a set of option keys.
///
/// Answers split on punctuation only, so option text keeps its spaces. Each
/// segment that names an option, either by its text or by its letter, becomes
/// that option's letter: with options `[Mars, Jupiter, Venus]`, `"Mars,Venus"`,
/// `"A C"` and `"ac"` all become `{A, C}`. Anything else is kept upper-cased.
fn answer_set<'a>(parts: impl IntoIterator<Item = &'a str>, options: &[String]) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    for segment in parts
        .into_iter()
        .flat_map(|part| part.split(SEPARATORS))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let letters: Vec<char> = segment.chars().filter(|c| !c.is_whitespace()).collect();
        let all_labels = letters.iter().all(|&c| is_label(c, options.len()));

        if letters.len() == 1 && all_labels {
            set.insert(letters[0].to_ascii_uppercase().to_string());
        } else if let Some(index) = option_index(segment, options) {
            set.insert(Question::option_label(index).to_string());
        } else if all_labels {
            set.extend(letters.iter().map(|c| c.to_ascii_uppercase().to_string()));
        } else {
            set.insert(segment.to_uppercase());
        }
    }
    set
}

fn option_index(segment: &str, options: &[String]) -> Option<usize> {
    let wanted = segment.to_lowercase();
    options.iter().position(|o| o.trim().to_lowercase() == wanted)
}

fn is_label(c: char, labels: usize) -> bool {
    c.is_ascii_alphabetic() && usize::from(c.to_ascii_uppercase() as u8 - b'A') < labels
}
