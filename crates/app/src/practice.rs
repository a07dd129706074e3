//! Line-based practice loop: one question per prompt, one answer per line.

use std::io::{BufRead, Write};

use quiz_core::{Question, QuestionKind, Response};
use services::{Advance, Feedback, QuizLoopService, SessionSummary, SubmitOutcome};

const QUIT: &str = "q";

/// Drive the running session until it completes or input ends.
///
/// Returns `None` only if no session was running.
pub async fn run<R: BufRead, W: Write>(
    svc: &mut QuizLoopService,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Option<SessionSummary>> {
    let mut line = String::new();
    loop {
        let Some(question) = svc.current_question() else {
            return Ok(svc.exit());
        };
        if let Some(progress) = svc.session().progress() {
            writeln!(out, "\n[{}/{}]", progress.position + 1, progress.total)?;
        }
        present(question, out)?;
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 || line.trim() == QUIT {
            writeln!(out)?;
            return Ok(svc.exit());
        }
        let response = to_response(question, &line);

        if let SubmitOutcome::Graded(feedback) = svc.submit(response).await? {
            show_feedback(&feedback, out)?;
        }
        match svc.advance()? {
            Advance::Next(_) => {}
            Advance::Complete(summary) => return Ok(Some(summary)),
        }
    }
}

fn present<W: Write>(question: &Question, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "({}) {}", question.kind().as_str(), question.prompt())?;
    for (index, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}. {option}", Question::option_label(index))?;
    }
    Ok(())
}

fn show_feedback<W: Write>(feedback: &Feedback, out: &mut W) -> std::io::Result<()> {
    if feedback.correct {
        writeln!(out, "Correct!")?;
    } else {
        writeln!(out, "Wrong. Answer: {}", feedback.expected)?;
    }
    writeln!(out, "{}", feedback.explanation)?;
    if feedback.left_mistakes {
        writeln!(out, "Mastered, removed from mistakes.")?;
    }
    if let Some(message) = feedback.encouragement {
        writeln!(out, "{message}")?;
    }
    Ok(())
}

/// Shape a typed line into a response for the question's kind.
pub fn to_response(question: &Question, line: &str) -> Response {
    let input = line.trim();
    match question.kind() {
        QuestionKind::Blank => Response::Text(input.to_owned()),
        QuestionKind::Multiple => Response::Choices(
            input
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        QuestionKind::Single => Response::Choice(single_choice(question, input)),
    }
}

/// A lone option letter is upper-cased, or swapped for the option text when the
/// stored answer is written out in full.
fn single_choice(question: &Question, input: &str) -> String {
    let mut chars = input.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return input.to_owned();
    };
    let letter = letter.to_ascii_uppercase();
    let options = question.options();
    let Some(index) = (0..options.len()).find(|&i| Question::option_label(i) == letter) else {
        return input.to_owned();
    };

    if options.iter().any(|option| option == question.answer()) {
        options[index].clone()
    } else {
        letter.to_string()
    }
}
