//! Question sheet importer.
//!
//! Reads CSV exported from the question spreadsheet. Columns are positional:
//! type, prompt, option A, option B, option C, option D, answer, explanation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use quiz_core::{Question, QuestionDraft, QuestionError, QuestionId, QuestionKind};
use tracing::{debug, info};

use crate::error::ImportError;

const COL_TYPE: usize = 0;
const COL_PROMPT: usize = 1;
const COL_OPTIONS: std::ops::Range<usize> = 2..6;
const COL_ANSWER: usize = 6;
const COL_EXPLANATION: usize = 7;

/// Rows with fewer populated cells than this are treated as blank.
const MIN_POPULATED_CELLS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line in the source file.
    pub line: u64,
    pub reason: QuestionError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Validated questions ready for `QuestionStore::replace_questions`, plus what was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    pub questions: Vec<Question>,
    pub report: ImportReport,
}

pub struct QuestionImporter;

impl QuestionImporter {
    /// Parse a sheet from any reader. The first row is a header and is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` if the input is not readable CSV (for example
    /// invalid UTF-8), and `ImportError::NoQuestions` if no row survives validation.
    pub fn parse_reader<R: Read>(reader: R) -> Result<ParsedSheet, ImportError> {
        let mut rows = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut questions = Vec::new();
        let mut report = ImportReport::default();

        for record in rows.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);

            if populated_cells(&record) < MIN_POPULATED_CELLS {
                debug!(line, "skipping blank row");
                continue;
            }

            match row_to_draft(&record).validate() {
                Ok(question) => questions.push(question),
                Err(reason) => {
                    debug!(line, %reason, "skipping invalid row");
                    report.skipped.push(SkippedRow { line, reason });
                }
            }
        }

        if questions.is_empty() {
            return Err(ImportError::NoQuestions);
        }

        report.imported = questions.len();
        info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            "parsed question sheet"
        );
        Ok(ParsedSheet { questions, report })
    }

    /// Parse a sheet from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Io` if the file cannot be opened, otherwise as
    /// `parse_reader`.
    pub fn parse_path(path: &Path) -> Result<ParsedSheet, ImportError> {
        let file = File::open(path)?;
        Self::parse_reader(file)
    }
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn populated_cells(record: &StringRecord) -> usize {
    record.iter().filter(|c| !c.trim().is_empty()).count()
}

fn row_to_draft(record: &StringRecord) -> QuestionDraft {
    let explanation = cell(record, COL_EXPLANATION);
    QuestionDraft {
        id: QuestionId::generate(),
        kind: QuestionKind::from_type_label(cell(record, COL_TYPE)),
        prompt: cell(record, COL_PROMPT).to_owned(),
        options: COL_OPTIONS.map(|i| cell(record, i).to_owned()).collect(),
        answer: cell(record, COL_ANSWER).to_owned(),
        explanation: (!explanation.is_empty()).then(|| explanation.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::DEFAULT_EXPLANATION;

    const HEADER: &str = "type,prompt,A,B,C,D,answer,explanation\n";

    fn parse(body: &str) -> Result<ParsedSheet, ImportError> {
        QuestionImporter::parse_reader(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn maps_columns_and_kinds() {
        let sheet = parse(
            "单选,Largest planet?,Mars,Jupiter,Venus,Earth,B,Gas giant\n\
             多选,Primes?,2,4,5,9,\"A,C\",\n\
             填空,Rust's package manager,,,,,cargo,\n",
        )
        .unwrap();

        assert_eq!(sheet.report.imported, 3);
        assert!(sheet.report.skipped.is_empty());

        let single = &sheet.questions[0];
        assert_eq!(single.kind(), QuestionKind::Single);
        assert_eq!(single.prompt(), "Largest planet?");
        assert_eq!(single.options(), ["Mars", "Jupiter", "Venus", "Earth"]);
        assert_eq!(single.answer(), "B");
        assert_eq!(single.explanation(), "Gas giant");

        assert_eq!(sheet.questions[1].kind(), QuestionKind::Multiple);
        assert_eq!(sheet.questions[1].answer(), "A,C");
        assert_eq!(sheet.questions[1].explanation(), DEFAULT_EXPLANATION);
        assert_eq!(sheet.questions[2].kind(), QuestionKind::Blank);
        assert!(sheet.questions[2].options().is_empty());
    }

    #[test]
    fn skips_sparse_rows_silently_and_reports_invalid_rows() {
        let sheet = parse(
            ",Only prompt\n\
             ,,,,,,,\n\
             single,No answer,a,b,,,,\n\
             single,Good,a,b,,,A,\n\
             single,Also good,a,b,,,B,\n",
        )
        .unwrap();

        assert_eq!(sheet.report.imported, 2);
        assert_eq!(sheet.questions.len(), 2);
        assert_eq!(sheet.report.skipped.len(), 1);
        assert_eq!(sheet.report.skipped[0].reason, QuestionError::EmptyAnswer);
        assert_eq!(sheet.report.skipped[0].line, 4);
    }

    #[test]
    fn rows_need_two_populated_cells() {
        let err = parse("single\n").unwrap_err();
        assert!(matches!(err, ImportError::NoQuestions));
    }

    #[test]
    fn assigns_distinct_ids() {
        let sheet = parse("single,Q1,a,b,,,A,\nsingle,Q2,a,b,,,B,\n").unwrap();
        assert_ne!(sheet.questions[0].id(), sheet.questions[1].id());
    }

    #[test]
    fn unreadable_input_is_a_parse_error() {
        let bytes: &[u8] = b"type,prompt\nsingle,\xff\xfe,a,b,,,A,\n";
        let err = QuestionImporter::parse_reader(bytes).unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }
}
