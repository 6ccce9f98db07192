//! Loading vocabulary text from plain text, CSV and spreadsheet files

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::error::{QuizError, QuizResult};
use crate::output::DialogOutcome;

/// Column index mapping
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub word: usize,
    pub meaning: usize,
}

/// Detect the word and meaning columns from header names
fn detect_columns(headers: &[String]) -> Result<ColumnMapping, String> {
    let mut word = None;
    let mut meaning = None;

    for (i, header) in headers.iter().enumerate() {
        match header.trim_start_matches('\u{feff}').trim().to_lowercase().as_str() {
            "word" | "words" | "vocabulary" | "단어" => word = word.or(Some(i)),
            "meaning" | "meanings" | "definition" | "definitions" | "sense" | "senses" | "뜻" => {
                meaning = meaning.or(Some(i))
            }
            _ => {}
        }
    }

    match (word, meaning) {
        (Some(word), Some(meaning)) => Ok(ColumnMapping { word, meaning }),
        (None, _) => Err("헤더 행에 'Word' 열이 없습니다".to_string()),
        (_, None) => Err("헤더 행에 'Meaning' 열이 없습니다".to_string()),
    }
}

/// Turn a table row into a `word = meaning` line.
///
/// Line breaks inside the meaning cell become sense separators. A word cell
/// holding `=` or a line break cannot survive the text format, so that row
/// is skipped.
fn row_to_line(row: &[String], mapping: &ColumnMapping) -> Option<String> {
    let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
    let word = cell(mapping.word);
    if word.is_empty() {
        return None;
    }
    if word.contains(&['=', '\r', '\n'][..]) {
        tracing::warn!(word, "skipping row whose word cell contains '=' or a line break");
        return None;
    }

    let meaning = cell(mapping.meaning)
        .split(&['\r', '\n'][..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    Some(format!("{} = {}", word, meaning))
}

fn rows_to_text(
    headers: &[String],
    rows: impl Iterator<Item = Vec<String>>,
    path: &Path,
) -> QuizResult<String> {
    let mapping = detect_columns(headers).map_err(|message| QuizError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    })?;

    let lines: Vec<String> = rows.filter_map(|row| row_to_line(&row, &mapping)).collect();
    Ok(lines.join("\n"))
}

/// Convert a CSV file with a header row into vocabulary lines
pub fn csv_to_vocab_text(path: &Path) -> QuizResult<String> {
    let spreadsheet_err = |e: csv::Error| QuizError::Spreadsheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(spreadsheet_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(spreadsheet_err)?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(spreadsheet_err)?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    rows_to_text(&headers, rows.into_iter(), path)
}

/// Convert the first sheet of a workbook into vocabulary lines
pub fn workbook_to_vocab_text(path: &Path) -> QuizResult<String> {
    let spreadsheet_err = |message: String| QuizError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| spreadsheet_err("통합 문서에 시트가 없습니다".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(get_cell_string).collect::<Vec<_>>());
    let headers = rows
        .next()
        .ok_or_else(|| spreadsheet_err("빈 시트입니다 (헤더 행 없음)".to_string()))?;

    rows_to_text(&headers, rows, path)
}

/// Read vocabulary text from the chosen file, converting tables by extension
pub fn load_vocab_text(path: Option<&Path>) -> QuizResult<DialogOutcome<String>> {
    DialogOutcome::from_selection(path, |path| {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let text = match extension.as_str() {
            "csv" => csv_to_vocab_text(path)?,
            "xlsx" | "xlsm" | "xls" | "ods" => workbook_to_vocab_text(path)?,
            _ => {
                let raw = fs::read_to_string(path).map_err(|e| QuizError::file_io(path, e))?;
                raw.trim_start_matches('\u{feff}').to_string()
            }
        };

        tracing::info!(path = %path.display(), bytes = text.len(), "loaded vocabulary file");
        Ok(text)
    })
}

/// Helper to extract string from spreadsheet cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "load_vocab_text", signature = (path=None))]
pub fn py_load_vocab_text(path: Option<std::path::PathBuf>) -> PyResult<Option<String>> {
    Ok(load_vocab_text(path.as_deref())?.into_option())
}
