//! Saving generated quiz text

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone};
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::error::{QuizError, QuizResult};
use crate::questions::QuestionType;

/// Result of an operation that starts from a user file dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> DialogOutcome<T> {
    /// `None` when the user cancelled the dialog
    pub fn from_selection<P>(
        selection: Option<P>,
        run: impl FnOnce(P) -> QuizResult<T>,
    ) -> QuizResult<Self> {
        match selection {
            Some(path) => run(path).map(DialogOutcome::Completed),
            None => {
                tracing::debug!("file dialog cancelled");
                Ok(DialogOutcome::Cancelled)
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DialogOutcome::Cancelled)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            DialogOutcome::Completed(value) => Some(value),
            DialogOutcome::Cancelled => None,
        }
    }
}

/// Write the quiz text to the chosen path and return a confirmation message
pub fn save_result_text(text: &str, path: Option<&Path>) -> QuizResult<DialogOutcome<String>> {
    DialogOutcome::from_selection(path, |path| {
        fs::write(path, text).map_err(|e| QuizError::file_io(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!(path = %path.display(), bytes = text.len(), "saved quiz text");
        Ok(format!("저장 완료: {}", name))
    })
}

/// Default file name offered by the save dialog
pub fn suggested_filename<Tz: TimeZone>(question_type: QuestionType, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("quiz_{}_{}.txt", question_type.id(), at.format("%Y%m%d_%H%M%S"))
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "save_result_text", signature = (text, path=None))]
pub fn py_save_result_text(
    text: &str,
    path: Option<std::path::PathBuf>,
) -> PyResult<Option<String>> {
    Ok(save_result_text(text, path.as_deref())?.into_option())
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "suggested_filename")]
pub fn py_suggested_filename(question_type: &str) -> PyResult<String> {
    let question_type: QuestionType = question_type.parse()?;
    Ok(suggested_filename(question_type, &chrono::Local::now()))
}
