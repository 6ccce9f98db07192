//! Error types shared by the parser, generator and file helpers

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Coarse error category exposed to the host layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Configuration,
    Transport,
    EmptyResponse,
    FileIo,
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("입력에서 유효한 'word = 뜻' 형식을 찾을 수 없습니다.")]
    NoValidEntries,

    #[error("알 수 없는 문제 유형입니다: {0}")]
    UnknownQuestionType(String),

    #[error("예문 개수는 {min}~{max} 사이여야 합니다 (입력값: {value})")]
    InvalidSentenceCount { value: u32, min: u32, max: u32 },

    #[error("API 클라이언트가 초기화되지 않았습니다. API 키를 확인하세요: {0}")]
    Configuration(String),

    #[error("ChatGPT API 오류: {0}")]
    Transport(String),

    #[error("ChatGPT API 응답 시간 초과 ({}초)", .0.as_secs())]
    Timeout(Duration),

    #[error("API가 빈 텍스트를 반환했습니다")]
    EmptyResponse,

    #[error("파일 입출력 오류 ({}): {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("표 파일 읽기 오류 ({}): {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },
}

impl QuizError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::NoValidEntries
            | QuizError::UnknownQuestionType(_)
            | QuizError::InvalidSentenceCount { .. } => ErrorKind::Input,
            QuizError::Configuration(_) => ErrorKind::Configuration,
            QuizError::Transport(_) | QuizError::Timeout(_) => ErrorKind::Transport,
            QuizError::EmptyResponse => ErrorKind::EmptyResponse,
            QuizError::FileIo { .. } | QuizError::Spreadsheet { .. } => ErrorKind::FileIo,
        }
    }

    pub(crate) fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuizError::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type QuizResult<T> = Result<T, QuizError>;

// ============= Python Binding =============

#[cfg(feature = "python")]
impl From<QuizError> for pyo3::PyErr {
    fn from(err: QuizError) -> Self {
        use pyo3::exceptions::{PyOSError, PyRuntimeError, PyTimeoutError, PyValueError};

        let message = err.to_string();
        match (&err, err.kind()) {
            (QuizError::Timeout(_), _) => PyTimeoutError::new_err(message),
            (_, ErrorKind::Input) => PyValueError::new_err(message),
            (_, ErrorKind::FileIo) => PyOSError::new_err(message),
            _ => PyRuntimeError::new_err(message),
        }
    }
}
