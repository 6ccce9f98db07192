//! VocaGen Core - vocabulary lists into LLM-authored multiple-choice quizzes
//!
//! Parses `word = meaning` blocks, builds the system/user prompts for the
//! requested question style, and sends them to a chat-completion model.

mod config;
mod error;
mod generator;
mod import;
mod llm;
mod output;
mod questions;
mod vocab;

#[cfg(feature = "python")]
use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

pub use config::{default_key_path, load_api_key, ClientSettings, API_KEY_FILE, DEFAULT_TIMEOUT};
pub use error::{ErrorKind, QuizError, QuizResult};
pub use generator::QuizGenerator;
pub use import::{csv_to_vocab_text, load_vocab_text, workbook_to_vocab_text};
pub use llm::{OpenAiClient, TextGenerator};
pub use output::{save_result_text, suggested_filename, DialogOutcome};
pub use questions::{
    build_prompts, build_user_prompt, check_sentence_count, GenerationRequest, PromptPair,
    QuestionTemplate, QuestionType, MAX_SENTENCE_COUNT,
};
pub use vocab::{parse_vocab_block, parse_vocab_report, shuffle_pairs, ParseReport, VocabPair};

/// Install a `RUST_LOG`-driven fmt subscriber; later calls are no-ops
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// VocaGen Core Python Module
#[cfg(feature = "python")]
#[pymodule]
fn vocagen_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    init_logging();

    // Vocabulary parsing and prompts
    m.add_function(wrap_pyfunction!(vocab::py_parse_vocab, m)?)?;
    m.add_function(wrap_pyfunction!(questions::py_preview_prompts, m)?)?;

    // Generation
    m.add_function(wrap_pyfunction!(generator::py_generate_questions, m)?)?;

    // File load / save
    m.add_function(wrap_pyfunction!(import::py_load_vocab_text, m)?)?;
    m.add_function(wrap_pyfunction!(output::py_save_result_text, m)?)?;
    m.add_function(wrap_pyfunction!(output::py_suggested_filename, m)?)?;

    m.add_class::<vocab::VocabPair>()?;

    Ok(())
}
