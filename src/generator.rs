//! Quiz generation: parse, shuffle, build prompts, ask the model

use std::path::Path;

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::Rng;

use crate::config::{self, ClientSettings};
use crate::error::{QuizError, QuizResult};
use crate::llm::{OpenAiClient, TextGenerator};
use crate::questions::{GenerationRequest, QuestionType};
use crate::vocab::{parse_vocab_report, shuffle_pairs};

type Backend = Box<dyn TextGenerator + Send + Sync>;

/// Entry point for turning a vocabulary block into quiz text
pub struct QuizGenerator {
    backend: Result<Backend, String>,
}

impl QuizGenerator {
    pub fn new(backend: impl TextGenerator + Send + Sync + 'static) -> Self {
        Self {
            backend: Ok(Box::new(backend)),
        }
    }

    /// A generator whose every call fails with a configuration error
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Err(reason.into()),
        }
    }

    /// Build from an `api.json` key file; a missing key is logged, not fatal
    pub fn from_key_file(path: &Path, settings: ClientSettings) -> Self {
        let client = config::load_api_key(path).and_then(|key| OpenAiClient::new(key, settings));
        match client {
            Ok(client) => Self::new(client),
            Err(e) => {
                tracing::error!("API key unavailable, check {}: {}", config::API_KEY_FILE, e);
                Self::unconfigured(e.to_string())
            }
        }
    }

    /// Build from the default key location with default settings
    pub fn from_default_config() -> Self {
        Self::from_key_file(&config::default_key_path(), ClientSettings::default())
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_ok()
    }

    /// Generate quiz text with a freshly seeded shuffle
    pub fn generate(
        &self,
        vocab_text: &str,
        model: &str,
        question_type: QuestionType,
        sentence_count: u32,
    ) -> QuizResult<String> {
        let mut rng = rand::thread_rng();
        self.generate_with_rng(vocab_text, model, question_type, sentence_count, &mut rng)
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        vocab_text: &str,
        model: &str,
        question_type: QuestionType,
        sentence_count: u32,
        rng: &mut R,
    ) -> QuizResult<String> {
        let backend = self
            .backend
            .as_ref()
            .map_err(|reason| QuizError::Configuration(reason.clone()))?;

        let report = parse_vocab_report(vocab_text);
        if report.pairs.is_empty() {
            return Err(QuizError::NoValidEntries);
        }
        if !report.skipped_lines.is_empty() {
            tracing::warn!(
                skipped = report.skipped_lines.len(),
                lines = ?report.skipped_lines,
                "ignored malformed vocabulary lines"
            );
        }

        let mut pairs = report.pairs;
        shuffle_pairs(&mut pairs, rng);

        let request = GenerationRequest {
            pairs,
            question_type,
            sentence_count,
            model: model.to_string(),
        };

        tracing::info!(
            model,
            question_type = %question_type,
            words = request.pairs.len(),
            "generating questions"
        );

        let prompts = request.prompts();
        backend
            .generate_text(&request.model, &prompts.system, &prompts.user)
            .inspect_err(|e| tracing::warn!("question generation failed: {}", e))
    }
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(
    name = "generate_questions",
    signature = (vocab_text, model_id, question_type, sentence_count, api_key_path=None)
)]
pub fn py_generate_questions(
    py: Python<'_>,
    vocab_text: String,
    model_id: String,
    question_type: &str,
    sentence_count: u32,
    api_key_path: Option<std::path::PathBuf>,
) -> PyResult<String> {
    let question_type: QuestionType = question_type.parse()?;
    let sentence_count = crate::questions::check_sentence_count(sentence_count)?;
    let key_path = api_key_path.unwrap_or_else(config::default_key_path);

    let result = py.allow_threads(move || {
        QuizGenerator::from_key_file(&key_path, ClientSettings::default()).generate(
            &vocab_text,
            &model_id,
            question_type,
            sentence_count,
        )
    });
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::questions::build_prompts;
    use crate::vocab::parse_vocab_block;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        model: String,
        system: String,
        user: String,
    }

    /// Records every call and replies with a canned result
    #[derive(Clone)]
    struct FakeBackend {
        calls: Arc<Mutex<Vec<Call>>>,
        reply: Result<String, fn() -> QuizError>,
    }

    impl FakeBackend {
        fn replying(text: &str) -> Self {
            Self {
                calls: Arc::default(),
                reply: Ok(text.to_string()),
            }
        }

        fn failing(make: fn() -> QuizError) -> Self {
            Self {
                calls: Arc::default(),
                reply: Err(make),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TextGenerator for FakeBackend {
        fn generate_text(
            &self,
            model: &str,
            system_prompt: &str,
            user_prompt: &str,
        ) -> QuizResult<String> {
            self.calls.lock().unwrap().push(Call {
                model: model.to_string(),
                system: system_prompt.to_string(),
                user: user_prompt.to_string(),
            });
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    const VOCAB: &str =
        "bank = financial institution, side of a river\nconduct = behavior; to lead\n";

    #[test]
    fn passes_model_output_through_verbatim() {
        let reply = "  1. 다음 영어 설명에 해당하는 단어는?\n---\n[정답]\n1. ②  ";
        let backend = FakeBackend::replying(reply);
        let generator = QuizGenerator::new(backend.clone());

        let out = generator
            .generate(VOCAB, "gpt-4o", QuestionType::EnglishDefinitionMatch, 3)
            .unwrap();

        assert_eq!(out, reply);
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gpt-4o");
        assert!(calls[0].system.contains("다음 영어 설명에 해당하는 단어는?"));
        assert!(calls[0].user.contains("bank = financial institution, side of a river"));
        assert!(calls[0].user.contains("conduct = behavior, to lead"));
    }

    #[test]
    fn shuffled_prompt_matches_seeded_order() {
        let backend = FakeBackend::replying("ok");
        let generator = QuizGenerator::new(backend.clone());
        let text = "a = 1\nb = 2\nc = 3\nd = 4\ne = 5";

        let mut rng = StdRng::seed_from_u64(11);
        generator
            .generate_with_rng(text, "m", QuestionType::FillInTheBlank, 4, &mut rng)
            .unwrap();

        let mut expected = parse_vocab_block(text);
        shuffle_pairs(&mut expected, &mut StdRng::seed_from_u64(11));
        let prompts = build_prompts(&expected, QuestionType::FillInTheBlank, 4);

        let calls = backend.calls();
        assert_eq!(calls[0].system, prompts.system);
        assert_eq!(calls[0].user, prompts.user);
        assert!(calls[0].system.contains("Provide exactly 4 distinct English sentences"));
    }

    #[test]
    fn empty_input_never_reaches_backend() {
        let backend = FakeBackend::replying("unused");
        let generator = QuizGenerator::new(backend.clone());

        for text in ["", "\n  \n", "no equals sign\nanother one"] {
            let err = generator
                .generate(text, "m", QuestionType::DefinitionJudgment, 3)
                .unwrap_err();
            assert!(matches!(err, QuizError::NoValidEntries));
            assert_eq!(err.kind(), ErrorKind::Input);
        }
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn unconfigured_generator_reports_configuration_error() {
        let generator = QuizGenerator::unconfigured("no api.json");
        assert!(!generator.is_configured());

        let err = generator
            .generate(VOCAB, "m", QuestionType::FillInTheBlank, 3)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("no api.json"));
    }

    #[test]
    fn missing_key_file_builds_unconfigured_generator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        let generator = QuizGenerator::from_key_file(&path, ClientSettings::default());
        assert!(!generator.is_configured());
    }

    #[test]
    fn key_file_builds_configured_generator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        std::fs::write(&path, r#"{"chatgpt_api_key": "sk-abc"}"#).unwrap();

        let generator = QuizGenerator::from_key_file(&path, ClientSettings::default());
        assert!(generator.is_configured());
    }

    #[test]
    fn backend_errors_are_returned_once() {
        let backend = FakeBackend::failing(|| QuizError::EmptyResponse);
        let generator = QuizGenerator::new(backend.clone());

        let err = generator
            .generate(VOCAB, "m", QuestionType::FillInTheBlank, 3)
            .unwrap_err();
        assert!(matches!(err, QuizError::EmptyResponse));
        assert_eq!(backend.calls().len(), 1);
    }
}
