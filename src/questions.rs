//! Prompt construction for LLM-authored multiple-choice questions

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};
use crate::vocab::VocabPair;

/// Upper bound accepted by [`check_sentence_count`]
pub const MAX_SENTENCE_COUNT: u32 = 10;
const MIN_SENTENCE_COUNT: u32 = 1;

const PERSONA: &str = "You are an expert English vocabulary test maker for Korean students.";

const STYLE_RULES: [&str; 2] = [
    "1. PRIORITY: Focus on polysemous words: those with multiple, distinct meanings (e.g., different parts of speech like 'conduct' as a noun vs. verb, or different senses like 'bank' of a river vs. a financial institution).",
    "2. GOAL: The questions should be intentionally challenging, designed to confuse the test-taker and test their ability to discern the correct meaning from context.",
];

const ANSWER_KEY_RULE: &str = "1. CRITICAL: DO NOT mark the correct answer in the choices. Instead, create a separate `[정답]` section at the very end of the entire output, listing each question number and its correct choice number.";

const DISTRIBUTION_RULE: &str = "2. CRITICAL: The position of the correct answer MUST be truly and unpredictably randomized to ensure a balanced distribution. For the entire set of questions, each choice position (①, ②, ③, ④, ⑤) should be the correct answer approximately 20% of the time. DO NOT use any discernible pattern (e.g., 1, 2, 3, 4, 5 or 5, 4, 3, 2, 1). The sequence of correct answers must appear random and chaotic.";

const FINAL_REVIEW: &str = "### Final Review\nBefore concluding your response, you MUST review the entire generated text one last time to ensure every single rule has been followed. Pay special attention that every question has exactly 5 numbered choices (① to ⑤). If you find any mistake, you must correct it before finishing.";

const USER_PREAMBLE: &str = "Here is the list of vocabulary. Create test questions based on these words, strictly following all rules defined in the system instructions.";

/// Quiz style requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    FillInTheBlank,
    EnglishDefinitionMatch,
    DefinitionJudgment,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::FillInTheBlank,
        QuestionType::EnglishDefinitionMatch,
        QuestionType::DefinitionJudgment,
    ];

    pub fn id(self) -> &'static str {
        match self {
            QuestionType::FillInTheBlank => "fill-in-the-blank",
            QuestionType::EnglishDefinitionMatch => "english-definition-match",
            QuestionType::DefinitionJudgment => "definition-judgment",
        }
    }

    /// Label shown in the Korean front end
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::FillInTheBlank => "빈칸 추론",
            QuestionType::EnglishDefinitionMatch => "영영풀이",
            QuestionType::DefinitionJudgment => "뜻풀이 판단",
        }
    }

    /// The per-type fragments of the shared instruction template
    pub fn template(self, sentence_count: u32) -> QuestionTemplate {
        match self {
            QuestionType::FillInTheBlank => QuestionTemplate {
                task: "Your task is to create multiple-choice questions that test understanding of words in context.",
                main_rule: "For each WORD and for each of its SENSEs, you must generate a complete question block.",
                title: "다음 빈칸에 공통으로 들어갈 말로 가장 적절한 것은?",
                title_note: None,
                body_steps: vec![
                    format!("Provide exactly {sentence_count} distinct English sentences as context. Each sentence must have the word blanked out as '_______'."),
                    "Provide exactly 5 answer choices (①, ②, ③, ④, ⑤).".to_string(),
                    "The choices must include one correct answer (the original WORD) and four plausible but incorrect distractors.".to_string(),
                ],
            },
            QuestionType::EnglishDefinitionMatch => QuestionTemplate {
                task: "Your task is to create multiple-choice questions based on English definitions.",
                main_rule: "For each WORD, you must generate one complete multiple-choice question.",
                title: "다음 영어 설명에 해당하는 단어는?",
                title_note: None,
                body_steps: vec![
                    "Provide the English definition of the WORD as the question body.".to_string(),
                    "Provide exactly 5 answer choices (①, ②, ③, ④, ⑤): one correct answer (the original WORD) and four plausible distractors (e.g., synonyms, related words).".to_string(),
                ],
            },
            QuestionType::DefinitionJudgment => QuestionTemplate {
                task: "Your task is to create multiple-choice questions that test the precise definition of a word.",
                main_rule: "For each WORD, you must generate one complete multiple-choice question asking for its correct definition.",
                title: "다음 단어 <WORD>의 영영풀이로 가장 적절한 것은?",
                title_note: Some("replace <WORD> with the actual word"),
                body_steps: vec![
                    "Provide exactly 5 definition choices (①, ②, ③, ④, ⑤): one perfectly correct definition and four subtly incorrect but plausible definitions.".to_string(),
                ],
            },
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for QuestionType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        QuestionType::ALL
            .into_iter()
            .find(|qt| qt.id().eq_ignore_ascii_case(needle) || qt.label() == needle)
            .ok_or_else(|| QuizError::UnknownQuestionType(s.to_string()))
    }
}

/// Fragments that differ between question types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTemplate {
    pub task: &'static str,
    pub main_rule: &'static str,
    pub title: &'static str,
    pub title_note: Option<&'static str>,
    pub body_steps: Vec<String>,
}

impl QuestionTemplate {
    fn output_structure(&self) -> Vec<String> {
        let title = match self.title_note {
            Some(note) => format!("Add the title: '{}' ({}).", self.title, note),
            None => format!("Add the title: '{}'", self.title),
        };

        let mut steps = vec!["Start with the question number (e.g., '1.').".to_string(), title];
        steps.extend(self.body_steps.iter().cloned());
        steps.push("Separate each full question block with a '---' line.".to_string());

        steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect()
    }

    /// Render the full system instruction
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = vec![
            PERSONA.to_string(),
            self.task.to_string(),
            "Strictly follow all rules below.".to_string(),
            String::new(),
            "### Main Rule".to_string(),
            self.main_rule.to_string(),
            String::new(),
            "### Word Selection & Question Style Rule".to_string(),
        ];
        lines.extend(STYLE_RULES.iter().map(|s| s.to_string()));
        lines.push(String::new());
        lines.push("### Answer Generation Rules".to_string());
        lines.push(ANSWER_KEY_RULE.to_string());
        lines.push(DISTRIBUTION_RULE.to_string());
        lines.push(String::new());
        lines.push("### Output Structure (per question)".to_string());
        lines.extend(self.output_structure());
        lines.push(String::new());
        lines.push(FINAL_REVIEW.to_string());

        lines.join("\n")
    }
}

/// System and user prompt sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Render the user content listing every pair, one per line
pub fn build_user_prompt(pairs: &[VocabPair]) -> String {
    let listing: Vec<String> = pairs.iter().map(VocabPair::render).collect();
    [
        USER_PREAMBLE.to_string(),
        String::new(),
        "[Vocabulary List]".to_string(),
        listing.join("\n"),
    ]
    .join("\n")
}

/// Build both prompts; `sentence_count` only matters for fill-in-the-blank
pub fn build_prompts(
    pairs: &[VocabPair],
    question_type: QuestionType,
    sentence_count: u32,
) -> PromptPair {
    PromptPair {
        system: question_type.template(sentence_count).render(),
        user: build_user_prompt(pairs),
    }
}

/// Host-side range check for the example sentence count
pub fn check_sentence_count(value: u32) -> QuizResult<u32> {
    if (MIN_SENTENCE_COUNT..=MAX_SENTENCE_COUNT).contains(&value) {
        Ok(value)
    } else {
        Err(QuizError::InvalidSentenceCount {
            value,
            min: MIN_SENTENCE_COUNT,
            max: MAX_SENTENCE_COUNT,
        })
    }
}

/// Everything that determines the two prompts for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub pairs: Vec<VocabPair>,
    pub question_type: QuestionType,
    pub sentence_count: u32,
    pub model: String,
}

impl GenerationRequest {
    pub fn prompts(&self) -> PromptPair {
        build_prompts(&self.pairs, self.question_type, self.sentence_count)
    }
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "preview_prompts")]
pub fn py_preview_prompts(
    vocab_text: &str,
    question_type: &str,
    sentence_count: u32,
) -> PyResult<(String, String)> {
    let question_type: QuestionType = question_type.parse()?;
    let pairs = crate::vocab::parse_vocab_block(vocab_text);
    if pairs.is_empty() {
        return Err(QuizError::NoValidEntries.into());
    }
    let prompts = build_prompts(&pairs, question_type, sentence_count);
    Ok((prompts.system, prompts.user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::parse_vocab_block;

    fn sample_pairs() -> Vec<VocabPair> {
        parse_vocab_block(
            "bank = financial institution, side of a river\nconduct = behavior; to lead",
        )
    }

    #[test]
    fn parses_ids_and_labels() {
        assert_eq!(
            "fill-in-the-blank".parse::<QuestionType>().unwrap(),
            QuestionType::FillInTheBlank
        );
        assert_eq!(
            " English-Definition-Match ".parse::<QuestionType>().unwrap(),
            QuestionType::EnglishDefinitionMatch
        );
        assert_eq!(
            "뜻풀이 판단".parse::<QuestionType>().unwrap(),
            QuestionType::DefinitionJudgment
        );
        assert_eq!(
            "영영풀이".parse::<QuestionType>().unwrap(),
            QuestionType::EnglishDefinitionMatch
        );
        assert!(matches!(
            "crossword".parse::<QuestionType>(),
            Err(QuizError::UnknownQuestionType(s)) if s == "crossword"
        ));
    }

    #[test]
    fn serde_uses_kebab_case_ids() {
        let json = serde_json::to_string(&QuestionType::DefinitionJudgment).unwrap();
        assert_eq!(json, "\"definition-judgment\"");
        let back: QuestionType = serde_json::from_str("\"fill-in-the-blank\"").unwrap();
        assert_eq!(back, QuestionType::FillInTheBlank);
    }

    #[test]
    fn every_template_carries_shared_rules() {
        for qt in QuestionType::ALL {
            let system = build_prompts(&sample_pairs(), qt, 3).system;
            assert!(system.contains("polysemous"), "{qt}");
            assert!(system.contains("DO NOT mark the correct answer"), "{qt}");
            assert!(system.contains("`[정답]`"), "{qt}");
            assert!(system.contains("approximately 20% of the time"), "{qt}");
            assert!(system.contains("### Final Review"), "{qt}");
            assert!(system.contains("exactly 5 numbered choices"), "{qt}");
            assert!(system.contains("with a '---' line"), "{qt}");
            assert!(system.contains(qt.template(3).title), "{qt}");
        }
    }

    #[test]
    fn output_steps_are_numbered_in_sequence() {
        let system = QuestionType::DefinitionJudgment.template(1).render();
        assert!(system.contains("1. Start with the question number"));
        assert!(system.contains(concat!(
            "2. Add the title: '다음 단어 <WORD>의 영영풀이로 가장 적절한 것은?' ",
            "(replace <WORD> with the actual word)."
        )));
        assert!(system.contains("3. Provide exactly 5 definition choices"));
        assert!(system.contains("4. Separate each full question block with a '---' line."));

        let system = QuestionType::FillInTheBlank.template(3).render();
        assert!(system.contains("6. Separate each full question block with a '---' line."));
    }

    #[test]
    fn sentence_count_changes_only_its_number() {
        let three = build_prompts(&sample_pairs(), QuestionType::FillInTheBlank, 3);
        let seven = build_prompts(&sample_pairs(), QuestionType::FillInTheBlank, 7);

        assert!(three.system.contains("Provide exactly 3 distinct English sentences"));
        assert!(seven.system.contains("Provide exactly 7 distinct English sentences"));
        assert_eq!(three.system.replace("exactly 3 distinct", "exactly 7 distinct"), seven.system);
        assert_eq!(three.user, seven.user);
    }

    #[test]
    fn sentence_count_is_ignored_by_other_types() {
        for qt in [QuestionType::EnglishDefinitionMatch, QuestionType::DefinitionJudgment] {
            assert_eq!(
                build_prompts(&sample_pairs(), qt, 2),
                build_prompts(&sample_pairs(), qt, 9)
            );
        }
    }

    #[test]
    fn prompts_are_deterministic() {
        let pairs = sample_pairs();
        for qt in QuestionType::ALL {
            assert_eq!(build_prompts(&pairs, qt, 4), build_prompts(&pairs, qt, 4));
        }
    }

    #[test]
    fn user_prompt_lists_pairs_after_preamble() {
        let prompts = build_prompts(&sample_pairs(), QuestionType::EnglishDefinitionMatch, 3);
        let lines: Vec<&str> = prompts.user.lines().collect();
        assert_eq!(lines[0], USER_PREAMBLE);
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "[Vocabulary List]");
        assert_eq!(lines[3], "bank = financial institution, side of a river");
        assert_eq!(lines[4], "conduct = behavior, to lead");
        assert!(prompts.system.contains("다음 영어 설명에 해당하는 단어는?"));
    }

    #[test]
    fn request_renders_its_prompts() {
        let request = GenerationRequest {
            pairs: sample_pairs(),
            question_type: QuestionType::FillInTheBlank,
            sentence_count: 2,
            model: "gpt-4o".to_string(),
        };
        assert_eq!(
            request.prompts(),
            build_prompts(&request.pairs, QuestionType::FillInTheBlank, 2)
        );
    }

    #[test]
    fn sentence_count_bounds() {
        assert_eq!(check_sentence_count(1).unwrap(), 1);
        assert_eq!(check_sentence_count(MAX_SENTENCE_COUNT).unwrap(), MAX_SENTENCE_COUNT);
        assert!(matches!(
            check_sentence_count(0),
            Err(QuizError::InvalidSentenceCount { value: 0, .. })
        ));
        assert!(check_sentence_count(MAX_SENTENCE_COUNT + 1).is_err());
    }
}
