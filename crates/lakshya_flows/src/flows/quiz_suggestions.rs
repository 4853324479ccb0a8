use super::{Flow, require_text};
use serde::{Deserialize, Serialize};

/// Careers matching a student's interest-quiz answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizSuggestionsFlow;

/// Highest score a suggestion may carry.
const MAX_MATCH_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSuggestionsInput {
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSuggestion {
    pub career: String,
    /// Fit from 0 to 100
    pub match_score: u8,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSuggestions {
    pub suggestions: Vec<CareerSuggestion>,
}

impl QuizSuggestions {
    /// Best match first.
    pub fn ranked(&self) -> Vec<&CareerSuggestion> {
        let mut ranked: Vec<_> = self.suggestions.iter().collect();
        ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        ranked
    }
}

impl Flow for QuizSuggestionsFlow {
    type Input = QuizSuggestionsInput;
    type Output = QuizSuggestions;

    fn id(&self) -> &'static str {
        "quiz_suggestions"
    }

    fn validate_input(&self, input: &QuizSuggestionsInput) -> Result<(), String> {
        if input.answers.is_empty() {
            return Err("no quiz answers".to_string());
        }
        input
            .answers
            .iter()
            .try_for_each(|a| require_text("answer", &a.answer))
    }

    fn validate_output(&self, output: &QuizSuggestions) -> Result<(), String> {
        match output
            .suggestions
            .iter()
            .find(|s| s.match_score > MAX_MATCH_SCORE)
        {
            Some(s) => Err(format!(
                "match_score {} for '{}' exceeds {}",
                s.match_score, s.career, MAX_MATCH_SCORE
            )),
            None => Ok(()),
        }
    }
}
