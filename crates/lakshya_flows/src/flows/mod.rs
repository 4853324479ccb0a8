//! Structured flows: one prompt in, one typed JSON document out.
//!
//! A flow names its prompt template, the shape of its input (rendered into
//! the template) and the shape of the JSON the model must reply with.
//! [`FlowRunner`](crate::FlowRunner) does the rendering, retrying and
//! parsing; flows only describe and validate.

mod college_finder;
mod day_in_life;
mod future_pathways;
mod quiz_suggestions;
mod recommendations;

pub use college_finder::{CollegeFinderFlow, CollegeFinderInput, CollegeMatches, CollegeSuggestion};
pub use day_in_life::{DayInLifeFlow, DayInLifeInput, DayInLifeStory, ScheduleEntry};
pub use future_pathways::{FuturePathways, FuturePathwaysFlow, FuturePathwaysInput, Pathway};
pub use quiz_suggestions::{
    CareerSuggestion, QuizAnswer, QuizSuggestions, QuizSuggestionsFlow, QuizSuggestionsInput,
};
pub use recommendations::{
    Recommendation, RecommendationKind, Recommendations, RecommendationsFlow,
    RecommendationsInput,
};

use crate::ToolName;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A single-shot generation with typed input and output.
pub trait Flow: Send + Sync {
    /// Template variables.
    type Input: Serialize + Send + Sync;
    /// Parsed model reply.
    type Output: DeserializeOwned + Serialize + Send;

    /// Identifier, also the id of the prompt template.
    fn id(&self) -> &'static str;

    /// Tools the model may call while answering.
    fn tools(&self) -> &'static [ToolName] {
        &[]
    }

    /// Reject input before any model call.
    fn validate_input(&self, _input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    /// Reject a reply that parsed but makes no sense.
    fn validate_output(&self, _output: &Self::Output) -> Result<(), String> {
        Ok(())
    }
}

/// Every flow, by name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FlowKind {
    /// [`DayInLifeFlow`]
    DayInLife,
    /// [`FuturePathwaysFlow`]
    FuturePathways,
    /// [`CollegeFinderFlow`]
    CollegeFinder,
    /// [`RecommendationsFlow`]
    Recommendations,
    /// [`QuizSuggestionsFlow`]
    QuizSuggestions,
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}
