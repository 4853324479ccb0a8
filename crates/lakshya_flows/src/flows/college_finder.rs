use super::{Flow, require_text};
use crate::ToolName;
use serde::{Deserialize, Serialize};

/// Recommends colleges, grounded in `find_colleges` lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollegeFinderFlow;

/// What the student is looking for.
///
/// Absent preferences render as empty text in the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeFinderInput {
    /// Course or degree, e.g. "B.Tech Computer Science"
    pub course: String,
    #[serde(default)]
    pub city: Option<String>,
    /// Maximum annual fees in INR
    #[serde(default)]
    pub max_fees: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeSuggestion {
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub reason: String,
}

/// The model's shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeMatches {
    #[serde(default)]
    pub summary: String,
    pub colleges: Vec<CollegeSuggestion>,
}

impl Flow for CollegeFinderFlow {
    type Input = CollegeFinderInput;
    type Output = CollegeMatches;

    fn id(&self) -> &'static str {
        "college_finder"
    }

    fn tools(&self) -> &'static [ToolName] {
        &[ToolName::FindColleges]
    }

    fn validate_input(&self, input: &CollegeFinderInput) -> Result<(), String> {
        require_text("course", &input.course)?;
        if let Some(city) = &input.city {
            require_text("city", city)?;
        }
        Ok(())
    }
}
