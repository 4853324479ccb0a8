use super::{Flow, require_text};
use crate::{StudentProfile, ToolName};
use serde::{Deserialize, Serialize};

/// Personalized careers, exams and scholarships for a student profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationsFlow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsInput {
    pub profile: StudentProfile,
}

/// What a recommendation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendationKind {
    Career,
    Exam,
    Scholarship,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub recommendations: Vec<Recommendation>,
}

impl Recommendations {
    /// Recommendations of one kind, in reply order.
    pub fn of_kind(&self, kind: RecommendationKind) -> impl Iterator<Item = &Recommendation> {
        self.recommendations.iter().filter(move |r| r.kind == kind)
    }
}

impl Flow for RecommendationsFlow {
    type Input = RecommendationsInput;
    type Output = Recommendations;

    fn id(&self) -> &'static str {
        "recommendations"
    }

    fn tools(&self) -> &'static [ToolName] {
        &[
            ToolName::FindCareers,
            ToolName::FindExams,
            ToolName::FindScholarships,
        ]
    }

    fn validate_input(&self, input: &RecommendationsInput) -> Result<(), String> {
        require_text("profile.name", &input.profile.name)?;
        require_text("profile.grade", &input.profile.grade)
    }
}
