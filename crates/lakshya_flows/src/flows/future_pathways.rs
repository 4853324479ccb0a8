use super::{Flow, require_text};
use serde::{Deserialize, Serialize};

/// Suggests education and career pathways from interests and strengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuturePathwaysFlow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturePathwaysInput {
    /// Class or year
    pub grade: String,
    pub interests: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
}

/// One suggested route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pathway {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Ordered steps, e.g. stream choice, entrance exam, degree
    #[serde(default)]
    pub steps: Vec<String>,
    /// Careers the route leads to
    #[serde(default)]
    pub careers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturePathways {
    pub pathways: Vec<Pathway>,
}

impl Flow for FuturePathwaysFlow {
    type Input = FuturePathwaysInput;
    type Output = FuturePathways;

    fn id(&self) -> &'static str {
        "future_pathways"
    }

    fn validate_input(&self, input: &FuturePathwaysInput) -> Result<(), String> {
        require_text("grade", &input.grade)?;
        if input.interests.is_empty() {
            return Err("at least one interest is required".to_string());
        }
        Ok(())
    }

    fn validate_output(&self, output: &FuturePathways) -> Result<(), String> {
        if output.pathways.is_empty() {
            return Err("no pathways returned".to_string());
        }
        match output.pathways.iter().find(|p| p.title.trim().is_empty()) {
            Some(_) => Err("pathway without a title".to_string()),
            None => Ok(()),
        }
    }
}
