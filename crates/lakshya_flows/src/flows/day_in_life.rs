use super::{Flow, require_text};
use serde::{Deserialize, Serialize};

/// Narrates a typical working day in a career.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayInLifeFlow;

/// Career to narrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayInLifeInput {
    /// Career name, e.g. "Marine Biologist"
    pub career: String,
}

/// One slot of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Time of day, free-form ("9:00 AM")
    pub time: String,
    /// Short title
    pub activity: String,
    /// What happens
    #[serde(default)]
    pub description: String,
}

/// The generated story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayInLifeStory {
    pub title: String,
    pub career: String,
    pub schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub rewards: Vec<String>,
}

impl Flow for DayInLifeFlow {
    type Input = DayInLifeInput;
    type Output = DayInLifeStory;

    fn id(&self) -> &'static str {
        "day_in_life"
    }

    fn validate_input(&self, input: &DayInLifeInput) -> Result<(), String> {
        require_text("career", &input.career)
    }

    fn validate_output(&self, output: &DayInLifeStory) -> Result<(), String> {
        if output.schedule.is_empty() {
            return Err("schedule is empty".to_string());
        }
        Ok(())
    }
}
