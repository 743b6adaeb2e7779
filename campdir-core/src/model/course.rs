use crate::model::fail_on;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Duration in weeks.
    pub weeks: u32,
    pub tuition: f64,
    #[serde(default)]
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
    /// Parent bootcamp id.
    pub bootcamp: String,
    /// Owning user id.
    pub user: String,
    #[serde(default)]
    pub created_at: u128,
}

impl Course {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push("Course title is required".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("Course description is required".to_string());
        }
        if self.weeks == 0 {
            problems.push("Please add course duration (in weeks)".to_string());
        }
        if self.tuition < 0.0 {
            problems.push("Please add a tuition cost".to_string());
        }
        fail_on(problems)
    }
}
