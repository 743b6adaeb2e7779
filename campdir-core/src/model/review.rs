use crate::model::fail_on;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub title: String,
    pub text: String,
    /// 1 to 10.
    pub rating: f64,
    /// Reviewed bootcamp id.
    pub bootcamp: String,
    /// Authoring user id. One review per user per bootcamp.
    pub user: String,
    #[serde(default)]
    pub created_at: u128,
}

impl Review {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push("Please add a title for the review".to_string());
        } else if self.title.len() > 100 {
            problems.push("Title can not be more than 100 characters".to_string());
        }
        if self.text.trim().is_empty() {
            problems.push("Please add some text".to_string());
        }
        if !(1.0..=10.0).contains(&self.rating) {
            problems.push("Please add a rating between 1 and 10".to_string());
        }
        fail_on(problems)
    }
}
