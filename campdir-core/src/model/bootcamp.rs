use crate::model::fail_on;
use crate::model::user::EMAIL_RE;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

/// Geocoded point attached to a bootcamp when a geo provider is
/// configured.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Bootcamp {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Mean review rating, 1..=10. Maintained by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Mean course tuition, rounded up to tens. Maintained by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    /// Owning user id.
    pub user: String,
    #[serde(default)]
    pub created_at: u128,
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

impl Bootcamp {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("Please add a name".to_string());
        } else if self.name.len() > 50 {
            problems.push("Name can not be more than 50 characters".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("Please add a description".to_string());
        } else if self.description.len() > 500 {
            problems.push("Description can not be more than 500 characters".to_string());
        }
        if self.address.trim().is_empty() {
            problems.push("Please add an address".to_string());
        }
        if let Some(website) = self.website.as_ref() {
            if url::Url::parse(website).is_err() {
                problems.push("Please use a valid URL with HTTP or HTTPS".to_string());
            }
        }
        if let Some(phone) = self.phone.as_ref() {
            if phone.len() > 20 {
                problems.push("Phone number can not be longer than 20 characters".to_string());
            }
        }
        if let Some(email) = self.email.as_ref() {
            if !EMAIL_RE.is_match(email) {
                problems.push("Please add a valid email".to_string());
            }
        }
        for career in self.careers.iter() {
            if !CAREERS.contains(&career.as_str()) {
                problems.push(format!("{} is not a valid career", career));
            }
        }
        fail_on(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn bootcamp() -> Bootcamp {
        Bootcamp {
            id: "b1".to_string(),
            name: "Devworks Bootcamp".to_string(),
            slug: slugify("Devworks Bootcamp"),
            description: "Full stack web development".to_string(),
            website: Some("https://devworks.com".to_string()),
            address: "233 Bay State Rd Boston MA 02215".to_string(),
            careers: vec!["Web Development".to_string(), "Business".to_string()],
            user: "u1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
        assert_eq!(slugify("UI/UX  Experts!"), "ui-ux-experts");
    }

    #[test]
    fn test_valid_bootcamp() {
        assert!(bootcamp().validate().is_ok());
    }

    #[test]
    fn test_long_name_rejected() {
        let mut bootcamp = bootcamp();
        bootcamp.name = "x".repeat(51);
        assert!(bootcamp.validate().is_err());
    }

    #[test]
    fn test_unknown_career_rejected() {
        let mut bootcamp = bootcamp();
        bootcamp.careers.push("Gardening".to_string());
        let err = bootcamp.validate().unwrap_err();
        assert!(err.to_string().contains("Gardening"));
    }

    #[test]
    fn test_bad_website_rejected() {
        let mut bootcamp = bootcamp();
        bootcamp.website = Some("devworks dot com".to_string());
        assert!(bootcamp.validate().is_err());
    }
}
