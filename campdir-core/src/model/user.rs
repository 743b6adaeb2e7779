use crate::is_default;
use crate::model::fail_on;
use anyhow::{anyhow, Result};
use campdir_auth::password::PasswordHash;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

lazy_static! {
    pub(crate) static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "publisher" => Ok(Role::Publisher),
            "admin" => Ok(Role::Admin),
            _ => Err(anyhow!("Unknown role: {}", s)),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Publisher => f.write_str("publisher"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub role: Role,
    pub password: PasswordHash,
    #[serde(default, skip_serializing_if = "is_default")]
    pub reset_password_token: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub reset_password_expire: Option<u128>,
    pub created_at: u128,
}

impl User {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("Please add a name".to_string());
        }
        if !EMAIL_RE.is_match(&self.email) {
            problems.push("Please add a valid email".to_string());
        }
        fail_on(problems)
    }

    /// API-facing projection. The password hash and reset token never
    /// leave the server.
    pub fn public_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "created_at": self.created_at,
        })
    }
}
