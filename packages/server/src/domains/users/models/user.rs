use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dependent::Dependent;
use crate::common::UserId;

/// Account holder. Owns its dependents; family membership is a list of
/// direct links to other users, kept mutual by the join operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
    pub role: Role,
    pub family_code: Option<String>,
    pub family_members: Vec<UserId>,
    #[serde(rename = "children")]
    pub dependents: Vec<Dependent>,
    pub is_email_verified: bool,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account. `email` must already be normalized.
    pub fn new(
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        role: Role,
        family_code: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            password_hash,
            first_name,
            last_name,
            profile_picture: String::new(),
            role,
            family_code,
            family_members: Vec::new(),
            dependents: Vec::new(),
            is_email_verified: false,
            last_login: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_member(&self, other: UserId) -> bool {
        self.family_members.contains(&other)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

/// Public projection of another user (post authors, family members).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Parent,
    Guardian,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Parent => write!(f, "parent"),
            Role::Guardian => write!(f, "guardian"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parent" => Ok(Role::Parent),
            "guardian" => Ok(Role::Guardian),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Partial profile update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
}

/// Lower-case and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
