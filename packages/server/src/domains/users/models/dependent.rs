use anyhow::Result;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::common::{AppError, DependentId};

/// A child or pet profile embedded under its parent user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub id: DependentId,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    pub relationship: Relationship,
}

impl Dependent {
    pub fn new(name: String, birth_date: Option<NaiveDate>, relationship: Relationship) -> Self {
        Self {
            id: DependentId::new(),
            name,
            birth_date,
            profile_picture: Some(String::new()),
            relationship,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    #[default]
    Child,
    Pet,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relationship::Child => write!(f, "child"),
            Relationship::Pet => write!(f, "pet"),
        }
    }
}

impl std::str::FromStr for Relationship {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "child" => Ok(Relationship::Child),
            "pet" => Ok(Relationship::Pet),
            _ => Err(anyhow::anyhow!("Invalid relationship: {}", s)),
        }
    }
}

/// Accepts `YYYY-MM-DD` (date inputs) or a full RFC 3339 timestamp.
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::validation(format!("Invalid birth date: {}", raw)))
}
