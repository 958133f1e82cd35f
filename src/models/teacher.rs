use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest academic degree held by a teacher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Degree {
    Bachelor,
    Master,
    Doctorate,
}

impl Degree {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bachelor => "BACHELOR",
            Self::Master => "MASTER",
            Self::Doctorate => "DOCTORATE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BACHELOR" => Some(Self::Bachelor),
            "MASTER" => Some(Self::Master),
            "DOCTORATE" => Some(Self::Doctorate),
            _ => None,
        }
    }
}

/// A teacher. Referenced by groups; never mutated by the scheduling core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub degree: Degree,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherInput {
    pub name: String,
    pub degree: Degree,
}

/// Input for updating an existing teacher. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherInput {
    pub name: Option<String>,
    pub degree: Option<Degree>,
}
