use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A degree program. Careers own subjects and are referenced by students.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    pub id: i64,
    pub name: String,
    /// Number of semesters in the program.
    pub semesters: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new career.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCareerInput {
    pub name: String,
    pub semesters: i64,
}

/// Input for updating an existing career. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCareerInput {
    pub name: Option<String>,
    pub semesters: Option<i64>,
}
