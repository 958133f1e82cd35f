use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subject taught within a career. Names are unique per career.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub credits: i64,
    /// Semester of the career plan this subject belongs to.
    pub semester: i64,
    pub career_id: i64,
    /// Display name of the owning career, joined on read.
    pub career_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectInput {
    pub name: String,
    pub credits: i64,
    pub semester: i64,
    pub career_id: i64,
}

/// Input for updating an existing subject. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectInput {
    pub name: Option<String>,
    pub credits: Option<i64>,
    pub semester: Option<i64>,
    pub career_id: Option<i64>,
}
