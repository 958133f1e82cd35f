use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical room groups are taught in. Room names are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: i64,
    pub name: String,
    pub building: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new classroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassroomInput {
    pub name: String,
    pub building: String,
}

/// Input for updating an existing classroom. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassroomInput {
    pub name: Option<String>,
    pub building: Option<String>,
}
