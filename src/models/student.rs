use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a student is currently active at the institution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// A student. Email addresses are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: StudentStatus,
    /// ISO date (`YYYY-MM-DD`).
    pub date_of_birth: Option<String>,
    pub career_id: Option<i64>,
    /// Display name of the career, joined on read.
    pub career_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subject the student has registered for, with the registration time
/// that decides allocation priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredSubject {
    pub subject_id: i64,
    pub name: String,
    pub semester: i64,
    pub credits: i64,
    pub career_id: i64,
    pub registered_at: DateTime<Utc>,
}

/// A student with their subject registrations, used for detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: Student,
    pub subjects: Vec<RegisteredSubject>,
}

/// Input for creating a new student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentInput {
    pub name: String,
    pub email: String,
    pub status: StudentStatus,
    pub date_of_birth: Option<String>,
    pub career_id: Option<i64>,
    /// Subject ids to register the student for, in order.
    #[serde(default)]
    pub subjects: Vec<i64>,
}

/// Input for updating an existing student. All fields are optional for partial updates.
///
/// When `subjects` is present the full registration set is replaced, which
/// restamps every registration time. This mirrors how the roster screens
/// submit the whole list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<StudentStatus>,
    pub date_of_birth: Option<String>,
    pub career_id: Option<i64>,
    pub subjects: Option<Vec<i64>>,
}
