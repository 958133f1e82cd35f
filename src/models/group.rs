use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Shift, StudentStatus};

/// A scheduled section of a subject: one teacher, one classroom, one time
/// slot, one semester, with a capacity-bounded student roster.
///
/// Reads are always enriched with the display names of the referenced
/// catalog rows, so callers never have to join on their side.
///
/// # Invariants
/// - `(subject_id, name)` is unique: no duplicate section names per subject.
/// - `(teacher_id, schedule_id)` is unique: a teacher cannot teach two
///   groups in the same slot.
/// - `(classroom_id, schedule_id)` is unique: a room cannot host two
///   groups in the same slot.
///
/// All three are enforced both by the pre-write conflict check (for the
/// readable error message) and by unique indexes in storage (the
/// authoritative guard under concurrent creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub career_id: i64,
    pub career_name: Option<String>,
    pub subject_id: i64,
    pub subject_name: Option<String>,
    pub teacher_id: i64,
    pub teacher_name: Option<String>,
    pub classroom_id: i64,
    pub classroom_name: Option<String>,
    pub schedule_id: i64,
    pub schedule_time: Option<String>,
    pub schedule_shift: Option<Shift>,
    pub semester: i64,
    pub max_students: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a group's roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledStudent {
    pub student_id: i64,
    pub name: String,
    pub status: StudentStatus,
    pub email: String,
    pub enrolled_at: DateTime<Utc>,
}

/// A group with its roster ordered by enrollment time, used for detail
/// responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub students: Vec<EnrolledStudent>,
}

/// Input for creating a new group. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    pub name: String,
    pub career_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub classroom_id: i64,
    pub schedule_id: i64,
    pub semester: i64,
    pub max_students: i64,
}

/// Input for updating an existing group. All fields are optional for partial updates.
///
/// Lowering `max_students` below the current enrollment evicts the most
/// recently enrolled students until the roster fits again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupInput {
    pub name: Option<String>,
    pub career_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub classroom_id: Option<i64>,
    pub schedule_id: Option<i64>,
    pub semester: Option<i64>,
    pub max_students: Option<i64>,
}
