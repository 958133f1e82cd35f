use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::db::Database;
use crate::error::CoreError;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Maps the core error taxonomy onto HTTP status codes. Validation is
/// 400, conflicts and dependency rejections are 409, missing rows are
/// 404. Storage errors are logged server-side and surfaced as an opaque
/// 500 so internal detail never leaks into a response body.
pub struct ApiError(CoreError);

impl ApiError {
    fn not_found(message: &str) -> Self {
        Self(CoreError::NotFound(message.to_string()))
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CoreError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            CoreError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            CoreError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            CoreError::Dependency(m) => (StatusCode::CONFLICT, m.clone()),
            CoreError::Storage(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Careers
// ============================================================

pub async fn list_careers(State(db): State<Database>) -> Result<Json<Vec<Career>>, ApiError> {
    Ok(Json(db.get_all_careers()?))
}

pub async fn get_career(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Career>, ApiError> {
    db.get_career(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Career not found"))
}

pub async fn create_career(
    State(db): State<Database>,
    Json(input): Json<CreateCareerInput>,
) -> Result<(StatusCode, Json<Career>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_career(input)?)))
}

pub async fn update_career(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCareerInput>,
) -> Result<Json<Career>, ApiError> {
    Ok(Json(db.update_career(id, input)?))
}

pub async fn delete_career(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_career(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Subjects
// ============================================================

pub async fn list_subjects(State(db): State<Database>) -> Result<Json<Vec<Subject>>, ApiError> {
    Ok(Json(db.get_all_subjects()?))
}

pub async fn get_subject(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Subject>, ApiError> {
    db.get_subject(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Subject not found"))
}

pub async fn create_subject(
    State(db): State<Database>,
    Json(input): Json<CreateSubjectInput>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_subject(input)?)))
}

pub async fn update_subject(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateSubjectInput>,
) -> Result<Json<Subject>, ApiError> {
    Ok(Json(db.update_subject(id, input)?))
}

pub async fn delete_subject(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_subject(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Classrooms
// ============================================================

pub async fn list_classrooms(
    State(db): State<Database>,
) -> Result<Json<Vec<Classroom>>, ApiError> {
    Ok(Json(db.get_all_classrooms()?))
}

pub async fn get_classroom(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Classroom>, ApiError> {
    db.get_classroom(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Classroom not found"))
}

pub async fn create_classroom(
    State(db): State<Database>,
    Json(input): Json<CreateClassroomInput>,
) -> Result<(StatusCode, Json<Classroom>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_classroom(input)?)))
}

pub async fn update_classroom(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateClassroomInput>,
) -> Result<Json<Classroom>, ApiError> {
    Ok(Json(db.update_classroom(id, input)?))
}

pub async fn delete_classroom(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_classroom(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Time slots
// ============================================================

pub async fn list_time_slots(
    State(db): State<Database>,
) -> Result<Json<Vec<TimeSlot>>, ApiError> {
    Ok(Json(db.get_all_time_slots()?))
}

pub async fn get_time_slot(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<TimeSlot>, ApiError> {
    db.get_time_slot(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Time slot not found"))
}

pub async fn create_time_slot(
    State(db): State<Database>,
    Json(input): Json<CreateTimeSlotInput>,
) -> Result<(StatusCode, Json<TimeSlot>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_time_slot(input)?)))
}

pub async fn update_time_slot(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTimeSlotInput>,
) -> Result<Json<TimeSlot>, ApiError> {
    Ok(Json(db.update_time_slot(id, input)?))
}

pub async fn delete_time_slot(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_time_slot(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Teachers
// ============================================================

pub async fn list_teachers(State(db): State<Database>) -> Result<Json<Vec<Teacher>>, ApiError> {
    Ok(Json(db.get_all_teachers()?))
}

pub async fn get_teacher(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Teacher>, ApiError> {
    db.get_teacher(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Teacher not found"))
}

pub async fn create_teacher(
    State(db): State<Database>,
    Json(input): Json<CreateTeacherInput>,
) -> Result<(StatusCode, Json<Teacher>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_teacher(input)?)))
}

pub async fn update_teacher(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTeacherInput>,
) -> Result<Json<Teacher>, ApiError> {
    Ok(Json(db.update_teacher(id, input)?))
}

pub async fn delete_teacher(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_teacher(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Students
// ============================================================

pub async fn list_students(State(db): State<Database>) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(db.get_all_students()?))
}

pub async fn get_student(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<StudentDetail>, ApiError> {
    db.get_student(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Student not found"))
}

pub async fn create_student(
    State(db): State<Database>,
    Json(input): Json<CreateStudentInput>,
) -> Result<(StatusCode, Json<StudentDetail>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_student(input)?)))
}

pub async fn update_student(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateStudentInput>,
) -> Result<Json<StudentDetail>, ApiError> {
    Ok(Json(db.update_student(id, input)?))
}

pub async fn delete_student(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_student(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Groups
// ============================================================

/// Scope filter for group reads. The routing layer sets `teacherId` for
/// teacher callers so they only ever see their own groups; the core
/// itself stays role-agnostic.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupScopeQuery {
    pub teacher_id: Option<i64>,
}

pub async fn list_groups(
    State(db): State<Database>,
    Query(scope): Query<GroupScopeQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(db.list_groups(scope.teacher_id)?))
}

pub async fn get_group(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Query(scope): Query<GroupScopeQuery>,
) -> Result<Json<GroupDetail>, ApiError> {
    db.get_group_detail(id, scope.teacher_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Group not found"))
}

pub async fn create_group(
    State(db): State<Database>,
    Json(input): Json<CreateGroupInput>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    Ok((StatusCode::CREATED, Json(db.create_group(input)?)))
}

pub async fn update_group(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateGroupInput>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(db.update_group(id, input)?))
}

pub async fn delete_group(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    db.delete_group(id)?;
    Ok(StatusCode::NO_CONTENT)
}
