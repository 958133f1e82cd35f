//! Demo data for local development, used by the `seed` CLI command.

use anyhow::Result;

use crate::db::Database;
use crate::models::*;

/// Populate an empty database with a small demo catalog. Does nothing
/// when careers already exist, so re-running is safe.
pub fn seed_database(db: &Database) -> Result<()> {
    if !db.get_all_careers()?.is_empty() {
        tracing::info!("Database already seeded, skipping");
        return Ok(());
    }

    let systems = db.create_career(CreateCareerInput {
        name: "Systems Engineering".to_string(),
        semesters: 9,
    })?;
    db.create_career(CreateCareerInput {
        name: "Business Administration".to_string(),
        semesters: 8,
    })?;

    let programming = db.create_subject(CreateSubjectInput {
        name: "Programming I".to_string(),
        credits: 8,
        semester: 1,
        career_id: systems.id,
    })?;
    let databases = db.create_subject(CreateSubjectInput {
        name: "Databases".to_string(),
        credits: 7,
        semester: 3,
        career_id: systems.id,
    })?;

    db.create_classroom(CreateClassroomInput {
        name: "A-101".to_string(),
        building: "Main Building".to_string(),
    })?;
    db.create_classroom(CreateClassroomInput {
        name: "B-201".to_string(),
        building: "Laboratory Building".to_string(),
    })?;

    db.create_time_slot(CreateTimeSlotInput {
        time: "08:00".to_string(),
        shift: None,
    })?;
    db.create_time_slot(CreateTimeSlotInput {
        time: "16:00".to_string(),
        shift: None,
    })?;

    db.create_teacher(CreateTeacherInput {
        name: "Jane Rivera".to_string(),
        degree: Degree::Master,
    })?;

    for (name, email) in [
        ("Alex Morgan", "alex.morgan@campus.edu"),
        ("Sam Ortiz", "sam.ortiz@campus.edu"),
        ("Robin Castillo", "robin.castillo@campus.edu"),
    ] {
        db.create_student(CreateStudentInput {
            name: name.to_string(),
            email: email.to_string(),
            status: StudentStatus::Active,
            date_of_birth: None,
            career_id: Some(systems.id),
            subjects: vec![programming.id, databases.id],
        })?;
    }

    tracing::info!("Seeded demo data");
    Ok(())
}
