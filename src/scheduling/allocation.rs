//! Automatic enrollment of eligible students into a newly created group.

use chrono::Utc;
use rusqlite::Connection;

use crate::error::CoreResult;

/// Enroll up to `capacity` eligible students into the group.
///
/// The eligible pool is every registration for the subject whose student
/// is not already enrolled in some group of that subject, ordered by
/// registration time (earliest first) with student id as the stable
/// tie-break. The selection is a total order, so allocation is
/// reproducible.
///
/// Runs inside the group-creation transaction and is invoked exactly
/// once per group; re-running it would enroll the same students twice,
/// which is why it is not exposed as a public operation.
pub(crate) fn allocate(
    conn: &Connection,
    group_id: i64,
    subject_id: i64,
    capacity: i64,
) -> CoreResult<usize> {
    let mut stmt = conn.prepare(
        "SELECT ss.student_id
         FROM student_subjects ss
         WHERE ss.subject_id = ?1
           AND ss.student_id NOT IN (
               SELECT gs.student_id
               FROM group_students gs
               JOIN groups g ON g.id = gs.group_id
               WHERE g.subject_id = ?1
           )
         ORDER BY ss.registered_at, ss.student_id
         LIMIT ?2",
    )?;

    let students = stmt
        .query_map((subject_id, capacity), |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now().to_rfc3339();
    for student_id in &students {
        conn.execute(
            "INSERT INTO group_students (group_id, student_id, enrolled_at) VALUES (?, ?, ?)",
            (group_id, student_id, &now),
        )?;
    }

    tracing::debug!(group_id, enrolled = students.len(), "Allocated students to group");
    Ok(students.len())
}
