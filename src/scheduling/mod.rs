//! Group scheduling and enrollment consistency engine.
//!
//! Owns the lifecycle of groups: creation with automatic enrollment,
//! partial updates with conflict re-checking and roster rebalancing,
//! and atomic deletion. Everything multi-statement runs inside one
//! SQLite transaction; a failure at any step rolls the whole unit back.

mod allocation;
mod conflicts;
mod rebalance;

pub use conflicts::Conflict;

use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use crate::db::{parse_datetime, Database};
use crate::error::{CoreError, CoreResult};
use crate::models::*;

use conflicts::Proposal;

const ENRICHED_GROUP_SELECT: &str = "SELECT g.id, g.name, g.career_id, c.name, g.subject_id, sub.name,
        g.teacher_id, t.name, g.classroom_id, cl.name,
        g.schedule_id, sc.time, sc.shift,
        g.semester, g.max_students, g.created_at, g.updated_at
 FROM groups g
 LEFT JOIN careers c ON c.id = g.career_id
 LEFT JOIN subjects sub ON sub.id = g.subject_id
 LEFT JOIN teachers t ON t.id = g.teacher_id
 LEFT JOIN classrooms cl ON cl.id = g.classroom_id
 LEFT JOIN schedules sc ON sc.id = g.schedule_id";

impl Database {
    /// List groups with their display names. When `scope_to_teacher_id`
    /// is given the list is restricted to that teacher's groups; the
    /// routing layer supplies it for teacher callers.
    pub fn list_groups(&self, scope_to_teacher_id: Option<i64>) -> CoreResult<Vec<Group>> {
        let conn = self.lock_conn();
        let groups = match scope_to_teacher_id {
            Some(teacher_id) => {
                let sql = format!("{ENRICHED_GROUP_SELECT} WHERE g.teacher_id = ? ORDER BY g.id DESC");
                let mut stmt = conn.prepare(&sql)?;
                let groups = stmt
                    .query_map([teacher_id], map_group)?
                    .collect::<Result<Vec<_>, _>>()?;
                groups
            }
            None => {
                let sql = format!("{ENRICHED_GROUP_SELECT} ORDER BY g.id DESC");
                let mut stmt = conn.prepare(&sql)?;
                let groups = stmt
                    .query_map([], map_group)?
                    .collect::<Result<Vec<_>, _>>()?;
                groups
            }
        };
        Ok(groups)
    }

    pub fn get_group(&self, id: i64, scope_to_teacher_id: Option<i64>) -> CoreResult<Option<Group>> {
        let conn = self.lock_conn();
        let sql = format!("{ENRICHED_GROUP_SELECT} WHERE g.id = ?");
        let mut stmt = conn.prepare(&sql)?;
        let group = stmt.query_row([id], map_group).optional()?;

        // A scoped read of another teacher's group is indistinguishable
        // from a missing group.
        match (group, scope_to_teacher_id) {
            (Some(g), Some(teacher_id)) if g.teacher_id != teacher_id => Ok(None),
            (group, _) => Ok(group),
        }
    }

    /// Group plus its roster ordered by enrollment time (then insertion
    /// order), with each student's name, status and email.
    pub fn get_group_detail(
        &self,
        id: i64,
        scope_to_teacher_id: Option<i64>,
    ) -> CoreResult<Option<GroupDetail>> {
        let group = match self.get_group(id, scope_to_teacher_id)? {
            Some(g) => g,
            None => return Ok(None),
        };

        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT gs.student_id, s.name, s.status, s.email, gs.enrolled_at
             FROM group_students gs
             JOIN students s ON s.id = gs.student_id
             WHERE gs.group_id = ?
             ORDER BY gs.enrolled_at, gs.rowid",
        )?;

        let students = stmt
            .query_map([id], |row| {
                Ok(EnrolledStudent {
                    student_id: row.get(0)?,
                    name: row.get(1)?,
                    status: StudentStatus::from_str(&row.get::<_, String>(2)?)
                        .unwrap_or(StudentStatus::Active),
                    email: row.get(3)?,
                    enrolled_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(GroupDetail { group, students }))
    }

    /// Create a group and auto-enroll eligible students up to capacity,
    /// all in one transaction.
    ///
    /// The conflict check runs first for the readable message; the unique
    /// indexes on the groups table back it up, and a violation raised by
    /// the insert itself (a lost race) is translated into the same
    /// conflict error.
    pub fn create_group(&self, input: CreateGroupInput) -> CoreResult<Group> {
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        if input.semester <= 0 {
            return Err(CoreError::Validation("semester must be positive".into()));
        }
        if input.max_students <= 0 {
            return Err(CoreError::Validation("maxStudents must be positive".into()));
        }

        let id = {
            let mut conn = self.lock_conn();
            let proposal = Proposal {
                name: &input.name,
                subject_id: input.subject_id,
                teacher_id: input.teacher_id,
                classroom_id: input.classroom_id,
                schedule_id: input.schedule_id,
            };
            if let Some(conflict) = conflicts::check_conflicts(&conn, &proposal, None)? {
                return Err(conflict.into_error());
            }

            let tx = conn.transaction()?;
            let now = Utc::now().to_rfc3339();
            let inserted = tx.execute(
                "INSERT INTO groups (name, career_id, subject_id, teacher_id, classroom_id,
                                     schedule_id, semester, max_students, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    &input.name,
                    input.career_id,
                    input.subject_id,
                    input.teacher_id,
                    input.classroom_id,
                    input.schedule_id,
                    input.semester,
                    input.max_students,
                    &now,
                    &now,
                ),
            );
            if let Err(e) = inserted {
                let err = CoreError::from(e);
                if err.is_unique_violation() {
                    return Err(conflicts::race_conflict(&tx, &proposal, None));
                }
                return Err(err);
            }
            let group_id = tx.last_insert_rowid();

            allocation::allocate(&tx, group_id, input.subject_id, input.max_students)?;
            tx.commit()?;
            group_id
        };

        tracing::info!(group_id = id, "Created group");
        self.get_group(id, None)?
            .ok_or_else(|| CoreError::NotFound("Group not found".into()))
    }

    /// Partial update. Changing any scheduling field re-runs the conflict
    /// check against the merged assignment, excluding this group.
    /// Lowering `max_students` rebalances the roster inside the same
    /// transaction as the update.
    pub fn update_group(&self, id: i64, input: UpdateGroupInput) -> CoreResult<Group> {
        let no_fields = input.name.is_none()
            && input.career_id.is_none()
            && input.subject_id.is_none()
            && input.teacher_id.is_none()
            && input.classroom_id.is_none()
            && input.schedule_id.is_none()
            && input.semester.is_none()
            && input.max_students.is_none();
        if no_fields {
            return Err(CoreError::Validation("no fields to update".into()));
        }
        if matches!(input.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(CoreError::Validation("name must not be empty".into()));
        }
        if matches!(input.semester, Some(s) if s <= 0) {
            return Err(CoreError::Validation("semester must be positive".into()));
        }
        if matches!(input.max_students, Some(m) if m <= 0) {
            return Err(CoreError::Validation("maxStudents must be positive".into()));
        }

        {
            let mut conn = self.lock_conn();
            let tx = conn.transaction()?;

            let current = tx
                .query_row(
                    "SELECT name, subject_id, teacher_id, classroom_id, schedule_id
                     FROM groups WHERE id = ?",
                    [id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, i64>(3)?,
                            row.get::<_, i64>(4)?,
                        ))
                    },
                )
                .optional()?;
            let Some((cur_name, cur_subject, cur_teacher, cur_classroom, cur_schedule)) = current
            else {
                return Err(CoreError::NotFound("Group not found".into()));
            };

            let scheduling_change = input.name.is_some()
                || input.subject_id.is_some()
                || input.teacher_id.is_some()
                || input.classroom_id.is_some()
                || input.schedule_id.is_some();

            let merged_name = input.name.clone().unwrap_or(cur_name);
            let proposal = Proposal {
                name: &merged_name,
                subject_id: input.subject_id.unwrap_or(cur_subject),
                teacher_id: input.teacher_id.unwrap_or(cur_teacher),
                classroom_id: input.classroom_id.unwrap_or(cur_classroom),
                schedule_id: input.schedule_id.unwrap_or(cur_schedule),
            };

            if scheduling_change {
                if let Some(conflict) = conflicts::check_conflicts(&tx, &proposal, Some(id))? {
                    return Err(conflict.into_error());
                }
            }

            let mut updates = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(name) = input.name {
                updates.push("name = ?");
                params.push(Box::new(name));
            }
            if let Some(career_id) = input.career_id {
                updates.push("career_id = ?");
                params.push(Box::new(career_id));
            }
            if let Some(subject_id) = input.subject_id {
                updates.push("subject_id = ?");
                params.push(Box::new(subject_id));
            }
            if let Some(teacher_id) = input.teacher_id {
                updates.push("teacher_id = ?");
                params.push(Box::new(teacher_id));
            }
            if let Some(classroom_id) = input.classroom_id {
                updates.push("classroom_id = ?");
                params.push(Box::new(classroom_id));
            }
            if let Some(schedule_id) = input.schedule_id {
                updates.push("schedule_id = ?");
                params.push(Box::new(schedule_id));
            }
            if let Some(semester) = input.semester {
                updates.push("semester = ?");
                params.push(Box::new(semester));
            }
            if let Some(max_students) = input.max_students {
                updates.push("max_students = ?");
                params.push(Box::new(max_students));
            }
            updates.push("updated_at = ?");
            params.push(Box::new(Utc::now().to_rfc3339()));
            params.push(Box::new(id));

            let sql = format!("UPDATE groups SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            match tx.execute(&sql, params_ref.as_slice()) {
                Ok(0) => return Err(CoreError::NotFound("Group not found".into())),
                Ok(_) => {}
                Err(e) => {
                    let err = CoreError::from(e);
                    if err.is_unique_violation() {
                        return Err(conflicts::race_conflict(&tx, &proposal, Some(id)));
                    }
                    return Err(err);
                }
            }

            if let Some(max_students) = input.max_students {
                rebalance::rebalance(&tx, id, max_students)?;
            }
            tx.commit()?;
        }

        self.get_group(id, None)?
            .ok_or_else(|| CoreError::NotFound("Group not found".into()))
    }

    /// Delete the roster and the group row in one transaction. Missing
    /// groups are detected from the group delete's affected-row count.
    pub fn delete_group(&self, id: i64) -> CoreResult<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM group_students WHERE group_id = ?", [id])?;
        let rows = tx.execute("DELETE FROM groups WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Group not found".into()));
        }
        tx.commit()?;
        tracing::info!(group_id = id, "Deleted group");
        Ok(())
    }
}

fn map_group(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        career_id: row.get(2)?,
        career_name: row.get(3)?,
        subject_id: row.get(4)?,
        subject_name: row.get(5)?,
        teacher_id: row.get(6)?,
        teacher_name: row.get(7)?,
        classroom_id: row.get(8)?,
        classroom_name: row.get(9)?,
        schedule_id: row.get(10)?,
        schedule_time: row.get(11)?,
        schedule_shift: row
            .get::<_, Option<String>>(12)?
            .as_deref()
            .and_then(Shift::from_str),
        semester: row.get(13)?,
        max_students: row.get(14)?,
        created_at: parse_datetime(row.get::<_, String>(15)?),
        updated_at: parse_datetime(row.get::<_, String>(16)?),
    })
}
