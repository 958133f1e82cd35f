//! Pre-write conflict detection for group assignments.
//!
//! The checks run in a fixed priority order (duplicate section name,
//! then teacher, then classroom) so the reported conflict is
//! deterministic even when several rules are violated at once. The
//! storage-level unique indexes remain the authoritative guard; this
//! check exists to produce a readable error before the write is
//! attempted.

use rusqlite::{Connection, OptionalExtension};

use crate::db::row_exists;
use crate::error::{CoreError, CoreResult};

/// The scheduling-relevant fields of a group create or update.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Proposal<'a> {
    pub name: &'a str,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub classroom_id: i64,
    pub schedule_id: i64,
}

/// A scheduling collision, carrying the display name needed for the
/// user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    DuplicateName { name: String },
    TeacherBusy { teacher: String },
    ClassroomBusy { classroom: String },
}

impl Conflict {
    pub fn into_error(self) -> CoreError {
        CoreError::Conflict(match self {
            Self::DuplicateName { name } => {
                format!("A group named '{name}' already exists for this subject")
            }
            Self::TeacherBusy { teacher } => {
                format!("Teacher {teacher} already has a group in this time slot")
            }
            Self::ClassroomBusy { classroom } => {
                format!("Classroom {classroom} is already occupied in this time slot")
            }
        })
    }
}

/// Run the three existence checks against existing groups, excluding
/// `exclude_group_id` when updating. Returns the first conflict found.
/// Pure read; no side effects.
pub(crate) fn check_conflicts(
    conn: &Connection,
    proposal: &Proposal<'_>,
    exclude_group_id: Option<i64>,
) -> CoreResult<Option<Conflict>> {
    let exclude = exclude_group_id.unwrap_or(-1);

    if row_exists(
        conn,
        "SELECT id FROM groups WHERE name = ? AND subject_id = ? AND id <> ?",
        (proposal.name, proposal.subject_id, exclude),
    )? {
        return Ok(Some(Conflict::DuplicateName {
            name: proposal.name.to_string(),
        }));
    }

    if row_exists(
        conn,
        "SELECT id FROM groups WHERE teacher_id = ? AND schedule_id = ? AND id <> ?",
        (proposal.teacher_id, proposal.schedule_id, exclude),
    )? {
        return Ok(Some(Conflict::TeacherBusy {
            teacher: teacher_name(conn, proposal.teacher_id)?,
        }));
    }

    if row_exists(
        conn,
        "SELECT id FROM groups WHERE classroom_id = ? AND schedule_id = ? AND id <> ?",
        (proposal.classroom_id, proposal.schedule_id, exclude),
    )? {
        return Ok(Some(Conflict::ClassroomBusy {
            classroom: classroom_name(conn, proposal.classroom_id)?,
        }));
    }

    Ok(None)
}

/// Translate a unique-constraint violation raised by the group insert or
/// update into the conflict the pre-write check would have reported.
/// Used when a concurrent writer won the race between check and write.
pub(crate) fn race_conflict(
    conn: &Connection,
    proposal: &Proposal<'_>,
    exclude_group_id: Option<i64>,
) -> CoreError {
    match check_conflicts(conn, proposal, exclude_group_id) {
        Ok(Some(conflict)) => conflict.into_error(),
        _ => CoreError::Conflict("The group conflicts with an existing group".into()),
    }
}

fn teacher_name(conn: &Connection, id: i64) -> CoreResult<String> {
    let name: Option<String> = conn
        .query_row("SELECT name FROM teachers WHERE id = ?", [id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(name.unwrap_or_else(|| format!("#{id}")))
}

fn classroom_name(conn: &Connection, id: i64) -> CoreResult<String> {
    let name: Option<String> = conn
        .query_row("SELECT name FROM classrooms WHERE id = ?", [id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(name.unwrap_or_else(|| format!("#{id}")))
}
