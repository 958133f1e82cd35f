//! Roster shrinking after a capacity reduction.

use rusqlite::Connection;

use crate::error::{CoreError, CoreResult};

/// Evict the most recently enrolled students until the roster fits
/// `new_capacity`. Students who have been enrolled longest keep their
/// place. No-op when the roster already fits.
///
/// Rows sharing an enrollment timestamp (a single allocation stamps the
/// whole batch at once) are broken by rowid, i.e. insertion order, so
/// eviction is deterministic.
pub(crate) fn rebalance(conn: &Connection, group_id: i64, new_capacity: i64) -> CoreResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM group_students WHERE group_id = ?",
        [group_id],
        |row| row.get(0),
    )?;
    if count <= new_capacity {
        return Ok(0);
    }

    let overflow = count - new_capacity;
    let deleted = conn.execute(
        "DELETE FROM group_students
         WHERE rowid IN (
             SELECT rowid FROM group_students
             WHERE group_id = ?1
             ORDER BY enrolled_at DESC, rowid DESC
             LIMIT ?2
         )",
        (group_id, overflow),
    )?;

    if deleted as i64 != overflow {
        return Err(CoreError::Conflict(
            "The roster changed while rebalancing; retry the capacity update".into(),
        ));
    }

    tracing::debug!(group_id, evicted = deleted, "Rebalanced group roster");
    Ok(deleted)
}
