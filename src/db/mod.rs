mod schema;
pub mod seed;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};

use crate::error::{CoreError, CoreResult};
use crate::models::*;

/// Handle to the catalog store. Cheap to clone; all clones share one
/// serialized SQLite connection, so no in-process state survives a
/// request beyond what the database holds.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "campus")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("campus.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    pub(crate) fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Career operations
    // ============================================================

    pub fn get_all_careers(&self) -> CoreResult<Vec<Career>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, semesters, created_at, updated_at FROM careers ORDER BY name",
        )?;

        let careers = stmt
            .query_map([], map_career)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(careers)
    }

    pub fn get_career(&self, id: i64) -> CoreResult<Option<Career>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, semesters, created_at, updated_at FROM careers WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_career(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_career(&self, input: CreateCareerInput) -> CoreResult<Career> {
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        if input.semesters <= 0 {
            return Err(CoreError::Validation("semesters must be positive".into()));
        }

        let conn = self.lock_conn();
        if row_exists(&conn, "SELECT id FROM careers WHERE name = ?", (&input.name,))? {
            return Err(CoreError::Conflict(format!(
                "A career named '{}' already exists",
                input.name
            )));
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO careers (name, semesters, created_at, updated_at) VALUES (?, ?, ?, ?)",
            (&input.name, input.semesters, now.to_rfc3339(), now.to_rfc3339()),
        )?;

        Ok(Career {
            id: conn.last_insert_rowid(),
            name: input.name,
            semesters: input.semesters,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_career(&self, id: i64, input: UpdateCareerInput) -> CoreResult<Career> {
        if input.name.is_none() && input.semesters.is_none() {
            return Err(CoreError::Validation("no fields to update".into()));
        }
        if let Some(semesters) = input.semesters {
            if semesters <= 0 {
                return Err(CoreError::Validation("semesters must be positive".into()));
            }
        }

        {
            let conn = self.lock_conn();
            if let Some(name) = &input.name {
                if row_exists(
                    &conn,
                    "SELECT id FROM careers WHERE name = ? AND id <> ?",
                    (name, id),
                )? {
                    return Err(CoreError::Conflict(format!(
                        "A career named '{name}' already exists"
                    )));
                }
            }

            let mut updates = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(name) = input.name {
                updates.push("name = ?");
                params.push(Box::new(name));
            }
            if let Some(semesters) = input.semesters {
                updates.push("semesters = ?");
                params.push(Box::new(semesters));
            }
            updates.push("updated_at = ?");
            params.push(Box::new(Utc::now().to_rfc3339()));
            params.push(Box::new(id));

            let sql = format!("UPDATE careers SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn.execute(&sql, params_ref.as_slice())?;
            if rows == 0 {
                return Err(CoreError::NotFound("Career not found".into()));
            }
        }

        self.get_career(id)?
            .ok_or_else(|| CoreError::NotFound("Career not found".into()))
    }

    pub fn delete_career(&self, id: i64) -> CoreResult<()> {
        let conn = self.lock_conn();
        let dependents: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM subjects WHERE career_id = ?1)
                  + (SELECT COUNT(*) FROM students WHERE career_id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if dependents > 0 {
            return Err(CoreError::Dependency(
                "The career cannot be deleted because it has subjects or students attached".into(),
            ));
        }

        let rows = conn.execute("DELETE FROM careers WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Career not found".into()));
        }
        Ok(())
    }

    // ============================================================
    // Subject operations
    // ============================================================

    pub fn get_all_subjects(&self) -> CoreResult<Vec<Subject>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.credits, s.semester, s.career_id, c.name,
                    s.created_at, s.updated_at
             FROM subjects s
             LEFT JOIN careers c ON c.id = s.career_id
             ORDER BY s.name",
        )?;

        let subjects = stmt
            .query_map([], map_subject)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subjects)
    }

    pub fn get_subject(&self, id: i64) -> CoreResult<Option<Subject>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.credits, s.semester, s.career_id, c.name,
                    s.created_at, s.updated_at
             FROM subjects s
             LEFT JOIN careers c ON c.id = s.career_id
             WHERE s.id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_subject(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_subject(&self, input: CreateSubjectInput) -> CoreResult<Subject> {
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        if input.semester <= 0 {
            return Err(CoreError::Validation("semester must be positive".into()));
        }

        let id = {
            let conn = self.lock_conn();
            if !row_exists(&conn, "SELECT id FROM careers WHERE id = ?", (input.career_id,))? {
                return Err(CoreError::Validation(
                    "The selected career does not exist".into(),
                ));
            }
            if row_exists(
                &conn,
                "SELECT id FROM subjects WHERE name = ? AND career_id = ?",
                (&input.name, input.career_id),
            )? {
                return Err(CoreError::Conflict(format!(
                    "The subject '{}' already exists in the selected career",
                    input.name
                )));
            }

            let now = Utc::now();
            conn.execute(
                "INSERT INTO subjects (name, credits, semester, career_id, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    &input.name,
                    input.credits,
                    input.semester,
                    input.career_id,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ),
            )?;
            conn.last_insert_rowid()
        };

        self.get_subject(id)?
            .ok_or_else(|| CoreError::NotFound("Subject not found".into()))
    }

    pub fn update_subject(&self, id: i64, input: UpdateSubjectInput) -> CoreResult<Subject> {
        if input.name.is_none()
            && input.credits.is_none()
            && input.semester.is_none()
            && input.career_id.is_none()
        {
            return Err(CoreError::Validation("no fields to update".into()));
        }

        {
            let conn = self.lock_conn();
            if let (Some(name), Some(career_id)) = (&input.name, input.career_id) {
                if row_exists(
                    &conn,
                    "SELECT id FROM subjects WHERE name = ? AND career_id = ? AND id <> ?",
                    (name, career_id, id),
                )? {
                    return Err(CoreError::Conflict(format!(
                        "The subject '{name}' already exists in the selected career"
                    )));
                }
            }

            let mut updates = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(name) = input.name {
                updates.push("name = ?");
                params.push(Box::new(name));
            }
            if let Some(credits) = input.credits {
                updates.push("credits = ?");
                params.push(Box::new(credits));
            }
            if let Some(semester) = input.semester {
                updates.push("semester = ?");
                params.push(Box::new(semester));
            }
            if let Some(career_id) = input.career_id {
                updates.push("career_id = ?");
                params.push(Box::new(career_id));
            }
            updates.push("updated_at = ?");
            params.push(Box::new(Utc::now().to_rfc3339()));
            params.push(Box::new(id));

            let sql = format!("UPDATE subjects SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn.execute(&sql, params_ref.as_slice())?;
            if rows == 0 {
                return Err(CoreError::NotFound("Subject not found".into()));
            }
        }

        self.get_subject(id)?
            .ok_or_else(|| CoreError::NotFound("Subject not found".into()))
    }

    pub fn delete_subject(&self, id: i64) -> CoreResult<()> {
        let conn = self.lock_conn();
        let dependents: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM student_subjects WHERE subject_id = ?1)
                  + (SELECT COUNT(*) FROM groups WHERE subject_id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if dependents > 0 {
            return Err(CoreError::Dependency(
                "The subject cannot be deleted because it has registrations or groups attached"
                    .into(),
            ));
        }

        let rows = conn.execute("DELETE FROM subjects WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Subject not found".into()));
        }
        Ok(())
    }

    // ============================================================
    // Classroom operations
    // ============================================================

    pub fn get_all_classrooms(&self) -> CoreResult<Vec<Classroom>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, building, created_at, updated_at FROM classrooms ORDER BY name",
        )?;

        let classrooms = stmt
            .query_map([], map_classroom)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(classrooms)
    }

    pub fn get_classroom(&self, id: i64) -> CoreResult<Option<Classroom>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, building, created_at, updated_at FROM classrooms WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_classroom(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_classroom(&self, input: CreateClassroomInput) -> CoreResult<Classroom> {
        if input.name.trim().is_empty() || input.building.trim().is_empty() {
            return Err(CoreError::Validation("name and building are required".into()));
        }

        let conn = self.lock_conn();
        if row_exists(&conn, "SELECT id FROM classrooms WHERE name = ?", (&input.name,))? {
            return Err(CoreError::Conflict(format!(
                "A classroom named '{}' already exists",
                input.name
            )));
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO classrooms (name, building, created_at, updated_at) VALUES (?, ?, ?, ?)",
            (&input.name, &input.building, now.to_rfc3339(), now.to_rfc3339()),
        )?;

        Ok(Classroom {
            id: conn.last_insert_rowid(),
            name: input.name,
            building: input.building,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_classroom(&self, id: i64, input: UpdateClassroomInput) -> CoreResult<Classroom> {
        if input.name.is_none() && input.building.is_none() {
            return Err(CoreError::Validation("no fields to update".into()));
        }

        {
            let conn = self.lock_conn();
            if let Some(name) = &input.name {
                if row_exists(
                    &conn,
                    "SELECT id FROM classrooms WHERE name = ? AND id <> ?",
                    (name, id),
                )? {
                    return Err(CoreError::Conflict(format!(
                        "A classroom named '{name}' already exists"
                    )));
                }
            }

            let mut updates = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(name) = input.name {
                updates.push("name = ?");
                params.push(Box::new(name));
            }
            if let Some(building) = input.building {
                updates.push("building = ?");
                params.push(Box::new(building));
            }
            updates.push("updated_at = ?");
            params.push(Box::new(Utc::now().to_rfc3339()));
            params.push(Box::new(id));

            let sql = format!("UPDATE classrooms SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn.execute(&sql, params_ref.as_slice())?;
            if rows == 0 {
                return Err(CoreError::NotFound("Classroom not found".into()));
            }
        }

        self.get_classroom(id)?
            .ok_or_else(|| CoreError::NotFound("Classroom not found".into()))
    }

    pub fn delete_classroom(&self, id: i64) -> CoreResult<()> {
        let conn = self.lock_conn();
        if row_exists(&conn, "SELECT id FROM groups WHERE classroom_id = ?", (id,))? {
            return Err(CoreError::Dependency(
                "The classroom has groups assigned".into(),
            ));
        }

        let rows = conn.execute("DELETE FROM classrooms WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Classroom not found".into()));
        }
        Ok(())
    }

    // ============================================================
    // Time slot operations
    // ============================================================

    pub fn get_all_time_slots(&self) -> CoreResult<Vec<TimeSlot>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, time, shift, created_at, updated_at FROM schedules ORDER BY time",
        )?;

        let slots = stmt
            .query_map([], map_time_slot)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(slots)
    }

    pub fn get_time_slot(&self, id: i64) -> CoreResult<Option<TimeSlot>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, time, shift, created_at, updated_at FROM schedules WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_time_slot(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_time_slot(&self, input: CreateTimeSlotInput) -> CoreResult<TimeSlot> {
        if input.time.trim().is_empty() {
            return Err(CoreError::Validation("time is required".into()));
        }

        let shift = input.shift.unwrap_or_else(|| Shift::infer(&input.time));

        let conn = self.lock_conn();
        if row_exists(&conn, "SELECT id FROM schedules WHERE time = ?", (&input.time,))? {
            return Err(CoreError::Conflict(format!(
                "The time {} is already registered",
                input.time
            )));
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO schedules (time, shift, created_at, updated_at) VALUES (?, ?, ?, ?)",
            (&input.time, shift.as_str(), now.to_rfc3339(), now.to_rfc3339()),
        )?;

        Ok(TimeSlot {
            id: conn.last_insert_rowid(),
            time: input.time,
            shift,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_time_slot(&self, id: i64, input: UpdateTimeSlotInput) -> CoreResult<TimeSlot> {
        if input.time.is_none() && input.shift.is_none() {
            return Err(CoreError::Validation("no fields to update".into()));
        }

        {
            let conn = self.lock_conn();
            if let Some(time) = &input.time {
                if row_exists(
                    &conn,
                    "SELECT id FROM schedules WHERE time = ? AND id <> ?",
                    (time, id),
                )? {
                    return Err(CoreError::Conflict(format!(
                        "The time {time} is already registered"
                    )));
                }
            }

            let mut updates = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(time) = input.time {
                updates.push("time = ?");
                params.push(Box::new(time));
            }
            if let Some(shift) = input.shift {
                updates.push("shift = ?");
                params.push(Box::new(shift.as_str().to_string()));
            }
            updates.push("updated_at = ?");
            params.push(Box::new(Utc::now().to_rfc3339()));
            params.push(Box::new(id));

            let sql = format!("UPDATE schedules SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn.execute(&sql, params_ref.as_slice())?;
            if rows == 0 {
                return Err(CoreError::NotFound("Time slot not found".into()));
            }
        }

        self.get_time_slot(id)?
            .ok_or_else(|| CoreError::NotFound("Time slot not found".into()))
    }

    pub fn delete_time_slot(&self, id: i64) -> CoreResult<()> {
        let conn = self.lock_conn();
        if row_exists(&conn, "SELECT id FROM groups WHERE schedule_id = ?", (id,))? {
            return Err(CoreError::Dependency(
                "The time slot has groups assigned".into(),
            ));
        }

        let rows = conn.execute("DELETE FROM schedules WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Time slot not found".into()));
        }
        Ok(())
    }

    // ============================================================
    // Teacher operations
    // ============================================================

    pub fn get_all_teachers(&self) -> CoreResult<Vec<Teacher>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, degree, created_at, updated_at FROM teachers ORDER BY name",
        )?;

        let teachers = stmt
            .query_map([], map_teacher)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(teachers)
    }

    pub fn get_teacher(&self, id: i64) -> CoreResult<Option<Teacher>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, degree, created_at, updated_at FROM teachers WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_teacher(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_teacher(&self, input: CreateTeacherInput) -> CoreResult<Teacher> {
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }

        let conn = self.lock_conn();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO teachers (name, degree, created_at, updated_at) VALUES (?, ?, ?, ?)",
            (&input.name, input.degree.as_str(), now.to_rfc3339(), now.to_rfc3339()),
        )?;

        Ok(Teacher {
            id: conn.last_insert_rowid(),
            name: input.name,
            degree: input.degree,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_teacher(&self, id: i64, input: UpdateTeacherInput) -> CoreResult<Teacher> {
        if input.name.is_none() && input.degree.is_none() {
            return Err(CoreError::Validation("no fields to update".into()));
        }

        {
            let conn = self.lock_conn();
            let mut updates = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(name) = input.name {
                updates.push("name = ?");
                params.push(Box::new(name));
            }
            if let Some(degree) = input.degree {
                updates.push("degree = ?");
                params.push(Box::new(degree.as_str().to_string()));
            }
            updates.push("updated_at = ?");
            params.push(Box::new(Utc::now().to_rfc3339()));
            params.push(Box::new(id));

            let sql = format!("UPDATE teachers SET {} WHERE id = ?", updates.join(", "));
            let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn.execute(&sql, params_ref.as_slice())?;
            if rows == 0 {
                return Err(CoreError::NotFound("Teacher not found".into()));
            }
        }

        self.get_teacher(id)?
            .ok_or_else(|| CoreError::NotFound("Teacher not found".into()))
    }

    pub fn delete_teacher(&self, id: i64) -> CoreResult<()> {
        let conn = self.lock_conn();
        if row_exists(&conn, "SELECT id FROM groups WHERE teacher_id = ?", (id,))? {
            return Err(CoreError::Dependency(
                "The teacher has groups assigned".into(),
            ));
        }

        let rows = conn.execute("DELETE FROM teachers WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Teacher not found".into()));
        }
        Ok(())
    }

    // ============================================================
    // Student operations
    // ============================================================

    pub fn get_all_students(&self) -> CoreResult<Vec<Student>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.email, s.status, s.date_of_birth, s.career_id, c.name,
                    s.created_at, s.updated_at
             FROM students s
             LEFT JOIN careers c ON c.id = s.career_id
             ORDER BY s.id DESC",
        )?;

        let students = stmt
            .query_map([], map_student)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }

    pub fn get_student(&self, id: i64) -> CoreResult<Option<StudentDetail>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.email, s.status, s.date_of_birth, s.career_id, c.name,
                    s.created_at, s.updated_at
             FROM students s
             LEFT JOIN careers c ON c.id = s.career_id
             WHERE s.id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        let student = match rows.next()? {
            Some(row) => map_student(row)?,
            None => return Ok(None),
        };
        drop(rows);
        drop(stmt);

        let mut stmt = conn.prepare(
            "SELECT ss.subject_id, sub.name, sub.semester, sub.credits, sub.career_id,
                    ss.registered_at
             FROM student_subjects ss
             JOIN subjects sub ON sub.id = ss.subject_id
             WHERE ss.student_id = ?
             ORDER BY ss.registered_at",
        )?;

        let subjects = stmt
            .query_map([id], |row| {
                Ok(RegisteredSubject {
                    subject_id: row.get(0)?,
                    name: row.get(1)?,
                    semester: row.get(2)?,
                    credits: row.get(3)?,
                    career_id: row.get(4)?,
                    registered_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(StudentDetail { student, subjects }))
    }

    pub fn create_student(&self, input: CreateStudentInput) -> CoreResult<StudentDetail> {
        if input.name.trim().is_empty() || input.email.trim().is_empty() {
            return Err(CoreError::Validation("name and email are required".into()));
        }

        let id = {
            let mut conn = self.lock_conn();
            if row_exists(&conn, "SELECT id FROM students WHERE email = ?", (&input.email,))? {
                return Err(CoreError::Conflict(format!(
                    "A student with email '{}' already exists",
                    input.email
                )));
            }

            let tx = conn.transaction()?;
            let now = Utc::now();
            tx.execute(
                "INSERT INTO students (name, email, status, date_of_birth, career_id, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    &input.name,
                    &input.email,
                    input.status.as_str(),
                    &input.date_of_birth,
                    input.career_id,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ),
            )?;
            let id = tx.last_insert_rowid();
            replace_registrations(&tx, id, &input.subjects)?;
            tx.commit()?;
            id
        };

        self.get_student(id)?
            .ok_or_else(|| CoreError::NotFound("Student not found".into()))
    }

    pub fn update_student(&self, id: i64, input: UpdateStudentInput) -> CoreResult<StudentDetail> {
        let has_field_update = input.name.is_some()
            || input.email.is_some()
            || input.status.is_some()
            || input.date_of_birth.is_some()
            || input.career_id.is_some();
        if !has_field_update && input.subjects.is_none() {
            return Err(CoreError::Validation("no fields to update".into()));
        }

        {
            let mut conn = self.lock_conn();
            if let Some(email) = &input.email {
                if row_exists(
                    &conn,
                    "SELECT id FROM students WHERE email = ? AND id <> ?",
                    (email, id),
                )? {
                    return Err(CoreError::Conflict(format!(
                        "A student with email '{email}' already exists"
                    )));
                }
            }

            let tx = conn.transaction()?;
            if has_field_update {
                let mut updates = Vec::new();
                let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
                if let Some(name) = input.name {
                    updates.push("name = ?");
                    params.push(Box::new(name));
                }
                if let Some(email) = input.email {
                    updates.push("email = ?");
                    params.push(Box::new(email));
                }
                if let Some(status) = input.status {
                    updates.push("status = ?");
                    params.push(Box::new(status.as_str().to_string()));
                }
                if let Some(date_of_birth) = input.date_of_birth {
                    updates.push("date_of_birth = ?");
                    params.push(Box::new(date_of_birth));
                }
                if let Some(career_id) = input.career_id {
                    updates.push("career_id = ?");
                    params.push(Box::new(career_id));
                }
                updates.push("updated_at = ?");
                params.push(Box::new(Utc::now().to_rfc3339()));
                params.push(Box::new(id));

                let sql = format!("UPDATE students SET {} WHERE id = ?", updates.join(", "));
                let params_ref: Vec<&dyn rusqlite::ToSql> =
                    params.iter().map(|p| p.as_ref()).collect();
                let rows = tx.execute(&sql, params_ref.as_slice())?;
                if rows == 0 {
                    return Err(CoreError::NotFound("Student not found".into()));
                }
            } else if !row_exists(&tx, "SELECT id FROM students WHERE id = ?", (id,))? {
                return Err(CoreError::NotFound("Student not found".into()));
            }

            if let Some(subjects) = &input.subjects {
                tx.execute("DELETE FROM student_subjects WHERE student_id = ?", [id])?;
                replace_registrations(&tx, id, subjects)?;
            }
            tx.commit()?;
        }

        self.get_student(id)?
            .ok_or_else(|| CoreError::NotFound("Student not found".into()))
    }

    pub fn delete_student(&self, id: i64) -> CoreResult<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM student_subjects WHERE student_id = ?", [id])?;
        tx.execute("DELETE FROM group_students WHERE student_id = ?", [id])?;
        let rows = tx.execute("DELETE FROM students WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(CoreError::NotFound("Student not found".into()));
        }
        tx.commit()?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Row mapping
// ============================================================

fn map_career(row: &Row<'_>) -> rusqlite::Result<Career> {
    Ok(Career {
        id: row.get(0)?,
        name: row.get(1)?,
        semesters: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
        updated_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn map_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        credits: row.get(2)?,
        semester: row.get(3)?,
        career_id: row.get(4)?,
        career_name: row.get(5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn map_classroom(row: &Row<'_>) -> rusqlite::Result<Classroom> {
    Ok(Classroom {
        id: row.get(0)?,
        name: row.get(1)?,
        building: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
        updated_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn map_time_slot(row: &Row<'_>) -> rusqlite::Result<TimeSlot> {
    Ok(TimeSlot {
        id: row.get(0)?,
        time: row.get(1)?,
        shift: Shift::from_str(&row.get::<_, String>(2)?).unwrap_or(Shift::Morning),
        created_at: parse_datetime(row.get::<_, String>(3)?),
        updated_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn map_teacher(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        degree: Degree::from_str(&row.get::<_, String>(2)?).unwrap_or(Degree::Bachelor),
        created_at: parse_datetime(row.get::<_, String>(3)?),
        updated_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn map_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        status: StudentStatus::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(StudentStatus::Active),
        date_of_birth: row.get(4)?,
        career_id: row.get(5)?,
        career_name: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

pub(crate) fn row_exists<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(sql)?;
    stmt.exists(params)
}

/// Replace a student's registration rows. Registration times are stamped
/// per row so the allocation priority order follows the submitted order.
fn replace_registrations(
    conn: &Connection,
    student_id: i64,
    subject_ids: &[i64],
) -> rusqlite::Result<()> {
    let mut seen = std::collections::HashSet::new();
    for subject_id in subject_ids {
        if !seen.insert(*subject_id) {
            continue;
        }
        conn.execute(
            "INSERT INTO student_subjects (student_id, subject_id, registered_at) VALUES (?, ?, ?)",
            (student_id, subject_id, Utc::now().to_rfc3339()),
        )?;
    }
    Ok(())
}

pub(crate) fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
