//! Domain models for the campus scheduling server.
//!
//! # Core Concepts
//!
//! ## Reference entities
//!
//! - [`Career`], [`Subject`], [`Classroom`], [`TimeSlot`], [`Teacher`],
//!   [`Student`]: catalog rows managed through plain CRUD. The scheduling
//!   core only ever reads them.
//!
//! ## Scheduling entities
//!
//! - [`Group`]: a scheduled section of a subject (one teacher, one room,
//!   one time slot, one semester) with a capacity-bounded roster.
//! - Enrollment (`group_students`): membership of a student in a group,
//!   created by the allocator at group creation and shrunk by the
//!   rebalancer when capacity drops.
//! - Subject registration (`student_subjects`): the pool of students
//!   wanting a subject, ordered by registration time. Input to allocation.

mod career;
mod classroom;
mod group;
mod schedule;
mod student;
mod subject;
mod teacher;

pub use career::*;
pub use classroom::*;
pub use group::*;
pub use schedule::*;
pub use student::*;
pub use subject::*;
pub use teacher::*;
