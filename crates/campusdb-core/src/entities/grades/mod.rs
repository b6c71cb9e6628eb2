//! Grades entity.
//!
//! The most heavily indexed kind:
//!
//! 1. **student_id** secondary — a student's grade sheet.
//! 2. **course_id** secondary — a course's grade book.
//! 3. **(student_id, course_id)** compound — one grade per pair; the store
//!    probes it before create.
//! 4. **graded_at** recency — "most recently graded" feeds.

mod indexes;
mod model;
mod store;

pub use indexes::grades_binding;
pub use model::Grade;
pub use store::GradeStore;
