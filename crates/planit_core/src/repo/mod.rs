//! Repository layer over the volatile registry store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from registry orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`TaskNotFound`,
//!   `AudioNoteNotFound`) in addition to DB transport errors.

pub mod task_repo;
