//! Domain model for the day-indexed task registry.
//!
//! # Responsibility
//! - Define the task and audio-note records and their value types.
//! - Keep one record per task; category screens are projections over it.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Every record belongs to exactly one `Day`.

pub mod audio_note;
pub mod schedule;
pub mod task;
