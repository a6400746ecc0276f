//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and audio file handling into registry APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod registry;
