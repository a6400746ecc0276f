//! Non-fatal outcomes surfaced to registry callers.
//!
//! # Invariants
//! - A warning never aborts the registry operation that produced it.
//! - Every warning is also logged at `warn` level where it is raised.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Recoverable resource failure reported alongside a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryWarning {
    /// The temporary clip could not be renamed; the note keeps `from`.
    ResourceMoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
    /// The backing clip could not be removed; the registry entry is gone.
    ResourceDeletionFailed { path: PathBuf, reason: String },
}

impl Display for RegistryWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceMoveFailed { from, to, reason } => write!(
                f,
                "could not move audio `{}` to `{}`: {reason}",
                from.display(),
                to.display()
            ),
            Self::ResourceDeletionFailed { path, reason } => {
                write!(f, "could not delete audio `{}`: {reason}", path.display())
            }
        }
    }
}
