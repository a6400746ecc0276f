//! Scheduling value types shared by tasks and audio notes.
//!
//! # Responsibility
//! - Validate day-of-month keys and `HH:MM` times at construction.
//! - Define the category taxonomy and its display order.
//!
//! # Invariants
//! - `Day` is always within `1..=31`; month/year are not part of the key.
//! - `TaskTime` is always a valid 24-hour clock time.
//! - `Category::Quick` is the bucket for absent categories.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HH_MM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid time regex"));

/// Validation failures for scheduling and task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Day is outside `1..=31`.
    InvalidDay(u32),
    /// Time is not a strict `HH:MM` 24-hour value.
    InvalidTime(String),
    /// Name is blank and no audio note accompanies the task.
    EmptyName,
    /// Category label is not one of the known categories.
    UnknownCategory(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDay(value) => write!(f, "day must be within 1..=31, got {value}"),
            Self::InvalidTime(value) => write!(f, "time must be HH:MM (24h), got `{value}`"),
            Self::EmptyName => write!(f, "task name must not be empty without an audio note"),
            Self::UnknownCategory(value) => write!(f, "unknown task category `{value}`"),
        }
    }
}

impl Error for TaskValidationError {}

/// Day-of-month key for the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Day(u32);

impl Day {
    pub const FIRST: u32 = 1;
    pub const LAST: u32 = 31;

    pub fn new(value: u32) -> Result<Self, TaskValidationError> {
        if (Self::FIRST..=Self::LAST).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TaskValidationError::InvalidDay(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Day {
    type Error = TaskValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Day> for u32 {
    fn from(value: Day) -> Self {
        value.0
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional time-of-day for a task, serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTime {
    hour: u8,
    minute: u8,
}

impl TaskTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TaskValidationError> {
        if hour > 23 || minute > 59 {
            return Err(TaskValidationError::InvalidTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parses a strict two-digit `HH:MM` value.
    pub fn parse(value: &str) -> Result<Self, TaskValidationError> {
        let trimmed = value.trim();
        let caps = HH_MM_RE
            .captures(trimmed)
            .ok_or_else(|| TaskValidationError::InvalidTime(trimmed.to_string()))?;
        let hour = caps[1]
            .parse::<u8>()
            .map_err(|_| TaskValidationError::InvalidTime(trimmed.to_string()))?;
        let minute = caps[2]
            .parse::<u8>()
            .map_err(|_| TaskValidationError::InvalidTime(trimmed.to_string()))?;
        Self::new(hour, minute)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl Display for TaskTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TaskTime {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskTime> for String {
    fn from(value: TaskTime) -> Self {
        value.to_string()
    }
}

/// Task category. One record per task; category screens filter on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Shared quick-add bucket, also used when no category is given.
    #[default]
    Quick,
    Personal,
    Hobby,
    Work,
    Other,
}

impl Category {
    /// Section order of the unified day view.
    pub const DISPLAY_ORDER: [Category; 5] = [
        Category::Quick,
        Category::Hobby,
        Category::Personal,
        Category::Work,
        Category::Other,
    ];

    /// Resolves an optional external label. Absent or blank means `Quick`.
    pub fn from_label(label: Option<&str>) -> Result<Self, TaskValidationError> {
        let Some(raw) = label else {
            return Ok(Self::Quick);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "quick" => Ok(Self::Quick),
            "personal" => Ok(Self::Personal),
            "hobby" => Ok(Self::Hobby),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            _ => Err(TaskValidationError::UnknownCategory(raw.trim().to_string())),
        }
    }

    /// Stable lowercase label used for storage and FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Personal => "personal",
            Self::Hobby => "hobby",
            Self::Work => "work",
            Self::Other => "other",
        }
    }

    /// Header shown above this category's section in the day view.
    pub fn section_title(self) -> &'static str {
        match self {
            Self::Quick => "Quick Added Tasks",
            Self::Personal => "Personal Tasks",
            Self::Hobby => "Hobby Tasks",
            Self::Work => "Work Tasks",
            Self::Other => "Other Tasks",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
