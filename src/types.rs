use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ---------- Error Types ----------
//
#[derive(Debug, Error)]
pub enum WebbotError {
    #[error("WebDriver connection failed: {0}")]
    ConnectionError(String),

    #[error("Browser operation failed: {0}")]
    OperationError(String),

    #[error("Program shape invalid: {0}")]
    ProgramShapeError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

//
// ---------- Action Model ----------
//
/// One atomic automation intent parsed from a task clause.
///
/// Tagged variants rather than a kind/target/value triple so that the step
/// interpreter dispatches on the type system instead of string comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    /// Navigate to a URL.
    Open { url: String },
    /// Click the element best matching the target descriptor.
    Click { target: String },
    /// Clear and fill a field with a value.
    Type { target: Option<String>, value: String },
    /// Choose a dropdown option by visible text.
    Select { target: Option<String>, option: String },
    /// Enter a date string into a date field.
    PickDate {
        target: Option<String>,
        value: Option<String>,
    },
    /// Sleep for a fixed number of seconds.
    Wait { seconds: u64 },
    /// Submit the first form on the page.
    Submit,
    /// Clause that matched no trigger phrase and no fallback heuristic.
    Unknown { text: String },
}

impl Action {
    pub fn is_open(&self) -> bool {
        matches!(self, Action::Open { .. })
    }
}

//
// ---------- Cache Types ----------
//
/// A persisted mapping from task text to a synthesized program plus its
/// reuse statistics. One row per unique task text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub task_text: String,
    pub program_location: String,
    pub program_text: String,
    pub last_used: String,
    pub success_count: i64,
    pub fail_count: i64,
}
