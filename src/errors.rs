//! Error kinds and their user-facing descriptions.

use std::fmt;

/// Placeholder task name substituted whenever name extraction or interning
/// fails. Every place that wants a name string that is guaranteed to exist
/// gets this one; at bottom all such failures are parsing problems.
pub const PARSE_ERROR_NAME: &str = "parsing error";

/// Error kinds surfaced by a trace load.
///
/// The discriminants double as the wire/error codes, so the order here must
/// match [`ERROR_STRINGS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum TraceError {
    NoError = 0,
    Internal = 1,
    ErrorError = 2,
    Parse = 3,
    NoSchedEvents = 4,
}

const NR_ERRORS: i32 = 5;

static ERROR_STRINGS: [&str; NR_ERRORS as usize] = [
    "No error has occurred.",
    "A serious internal error has occurred.",
    "An error in the error reporting has occurred.",
    "A parsing error has occurred.",
    "Could not find any scheduling events.",
];

impl TraceError {
    /// Map a raw error code to its kind. An out-of-range code clamps to
    /// [`TraceError::ErrorError`] rather than being rejected.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TraceError::NoError,
            1 => TraceError::Internal,
            2 => TraceError::ErrorError,
            3 => TraceError::Parse,
            4 => TraceError::NoSchedEvents,
            _ => TraceError::ErrorError,
        }
    }

    /// The description for this error kind.
    #[must_use]
    pub fn strerror(self) -> &'static str {
        ERROR_STRINGS[self as i32 as usize]
    }
}

/// Look up the description for a raw error code, clamping invalid codes.
pub fn strerror(code: i32) -> &'static str {
    TraceError::from_code(code).strerror()
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strerror())
    }
}

impl std::error::Error for TraceError {}
