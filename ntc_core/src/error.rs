//! Failures of a timetable fetch.
//!
//! A failing weekday never aborts its siblings: it is captured as a [`DayError`]
//! and only surfaces through [`TimetableError::PartialFailure`] when a view cannot be built.

use std::{error::Error as StdError, fmt};

use chrono::Weekday;

use crate::model::weekday_index;

/// Why the class table of a single weekday could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayErrorKind {
    /// The request could not be sent or its body could not be read.
    Transport(String),
    /// The portal answered with a non-success status code.
    Status(u16),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The worker fetching the weekday panicked or was cancelled.
    Join(String),
}

impl From<reqwest::Error> for DayErrorKind {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return DayErrorKind::Timeout;
        }
        match err.status() {
            Some(status) => DayErrorKind::Status(status.as_u16()),
            None => DayErrorKind::Transport(err.to_string()),
        }
    }
}

impl fmt::Display for DayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayErrorKind::Transport(message) => write!(f, "transport error: {message}"),
            DayErrorKind::Status(status) => write!(f, "unexpected status code {status}"),
            DayErrorKind::Timeout => write!(f, "request timed out"),
            DayErrorKind::Join(message) => write!(f, "worker failed: {message}"),
        }
    }
}

/// A failed weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayError {
    pub weekday: Weekday,
    pub kind: DayErrorKind,
}

impl DayError {
    pub fn new(weekday: Weekday, kind: DayErrorKind) -> Self {
        Self { weekday, kind }
    }
}

impl fmt::Display for DayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weekday {} ({}): {}",
            weekday_index(self.weekday),
            self.weekday,
            self.kind
        )
    }
}

impl StdError for DayError {}

#[derive(Debug)]
pub enum TimetableError {
    /// The student identifier is empty or not purely numeric.
    InvalidStudentId(String),
    /// The HTTP client could not be set up.
    Client(reqwest::Error),
    /// Every period of every weekday is vacant: no such student, or no courses selected.
    UnknownStudent(String),
    /// At least one weekday failed while others returned classes.
    PartialFailure(Vec<DayError>),
}

impl fmt::Display for TimetableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimetableError::InvalidStudentId(student_id) => {
                write!(f, "invalid student id {student_id:?}, only digits are allowed")
            }
            TimetableError::Client(err) => write!(f, "unable to build http client: {err}"),
            TimetableError::UnknownStudent(student_id) => {
                write!(f, "student {student_id} does not exist or has no courses")
            }
            TimetableError::PartialFailure(errors) => {
                write!(f, "{} weekday(s) failed", errors.len())?;
                for error in errors {
                    write!(f, "; {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for TimetableError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TimetableError::Client(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TimetableError {
    fn from(err: reqwest::Error) -> Self {
        TimetableError::Client(err)
    }
}
