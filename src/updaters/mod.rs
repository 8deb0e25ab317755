pub mod gbis;
pub mod timetable;

use chrono::NaiveTime;
use reqwest::StatusCode;

/// Why a single upstream request produced no usable rows.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    BadStatus(StatusCode),
    #[error("failed to read response body: {0}")]
    BadBody(reqwest::Error),
    #[error("malformed csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed xml body: {0}")]
    Xml(#[from] serde_xml_rs::Error),
    #[error("bad departure time {0:?}")]
    BadTime(String),
    #[error(transparent)]
    Transport(reqwest::Error),
}

impl FetchError {
    pub fn from_request(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_body() || error.is_decode() {
            FetchError::BadBody(error)
        } else {
            FetchError::Transport(error)
        }
    }

    /// Transient errors degrade one source's contribution; anything else
    /// aborts the owning task.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::Transport(_))
    }
}

/// Upstream sources write times as `HH:MM:SS`, the GBIS API as `HH:MM`.
pub fn parse_departure_time(value: &str) -> Result<NaiveTime, FetchError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| FetchError::BadTime(value.to_string()))
}
