use crate::model::AttendanceFeed;

/// Common error type for feed retrieval, projection and filter actions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendError {
    #[error("feed request failed: {0}")]
    Fetch(String),
    #[error("feed responded with status {0}")]
    Status(u16),
    #[error("feed body is not valid attendance JSON: {0}")]
    Parse(String),
    #[error("unparseable timestamp `{value}`")]
    DateParse { value: String },
    #[error("invalid filter: {0}")]
    Validation(String),
    #[error("feed file unavailable: {0}")]
    Io(String),
}

impl AttendError {
    /// Fetch and parse failures are reported in place of the table.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            AttendError::Fetch(_) | AttendError::Status(_) | AttendError::Parse(_) | AttendError::Io(_)
        )
    }
}

impl From<serde_json::Error> for AttendError {
    fn from(err: serde_json::Error) -> Self {
        AttendError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AttendError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AttendError::Status(status.as_u16()),
            None => AttendError::Fetch(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AttendError {
    fn from(err: std::io::Error) -> Self {
        AttendError::Io(err.to_string())
    }
}

pub type AttendResult<T> = Result<T, AttendError>;

/// A read-only pass over one feed snapshot.
pub trait Projection {
    type Output;

    fn project(&self, feed: &AttendanceFeed) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_map_to_parse_failures() {
        let err: AttendError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, AttendError::Parse(_)));
        assert!(err.is_feed_failure());
    }

    #[test]
    fn validation_is_not_a_feed_failure() {
        let err = AttendError::Validation("no date selected".into());
        assert!(!err.is_feed_failure());
        assert_eq!(err.to_string(), "invalid filter: no date selected");
    }
}
