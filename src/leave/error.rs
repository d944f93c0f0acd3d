use thiserror::Error;

/// Failure modes of the leave subsystem. All of these are recoverable at the
/// caller boundary; the HTTP layer maps them to `{status: false, message}`
/// bodies and never reports a partial write as success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaveError {
    /// Malformed input: empty reason, reversed date range, unknown status.
    #[error("{0}")]
    Validation(String),

    /// The requested day count exceeds what the employee has left.
    #[error("requested {requested} days but only {available} available")]
    InsufficientBalance { requested: u32, available: u32 },

    /// The principal's role or ownership does not allow the action.
    #[error("{0}")]
    Authorization(&'static str),

    /// Decide attempted on a request that already reached a terminal state.
    #[error("leave request already decided")]
    AlreadyDecided,

    /// Unknown employee, balance, or request id.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The persistence backend failed mid-operation. The paired writes are
    /// transactional, so nothing partial became visible.
    #[error("storage failure: {0}")]
    Store(String),
}

impl From<sqlx::Error> for LeaveError {
    fn from(err: sqlx::Error) -> Self {
        LeaveError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::LeaveError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LeaveError::Validation("reason must not be empty".into()).to_string(),
            "reason must not be empty"
        );
        assert_eq!(
            LeaveError::InsufficientBalance {
                requested: 5,
                available: 2
            }
            .to_string(),
            "requested 5 days but only 2 available"
        );
        assert_eq!(
            LeaveError::AlreadyDecided.to_string(),
            "leave request already decided"
        );
        assert_eq!(
            LeaveError::NotFound("leave request").to_string(),
            "leave request not found"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LeaveError::AlreadyDecided;
        assert_eq!(error.clone(), error);
    }
}
