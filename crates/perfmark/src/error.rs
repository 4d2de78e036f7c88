//! Misuse errors raised by the measurement lifecycle.

use thiserror::Error;

/// Out-of-order or conflicting calls against a [`MeasurementTracker`](crate::MeasurementTracker).
///
/// Every variant describes a programming error at a measurement site. Nothing
/// here is retried or recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// `start`/`stop` for an identifier that was never prepared
    #[error("unrecognized identifier `{0}`: call prepare_to_measure first")]
    UnrecognizedIdentifier(String),

    /// `start` on an identifier that is not in the prepared state
    #[error("identifier `{0}` is not prepared")]
    NotPrepared(String),

    /// `stop` on an identifier that is not being measured
    #[error("identifier `{0}` was not started")]
    NotStarted(String),

    /// `stop` for a different identifier than the open one
    #[error("cannot stop `{found}` while `{expected}` is being measured")]
    IdentifierMismatch { expected: String, found: String },

    /// A second measurement was opened while another is in flight
    #[error("cannot measure `{requested}` while `{active}` is being measured")]
    MeasurementAlreadyActive { active: String, requested: String },

    /// Structural violation of the call protocol
    #[error("misuse of identifier `{identifier}`: {reason}")]
    Misuse {
        identifier: String,
        reason: &'static str,
    },
}

impl MeasureError {
    /// Identifier the failing call was made with.
    pub fn identifier(&self) -> &str {
        match self {
            MeasureError::UnrecognizedIdentifier(id)
            | MeasureError::NotPrepared(id)
            | MeasureError::NotStarted(id) => id,
            MeasureError::IdentifierMismatch { found, .. } => found,
            MeasureError::MeasurementAlreadyActive { requested, .. } => requested,
            MeasureError::Misuse { identifier, .. } => identifier,
        }
    }
}

pub type Result<T> = std::result::Result<T, MeasureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeasureError::NotStarted("AppLaunch".to_string());
        assert_eq!(err.to_string(), "identifier `AppLaunch` was not started");

        let err = MeasureError::MeasurementAlreadyActive {
            active: "A".to_string(),
            requested: "B".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot measure `B` while `A` is being measured"
        );
    }

    #[test]
    fn test_error_identifier() {
        let err = MeasureError::IdentifierMismatch {
            expected: "A".to_string(),
            found: "B".to_string(),
        };
        assert_eq!(err.identifier(), "B");

        let err = MeasureError::Misuse {
            identifier: "C".to_string(),
            reason: "already measured",
        };
        assert_eq!(err.identifier(), "C");
    }
}
