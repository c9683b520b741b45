//! Error types for the pilot pay engine.
//!
//! File-level failures (configuration, reference data, roster input, export)
//! abort an operation and are returned as [`EngineError`]. Per-record
//! conditions raised during a calculation are collected as
//! [`PayIssue`](crate::models::PayIssue)s instead.

use thiserror::Error;

/// The main error type for the pilot pay engine.
///
/// # Example
///
/// ```
/// use pilot_pay::error::EngineError;
///
/// let error = EngineError::UnresolvedAirport {
///     code: "ZZZ".to_string(),
/// };
/// assert_eq!(error.to_string(), "Airport not found in directory: ZZZ");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is not internally consistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// The airport reference table could not be read.
    #[error("Failed to load airport data from '{path}': {message}")]
    AirportDataError {
        /// The path (or source label) of the airport table.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The roster could not be parsed.
    #[error("Malformed roster input at line {line}: {message}")]
    MalformedInput {
        /// The 1-based line of the input where the problem was found.
        line: usize,
        /// A description of the problem.
        message: String,
    },

    /// An airport code is not present in the directory.
    #[error("Airport not found in directory: {code}")]
    UnresolvedAirport {
        /// The unresolved airport code.
        code: String,
    },

    /// No salary rule matches a duty.
    #[error("No salary rule applies to row {row} (flight {flight_number})")]
    NoApplicableRule {
        /// The roster row of the duty.
        row: usize,
        /// The flight number of the duty.
        flight_number: String,
    },

    /// A duty amount does not fit in the decimal range.
    #[error("Amount overflow while pricing row {row} (flight {flight_number})")]
    AmountOverflow {
        /// The roster row of the duty.
        row: usize,
        /// The flight number of the duty.
        flight_number: String,
    },

    /// An export artifact could not be produced.
    #[error("Failed to export {format}: {message}")]
    ExportFailure {
        /// The export format being produced.
        format: String,
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/scheme.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/scheme.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_malformed_input_displays_line_and_message() {
        let error = EngineError::MalformedInput {
            line: 3,
            message: "missing column 'duration'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed roster input at line 3: missing column 'duration'"
        );
    }

    #[test]
    fn test_no_applicable_rule_displays_row_and_flight() {
        let error = EngineError::NoApplicableRule {
            row: 7,
            flight_number: "EJU101".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No salary rule applies to row 7 (flight EJU101)"
        );
    }

    #[test]
    fn test_amount_overflow_displays_row() {
        let error = EngineError::AmountOverflow {
            row: 4,
            flight_number: "EJU4".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Amount overflow while pricing row 4 (flight EJU4)"
        );
    }

    #[test]
    fn test_export_failure_displays_format_and_message() {
        let error = EngineError::ExportFailure {
            format: "xlsx".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to export xlsx: disk full");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_unresolved() -> EngineResult<()> {
            Err(EngineError::UnresolvedAirport {
                code: "ZZZ".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_unresolved()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::UnresolvedAirport { .. })
        ));
    }
}
