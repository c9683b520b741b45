//! Request types for the pilot pay API.
//!
//! Both endpoints take the raw roster as the request body and describe it
//! with query parameters.

use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;
use crate::roster::RosterFormat;

/// Query parameters for `POST /calculate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculateQuery {
    /// The layout of the roster body.
    #[serde(default)]
    pub format: RosterFormat,
    /// Optional `YYYY-MM` month to restrict the roster to.
    #[serde(default)]
    pub month: Option<String>,
}

/// Query parameters for `POST /export`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportQuery {
    /// The layout of the roster body.
    #[serde(default)]
    pub format: RosterFormat,
    /// Optional `YYYY-MM` month to restrict the roster to.
    #[serde(default)]
    pub month: Option<String>,
    /// The artifact format to produce.
    #[serde(default)]
    pub output: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = ExportQuery::default();
        assert_eq!(query.format, RosterFormat::Csv);
        assert_eq!(query.output, ExportFormat::Csv);
        assert!(query.month.is_none());
    }

    #[test]
    fn test_deserialize_lowercase_formats() {
        let query: ExportQuery =
            serde_json::from_str(r#"{"format": "text", "output": "xlsx", "month": "2024-03"}"#)
                .unwrap();
        assert_eq!(query.format, RosterFormat::Text);
        assert_eq!(query.output, ExportFormat::Xlsx);
        assert_eq!(query.month.as_deref(), Some("2024-03"));
    }
}
