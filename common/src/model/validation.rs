use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification reported by the upstream validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Mobile,
    Landline,
    Invalid,
    #[default]
    #[serde(other)]
    Unknown,
}

impl LineType {
    /// Maps the upstream `line_type` string. Absent, blank, or unrecognised
    /// values become `Unknown`.
    pub fn from_upstream(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("mobile") => LineType::Mobile,
            Some("landline") => LineType::Landline,
            Some("invalid") => LineType::Invalid,
            _ => LineType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineType::Mobile => "mobile",
            LineType::Landline => "landline",
            LineType::Invalid => "invalid",
            LineType::Unknown => "unknown",
        }
    }

    /// Capitalized form shown in annotated rows ("Mobile", "Landline", ...).
    pub fn display_name(&self) -> &'static str {
        match self {
            LineType::Mobile => "Mobile",
            LineType::Landline => "Landline",
            LineType::Invalid => "Invalid",
            LineType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one number.
///
/// `success` tells whether the upstream answered at all; `valid` is the
/// upstream verdict. A result with `success == false` always carries an
/// `error` and `line_type == Invalid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub input_number: String,
    pub success: bool,
    pub valid: bool,
    pub line_type: LineType,
    /// Canonical (international format) number as reported upstream.
    #[serde(rename = "number")]
    pub canonical_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub country: Option<String>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none", default)]
    pub error_message: Option<String>,
}

impl ValidationResult {
    /// A result for a number that could not be validated.
    pub fn failure(input_number: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input_number: input_number.into(),
            success: false,
            valid: false,
            line_type: LineType::Invalid,
            canonical_number: None,
            carrier: None,
            location: None,
            country: None,
            error_message: Some(message.into()),
        }
    }

    /// Key used to correlate a result with a normalized number: the
    /// canonical number when present, otherwise the submitted one.
    pub fn correlation_key(&self) -> &str {
        self.canonical_number
            .as_deref()
            .unwrap_or(&self.input_number)
    }
}
