use serde::{Serialize, Serializer};
use std::fmt;

/// A phone number in the `+1XXXXXXXXXX` form used as the validation key.
///
/// The digit portion always starts with `1` and holds at least 10 digits
/// (11 for anything that did not start with `1` before normalization).
/// Longer inputs are kept whole; the upstream service decides whether they
/// are real numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedNumber(String);

impl NormalizedNumber {
    /// Wraps a digit string that already carries the leading country digit.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.len() < 10
            || !digits.starts_with('1')
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        Some(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NormalizedNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_digit_strings_without_country_digit() {
        assert!(NormalizedNumber::from_digits("4155552671").is_none());
        assert!(NormalizedNumber::from_digits("141555526").is_none());
        assert!(NormalizedNumber::from_digits("1415555267a").is_none());
        assert_eq!(
            NormalizedNumber::from_digits("14155552671").unwrap().as_str(),
            "+14155552671"
        );
    }
}
