use common::model::phone::NormalizedNumber;
use common::model::row::CellValue;

/// Fewest digits a value needs before it is treated as a phone number.
pub const MIN_DIGITS: usize = 10;

/// Normalizes a raw cell into a US-centric E.164-like number.
///
/// Every non-digit is dropped. Fewer than ten digits is not a phone number.
/// A leading `1` is added when missing; longer digit strings pass through
/// untruncated. Booleans and empty cells never normalize.
pub fn normalize(raw: &CellValue) -> Option<NormalizedNumber> {
    match raw {
        CellValue::Text(text) => normalize_str(text),
        CellValue::Number(_) => normalize_str(&raw.to_text()),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

pub fn normalize_str(raw: &str) -> Option<NormalizedNumber> {
    if raw.is_empty() {
        return None;
    }

    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < MIN_DIGITS {
        return None;
    }
    if !digits.starts_with('1') {
        digits.insert(0, '1');
    }
    NormalizedNumber::from_digits(&digits)
}
