//! Phone-number heuristics applied to spreadsheet cells.
//!
//! - `normalizer`: turns one raw cell into a `+1XXXXXXXXXX` number or rejects it.
//! - `classifier`: flags the columns of an upload that mostly hold phone numbers.

pub mod classifier;
pub mod normalizer;

pub use classifier::detect_phone_columns;
pub use normalizer::{normalize, normalize_str};
