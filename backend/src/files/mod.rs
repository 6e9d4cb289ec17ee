//! Reading uploaded spreadsheets into a `Dataset` and writing annotated
//! results back out.

pub mod export;
pub mod parser;

pub use export::{export_batch, export_file_name, ExportError};
pub use parser::{parse_upload, FileFormat, ParseError};
