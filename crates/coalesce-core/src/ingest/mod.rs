//! Reading tabular contact data into record batches

mod detect;
mod reader;

pub use detect::{ColumnProfile, ColumnType, SchemaDetector};
pub use reader::{normalize_header, CsvReader};
