//! Writing cleaned batches and audit trails back out

mod audit;
mod csv_writer;

pub use audit::{write_audit, AuditReport};
pub use csv_writer::CsvWriter;
