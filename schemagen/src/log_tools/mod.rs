//! Logging setup for the generator binary

mod lazy_file_writer;
mod tracing;

pub use lazy_file_writer::LazyFileWriter;
pub use lazy_file_writer::LazyWriter;
pub use self::tracing::TracingLevel;
