//! Scan, generate and write pipeline

mod generator;
mod orchestrator;
mod scanner;
mod writer;

pub use generator::MAX_SCHEMA_NODES;
pub use generator::PropertySchema;
pub use generator::SchemaDocument;
pub use generator::SchemaGenerator;
pub use generator::schema_id;
pub use orchestrator::FailureStage;
pub use orchestrator::Orchestrator;
pub use orchestrator::RunReport;
pub use orchestrator::RunState;
pub use orchestrator::TypeOutcome;
pub use scanner::DiscoveredType;
pub use scanner::ScanOutcome;
pub use scanner::TypeScanner;
pub use writer::OutputWriter;
pub use writer::SCHEMA_FILE_SUFFIX;
