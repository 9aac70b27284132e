//! # Registry schema generator
//!
//! Build-time generator of JSON schema documents. Given a base type and a set
//! of namespace roots, it discovers every concrete subtype of the base type
//! defined by the registry documents on a classpath and writes one
//! `<type path>-schema.json` file per discovered type.
//!
//! Type names are resolved through a [`TypeLoader`](type_loader::TypeLoader)
//! layered over the ambient context. Each name resolves to exactly one
//! handle for the lifetime of a run, so subtype checks and member inspection
//! always see the same type.
//!
//! ```no_run
//! use registry_schemagen::config::RunConfig;
//! use registry_schemagen::schema_gen::Orchestrator;
//! use registry_schemagen::type_loader::AmbientContext;
//!
//! let config = RunConfig::from_json_file("schemagen.json".as_ref())?;
//! let report = Orchestrator::new(AmbientContext::global()).run(&config)?;
//! println!("{} schemas written", report.written().count());
//! # Ok::<(), error_stack::Report<registry_schemagen::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod json_object;
pub mod json_schema;
pub mod log_tools;
pub mod schema_gen;
pub mod type_loader;
