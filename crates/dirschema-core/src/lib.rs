//! dirschema core - objectClass enforcement for a directory write pipeline
//!
//! This crate sits between a directory front end and its storage stage and
//! makes every Add, Modify and Rename schema-consistent before it is stored:
//! - objectClass chains completed with their ancestors and sorted
//! - DNs rebuilt in canonical form under the parent's stored DN
//! - attribute names checked and canonicalized against the schema
//! - naming, containment, system-only and systemFlags policy for new entries
//!
//! Work that needs data from the store suspends and resumes through
//! [`pipeline::ObjectClassModule::deliver`].

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod pipeline;
pub mod policy;
pub mod rules;
pub mod schema;

#[doc(hidden)]
pub use dirschema_core_types as core_types;

// Re-export commonly used types
pub use config::ModuleConfig;
pub use errors::{ExError, ExErrorKind, Result, SchemaError};
pub use model::{Completion, Dn, Element, Message, ModOp, Reply, Request, ResultCode};
pub use pipeline::{NextStage, ObjectClassModule, Outcome, Ticket};
pub use policy::PolicyEnforcer;
pub use schema::{Schema, SchemaProvider, SchemaSlot, SchemaView};
