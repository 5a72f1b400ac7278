//! Typed model of the declarative configuration framework.
//!
//! Configuration and state travel as JSON objects. Inside them every
//! attribute is null, unknown (not yet computed during planning) or known.
//! Operations report problems as diagnostics rather than failing outright,
//! and every resource and data source describes itself with a schema.

mod diagnostic;
mod schema;
mod value;

pub use diagnostic::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use schema::{Attribute, AttributeFlags, AttributeType, ProviderSchema, Schema};
pub use value::{Attr, UNKNOWN_MARKER};
