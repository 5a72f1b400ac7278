// ============================================================================
// Linting - Dangerous or non-idiomatic practices are flagged
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden
#![warn(missing_docs)]                // Public items should be documented
#![warn(unused_must_use)]             // Handle Result and Option explicitly
#![warn(nonstandard_style)]           // Standard naming conventions

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Braintrust Provider
//!
//! Declarative management of Braintrust objects: projects, datasets,
//! experiments, prompts, roles, groups, ACLs, environment variables,
//! project tags and views, plus read-only lookups for those and for
//! organizations and users.
//!
//! ## Overview
//!
//! Each resource and data source is described by a [`framework::Schema`]
//! and works on JSON documents in which every attribute is null, unknown
//! (`{"$unknown": true}`) or known. The provider:
//!
//! 1. **Validates** documents against the schema
//! 2. **Resolves** lookups by id or by unique name, paging through list endpoints
//! 3. **Reconciles** resources with create, read, update and delete calls
//! 4. **Reports** every failure as a diagnostic instead of aborting
//!
//! ## Modules
//!
//! - [`api`]: Braintrust REST client and wire types
//! - [`config`]: Provider configuration parsing and validation
//! - [`framework`]: Attribute values, schemas and diagnostics
//! - [`reconcile`]: Unique-name resolution and membership diffing
//! - [`provider`]: Resources, data sources and the dispatcher
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! # braintrust.provider.yaml
//! api_key: sk-...
//! org_name: acme
//! timeout_secs: 30
//! ```
//!
//! ```sh
//! braintrust-provider read-data-source braintrust_project --input project.yaml
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod framework;
pub mod provider;
pub mod reconcile;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::BraintrustClient;
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, ProviderConfig, ResolvedConfig};
pub use error::{ProviderError, Result};
pub use framework::{Attr, Diagnostic, Diagnostics, Schema};
pub use provider::{BraintrustProvider, DataSource, ProviderContext, Resource, Response, TypeCategory};
