//! Reconciliation helpers shared by every resource and data source.
//!
//! Two small algorithms live here:
//! - picking the one live entity that matches a lookup key out of a listing
//! - computing add/remove deltas for APIs that only accept incremental
//!   membership changes

mod membership;
mod resolve;

pub use membership::{MembershipDiff, diff_membership};
pub use resolve::{Named, SoftDeleted, resolve_unique, resolve_unique_by};
