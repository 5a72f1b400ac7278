//! Braintrust REST API integration module.
//!
//! This module provides the HTTP client and the wire types for every object
//! kind the provider manages.

mod client;
mod options;
mod types;

pub use client::{ApiObject, BraintrustClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, PAGE_SIZE};
pub use options::ListOptions;
pub use types::{
    Acl, CreateAcl, CreateDataset, CreateEnvVar, CreateExperiment, CreateGroup, CreateProject,
    CreateProjectTag, CreatePrompt, CreateRole, CreateView, Dataset, EnvVar, Experiment, Group,
    MemberPermission, Organization, PatchDataset, PatchEnvVar, PatchExperiment, PatchGroup,
    PatchProject, PatchProjectTag, PatchPrompt, PatchRole, PatchView, Project, ProjectTag, Prompt,
    Role, User, View, ViewScope,
};
