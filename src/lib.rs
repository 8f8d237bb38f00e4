//! TSR - Terraform State Reconciler
//!
//! A library for adopting pre-existing cloud resources into Terraform state
//! and running the deploy sequence around that reconciliation.

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod reconcile;
pub mod resource;
pub mod terraform;

pub use config::DeployConfig;
pub use providers::aws::{AwsCli, AwsError};
pub use providers::{Provider, ProviderError};
pub use reconcile::{
    AttachmentOutcome, AttachmentStatus, ParentStatus, ReconcileError, ReconcileResult, Reconciler,
};
pub use resource::{AttachmentSpec, ResourceAddress, ResourceIdentity};
pub use terraform::{ImportError, StateStore, TerraformCli, TerraformError};
