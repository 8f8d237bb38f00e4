use thiserror::Error;

use crate::providers::{Provider, ProviderError};
use crate::resource::{AttachmentSpec, ResourceAddress, ResourceIdentity};
use crate::terraform::{ImportError, StateStore};

#[derive(Debug, Clone, PartialEq)]
pub enum ParentStatus {
    /// Not present at the provider, nothing to import
    Skipped,
    /// Already present in persisted state
    AlreadyManaged,
    Imported,
}

impl std::fmt::Display for ParentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped (not present at provider)"),
            Self::AlreadyManaged => f.write_str("already managed"),
            Self::Imported => f.write_str("imported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentStatus {
    Imported,
    AlreadyAttached,
    RemoteAbsent,
    Failed { message: String },
}

impl AttachmentStatus {
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Imported)
    }
}

impl std::fmt::Display for AttachmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imported => f.write_str("imported"),
            Self::AlreadyAttached => f.write_str("already attached"),
            Self::RemoteAbsent => f.write_str("remote object absent"),
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentOutcome {
    pub address: ResourceAddress,
    pub status: AttachmentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileResult {
    pub parent: ParentStatus,
    pub attachments: Vec<AttachmentOutcome>,
}

impl ReconcileResult {
    pub fn warning_count(&self) -> usize {
        self.attachments
            .iter()
            .filter(|outcome| outcome.status.is_warning())
            .count()
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Dependents cannot attach to an untracked parent, so this aborts the
    /// whole reconciliation.
    #[error("parent import failed for '{address}': {message}")]
    ParentImportFailed { address: String, message: String },
}

/// Aligns persisted state with provider-side reality without destructive
/// side effects. Everything runs sequentially; each provider/tool call is
/// attempted exactly once per item.
pub struct Reconciler<'a> {
    provider: &'a dyn Provider,
    state: &'a dyn StateStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(provider: &'a dyn Provider, state: &'a dyn StateStore) -> Self {
        Self { provider, state }
    }

    pub async fn reconcile(
        &self,
        parent: &ResourceIdentity,
        parent_address: &ResourceAddress,
        attachments: &[AttachmentSpec],
    ) -> Result<ReconcileResult, ReconcileError> {
        if !self.provider.exists(parent).await? {
            tracing::info!(name = %parent.name, "parent absent at provider, skipping import");
            return Ok(ReconcileResult {
                parent: ParentStatus::Skipped,
                attachments: Vec::new(),
            });
        }

        // State is only queried for entities the provider confirmed, so the
        // tool is never asked to show an address with no remote counterpart.
        if self.state.is_tracked(parent_address).await {
            tracing::info!(address = %parent_address, "parent already in state");
            return Ok(ReconcileResult {
                parent: ParentStatus::AlreadyManaged,
                attachments: Vec::new(),
            });
        }

        match self.state.import(parent_address, &parent.name).await {
            Ok(()) => {
                tracing::info!(address = %parent_address, name = %parent.name, "parent imported");
            }
            // Tracked between our check and the import; same end state.
            Err(ImportError::AlreadyManaged { .. }) => {
                tracing::info!(address = %parent_address, "parent already in state");
                return Ok(ReconcileResult {
                    parent: ParentStatus::AlreadyManaged,
                    attachments: Vec::new(),
                });
            }
            Err(e) => {
                return Err(ReconcileError::ParentImportFailed {
                    address: parent_address.to_string(),
                    message: e.to_string(),
                });
            }
        }

        let mut outcomes = Vec::with_capacity(attachments.len());
        for spec in attachments {
            let status = match self.state.import(&spec.address, &spec.external_id).await {
                Ok(()) => AttachmentStatus::Imported,
                Err(ImportError::AlreadyManaged { .. }) => {
                    tracing::warn!(address = %spec.address, "attachment already in state");
                    AttachmentStatus::AlreadyAttached
                }
                Err(ImportError::RemoteMissing { .. }) => {
                    tracing::warn!(address = %spec.address, "attachment has no remote object");
                    AttachmentStatus::RemoteAbsent
                }
                Err(ImportError::Tool { message }) => {
                    tracing::warn!(address = %spec.address, %message, "attachment import failed");
                    AttachmentStatus::Failed { message }
                }
            };
            outcomes.push(AttachmentOutcome {
                address: spec.address.clone(),
                status,
            });
        }

        Ok(ReconcileResult {
            parent: ParentStatus::Imported,
            attachments: outcomes,
        })
    }
}
