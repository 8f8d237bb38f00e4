use async_trait::async_trait;
use thiserror::Error;

use crate::resource::ResourceAddress;

/// Outcome of a failed import, split so callers can tell an idempotent
/// duplicate from a genuine tool failure.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The address is already present in persisted state
    #[error("'{address}' is already managed")]
    AlreadyManaged { address: String },

    /// The remote object backing the import does not exist
    #[error("remote object for '{address}' does not exist")]
    RemoteMissing { address: String },

    /// Any other provisioning-tool failure
    #[error("import failed: {message}")]
    Tool { message: String },
}

/// The provisioning tool's persisted state, seen as a read-then-adopt store.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Whether the address is present in persisted state. Unknown addresses
    /// and tool failures read as untracked; the fact is derived fresh on
    /// every call, never cached.
    async fn is_tracked(&self, address: &ResourceAddress) -> bool;

    /// Adopt an existing real-world resource into persisted state without
    /// recreating it.
    async fn import(&self, address: &ResourceAddress, external_id: &str)
    -> Result<(), ImportError>;
}
