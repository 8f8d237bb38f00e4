use serde::{Deserialize, Serialize};

/// State address of a resource in the provisioning tool
/// (e.g. `aws_iam_role.exec`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAddress(pub String);

impl ResourceAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-side name of an existing resource. Looked up, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceIdentity {
    pub name: String,
}

impl ResourceIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One dependent grant to import after the parent. The external id couples
/// the sub-resource to its parent (`<role-name>/<policy-arn>` for role
/// policy attachments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttachmentSpec {
    pub address: ResourceAddress,
    pub external_id: String,
}

impl AttachmentSpec {
    pub fn new(address: ResourceAddress, external_id: impl Into<String>) -> Self {
        Self {
            address,
            external_id: external_id.into(),
        }
    }

    /// Import id format used by role policy attachments.
    pub fn role_policy(address: ResourceAddress, role_name: &str, policy_arn: &str) -> Self {
        Self::new(address, format!("{role_name}/{policy_arn}"))
    }
}
