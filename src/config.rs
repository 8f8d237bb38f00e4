use crate::resource::{AttachmentSpec, ResourceAddress};

/// Execution role grants imported alongside the role itself.
const DEFAULT_ATTACHMENTS: &[(&str, &str)] = &[
    (
        "aws_iam_role_policy_attachment.logs",
        "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole",
    ),
    (
        "aws_iam_role_policy_attachment.artifacts",
        "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess",
    ),
];

/// Deployment target, resolved once from the CLI. Replaces the ambient
/// environment-variable configuration the deploy scripts used.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    pub environment: String,
    pub project: String,
    pub region: String,
    pub account_id: Option<String>,
}

impl DeployConfig {
    pub fn new(
        environment: impl Into<String>,
        project: impl Into<String>,
        region: impl Into<String>,
        account_id: Option<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            project: project.into(),
            region: region.into(),
            account_id,
        }
    }

    /// Provider-side name of the execution role, e.g. `twin-dev-exec`.
    pub fn role_name(&self) -> String {
        format!("{}-{}-exec", self.project, self.environment)
    }

    pub fn role_address(&self) -> ResourceAddress {
        ResourceAddress::new("aws_iam_role.exec")
    }

    /// Default grant set, built against an explicit role name so overrides
    /// stay coupled to the role they attach to.
    pub fn default_attachments_for(&self, role_name: &str) -> Vec<AttachmentSpec> {
        DEFAULT_ATTACHMENTS
            .iter()
            .map(|(address, arn)| {
                AttachmentSpec::role_policy(ResourceAddress::new(*address), role_name, arn)
            })
            .collect()
    }

    pub fn default_attachments(&self) -> Vec<AttachmentSpec> {
        self.default_attachments_for(&self.role_name())
    }

    /// Bucket receiving the synced static assets.
    pub fn static_bucket(&self) -> String {
        format!("s3://{}-{}-static", self.project, self.environment)
    }
}
