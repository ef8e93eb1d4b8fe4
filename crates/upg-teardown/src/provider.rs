//! Provider seams.
//!
//! The engine is written against these traits, one per control-plane concern.
//! [`crate::aws::AwsCloud`] implements all of them with the AWS SDK.
use std::future::Future;

/// The error code and message a service answered a call with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Who the credentials belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

/// A live stack as returned by the provider's listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackSummary {
    pub name: String,
    pub status: String,
}

/// Stack member resource types the engine cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Network,
    NetworkInterface,
    Bucket,
    Table,
}

impl ResourceKind {
    /// The provider's resource type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Network => "AWS::EC2::VPC",
            ResourceKind::NetworkInterface => "AWS::EC2::NetworkInterface",
            ResourceKind::Bucket => "AWS::S3::Bucket",
            ResourceKind::Table => "AWS::DynamoDB::Table",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ResourceKind::Network => "network",
            ResourceKind::NetworkInterface => "network interface",
            ResourceKind::Bucket => "bucket",
            ResourceKind::Table => "table",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterfaceStatus {
    Available,
    InUse,
    Other(String),
}

impl core::fmt::Display for InterfaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceStatus::Available => f.write_str("available"),
            InterfaceStatus::InUse => f.write_str("in-use"),
            InterfaceStatus::Other(status) => f.write_str(status),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachment {
    pub attachment_id: Option<String>,
    /// Owner of whatever the interface is attached to.
    pub instance_owner_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkInterface {
    pub id: String,
    pub status: InterfaceStatus,
    pub description: String,
    pub network_id: Option<String>,
    pub attachment: Option<Attachment>,
}

/// An (API, stage) pair a usage plan is associated with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiStage {
    pub api_id: String,
    pub stage: String,
}

impl core::fmt::Display for ApiStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.api_id, self.stage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsagePlan {
    pub id: String,
    pub name: String,
    pub api_stages: Vec<ApiStage>,
}

/// A key associated with a usage plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanKey {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
}

pub trait Account {
    fn caller_identity(&self) -> impl Future<Output = anyhow::Result<CallerIdentity>>;

    /// Every region enabled for the account.
    fn list_regions(&self) -> impl Future<Output = anyhow::Result<Vec<String>>>;
}

pub trait Stacks {
    /// Stacks whose status is one of `statuses`, in the provider's listing order.
    fn list_stacks(
        &self,
        statuses: &[String],
    ) -> impl Future<Output = anyhow::Result<Vec<StackSummary>>>;

    /// Physical identifiers of the stack's resources of the given kind.
    fn list_stack_resources(
        &self,
        stack: &str,
        kind: ResourceKind,
    ) -> impl Future<Output = anyhow::Result<Vec<String>>>;

    /// Hands the stack over to the infrastructure framework's own deletion.
    fn delete_stack(&self, stack: &str) -> impl Future<Output = anyhow::Result<()>>;

    /// Current status of the stack, `None` once it no longer exists.
    fn stack_status(&self, stack: &str) -> impl Future<Output = anyhow::Result<Option<String>>>;
}

pub trait Network {
    fn list_interfaces(
        &self,
        network_id: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<NetworkInterface>>>;

    /// Reads one interface including its attachment detail.
    fn describe_interface(
        &self,
        interface_id: &str,
    ) -> impl Future<Output = anyhow::Result<NetworkInterface>>;

    /// Force-detaches the attachment.
    fn detach_interface(&self, attachment_id: &str) -> impl Future<Output = anyhow::Result<()>>;

    fn delete_interface(&self, interface_id: &str) -> impl Future<Output = anyhow::Result<()>>;
}

pub trait Storage {
    /// Removes every object in the bucket, returning how many were removed.
    fn empty_bucket(&self, bucket: &str) -> impl Future<Output = anyhow::Result<usize>>;

    fn delete_bucket(&self, bucket: &str) -> impl Future<Output = anyhow::Result<()>>;
}

pub trait Tables {
    fn disable_deletion_protection(&self, table: &str)
        -> impl Future<Output = anyhow::Result<()>>;

    fn delete_table(&self, table: &str) -> impl Future<Output = anyhow::Result<()>>;
}

pub trait Governance {
    fn list_usage_plans(&self) -> impl Future<Output = anyhow::Result<Vec<UsagePlan>>>;

    fn list_plan_keys(&self, plan_id: &str) -> impl Future<Output = anyhow::Result<Vec<PlanKey>>>;

    fn remove_plan_key(
        &self,
        plan_id: &str,
        key_id: &str,
    ) -> impl Future<Output = anyhow::Result<()>>;

    fn remove_plan_stage(
        &self,
        plan_id: &str,
        stage: &ApiStage,
    ) -> impl Future<Output = anyhow::Result<()>>;

    fn delete_usage_plan(&self, plan_id: &str) -> impl Future<Output = anyhow::Result<()>>;

    fn list_api_keys(&self) -> impl Future<Output = anyhow::Result<Vec<ApiKey>>>;

    fn delete_api_key(&self, key_id: &str) -> impl Future<Output = anyhow::Result<()>>;
}

/// Everything a region pipeline needs.
pub trait Cloud: Account + Stacks + Network + Storage + Tables + Governance {}

impl<T: Account + Stacks + Network + Storage + Tables + Governance> Cloud for T {}

/// Produces region-scoped providers.
pub trait Connector {
    type Cloud: Cloud;

    /// The region configured in the ambient provider configuration, if any.
    fn default_region(&self) -> impl Future<Output = Option<String>>;

    fn connect(&self, region: &str) -> impl Future<Output = Self::Cloud>;
}
