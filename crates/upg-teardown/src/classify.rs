//! Ownership and deletion-safety classification.
//!
//! The pipeline only ever asks a [`Classifier`]; the matching rules live in
//! [`Markers`] and can be replaced from a TOML file without touching the
//! pipeline.
use snafu::prelude::*;

use crate::provider::{InterfaceStatus, NetworkInterface};
use crate::{MarkersParseSnafu, MarkersReadSnafu};

/// How an interface may be reclaimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceClass {
    /// Free standing, delete directly.
    Available,
    /// Owned by provider infrastructure, never touched.
    ProviderManaged,
    /// Attached to something we own, force-detach then delete.
    UserManaged,
    /// Neither available nor in use (attaching, detaching, ...), left alone.
    Unsettled,
}

pub trait Classifier {
    /// Stack statuses considered settled.
    fn settled_statuses(&self) -> &[String];

    /// Whether a stack name marks it as this deployment's stack.
    fn is_deployment_stack(&self, name: &str) -> bool;

    fn classify_interface(&self, interface: &NetworkInterface) -> InterfaceClass;

    /// The role marker a bucket name carries, `None` if the bucket is not
    /// deployment-owned.
    fn bucket_role(&self, bucket: &str) -> Option<&str>;
}

/// Substring markers used to classify resources.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Markers {
    pub stack_names: Vec<String>,
    pub settled_statuses: Vec<String>,
    pub managed_descriptions: Vec<String>,
    pub managed_owners: Vec<String>,
    pub bucket_roles: Vec<String>,
}

impl Default for Markers {
    fn default() -> Self {
        fn owned(xs: &[&str]) -> Vec<String> {
            xs.iter().map(|x| x.to_string()).collect()
        }
        Markers {
            stack_names: owned(&["usage-plan", "api-gateway"]),
            settled_statuses: owned(&["CREATE_COMPLETE", "UPDATE_COMPLETE", "CREATE_FAILED"]),
            managed_descriptions: owned(&["NAT Gateway"]),
            managed_owners: owned(&["amazon-aws"]),
            bucket_roles: owned(&["access-log", "replica", "configuration"]),
        }
    }
}

impl Markers {
    /// Reads markers from a TOML file. Keys missing from the file keep their
    /// defaults.
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).context(MarkersReadSnafu { path })?;
        let markers = toml::from_str(&contents).context(MarkersParseSnafu { path })?;
        log::debug!("loaded markers from {path:?}: {markers:?}");
        Ok(markers)
    }

    pub fn is_managed_description(&self, description: &str) -> bool {
        self.managed_descriptions
            .iter()
            .any(|marker| description.contains(marker.as_str()))
    }

    pub fn is_managed_owner(&self, owner: &str) -> bool {
        self.managed_owners.iter().any(|marker| owner == marker)
    }
}

impl Classifier for Markers {
    fn settled_statuses(&self) -> &[String] {
        &self.settled_statuses
    }

    fn is_deployment_stack(&self, name: &str) -> bool {
        self.stack_names
            .iter()
            .any(|marker| name.contains(marker.as_str()))
    }

    fn classify_interface(&self, interface: &NetworkInterface) -> InterfaceClass {
        match interface.status {
            InterfaceStatus::Available => return InterfaceClass::Available,
            InterfaceStatus::InUse => {}
            InterfaceStatus::Other(_) => return InterfaceClass::Unsettled,
        }
        let owner = interface
            .attachment
            .as_ref()
            .and_then(|a| a.instance_owner_id.as_deref());
        if self.is_managed_description(&interface.description)
            || owner.is_some_and(|owner| self.is_managed_owner(owner))
        {
            InterfaceClass::ProviderManaged
        } else {
            InterfaceClass::UserManaged
        }
    }

    fn bucket_role(&self, bucket: &str) -> Option<&str> {
        self.bucket_roles
            .iter()
            .find(|role| bucket.contains(role.as_str()))
            .map(String::as_str)
    }
}
