//! Run configuration.
//!
//! A [`RunConfig`] is built once, before any region is touched, and is only
//! ever read afterwards.
use std::time::Duration;

use crate::classify::Markers;

/// Region used when nothing else is selected or configured.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Which regions a run operates on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RegionSelection {
    /// An explicit, ordered list.
    Explicit(Vec<String>),
    /// Every region enabled for the account, discovered live.
    All,
    /// The ambient configured region, or [`FALLBACK_REGION`].
    #[default]
    Default,
}

impl RegionSelection {
    /// Parses a comma separated region list.
    ///
    /// Entries are trimmed, empty entries are dropped and duplicates keep
    /// their first position.
    pub fn parse_list(list: &str) -> Self {
        RegionSelection::Explicit(dedup(
            list.split(',')
                .map(str::trim)
                .filter(|region| !region.is_empty())
                .map(str::to_owned),
        ))
    }
}

pub(crate) fn dedup(regions: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    regions
        .into_iter()
        .filter(|region| seen.insert(region.clone()))
        .collect()
}

/// What the governance-object cascade does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CascadeMode {
    /// List every plan's stage associations, change nothing.
    Inspect,
    /// Remove every plan's stage associations, keep plans and keys.
    Unassociate,
    /// Count and name plans and keys, change nothing.
    #[default]
    DryRun,
    /// Remove associations, plans and keys.
    Confirm,
}

impl CascadeMode {
    /// Whether this mode may change anything.
    pub fn is_destructive(&self) -> bool {
        matches!(self, CascadeMode::Unassociate | CascadeMode::Confirm)
    }
}

impl core::fmt::Display for CascadeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CascadeMode::Inspect => "inspect",
            CascadeMode::Unassociate => "unassociate",
            CascadeMode::DryRun => "dry-run",
            CascadeMode::Confirm => "confirm",
        })
    }
}

/// Fixed waits for provider-side eventual consistency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delays {
    /// After force-detaching a single interface, before deleting it.
    pub interface_detach: Duration,
    /// After an interface pass that detached anything.
    pub network_settle: Duration,
    /// Before deleting each plan, after its associations were removed.
    pub plan_delete: Duration,
    /// Between stack status checks while waiting for deletion.
    pub deletion_poll: Duration,
    /// Give up waiting for stack deletion after this long.
    pub deletion_timeout: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Delays {
            interface_detach: Duration::from_secs(5),
            network_settle: Duration::from_secs(10),
            plan_delete: Duration::from_secs(1),
            deletion_poll: Duration::from_secs(10),
            deletion_timeout: Duration::from_secs(60 * 15),
        }
    }
}

impl Delays {
    /// No waiting at all.
    pub fn none() -> Self {
        Delays {
            interface_detach: Duration::ZERO,
            network_settle: Duration::ZERO,
            plan_delete: Duration::ZERO,
            deletion_poll: Duration::ZERO,
            deletion_timeout: Duration::ZERO,
        }
    }
}

/// How the stack is handed to the infrastructure framework for deletion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Handoff {
    /// The provider's delete-stack call.
    #[default]
    Api,
    /// A framework CLI, run as
    /// `<program> delete --stack-name <stack> --region <region> --no-prompts`.
    Command(String),
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Named profile from the ambient provider configuration.
    pub profile: Option<String>,
    pub regions: RegionSelection,
    /// Strip deletion protection from tables and delete them.
    pub override_protected: bool,
    pub cascade: CascadeMode,
    /// Skip the governance-object cascade during a full teardown.
    pub keep_plans: bool,
    pub delays: Delays,
    pub markers: Markers,
    pub handoff: Handoff,
    /// Poll the stack until its deletion finishes.
    pub wait_for_deletion: bool,
    /// Maximum number of regions processed at once.
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            profile: None,
            regions: RegionSelection::default(),
            override_protected: false,
            cascade: CascadeMode::default(),
            keep_plans: false,
            delays: Delays::default(),
            markers: Markers::default(),
            handoff: Handoff::default(),
            wait_for_deletion: false,
            concurrency: 1,
        }
    }
}
