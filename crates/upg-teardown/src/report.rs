//! Per-region reports.
//!
//! Every provider call the engine makes ends up as a [`Record`] in a
//! [`Ledger`]. Failures are logged as warnings when they happen; the rest is
//! logged at debug level and left to whoever prints the report.
use std::ops::{Deref, DerefMut};

use crate::config::CascadeMode;
use crate::provider::{ApiKey, CallerIdentity, ServiceError, UsagePlan};

/// Service error codes that mean the target is already gone.
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidNetworkInterfaceID.NotFound",
    "InvalidAttachmentID.NotFound",
    "InvalidVpcID.NotFound",
    "NoSuchBucket",
    "ResourceNotFoundException",
    "NotFoundException",
];

/// Whether an error only says that the target no longer exists.
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ServiceError>()
        .is_some_and(|e| NOT_FOUND_CODES.contains(&e.code.as_str()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Skipped(String),
    Failed(String),
}

impl Outcome {
    /// A missing target is a skip, anything else a failure.
    pub fn from_error(error: &anyhow::Error) -> Self {
        if is_not_found(error) {
            Outcome::Skipped("not found".to_owned())
        } else {
            Outcome::Failed(format!("{error:#}"))
        }
    }

    pub fn from_result<T>(result: &anyhow::Result<T>) -> Self {
        match result {
            Ok(_) => Outcome::Done,
            Err(e) => Outcome::from_error(e),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Pipeline step a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Discovery,
    Interfaces,
    Buckets,
    Tables,
    Handoff,
    Governance,
}

impl core::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Step::Discovery => "discovery",
            Step::Interfaces => "interfaces",
            Step::Buckets => "buckets",
            Step::Tables => "tables",
            Step::Handoff => "handoff",
            Step::Governance => "governance",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Describe,
    Delete,
    Detach,
    Empty,
    DisableProtection,
    DeleteStack,
    AwaitDeletion,
    RemoveKey,
    RemoveStage,
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::List => "list",
            Action::Describe => "describe",
            Action::Delete => "delete",
            Action::Detach => "detach",
            Action::Empty => "empty",
            Action::DisableProtection => "disable protection",
            Action::DeleteStack => "delete stack",
            Action::AwaitDeletion => "await deletion",
            Action::RemoveKey => "remove key",
            Action::RemoveStage => "remove stage",
        })
    }
}

/// One attempted operation and how it went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub step: Step,
    pub action: Action,
    pub target: String,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl core::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Record {
            step,
            action,
            target,
            outcome,
            detail,
        } = self;
        write!(f, "[{step}] {action} '{target}': ")?;
        match outcome {
            Outcome::Done => f.write_str("done")?,
            Outcome::Skipped(reason) => write!(f, "skipped ({reason})")?,
            Outcome::Failed(reason) => write!(f, "FAILED ({reason})")?,
        }
        if let Some(detail) = detail {
            write!(f, ", {detail}")?;
        }
        Ok(())
    }
}

/// Notices and records of one region.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    region: String,
    notices: Vec<String>,
    records: Vec<Record>,
}

impl Ledger {
    pub fn new(region: impl Into<String>) -> Self {
        Ledger {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn notice(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        log::debug!("[{}] {notice}", self.region);
        self.notices.push(notice);
    }

    pub fn record(
        &mut self,
        step: Step,
        action: Action,
        target: impl Into<String>,
        outcome: Outcome,
    ) -> &Record {
        self.record_with_detail(step, action, target, outcome, None)
    }

    pub fn record_with_detail(
        &mut self,
        step: Step,
        action: Action,
        target: impl Into<String>,
        outcome: Outcome,
        detail: Option<String>,
    ) -> &Record {
        let record = Record {
            step,
            action,
            target: target.into(),
            outcome,
            detail,
        };
        match &record.outcome {
            Outcome::Failed(_) => log::warn!("[{}] {record}", self.region),
            _ => log::debug!("[{}] {record}", self.region),
        }
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Records of one action, in the order they happened.
    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.action == action)
    }

    /// The first record of `action` on `target`.
    pub fn find(&self, action: Action, target: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.action == action && r.target == target)
    }

    pub fn done(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_done()).count()
    }

    pub fn skipped(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

/// Result of the governance-object cascade in one region.
#[derive(Clone, Debug)]
pub struct GovernanceReport {
    pub mode: CascadeMode,
    /// Plans as they were found, with their stage associations.
    pub plans: Vec<UsagePlan>,
    /// API keys as they were found. Only listed in `dry-run` and `confirm`.
    pub keys: Vec<ApiKey>,
    ledger: Ledger,
}

impl GovernanceReport {
    pub fn new(region: impl Into<String>, mode: CascadeMode) -> Self {
        GovernanceReport {
            mode,
            plans: vec![],
            keys: vec![],
            ledger: Ledger::new(region),
        }
    }
}

impl Deref for GovernanceReport {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

impl DerefMut for GovernanceReport {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ledger
    }
}

/// Result of the full pipeline in one region.
#[derive(Clone, Debug)]
pub struct RegionReport {
    /// The located stack, `None` when the region was skipped.
    pub stack: Option<String>,
    pub governance: Option<GovernanceReport>,
    ledger: Ledger,
}

impl RegionReport {
    pub fn new(region: impl Into<String>) -> Self {
        RegionReport {
            stack: None,
            governance: None,
            ledger: Ledger::new(region),
        }
    }

    /// Records of the pipeline followed by those of the cascade.
    pub fn all_records(&self) -> impl Iterator<Item = &Record> {
        self.ledger.records().iter().chain(
            self.governance
                .iter()
                .flat_map(|governance| governance.records().iter()),
        )
    }
}

impl Deref for RegionReport {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

impl DerefMut for RegionReport {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ledger
    }
}

/// Result of a full teardown run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub identity: CallerIdentity,
    /// One report per region, in region order.
    pub regions: Vec<RegionReport>,
}
