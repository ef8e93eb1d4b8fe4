//! # Teardown
//!
//! Decommissions a multi-region deployment of the usage-plan governance
//! platform.
//!
//! For every selected region the engine locates the deployment's stack,
//! discovers the stack's networks, buckets and tables, and removes what would
//! otherwise block the stack's own deletion:
//!
//! - network interfaces inside the stack's networks, leaving interfaces that
//!   belong to provider-managed infrastructure (NAT gateways and the like)
//!   untouched,
//! - buckets whose names mark them as deployment-owned (access logs,
//!   replicas, configuration), emptied first,
//! - data tables, but only when the protected-resource override was given.
//!
//! It then hands the stack to the infrastructure framework's own deletion and
//! finally cascades through the region's usage plans, their key and stage
//! associations, and the API keys.
//!
//! ## Concepts
//!
//! - **Best effort**: every provider call may fail on its own. A failure is
//!   recorded as an [`Outcome::Failed`] in the region's [`RegionReport`] and
//!   the engine moves on. The only condition that stops a run is a failed
//!   identity check (see [`Error`]).
//! - **Provider seam**: the engine never talks to AWS directly. It is written
//!   against the traits in [`provider`], implemented by [`aws::AwsCloud`] for
//!   real accounts and by an in-memory fake in the tests.
//! - **Run configuration**: all switches live in one immutable [`RunConfig`]
//!   built once and handed to every component.
//!
//! ## Error Handling
//!
//! Fatal conditions are variants of [`Error`]. Everything else ends up in a
//! report.

use snafu::prelude::*;

pub mod aws;
pub mod bucket;
pub mod classify;
pub mod config;
pub mod governance;
pub mod network;
pub mod provider;
pub mod region;
pub mod report;
pub mod stack;
pub mod table;
pub mod teardown;

pub use classify::{Classifier, InterfaceClass, Markers};
pub use config::{CascadeMode, Delays, Handoff, RegionSelection, RunConfig};
pub use provider::Connector;
pub use report::{Action, GovernanceReport, Ledger, Outcome, Record, RegionReport, RunReport, Step};
pub use teardown::{run_cleanup, run_teardown};

fn render_chain(source: &anyhow::Error) -> String {
    source
        .chain()
        .map(|e| format!("{e}"))
        .collect::<Vec<_>>()
        .join("\n -> ")
}

/// Fatal errors. Any of these stops the run before a region is touched.
///
/// The marker file variants can only come from [`Markers::load`], before a
/// run starts.
#[derive(snafu::Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Could not verify the caller identity, check credentials and profile:\n{}",
        render_chain(source)
    ))]
    Identity { source: anyhow::Error },

    #[snafu(display("Could not read marker file '{path:?}': {source}"))]
    MarkersRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Could not parse marker file '{path:?}': {source}"))]
    MarkersParse {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
