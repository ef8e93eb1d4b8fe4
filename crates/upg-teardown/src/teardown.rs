//! Run orchestration.
//!
//! Per region: locate -> discover -> interfaces -> buckets -> tables (only
//! with the override) -> handoff -> governance cascade. Regions are
//! independent; with `concurrency > 1` up to that many pipelines make progress
//! at once, but reports always come back in region order.
use futures::StreamExt;

use crate::config::{CascadeMode, RunConfig};
use crate::provider::{Account, Cloud, Connector};
use crate::report::{GovernanceReport, RegionReport, RunReport};
use crate::{bucket, governance, network, region, stack, table, Error, Result};

/// Runs the full teardown pipeline for one region.
pub async fn teardown_region(cloud: &impl Cloud, region: &str, config: &RunConfig) -> RegionReport {
    let mut report = RegionReport::new(region);
    let Some(located) = stack::locate(cloud, &config.markers, &mut report).await else {
        return report;
    };
    report.stack = Some(located.name.clone());

    let resources = stack::discover(cloud, &located.name, &mut report).await;

    network::reclaim(
        cloud,
        &resources.networks,
        &resources.interfaces,
        &config.markers,
        &config.delays,
        &mut report,
    )
    .await;

    bucket::reclaim(cloud, &resources.buckets, &config.markers, &mut report).await;

    if config.override_protected {
        table::reclaim(cloud, &resources.tables, &mut report).await;
    } else if !resources.tables.is_empty() {
        let notice = format!(
            "leaving {} protected table(s) in place, use the override to delete them",
            resources.tables.len()
        );
        report.notice(notice);
    }

    stack::handoff(
        cloud,
        &located.name,
        config.wait_for_deletion,
        &config.delays,
        &mut report,
    )
    .await;

    if config.keep_plans {
        report.notice("keeping usage plans and API keys");
    } else {
        report.governance = Some(
            governance::cascade(cloud, region, CascadeMode::Confirm, &config.delays).await,
        );
    }
    report
}

/// Connects to the run's home region.
async fn home<C: Connector>(connector: &C, config: &RunConfig) -> (C::Cloud, Option<String>) {
    let configured_default = connector.default_region().await;
    let home = region::home_region(&config.regions, configured_default.as_deref());
    (connector.connect(home).await, configured_default)
}

/// Full teardown across the selected regions.
///
/// Fails only when the identity check fails; everything after that ends up
/// in the returned report.
pub async fn run_teardown<C: Connector>(connector: &C, config: &RunConfig) -> Result<RunReport> {
    let (home, configured_default) = home(connector, config).await;
    let identity = home
        .caller_identity()
        .await
        .map_err(|source| Error::Identity { source })?;
    log::info!("running as {} in account {}", identity.arn, identity.account);

    let regions = region::resolve(&config.regions, configured_default.as_deref(), &home).await;
    log::info!("tearing down {} region(s): {}", regions.len(), regions.join(", "));

    let regions = futures::stream::iter(regions.iter().map(|region| async move {
        log::info!("starting teardown of {region}");
        let cloud = connector.connect(region).await;
        teardown_region(&cloud, region, config).await
    }))
    .buffered(config.concurrency.max(1))
    .collect::<Vec<_>>()
    .await;
    Ok(RunReport { identity, regions })
}

/// Governance-object cleanup across the selected regions, in the configured
/// cascade mode. Never fails.
pub async fn run_cleanup<C: Connector>(connector: &C, config: &RunConfig) -> Vec<GovernanceReport> {
    let (home, configured_default) = home(connector, config).await;
    let regions = region::resolve(&config.regions, configured_default.as_deref(), &home).await;
    log::info!("cleaning up {} region(s): {}", regions.len(), regions.join(", "));

    futures::stream::iter(regions.iter().map(|region| async move {
        log::info!("cleaning up governance objects in {region} ({})", config.cascade);
        let cloud = connector.connect(region).await;
        governance::cascade(&cloud, region, config.cascade, &config.delays).await
    }))
    .buffered(config.concurrency.max(1))
    .collect::<Vec<_>>()
    .await
}
