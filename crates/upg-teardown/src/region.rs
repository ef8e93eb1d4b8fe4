//! Region resolution.
use crate::config::{dedup, RegionSelection, FALLBACK_REGION};
use crate::provider::Account;

/// Resolves a selection into an ordered, de-duplicated list of regions.
///
/// Only [`RegionSelection::All`] calls the provider. When that call fails the
/// run falls back to the default region. An explicit list that holds no
/// region resolves to nothing and the run has no work to do.
pub async fn resolve(
    selection: &RegionSelection,
    configured_default: Option<&str>,
    account: &impl Account,
) -> Vec<String> {
    let regions = match selection {
        RegionSelection::Explicit(regions) => dedup(regions.iter().cloned()),
        RegionSelection::All => match account.list_regions().await {
            Ok(regions) => {
                log::info!("discovered {} region(s)", regions.len());
                dedup(regions)
            }
            Err(e) => {
                let region = default_region(configured_default);
                log::warn!("could not discover regions, continuing with {region}: {e:#}");
                vec![region.to_owned()]
            }
        },
        RegionSelection::Default => vec![default_region(configured_default).to_owned()],
    };
    if regions.is_empty() {
        log::warn!("region selection resolved to no regions, nothing to do");
    }
    regions
}

fn default_region(configured_default: Option<&str>) -> &str {
    configured_default.unwrap_or_else(|| {
        log::info!("no region configured, falling back to {FALLBACK_REGION}");
        FALLBACK_REGION
    })
}

/// The region used for run-wide calls such as the identity check.
pub fn home_region<'a>(selection: &'a RegionSelection, configured_default: Option<&'a str>) -> &'a str {
    match (selection, configured_default) {
        (_, Some(region)) => region,
        (RegionSelection::Explicit(regions), None) => regions
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_REGION),
        _ => FALLBACK_REGION,
    }
}
