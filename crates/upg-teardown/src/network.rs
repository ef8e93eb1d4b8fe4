//! Network interface reclamation.
//!
//! An interface goes through `available -> delete` or
//! `in-use -> describe -> (skip | detach -> wait -> delete)`. Interfaces that
//! belong to provider-managed infrastructure are never touched; they go away
//! with the infrastructure that owns them. Interfaces caught in any other
//! state are skipped.
use std::collections::HashSet;

use crate::classify::{Classifier, InterfaceClass};
use crate::config::Delays;
use crate::provider::{Network, NetworkInterface};
use crate::report::{Action, Ledger, Outcome, Step};

/// Reclaims every interface in the stack's networks, followed by any
/// interfaces the stack declares directly.
pub async fn reclaim(
    cloud: &impl Network,
    networks: &[String],
    declared: &[String],
    classifier: &impl Classifier,
    delays: &Delays,
    ledger: &mut Ledger,
) {
    if networks.is_empty() && declared.is_empty() {
        ledger.notice("stack has no networks, skipping interface reclamation");
        return;
    }

    let mut seen = HashSet::new();
    let mut detached = 0;
    for network in networks {
        let interfaces = match cloud.list_interfaces(network).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                ledger.record(Step::Interfaces, Action::List, network, Outcome::from_error(&e));
                continue;
            }
        };
        if interfaces.is_empty() {
            ledger.notice(format!("no interfaces in network {network}"));
        }
        for interface in interfaces {
            if seen.insert(interface.id.clone()) {
                detached += reclaim_interface(cloud, interface, classifier, delays, ledger).await;
            }
        }
    }

    for id in declared {
        if !seen.insert(id.clone()) {
            continue;
        }
        match cloud.describe_interface(id).await {
            Ok(interface) => {
                detached += reclaim_interface(cloud, interface, classifier, delays, ledger).await;
            }
            Err(e) => {
                ledger.record(Step::Interfaces, Action::Describe, id, Outcome::from_error(&e));
            }
        }
    }

    if detached > 0 && !delays.network_settle.is_zero() {
        ledger.notice(format!(
            "detached {detached} interface(s), waiting {}s for the network to settle",
            delays.network_settle.as_secs()
        ));
        tokio::time::sleep(delays.network_settle).await;
    }
}

/// Reclaims one interface. Returns the number of detach calls made (0 or 1).
async fn reclaim_interface(
    cloud: &impl Network,
    interface: NetworkInterface,
    classifier: &impl Classifier,
    delays: &Delays,
    ledger: &mut Ledger,
) -> usize {
    if classifier.classify_interface(&interface) == InterfaceClass::Available {
        let result = cloud.delete_interface(&interface.id).await;
        ledger.record(
            Step::Interfaces,
            Action::Delete,
            &interface.id,
            Outcome::from_result(&result),
        );
        return 0;
    }

    // The listing may be stale or lack attachment detail.
    let interface = match cloud.describe_interface(&interface.id).await {
        Ok(interface) => interface,
        Err(e) => {
            ledger.record(
                Step::Interfaces,
                Action::Describe,
                &interface.id,
                Outcome::from_error(&e),
            );
            return 0;
        }
    };

    match classifier.classify_interface(&interface) {
        InterfaceClass::Available => {
            let result = cloud.delete_interface(&interface.id).await;
            ledger.record(
                Step::Interfaces,
                Action::Delete,
                &interface.id,
                Outcome::from_result(&result),
            );
            0
        }
        InterfaceClass::Unsettled => {
            ledger.record(
                Step::Interfaces,
                Action::Delete,
                &interface.id,
                Outcome::Skipped(format!("status '{}'", interface.status)),
            );
            0
        }
        InterfaceClass::ProviderManaged => {
            ledger.record_with_detail(
                Step::Interfaces,
                Action::Delete,
                &interface.id,
                Outcome::Skipped("provider-managed".to_owned()),
                Some(format!("'{}'", interface.description)),
            );
            0
        }
        InterfaceClass::UserManaged => {
            let attachment_id = interface
                .attachment
                .as_ref()
                .and_then(|a| a.attachment_id.as_deref());
            let detached = match attachment_id {
                Some(attachment_id) => {
                    let result = cloud.detach_interface(attachment_id).await;
                    ledger.record_with_detail(
                        Step::Interfaces,
                        Action::Detach,
                        &interface.id,
                        Outcome::from_result(&result),
                        Some(format!("attachment {attachment_id}")),
                    );
                    1
                }
                None => {
                    ledger.record(
                        Step::Interfaces,
                        Action::Detach,
                        &interface.id,
                        Outcome::Skipped("no attachment".to_owned()),
                    );
                    0
                }
            };
            if detached > 0 {
                tokio::time::sleep(delays.interface_detach).await;
            }
            let result = cloud.delete_interface(&interface.id).await;
            ledger.record(
                Step::Interfaces,
                Action::Delete,
                &interface.id,
                Outcome::from_result(&result),
            );
            detached
        }
    }
}
