//! Stack location, resource discovery and the teardown handoff.
use crate::classify::Classifier;
use crate::config::Delays;
use crate::provider::{ResourceKind, StackSummary, Stacks};
use crate::report::{Action, Ledger, Outcome, Step};

/// Identifiers of the stack's resources, per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackResources {
    pub networks: Vec<String>,
    pub interfaces: Vec<String>,
    pub buckets: Vec<String>,
    pub tables: Vec<String>,
}

impl StackResources {
    fn slot(&mut self, kind: ResourceKind) -> &mut Vec<String> {
        match kind {
            ResourceKind::Network => &mut self.networks,
            ResourceKind::NetworkInterface => &mut self.interfaces,
            ResourceKind::Bucket => &mut self.buckets,
            ResourceKind::Table => &mut self.tables,
        }
    }
}

/// Finds the region's deployment stack.
///
/// The first settled stack whose name carries a deployment marker wins, in
/// the provider's listing order. Returns `None`, with a notice, when there is
/// none.
pub async fn locate(
    cloud: &impl Stacks,
    classifier: &impl Classifier,
    ledger: &mut Ledger,
) -> Option<StackSummary> {
    let statuses = classifier.settled_statuses();
    let stacks = match cloud.list_stacks(statuses).await {
        Ok(stacks) => stacks,
        Err(e) => {
            ledger.record(Step::Discovery, Action::List, "stacks", Outcome::from_error(&e));
            return None;
        }
    };
    let mut matching = stacks.into_iter().filter(|stack| {
        statuses.contains(&stack.status) && classifier.is_deployment_stack(&stack.name)
    });
    let Some(stack) = matching.next() else {
        ledger.notice("no deployment stack found, skipping region");
        return None;
    };
    let others = matching.map(|stack| stack.name).collect::<Vec<_>>();
    if !others.is_empty() {
        ledger.notice(format!(
            "more than one stack matches, using '{}' and ignoring {}",
            stack.name,
            others.join(", ")
        ));
    }
    ledger.notice(format!("found stack '{}' ({})", stack.name, stack.status));
    Some(stack)
}

/// Lists the stack's networks, interfaces, buckets and tables.
///
/// A failed listing is recorded and treated as empty.
pub async fn discover(cloud: &impl Stacks, stack: &str, ledger: &mut Ledger) -> StackResources {
    let mut resources = StackResources::default();
    for kind in [
        ResourceKind::Network,
        ResourceKind::NetworkInterface,
        ResourceKind::Bucket,
        ResourceKind::Table,
    ] {
        match cloud.list_stack_resources(stack, kind).await {
            Ok(ids) => {
                log::debug!("stack {stack} has {} {kind}(s): {ids:?}", ids.len());
                *resources.slot(kind) = ids;
            }
            Err(e) => {
                ledger.record(
                    Step::Discovery,
                    Action::List,
                    format!("{stack} {kind}s"),
                    Outcome::from_error(&e),
                );
            }
        }
    }
    resources
}

/// Hands the stack to the framework's own deletion, optionally waiting for it
/// to finish.
pub async fn handoff(
    cloud: &impl Stacks,
    stack: &str,
    wait: bool,
    delays: &Delays,
    ledger: &mut Ledger,
) {
    let result = cloud.delete_stack(stack).await;
    ledger.record(
        Step::Handoff,
        Action::DeleteStack,
        stack,
        Outcome::from_result(&result),
    );
    if result.is_ok() && wait {
        await_deletion(cloud, stack, delays, ledger).await;
    }
}

/// Polls the stack's status until it is gone, its deletion failed, or the
/// timeout passes.
pub async fn await_deletion(cloud: &impl Stacks, stack: &str, delays: &Delays, ledger: &mut Ledger) {
    let start = tokio::time::Instant::now();
    loop {
        match cloud.stack_status(stack).await {
            Ok(None) => {
                ledger.record(Step::Handoff, Action::AwaitDeletion, stack, Outcome::Done);
                return;
            }
            Ok(Some(status)) if status == "DELETE_COMPLETE" => {
                ledger.record(Step::Handoff, Action::AwaitDeletion, stack, Outcome::Done);
                return;
            }
            Ok(Some(status)) if status == "DELETE_FAILED" => {
                ledger.record(
                    Step::Handoff,
                    Action::AwaitDeletion,
                    stack,
                    Outcome::Failed("stack deletion failed".to_owned()),
                );
                return;
            }
            Ok(Some(status)) => log::debug!("stack {stack} is {status}"),
            Err(e) => {
                ledger.record(
                    Step::Handoff,
                    Action::AwaitDeletion,
                    stack,
                    Outcome::from_error(&e),
                );
                return;
            }
        }
        if start.elapsed() >= delays.deletion_timeout {
            ledger.record(
                Step::Handoff,
                Action::AwaitDeletion,
                stack,
                Outcome::Failed(format!(
                    "timed out after {} seconds",
                    delays.deletion_timeout.as_secs()
                )),
            );
            return;
        }
        tokio::time::sleep(delays.deletion_poll).await;
    }
}
