//! Usage plan and API key cascade deletion.
//!
//! Works on the region's governance objects directly, independent of any
//! stack. In `confirm` mode a plan is only deleted after removal of each of
//! its key and stage associations has been attempted, and after a short
//! pause.
use crate::config::{CascadeMode, Delays};
use crate::provider::{Governance, UsagePlan};
use crate::report::{Action, GovernanceReport, Outcome, Step};

pub async fn cascade(
    cloud: &impl Governance,
    region: &str,
    mode: CascadeMode,
    delays: &Delays,
) -> GovernanceReport {
    let mut report = GovernanceReport::new(region, mode);
    let plans = match cloud.list_usage_plans().await {
        Ok(plans) => plans,
        Err(e) => {
            report.record(
                Step::Governance,
                Action::List,
                "usage plans",
                Outcome::from_error(&e),
            );
            return report;
        }
    };
    if plans.is_empty() {
        report.notice("no usage plans found");
    }
    report.plans = plans.clone();

    match mode {
        CascadeMode::Inspect => inspect(&plans, &mut report),
        CascadeMode::Unassociate => {
            for plan in &plans {
                remove_stages(cloud, plan, &mut report).await;
            }
        }
        CascadeMode::DryRun => {
            list_keys(cloud, &mut report).await;
            let names = plans
                .iter()
                .map(|plan| format!("usage plan '{}' ({})", plan.name, plan.id))
                .chain(
                    report
                        .keys
                        .iter()
                        .map(|key| format!("API key '{}' ({})", key.name, key.id)),
                )
                .collect::<Vec<_>>();
            for name in names {
                report.notice(format!("would delete {name}"));
            }
            let notice = format!(
                "dry run: would delete {} usage plan(s) and {} API key(s)",
                report.plans.len(),
                report.keys.len()
            );
            report.notice(notice);
        }
        CascadeMode::Confirm => {
            for plan in &plans {
                delete_plan(cloud, plan, delays, &mut report).await;
            }
            list_keys(cloud, &mut report).await;
            let keys = report.keys.clone();
            for key in keys {
                let result = cloud.delete_api_key(&key.id).await;
                report.record_with_detail(
                    Step::Governance,
                    Action::Delete,
                    &key.id,
                    Outcome::from_result(&result),
                    Some(format!("API key '{}'", key.name)),
                );
            }
        }
    }
    report
}

fn inspect(plans: &[UsagePlan], report: &mut GovernanceReport) {
    for plan in plans {
        if plan.api_stages.is_empty() {
            report.notice(format!("plan '{}' ({}) has no stages", plan.name, plan.id));
        }
        for stage in &plan.api_stages {
            report.notice(format!("plan '{}' ({}) -> {stage}", plan.name, plan.id));
        }
    }
}

async fn list_keys(cloud: &impl Governance, report: &mut GovernanceReport) {
    match cloud.list_api_keys().await {
        Ok(keys) => report.keys = keys,
        Err(e) => {
            report.record(
                Step::Governance,
                Action::List,
                "API keys",
                Outcome::from_error(&e),
            );
        }
    }
}

async fn remove_stages(cloud: &impl Governance, plan: &UsagePlan, report: &mut GovernanceReport) {
    for stage in &plan.api_stages {
        let result = cloud.remove_plan_stage(&plan.id, stage).await;
        report.record_with_detail(
            Step::Governance,
            Action::RemoveStage,
            stage.to_string(),
            Outcome::from_result(&result),
            Some(format!("from plan {}", plan.id)),
        );
    }
}

async fn delete_plan(
    cloud: &impl Governance,
    plan: &UsagePlan,
    delays: &Delays,
    report: &mut GovernanceReport,
) {
    match cloud.list_plan_keys(&plan.id).await {
        Ok(keys) => {
            for key in keys {
                let result = cloud.remove_plan_key(&plan.id, &key.id).await;
                report.record_with_detail(
                    Step::Governance,
                    Action::RemoveKey,
                    &key.id,
                    Outcome::from_result(&result),
                    Some(format!("from plan {}", plan.id)),
                );
            }
        }
        Err(e) => {
            report.record(
                Step::Governance,
                Action::List,
                format!("keys of plan {}", plan.id),
                Outcome::from_error(&e),
            );
        }
    }
    remove_stages(cloud, plan, report).await;

    tokio::time::sleep(delays.plan_delete).await;
    let result = cloud.delete_usage_plan(&plan.id).await;
    report.record_with_detail(
        Step::Governance,
        Action::Delete,
        &plan.id,
        Outcome::from_result(&result),
        Some(format!("usage plan '{}'", plan.name)),
    );
}
