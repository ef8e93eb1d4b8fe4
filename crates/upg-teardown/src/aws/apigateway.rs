//! Usage plans and API keys through API Gateway.
use anyhow::Context;
use aws_sdk_apigateway::types::{Op, PatchOperation};

use super::{service_error, AwsCloud};
use crate::provider::{ApiKey, ApiStage, Governance, PlanKey, UsagePlan};

/// Page size for the listing calls.
const PAGE_LIMIT: i32 = 500;

impl Governance for AwsCloud {
    async fn list_usage_plans(&self) -> anyhow::Result<Vec<UsagePlan>> {
        let mut plans = vec![];
        let mut position = None;
        loop {
            let output = self
                .apigateway
                .get_usage_plans()
                .limit(PAGE_LIMIT)
                .set_position(position)
                .send()
                .await
                .map_err(service_error)
                .context("Failed to list usage plans")?;
            plans.extend(output.items().iter().map(|plan| UsagePlan {
                id: plan.id().unwrap_or_default().to_owned(),
                name: plan.name().unwrap_or_default().to_owned(),
                api_stages: plan
                    .api_stages()
                    .iter()
                    .map(|stage| ApiStage {
                        api_id: stage.api_id().unwrap_or_default().to_owned(),
                        stage: stage.stage().unwrap_or_default().to_owned(),
                    })
                    .collect(),
            }));
            position = output.position().map(str::to_owned);
            if position.is_none() {
                break;
            }
        }
        Ok(plans)
    }

    async fn list_plan_keys(&self, plan_id: &str) -> anyhow::Result<Vec<PlanKey>> {
        let mut keys = vec![];
        let mut position = None;
        loop {
            let output = self
                .apigateway
                .get_usage_plan_keys()
                .usage_plan_id(plan_id)
                .limit(PAGE_LIMIT)
                .set_position(position)
                .send()
                .await
                .map_err(service_error)
                .with_context(|| format!("Failed to list keys of usage plan {plan_id}"))?;
            keys.extend(output.items().iter().map(|key| PlanKey {
                id: key.id().unwrap_or_default().to_owned(),
                name: key.name().unwrap_or_default().to_owned(),
            }));
            position = output.position().map(str::to_owned);
            if position.is_none() {
                break;
            }
        }
        Ok(keys)
    }

    async fn remove_plan_key(&self, plan_id: &str, key_id: &str) -> anyhow::Result<()> {
        self.apigateway
            .delete_usage_plan_key()
            .usage_plan_id(plan_id)
            .key_id(key_id)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to remove key {key_id} from usage plan {plan_id}"))?;
        Ok(())
    }

    async fn remove_plan_stage(&self, plan_id: &str, stage: &ApiStage) -> anyhow::Result<()> {
        let patch = PatchOperation::builder()
            .op(Op::Remove)
            .path("/apiStages")
            .value(stage.to_string())
            .build();
        self.apigateway
            .update_usage_plan()
            .usage_plan_id(plan_id)
            .patch_operations(patch)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to remove stage {stage} from usage plan {plan_id}"))?;
        Ok(())
    }

    async fn delete_usage_plan(&self, plan_id: &str) -> anyhow::Result<()> {
        self.apigateway
            .delete_usage_plan()
            .usage_plan_id(plan_id)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to delete usage plan {plan_id}"))?;
        Ok(())
    }

    async fn list_api_keys(&self) -> anyhow::Result<Vec<ApiKey>> {
        let mut keys = vec![];
        let mut position = None;
        loop {
            let output = self
                .apigateway
                .get_api_keys()
                .limit(PAGE_LIMIT)
                .set_position(position)
                .send()
                .await
                .map_err(service_error)
                .context("Failed to list API keys")?;
            keys.extend(output.items().iter().map(|key| ApiKey {
                id: key.id().unwrap_or_default().to_owned(),
                name: key.name().unwrap_or_default().to_owned(),
            }));
            position = output.position().map(str::to_owned);
            if position.is_none() {
                break;
            }
        }
        Ok(keys)
    }

    async fn delete_api_key(&self, key_id: &str) -> anyhow::Result<()> {
        self.apigateway
            .delete_api_key()
            .api_key(key_id)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to delete API key {key_id}"))?;
        Ok(())
    }
}
