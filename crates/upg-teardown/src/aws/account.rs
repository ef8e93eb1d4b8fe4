//! Caller identity and region discovery.
use anyhow::Context;

use super::{service_error, AwsCloud};
use crate::provider::{Account, CallerIdentity};

impl Account for AwsCloud {
    async fn caller_identity(&self) -> anyhow::Result<CallerIdentity> {
        let output = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(service_error)
            .context("Failed to get caller identity")?;
        Ok(CallerIdentity {
            account: output.account().unwrap_or_default().to_owned(),
            arn: output.arn().unwrap_or_default().to_owned(),
        })
    }

    async fn list_regions(&self) -> anyhow::Result<Vec<String>> {
        let output = self
            .ec2
            .describe_regions()
            .send()
            .await
            .map_err(service_error)
            .context("Failed to describe regions")?;
        Ok(output
            .regions()
            .iter()
            .filter_map(|region| region.region_name())
            .map(str::to_owned)
            .collect())
    }
}
