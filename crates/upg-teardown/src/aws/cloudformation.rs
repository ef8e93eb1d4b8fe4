//! Stacks through CloudFormation, with the handoff either to `DeleteStack` or
//! to the framework CLI.
use anyhow::Context;
use aws_sdk_cloudformation::types::StackStatus;

use super::{service_error, AwsCloud};
use crate::config::Handoff;
use crate::provider::{ResourceKind, ServiceError, StackSummary, Stacks};

impl Stacks for AwsCloud {
    async fn list_stacks(&self, statuses: &[String]) -> anyhow::Result<Vec<StackSummary>> {
        let filter = statuses
            .iter()
            .map(|status| StackStatus::from(status.as_str()))
            .collect::<Vec<_>>();
        let mut stacks = vec![];
        let mut next_token = None;
        loop {
            let output = self
                .cloudformation
                .list_stacks()
                .set_stack_status_filter(Some(filter.clone()))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(service_error)
                .context("Failed to list stacks")?;
            stacks.extend(output.stack_summaries().iter().map(|summary| StackSummary {
                name: summary.stack_name().to_owned(),
                status: summary.stack_status().as_str().to_owned(),
            }));
            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }
        Ok(stacks)
    }

    async fn list_stack_resources(
        &self,
        stack: &str,
        kind: ResourceKind,
    ) -> anyhow::Result<Vec<String>> {
        let mut ids = vec![];
        let mut next_token = None;
        loop {
            let output = self
                .cloudformation
                .list_stack_resources()
                .stack_name(stack)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(service_error)
                .with_context(|| format!("Failed to list resources of stack {stack}"))?;
            ids.extend(
                output
                    .stack_resource_summaries()
                    .iter()
                    .filter(|resource| resource.resource_type() == kind.type_name())
                    .filter_map(|resource| resource.physical_resource_id())
                    .map(str::to_owned),
            );
            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }
        Ok(ids)
    }

    async fn delete_stack(&self, stack: &str) -> anyhow::Result<()> {
        match &self.handoff {
            Handoff::Api => {
                self.cloudformation
                    .delete_stack()
                    .stack_name(stack)
                    .send()
                    .await
                    .map_err(service_error)
                    .with_context(|| format!("Failed to delete stack {stack}"))?;
            }
            Handoff::Command(program) => {
                log::debug!("handing {stack} to '{program}'");
                let status = tokio::process::Command::new(program)
                    .args([
                        "delete",
                        "--stack-name",
                        stack,
                        "--region",
                        self.region.as_str(),
                        "--no-prompts",
                    ])
                    .status()
                    .await
                    .with_context(|| format!("Failed to run '{program}'"))?;
                anyhow::ensure!(
                    status.success(),
                    "'{program} delete' for stack {stack} exited with {status}"
                );
            }
        }
        Ok(())
    }

    async fn stack_status(&self, stack: &str) -> anyhow::Result<Option<String>> {
        let output = match self
            .cloudformation
            .describe_stacks()
            .stack_name(stack)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let e = service_error(e);
                let gone = e.downcast_ref::<ServiceError>().is_some_and(|e| {
                    e.code == "ValidationError" && e.message.contains("does not exist")
                });
                if gone {
                    return Ok(None);
                }
                return Err(e).with_context(|| format!("Failed to describe stack {stack}"));
            }
        };
        Ok(output
            .stacks()
            .first()
            .map(|stack| stack.stack_status().as_str().to_owned()))
    }
}
