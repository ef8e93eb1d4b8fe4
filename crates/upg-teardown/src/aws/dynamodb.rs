//! Tables through DynamoDB.
use anyhow::Context;

use super::{service_error, AwsCloud};
use crate::provider::Tables;

impl Tables for AwsCloud {
    async fn disable_deletion_protection(&self, table: &str) -> anyhow::Result<()> {
        self.dynamodb
            .update_table()
            .table_name(table)
            .deletion_protection_enabled(false)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to disable deletion protection of {table}"))?;
        Ok(())
    }

    async fn delete_table(&self, table: &str) -> anyhow::Result<()> {
        self.dynamodb
            .delete_table()
            .table_name(table)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to delete table {table}"))?;
        Ok(())
    }
}
