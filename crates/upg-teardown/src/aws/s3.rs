//! Buckets through S3.
use anyhow::Context;

use super::{service_error, AwsCloud};
use crate::provider::Storage;

impl AwsCloud {
    async fn delete_object(&self, bucket: &str, key: &str, version: Option<&str>) -> anyhow::Result<()> {
        log::trace!("deleting s3://{bucket}/{key} {version:?}");
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version.map(str::to_owned))
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to delete s3://{bucket}/{key}"))?;
        Ok(())
    }

    /// Removes every object version and delete marker left behind in a
    /// versioned bucket.
    async fn remove_versions(&self, bucket: &str) -> anyhow::Result<usize> {
        let mut removed = 0;
        let mut key_marker = None;
        let mut version_marker = None;
        loop {
            let output = self
                .s3
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker)
                .set_version_id_marker(version_marker)
                .send()
                .await
                .map_err(service_error)
                .with_context(|| format!("Failed to list object versions in {bucket}"))?;

            let versions = output
                .versions()
                .iter()
                .map(|version| (version.key(), version.version_id()));
            let markers = output
                .delete_markers()
                .iter()
                .map(|marker| (marker.key(), marker.version_id()));
            for (key, version) in versions.chain(markers) {
                if let Some(key) = key {
                    self.delete_object(bucket, key, version).await?;
                    removed += 1;
                }
            }

            if output.is_truncated() == Some(true) {
                key_marker = output.next_key_marker().map(str::to_owned);
                version_marker = output.next_version_id_marker().map(str::to_owned);
            } else {
                break;
            }
        }
        Ok(removed)
    }
}

impl Storage for AwsCloud {
    async fn empty_bucket(&self, bucket: &str) -> anyhow::Result<usize> {
        let mut removed = 0;
        let mut continuation_token = None;
        loop {
            let output = self
                .s3
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(service_error)
                .with_context(|| format!("Failed to list objects in {bucket}"))?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    self.delete_object(bucket, key, None).await?;
                    removed += 1;
                }
            }

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(str::to_owned);
            } else {
                break;
            }
        }

        let versions = self.remove_versions(bucket).await?;
        if versions > 0 {
            log::debug!("removed {versions} version(s) and delete marker(s) from {bucket}");
        }
        Ok(removed)
    }

    async fn delete_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        self.s3
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to delete bucket {bucket}"))?;
        Ok(())
    }
}
