//! Teardown for AWS.
//!
//! [`AwsConnector`] loads the ambient AWS configuration (profile and region)
//! and hands out one [`AwsCloud`] per region, which implements every provider
//! trait with the SDK clients of that region.
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};

use crate::config::{Handoff, RunConfig};
use crate::provider::{Connector, ServiceError};

pub mod account;
pub mod apigateway;
pub mod cloudformation;
pub mod dynamodb;
pub mod ec2;
pub mod s3;

/// Turns an SDK error into an `anyhow::Error` whose chain carries the
/// service's error code and message as a [`ServiceError`].
pub(crate) fn service_error<E, R>(error: SdkError<E, R>) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let service = ServiceError::new(
        error.code().unwrap_or("Unknown"),
        error.message().unwrap_or("no message"),
    );
    anyhow::Error::new(error).context(service)
}

pub struct AwsConnector {
    profile: Option<String>,
    handoff: Handoff,
}

impl AwsConnector {
    pub fn new(config: &RunConfig) -> Self {
        AwsConnector {
            profile: config.profile.clone(),
            handoff: config.handoff.clone(),
        }
    }

    async fn load(&self, region: Option<&str>) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_owned()));
        }
        loader.load().await
    }
}

impl Connector for AwsConnector {
    type Cloud = AwsCloud;

    async fn default_region(&self) -> Option<String> {
        let cfg = self.load(None).await;
        cfg.region().map(|region| region.to_string())
    }

    async fn connect(&self, region: &str) -> AwsCloud {
        let cfg = self.load(Some(region)).await;
        AwsCloud::new(region, &cfg, self.handoff.clone())
    }
}

/// SDK clients of one region.
pub struct AwsCloud {
    region: String,
    cloudformation: aws_sdk_cloudformation::Client,
    ec2: aws_sdk_ec2::Client,
    s3: aws_sdk_s3::Client,
    dynamodb: aws_sdk_dynamodb::Client,
    apigateway: aws_sdk_apigateway::Client,
    sts: aws_sdk_sts::Client,
    handoff: Handoff,
}

impl AwsCloud {
    pub fn new(region: impl Into<String>, cfg: &SdkConfig, handoff: Handoff) -> Self {
        AwsCloud {
            region: region.into(),
            cloudformation: aws_sdk_cloudformation::Client::new(cfg),
            ec2: aws_sdk_ec2::Client::new(cfg),
            s3: aws_sdk_s3::Client::new(cfg),
            dynamodb: aws_sdk_dynamodb::Client::new(cfg),
            apigateway: aws_sdk_apigateway::Client::new(cfg),
            sts: aws_sdk_sts::Client::new(cfg),
            handoff,
        }
    }
}
