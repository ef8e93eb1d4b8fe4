//! Network interfaces through EC2.
use anyhow::Context;
use aws_sdk_ec2::types::{self as aws, Filter, NetworkInterfaceStatus};

use super::{service_error, AwsCloud};
use crate::provider::{Attachment, InterfaceStatus, Network, NetworkInterface, ServiceError};

impl From<&aws::NetworkInterface> for NetworkInterface {
    fn from(value: &aws::NetworkInterface) -> Self {
        let status = match value.status() {
            Some(NetworkInterfaceStatus::Available) => InterfaceStatus::Available,
            Some(NetworkInterfaceStatus::InUse) => InterfaceStatus::InUse,
            Some(other) => InterfaceStatus::Other(other.as_str().to_owned()),
            None => InterfaceStatus::Other("unknown".to_owned()),
        };
        NetworkInterface {
            id: value.network_interface_id().unwrap_or_default().to_owned(),
            status,
            description: value.description().unwrap_or_default().to_owned(),
            network_id: value.vpc_id().map(str::to_owned),
            attachment: value.attachment().map(|attachment| Attachment {
                attachment_id: attachment.attachment_id().map(str::to_owned),
                instance_owner_id: attachment.instance_owner_id().map(str::to_owned),
            }),
        }
    }
}

impl Network for AwsCloud {
    async fn list_interfaces(&self, network_id: &str) -> anyhow::Result<Vec<NetworkInterface>> {
        let filter = Filter::builder().name("vpc-id").values(network_id).build();
        let mut interfaces = vec![];
        let mut next_token = None;
        loop {
            let output = self
                .ec2
                .describe_network_interfaces()
                .filters(filter.clone())
                .set_next_token(next_token)
                .send()
                .await
                .map_err(service_error)
                .with_context(|| format!("Failed to list interfaces in {network_id}"))?;
            interfaces.extend(output.network_interfaces().iter().map(NetworkInterface::from));
            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }
        Ok(interfaces)
    }

    async fn describe_interface(&self, interface_id: &str) -> anyhow::Result<NetworkInterface> {
        let output = self
            .ec2
            .describe_network_interfaces()
            .network_interface_ids(interface_id)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to describe interface {interface_id}"))?;
        let Some(interface) = output.network_interfaces().first() else {
            let missing = ServiceError::new(
                "InvalidNetworkInterfaceID.NotFound",
                format!("The networkInterface ID '{interface_id}' does not exist"),
            );
            return Err(anyhow::Error::new(missing))
                .with_context(|| format!("Failed to describe interface {interface_id}"));
        };
        Ok(NetworkInterface::from(interface))
    }

    async fn detach_interface(&self, attachment_id: &str) -> anyhow::Result<()> {
        self.ec2
            .detach_network_interface()
            .attachment_id(attachment_id)
            .force(true)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to detach {attachment_id}"))?;
        Ok(())
    }

    async fn delete_interface(&self, interface_id: &str) -> anyhow::Result<()> {
        self.ec2
            .delete_network_interface()
            .network_interface_id(interface_id)
            .send()
            .await
            .map_err(service_error)
            .with_context(|| format!("Failed to delete interface {interface_id}"))?;
        Ok(())
    }
}
