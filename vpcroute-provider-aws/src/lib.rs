//! vpcroute AWS Provider
//!
//! Binds the route table engine to EC2: provider configurations resolve into
//! an AWS SDK configuration, which builds an [`Ec2RouteTableClient`].

pub mod config;
pub mod ec2;

pub use config::{AwsConfigResolver, ConfigError, ProviderConfig, ProviderConfigs};
pub use ec2::Ec2RouteTableClient;

use vpcroute_core::{Connector, ExternalConnector, RouteTable};

/// Connector that talks to EC2 with the named provider configurations
pub fn aws_connector(configs: ProviderConfigs) -> impl ExternalConnector<RouteTable> {
    Connector::new(
        AwsConfigResolver::new(configs),
        Ec2RouteTableClient::from_sdk_config,
    )
}
