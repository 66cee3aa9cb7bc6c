//! EC2 route table client
//!
//! Implements `RouteTableClient` on top of `aws-sdk-ec2`. Service error codes
//! are carried over into `ClientError`, so the default not-found classifiers
//! apply unchanged.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types;
use vpcroute_core::client::{
    ClientError, ClientResult, RemoteAssociation, RemoteRoute, RemoteRouteTable, RouteState,
    RouteTableClient,
};

/// Route table client backed by the EC2 API
pub struct Ec2RouteTableClient {
    ec2_client: Ec2Client,
}

impl Ec2RouteTableClient {
    pub fn new(ec2_client: Ec2Client) -> Self {
        Self { ec2_client }
    }

    /// Build a client from a resolved SDK configuration
    ///
    /// EC2 is a regional API, so a configuration without a region is rejected.
    pub fn from_sdk_config(config: &SdkConfig) -> ClientResult<Self> {
        if config.region().is_none() {
            return Err(ClientError::new(
                "No region configured for the EC2 route table client",
            ));
        }
        Ok(Self::new(Ec2Client::new(config)))
    }
}

/// Convert an SDK failure, keeping the service error code for classification
fn client_error<E, R>(operation: &str, err: SdkError<E, R>) -> ClientError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let message = format!("{} failed: {}", operation, DisplayErrorContext(&err));

    let error = ClientError::new(message).with_cause(err);
    match code {
        Some(code) => error.with_code(code),
        None => error,
    }
}

fn route_from_sdk(route: &types::Route) -> RemoteRoute {
    RemoteRoute {
        destination_cidr_block: route.destination_cidr_block().unwrap_or_default().to_string(),
        gateway_id: route.gateway_id().unwrap_or_default().to_string(),
        // a route without a reported state is not counted as active
        state: RouteState::from(route.state().map(|s| s.as_str()).unwrap_or_default()),
    }
}

fn association_from_sdk(association: &types::RouteTableAssociation) -> RemoteAssociation {
    RemoteAssociation {
        association_id: association
            .route_table_association_id()
            .unwrap_or_default()
            .to_string(),
        subnet_id: association.subnet_id().unwrap_or_default().to_string(),
        main: association.main().unwrap_or(false),
    }
}

fn route_table_from_sdk(rt: &types::RouteTable) -> RemoteRouteTable {
    RemoteRouteTable {
        route_table_id: rt.route_table_id().unwrap_or_default().to_string(),
        vpc_id: rt.vpc_id().unwrap_or_default().to_string(),
        routes: rt.routes().iter().map(route_from_sdk).collect(),
        associations: rt.associations().iter().map(association_from_sdk).collect(),
    }
}

#[async_trait]
impl RouteTableClient for Ec2RouteTableClient {
    async fn describe_route_tables(
        &self,
        route_table_ids: &[String],
    ) -> ClientResult<Vec<RemoteRouteTable>> {
        let result = self
            .ec2_client
            .describe_route_tables()
            .set_route_table_ids(Some(route_table_ids.to_vec()))
            .send()
            .await
            .map_err(|e| client_error("DescribeRouteTables", e))?;

        Ok(result
            .route_tables()
            .iter()
            .map(route_table_from_sdk)
            .collect())
    }

    async fn create_route_table(&self, vpc_id: &str) -> ClientResult<RemoteRouteTable> {
        let result = self
            .ec2_client
            .create_route_table()
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(|e| client_error("CreateRouteTable", e))?;

        let table = result
            .route_table()
            .map(route_table_from_sdk)
            .ok_or_else(|| ClientError::new("Route Table created but not returned"))?;

        if table.route_table_id.is_empty() {
            return Err(ClientError::new("Route Table created but no ID returned"));
        }
        Ok(table)
    }

    async fn delete_route_table(&self, route_table_id: &str) -> ClientResult<()> {
        self.ec2_client
            .delete_route_table()
            .route_table_id(route_table_id)
            .send()
            .await
            .map_err(|e| client_error("DeleteRouteTable", e))?;

        Ok(())
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        gateway_id: &str,
    ) -> ClientResult<()> {
        self.ec2_client
            .create_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr_block)
            .gateway_id(gateway_id)
            .send()
            .await
            .map_err(|e| client_error("CreateRoute", e))?;

        Ok(())
    }

    async fn delete_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
    ) -> ClientResult<()> {
        self.ec2_client
            .delete_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr_block)
            .send()
            .await
            .map_err(|e| client_error("DeleteRoute", e))?;

        Ok(())
    }

    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> ClientResult<String> {
        let result = self
            .ec2_client
            .associate_route_table()
            .route_table_id(route_table_id)
            .subnet_id(subnet_id)
            .send()
            .await
            .map_err(|e| client_error("AssociateRouteTable", e))?;

        result
            .association_id()
            .map(String::from)
            .ok_or_else(|| ClientError::new("Subnet associated but no association ID returned"))
    }

    async fn disassociate_route_table(&self, association_id: &str) -> ClientResult<()> {
        self.ec2_client
            .disassociate_route_table()
            .association_id(association_id)
            .send()
            .await
            .map_err(|e| client_error("DisassociateRouteTable", e))?;

        Ok(())
    }
}
