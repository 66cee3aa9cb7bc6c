//! Client - Capability interface for the remote route table API
//!
//! The engine never talks to a cloud SDK directly. Every remote call goes
//! through `RouteTableClient`, which a provider crate implements on top of its
//! SDK and hands to the engine through a connector.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gateway of the route every table carries for its own VPC CIDR.
/// The remote API refuses to delete it.
pub const LOCAL_GATEWAY_ID: &str = "local";

/// Error code returned when a route table id does not resolve
pub const ROUTE_TABLE_NOT_FOUND: &str = "InvalidRouteTableID.NotFound";

/// Error code returned when no route matches a destination
pub const ROUTE_NOT_FOUND: &str = "InvalidRoute.NotFound";

/// Error code returned when an association id does not resolve
pub const ASSOCIATION_NOT_FOUND: &str = "InvalidAssociationID.NotFound";

/// Error type for RouteTableClient calls
#[derive(Debug)]
pub struct ClientError {
    pub message: String,
    /// Service error code (e.g., "InvalidRoute.NotFound") when the remote reported one
    pub code: Option<String>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref code) = self.code {
            write!(f, "{}: {}", code, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            cause: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns true if the remote reported exactly this error code
    pub fn has_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// State of a route as reported by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteState {
    Active,
    /// The route's target is gone; traffic is dropped
    Blackhole,
    /// A state this crate does not know about, kept verbatim
    Other(String),
}

/// A route whose state was never reported is not assumed to be active
impl Default for RouteState {
    fn default() -> Self {
        RouteState::Other(String::new())
    }
}

impl RouteState {
    pub fn as_str(&self) -> &str {
        match self {
            RouteState::Active => "active",
            RouteState::Blackhole => "blackhole",
            RouteState::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RouteState::Active)
    }
}

impl From<&str> for RouteState {
    fn from(value: &str) -> Self {
        match value {
            "active" => RouteState::Active,
            "blackhole" => RouteState::Blackhole,
            other => RouteState::Other(other.to_string()),
        }
    }
}

impl From<String> for RouteState {
    fn from(value: String) -> Self {
        RouteState::from(value.as_str())
    }
}

impl From<RouteState> for String {
    fn from(value: RouteState) -> Self {
        value.as_str().to_string()
    }
}

/// A route inside a remote route table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteRoute {
    pub destination_cidr_block: String,
    /// Empty when the route targets something other than a gateway (e.g., a NAT gateway)
    pub gateway_id: String,
    pub state: RouteState,
}

/// A subnet association of a remote route table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteAssociation {
    pub association_id: String,
    /// Empty for the VPC's main association
    pub subnet_id: String,
    pub main: bool,
}

/// A route table as returned by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteRouteTable {
    pub route_table_id: String,
    pub vpc_id: String,
    pub routes: Vec<RemoteRoute>,
    pub associations: Vec<RemoteAssociation>,
}

/// Remote calls needed to converge a route table
///
/// Implementations translate each call into one request against the remote
/// API and report failures as `ClientError`. The `is_*_not_found` classifiers
/// default to the EC2 error codes; implementations whose remote reports absence
/// differently override them.
#[async_trait]
pub trait RouteTableClient: Send + Sync {
    /// Describe the route tables with the given ids
    async fn describe_route_tables(
        &self,
        route_table_ids: &[String],
    ) -> ClientResult<Vec<RemoteRouteTable>>;

    /// Create an empty route table in a VPC
    ///
    /// The returned table carries whatever routes the remote adds by itself
    /// (the local route for the VPC CIDR).
    async fn create_route_table(&self, vpc_id: &str) -> ClientResult<RemoteRouteTable>;

    async fn delete_route_table(&self, route_table_id: &str) -> ClientResult<()>;

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        gateway_id: &str,
    ) -> ClientResult<()>;

    async fn delete_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
    ) -> ClientResult<()>;

    /// Associate a subnet with a route table, returning the association id
    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> ClientResult<String>;

    async fn disassociate_route_table(&self, association_id: &str) -> ClientResult<()>;

    fn is_route_table_not_found(&self, err: &ClientError) -> bool {
        err.has_code(ROUTE_TABLE_NOT_FOUND)
    }

    fn is_route_not_found(&self, err: &ClientError) -> bool {
        err.has_code(ROUTE_NOT_FOUND)
    }

    fn is_association_not_found(&self, err: &ClientError) -> bool {
        err.has_code(ASSOCIATION_NOT_FOUND)
    }
}
