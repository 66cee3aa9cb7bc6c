//! Desired spec, observed status and status updates of a route table

use serde::{Deserialize, Serialize};

use crate::client::{RemoteAssociation, RemoteRoute, RemoteRouteTable, RouteState};
use crate::condition::{Condition, set_condition};
use crate::managed::ProviderReference;

/// A desired route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination_cidr_block: String,
    pub gateway_id: String,
}

impl Route {
    pub fn new(destination_cidr_block: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        Self {
            destination_cidr_block: destination_cidr_block.into(),
            gateway_id: gateway_id.into(),
        }
    }

    /// Both the gateway and the destination must match; a partial match does not count
    pub fn is_satisfied_by(&self, observed: &RouteStatus) -> bool {
        observed.gateway_id == self.gateway_id
            && observed.destination_cidr_block == self.destination_cidr_block
    }
}

/// A desired subnet association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub subnet_id: String,
}

impl Association {
    pub fn new(subnet_id: impl Into<String>) -> Self {
        Self {
            subnet_id: subnet_id.into(),
        }
    }
}

/// Desired state of a route table, authored by the resource owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableSpec {
    /// VPC the table is created in
    pub vpc_id: String,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub associations: Vec<Association>,
    pub provider_ref: ProviderReference,
}

impl RouteTableSpec {
    pub fn new(vpc_id: impl Into<String>, provider_ref: ProviderReference) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            routes: Vec::new(),
            associations: Vec::new(),
            provider_ref,
        }
    }

    pub fn with_route(
        mut self,
        destination_cidr_block: impl Into<String>,
        gateway_id: impl Into<String>,
    ) -> Self {
        self.routes.push(Route::new(destination_cidr_block, gateway_id));
        self
    }

    pub fn with_association(mut self, subnet_id: impl Into<String>) -> Self {
        self.associations.push(Association::new(subnet_id));
        self
    }
}

/// An observed route
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteStatus {
    pub destination_cidr_block: String,
    pub gateway_id: String,
    pub state: RouteState,
}

/// An observed subnet association
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssociationStatus {
    pub subnet_id: String,
    pub association_id: String,
    #[serde(default)]
    pub main: bool,
}

/// Attributes copied from the remote route table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteTableObservation {
    /// Empty until the table has been created
    pub route_table_id: String,
    pub vpc_id: String,
    pub routes: Vec<RouteStatus>,
    pub associations: Vec<AssociationStatus>,
}

impl From<RemoteRoute> for RouteStatus {
    fn from(route: RemoteRoute) -> Self {
        Self {
            destination_cidr_block: route.destination_cidr_block,
            gateway_id: route.gateway_id,
            state: route.state,
        }
    }
}

impl From<RemoteAssociation> for AssociationStatus {
    fn from(association: RemoteAssociation) -> Self {
        Self {
            subnet_id: association.subnet_id,
            association_id: association.association_id,
            main: association.main,
        }
    }
}

impl From<RemoteRouteTable> for RouteTableObservation {
    fn from(table: RemoteRouteTable) -> Self {
        Self {
            route_table_id: table.route_table_id,
            vpc_id: table.vpc_id,
            routes: table.routes.into_iter().map(RouteStatus::from).collect(),
            associations: table
                .associations
                .into_iter()
                .map(AssociationStatus::from)
                .collect(),
        }
    }
}

/// Observed state of a route table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteTableStatus {
    #[serde(flatten)]
    pub at_provider: RouteTableObservation,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl RouteTableStatus {
    /// The id used to look up the remote table; empty means not yet created
    pub fn route_table_id(&self) -> &str {
        &self.at_provider.route_table_id
    }
}

/// Changes the caller applies to a stored `RouteTableStatus`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusUpdate {
    /// Replaces the whole observation when set
    pub at_provider: Option<RouteTableObservation>,
    pub condition: Option<Condition>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.at_provider.is_none() && self.condition.is_none()
    }

    pub fn apply(self, status: &mut RouteTableStatus) {
        if let Some(at_provider) = self.at_provider {
            status.at_provider = at_provider;
        }
        if let Some(condition) = self.condition {
            set_condition(&mut status.conditions, condition);
        }
    }
}
