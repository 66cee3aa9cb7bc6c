//! Route table managed resource
//!
//! A route table with its routes and subnet associations, converged additively:
//! missing children are created, nothing existing is changed, and teardown
//! removes children before the table.

pub mod connector;
pub mod differ;
pub mod external;
pub mod resource;

pub use connector::{ConfigResolver, Connector};
pub use external::RouteTableExternal;
pub use resource::{
    Association, AssociationStatus, Route, RouteStatus, RouteTableObservation, RouteTableSpec,
    RouteTableStatus, StatusUpdate,
};

use crate::managed::{Managed, ProviderReference};

/// The route table resource kind
pub struct RouteTable;

impl Managed for RouteTable {
    const KIND: &'static str = "RouteTable";

    type Spec = RouteTableSpec;
    type Status = RouteTableStatus;
    type StatusUpdate = StatusUpdate;

    fn provider_ref(spec: &RouteTableSpec) -> &ProviderReference {
        &spec.provider_ref
    }
}
