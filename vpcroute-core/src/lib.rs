//! vpcroute Core
//!
//! Convergence engine for VPC route tables. A reconciliation scheduler drives
//! the engine through the Observe/Create/Update/Delete contract in [`managed`];
//! every remote call goes through the [`client::RouteTableClient`] interface.

pub mod client;
pub mod condition;
pub mod error;
pub mod managed;
pub mod routetable;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientError, ClientResult, RouteTableClient};
pub use error::{BoxError, Failed, ReconcileError, ReconcileResult};
pub use managed::{
    ExternalClient, ExternalConnector, ExternalObservation, Managed, ProviderReference,
};
pub use routetable::{
    ConfigResolver, Connector, RouteTable, RouteTableExternal, RouteTableSpec, RouteTableStatus,
    StatusUpdate,
};
