//! Error types returned to the reconciliation scheduler

use thiserror::Error;

use crate::client::ClientError;

/// Boxed error for collaborators whose error type the core does not know
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a single reconciliation call
///
/// Every variant names the operation and the identifier it was acting on.
/// None of them is retried here; the scheduler retries the whole reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Provider configuration could not be resolved
    #[error("cannot resolve provider configuration {provider}")]
    ConfigResolution {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// The remote client could not be built from the resolved configuration
    #[error("cannot create a new route table client")]
    ClientConstruction {
        #[source]
        source: ClientError,
    },

    #[error("failed to describe route table with id: {id}")]
    Describe {
        id: String,
        #[source]
        source: ClientError,
    },

    /// A single route table id resolved to zero or several remote objects
    #[error("retrieved {count} route tables for the given route table id: {id}")]
    MultipleResources { id: String, count: usize },

    #[error("failed to create a route table in {vpc_id}")]
    Create {
        vpc_id: String,
        #[source]
        source: ClientError,
    },

    #[error(
        "failed to create route {destination_cidr_block} via {gateway_id} in route table {route_table_id}"
    )]
    CreateRoute {
        route_table_id: String,
        destination_cidr_block: String,
        gateway_id: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to associate subnet {subnet_id} to route table {route_table_id}")]
    Associate {
        route_table_id: String,
        subnet_id: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to delete route table {id}")]
    Delete {
        id: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to delete route {destination_cidr_block} in route table {route_table_id}")]
    DeleteRoute {
        route_table_id: String,
        destination_cidr_block: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to disassociate subnet {subnet_id} (association {association_id})")]
    Disassociate {
        subnet_id: String,
        association_id: String,
        #[source]
        source: ClientError,
    },

    #[error("cannot delete the route table, since the route table id is not present")]
    DeleteNotPresent,
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// A failed call together with the status changes it made before failing
///
/// Create and Delete make progress one remote call at a time. When a later
/// call fails, the earlier ones are not undone, so the caller must still
/// persist `update` for the next reconciliation to pick up where this one
/// stopped.
#[derive(Debug)]
pub struct Failed<U> {
    pub update: U,
    pub error: ReconcileError,
}

impl<U> Failed<U> {
    pub fn new(update: U, error: ReconcileError) -> Self {
        Self { update, error }
    }

    pub fn into_error(self) -> ReconcileError {
        self.error
    }
}

impl<U: Default> From<ReconcileError> for Failed<U> {
    fn from(error: ReconcileError) -> Self {
        Self::new(U::default(), error)
    }
}

impl<U> std::fmt::Display for Failed<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<U: std::fmt::Debug> std::error::Error for Failed<U> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}
