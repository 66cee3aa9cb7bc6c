//! Managed - Contract between a reconciliation scheduler and an external resource
//!
//! The scheduler decides when to reconcile and how to retry. For one
//! invocation it connects, observes, and then creates, updates or deletes.
//! Engines never mutate the stored resource; they return status updates the
//! scheduler merges and persists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Failed, ReconcileResult};

/// Name of the provider configuration a managed resource uses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderReference {
    pub name: String,
}

impl ProviderReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A kind of managed resource
///
/// Binds the desired spec, the observed status and the status update type of
/// one resource kind, so an engine can only ever be handed its own kind.
pub trait Managed: Send + Sync + 'static {
    /// Kind name (e.g., "RouteTable")
    const KIND: &'static str;

    type Spec: Send + Sync;
    type Status: Send + Sync;
    type StatusUpdate: Default + std::fmt::Debug + Send;

    fn provider_ref(spec: &Self::Spec) -> &ProviderReference;
}

/// Result of observing an external resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalObservation<U> {
    pub resource_exists: bool,
    /// Whether the resource is ready for use; meaningless when it does not exist
    pub resource_available: bool,
    pub update: U,
}

impl<U: Default> ExternalObservation<U> {
    /// The resource does not exist and nothing about the status changes
    pub fn absent() -> Self {
        Self {
            resource_exists: false,
            resource_available: false,
            update: U::default(),
        }
    }
}

/// Operations on one external resource instance
///
/// All operations are async and involve side effects on the remote system.
/// Each is safe to replay: calls that already took effect are detected on the
/// next invocation instead of being repeated.
#[async_trait]
pub trait ExternalClient<M: Managed>: Send + Sync {
    /// Find out whether the external resource exists and refresh the status from it
    ///
    /// On error the status must be left untouched.
    async fn observe(
        &self,
        spec: &M::Spec,
        status: &M::Status,
    ) -> ReconcileResult<ExternalObservation<M::StatusUpdate>>;

    /// Create the external resource
    ///
    /// On failure, the returned `Failed` still carries what was created so far.
    async fn create(
        &self,
        spec: &M::Spec,
        status: &M::Status,
    ) -> Result<M::StatusUpdate, Failed<M::StatusUpdate>>;

    /// Bring an existing external resource in line with the spec
    async fn update(&self, spec: &M::Spec, status: &M::Status) -> ReconcileResult<M::StatusUpdate>;

    /// Delete the external resource
    async fn delete(&self, status: &M::Status) -> Result<M::StatusUpdate, Failed<M::StatusUpdate>>;
}

/// Produces an `ExternalClient` scoped to a resource's provider configuration
#[async_trait]
pub trait ExternalConnector<M: Managed>: Send + Sync {
    async fn connect(&self, spec: &M::Spec) -> ReconcileResult<Box<dyn ExternalClient<M>>>;
}
