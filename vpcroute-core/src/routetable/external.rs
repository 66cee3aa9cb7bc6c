//! External - Route table convergence engine
//!
//! Maps the desired spec and the observed status of one route table onto
//! remote calls. Remote calls are issued one at a time; the first failure
//! stops the operation and is returned with the status changes made so far.

use async_trait::async_trait;
use log::{debug, info};

use crate::client::{RemoteRouteTable, RouteState, RouteTableClient};
use crate::condition::Condition;
use crate::error::{Failed, ReconcileError, ReconcileResult};
use crate::managed::{ExternalClient, ExternalObservation};
use crate::routetable::RouteTable;
use crate::routetable::differ::{
    all_routes_active, missing_associations, missing_routes, removable_routes,
};
use crate::routetable::resource::{
    Association, AssociationStatus, Route, RouteStatus, RouteTableObservation, RouteTableSpec,
    RouteTableStatus, StatusUpdate,
};

/// Converges one route table through a `RouteTableClient`
pub struct RouteTableExternal<C> {
    client: C,
}

impl<C: RouteTableClient> RouteTableExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Look up a table by id; `None` if the remote reports it as not found
    async fn describe(&self, route_table_id: &str) -> ReconcileResult<Option<RemoteRouteTable>> {
        debug!("Describing route table {}", route_table_id);
        let result = self
            .client
            .describe_route_tables(&[route_table_id.to_string()])
            .await;

        let mut tables = match result {
            Ok(tables) => tables,
            Err(e) if self.client.is_route_table_not_found(&e) => {
                debug!("Route table {} not found", route_table_id);
                return Ok(None);
            }
            Err(source) => {
                return Err(ReconcileError::Describe {
                    id: route_table_id.to_string(),
                    source,
                });
            }
        };

        // in a successful response, there should be one and only one table
        if tables.len() != 1 {
            return Err(ReconcileError::MultipleResources {
                id: route_table_id.to_string(),
                count: tables.len(),
            });
        }
        Ok(tables.pop())
    }

    async fn create_into(
        &self,
        spec: &RouteTableSpec,
        status: &RouteTableStatus,
        update: &mut StatusUpdate,
    ) -> ReconcileResult<()> {
        update.condition = Some(Condition::creating());

        // A table id already in the status means an earlier Create got at
        // least this far; resume on that table instead of creating another.
        let existing = if status.route_table_id().is_empty() {
            None
        } else {
            self.describe(status.route_table_id()).await?
        };

        let table = match existing {
            Some(table) => {
                debug!(
                    "Resuming creation of route table {}",
                    table.route_table_id
                );
                table
            }
            None => {
                let table = self
                    .client
                    .create_route_table(&spec.vpc_id)
                    .await
                    .map_err(|source| ReconcileError::Create {
                        vpc_id: spec.vpc_id.clone(),
                        source,
                    })?;
                info!(
                    "Created route table {} in {}",
                    table.route_table_id, spec.vpc_id
                );
                table
            }
        };

        let observation = update
            .at_provider
            .insert(RouteTableObservation::from(table));

        self.create_routes(&spec.routes, observation).await?;
        self.create_associations(&spec.associations, observation)
            .await?;

        Ok(())
    }

    /// Create every desired route the observation does not already hold
    ///
    /// Created routes are appended to the observation as they succeed.
    async fn create_routes(
        &self,
        desired: &[Route],
        observation: &mut RouteTableObservation,
    ) -> ReconcileResult<()> {
        let table_id = observation.route_table_id.clone();

        for route in missing_routes(desired, &observation.routes) {
            debug!(
                "Creating route {} via {} in {}",
                route.destination_cidr_block, route.gateway_id, table_id
            );
            self.client
                .create_route(&table_id, &route.destination_cidr_block, &route.gateway_id)
                .await
                .map_err(|source| ReconcileError::CreateRoute {
                    route_table_id: table_id.clone(),
                    destination_cidr_block: route.destination_cidr_block.clone(),
                    gateway_id: route.gateway_id.clone(),
                    source,
                })?;

            observation.routes.push(RouteStatus {
                destination_cidr_block: route.destination_cidr_block.clone(),
                gateway_id: route.gateway_id.clone(),
                state: RouteState::Active,
            });
        }

        Ok(())
    }

    async fn create_associations(
        &self,
        desired: &[Association],
        observation: &mut RouteTableObservation,
    ) -> ReconcileResult<()> {
        let table_id = observation.route_table_id.clone();

        for asc in missing_associations(desired, &observation.associations) {
            debug!("Associating subnet {} with {}", asc.subnet_id, table_id);
            let association_id = self
                .client
                .associate_route_table(&table_id, &asc.subnet_id)
                .await
                .map_err(|source| ReconcileError::Associate {
                    route_table_id: table_id.clone(),
                    subnet_id: asc.subnet_id.clone(),
                    source,
                })?;

            observation.associations.push(AssociationStatus {
                subnet_id: asc.subnet_id.clone(),
                association_id,
                main: false,
            });
        }

        Ok(())
    }

    async fn delete_routes(&self, table_id: &str, observed: &[RouteStatus]) -> ReconcileResult<()> {
        for route in removable_routes(observed) {
            debug!(
                "Deleting route {} from {}",
                route.destination_cidr_block, table_id
            );
            match self
                .client
                .delete_route(table_id, &route.destination_cidr_block)
                .await
            {
                Ok(()) => {}
                Err(e) if self.client.is_route_not_found(&e) => {
                    debug!(
                        "Route {} already gone from {}",
                        route.destination_cidr_block, table_id
                    );
                }
                Err(source) => {
                    return Err(ReconcileError::DeleteRoute {
                        route_table_id: table_id.to_string(),
                        destination_cidr_block: route.destination_cidr_block.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    async fn delete_associations(&self, observed: &[AssociationStatus]) -> ReconcileResult<()> {
        for asc in observed {
            debug!(
                "Disassociating subnet {} ({})",
                asc.subnet_id, asc.association_id
            );
            match self
                .client
                .disassociate_route_table(&asc.association_id)
                .await
            {
                Ok(()) => {}
                Err(e) if self.client.is_association_not_found(&e) => {
                    debug!("Association {} already gone", asc.association_id);
                }
                Err(source) => {
                    return Err(ReconcileError::Disassociate {
                        subnet_id: asc.subnet_id.clone(),
                        association_id: asc.association_id.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    async fn delete_into(
        &self,
        status: &RouteTableStatus,
        update: &mut StatusUpdate,
    ) -> ReconcileResult<()> {
        let table_id = status.route_table_id();
        if table_id.is_empty() {
            return Err(ReconcileError::DeleteNotPresent);
        }

        update.condition = Some(Condition::deleting());

        // the table cannot be deleted while routes or associations remain
        self.delete_routes(table_id, &status.at_provider.routes)
            .await?;
        self.delete_associations(&status.at_provider.associations)
            .await?;

        match self.client.delete_route_table(table_id).await {
            Ok(()) => info!("Deleted route table {}", table_id),
            Err(e) if self.client.is_route_table_not_found(&e) => {
                debug!("Route table {} already gone", table_id);
            }
            Err(source) => {
                return Err(ReconcileError::Delete {
                    id: table_id.to_string(),
                    source,
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<C: RouteTableClient> ExternalClient<RouteTable> for RouteTableExternal<C> {
    async fn observe(
        &self,
        _spec: &RouteTableSpec,
        status: &RouteTableStatus,
    ) -> ReconcileResult<ExternalObservation<StatusUpdate>> {
        // nothing to look up until a table has been created
        if status.route_table_id().is_empty() {
            return Ok(ExternalObservation::absent());
        }

        let Some(table) = self.describe(status.route_table_id()).await? else {
            return Ok(ExternalObservation::absent());
        };

        let observation = RouteTableObservation::from(table);
        let available = all_routes_active(&observation.routes);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_available: available,
            update: StatusUpdate {
                at_provider: Some(observation),
                condition: available.then(Condition::available),
            },
        })
    }

    async fn create(
        &self,
        spec: &RouteTableSpec,
        status: &RouteTableStatus,
    ) -> Result<StatusUpdate, Failed<StatusUpdate>> {
        let mut update = StatusUpdate::default();
        match self.create_into(spec, status, &mut update).await {
            Ok(()) => Ok(update),
            Err(error) => Err(Failed::new(update, error)),
        }
    }

    async fn update(
        &self,
        _spec: &RouteTableSpec,
        _status: &RouteTableStatus,
    ) -> ReconcileResult<StatusUpdate> {
        // TODO: reconcile drift once mutable and immutable attributes are
        // told apart; until then nothing existing is modified
        Ok(StatusUpdate::default())
    }

    async fn delete(
        &self,
        status: &RouteTableStatus,
    ) -> Result<StatusUpdate, Failed<StatusUpdate>> {
        let mut update = StatusUpdate::default();
        match self.delete_into(status, &mut update).await {
            Ok(()) => Ok(update),
            Err(error) => Err(Failed::new(update, error)),
        }
    }
}
