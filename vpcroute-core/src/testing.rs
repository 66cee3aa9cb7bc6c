//! In-memory route table API for engine tests
//!
//! Behaves like the EC2 route table API closely enough to catch ordering
//! mistakes: the local route cannot be deleted, a table with children cannot
//! be deleted, and missing objects produce the EC2 not-found codes. Every call
//! is recorded, and failures can be injected per call.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{
    ASSOCIATION_NOT_FOUND, ClientError, ClientResult, LOCAL_GATEWAY_ID, ROUTE_NOT_FOUND,
    ROUTE_TABLE_NOT_FOUND, RemoteAssociation, RemoteRoute, RemoteRouteTable, RouteState,
    RouteTableClient,
};

/// CIDR of the local route the fake adds to every new table
pub const VPC_CIDR: &str = "172.16.0.0/16";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DescribeRouteTables(Vec<String>),
    CreateRouteTable(String),
    DeleteRouteTable(String),
    CreateRoute {
        route_table_id: String,
        destination_cidr_block: String,
        gateway_id: String,
    },
    DeleteRoute {
        route_table_id: String,
        destination_cidr_block: String,
    },
    AssociateRouteTable {
        route_table_id: String,
        subnet_id: String,
    },
    DisassociateRouteTable(String),
}

type Matcher = Box<dyn Fn(&Call) -> bool + Send + Sync>;

#[derive(Default)]
struct Inner {
    tables: Vec<RemoteRouteTable>,
    calls: Vec<Call>,
    failures: Vec<(Matcher, String)>,
    next_id: u32,
    describe_returns_empty: bool,
}

#[derive(Default)]
pub struct FakeClient {
    inner: Mutex<Inner>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a table as if it existed remotely; inserting the same id twice duplicates it
    pub fn insert_table(&self, table: RemoteRouteTable) {
        self.inner.lock().unwrap().tables.push(table);
    }

    pub fn table(&self, route_table_id: &str) -> Option<RemoteRouteTable> {
        self.inner
            .lock()
            .unwrap()
            .tables
            .iter()
            .find(|t| t.route_table_id == route_table_id)
            .cloned()
    }

    pub fn table_count(&self) -> usize {
        self.inner.lock().unwrap().tables.len()
    }

    /// Make every call matching `matcher` fail with `code`
    pub fn fail_when(
        &self,
        matcher: impl Fn(&Call) -> bool + Send + Sync + 'static,
        code: impl Into<String>,
    ) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .push((Box::new(matcher), code.into()));
    }

    /// Make describe succeed with no tables instead of reporting them missing
    pub fn describe_returns_empty(&self) {
        self.inner.lock().unwrap().describe_returns_empty = true;
    }

    pub fn clear_failures(&self) {
        self.inner.lock().unwrap().failures.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) -> Result<std::sync::MutexGuard<'_, Inner>, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        let injected = inner
            .failures
            .iter()
            .find(|(matcher, _)| matcher(&call))
            .map(|(_, code)| code.clone());
        inner.calls.push(call);
        match injected {
            Some(code) => Err(ClientError::new("injected failure").with_code(code)),
            None => Ok(inner),
        }
    }
}

fn table_not_found(route_table_id: &str) -> ClientError {
    ClientError::new(format!(
        "The routeTable ID '{}' does not exist",
        route_table_id
    ))
    .with_code(ROUTE_TABLE_NOT_FOUND)
}

fn find_table<'a>(
    inner: &'a mut Inner,
    route_table_id: &str,
) -> ClientResult<&'a mut RemoteRouteTable> {
    inner
        .tables
        .iter_mut()
        .find(|t| t.route_table_id == route_table_id)
        .ok_or_else(|| table_not_found(route_table_id))
}

#[async_trait]
impl RouteTableClient for FakeClient {
    async fn describe_route_tables(
        &self,
        route_table_ids: &[String],
    ) -> ClientResult<Vec<RemoteRouteTable>> {
        let inner = self.record(Call::DescribeRouteTables(route_table_ids.to_vec()))?;
        if inner.describe_returns_empty {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for id in route_table_ids {
            let matching: Vec<_> = inner
                .tables
                .iter()
                .filter(|t| &t.route_table_id == id)
                .cloned()
                .collect();
            if matching.is_empty() {
                return Err(table_not_found(id));
            }
            found.extend(matching);
        }
        Ok(found)
    }

    async fn create_route_table(&self, vpc_id: &str) -> ClientResult<RemoteRouteTable> {
        let mut inner = self.record(Call::CreateRouteTable(vpc_id.to_string()))?;
        inner.next_id += 1;
        let table = RemoteRouteTable {
            route_table_id: format!("rtb-{:04}", inner.next_id),
            vpc_id: vpc_id.to_string(),
            routes: vec![RemoteRoute {
                destination_cidr_block: VPC_CIDR.to_string(),
                gateway_id: LOCAL_GATEWAY_ID.to_string(),
                state: RouteState::Active,
            }],
            associations: vec![],
        };
        inner.tables.push(table.clone());
        Ok(table)
    }

    async fn delete_route_table(&self, route_table_id: &str) -> ClientResult<()> {
        let mut inner = self.record(Call::DeleteRouteTable(route_table_id.to_string()))?;
        let table = find_table(&mut inner, route_table_id)?;
        let has_dependents = !table.associations.is_empty()
            || table.routes.iter().any(|r| r.gateway_id != LOCAL_GATEWAY_ID);
        if has_dependents {
            return Err(ClientError::new(format!(
                "The routeTable '{}' has dependencies and cannot be deleted.",
                route_table_id
            ))
            .with_code("DependencyViolation"));
        }
        inner.tables.retain(|t| t.route_table_id != route_table_id);
        Ok(())
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        gateway_id: &str,
    ) -> ClientResult<()> {
        let mut inner = self.record(Call::CreateRoute {
            route_table_id: route_table_id.to_string(),
            destination_cidr_block: destination_cidr_block.to_string(),
            gateway_id: gateway_id.to_string(),
        })?;
        let table = find_table(&mut inner, route_table_id)?;
        if table
            .routes
            .iter()
            .any(|r| r.destination_cidr_block == destination_cidr_block)
        {
            return Err(
                ClientError::new("The route already exists").with_code("RouteAlreadyExists"),
            );
        }
        table.routes.push(RemoteRoute {
            destination_cidr_block: destination_cidr_block.to_string(),
            gateway_id: gateway_id.to_string(),
            state: RouteState::Active,
        });
        Ok(())
    }

    async fn delete_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
    ) -> ClientResult<()> {
        let mut inner = self.record(Call::DeleteRoute {
            route_table_id: route_table_id.to_string(),
            destination_cidr_block: destination_cidr_block.to_string(),
        })?;
        let table = find_table(&mut inner, route_table_id)?;
        let Some(pos) = table
            .routes
            .iter()
            .position(|r| r.destination_cidr_block == destination_cidr_block)
        else {
            return Err(
                ClientError::new("no route with the given destination").with_code(ROUTE_NOT_FOUND),
            );
        };
        if table.routes[pos].gateway_id == LOCAL_GATEWAY_ID {
            return Err(
                ClientError::new("cannot remove local route").with_code("InvalidParameterValue"),
            );
        }
        table.routes.remove(pos);
        Ok(())
    }

    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> ClientResult<String> {
        let mut inner = self.record(Call::AssociateRouteTable {
            route_table_id: route_table_id.to_string(),
            subnet_id: subnet_id.to_string(),
        })?;
        inner.next_id += 1;
        let association_id = format!("rtbassoc-{:04}", inner.next_id);
        let table = find_table(&mut inner, route_table_id)?;
        table.associations.push(RemoteAssociation {
            association_id: association_id.clone(),
            subnet_id: subnet_id.to_string(),
            main: false,
        });
        Ok(association_id)
    }

    async fn disassociate_route_table(&self, association_id: &str) -> ClientResult<()> {
        let mut inner = self.record(Call::DisassociateRouteTable(association_id.to_string()))?;
        for table in inner.tables.iter_mut() {
            if let Some(pos) = table
                .associations
                .iter()
                .position(|a| a.association_id == association_id)
            {
                table.associations.remove(pos);
                return Ok(());
            }
        }
        Err(ClientError::new(format!(
            "The association ID '{}' does not exist",
            association_id
        ))
        .with_code(ASSOCIATION_NOT_FOUND))
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
