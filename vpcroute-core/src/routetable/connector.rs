//! Connector - Builds a route table engine for a resource's provider configuration

use async_trait::async_trait;
use log::debug;

use crate::client::{ClientResult, RouteTableClient};
use crate::error::{BoxError, ReconcileError, ReconcileResult};
use crate::managed::{ExternalClient, ExternalConnector, Managed, ProviderReference};
use crate::routetable::{RouteTable, RouteTableExternal, RouteTableSpec};

/// Resolves a provider reference into the configuration a client is built from
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    type Config: Send + Sync;

    async fn resolve(&self, provider: &ProviderReference) -> Result<Self::Config, BoxError>;
}

/// Connects route table resources to their remote API
///
/// Holds an injected configuration resolver and client factory. Nothing is
/// cached: every `connect` resolves the configuration and builds a new client.
pub struct Connector<R, F> {
    resolver: R,
    new_client: F,
}

impl<R, F> Connector<R, F> {
    pub fn new(resolver: R, new_client: F) -> Self {
        Self {
            resolver,
            new_client,
        }
    }
}

#[async_trait]
impl<R, F, C> ExternalConnector<RouteTable> for Connector<R, F>
where
    R: ConfigResolver,
    F: Fn(&R::Config) -> ClientResult<C> + Send + Sync,
    C: RouteTableClient + 'static,
{
    async fn connect(
        &self,
        spec: &RouteTableSpec,
    ) -> ReconcileResult<Box<dyn ExternalClient<RouteTable>>> {
        let provider = RouteTable::provider_ref(spec);
        debug!("Connecting {} with provider {}", RouteTable::KIND, provider.name);

        let config = self.resolver.resolve(provider).await.map_err(|source| {
            ReconcileError::ConfigResolution {
                provider: provider.name.clone(),
                source,
            }
        })?;

        let client = (self.new_client)(&config)
            .map_err(|source| ReconcileError::ClientConstruction { source })?;

        Ok(Box::new(RouteTableExternal::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::routetable::RouteTableStatus;
    use crate::testing::FakeClient;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fake(_: &String) -> ClientResult<FakeClient> {
        Ok(FakeClient::new())
    }

    /// Resolves only the "default" provider, to its region
    struct StaticResolver;

    #[async_trait]
    impl ConfigResolver for StaticResolver {
        type Config = String;

        async fn resolve(&self, provider: &ProviderReference) -> Result<String, BoxError> {
            if provider.name == "default" {
                Ok("ap-northeast-1".to_string())
            } else {
                Err(format!("provider configuration {} not found", provider.name).into())
            }
        }
    }

    /// Counts how many times a configuration was resolved
    #[derive(Default)]
    struct CountingResolver {
        resolved: AtomicUsize,
    }

    #[async_trait]
    impl ConfigResolver for Arc<CountingResolver> {
        type Config = String;

        async fn resolve(&self, _provider: &ProviderReference) -> Result<String, BoxError> {
            self.resolved.fetch_add(1, Ordering::SeqCst);
            Ok("ap-northeast-1".to_string())
        }
    }

    fn spec(provider: &str) -> RouteTableSpec {
        RouteTableSpec::new("vpc-1", ProviderReference::new(provider))
    }

    #[tokio::test]
    async fn connect_builds_client_from_resolved_config() {
        let connector = Connector::new(
            StaticResolver,
            |region: &String| -> ClientResult<FakeClient> {
                assert_eq!(region, "ap-northeast-1");
                Ok(FakeClient::new())
            },
        );

        let external = connector.connect(&spec("default")).await.unwrap();
        let observation = external
            .observe(&spec("default"), &RouteTableStatus::default())
            .await
            .unwrap();
        assert!(!observation.resource_exists);
    }

    #[tokio::test]
    async fn connect_reports_unresolvable_provider() {
        let connector = Connector::new(StaticResolver, fake);

        let err = connector.connect(&spec("staging")).await.err().unwrap();
        match err {
            ReconcileError::ConfigResolution { provider, source } => {
                assert_eq!(provider, "staging");
                assert_eq!(source.to_string(), "provider configuration staging not found");
            }
            other => panic!("Expected ConfigResolution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connect_reports_client_construction_failure() {
        let connector = Connector::new(StaticResolver, |_: &String| -> ClientResult<FakeClient> {
            Err(ClientError::new("no credentials"))
        });

        let err = connector.connect(&spec("default")).await.err().unwrap();
        assert!(matches!(err, ReconcileError::ClientConstruction { .. }));
        assert_eq!(err.to_string(), "cannot create a new route table client");
    }

    #[tokio::test]
    async fn connected_client_issues_remote_calls() {
        let connector = Connector::new(StaticResolver, fake);
        let spec = spec("default").with_route("0.0.0.0/0", "igw-1");

        let external = connector.connect(&spec).await.unwrap();
        let update = external
            .create(&spec, &RouteTableStatus::default())
            .await
            .unwrap();

        let observation = update.at_provider.unwrap();
        assert_eq!(observation.route_table_id, "rtb-0001");
        assert_eq!(observation.routes.len(), 2);
    }

    #[tokio::test]
    async fn connect_resolves_and_builds_on_every_call() {
        let resolver = Arc::new(CountingResolver::default());
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let connector = Connector::new(
            resolver.clone(),
            move |_: &String| -> ClientResult<FakeClient> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(FakeClient::new())
            },
        );

        connector.connect(&spec("default")).await.unwrap();
        connector.connect(&spec("default")).await.unwrap();

        assert_eq!(resolver.resolved.load(Ordering::SeqCst), 2);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }
}
