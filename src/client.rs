//! Client entry point
//!
//! Wires configuration, transport, throttle store and resource catalog into
//! the root [`ResourceNode`] that addresses the admin base URL.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{ReqwestTransport, RequestExecutor, Transport};
use crate::resource::{ResourceCatalog, ResourceNode};
use crate::response::ResponseProcessor;
use crate::telemetry::{TelemetrySink, TracingSink};
use crate::throttle::{FileStore, InMemoryStore, ThrottleController, ThrottleStore};
use crate::types::{ResourceId, ThrottleTier};
use std::sync::Arc;
use tracing::debug;

/// Entry point to one tenant's admin API
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    catalog: Arc<ResourceCatalog>,
    executor: Arc<RequestExecutor>,
}

impl Client {
    /// Build a client over an explicit transport and throttle store
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn ThrottleStore>,
    ) -> Result<Self> {
        config.validate()?;

        let catalog = match &config.catalog_path {
            Some(path) => ResourceCatalog::from_file(path)?,
            None => ResourceCatalog::builtin()?,
        };

        let throttle = ThrottleController::new(&config.tenant, config.throttle.clone(), store);
        let processor = ResponseProcessor::new(config.benign_errors.clone());
        let executor = RequestExecutor::new(transport, throttle, processor)
            .with_telemetry(Arc::new(TracingSink), config.telemetry.verbosity);

        debug!(
            tenant = %config.tenant,
            api_version = %config.api_version,
            resources = catalog.len(),
            "Client ready"
        );

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            executor: Arc::new(executor),
        })
    }

    /// Build a client with the reqwest transport.
    ///
    /// Throttle flags live in memory unless `throttle.store_path` names a
    /// file shared with other processes.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        let store: Arc<dyn ThrottleStore> = match &config.throttle.store_path {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(InMemoryStore::new()),
        };
        Self::new(config, Arc::new(transport), store)
    }

    /// Replace the telemetry sink, keeping the configured verbosity
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        let executor = (*self.executor)
            .clone()
            .with_telemetry(sink, self.config.telemetry.verbosity);
        self.executor = Arc::new(executor);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resource catalog in use
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// Shared request executor
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Node addressing the admin base URL
    pub fn root(&self) -> Result<ResourceNode> {
        Ok(ResourceNode::new(
            self.catalog.root()?,
            Arc::clone(&self.catalog),
            Arc::clone(&self.executor),
            &self.config.admin_url(),
            None,
            ThrottleTier::Normal,
        ))
    }

    /// Shorthand for navigating from the root
    pub fn resource(&self, name: &str, id: Option<ResourceId>) -> Result<ResourceNode> {
        self.root()?.child(name, id)
    }

    /// Navigate a slash-separated path of `Name` or `Name:id` segments,
    /// e.g. `Product:632910392/Image`
    pub fn path(&self, path: &str) -> Result<ResourceNode> {
        let mut node = self.root()?;
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, id) = match segment.split_once(':') {
                Some((name, id)) if !id.is_empty() => (name, Some(ResourceId::from(id))),
                Some((name, _)) => (name, None),
                None => (segment, None),
            };
            if name.is_empty() {
                return Err(Error::Other(format!("Empty resource name in path '{path}'")));
            }
            node = node.child(name, id)?;
        }
        Ok(node)
    }

    /// GraphQL endpoint of the tenant
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql.json", self.config.admin_url())
    }
}
