//! Resource nodes and name-based dispatch

use super::catalog::ResourceCatalog;
use super::kind::{ChildEntry, ResourceKind};
use crate::error::{Error, Result};
use crate::http::{build_url, query_from_json, wrap_payload, Call, RequestExecutor};
use crate::pagination::PageLinks;
use crate::types::{JsonObject, JsonValue, QueryParams, ResourceId, ThrottleTier, Verb};
use std::sync::Arc;
use tracing::debug;

/// What a name resolves to on a node
#[derive(Debug, Clone, PartialEq)]
pub enum Target<'a> {
    /// A child resource to construct
    Child(&'a ChildEntry),
    /// A custom action bound to a verb and URL segment
    Action { verb: Verb, segment: &'a str },
}

/// Result of navigating by name
#[derive(Debug, Clone)]
pub enum Navigation {
    /// A constructed (not yet requested) child node
    Child(ResourceNode),
    /// The processed result of an executed action
    Action(JsonValue),
}

impl Navigation {
    /// The child node, if navigation produced one
    pub fn into_node(self) -> Option<ResourceNode> {
        match self {
            Navigation::Child(node) => Some(node),
            Navigation::Action(_) => None,
        }
    }

    /// The action result, if navigation executed one
    pub fn into_value(self) -> Option<JsonValue> {
        match self {
            Navigation::Action(value) => Some(value),
            Navigation::Child(_) => None,
        }
    }
}

/// One addressable point in the resource tree.
///
/// The base URL and identifier are fixed at construction. Pagination links
/// are overwritten by every processed response.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    kind: Arc<ResourceKind>,
    catalog: Arc<ResourceCatalog>,
    executor: Arc<RequestExecutor>,
    identifier: Option<ResourceId>,
    base_url: String,
    tier: ThrottleTier,
    links: PageLinks,
}

impl ResourceNode {
    /// Create a node below `parent_url`
    pub fn new(
        kind: Arc<ResourceKind>,
        catalog: Arc<ResourceCatalog>,
        executor: Arc<RequestExecutor>,
        parent_url: &str,
        identifier: Option<ResourceId>,
        tier: ThrottleTier,
    ) -> Self {
        let base_url = node_url(parent_url, &kind.path, identifier.as_ref());
        Self {
            kind,
            catalog,
            executor,
            identifier,
            base_url,
            tier,
            links: PageLinks::default(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Kind descriptor
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Type name of this node
    pub fn name(&self) -> &str {
        &self.kind.name
    }

    /// Identifier, present when the node addresses one item
    pub fn identifier(&self) -> Option<&ResourceId> {
        self.identifier.as_ref()
    }

    /// URL of this node, without `.json`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Throttle tier used for calls from this node
    pub fn tier(&self) -> ThrottleTier {
        self.tier
    }

    /// Switch the throttle tier; children created afterwards inherit it
    pub fn set_tier(&mut self, tier: ThrottleTier) {
        self.tier = tier;
    }

    /// Same node with another throttle tier
    #[must_use]
    pub fn with_tier(mut self, tier: ThrottleTier) -> Self {
        self.tier = tier;
        self
    }

    /// Pagination links of the last processed response
    pub fn links(&self) -> &PageLinks {
        &self.links
    }

    /// URL of the next page
    pub fn next_link(&self) -> Option<&str> {
        self.links.next.as_deref()
    }

    /// URL of the previous page
    pub fn prev_link(&self) -> Option<&str> {
        self.links.previous.as_deref()
    }

    /// Query parameters fetching the next page
    pub fn next_page_params(&self) -> QueryParams {
        self.links.next_page_params()
    }

    /// Query parameters fetching the previous page
    pub fn prev_page_params(&self) -> QueryParams {
        self.links.prev_page_params()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Classify a name and look it up in the registries.
    ///
    /// Capitalized names are children, anything else is a custom action.
    /// Actions are scanned in POST, PUT, GET, DELETE order.
    pub fn resolve(&self, name: &str) -> Result<Target<'_>> {
        resolve_in(&self.kind, name)
    }

    /// Navigate by name.
    ///
    /// Children are only constructed, with `arg` as their identifier.
    /// Actions are executed immediately: `arg` is the query for GET/DELETE
    /// and the unwrapped body for POST/PUT.
    pub async fn navigate(&mut self, name: &str, arg: Option<JsonValue>) -> Result<Navigation> {
        let kind = Arc::clone(&self.kind);
        match resolve_in(&kind, name)? {
            Target::Child(entry) => {
                let id = arg.as_ref().and_then(ResourceId::from_json);
                self.child_node(&entry.kind, id).map(Navigation::Child)
            }
            Target::Action { verb, segment } => self
                .run_action(verb, segment, arg)
                .await
                .map(Navigation::Action),
        }
    }

    /// Property-style access: navigate without an argument
    pub async fn access(&mut self, name: &str) -> Result<Navigation> {
        self.navigate(name, None).await
    }

    /// Call-style access: navigate with an identifier or action argument
    pub async fn call(&mut self, name: &str, arg: impl Into<JsonValue>) -> Result<Navigation> {
        self.navigate(name, Some(arg.into())).await
    }

    /// Construct a child node by its exposed name
    pub fn child(&self, name: &str, id: Option<ResourceId>) -> Result<ResourceNode> {
        match self.resolve(name) {
            Ok(Target::Child(entry)) => self.child_node(&entry.kind, id),
            Ok(Target::Action { .. }) | Err(Error::UnknownAction { .. }) => {
                Err(Error::unknown_child(name, &self.kind.name))
            }
            Err(e) => Err(e),
        }
    }

    /// Execute a custom action by name
    pub async fn action(&mut self, name: &str, arg: Option<JsonValue>) -> Result<JsonValue> {
        match self.navigate(name, arg).await? {
            Navigation::Action(value) => Ok(value),
            Navigation::Child(_) => Err(Error::unknown_action(name, &self.kind.name)),
        }
    }

    fn child_node(&self, kind_name: &str, id: Option<ResourceId>) -> Result<ResourceNode> {
        let kind = self.catalog.kind(kind_name).ok_or_else(|| {
            Error::config(format!("Resource kind '{kind_name}' is not in the catalog"))
        })?;
        Ok(ResourceNode::new(
            kind,
            Arc::clone(&self.catalog),
            Arc::clone(&self.executor),
            &self.base_url,
            id,
            self.tier,
        ))
    }

    async fn run_action(
        &mut self,
        verb: Verb,
        segment: &str,
        arg: Option<JsonValue>,
    ) -> Result<JsonValue> {
        debug!(resource = %self.kind.name, verb = %verb, action = segment, "Dispatching action");
        let arg = arg.unwrap_or_else(|| JsonValue::Object(JsonObject::new()));

        if verb.takes_body() {
            let url = self.generate_url(&QueryParams::new(), Some(segment));
            match verb {
                Verb::PUT => self.put_with(arg, Some(&url), false).await,
                _ => self.post_with(arg, Some(&url), false).await,
            }
        } else {
            let params = query_from_json(&arg)?;
            let url = self.generate_url(&params, Some(segment));
            match verb {
                Verb::DELETE => self.delete_with(&QueryParams::new(), Some(&url)).await,
                _ => self.get_with(&QueryParams::new(), Some(&url), None).await,
            }
        }
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Build the URL of this node, optionally for a custom action
    pub fn generate_url(&self, params: &QueryParams, custom_action: Option<&str>) -> String {
        build_url(&self.base_url, custom_action, params)
    }

    /// GET this node with query parameters
    pub async fn get(&mut self, params: &QueryParams) -> Result<JsonValue> {
        self.get_with(params, None, None).await
    }

    /// GET with an optional explicit URL and data key.
    ///
    /// The data key defaults to the singular key for item nodes and the
    /// plural key for collections.
    pub async fn get_with(
        &mut self,
        params: &QueryParams,
        url: Option<&str>,
        data_key: Option<&str>,
    ) -> Result<JsonValue> {
        let url = url.map_or_else(|| self.generate_url(params, None), str::to_string);
        let data_key = data_key.map_or_else(|| self.default_data_key(), str::to_string);
        let call = Call::new(Verb::GET, url).data_key(data_key);
        self.execute(call).await
    }

    /// GET the page after the last response, if there is one
    pub async fn next_page(&mut self) -> Result<Option<JsonValue>> {
        if !self.links.has_next() {
            return Ok(None);
        }
        let params = self.next_page_params();
        self.get(&params).await.map(Some)
    }

    /// GET the page before the last response, if there is one
    pub async fn prev_page(&mut self) -> Result<Option<JsonValue>> {
        if !self.links.has_previous() {
            return Ok(None);
        }
        let params = self.prev_page_params();
        self.get(&params).await.map(Some)
    }

    /// Count items in this collection
    pub async fn count(&mut self, params: &QueryParams) -> Result<JsonValue> {
        if !self.kind.count {
            return Err(Error::unsupported("count", &self.kind.name));
        }
        let url = self.generate_url(params, Some("count"));
        self.get_with(&QueryParams::new(), Some(&url), Some("count"))
            .await
    }

    /// Search this collection.
    ///
    /// A mapping is used as the query parameters; any other value is sent
    /// as `query=<value>`.
    pub async fn search(&mut self, query: impl Into<JsonValue>) -> Result<JsonValue> {
        if !self.kind.search {
            return Err(Error::unsupported("search", &self.kind.name));
        }
        let params = match query.into() {
            value @ JsonValue::Object(_) => query_from_json(&value)?,
            JsonValue::String(text) => QueryParams::from([("query".to_string(), text)]),
            other => QueryParams::from([("query".to_string(), other.to_string())]),
        };
        let url = self.generate_url(&params, Some("search"));
        self.get_with(&QueryParams::new(), Some(&url), None).await
    }

    /// POST `data` wrapped under the post key
    pub async fn post(&mut self, data: JsonValue) -> Result<JsonValue> {
        self.post_with(data, None, true).await
    }

    /// POST with an optional explicit URL and wrapping switch
    pub async fn post_with(
        &mut self,
        data: JsonValue,
        url: Option<&str>,
        wrap: bool,
    ) -> Result<JsonValue> {
        self.write(Verb::POST, data, url, wrap).await
    }

    /// PUT `data` wrapped under the post key
    pub async fn put(&mut self, data: JsonValue) -> Result<JsonValue> {
        self.put_with(data, None, true).await
    }

    /// PUT with an optional explicit URL and wrapping switch
    pub async fn put_with(
        &mut self,
        data: JsonValue,
        url: Option<&str>,
        wrap: bool,
    ) -> Result<JsonValue> {
        self.write(Verb::PUT, data, url, wrap).await
    }

    /// DELETE this node
    pub async fn delete(&mut self, params: &QueryParams) -> Result<JsonValue> {
        self.delete_with(params, None).await
    }

    /// DELETE with an optional explicit URL; the response is not unwrapped
    pub async fn delete_with(&mut self, params: &QueryParams, url: Option<&str>) -> Result<JsonValue> {
        self.ensure_writable(Verb::DELETE)?;
        let url = url.map_or_else(|| self.generate_url(params, None), str::to_string);
        self.execute(Call::new(Verb::DELETE, url)).await
    }

    async fn write(
        &mut self,
        verb: Verb,
        data: JsonValue,
        url: Option<&str>,
        wrap: bool,
    ) -> Result<JsonValue> {
        self.ensure_writable(verb)?;
        let url = url.map_or_else(|| self.generate_url(&QueryParams::new(), None), str::to_string);
        let body = if wrap {
            wrap_payload(self.kind.post_key(), data)
        } else {
            data
        };
        let call = Call::new(verb, url).body(body).data_key(&self.kind.key);
        self.execute(call).await
    }

    async fn execute(&mut self, call: Call) -> Result<JsonValue> {
        let call = call.tier(self.tier);
        self.executor.execute(call, &mut self.links).await
    }

    fn ensure_writable(&self, verb: Verb) -> Result<()> {
        if self.kind.read_only && verb.is_write() {
            return Err(Error::unsupported(verb.as_str(), &self.kind.name));
        }
        Ok(())
    }

    fn default_data_key(&self) -> String {
        if self.identifier.is_some() {
            self.kind.key.clone()
        } else {
            self.kind.plural_key()
        }
    }
}

fn resolve_in<'a>(kind: &'a ResourceKind, name: &str) -> Result<Target<'a>> {
    if starts_uppercase(name) {
        kind.find_child(name)
            .map(Target::Child)
            .ok_or_else(|| Error::unknown_child(name, &kind.name))
    } else {
        kind.find_action(name)
            .map(|(verb, action)| Target::Action {
                verb,
                segment: action.url_segment(),
            })
            .ok_or_else(|| Error::unknown_action(name, &kind.name))
    }
}

/// `parent/path[/id]`, skipping an empty path segment
fn node_url(parent_url: &str, path: &str, identifier: Option<&ResourceId>) -> String {
    let mut url = parent_url.trim_end_matches('/').to_string();
    let path = path.trim_matches('/');
    if !path.is_empty() {
        url.push('/');
        url.push_str(path);
    }
    if let Some(id) = identifier {
        url.push('/');
        url.push_str(&id.to_string());
    }
    url
}

/// Capitalized names denote children, everything else denotes actions
pub(super) fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
