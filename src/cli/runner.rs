//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::resource::{ResourceCatalog, ResourceKind, ResourceNode};
use crate::types::{ApiFamily, JsonValue, QueryParams, ThrottleTier, Verb};
use serde_json::json;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Get { path, query, pages } => self.get(path, query, *pages).await,
            Commands::Count { path, query } => self.count(path, query).await,
            Commands::Search { path, query } => self.search(path, query).await,
            Commands::Action { path, name, json } => {
                self.action(path, name, json.as_deref()).await
            }
            Commands::Resources { kind } => self.resources(kind.as_deref()),
            Commands::Throttle => self.throttle().await,
        }
    }

    /// Load the client configuration
    fn load_config(&self) -> Result<ClientConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -C flag)"))?;
        ClientConfig::from_file(path)
    }

    /// Node for a resource path, in the requested throttle tier
    fn node(&self, path: &str) -> Result<ResourceNode> {
        let client = Client::from_config(self.load_config()?)?;
        let tier = if self.cli.priority {
            ThrottleTier::Priority
        } else {
            ThrottleTier::Normal
        };
        Ok(client.path(path)?.with_tier(tier))
    }

    async fn get(&self, path: &str, query: &[String], pages: usize) -> Result<()> {
        let mut node = self.node(path)?;
        let params = parse_query(query)?;

        print_json(&node.get(&params).await?);
        for _ in 1..pages {
            match node.next_page().await? {
                Some(page) => print_json(&page),
                None => break,
            }
        }
        Ok(())
    }

    async fn count(&self, path: &str, query: &[String]) -> Result<()> {
        let mut node = self.node(path)?;
        print_json(&node.count(&parse_query(query)?).await?);
        Ok(())
    }

    async fn search(&self, path: &str, query: &str) -> Result<()> {
        let mut node = self.node(path)?;
        print_json(&node.search(query).await?);
        Ok(())
    }

    async fn action(&self, path: &str, name: &str, body: Option<&str>) -> Result<()> {
        let mut node = self.node(path)?;
        let arg = body.map(serde_json::from_str::<JsonValue>).transpose()?;
        print_json(&node.action(name, arg).await?);
        Ok(())
    }

    /// List the catalog from the config, or the built-in one without a config
    fn resources(&self, kind: Option<&str>) -> Result<()> {
        let catalog = match &self.cli.config {
            Some(_) => match self.load_config()?.catalog_path {
                Some(path) => ResourceCatalog::from_file(path)?,
                None => ResourceCatalog::builtin()?,
            },
            None => ResourceCatalog::builtin()?,
        };

        match kind {
            Some(name) => {
                let kind = catalog
                    .kind(name)
                    .ok_or_else(|| Error::config(format!("Unknown resource kind '{name}'")))?;
                print_json(&describe_kind(&kind));
            }
            None => {
                let root = catalog.root()?;
                let names: Vec<&str> = root.children.iter().map(|c| c.exposed_name()).collect();
                print_json(&json!(names));
            }
        }
        Ok(())
    }

    async fn throttle(&self) -> Result<()> {
        let client = Client::from_config(self.load_config()?)?;
        let throttle = client.executor().throttle();

        let mut report = serde_json::Map::new();
        for family in [ApiFamily::Rest, ApiFamily::Graphql] {
            let mut flags = serde_json::Map::new();
            for tier in [ThrottleTier::Normal, ThrottleTier::Priority] {
                let delayed = throttle.is_delayed(family, tier).await?;
                flags.insert(tier.to_string(), JsonValue::Bool(delayed));
            }
            report.insert(family.to_string(), JsonValue::Object(flags));
        }
        print_json(&JsonValue::Object(report));
        Ok(())
    }
}

/// Parse repeated `key=value` arguments
fn parse_query(pairs: &[String]) -> Result<QueryParams> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| Error::Other(format!("Invalid query parameter '{pair}', expected key=value")))
        })
        .collect()
}

fn describe_kind(kind: &ResourceKind) -> JsonValue {
    let actions: serde_json::Map<String, JsonValue> = Verb::ACTION_SCAN_ORDER
        .iter()
        .filter(|verb| !kind.actions.for_verb(**verb).is_empty())
        .map(|verb| {
            let names: Vec<&str> = kind
                .actions
                .for_verb(*verb)
                .iter()
                .map(|a| a.name.as_str())
                .collect();
            (verb.to_string(), json!(names))
        })
        .collect();

    json!({
        "name": kind.name,
        "path": kind.path,
        "key": kind.key,
        "plural_key": kind.plural_key(),
        "children": kind.children.iter().map(|c| c.exposed_name()).collect::<Vec<_>>(),
        "actions": actions,
        "search": kind.search,
        "count": kind.count,
        "read_only": kind.read_only,
    })
}

fn print_json(value: &JsonValue) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_query() {
        let params = parse_query(&["limit=5".to_string(), "title=a=b".to_string()]).unwrap();
        assert_eq!(params.get("limit").map(String::as_str), Some("5"));
        assert_eq!(params.get("title").map(String::as_str), Some("a=b"));

        assert!(parse_query(&["novalue".to_string()]).is_err());
        assert!(parse_query(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "resttree",
            "-C",
            "shop.yaml",
            "--priority",
            "get",
            "Product:632910392/Image",
            "-q",
            "limit=2",
            "--pages",
            "3",
        ])
        .unwrap();
        assert!(cli.priority);
        match cli.command {
            Commands::Get { path, query, pages } => {
                assert_eq!(path, "Product:632910392/Image");
                assert_eq!(query, vec!["limit=2".to_string()]);
                assert_eq!(pages, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_describe_kind() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let order = describe_kind(&catalog.kind("Order").unwrap());
        assert_eq!(order["plural_key"], "orders");
        assert_eq!(order["actions"]["POST"], json!(["close", "open", "cancel"]));
        assert!(order["children"]
            .as_array()
            .unwrap()
            .contains(&json!("Risk")));
    }

    #[tokio::test]
    async fn test_missing_config_is_reported() {
        let runner = Runner::new(Cli::try_parse_from(["resttree", "count", "Product"]).unwrap());
        let err = runner.run().await.unwrap_err();
        assert!(err.to_string().contains("Config file not specified"));
    }
}
