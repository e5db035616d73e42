//! Resource kind descriptors
//!
//! A kind is the static description of one type of node: its URL segment,
//! envelope keys, the children it exposes, its custom actions per verb and
//! its capability flags.

use crate::types::Verb;
use serde::{Deserialize, Serialize};

/// Static description of one resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceKind {
    /// Type name, e.g. `ProductImage`
    pub name: String,

    /// URL segment, e.g. `images`; empty for the root
    #[serde(default)]
    pub path: String,

    /// Singular envelope key, e.g. `image`
    pub key: String,

    /// Plural envelope key (default: `key` + "s")
    #[serde(default)]
    pub plural_key: Option<String>,

    /// Key wrapping outgoing payloads (default: `key`)
    #[serde(default)]
    pub post_key: Option<String>,

    /// Child resources reachable from this kind
    #[serde(default)]
    pub children: Vec<ChildEntry>,

    /// Custom actions per verb
    #[serde(default)]
    pub actions: ActionRegistry,

    /// Whether `search` is available
    #[serde(default)]
    pub search: bool,

    /// Whether `count` is available
    #[serde(default = "default_true")]
    pub count: bool,

    /// Whether write verbs are rejected
    #[serde(default)]
    pub read_only: bool,
}

fn default_true() -> bool {
    true
}

impl ResourceKind {
    /// Create a kind with default capabilities and no children or actions
    pub fn new(name: impl Into<String>, path: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            key: key.into(),
            plural_key: None,
            post_key: None,
            children: Vec::new(),
            actions: ActionRegistry::default(),
            search: false,
            count: true,
            read_only: false,
        }
    }

    /// Plural envelope key
    pub fn plural_key(&self) -> String {
        self.plural_key
            .clone()
            .unwrap_or_else(|| format!("{}s", self.key))
    }

    /// Key wrapping outgoing payloads
    pub fn post_key(&self) -> &str {
        self.post_key.as_deref().unwrap_or(&self.key)
    }

    /// Find a child entry by the name it is exposed under.
    ///
    /// Aliases win over bare type names, so an alias may shadow the type
    /// name of another child.
    pub fn find_child(&self, name: &str) -> Option<&ChildEntry> {
        self.children
            .iter()
            .find(|child| child.alias.as_deref() == Some(name))
            .or_else(|| {
                self.children
                    .iter()
                    .find(|child| child.alias.is_none() && child.kind == name)
            })
    }

    /// Find a custom action, scanning POST, PUT, GET then DELETE
    pub fn find_action(&self, name: &str) -> Option<(Verb, &ActionEntry)> {
        Verb::ACTION_SCAN_ORDER.iter().find_map(|verb| {
            self.actions
                .for_verb(*verb)
                .iter()
                .find(|action| action.name == name)
                .map(|action| (*verb, action))
        })
    }

    // Builder helpers used by programmatic catalogs and tests

    /// Add a child exposed under its type name
    #[must_use]
    pub fn child(mut self, kind: impl Into<String>) -> Self {
        self.children.push(ChildEntry::new(kind, None));
        self
    }

    /// Add a child exposed under an alias
    #[must_use]
    pub fn child_as(mut self, kind: impl Into<String>, alias: impl Into<String>) -> Self {
        self.children.push(ChildEntry::new(kind, Some(alias.into())));
        self
    }

    /// Add a custom action
    #[must_use]
    pub fn action(mut self, verb: Verb, entry: ActionEntry) -> Self {
        self.actions.for_verb_mut(verb).push(entry);
        self
    }

    /// Set capability flags
    #[must_use]
    pub fn capabilities(mut self, search: bool, count: bool, read_only: bool) -> Self {
        self.search = search;
        self.count = count;
        self.read_only = read_only;
        self
    }
}

// ============================================================================
// Children
// ============================================================================

/// Child resource registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChildEntryDef")]
pub struct ChildEntry {
    /// Kind implementing the child
    pub kind: String,
    /// Name the child is exposed under, if it differs from `kind`
    pub alias: Option<String>,
}

impl ChildEntry {
    /// Create a child entry
    pub fn new(kind: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            alias,
        }
    }

    /// Name callers use to reach this child
    pub fn exposed_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.kind)
    }
}

/// Either `Image` or `{ kind: ProductImage, alias: Image }`
#[derive(Deserialize)]
#[serde(untagged)]
enum ChildEntryDef {
    Bare(String),
    Full {
        kind: String,
        #[serde(default)]
        alias: Option<String>,
    },
}

impl From<ChildEntryDef> for ChildEntry {
    fn from(def: ChildEntryDef) -> Self {
        match def {
            ChildEntryDef::Bare(kind) => Self::new(kind, None),
            ChildEntryDef::Full { kind, alias } => Self::new(kind, alias),
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Custom action registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ActionEntryDef")]
pub struct ActionEntry {
    /// Name callers invoke
    pub name: String,
    /// URL segment, if it differs from `name`
    pub path: Option<String>,
}

impl ActionEntry {
    /// Action whose URL segment equals its name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Action exposed under `name` but addressed as `path`
    pub fn aliased(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
        }
    }

    /// URL segment appended for this action
    pub fn url_segment(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// Either `close` or `{ name: sendInvoice, path: send_invoice }`
#[derive(Deserialize)]
#[serde(untagged)]
enum ActionEntryDef {
    Bare(String),
    Full {
        name: String,
        #[serde(default)]
        path: Option<String>,
    },
}

impl From<ActionEntryDef> for ActionEntry {
    fn from(def: ActionEntryDef) -> Self {
        match def {
            ActionEntryDef::Bare(name) => Self::new(name),
            ActionEntryDef::Full { name, path } => Self { name, path },
        }
    }
}

/// Custom actions grouped by verb
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRegistry {
    #[serde(default)]
    pub post: Vec<ActionEntry>,
    #[serde(default)]
    pub put: Vec<ActionEntry>,
    #[serde(default)]
    pub get: Vec<ActionEntry>,
    #[serde(default)]
    pub delete: Vec<ActionEntry>,
}

impl ActionRegistry {
    /// Actions registered for a verb
    pub fn for_verb(&self, verb: Verb) -> &[ActionEntry] {
        match verb {
            Verb::POST => &self.post,
            Verb::PUT => &self.put,
            Verb::GET => &self.get,
            Verb::DELETE => &self.delete,
        }
    }

    fn for_verb_mut(&mut self, verb: Verb) -> &mut Vec<ActionEntry> {
        match verb {
            Verb::POST => &mut self.post,
            Verb::PUT => &mut self.put,
            Verb::GET => &mut self.get,
            Verb::DELETE => &mut self.delete,
        }
    }
}
