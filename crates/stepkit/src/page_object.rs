//! Page-object tree and alias-path resolution.
//!
//! Components live in an arena owned by [`PageObject`]; index 0 is the root
//! component `App`. Each alias maps to a [`LocatorDef`] that is simple (fixed
//! selector), templated (selector built from an argument) or native (a
//! resolver receiving the parent locator, the driver root and the argument),
//! and may name a child component for further chaining.
//!
//! ```text
//! "Todo List > Item(2) > Title"
//!   App ──Todo List──► TodoList ──Item(2)──► Item ──Title──► (element)
//! ```

use crate::locator::Locator;
use crate::result::{StepError, StepResult};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Name of the root component, also used as the parent of top-level aliases
pub const ROOT_COMPONENT: &str = "App";

/// Selector factory for templated locators
pub type TemplateFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Resolver for native locators
pub type NativeFn = Arc<dyn Fn(&NativeScope<'_>) -> StepResult<Locator> + Send + Sync>;

/// Arguments handed to a native resolver
#[derive(Debug, Clone, Copy)]
pub struct NativeScope<'a> {
    /// Locator of the enclosing segment
    pub parent: &'a Locator,
    /// Driver root locator
    pub root: &'a Locator,
    /// Argument from `Alias(argument)`, if any
    pub argument: Option<&'a str>,
}

/// How an alias produces its selector
#[derive(Clone)]
pub enum LocatorKind {
    /// Fixed selector declaration
    Simple(String),
    /// Selector built from the segment argument
    Template(TemplateFn),
    /// Custom resolver
    Native(NativeFn),
}

impl fmt::Debug for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(selector) => f.debug_tuple("Simple").field(selector).finish(),
            Self::Template(_) => f.write_str("Template(..)"),
            Self::Native(_) => f.write_str("Native(..)"),
        }
    }
}

/// Index of a component in a [`PageObject`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

/// A locator declaration bound to an alias
#[derive(Debug, Clone)]
pub struct LocatorDef {
    kind: LocatorKind,
    component: Option<ComponentId>,
}

impl LocatorDef {
    /// Fixed selector
    #[must_use]
    pub fn simple(selector: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Simple(selector.into()),
            component: None,
        }
    }

    /// Selector built by a closure from the argument
    #[must_use]
    pub fn template<F>(factory: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            kind: LocatorKind::Template(Arc::new(factory)),
            component: None,
        }
    }

    /// Selector built by substituting the argument for `{}` in `pattern`
    #[must_use]
    pub fn template_str(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self::template(move |argument| pattern.replace("{}", argument))
    }

    /// Custom resolver
    #[must_use]
    pub fn native<F>(resolver: F) -> Self
    where
        F: Fn(&NativeScope<'_>) -> StepResult<Locator> + Send + Sync + 'static,
    {
        Self {
            kind: LocatorKind::Native(Arc::new(resolver)),
            component: None,
        }
    }

    /// Declare the component reached through this alias
    #[must_use]
    pub const fn as_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    /// Locator kind
    #[must_use]
    pub const fn kind(&self) -> &LocatorKind {
        &self.kind
    }

    /// Child component, if any
    #[must_use]
    pub const fn component(&self) -> Option<ComponentId> {
        self.component
    }
}

/// A named set of aliases
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    aliases: HashMap<String, LocatorDef>,
}

impl Component {
    /// Component name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an alias (whitespace-insensitive)
    #[must_use]
    pub fn alias(&self, alias: &str) -> Option<&LocatorDef> {
        self.aliases.get(&normalize_alias(alias))
    }

    /// Alias names, sorted
    #[must_use]
    pub fn alias_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// One resolved segment of an alias path
#[derive(Debug, Clone)]
pub struct ChainItem<'a> {
    /// Alias as written in the path
    pub alias: String,
    /// Argument from `Alias(argument)`
    pub argument: Option<String>,
    /// Declaration found for the alias
    pub def: &'a LocatorDef,
}

/// Arena of components reachable from the root `App` component
#[derive(Debug, Clone)]
pub struct PageObject {
    components: Vec<Component>,
}

impl Default for PageObject {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject {
    /// Create a tree containing only the empty root component
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: vec![Component {
                name: ROOT_COMPONENT.to_string(),
                aliases: HashMap::new(),
            }],
        }
    }

    /// Root component id
    #[must_use]
    pub const fn root(&self) -> ComponentId {
        ComponentId(0)
    }

    /// Add an empty component
    pub fn add_component(&mut self, name: impl Into<String>) -> ComponentId {
        self.components.push(Component {
            name: name.into(),
            aliases: HashMap::new(),
        });
        ComponentId(self.components.len() - 1)
    }

    /// Bind an alias inside a component
    pub fn define(
        &mut self,
        owner: ComponentId,
        alias: &str,
        def: LocatorDef,
    ) -> StepResult<&mut Self> {
        if let Some(child) = def.component {
            if child.0 >= self.components.len() {
                return Err(StepError::config(format!(
                    "alias '{alias}' refers to an unknown component"
                )));
            }
        }
        let component = self
            .components
            .get_mut(owner.0)
            .ok_or_else(|| StepError::config(format!("unknown component for alias '{alias}'")))?;
        component.aliases.insert(normalize_alias(alias), def);
        Ok(self)
    }

    /// Component by id
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Walk an alias path and return the declaration of every segment
    pub fn query(&self, path: &str) -> StepResult<Vec<ChainItem<'_>>> {
        let mut current = Some(self.root());
        let mut current_alias = ROOT_COMPONENT.to_string();
        let mut chain = Vec::new();
        for segment in path_separator().split(path.trim()) {
            let Some(component) = current.and_then(|id| self.component(id)) else {
                return Err(StepError::NotAComponent {
                    alias: current_alias,
                });
            };
            let (alias, argument) = parse_segment(segment);
            let def = component
                .alias(&alias)
                .ok_or_else(|| StepError::AliasNotFound {
                    alias: alias.clone(),
                    parent: current_alias.clone(),
                })?;
            current = def.component;
            current_alias.clone_from(&alias);
            chain.push(ChainItem {
                alias,
                argument,
                def,
            });
        }
        Ok(chain)
    }

    /// Resolve an alias path against the document root
    pub fn element(&self, path: &str) -> StepResult<Locator> {
        self.element_from(path, &Locator::root())
    }

    /// Resolve an alias path, scoping the first segment inside `root`
    pub fn element_from(&self, path: &str, root: &Locator) -> StepResult<Locator> {
        let mut current = root.clone();
        for item in self.query(path)? {
            current = match item.def.kind() {
                LocatorKind::Simple(selector) => current.locator(selector),
                LocatorKind::Template(factory) => {
                    let argument = item.argument.as_deref().ok_or_else(|| {
                        StepError::resolution(format!("Alias '{}' requires an argument", item.alias))
                    })?;
                    current.locator(&factory(argument))
                }
                LocatorKind::Native(resolver) => resolver(&NativeScope {
                    parent: &current,
                    root,
                    argument: item.argument.as_deref(),
                })?,
            };
        }
        let locator = current.with_path(path.trim());
        debug!(path, locator = %locator, "resolved alias path");
        Ok(locator)
    }

    /// Load simple and templated declarations from YAML.
    ///
    /// ```yaml
    /// App:
    ///   Header: h1
    ///   Todo List:
    ///     selector: "#todos"
    ///     component: TodoList
    /// TodoList:
    ///   Item:
    ///     template: "li:nth-child({})"
    /// ```
    pub fn from_yaml_str(yaml: &str) -> StepResult<Self> {
        let document: BTreeMap<String, BTreeMap<String, AliasDecl>> =
            serde_yaml_ng::from_str(yaml)?;
        if !document.contains_key(ROOT_COMPONENT) {
            return Err(StepError::config(format!(
                "page object must declare a '{ROOT_COMPONENT}' component"
            )));
        }

        let mut tree = Self::new();
        let mut ids = HashMap::new();
        ids.insert(ROOT_COMPONENT.to_string(), tree.root());
        for name in document.keys().filter(|name| name.as_str() != ROOT_COMPONENT) {
            ids.insert(name.clone(), tree.add_component(name.clone()));
        }

        for (name, aliases) in &document {
            let owner = ids[name];
            for (alias, decl) in aliases {
                let def = decl.to_def(alias, &ids)?;
                tree.define(owner, alias, def)?;
            }
        }
        Ok(tree)
    }

    /// Load declarations from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> StepResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AliasDecl {
    Selector(String),
    Detailed {
        #[serde(default)]
        selector: Option<String>,
        #[serde(default)]
        template: Option<String>,
        #[serde(default)]
        component: Option<String>,
    },
}

impl AliasDecl {
    fn to_def(&self, alias: &str, ids: &HashMap<String, ComponentId>) -> StepResult<LocatorDef> {
        match self {
            Self::Selector(selector) => Ok(LocatorDef::simple(selector.clone())),
            Self::Detailed {
                selector,
                template,
                component,
            } => {
                let def = match (selector, template) {
                    (Some(selector), None) => LocatorDef::simple(selector.clone()),
                    (None, Some(template)) if template.contains("{}") => {
                        LocatorDef::template_str(template.clone())
                    }
                    (None, Some(_)) => {
                        return Err(StepError::config(format!(
                            "template of alias '{alias}' must contain '{{}}'"
                        )))
                    }
                    _ => {
                        return Err(StepError::config(format!(
                            "alias '{alias}' must declare exactly one of 'selector' or 'template'"
                        )))
                    }
                };
                match component {
                    Some(name) => {
                        let id = ids.get(name).ok_or_else(|| {
                            StepError::config(format!("component '{name}' is not declared"))
                        })?;
                        Ok(def.as_component(*id))
                    }
                    None => Ok(def),
                }
            }
        }
    }
}

fn normalize_alias(alias: &str) -> String {
    alias.split_whitespace().collect()
}

fn path_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| {
        Regex::new(r"\s*>\s*").unwrap_or_else(|e| unreachable!("static separator pattern: {e}"))
    })
}

fn segment_pattern() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| {
        Regex::new(r"^(?s)(?P<alias>.+?)(?:\((?P<argument>.+)\))?$")
            .unwrap_or_else(|e| unreachable!("static segment pattern: {e}"))
    })
}

fn parse_segment(segment: &str) -> (String, Option<String>) {
    match segment_pattern().captures(segment) {
        Some(caps) => (
            caps.name("alias").map_or_else(String::new, |m| m.as_str().trim().to_string()),
            caps.name("argument").map(|m| m.as_str().to_string()),
        ),
        None => (segment.trim().to_string(), None),
    }
}
