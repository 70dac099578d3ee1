//! Page builder: turns a page description into a populated component arena.
//!
//! A page description names components and says which master each one is
//! derived from and which components it holds as children:
//!
//! ```toml
//! title = "landing"
//!
//! [[component]]
//! name = "card"
//! master = "container"
//! attributes = { backgroundColor = "white" }
//! children = ["title"]
//!
//! [[component]]
//! name = "title"
//! master = "header"
//! attributes = { text = "Hello" }
//! ```
//!
//! Omitting `children` mirrors the master's children.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::arena::{ComponentArena, NodeId};
use crate::domain::entities::{Attributes, VariantSpec};
use crate::domain::error::{DomainError, DomainResult};

/// Result type for page building.
pub type BuildResult<T> = Result<T, DomainError>;

/// Parsed page description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentSpec>,
}

/// One named component in a page description.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    /// Root master name (`container`, `text`, `header`, `image`) or the name
    /// of another component
    pub master: String,
    #[serde(default)]
    pub attributes: Attributes,
    /// Names of components adopted as children; None mirrors the master
    #[serde(default)]
    pub children: Option<Vec<String>>,
}

impl PageSpec {
    pub fn parse(content: &str) -> DomainResult<Self> {
        toml::from_str(content).map_err(|e| DomainError::InvalidPage {
            message: e.to_string(),
        })
    }
}

/// A built page: the arena plus the names given to its components.
#[derive(Debug)]
pub struct Page {
    pub title: Option<String>,
    pub arena: ComponentArena,
    names: BTreeMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl Page {
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Look up a component by name; root master names resolve too.
    pub fn resolve(&self, name: &str) -> DomainResult<NodeId> {
        self.get(name)
            .or_else(|| self.arena.master_by_name(name))
            .ok_or_else(|| DomainError::UnknownComponent(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = (&String, &NodeId)> {
        self.names.iter()
    }

    /// Declared components without a parent, in declaration order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }
}

/// Builds [`Page`]s from [`PageSpec`]s in dependency order.
pub struct PageBuilder {
    spec_cache: HashMap<String, ComponentSpec>,
    built: HashMap<String, NodeId>,
    visiting: HashSet<String>,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            spec_cache: HashMap::new(),
            built: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    /// Parse and build in one step.
    pub fn build_from_str(&mut self, content: &str) -> BuildResult<Page> {
        self.build(PageSpec::parse(content)?)
    }

    #[instrument(level = "debug", skip(self, spec))]
    pub fn build(&mut self, spec: PageSpec) -> BuildResult<Page> {
        // Reset state for a fresh build
        self.spec_cache.clear();
        self.built.clear();
        self.visiting.clear();

        let mut arena = ComponentArena::new();
        let mut order = Vec::with_capacity(spec.components.len());

        for component in spec.components {
            if arena.master_by_name(&component.name).is_some()
                || self.spec_cache.contains_key(&component.name)
            {
                return Err(DomainError::DuplicateName(component.name));
            }
            order.push(component.name.clone());
            self.spec_cache.insert(component.name.clone(), component);
        }
        self.check_references(&arena)?;
        debug!("build: {} components", order.len());

        for name in &order {
            self.build_component(&mut arena, name)?;
        }

        let names: BTreeMap<String, NodeId> =
            self.built.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let roots = order
            .iter()
            .filter_map(|name| self.built.get(name).copied())
            .filter(|&id| arena.parent_of(id).is_none())
            .collect();

        Ok(Page {
            title: spec.title,
            arena,
            names,
            roots,
        })
    }

    fn check_references(&self, arena: &ComponentArena) -> BuildResult<()> {
        for component in self.spec_cache.values() {
            if arena.master_by_name(&component.master).is_none()
                && !self.spec_cache.contains_key(&component.master)
            {
                return Err(DomainError::UnknownMaster(component.master.clone()));
            }
            for child in component.children.iter().flatten() {
                if !self.spec_cache.contains_key(child) {
                    return Err(DomainError::UnknownComponent(child.clone()));
                }
            }
        }
        Ok(())
    }

    /// Components `name` depends on: its master (unless a root master) and
    /// its listed children.
    fn dependencies(&self, name: &str) -> Vec<String> {
        let Some(component) = self.spec_cache.get(name) else {
            return Vec::new();
        };
        let mut deps = Vec::new();
        if self.spec_cache.contains_key(&component.master) {
            deps.push(component.master.clone());
        }
        deps.extend(component.children.iter().flatten().cloned());
        deps
    }

    fn build_component(&mut self, arena: &mut ComponentArena, name: &str) -> BuildResult<NodeId> {
        let mut stack = vec![(name.to_string(), false)];

        while let Some((current, expanded)) = stack.pop() {
            if self.built.contains_key(&current) {
                continue;
            }
            if !expanded {
                // Cycle detection
                if !self.visiting.insert(current.clone()) {
                    return Err(DomainError::CycleDetected(current));
                }
                let deps = self.dependencies(&current);
                stack.push((current, true));
                for dep in deps.into_iter().rev() {
                    if !self.built.contains_key(&dep) {
                        stack.push((dep, false));
                    }
                }
                continue;
            }

            let id = self.instantiate(arena, &current)?;
            self.visiting.remove(&current);
            self.built.insert(current, id);
        }

        self.built
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::UnknownComponent(name.to_string()))
    }

    fn instantiate(&self, arena: &mut ComponentArena, name: &str) -> BuildResult<NodeId> {
        let component = self
            .spec_cache
            .get(name)
            .ok_or_else(|| DomainError::UnknownComponent(name.to_string()))?;

        let master = self
            .built
            .get(&component.master)
            .copied()
            .or_else(|| arena.master_by_name(&component.master))
            .ok_or_else(|| DomainError::UnknownMaster(component.master.clone()))?;

        let mut spec = VariantSpec::new().with_attributes(component.attributes.clone());
        if let Some(children) = &component.children {
            let ids = children
                .iter()
                .map(|child| {
                    self.built
                        .get(child)
                        .copied()
                        .ok_or_else(|| DomainError::UnknownComponent(child.clone()))
                })
                .collect::<BuildResult<Vec<_>>>()?;
            spec = spec.with_children(ids);
        }

        let id = arena.create_variant(master, spec)?;
        arena.set_name(id, name)?;
        debug!("instantiate: {} -> {}", name, id);
        Ok(id)
    }
}
