//! Arena holding every component node and the two trees drawn over it.
//!
//! Each node takes part in two independent relations:
//! - derivation: `master` / `variants`, built by [`ComponentArena::create_variant`]
//! - composition: `parent` / `children`, edited by `add_child` / `remove_child`
//!
//! Structural edits on a node cascade down its derivation subtree so that
//! variants keep mirroring their source. Attribute inheritance is resolved on
//! every query by walking the `master` chain; nothing is cached.

use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::entities::{AttrValue, Attributes, ComponentType, RenderProps, VariantSpec};
use crate::domain::error::{DomainError, DomainResult};

/// Handle of a node in a [`ComponentArena`].
///
/// Handles are never reused: a slot freed by removal comes back with a new
/// generation, so a stale handle simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.0.into_raw_parts();
        if generation == 0 {
            write!(f, "#{}", index)
        } else {
            write!(f, "#{}.{}", index, generation)
        }
    }
}

/// A component node: either one of the four root masters or a variant.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// Inherited unchanged from the root master
    pub component_type: ComponentType,
    /// Optional label, used by page descriptions and tree output
    pub name: Option<String>,
    /// Local overrides only, never inherited values
    pub attributes: Attributes,
    /// Node this one was derived from, None for root masters
    pub master: Option<NodeId>,
    /// Nodes derived directly from this one, in creation order
    pub variants: Vec<NodeId>,
    /// Composition owner, None for a tree root
    pub parent: Option<NodeId>,
    /// Composition children, in rendering order
    pub children: Vec<NodeId>,
}

impl ComponentNode {
    fn new(
        component_type: ComponentType,
        attributes: Attributes,
        master: Option<NodeId>,
    ) -> Self {
        Self {
            component_type,
            name: None,
            attributes,
            master,
            variants: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Name if set, otherwise the lower-case component type.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.component_type.to_string().to_lowercase())
    }
}

/// Handles of the four predefined root masters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootMasters {
    pub container: NodeId,
    pub text: NodeId,
    pub header: NodeId,
    pub image: NodeId,
}

impl RootMasters {
    pub fn get(&self, component_type: ComponentType) -> NodeId {
        match component_type {
            ComponentType::Container => self.container,
            ComponentType::Paragraph => self.text,
            ComponentType::Header => self.header,
            ComponentType::Image => self.image,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> {
        [self.container, self.text, self.header, self.image].into_iter()
    }
}

/// Which of the two relations a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Composition,
    Derivation,
}

/// Arena-based storage for both trees.
#[derive(Debug)]
pub struct ComponentArena {
    arena: Arena<ComponentNode>,
    masters: RootMasters,
}

impl Default for ComponentArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentArena {
    /// Create an arena holding only the four root masters.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let mut insert_master = |component_type: ComponentType| {
            let mut node = ComponentNode::new(component_type, Attributes::new(), None);
            node.name = Some(component_type.master_name().to_string());
            NodeId(arena.insert(node))
        };
        let masters = RootMasters {
            container: insert_master(ComponentType::Container),
            text: insert_master(ComponentType::Paragraph),
            header: insert_master(ComponentType::Header),
            image: insert_master(ComponentType::Image),
        };
        Self { arena, masters }
    }

    pub fn masters(&self) -> &RootMasters {
        &self.masters
    }

    pub fn master_for(&self, component_type: ComponentType) -> NodeId {
        self.masters.get(component_type)
    }

    pub fn master_by_name(&self, name: &str) -> Option<NodeId> {
        ComponentType::from_master_name(name).map(|t| self.masters.get(t))
    }

    pub fn is_root_master(&self, id: NodeId) -> bool {
        self.masters.iter().any(|m| m == id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&ComponentNode> {
        self.arena.get(id.0)
    }

    /// Like [`ComponentArena::get_node`], failing with `NodeNotFound`.
    pub fn node(&self, id: NodeId) -> DomainResult<&ComponentNode> {
        self.get_node(id).ok_or(DomainError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut ComponentNode> {
        self.arena.get_mut(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ComponentNode)> {
        self.arena.iter().map(|(index, node)| (NodeId(index), node))
    }

    pub fn master_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.master)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> DomainResult<()> {
        let node = self.node_mut(id).ok_or(DomainError::NodeNotFound(id))?;
        node.name = Some(name.into());
        Ok(())
    }

    // ------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------

    /// Derive a new variant from `source`.
    ///
    /// With `spec.children` the given detached nodes are adopted as-is, in
    /// order. Without it the source's current children are mirrored by
    /// deriving a fresh variant of each, recursively.
    #[instrument(level = "debug", skip(self))]
    pub fn create_variant(&mut self, source: NodeId, spec: VariantSpec) -> DomainResult<NodeId> {
        self.node(source)?;
        let VariantSpec {
            attributes,
            children,
        } = spec;

        if let Some(children) = &children {
            let mut seen = HashSet::new();
            for &child in children {
                self.ensure_detached(child)?;
                if !seen.insert(child) {
                    return Err(DomainError::DuplicateChild(child));
                }
            }
        }

        let variant = self
            .spawn(source, attributes.unwrap_or_default())
            .ok_or(DomainError::NodeNotFound(source))?;

        match children {
            Some(children) => {
                for child in children {
                    self.attach(variant, child, None);
                }
            }
            None => self.mirror_children(source, variant),
        }

        debug!("create_variant: {} derived from {}", variant, source);
        Ok(variant)
    }

    /// Allocate a bare variant of `source` and register it as derived.
    fn spawn(&mut self, source: NodeId, attributes: Attributes) -> Option<NodeId> {
        let component_type = self.get_node(source)?.component_type;
        let node = ComponentNode::new(component_type, attributes, Some(source));
        let id = NodeId(self.arena.insert(node));
        if let Some(master) = self.node_mut(source) {
            master.variants.push(id);
        }
        Some(id)
    }

    /// Spawn a variant of `source` that mirrors its whole composition subtree.
    fn spawn_mirror(&mut self, source: NodeId) -> Option<NodeId> {
        let variant = self.spawn(source, Attributes::new())?;
        self.mirror_children(source, variant);
        Some(variant)
    }

    fn mirror_children(&mut self, source: NodeId, variant: NodeId) {
        let children = self
            .get_node(source)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            if let Some(mirror) = self.spawn_mirror(child) {
                self.attach(variant, mirror, None);
            }
        }
    }

    /// Walk the `master` chain starting at `id` itself.
    pub fn master_chain(&self, id: NodeId) -> MasterChain<'_> {
        MasterChain {
            arena: self,
            next: Some(id),
            remaining: self.arena.len(),
        }
    }

    /// Resolve the attributes of `id` against its whole master chain.
    ///
    /// Layers are applied from the root master down to `id`, so the nearest
    /// override wins. A fresh map is built on every call.
    #[instrument(level = "trace", skip(self))]
    pub fn get_all_attrs(&self, id: NodeId) -> DomainResult<Attributes> {
        self.node(id)?;
        let layers: Vec<&Attributes> = self.master_chain(id).map(|(_, n)| &n.attributes).collect();

        let mut merged = Attributes::new();
        for layer in layers.into_iter().rev() {
            for (key, value) in layer {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(merged)
    }

    /// Resolved attributes together with the node each value comes from.
    pub fn get_all_attrs_with_origin(
        &self,
        id: NodeId,
    ) -> DomainResult<Vec<(String, AttrValue, NodeId)>> {
        self.node(id)?;
        let mut resolved: Vec<(String, AttrValue, NodeId)> = Vec::new();
        for (origin, node) in self.master_chain(id) {
            for (key, value) in &node.attributes {
                if !resolved.iter().any(|(k, _, _)| k == key) {
                    resolved.push((key.clone(), value.clone(), origin));
                }
            }
        }
        resolved.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(resolved)
    }

    /// Resolved attributes split into element properties and style.
    pub fn render_props<S: AsRef<str>>(
        &self,
        id: NodeId,
        html_keys: &[S],
    ) -> DomainResult<RenderProps> {
        Ok(RenderProps::split(self.get_all_attrs(id)?, html_keys))
    }

    /// Write a local override. Returns the previous local value.
    #[instrument(level = "debug", skip(self, key, value))]
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> DomainResult<Option<AttrValue>> {
        let node = self.node_mut(id).ok_or(DomainError::NodeNotFound(id))?;
        Ok(node.attributes.insert(key.into(), value.into()))
    }

    /// Drop a local override so the inherited value shows through again.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> DomainResult<Option<AttrValue>> {
        let node = self.node_mut(id).ok_or(DomainError::NodeNotFound(id))?;
        Ok(node.attributes.remove(key))
    }

    // ------------------------------------------------------------
    // Composition and cascade
    // ------------------------------------------------------------

    /// Insert `child` under `parent` at `index` (default: end) and replay the
    /// insertion on every derivation descendant of `parent`.
    ///
    /// Each descendant receives its own freshly derived variant of the node
    /// inserted one level up, placed right after the counterpart of the
    /// preceding sibling.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> DomainResult<()> {
        let len = self.node(parent)?.children.len();
        self.ensure_detached(child)?;
        if let Some(index) = index {
            if index > len {
                return Err(DomainError::IndexOutOfBounds { index, len });
            }
        }

        // The cascade would never terminate if the inserted subtree contained
        // the parent or anything derived from it.
        let subtree: HashSet<NodeId> = std::iter::once(child)
            .chain(self.descendants(child).map(|(id, _)| id))
            .collect();
        if subtree.contains(&parent)
            || self
                .preorder(parent, Relation::Derivation)
                .any(|(id, _)| subtree.contains(&id))
        {
            return Err(DomainError::CompositionCycle { child, parent });
        }

        let index = index.unwrap_or(len);
        self.attach(parent, child, Some(index));
        self.cascade_insert(parent, index);
        Ok(())
    }

    fn cascade_insert(&mut self, source: NodeId, index: usize) {
        let Some(node) = self.get_node(source) else {
            return;
        };
        let Some(&inserted) = node.children.get(index) else {
            return;
        };
        let predecessor = index
            .checked_sub(1)
            .and_then(|i| node.children.get(i).copied());
        let variants = node.variants.clone();

        for variant in variants {
            let position = self.corresponding_position(variant, predecessor, index);
            if let Some(mirror) = self.spawn_mirror(inserted) {
                trace!(
                    target: "variantree::cascade",
                    "cascade_insert: {} into {} at {}",
                    mirror,
                    variant,
                    position
                );
                self.attach(variant, mirror, Some(position));
                self.cascade_insert(variant, position);
            }
        }
    }

    /// Position in `variant` that corresponds to "right after `predecessor`"
    /// in its source.
    fn corresponding_position(
        &self,
        variant: NodeId,
        predecessor: Option<NodeId>,
        fallback: usize,
    ) -> usize {
        let Some(node) = self.get_node(variant) else {
            return 0;
        };
        match predecessor {
            None => 0,
            Some(pred) => node
                .children
                .iter()
                .position(|&c| self.master_of(c) == Some(pred))
                .map(|i| i + 1)
                .unwrap_or_else(|| fallback.min(node.children.len())),
        }
    }

    /// Child of `variant` derived from `source_child`, if any.
    fn counterpart(&self, variant: NodeId, source_child: NodeId) -> Option<NodeId> {
        self.get_node(variant)?
            .children
            .iter()
            .copied()
            .find(|&c| self.master_of(c) == Some(source_child))
    }

    /// Detach `child` from `parent` and remove its counterparts from every
    /// derivation descendant of `parent`.
    ///
    /// `child` itself stays alive and may be added elsewhere; the
    /// counterparts are disposed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(DomainError::NotAChild { child, parent });
        }

        self.detach(parent, child);
        self.cascade_remove(parent, child);
        Ok(())
    }

    fn cascade_remove(&mut self, source: NodeId, removed: NodeId) {
        let variants = self
            .get_node(source)
            .map(|n| n.variants.clone())
            .unwrap_or_default();

        for variant in variants {
            if let Some(counterpart) = self.counterpart(variant, removed) {
                trace!(
                    target: "variantree::cascade",
                    "cascade_remove: {} from {}",
                    counterpart,
                    variant
                );
                self.detach(variant, counterpart);
                self.cascade_remove(variant, counterpart);
                self.dispose(counterpart);
            }
        }
    }

    /// Remove `id` from both trees and dispose it with its composition subtree.
    ///
    /// Derivation children of every disposed node are handed to that node's
    /// master, with the disposed node's overrides folded into them, so their
    /// resolved attributes are unchanged. Does not cascade to the parent's
    /// variants; use [`ComponentArena::remove_child`] for that.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_self(&mut self, id: NodeId) -> DomainResult<()> {
        let parent = self.node(id)?.parent;
        if self.is_root_master(id) {
            return Err(DomainError::RootMaster(id));
        }
        if let Some(parent) = parent {
            self.detach(parent, id);
        }
        self.dispose(id);
        Ok(())
    }

    fn dispose(&mut self, id: NodeId) {
        let doomed: Vec<NodeId> = self.iter_postorder(id).collect();
        for node in doomed {
            self.splice_out(node);
        }
    }

    fn splice_out(&mut self, id: NodeId) {
        let Some(node) = self.arena.remove(id.0) else {
            return;
        };
        trace!(
            target: "variantree::cascade",
            "splice_out: {} ({} variants)",
            id,
            node.variants.len()
        );

        if let Some(master) = node.master {
            if let Some(master) = self.node_mut(master) {
                match master.variants.iter().position(|&v| v == id) {
                    Some(pos) => {
                        master.variants.splice(pos..=pos, node.variants.iter().copied());
                    }
                    None => master.variants.extend(node.variants.iter().copied()),
                }
            }
        }
        for &variant in &node.variants {
            if let Some(v) = self.node_mut(variant) {
                v.master = node.master;
                for (key, value) in &node.attributes {
                    v.attributes
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }

        if let Some(parent) = node.parent {
            if let Some(parent) = self.node_mut(parent) {
                parent.children.retain(|&c| c != id);
            }
        }
        for &child in &node.children {
            if let Some(c) = self.node_mut(child) {
                if c.parent == Some(id) {
                    c.parent = None;
                }
            }
        }
    }

    fn ensure_detached(&self, child: NodeId) -> DomainResult<()> {
        let node = self.node(child)?;
        if self.is_root_master(child) {
            return Err(DomainError::RootMaster(child));
        }
        if let Some(parent) = node.parent {
            return Err(DomainError::AlreadyAttached { child, parent });
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        if let Some(node) = self.node_mut(parent) {
            let at = index.map_or(node.children.len(), |i| i.min(node.children.len()));
            node.children.insert(at, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            if node.parent == Some(parent) {
                node.parent = None;
            }
        }
    }

    // ------------------------------------------------------------
    // Traversal and position
    // ------------------------------------------------------------

    /// Index of `id` among its parent's children, None without a parent.
    #[instrument(level = "trace", skip(self))]
    pub fn get_ind(&self, id: NodeId) -> Option<usize> {
        let parent = self.get_node(self.parent_of(id)?)?;
        parent.children.iter().position(|&c| c == id)
    }

    pub fn is_first_child(&self, id: NodeId) -> bool {
        self.get_ind(id) == Some(0)
    }

    pub fn is_last_child(&self, id: NodeId) -> bool {
        match (self.get_ind(id), self.parent_of(id).and_then(|p| self.get_node(p))) {
            (Some(ind), Some(parent)) => ind + 1 == parent.children.len(),
            _ => false,
        }
    }

    /// Visit every composition descendant of `id` (not `id` itself) in
    /// pre-order, passing each node's index among its own siblings.
    #[instrument(level = "trace", skip(self, callback))]
    pub fn walk_children<F>(&self, id: NodeId, mut callback: F)
    where
        F: FnMut(NodeId, usize),
    {
        for (node, index) in self.descendants(id) {
            callback(node, index);
        }
    }

    /// Pre-order iterator over the composition descendants of `id`.
    pub fn descendants(&self, id: NodeId) -> PreOrder<'_> {
        self.preorder(id, Relation::Composition)
    }

    /// Pre-order iterator over everything derived, directly or transitively,
    /// from `id`.
    pub fn derived(&self, id: NodeId) -> PreOrder<'_> {
        self.preorder(id, Relation::Derivation)
    }

    pub fn preorder(&self, id: NodeId, relation: Relation) -> PreOrder<'_> {
        PreOrder::new(self, id, relation)
    }

    /// Post-order iterator over the composition subtree of `id`, ending with
    /// `id` itself.
    pub fn iter_postorder(&self, id: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, id)
    }

    /// Number of levels in the composition subtree rooted at `id`.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get_node(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Composition tree roots that are not root masters.
    pub fn roots(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(id, node)| node.parent.is_none() && !self.is_root_master(*id))
            .map(|(id, _)| id)
            .collect()
    }

    /// Verify the structural invariants of both trees.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let violation = |msg: String| Err(DomainError::InvariantViolation(msg));

        for (id, node) in self.iter() {
            match node.master {
                None if !self.is_root_master(id) => {
                    return violation(format!("{} has no master", id));
                }
                None => {}
                Some(m) => {
                    let Some(master) = self.get_node(m) else {
                        return violation(format!("{} points at missing master {}", id, m));
                    };
                    let listed = master.variants.iter().filter(|&&v| v == id).count();
                    if listed != 1 {
                        return violation(format!("{} listed {} times as variant of {}", id, listed, m));
                    }
                    if master.component_type != node.component_type {
                        return violation(format!("{} has a different type than master {}", id, m));
                    }
                }
            }
            if let Some(&v) = node.variants.iter().find(|&&v| self.master_of(v) != Some(id)) {
                return violation(format!("variant {} of {} does not point back", v, id));
            }

            if let Some(p) = node.parent {
                let Some(parent) = self.get_node(p) else {
                    return violation(format!("{} points at missing parent {}", id, p));
                };
                let listed = parent.children.iter().filter(|&&c| c == id).count();
                if listed != 1 {
                    return violation(format!("{} listed {} times as child of {}", id, listed, p));
                }
            }
            if let Some(&c) = node.children.iter().find(|&&c| self.parent_of(c) != Some(id)) {
                return violation(format!("child {} of {} does not point back", c, id));
            }

            let terminal = self.master_chain(id).last();
            if !matches!(terminal, Some((root, n)) if n.master.is_none() && self.is_root_master(root)) {
                return violation(format!("master chain of {} does not reach a root master", id));
            }

            let mut steps = 0;
            let mut current = node.parent;
            while let Some(p) = current {
                steps += 1;
                if steps > self.len() {
                    return violation(format!("composition cycle above {}", id));
                }
                current = self.parent_of(p);
            }
        }
        Ok(())
    }
}

/// Iterator over a node and its masters, nearest first.
pub struct MasterChain<'a> {
    arena: &'a ComponentArena,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for MasterChain<'a> {
    type Item = (NodeId, &'a ComponentNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let node = self.arena.get_node(id)?;
        self.next = node.master;
        Some((id, node))
    }
}

/// Pre-order traversal yielding each node with its index among its siblings.
/// The start node itself is not yielded.
pub struct PreOrder<'a> {
    arena: &'a ComponentArena,
    relation: Relation,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> PreOrder<'a> {
    fn new(arena: &'a ComponentArena, root: NodeId, relation: Relation) -> Self {
        let mut iter = Self {
            arena,
            relation,
            stack: Vec::new(),
        };
        if let Some(node) = arena.get_node(root) {
            iter.push_related(node);
        }
        iter
    }

    fn push_related(&mut self, node: &ComponentNode) {
        let related = match self.relation {
            Relation::Composition => &node.children,
            Relation::Derivation => &node.variants,
        };
        // Push in reverse order for left-to-right traversal
        for (index, &id) in related.iter().enumerate().rev() {
            self.stack.push((id, index));
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, index)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(id) {
                self.push_related(node);
                return Some((id, index));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a ComponentArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a ComponentArena, root: NodeId) -> Self {
        let mut stack = Vec::new();
        if arena.contains(root) {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some(current);
                }
            }
        }
        None
    }
}
