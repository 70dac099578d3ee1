/*
Tree views for terminal output.

Both relations of the component arena can be rendered: the composition tree
(what a page shows) and the derivation tree (which variant comes from which
master).
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{ComponentArena, NodeId, Page, Relation};

/// Label options for rendered trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeStyle {
    /// Append the node handle to every label
    pub show_ids: bool,
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, style: TreeStyle) -> Vec<Tree<String>>;
}

impl ComponentArena {
    fn tree_label(&self, id: NodeId, style: TreeStyle) -> String {
        let Some(node) = self.get_node(id) else {
            return id.to_string();
        };
        let mut label = node.label();
        if node.name.is_some() && !self.is_root_master(id) {
            label = format!("{} ({})", label, node.component_type.master_name());
        }
        if style.show_ids {
            label = format!("{} {}", label, id);
        }
        label
    }

    /// Render the subtree below `id` following `relation`.
    #[instrument(level = "debug", skip(self))]
    pub fn to_tree(&self, id: NodeId, relation: Relation, style: TreeStyle) -> Tree<String> {
        let mut tree = Tree::new(self.tree_label(id, style));

        fn build_tree(
            arena: &ComponentArena,
            node_id: NodeId,
            relation: Relation,
            style: TreeStyle,
            parent_tree: &mut Tree<String>,
        ) {
            if let Some(node) = arena.get_node(node_id) {
                let related = match relation {
                    Relation::Composition => &node.children,
                    Relation::Derivation => &node.variants,
                };
                for &child_id in related {
                    let mut child_tree = Tree::new(arena.tree_label(child_id, style));
                    build_tree(arena, child_id, relation, style, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        build_tree(self, id, relation, style, &mut tree);
        tree
    }
}

// Composition trees of the page, one per root component
impl TreeNodeConvert for Page {
    fn to_tree_string(&self, style: TreeStyle) -> Vec<Tree<String>> {
        self.roots()
            .iter()
            .map(|&root| self.arena.to_tree(root, Relation::Composition, style))
            .collect()
    }
}

// Derivation trees, one per root master
impl TreeNodeConvert for ComponentArena {
    fn to_tree_string(&self, style: TreeStyle) -> Vec<Tree<String>> {
        self.masters()
            .iter()
            .map(|master| self.to_tree(master, Relation::Derivation, style))
            .collect()
    }
}
