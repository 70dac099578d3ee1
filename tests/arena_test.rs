//! Tests for derivation, attribute resolution and positional queries

use rstest::rstest;

use variantree::domain::{
    AttrValue, Attributes, ComponentArena, ComponentType, DomainError, NodeId, VariantSpec,
};
use variantree::util::testing;

fn variant(arena: &mut ComponentArena, source: NodeId) -> NodeId {
    arena.create_variant(source, VariantSpec::new()).unwrap()
}

fn children(arena: &ComponentArena, id: NodeId) -> Vec<NodeId> {
    arena.node(id).unwrap().children.clone()
}

// ============================================================
// create_variant
// ============================================================

#[rstest]
#[case(ComponentType::Container)]
#[case(ComponentType::Paragraph)]
#[case(ComponentType::Header)]
#[case(ComponentType::Image)]
fn given_root_master_when_creating_variant_then_links_both_ways(
    #[case] component_type: ComponentType,
) {
    // Arrange
    testing::init_test_setup();
    let mut arena = ComponentArena::new();
    let master = arena.master_for(component_type);

    // Act
    let v = variant(&mut arena, master);

    // Assert
    let node = arena.node(v).unwrap();
    assert_eq!(node.component_type, component_type);
    assert_eq!(node.master, Some(master));
    assert!(node.attributes.is_empty());
    assert!(node.children.is_empty());
    assert_eq!(node.parent, None);
    assert_eq!(arena.node(master).unwrap().variants, vec![v]);
}

#[test]
fn given_attributes_when_creating_variant_then_only_variant_holds_them() {
    // Arrange
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;

    // Act
    let v = arena
        .create_variant(container, VariantSpec::new().with_attribute("color", "red"))
        .unwrap();

    // Assert
    assert_eq!(
        arena.get_all_attrs(v).unwrap().get("color"),
        Some(&AttrValue::from("red"))
    );
    assert!(arena.get_all_attrs(container).unwrap().is_empty());
}

#[test]
fn given_caller_map_when_mutated_after_create_then_variant_unaffected() {
    // Arrange
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let mut attrs = Attributes::new();
    attrs.insert("color".into(), "red".into());

    // Act
    let v = arena
        .create_variant(container, VariantSpec::new().with_attributes(attrs.clone()))
        .unwrap();
    attrs.insert("color".into(), "blue".into());

    // Assert
    assert_eq!(arena.node(v).unwrap().attributes["color"], AttrValue::from("red"));
}

#[test]
fn given_master_with_nested_children_when_creating_variant_then_mirrors_structure() {
    // Arrange
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let card = variant(&mut arena, masters.container);
    let section = variant(&mut arena, masters.container);
    let icon = variant(&mut arena, masters.image);
    let body = variant(&mut arena, masters.text);
    arena.add_child(section, icon, None).unwrap();
    arena.add_child(card, section, None).unwrap();
    arena.add_child(card, body, None).unwrap();

    // Act
    let copy = variant(&mut arena, card);

    // Assert
    let mirrored = children(&arena, copy);
    assert_eq!(mirrored.len(), 2);
    assert_eq!(arena.master_of(mirrored[0]), Some(section));
    assert_eq!(arena.master_of(mirrored[1]), Some(body));
    assert_ne!(mirrored[0], section);
    assert_eq!(arena.parent_of(mirrored[0]), Some(copy));
    assert_eq!(
        arena.node(mirrored[1]).unwrap().component_type,
        ComponentType::Paragraph
    );

    let nested = children(&arena, mirrored[0]);
    assert_eq!(nested.len(), 1);
    assert_eq!(arena.master_of(nested[0]), Some(icon));

    // originals untouched
    assert_eq!(children(&arena, card), vec![section, body]);
    assert!(arena.check_invariants().is_ok());
}

#[test]
fn given_explicit_children_when_creating_variant_then_adopts_them_in_order() {
    // Arrange
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let text = variant(&mut arena, masters.text);
    let image = variant(&mut arena, masters.image);

    // Act
    let v = arena
        .create_variant(
            masters.container,
            VariantSpec::new().with_children(vec![image, text]),
        )
        .unwrap();

    // Assert
    assert_eq!(children(&arena, v), vec![image, text]);
    assert_eq!(arena.parent_of(text), Some(v));
    assert_eq!(arena.parent_of(image), Some(v));
}

#[test]
fn given_attached_child_when_adopting_then_errors_and_arena_unchanged() {
    // Arrange
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let card = variant(&mut arena, masters.container);
    let title = variant(&mut arena, masters.header);
    arena.add_child(card, title, None).unwrap();
    let before = arena.len();

    // Act
    let result =
        arena.create_variant(masters.container, VariantSpec::new().with_children(vec![title]));

    // Assert
    assert_eq!(
        result,
        Err(DomainError::AlreadyAttached {
            child: title,
            parent: card
        })
    );
    assert_eq!(arena.len(), before);
    assert_eq!(arena.node(masters.container).unwrap().variants, vec![card]);
}

#[test]
fn given_same_child_twice_when_adopting_then_errors() {
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let text = variant(&mut arena, masters.text);

    let result = arena.create_variant(
        masters.container,
        VariantSpec::new().with_children(vec![text, text]),
    );

    assert_eq!(result, Err(DomainError::DuplicateChild(text)));
    assert_eq!(arena.parent_of(text), None);
}

#[test]
fn given_root_master_as_child_when_adopting_then_errors() {
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();

    let result = arena.create_variant(
        masters.container,
        VariantSpec::new().with_children(vec![masters.text]),
    );

    assert_eq!(result, Err(DomainError::RootMaster(masters.text)));
}

#[test]
fn given_stale_handle_when_creating_variant_then_not_found() {
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let gone = variant(&mut arena, container);
    arena.remove_self(gone).unwrap();

    let result = arena.create_variant(gone, VariantSpec::new());

    assert_eq!(result, Err(DomainError::NodeNotFound(gone)));
}

// ============================================================
// get_all_attrs
// ============================================================

#[test]
fn given_master_chain_when_resolving_then_nearest_override_wins() {
    // Arrange
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let base = arena
        .create_variant(
            container,
            VariantSpec::new()
                .with_attribute("color", "red")
                .with_attribute("padding", 4i64),
        )
        .unwrap();
    let leaf = arena
        .create_variant(base, VariantSpec::new().with_attribute("color", "blue"))
        .unwrap();

    // Act
    let resolved = arena.get_all_attrs(leaf).unwrap();

    // Assert
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved["color"], AttrValue::from("blue"));
    assert_eq!(resolved["padding"], AttrValue::from(4i64));
}

#[test]
fn given_master_edit_when_resolving_variant_then_sees_change_immediately() {
    // Arrange
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let base = arena
        .create_variant(container, VariantSpec::new().with_attribute("color", "red"))
        .unwrap();
    let leaf = arena
        .create_variant(base, VariantSpec::new().with_attribute("color", "blue"))
        .unwrap();
    assert_eq!(arena.get_all_attrs(leaf).unwrap()["color"], AttrValue::from("blue"));

    // Act
    arena.set_attribute(base, "margin", 2.0).unwrap();
    let removed = arena.remove_attribute(leaf, "color").unwrap();

    // Assert
    assert_eq!(removed, Some(AttrValue::from("blue")));
    let resolved = arena.get_all_attrs(leaf).unwrap();
    assert_eq!(resolved["color"], AttrValue::from("red"));
    assert_eq!(resolved["margin"], AttrValue::Number(2.0));
}

#[test]
fn given_resolved_map_when_mutated_then_node_unchanged() {
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let v = arena
        .create_variant(container, VariantSpec::new().with_attribute("color", "red"))
        .unwrap();

    let mut resolved = arena.get_all_attrs(v).unwrap();
    resolved.insert("color".into(), "green".into());
    resolved.insert("extra".into(), true.into());

    let again = arena.get_all_attrs(v).unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(again["color"], AttrValue::from("red"));
}

#[test]
fn given_chain_when_resolving_with_origin_then_reports_defining_node() {
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let base = arena
        .create_variant(
            container,
            VariantSpec::new()
                .with_attribute("color", "red")
                .with_attribute("padding", 4i64),
        )
        .unwrap();
    let leaf = arena
        .create_variant(base, VariantSpec::new().with_attribute("color", "blue"))
        .unwrap();

    let resolved = arena.get_all_attrs_with_origin(leaf).unwrap();

    assert_eq!(
        resolved,
        vec![
            ("color".to_string(), AttrValue::from("blue"), leaf),
            ("padding".to_string(), AttrValue::from(4i64), base),
        ]
    );
}

#[test]
fn given_unknown_node_when_resolving_then_not_found() {
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let gone = variant(&mut arena, container);
    arena.remove_self(gone).unwrap();

    assert_eq!(arena.get_all_attrs(gone), Err(DomainError::NodeNotFound(gone)));
}

// ============================================================
// Positional queries and walk
// ============================================================

#[test]
fn given_three_children_when_querying_position_then_reports_index_and_ends() {
    // Arrange
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let parent = variant(&mut arena, masters.container);
    let kids: Vec<NodeId> = (0..3).map(|_| variant(&mut arena, masters.text)).collect();
    for &kid in &kids {
        arena.add_child(parent, kid, None).unwrap();
    }

    // Act / Assert
    for (i, &kid) in kids.iter().enumerate() {
        assert_eq!(arena.get_ind(kid), Some(i));
    }
    assert!(arena.is_first_child(kids[0]));
    assert!(!arena.is_last_child(kids[0]));
    assert!(!arena.is_first_child(kids[1]));
    assert!(!arena.is_last_child(kids[1]));
    assert!(arena.is_last_child(kids[2]));
}

#[test]
fn given_only_child_when_querying_position_then_first_and_last() {
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let parent = variant(&mut arena, masters.container);
    let only = variant(&mut arena, masters.image);
    arena.add_child(parent, only, None).unwrap();

    assert!(arena.is_first_child(only));
    assert!(arena.is_last_child(only));
}

#[rstest]
#[case::root_master(true)]
#[case::detached_variant(false)]
fn given_node_without_parent_when_querying_position_then_none(#[case] use_master: bool) {
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let id = if use_master {
        container
    } else {
        variant(&mut arena, container)
    };

    assert_eq!(arena.get_ind(id), None);
    assert!(!arena.is_first_child(id));
    assert!(!arena.is_last_child(id));
}

#[test]
fn given_nested_tree_when_walking_then_visits_preorder_with_sibling_index() {
    // Arrange
    let mut arena = ComponentArena::new();
    let masters = *arena.masters();
    let root = variant(&mut arena, masters.container);
    let a = variant(&mut arena, masters.container);
    let a1 = variant(&mut arena, masters.text);
    let a2 = variant(&mut arena, masters.image);
    let b = variant(&mut arena, masters.header);
    arena.add_child(a, a1, None).unwrap();
    arena.add_child(a, a2, None).unwrap();
    arena.add_child(root, a, None).unwrap();
    arena.add_child(root, b, None).unwrap();

    // Act
    let mut visited = Vec::new();
    arena.walk_children(root, |id, index| visited.push((id, index)));

    // Assert
    assert_eq!(visited, vec![(a, 0), (a1, 0), (a2, 1), (b, 1)]);
}

#[test]
fn given_leaf_when_walking_then_callback_never_runs() {
    let mut arena = ComponentArena::new();
    let container = arena.masters().container;
    let leaf = variant(&mut arena, container);

    let mut calls = 0;
    arena.walk_children(leaf, |_, _| calls += 1);

    assert_eq!(calls, 0);
}
