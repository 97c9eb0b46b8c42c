//! Tests for the DOM tree mutations a tree sink relies on: remove_child,
//! insert_before, move_children, detach and text merging.

use koala_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::html(tag)))
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child);

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_first_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, a);

    // b is now first child, c is second
    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_last_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, c);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(b), None);
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing);

    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(parent, new_child, existing);

    // new_child should be first, existing second
    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

// ========== move_children ==========

#[test]
fn test_move_children_basic() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(from, a);
    tree.append_child(from, b);

    tree.move_children(from, to);

    // from should be empty
    assert_eq!(tree.children(from).len(), 0);
    // to should have both children
    assert_eq!(tree.children(to), &[a, b]);
    assert_eq!(tree.parent(a), Some(to));
    assert_eq!(tree.parent(b), Some(to));
}

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let existing = alloc_element(&mut tree, "x");
    tree.append_child(to, existing);

    let moved = alloc_element(&mut tree, "y");
    tree.append_child(from, moved);

    tree.move_children(from, to);

    assert_eq!(tree.children(to), &[existing, moved]);
    // Sibling links between existing and moved
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
}

#[test]
fn test_move_children_empty_source() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    // Moving no children should be a no-op
    tree.move_children(from, to);

    assert_eq!(tree.children(from).len(), 0);
    assert_eq!(tree.children(to).len(), 0);
}

// ========== detach / re-append ==========

#[test]
fn test_append_child_moves_between_parents() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, first);
    tree.append_child(NodeId::ROOT, second);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(first, child);
    tree.append_child(second, child);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[child]);
    assert_eq!(tree.parent(child), Some(second));
}

#[test]
fn test_detach_orphan_is_noop() {
    let mut tree = DomTree::new();
    let node = alloc_element(&mut tree, "p");
    tree.detach(node);
    assert_eq!(tree.parent(node), None);
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let stranger = alloc_element(&mut tree, "span");
    let child = alloc_element(&mut tree, "p");
    tree.insert_before(parent, child, stranger);
    assert_eq!(tree.children(parent), &[child]);
}

// ========== text merging ==========

#[test]
fn test_append_text_merges_adjacent() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_text(p, "Hello, ");
    tree.append_text(p, "world");

    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.as_text(tree.children(p)[0]), Some("Hello, world"));
}

#[test]
fn test_insert_text_before_merges_with_previous_text() {
    let mut tree = DomTree::new();
    let body = alloc_element(&mut tree, "body");
    tree.append_text(body, "a");
    let table = alloc_element(&mut tree, "table");
    tree.append_child(body, table);

    tree.insert_text_before(body, "b", table);
    tree.insert_text_before(body, "c", table);

    assert_eq!(tree.children(body).len(), 2);
    assert_eq!(tree.as_text(tree.children(body)[0]), Some("abc"));
}

// ========== queries ==========

#[test]
fn test_document_element_and_body() {
    let mut tree = DomTree::new();
    let doctype = tree.alloc(NodeType::Doctype {
        name: "html".to_string(),
        public_id: String::new(),
        system_id: String::new(),
    });
    tree.append_child(NodeId::ROOT, doctype);
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, head);
    tree.append_child(html, body);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.ancestors(body).collect::<Vec<_>>(), vec![html, NodeId::ROOT]);
}

#[test]
fn test_body_ignores_foreign_namesake() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let mut data = ElementData::html("body");
    data.namespace = Namespace::Svg;
    let fake = tree.alloc(NodeType::Element(data));
    tree.append_child(html, fake);

    assert_eq!(tree.body(), None);
}

#[test]
fn test_namespace_uri_round_trip() {
    for ns in [Namespace::Html, Namespace::Svg, Namespace::MathMl] {
        assert_eq!(Namespace::from_uri(ns.uri()), Some(ns));
    }
    assert_eq!(Namespace::from_uri("urn:nope"), None);
}
