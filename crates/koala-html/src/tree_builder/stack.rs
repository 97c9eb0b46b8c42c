//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
//!
//! "Initially, the stack of open elements is empty. The stack grows
//! downwards; the topmost node on the stack is the first one added to the
//! stack, and the bottommost node of the stack is the most recently added
//! node in the stack"
//!
//! Entries are shared with the list of active formatting elements through
//! [`Rc`]; identity is pointer identity, so an entry on the stack "is" a
//! list entry only when both hold the same allocation.

use std::rc::Rc;

use koala_dom::Namespace;

use super::element::{ElementCategory, ElementName, is_svg_foreign_object};
use crate::token::Attribute;

/// An element on the stack of open elements.
#[derive(Debug, Clone)]
pub struct StackEntry<T> {
    /// Namespace the element was created in.
    pub ns: Namespace,
    /// Lowercase local name, the name scope searches compare.
    pub name: String,
    /// The name the element was created with (camel-cased for SVG, escaped
    /// under `AlterInfoset`).
    pub pop_name: String,
    /// Behavior group of `name`.
    pub category: ElementCategory,
    /// The sink's handle.
    pub node: T,
    /// Ends "in scope" searches.
    pub scoping: bool,
    /// In the "special" category.
    pub special: bool,
    /// Misplaced content is foster parented.
    pub foster_parenting: bool,
    /// Attributes kept for recreating a formatting element.
    pub attributes: Option<Vec<Attribute>>,
}

impl<T> StackEntry<T> {
    /// An entry for an element created from `element` in `ns`.
    ///
    /// HTML elements take the classified flags. Foreign elements are never
    /// special or foster parenting, and only the SVG `foreignObject` scopes.
    pub fn new(ns: Namespace, element: &ElementName, node: T, pop_name: String) -> Self {
        let html = ns == Namespace::Html;
        Self {
            ns,
            name: element.name.clone(),
            pop_name,
            category: element.category,
            node,
            scoping: if html {
                element.scoping
            } else {
                is_svg_foreign_object(ns, &element.name)
            },
            special: html && element.special,
            foster_parenting: html && element.foster_parenting,
            attributes: None,
        }
    }

    /// An HTML element created under its own name.
    pub fn html(element: &ElementName, node: T) -> Self {
        Self::new(Namespace::Html, element, node, element.name.clone())
    }

    /// An HTML formatting element, remembering its attributes.
    pub fn formatting(element: &ElementName, node: T, attributes: Vec<Attribute>) -> Self {
        Self {
            attributes: Some(attributes),
            ..Self::html(element, node)
        }
    }

    /// Attributes to recreate this element with.
    pub fn clone_attributes(&self) -> Vec<Attribute> {
        self.attributes.clone().unwrap_or_default()
    }

    /// A copy of this entry pointing at another node.
    pub fn with_node(&self, node: T) -> Self {
        Self {
            ns: self.ns,
            name: self.name.clone(),
            pop_name: self.pop_name.clone(),
            category: self.category,
            node,
            scoping: self.scoping,
            special: self.special,
            foster_parenting: self.foster_parenting,
            attributes: self.attributes.clone(),
        }
    }

    /// Whether this is an HTML element with the given local name.
    pub fn is_html(&self, name: &str) -> bool {
        self.ns == Namespace::Html && self.name == name
    }
}

/// The stack of open elements. Index 0 is the root.
#[derive(Debug)]
pub struct OpenElementStack<T> {
    entries: Vec<Rc<StackEntry<T>>>,
}

impl<T> Default for OpenElementStack<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> OpenElementStack<T> {
    /// Number of open elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is open.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current node. Meaningless on an empty stack.
    pub fn current_index(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// "The current node is the bottommost node in this stack of open elements."
    pub fn current(&self) -> Option<&Rc<StackEntry<T>>> {
        self.entries.last()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&Rc<StackEntry<T>>> {
        self.entries.get(index)
    }

    /// All entries, root first.
    pub fn entries(&self) -> &[Rc<StackEntry<T>>] {
        &self.entries
    }

    /// Push an entry.
    pub fn push(&mut self, entry: Rc<StackEntry<T>>) {
        self.entries.push(entry);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<Rc<StackEntry<T>>> {
        self.entries.pop()
    }

    /// Insert an entry at `index`, shifting everything above it up.
    pub fn insert(&mut self, index: usize, entry: Rc<StackEntry<T>>) {
        self.entries.insert(index, entry);
    }

    /// Remove the entry at `index`, shifting everything above it down.
    pub fn remove(&mut self, index: usize) -> Rc<StackEntry<T>> {
        self.entries.remove(index)
    }

    /// Replace the entry at `index`.
    pub fn replace(&mut self, index: usize, entry: Rc<StackEntry<T>>) {
        self.entries[index] = entry;
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether the current node's local name is `name`.
    pub fn is_current(&self, name: &str) -> bool {
        self.current().is_some_and(|entry| entry.name == name)
    }

    /// Position of this exact entry.
    pub fn position_of(&self, entry: &Rc<StackEntry<T>>) -> Option<usize> {
        self.entries.iter().rposition(|e| Rc::ptr_eq(e, entry))
    }

    /// Whether this exact entry is open.
    pub fn contains(&self, entry: &Rc<StackEntry<T>>) -> bool {
        self.position_of(entry).is_some()
    }

    /// Indices from the current node down to 1. Index 0 is never examined
    /// by searches.
    fn above_root(&self) -> impl Iterator<Item = (usize, &Rc<StackEntry<T>>)> {
        self.entries.iter().enumerate().skip(1).rev()
    }

    /// Scan down from the current node; `stop` ends the search unsuccessfully.
    fn find_until(
        &self,
        found: impl Fn(&StackEntry<T>) -> bool,
        stop: impl Fn(&StackEntry<T>) -> bool,
    ) -> Option<usize> {
        for (i, entry) in self.above_root() {
            if found(entry) {
                return Some(i);
            }
            if stop(entry) {
                return None;
            }
        }
        None
    }

    /// Topmost entry named `name`, without regard to scope.
    pub fn find_last(&self, name: &str) -> Option<usize> {
        self.find_until(|e| e.name == name, |_| false)
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    /// "has an element in scope"
    pub fn find_last_in_scope(&self, name: &str) -> Option<usize> {
        self.find_until(|e| e.name == name, |e| e.scoping)
    }

    /// "has an element in table scope": only `table` ends the search.
    pub fn find_last_in_table_scope(&self, name: &str) -> Option<usize> {
        self.find_until(|e| e.name == name, |e| e.name == "table")
    }

    /// "has an element in list item scope": scoping elements plus `ul`, `ol`.
    pub fn find_last_in_list_scope(&self, name: &str) -> Option<usize> {
        self.find_until(
            |e| e.name == name,
            |e| e.scoping || e.name == "ul" || e.name == "ol",
        )
    }

    /// Topmost `h1`..`h6` in scope.
    pub fn find_last_heading_in_scope(&self) -> Option<usize> {
        self.find_until(|e| e.category == ElementCategory::H1ToH6, |e| e.scoping)
    }

    /// Topmost `td` or `th` in table scope.
    pub fn find_last_cell_in_table_scope(&self) -> Option<usize> {
        self.find_until(|e| e.name == "td" || e.name == "th", |e| e.name == "table")
    }

    /// Like [`Self::find_last`], but 0 when not found.
    pub fn find_last_or_root(&self, name: &str) -> usize {
        self.find_last(name).unwrap_or(0)
    }

    /// Topmost entry in `category`, or 0.
    pub fn find_last_category_or_root(&self, category: ElementCategory) -> usize {
        self.find_until(|e| e.category == category, |_| false)
            .unwrap_or(0)
    }

    /// Whether a non-HTML element is open below the nearest scoping element.
    pub fn has_foreign_in_scope(&self) -> bool {
        for (_, entry) in self.above_root() {
            if entry.ns != Namespace::Html {
                return true;
            }
            if entry.scoping {
                return false;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(names: &[&str]) -> OpenElementStack<usize> {
        let mut stack = OpenElementStack::default();
        for (i, name) in names.iter().enumerate() {
            stack.push(Rc::new(StackEntry::html(&ElementName::classify(name), i)));
        }
        stack
    }

    #[test]
    fn test_scope_stops_at_scoping_element() {
        let stack = stack_of(&["html", "body", "p", "table", "tbody", "tr", "td", "span"]);
        assert_eq!(stack.find_last_in_scope("p"), None);
        assert_eq!(stack.find_last_in_scope("span"), Some(7));
        assert_eq!(stack.find_last("p"), Some(2));
    }

    #[test]
    fn test_table_scope_only_stops_at_table() {
        let stack = stack_of(&["html", "body", "table", "tbody", "tr", "td", "button", "p"]);
        assert_eq!(stack.find_last_in_table_scope("tr"), Some(4));
        assert_eq!(stack.find_last_in_table_scope("body"), None);
        assert_eq!(stack.find_last_cell_in_table_scope(), Some(5));
        assert_eq!(stack.find_last_in_scope("td"), None);
    }

    #[test]
    fn test_list_scope_stops_at_lists() {
        let stack = stack_of(&["html", "body", "li", "ul", "span"]);
        assert_eq!(stack.find_last_in_list_scope("li"), None);
        assert_eq!(stack.find_last_in_scope("li"), Some(2));
    }

    #[test]
    fn test_root_is_never_returned() {
        let stack = stack_of(&["html", "body"]);
        assert_eq!(stack.find_last("html"), None);
        assert_eq!(stack.find_last_or_root("table"), 0);
        assert_eq!(
            stack.find_last_category_or_root(ElementCategory::TbodyTheadTfoot),
            0
        );
    }

    #[test]
    fn test_headings() {
        let stack = stack_of(&["html", "body", "h3", "b"]);
        assert_eq!(stack.find_last_heading_in_scope(), Some(2));
    }

    #[test]
    fn test_foreign_in_scope() {
        let mut stack = stack_of(&["html", "body"]);
        assert!(!stack.has_foreign_in_scope());
        let svg = ElementName::classify("svg");
        stack.push(Rc::new(StackEntry::new(
            Namespace::Svg,
            &svg,
            9,
            "svg".to_string(),
        )));
        assert!(stack.has_foreign_in_scope());
        let fo = ElementName::classify("foreignobject");
        let entry = StackEntry::new(Namespace::Svg, &fo, 10, fo.camel_case_name.clone());
        assert!(entry.scoping && !entry.special);
        stack.push(Rc::new(entry));
        assert!(!stack.has_foreign_in_scope());
    }

    #[test]
    fn test_identity_is_pointer_based() {
        let stack = stack_of(&["html", "body", "b"]);
        let twin = Rc::new(StackEntry::html(&ElementName::classify("b"), 2));
        assert!(!stack.contains(&twin));
        let original = Rc::clone(&stack.entries()[2]);
        assert_eq!(stack.position_of(&original), Some(2));
    }
}
