//! A [`TreeSink`] that builds a [`koala_dom::DomTree`].
//!
//! Handles are [`NodeId`]s into the arena. Attribute names are stored as
//! the tree builder hands them over, so an adjusted foreign attribute keeps
//! its prefix (`xlink:href`).

use std::fmt::Write as _;

use koala_dom::{AttributesMap, DomTree, ElementData, Namespace, NodeId, NodeType};

use crate::foreign_content::foreign_attribute_name;
use crate::sink::TreeSink;
use crate::token::Attribute;
use crate::tree_builder::DocumentMode;

/// Builds a DOM tree from tree builder edits.
#[derive(Debug, Default)]
pub struct DomTreeSink {
    tree: DomTree,
    fragment: bool,
    document_mode: Option<DocumentMode>,
    malformed_scripts: Vec<NodeId>,
}

impl DomTreeSink {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Give up the sink and keep the tree.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// The document mode, once the tree builder has decided it.
    #[must_use]
    pub const fn document_mode(&self) -> Option<DocumentMode> {
        self.document_mode
    }

    /// Scripts that were still open at end of file.
    #[must_use]
    pub fn malformed_scripts(&self) -> &[NodeId] {
        &self.malformed_scripts
    }

    /// Serialize the tree in the html5lib tree-construction test format:
    /// one node per line, each prefixed with `| ` and two spaces per level.
    ///
    /// For a fragment parse the children of the synthetic root are dumped
    /// instead of the document.
    ///
    /// ```
    /// use koala_html::{DomTreeSink, Token, TreeBuilder};
    ///
    /// let mut builder = TreeBuilder::new(DomTreeSink::new());
    /// builder.run(vec![Token::start_tag("b")]).unwrap();
    /// assert_eq!(
    ///     builder.sink().to_test_format(),
    ///     "| <html>\n|   <head>\n|   <body>\n|     <b>\n"
    /// );
    /// ```
    #[must_use]
    pub fn to_test_format(&self) -> String {
        let mut out = String::new();
        let top = if self.fragment {
            self.tree.document_element()
        } else {
            Some(self.tree.root())
        };
        if let Some(top) = top {
            for &child in self.tree.children(top) {
                self.dump(&mut out, child, 0);
            }
        }
        out
    }

    fn dump(&self, out: &mut String, id: NodeId, depth: usize) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        match &node.node_type {
            NodeType::Document => {}
            NodeType::Doctype {
                name,
                public_id,
                system_id,
            } => {
                if public_id.is_empty() && system_id.is_empty() {
                    let _ = writeln!(out, "| {indent}<!DOCTYPE {name}>");
                } else {
                    let _ = writeln!(
                        out,
                        "| {indent}<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">"
                    );
                }
            }
            NodeType::Element(data) => {
                match data.namespace.dump_prefix() {
                    Some(prefix) => {
                        let _ = writeln!(out, "| {indent}<{prefix} {}>", data.tag_name);
                    }
                    None => {
                        let _ = writeln!(out, "| {indent}<{}>", data.tag_name);
                    }
                }
                let mut attrs: Vec<(String, &str)> = data
                    .attrs
                    .iter()
                    .map(|(name, value)| (dump_attribute_name(data.namespace, name), value.as_str()))
                    .collect();
                attrs.sort_unstable();
                for (name, value) in attrs {
                    let _ = writeln!(out, "| {indent}  {name}=\"{value}\"");
                }
            }
            NodeType::Text(text) => {
                let _ = writeln!(out, "| {indent}\"{text}\"");
            }
            NodeType::Comment(text) => {
                let _ = writeln!(out, "| {indent}<!-- {text} -->");
            }
        }
        for &child in self.tree.children(id) {
            self.dump(out, child, depth + 1);
        }
    }

    fn new_element(&mut self, ns: Namespace, name: &str, attrs: &[Attribute]) -> NodeId {
        let mut map = AttributesMap::with_capacity(attrs.len());
        for attribute in attrs {
            let _ = map
                .entry(attribute.name.clone())
                .or_insert_with(|| attribute.value.clone());
        }
        self.tree.alloc(NodeType::Element(ElementData {
            tag_name: name.to_string(),
            namespace: ns,
            attrs: map,
        }))
    }
}

/// `xlink:href` on an SVG element dumps as `xlink href`.
fn dump_attribute_name(ns: Namespace, name: &str) -> String {
    if ns == Namespace::Html {
        return name.to_string();
    }
    match foreign_attribute_name(name) {
        Some(adjusted) if !adjusted.prefix.is_empty() => {
            format!("{} {}", adjusted.prefix, adjusted.local_name)
        }
        _ => name.to_string(),
    }
}

impl TreeSink for DomTreeSink {
    type Handle = NodeId;

    fn start(&mut self, fragment: bool) {
        self.tree = DomTree::new();
        self.fragment = fragment;
        self.document_mode = None;
        self.malformed_scripts.clear();
    }

    fn create_element(&mut self, ns: Namespace, name: &str, attrs: &[Attribute]) -> NodeId {
        self.new_element(ns, name, attrs)
    }

    fn create_html_element_set_as_root(&mut self, attrs: &[Attribute]) -> NodeId {
        let html = self.new_element(Namespace::Html, "html", attrs);
        let root = self.tree.root();
        self.tree.append_child(root, html);
        html
    }

    fn detach_from_parent(&mut self, node: &NodeId) {
        self.tree.detach(*node);
    }

    fn append_element(&mut self, child: &NodeId, parent: &NodeId) {
        self.tree.append_child(*parent, *child);
    }

    fn append_children_to_new_parent(&mut self, old_parent: &NodeId, new_parent: &NodeId) {
        self.tree.move_children(*old_parent, *new_parent);
    }

    fn insert_foster_parented_child(&mut self, child: &NodeId, table: &NodeId, stack_parent: &NodeId) {
        match self.tree.parent(*table) {
            Some(parent) => self.tree.insert_before(parent, *child, *table),
            None => self.tree.append_child(*stack_parent, *child),
        }
    }

    fn insert_foster_parented_characters(&mut self, text: &str, table: &NodeId, stack_parent: &NodeId) {
        match self.tree.parent(*table) {
            Some(parent) => self.tree.insert_text_before(parent, text, *table),
            None => self.tree.append_text(*stack_parent, text),
        }
    }

    fn append_characters(&mut self, parent: &NodeId, text: &str) {
        self.tree.append_text(*parent, text);
    }

    fn append_comment(&mut self, parent: &NodeId, text: &str) {
        let comment = self.tree.alloc(NodeType::Comment(text.to_string()));
        self.tree.append_child(*parent, comment);
    }

    fn append_comment_to_document(&mut self, text: &str) {
        let root = self.tree.root();
        self.append_comment(&root, text);
    }

    fn append_doctype_to_document(&mut self, name: &str, public_id: &str, system_id: &str) {
        let doctype = self.tree.alloc(NodeType::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
        let root = self.tree.root();
        self.tree.append_child(root, doctype);
    }

    fn add_attributes_to_element(&mut self, node: &NodeId, attrs: &[Attribute]) {
        let Some(element) = self.tree.as_element_mut(*node) else {
            return;
        };
        for attribute in attrs {
            let _ = element
                .attrs
                .entry(attribute.name.clone())
                .or_insert_with(|| attribute.value.clone());
        }
    }

    fn mark_malformed_if_script(&mut self, node: &NodeId) {
        if self
            .tree
            .as_element(*node)
            .is_some_and(|e| e.namespace == Namespace::Html && e.tag_name == "script")
        {
            self.malformed_scripts.push(*node);
        }
    }

    fn document_mode(
        &mut self,
        mode: DocumentMode,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
        _html4_checks: bool,
    ) {
        self.document_mode = Some(mode);
    }
}

/// Print a DOM subtree to stdout, one node per line.
///
/// Spaces in text show as `·` and newlines as `\n` so whitespace-only text
/// nodes are visible.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{prefix}Document"),
        NodeType::Doctype { name, .. } => println!("{prefix}<!DOCTYPE {name}>"),
        NodeType::Element(data) => {
            let name = data.namespace.dump_prefix().map_or_else(
                || data.tag_name.clone(),
                |ns| format!("{ns}:{}", data.tag_name),
            );
            let attrs: Vec<String> = data
                .sorted_attrs()
                .into_iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.to_string()
                    } else {
                        format!("{k}=\"{v}\"")
                    }
                })
                .collect();
            if attrs.is_empty() {
                println!("{prefix}<{name}>");
            } else {
                println!("{prefix}<{name} {}>", attrs.join(" "));
            }
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{display}\"");
        }
        NodeType::Comment(data) => println!("{prefix}<!-- {data} -->"),
    }
    for &child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute::new(name.to_string(), value.to_string())
    }

    #[test]
    fn test_foster_parented_child_goes_before_table() {
        let mut sink = DomTreeSink::new();
        let html = sink.create_html_element_set_as_root(&[]);
        let table = sink.create_element(Namespace::Html, "table", &[]);
        sink.append_element(&table, &html);
        let div = sink.create_element(Namespace::Html, "div", &[]);
        sink.insert_foster_parented_child(&div, &table, &html);
        assert_eq!(sink.tree().children(html), &[div, table]);
    }

    #[test]
    fn test_foster_parented_text_merges_with_previous_text() {
        let mut sink = DomTreeSink::new();
        let html = sink.create_html_element_set_as_root(&[]);
        let table = sink.create_element(Namespace::Html, "table", &[]);
        sink.append_characters(&html, "a");
        sink.append_element(&table, &html);
        sink.insert_foster_parented_characters("b", &table, &html);
        assert_eq!(sink.tree().children(html).len(), 2);
        assert_eq!(sink.to_test_format(), "| <html>\n|   \"ab\"\n|   <table>\n");
    }

    #[test]
    fn test_added_attributes_do_not_overwrite() {
        let mut sink = DomTreeSink::new();
        let html = sink.create_html_element_set_as_root(&[attr("lang", "en")]);
        sink.add_attributes_to_element(&html, &[attr("lang", "fr"), attr("dir", "ltr")]);
        let data = sink.tree().as_element(html).unwrap();
        assert_eq!(data.sorted_attrs(), vec![("dir", "ltr"), ("lang", "en")]);
    }

    #[test]
    fn test_foreign_attribute_dump_names() {
        assert_eq!(dump_attribute_name(Namespace::Svg, "xlink:href"), "xlink href");
        assert_eq!(dump_attribute_name(Namespace::Svg, "viewBox"), "viewBox");
        assert_eq!(dump_attribute_name(Namespace::Html, "xlink:href"), "xlink:href");
    }

    #[test]
    fn test_doctype_dump() {
        let mut sink = DomTreeSink::new();
        sink.append_doctype_to_document("html", "", "");
        sink.append_doctype_to_document("html", "-//W3C//DTD HTML 4.01//EN", "");
        assert_eq!(
            sink.to_test_format(),
            "| <!DOCTYPE html>\n| <!DOCTYPE html \"-//W3C//DTD HTML 4.01//EN\" \"\">\n"
        );
    }
}
