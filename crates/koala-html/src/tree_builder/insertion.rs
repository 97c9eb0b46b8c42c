//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//!
//! Every way an element enters the tree, plus pushing and popping the
//! stack of open elements. Pending characters are flushed before any of
//! these edits so text stays in document order.

use std::rc::Rc;

use koala_dom::Namespace;

use super::element::ElementName;
use super::stack::StackEntry;
use super::{LOG_TARGET, TreeBuilder};
use crate::error::TreeBuilderError;
use crate::sink::TreeSink;
use crate::token::Attribute;

/// Where a new element goes relative to the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Placement {
    /// Always a child of the current node.
    Current,
    /// A child of the current node, unless the current node foster parents.
    MayFoster,
}

/// Which name the element is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Naming {
    /// The lowercase local name, unchecked.
    Plain,
    /// The lowercase local name; custom names go through the name policy.
    Checked,
    /// The SVG camel-cased name; custom names go through the name policy.
    CamelCase,
}

/// How to create an element.
#[derive(Debug, Clone, Copy)]
pub(super) struct Creation {
    naming: Naming,
    placement: Placement,
    with_form: bool,
}

impl Creation {
    /// Appended to the current node under its plain name.
    pub(super) const CURRENT: Self = Self {
        naming: Naming::Plain,
        placement: Placement::Current,
        with_form: false,
    };
    /// Appended to the current node, associated with the form pointer.
    pub(super) const CURRENT_FORM: Self = Self {
        naming: Naming::Plain,
        placement: Placement::Current,
        with_form: true,
    };
    /// The usual case for tags seen in body content.
    pub(super) const MAY_FOSTER: Self = Self {
        naming: Naming::Checked,
        placement: Placement::MayFoster,
        with_form: false,
    };
    /// Foreign SVG elements.
    pub(super) const MAY_FOSTER_CAMEL: Self = Self {
        naming: Naming::CamelCase,
        placement: Placement::MayFoster,
        with_form: false,
    };
    /// Form-associated elements.
    pub(super) const MAY_FOSTER_FORM: Self = Self {
        naming: Naming::Plain,
        placement: Placement::MayFoster,
        with_form: true,
    };
}

impl<S: TreeSink> TreeBuilder<S> {
    /// The current node's entry.
    pub(super) fn current_entry(&self) -> Result<Rc<StackEntry<S::Handle>>, TreeBuilderError> {
        self.stack
            .current()
            .cloned()
            .ok_or(TreeBuilderError::Invariant("stack of open elements is empty"))
    }

    /// Entry at `index` on the stack.
    pub(super) fn entry_at(&self, index: usize) -> Result<Rc<StackEntry<S::Handle>>, TreeBuilderError> {
        self.stack
            .get(index)
            .cloned()
            .ok_or(TreeBuilderError::Invariant("stack index out of range"))
    }

    /// Whether the current node is an element named `name`.
    pub(super) fn is_current(&self, name: &str) -> bool {
        self.stack.is_current(name)
    }

    /// Hand pending characters to the sink.
    ///
    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    /// "If the adjusted insertion location is in a Document node, then
    /// return." Text that would land inside a table is foster parented.
    pub(super) fn flush_characters(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let Some(current) = self.stack.current().cloned() else {
            return;
        };

        if current.foster_parenting && text.chars().any(|c| !is_html_whitespace(c)) {
            self.err("Misplaced non-space characters inside a table.");
            let table_pos = self.stack.find_last_or_root("table");
            if table_pos == 0 {
                if let Some(root) = self.stack.get(0).cloned() {
                    self.sink.append_characters(&root.node, &text);
                }
                return;
            }
            let (Some(table), Some(parent)) = (
                self.stack.get(table_pos).cloned(),
                self.stack.get(table_pos - 1).cloned(),
            ) else {
                return;
            };
            log::trace!(target: LOG_TARGET, "foster parenting {} characters", text.len());
            self.sink
                .insert_foster_parented_characters(&text, &table.node, &parent.node);
            return;
        }

        self.sink.append_characters(&current.node, &text);
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// "If last table has a parent node, then let adjusted insertion location
    /// be inside last table's parent node, immediately before last table,
    /// and abort these steps. Let previous element be the element
    /// immediately above last table in the stack of open elements."
    pub(super) fn insert_into_foster_parent(&mut self, child: &S::Handle) -> Result<(), TreeBuilderError> {
        let table_pos = self.stack.find_last_or_root("table");
        if table_pos == 0 {
            let root = self.entry_at(0)?;
            self.sink.append_element(child, &root.node);
            return Ok(());
        }
        let table = self.entry_at(table_pos)?;
        let parent = self.entry_at(table_pos - 1)?;
        log::trace!(target: LOG_TARGET, "foster parenting element before <table>");
        self.sink
            .insert_foster_parented_child(child, &table.node, &parent.node);
        Ok(())
    }

    /// "Insert an element at the adjusted insertion location"
    fn place(&mut self, node: &S::Handle, placement: Placement) -> Result<(), TreeBuilderError> {
        let current = self.current_entry()?;
        if placement == Placement::MayFoster && current.foster_parenting {
            self.fatal()?;
            self.insert_into_foster_parent(node)
        } else {
            self.sink.append_element(node, &current.node);
            Ok(())
        }
    }

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    /// followed by inserting it. Returns the node and the name it was
    /// created with.
    fn create_placed(
        &mut self,
        ns: Namespace,
        element: &ElementName,
        attributes: &[Attribute],
        how: Creation,
    ) -> Result<(S::Handle, String), TreeBuilderError> {
        self.flush_characters();
        let attributes = self.checked_attributes(attributes, ns)?;
        let name = match how.naming {
            Naming::Plain => element.name.clone(),
            Naming::Checked if element.custom => self.check_pop_name(&element.name)?,
            Naming::Checked => element.name.clone(),
            Naming::CamelCase if element.custom => self.check_pop_name(&element.camel_case_name)?,
            Naming::CamelCase => element.camel_case_name.clone(),
        };
        let node = if how.with_form {
            self.sink
                .create_element_with_form(ns, &name, &attributes, self.form_pointer.as_ref())
        } else {
            self.sink.create_element(ns, &name, &attributes)
        };
        self.place(&node, how.placement)?;
        Ok((node, name))
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "Insert a foreign element for the token, with the HTML namespace"
    /// and push it onto the stack of open elements.
    pub(super) fn insert_element(
        &mut self,
        ns: Namespace,
        element: &ElementName,
        attributes: &[Attribute],
        how: Creation,
    ) -> Result<(), TreeBuilderError> {
        let (node, name) = self.create_placed(ns, element, attributes, how)?;
        self.push(Rc::new(StackEntry::new(ns, element, node, name)));
        Ok(())
    }

    /// Like [`Self::insert_element`] for an HTML element named `name`.
    pub(super) fn insert_html(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        how: Creation,
    ) -> Result<(), TreeBuilderError> {
        self.insert_element(Namespace::Html, &ElementName::classify(name), attributes, how)
    }

    /// Insert an element that is popped immediately: it never becomes the
    /// current node for later tokens.
    pub(super) fn insert_void(
        &mut self,
        ns: Namespace,
        element: &ElementName,
        attributes: &[Attribute],
        how: Creation,
    ) -> Result<(), TreeBuilderError> {
        let (node, name) = self.create_placed(ns, element, attributes, how)?;
        self.sink.element_pushed(ns, &name, &node);
        self.sink.element_popped(ns, &name, &node);
        Ok(())
    }

    /// Like [`Self::insert_void`] for an HTML element named `name`.
    pub(super) fn insert_void_html(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        how: Creation,
    ) -> Result<(), TreeBuilderError> {
        self.insert_void(Namespace::Html, &ElementName::classify(name), attributes, how)
    }

    /// [§ 13.2.4.4 Push onto the list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// Insert a formatting element and add it to the list, remembering its
    /// attributes for later clones.
    pub(super) fn insert_formatting(
        &mut self,
        element: &ElementName,
        attributes: &[Attribute],
    ) -> Result<(), TreeBuilderError> {
        self.flush_characters();
        let attributes = self.checked_attributes(attributes, Namespace::Html)?.into_owned();
        let node = self
            .sink
            .create_element(Namespace::Html, &element.name, &attributes);
        self.place(&node, Placement::MayFoster)?;
        let entry = Rc::new(StackEntry::formatting(element, node, attributes));
        self.push(Rc::clone(&entry));
        self.formatting.push(entry);
        Ok(())
    }

    /// Insert a `form` and set the form element pointer to it.
    pub(super) fn insert_form(&mut self, attributes: &[Attribute], void: bool) -> Result<(), TreeBuilderError> {
        let form = ElementName::classify("form");
        let how = if void {
            Creation::CURRENT
        } else {
            Creation::MAY_FOSTER
        };
        let (node, name) = self.create_placed(Namespace::Html, &form, attributes, how)?;
        self.form_pointer = Some(node.clone());
        if void {
            self.sink.element_pushed(Namespace::Html, &name, &node);
            self.sink.element_popped(Namespace::Html, &name, &node);
        } else {
            self.push(Rc::new(StackEntry::html(&form, node)));
        }
        Ok(())
    }

    /// Insert a `head` and set the head element pointer to it.
    pub(super) fn insert_head(&mut self, attributes: &[Attribute]) -> Result<(), TreeBuilderError> {
        let head = ElementName::classify("head");
        let (node, _) = self.create_placed(Namespace::Html, &head, attributes, Creation::CURRENT)?;
        self.head_pointer = Some(node.clone());
        self.push(Rc::new(StackEntry::html(&head, node)));
        Ok(())
    }

    /// [§ 13.2.6.4.2](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    ///
    /// "Create an element for the token in the HTML namespace, with the
    /// Document as the intended parent. Append it to the Document object.
    /// Put this element in the stack of open elements."
    pub(super) fn insert_html_root(&mut self, attributes: &[Attribute]) -> Result<(), TreeBuilderError> {
        let attributes = self.checked_attributes(attributes, Namespace::Html)?;
        let node = self.sink.create_html_element_set_as_root(&attributes);
        self.push(Rc::new(StackEntry::html(&ElementName::classify("html"), node)));
        Ok(())
    }

    /// Append a comment to the current node.
    pub(super) fn insert_comment(&mut self, data: &str) -> Result<(), TreeBuilderError> {
        self.flush_characters();
        let current = self.current_entry()?;
        self.sink.append_comment(&current.node, data);
        Ok(())
    }

    /// Add attributes to the root element for a stray `<html>` start tag.
    ///
    /// "For each attribute on the token, check to see if the attribute is
    /// already present on the top element of the stack of open elements."
    pub(super) fn add_attributes_to_html(&mut self, attributes: &[Attribute]) -> Result<(), TreeBuilderError> {
        let attributes = self.checked_attributes(attributes, Namespace::Html)?;
        let root = self.entry_at(0)?;
        self.sink.add_attributes_to_element(&root.node, &attributes);
        Ok(())
    }

    /// Add attributes to the `body` for a stray `<body>` start tag.
    pub(super) fn add_attributes_to_body(&mut self, attributes: &[Attribute]) -> Result<(), TreeBuilderError> {
        let attributes = self.checked_attributes(attributes, Namespace::Html)?;
        if let Some(body) = self.stack.get(1).cloned()
            && self.stack.current_index() >= 1
            && body.category == super::ElementCategory::Body
        {
            self.sink.add_attributes_to_element(&body.node, &attributes);
        }
        Ok(())
    }

    /// Push an entry and tell the sink.
    pub(super) fn push(&mut self, entry: Rc<StackEntry<S::Handle>>) {
        log::trace!(target: LOG_TARGET, "push <{}> in {}", entry.pop_name, self.mode);
        self.sink.element_pushed(entry.ns, &entry.pop_name, &entry.node);
        self.stack.push(entry);
    }

    /// Push without telling the sink.
    pub(super) fn silent_push(&mut self, entry: Rc<StackEntry<S::Handle>>) {
        self.stack.push(entry);
    }

    /// [§ 13.2.6.4.6](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    ///
    /// "Push the node pointed to by the head element pointer onto the stack
    /// of open elements."
    pub(super) fn push_head_pointer(&mut self) -> Result<(), TreeBuilderError> {
        let head = self
            .head_pointer
            .clone()
            .ok_or(TreeBuilderError::Invariant("head element pointer is not set"))?;
        self.flush_characters();
        self.fatal()?;
        self.silent_push(Rc::new(StackEntry::html(&ElementName::classify("head"), head)));
        Ok(())
    }

    /// Pop the current node.
    pub(super) fn pop(&mut self) -> Result<(), TreeBuilderError> {
        self.flush_characters();
        let entry = self
            .stack
            .pop()
            .ok_or(TreeBuilderError::Invariant("pop from an empty stack of open elements"))?;
        log::trace!(target: LOG_TARGET, "pop <{}> in {}", entry.pop_name, self.mode);
        self.sink.element_popped(entry.ns, &entry.pop_name, &entry.node);
        Ok(())
    }

    /// Pop the current node without telling the sink.
    pub(super) fn silent_pop(&mut self) -> Result<(), TreeBuilderError> {
        self.flush_characters();
        let _ = self
            .stack
            .pop()
            .ok_or(TreeBuilderError::Invariant("pop from an empty stack of open elements"))?;
        Ok(())
    }

    /// Pop at end of file: scripts left open are flagged.
    pub(super) fn pop_on_eof(&mut self) -> Result<(), TreeBuilderError> {
        self.flush_characters();
        let entry = self
            .stack
            .pop()
            .ok_or(TreeBuilderError::Invariant("pop from an empty stack of open elements"))?;
        self.sink.mark_malformed_if_script(&entry.node);
        self.sink.element_popped(entry.ns, &entry.pop_name, &entry.node);
        Ok(())
    }

    /// Pop until the stack has `len` entries.
    pub(super) fn pop_to_len(&mut self, len: usize) -> Result<(), TreeBuilderError> {
        while self.stack.len() > len {
            self.pop()?;
        }
        Ok(())
    }

    /// Pop everything above `index`, keeping it as the current node.
    ///
    /// "clear the stack back to a table context" and friends.
    pub(super) fn clear_stack_back_to(&mut self, index: usize) -> Result<(), TreeBuilderError> {
        self.pop_to_len(index + 1)
    }

    /// Remove the entry at `index`. Removing anything but the current node
    /// is an infoset-incompatible edit.
    pub(super) fn remove_from_stack(&mut self, index: usize) -> Result<(), TreeBuilderError> {
        if index == self.stack.current_index() {
            return self.pop();
        }
        self.fatal()?;
        if index < self.stack.len() {
            let _ = self.stack.remove(index);
        }
        Ok(())
    }

    /// Remove this exact entry, wherever it is.
    pub(super) fn remove_entry_from_stack(
        &mut self,
        entry: &Rc<StackEntry<S::Handle>>,
    ) -> Result<(), TreeBuilderError> {
        match self.stack.position_of(entry) {
            Some(index) => self.remove_from_stack(index),
            None => Ok(()),
        }
    }

    /// Put `entry` at `index`, pushing normally when that is the top.
    pub(super) fn insert_into_stack(&mut self, entry: Rc<StackEntry<S::Handle>>, index: usize) {
        if index >= self.stack.len() {
            self.flush_characters();
            self.push(entry);
        } else {
            self.stack.insert(index, entry);
        }
    }
}

/// "ASCII whitespace" as the tree builder sees it.
pub(super) const fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{C}')
}
