//! [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs misnested formatting end tags such as `<b>1<i>2</b>3`.
//!
//! Positions recorded during a pass (the bookmark, the furthest block)
//! are plain indices. Every removal the inner loop makes from the stack
//! happens above the furthest block, so its index is adjusted in step.

use std::rc::Rc;

use koala_dom::Namespace;

use super::{LOG_TARGET, TreeBuilder};
use crate::error::TreeBuilderError;
use crate::sink::TreeSink;

impl<S: TreeSink> TreeBuilder<S> {
    /// Run the adoption agency algorithm for an end tag named `subject`.
    pub(super) fn adoption_agency_end_tag(&mut self, subject: &str) -> Result<(), TreeBuilderError> {
        self.flush_characters();

        // STEP 4.2: "Outer loop"
        loop {
            // STEP 4.3: "Let formatting element be the last element in the
            //            list of active formatting elements that: is between
            //            the end of the list and the last marker in the list,
            //            if any, or the start of the list otherwise, and has
            //            the tag name subject."
            let Some(list_pos) = self.formatting.find_since_last_marker(subject) else {
                self.err(format!("No element \u{201C}{subject}\u{201D} to close."));
                return Ok(());
            };
            let Some(Some(formatting_element)) = self.formatting.get(list_pos).cloned() else {
                return Err(TreeBuilderError::Invariant("formatting entry vanished"));
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let mut in_scope = true;
            let mut formatting_pos = None;
            for (i, entry) in self.stack.entries().iter().enumerate().rev() {
                if Rc::ptr_eq(entry, &formatting_element) {
                    formatting_pos = Some(i);
                    break;
                }
                if entry.scoping {
                    in_scope = false;
                }
            }
            let Some(formatting_pos) = formatting_pos else {
                self.err(format!("No element \u{201C}{subject}\u{201D} to close."));
                let _ = self.formatting.remove(list_pos);
                return Ok(());
            };

            // STEP 4.5: "If formatting element is in the stack of open
            //            elements, but the element is not in scope, then this
            //            is a parse error; return."
            if !in_scope {
                self.err(format!("No element \u{201C}{subject}\u{201D} to close."));
                return Ok(());
            }

            // STEP 4.6: "If formatting element is not the current node, this
            //            is a parse error. (But do not return.)"
            if formatting_pos != self.stack.current_index() {
                self.err(format!(
                    "End tag \u{201C}{subject}\u{201D} violates nesting rules."
                ));
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack
            //            of open elements that is lower in the stack than
            //            formatting element, and is an element in the special
            //            category."
            let furthest_block_pos = self
                .stack
                .entries()
                .iter()
                .enumerate()
                .skip(formatting_pos + 1)
                .find(|(_, entry)| entry.scoping || entry.special)
                .map(|(i, _)| i);

            // STEP 4.8: "If there is no furthest block, then the UA must
            //            first pop all the nodes from the bottom of the stack
            //            of open elements, from the current node up to and
            //            including formatting element, then remove formatting
            //            element from the list of active formatting elements,
            //            and finally return."
            let Some(mut furthest_block_pos) = furthest_block_pos else {
                self.pop_to_len(formatting_pos)?;
                let _ = self.formatting.remove(list_pos);
                return Ok(());
            };
            let furthest_block = self.entry_at(furthest_block_pos)?;
            log::trace!(
                target: LOG_TARGET,
                "adoption agency for </{subject}>: furthest block <{}>",
                furthest_block.name
            );

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let common_ancestor = self.entry_at(
                formatting_pos
                    .checked_sub(1)
                    .ok_or(TreeBuilderError::Invariant("formatting element is the root"))?,
            )?;

            // STEP 4.10: "Let a bookmark note the position of formatting
            //             element in the list of active formatting elements
            //             relative to the elements on either side of it in
            //             the list."
            let mut bookmark = list_pos;

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_pos = furthest_block_pos;
            let mut last_node = Rc::clone(&furthest_block);

            // STEP 4.13: "Inner loop"
            loop {
                // "Let node be the element immediately above node in the
                //  stack of open elements"
                node_pos -= 1;
                let node = self.entry_at(node_pos)?;

                // "If node is not in the list of active formatting elements,
                //  then remove node from the stack of open elements and
                //  continue."
                let Some(node_list_pos) = self.formatting.position_of(&node) else {
                    self.remove_from_stack(node_pos)?;
                    furthest_block_pos -= 1;
                    continue;
                };

                // "If node is formatting element, then break."
                if node_pos == formatting_pos {
                    break;
                }

                // "If last node is furthest block, then move the
                //  aforementioned bookmark to be immediately after the new
                //  node in the list of active formatting elements."
                if node_pos == furthest_block_pos {
                    bookmark = node_list_pos + 1;
                }

                // "Create an element for the token for which the element node
                //  was created, in the HTML namespace, with common ancestor as
                //  the intended parent; replace the entry for node in the list
                //  of active formatting elements with an entry for the new
                //  element, replace the entry for node in the stack of open
                //  elements with an entry for the new element, and let node be
                //  the new element."
                let clone = self
                    .sink
                    .create_element(Namespace::Html, &node.name, &node.clone_attributes());
                let replacement = Rc::new(node.with_node(clone));
                self.stack.replace(node_pos, Rc::clone(&replacement));
                self.formatting
                    .replace(node_list_pos, Rc::clone(&replacement));

                // "Append last node to node."
                self.sink.detach_from_parent(&last_node.node);
                self.sink
                    .append_element(&last_node.node, &replacement.node);

                // "Set last node to node."
                last_node = replacement;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             appropriate place for inserting a node, but using
            //             common ancestor as the override target."
            self.sink.detach_from_parent(&last_node.node);
            if common_ancestor.foster_parenting {
                self.fatal()?;
                self.insert_into_foster_parent(&last_node.node)?;
            } else {
                self.sink
                    .append_element(&last_node.node, &common_ancestor.node);
            }

            // STEP 4.15: "Create an element for the token for which formatting
            //             element was created, in the HTML namespace, with
            //             furthest block as the intended parent."
            let clone = self.sink.create_element(
                Namespace::Html,
                &formatting_element.name,
                &formatting_element.clone_attributes(),
            );
            let formatting_clone = Rc::new(formatting_element.with_node(clone));

            // STEP 4.16: "Take all of the child nodes of furthest block and
            //             append them to the element created in the last step."
            self.sink
                .append_children_to_new_parent(&furthest_block.node, &formatting_clone.node);

            // STEP 4.17: "Append that new element to furthest block."
            self.sink
                .append_element(&formatting_clone.node, &furthest_block.node);

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the
            //             position of the aforementioned bookmark."
            let _ = self.formatting.remove(list_pos);
            let bookmark = bookmark.min(self.formatting.len());
            self.formatting
                .insert(bookmark, Rc::clone(&formatting_clone));

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack
            //             of open elements immediately below the position of
            //             furthest block in that stack."
            // The removal shifts furthest block up one slot, so its old index
            // is the slot just below it.
            self.remove_from_stack(formatting_pos)?;
            self.insert_into_stack(formatting_clone, furthest_block_pos);
        }
    }
}
