//! Algorithms shared by several insertion modes.

use std::rc::Rc;

use koala_dom::Namespace;

use super::element::ElementCategory;
use super::modes::{ForeignFlag, InsertionMode};
use super::{LOG_TARGET, TreeBuilder};
use crate::error::TreeBuilderError;
use crate::sink::TreeSink;

impl<S: TreeSink> TreeBuilder<S> {
    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element,
    /// an rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements."
    pub(super) fn generate_implied_end_tags(&mut self) -> Result<(), TreeBuilderError> {
        self.generate_implied_end_tags_except_for(None)
    }

    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the
    /// above steps as if that element was not in the above list."
    pub(super) fn generate_implied_end_tags_except_for(
        &mut self,
        excluded: Option<&str>,
    ) -> Result<(), TreeBuilderError> {
        while let Some(current) = self.stack.current() {
            let implied = matches!(
                current.category,
                ElementCategory::P
                    | ElementCategory::Li
                    | ElementCategory::DdDt
                    | ElementCategory::Option
                    | ElementCategory::Optgroup
                    | ElementCategory::RtRp
            );
            if !implied || excluded.is_some_and(|name| current.name == name) {
                return Ok(());
            }
            self.pop()?;
        }
        Ok(())
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(super) fn implicitly_close_p(&mut self) -> Result<(), TreeBuilderError> {
        let Some(pos) = self.stack.find_last_in_scope("p") else {
            return Ok(());
        };
        // STEP 1: "Generate implied end tags, except for p elements."
        self.generate_implied_end_tags_except_for(Some("p"))?;
        // STEP 2: "If the current node is not a p element, then this is a
        //          parse error."
        if pos != self.stack.current_index() {
            self.err("Unclosed elements.");
        }
        // STEP 3: "Pop elements from the stack of open elements until a p
        //          element has been popped from the stack."
        self.pop_to_len(pos)
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "1. Generate implied end tags.
    /// 2. If the current node is not now a td element or a th element, then
    ///    this is a parse error.
    /// 3. Pop elements from the stack of open elements until a td element or
    ///    a th element has been popped from the stack.
    /// 4. Clear the list of active formatting elements up to the last marker.
    /// 5. Switch the insertion mode to "in row"."
    pub(super) fn close_the_cell(&mut self, pos: usize) -> Result<(), TreeBuilderError> {
        self.generate_implied_end_tags()?;
        if pos != self.stack.current_index() {
            self.err("Unclosed elements.");
        }
        self.pop_to_len(pos)?;
        self.formatting.clear_to_last_marker();
        self.switch_to(InsertionMode::InRow);
        Ok(())
    }

    /// Pop the stack until the element at `pos` has been popped, then reset
    /// the insertion mode. Used when `</table>` or `</select>` closes.
    pub(super) fn pop_to_and_reset(&mut self, pos: usize) -> Result<(), TreeBuilderError> {
        self.pop_to_len(pos)?;
        self.reset_the_insertion_mode();
        Ok(())
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    ///
    /// Walks the stack from the current node. In a fragment parse, the
    /// bottom entry stands for the context element.
    pub(super) fn reset_the_insertion_mode(&mut self) {
        let (mode, foreign) = self.appropriate_mode();
        self.foreign = foreign;
        if let Some(mode) = mode {
            self.switch_to(mode);
        }
    }

    fn appropriate_mode(&self) -> (Option<InsertionMode>, ForeignFlag) {
        let body_mode = self.body_mode();
        for (i, entry) in self.stack.entries().iter().enumerate().rev() {
            let (mut name, mut ns) = (entry.name.as_str(), entry.ns);

            // STEP 3: "If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser
            //          was created as part of the HTML fragment parsing
            //          algorithm (fragment case), set node to the context
            //          element passed to that algorithm."
            if i == 0
                && let Some(context) = &self.context
            {
                if context.ns == Namespace::Html && matches!(context.name.as_str(), "td" | "th") {
                    return (Some(body_mode), ForeignFlag::NotInForeign);
                }
                name = &context.name;
                ns = context.ns;
            }

            match name {
                "select" => return (Some(InsertionMode::InSelect), ForeignFlag::NotInForeign),
                "td" | "th" => return (Some(InsertionMode::InCell), ForeignFlag::NotInForeign),
                "tr" => return (Some(InsertionMode::InRow), ForeignFlag::NotInForeign),
                "tbody" | "thead" | "tfoot" => {
                    return (Some(InsertionMode::InTableBody), ForeignFlag::NotInForeign);
                }
                "caption" => return (Some(InsertionMode::InCaption), ForeignFlag::NotInForeign),
                "colgroup" => return (Some(InsertionMode::InColumnGroup), ForeignFlag::NotInForeign),
                "table" => return (Some(InsertionMode::InTable), ForeignFlag::NotInForeign),
                _ => {}
            }
            if ns != Namespace::Html {
                return (Some(body_mode), ForeignFlag::InForeign);
            }
            match name {
                "head" | "body" => return (Some(body_mode), ForeignFlag::NotInForeign),
                "frameset" => return (Some(InsertionMode::InFrameset), ForeignFlag::NotInForeign),
                "html" => {
                    let mode = if self.head_pointer.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                    return (Some(mode), ForeignFlag::NotInForeign);
                }
                _ if i == 0 => return (Some(body_mode), ForeignFlag::NotInForeign),
                _ => {}
            }
        }
        (None, ForeignFlag::NotInForeign)
    }

    /// [§ 13.2.4.4 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// "This has the effect of reopening all the formatting elements that
    /// were opened in the current body, cell, or caption (whichever is
    /// youngest) that haven't been explicitly closed."
    pub(super) fn reconstruct_the_active_formatting_elements(&mut self) -> Result<(), TreeBuilderError> {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there
        //          is nothing to reconstruct; stop this algorithm."
        let len = self.formatting.len();
        match self.formatting.slots().last() {
            None | Some(None) => return Ok(()),
            Some(Some(entry)) if self.stack.contains(entry) => return Ok(()),
            Some(Some(_)) => {}
        }

        // STEP 4-6 "Rewind": walk back to the first entry after a marker or
        // after an element that is still open.
        let mut first = len - 1;
        while first > 0 {
            match &self.formatting.slots()[first - 1] {
                None => break,
                Some(entry) if self.stack.contains(entry) => break,
                Some(_) => first -= 1,
            }
        }

        self.flush_characters();
        log::trace!(
            target: LOG_TARGET,
            "reconstructing {} formatting element(s)",
            len - first
        );

        // STEP 7-10 "Advance" / "Create": recreate each entry and put the
        // clone in its place in the list.
        for index in first..len {
            let Some(Some(entry)) = self.formatting.get(index).cloned() else {
                return Err(TreeBuilderError::Invariant(
                    "marker after the reconstruction point",
                ));
            };
            let clone = self
                .sink
                .create_element(Namespace::Html, &entry.name, &entry.clone_attributes());
            let current = self.current_entry()?;
            if current.foster_parenting {
                self.insert_into_foster_parent(&clone)?;
            } else {
                self.sink.append_element(&clone, &current.node);
            }
            let reopened = Rc::new(entry.with_node(clone));
            self.push(Rc::clone(&reopened));
            self.formatting.replace(index, reopened);
        }
        Ok(())
    }
}
