//! End tag handling for every insertion mode.
//!
//! End tags have no foreign content rules of their own: inside SVG and
//! MathML they reach "in body", whose "any other end tag" entry closes the
//! matching element by name. `</p>` and `</br>` are the exceptions, which
//! break out of foreign content before inserting their synthetic element.

use koala_dom::Namespace;

use super::element::{ElementCategory as C, ElementName};
use super::insertion::Creation;
use super::modes::{ForeignFlag, InsertionMode as M, Step};
use super::TreeBuilder;
use crate::error::TreeBuilderError;
use crate::sink::TreeSink;

impl<S: TreeSink> TreeBuilder<S> {
    /// Process an end tag token.
    pub fn end_tag(&mut self, name: &str) -> Result<(), TreeBuilderError> {
        let result = self.end_tag_inner(name);
        self.finish_token(result)
    }

    fn end_tag_inner(&mut self, name: &str) -> Result<(), TreeBuilderError> {
        self.need_to_drop_lf = false;
        let element = ElementName::classify(name);

        'reprocess: loop {
            let mut stage = self.mode;
            loop {
                match self.end_tag_in(stage, &element)? {
                    Step::Done => break 'reprocess,
                    Step::Reprocess => continue 'reprocess,
                    Step::FallThrough => {
                        stage = stage
                            .end_tag_fallthrough()
                            .ok_or(TreeBuilderError::Invariant("end tag fell off the mode chain"))?;
                    }
                }
            }
        }

        if self.foreign == ForeignFlag::InForeign && !self.stack.has_foreign_in_scope() {
            self.foreign = ForeignFlag::NotInForeign;
        }
        Ok(())
    }

    fn end_tag_in(&mut self, stage: M, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match stage {
            M::InRow => self.end_tag_in_row(element),
            M::InTableBody => self.end_tag_in_table_body(element),
            M::InTable => self.end_tag_in_table(element),
            M::InCaption => self.end_tag_in_caption(element),
            M::InCell => self.end_tag_in_cell(element),
            M::FramesetOk | M::InBody => self.end_tag_in_body(element),
            M::InColumnGroup => self.end_tag_in_column_group(element),
            M::InSelectInTable => self.end_tag_in_select_in_table(element),
            M::InSelect => self.end_tag_in_select(element),
            M::AfterBody => self.end_tag_after_body(element),
            M::InFrameset => self.end_tag_in_frameset(element),
            M::AfterFrameset => {
                if element.category == C::Html {
                    self.switch_to(M::AfterAfterFrameset);
                } else {
                    self.stray_end_tag_unterminated(element);
                }
                Ok(Step::Done)
            }
            M::Initial => {
                self.missing_doctype("End tag seen");
                self.switch_to(M::BeforeHtml);
                Ok(Step::Reprocess)
            }
            M::BeforeHtml => {
                if matches!(element.category, C::Head | C::Br | C::Html | C::Body) {
                    self.insert_html_root(&[])?;
                    self.switch_to(M::BeforeHead);
                    return Ok(Step::Reprocess);
                }
                Ok(self.stray_end_tag(element))
            }
            M::BeforeHead => {
                if matches!(element.category, C::Head | C::Br | C::Html | C::Body) {
                    self.insert_head(&[])?;
                    self.switch_to(M::InHead);
                    return Ok(Step::Reprocess);
                }
                Ok(self.stray_end_tag(element))
            }
            M::InHead => self.end_tag_in_head(element),
            M::InHeadNoscript => self.end_tag_in_head_noscript(element),
            M::AfterHead => {
                if matches!(element.category, C::Html | C::Body | C::Br) {
                    self.insert_html("body", &[], Creation::CURRENT)?;
                    self.switch_to(M::FramesetOk);
                    return Ok(Step::Reprocess);
                }
                Ok(self.stray_end_tag(element))
            }
            M::AfterAfterBody => {
                self.err(format!("Stray \u{201C}{}\u{201D} end tag.", element.name));
                self.switch_to(self.body_mode());
                Ok(Step::Reprocess)
            }
            M::AfterAfterFrameset => {
                self.err(format!("Stray \u{201C}{}\u{201D} end tag.", element.name));
                self.switch_to(M::InFrameset);
                Ok(Step::Reprocess)
            }
            M::Text => {
                // [§ 13.2.6.4.8](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
                // "Pop the current node off the stack of open elements.
                //  Switch the insertion mode to the original insertion mode."
                self.pop()?;
                if self.original_mode == M::AfterHead {
                    // The head pushed back for a late script, style or title.
                    self.silent_pop()?;
                }
                self.switch_to(self.original_mode);
                Ok(Step::Done)
            }
        }
    }

    fn stray_end_tag(&mut self, element: &ElementName) -> Step {
        self.err(format!("Stray end tag \u{201C}{}\u{201D}.", element.name));
        Step::Done
    }

    /// The select and frameset modes word the message without a full stop.
    fn stray_end_tag_unterminated(&mut self, element: &ElementName) {
        self.err(format!("Stray end tag \u{201C}{}\u{201D}", element.name));
    }

    /// Pop up to and including the table row, then hand the tag on in
    /// "in table body".
    fn close_table_row(&mut self) -> Result<bool, TreeBuilderError> {
        let pos = self.stack.find_last_or_root("tr");
        if pos == 0 {
            self.err("No table row to close.");
            return Ok(false);
        }
        // "Clear the stack back to a table row context."
        self.clear_stack_back_to(pos)?;
        self.pop()?;
        self.switch_to(M::InTableBody);
        Ok(true)
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    fn end_tag_in_row(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Tr => {
                let _ = self.close_table_row()?;
                Ok(Step::Done)
            }
            C::Table => {
                if self.close_table_row()? {
                    Ok(Step::Reprocess)
                } else {
                    Ok(Step::Done)
                }
            }
            C::TbodyTheadTfoot => {
                if self.stack.find_last_in_table_scope(&element.name).is_none() {
                    return Ok(self.stray_end_tag(element));
                }
                if self.close_table_row()? {
                    Ok(Step::Reprocess)
                } else {
                    Ok(Step::Done)
                }
            }
            C::Body | C::Caption | C::Col | C::Colgroup | C::Html | C::TdTh => {
                Ok(self.stray_end_tag(element))
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    fn end_tag_in_table_body(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::TbodyTheadTfoot => {
                let pos = self.stack.find_last_or_root(&element.name);
                if pos == 0 {
                    return Ok(self.stray_end_tag(element));
                }
                self.clear_stack_back_to(pos)?;
                self.pop()?;
                self.switch_to(M::InTable);
                Ok(Step::Done)
            }
            C::Table => {
                let pos = self.stack.find_last_category_or_root(C::TbodyTheadTfoot);
                if pos == 0 {
                    self.err("Stray end tag \u{201C}table\u{201D}.");
                    return Ok(Step::Done);
                }
                self.clear_stack_back_to(pos)?;
                self.pop()?;
                self.switch_to(M::InTable);
                Ok(Step::Reprocess)
            }
            C::Body | C::Caption | C::Col | C::Colgroup | C::Html | C::TdTh | C::Tr => {
                Ok(self.stray_end_tag(element))
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    fn end_tag_in_table(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Table => {
                let Some(pos) = self.stack.find_last("table") else {
                    self.err("Stray end tag \u{201C}table\u{201D}.");
                    return Ok(Step::Done);
                };
                // "Pop elements from this stack until a table element has
                //  been popped from the stack. Reset the insertion mode
                //  appropriately."
                self.pop_to_and_reset(pos)?;
                Ok(Step::Done)
            }
            C::Body
            | C::Caption
            | C::Col
            | C::Colgroup
            | C::Html
            | C::TbodyTheadTfoot
            | C::TdTh
            | C::Tr => Ok(self.stray_end_tag(element)),
            _ => {
                // "Anything else: Parse error. Enable foster parenting,
                //  process the token using the rules for the "in body"
                //  insertion mode"
                let _ = self.stray_end_tag(element);
                Ok(Step::FallThrough)
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    fn end_tag_in_caption(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Caption | C::Table => {
                if element.category == C::Table {
                    self.err("\u{201C}table\u{201D} closed but \u{201C}caption\u{201D} was still open.");
                }
                let Some(pos) = self.stack.find_last_in_table_scope("caption") else {
                    return Ok(Step::Done);
                };
                self.generate_implied_end_tags()?;
                if self.stack.current_index() != pos {
                    self.err("Unclosed elements on stack.");
                }
                self.pop_to_len(pos)?;
                self.formatting.clear_to_last_marker();
                self.switch_to(M::InTable);
                if element.category == C::Table {
                    Ok(Step::Reprocess)
                } else {
                    Ok(Step::Done)
                }
            }
            C::Body | C::Col | C::Colgroup | C::Html | C::TbodyTheadTfoot | C::TdTh | C::Tr => {
                Ok(self.stray_end_tag(element))
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    fn end_tag_in_cell(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::TdTh => {
                let Some(pos) = self.stack.find_last_in_table_scope(&element.name) else {
                    return Ok(self.stray_end_tag(element));
                };
                self.generate_implied_end_tags()?;
                if !self.is_current(&element.name) {
                    self.err("Unclosed elements.");
                }
                self.pop_to_len(pos)?;
                self.formatting.clear_to_last_marker();
                self.switch_to(M::InRow);
                Ok(Step::Done)
            }
            C::Table | C::TbodyTheadTfoot | C::Tr => {
                if self.stack.find_last_in_table_scope(&element.name).is_none() {
                    return Ok(self.stray_end_tag(element));
                }
                // "Otherwise, close the cell and reprocess the token."
                match self.stack.find_last_cell_in_table_scope() {
                    Some(pos) => {
                        self.close_the_cell(pos)?;
                        Ok(Step::Reprocess)
                    }
                    None => {
                        self.err("No cell to close.");
                        Ok(Step::Done)
                    }
                }
            }
            C::Body | C::Caption | C::Col | C::Colgroup | C::Html => Ok(self.stray_end_tag(element)),
            _ => Ok(Step::FallThrough),
        }
    }

    /// Whether the second entry on the stack is a `body`.
    fn is_second_on_stack_body(&self) -> bool {
        self.stack.current_index() >= 1
            && self
                .stack
                .get(1)
                .is_some_and(|entry| entry.category == C::Body)
    }

    /// "If the stack of open elements does not have an element in scope
    /// that is an HTML element with the same tag name as that of the token,
    /// then this is a parse error; ignore the token. Otherwise: generate
    /// implied end tags, then pop elements until that element has been
    /// popped."
    fn close_element_in_scope(&mut self, element: &ElementName, pos: Option<usize>) -> Result<bool, TreeBuilderError> {
        let Some(pos) = pos else {
            let _ = self.stray_end_tag(element);
            return Ok(false);
        };
        self.generate_implied_end_tags()?;
        if !self.is_current(&element.name) {
            self.err(format!(
                "End tag \u{201C}{}\u{201D} seen but there were unclosed elements.",
                element.name
            ));
        }
        self.pop_to_len(pos)?;
        Ok(true)
    }

    /// Used by `</p>` and `</br>` when an SVG or MathML element is open.
    fn break_out_of_foreign_content(&mut self, element: &ElementName) -> Result<(), TreeBuilderError> {
        if self.foreign != ForeignFlag::InForeign {
            return Ok(());
        }
        self.err(format!(
            "HTML start tag \u{201C}{}\u{201D} in a foreign namespace context.",
            element.name
        ));
        while self
            .stack
            .current()
            .is_some_and(|entry| entry.ns != Namespace::Html)
        {
            self.pop()?;
        }
        self.foreign = ForeignFlag::NotInForeign;
        Ok(())
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    #[allow(clippy::too_many_lines)]
    fn end_tag_in_body(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        let name = element.name.as_str();
        match element.category {
            C::Body => {
                if !self.is_second_on_stack_body() {
                    self.err("Stray end tag \u{201C}body\u{201D}.");
                    return Ok(Step::Done);
                }
                // "Otherwise, if there is a node in the stack of open elements
                //  that is not either a dd element, a dt element, an li
                //  element, an optgroup element, an option element, a p
                //  element, an rp element, an rt element, a tbody element, a
                //  td element, a tfoot element, a th element, a thead
                //  element, a tr element, the body element, or the html
                //  element, then this is a parse error."
                let unclosed = self.stack.entries().iter().skip(2).any(|entry| {
                    !matches!(
                        entry.category,
                        C::DdDt
                            | C::Li
                            | C::Optgroup
                            | C::Option
                            | C::P
                            | C::RtRp
                            | C::TdTh
                            | C::TbodyTheadTfoot
                    )
                });
                if unclosed {
                    self.err("End tag for \u{201C}body\u{201D} seen but there were unclosed elements.");
                }
                self.switch_to(M::AfterBody);
                Ok(Step::Done)
            }
            C::Html => {
                if !self.is_second_on_stack_body() {
                    self.err("Stray end tag \u{201C}html\u{201D}.");
                    return Ok(Step::Done);
                }
                let unclosed = self.stack.entries().iter().any(|entry| {
                    !matches!(
                        entry.category,
                        C::DdDt | C::Li | C::P | C::TbodyTheadTfoot | C::TdTh | C::Body | C::Html
                    )
                });
                if unclosed {
                    self.err("End tag for \u{201C}html\u{201D} seen but there were unclosed elements.");
                }
                self.switch_to(M::AfterBody);
                Ok(Step::Reprocess)
            }
            C::DivBlockquoteCenterMenu
            | C::UlOlDl
            | C::PreListing
            | C::Fieldset
            | C::AddressSectioning => {
                let pos = self.stack.find_last_in_scope(name);
                let _ = self.close_element_in_scope(element, pos)?;
                Ok(Step::Done)
            }
            C::Form => {
                // "Let node be the element that the form element pointer is
                //  set to, or null if it is not set to an element. Set the
                //  form element pointer to null."
                if self.form_pointer.take().is_none() {
                    return Ok(self.stray_end_tag(element));
                }
                let Some(pos) = self.stack.find_last_in_scope(name) else {
                    return Ok(self.stray_end_tag(element));
                };
                self.generate_implied_end_tags()?;
                if !self.is_current(name) {
                    self.err(format!(
                        "End tag \u{201C}{name}\u{201D} seen but there were unclosed elements."
                    ));
                }
                // "Remove node from the stack of open elements."
                self.remove_from_stack(pos)?;
                Ok(Step::Done)
            }
            C::P => {
                let Some(pos) = self.stack.find_last_in_scope("p") else {
                    // "If the stack of open elements does not have a p element
                    //  in button scope, then this is a parse error; insert an
                    //  HTML element for a "p" start tag token with no
                    //  attributes."
                    self.err("No \u{201C}p\u{201D} element in scope but a \u{201C}p\u{201D} end tag seen.");
                    self.break_out_of_foreign_content(element)?;
                    self.insert_void(Namespace::Html, element, &[], Creation::MAY_FOSTER)?;
                    return Ok(Step::Done);
                };
                self.generate_implied_end_tags_except_for(Some("p"))?;
                if pos != self.stack.current_index() {
                    self.err("End tag for \u{201C}p\u{201D} seen, but there were unclosed elements.");
                }
                self.pop_to_len(pos)?;
                Ok(Step::Done)
            }
            C::Li => {
                match self.stack.find_last_in_list_scope(name) {
                    None => self.err("No \u{201C}li\u{201D} element in list scope but a \u{201C}li\u{201D} end tag seen."),
                    Some(pos) => {
                        self.generate_implied_end_tags_except_for(Some(name))?;
                        if pos != self.stack.current_index() {
                            self.err("End tag for \u{201C}li\u{201D} seen, but there were unclosed elements.");
                        }
                        self.pop_to_len(pos)?;
                    }
                }
                Ok(Step::Done)
            }
            C::DdDt => {
                match self.stack.find_last_in_scope(name) {
                    None => self.err(format!(
                        "No \u{201C}{name}\u{201D} element in scope but a \u{201C}{name}\u{201D} end tag seen."
                    )),
                    Some(pos) => {
                        self.generate_implied_end_tags_except_for(Some(name))?;
                        if pos != self.stack.current_index() {
                            self.err(format!(
                                "End tag for \u{201C}{name}\u{201D} seen, but there were unclosed elements."
                            ));
                        }
                        self.pop_to_len(pos)?;
                    }
                }
                Ok(Step::Done)
            }
            C::H1ToH6 => {
                // Any open heading closes, whatever its rank.
                let pos = self.stack.find_last_heading_in_scope();
                let _ = self.close_element_in_scope(element, pos)?;
                Ok(Step::Done)
            }
            C::A | C::FormattingRun | C::Font | C::Nobr => {
                self.adoption_agency_end_tag(name)?;
                Ok(Step::Done)
            }
            C::Button | C::Object | C::MarqueeApplet => {
                let pos = self.stack.find_last_in_scope(name);
                if self.close_element_in_scope(element, pos)? {
                    // "Clear the list of active formatting elements up to the
                    //  last marker."
                    self.formatting.clear_to_last_marker();
                }
                Ok(Step::Done)
            }
            C::Br => {
                // "Parse error. Drop the attributes from the token, and act as
                //  described in the next entry; i.e. act as if this was a "br"
                //  start tag token with no attributes, rather than the end tag
                //  token that it actually is."
                self.err("End tag \u{201C}br\u{201D}.");
                self.break_out_of_foreign_content(element)?;
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_void(Namespace::Html, element, &[], Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::AreaBasefontBgsoundSpacerWbr
            | C::ParamSource
            | C::EmbedImg
            | C::Image
            | C::Input
            | C::Keygen
            | C::Hr
            | C::Isindex
            | C::Iframe
            | C::Noembed
            | C::Noframes
            | C::Select
            | C::Table
            | C::Textarea => Ok(self.stray_end_tag(element)),
            C::Noscript if self.config.scripting_enabled => {
                self.err("Stray end tag \u{201C}noscript\u{201D}.");
                Ok(Step::Done)
            }
            _ => {
                self.any_other_end_tag(element)?;
                Ok(Step::Done)
            }
        }
    }

    /// "Any other end tag": walk down from the current node to the element
    /// with the token's name, stopping at the first special or scoping
    /// element.
    fn any_other_end_tag(&mut self, element: &ElementName) -> Result<(), TreeBuilderError> {
        let name = element.name.as_str();
        if self.is_current(name) {
            return self.pop();
        }
        let mut pos = self.stack.current_index();
        loop {
            let node = self.entry_at(pos)?;
            if node.name == name {
                self.generate_implied_end_tags()?;
                if !self.is_current(name) {
                    self.err(format!(
                        "End tag \u{201C}{name}\u{201D} seen but there were unclosed elements."
                    ));
                }
                return self.pop_to_len(pos);
            }
            if node.scoping || node.special || pos == 0 {
                let _ = self.stray_end_tag(element);
                return Ok(());
            }
            pos -= 1;
        }
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    fn end_tag_in_column_group(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        if element.category == C::Col {
            self.err("Stray end tag \u{201C}col\u{201D}.");
            return Ok(Step::Done);
        }
        if self.stack.current_index() == 0 {
            self.err("Garbage in \u{201C}colgroup\u{201D} fragment.");
            return Ok(Step::Done);
        }
        self.pop()?;
        self.switch_to(M::InTable);
        if element.category == C::Colgroup {
            Ok(Step::Done)
        } else {
            Ok(Step::Reprocess)
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    fn end_tag_in_select_in_table(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Caption | C::Table | C::TbodyTheadTfoot | C::Tr | C::TdTh => {
                self.err(format!(
                    "\u{201C}{}\u{201D} end tag with \u{201C}select\u{201D} open.",
                    element.name
                ));
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name
                //  as that of the token, then ignore the token."
                if self.stack.find_last_in_table_scope(&element.name).is_none() {
                    return Ok(Step::Done);
                }
                let Some(pos) = self.stack.find_last_in_table_scope("select") else {
                    return Ok(Step::Done);
                };
                self.pop_to_and_reset(pos)?;
                Ok(Step::Reprocess)
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    fn end_tag_in_select(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Option => {
                if self.is_current("option") {
                    self.pop()?;
                } else {
                    self.err("Stray end tag \u{201C}option\u{201D}");
                }
            }
            C::Optgroup => {
                // "First, if the current node is an option element, and the
                //  node immediately before it in the stack of open elements is
                //  an optgroup element, then pop the current node from the
                //  stack of open elements."
                let index = self.stack.current_index();
                if self.is_current("option")
                    && index > 0
                    && self.entry_at(index - 1)?.name == "optgroup"
                {
                    self.pop()?;
                }
                if self.is_current("optgroup") {
                    self.pop()?;
                } else {
                    self.err("Stray end tag \u{201C}optgroup\u{201D}");
                }
            }
            C::Select => match self.stack.find_last_in_table_scope("select") {
                None => self.err("Stray end tag \u{201C}select\u{201D}"),
                Some(pos) => self.pop_to_and_reset(pos)?,
            },
            _ => self.stray_end_tag_unterminated(element),
        }
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn end_tag_after_body(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        if element.category == C::Html {
            // "If the parser was created as part of the HTML fragment parsing
            //  algorithm, this is a parse error; ignore the token. (fragment
            //  case)"
            if self.is_fragment() {
                self.err("Stray end tag \u{201C}html\u{201D}");
            } else {
                self.switch_to(M::AfterAfterBody);
            }
            return Ok(Step::Done);
        }
        self.err("Saw an end tag after \u{201C}body\u{201D} had been closed.");
        self.switch_to(self.body_mode());
        Ok(Step::Reprocess)
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    fn end_tag_in_frameset(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        if element.category != C::Frameset {
            self.stray_end_tag_unterminated(element);
            return Ok(Step::Done);
        }
        if self.stack.current_index() == 0 {
            self.err("Stray end tag \u{201C}frameset\u{201D}");
            return Ok(Step::Done);
        }
        self.pop()?;
        // "If the parser was not created as part of the HTML fragment parsing
        //  algorithm (fragment case), and the current node is no longer a
        //  frameset element, then switch the insertion mode to "after
        //  frameset"."
        if !self.is_fragment() && !self.is_current("frameset") {
            self.switch_to(M::AfterFrameset);
        }
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn end_tag_in_head(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Head => {
                self.pop()?;
                self.switch_to(M::AfterHead);
                Ok(Step::Done)
            }
            C::Br | C::Html | C::Body => {
                self.pop()?;
                self.switch_to(M::AfterHead);
                Ok(Step::Reprocess)
            }
            _ => Ok(self.stray_end_tag(element)),
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    fn end_tag_in_head_noscript(&mut self, element: &ElementName) -> Result<Step, TreeBuilderError> {
        match element.category {
            C::Noscript => {
                self.pop()?;
                self.switch_to(M::InHead);
                Ok(Step::Done)
            }
            C::Br => {
                let _ = self.stray_end_tag(element);
                self.pop()?;
                self.switch_to(M::InHead);
                Ok(Step::Reprocess)
            }
            _ => Ok(self.stray_end_tag(element)),
        }
    }
}
