//! Start tag handling for every insertion mode.
//!
//! A start tag first goes through the foreign content rules when an SVG or
//! MathML element is open, then through the per-mode handlers. A handler
//! either consumes the tag, asks for it to be reprocessed from the top, or
//! passes it to the next mode in [`InsertionMode::start_tag_fallthrough`].

use koala_dom::Namespace;

use super::element::{ElementCategory as C, ElementName};
use super::insertion::Creation;
use super::modes::{ForeignFlag, InsertionMode as M, Step};
use super::TreeBuilder;
use crate::error::TreeBuilderError;
use crate::foreign_content::{adjust_mathml_attributes, adjust_svg_attributes};
use crate::sink::{ContentModel, TokenizerDirective, TreeSink};
use crate::token::Attribute;

/// "This is a searchable index. Enter search keywords: "
const ISINDEX_PROMPT: &str = "This is a searchable index. Enter search keywords: ";

/// The start tag being processed. Handlers may rename it (`image` becomes
/// `img`), adjust its attributes or acknowledge its self-closing flag.
struct TagToken {
    element: ElementName,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

impl TagToken {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

impl<S: TreeSink> TreeBuilder<S> {
    /// Process a start tag token.
    pub fn start_tag(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        self_closing: bool,
    ) -> Result<(), TreeBuilderError> {
        let result = self.start_tag_inner(name, attributes, self_closing);
        self.finish_token(result)
    }

    fn start_tag_inner(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        self_closing: bool,
    ) -> Result<(), TreeBuilderError> {
        self.check_duplicate_id(attributes);
        self.need_to_drop_lf = false;

        let mut tag = TagToken {
            element: ElementName::classify(name),
            attributes: attributes.to_vec(),
            self_closing,
        };
        let mut needs_post_processing = false;

        'reprocess: loop {
            if self.foreign == ForeignFlag::InForeign {
                match self.foreign_start_tag(&mut tag)? {
                    Step::Done => break,
                    Step::Reprocess => continue,
                    Step::FallThrough => needs_post_processing = true,
                }
            }

            let mut stage = self.mode;
            loop {
                match self.start_tag_in(stage, &mut tag)? {
                    Step::Done => break 'reprocess,
                    Step::Reprocess => continue 'reprocess,
                    Step::FallThrough => {
                        stage = stage
                            .start_tag_fallthrough()
                            .ok_or(TreeBuilderError::Invariant("start tag fell off the mode chain"))?;
                    }
                }
            }
        }

        // "If, after doing so, the insertion mode is still "in foreign
        //  content", but there is no element in scope that has a namespace
        //  other than the HTML namespace, switch the insertion mode to the
        //  secondary insertion mode."
        if needs_post_processing
            && self.foreign == ForeignFlag::InForeign
            && !self.stack.has_foreign_in_scope()
        {
            self.foreign = ForeignFlag::NotInForeign;
        }
        if tag.self_closing {
            self.err("Self-closing syntax (\u{201C}/>\u{201D}) used on a non-void HTML element. Ignoring the slash and treating as a start tag.");
        }
        Ok(())
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    fn foreign_start_tag(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        let current = self.current_entry()?;
        let category = tag.element.category;

        // HTML elements, MathML text integration points and SVG HTML
        // integration points take the tag through the ordinary modes.
        let integration_point = match current.ns {
            Namespace::Html => true,
            Namespace::MathMl => {
                (category != C::MglyphMalignmark && current.category == C::MathTextIntegration)
                    || (category == C::Svg && current.category == C::AnnotationXml)
            }
            Namespace::Svg => matches!(current.category, C::Title | C::ForeignObjectDesc),
        };
        if integration_point {
            return Ok(Step::FallThrough);
        }

        // "A start tag whose tag name is one of: "b", "big", "blockquote",
        //  "body", "br", "center", "code", "dd", "div", "dl", "dt", "em",
        //  "embed", "h1", ..., "table", "tt", "u", "ul", "var"
        //  A start tag whose tag name is "font", if the token has any
        //  attributes named "color", "face", or "size""
        let breakout = match category {
            C::FormattingRun
            | C::DivBlockquoteCenterMenu
            | C::Body
            | C::Br
            | C::RubySpanSubSupVar
            | C::DdDt
            | C::UlOlDl
            | C::EmbedImg
            | C::H1ToH6
            | C::Head
            | C::Hr
            | C::Li
            | C::Meta
            | C::Nobr
            | C::P
            | C::PreListing
            | C::Table => true,
            C::Font => ["color", "face", "size"]
                .iter()
                .any(|name| tag.attribute(name).is_some()),
            _ => false,
        };
        if breakout {
            self.err(format!(
                "HTML start tag \u{201C}{}\u{201D} in a foreign namespace context.",
                tag.element.name
            ));
            // "Pop an element from the stack of open elements, and then keep
            //  popping more elements from the stack of open elements until
            //  the current node is a MathML text integration point, an HTML
            //  integration point, or an element in the HTML namespace."
            while self
                .stack
                .current()
                .is_some_and(|entry| entry.ns != Namespace::Html)
            {
                self.pop()?;
            }
            self.foreign = ForeignFlag::NotInForeign;
            return Ok(Step::Reprocess);
        }

        // "Any other start tag: insert a foreign element for the token, in
        //  the same namespace as the adjusted current node."
        let ns = current.ns;
        let how = if ns == Namespace::Svg {
            adjust_svg_attributes(&mut tag.attributes);
            Creation::MAY_FOSTER_CAMEL
        } else {
            adjust_mathml_attributes(&mut tag.attributes);
            Creation::MAY_FOSTER
        };
        // "If the token has its self-closing flag set, pop the current node
        //  off the stack of open elements and acknowledge the token's
        //  self-closing flag."
        if tag.self_closing {
            self.insert_void(ns, &tag.element, &tag.attributes, how)?;
            tag.self_closing = false;
        } else {
            self.insert_element(ns, &tag.element, &tag.attributes, how)?;
        }
        Ok(Step::Done)
    }

    fn start_tag_in(&mut self, stage: M, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match stage {
            M::InTableBody => self.start_tag_in_table_body(tag),
            M::InRow => self.start_tag_in_row(tag),
            M::InTable => self.start_tag_in_table(tag),
            M::InCaption => self.start_tag_in_caption(tag),
            M::InCell => self.start_tag_in_cell(tag),
            M::FramesetOk => self.start_tag_frameset_ok(tag),
            M::InBody => self.start_tag_in_body(tag),
            M::InHead => self.start_tag_in_head(tag),
            M::InHeadNoscript => self.start_tag_in_head_noscript(tag),
            M::InColumnGroup => self.start_tag_in_column_group(tag),
            M::InSelectInTable => self.start_tag_in_select_in_table(tag),
            M::InSelect => self.start_tag_in_select(tag),
            M::AfterBody => self.start_tag_after_body(tag),
            M::InFrameset => self.start_tag_in_frameset(tag),
            M::AfterFrameset => self.start_tag_after_frameset(tag),
            M::Initial => {
                self.missing_doctype("Start tag seen");
                self.switch_to(M::BeforeHtml);
                Ok(Step::Reprocess)
            }
            M::BeforeHtml => self.start_tag_before_html(tag),
            M::BeforeHead => self.start_tag_before_head(tag),
            M::AfterHead => self.start_tag_after_head(tag),
            M::AfterAfterBody => self.start_tag_after_after_body(tag),
            M::AfterAfterFrameset => self.start_tag_after_after_frameset(tag),
            // The tokenizer only emits the matching end tag in text mode.
            M::Text => Ok(self.stray_start_tag(tag)),
        }
    }

    fn stray_start_tag(&mut self, tag: &TagToken) -> Step {
        self.err(format!("Stray \u{201C}{}\u{201D} start tag.", tag.element.name));
        Step::Done
    }

    /// "A start tag whose tag name is "html": Parse error. [...] add the
    /// attribute and its corresponding value to that element."
    fn stray_html_start_tag(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        self.err("Stray \u{201C}html\u{201D} start tag.");
        self.add_attributes_to_html(&tag.attributes)?;
        Ok(Step::Done)
    }

    /// Insert the tag and switch to the "text" insertion mode.
    fn insert_text_element(
        &mut self,
        tag: &TagToken,
        how: Creation,
        model: ContentModel,
    ) -> Result<Step, TreeBuilderError> {
        self.insert_element(Namespace::Html, &tag.element, &tag.attributes, how)?;
        self.enter_text_mode(model, &tag.element.name);
        Ok(Step::Done)
    }

    fn insert_tag(&mut self, tag: &TagToken, how: Creation) -> Result<(), TreeBuilderError> {
        self.insert_element(Namespace::Html, &tag.element, &tag.attributes, how)
    }

    fn insert_void_tag(&mut self, tag: &mut TagToken, how: Creation) -> Result<Step, TreeBuilderError> {
        self.insert_void(Namespace::Html, &tag.element, &tag.attributes, how)?;
        // "Acknowledge the token's self-closing flag, if it is set."
        tag.self_closing = false;
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    fn start_tag_in_table_body(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Tr => {
                // "Clear the stack back to a table body context."
                let pos = self.stack.find_last_category_or_root(C::TbodyTheadTfoot);
                self.clear_stack_back_to(pos)?;
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InRow);
                Ok(Step::Done)
            }
            C::TdTh => {
                self.err(format!(
                    "\u{201C}{}\u{201D} start tag in table body.",
                    tag.element.name
                ));
                let pos = self.stack.find_last_category_or_root(C::TbodyTheadTfoot);
                self.clear_stack_back_to(pos)?;
                // "Insert an HTML element for a "tr" start tag token with no
                //  attributes, then switch the insertion mode to "in row"."
                self.insert_html("tr", &[], Creation::CURRENT)?;
                self.switch_to(M::InRow);
                Ok(Step::Reprocess)
            }
            C::Caption | C::Col | C::Colgroup | C::TbodyTheadTfoot => {
                let pos = self.stack.find_last_category_or_root(C::TbodyTheadTfoot);
                if pos == 0 {
                    return Ok(self.stray_start_tag(tag));
                }
                self.clear_stack_back_to(pos)?;
                self.pop()?;
                self.switch_to(M::InTable);
                Ok(Step::Reprocess)
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    fn start_tag_in_row(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::TdTh => {
                // "Clear the stack back to a table row context."
                let pos = self.stack.find_last_or_root("tr");
                self.clear_stack_back_to(pos)?;
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InCell);
                // "Insert a marker at the end of the list of active
                //  formatting elements."
                self.formatting.insert_marker();
                Ok(Step::Done)
            }
            C::Caption | C::Col | C::Colgroup | C::TbodyTheadTfoot | C::Tr => {
                let pos = self.stack.find_last_or_root("tr");
                if pos == 0 {
                    self.err("No table row to close.");
                    return Ok(Step::Done);
                }
                self.clear_stack_back_to(pos)?;
                self.pop()?;
                self.switch_to(M::InTableBody);
                Ok(Step::Reprocess)
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    fn start_tag_in_table(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Caption => {
                // "Clear the stack back to a table context."
                let pos = self.stack.find_last_or_root("table");
                self.clear_stack_back_to(pos)?;
                self.formatting.insert_marker();
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InCaption);
                Ok(Step::Done)
            }
            C::Colgroup => {
                let pos = self.stack.find_last_or_root("table");
                self.clear_stack_back_to(pos)?;
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InColumnGroup);
                Ok(Step::Done)
            }
            C::Col => {
                let pos = self.stack.find_last_or_root("table");
                self.clear_stack_back_to(pos)?;
                self.insert_html("colgroup", &[], Creation::CURRENT)?;
                self.switch_to(M::InColumnGroup);
                Ok(Step::Reprocess)
            }
            C::TbodyTheadTfoot => {
                let pos = self.stack.find_last_or_root("table");
                self.clear_stack_back_to(pos)?;
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InTableBody);
                Ok(Step::Done)
            }
            C::Tr | C::TdTh => {
                let pos = self.stack.find_last_or_root("table");
                self.clear_stack_back_to(pos)?;
                self.insert_html("tbody", &[], Creation::CURRENT)?;
                self.switch_to(M::InTableBody);
                Ok(Step::Reprocess)
            }
            C::Table => {
                self.err("Start tag for \u{201C}table\u{201D} seen but the previous \u{201C}table\u{201D} is still open.");
                let Some(pos) = self.stack.find_last_in_table_scope("table") else {
                    return Ok(Step::Done);
                };
                self.generate_implied_end_tags()?;
                if !self.is_current("table") {
                    self.err("Unclosed elements on stack.");
                }
                self.pop_to_and_reset(pos)?;
                Ok(Step::Reprocess)
            }
            C::Script => self.insert_text_element(tag, Creation::CURRENT, ContentModel::ScriptData),
            C::Style => self.insert_text_element(tag, Creation::CURRENT, ContentModel::Rawtext),
            C::Input => {
                // "If the token does not have an attribute with the name
                //  "type", or if it does, but that attribute's value is not
                //  an ASCII case-insensitive match for the string "hidden",
                //  then: act as described in the "anything else" entry below."
                if !tag
                    .attribute("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden"))
                {
                    return Ok(Step::FallThrough);
                }
                self.insert_void_tag(tag, Creation::CURRENT_FORM)
            }
            C::Form => {
                if self.form_pointer.is_some() {
                    self.err("Saw a \u{201C}form\u{201D} start tag, but there was already an active \u{201C}form\u{201D} element. Nested forms are not allowed. Ignoring the tag.");
                } else {
                    self.err("Start tag \u{201C}form\u{201D} seen in \u{201C}table\u{201D}.");
                    self.insert_form(&tag.attributes, true)?;
                }
                Ok(Step::Done)
            }
            _ => {
                self.err(format!(
                    "Start tag \u{201C}{}\u{201D} seen in \u{201C}table\u{201D}.",
                    tag.element.name
                ));
                Ok(Step::FallThrough)
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    fn start_tag_in_caption(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Caption | C::Col | C::Colgroup | C::TbodyTheadTfoot | C::Tr | C::TdTh => {
                self.err(format!(
                    "Stray \u{201C}{}\u{201D} start tag in \u{201C}caption\u{201D}.",
                    tag.element.name
                ));
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
                Ok(Step::Reprocess)
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    fn start_tag_in_cell(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Caption | C::Col | C::Colgroup | C::TbodyTheadTfoot | C::Tr | C::TdTh => {
                // "If the stack of open elements does not have a td or th
                //  element in table scope, then this is a parse error; ignore
                //  the token. (fragment case)"
                match self.stack.find_last_cell_in_table_scope() {
                    None => {
                        self.err("No cell to close.");
                        Ok(Step::Done)
                    }
                    Some(pos) => {
                        self.close_the_cell(pos)?;
                        Ok(Step::Reprocess)
                    }
                }
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// The part of "in body" that depends on the frameset-ok flag.
    fn start_tag_frameset_ok(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Frameset => {
                if self.mode != M::FramesetOk {
                    self.err("Stray \u{201C}frameset\u{201D} start tag.");
                    return Ok(Step::Done);
                }
                // "If the second element on the stack of open elements is not
                //  a body element, or if the stack of open elements has only
                //  one node on it, then ignore the token. (fragment case)"
                let body = match self.stack.get(1) {
                    Some(entry) if entry.category == C::Body => entry.clone(),
                    _ => {
                        self.err("Stray \u{201C}frameset\u{201D} start tag.");
                        return Ok(Step::Done);
                    }
                };
                self.err("\u{201C}frameset\u{201D} start tag seen.");
                // "Remove the second element on the stack of open elements
                //  from its parent node, if it has one. Pop all the nodes from
                //  the bottom of the stack of open elements, from the current
                //  node up to, but not including, the root html element."
                self.flush_characters();
                self.sink.detach_from_parent(&body.node);
                self.pop_to_len(1)?;
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InFrameset);
                Ok(Step::Done)
            }
            C::PreListing
            | C::Li
            | C::DdDt
            | C::Button
            | C::MarqueeApplet
            | C::Object
            | C::Table
            | C::AreaBasefontBgsoundSpacerWbr
            | C::Br
            | C::EmbedImg
            | C::Input
            | C::Keygen
            | C::Hr
            | C::Textarea
            | C::Xmp
            | C::Iframe
            | C::Select => {
                // "Set the frameset-ok flag to "not ok"."
                if self.mode == M::FramesetOk {
                    self.frameset_ok = false;
                    self.switch_to(M::InBody);
                }
                Ok(Step::FallThrough)
            }
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    #[allow(clippy::too_many_lines)]
    fn start_tag_in_body(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            // "Process the token using the rules for the "in head"
            //  insertion mode."
            C::Base | C::Link | C::Meta | C::Style | C::Script | C::Title | C::Command => {
                Ok(Step::FallThrough)
            }
            C::Body => {
                self.err("\u{201C}body\u{201D} start tag found but the \u{201C}body\u{201D} element is already open.");
                self.add_attributes_to_body(&tag.attributes)?;
                Ok(Step::Done)
            }
            C::P | C::DivBlockquoteCenterMenu | C::UlOlDl | C::AddressSectioning => {
                self.implicitly_close_p()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::H1ToH6 => {
                self.implicitly_close_p()?;
                // "If the current node is an HTML element whose tag name is
                //  one of "h1", "h2", "h3", "h4", "h5", or "h6", then this is
                //  a parse error; pop the current node off the stack of open
                //  elements."
                if self.current_entry()?.category == C::H1ToH6 {
                    self.err("Heading cannot be a child of another heading.");
                    self.pop()?;
                }
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::Fieldset => {
                self.implicitly_close_p()?;
                self.insert_tag(tag, Creation::MAY_FOSTER_FORM)?;
                Ok(Step::Done)
            }
            C::PreListing => {
                self.implicitly_close_p()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                // "If the next token is a U+000A LINE FEED (LF) character
                //  token, then ignore that token and move on to the next one."
                self.need_to_drop_lf = true;
                Ok(Step::Done)
            }
            C::Form => {
                if self.form_pointer.is_some() {
                    self.err("Saw a \u{201C}form\u{201D} start tag, but there was already an active \u{201C}form\u{201D} element. Nested forms are not allowed. Ignoring the tag.");
                    return Ok(Step::Done);
                }
                self.implicitly_close_p()?;
                self.insert_form(&tag.attributes, false)?;
                Ok(Step::Done)
            }
            C::Li | C::DdDt => {
                self.close_list_item(tag.element.category)?;
                self.implicitly_close_p()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::Plaintext => {
                self.implicitly_close_p()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                // "Switch the tokenizer to the PLAINTEXT state."
                self.directives.push(TokenizerDirective::SetContentModel {
                    model: ContentModel::Plaintext,
                    element: tag.element.name.clone(),
                });
                Ok(Step::Done)
            }
            C::A => {
                // "If the list of active formatting elements contains an a
                //  element between the end of the list and the last marker on
                //  the list (or the start of the list if there is no marker on
                //  the list), then this is a parse error; run the adoption
                //  agency algorithm for the token, then remove that element
                //  from the list of active formatting elements and the stack
                //  of open elements if the adoption agency algorithm didn't
                //  already remove it"
                if let Some(pos) = self.formatting.find_since_last_marker("a") {
                    self.err("An \u{201C}a\u{201D} start tag seen with already an active \u{201C}a\u{201D} element.");
                    let active = self.formatting.get(pos).cloned().flatten();
                    self.adoption_agency_end_tag("a")?;
                    if let Some(active) = active {
                        self.remove_entry_from_stack(&active)?;
                        if let Some(pos) = self.formatting.position_of(&active) {
                            let _ = self.formatting.remove(pos);
                        }
                    }
                }
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_formatting(&tag.element, &tag.attributes)?;
                Ok(Step::Done)
            }
            C::FormattingRun | C::Font => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_formatting(&tag.element, &tag.attributes)?;
                Ok(Step::Done)
            }
            C::Nobr => {
                self.reconstruct_the_active_formatting_elements()?;
                if self.stack.find_last_in_scope("nobr").is_some() {
                    self.err("\u{201C}nobr\u{201D} start tag seen when there was an open \u{201C}nobr\u{201D} element in scope.");
                    self.adoption_agency_end_tag("nobr")?;
                }
                self.insert_formatting(&tag.element, &tag.attributes)?;
                Ok(Step::Done)
            }
            C::Button => {
                if let Some(pos) = self.stack.find_last_in_scope("button") {
                    self.err("\u{201C}button\u{201D} start tag seen when there was an open \u{201C}button\u{201D} element in scope.");
                    self.generate_implied_end_tags()?;
                    if !self.is_current("button") {
                        self.err("There was an open \u{201C}button\u{201D} element in scope with unclosed children.");
                    }
                    self.pop_to_len(pos)?;
                    self.formatting.clear_to_last_marker();
                    return Ok(Step::Reprocess);
                }
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER_FORM)?;
                self.formatting.insert_marker();
                Ok(Step::Done)
            }
            C::Object => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER_FORM)?;
                self.formatting.insert_marker();
                Ok(Step::Done)
            }
            C::MarqueeApplet => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                self.formatting.insert_marker();
                Ok(Step::Done)
            }
            C::Table => {
                // "If the Document is not set to quirks mode, and the stack of
                //  open elements has a p element in button scope, then close a
                //  p element."
                if !self.quirks {
                    self.implicitly_close_p()?;
                }
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                self.switch_to(M::InTable);
                Ok(Step::Done)
            }
            C::Br | C::EmbedImg | C::AreaBasefontBgsoundSpacerWbr => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_void_tag(tag, Creation::MAY_FOSTER)
            }
            C::ParamSource => self.insert_void_tag(tag, Creation::MAY_FOSTER),
            C::Hr => {
                self.implicitly_close_p()?;
                self.insert_void_tag(tag, Creation::MAY_FOSTER)
            }
            C::Image => {
                // "Parse error. Change the token's tag name to "img" and
                //  reprocess it. (Don't ask.)"
                self.err("Saw a start tag \u{201C}image\u{201D}.");
                tag.element = ElementName::classify("img");
                Ok(Step::Reprocess)
            }
            C::Keygen | C::Input => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_void_tag(tag, Creation::MAY_FOSTER_FORM)
            }
            C::Isindex => self.start_tag_isindex(tag),
            C::Textarea => {
                self.insert_tag(tag, Creation::MAY_FOSTER_FORM)?;
                self.enter_text_mode(ContentModel::Rcdata, &tag.element.name);
                self.need_to_drop_lf = true;
                Ok(Step::Done)
            }
            C::Xmp => {
                self.implicitly_close_p()?;
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::Rawtext)
            }
            C::Noscript if !self.config.scripting_enabled => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::Noscript | C::Noframes | C::Iframe | C::Noembed => {
                self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::Rawtext)
            }
            C::Select => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER_FORM)?;
                // "If the insertion mode is one of "in table", "in caption",
                //  "in table body", "in row", or "in cell", then switch the
                //  insertion mode to "in select in table". Otherwise, switch
                //  the insertion mode to "in select"."
                if self.mode.is_table_context() {
                    self.switch_to(M::InSelectInTable);
                } else {
                    self.switch_to(M::InSelect);
                }
                Ok(Step::Done)
            }
            C::Optgroup | C::Option => {
                if self.stack.find_last_in_scope("option").is_some() {
                    self.close_open_option(&tag.element.name)?;
                }
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::RtRp => {
                // "If the stack of open elements has a ruby element in scope,
                //  then generate implied end tags. If the current node is not
                //  then a ruby element, this is a parse error."
                let ruby = self.stack.find_last_in_scope("ruby");
                if ruby.is_some() {
                    self.generate_implied_end_tags()?;
                }
                if ruby != Some(self.stack.current_index()) {
                    self.err("Unclosed children in \u{201C}ruby\u{201D}.");
                    if let Some(pos) = ruby {
                        self.pop_to_len(pos + 1)?;
                    }
                }
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
            C::Math => {
                self.reconstruct_the_active_formatting_elements()?;
                adjust_mathml_attributes(&mut tag.attributes);
                if tag.self_closing {
                    self.insert_void(Namespace::MathMl, &tag.element, &tag.attributes, Creation::MAY_FOSTER)?;
                    tag.self_closing = false;
                } else {
                    self.insert_element(Namespace::MathMl, &tag.element, &tag.attributes, Creation::MAY_FOSTER)?;
                    self.foreign = ForeignFlag::InForeign;
                }
                Ok(Step::Done)
            }
            C::Svg => {
                self.reconstruct_the_active_formatting_elements()?;
                adjust_svg_attributes(&mut tag.attributes);
                if tag.self_closing {
                    self.insert_void(Namespace::Svg, &tag.element, &tag.attributes, Creation::MAY_FOSTER_CAMEL)?;
                    tag.self_closing = false;
                } else {
                    self.insert_element(Namespace::Svg, &tag.element, &tag.attributes, Creation::MAY_FOSTER)?;
                    self.foreign = ForeignFlag::InForeign;
                }
                Ok(Step::Done)
            }
            C::Caption
            | C::Col
            | C::Colgroup
            | C::TbodyTheadTfoot
            | C::Tr
            | C::TdTh
            | C::Frame
            | C::Frameset
            | C::Head => {
                self.err(format!("Stray start tag \u{201C}{}\u{201D}.", tag.element.name));
                Ok(Step::Done)
            }
            C::OutputLabel => {
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER_FORM)?;
                Ok(Step::Done)
            }
            _ => {
                // "Any other start tag: Reconstruct the active formatting
                //  elements, if any. Insert an HTML element for the token."
                self.reconstruct_the_active_formatting_elements()?;
                self.insert_tag(tag, Creation::MAY_FOSTER)?;
                Ok(Step::Done)
            }
        }
    }

    /// The `li`/`dd`/`dt` loop: close the nearest open item of the same
    /// kind unless a scoping or special element other than `address`,
    /// `div` and `p` comes first.
    fn close_list_item(&mut self, category: C) -> Result<(), TreeBuilderError> {
        let mut pos = self.stack.current_index();
        loop {
            let node = self.entry_at(pos)?;
            if node.category == category {
                // "Generate implied end tags, except for li elements."
                self.generate_implied_end_tags_except_for(Some(node.name.as_str()))?;
                if pos != self.stack.current_index() {
                    self.err("Unclosed elements inside a list.");
                }
                return self.pop_to_len(pos);
            }
            if node.scoping || (node.special && !matches!(node.name.as_str(), "p" | "address" | "div")) {
                return Ok(());
            }
            if pos == 0 {
                return Ok(());
            }
            pos -= 1;
        }
    }

    /// "If the stack of open elements has an option element in scope, then
    /// act as if an end tag with the tag name "option" had been seen."
    fn close_open_option(&mut self, name: &str) -> Result<(), TreeBuilderError> {
        if self.is_current("option") {
            return self.pop();
        }
        let Some(pos) = self.stack.find_last("option") else {
            return Ok(());
        };
        self.generate_implied_end_tags()?;
        if !self.is_current("option") {
            self.err(format!(
                "End tag \u{201C}{name}\u{201D} seen but there were unclosed elements."
            ));
        }
        self.pop_to_len(pos)
    }

    /// `<isindex>` becomes a small search form: `form`, `hr`, a `label`
    /// holding the prompt and an `input name="isindex"`, then another `hr`.
    fn start_tag_isindex(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        self.err("\u{201C}isindex\u{201D} seen.");
        if self.form_pointer.is_some() {
            return Ok(Step::Done);
        }
        self.implicitly_close_p()?;

        let form_attributes: Vec<Attribute> = tag
            .attributes
            .iter()
            .filter(|a| a.name == "action")
            .cloned()
            .collect();
        self.insert_form(&form_attributes, false)?;
        self.insert_void_html("hr", &[], Creation::MAY_FOSTER)?;
        self.insert_html("label", &[], Creation::MAY_FOSTER)?;

        let prompt = tag.attribute("prompt").unwrap_or(ISINDEX_PROMPT).to_string();
        let label = self.current_entry()?;
        self.sink.append_characters(&label.node, &prompt);

        let mut input_attributes = vec![Attribute::new("name".to_string(), "isindex".to_string())];
        input_attributes.extend(
            tag.attributes
                .iter()
                .filter(|a| !matches!(a.name.as_str(), "name" | "prompt" | "action"))
                .cloned(),
        );
        self.insert_void_html("input", &input_attributes, Creation::MAY_FOSTER_FORM)?;
        self.pop()?; // label
        self.insert_void_html("hr", &[], Creation::MAY_FOSTER)?;
        self.pop()?; // form
        tag.self_closing = false;
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn start_tag_in_head(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Base | C::Command => self.insert_void_tag(tag, Creation::MAY_FOSTER),
            // Handled together with "in head noscript".
            C::Meta | C::Link => Ok(Step::FallThrough),
            C::Title => self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::Rcdata),
            C::Noscript => {
                if self.config.scripting_enabled {
                    self.insert_text_element(tag, Creation::CURRENT, ContentModel::Rawtext)
                } else {
                    self.insert_tag(tag, Creation::MAY_FOSTER)?;
                    self.switch_to(M::InHeadNoscript);
                    Ok(Step::Done)
                }
            }
            C::Script => self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::ScriptData),
            C::Style | C::Noframes => {
                self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::Rawtext)
            }
            C::Head => {
                self.err("Start tag for \u{201C}head\u{201D} seen when \u{201C}head\u{201D} was already open.");
                Ok(Step::Done)
            }
            _ => {
                // "Pop the current node (which will be the head element) off
                //  the stack of open elements. Switch the insertion mode to
                //  "after head". Reprocess the token."
                self.pop()?;
                self.switch_to(M::AfterHead);
                Ok(Step::Reprocess)
            }
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    fn start_tag_in_head_noscript(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Link => self.insert_void_tag(tag, Creation::MAY_FOSTER),
            C::Meta => {
                self.check_meta_charset(&tag.attributes);
                self.insert_void_tag(tag, Creation::MAY_FOSTER)
            }
            C::Style | C::Noframes => {
                self.insert_text_element(tag, Creation::CURRENT, ContentModel::Rawtext)
            }
            C::Head => {
                self.err("Start tag for \u{201C}head\u{201D} seen when \u{201C}head\u{201D} was already open.");
                Ok(Step::Done)
            }
            C::Noscript => {
                self.err("Start tag for \u{201C}noscript\u{201D} seen when \u{201C}noscript\u{201D} was already open.");
                Ok(Step::Done)
            }
            _ => {
                self.err(format!(
                    "Bad start tag in \u{201C}{}\u{201D} in \u{201C}head\u{201D}.",
                    tag.element.name
                ));
                self.pop()?;
                self.switch_to(M::InHead);
                Ok(Step::Reprocess)
            }
        }
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    fn start_tag_in_column_group(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Col => self.insert_void_tag(tag, Creation::MAY_FOSTER),
            _ => {
                if self.stack.current_index() == 0 {
                    self.err("Garbage in \u{201C}colgroup\u{201D} fragment.");
                    return Ok(Step::Done);
                }
                self.pop()?;
                self.switch_to(M::InTable);
                Ok(Step::Reprocess)
            }
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    fn start_tag_in_select_in_table(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Caption | C::TbodyTheadTfoot | C::Tr | C::TdTh | C::Table => {
                self.err(format!(
                    "\u{201C}{}\u{201D} start tag with \u{201C}select\u{201D} open.",
                    tag.element.name
                ));
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
    fn start_tag_in_select(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Option => {
                if self.is_current("option") {
                    self.pop()?;
                }
                self.insert_tag(tag, Creation::CURRENT)?;
                Ok(Step::Done)
            }
            C::Optgroup => {
                if self.is_current("option") {
                    self.pop()?;
                }
                if self.is_current("optgroup") {
                    self.pop()?;
                }
                self.insert_tag(tag, Creation::CURRENT)?;
                Ok(Step::Done)
            }
            C::Select => {
                self.err("\u{201C}select\u{201D} start tag where end tag expected.");
                match self.stack.find_last_in_table_scope("select") {
                    None => self.err("No \u{201C}select\u{201D} in table scope."),
                    Some(pos) => self.pop_to_and_reset(pos)?,
                }
                Ok(Step::Done)
            }
            C::Input | C::Textarea | C::Keygen => {
                self.err(format!(
                    "\u{201C}{}\u{201D} start tag seen in \u{201C}select\u{201D}.",
                    tag.element.name
                ));
                let Some(pos) = self.stack.find_last_in_table_scope("select") else {
                    return Ok(Step::Done);
                };
                self.pop_to_and_reset(pos)?;
                Ok(Step::Reprocess)
            }
            C::Script => self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::ScriptData),
            _ => Ok(self.stray_start_tag(tag)),
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn start_tag_after_body(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        if tag.element.category == C::Html {
            return self.stray_html_start_tag(tag);
        }
        self.err(format!("Stray \u{201C}{}\u{201D} start tag.", tag.element.name));
        self.switch_to(self.body_mode());
        Ok(Step::Reprocess)
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    fn start_tag_in_frameset(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Frameset => {
                self.insert_tag(tag, Creation::CURRENT)?;
                Ok(Step::Done)
            }
            C::Frame => self.insert_void_tag(tag, Creation::MAY_FOSTER),
            _ => Ok(Step::FallThrough),
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    fn start_tag_after_frameset(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Noframes => self.insert_text_element(tag, Creation::CURRENT, ContentModel::Rawtext),
            _ => Ok(self.stray_start_tag(tag)),
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn start_tag_before_html(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        if tag.element.category == C::Html {
            self.insert_html_root(&tag.attributes)?;
            self.switch_to(M::BeforeHead);
            return Ok(Step::Done);
        }
        // "Create an html element whose node document is the Document
        //  object. Append it to the Document object. Put this element in the
        //  stack of open elements. Switch the insertion mode to "before
        //  head", then reprocess the token."
        self.insert_html_root(&[])?;
        self.switch_to(M::BeforeHead);
        Ok(Step::Reprocess)
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn start_tag_before_head(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Head => {
                self.insert_head(&tag.attributes)?;
                self.switch_to(M::InHead);
                Ok(Step::Done)
            }
            _ => {
                self.insert_head(&[])?;
                self.switch_to(M::InHead);
                Ok(Step::Reprocess)
            }
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn start_tag_after_head(&mut self, tag: &mut TagToken) -> Result<Step, TreeBuilderError> {
        let name = tag.element.name.clone();
        match tag.element.category {
            C::Html => self.stray_html_start_tag(tag),
            C::Body => {
                self.insert_tag(tag, Creation::CURRENT)?;
                self.frameset_ok = false;
                self.switch_to(M::InBody);
                Ok(Step::Done)
            }
            C::Frameset => {
                self.insert_tag(tag, Creation::CURRENT)?;
                self.switch_to(M::InFrameset);
                Ok(Step::Done)
            }
            C::Base | C::Link | C::Meta => {
                // "Push the node pointed to by the head element pointer onto
                //  the stack of open elements. Process the token using the
                //  rules for the "in head" insertion mode. Remove the node
                //  pointed to by the head element pointer from the stack of
                //  open elements."
                self.err(format!(
                    "\u{201C}{name}\u{201D} element outside \u{201C}head\u{201D}."
                ));
                if tag.element.category == C::Meta {
                    self.check_meta_charset(&tag.attributes);
                }
                self.push_head_pointer()?;
                let _ = self.insert_void_tag(tag, Creation::MAY_FOSTER)?;
                self.pop()?; // head
                Ok(Step::Done)
            }
            C::Script => {
                self.err("\u{201C}script\u{201D} element between \u{201C}head\u{201D} and \u{201C}body\u{201D}.");
                self.push_head_pointer()?;
                self.insert_text_element(tag, Creation::CURRENT, ContentModel::ScriptData)
            }
            C::Style | C::Noframes => {
                self.err(format!(
                    "\u{201C}{name}\u{201D} element between \u{201C}head\u{201D} and \u{201C}body\u{201D}."
                ));
                self.push_head_pointer()?;
                self.insert_text_element(tag, Creation::CURRENT, ContentModel::Rawtext)
            }
            C::Title => {
                self.err("\u{201C}title\u{201D} element outside \u{201C}head\u{201D}.");
                self.push_head_pointer()?;
                self.insert_text_element(tag, Creation::CURRENT, ContentModel::Rcdata)
            }
            C::Head => {
                self.err("Stray start tag \u{201C}head\u{201D}.");
                Ok(Step::Done)
            }
            _ => {
                // "Insert an HTML element for a "body" start tag token with no
                //  attributes. Switch the insertion mode to "in body".
                //  Reprocess the current token."
                self.insert_html("body", &[], Creation::CURRENT)?;
                self.switch_to(M::FramesetOk);
                Ok(Step::Reprocess)
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn start_tag_after_after_body(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        if tag.element.category == C::Html {
            return self.stray_html_start_tag(tag);
        }
        self.err(format!("Stray \u{201C}{}\u{201D} start tag.", tag.element.name));
        self.fatal()?;
        self.switch_to(self.body_mode());
        Ok(Step::Reprocess)
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    fn start_tag_after_after_frameset(&mut self, tag: &TagToken) -> Result<Step, TreeBuilderError> {
        match tag.element.category {
            C::Noframes => self.insert_text_element(tag, Creation::MAY_FOSTER, ContentModel::Rawtext),
            _ => Ok(self.stray_start_tag(tag)),
        }
    }
}
