//! DOCTYPE, comment and character tokens.

use super::TreeBuilder;
use super::doctype::{DocumentMode, classify_doctype, is_html4_public_id, is_obsolete_permitted};
use super::insertion::{Creation, is_html_whitespace};
use super::modes::{ForeignFlag, InsertionMode};
use crate::config::DoctypeExpectation;
use crate::error::TreeBuilderError;
use crate::sink::{TokenizerDirective, TreeSink};

const HTML401_STRICT_PUBLIC_ID: &str = "-//W3C//DTD HTML 4.01//EN";
const HTML401_STRICT_SYSTEM_ID: &str = "http://www.w3.org/TR/html4/strict.dtd";
const HTML401_TRANSITIONAL_PUBLIC_ID: &str = "-//W3C//DTD HTML 4.01 Transitional//EN";
const HTML401_TRANSITIONAL_SYSTEM_ID: &str = "http://www.w3.org/TR/html4/loose.dtd";

const STRICT_EXPECTED: &str = "Expected \u{201C}<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">\u{201D}.";
const TRANSITIONAL_EXPECTED: &str = "Expected \u{201C}<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\" \"http://www.w3.org/TR/html4/loose.dtd\">\u{201D}.";
const MISSING_SYSTEM_ID: &str =
    "The doctype did not contain the system identifier prescribed by the HTML 4.01 specification.";

/// What a character handler wants done with the character it examined.
enum CharStep {
    /// Move on to the next character.
    Next,
    /// Look at the same character again in the new mode.
    Reprocess,
    /// Stop examining; the rest of the run is accumulated as is.
    Stop,
}

impl<S: TreeSink> TreeBuilder<S> {
    /// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    ///
    /// "A DOCTYPE token: If the DOCTYPE token's name is not "html", or the
    /// token's public identifier is not missing, or the token's system
    /// identifier is neither missing nor "about:legacy-compat", then there
    /// is a parse error."
    ///
    /// Outside the "initial" insertion mode a DOCTYPE is a parse error and
    /// is ignored.
    pub fn doctype(
        &mut self,
        name: Option<&str>,
        public_id: Option<&str>,
        system_id: Option<&str>,
        force_quirks: bool,
    ) -> Result<(), TreeBuilderError> {
        self.need_to_drop_lf = false;
        if self.foreign == ForeignFlag::NotInForeign && self.mode == InsertionMode::Initial {
            // "Append a DocumentType node to the Document node, with its name
            //  set to the name given in the DOCTYPE token, or the empty string
            //  if the name was missing"
            if self.config.reporting_doctype {
                self.sink.append_doctype_to_document(
                    name.unwrap_or_default(),
                    public_id.unwrap_or_default(),
                    system_id.unwrap_or_default(),
                );
            }

            let mode = classify_doctype(name, public_id, system_id, force_quirks);
            let html4 = match self.config.doctype_expectation {
                DoctypeExpectation::Html401Strict | DoctypeExpectation::Html401Transitional => true,
                DoctypeExpectation::Auto => is_html4_public_id(public_id),
                DoctypeExpectation::Html | DoctypeExpectation::NoDoctypeErrors => false,
            };
            if html4 {
                self.html4 = true;
                self.directives.push(TokenizerDirective::EnableHtml4Errors);
            }
            self.report_doctype(mode, public_id, system_id);
            self.set_document_mode(mode, public_id, system_id, html4);

            // "Then, switch the insertion mode to "before html"."
            self.switch_to(InsertionMode::BeforeHtml);
            return self.finish_token(Ok(()));
        }

        self.err("Stray doctype.");
        self.finish_token(Ok(()))
    }

    /// The doctype messages for the configured expectation.
    fn report_doctype(&mut self, mode: DocumentMode, public_id: Option<&str>, system_id: Option<&str>) {
        match self.config.doctype_expectation {
            DoctypeExpectation::Html => match mode {
                DocumentMode::Quirks => {
                    self.err("Quirky doctype. Expected \u{201C}<!DOCTYPE html>\u{201D}.");
                }
                DocumentMode::AlmostStandards => {
                    self.err("Almost standards mode doctype. Expected \u{201C}<!DOCTYPE html>\u{201D}.");
                }
                DocumentMode::Standards => {
                    if is_obsolete_permitted(public_id, system_id) {
                        self.warn("Obsolete doctype. Expected \u{201C}<!DOCTYPE html>\u{201D}.");
                    } else if !(public_id.is_none()
                        && system_id.is_none_or(|id| id == "about:legacy-compat"))
                    {
                        self.err("Legacy doctype. Expected \u{201C}<!DOCTYPE html>\u{201D}.");
                    }
                }
            },
            DoctypeExpectation::Html401Strict => match mode {
                DocumentMode::Quirks => self.err(format!("Quirky doctype. {STRICT_EXPECTED}")),
                DocumentMode::AlmostStandards => {
                    self.err(format!("Almost standards mode doctype. {STRICT_EXPECTED}"));
                }
                DocumentMode::Standards => {
                    if public_id == Some(HTML401_STRICT_PUBLIC_ID) {
                        if system_id != Some(HTML401_STRICT_SYSTEM_ID) {
                            self.warn(format!("{MISSING_SYSTEM_ID} {STRICT_EXPECTED}"));
                        }
                    } else {
                        self.err(format!(
                            "The doctype was not the HTML 4.01 Strict doctype. {STRICT_EXPECTED}"
                        ));
                    }
                }
            },
            DoctypeExpectation::Html401Transitional => match mode {
                DocumentMode::Quirks => self.err(format!("Quirky doctype. {TRANSITIONAL_EXPECTED}")),
                DocumentMode::AlmostStandards => {
                    if public_id == Some(HTML401_TRANSITIONAL_PUBLIC_ID) && system_id.is_some() {
                        if system_id != Some(HTML401_TRANSITIONAL_SYSTEM_ID) {
                            self.warn(format!("{MISSING_SYSTEM_ID} {TRANSITIONAL_EXPECTED}"));
                        }
                    } else {
                        self.err(format!(
                            "The doctype was not a non-quirky HTML 4.01 Transitional doctype. {TRANSITIONAL_EXPECTED}"
                        ));
                    }
                }
                DocumentMode::Standards => self.err(format!(
                    "The doctype was not the HTML 4.01 Transitional doctype. {TRANSITIONAL_EXPECTED}"
                )),
            },
            DoctypeExpectation::Auto => match mode {
                DocumentMode::Quirks => {
                    self.err("Quirky doctype. Expected e.g. \u{201C}<!DOCTYPE html>\u{201D}.");
                }
                DocumentMode::AlmostStandards => {
                    if public_id == Some(HTML401_TRANSITIONAL_PUBLIC_ID) {
                        if system_id != Some(HTML401_TRANSITIONAL_SYSTEM_ID) {
                            self.warn(format!("{MISSING_SYSTEM_ID} {TRANSITIONAL_EXPECTED}"));
                        }
                    } else {
                        self.err("Almost standards mode doctype. Expected e.g. \u{201C}<!DOCTYPE html>\u{201D}.");
                    }
                }
                DocumentMode::Standards => {
                    if public_id == Some(HTML401_STRICT_PUBLIC_ID) {
                        if system_id != Some(HTML401_STRICT_SYSTEM_ID) {
                            self.warn(format!("{MISSING_SYSTEM_ID} {STRICT_EXPECTED}"));
                        }
                    } else if public_id.is_some() || system_id.is_some() {
                        self.err("Legacy doctype. Expected e.g. \u{201C}<!DOCTYPE html>\u{201D}.");
                    }
                }
            },
            DoctypeExpectation::NoDoctypeErrors => {}
        }
    }

    /// Record the document mode and tell the sink.
    pub(super) fn set_document_mode(
        &mut self,
        mode: DocumentMode,
        public_id: Option<&str>,
        system_id: Option<&str>,
        html4: bool,
    ) {
        log::trace!(target: super::LOG_TARGET, "document mode {mode}");
        self.quirks = mode == DocumentMode::Quirks;
        self.sink.document_mode(mode, public_id, system_id, html4);
    }

    /// A token other than a DOCTYPE arrived in the "initial" insertion mode.
    ///
    /// "If the document is not an iframe srcdoc document, then this is a
    /// parse error; if the parser cannot change the mode flag is false, set
    /// the Document to quirks mode."
    pub(super) fn missing_doctype(&mut self, what: &str) {
        if let Some(expected) = self.config.doctype_expectation.expected_suffix() {
            self.err(format!("{what} without seeing a doctype first. {expected}"));
        }
        self.set_document_mode(DocumentMode::Quirks, None, None, false);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    pub fn comment(&mut self, data: &str) -> Result<(), TreeBuilderError> {
        let result = self.comment_inner(data);
        self.finish_token(result)
    }

    fn comment_inner(&mut self, data: &str) -> Result<(), TreeBuilderError> {
        self.need_to_drop_lf = false;
        if !self.config.wanting_comments {
            return Ok(());
        }
        if self.foreign == ForeignFlag::NotInForeign {
            match self.mode {
                // "Insert a comment as the last child of the Document object."
                InsertionMode::Initial
                | InsertionMode::BeforeHtml
                | InsertionMode::AfterAfterBody
                | InsertionMode::AfterAfterFrameset => {
                    self.sink.append_comment_to_document(data);
                    return Ok(());
                }
                // "Insert a comment as the last child of the first element in
                //  the stack of open elements (the html element)."
                InsertionMode::AfterBody => {
                    self.flush_characters();
                    let root = self.entry_at(0)?;
                    self.sink.append_comment(&root.node, data);
                    return Ok(());
                }
                _ => {}
            }
        }
        self.insert_comment(data)
    }

    /// A run of character tokens.
    ///
    /// Whitespace and other characters are treated differently by most
    /// modes, so the run is split at the points where a mode changes its
    /// mind. Characters that end up in the tree are buffered and handed to
    /// the sink in one piece on the next tree edit.
    pub fn characters(&mut self, text: &str) -> Result<(), TreeBuilderError> {
        let result = self.characters_inner(text);
        self.finish_token(result)
    }

    fn characters_inner(&mut self, mut text: &str) -> Result<(), TreeBuilderError> {
        // [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
        // "If the next token is a U+000A LINE FEED (LF) character token, then
        //  ignore that token and move on to the next one. (Newlines at the
        //  start of pre blocks are ignored as an authoring convenience.)"
        if self.need_to_drop_lf {
            if let Some(rest) = text.strip_prefix('\n') {
                text = rest;
                if text.is_empty() {
                    return Ok(());
                }
            }
            self.need_to_drop_lf = false;
        }
        if text.is_empty() {
            return Ok(());
        }

        match self.mode {
            InsertionMode::InBody | InsertionMode::InCell | InsertionMode::InCaption => {
                self.reconstruct_the_active_formatting_elements()?;
                self.pending_text.push_str(text);
                return Ok(());
            }
            InsertionMode::Text => {
                self.pending_text.push_str(text);
                return Ok(());
            }
            _ => {}
        }

        let mut start = 0;
        let mut i = 0;
        while let Some(c) = text.get(i..).and_then(|rest| rest.chars().next()) {
            let next = i + c.len_utf8();
            let step = if is_html_whitespace(c) {
                self.whitespace_character(text, &mut start, i, next)?
            } else {
                self.non_space_character(text, &mut start, i, next)?
            };
            match step {
                CharStep::Next => i = next,
                CharStep::Reprocess => {}
                CharStep::Stop => break,
            }
        }
        if let Some(rest) = text.get(start..)
            && !rest.is_empty()
        {
            self.pending_text.push_str(rest);
        }
        Ok(())
    }

    /// Buffer `text[*start..i]` and move `start` up to `i`.
    fn accumulate_prefix(&mut self, text: &str, start: &mut usize, i: usize) {
        if *start < i
            && let Some(prefix) = text.get(*start..i)
        {
            self.pending_text.push_str(prefix);
            *start = i;
        }
    }

    fn whitespace_character(
        &mut self,
        text: &str,
        start: &mut usize,
        i: usize,
        next: usize,
    ) -> Result<CharStep, TreeBuilderError> {
        match self.mode {
            // "Ignore the token."
            InsertionMode::Initial | InsertionMode::BeforeHtml | InsertionMode::BeforeHead => {
                *start = next;
                Ok(CharStep::Next)
            }
            // "Insert the character."
            InsertionMode::FramesetOk
            | InsertionMode::InHead
            | InsertionMode::InHeadNoscript
            | InsertionMode::AfterHead
            | InsertionMode::InColumnGroup
            | InsertionMode::InFrameset
            | InsertionMode::AfterFrameset => Ok(CharStep::Next),
            InsertionMode::InBody | InsertionMode::InCell | InsertionMode::InCaption => {
                self.accumulate_prefix(text, start, i);
                self.reconstruct_the_active_formatting_elements()?;
                Ok(CharStep::Stop)
            }
            InsertionMode::InSelect | InsertionMode::InSelectInTable | InsertionMode::Text => {
                Ok(CharStep::Stop)
            }
            InsertionMode::InTable | InsertionMode::InTableBody | InsertionMode::InRow => {
                self.reconstruct_the_active_formatting_elements()?;
                if let Some(c) = text.get(i..next) {
                    self.pending_text.push_str(c);
                }
                *start = next;
                Ok(CharStep::Next)
            }
            // "Process the token using the rules for the "in body" insertion
            //  mode."
            InsertionMode::AfterBody
            | InsertionMode::AfterAfterBody
            | InsertionMode::AfterAfterFrameset => {
                self.accumulate_prefix(text, start, i);
                self.reconstruct_the_active_formatting_elements()?;
                Ok(CharStep::Next)
            }
        }
    }

    fn non_space_character(
        &mut self,
        text: &str,
        start: &mut usize,
        i: usize,
        next: usize,
    ) -> Result<CharStep, TreeBuilderError> {
        match self.mode {
            InsertionMode::Initial => {
                self.missing_doctype("Non-space characters found");
                self.switch_to(InsertionMode::BeforeHtml);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::BeforeHtml => {
                self.insert_html_root(&[])?;
                self.switch_to(InsertionMode::BeforeHead);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::BeforeHead => {
                self.accumulate_prefix(text, start, i);
                self.insert_head(&[])?;
                self.switch_to(InsertionMode::InHead);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::InHead => {
                self.accumulate_prefix(text, start, i);
                self.pop()?;
                self.switch_to(InsertionMode::AfterHead);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::InHeadNoscript => {
                self.accumulate_prefix(text, start, i);
                self.err("Non-space character inside \u{201C}noscript\u{201D} inside \u{201C}head\u{201D}.");
                self.pop()?;
                self.switch_to(InsertionMode::InHead);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::AfterHead => {
                self.accumulate_prefix(text, start, i);
                self.insert_html("body", &[], Creation::CURRENT)?;
                self.switch_to(InsertionMode::FramesetOk);
                Ok(CharStep::Reprocess)
            }
            // "Set the frameset-ok flag to "not ok"."
            InsertionMode::FramesetOk => {
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InBody);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::InBody | InsertionMode::InCell | InsertionMode::InCaption => {
                self.accumulate_prefix(text, start, i);
                self.reconstruct_the_active_formatting_elements()?;
                Ok(CharStep::Stop)
            }
            // Foster parented when flushed.
            InsertionMode::InTable | InsertionMode::InTableBody | InsertionMode::InRow => {
                self.reconstruct_the_active_formatting_elements()?;
                if let Some(c) = text.get(i..next) {
                    self.pending_text.push_str(c);
                }
                *start = next;
                Ok(CharStep::Next)
            }
            InsertionMode::InColumnGroup => {
                self.accumulate_prefix(text, start, i);
                if self.stack.current_index() == 0 {
                    self.err("Non-space in \u{201C}colgroup\u{201D} when parsing fragment.");
                    *start = next;
                    return Ok(CharStep::Next);
                }
                self.pop()?;
                self.switch_to(InsertionMode::InTable);
                Ok(CharStep::Reprocess)
            }
            InsertionMode::InSelect | InsertionMode::InSelectInTable | InsertionMode::Text => {
                Ok(CharStep::Stop)
            }
            InsertionMode::AfterBody => {
                self.err("Non-space character after body.");
                self.fatal()?;
                self.switch_to(self.body_mode());
                Ok(CharStep::Reprocess)
            }
            InsertionMode::InFrameset => {
                self.accumulate_prefix(text, start, i);
                self.err("Non-space in \u{201C}frameset\u{201D}.");
                *start = next;
                Ok(CharStep::Next)
            }
            InsertionMode::AfterFrameset => {
                self.accumulate_prefix(text, start, i);
                self.err("Non-space after \u{201C}frameset\u{201D}.");
                *start = next;
                Ok(CharStep::Next)
            }
            InsertionMode::AfterAfterBody => {
                self.err("Non-space character in page trailer.");
                self.switch_to(self.body_mode());
                Ok(CharStep::Reprocess)
            }
            InsertionMode::AfterAfterFrameset => {
                self.err("Non-space character in page trailer.");
                self.switch_to(InsertionMode::InFrameset);
                Ok(CharStep::Reprocess)
            }
        }
    }
}
