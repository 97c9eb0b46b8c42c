//! The end-of-file token.

use koala_dom::Namespace;

use super::element::ElementCategory as C;
use super::insertion::Creation;
use super::modes::{ForeignFlag, InsertionMode as M};
use super::TreeBuilder;
use crate::error::TreeBuilderError;
use crate::sink::TreeSink;

const OPEN_ELEMENTS_AT_EOF: &str = "End of file seen and there were open elements.";

impl<S: TreeSink> TreeBuilder<S> {
    /// [§ 13.2.6.4 End-of-file token](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// Finish every implied element the current mode still owes the tree,
    /// report what was left open, then pop everything.
    pub fn eof(&mut self) -> Result<(), TreeBuilderError> {
        let result = self.eof_inner();
        self.finish_token(result)
    }

    fn eof_inner(&mut self) -> Result<(), TreeBuilderError> {
        self.flush_characters();

        if self.foreign == ForeignFlag::InForeign {
            self.err("End of file in a foreign namespace context.");
            while self
                .stack
                .current()
                .is_some_and(|entry| entry.ns != Namespace::Html)
            {
                self.pop_on_eof()?;
            }
            self.foreign = ForeignFlag::NotInForeign;
        }

        loop {
            match self.mode {
                M::Initial => {
                    // "Parse error. Set the Document to quirks mode."
                    self.missing_doctype("End of file seen");
                    self.switch_to(M::BeforeHtml);
                }
                M::BeforeHtml => {
                    self.insert_html_root(&[])?;
                    self.switch_to(M::BeforeHead);
                }
                M::BeforeHead => {
                    self.insert_head(&[])?;
                    self.switch_to(M::InHead);
                }
                M::InHead => {
                    if self.stack.current_index() > 1 {
                        self.err(OPEN_ELEMENTS_AT_EOF);
                    }
                    while self.stack.current_index() > 0 {
                        self.pop_on_eof()?;
                    }
                    self.switch_to(M::AfterHead);
                }
                M::InHeadNoscript => {
                    self.err(OPEN_ELEMENTS_AT_EOF);
                    while self.stack.current_index() > 1 {
                        self.pop_on_eof()?;
                    }
                    self.switch_to(M::InHead);
                }
                M::AfterHead => {
                    self.insert_html("body", &[], Creation::CURRENT)?;
                    self.switch_to(M::InBody);
                }
                M::InColumnGroup => {
                    if self.stack.current_index() == 0 {
                        // Fragment case: the context is a `colgroup`.
                        break;
                    }
                    self.pop_on_eof()?;
                    self.switch_to(M::InTable);
                }
                M::FramesetOk | M::InCaption | M::InCell | M::InBody => {
                    // "If there is a node in the stack of open elements that is
                    //  not either a dd element, a dt element, an li element, a
                    //  p element, a tbody element, a td element, a tfoot
                    //  element, a th element, a thead element, a tr element,
                    //  the body element, or the html element, then this is a
                    //  parse error."
                    let unclosed = self.stack.entries().iter().rev().any(|entry| {
                        !matches!(
                            entry.category,
                            C::DdDt | C::Li | C::P | C::TbodyTheadTfoot | C::TdTh | C::Body | C::Html
                        )
                    });
                    if unclosed {
                        self.err(OPEN_ELEMENTS_AT_EOF);
                    }
                    break;
                }
                M::Text => {
                    // [§ 13.2.6.4.8](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
                    // "Parse error. If the current node is a script element,
                    //  then set its already started to true. Pop the current
                    //  node off the stack of open elements."
                    self.err("End of file seen when expecting text or an end tag.");
                    if self.original_mode == M::AfterHead {
                        self.pop_on_eof()?;
                    }
                    self.pop_on_eof()?;
                    self.switch_to(self.original_mode);
                }
                M::InTableBody
                | M::InRow
                | M::InTable
                | M::InSelect
                | M::InSelectInTable
                | M::InFrameset => {
                    if self.stack.current_index() > 0 {
                        self.err(OPEN_ELEMENTS_AT_EOF);
                    }
                    break;
                }
                M::AfterBody | M::AfterFrameset | M::AfterAfterBody | M::AfterAfterFrameset => break,
            }
        }

        // "Stop parsing."
        while self.stack.len() > 1 {
            self.pop_on_eof()?;
        }
        if !self.is_fragment() && !self.stack.is_empty() {
            self.pop_on_eof()?;
        }
        Ok(())
    }
}
