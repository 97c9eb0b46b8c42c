//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! "The input to the tree construction stage is a sequence of tokens from
//! the tokenization stage."
//!
//! [`TreeBuilder`] owns the parser state (insertion mode, stack of open
//! elements, list of active formatting elements, element pointers and
//! flags) and turns each token into edits on a [`TreeSink`]. It never looks
//! inside a node.
//!
//! The per-token handlers live in submodules:
//!
//! | Module | Tokens |
//! |---|---|
//! | `text` | doctype, comment, character runs |
//! | `start_tag` | start tags, including the foreign content switch |
//! | `end_tag` | end tags |
//! | `eof` | end of file |
//!
//! and the shared algorithms in `insertion`, `helpers`, `adoption` and
//! `snapshot`.

mod adoption;
mod attributes;
pub mod doctype;
pub mod element;
mod end_tag;
mod eof;
pub mod formatting;
mod helpers;
mod insertion;
pub mod modes;
mod snapshot;
pub mod stack;
mod start_tag;
mod text;

use std::collections::HashMap;
use std::rc::Rc;

use koala_common::warning::warn_once;
use koala_dom::Namespace;

pub use attributes::extract_charset_from_content;
pub use doctype::{DocumentMode, classify_doctype, is_html4_public_id};
pub use element::{ElementCategory, ElementName};
pub use formatting::{ActiveFormattingList, FormattingSlot};
pub use modes::{ForeignFlag, InsertionMode};
pub use snapshot::TreeBuilderSnapshot;
pub use stack::{OpenElementStack, StackEntry};

use crate::config::{NamePolicy, TreeBuilderConfig};
use crate::error::{ParseIssue, TreeBuilderError};
use crate::sink::{ContentModel, TokenizerDirective, TreeSink};
use crate::token::Token;

const LOG_TARGET: &str = "html5.treebuilder";

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "the context element" of the [fragment parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments).
#[derive(Debug, Clone)]
struct FragmentContext<T> {
    name: String,
    ns: Namespace,
    node: Option<T>,
}

/// The tree construction stage of an HTML parser.
///
/// Feed it tokens in document order, bracketed by
/// [`TreeBuilder::start_tokenization`] and [`TreeBuilder::end_tokenization`],
/// or hand a whole stream to [`TreeBuilder::run`].
///
/// ```
/// use koala_html::{DomTreeSink, Token, TreeBuilder};
///
/// let mut builder = TreeBuilder::new(DomTreeSink::new());
/// builder
///     .run(vec![Token::start_tag("p"), Token::characters("hi")])
///     .unwrap();
/// let sink = builder.into_sink();
/// assert!(sink.to_test_format().contains("\"hi\""));
/// ```
pub struct TreeBuilder<S: TreeSink> {
    sink: S,
    config: TreeBuilderConfig,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// "the original insertion mode", used by the "text" insertion mode.
    original_mode: InsertionMode,

    foreign: ForeignFlag,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    /// "The frameset-ok flag is set to "ok" when the parser is created."
    frameset_ok: bool,

    /// A newline right after `<pre>`, `<listing>` or `<textarea>` is dropped.
    need_to_drop_lf: bool,

    quirks: bool,

    /// HTML 4 doctype seen; changes the `xmlns` message.
    html4: bool,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack: OpenElementStack<S::Handle>,

    /// [§ 13.2.4.4 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    formatting: ActiveFormattingList<S::Handle>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    form_pointer: Option<S::Handle>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head_pointer: Option<S::Handle>,

    context: Option<FragmentContext<S::Handle>>,

    /// Characters not yet handed to the sink. Flushed before every other
    /// tree edit so text lands in document order.
    pending_text: String,

    /// First token index at which each `id` value was seen.
    id_locations: HashMap<String, usize>,

    issues: Vec<ParseIssue>,
    directives: Vec<TokenizerDirective>,
    token_index: usize,
}

impl<S: TreeSink> TreeBuilder<S> {
    /// A tree builder with the default configuration.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, TreeBuilderConfig::default())
    }

    /// A tree builder with an explicit configuration.
    pub fn with_config(sink: S, config: TreeBuilderConfig) -> Self {
        Self {
            sink,
            config,
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::Initial,
            foreign: ForeignFlag::NotInForeign,
            frameset_ok: true,
            need_to_drop_lf: false,
            quirks: false,
            html4: false,
            stack: OpenElementStack::default(),
            formatting: ActiveFormattingList::default(),
            form_pointer: None,
            head_pointer: None,
            context: None,
            pending_text: String::new(),
            id_locations: HashMap::new(),
            issues: Vec::new(),
            directives: Vec::new(),
            token_index: 0,
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &TreeBuilderConfig {
        &self.config
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Parse as the children of a `name` element in `ns`. `node` is the
    /// context element when the caller has one; otherwise a fresh `html`
    /// root is created. Takes effect at the next
    /// [`TreeBuilder::start_tokenization`].
    pub fn set_fragment_context(
        &mut self,
        name: &str,
        ns: Namespace,
        node: Option<S::Handle>,
        quirks: bool,
    ) {
        self.context = Some(FragmentContext {
            name: name.to_string(),
            ns,
            node,
        });
        self.quirks = quirks;
    }

    /// Whether a fragment context is set.
    pub const fn is_fragment(&self) -> bool {
        self.context.is_some()
    }

    /// Reset the parser state and announce the start of a parse to the sink.
    pub fn start_tokenization(&mut self) -> Result<(), TreeBuilderError> {
        self.need_to_drop_lf = false;
        self.original_mode = InsertionMode::Initial;
        self.frameset_ok = true;
        self.stack.clear();
        self.formatting.clear();
        self.form_pointer = None;
        self.head_pointer = None;
        self.html4 = false;
        self.id_locations.clear();
        self.pending_text.clear();
        self.token_index = 0;
        self.sink.start(self.context.is_some());

        let Some(context) = self.context.clone() else {
            self.mode = InsertionMode::Initial;
            self.foreign = ForeignFlag::NotInForeign;
            self.quirks = false;
            return Ok(());
        };

        // "Let root be a new html element with no attributes."
        let root = match context.node {
            Some(node) => node,
            None => self.sink.create_html_element_set_as_root(&[]),
        };
        let html = ElementName::classify("html");
        self.stack.push(Rc::new(StackEntry::html(&html, root)));

        // "Reset the parser's insertion mode appropriately."
        self.reset_the_insertion_mode();

        // "Set the state of the HTML parser's tokenization stage as follows,
        //  switching on the context element"
        let model = if context.ns != Namespace::Html {
            ContentModel::Data
        } else {
            match context.name.as_str() {
                "title" | "textarea" => ContentModel::Rcdata,
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => ContentModel::Rawtext,
                "noscript" if self.config.scripting_enabled => ContentModel::Rawtext,
                "plaintext" => ContentModel::Plaintext,
                "script" => ContentModel::ScriptData,
                _ => ContentModel::Data,
            }
        };
        self.directives.push(TokenizerDirective::SetContentModel {
            model,
            element: context.name,
        });
        Ok(())
    }

    /// Drop all per-parse state and tell the sink the parse is over.
    pub fn end_tokenization(&mut self) {
        self.form_pointer = None;
        self.head_pointer = None;
        self.stack.clear();
        self.formatting.clear();
        self.id_locations.clear();
        self.pending_text.clear();
        self.sink.end();
    }

    /// Dispatch one token to the matching entry point.
    ///
    /// Tag names are ASCII-lowercased first.
    pub fn process_token(&mut self, token: &Token) -> Result<(), TreeBuilderError> {
        match token {
            Token::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => self.doctype(
                name.as_deref(),
                public_id.as_deref(),
                system_id.as_deref(),
                *force_quirks,
            ),
            Token::Comment { data } => self.comment(data),
            Token::Characters { data } => self.characters(data),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.start_tag(name, attributes, *self_closing),
            Token::EndTag { name } => self.end_tag(name),
            Token::EndOfFile => self.eof(),
        }
    }

    /// Run a whole token stream: start, every token, end of file (added
    /// when the stream lacks one), end.
    pub fn run(&mut self, tokens: impl IntoIterator<Item = Token>) -> Result<(), TreeBuilderError> {
        self.start_tokenization()?;
        let mut saw_eof = false;
        for token in tokens {
            if saw_eof {
                break;
            }
            saw_eof = token.is_eof();
            self.process_token(&token)?;
        }
        if !saw_eof {
            self.eof()?;
        }
        self.end_tokenization();
        Ok(())
    }

    /// The sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give up the builder and keep the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Parse errors and warnings recorded so far.
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Take the recorded issues, leaving none behind.
    pub fn take_issues(&mut self) -> Vec<ParseIssue> {
        std::mem::take(&mut self.issues)
    }

    /// Take the tokenizer directives queued since the last call, oldest first.
    pub fn drain_tokenizer_directives(&mut self) -> Vec<TokenizerDirective> {
        std::mem::take(&mut self.directives)
    }

    /// The current insertion mode.
    pub const fn mode(&self) -> InsertionMode {
        self.mode
    }

    /// Whether the current node is in foreign content.
    pub const fn foreign_flag(&self) -> ForeignFlag {
        self.foreign
    }

    /// Whether the document is in quirks mode.
    pub const fn is_quirks(&self) -> bool {
        self.quirks
    }

    /// Local names of the open elements, root first.
    pub fn open_element_names(&self) -> Vec<String> {
        self.stack
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Local names in the list of active formatting elements; `None` is a
    /// marker.
    pub fn active_formatting_names(&self) -> Vec<Option<String>> {
        self.formatting
            .slots()
            .iter()
            .map(|slot| slot.as_ref().map(|entry| entry.name.clone()))
            .collect()
    }

    /// Record a parse error.
    fn err(&mut self, message: impl Into<String>) {
        if !self.config.report_errors {
            return;
        }
        let message = message.into();
        log::debug!(target: LOG_TARGET, "parse error at token {}: {message}", self.token_index);
        self.issues.push(ParseIssue {
            message,
            token_index: self.token_index,
            is_error: true,
        });
    }

    /// Record a warning.
    fn warn(&mut self, message: impl Into<String>) {
        if !self.config.report_errors {
            return;
        }
        let message = message.into();
        let _ = warn_once("HTML Parser", &message);
        self.issues.push(ParseIssue {
            message,
            token_index: self.token_index,
            is_error: false,
        });
    }

    /// A tree edit that an XML 1.0 infoset cannot express happened.
    /// Only aborts under [`NamePolicy::Fatal`].
    fn fatal(&mut self) -> Result<(), TreeBuilderError> {
        if self.config.name_policy == NamePolicy::Fatal {
            return Err(self.fatal_with(
                "The document tree cannot be represented as an XML 1.0 infoset.".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the error that aborts the parse, recording it as well.
    fn fatal_with(&mut self, message: String) -> TreeBuilderError {
        log::error!(target: LOG_TARGET, "fatal at token {}: {message}", self.token_index);
        self.issues.push(ParseIssue {
            message: message.clone(),
            token_index: self.token_index,
            is_error: true,
        });
        TreeBuilderError::Fatal {
            message,
            token_index: self.token_index,
        }
    }

    /// Close out the token being processed.
    fn finish_token<R>(&mut self, result: R) -> R {
        self.token_index += 1;
        result
    }

    fn switch_to(&mut self, mode: InsertionMode) {
        if self.mode != mode {
            log::trace!(target: LOG_TARGET, "mode {} -> {mode}", self.mode);
        }
        self.mode = mode;
    }

    /// "in body", or its frameset-ok variant while the flag is still "ok".
    const fn body_mode(&self) -> InsertionMode {
        if self.frameset_ok {
            InsertionMode::FramesetOk
        } else {
            InsertionMode::InBody
        }
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// "Let the original insertion mode be the current insertion mode.
    /// Then, switch the insertion mode to "text"."
    fn enter_text_mode(&mut self, model: ContentModel, element: &str) {
        self.original_mode = self.mode;
        self.switch_to(InsertionMode::Text);
        self.directives.push(TokenizerDirective::SetContentModel {
            model,
            element: element.to_string(),
        });
    }
}
