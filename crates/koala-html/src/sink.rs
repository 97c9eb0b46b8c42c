//! Interfaces between the tree builder and its collaborators.
//!
//! The tree builder never touches nodes itself. It decides which edits to
//! make and hands them to a [`TreeSink`], and it asks the tokenizer to
//! change state through [`TokenizerDirective`]s.

use std::fmt;

use koala_dom::Namespace;
use strum_macros::Display;

use crate::token::Attribute;
use crate::tree_builder::DocumentMode;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state a tag's content is lexed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContentModel {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    Rcdata,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    Rawtext,
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ScriptData,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    Plaintext,
}

/// A request from the tree builder to the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerDirective {
    /// Lex what follows in `model`; `element` is the tag whose end tag
    /// leaves it (the "appropriate end tag").
    SetContentModel {
        /// The new tokenizer state.
        model: ContentModel,
        /// Local name of the element that switched the state.
        element: String,
    },
    /// Stop feeding tokens so the caller can restart decoding.
    RequestSuspension,
    /// A `<meta>` declared this character encoding.
    SetEncodingDeclaration(String),
    /// The doctype asks for the additional HTML 4 error checks.
    EnableHtml4Errors,
}

/// Something that can act on [`TokenizerDirective`]s.
pub trait TokenizerControl {
    /// Switch the lexing state.
    fn set_content_model(&mut self, model: ContentModel, element: &str);

    /// Pause tokenization after the current token.
    fn request_suspension(&mut self);

    /// Record an internal character encoding declaration.
    fn set_encoding_declaration(&mut self, charset: &str);

    /// Turn on HTML 4-only errors. Ignored by default.
    fn enable_html4_errors(&mut self) {}
}

/// Apply directives, in order, to a tokenizer.
pub fn forward_directives<C: TokenizerControl + ?Sized>(
    directives: impl IntoIterator<Item = TokenizerDirective>,
    tokenizer: &mut C,
) {
    for directive in directives {
        match directive {
            TokenizerDirective::SetContentModel { model, element } => {
                tokenizer.set_content_model(model, &element);
            }
            TokenizerDirective::RequestSuspension => tokenizer.request_suspension(),
            TokenizerDirective::SetEncodingDeclaration(charset) => {
                tokenizer.set_encoding_declaration(&charset);
            }
            TokenizerDirective::EnableHtml4Errors => tokenizer.enable_html4_errors(),
        }
    }
}

/// The tree edits the tree builder needs.
///
/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Implementations own the nodes; the builder holds [`TreeSink::Handle`]s
/// and compares them with `==`. Element names arrive already case-adjusted
/// (`foreignObject`, not `foreignobject`) and attribute names already
/// adjusted for SVG and MathML.
pub trait TreeSink {
    /// An opaque reference to a node owned by the sink.
    type Handle: Clone + PartialEq + fmt::Debug;

    /// Called from `start_tokenization`.
    fn start(&mut self, _fragment: bool) {}

    /// Called from `end_tokenization`.
    fn end(&mut self) {}

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    fn create_element(&mut self, ns: Namespace, name: &str, attrs: &[Attribute]) -> Self::Handle;

    /// Create a form-associated element. `form` is the element pointed to
    /// by the form element pointer, if any.
    fn create_element_with_form(
        &mut self,
        ns: Namespace,
        name: &str,
        attrs: &[Attribute],
        _form: Option<&Self::Handle>,
    ) -> Self::Handle {
        self.create_element(ns, name, attrs)
    }

    /// Create the `html` element and make it the document element.
    fn create_html_element_set_as_root(&mut self, attrs: &[Attribute]) -> Self::Handle;

    /// Remove `node` from its parent, if it has one.
    fn detach_from_parent(&mut self, node: &Self::Handle);

    /// Append `child` as the last child of `parent`.
    fn append_element(&mut self, child: &Self::Handle, parent: &Self::Handle);

    /// Move all children of `old_parent` to the end of `new_parent`.
    fn append_children_to_new_parent(&mut self, old_parent: &Self::Handle, new_parent: &Self::Handle);

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// "If the foster parent element is the parent element of the last table
    /// element in the stack of open elements, then the new node must be
    /// inserted into the foster parent element, immediately before the last
    /// table element". `stack_parent` is the element below the table on
    /// the stack, used when `table` has no parent.
    fn insert_foster_parented_child(
        &mut self,
        child: &Self::Handle,
        table: &Self::Handle,
        stack_parent: &Self::Handle,
    );

    /// Foster-parent a run of characters. See
    /// [`TreeSink::insert_foster_parented_child`].
    fn insert_foster_parented_characters(
        &mut self,
        text: &str,
        table: &Self::Handle,
        stack_parent: &Self::Handle,
    );

    /// Append text to `parent`.
    fn append_characters(&mut self, parent: &Self::Handle, text: &str);

    /// Append a comment to `parent`.
    fn append_comment(&mut self, parent: &Self::Handle, text: &str);

    /// Append a comment to the document node.
    fn append_comment_to_document(&mut self, text: &str);

    /// Append a doctype node to the document. Missing identifiers arrive as
    /// empty strings.
    fn append_doctype_to_document(&mut self, name: &str, public_id: &str, system_id: &str);

    /// "For each attribute on the token, check to see if the attribute is
    /// already present on the top element of the stack of open elements. If
    /// it is not, add the attribute and its corresponding value to that
    /// element."
    fn add_attributes_to_element(&mut self, node: &Self::Handle, attrs: &[Attribute]);

    /// A script element was popped at end of file.
    fn mark_malformed_if_script(&mut self, _node: &Self::Handle) {}

    /// An element became the current node.
    fn element_pushed(&mut self, _ns: Namespace, _name: &str, _node: &Self::Handle) {}

    /// An element was removed from the stack of open elements.
    fn element_popped(&mut self, _ns: Namespace, _name: &str, _node: &Self::Handle) {}

    /// The document mode was decided. Called at most once per parse.
    fn document_mode(
        &mut self,
        _mode: DocumentMode,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
        _html4_checks: bool,
    ) {
    }
}
