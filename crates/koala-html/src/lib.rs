//! HTML5 tree construction for the Koala project.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All insertion modes, including tables, select, framesets and the
//!     "after after" modes
//!   - Foster parenting and the adoption agency algorithm
//!   - Foreign content (SVG and MathML) with attribute and tag case
//!     adjustment
//!   - Fragment parsing and state snapshots for speculative parsing
//!
//! - **Doctype classification** ([WHATWG § 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode))
//!   - Quirks, limited-quirks and no-quirks detection
//!
//! - **A DOM sink** building a [`koala_dom::DomTree`], with an html5lib
//!   test-format dump
//!
//! # Not Implemented
//!
//! - Tokenization: tokens come from the caller, see [`Token`]
//! - Script execution and `<template>`

/// Tree builder options.
pub mod config;
/// A tree sink backed by `koala_dom`.
pub mod dom_sink;
/// Fatal errors and recorded parse issues.
pub mod error;
/// SVG and MathML attribute adjustments.
pub mod foreign_content;
/// Collaborator interfaces: the tree sink and tokenizer directives.
pub mod sink;
/// Tokens consumed by the tree builder.
pub mod token;
/// The tree construction state machine.
pub mod tree_builder;

pub use config::{DoctypeExpectation, NamePolicy, TreeBuilderConfig};
pub use dom_sink::{DomTreeSink, print_tree};
pub use error::{ParseIssue, TreeBuilderError};
pub use sink::{ContentModel, TokenizerControl, TokenizerDirective, TreeSink, forward_directives};
pub use token::{Attribute, Token};
pub use tree_builder::{
    DocumentMode, ElementCategory, ElementName, ForeignFlag, InsertionMode, TreeBuilder,
    TreeBuilderSnapshot, classify_doctype, extract_charset_from_content,
};
