//! Integration tests for the tree builder.

use koala_dom::Namespace;
use koala_html::{
    Attribute, ContentModel, DocumentMode, DomTreeSink, NamePolicy, ParseIssue, Token,
    TokenizerDirective, TreeBuilder, TreeBuilderConfig, TreeBuilderError, TreeSink,
    classify_doctype,
};

/// Helper to build a `<!DOCTYPE html>` token
fn doctype() -> Token {
    Token::Doctype {
        name: Some("html".to_string()),
        public_id: None,
        system_id: None,
        force_quirks: false,
    }
}

/// Helper to build a start tag with attributes
fn tag(name: &str, attrs: &[(&str, &str)]) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attributes: attrs
            .iter()
            .map(|(k, v)| Attribute::new((*k).to_string(), (*v).to_string()))
            .collect(),
        self_closing: false,
    }
}

/// Helper to build a self-closing start tag
fn void(name: &str) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attributes: Vec::new(),
        self_closing: true,
    }
}

fn start(name: &str) -> Token {
    Token::start_tag(name)
}

fn end(name: &str) -> Token {
    Token::end_tag(name)
}

fn text(data: &str) -> Token {
    Token::characters(data)
}

fn comment(data: &str) -> Token {
    Token::Comment {
        data: data.to_string(),
    }
}

/// Helper to run tokens and return the html5lib dump plus recorded issues
fn parse_with(config: TreeBuilderConfig, tokens: Vec<Token>) -> (String, Vec<ParseIssue>) {
    let mut builder = TreeBuilder::with_config(DomTreeSink::new(), config);
    builder.run(tokens).unwrap();
    let issues = builder.take_issues();
    (builder.sink().to_test_format(), issues)
}

fn parse(tokens: Vec<Token>) -> (String, Vec<ParseIssue>) {
    parse_with(TreeBuilderConfig::default(), tokens)
}

/// Helper to collect error messages only
fn errors(issues: &[ParseIssue]) -> Vec<&str> {
    issues
        .iter()
        .filter(|issue| issue.is_error)
        .map(|issue| issue.message.as_str())
        .collect()
}

/// Join dump lines, adding the trailing newline.
fn lines(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

// ========== Implied tags ==========

#[test]
fn test_paragraph_closes_previous_paragraph() {
    let (dump, _) = parse(vec![start("p"), text("1"), start("p"), text("2")]);
    assert_eq!(
        dump,
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"1\"",
            "|     <p>",
            "|       \"2\"",
        ])
    );
}

#[test]
fn test_missing_doctype_is_reported_once() {
    let (_, issues) = parse(vec![start("p")]);
    let errors = errors(&issues);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Start tag seen without seeing a doctype first."));
}

#[test]
fn test_late_title_goes_into_head() {
    let (dump, issues) = parse(vec![
        doctype(),
        start("head"),
        end("head"),
        start("title"),
        text("t"),
        end("title"),
    ]);
    assert_eq!(
        dump,
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <title>",
            "|       \"t\"",
            "|   <body>",
        ])
    );
    assert_eq!(errors(&issues).len(), 1);
}

#[test]
fn test_end_p_without_open_p_inserts_empty_paragraph() {
    let (dump, issues) = parse(vec![doctype(), start("body"), end("p")]);
    assert!(dump.ends_with("|   <body>\n|     <p>\n"));
    assert_eq!(
        errors(&issues),
        vec!["No \u{201C}p\u{201D} element in scope but a \u{201C}p\u{201D} end tag seen."]
    );
}

#[test]
fn test_end_br_becomes_br_element() {
    let (dump, issues) = parse(vec![doctype(), start("body"), end("br")]);
    assert!(dump.ends_with("|   <body>\n|     <br>\n"));
    assert_eq!(errors(&issues), vec!["End tag \u{201C}br\u{201D}."]);
}

#[test]
fn test_stray_end_tag_before_html() {
    let (dump, issues) = parse(vec![doctype(), end("div")]);
    assert_eq!(
        dump,
        lines(&["| <!DOCTYPE html>", "| <html>", "|   <head>", "|   <body>"])
    );
    assert_eq!(errors(&issues), vec!["Stray end tag \u{201C}div\u{201D}."]);
}

#[test]
fn test_unclosed_div_at_eof() {
    let (_, issues) = parse(vec![doctype(), start("div")]);
    assert_eq!(
        errors(&issues),
        vec!["End of file seen and there were open elements."]
    );
}

#[test]
fn test_leading_newline_in_textarea_is_dropped() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder
        .run(vec![doctype(), start("textarea"), text("\nabc"), end("textarea")])
        .unwrap();
    assert!(builder.sink().to_test_format().contains("|     <textarea>\n|       \"abc\"\n"));
    let directives = builder.drain_tokenizer_directives();
    assert_eq!(
        directives,
        vec![TokenizerDirective::SetContentModel {
            model: ContentModel::Rcdata,
            element: "textarea".to_string(),
        }]
    );
}

// ========== Tables ==========

#[test]
fn test_table_text_is_foster_parented() {
    let (dump, issues) = parse(vec![
        doctype(),
        start("table"),
        text("X"),
        start("tr"),
        start("td"),
        text("Y"),
        end("table"),
    ]);
    assert_eq!(
        dump,
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"X\"",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"Y\"",
        ])
    );
    assert_eq!(
        errors(&issues),
        vec!["Misplaced non-space characters inside a table."]
    );
}

#[test]
fn test_whitespace_in_table_stays_in_table() {
    let (dump, issues) = parse(vec![doctype(), start("table"), text("  "), end("table")]);
    assert!(dump.ends_with("|     <table>\n|       \"  \"\n"));
    assert!(errors(&issues).is_empty());
}

#[test]
fn test_foster_parented_element() {
    let (dump, _) = parse(vec![doctype(), start("table"), start("div"), end("div"), end("table")]);
    assert!(dump.ends_with("|   <body>\n|     <div>\n|     <table>\n"));
}

#[test]
fn test_cell_end_tag_closes_cell() {
    let (dump, issues) = parse(vec![
        doctype(),
        start("table"),
        start("td"),
        text("a"),
        end("td"),
        start("td"),
        text("b"),
    ]);
    assert!(dump.contains(
        "|         <tr>\n|           <td>\n|             \"a\"\n|           <td>\n|             \"b\"\n"
    ));
    // `<td>` directly in a table only implies the row group and row.
    assert!(errors(&issues).iter().all(|e| !e.contains("Stray")));
}

#[test]
fn test_caption_closed_by_table_end_tag() {
    let (dump, issues) = parse(vec![doctype(), start("table"), start("caption"), text("c"), end("table")]);
    assert!(dump.ends_with("|     <table>\n|       <caption>\n|         \"c\"\n"));
    assert_eq!(
        errors(&issues),
        vec!["\u{201C}table\u{201D} closed but \u{201C}caption\u{201D} was still open."]
    );
}

// ========== Adoption agency ==========

#[test]
fn test_misnested_formatting_elements() {
    let (dump, _) = parse(vec![start("b"), text("1"), start("i"), text("2"), end("b"), text("3")]);
    assert_eq!(
        dump,
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|       <i>",
            "|         \"2\"",
            "|     <i>",
            "|       \"3\"",
        ])
    );
}

#[test]
fn test_formatting_element_with_furthest_block() {
    let (dump, _) = parse(vec![start("a"), start("p"), text("X"), end("a"), text("Y")]);
    assert_eq!(
        dump,
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|     <p>",
            "|       <a>",
            "|         \"X\"",
            "|       \"Y\"",
        ])
    );
}

#[test]
fn test_adoption_runs_until_every_block_is_adopted() {
    let mut tokens = vec![doctype(), start("a")];
    tokens.extend((0..10).map(|_| start("div")));
    tokens.extend([text("x"), end("a"), text("y")]);
    let (dump, _) = parse(tokens);

    let mut expected = vec![
        "| <!DOCTYPE html>".to_string(),
        "| <html>".to_string(),
        "|   <head>".to_string(),
        "|   <body>".to_string(),
    ];
    // Each pass leaves an empty clone of <a> ahead of the next <div>.
    for depth in 2..12 {
        let pad = " ".repeat(1 + 2 * depth);
        expected.push(format!("|{pad}<a>"));
        expected.push(format!("|{pad}<div>"));
    }
    let pad = " ".repeat(25);
    expected.push(format!("|{pad}<a>"));
    expected.push(format!("|{pad}  \"x\""));
    expected.push(format!("|{pad}\"y\""));
    let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    assert_eq!(dump, lines(&expected));
}

#[test]
fn test_adoption_clone_keeps_formatting_element_slot() {
    let tokens = vec![
        start("b"),
        start("i"),
        start("div"),
        text("x"),
        end("b"),
    ];
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.start_tokenization().unwrap();
    for token in &tokens {
        builder.process_token(token).unwrap();
    }
    // The clone of <b> takes the original's slot ahead of <i> and is then
    // popped, leaving only the <i> clone.
    assert_eq!(builder.open_element_names(), vec!["html", "body", "i", "div"]);
    assert_eq!(builder.snapshot().active_formatting().len(), 1);

    for token in [text("y"), end("div"), text("z")] {
        builder.process_token(&token).unwrap();
    }
    builder.eof().unwrap();
    assert_eq!(
        builder.sink().to_test_format(),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       <i>",
            "|     <i>",
            "|       <div>",
            "|         <b>",
            "|           \"x\"",
            "|         \"y\"",
            "|       \"z\"",
        ])
    );
}

#[test]
fn test_adoption_with_interleaved_formatting_elements() {
    let (dump, issues) = parse(vec![
        start("a"),
        start("b"),
        start("div"),
        text("x"),
        end("a"),
        text("y"),
    ]);
    assert_eq!(
        dump,
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       <b>",
            "|     <b>",
            "|       <div>",
            "|         <a>",
            "|           \"x\"",
            "|         \"y\"",
        ])
    );
    assert!(errors(&issues).contains(&"End tag \u{201C}a\u{201D} violates nesting rules."));
}

#[test]
fn test_adoption_clones_every_formatting_element_between() {
    let (dump, _) = parse(vec![
        start("a"),
        start("b"),
        start("i"),
        start("u"),
        start("s"),
        start("div"),
        text("x"),
        end("a"),
        text("y"),
    ]);
    assert_eq!(
        dump,
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       <b>",
            "|         <i>",
            "|           <u>",
            "|             <s>",
            "|     <b>",
            "|       <i>",
            "|         <u>",
            "|           <s>",
            "|             <div>",
            "|               <a>",
            "|                 \"x\"",
            "|               \"y\"",
        ])
    );
}

#[test]
fn test_adoption_formatting_element_out_of_scope() {
    let (dump, issues) = parse(vec![
        start("b"),
        start("table"),
        end("b"),
        end("table"),
        text("z"),
    ]);
    // The table hides <b> from the end tag, so <b> stays open.
    assert_eq!(
        dump,
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       <table>",
            "|       \"z\"",
        ])
    );
    assert!(errors(&issues).contains(&"No element \u{201C}b\u{201D} to close."));
}

#[test]
fn test_adoption_formatting_element_not_open() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.start_tokenization().unwrap();
    for token in [start("p"), start("b"), end("p")] {
        builder.process_token(&token).unwrap();
    }
    assert_eq!(builder.snapshot().active_formatting().len(), 1);
    let _ = builder.take_issues();

    builder.process_token(&end("b")).unwrap();
    assert_eq!(builder.snapshot().active_formatting().len(), 0);
    assert_eq!(
        errors(&builder.take_issues()),
        vec!["No element \u{201C}b\u{201D} to close."]
    );

    // Nothing is left to reconstruct.
    builder.process_token(&text("z")).unwrap();
    builder.eof().unwrap();
    assert_eq!(
        builder.sink().to_test_format(),
        lines(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       <b>",
            "|     \"z\"",
        ])
    );
}

#[test]
fn test_adoption_without_furthest_block_pops_through_element() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.start_tokenization().unwrap();
    for token in [doctype(), start("b"), start("i"), text("x"), end("b")] {
        builder.process_token(&token).unwrap();
    }
    assert_eq!(builder.open_element_names(), vec!["html", "body"]);
    // <i> stays listed so later text reopens it.
    assert_eq!(builder.snapshot().active_formatting().len(), 1);
    assert_eq!(
        errors(&builder.take_issues()),
        vec!["End tag \u{201C}b\u{201D} violates nesting rules."]
    );
}

#[test]
fn test_adoption_foster_parents_furthest_block() {
    let (dump, issues) = parse(vec![
        doctype(),
        start("table"),
        start("a"),
        start("div"),
        text("x"),
        end("a"),
        end("table"),
    ]);
    // The common ancestor is the table, so the <div> moves in front of it.
    assert_eq!(
        dump,
        lines(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|     <div>",
            "|       <a>",
            "|         \"x\"",
            "|     <table>",
        ])
    );
    assert!(errors(&issues).contains(&"End tag \u{201C}a\u{201D} violates nesting rules."));
}

#[test]
fn test_unmatched_formatting_end_tag_is_stray() {
    let (_, issues) = parse(vec![doctype(), start("body"), end("b")]);
    assert_eq!(errors(&issues), vec!["No element \u{201C}b\u{201D} to close."]);
}

// ========== Foreign content ==========

#[test]
fn test_svg_attributes_and_self_closing() {
    let (dump, issues) = parse(vec![
        doctype(),
        tag("svg", &[("viewbox", "0 0 1 1")]),
        void("path"),
        end("svg"),
    ]);
    assert!(dump.ends_with(
        "|     <svg svg>\n|       viewBox=\"0 0 1 1\"\n|       <svg path>\n"
    ));
    assert!(errors(&issues).is_empty());
}

#[test]
fn test_xlink_attribute_dump() {
    let (dump, _) = parse(vec![doctype(), start("svg"), tag("a", &[("xlink:href", "#x")])]);
    assert!(dump.ends_with("|     <svg svg>\n|       <svg a>\n|         xlink href=\"#x\"\n"));
}

#[test]
fn test_html_tag_breaks_out_of_svg() {
    let (dump, issues) = parse(vec![doctype(), start("svg"), start("b"), text("x"), end("b")]);
    assert!(dump.ends_with("|     <svg svg>\n|     <b>\n|       \"x\"\n"));
    assert_eq!(
        errors(&issues),
        vec!["HTML start tag \u{201C}b\u{201D} in a foreign namespace context."]
    );
}

#[test]
fn test_mathml_text_integration_point() {
    let (dump, _) = parse(vec![doctype(), start("math"), start("mi"), text("x")]);
    assert!(dump.ends_with("|     <math math>\n|       <math mi>\n|         \"x\"\n"));
}

// ========== Select, frameset, comments ==========

#[test]
fn test_option_closes_option() {
    let (dump, _) = parse(vec![
        doctype(),
        start("select"),
        start("option"),
        text("a"),
        start("option"),
        text("b"),
        end("select"),
    ]);
    assert!(dump.ends_with(
        "|     <select>\n|       <option>\n|         \"a\"\n|       <option>\n|         \"b\"\n"
    ));
}

#[test]
fn test_frameset_document() {
    let (dump, issues) = parse(vec![doctype(), start("frameset"), end("frameset")]);
    assert_eq!(
        dump,
        lines(&["| <!DOCTYPE html>", "| <html>", "|   <head>", "|   <frameset>"])
    );
    assert!(errors(&issues).is_empty());
}

#[test]
fn test_comment_before_html_goes_to_document() {
    let (dump, _) = parse(vec![doctype(), comment("x")]);
    assert!(dump.starts_with("| <!DOCTYPE html>\n| <!-- x -->\n| <html>\n"));
}

#[test]
fn test_comments_can_be_dropped() {
    let (dump, _) = parse_with(
        TreeBuilderConfig::default().with_comments(false),
        vec![doctype(), comment("x")],
    );
    assert!(!dump.contains("<!--"));
}

// ========== Doctypes ==========

#[test]
fn test_html401_strict_without_system_id_is_quirks() {
    let public = Some("-//W3C//DTD HTML 4.01//EN");
    assert_eq!(
        classify_doctype(Some("html"), public, None, false),
        DocumentMode::Quirks
    );
    assert_eq!(
        classify_doctype(
            Some("html"),
            public,
            Some("http://www.w3.org/TR/html4/strict.dtd"),
            false
        ),
        DocumentMode::Standards
    );
}

#[test]
fn test_document_mode_reaches_sink() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.run(vec![doctype()]).unwrap();
    assert_eq!(builder.sink().document_mode(), Some(DocumentMode::Standards));
    assert!(!builder.is_quirks());

    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.run(vec![start("p")]).unwrap();
    assert_eq!(builder.sink().document_mode(), Some(DocumentMode::Quirks));
}

// ========== Attributes ==========

#[test]
fn test_duplicate_id_reports_first_occurrence() {
    let (_, issues) = parse(vec![
        doctype(),
        tag("div", &[("id", "a")]),
        tag("div", &[("id", "a")]),
    ]);
    assert!(errors(&issues).contains(&"Duplicate ID \u{201C}a\u{201D}."));
    let warning = issues.iter().find(|issue| !issue.is_error).unwrap();
    assert!(warning.message.contains("(token 1)"));
}

#[test]
fn test_meta_charset_requests_suspension() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder
        .run(vec![doctype(), tag("meta", &[("charset", "utf-8")])])
        .unwrap();
    assert_eq!(
        builder.drain_tokenizer_directives(),
        vec![
            TokenizerDirective::SetEncodingDeclaration("utf-8".to_string()),
            TokenizerDirective::RequestSuspension,
        ]
    );
}

#[test]
fn test_fatal_name_policy_aborts() {
    let config = TreeBuilderConfig::default().with_name_policy(NamePolicy::Fatal);
    let mut builder = TreeBuilder::with_config(DomTreeSink::new(), config);
    let result = builder.run(vec![doctype(), tag("div", &[("a:b", "1")])]);
    assert!(matches!(result, Err(TreeBuilderError::Fatal { .. })));
}

#[test]
fn test_alter_infoset_escapes_attribute_names() {
    let (dump, _) = parse_with(
        TreeBuilderConfig::default().with_name_policy(NamePolicy::AlterInfoset),
        vec![doctype(), tag("div", &[("1x", "v")])],
    );
    assert!(dump.contains("|       U000031x=\"v\"\n"));
}

// ========== Fragments and snapshots ==========

#[test]
fn test_fragment_in_div() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.set_fragment_context("div", Namespace::Html, None, false);
    builder.run(vec![start("p"), text("x")]).unwrap();
    assert_eq!(builder.sink().to_test_format(), "| <p>\n|   \"x\"\n");
}

#[test]
fn test_fragment_in_table_row() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.set_fragment_context("tr", Namespace::Html, None, false);
    builder.run(vec![start("td"), text("a")]).unwrap();
    assert_eq!(builder.sink().to_test_format(), "| <td>\n|   \"a\"\n");
    assert!(errors(builder.issues()).is_empty());
}

#[test]
fn test_fragment_context_sets_content_model() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.set_fragment_context("textarea", Namespace::Html, None, false);
    builder.start_tokenization().unwrap();
    assert_eq!(
        builder.drain_tokenizer_directives(),
        vec![TokenizerDirective::SetContentModel {
            model: ContentModel::Rcdata,
            element: "textarea".to_string(),
        }]
    );
}

#[test]
fn test_snapshot_round_trip() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.start_tokenization().unwrap();
    for token in [doctype(), start("b"), start("table")] {
        builder.process_token(&token).unwrap();
    }
    let snapshot = builder.snapshot();
    assert!(builder.snapshot_matches(&snapshot));
    assert_eq!(snapshot.stack().len(), 4);
    assert_eq!(snapshot.active_formatting().len(), 1);

    builder.process_token(&start("tr")).unwrap();
    assert!(!builder.snapshot_matches(&snapshot));

    builder.load_state(&snapshot);
    assert!(builder.snapshot_matches(&snapshot));
    assert_eq!(builder.open_element_names(), vec!["html", "body", "b", "table"]);
}

#[test]
fn test_snapshot_flushes_buffered_text() {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    builder.start_tokenization().unwrap();
    for token in [doctype(), start("p"), text("a")] {
        builder.process_token(&token).unwrap();
    }
    // Text waits in the buffer until the next tree edit.
    assert!(!builder.sink().to_test_format().contains("\"a\""));

    let snapshot = builder.snapshot();
    assert!(builder.sink().to_test_format().ends_with("|     <p>\n|       \"a\"\n"));
    assert!(builder.snapshot_matches(&snapshot));
}

// ========== Sink contract ==========

/// Records the calls the tree builder makes.
#[derive(Default)]
struct RecordingSink {
    names: Vec<String>,
    log: Vec<String>,
}

impl RecordingSink {
    fn alloc(&mut self, name: &str) -> usize {
        self.names.push(name.to_string());
        self.names.len() - 1
    }
}

impl TreeSink for RecordingSink {
    type Handle = usize;

    fn create_element(&mut self, _ns: Namespace, name: &str, _attrs: &[Attribute]) -> usize {
        self.alloc(name)
    }

    fn create_html_element_set_as_root(&mut self, _attrs: &[Attribute]) -> usize {
        self.log.push("root".to_string());
        self.alloc("html")
    }

    fn detach_from_parent(&mut self, node: &usize) {
        self.log.push(format!("detach {}", self.names[*node]));
    }

    fn append_element(&mut self, child: &usize, parent: &usize) {
        self.log
            .push(format!("append {} to {}", self.names[*child], self.names[*parent]));
    }

    fn append_children_to_new_parent(&mut self, old_parent: &usize, new_parent: &usize) {
        self.log.push(format!(
            "reparent {} to {}",
            self.names[*old_parent], self.names[*new_parent]
        ));
    }

    fn insert_foster_parented_child(&mut self, child: &usize, table: &usize, _stack_parent: &usize) {
        self.log
            .push(format!("foster {} before {}", self.names[*child], self.names[*table]));
    }

    fn insert_foster_parented_characters(&mut self, text: &str, table: &usize, _stack_parent: &usize) {
        self.log
            .push(format!("foster {text:?} before {}", self.names[*table]));
    }

    fn append_characters(&mut self, parent: &usize, text: &str) {
        self.log.push(format!("text {text:?} to {}", self.names[*parent]));
    }

    fn append_comment(&mut self, parent: &usize, text: &str) {
        self.log.push(format!("comment {text:?} to {}", self.names[*parent]));
    }

    fn append_comment_to_document(&mut self, text: &str) {
        self.log.push(format!("comment {text:?} to document"));
    }

    fn append_doctype_to_document(&mut self, name: &str, _public_id: &str, _system_id: &str) {
        self.log.push(format!("doctype {name}"));
    }

    fn add_attributes_to_element(&mut self, node: &usize, attrs: &[Attribute]) {
        self.log
            .push(format!("add {} attributes to {}", attrs.len(), self.names[*node]));
    }

    fn element_pushed(&mut self, _ns: Namespace, name: &str, _node: &usize) {
        self.log.push(format!("push {name}"));
    }

    fn element_popped(&mut self, _ns: Namespace, name: &str, _node: &usize) {
        self.log.push(format!("pop {name}"));
    }
}

#[test]
fn test_sink_sees_camel_cased_svg_names() {
    let mut builder = TreeBuilder::new(RecordingSink::default());
    builder
        .run(vec![doctype(), start("svg"), start("foreignobject"), end("foreignobject")])
        .unwrap();
    let log = &builder.sink().log;
    assert!(log.contains(&"push foreignObject".to_string()));
    assert!(log.contains(&"pop foreignObject".to_string()));
}

#[test]
fn test_sink_call_order_for_simple_document() {
    let mut builder = TreeBuilder::new(RecordingSink::default());
    builder.run(vec![doctype(), start("p"), text("hi")]).unwrap();
    assert_eq!(
        builder.sink().log,
        vec![
            "doctype html",
            "root",
            "push html",
            "append head to html",
            "push head",
            "pop head",
            "append body to html",
            "push body",
            "append p to body",
            "push p",
            "text \"hi\" to p",
            "pop p",
            "pop body",
            "pop html",
        ]
    );
}

#[test]
fn test_stray_body_attributes_are_merged() {
    let mut builder = TreeBuilder::new(RecordingSink::default());
    builder
        .run(vec![doctype(), start("body"), tag("body", &[("class", "x")])])
        .unwrap();
    assert!(builder
        .sink()
        .log
        .contains(&"add 1 attributes to body".to_string()));
}
