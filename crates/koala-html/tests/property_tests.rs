//! Property tests over random token streams.

use std::collections::HashSet;
use std::rc::Rc;

use koala_dom::{DomTree, NodeId};
use koala_html::tree_builder::{ActiveFormattingList, OpenElementStack, StackEntry};
use koala_html::{Attribute, DomTreeSink, ElementName, Token, TreeBuilder};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// Tag names that exercise every insertion mode and the foreign content rules.
const NAMES: &[&str] = &[
    "html", "head", "body", "p", "div", "b", "i", "a", "nobr", "font", "table", "caption",
    "colgroup", "col", "tbody", "tr", "td", "th", "select", "option", "optgroup", "ul", "li",
    "dd", "dt", "h1", "h2", "form", "button", "object", "marquee", "svg", "math", "mi",
    "annotation-xml", "foreignobject", "desc", "mglyph", "title", "frameset", "frame", "br",
    "hr", "img", "image", "input", "isindex", "textarea", "pre", "script", "style",
    "noscript", "noframes", "xmp", "iframe", "plaintext", "ruby", "rt", "meta", "base",
    "custom-tag",
];

const TEXT: &[&str] = &[" ", "x", "\n", "a b", "\t\n "];

const ATTRIBUTES: &[(&str, &str)] = &[
    ("id", "one"),
    ("type", "hidden"),
    ("encoding", "text/html"),
    ("color", "red"),
    ("viewbox", "0 0 1 1"),
    ("xlink:href", "#x"),
    ("charset", "utf-8"),
];

/// A token stream with no end-of-file token; [`TreeBuilder::run`] adds it.
#[derive(Debug, Clone)]
struct TokenStream(Vec<Token>);

fn pick<T: Copy>(g: &mut Gen, items: &[T]) -> T {
    *g.choose(items).unwrap_or(&items[0])
}

fn arbitrary_token(g: &mut Gen) -> Token {
    match u8::arbitrary(g) % 8 {
        0 | 1 | 2 => {
            let attributes = if bool::arbitrary(g) {
                let (name, value) = pick(g, ATTRIBUTES);
                vec![Attribute::new(name.to_string(), value.to_string())]
            } else {
                Vec::new()
            };
            Token::StartTag {
                name: pick(g, NAMES).to_string(),
                attributes,
                self_closing: u8::arbitrary(g) % 4 == 0,
            }
        }
        3 | 4 => Token::end_tag(pick(g, NAMES)),
        5 | 6 => Token::characters(pick(g, TEXT)),
        _ if bool::arbitrary(g) => Token::Comment {
            data: "c".to_string(),
        },
        _ => Token::Doctype {
            name: Some("html".to_string()),
            public_id: None,
            system_id: None,
            force_quirks: false,
        },
    }
}

impl Arbitrary for TokenStream {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % (g.size() + 1);
        Self((0..len).map(|_| arbitrary_token(g)).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let tokens = self.0.clone();
        Box::new((0..tokens.len()).map(move |skip| {
            let mut shorter = tokens.clone();
            let _ = shorter.remove(skip);
            Self(shorter)
        }))
    }
}

/// Walk the tree from the document, checking parent links and that no
/// node is reachable twice.
fn well_formed(tree: &DomTree) -> bool {
    let mut seen = HashSet::new();
    let mut pending = vec![NodeId::ROOT];
    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            return false;
        }
        for &child in tree.children(id) {
            if tree.parent(child) != Some(id) {
                return false;
            }
            pending.push(child);
        }
    }
    true
}

#[quickcheck]
fn prop_every_stream_builds_a_well_formed_tree(stream: TokenStream) -> bool {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.run(stream.0).is_err() {
        return false;
    }
    well_formed(builder.sink().tree())
}

#[quickcheck]
fn prop_document_has_one_root_element(stream: TokenStream) -> bool {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.run(stream.0).is_err() {
        return false;
    }
    let tree = builder.sink().tree();
    let elements = tree
        .children(tree.root())
        .iter()
        .filter(|&&id| tree.as_element(id).is_some())
        .count();
    elements == 1
}

#[quickcheck]
fn prop_stack_is_never_empty_while_parsing(stream: TokenStream) -> bool {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.start_tokenization().is_err() {
        return false;
    }
    let mut started = false;
    for token in &stream.0 {
        if builder.process_token(token).is_err() {
            return false;
        }
        // The root is created by the first token that is not a doctype,
        // comment or whitespace.
        started |= !builder.open_element_names().is_empty();
        if started && builder.open_element_names().first().map(String::as_str) != Some("html") {
            return false;
        }
    }
    builder.eof().is_ok()
}

#[quickcheck]
fn prop_snapshot_matches_right_after_capture(stream: TokenStream) -> bool {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.start_tokenization().is_err() {
        return false;
    }
    for token in &stream.0 {
        if builder.process_token(token).is_err() {
            return false;
        }
        let snapshot = builder.snapshot();
        if !builder.snapshot_matches(&snapshot) {
            return false;
        }
    }
    true
}

#[quickcheck]
fn prop_load_state_undoes_later_tokens(prefix: TokenStream, speculation: TokenStream) -> bool {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.start_tokenization().is_err() {
        return false;
    }
    for token in &prefix.0 {
        if builder.process_token(token).is_err() {
            return false;
        }
    }
    let snapshot = builder.snapshot();
    let names = builder.open_element_names();
    let mode = builder.mode();
    for token in &speculation.0 {
        if builder.process_token(token).is_err() {
            return false;
        }
    }
    builder.load_state(&snapshot);
    builder.snapshot_matches(&snapshot)
        && builder.open_element_names() == names
        && builder.mode() == mode
        && builder.snapshot().active_formatting().len() == snapshot.active_formatting().len()
}

/// No entry appears twice, by identity.
fn all_distinct<'a, T: 'a>(entries: impl Iterator<Item = &'a Rc<StackEntry<T>>>) -> bool {
    let entries: Vec<_> = entries.collect();
    entries
        .iter()
        .enumerate()
        .all(|(i, a)| entries[i + 1..].iter().all(|b| !Rc::ptr_eq(a, b)))
}

#[quickcheck]
fn prop_stack_and_list_entries_stay_distinct(stream: TokenStream) -> bool {
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.start_tokenization().is_err() {
        return false;
    }
    for token in &stream.0 {
        if builder.process_token(token).is_err() {
            return false;
        }
        let snapshot = builder.snapshot();
        if !all_distinct(snapshot.stack().iter())
            || !all_distinct(snapshot.active_formatting().iter().flatten())
        {
            return false;
        }
    }
    true
}

#[quickcheck]
fn prop_issues_point_at_processed_tokens(stream: TokenStream) -> bool {
    let count = stream.0.len();
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    if builder.run(stream.0).is_err() {
        return false;
    }
    // One extra slot for the end-of-file token.
    builder.issues().iter().all(|issue| issue.token_index <= count)
}

#[quickcheck]
fn prop_text_survives_plain_paragraphs(words: Vec<u8>) -> bool {
    let text: String = words
        .iter()
        .map(|w| char::from(b'a' + w % 26))
        .collect();
    let mut builder = TreeBuilder::new(DomTreeSink::new());
    let tokens = vec![Token::start_tag("p"), Token::characters(&text)];
    if builder.run(tokens).is_err() {
        return false;
    }
    let dump = builder.sink().to_test_format();
    text.is_empty() || dump.contains(&format!("\"{text}\""))
}

// ========== Stack and list invariants ==========

/// Names for hand-built stacks: a few scoping elements, `table`, and
/// ordinary elements.
const STACK_NAMES: &[&str] = &[
    "div", "p", "b", "table", "td", "caption", "object", "marquee", "span", "li", "ul",
];

fn build_stack(picks: &[u8]) -> OpenElementStack<usize> {
    let mut stack = OpenElementStack::default();
    stack.push(Rc::new(StackEntry::html(&ElementName::classify("html"), 0)));
    for (i, pick) in picks.iter().enumerate() {
        let name = STACK_NAMES[usize::from(*pick) % STACK_NAMES.len()];
        stack.push(Rc::new(StackEntry::html(&ElementName::classify(name), i + 1)));
    }
    stack
}

/// Check a scope search result against the entries: a hit is the topmost
/// match with no boundary above it, and a miss means every match below the
/// current node is cut off by a boundary.
fn search_is_bounded(
    entries: &[Rc<StackEntry<usize>>],
    target: &str,
    found: Option<usize>,
    boundary: impl Fn(&StackEntry<usize>) -> bool,
) -> bool {
    match found {
        Some(i) => {
            i >= 1
                && entries[i].name == target
                && entries[i + 1..]
                    .iter()
                    .all(|e| e.name != target && !boundary(e))
        }
        None => (1..entries.len())
            .filter(|&j| entries[j].name == target)
            .all(|j| entries[j + 1..].iter().any(|e| boundary(e))),
    }
}

#[quickcheck]
fn prop_scope_search_stops_at_scoping_elements(picks: Vec<u8>, target: u8) -> bool {
    let stack = build_stack(&picks);
    let target = STACK_NAMES[usize::from(target) % STACK_NAMES.len()];
    let found = stack.find_last_in_scope(target);
    search_is_bounded(stack.entries(), target, found, |e| e.scoping)
}

#[quickcheck]
fn prop_table_scope_search_stops_at_table(picks: Vec<u8>, target: u8) -> bool {
    let stack = build_stack(&picks);
    let target = STACK_NAMES[usize::from(target) % STACK_NAMES.len()];
    let found = stack.find_last_in_table_scope(target);
    search_is_bounded(stack.entries(), target, found, |e| e.name == "table")
}

#[quickcheck]
fn prop_clear_to_last_marker_keeps_everything_below_it(ops: Vec<bool>) -> bool {
    let mut list = ActiveFormattingList::default();
    let element = ElementName::classify("b");
    for (i, is_marker) in ops.iter().enumerate() {
        if *is_marker {
            list.insert_marker();
        } else {
            list.push(Rc::new(StackEntry::formatting(&element, i, Vec::new())));
        }
    }
    let before = list.slots().to_vec();
    let keep = before.iter().rposition(Option::is_none).unwrap_or(0);

    list.clear_to_last_marker();
    list.len() == keep
        && list
            .slots()
            .iter()
            .zip(&before)
            .all(|(after, original)| match (after, original) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            })
}

#[quickcheck]
fn prop_markers_hide_earlier_entries(ops: Vec<u8>) -> bool {
    let mut list = ActiveFormattingList::default();
    let names = [ElementName::classify("b"), ElementName::classify("i")];
    for (i, op) in ops.iter().enumerate() {
        match op % 3 {
            0 => list.insert_marker(),
            n => list.push(Rc::new(StackEntry::formatting(
                &names[usize::from(n - 1)],
                i,
                Vec::new(),
            ))),
        }
    }
    let last_marker = list.slots().iter().rposition(Option::is_none);
    ["b", "i"].iter().all(|name| {
        let expected = list
            .slots()
            .iter()
            .enumerate()
            .skip(last_marker.map_or(0, |m| m + 1))
            .rev()
            .find(|(_, slot)| slot.as_ref().is_some_and(|e| e.name == *name))
            .map(|(i, _)| i);
        list.find_since_last_marker(name) == expected
    })
}
