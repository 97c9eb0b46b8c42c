//! Capturing and restoring the tree builder state.
//!
//! A caller that runs a speculative token stream (a script that may call
//! `document.write`) takes a snapshot first, checks it against the live
//! state afterwards, and loads it back to undo the speculation.

use std::rc::Rc;

use super::formatting::FormattingSlot;
use super::modes::{ForeignFlag, InsertionMode};
use super::stack::StackEntry;
use super::TreeBuilder;
use crate::sink::TreeSink;

/// A frozen copy of the mutable tree builder state.
///
/// Stack entries are shared with the builder rather than copied; they are
/// immutable once created, and sharing keeps an entry that is both open and
/// in the list of active formatting elements the same entry after
/// [`TreeBuilder::load_state`].
///
/// Character tokens are buffered between tags, and the buffer is not part
/// of the snapshot. Take snapshots between tokens: [`TreeBuilder::snapshot`]
/// flushes the buffer into the tree before capturing.
#[derive(Debug, Clone)]
pub struct TreeBuilderSnapshot<T> {
    stack: Vec<Rc<StackEntry<T>>>,
    formatting: Vec<FormattingSlot<T>>,
    form_pointer: Option<T>,
    head_pointer: Option<T>,
    mode: InsertionMode,
    original_mode: InsertionMode,
    frameset_ok: bool,
    foreign: ForeignFlag,
    need_to_drop_lf: bool,
    quirks: bool,
}

impl<T> TreeBuilderSnapshot<T> {
    /// The stack of open elements, root first.
    pub fn stack(&self) -> &[Rc<StackEntry<T>>] {
        &self.stack
    }

    /// The list of active formatting elements; `None` is a marker.
    pub fn active_formatting(&self) -> &[FormattingSlot<T>] {
        &self.formatting
    }

    /// The form element pointer.
    pub const fn form_pointer(&self) -> Option<&T> {
        self.form_pointer.as_ref()
    }

    /// The head element pointer.
    pub const fn head_pointer(&self) -> Option<&T> {
        self.head_pointer.as_ref()
    }

    /// The insertion mode.
    pub const fn mode(&self) -> InsertionMode {
        self.mode
    }

    /// The mode "text" returns to.
    pub const fn original_mode(&self) -> InsertionMode {
        self.original_mode
    }

    /// The frameset-ok flag.
    pub const fn frameset_ok(&self) -> bool {
        self.frameset_ok
    }

    /// Whether foreign content was open.
    pub const fn foreign_flag(&self) -> ForeignFlag {
        self.foreign
    }

    /// Whether a leading newline was about to be dropped.
    pub const fn need_to_drop_lf(&self) -> bool {
        self.need_to_drop_lf
    }

    /// Whether the document was in quirks mode.
    pub const fn quirks(&self) -> bool {
        self.quirks
    }
}

impl<S: TreeSink> TreeBuilder<S> {
    /// Capture the current state.
    ///
    /// Pending characters are flushed into the tree first, so this needs
    /// `&mut self` and changes the sink. Call it at a token boundary.
    pub fn snapshot(&mut self) -> TreeBuilderSnapshot<S::Handle> {
        self.flush_characters();
        TreeBuilderSnapshot {
            stack: self.stack.entries().to_vec(),
            formatting: self.formatting.slots().to_vec(),
            form_pointer: self.form_pointer.clone(),
            head_pointer: self.head_pointer.clone(),
            mode: self.mode,
            original_mode: self.original_mode,
            frameset_ok: self.frameset_ok,
            foreign: self.foreign,
            need_to_drop_lf: self.need_to_drop_lf,
            quirks: self.quirks,
        }
    }

    /// Whether the live state has the shape recorded in `snapshot`.
    ///
    /// Entries are compared by the node they hold, not by their contents.
    pub fn snapshot_matches(&self, snapshot: &TreeBuilderSnapshot<S::Handle>) -> bool {
        if self.stack.len() != snapshot.stack.len()
            || self.formatting.len() != snapshot.formatting.len()
            || self.form_pointer != snapshot.form_pointer
            || self.head_pointer != snapshot.head_pointer
            || self.mode != snapshot.mode
            || self.original_mode != snapshot.original_mode
            || self.frameset_ok != snapshot.frameset_ok
            || self.foreign != snapshot.foreign
            || self.need_to_drop_lf != snapshot.need_to_drop_lf
            || self.quirks != snapshot.quirks
        {
            return false;
        }
        let lists_match = self
            .formatting
            .slots()
            .iter()
            .zip(&snapshot.formatting)
            .all(|(live, saved)| match (live, saved) {
                (None, None) => true,
                (Some(live), Some(saved)) => live.node == saved.node,
                _ => false,
            });
        lists_match
            && self
                .stack
                .entries()
                .iter()
                .zip(&snapshot.stack)
                .all(|(live, saved)| live.node == saved.node)
    }

    /// Replace the live state with `snapshot`. Pending characters are
    /// discarded; they belong to the speculation being undone.
    pub fn load_state(&mut self, snapshot: &TreeBuilderSnapshot<S::Handle>) {
        log::trace!(
            target: super::LOG_TARGET,
            "loading snapshot: {} open, {} formatting, mode {}",
            snapshot.stack.len(),
            snapshot.formatting.len(),
            snapshot.mode
        );
        self.pending_text.clear();

        self.formatting.clear();
        for slot in &snapshot.formatting {
            match slot {
                Some(entry) => self.formatting.push(Rc::clone(entry)),
                None => self.formatting.insert_marker(),
            }
        }
        self.stack.clear();
        for entry in &snapshot.stack {
            self.stack.push(Rc::clone(entry));
        }

        self.form_pointer.clone_from(&snapshot.form_pointer);
        self.head_pointer.clone_from(&snapshot.head_pointer);
        self.mode = snapshot.mode;
        self.original_mode = snapshot.original_mode;
        self.frameset_ok = snapshot.frameset_ok;
        self.foreign = snapshot.foreign;
        self.need_to_drop_lf = snapshot.need_to_drop_lf;
        self.quirks = snapshot.quirks;
    }
}
