//! [§ 13.2.4.4 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//!
//! "Initially, the list of active formatting elements is empty. It is used
//! to handle mis-nested formatting element tags."
//!
//! `None` slots are markers.

use std::rc::Rc;

use super::stack::StackEntry;

/// One slot in the list: an entry or a marker.
pub type FormattingSlot<T> = Option<Rc<StackEntry<T>>>;

/// The list of active formatting elements.
#[derive(Debug)]
pub struct ActiveFormattingList<T> {
    slots: Vec<FormattingSlot<T>>,
}

impl<T> Default for ActiveFormattingList<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> ActiveFormattingList<T> {
    /// Number of slots, markers included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `index`. The outer `Option` is `None` past the end; the inner
    /// one is `None` for a marker.
    pub fn get(&self, index: usize) -> Option<&FormattingSlot<T>> {
        self.slots.get(index)
    }

    /// All slots, oldest first.
    pub fn slots(&self) -> &[FormattingSlot<T>] {
        &self.slots
    }

    /// Append an entry.
    pub fn push(&mut self, entry: Rc<StackEntry<T>>) {
        self.slots.push(Some(entry));
    }

    /// "insert a marker at the end of the list of active formatting elements"
    pub fn insert_marker(&mut self) {
        self.slots.push(None);
    }

    /// Insert a slot at `index`.
    pub fn insert(&mut self, index: usize, entry: Rc<StackEntry<T>>) {
        self.slots.insert(index, Some(entry));
    }

    /// Remove the slot at `index`.
    pub fn remove(&mut self, index: usize) -> FormattingSlot<T> {
        self.slots.remove(index)
    }

    /// Overwrite the slot at `index`.
    pub fn replace(&mut self, index: usize, entry: Rc<StackEntry<T>>) {
        self.slots[index] = Some(entry);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// [§ 13.2.4.4](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "1. Let entry be the last (most recently added) entry in the list of
    /// active formatting elements.
    /// 2. Remove entry from the list of active formatting elements.
    /// 3. If entry was a marker, then stop the algorithm at this point.
    /// 4. Go to step 1."
    pub fn clear_to_last_marker(&mut self) {
        while let Some(slot) = self.slots.pop() {
            if slot.is_none() {
                break;
            }
        }
    }

    /// Position of the last entry named `name` after the last marker.
    pub fn find_since_last_marker(&self, name: &str) -> Option<usize> {
        for (i, slot) in self.slots.iter().enumerate().rev() {
            match slot {
                None => return None,
                Some(entry) if entry.name == name => return Some(i),
                Some(_) => {}
            }
        }
        None
    }

    /// Position of this exact entry.
    pub fn position_of(&self, entry: &Rc<StackEntry<T>>) -> Option<usize> {
        self.slots
            .iter()
            .rposition(|slot| slot.as_ref().is_some_and(|e| Rc::ptr_eq(e, entry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::element::ElementName;

    fn entry(name: &str, node: usize) -> Rc<StackEntry<usize>> {
        Rc::new(StackEntry::formatting(&ElementName::classify(name), node, Vec::new()))
    }

    #[test]
    fn test_clear_to_last_marker_stops_at_marker() {
        let mut list = ActiveFormattingList::default();
        list.push(entry("b", 1));
        list.insert_marker();
        list.push(entry("i", 2));
        list.push(entry("u", 3));

        list.clear_to_last_marker();

        assert_eq!(list.len(), 1);
        assert!(list.get(0).is_some_and(Option::is_some));
    }

    #[test]
    fn test_clear_without_marker_empties() {
        let mut list = ActiveFormattingList::default();
        list.push(entry("b", 1));
        list.push(entry("i", 2));
        list.clear_to_last_marker();
        assert!(list.is_empty());
    }

    #[test]
    fn test_find_since_last_marker() {
        let mut list = ActiveFormattingList::default();
        list.push(entry("a", 1));
        list.insert_marker();
        list.push(entry("b", 2));

        assert_eq!(list.find_since_last_marker("b"), Some(2));
        assert_eq!(list.find_since_last_marker("a"), None);
    }

    #[test]
    fn test_position_is_by_identity() {
        let mut list = ActiveFormattingList::default();
        let b = entry("b", 1);
        list.push(Rc::clone(&b));
        assert_eq!(list.position_of(&b), Some(0));
        assert_eq!(list.position_of(&entry("b", 1)), None);
    }
}
