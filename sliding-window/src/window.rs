//! The in-flight set: an order-preserving map from tag to [`WindowEntry`].
//!
//! Grounded on the buffer/timeouts split in `ReliableSender` (a `BTreeMap`
//! keyed by sequence number plus a side `BTreeSet` of deadlines), but
//! generalized: entries here are tag-generic rather than sequence-number
//! specific, and insertion order (not a sorted deadline) determines the
//! head, per the spec's data model.

use indexmap::IndexMap;
use std::time::Instant;

/// One record per in-flight payload.
#[derive(Debug, Clone)]
pub struct WindowEntry<P> {
    /// The instant, per the engine's [`crate::clock::Clock`], at which this
    /// entry is considered timed out.
    pub deadline: Instant,
    /// The value handed to `ProtocolAdapter::send`.
    pub payload: P,
    /// Additional retransmissions permitted before the run fails.
    pub retrans_left: u32,
}

/// An insertion-ordered `tag -> WindowEntry` map bounded at construction by
/// the engine's configured window size.
///
/// Entries are inserted only via [`Window::insert`]; they are removed only
/// by [`Window::remove`]. The head (the earliest-inserted, not-yet-removed
/// entry) is the next one the engine waits on.
pub struct Window<T, P> {
    entries: IndexMap<T, WindowEntry<P>>,
}

impl<T, P> Window<T, P>
where
    T: std::hash::Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a fresh entry at the tail. Callers are responsible for
    /// enforcing the window-size bound before calling this.
    pub fn insert(&mut self, tag: T, entry: WindowEntry<P>) {
        self.entries.insert(tag, entry);
    }

    /// The earliest-inserted (tag, entry) pair, if any.
    pub fn head(&self) -> Option<(&T, &WindowEntry<P>)> {
        self.entries.get_index(0).map(|(t, e)| (t, e))
    }

    /// Remove the head entry. Panics if the window is empty; callers must
    /// check [`Window::head`] first.
    pub fn remove_head(&mut self) -> (T, WindowEntry<P>) {
        self.entries
            .shift_remove_index(0)
            .expect("remove_head called on empty window")
    }

    /// Remove an arbitrary tag, preserving the relative order of the rest.
    /// Returns the removed entry, or `None` if `tag` is not present (e.g.
    /// it is a retired or unknown tag).
    pub fn remove(&mut self, tag: &T) -> Option<WindowEntry<P>> {
        self.entries.shift_remove(tag)
    }

    pub fn contains(&self, tag: &T) -> bool {
        self.entries.contains_key(tag)
    }
}

impl<T, P> Default for Window<T, P>
where
    T: std::hash::Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(now: Instant, payload: &'static str) -> WindowEntry<&'static str> {
        WindowEntry {
            deadline: now + Duration::from_secs(1),
            payload,
            retrans_left: 0,
        }
    }

    #[test]
    fn head_is_earliest_inserted() {
        let now = Instant::now();
        let mut w: Window<u32, &str> = Window::new();
        w.insert(1, entry(now, "a"));
        w.insert(2, entry(now, "b"));
        assert_eq!(w.head().map(|(t, _)| *t), Some(1));
    }

    #[test]
    fn remove_head_advances_to_next() {
        let now = Instant::now();
        let mut w: Window<u32, &str> = Window::new();
        w.insert(1, entry(now, "a"));
        w.insert(2, entry(now, "b"));
        let (tag, _) = w.remove_head();
        assert_eq!(tag, 1);
        assert_eq!(w.head().map(|(t, _)| *t), Some(2));
    }

    #[test]
    fn remove_non_head_preserves_order() {
        let now = Instant::now();
        let mut w: Window<u32, &str> = Window::new();
        w.insert(1, entry(now, "a"));
        w.insert(2, entry(now, "b"));
        w.insert(3, entry(now, "c"));
        assert!(w.remove(&2).is_some());
        assert_eq!(w.head().map(|(t, _)| *t), Some(1));
        w.remove_head();
        assert_eq!(w.head().map(|(t, _)| *t), Some(3));
    }

    #[test]
    fn remove_unknown_tag_is_none() {
        let mut w: Window<u32, &str> = Window::new();
        w.insert(1, entry(Instant::now(), "a"));
        assert!(w.remove(&99).is_none());
    }
}
