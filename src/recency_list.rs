//! RecencyList: arena-backed doubly-linked sequence ordered by recency.
//!
//! Nodes live in a `SlotMap` and link to each other by generational key,
//! so a key handed to the index stays valid no matter how the list is
//! reordered, and a key for a removed node never resolves again.
//! `prev` points toward the front (newer), `next` toward the back (older).

use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Hash of `key`, computed once on insert and reused by every rebuild.
    pub(crate) hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Debug)]
pub(crate) struct RecencyList<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn front(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn back(&self) -> Option<DefaultKey> {
        self.tail
    }

    pub(crate) fn get(&self, slot: DefaultKey) -> Option<&Node<K, V>> {
        self.nodes.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: DefaultKey) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(slot)
    }

    /// Stored hash for `slot`; 0 for a slot that is no longer live.
    pub(crate) fn hash_of(&self, slot: DefaultKey) -> u64 {
        self.nodes.get(slot).map(|n| n.hash).unwrap_or(0)
    }

    pub(crate) fn push_front(&mut self, key: K, value: V, hash: u64) -> DefaultKey {
        let old_head = self.head;
        let slot = self.nodes.insert(Node {
            key,
            value,
            hash,
            prev: None,
            next: old_head,
        });
        match old_head {
            Some(h) => self.nodes[h].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        slot
    }

    /// Detach `slot` from its neighbours, leaving the node in the arena.
    fn unlink(&mut self, slot: DefaultKey) {
        let (prev, next) = {
            let n = &self.nodes[slot];
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        let n = &mut self.nodes[slot];
        n.prev = None;
        n.next = None;
    }

    /// Move a live node to the front. Returns false for a dead slot.
    pub(crate) fn move_to_front(&mut self, slot: DefaultKey) -> bool {
        if !self.nodes.contains_key(slot) {
            return false;
        }
        if self.head == Some(slot) {
            return true;
        }
        self.unlink(slot);
        let old_head = self.head;
        {
            let n = &mut self.nodes[slot];
            n.next = old_head;
        }
        match old_head {
            Some(h) => self.nodes[h].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        true
    }

    pub(crate) fn remove(&mut self, slot: DefaultKey) -> Option<Node<K, V>> {
        if !self.nodes.contains_key(slot) {
            return None;
        }
        self.unlink(slot);
        self.nodes.remove(slot)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> ListIter<'_, K, V> {
        ListIter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.nodes.len(),
        }
    }
}

/// Front-to-back traversal; `rev()` walks back-to-front.
pub(crate) struct ListIter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for ListIter<'a, K, V> {
    type Item = &'a Node<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.nodes.get(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for ListIter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.nodes.get(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(node)
    }
}

impl<K, V> ExactSizeIterator for ListIter<'_, K, V> {}
