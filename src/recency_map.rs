//! RecencyMap: hash index over a recency-ordered sequence.

use crate::config::{self, ConfigError, MapConfig};
use crate::recency_list::{ListIter, RecencyList};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table::{self, HashTable};
use slotmap::DefaultKey;
use std::collections::hash_map::RandomState;

/// Returned by [`RecencyMap::insert`] when the key is already present.
/// The map is left untouched and the rejected pair is handed back.
pub enum InsertError<K, V> {
    DuplicateKey { key: K, value: V },
}

impl<K, V> InsertError<K, V> {
    pub fn into_inner(self) -> (K, V) {
        match self {
            InsertError::DuplicateKey { key, value } => (key, value),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey { key, .. } => f
                .debug_struct("DuplicateKey")
                .field("key", key)
                .finish_non_exhaustive(),
        }
    }
}

impl<K, V> fmt::Display for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey { .. } => f.write_str("key already present in recency map"),
        }
    }
}

impl<K: fmt::Debug, V> std::error::Error for InsertError<K, V> {}

/// Hash map whose entries are also kept in most-recently-touched order.
///
/// The front of the order is the entry most recently inserted or
/// [`splice`](Self::splice)d; the back is the eviction candidate reported
/// by [`oldest_key`](Self::oldest_key). The map never evicts on its own.
///
/// Values are stored as given. To keep ownership with the caller, store a
/// shared handle such as `Rc<T>` or a borrow `&'a T`; `remove`,
/// `pop_oldest` and a rejected `insert` hand the value back.
///
/// ```
/// use recency_map::RecencyMap;
///
/// let mut m = RecencyMap::new();
/// m.insert("a", 1).unwrap();
/// m.insert("b", 2).unwrap();
/// m.insert("c", 3).unwrap();
/// assert_eq!(m.oldest_key(), Some(&"a"));
///
/// assert!(m.splice("a"));
/// assert_eq!(m.oldest_key(), Some(&"b"));
/// assert_eq!(m.remove("b"), Some(2));
/// assert_eq!(m.oldest_key(), Some(&"c"));
/// ```
pub struct RecencyMap<K, V, S = RandomState> {
    hasher: S,
    list: RecencyList<K, V>,
    // Active index. An alternate exists only inside `grown_index`.
    index: HashTable<DefaultKey>,
    buckets: usize,
    initial_buckets: usize,
    max_load_factor: f32,
    reentrancy: DebugReentrancy,
}

impl<K, V> RecencyMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: MapConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for RecencyMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> RecencyMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            list: RecencyList::new(),
            index: HashTable::new(),
            buckets: 0,
            initial_buckets: 0,
            max_load_factor: config::DEFAULT_MAX_LOAD_FACTOR,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let buckets = config.normalized_buckets();
        Ok(Self {
            hasher,
            list: RecencyList::new(),
            index: HashTable::with_capacity(config::table_capacity(
                buckets,
                config.max_load_factor,
            )),
            buckets,
            initial_buckets: buckets,
            max_load_factor: config.max_load_factor,
            reentrancy: DebugReentrancy::new(),
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Unguarded lookup; callers hold the reentrancy guard.
    fn find_slot<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&slot| {
                self.list
                    .get(slot)
                    .map(|n| n.key.borrow() == q)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bucket capacity of the active index. Zero until the first insert
    /// unless an initial capacity was configured.
    pub fn bucket_count(&self) -> usize {
        self.buckets
    }

    pub fn load_factor(&self) -> f32 {
        if self.buckets == 0 {
            0.0
        } else {
            self.len() as f32 / self.buckets as f32
        }
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Change the growth threshold. Takes effect on the next insert; the
    /// index is never shrunk.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<(), ConfigError> {
        config::check_load_factor(max_load_factor)?;
        self.max_load_factor = max_load_factor;
        Ok(())
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.find_slot(q).is_some()
    }

    /// Insert a new entry at the front of the recency order.
    ///
    /// Fails without touching the map if `key` is already present. When
    /// the insert brings occupancy to the growth threshold, the index is
    /// rebuilt at a larger bucket count before the new binding lands.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError<K, V>> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let duplicate = self
            .index
            .find(hash, |&slot| {
                self.list
                    .get(slot)
                    .map(|n| n.key == key)
                    .unwrap_or(false)
            })
            .is_some();
        if duplicate {
            return Err(InsertError::DuplicateKey { key, value });
        }

        let slot = self.list.push_front(key, value, hash);
        let occupancy = self.index.len() + 1;
        if occupancy >= config::growth_threshold(self.buckets, self.max_load_factor) {
            let (alternate, buckets) = self.grown_index(slot, hash);
            log::debug!(
                "recency map growth switch: {} -> {} buckets at {} entries",
                self.buckets,
                buckets,
                occupancy
            );
            self.index = alternate;
            self.buckets = buckets;
        } else {
            let list = &self.list;
            let _ = self.index.insert_unique(hash, slot, |&s| list.hash_of(s));
        }
        Ok(())
    }

    /// Alternate index for a growth switch: every binding of the active
    /// index copied into a larger table, plus the new binding. Slots are
    /// reused verbatim since the sequence itself is not touched.
    fn grown_index(&self, new_slot: DefaultKey, new_hash: u64) -> (HashTable<DefaultKey>, usize) {
        let occupancy = self.index.len() + 1;
        let buckets = config::buckets_for(
            occupancy,
            self.max_load_factor,
            self.buckets.saturating_mul(2),
        );
        let list = &self.list;
        let mut alternate = HashTable::with_capacity(
            occupancy.max(config::table_capacity(buckets, self.max_load_factor)),
        );
        for &slot in self.index.iter() {
            let _ = alternate.insert_unique(list.hash_of(slot), slot, |&s| list.hash_of(s));
        }
        let _ = alternate.insert_unique(new_hash, new_slot, |&s| list.hash_of(s));
        (alternate, buckets)
    }

    /// Look up `q` without changing the recency order.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(q)?;
        self.list.get(slot).map(|n| &n.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(q)?;
        self.list.get_mut(slot).map(|n| &mut n.value)
    }

    /// Mark `q` as most recently used. Returns false if it is absent.
    pub fn splice<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        match self.find_slot(q) {
            Some(slot) => self.list.move_to_front(slot),
            None => false,
        }
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let list = &self.list;
        let (slot, _) = match self.index.find_entry(hash, |&slot| {
            list.get(slot)
                .map(|n| n.key.borrow() == q)
                .unwrap_or(false)
        }) {
            Ok(occupied) => occupied.remove(),
            Err(_) => return None,
        };
        self.list.remove(slot).map(|n| (n.key, n.value))
    }

    /// Least recently inserted or spliced key; `None` when empty.
    pub fn oldest_key(&self) -> Option<&K> {
        let slot = self.list.back()?;
        self.list.get(slot).map(|n| &n.key)
    }

    pub fn newest_key(&self) -> Option<&K> {
        let slot = self.list.front()?;
        self.list.get(slot).map(|n| &n.key)
    }

    /// Remove and return the entry at the back of the recency order.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let slot = self.list.back()?;
        let hash = self.list.hash_of(slot);
        if let Ok(occupied) = self.index.find_entry(hash, |&s| s == slot) {
            let _ = occupied.remove();
        }
        self.list.remove(slot).map(|n| (n.key, n.value))
    }

    /// Drop every entry and return to the configured initial capacity.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        log::trace!("recency map clear: dropping {} entries", self.list.len());
        self.list.clear();
        self.buckets = self.initial_buckets;
        self.index =
            HashTable::with_capacity(config::table_capacity(self.buckets, self.max_load_factor));
    }

    /// Entries in index order. This is not the recency order; use
    /// [`iter_recency`](Self::iter_recency) for that.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.index.iter(),
            list: &self.list,
        }
    }

    /// Entries from newest to oldest; `.rev()` walks oldest first.
    pub fn iter_recency(&self) -> RecencyIter<'_, K, V> {
        RecencyIter {
            it: self.list.iter(),
        }
    }
}

/// Iterator over bindings of the active index, in hash order.
pub struct Iter<'a, K, V> {
    slots: hash_table::Iter<'a, DefaultKey>,
    list: &'a RecencyList<K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        // Every binding in the index names a live list node.
        let &slot = self.slots.next()?;
        self.list.get(slot).map(|n| (&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.slots.len();
        (n, Some(n))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over entries in recency order, newest first.
pub struct RecencyIter<'a, K, V> {
    it: ListIter<'a, K, V>,
}

impl<'a, K, V> Iterator for RecencyIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|n| (&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for RecencyIter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|n| (&n.key, &n.value))
    }
}

impl<K, V> ExactSizeIterator for RecencyIter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a RecencyMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for RecencyMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.list.iter().map(|n| (&n.key, &n.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::hash::Hasher;
    use std::rc::Rc;

    fn oldest_first<K: Clone + Eq + Hash, V>(m: &RecencyMap<K, V>) -> Vec<K> {
        m.iter_recency().rev().map(|(k, _)| k.clone()).collect()
    }

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    #[test]
    fn duplicate_insert_rejected_and_returned() {
        let mut m: RecencyMap<String, i32> = RecencyMap::new();
        m.insert("dup".to_string(), 1).unwrap();
        let err = m.insert("dup".to_string(), 2).unwrap_err();
        assert_eq!(err.into_inner(), ("dup".to_string(), 2));
        assert_eq!(m.get("dup"), Some(&1));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn duplicate_insert_does_not_touch_order() {
        let mut m = RecencyMap::new();
        m.insert("a", 1).unwrap();
        m.insert("b", 2).unwrap();
        assert!(m.insert("a", 3).is_err());
        assert_eq!(oldest_first(&m), ["a", "b"]);
    }

    #[test]
    fn get_does_not_touch_order() {
        let mut m = RecencyMap::new();
        m.insert("a", 1).unwrap();
        m.insert("b", 2).unwrap();
        assert_eq!(m.get("a"), Some(&1));
        assert_eq!(m.oldest_key(), Some(&"a"));
        assert_eq!(m.newest_key(), Some(&"b"));
    }

    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: RecencyMap<String, i32> = RecencyMap::new();
        m.insert("hello".to_string(), 1).unwrap();
        assert!(m.contains_key("hello"));
        assert!(!m.contains_key("world"));
        assert!(m.splice("hello"));
        assert_eq!(m.remove("hello"), Some(1));
        assert!(m.is_empty());
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut m = RecencyMap::new();
        m.insert(1u32, 10).unwrap();
        *m.get_mut(&1).unwrap() += 5;
        assert_eq!(m.get(&1), Some(&15));
        assert!(m.get_mut(&2).is_none());
    }

    #[test]
    fn splice_moves_to_front_and_misses_absent() {
        let mut m = RecencyMap::new();
        for k in ["a", "b", "c"] {
            m.insert(k, ()).unwrap();
        }
        assert!(m.splice("a"));
        assert_eq!(oldest_first(&m), ["b", "c", "a"]);
        assert!(!m.splice("zzz"));
        assert_eq!(oldest_first(&m), ["b", "c", "a"]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn remove_entry_returns_key_and_value() {
        let mut m = RecencyMap::new();
        m.insert("k".to_string(), 7).unwrap();
        assert_eq!(m.remove_entry("k"), Some(("k".to_string(), 7)));
        assert_eq!(m.remove_entry("k"), None);
        assert!(m.oldest_key().is_none());
    }

    #[test]
    fn pop_oldest_drains_in_recency_order() {
        let mut m = RecencyMap::new();
        for i in 0..5 {
            m.insert(i, i * 10).unwrap();
        }
        m.splice(&0);
        let drained: Vec<_> = std::iter::from_fn(|| m.pop_oldest()).collect();
        assert_eq!(drained, [(1, 10), (2, 20), (3, 30), (4, 40), (0, 0)]);
        assert!(m.is_empty());
        assert!(m.pop_oldest().is_none());
    }

    #[test]
    fn bucket_count_starts_at_zero_and_grows_on_threshold() {
        let mut m = RecencyMap::new();
        assert_eq!(m.bucket_count(), 0);
        m.insert(0u32, ()).unwrap();
        assert_eq!(m.bucket_count(), config::MIN_BUCKETS);

        // Default load factor 1.0: the insert reaching 8 entries switches.
        for i in 1..7 {
            m.insert(i, ()).unwrap();
        }
        assert_eq!(m.len(), 7);
        assert_eq!(m.bucket_count(), 8);
        m.insert(7, ()).unwrap();
        assert_eq!(m.bucket_count(), 16);
        assert!(m.load_factor() < m.max_load_factor());
    }

    #[test]
    fn growth_keeps_entries_and_order() {
        let mut m = RecencyMap::with_config(MapConfig::new().max_load_factor(0.5)).unwrap();
        for i in 0..1000u32 {
            m.insert(i, i * 2).unwrap();
            assert!(m.load_factor() < 0.5);
        }
        for i in 0..1000u32 {
            assert_eq!(m.get(&i), Some(&(i * 2)));
        }
        let expected: Vec<u32> = (0..1000).collect();
        assert_eq!(oldest_first(&m), expected);
    }

    #[test]
    fn growth_reuses_stored_hashes() {
        #[derive(Debug, PartialEq, Eq)]
        struct CountingKey<'a>(u32, &'a Cell<usize>);
        impl Hash for CountingKey<'_> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.1.set(self.1.get() + 1);
                self.0.hash(state);
            }
        }

        let calls = Cell::new(0);
        let mut m = RecencyMap::new();
        for i in 0..100 {
            m.insert(CountingKey(i, &calls), ()).unwrap();
        }
        assert!(m.bucket_count() >= 128);
        assert_eq!(calls.get(), 100, "rebuilds must not rehash keys");
    }

    #[test]
    fn lowering_load_factor_applies_on_next_insert() {
        let mut m = RecencyMap::new();
        for i in 0..5u32 {
            m.insert(i, ()).unwrap();
        }
        assert_eq!(m.bucket_count(), 8);
        m.set_max_load_factor(0.25).unwrap();
        assert_eq!(m.bucket_count(), 8);
        m.insert(5, ()).unwrap();
        assert_eq!(m.bucket_count(), 32);
        assert!(matches!(
            m.set_max_load_factor(0.0),
            Err(ConfigError::InvalidLoadFactor(_))
        ));
        assert_eq!(m.max_load_factor(), 0.25);
    }

    #[test]
    fn invalid_config_is_rejected() {
        for lf in [f32::NAN, 1e20, 1e-30] {
            let r: Result<RecencyMap<u32, ()>, _> =
                RecencyMap::with_config(MapConfig::new().max_load_factor(lf));
            assert!(matches!(r, Err(ConfigError::InvalidLoadFactor(_))), "{lf}");
        }
        let mut m: RecencyMap<u32, ()> = RecencyMap::new();
        assert!(m.set_max_load_factor(1e20).is_err());
        assert!(m.set_max_load_factor(1e-30).is_err());
        assert_eq!(m.max_load_factor(), config::DEFAULT_MAX_LOAD_FACTOR);
    }

    #[test]
    fn load_factor_above_one_packs_buckets() {
        let mut m = RecencyMap::with_config(MapConfig::new().max_load_factor(4.0)).unwrap();
        for i in 0..31u32 {
            m.insert(i, ()).unwrap();
        }
        assert_eq!(m.bucket_count(), 8);
        assert!(m.load_factor() > 1.0);
        m.insert(31, ()).unwrap();
        assert_eq!(m.bucket_count(), 16);
        assert_eq!(m.load_factor(), 2.0);
        for i in 0..32u32 {
            assert!(m.contains_key(&i));
        }
    }

    #[test]
    fn extreme_load_factors_insert_without_panicking() {
        for lf in [config::MIN_MAX_LOAD_FACTOR, config::MAX_MAX_LOAD_FACTOR] {
            let mut m = RecencyMap::with_config(MapConfig::new().max_load_factor(lf)).unwrap();
            for i in 0..2_000u32 {
                m.insert(i, i).unwrap();
                assert!(m.len() < config::growth_threshold(m.bucket_count(), lf));
            }
            for i in 0..2_000u32 {
                assert_eq!(m.get(&i), Some(&i));
            }
            assert_eq!(m.pop_oldest(), Some((0, 0)));
        }

        let mut packed = RecencyMap::<u32, ()>::with_config(
            MapConfig::new().max_load_factor(config::MAX_MAX_LOAD_FACTOR),
        )
        .unwrap();
        for i in 0..2_000u32 {
            packed.insert(i, ()).unwrap();
        }
        assert!(packed.bucket_count() <= 256, "{}", packed.bucket_count());
    }

    #[test]
    fn high_load_factor_reserves_no_more_than_buckets() {
        let mut m = RecencyMap::with_config(
            MapConfig::new()
                .max_load_factor(config::MAX_MAX_LOAD_FACTOR)
                .initial_buckets(64),
        )
        .unwrap();
        m.insert(1u32, ()).unwrap();
        assert_eq!(m.bucket_count(), 64);
        // Threshold is 1024 entries; the table itself stays bucket-sized.
        assert!(m.index.capacity() < 1024, "{}", m.index.capacity());
        m.clear();
        assert!(m.index.capacity() < 1024, "{}", m.index.capacity());
    }

    #[test]
    fn clear_resets_to_initial_state() {
        let mut m = RecencyMap::with_config(MapConfig::new().initial_buckets(32)).unwrap();
        assert_eq!(m.bucket_count(), 32);
        for i in 0..100u32 {
            m.insert(i, ()).unwrap();
        }
        assert!(m.bucket_count() > 32);
        m.clear();
        assert_eq!(m.bucket_count(), 32);
        assert!(m.is_empty());
        assert!(m.oldest_key().is_none());
        m.clear();
        assert_eq!(m.len(), 0);
        m.insert(1, ()).unwrap();
        assert_eq!(m.oldest_key(), Some(&1));
    }

    #[test]
    fn clear_and_remove_release_value_handles() {
        let v = Rc::new("payload".to_string());
        let mut m = RecencyMap::new();
        m.insert(1, Rc::clone(&v)).unwrap();
        m.insert(2, Rc::clone(&v)).unwrap();
        assert_eq!(Rc::strong_count(&v), 3);

        let back = m.remove(&1).unwrap();
        assert!(Rc::ptr_eq(&back, &v));
        drop(back);
        assert_eq!(Rc::strong_count(&v), 2);

        m.clear();
        assert_eq!(Rc::strong_count(&v), 1);
    }

    #[test]
    fn iter_visits_each_binding_once() {
        let mut m = RecencyMap::new();
        for i in 0..50u32 {
            m.insert(i, i + 1).unwrap();
        }
        m.remove(&10);
        let seen: BTreeSet<u32> = m.iter().map(|(k, v)| {
            assert_eq!(*v, k + 1);
            *k
        }).collect();
        let expected: BTreeSet<u32> = (0..50).filter(|&i| i != 10).collect();
        assert_eq!(seen, expected);
        assert_eq!((&m).into_iter().count(), 49);
        assert_eq!(m.iter().len(), 49);
        let mut it = m.iter();
        it.next();
        assert_eq!(it.size_hint(), (48, Some(48)));
    }

    #[test]
    fn iter_recency_is_exact_size_and_double_ended() {
        let mut m = RecencyMap::new();
        for k in ["a", "b", "c"] {
            m.insert(k, ()).unwrap();
        }
        let it = m.iter_recency();
        assert_eq!(it.len(), 3);
        let newest_first: Vec<_> = m.iter_recency().map(|(k, _)| *k).collect();
        assert_eq!(newest_first, ["c", "b", "a"]);
    }

    #[test]
    fn collisions_resolve_by_equality() {
        let mut m: RecencyMap<String, i32, ConstBuildHasher> =
            RecencyMap::with_hasher(ConstBuildHasher);
        for i in 0..40 {
            m.insert(format!("k{i}"), i).unwrap();
        }
        for i in 0..40 {
            assert_eq!(m.get(format!("k{i}").as_str()), Some(&i));
        }
        assert_eq!(m.remove("k3"), Some(3));
        assert!(!m.contains_key("k3"));
        assert_eq!(m.pop_oldest(), Some(("k0".to_string(), 0)));
        assert_eq!(m.len(), 38);
    }

    #[test]
    fn debug_lists_newest_first() {
        let mut m = RecencyMap::new();
        m.insert(1, "x").unwrap();
        m.insert(2, "y").unwrap();
        assert_eq!(format!("{m:?}"), r#"{2: "y", 1: "x"}"#);
    }

    #[test]
    fn insert_error_formats() {
        let err: InsertError<&str, i32> = InsertError::DuplicateKey { key: "k", value: 1 };
        assert_eq!(err.to_string(), "key already present in recency map");
        assert!(format!("{err:?}").contains("\"k\""));
    }

    /// Re-entering the map from `K: Eq` during a probe panics in debug builds.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_get() {
        struct ReentryKey {
            id: &'static str,
            map: *const RecencyMap<ReentryKey, i32, ConstBuildHasher>,
            trigger: bool,
        }
        impl core::fmt::Debug for ReentryKey {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.id)
            }
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    unsafe {
                        let m = &*other.map;
                        let _ = m.contains_key(self);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut m: RecencyMap<ReentryKey, i32, ConstBuildHasher> =
            RecencyMap::with_hasher(ConstBuildHasher);
        let key = ReentryKey {
            id: "a",
            map: core::ptr::null(),
            trigger: false,
        };
        m.insert(key, 1).unwrap();

        let query = ReentryKey {
            id: "b",
            map: &m as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.get(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }

    #[test]
    fn map_is_send_for_external_locking() {
        fn assert_send<T: Send>() {}
        assert_send::<RecencyMap<String, Vec<u8>>>();
        fn assert_send_sync_mutex<T: Send + Sync>() {}
        assert_send_sync_mutex::<std::sync::Mutex<RecencyMap<String, u64>>>();
    }
}
