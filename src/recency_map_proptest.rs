#![cfg(test)]

// Property tests for RecencyMap kept inside the crate so the model can
// also check the private bucket bookkeeping.

use crate::config::{growth_threshold, MapConfig};
use crate::recency_map::{InsertError, RecencyMap};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Get(usize),
    Splice(usize),
    Remove(usize),
    PopOldest,
    Contains(String),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            3 => idx.clone().prop_map(OpI::Splice),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => Just(OpI::PopOldest),
            1 => prop_oneof![contains_pool, "[a-z]{0,4}"].prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Reference model: values by key plus recency order, newest at the front.
#[derive(Default)]
struct Model {
    values: HashMap<Key, i32>,
    order: VecDeque<Key>,
}

impl Model {
    fn touch(&mut self, k: &Key) {
        let pos = self.order.iter().position(|x| x == k).expect("key in order");
        let k = self.order.remove(pos).expect("position valid");
        self.order.push_front(k);
    }

    fn remove(&mut self, k: &Key) -> Option<i32> {
        let v = self.values.remove(k)?;
        self.order.retain(|x| x != k);
        Some(v)
    }
}

fn run_scenario<S>(
    mut sut: RecencyMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model = Model::default();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.values.contains_key(&k);
                let buckets_before = sut.bucket_count();
                let len_before = sut.len();
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.values.insert(k.clone(), v);
                        model.order.push_front(k);
                        let crossed = len_before + 1
                            >= growth_threshold(buckets_before, sut.max_load_factor());
                        if crossed {
                            prop_assert!(sut.bucket_count() > buckets_before);
                        } else {
                            prop_assert_eq!(sut.bucket_count(), buckets_before);
                        }
                    }
                    Err(InsertError::DuplicateKey { key, value }) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert!(key == k);
                        prop_assert_eq!(value, v);
                        prop_assert_eq!(sut.bucket_count(), buckets_before);
                    }
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.values.get(&k));
            }
            OpI::Splice(i) => {
                let k = key_from(pool, i);
                let present = model.values.contains_key(&k);
                prop_assert_eq!(sut.splice(&k), present);
                if present {
                    model.touch(&k);
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(!sut.contains_key(&k));
            }
            OpI::PopOldest => {
                let expected = model.order.back().cloned();
                match sut.pop_oldest() {
                    Some((k, v)) => {
                        prop_assert_eq!(Some(&k), expected.as_ref());
                        prop_assert_eq!(Some(v), model.remove(&k));
                    }
                    None => prop_assert!(expected.is_none()),
                }
            }
            OpI::Contains(s) => {
                let has_model = model.values.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Clear => {
                sut.clear();
                model.values.clear();
                model.order.clear();
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                let m_keys: BTreeSet<_> = model.values.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        // 1) Index and sequence agree with the model in size and order.
        prop_assert_eq!(sut.len(), model.values.len());
        prop_assert_eq!(sut.is_empty(), model.values.is_empty());
        let order: Vec<_> = sut.iter_recency().map(|(k, _)| k.clone()).collect();
        prop_assert!(order.iter().eq(model.order.iter()));
        prop_assert_eq!(sut.oldest_key(), model.order.back());
        prop_assert_eq!(sut.newest_key(), model.order.front());
        // 2) Occupancy never reaches the growth threshold between calls.
        if !sut.is_empty() {
            prop_assert!(sut.len() < growth_threshold(sut.bucket_count(), sut.max_load_factor()));
        }
    }

    // Every surviving key still resolves to its model value.
    for (k, v) in &model.values {
        prop_assert_eq!(sut.get(k), Some(v));
    }
    Ok(())
}

// Property: state-machine equivalence against a HashMap + VecDeque model.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected and the rejected pair comes back intact.
// - Lookup key set equals recency-order key set; sizes agree.
// - `splice` moves exactly one key to the front; `get` never reorders.
// - `pop_oldest`/`oldest_key` always agree with the model's back.
// - Growth happens exactly when an insert reaches the threshold.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(RecencyMap::new(), &pool, ops)?;
    }
}

// Property: same invariants across load factors on both sides of 1.0.
// Small factors push short scenarios through many growth switches; large
// ones keep several entries per logical bucket.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_frequent_growth(
        (pool, ops) in arb_scenario(),
        lf in 0.05f32..4.0f32
    ) {
        let sut = RecencyMap::with_config(MapConfig::new().max_load_factor(lf)).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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

// Property: same invariants under worst-case collision behavior, where
// every rebuild re-inserts bindings that all share one hash.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(RecencyMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

#[test]
fn key_hash_matches_borrowed_str() {
    // Borrowed lookups rely on Key and str hashing identically.
    let build = std::collections::hash_map::RandomState::new();
    let k = Key("abc".to_string());
    assert_eq!(build.hash_one(&k), build.hash_one("abc"));
    let mut h = build.build_hasher();
    k.hash(&mut h);
    assert_eq!(h.finish(), build.hash_one("abc"));
}
