//! recency-map: a single-threaded hash map that keeps its entries in
//! most-recently-touched order, the ordering substrate of an LRU cache.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) keyed access plus O(1) recency bookkeeping, with the
//!   eviction decision left to the caller.
//! - Layers:
//!   - RecencyList<K, V>: doubly-linked sequence stored in a `SlotMap`;
//!     nodes are addressed by generational keys that survive any
//!     reordering and never alias after removal.
//!   - RecencyMap<K, V, S>: public API. A `hashbrown::HashTable` of
//!     slot keys indexes the list by key hash.
//!
//! Constraints
//! - Single-threaded: no locks or atomics. The map is `Send` but never
//!   `Sync`; share it behind one `Mutex` or shard by key.
//! - Unique keys; a duplicate insert fails and hands the pair back.
//! - `get` is not a touch. Callers that want LRU semantics follow it with
//!   `splice`.
//! - The map never evicts. `oldest_key`/`pop_oldest` expose the candidate.
//!
//! Growth switch
//! - Bucket capacity is tracked explicitly as a power of two. When an
//!   insert brings occupancy to `bucket_count * max_load_factor`, a new
//!   index is built at the next sufficient bucket count from the stored
//!   per-entry hashes, the new binding is added to it, and it replaces
//!   the active index in one assignment. List nodes are never touched, so
//!   every slot key stays valid across the switch.
//! - `K: Hash` runs once per insert or lookup, never during a rebuild.
//!
//! Reentrancy
//! - Probing calls `K: Eq`, hashing calls `S: BuildHasher`. Public entry
//!   points hold a debug-only guard and a nested call from user code
//!   panics instead of observing a half-linked list.
//!
//! Value ownership
//! - Values are stored as given and only ever returned or dropped by the
//!   map's own removal paths. Store `Rc<T>` or `&'a T` to keep ownership
//!   with the caller.

pub mod config;
mod recency_list;
pub mod recency_map;
mod recency_map_proptest;
mod reentrancy;

// Public surface
pub use config::{ConfigError, MapConfig};
pub use recency_map::{InsertError, RecencyMap};
