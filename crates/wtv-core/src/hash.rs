//! Fast hash map and hash set type aliases.
//!
//! These use the Fx hash algorithm from `rustc-hash`, which is noticeably
//! faster than the standard library's SipHash for short string keys.
//!
//! Fx-hashed collections have no stable iteration order. Anything whose order
//! reaches emitted output uses [`indexmap::IndexMap`] instead; these aliases are
//! only for lookups (scopes, seen-sets).
//!
//! # Examples
//!
//! ```
//! use wtv_core::{FxHashMap, FxHashSet};
//!
//! let mut map: FxHashMap<String, i32> = FxHashMap::default();
//! map.insert("key".to_owned(), 42);
//!
//! let set: FxHashSet<&str> = FxHashSet::default();
//! assert!(set.is_empty());
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;
