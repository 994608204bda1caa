//! Collections facade: small-size-optimized vectors and maps/sets with a
//! fast, consistent hasher.

pub use smallvec::SmallVec;

pub mod hashmap {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, foldhash::fast::RandomState>;
}

pub mod hashset {
    pub type HashSet<T> = hashbrown::HashSet<T, foldhash::fast::RandomState>;
}
