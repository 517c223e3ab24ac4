//! First level of the construction: split the keys into buckets and fix the
//! order in which the solver visits them.

use serde::{Deserialize, Serialize};

use crate::hash::SeededHash;

/// Seed of the first-level (bucket) hash.
pub const BUCKET_SEED: u32 = 0;

/// A group of keys sharing one displacement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket id in `[0, r)`. Always carried explicitly, never inferred from position.
    pub id: u32,
    /// Indices into the key sequence, in input order.
    pub keys: Vec<usize>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Order in which buckets are handed to the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketOrder {
    /// Smallest buckets first. This is the historical behaviour of the tool.
    #[default]
    Ascending,
    /// Largest buckets first, while the table is still empty.
    Descending,
}

/// Assign every key to one of `r` buckets via `hash_mod(key, 0, r)`.
///
/// The returned vector is indexed by bucket id and has exactly `r` entries,
/// some possibly empty. `r` must be non-zero.
pub fn partition<H: SeededHash, K: AsRef<[u8]>>(keys: &[K], r: u32) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = (0..r)
        .map(|id| Bucket {
            id,
            keys: Vec::new(),
        })
        .collect();
    for (index, key) in keys.iter().enumerate() {
        let id = H::hash_mod(key.as_ref(), BUCKET_SEED, r);
        buckets[id as usize].keys.push(index);
    }
    buckets
}

/// Sort buckets by size. The sort is stable, so equal-sized buckets keep their relative order.
pub fn order_buckets(buckets: &mut [Bucket], order: BucketOrder) {
    match order {
        BucketOrder::Ascending => buckets.sort_by_key(|b| b.len()),
        BucketOrder::Descending => buckets.sort_by_key(|b| std::cmp::Reverse(b.len())),
    }
}
