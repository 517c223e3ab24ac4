//! Second level of the construction: find a displacement seed for every bucket.
//!
//! Buckets are placed one at a time against a shared [`OccupancyTable`]. For a
//! bucket, trial seeds `1, 2, ...` are tried in turn; seed `l` maps key `k` to
//! slot `hash_mod(k, l, m)`. The first seed whose slots are all free (and, with
//! [`CollisionCheck::Strict`], pairwise distinct) is accepted and its slots are
//! claimed. A bucket that finds nothing up to `max_seed` aborts the whole run.
//!
//! Empty buckets accept seed `1` immediately.

use log::{trace, warn};
use std::marker::PhantomData;

use crate::config::{ChdParams, CollisionCheck};
use crate::error::ChdError;
use crate::hash::SeededHash;
use crate::occupancy::OccupancyTable;
use crate::partition::Bucket;
use crate::stats::SolveStats;
use crate::table::BucketDisplacement;

/// Outcome of the seed search for one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedSearch {
    Found(u32),
    Exhausted,
}

/// Result of placing every bucket.
#[derive(Debug, Clone)]
pub struct Solution {
    /// One entry per bucket, in solve order.
    pub displacements: Vec<BucketDisplacement>,
    pub stats: SolveStats,
    /// Number of distinct slots claimed. Equals the key count unless
    /// [`CollisionCheck::TableOnly`] let two keys share a slot.
    pub claimed: usize,
}

pub struct Solver<'k, H: SeededHash, K: AsRef<[u8]>> {
    keys: &'k [K],
    table: OccupancyTable,
    table_size: u32,
    max_seed: u32,
    collision_check: CollisionCheck,
    /// Slots of the current trial.
    slots: Vec<u32>,
    scratch: Vec<u32>,
    _hash: PhantomData<H>,
}

impl<'k, H: SeededHash, K: AsRef<[u8]>> Solver<'k, H, K> {
    /// `table_size` must be non-zero.
    pub fn new(keys: &'k [K], table_size: u32, params: &ChdParams) -> Self {
        Self {
            keys,
            table: OccupancyTable::new(table_size as usize),
            table_size,
            max_seed: params.max_seed,
            collision_check: params.collision_check,
            slots: Vec::new(),
            scratch: Vec::new(),
            _hash: PhantomData,
        }
    }

    pub fn table(&self) -> &OccupancyTable {
        &self.table
    }

    /// Compute the slots of `bucket` under `seed` into `self.slots` and check them.
    ///
    /// The table is only read here, so every key is checked against the same state.
    fn try_seed(&mut self, bucket: &Bucket, seed: u32) -> bool {
        self.slots.clear();
        for &k in &bucket.keys {
            let slot = H::hash_mod(self.keys[k].as_ref(), seed, self.table_size);
            if self.table.is_claimed(slot) {
                return false;
            }
            self.slots.push(slot);
        }
        match self.collision_check {
            CollisionCheck::TableOnly => true,
            CollisionCheck::Strict => self.slots_distinct(),
        }
    }

    fn slots_distinct(&mut self) -> bool {
        if self.slots.len() < 2 {
            return true;
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.slots);
        self.scratch.sort_unstable();
        self.scratch.windows(2).all(|w| w[0] != w[1])
    }

    /// Find the smallest seed in `1..=max_seed` accepted for `bucket`.
    ///
    /// Does not modify the table. On `Found`, the accepted slots are left in `self.slots`.
    pub fn search(&mut self, bucket: &Bucket) -> SeedSearch {
        for seed in 1..=self.max_seed {
            if self.try_seed(bucket, seed) {
                return SeedSearch::Found(seed);
            }
        }
        SeedSearch::Exhausted
    }

    /// Identical keys always land on the same slot, so no seed can separate them.
    fn check_duplicates(&self, bucket: &Bucket) -> Result<(), ChdError> {
        if bucket.len() < 2 {
            return Ok(());
        }
        let mut ids = bucket.keys.clone();
        ids.sort_by(|&x, &y| self.keys[x].as_ref().cmp(self.keys[y].as_ref()).then(x.cmp(&y)));
        for w in ids.windows(2) {
            if self.keys[w[0]].as_ref() == self.keys[w[1]].as_ref() {
                return Err(ChdError::DuplicateKey {
                    first: w[0].min(w[1]),
                    second: w[0].max(w[1]),
                });
            }
        }
        Ok(())
    }

    /// Search a seed for `bucket` and claim its slots.
    pub fn place(&mut self, bucket: &Bucket) -> Result<u32, ChdError> {
        if self.collision_check == CollisionCheck::Strict {
            self.check_duplicates(bucket)?;
        }
        trace!("  Trying for bucket={} ...", bucket.id);
        match self.search(bucket) {
            SeedSearch::Found(seed) => {
                debug_assert!(self.table.can_claim(&self.slots));
                self.table.commit(&self.slots);
                trace!("    Found l={}", seed);
                Ok(seed)
            }
            SeedSearch::Exhausted => {
                warn!(
                    "bucket {} with {} keys: no seed up to {} ({}/{} slots claimed)",
                    bucket.id,
                    bucket.len(),
                    self.max_seed,
                    self.table.claimed(),
                    self.table.len()
                );
                Err(ChdError::SearchExhausted {
                    bucket_id: bucket.id,
                    bucket_size: bucket.len(),
                    claimed: self.table.claimed(),
                    table_size: self.table.len(),
                    max_seed: self.max_seed,
                })
            }
        }
    }

    /// Place all `buckets` in the given order.
    pub fn solve(mut self, buckets: &[Bucket]) -> Result<Solution, ChdError> {
        let mut stats = SolveStats::new();
        let mut displacements = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            let seed = self.place(bucket)?;
            stats.add(bucket.len(), seed);
            displacements.push(BucketDisplacement {
                bucket_id: bucket.id,
                displacement: seed,
            });
        }

        let claimed = self.table.claimed();
        if claimed < self.keys.len() {
            warn!(
                "only {} slots claimed for {} keys: some keys share a slot",
                claimed,
                self.keys.len()
            );
        }
        Ok(Solution {
            displacements,
            stats,
            claimed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Djb, Jenkins};
    use crate::partition::{order_buckets, partition, BucketOrder};

    fn params(max_seed: u32, collision_check: CollisionCheck) -> ChdParams {
        ChdParams {
            max_seed,
            collision_check,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_bucket_gets_seed_one() {
        let keys: [&str; 0] = [];
        let mut solver = Solver::<Jenkins, _>::new(&keys, 4, &ChdParams::default());
        let bucket = Bucket {
            id: 3,
            keys: vec![],
        };
        assert_eq!(solver.search(&bucket), SeedSearch::Found(1));
        assert_eq!(solver.place(&bucket).unwrap(), 1);
        assert_eq!(solver.table().claimed(), 0);
    }

    #[test]
    fn test_djb_first_seed() {
        // djb(x, l) = 33 * l + x for a single byte x.
        let keys = ["a", "e", "b"];
        let mut solver = Solver::<Djb, _>::new(&keys, 8, &ChdParams::default());
        let bucket = Bucket {
            id: 1,
            keys: vec![0, 1],
        };
        let seed = solver.place(&bucket).unwrap();
        assert_eq!(seed, 1);
        assert!(solver.table().is_claimed((33 + 97) % 8));
        assert!(solver.table().is_claimed((33 + 101) % 8));
        assert_eq!(solver.table().claimed(), 2);
    }

    #[test]
    fn test_skips_claimed_slots() {
        let keys = ["a"];
        let mut solver = Solver::<Djb, _>::new(&keys, 8, &ChdParams::default());
        // Seeds 1 and 2 map "a" to 2 and 3; claim both through other buckets.
        solver.table.commit(&[2, 3]);
        let bucket = Bucket {
            id: 0,
            keys: vec![0],
        };
        let seed = solver.place(&bucket).unwrap();
        assert_eq!(seed, 3);
        assert!(solver.table().is_claimed((3 * 33 + 97) % 8));
    }

    #[test]
    fn test_exhaustion_is_reported() {
        let keys = ["a"];
        let mut solver = Solver::<Djb, _>::new(&keys, 2, &params(5, CollisionCheck::Strict));
        solver.table.commit(&[0, 1]);
        let bucket = Bucket {
            id: 7,
            keys: vec![0],
        };
        assert_eq!(solver.search(&bucket), SeedSearch::Exhausted);
        match solver.place(&bucket) {
            Err(ChdError::SearchExhausted {
                bucket_id,
                bucket_size,
                claimed,
                table_size,
                max_seed,
            }) => {
                assert_eq!(bucket_id, 7);
                assert_eq!(bucket_size, 1);
                assert_eq!(claimed, 2);
                assert_eq!(table_size, 2);
                assert_eq!(max_seed, 5);
            }
            other => panic!("expected SearchExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_intra_bucket_collision() {
        // "a" and "i" differ by 8, so they share a slot mod 8 under every seed.
        let keys = ["a", "i"];
        let bucket = Bucket {
            id: 0,
            keys: vec![0, 1],
        };

        let mut strict = Solver::<Djb, _>::new(&keys, 8, &params(50, CollisionCheck::Strict));
        assert_eq!(strict.search(&bucket), SeedSearch::Exhausted);

        let mut loose = Solver::<Djb, _>::new(&keys, 8, &params(50, CollisionCheck::TableOnly));
        assert_eq!(loose.place(&bucket).unwrap(), 1);
        assert_eq!(loose.table().claimed(), 1);
    }

    #[test]
    fn test_duplicate_keys() {
        let keys = ["x", "y", "x"];
        let bucket = Bucket {
            id: 0,
            keys: vec![0, 1, 2],
        };
        let mut strict = Solver::<Jenkins, _>::new(&keys, 16, &ChdParams::default());
        assert!(matches!(
            strict.place(&bucket),
            Err(ChdError::DuplicateKey { first: 0, second: 2 })
        ));

        let mut loose =
            Solver::<Jenkins, _>::new(&keys, 16, &params(1000, CollisionCheck::TableOnly));
        assert!(loose.place(&bucket).is_ok());
        assert!(loose.table().claimed() <= 2);
    }

    #[test]
    fn test_solve_places_every_key_once() {
        let keys: Vec<String> = (0..2000).map(|i| format!("key-{:04x}", i)).collect();
        let params = ChdParams {
            lambda: 4.0,
            alpha: 0.9,
            ..Default::default()
        };
        let (r, m) = params.sizes(keys.len()).unwrap();
        let mut buckets = partition::<Jenkins, _>(&keys, r);
        order_buckets(&mut buckets, BucketOrder::Descending);

        let solution = Solver::<Jenkins, _>::new(&keys, m, &params)
            .solve(&buckets)
            .unwrap();
        assert_eq!(solution.claimed, keys.len());
        assert_eq!(solution.displacements.len(), r as usize);
        assert_eq!(solution.stats.buckets(), r as usize);

        let mut seen = vec![false; m as usize];
        for (bucket, d) in buckets.iter().zip(&solution.displacements) {
            assert_eq!(bucket.id, d.bucket_id);
            for &k in &bucket.keys {
                let slot = Jenkins::hash_mod(keys[k].as_bytes(), d.displacement, m) as usize;
                assert!(!seen[slot]);
                seen[slot] = true;
            }
        }
    }
}
