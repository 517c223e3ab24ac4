//! # chd-builder
//!
//! Build-time construction of a **CHD (Compress-Hash-Displace) perfect hash
//! function** for a fixed set of ASCII string keys.
//!
//! ## How it works
//!
//! - `n` keys are split into `r = floor(n / lambda)` buckets by `hash(key, 0) % r`
//! - Buckets are sorted by size (ascending by default)
//! - Each bucket gets the smallest seed `l >= 1` such that `hash(key, l) % m`
//!   lands every key of the bucket on a free slot of a table with
//!   `m = floor(n / alpha)` slots
//! - The output is one `(bucket id, displacement)` pair per bucket
//!
//! Looking a key up later means re-applying the same two hashes with the stored
//! displacement of its bucket. That lookup path is not part of this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use chd_builder::{ChdBuilder, HashAlgorithm};
//!
//! let table = ChdBuilder::new()
//!     .keys(["apple", "banana", "cherry", "date", "elderberry", "fig"])
//!     .lambda(2.0)
//!     .alpha(0.5)
//!     .algorithm(HashAlgorithm::Jenkins)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.bucket_count(), 3);
//! assert_eq!(table.table_size(), 12);
//! for (bucket, displacement) in table.pairs() {
//!     println!("{} {}", bucket, displacement);
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod hash;
pub mod keys;
pub mod occupancy;
pub mod partition;
pub mod solver;
pub mod stats;
pub mod table;

mod persistence;
mod util;

pub use builder::{build, build_with_stats, BuildReport, ChdBuilder};
pub use config::{ChdParams, CollisionCheck};
pub use error::ChdError;
pub use hash::{Djb, HashAlgorithm, HashTriple, Jenkins, SeededHash};
pub use partition::{Bucket, BucketOrder};
pub use table::{BucketDisplacement, DisplacementTable};

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> Vec<&'static str> {
        vec![
            "apple",
            "banana",
            "cherry",
            "date",
            "elderberry",
            "fig",
            "grape",
            "honeydew",
            "kiwi",
            "lemon",
            "mango",
            "nectarine",
        ]
    }

    fn fruit_params(order: BucketOrder) -> ChdParams {
        ChdParams {
            lambda: 3.0,
            alpha: 0.5,
            order,
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_build() {
        let table = build(&fruits(), &fruit_params(BucketOrder::Ascending)).unwrap();

        assert_eq!(table.key_count(), 12);
        assert_eq!(table.bucket_count(), 4);
        assert_eq!(table.table_size(), 24);
        assert_eq!(table.algorithm(), HashAlgorithm::Jenkins);
    }

    #[test]
    fn test_ascending_displacements() {
        let table = build(&fruits(), &fruit_params(BucketOrder::Ascending)).unwrap();
        let pairs: Vec<_> = table.pairs().collect();
        assert_eq!(pairs, vec![(0, 1), (1, 1), (3, 1), (2, 32)]);
    }

    #[test]
    fn test_descending_displacements() {
        let table = build(&fruits(), &fruit_params(BucketOrder::Descending)).unwrap();
        let pairs: Vec<_> = table.pairs().collect();
        assert_eq!(pairs, vec![(2, 1), (3, 2), (1, 3), (0, 1)]);
    }

    #[test]
    fn test_every_bucket_in_output() {
        let table = build(&fruits(), &fruit_params(BucketOrder::Ascending)).unwrap();
        let mut ids: Vec<u32> = table.entries().iter().map(|e| e.bucket_id).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_builder_matches_free_function() {
        let from_fn = build(&fruits(), &fruit_params(BucketOrder::Ascending)).unwrap();
        let from_builder = ChdBuilder::with_keys(fruits())
            .params(fruit_params(BucketOrder::Ascending))
            .build()
            .unwrap();
        assert_eq!(from_fn, from_builder);
    }

    #[test]
    fn test_empty_key_set() {
        let keys: Vec<String> = vec![];
        assert!(matches!(
            build(&keys, &ChdParams::default()),
            Err(ChdError::EmptyKeySet)
        ));
    }

    #[test]
    fn test_invalid_params_before_keys() {
        let params = ChdParams {
            alpha: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            build(&fruits(), &params),
            Err(ChdError::InvalidAlpha(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let table = build(&fruits(), &fruit_params(BucketOrder::Ascending)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fruits.chd");

        table.save_to_file(&path).unwrap();
        let loaded = DisplacementTable::load_from_file(&path).unwrap();

        assert_eq!(loaded, table);
        assert_eq!(loaded.displacement(2), Some(32));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = DisplacementTable::load_from_file("/tmp/nonexistent_chd_table_12345.bin");
        assert!(matches!(result, Err(ChdError::IoError(_))));
    }
}
