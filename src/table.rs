//! The output of a construction run: one displacement per bucket.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::error::ChdError;
use crate::hash::HashAlgorithm;

/// Displacement chosen for one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketDisplacement {
    pub bucket_id: u32,
    pub displacement: u32,
}

/// Per-bucket displacements together with the sizes needed to re-apply them.
///
/// Entries are kept in the order the buckets were solved, which is generally
/// not ascending by id. Always index by [`BucketDisplacement::bucket_id`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplacementTable {
    algorithm: HashAlgorithm,
    key_count: usize,
    table_size: u32,
    entries: Vec<BucketDisplacement>,
}

impl DisplacementTable {
    pub fn new(
        algorithm: HashAlgorithm,
        key_count: usize,
        table_size: u32,
        entries: Vec<BucketDisplacement>,
    ) -> Self {
        Self {
            algorithm,
            key_count,
            table_size,
            entries,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of keys, `n`.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of buckets, `r`.
    pub fn bucket_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of output slots, `m`.
    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    /// Entries in solve order.
    pub fn entries(&self) -> &[BucketDisplacement] {
        &self.entries
    }

    /// `(bucket id, displacement)` pairs in solve order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().map(|e| (e.bucket_id, e.displacement))
    }

    /// Displacement of the bucket with id `bucket_id`.
    pub fn displacement(&self, bucket_id: u32) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.bucket_id == bucket_id)
            .map(|e| e.displacement)
    }

    /// Displacements indexed by bucket id.
    ///
    /// Entries whose id is not below [`Self::bucket_count`] are skipped, and
    /// ids without an entry stay `0`.
    pub fn to_dense(&self) -> Vec<u32> {
        let mut dense = vec![0; self.entries.len()];
        for e in &self.entries {
            if let Some(slot) = dense.get_mut(e.bucket_id as usize) {
                *slot = e.displacement;
            }
        }
        dense
    }

    /// Check that the bucket ids are exactly `0..r`.
    pub(crate) fn check_ids(&self) -> Result<(), ChdError> {
        let r = self.entries.len();
        let mut seen = vec![false; r];
        for e in &self.entries {
            let id = e.bucket_id as usize;
            if id >= r || seen[id] {
                return Err(ChdError::CorruptTable(format!(
                    "bucket id {} is out of range or repeated ({} buckets)",
                    e.bucket_id, r
                )));
            }
            seen[id] = true;
        }
        Ok(())
    }

    /// Write one `bucket_id displacement` line per bucket, in solve order.
    pub fn write_text<W: Write>(&self, mut writer: W) -> Result<(), ChdError> {
        for (bucket_id, displacement) in self.pairs() {
            writeln!(writer, "{} {}", bucket_id, displacement)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Save the table to a file with integrity protection.
    ///
    /// Format versioning, CRC32 checksum and an atomic rename are handled by
    /// the persistence layer.
    ///
    /// ```no_run
    /// # use chd_builder::ChdBuilder;
    /// let table = ChdBuilder::new().keys(["a", "b", "c"]).lambda(1.0).build()?;
    /// table.save_to_file("table.bin")?;
    /// # Ok::<(), chd_builder::ChdError>(())
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ChdError> {
        crate::persistence::write_with_integrity(path, self)
    }

    /// Load a table written by [`DisplacementTable::save_to_file`].
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File format is invalid or corrupted
    /// - Version is incompatible
    /// - Checksum doesn't match
    /// - Bucket ids are not exactly `0..r`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChdError> {
        let table = crate::persistence::read_with_validation(path)?;
        table.check_ids()?;
        Ok(table)
    }
}
