//! Binary container for displacement tables
//!
//! Features:
//! - Format versioning for safe evolution
//! - Checksum validation for data integrity
//! - Atomic writes to prevent corruption

use crate::error::ChdError;
use crate::hash::HashAlgorithm;
use crate::table::DisplacementTable;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Current format version - increment when format changes
const FORMAT_VERSION: u32 = 1;

/// Magic number to identify our file format
const MAGIC: &[u8; 8] = b"CHDDISP1";

/// File format header
#[derive(Debug, Serialize, Deserialize)]
struct FileHeader {
    /// Magic number for format identification
    magic: [u8; 8],
    /// Format version for compatibility checking
    version: u32,
    /// Length of the data section in bytes
    data_len: u64,
    /// CRC32 checksum of data section
    checksum: u32,
    /// Number of buckets in the table
    bucket_count: u64,
    /// Hash algorithm the displacements were computed with
    algorithm: HashAlgorithm,
}

impl FileHeader {
    fn new(data_len: u64, checksum: u32, table: &DisplacementTable) -> Self {
        Self {
            magic: *MAGIC,
            version: FORMAT_VERSION,
            data_len,
            checksum,
            bucket_count: table.bucket_count() as u64,
            algorithm: table.algorithm(),
        }
    }

    fn validate(&self) -> Result<(), ChdError> {
        if &self.magic != MAGIC {
            return Err(ChdError::CorruptTable(format!(
                "Invalid file format: expected magic {:?}, got {:?}",
                MAGIC, self.magic
            )));
        }

        if self.version != FORMAT_VERSION {
            return Err(ChdError::CorruptTable(format!(
                "Incompatible format version: expected {}, got {}",
                FORMAT_VERSION, self.version
            )));
        }

        Ok(())
    }
}

/// Writer for atomic file operations
pub struct AtomicWriter {
    temp_path: std::path::PathBuf,
    final_path: std::path::PathBuf,
    writer: BufWriter<File>,
}

impl AtomicWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ChdError> {
        let final_path = path.as_ref().to_path_buf();
        let temp_path = final_path.with_extension("tmp");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        Ok(Self {
            temp_path,
            final_path,
            writer: BufWriter::new(file),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), ChdError> {
        self.writer.write_all(data)?;
        Ok(())
    }

    /// Flush, sync and rename the temp file over the final path.
    pub fn commit(mut self) -> Result<(), ChdError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        std::fs::rename(&self.temp_path, &self.final_path)?;
        Ok(())
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        // Removes the temp file if commit wasn't called; a no-op after the rename.
        let _ = std::fs::remove_file(&self.temp_path);
    }
}

pub fn calculate_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Write a table with full integrity protection
pub fn write_with_integrity<P: AsRef<Path>>(
    path: P,
    table: &DisplacementTable,
) -> Result<(), ChdError> {
    let data_bytes = bincode::serialize(table)?;
    let checksum = calculate_checksum(&data_bytes);
    let header = FileHeader::new(data_bytes.len() as u64, checksum, table);
    let header_bytes = bincode::serialize(&header)?;

    let mut writer = AtomicWriter::new(path)?;
    writer.write_all(&header_bytes)?;
    writer.write_all(&data_bytes)?;
    writer.commit()?;

    Ok(())
}

/// Read a table with full integrity validation
pub fn read_with_validation<P: AsRef<Path>>(path: P) -> Result<DisplacementTable, ChdError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let header: FileHeader = bincode::deserialize_from(&mut reader)?;
    header.validate()?;

    let mut data_bytes = Vec::new();
    reader.read_to_end(&mut data_bytes)?;

    if data_bytes.len() as u64 != header.data_len {
        return Err(ChdError::CorruptTable(format!(
            "Data length mismatch: header says {}, got {}",
            header.data_len,
            data_bytes.len()
        )));
    }

    let actual_checksum = calculate_checksum(&data_bytes);
    if actual_checksum != header.checksum {
        return Err(ChdError::CorruptTable(format!(
            "Checksum mismatch: expected {}, got {}",
            header.checksum, actual_checksum
        )));
    }

    let table: DisplacementTable = bincode::deserialize(&data_bytes)?;

    if table.bucket_count() as u64 != header.bucket_count || table.algorithm() != header.algorithm
    {
        return Err(ChdError::CorruptTable(format!(
            "Header/data mismatch: header says {} buckets ({}), got {} buckets ({})",
            header.bucket_count,
            header.algorithm,
            table.bucket_count(),
            table.algorithm()
        )));
    }

    Ok(table)
}
