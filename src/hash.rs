//! Seeded 32-bit string hashes used by both levels of the construction.
//!
//! Two hashers are provided:
//! - [`Jenkins`]: lookup3-style mixing over 12-byte blocks. This is the default.
//! - [`Djb`]: Bernstein's `c * 33 + byte`. Fast, but weak for similar keys.
//!
//! Both produce a [`HashTriple`]; only `c` is ever reduced into a bucket or slot.
//! Keys are expected to be plain ASCII.
//!
//! The hasher is chosen once through [`HashAlgorithm`] and then used as a type
//! parameter, so the inner loops never branch on the algorithm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChdError;

/// The three 32-bit accumulators left behind by a hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashTriple {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl HashTriple {
    fn splat(seed: u32) -> Self {
        Self {
            a: seed,
            b: seed,
            c: seed,
        }
    }
}

/// A seeded hash over key bytes.
///
/// Implementations must be pure: the same key and seed always give the same triple.
pub trait SeededHash: Copy + Default + Send + Sync + fmt::Debug {
    /// The selector value naming this hasher.
    const ALGORITHM: HashAlgorithm;

    fn hash(key: &[u8], seed: u32) -> HashTriple;

    /// `hash(key, seed).c % modulus`. `modulus` must be non-zero.
    #[inline(always)]
    fn hash_mod(key: &[u8], seed: u32, modulus: u32) -> u32 {
        Self::hash(key, seed).c % modulus
    }
}

/// Closed set of supported hash algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Jenkins,
    Djb,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Jenkins => "jenkins",
            HashAlgorithm::Djb => "djb",
        }
    }

    /// Hash with the selected algorithm. Prefer the [`SeededHash`] types in loops.
    pub fn hash(self, key: &[u8], seed: u32) -> HashTriple {
        match self {
            HashAlgorithm::Jenkins => Jenkins::hash(key, seed),
            HashAlgorithm::Djb => Djb::hash(key, seed),
        }
    }

    pub fn hash_mod(self, key: &[u8], seed: u32, modulus: u32) -> u32 {
        self.hash(key, seed).c % modulus
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ChdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jenkins" => Ok(HashAlgorithm::Jenkins),
            "djb" => Ok(HashAlgorithm::Djb),
            _ => Err(ChdError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Bob Jenkins' lookup3-style hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct Jenkins;

/// Number of tail bytes folded into `a`, `b` and `c`, indexed by the tail length.
const TAIL_FOLD: [[usize; 3]; 12] = [
    [0, 0, 0],
    [1, 0, 0],
    [2, 0, 0],
    [3, 0, 0],
    [4, 0, 0],
    [4, 1, 0],
    [4, 2, 0],
    [4, 3, 0],
    [4, 4, 0],
    [4, 4, 1],
    [4, 4, 2],
    [4, 4, 3],
];

/// Little-endian value of up to 4 bytes.
#[inline(always)]
fn fold_le(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, &b)| acc.wrapping_add(u32::from(b) << (8 * i)))
}

#[inline(always)]
fn block(chunk: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([chunk[at], chunk[at + 1], chunk[at + 2], chunk[at + 3]])
}

#[rustfmt::skip]
#[inline(always)]
fn mix(h: &mut HashTriple) {
    let HashTriple { a, b, c } = h;
    *a = a.wrapping_sub(*c); *a ^= c.rotate_left(4);  *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a); *b ^= a.rotate_left(6);  *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b); *c ^= b.rotate_left(8);  *b = b.wrapping_add(*a);
    *a = a.wrapping_sub(*c); *a ^= c.rotate_left(16); *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a); *b ^= a.rotate_left(19); *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b); *c ^= b.rotate_left(4);  *b = b.wrapping_add(*a);
}

#[rustfmt::skip]
#[inline(always)]
fn final_mix(h: &mut HashTriple) {
    let HashTriple { a, b, c } = h;
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c; *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a; *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c; *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a; *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(24));
}

impl SeededHash for Jenkins {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Jenkins;

    fn hash(key: &[u8], seed: u32) -> HashTriple {
        let mut h = HashTriple::splat(seed);
        let mut chunks = key.chunks_exact(12);
        for chunk in &mut chunks {
            h.a = h.a.wrapping_add(block(chunk, 0));
            h.b = h.b.wrapping_add(block(chunk, 4));
            h.c = h.c.wrapping_add(block(chunk, 8));
            mix(&mut h);
        }

        let tail = chunks.remainder();
        // An empty tail keeps the accumulators as they are, including the seed of an empty key.
        if tail.is_empty() {
            return h;
        }
        let [na, nb, nc] = TAIL_FOLD[tail.len()];
        let (ta, rest) = tail.split_at(na);
        let (tb, tc) = rest.split_at(nb);
        debug_assert_eq!(tc.len(), nc);
        h.a = h.a.wrapping_add(fold_le(ta));
        h.b = h.b.wrapping_add(fold_le(tb));
        h.c = h.c.wrapping_add(fold_le(tc));
        final_mix(&mut h);
        h
    }
}

/// Bernstein's hash. Only `c` is updated; `a` and `b` stay at the seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Djb;

impl SeededHash for Djb {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Djb;

    fn hash(key: &[u8], seed: u32) -> HashTriple {
        let mut h = HashTriple::splat(seed);
        for &byte in key {
            h.c = (h.c << 5).wrapping_add(h.c).wrapping_add(u32::from(byte));
        }
        h
    }
}
