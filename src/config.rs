//! Construction parameters.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::ChdError;
use crate::hash::HashAlgorithm;
use crate::partition::BucketOrder;

pub const MIN_LAMBDA: f64 = 1.0;
pub const MAX_LAMBDA: f64 = 8.0;
pub const MIN_ALPHA: f64 = 0.01;
pub const MAX_ALPHA: f64 = 1.0;

/// Default number of trial seeds per bucket before giving up: the whole `u32` range.
///
/// With ascending bucket order the last, fullest buckets regularly need seeds in
/// the millions or more, so a tight cap fails on ordinary inputs.
pub const DEFAULT_MAX_SEED: u32 = u32::MAX;

/// How a trial seed is checked before its slots are committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionCheck {
    /// Slots must be free in the table and pairwise distinct within the bucket.
    #[default]
    Strict,
    /// Slots must only be free in the table. Two keys of one bucket may then
    /// share a slot, and the resulting function is not injective.
    TableOnly,
}

/// Parameters for CHD construction.
///
/// While all fields are public, prefer [`ChdParams::default()`] and adjust from there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChdParams {
    /// Average number of keys per bucket; `r = floor(n / lambda)`.
    pub lambda: f64,
    /// Fill ratio of the output table; `m = floor(n / alpha)`.
    pub alpha: f64,
    pub algorithm: HashAlgorithm,
    /// Largest trial seed tried for a single bucket.
    pub max_seed: u32,
    pub order: BucketOrder,
    pub collision_check: CollisionCheck,
}

/// `lambda=5`, `alpha=1`, Jenkins hashing, ascending bucket order, strict collision checks.
impl Default for ChdParams {
    fn default() -> Self {
        Self {
            lambda: 5.0,
            alpha: 1.0,
            algorithm: HashAlgorithm::Jenkins,
            max_seed: DEFAULT_MAX_SEED,
            order: BucketOrder::Ascending,
            collision_check: CollisionCheck::Strict,
        }
    }
}

impl ChdParams {
    /// Check the parameters on their own, independent of the key count.
    pub fn validate(&self) -> Result<(), ChdError> {
        if !self.lambda.is_finite() || !(MIN_LAMBDA..=MAX_LAMBDA).contains(&self.lambda) {
            return Err(ChdError::InvalidLambda(self.lambda));
        }
        if !self.alpha.is_finite() || !(MIN_ALPHA..=MAX_ALPHA).contains(&self.alpha) {
            return Err(ChdError::InvalidAlpha(self.alpha));
        }
        if self.max_seed == 0 {
            return Err(ChdError::InvalidMaxSeed);
        }
        Ok(())
    }

    /// `r = floor(n / lambda)`.
    pub fn bucket_count(&self, n: usize) -> Result<u32, ChdError> {
        let r = (n as f64 / self.lambda).floor();
        if r < 1.0 {
            return Err(ChdError::TooFewKeys {
                keys: n,
                lambda: self.lambda,
            });
        }
        // r <= n <= m, so the table size check below covers overflow here too.
        Ok(r.min(u32::MAX as f64) as u32)
    }

    /// `m = floor(n / alpha)`.
    pub fn table_size(&self, n: usize) -> Result<u32, ChdError> {
        let m = (n as f64 / self.alpha).floor();
        if m > u32::MAX as f64 {
            return Err(ChdError::TableTooLarge {
                keys: n,
                alpha: self.alpha,
            });
        }
        Ok(m as u32)
    }

    /// Validate and compute `(r, m)` for `n` keys.
    pub fn sizes(&self, n: usize) -> Result<(u32, u32), ChdError> {
        self.validate()?;
        if n == 0 {
            return Err(ChdError::EmptyKeySet);
        }
        let m = self.table_size(n)?;
        let r = self.bucket_count(n)?;
        trace!("        keys: {n:>10}");
        trace!("     buckets: {r:>10}");
        trace!("       slots: {m:>10}");
        trace!("  real alpha: {:>10.4}", n as f64 / m as f64);
        trace!("keys/ bucket: {:>13.2}", n as f64 / r as f64);
        Ok((r, m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = ChdParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.lambda, 5.0);
        assert_eq!(params.alpha, 1.0);
        assert_eq!(params.algorithm, HashAlgorithm::Jenkins);
        assert_eq!(params.order, BucketOrder::Ascending);
        assert_eq!(params.collision_check, CollisionCheck::Strict);
        assert_eq!(params.max_seed, u32::MAX);
    }

    #[test]
    fn test_lambda_range() {
        for lambda in [0.5, 0.99, 8.01, f64::NAN, f64::INFINITY] {
            let params = ChdParams {
                lambda,
                ..Default::default()
            };
            assert!(matches!(params.validate(), Err(ChdError::InvalidLambda(_))));
        }
        for lambda in [1.0, 3.5, 8.0] {
            let params = ChdParams {
                lambda,
                ..Default::default()
            };
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn test_alpha_range() {
        for alpha in [0.0, 0.009, 1.01, -1.0, f64::NAN] {
            let params = ChdParams {
                alpha,
                ..Default::default()
            };
            assert!(matches!(params.validate(), Err(ChdError::InvalidAlpha(_))));
        }
    }

    #[test]
    fn test_zero_max_seed() {
        let params = ChdParams {
            max_seed: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(ChdError::InvalidMaxSeed)));
    }

    #[test]
    fn test_sizes() {
        let params = ChdParams {
            lambda: 3.0,
            alpha: 1.0,
            ..Default::default()
        };
        assert_eq!(params.sizes(3).unwrap(), (1, 3));

        let params = ChdParams {
            lambda: 4.0,
            alpha: 0.5,
            ..Default::default()
        };
        assert_eq!(params.sizes(10).unwrap(), (2, 20));
        assert_eq!(params.sizes(11).unwrap(), (2, 22));
    }

    #[test]
    fn test_sizes_errors() {
        let params = ChdParams::default();
        assert!(matches!(params.sizes(0), Err(ChdError::EmptyKeySet)));
        assert!(matches!(
            params.sizes(4),
            Err(ChdError::TooFewKeys { keys: 4, .. })
        ));
    }
}
