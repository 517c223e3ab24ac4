use log::info;
use std::time::Instant;

use crate::config::{ChdParams, CollisionCheck};
use crate::error::ChdError;
use crate::hash::{Djb, HashAlgorithm, Jenkins, SeededHash};
use crate::partition::{order_buckets, partition, BucketOrder};
use crate::solver::{Solution, Solver};
use crate::stats::SolveStats;
use crate::table::DisplacementTable;
use crate::util::log_duration;

/// Details of a construction run beyond the table itself.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub stats: SolveStats,
    /// Distinct slots claimed. Less than the key count only with
    /// [`CollisionCheck::TableOnly`], in which case some keys share a slot.
    pub claimed: usize,
}

impl BuildReport {
    /// Whether every key got its own slot.
    pub fn is_injective(&self, key_count: usize) -> bool {
        self.claimed == key_count
    }
}

/// Build the displacement table for `keys`.
///
/// # Errors
///
/// - Configuration errors for out-of-range parameters, an empty key set, too
///   few keys for a single bucket, or non-ASCII keys.
/// - [`ChdError::DuplicateKey`] for identical keys under [`CollisionCheck::Strict`].
/// - [`ChdError::SearchExhausted`] when some bucket finds no seed up to `max_seed`.
pub fn build<K: AsRef<[u8]>>(
    keys: &[K],
    params: &ChdParams,
) -> Result<DisplacementTable, ChdError> {
    build_with_stats(keys, params).map(|(table, _)| table)
}

/// Version of [`build`] that also returns construction statistics.
pub fn build_with_stats<K: AsRef<[u8]>>(
    keys: &[K],
    params: &ChdParams,
) -> Result<(DisplacementTable, BuildReport), ChdError> {
    let overall_start = Instant::now();
    let (r, m) = params.sizes(keys.len())?;
    if let Some(index) = keys.iter().position(|k| !k.as_ref().is_ascii()) {
        return Err(ChdError::NonAsciiKey { index });
    }
    info!("Getting buckets r={} m={} n={}...", r, m, keys.len());

    // The hasher is fixed here; everything below is monomorphized on it.
    let solution = match params.algorithm {
        HashAlgorithm::Jenkins => run::<Jenkins, K>(keys, r, m, params)?,
        HashAlgorithm::Djb => run::<Djb, K>(keys, r, m, params)?,
    };

    info!(
        "Placed {} buckets, {}/{} slots claimed, max seed {}",
        solution.displacements.len(),
        solution.claimed,
        m,
        solution.stats.max_seed()
    );
    log_duration("total build", overall_start);

    let table = DisplacementTable::new(params.algorithm, keys.len(), m, solution.displacements);
    Ok((
        table,
        BuildReport {
            stats: solution.stats,
            claimed: solution.claimed,
        },
    ))
}

fn run<H: SeededHash, K: AsRef<[u8]>>(
    keys: &[K],
    r: u32,
    m: u32,
    params: &ChdParams,
) -> Result<Solution, ChdError> {
    let start = Instant::now();
    let mut buckets = partition::<H, K>(keys, r);
    order_buckets(&mut buckets, params.order);
    let start = log_duration("buckets", start);

    let solution = Solver::<H, K>::new(keys, m, params).solve(&buckets)?;
    log_duration("displace", start);
    Ok(solution)
}

/// Builder for constructing displacement tables.
#[derive(Clone, Debug, Default)]
pub struct ChdBuilder {
    keys: Vec<Vec<u8>>,
    params: ChdParams,
}

impl ChdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        Self::new().keys(iter)
    }

    pub fn key<K: AsRef<[u8]>>(mut self, key: K) -> Self {
        self.keys.push(key.as_ref().to_vec());
        self
    }

    pub fn keys<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.keys.extend(iter.into_iter().map(|k| k.as_ref().to_vec()));
        self
    }

    pub fn params(mut self, params: ChdParams) -> Self {
        self.params = params;
        self
    }

    pub fn lambda(mut self, lambda: f64) -> Self {
        self.params.lambda = lambda;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.params.alpha = alpha;
        self
    }

    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.params.algorithm = algorithm;
        self
    }

    pub fn max_seed(mut self, max_seed: u32) -> Self {
        self.params.max_seed = max_seed;
        self
    }

    pub fn order(mut self, order: BucketOrder) -> Self {
        self.params.order = order;
        self
    }

    pub fn collision_check(mut self, collision_check: CollisionCheck) -> Self {
        self.params.collision_check = collision_check;
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn build(self) -> Result<DisplacementTable, ChdError> {
        build(&self.keys, &self.params)
    }

    pub fn build_with_stats(self) -> Result<(DisplacementTable, BuildReport), ChdError> {
        build_with_stats(&self.keys, &self.params)
    }
}
