use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChdError {
    #[error("lambda must be between 1.0 and 8.0, got {0}")]
    InvalidLambda(f64),

    #[error("alpha must be between 0.01 and 1.0, got {0}")]
    InvalidAlpha(f64),

    #[error("max_seed must be at least 1")]
    InvalidMaxSeed,

    #[error("Unknown hash algorithm: {0} (expected 'jenkins' or 'djb')")]
    UnknownAlgorithm(String),

    #[error("Empty key set provided")]
    EmptyKeySet,

    #[error("{keys} keys with lambda={lambda} leave no buckets")]
    TooFewKeys { keys: usize, lambda: f64 },

    #[error("{keys} keys with alpha={alpha} need more than u32::MAX slots")]
    TableTooLarge { keys: usize, alpha: f64 },

    #[error("Key {index} is not plain ASCII")]
    NonAsciiKey { index: usize },

    #[error("Line {line} of the keys file is not plain ASCII")]
    NonAsciiLine { line: usize },

    #[error("A keys file is mandatory")]
    MissingKeySource,

    #[error("Keys {first} and {second} are identical and can never get distinct slots")]
    DuplicateKey { first: usize, second: usize },

    #[error(
        "No displacement found for bucket {bucket_id} ({bucket_size} keys) within {max_seed} \
         seeds; {claimed}/{table_size} slots claimed. Ascending order can need very large \
         seeds: raise max_seed, use descending order, or lower alpha or lambda"
    )]
    SearchExhausted {
        bucket_id: u32,
        bucket_size: usize,
        claimed: usize,
        table_size: usize,
        max_seed: u32,
    },

    #[error("Corrupt displacement table: {0}")]
    CorruptTable(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
