use chd_builder::keys::read_keys_file;
use chd_builder::{
    build_with_stats, BucketOrder, ChdError, ChdParams, CollisionCheck, HashAlgorithm,
};
use clap::{Parser, ValueEnum};
use std::io::{self, BufWriter};
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One `bucket_id displacement` line per bucket
    Text,
    /// Checksummed binary container
    Binary,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Order {
    /// Smallest buckets first
    Ascending,
    /// Largest buckets first
    Descending,
}

/// Build CHD displacements for a vocabulary file.
///
/// Each line of <KEYS_FILE> is one key. Only plain ASCII keys are supported.
#[derive(Parser)]
#[command(name = "chd-builder", version)]
struct Cli {
    /// Load factor: average number of keys per bucket (1.0 to 8.0)
    #[arg(short = 'l', long, default_value_t = 5.0)]
    lambda: f64,
    /// Leeway: ratio of keys to table slots (0.01 to 1.0)
    #[arg(short = 'a', long, default_value_t = 1.0)]
    alpha: f64,
    /// Hash algorithm: jenkins or djb
    #[arg(long, default_value = "jenkins")]
    algorithm: HashAlgorithm,
    /// Largest seed tried per bucket before giving up. Ascending order often
    /// needs seeds in the millions for the last buckets
    #[arg(long, default_value_t = chd_builder::config::DEFAULT_MAX_SEED)]
    max_seed: u32,
    /// Order in which buckets are placed
    #[arg(value_enum, long, default_value_t = Order::Ascending)]
    order: Order,
    /// Only check slots against the table, not against each other within a bucket
    #[arg(long)]
    table_only: bool,
    /// Output file; text goes to stdout when omitted
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    #[arg(value_enum, long, default_value_t = Format::Text)]
    format: Format,
    /// Print per-bucket-size statistics to stderr
    #[arg(long)]
    stats: bool,
    /// Vocabulary file
    keys_file: Option<PathBuf>,
}

impl Cli {
    fn params(&self) -> ChdParams {
        ChdParams {
            lambda: self.lambda,
            alpha: self.alpha,
            algorithm: self.algorithm,
            max_seed: self.max_seed,
            order: match self.order {
                Order::Ascending => BucketOrder::Ascending,
                Order::Descending => BucketOrder::Descending,
            },
            collision_check: if self.table_only {
                CollisionCheck::TableOnly
            } else {
                CollisionCheck::Strict
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = cli.params();
    params.validate()?;
    let keys_file = cli.keys_file.as_ref().ok_or(ChdError::MissingKeySource)?;

    let keys = read_keys_file(keys_file)?;
    log::info!("Read {} keys from the input file", keys.len());

    let (table, report) = build_with_stats(&keys, &params)?;
    if !report.is_injective(keys.len()) {
        log::warn!(
            "{} keys share {} slots; the function is not injective",
            keys.len(),
            report.claimed
        );
    }
    if cli.stats {
        report.stats.print();
    }

    match (cli.format, &cli.output) {
        (Format::Text, Some(path)) => {
            table.write_text(BufWriter::new(std::fs::File::create(path)?))?
        }
        (Format::Text, None) => table.write_text(BufWriter::new(io::stdout().lock()))?,
        (Format::Binary, Some(path)) => table.save_to_file(path)?,
        (Format::Binary, None) => {
            return Err("binary output needs --output <FILE>".into());
        }
    }

    Ok(())
}
