use serde::Serialize;

#[derive(Default, Clone, Serialize, Debug, PartialEq, Eq)]
pub struct Row {
    pub buckets: usize,
    pub elements: usize,
    pub elements_max: usize,
    pub seed_sum: u64,
    pub seed_max: u32,
}

impl Row {
    fn add(&mut self, bucket_len: usize, seed: u32) {
        self.buckets += 1;
        self.elements += bucket_len;
        self.elements_max = self.elements_max.max(bucket_len);
        self.seed_sum += u64::from(seed);
        self.seed_max = self.seed_max.max(seed);
    }
}

/// Displacement statistics, grouped by bucket size.
#[derive(Default, Serialize, Debug, Clone)]
pub struct SolveStats {
    by_bucket_len: Vec<Row>,
}

impl SolveStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a bucket of `bucket_len` keys took `seed`.
    pub fn add(&mut self, bucket_len: usize, seed: u32) {
        if self.by_bucket_len.len() <= bucket_len {
            self.by_bucket_len.resize(bucket_len + 1, Row::default());
        }
        self.by_bucket_len[bucket_len].add(bucket_len, seed);
    }

    pub fn buckets(&self) -> usize {
        self.by_bucket_len.iter().map(|r| r.buckets).sum()
    }

    pub fn max_seed(&self) -> u32 {
        self.by_bucket_len.iter().map(|r| r.seed_max).max().unwrap_or(0)
    }

    /// Total number of seeds tried over all buckets.
    pub fn trials(&self) -> u64 {
        self.by_bucket_len.iter().map(|r| r.seed_sum).sum()
    }

    /// Rows indexed by bucket size.
    pub fn by_bucket_len(&self) -> &[Row] {
        &self.by_bucket_len
    }

    pub fn print(&self) {
        eprintln!();
        Self::print_rows(&self.by_bucket_len);
        eprintln!();
    }

    fn print_rows(rows: &[Row]) {
        let b_total = rows.iter().map(|r| r.buckets).sum::<usize>();
        let n = rows.iter().map(|r| r.elements).sum::<usize>();

        eprintln!(
            "{:>4}  {:>11} {:>7} {:>6} {:>6} {:>6} {:>10} {:>10}",
            "sz", "cnt", "bucket%", "cuml%", "elem%", "cuml%", "avg seed", "max seed"
        );
        let mut bucket_cuml = 0;
        let mut elem_cuml = 0;
        for row in rows.iter().filter(|r| r.buckets > 0) {
            bucket_cuml += row.buckets;
            elem_cuml += row.elements;
            eprintln!(
                "{:>4}: {:>11} {:>7.2} {:>6.2} {:>6.2} {:>6.2} {:>10.1} {:>10}",
                row.elements_max,
                row.buckets,
                row.buckets as f32 / b_total as f32 * 100.,
                bucket_cuml as f32 / b_total as f32 * 100.,
                row.elements as f32 / n.max(1) as f32 * 100.,
                elem_cuml as f32 / n.max(1) as f32 * 100.,
                row.seed_sum as f32 / row.buckets as f32,
                row.seed_max,
            );
        }
        let sum_seeds = rows.iter().map(|r| r.seed_sum).sum::<u64>();
        let max_seed = rows.iter().map(|r| r.seed_max).max().unwrap_or(0);
        eprintln!(
            "{:>4}: {:>11} {:>7.2} {:>6.2} {:>6.2} {:>6.2} {:>10.1} {:>10}",
            "",
            b_total,
            100.,
            100.,
            100.,
            100.,
            sum_seeds as f32 / b_total.max(1) as f32,
            max_seed
        );
    }
}
