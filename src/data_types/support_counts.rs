use rustc_hash::FxHashSet as HashSet;

/// Controls how the two read-name sets of a pair are reduced to counts.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CountingMode {
    /// Only reads covering the first variant are counted.
    /// same = |first ∩ second|, diff = |first \ second|; reads that only cover the second variant are ignored.
    #[default]
    Asymmetric,
    /// Reads covering either variant are counted.
    /// same = |first ∩ second|, diff = |first △ second|
    Symmetric
}

/// Read support for a single variant pair
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SupportCounts {
    /// Reads that cover both variants
    same_read: u64,
    /// Reads that cover only one variant, which one depends on the `CountingMode`
    diff_read: u64
}

impl SupportCounts {
    pub fn new(same_read: u64, diff_read: u64) -> SupportCounts {
        SupportCounts {
            same_read,
            diff_read
        }
    }

    /// Reduces the sets of read names covering each variant into counts.
    /// # Arguments
    /// * `covering_first` - names of reads covering the first variant of the pair
    /// * `covering_second` - names of reads covering the second variant of the pair
    /// * `mode` - the counting contract to apply
    pub fn from_read_sets(covering_first: &HashSet<String>, covering_second: &HashSet<String>, mode: CountingMode) -> SupportCounts {
        let same_read: usize = covering_first.intersection(covering_second).count();
        let first_only: usize = covering_first.len() - same_read;
        let diff_read: usize = match mode {
            CountingMode::Asymmetric => first_only,
            CountingMode::Symmetric => first_only + (covering_second.len() - same_read)
        };
        SupportCounts::new(same_read as u64, diff_read as u64)
    }

    pub fn same_read(&self) -> u64 {
        self.same_read
    }

    pub fn diff_read(&self) -> u64 {
        self.diff_read
    }

    /// Always `same_read + diff_read`
    pub fn total(&self) -> u64 {
        self.same_read + self.diff_read
    }
}
