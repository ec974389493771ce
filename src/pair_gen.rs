use crate::data_types::variant_pair::VariantPair;
use crate::data_types::variants::Variant;

use log::debug;

/// Pairs are only generated for variants strictly closer than this many base pairs
pub const DEFAULT_MAX_DISTANCE: u64 = 500;

/// The candidate generation approach; both return the same pairs, only the cost differs
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PairStrategy {
    /// Compares every combination of loaded variants, quadratic in the number of variants
    #[default]
    AllPairs,
    /// Sorts the variants and only compares those inside the distance window
    Windowed
}

/// Generates every candidate pair from the loaded variants.
/// Each combination of two list entries is considered once, so duplicated entries produce duplicate pairs.
/// # Arguments
/// * `variants` - the variants in load order
/// * `max_distance` - the exclusive distance threshold
/// * `strategy` - which generation approach to use
pub fn generate_pairs(variants: &[Variant], max_distance: u64, strategy: PairStrategy) -> Vec<VariantPair> {
    let pairs: Vec<VariantPair> = match strategy {
        PairStrategy::AllPairs => all_pairs(variants, max_distance),
        PairStrategy::Windowed => windowed_pairs(variants, max_distance)
    };
    debug!("Generated {} candidate pairs from {} variants with {} strategy", pairs.len(), variants.len(), strategy);
    pairs
}

/// Compares every combination (i, j) with i < j.
pub fn all_pairs(variants: &[Variant], max_distance: u64) -> Vec<VariantPair> {
    let mut pairs: Vec<VariantPair> = vec![];
    for (i, v1) in variants.iter().enumerate() {
        for v2 in variants[(i+1)..].iter() {
            if let Some(pair) = VariantPair::from_nearby(v1, v2, max_distance) {
                pairs.push(pair);
            }
        }
    }
    pairs
}

/// Sorts a copy of the variants and only compares each one against the following variants on the same contig
/// that are within `max_distance`.
pub fn windowed_pairs(variants: &[Variant], max_distance: u64) -> Vec<VariantPair> {
    let mut sorted_variants: Vec<&Variant> = variants.iter().collect();
    sorted_variants.sort();

    let mut pairs: Vec<VariantPair> = vec![];
    for (i, v1) in sorted_variants.iter().enumerate() {
        for v2 in sorted_variants[(i+1)..].iter() {
            // sorted by contig then position, so the first miss closes the window
            match VariantPair::from_nearby(v1, v2, max_distance) {
                Some(pair) => pairs.push(pair),
                None => break
            };
        }
    }
    pairs
}
