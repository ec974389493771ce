/// Indexed access to aligned reads, backed by htslib or held in memory
pub mod alignment_store;
/// CLI functionality and checks
pub mod cli;
/// Contains the core data types: variants, pairs, counts, and the result table
pub mod data_types;
/// Candidate pair generation from a list of variants
pub mod pair_gen;
/// Counts same-read and different-read support for each variant pair
pub mod read_support;
/// Loads the two-column variant list
pub mod variant_loader;
/// Contains all the various output writer functionality
pub mod writers;
