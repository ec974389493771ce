
/// Ordered collection of per-pair results
pub mod pair_table;
/// Read support counts and the counting modes that produce them
pub mod support_counts;
/// Canonical pair of nearby variants
pub mod variant_pair;
/// Contains the Variant type and its line parser
pub mod variants;
