use crate::data_types::variants::Variant;

/// Two variants on the same contig that are close enough to share reads.
/// The pair is canonical: `first <= second` under the `Variant` ordering, so it can be used directly as a table key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VariantPair {
    // NOTE: order matters here because we're deriving the comparisons
    /// The earlier variant
    first: Variant,
    /// The later variant
    second: Variant
}

impl VariantPair {
    /// Builds a canonical pair if the two variants qualify, otherwise returns None.
    /// Identical variants do qualify, they are simply distance 0 apart.
    /// # Arguments
    /// * `a` - one of the variants, order does not matter
    /// * `b` - the other variant
    /// * `max_distance` - the exclusive distance threshold
    pub fn from_nearby(a: &Variant, b: &Variant, max_distance: u64) -> Option<VariantPair> {
        if !a.is_nearby(b, max_distance) {
            return None;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Some(VariantPair {
            first: first.clone(),
            second: second.clone()
        })
    }

    pub fn first(&self) -> &Variant {
        &self.first
    }

    pub fn second(&self) -> &Variant {
        &self.second
    }

    pub fn contig(&self) -> &str {
        self.first.contig()
    }

    /// Returns the half-open region that must be fetched to see every read touching both variants.
    pub fn query_region(&self) -> (u64, u64) {
        (self.first.position(), self.second.position().saturating_add(1))
    }
}

impl std::fmt::Display for VariantPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.second.position())
    }
}
