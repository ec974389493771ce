use crate::data_types::support_counts::SupportCounts;
use crate::data_types::variant_pair::VariantPair;

use std::collections::BTreeMap;

/// Collection of per-pair results that always iterates in canonical pair order,
/// regardless of the order in which results were added.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PairTable {
    /// Sorted by the derived `VariantPair` ordering
    rows: BTreeMap<VariantPair, SupportCounts>
}

impl PairTable {
    pub fn new() -> PairTable {
        Self::default()
    }

    /// Stores the counts for a pair, replacing any previous entry for an identical pair.
    pub fn insert(&mut self, pair: VariantPair, counts: SupportCounts) {
        self.rows.insert(pair, counts);
    }

    pub fn get(&self, pair: &VariantPair) -> Option<&SupportCounts> {
        self.rows.get(pair)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over all rows in ascending (contig1, pos1, contig2, pos2) order
    pub fn iter(&self) -> impl Iterator<Item = (&VariantPair, &SupportCounts)> {
        self.rows.iter()
    }
}

impl Extend<(VariantPair, SupportCounts)> for PairTable {
    fn extend<T: IntoIterator<Item = (VariantPair, SupportCounts)>>(&mut self, iter: T) {
        for (pair, counts) in iter {
            self.insert(pair, counts);
        }
    }
}

impl FromIterator<(VariantPair, SupportCounts)> for PairTable {
    fn from_iter<T: IntoIterator<Item = (VariantPair, SupportCounts)>>(iter: T) -> Self {
        let mut table = PairTable::new();
        table.extend(iter);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::variants::Variant;

    fn pair(contig: &str, p1: u64, p2: u64) -> VariantPair {
        VariantPair::from_nearby(
            &Variant::new(contig.to_string(), p1),
            &Variant::new(contig.to_string(), p2),
            500
        ).unwrap()
    }

    #[test]
    fn test_ordered_iteration() {
        let table: PairTable = vec![
            (pair("chr2", 10, 20), SupportCounts::new(1, 0)),
            (pair("chr1", 300, 200), SupportCounts::new(2, 0)),
            (pair("chr1", 100, 200), SupportCounts::new(3, 0))
        ].into_iter().collect();

        let keys: Vec<&VariantPair> = table.iter().map(|(p, _c)| p).collect();
        assert_eq!(keys, vec![&pair("chr1", 100, 200), &pair("chr1", 200, 300), &pair("chr2", 10, 20)]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut table = PairTable::new();
        assert!(table.is_empty());
        table.insert(pair("chr1", 100, 200), SupportCounts::new(1, 1));
        table.insert(pair("chr1", 200, 100), SupportCounts::new(4, 0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&pair("chr1", 100, 200)), Some(&SupportCounts::new(4, 0)));
    }
}
