use std::str::FromStr;

/// Largest accepted position; a pair query ends one base past its second variant and htslib coordinates are `i64`
pub const MAX_POSITION: u64 = i64::MAX as u64 - 1;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum VariantParseError {
    #[error("expected 2 whitespace-separated tokens (contig, position), found {found}")]
    TokenCount { found: usize },
    #[error("position must be a base-10 integer from 0 to {}, found {token:?}", MAX_POSITION)]
    InvalidPosition { token: String },
    #[error("line is not valid UTF-8")]
    NotUtf8
}

/// A single point variant of interest.
/// The coordinate is 0-based and must match the coordinate system of the alignment file.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Variant {
    // NOTE: order matters here because we're deriving the comparisons
    /// The contig (chromosome) the variant is on
    contig: String,
    /// The coordinate of the variant, 0-based
    position: u64
}

impl Variant {
    /// Creates a new variant
    /// # Arguments
    /// * `contig` - the contig name
    /// * `position` - the 0-based position on the contig
    pub fn new(contig: String, position: u64) -> Variant {
        Variant {
            contig,
            position
        }
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the absolute distance in base pairs between two variants, ignoring contigs.
    pub fn distance(&self, other: &Variant) -> u64 {
        self.position.abs_diff(other.position)
    }

    /// Returns true if `other` is on the same contig and strictly closer than `max_distance`.
    /// # Arguments
    /// * `other` - the variant to compare against
    /// * `max_distance` - the exclusive distance threshold
    pub fn is_nearby(&self, other: &Variant, max_distance: u64) -> bool {
        self.contig == other.contig && self.distance(other) < max_distance
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.contig, self.position)
    }
}

impl FromStr for Variant {
    type Err = VariantParseError;

    /// Parses a `<contig> <position>` line; any amount of whitespace may separate the tokens.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let (contig, position) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(c), Some(p), None) => (c, p),
            (c, p, extra) => {
                let found = [c, p, extra].iter().filter(|t| t.is_some()).count() + tokens.count();
                return Err(VariantParseError::TokenCount { found });
            }
        };

        // u64 parsing also rejects a leading '-'
        let position: u64 = match position.parse() {
            Ok(p) if p <= MAX_POSITION => p,
            _ => return Err(VariantParseError::InvalidPosition { token: position.to_string() })
        };

        Ok(Variant::new(contig.to_string(), position))
    }
}
