use std::fmt;
use std::ops::Range;
use std::sync::Arc;

#[cfg(feature = "serialize")]
use serde::Serialize;

/// Start of an exact read match on a chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct AlignmentHit {
    /// Reference contig/chromosome name.
    pub chrom: Arc<str>,
    /// 0-based leftmost reference coordinate.
    pub position: usize,
}

impl AlignmentHit {
    /// Construct a new hit.
    pub fn new(chrom: impl Into<Arc<str>>, position: usize) -> Self {
        Self {
            chrom: chrom.into(),
            position,
        }
    }
}

impl fmt::Display for AlignmentHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.chrom, self.position)
    }
}

/// Called peak: a half-open interval `[start, end)` on a chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Region {
    /// Chromosome/contig name.
    pub chrom: Arc<str>,
    /// First position inside the region.
    pub start: usize,
    /// One past the last position inside the region.
    pub end: usize,
}

impl Region {
    /// Construct a region from a chromosome name and a position range.
    pub fn new(chrom: impl Into<Arc<str>>, span: Range<usize>) -> Self {
        Self {
            chrom: chrom.into(),
            start: span.start,
            end: span.end,
        }
    }

    /// Number of positions covered.
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// Interval as a range.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.chrom, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_span_is_half_open() {
        let region = Region::new("chr1", 3..9);
        assert_eq!(region.width(), 6);
        assert_eq!(region.span(), 3..9);
        assert_eq!(region.to_string(), "chr1,3,9");
    }

    #[test]
    fn hit_renders_as_csv_row() {
        assert_eq!(AlignmentHit::new("chrX", 42).to_string(), "chrX,42");
    }
}
