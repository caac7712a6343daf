use std::ops::Range;

use bitvec::prelude::*;

use crate::genomics::GenomicsError;

/// Validated segmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionParams {
    threshold: f64,
    min_width: usize,
}

impl RegionParams {
    /// Validate a threshold and a (signed) minimum width.
    ///
    /// The threshold must be finite and non-negative; the width must be
    /// non-negative.
    pub fn new(threshold: f64, min_width: i64) -> Result<Self, GenomicsError> {
        let threshold = check_threshold(threshold)?;
        let min_width = usize::try_from(min_width)
            .map_err(|_| GenomicsError::parameter("min_width", min_width))?;
        Ok(Self {
            threshold,
            min_width,
        })
    }

    /// Positions must be strictly greater than this to be "above".
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Runs must be strictly wider than this to be kept.
    pub fn min_width(&self) -> usize {
        self.min_width
    }
}

fn check_threshold(threshold: f64) -> Result<f64, GenomicsError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(threshold)
    } else {
        Err(GenomicsError::parameter("threshold", threshold))
    }
}

/// Maximal runs of positions strictly above `threshold` that are wider than
/// `min_width`, as ascending half-open ranges.
pub fn find_regions<T>(
    values: &[T],
    threshold: f64,
    min_width: usize,
) -> Result<Vec<Range<usize>>, GenomicsError>
where
    T: Copy + Into<f64>,
{
    let threshold = check_threshold(threshold)?;
    let above: BitVec = values.iter().map(|&v| v.into() > threshold).collect();

    let mut regions = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = above[cursor..].first_one() {
        let start = cursor + offset;
        let end = above[start..]
            .first_zero()
            .map_or(above.len(), |run| start + run);
        if end - start > min_width {
            regions.push(start..end);
        }
        cursor = end;
    }
    Ok(regions)
}
