//! # ChIP-seq peak calling from exact read alignments
//!
//! A small, deterministic pipeline:
//!
//! 1. **Alignment**: every exact (possibly overlapping) occurrence of each
//!    read in every chromosome of the reference
//! 2. **Pileup**: per-base counts of alignment starts, one array per chromosome
//! 3. **Smoothing**: three-point moving average with two-point edges
//! 4. **Segmentation**: maximal runs strictly above a threshold that are
//!    wider than a minimum width
//!
//! Chromosomes are always processed and reported in ascending identifier
//! order, so identical inputs give byte-identical output.
//!
//! ## Usage Example
//!
//! ```
//! use peakscan::genomics::{DuplicatePolicy, Genome};
//! use peakscan::{PeakCaller, PipelineConfig};
//!
//! let genome = Genome::from_records([("chr1", "ACGTACGT")], DuplicatePolicy::Reject)?;
//! let caller = PeakCaller::new(PipelineConfig::new(0.5, 1)?);
//! let result = caller.run(&genome, &["ACG", "CGT"])?;
//! assert_eq!(result.pileup.get("chr1")?.counts(), &[1, 1, 0, 0, 1, 1, 0, 0]);
//! # Ok::<(), peakscan::genomics::GenomicsError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod genomics; // Genome store, matcher, pileup, smoothing, segmentation

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use genomics::{
    align_reads, find_regions, smooth, AlignmentHit, CoverageArray, Genome, GenomicsError,
    Pileup, Region, RegionParams,
};

/// Configuration parameters for peak calling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Threshold and minimum width applied to smoothed coverage.
    pub params: RegionParams,

    /// Skip chromosomes shorter than the smoothing window instead of failing.
    pub skip_short_sequences: bool,
}

impl PipelineConfig {
    /// Validate threshold and minimum width.
    pub fn new(threshold: f64, min_width: i64) -> Result<Self, GenomicsError> {
        Ok(Self::from_params(RegionParams::new(threshold, min_width)?))
    }

    /// Configuration from already validated parameters.
    pub fn from_params(params: RegionParams) -> Self {
        Self {
            params,
            skip_short_sequences: false,
        }
    }

    /// Skip (with a warning) chromosomes of length 0 or 1.
    pub fn with_skip_short_sequences(mut self, enabled: bool) -> Self {
        self.skip_short_sequences = enabled;
        self
    }
}

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Hits per read, in read order.
    pub hits: Vec<Vec<AlignmentHit>>,

    /// Coverage arrays for every chromosome of the genome.
    pub pileup: Pileup,

    /// Called regions, chromosomes ascending, starts ascending.
    pub regions: Vec<Region>,
}

impl PipelineResult {
    /// Total number of alignment hits over all reads.
    pub fn hit_count(&self) -> usize {
        self.hits.iter().map(Vec::len).sum()
    }

    /// Digest of the rendered region table.
    pub fn fingerprint(&self) -> blake3::Hash {
        fingerprint_regions(&self.regions)
    }
}

/// `blake3` digest of regions rendered as `chrom,start,end` lines.
pub fn fingerprint_regions(regions: &[Region]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for region in regions {
        hasher.update(format!("{region}\n").as_bytes());
    }
    hasher.finalize()
}

/// Pipeline driver: alignment, pileup, smoothing and segmentation.
#[derive(Debug, Clone)]
pub struct PeakCaller {
    config: PipelineConfig,
}

impl PeakCaller {
    /// Create a new driver.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Align `reads`, accumulate the pileup and call regions.
    ///
    /// Reads are aligned in parallel; the hits are then counted by a single
    /// reducer so the pileup never needs shared mutable state.
    pub fn run<R>(&self, genome: &Genome, reads: &[R]) -> Result<PipelineResult, GenomicsError>
    where
        R: AsRef<[u8]> + Sync,
    {
        let hits = align_reads(genome, reads)?;
        let pileup = Pileup::from_hits(genome, hits.iter().flatten())?;
        let regions = self.call_regions(&pileup)?;

        let result = PipelineResult {
            hits,
            pileup,
            regions,
        };
        info!(
            reads = reads.len(),
            hits = result.hit_count(),
            regions = result.regions.len(),
            "pipeline finished"
        );
        Ok(result)
    }

    /// Smooth and segment every chromosome of the pileup.
    pub fn call_regions(&self, pileup: &Pileup) -> Result<Vec<Region>, GenomicsError> {
        let per_chromosome = pileup
            .arrays()
            .par_iter()
            .map(|array| self.call_chromosome(array))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(per_chromosome.into_iter().flatten().collect())
    }

    fn call_chromosome(&self, array: &CoverageArray) -> Result<Vec<Region>, GenomicsError> {
        if array.len() < 2 {
            if self.config.skip_short_sequences {
                warn!(
                    chrom = %array.chrom(),
                    len = array.len(),
                    "skipping chromosome too short to smooth"
                );
                return Ok(Vec::new());
            }
            return Err(GenomicsError::InvalidInput {
                chrom: Some(Arc::clone(array.chrom())),
                len: array.len(),
            });
        }

        let smoothed = smooth(array.counts())?;
        let params = self.config.params;
        let spans = find_regions(&smoothed, params.threshold(), params.min_width())?;
        debug!(chrom = %array.chrom(), regions = spans.len(), "chromosome segmented");

        Ok(spans
            .into_iter()
            .map(|span| Region::new(Arc::clone(array.chrom()), span))
            .collect())
    }
}
