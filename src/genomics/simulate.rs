use std::sync::Arc;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serialize")]
use serde::Serialize;
use tracing::debug;

use crate::genomics::{Genome, GenomicsError, Sequence};

/// Binding site used to enrich simulated reads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct PeakSite {
    /// Chromosome carrying the site.
    pub chrom: Arc<str>,
    /// 0-based center of the site.
    pub center: usize,
    /// Enrichment relative to a background of one read per base.
    pub amplitude: f64,
}

impl PeakSite {
    /// Construct a new peak site.
    pub fn new(chrom: impl Into<Arc<str>>, center: usize, amplitude: f64) -> Self {
        Self {
            chrom: chrom.into(),
            center,
            amplitude,
        }
    }
}

/// Parameters of the read simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Length of every generated read.
    pub read_length: usize,
    /// Mean length of sheared fragments.
    pub fragment_length: usize,
    /// Number of reads to generate.
    pub reads: usize,
    /// RNG seed; identical seeds give identical reads.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            read_length: 38,
            fragment_length: 100,
            reads: 500,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Configuration with explicit read and fragment lengths.
    pub fn new(read_length: usize, fragment_length: usize) -> Result<Self, GenomicsError> {
        if read_length == 0 {
            return Err(GenomicsError::parameter("read_length", read_length));
        }
        if fragment_length < read_length {
            return Err(GenomicsError::parameter("fragment_length", fragment_length));
        }
        Ok(Self {
            read_length,
            fragment_length,
            ..Self::default()
        })
    }

    /// Set the number of reads.
    pub fn with_reads(mut self, reads: usize) -> Self {
        self.reads = reads;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Source<'g> {
    Background,
    Peak { sequence: &'g Sequence, center: usize },
}

/// Generates single-stranded ChIP-seq style reads from a genome.
///
/// Each read is drawn either from the background (uniform over every start
/// where a full read fits) or from a peak site. Background carries weight
/// one per start position and a peak carries `amplitude * fragment_length`.
/// Peak reads start a geometric distance (mean half a fragment) upstream or
/// downstream of the center, clamped so the read stays on the chromosome.
#[derive(Debug)]
pub struct ReadSimulator<'g> {
    config: SimulationConfig,
    sources: Vec<Source<'g>>,
    weights: WeightedIndex<f64>,
    // (cumulative start count, sequence) for chromosomes that fit a read
    background: Vec<(usize, &'g Sequence)>,
    shear_p: f64,
    rng: StdRng,
}

impl<'g> ReadSimulator<'g> {
    /// Validate peak sites against the genome and prepare the sampler.
    pub fn new(
        genome: &'g Genome,
        peaks: &[PeakSite],
        config: SimulationConfig,
    ) -> Result<Self, GenomicsError> {
        let read_len = config.read_length;
        if read_len == 0 {
            return Err(GenomicsError::parameter("read_length", read_len));
        }
        if config.fragment_length < read_len {
            return Err(GenomicsError::parameter(
                "fragment_length",
                config.fragment_length,
            ));
        }

        let mut background = Vec::new();
        let mut total_starts = 0usize;
        for sequence in genome.iter().filter(|seq| seq.len() >= read_len) {
            total_starts += sequence.len() - read_len + 1;
            background.push((total_starts, sequence));
        }

        let mut sources = vec![Source::Background];
        let mut weights = vec![total_starts as f64];
        for peak in peaks {
            let sequence = genome.get(&peak.chrom)?;
            if peak.center >= sequence.len() {
                return Err(GenomicsError::OutOfRangeHit {
                    chrom: Arc::clone(&peak.chrom),
                    position: peak.center,
                    length: sequence.len(),
                });
            }
            if sequence.len() < read_len {
                return Err(GenomicsError::parameter("read_length", read_len));
            }
            if !(peak.amplitude.is_finite() && peak.amplitude >= 0.0) {
                return Err(GenomicsError::parameter("amplitude", peak.amplitude));
            }
            sources.push(Source::Peak {
                sequence,
                center: peak.center,
            });
            weights.push(peak.amplitude * config.fragment_length as f64);
        }

        let weights = WeightedIndex::new(&weights)
            .map_err(|err| GenomicsError::parameter("sampling weights", err))?;

        let mean_offset = config.fragment_length as f64 / 2.0;
        debug!(
            peaks = peaks.len(),
            background_starts = total_starts,
            "read simulator ready"
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            shear_p: 1.0 / (mean_offset + 1.0),
            config,
            sources,
            weights,
            background,
        })
    }

    /// Draw one read.
    pub fn sample(&mut self) -> &'g [u8] {
        let (sequence, start) = self.draw();
        &sequence.symbols()[start..start + self.config.read_length]
    }

    /// Draw the configured number of reads.
    pub fn sample_reads(&mut self) -> Vec<&'g [u8]> {
        (0..self.config.reads).map(|_| self.sample()).collect()
    }

    // Chromosome and start of the next read.
    fn draw(&mut self) -> (&'g Sequence, usize) {
        let read_len = self.config.read_length;
        let source = self.sources[self.weights.sample(&mut self.rng)];
        match source {
            Source::Background => self.background_start(),
            Source::Peak { sequence, center } => {
                let offset = self.shear_offset();
                let start = if self.rng.random_bool(0.5) {
                    center.saturating_sub(offset)
                } else {
                    center.saturating_add(offset)
                };
                (sequence, start.min(sequence.len() - read_len))
            }
        }
    }

    fn background_start(&mut self) -> (&'g Sequence, usize) {
        // Zero background weight means this branch is never sampled.
        let total = self.background.last().map_or(0, |&(cum, _)| cum);
        let k = self.rng.random_range(0..total);
        let idx = self.background.partition_point(|&(cum, _)| cum <= k);
        let (cum, sequence) = self.background[idx];
        let first = cum - (sequence.len() - self.config.read_length + 1);
        (sequence, k - first)
    }

    // Geometric number of failures before the first success, by inversion.
    fn shear_offset(&mut self) -> usize {
        let u: f64 = self.rng.random();
        ((1.0 - u).ln() / (1.0 - self.shear_p).ln()).floor() as usize
    }
}
