use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::genomics::{AlignmentHit, Genome, GenomicsError};

/// Per-base read-start counts for one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageArray {
    chrom: Arc<str>,
    counts: Vec<u32>,
}

impl CoverageArray {
    /// Zero-filled array of the given length.
    pub fn zeroed(chrom: impl Into<Arc<str>>, len: usize) -> Self {
        Self {
            chrom: chrom.into(),
            counts: vec![0; len],
        }
    }

    /// Wrap existing counts.
    pub fn from_counts(chrom: impl Into<Arc<str>>, counts: Vec<u32>) -> Self {
        Self {
            chrom: chrom.into(),
            counts,
        }
    }

    /// Chromosome name.
    pub fn chrom(&self) -> &Arc<str> {
        &self.chrom
    }

    /// Counts indexed by 0-based position.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Chromosome length.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the chromosome has zero length.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all cells, i.e. the number of hits on this chromosome.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    fn increment(&mut self, position: usize) -> Result<(), GenomicsError> {
        let length = self.counts.len();
        match self.counts.get_mut(position) {
            Some(cell) => {
                *cell = cell
                    .checked_add(1)
                    .ok_or_else(|| GenomicsError::CountOverflow {
                        chrom: Arc::clone(&self.chrom),
                        position,
                    })?;
                Ok(())
            }
            None => Err(GenomicsError::OutOfRangeHit {
                chrom: Arc::clone(&self.chrom),
                position,
                length,
            }),
        }
    }
}

/// A single pileup record: `(chromosome, position, count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PileupRecord<'a> {
    /// Chromosome name.
    pub chrom: &'a str,
    /// 0-based position.
    pub position: usize,
    /// Number of hits starting at the position.
    pub count: u32,
}

/// Coverage arrays for a whole genome, one per chromosome, in ascending
/// identifier order.
///
/// Every chromosome of the genome is present, including those that never
/// receive a hit; array lengths always equal chromosome lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pileup {
    arrays: Vec<CoverageArray>,
    index: HashMap<Arc<str>, usize>,
}

impl Pileup {
    /// Zero-filled pileup pre-sized from the genome.
    pub fn new(genome: &Genome) -> Self {
        let arrays = genome
            .iter()
            .map(|seq| CoverageArray::zeroed(Arc::clone(seq.id()), seq.len()))
            .collect();
        Self::indexed(arrays)
    }

    /// Accumulate a stream of hits against the genome.
    pub fn from_hits<'h, I>(genome: &Genome, hits: I) -> Result<Self, GenomicsError>
    where
        I: IntoIterator<Item = &'h AlignmentHit>,
    {
        let mut pileup = Self::new(genome);
        let mut added = 0usize;
        for hit in hits {
            pileup.add(hit)?;
            added += 1;
        }
        debug!(hits = added, chromosomes = pileup.len(), "pileup accumulated");
        Ok(pileup)
    }

    /// Rebuild a pileup from externally supplied arrays.
    pub fn from_arrays(mut arrays: Vec<CoverageArray>) -> Result<Self, GenomicsError> {
        arrays.sort_by(|a, b| a.chrom.cmp(&b.chrom));
        if let Some(pair) = arrays.windows(2).find(|pair| pair[0].chrom == pair[1].chrom) {
            return Err(GenomicsError::DuplicateSequence(Arc::clone(&pair[0].chrom)));
        }
        Ok(Self::indexed(arrays))
    }

    fn indexed(arrays: Vec<CoverageArray>) -> Self {
        let index = arrays
            .iter()
            .enumerate()
            .map(|(idx, array)| (Arc::clone(&array.chrom), idx))
            .collect();
        Self { arrays, index }
    }

    /// Count one hit.
    pub fn add(&mut self, hit: &AlignmentHit) -> Result<(), GenomicsError> {
        let idx = *self
            .index
            .get(&hit.chrom)
            .ok_or_else(|| GenomicsError::UnknownChromosome(Arc::clone(&hit.chrom)))?;
        self.arrays[idx].increment(hit.position)
    }

    /// Coverage for one chromosome.
    pub fn get(&self, chrom: &str) -> Result<&CoverageArray, GenomicsError> {
        self.index
            .get(chrom)
            .map(|&idx| &self.arrays[idx])
            .ok_or_else(|| GenomicsError::UnknownChromosome(Arc::from(chrom)))
    }

    /// Arrays in ascending chromosome order.
    pub fn iter(&self) -> impl Iterator<Item = &CoverageArray> {
        self.arrays.iter()
    }

    /// Arrays in ascending chromosome order, as a slice.
    pub fn arrays(&self) -> &[CoverageArray] {
        &self.arrays
    }

    /// Every base of every chromosome as a pileup record.
    pub fn records(&self) -> impl Iterator<Item = PileupRecord<'_>> {
        self.arrays.iter().flat_map(|array| {
            array
                .counts
                .iter()
                .enumerate()
                .map(move |(position, &count)| PileupRecord {
                    chrom: array.chrom.as_ref(),
                    position,
                    count,
                })
        })
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the pileup covers no chromosomes.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Total hits over all chromosomes.
    pub fn total(&self) -> u64 {
        self.arrays.iter().map(CoverageArray::total).sum()
    }
}
