use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::genomics::{AlignmentHit, Genome, GenomicsError};

/// Preprocessed exact-match query (Knuth–Morris–Pratt).
///
/// The failure table is built once and reused for every sequence the query
/// is searched in, so scanning a sequence of length `n` costs `O(n)`.
#[derive(Debug, Clone)]
pub struct Pattern {
    needle: Arc<[u8]>,
    failure: Vec<usize>,
}

impl Pattern {
    /// Build a pattern; the query must be non-empty.
    pub fn new(query: &[u8]) -> Result<Self, GenomicsError> {
        if query.is_empty() {
            return Err(GenomicsError::InvalidQuery("query is empty".to_string()));
        }

        // failure[i]: length of the longest proper border of query[..=i]
        let mut failure = vec![0usize; query.len()];
        let mut k = 0;
        for i in 1..query.len() {
            while k > 0 && query[i] != query[k] {
                k = failure[k - 1];
            }
            if query[i] == query[k] {
                k += 1;
            }
            failure[i] = k;
        }

        Ok(Self {
            needle: Arc::from(query),
            failure,
        })
    }

    /// Query length.
    pub fn len(&self) -> usize {
        self.needle.len()
    }

    /// Always `false`; empty patterns cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Raw query symbols.
    pub fn as_bytes(&self) -> &[u8] {
        &self.needle
    }

    /// Every start position of the query in `haystack`, ascending,
    /// overlapping occurrences included.
    pub fn find_all(&self, haystack: &[u8]) -> Vec<usize> {
        let m = self.needle.len();
        let mut positions = Vec::new();
        if haystack.len() < m {
            return positions;
        }

        let mut matched = 0;
        for (i, &symbol) in haystack.iter().enumerate() {
            while matched > 0 && symbol != self.needle[matched] {
                matched = self.failure[matched - 1];
            }
            if symbol == self.needle[matched] {
                matched += 1;
            }
            if matched == m {
                positions.push(i + 1 - m);
                matched = self.failure[m - 1];
            }
        }
        positions
    }
}

/// Every start position of `query` in `sequence`, ascending, including
/// overlaps. Fails with [`GenomicsError::InvalidQuery`] for an empty query.
pub fn find_all(sequence: &[u8], query: &[u8]) -> Result<Vec<usize>, GenomicsError> {
    Ok(Pattern::new(query)?.find_all(sequence))
}

/// Align one read against every chromosome of the genome.
///
/// Hits are grouped by chromosome in ascending identifier order, positions
/// ascending within each chromosome.
pub fn align_read(genome: &Genome, read: &[u8]) -> Result<Vec<AlignmentHit>, GenomicsError> {
    let pattern = Pattern::new(read)?;
    Ok(align_pattern(genome, &pattern))
}

fn align_pattern(genome: &Genome, pattern: &Pattern) -> Vec<AlignmentHit> {
    genome
        .iter()
        .flat_map(|sequence| {
            pattern
                .find_all(sequence.symbols())
                .into_iter()
                .map(|position| AlignmentHit {
                    chrom: Arc::clone(sequence.id()),
                    position,
                })
        })
        .collect()
}

/// Align a batch of reads in parallel; one hit list per read, in read order.
///
/// The first invalid read aborts the whole batch.
pub fn align_reads<R>(genome: &Genome, reads: &[R]) -> Result<Vec<Vec<AlignmentHit>>, GenomicsError>
where
    R: AsRef<[u8]> + Sync,
{
    let hits = reads
        .par_iter()
        .map(|read| align_read(genome, read.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        reads = reads.len(),
        hits = hits.iter().map(Vec::len).sum::<usize>(),
        "aligned read batch"
    );
    Ok(hits)
}
