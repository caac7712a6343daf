use std::sync::Arc;

use thiserror::Error;

/// Errors raised by the peak-calling core.
///
/// Every variant is fatal to the run that produced it; the context carried
/// by each variant is meant to be enough to locate the offending input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomicsError {
    /// Structurally invalid record stream (genome, pileup or table input).
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number of the offending record.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Sequence identifier seen twice while duplicates are rejected.
    #[error("duplicate sequence identifier '{0}'")]
    DuplicateSequence(Arc<str>),

    /// Reference to an identifier that is not part of the genome.
    #[error("unknown chromosome '{0}'")]
    UnknownChromosome(Arc<str>),

    /// Search query that cannot be matched (e.g. empty).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Alignment hit outside its chromosome.
    #[error("hit at position {position} is outside chromosome '{chrom}' of length {length}")]
    OutOfRangeHit {
        /// Chromosome named by the hit.
        chrom: Arc<str>,
        /// Offending 0-based position.
        position: usize,
        /// Length of the chromosome.
        length: usize,
    },

    /// Coverage cell already at its maximum count.
    #[error("coverage count overflow at position {position} of chromosome '{chrom}'")]
    CountOverflow {
        /// Chromosome of the saturated cell.
        chrom: Arc<str>,
        /// 0-based position of the saturated cell.
        position: usize,
    },

    /// Array too short for the smoothing window.
    #[error("cannot smooth {}: length {len} < 2", .chrom.as_deref().unwrap_or("array"))]
    InvalidInput {
        /// Chromosome the array belongs to, when known.
        chrom: Option<Arc<str>>,
        /// Observed length.
        len: usize,
    },

    /// Parameter outside its permitted domain.
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value, rendered for display.
        value: String,
    },
}

impl GenomicsError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        GenomicsError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn parameter(name: &'static str, value: impl ToString) -> Self {
        GenomicsError::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}
