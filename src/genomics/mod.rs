//! Genomics building blocks of the peak-calling pipeline.
//!
//! Stages, leaves first: genome store, exact matcher, pileup accumulator,
//! smoothing filter and region segmenter. Plain-text encodings and the
//! synthetic read generator live alongside them.

mod error;
mod genome;
pub mod io;
mod matcher;
mod pileup;
mod segmenter;
mod simulate;
mod smoothing;
mod types;

pub use error::GenomicsError;
pub use genome::{DuplicatePolicy, FastaParser, Genome, Sequence};
pub use io::{render_regions, HitReader};
pub use matcher::{align_read, align_reads, find_all, Pattern};
pub use pileup::{CoverageArray, Pileup, PileupRecord};
pub use segmenter::{find_regions, RegionParams};
pub use simulate::{PeakSite, ReadSimulator, SimulationConfig};
pub use smoothing::smooth;
pub use types::{AlignmentHit, Region};
