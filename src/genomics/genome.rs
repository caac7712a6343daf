use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::genomics::GenomicsError;

/// Policy applied when a sequence identifier occurs more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with [`GenomicsError::DuplicateSequence`].
    #[default]
    Reject,
    /// Keep the last record seen for the identifier.
    Overwrite,
}

/// Named, immutable symbol sequence (usually one chromosome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    id: Arc<str>,
    symbols: Vec<u8>,
}

impl Sequence {
    /// Identifier of the sequence.
    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    /// Raw symbols.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the sequence has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Reference genome: unique identifiers mapped to sequences.
///
/// Sequences are stored in ascending identifier order so every iteration
/// over the genome is deterministic; a side index gives O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    sequences: Vec<Sequence>,
    index: HashMap<Arc<str>, usize>,
}

impl Genome {
    /// Build a genome from `(identifier, body)` records.
    ///
    /// Record numbers in errors are 1-based positions in `records`.
    pub fn from_records<I, K, V>(records: I, policy: DuplicatePolicy) -> Result<Self, GenomicsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Vec<u8>>,
    {
        let mut builder = GenomeBuilder::new(policy);
        for (record_no, (id, body)) in records.into_iter().enumerate() {
            builder.insert(record_no + 1, id.as_ref(), body.into())?;
        }
        Ok(builder.build())
    }

    /// Parse a FASTA record stream given as lines.
    pub fn from_fasta<I, S>(lines: I, policy: DuplicatePolicy) -> Result<Self, GenomicsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = FastaParser::new(policy);
        for line in lines {
            parser.push_line(line.as_ref())?;
        }
        parser.finish()
    }

    /// Look up a sequence by identifier.
    pub fn get(&self, id: &str) -> Result<&Sequence, GenomicsError> {
        self.index
            .get(id)
            .map(|&idx| &self.sequences[idx])
            .ok_or_else(|| GenomicsError::UnknownChromosome(Arc::from(id)))
    }

    /// Whether `id` names a sequence in the genome.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Sequences in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter()
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the genome holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sum of all sequence lengths.
    pub fn total_length(&self) -> usize {
        self.sequences.iter().map(Sequence::len).sum()
    }
}

#[derive(Debug)]
struct GenomeBuilder {
    policy: DuplicatePolicy,
    records: BTreeMap<Arc<str>, Vec<u8>>,
}

impl GenomeBuilder {
    fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            records: BTreeMap::new(),
        }
    }

    fn insert(&mut self, line: usize, id: &str, symbols: Vec<u8>) -> Result<(), GenomicsError> {
        if id.is_empty() {
            return Err(GenomicsError::malformed(line, "empty sequence identifier"));
        }
        let id: Arc<str> = Arc::from(id);
        if self.records.contains_key(&id) {
            match self.policy {
                DuplicatePolicy::Reject => return Err(GenomicsError::DuplicateSequence(id)),
                DuplicatePolicy::Overwrite => {
                    warn!(
                        sequence = %id,
                        line,
                        "duplicate sequence identifier, keeping later record"
                    );
                }
            }
        }
        self.records.insert(id, symbols);
        Ok(())
    }

    fn build(self) -> Genome {
        let sequences: Vec<Sequence> = self
            .records
            .into_iter()
            .map(|(id, symbols)| Sequence { id, symbols })
            .collect();
        let index = sequences
            .iter()
            .enumerate()
            .map(|(idx, seq)| (Arc::clone(&seq.id), idx))
            .collect();
        debug!(sequences = sequences.len(), "genome loaded");
        Genome { sequences, index }
    }
}

/// Incremental FASTA parser; feed lines with [`push_line`](Self::push_line).
///
/// Headers start with `>` and the identifier runs up to the first
/// whitespace. Trailing line terminators are trimmed, blank lines are
/// skipped, and any other body content is kept verbatim.
#[derive(Debug)]
pub struct FastaParser {
    builder: GenomeBuilder,
    current: Option<(usize, String, Vec<u8>)>,
    line_no: usize,
}

impl FastaParser {
    /// Create a parser applying `policy` to duplicate identifiers.
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            builder: GenomeBuilder::new(policy),
            current: None,
            line_no: 0,
        }
    }

    /// Consume the next line of the stream.
    pub fn push_line(&mut self, line: &str) -> Result<(), GenomicsError> {
        self.line_no += 1;
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(header) = line.strip_prefix('>') {
            self.flush()?;
            let id = header.split(char::is_whitespace).next().unwrap_or_default();
            self.current = Some((self.line_no, id.to_string(), Vec::new()));
            return Ok(());
        }

        if line.is_empty() {
            return Ok(());
        }

        match self.current.as_mut() {
            Some((_, _, body)) => {
                body.extend_from_slice(line.as_bytes());
                Ok(())
            }
            None => Err(GenomicsError::malformed(
                self.line_no,
                "sequence data before the first header",
            )),
        }
    }

    /// Finish parsing and build the genome.
    pub fn finish(mut self) -> Result<Genome, GenomicsError> {
        self.flush()?;
        Ok(self.builder.build())
    }

    fn flush(&mut self) -> Result<(), GenomicsError> {
        if let Some((line, id, body)) = self.current.take() {
            self.builder.insert(line, &id, body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_records_are_concatenated() {
        let lines = [">chr2 second", "GGCC", "", "AATT\r", ">chr1", "ACGT", "ACGT\n"];
        let genome = Genome::from_fasta(lines, DuplicatePolicy::Reject).unwrap();

        assert_eq!(genome.len(), 2);
        let ids: Vec<&str> = genome.iter().map(|s| s.id().as_ref()).collect();
        assert_eq!(ids, ["chr1", "chr2"]);
        assert_eq!(genome.get("chr1").unwrap().symbols(), b"ACGTACGT");
        assert_eq!(genome.get("chr2").unwrap().symbols(), b"GGCCAATT");
        assert_eq!(genome.total_length(), 16);
    }

    #[test]
    fn identifier_stops_at_any_whitespace() {
        let genome =
            Genome::from_fasta([">chr1\tassembled", "AC", ">chr2 x", "G"], DuplicatePolicy::Reject)
                .unwrap();
        assert!(genome.contains("chr1"));
        assert!(genome.contains("chr2"));
    }

    #[test]
    fn body_before_header_is_rejected() {
        let err = Genome::from_fasta(["ACGT", ">chr1", "ACGT"], DuplicatePolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, GenomicsError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn internal_whitespace_is_kept() {
        let genome = Genome::from_fasta([">c", "AC GT", "  "], DuplicatePolicy::Reject).unwrap();
        assert_eq!(genome.get("c").unwrap().symbols(), b"AC GT  ");
    }

    #[test]
    fn header_without_body_is_empty_sequence() {
        let genome = Genome::from_fasta([">empty", ">chr1", "A"], DuplicatePolicy::Reject).unwrap();
        assert!(genome.get("empty").unwrap().is_empty());
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let err = Genome::from_fasta(["> chr1", "ACGT"], DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, GenomicsError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn duplicates_follow_policy() {
        let records = [("chr1", "AAAA"), ("chr1", "CC")];
        let err = Genome::from_records(records, DuplicatePolicy::Reject).unwrap_err();
        assert_eq!(err, GenomicsError::DuplicateSequence(Arc::from("chr1")));

        let genome = Genome::from_records(records, DuplicatePolicy::Overwrite).unwrap();
        assert_eq!(genome.get("chr1").unwrap().symbols(), b"CC");
    }

    #[test]
    fn unknown_lookup_fails() {
        let genome = Genome::from_records([("chr1", "A")], DuplicatePolicy::Reject).unwrap();
        assert!(!genome.contains("chrX"));
        assert_eq!(
            genome.get("chrX").unwrap_err(),
            GenomicsError::UnknownChromosome(Arc::from("chrX"))
        );
    }
}
