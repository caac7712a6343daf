//! Plain-text encodings used around the core: FASTA genomes, one-read-per-line
//! read files, and header-less comma separated tables for alignments,
//! pileups, regions and simulated peak sites.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::genomics::{
    AlignmentHit, CoverageArray, DuplicatePolicy, FastaParser, Genome, GenomicsError, PeakSite,
    Pileup, Region,
};

/// Open an existing input file for buffered reading.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("cannot open input file {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Open the output sink: a new file (never overwriting) or stdout.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .with_context(|| {
                    if path.exists() {
                        format!("output file {} already exists", path.display())
                    } else {
                        format!("cannot create output file {}", path.display())
                    }
                })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Load a FASTA genome from a reader.
pub fn read_genome<R: BufRead>(reader: R, policy: DuplicatePolicy) -> Result<Genome> {
    let mut parser = FastaParser::new(policy);
    for line in reader.lines() {
        parser.push_line(&line?)?;
    }
    Ok(parser.finish()?)
}

/// Load a FASTA genome from a file path.
pub fn read_genome_file<P: AsRef<Path>>(path: P, policy: DuplicatePolicy) -> Result<Genome> {
    let path = path.as_ref();
    read_genome(open_input(path)?, policy)
        .with_context(|| format!("failed to read genome from {}", path.display()))
}

/// Read queries, one per line; trailing line terminators are trimmed and
/// blank lines skipped.
pub fn read_reads<R: BufRead>(reader: R) -> Result<Vec<Vec<u8>>> {
    let mut reads = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let read = line.trim_end_matches(['\r', '\n']);
        if !read.is_empty() {
            reads.push(read.as_bytes().to_vec());
        }
    }
    Ok(reads)
}

/// Write queries, one per line.
pub fn write_reads<W, I, S>(writer: &mut W, reads: I) -> Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    for read in reads {
        writer.write_all(read.as_ref())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write alignment hits as `chrom,position`.
pub fn write_hits<'h, W, I>(writer: &mut W, hits: I) -> Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'h AlignmentHit>,
{
    for hit in hits {
        writeln!(writer, "{hit}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Streaming reader over `chrom,position` lines.
#[derive(Debug)]
pub struct HitReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
    last_chrom: Option<Arc<str>>,
}

impl<R: BufRead> HitReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            last_chrom: None,
        }
    }

    fn parse(&mut self, line: &str) -> Result<AlignmentHit, GenomicsError> {
        let fields: Vec<&str> = line.split(',').collect();
        let [chrom, position] = fields[..] else {
            return Err(GenomicsError::malformed(
                self.line_no,
                format!("expected 2 fields, found {}", fields.len()),
            ));
        };
        let position = parse_field(self.line_no, "position", position)?;
        Ok(AlignmentHit {
            chrom: self.intern(chrom),
            position,
        })
    }

    // Hit files are usually grouped by chromosome; reuse the previous name.
    fn intern(&mut self, chrom: &str) -> Arc<str> {
        match &self.last_chrom {
            Some(last) if last.as_ref() == chrom => Arc::clone(last),
            _ => {
                let chrom: Arc<str> = Arc::from(chrom);
                self.last_chrom = Some(Arc::clone(&chrom));
                chrom
            }
        }
    }
}

impl<R: BufRead> Iterator for HitReader<R> {
    type Item = Result<AlignmentHit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            return Some(self.parse(line).map_err(Into::into));
        }
    }
}

/// Write every base of the pileup as `chrom,position,count`.
pub fn write_pileup<W: Write + ?Sized>(writer: &mut W, pileup: &Pileup) -> Result<()> {
    for record in pileup.records() {
        writeln!(writer, "{},{},{}", record.chrom, record.position, record.count)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a `chrom,position,count` table back into a pileup.
///
/// Each chromosome must form one contiguous block whose positions start at
/// zero and increase by exactly one.
pub fn read_pileup<R: BufRead>(reader: R) -> Result<Pileup> {
    let mut arrays: Vec<CoverageArray> = Vec::new();
    let mut current: Option<(String, Vec<u32>)> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        let [chrom, position, count] = fields[..] else {
            return Err(GenomicsError::malformed(
                line_no,
                format!("expected 3 fields, found {}", fields.len()),
            )
            .into());
        };
        let position: usize = parse_field(line_no, "position", position)?;
        let count: u32 = parse_field(line_no, "count", count)?;

        let same_block = matches!(&current, Some((name, _)) if name == chrom);
        if !same_block {
            if let Some((name, counts)) = current.take() {
                arrays.push(CoverageArray::from_counts(name, counts));
            }
            if arrays.iter().any(|array| array.chrom().as_ref() == chrom) {
                return Err(GenomicsError::malformed(
                    line_no,
                    format!("chromosome '{chrom}' appears in more than one block"),
                )
                .into());
            }
            current = Some((chrom.to_string(), Vec::new()));
        }

        if let Some((_, counts)) = current.as_mut() {
            if position != counts.len() {
                return Err(GenomicsError::malformed(
                    line_no,
                    format!(
                        "positions are not sequential: expected {}, found {position}",
                        counts.len()
                    ),
                )
                .into());
            }
            counts.push(count);
        }
    }

    if let Some((name, counts)) = current {
        arrays.push(CoverageArray::from_counts(name, counts));
    }
    Ok(Pileup::from_arrays(arrays)?)
}

/// Write regions as `chrom,start,end`.
pub fn write_regions<W: Write + ?Sized>(writer: &mut W, regions: &[Region]) -> Result<()> {
    for region in regions {
        writeln!(writer, "{region}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Render regions into a string (useful for tests and fingerprints).
pub fn render_regions(regions: &[Region]) -> Result<String> {
    let mut buffer = Vec::new();
    write_regions(&mut buffer, regions)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered regions are not valid UTF-8"))
}

/// Read `chrom,center,amplitude` peak sites for the read simulator.
pub fn read_peak_sites<R: BufRead>(reader: R) -> Result<Vec<PeakSite>> {
    let mut sites = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let [chrom, center, amplitude] = fields[..] else {
            return Err(GenomicsError::malformed(
                line_no,
                format!("expected 3 fields, found {}", fields.len()),
            )
            .into());
        };
        sites.push(PeakSite::new(
            chrom,
            parse_field(line_no, "center", center)?,
            parse_field(line_no, "amplitude", amplitude)?,
        ));
    }
    Ok(sites)
}

fn parse_field<T: std::str::FromStr>(
    line: usize,
    name: &str,
    raw: &str,
) -> Result<T, GenomicsError> {
    raw.trim()
        .parse()
        .map_err(|_| GenomicsError::malformed(line, format!("invalid {name} '{raw}'")))
}
