use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use peakscan::genomics::io::{
    create_output, open_input, read_genome_file, read_peak_sites, read_pileup, read_reads,
    write_hits, write_pileup, write_reads, write_regions,
};
use peakscan::genomics::{
    align_reads, DuplicatePolicy, HitReader, Pileup, ReadSimulator, SimulationConfig,
};
use peakscan::{fingerprint_regions, PeakCaller, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "peakscan", version, about = "ChIP-seq peak calling from exact read alignments")]
struct Cli {
    /// Worker threads (0 = one per core).
    #[arg(long, global = true, default_value_t = 0)]
    threads: usize,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report every exact match of each read as `chrom,position`.
    Align {
        /// Genome to align to (FASTA).
        genome: PathBuf,
        /// Reads to align, one per line.
        reads: PathBuf,
        /// Output file (must not exist; default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Let later FASTA records replace earlier ones with the same name.
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// Count alignment starts per base as `chrom,position,count`.
    Pileup {
        /// Genome to pile up on (FASTA).
        genome: PathBuf,
        /// Alignments (`chrom,position` per line).
        alignments: PathBuf,
        /// Output file (must not exist; default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Let later FASTA records replace earlier ones with the same name.
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// Smooth a pileup and report regions above threshold as `chrom,start,end`.
    Call {
        /// Smoothed coverage must be strictly above this value.
        #[arg(allow_negative_numbers = true)]
        threshold: f64,
        /// Regions must be strictly wider than this.
        #[arg(allow_negative_numbers = true)]
        min_width: i64,
        /// Pileup (`chrom,position,count` per line).
        pileup: PathBuf,
        /// Output file (must not exist; default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip chromosomes shorter than two bases instead of failing.
        #[arg(long)]
        skip_short: bool,
    },
    /// Align, pile up and call regions in one pass.
    Run {
        /// Genome to align to (FASTA).
        genome: PathBuf,
        /// Reads to align, one per line.
        reads: PathBuf,
        /// Smoothed coverage must be strictly above this value.
        #[arg(long, allow_negative_numbers = true)]
        threshold: f64,
        /// Regions must be strictly wider than this.
        #[arg(long, allow_negative_numbers = true)]
        min_width: i64,
        /// Output file (must not exist; default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip chromosomes shorter than two bases instead of failing.
        #[arg(long)]
        skip_short: bool,
        /// Let later FASTA records replace earlier ones with the same name.
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// Generate synthetic ChIP-seq reads around peak sites.
    Simulate {
        /// Genome to sample from (FASTA).
        genome: PathBuf,
        /// Peak sites (`chrom,center,amplitude` per line).
        peaks: PathBuf,
        /// Length of each read.
        #[arg(short = 'l', long, default_value_t = 38)]
        read_length: usize,
        /// Mean length of sheared fragments.
        #[arg(short = 'L', long, default_value_t = 100)]
        fragment_length: usize,
        /// Number of reads to generate.
        #[arg(short = 'n', long, default_value_t = 500)]
        reads: usize,
        /// Random seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Output file (must not exist; default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Let later FASTA records replace earlier ones with the same name.
        #[arg(long)]
        allow_duplicates: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .context("failed to configure thread pool")?;

    match cli.command {
        Commands::Align {
            genome,
            reads,
            output,
            allow_duplicates,
        } => run_align(&genome, &reads, output.as_deref(), policy(allow_duplicates))?,
        Commands::Pileup {
            genome,
            alignments,
            output,
            allow_duplicates,
        } => run_pileup(&genome, &alignments, output.as_deref(), policy(allow_duplicates))?,
        Commands::Call {
            threshold,
            min_width,
            pileup,
            output,
            skip_short,
        } => {
            let config =
                PipelineConfig::new(threshold, min_width)?.with_skip_short_sequences(skip_short);
            run_call(config, &pileup, output.as_deref())?
        }
        Commands::Run {
            genome,
            reads,
            threshold,
            min_width,
            output,
            skip_short,
            allow_duplicates,
        } => {
            let config =
                PipelineConfig::new(threshold, min_width)?.with_skip_short_sequences(skip_short);
            run_pipeline(
                config,
                &genome,
                &reads,
                output.as_deref(),
                policy(allow_duplicates),
            )?
        }
        Commands::Simulate {
            genome,
            peaks,
            read_length,
            fragment_length,
            reads,
            seed,
            output,
            allow_duplicates,
        } => {
            let config = SimulationConfig::new(read_length, fragment_length)?
                .with_reads(reads)
                .with_seed(seed);
            run_simulate(
                config,
                &genome,
                &peaks,
                output.as_deref(),
                policy(allow_duplicates),
            )?
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn policy(allow_duplicates: bool) -> DuplicatePolicy {
    if allow_duplicates {
        DuplicatePolicy::Overwrite
    } else {
        DuplicatePolicy::Reject
    }
}

fn ensure_inputs_exist(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if !path.exists() {
            bail!("input file {} does not exist", path.display());
        }
    }
    Ok(())
}

fn load_reads(path: &Path) -> Result<Vec<Vec<u8>>> {
    read_reads(open_input(path)?)
        .with_context(|| format!("failed to read reads from {}", path.display()))
}

fn run_align(
    genome_path: &Path,
    reads_path: &Path,
    output: Option<&Path>,
    policy: DuplicatePolicy,
) -> Result<()> {
    ensure_inputs_exist(&[genome_path, reads_path])?;
    let genome = read_genome_file(genome_path, policy)?;
    let reads = load_reads(reads_path)?;

    let hits = align_reads(&genome, &reads).context("alignment failed")?;
    info!(
        reads = reads.len(),
        hits = hits.iter().map(Vec::len).sum::<usize>(),
        "alignment finished"
    );

    let mut writer = create_output(output)?;
    write_hits(&mut writer, hits.iter().flatten())
}

fn run_pileup(
    genome_path: &Path,
    alignments_path: &Path,
    output: Option<&Path>,
    policy: DuplicatePolicy,
) -> Result<()> {
    ensure_inputs_exist(&[genome_path, alignments_path])?;
    let genome = read_genome_file(genome_path, policy)?;

    let mut pileup = Pileup::new(&genome);
    for hit in HitReader::new(open_input(alignments_path)?) {
        let hit = hit.with_context(|| {
            format!("failed to read alignments from {}", alignments_path.display())
        })?;
        pileup.add(&hit)?;
    }
    info!(hits = pileup.total(), chromosomes = pileup.len(), "pileup finished");

    let mut writer = create_output(output)?;
    write_pileup(&mut writer, &pileup)
}

fn run_call(config: PipelineConfig, pileup_path: &Path, output: Option<&Path>) -> Result<()> {
    ensure_inputs_exist(&[pileup_path])?;
    let pileup = read_pileup(open_input(pileup_path)?)
        .with_context(|| format!("failed to read pileup from {}", pileup_path.display()))?;

    let regions = PeakCaller::new(config).call_regions(&pileup)?;
    info!(
        regions = regions.len(),
        fingerprint = %fingerprint_regions(&regions).to_hex(),
        "region calling finished"
    );

    let mut writer = create_output(output)?;
    write_regions(&mut writer, &regions)
}

fn run_pipeline(
    config: PipelineConfig,
    genome_path: &Path,
    reads_path: &Path,
    output: Option<&Path>,
    policy: DuplicatePolicy,
) -> Result<()> {
    ensure_inputs_exist(&[genome_path, reads_path])?;
    let genome = read_genome_file(genome_path, policy)?;
    let reads = load_reads(reads_path)?;

    let result = PeakCaller::new(config).run(&genome, &reads)?;
    info!(fingerprint = %result.fingerprint().to_hex(), "regions ready");

    let mut writer = create_output(output)?;
    write_regions(&mut writer, &result.regions)
}

fn run_simulate(
    config: SimulationConfig,
    genome_path: &Path,
    peaks_path: &Path,
    output: Option<&Path>,
    policy: DuplicatePolicy,
) -> Result<()> {
    ensure_inputs_exist(&[genome_path, peaks_path])?;
    let genome = read_genome_file(genome_path, policy)?;
    let peaks = read_peak_sites(open_input(peaks_path)?)
        .with_context(|| format!("failed to read peak sites from {}", peaks_path.display()))?;

    let mut simulator = ReadSimulator::new(&genome, &peaks, config)?;
    let reads = simulator.sample_reads();
    info!(reads = reads.len(), peaks = peaks.len(), "simulation finished");

    let mut writer = create_output(output)?;
    write_reads(&mut writer, reads)
}
