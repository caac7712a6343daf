use std::fs;
use std::io::Write;

use peakscan::genomics::io::{
    create_output, open_input, read_genome_file, read_pileup, read_reads, write_pileup,
    write_regions,
};
use peakscan::genomics::{AlignmentHit, DuplicatePolicy, GenomicsError, Pileup, Region};
use tempfile::tempdir;

#[test]
fn genome_file_loads_in_identifier_order() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("genome.fa");
    fs::write(&path, ">chr2 second\nGGCC\n>chr1\nACGT\r\nACGT\n").expect("write fasta");

    let genome = read_genome_file(&path, DuplicatePolicy::Reject).expect("genome loads");
    let ids: Vec<&str> = genome.iter().map(|seq| seq.id().as_ref()).collect();
    assert_eq!(ids, ["chr1", "chr2"]);
    assert_eq!(genome.get("chr1").unwrap().symbols(), b"ACGTACGT");
}

#[test]
fn duplicate_fasta_records_follow_policy() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("dup.fa");
    fs::write(&path, ">chr1\nAAAA\n>chr1\nCC\n").expect("write fasta");

    let err = read_genome_file(&path, DuplicatePolicy::Reject).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenomicsError>(),
        Some(GenomicsError::DuplicateSequence(id)) if id.as_ref() == "chr1"
    ));

    let genome = read_genome_file(&path, DuplicatePolicy::Overwrite).expect("later record wins");
    assert_eq!(genome.get("chr1").unwrap().symbols(), b"CC");
}

#[test]
fn output_never_overwrites_existing_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("regions.csv");
    fs::write(&path, "keep me\n").expect("seed file");

    let err = create_output(Some(path.as_path())).err().expect("existing file is refused");
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
}

#[test]
fn regions_are_written_to_new_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("regions.csv");
    {
        let mut writer = create_output(Some(path.as_path())).expect("new file");
        write_regions(&mut writer, &[Region::new("chr1", 3..9), Region::new("chr2", 0..4)])
            .expect("write regions");
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "chr1,3,9\nchr2,0,4\n");
}

#[test]
fn pileup_survives_a_trip_through_disk() {
    let dir = tempdir().expect("temp dir");
    let fasta = dir.path().join("genome.fa");
    fs::write(&fasta, ">a\nACG\n>b\nT\n").expect("write fasta");
    let genome = read_genome_file(&fasta, DuplicatePolicy::Reject).expect("genome loads");

    let mut pileup = Pileup::new(&genome);
    pileup.add(&AlignmentHit::new("a", 2)).expect("hit in range");

    let table = dir.path().join("pileup.csv");
    {
        let mut writer = create_output(Some(table.as_path())).expect("new file");
        write_pileup(&mut writer, &pileup).expect("write pileup");
    }
    assert_eq!(fs::read_to_string(&table).unwrap(), "a,0,0\na,1,0\na,2,1\nb,0,0\n");

    let restored = read_pileup(open_input(&table).expect("open pileup")).expect("parse pileup");
    assert_eq!(restored, pileup);
}

#[test]
fn reads_file_skips_blank_lines() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("reads.txt");
    let mut file = fs::File::create(&path).expect("create reads");
    file.write_all(b"ACG\r\n\nCGT\n").expect("write reads");
    drop(file);

    let reads = read_reads(open_input(&path).expect("open reads")).expect("parse reads");
    assert_eq!(reads, vec![b"ACG".to_vec(), b"CGT".to_vec()]);
}
