use peakscan::genomics::{align_read, AlignmentHit, DuplicatePolicy, Genome, Pileup};
use peakscan::{PeakCaller, PipelineConfig};

fn genome() -> Genome {
    Genome::from_records([("chr1", "ACGTACGT")], DuplicatePolicy::Reject)
        .expect("genome should load")
}

#[test]
fn reads_align_to_every_occurrence() {
    let genome = genome();
    assert_eq!(
        align_read(&genome, b"ACG").unwrap(),
        vec![AlignmentHit::new("chr1", 0), AlignmentHit::new("chr1", 4)]
    );
    assert_eq!(
        align_read(&genome, b"CGT").unwrap(),
        vec![AlignmentHit::new("chr1", 1), AlignmentHit::new("chr1", 5)]
    );
}

#[test]
fn pileup_total_matches_hit_count() {
    let genome = genome();
    let caller = PeakCaller::new(PipelineConfig::new(1.0, 0).unwrap());
    let result = caller
        .run(&genome, &["ACG", "CGT"])
        .expect("pipeline should succeed");

    let chr1 = result.pileup.get("chr1").unwrap();
    assert_eq!(chr1.counts(), &[1, 1, 0, 0, 1, 1, 0, 0]);
    assert_eq!(chr1.total(), 4);
    assert_eq!(result.hit_count(), 4);
}

#[test]
fn streamed_hits_match_batch_pileup() {
    let genome = genome();
    let hits: Vec<AlignmentHit> = ["ACG", "CGT", "T"]
        .iter()
        .flat_map(|read| align_read(&genome, read.as_bytes()).unwrap())
        .collect();

    let mut streamed = Pileup::new(&genome);
    for hit in hits.iter().rev() {
        streamed.add(hit).unwrap();
    }
    assert_eq!(streamed, Pileup::from_hits(&genome, &hits).unwrap());
}

#[test]
fn enriched_block_is_called_as_region() {
    // 12 copies of a read stacked in the middle of an otherwise quiet chromosome
    let genome = Genome::from_records(
        [
            ("chr1", "TTTTTTTTGATTACAGATTACATTTTTTTT"),
            ("chr2", "CCCCCCCC"),
        ],
        DuplicatePolicy::Reject,
    )
    .unwrap();
    let reads = vec!["GATTACA"; 12];
    let caller = PeakCaller::new(PipelineConfig::new(2.0, 1).unwrap());
    let result = caller.run(&genome, &reads).unwrap();

    // GATTACA starts at 8 and 15: 12 hits each; smoothing spreads them to
    // 7..10 and 14..17 at 4, 4, 4 (the flanks average 12/3 with zeros)
    let regions: Vec<(&str, usize, usize)> = result
        .regions
        .iter()
        .map(|r| (r.chrom.as_ref(), r.start, r.end))
        .collect();
    assert_eq!(regions, vec![("chr1", 7, 10), ("chr1", 14, 17)]);
}
