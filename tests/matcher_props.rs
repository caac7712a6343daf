use proptest::prelude::*;
use peakscan::genomics::{
    find_all, find_regions, smooth, AlignmentHit, DuplicatePolicy, Genome, Pileup,
};

fn dna(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
        0..max_len,
    )
}

fn brute_force(sequence: &[u8], query: &[u8]) -> Vec<usize> {
    if query.len() > sequence.len() {
        return Vec::new();
    }
    (0..=sequence.len() - query.len())
        .filter(|&p| &sequence[p..p + query.len()] == query)
        .collect()
}

proptest! {
    #[test]
    fn matches_equal_brute_force(
        sequence in dna(96),
        query in dna(6).prop_filter("non-empty", |q| !q.is_empty()),
    ) {
        let positions = find_all(&sequence, &query).expect("query is non-empty");
        prop_assert_eq!(&positions, &brute_force(&sequence, &query));
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]), "positions must ascend");
    }

    #[test]
    fn pileup_total_equals_hit_count(
        chr1 in dna(48),
        chr2 in dna(48),
        reads in proptest::collection::vec(
            dna(4).prop_filter("non-empty", |q| !q.is_empty()),
            0..12,
        ),
    ) {
        let genome = Genome::from_records(
            [("chr1", chr1.clone()), ("chr2", chr2.clone())],
            DuplicatePolicy::Reject,
        ).expect("genome loads");

        let mut hits = Vec::new();
        for read in &reads {
            for (chrom, sequence) in [("chr1", &chr1), ("chr2", &chr2)] {
                for position in brute_force(sequence, read) {
                    hits.push(AlignmentHit::new(chrom, position));
                }
            }
        }

        let pileup = Pileup::from_hits(&genome, &hits).expect("hits are in range");
        prop_assert_eq!(pileup.total(), hits.len() as u64);
        prop_assert_eq!(pileup.get("chr1").unwrap().len(), chr1.len());
        prop_assert_eq!(pileup.get("chr2").unwrap().len(), chr2.len());
    }

    #[test]
    fn smoothing_preserves_length_and_constants(
        value in 0u32..1000,
        len in 2usize..64,
    ) {
        let smoothed = smooth(&vec![value; len]).expect("length is at least two");
        prop_assert_eq!(smoothed.len(), len);
        for cell in smoothed {
            prop_assert!((cell - f64::from(value)).abs() < 1e-9);
        }
    }

    #[test]
    fn smoothing_stays_within_input_bounds(
        counts in proptest::collection::vec(0u32..50, 2..64),
    ) {
        let smoothed = smooth(&counts).expect("length is at least two");
        let min = f64::from(*counts.iter().min().unwrap());
        let max = f64::from(*counts.iter().max().unwrap());
        prop_assert!(smoothed.iter().all(|&v| v >= min - 1e-9 && v <= max + 1e-9));
    }

    #[test]
    fn regions_are_maximal_disjoint_and_wide_enough(
        values in proptest::collection::vec(0.0f64..10.0, 0..80),
        threshold in 0.0f64..10.0,
        min_width in 0usize..5,
    ) {
        let regions = find_regions(&values, threshold, min_width).expect("valid threshold");
        let mut previous_end = None;
        for region in &regions {
            prop_assert!(region.end - region.start > min_width);
            prop_assert!(values[region.clone()].iter().all(|&v| v > threshold));
            if region.start > 0 {
                prop_assert!(values[region.start - 1] <= threshold);
            }
            if region.end < values.len() {
                prop_assert!(values[region.end] <= threshold);
            }
            if let Some(end) = previous_end {
                prop_assert!(region.start > end);
            }
            previous_end = Some(region.end);
        }
    }
}
