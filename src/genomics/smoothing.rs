use crate::genomics::GenomicsError;

/// Three-point moving average.
///
/// Interior cells average `[i-1, i, i+1]`; the two edge cells average
/// themselves with their single neighbour. Arrays shorter than two cells
/// have no defined edge rule and are rejected.
pub fn smooth<T>(values: &[T]) -> Result<Vec<f64>, GenomicsError>
where
    T: Copy + Into<f64>,
{
    let n = values.len();
    if n < 2 {
        return Err(GenomicsError::InvalidInput { chrom: None, len: n });
    }

    let mut smoothed = Vec::with_capacity(n);
    smoothed.push((values[0].into() + values[1].into()) / 2.0);
    smoothed.extend(
        values
            .windows(3)
            .map(|w| (w[0].into() + w[1].into() + w[2].into()) / 3.0),
    );
    smoothed.push((values[n - 2].into() + values[n - 1].into()) / 2.0);
    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_use_two_point_average() {
        let smoothed = smooth(&[3u32, 0, 6, 9]).unwrap();
        assert_eq!(smoothed, vec![1.5, 3.0, 5.0, 7.5]);
    }

    #[test]
    fn two_cells_average_each_other() {
        assert_eq!(smooth(&[1u32, 2]).unwrap(), vec![1.5, 1.5]);
    }

    #[test]
    fn constant_input_is_unchanged() {
        let values = vec![4.0f64; 17];
        assert_eq!(smooth(&values).unwrap(), values);
    }

    #[test]
    fn short_input_is_rejected() {
        assert_eq!(
            smooth::<u32>(&[]).unwrap_err(),
            GenomicsError::InvalidInput { chrom: None, len: 0 }
        );
        assert_eq!(
            smooth(&[7u32]).unwrap_err(),
            GenomicsError::InvalidInput { chrom: None, len: 1 }
        );
    }
}
