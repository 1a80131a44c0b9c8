//! Largest-remainder (Hamilton) rounding.

/// Rounds fractional allocations to integers while preserving their sum.
///
/// Every value is floored, then the rounded sum of the fractional parts is
/// distributed one unit at a time to the largest remainders. Ties break by
/// larger remainder first, then input order, so the result is deterministic.
///
/// Non-finite and negative inputs contribute zero, matching the upstream
/// convention where an all-missing group allocates nothing.
///
/// # Examples
///
/// ```
/// use censusalign_blockify::hamilton_floor;
///
/// assert_eq!(hamilton_floor(&[7.5, 2.5]), vec![8, 2]);
/// assert_eq!(hamilton_floor(&[1.2, 3.3, 0.5]), vec![1, 3, 1]);
/// ```
pub fn hamilton_floor(values: &[f64]) -> Vec<u64> {
    let sanitized: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
        .collect();

    let mut floored: Vec<u64> = sanitized.iter().map(|v| v.floor() as u64).collect();
    let remainders: Vec<f64> = sanitized
        .iter()
        .zip(&floored)
        .map(|(v, f)| v - *f as f64)
        .collect();

    let n_remaining = remainders.iter().sum::<f64>().round() as usize;
    if n_remaining == 0 {
        return floored;
    }

    let mut order: Vec<usize> = (0..remainders.len()).collect();
    order.sort_by(|&a, &b| {
        remainders[b]
            .partial_cmp(&remainders[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    for &idx in order.iter().take(n_remaining) {
        floored[idx] += 1;
    }
    floored
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_values_unchanged() {
        assert_eq!(hamilton_floor(&[3.0, 7.0]), vec![3, 7]);
    }

    #[test]
    fn test_largest_remainder_wins() {
        assert_eq!(hamilton_floor(&[1.2, 3.3, 0.5]), vec![1, 3, 1]);
    }

    #[test]
    fn test_tie_breaks_by_input_order() {
        assert_eq!(hamilton_floor(&[2.5, 2.5]), vec![3, 2]);
    }

    #[test]
    fn test_all_nan_allocates_nothing() {
        assert_eq!(hamilton_floor(&[f64::NAN, f64::NAN]), vec![0, 0]);
    }

    #[test]
    fn test_mixed_nan_treated_as_zero() {
        assert_eq!(hamilton_floor(&[f64::NAN, 2.5, 2.5]), vec![0, 3, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(hamilton_floor(&[]), Vec::<u64>::new());
    }

    #[test]
    fn test_preserves_precinct_total() {
        // 10 votes split 30/40 and 10/40 of registration.
        let result = hamilton_floor(&[7.5, 2.5]);
        assert_eq!(result.iter().sum::<u64>(), 10);
    }

    proptest! {
        #[test]
        fn test_each_value_floors_or_rounds_up(values in prop::collection::vec(0.0f64..1000.0, 1..20)) {
            let result = hamilton_floor(&values);
            for (v, r) in values.iter().zip(&result) {
                let floor = v.floor() as u64;
                prop_assert!(*r == floor || *r == floor + 1);
            }
        }

        #[test]
        fn test_sum_is_within_rounding(values in prop::collection::vec(0.0f64..1000.0, 1..20)) {
            let result = hamilton_floor(&values);
            let allocated = result.iter().sum::<u64>() as f64;
            let expected: f64 = values.iter().sum();
            prop_assert!((allocated - expected).abs() <= 0.5 + 1e-9);
        }
    }
}
