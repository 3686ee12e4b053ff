// Shared numeric and search helpers for the samplers.
//
// Two pieces the rhythm and melody modules both lean on:
// - nearest-value lookup in a candidate list
// - Gaussian index sampling with a bounded rejection loop
//
// Every rejection loop here carries an attempt cap and a deterministic
// fallback, so degenerate inputs surface as a clamped choice instead of a
// hang.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Attempt cap for the Gaussian rejection loop.
pub const MAX_GAUSSIAN_ATTEMPTS: usize = 32;

/// Index of the element of `values` closest to `target`. Ties break toward
/// the earlier index. Returns `None` for an empty slice.
pub fn find_nearest(values: &[u8], target: u8) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by_key(|&(_, &v)| (v as i16 - target as i16).abs())
        .map(|(idx, _)| idx)
}

/// Sample an index into a list of `len` candidates from a Gaussian centered
/// on `center` with standard deviation `sigma`.
///
/// Draws are floored to integers and rejected while they fall outside
/// `0..len`. After `MAX_GAUSSIAN_ATTEMPTS` rejections the last draw is
/// clamped to the nearest boundary, which keeps the choice deterministic in
/// the direction the distribution was already leaning. Returns `None` only
/// for an empty candidate list.
pub fn gaussian_index(
    rng: &mut impl Rng,
    center: usize,
    sigma: f64,
    len: usize,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let Ok(dist) = Normal::new(center as f64, sigma) else {
        // Non-finite or negative sigma: degenerate distribution, take the center.
        return Some(center.min(len - 1));
    };
    let mut last = center as f64;
    for _ in 0..MAX_GAUSSIAN_ATTEMPTS {
        last = dist.sample(rng).floor();
        if last >= 0.0 && last < len as f64 {
            return Some(last as usize);
        }
    }
    Some(if last < 0.0 { 0 } else { len - 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn find_nearest_exact_and_between() {
        let values = [60, 64, 67, 71];
        assert_eq!(find_nearest(&values, 64), Some(1));
        assert_eq!(find_nearest(&values, 65), Some(1)); // 64 is closer than 67
        assert_eq!(find_nearest(&values, 66), Some(2)); // 67 is closer than 64
        assert_eq!(find_nearest(&values, 100), Some(3));
        assert_eq!(find_nearest(&values, 0), Some(0));
        // True tie breaks toward the earlier index.
        assert_eq!(find_nearest(&[60, 64], 62), Some(0));
    }

    #[test]
    fn find_nearest_empty() {
        assert_eq!(find_nearest(&[], 60), None);
    }

    #[test]
    fn gaussian_index_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for sigma in [0.1, 1.0, 6.0, 1000.0] {
            for _ in 0..500 {
                let idx = gaussian_index(&mut rng, 3, sigma, 8).unwrap();
                assert!(idx < 8, "index {idx} out of bounds at sigma {sigma}");
            }
        }
    }

    #[test]
    fn gaussian_index_tight_sigma_hugs_center() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let idx = gaussian_index(&mut rng, 4, 0.1, 10).unwrap();
            // floor() of a draw within ~0.4 of 4.0 is 3 or 4
            assert!((3..=4).contains(&idx), "index {idx} strayed from center");
        }
    }

    #[test]
    fn gaussian_index_empty_list() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_index(&mut rng, 0, 1.0, 0), None);
    }

    #[test]
    fn gaussian_index_single_candidate() {
        // With one candidate even an absurd sigma must resolve to index 0.
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(gaussian_index(&mut rng, 0, 10_000.0, 1), Some(0));
        }
    }
}
