// ============================================================
// Layer 4 — Train/Holdout Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into:
//   - Training set: the only data the encoder and model see
//   - Holdout set:  scored after training to estimate error
//
// The RNG is seeded (StdRng::seed_from_u64) so the same
// dataset and seed always produce the same partition.
//
// Holdout size = round(len * holdout_fraction), clamped to
// the number of samples.
//
// Why split before fitting the encoder?
//   The medians, modes and vocabularies are statistics of the
//   data too. Computing them on all records would let holdout
//   values leak into training and flatter the holdout score.
//
// Reference: Rust Book §10 (Generic Types)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` deterministically and split into (train, holdout).
///
/// # Arguments
/// * `samples`          - All available samples (consumed)
/// * `holdout_fraction` - Share withheld from training, e.g. 0.2
/// * `seed`             - RNG seed; equal seeds give equal splits
pub fn split_holdout<T>(
    mut samples:      Vec<T>,
    holdout_fraction: f64,
    seed:             u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let holdout  = ((total as f64) * holdout_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = total - holdout.min(total);

    // samples = [0..split_at], holdout = [split_at..total]
    let holdout = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} holdout (seed {})",
        samples.len(),
        holdout.len(),
        seed,
    );

    (samples, holdout)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, holdout)  = split_holdout(items, 0.2, 42);
        assert_eq!(train.len(),   80);
        assert_eq!(holdout.len(), 20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, holdout)  = split_holdout(items, 0.3, 7);
        let mut all: Vec<usize> = train.into_iter().chain(holdout).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_holdout((0..40).collect::<Vec<usize>>(), 0.25, 42);
        let b = split_holdout((0..40).collect::<Vec<usize>>(), 0.25, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, holdout) = split_holdout(Vec::<usize>::new(), 0.2, 42);
        assert!(train.is_empty());
        assert!(holdout.is_empty());
    }

    #[test]
    fn test_zero_holdout_keeps_everything() {
        let (train, holdout) = split_holdout((0..10).collect::<Vec<usize>>(), 0.0, 42);
        assert_eq!(train.len(), 10);
        assert!(holdout.is_empty());
    }
}
