//! Stratified train/test partitioning

use crate::error::{AttritionError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified split that preserves class proportions.
///
/// Classes are visited in ascending order; each class's rows are shuffled
/// and `round(n_class * test_size)` of them go to the test partition,
/// clamped so a class with at least two rows lands on both sides. Both
/// partitions are shuffled afterwards with the same generator.
pub fn stratified_split(y: &[usize], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(AttritionError::InvalidInput(format!(
            "test_size must be in [0, 1), got {}",
            test_size
        )));
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(y.len());
    let mut test = Vec::new();

    for indices in by_class.values_mut() {
        indices.shuffle(&mut rng);
        let n = indices.len();
        let mut n_test = (n as f64 * test_size).round() as usize;
        if n >= 2 {
            n_test = n_test.clamp(1, n - 1);
        } else {
            n_test = 0;
        }
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(AttritionError::DataError(
            "stratified split produced an empty partition".to_string(),
        ));
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<usize> {
        (0..100).map(|i| if i % 5 == 0 { 1 } else { 0 }).collect()
    }

    #[test]
    fn test_split_preserves_proportions() {
        let split = stratified_split(&labels(), 0.2, 42).unwrap();
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.len(), 20);

        let y = labels();
        let test_pos = split.test.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_pos, 4);
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = stratified_split(&labels(), 0.2, 42).unwrap();
        let b = stratified_split(&labels(), 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&labels(), 0.2, 7).unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_split_covers_every_row_once() {
        let split = stratified_split(&labels(), 0.2, 42).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_class_lands_on_both_sides() {
        let y = vec![0, 0, 0, 0, 0, 0, 0, 0, 1, 1];
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert!(split.test.iter().any(|&i| y[i] == 1));
        assert!(split.train.iter().any(|&i| y[i] == 1));
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(stratified_split(&[0, 1], 1.5, 42).is_err());
    }
}
