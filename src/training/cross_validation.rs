//! K-fold cross-validation splitting

use crate::error::{Result, TreinoError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One fold's train/validation index sets
#[derive(Debug, Clone)]
pub struct Fold {
    pub train_indices: Vec<usize>,
    pub val_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter with optional shuffling
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            random_state: None,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Partition `0..n_samples` into `n_splits` folds. Every sample lands in
    /// exactly one validation fold.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(TreinoError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(TreinoError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = match self.random_state {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        // First (n_samples % n_splits) folds get one extra sample
        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut current = 0;

        for fold_idx in 0..self.n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let val_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            folds.push(Fold {
                train_indices,
                val_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(folds)
    }
}

/// Mean and spread of per-fold scores
#[derive(Debug, Clone)]
pub struct CvScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScores {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            scores,
            mean,
            std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_covers_all_indices() {
        let folds = KFold::new(5).with_shuffle(false).split(100).unwrap();
        assert_eq!(folds.len(), 5);

        for fold in &folds {
            assert_eq!(fold.val_indices.len(), 20);
            assert_eq!(fold.train_indices.len(), 80);
        }

        let mut all_val: Vec<usize> = folds.iter().flat_map(|f| f.val_indices.clone()).collect();
        all_val.sort_unstable();
        assert_eq!(all_val, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_uneven_fold_sizes() {
        let folds = KFold::new(3).with_shuffle(false).split(10).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.val_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_seeded_split_reproducible() {
        let a = KFold::new(4).with_random_state(7).split(40).unwrap();
        let b = KFold::new(4).with_random_state(7).split(40).unwrap();
        for (fa, fb) in a.iter().zip(b.iter()) {
            assert_eq!(fa.val_indices, fb.val_indices);
        }
    }

    #[test]
    fn test_too_few_samples() {
        assert!(KFold::new(5).split(3).is_err());
        assert!(KFold::new(1).split(10).is_err());
    }

    #[test]
    fn test_cv_scores() {
        let scores = CvScores::from_scores(vec![0.8, 0.9, 1.0]);
        assert!((scores.mean - 0.9).abs() < 1e-12);
        assert!(scores.std > 0.0);
    }
}
