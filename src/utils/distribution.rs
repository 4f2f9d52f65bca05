//! Categorical sampling over explicit probability vectors.
//!
//! Malformed vectors are rejected, never renormalized: a vector must be
//! non-empty, finite, non-negative and sum to 1 within [`PROB_TOLERANCE`].

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::core::{EnvError, Result};

/// Absolute tolerance on the sum of a probability vector.
pub const PROB_TOLERANCE: f64 = 1e-6;

/// Check that `probs` is a probability vector.
pub fn validate_distribution(probs: ArrayView1<'_, f64>) -> Result<()> {
    if probs.is_empty() {
        return Err(EnvError::InvalidDistribution("empty probability vector".into()));
    }
    if let Some((i, p)) = probs.iter().enumerate().find(|(_, p)| !p.is_finite() || **p < 0.0) {
        return Err(EnvError::InvalidDistribution(format!(
            "entry {i} is {p}, expected a finite non-negative value"
        )));
    }
    let total: f64 = probs.sum();
    if (total - 1.0).abs() > PROB_TOLERANCE {
        return Err(EnvError::InvalidDistribution(format!("entries sum to {total}, expected 1")));
    }
    Ok(())
}

/// Draw one index with probability `probs[i]`.
pub fn sample_distribution<R: Rng + ?Sized>(probs: ArrayView1<'_, f64>, rng: &mut R) -> Result<usize> {
    validate_distribution(probs)?;
    let dist = WeightedIndex::new(probs.iter().copied())
        .map_err(|e| EnvError::InvalidDistribution(e.to_string()))?;
    Ok(dist.sample(rng))
}

/// A vector of length `n` with a single 1.0 at `index`.
pub fn one_hot(index: usize, n: usize) -> Result<Array1<f64>> {
    if index >= n {
        return Err(EnvError::OutOfBounds { what: "state", index, len: n });
    }
    let mut v = Array1::zeros(n);
    v[index] = 1.0;
    Ok(v)
}
