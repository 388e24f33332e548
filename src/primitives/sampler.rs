//! Module that implements Walker's alias method for sampling from a discrete distribution.
use super::xoshiro::Xoshiro256;

/// A weighted sampler over the buckets `0..n`.
///
/// Construction is `O(n)`; every draw is `O(1)` and consumes exactly two doubles from the
/// generator, first the bucket draw and then the coin flip.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    /// Probability of keeping bucket `i` rather than taking its alias.
    probs: Vec<f64>,
    /// Alias bucket for each bucket.
    aliases: Vec<usize>,
}

impl WeightedSampler {
    /// Creates a new sampler from non-negative weights. The weights do not need to be normalized.
    ///
    /// # Panics
    ///
    /// Panics if `weights` is empty, contains a negative or non-finite weight, or sums to zero.
    pub fn new(weights: &[f64]) -> Self {
        assert!(!weights.is_empty(), "sampler needs at least one weight");
        assert!(
            weights.iter().all(|w| w.is_finite() && *w >= 0.0),
            "sampler weights must be finite and non-negative"
        );
        let sum: f64 = weights.iter().sum();
        assert!(sum > 0.0, "sampler weights must not all be zero");

        let count = weights.len();
        // Scale so the mean weight is 1.
        let mut scaled: Vec<f64> = weights.iter().map(|w| w * count as f64 / sum).collect();

        // Buckets are pushed from the highest index down, and popped from the back.
        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..count).rev().partition(|&i| scaled[i] < 1.0);

        let mut probs = vec![0.0; count];
        let mut aliases = vec![0; count];

        while !small.is_empty() && !large.is_empty() {
            let (Some(a), Some(g)) = (small.pop(), large.pop()) else { break };

            probs[a] = scaled[a];
            aliases[a] = g;

            // Sum first, then subtract: the rounding order is part of the interop contract.
            scaled[g] = (scaled[g] + scaled[a]) - 1.0;
            if scaled[g] < 1.0 {
                small.push(g);
            } else {
                large.push(g);
            }
        }

        // Leftovers only exist through rounding error.
        for i in large.into_iter().chain(small) {
            probs[i] = 1.0;
        }

        Self { probs, aliases }
    }

    /// Returns the number of buckets.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Always false; a sampler cannot be built without weights.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Draws a bucket index.
    pub fn sample(&self, rng: &mut Xoshiro256) -> usize {
        let r1 = rng.next_double();
        let r2 = rng.next_double();

        let i = ((self.probs.len() as f64 * r1) as usize).min(self.probs.len() - 1);
        if r2 < self.probs[i] { i } else { self.aliases[i] }
    }
}
