//! Walker alias sampler for the degree distribution.
//!
//! Mixed parts combine `d` fragments where `d` is drawn with weight `1/d`
//! over `1..=seq_len`, so low degrees dominate and most mixed parts peel
//! against one or two known fragments. Table construction order is part of
//! the wire contract: a different tie-breaking order picks different degrees.

use crate::random::FountainRng;

/// Alias table over a fixed set of weights.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    probs: Vec<f64>,
    aliases: Vec<usize>,
}

impl WeightedSampler {
    /// Build the table. `weights` must be non-empty with a positive sum.
    pub fn new(weights: &[f64]) -> Self {
        let n = weights.len();
        let total: f64 = weights.iter().sum();
        let mut scaled: Vec<f64> = weights.iter().map(|w| w * n as f64 / total).collect();

        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);
        for j in (0..n).rev() {
            if scaled[j] < 1.0 {
                small.push(j);
            } else {
                large.push(j);
            }
        }

        let mut probs = vec![0.0; n];
        let mut aliases = vec![0; n];

        while !small.is_empty() && !large.is_empty() {
            let (Some(a), Some(g)) = (small.pop(), large.pop()) else { break };
            probs[a] = scaled[a];
            aliases[a] = g;
            scaled[g] += scaled[a] - 1.0;
            if scaled[g] < 1.0 {
                small.push(g);
            } else {
                large.push(g);
            }
        }

        for j in large.into_iter().chain(small) {
            probs[j] = 1.0;
        }

        Self { probs, aliases }
    }

    /// Draw an index in `0..weights.len()`.
    pub fn next(&self, rng: &mut FountainRng) -> usize {
        let r1 = rng.next_double();
        let r2 = rng.next_double();
        let n = self.probs.len();
        let i = ((n as f64 * r1) as usize).min(n.saturating_sub(1));
        if r2 < self.probs[i] { i } else { self.aliases[i] }
    }
}

/// Degree of a mixed part over `seq_len` fragments.
pub fn choose_degree(seq_len: usize, rng: &mut FountainRng) -> usize {
    let weights: Vec<f64> = (1..=seq_len.max(1)).map(|d| 1.0 / d as f64).collect();
    WeightedSampler::new(&weights).next(rng) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_weight_always_returns_zero() {
        let sampler = WeightedSampler::new(&[3.0]);
        let mut rng = FountainRng::from_seed_bytes(b"one");
        for _ in 0..20 {
            assert_eq!(sampler.next(&mut rng), 0);
        }
    }

    #[test]
    fn zero_weight_is_never_drawn() {
        let sampler = WeightedSampler::new(&[1.0, 0.0, 2.0]);
        let mut rng = FountainRng::from_seed_bytes(b"zero");
        for _ in 0..500 {
            assert_ne!(sampler.next(&mut rng), 1);
        }
    }

    #[test]
    fn distribution_follows_weights() {
        let sampler = WeightedSampler::new(&[1.0, 2.0, 4.0, 1.0]);
        let mut rng = FountainRng::from_seed_bytes(b"Wolf");
        let mut counts = [0usize; 4];
        for _ in 0..80_000 {
            counts[sampler.next(&mut rng)] += 1;
        }
        // Expected 10k / 20k / 40k / 10k.
        assert!((9_000..11_000).contains(&counts[0]), "{counts:?}");
        assert!((19_000..21_000).contains(&counts[1]), "{counts:?}");
        assert!((39_000..41_000).contains(&counts[2]), "{counts:?}");
        assert!((9_000..11_000).contains(&counts[3]), "{counts:?}");
    }

    #[test]
    fn degree_is_within_bounds_and_biased_low() {
        let mut ones = 0;
        for seq in 0..2000u32 {
            let mut rng = FountainRng::for_part(seq, 0x1234_5678);
            let d = choose_degree(11, &mut rng);
            assert!((1..=11).contains(&d));
            if d == 1 {
                ones += 1;
            }
        }
        // P(d = 1) = 1 / H(11), about 33%.
        assert!(ones > 500, "only {ones} degree-1 draws");
    }
}
