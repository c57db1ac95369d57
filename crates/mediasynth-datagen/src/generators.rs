//! Built-in samplers for the distributions the dataset needs.

use crate::error::ConfigError;
use crate::gen::Gen;
use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Bernoulli, Distribution, Uniform as UniformDist, WeightedIndex};
use rand::{Rng, RngCore};
use rand_distr::{Exp, LogNormal};
use std::fmt::Display;

/// A value drawn uniformly from the inclusive range `[min, max]`.
pub struct Uniform<T: SampleUniform> {
    dist: UniformDist<T>,
}

impl<T> Uniform<T>
where
    T: SampleUniform + PartialOrd + Display + Copy,
{
    pub fn new(field: &str, min: T, max: T) -> Result<Self, ConfigError> {
        // Written as a negation so NaN bounds are rejected too.
        if !(min <= max) {
            return Err(ConfigError::range(field, min, max));
        }
        Ok(Self {
            dist: UniformDist::new_inclusive(min, max),
        })
    }
}

impl<T: SampleUniform> Gen<T> for Uniform<T> {
    fn generate(&self, rng: &mut dyn RngCore) -> T {
        self.dist.sample(rng)
    }
}

/// A value selected from weighted choices.
pub struct WeightedChoice<T> {
    items: Vec<T>,
    weights: WeightedIndex<f64>,
}

impl<T: Clone> WeightedChoice<T> {
    /// Build from `(item, weight)` pairs. Weights need not sum to one.
    pub fn new(table: &str, items: Vec<(T, f64)>) -> Result<Self, ConfigError> {
        let (items, weights): (Vec<_>, Vec<_>) = items.into_iter().unzip();
        let weights =
            WeightedIndex::new(&weights).map_err(|e| ConfigError::weights(table, e.to_string()))?;
        Ok(Self { items, weights })
    }
}

impl<T: Clone> Gen<T> for WeightedChoice<T> {
    fn generate(&self, rng: &mut dyn RngCore) -> T {
        let idx = self.weights.sample(rng);
        self.items[idx].clone()
    }
}

/// A value selected uniformly from a non-empty list.
pub struct OneOf<T> {
    items: Vec<T>,
}

impl<T: Clone> OneOf<T> {
    pub fn new(table: &str, items: Vec<T>) -> Result<Self, ConfigError> {
        if items.is_empty() {
            return Err(ConfigError::empty(table));
        }
        Ok(Self { items })
    }
}

impl<T: Clone> Gen<T> for OneOf<T> {
    fn generate(&self, rng: &mut dyn RngCore) -> T {
        let idx = rng.gen_range(0..self.items.len());
        self.items[idx].clone()
    }
}

/// A boolean that is true with a fixed probability.
pub struct Chance {
    dist: Bernoulli,
}

impl Chance {
    pub fn new(field: &str, prob: f64) -> Result<Self, ConfigError> {
        let dist = Bernoulli::new(prob).map_err(|_| ConfigError::InvalidProbability {
            field: field.to_string(),
            value: prob,
        })?;
        Ok(Self { dist })
    }
}

impl Gen<bool> for Chance {
    fn generate(&self, rng: &mut dyn RngCore) -> bool {
        self.dist.sample(rng)
    }
}

/// A log-normal draw, scaled, truncated to an integer and clamped.
///
/// Used for durations: `clamp(trunc(LogNormal(mu, sigma) * scale), min, max)`.
pub struct ClampedLogNormal {
    dist: LogNormal<f64>,
    scale: f64,
    min: i64,
    max: i64,
}

impl ClampedLogNormal {
    pub fn new(
        field: &str,
        mu: f64,
        sigma: f64,
        scale: f64,
        min: i64,
        max: i64,
    ) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::range(field, min, max));
        }
        let dist = LogNormal::new(mu, sigma).map_err(|e| ConfigError::value(field, e.to_string()))?;
        Ok(Self {
            dist,
            scale,
            min,
            max,
        })
    }
}

impl Gen<i64> for ClampedLogNormal {
    fn generate(&self, rng: &mut dyn RngCore) -> i64 {
        let value = (self.dist.sample(rng) * self.scale) as i64;
        value.clamp(self.min, self.max)
    }
}

/// An exponentially distributed value with the given rate.
pub struct Exponential {
    dist: Exp<f64>,
}

impl Exponential {
    pub fn new(field: &str, rate: f64) -> Result<Self, ConfigError> {
        let dist = Exp::new(rate).map_err(|e| ConfigError::value(field, e.to_string()))?;
        Ok(Self { dist })
    }
}

impl Gen<f64> for Exponential {
    fn generate(&self, rng: &mut dyn RngCore) -> f64 {
        self.dist.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_uniform_is_inclusive() {
        let gen = Uniform::new("test", 1u32, 3u32).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let values = gen.generate_n(&mut rng, 500);
        assert!(values.iter().all(|v| (1..=3).contains(v)));
        assert!(values.contains(&1));
        assert!(values.contains(&3));
    }

    #[test]
    fn test_uniform_rejects_inverted_range() {
        assert!(Uniform::new("word_count", 10i64, 5i64).is_err());
        assert!(Uniform::new("rpm", 2.0f64, f64::NAN).is_err());
    }

    #[test]
    fn test_weighted_choice() {
        let gen = WeightedChoice::new("test", vec![("a", 90.0), ("b", 10.0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let a_count = gen
            .generate_n(&mut rng, 1000)
            .into_iter()
            .filter(|v| *v == "a")
            .count();
        assert!(a_count > 850, "Expected mostly 'a', got {}", a_count);
        assert!(a_count < 950, "Expected some 'b', got {} 'a'", a_count);
    }

    #[test]
    fn test_weighted_choice_rejects_bad_weights() {
        assert!(WeightedChoice::<&str>::new("empty", vec![]).is_err());
        assert!(WeightedChoice::new("zero", vec![("a", 0.0), ("b", 0.0)]).is_err());
        assert!(WeightedChoice::new("negative", vec![("a", -1.0)]).is_err());
    }

    #[test]
    fn test_one_of_rejects_empty() {
        assert!(OneOf::<String>::new("categories", vec![]).is_err());
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let never = Chance::new("never", 0.0).unwrap();
        let always = Chance::new("always", 1.0).unwrap();
        assert!(never.generate_n(&mut rng, 100).iter().all(|b| !b));
        assert!(always.generate_n(&mut rng, 100).iter().all(|b| *b));
        assert!(Chance::new("bad", 1.5).is_err());
    }

    #[test]
    fn test_clamped_log_normal() {
        let gen = ClampedLogNormal::new("engagement", 4.5, 0.8, 1000.0, 5_000, 300_000).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for v in gen.generate_n(&mut rng, 2000) {
            assert!((5_000..=300_000).contains(&v), "{} out of bounds", v);
        }
    }

    #[test]
    fn test_exponential_mean() {
        let gen = Exponential::new("recency", 0.5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let values = gen.generate_n(&mut rng, 20_000);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - 2.0).abs() < 0.1, "mean was {}", mean);
    }
}
