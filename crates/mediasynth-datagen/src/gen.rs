//! Core sampler trait and combinators.
//!
//! Every sampler draws from a caller-supplied random source, so a whole run is
//! a function of (configuration, seed). Samplers never hold their own RNG.

use rand::RngCore;

/// A sampler that produces values of type `T` from a random source.
pub trait Gen<T> {
    /// Draw a single value.
    fn generate(&self, rng: &mut dyn RngCore) -> T;

    /// Draw `n` values in one batch.
    ///
    /// Draws happen in order, so the result is identical to calling
    /// [`Gen::generate`] `n` times.
    fn generate_n(&self, rng: &mut dyn RngCore, n: usize) -> Vec<T> {
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            values.push(self.generate(rng));
        }
        values
    }

    /// Transform the drawn value.
    fn map<U, F>(self, f: F) -> Mapped<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> U,
    {
        Mapped {
            gen: self,
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A sampler that post-processes another sampler's output.
pub struct Mapped<G, F, T> {
    gen: G,
    f: F,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, U, G, F> Gen<U> for Mapped<G, F, T>
where
    G: Gen<T>,
    F: Fn(T) -> U,
{
    fn generate(&self, rng: &mut dyn RngCore) -> U {
        (self.f)(self.gen.generate(rng))
    }
}
