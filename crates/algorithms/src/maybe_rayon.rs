//! rayon or sequential iteration, selected by the `parallel` feature.
//!
//! Per-band and per-row work in this crate is written against
//! `into_par_iter()`. With `parallel` enabled that is rayon; without it the
//! shim below turns the same call into a plain `into_iter()`, so the rest
//! of the chain resolves to `Iterator` methods.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
