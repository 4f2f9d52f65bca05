/// Space implementations.

pub mod space;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::core::{EnvError, Result};

pub use space::Space;

/// A discrete space of indices in [0, n).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Discrete {
    n: usize,
}

impl Discrete {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Discrete space requires n > 0");
        Self { n }
    }

    pub fn n(&self) -> usize { self.n }

    /// Check that `index` lies in the space, naming it `what` in the error.
    pub fn check(&self, what: &'static str, index: usize) -> Result<usize> {
        if index < self.n {
            Ok(index)
        } else {
            Err(EnvError::OutOfBounds { what, index, len: self.n })
        }
    }
}

impl Space for Discrete {
    type Element = usize;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        if self.n == 1 { return 0; }
        Uniform::from(0..self.n).sample(rng)
    }

    fn contains(&self, elem: &Self::Element) -> bool { *elem < self.n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng_from_seed;

    #[test]
    fn discrete_sample_and_check() {
        let d = Discrete::new(4);
        let mut rng = rng_from_seed(42);
        for _ in 0..100 {
            let v = d.sample(&mut rng);
            assert!(d.contains(&v));
        }
        assert_eq!(d.check("action", 3), Ok(3));
        assert_eq!(
            d.check("action", 4),
            Err(EnvError::OutOfBounds { what: "action", index: 4, len: 4 })
        );
    }

    #[test]
    #[should_panic(expected = "requires n > 0")]
    fn discrete_rejects_empty() {
        let _ = Discrete::new(0);
    }
}
