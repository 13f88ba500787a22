//! The single randomness seam of the engine.
//!
//! Setup shuffles, pool reshuffles, presentation order and every random target
//! pick go through one `Shuffle`. Swapping the generator never touches rule
//! code.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Lcg64Xsh32;

use crate::config::ShuffleConfig;

/// A generator whose current position can be copied, so a rejected action
/// can hand back the randomness it consumed.
pub trait SnapshotRng: RngCore + Send {
    fn boxed_clone(&self) -> Box<dyn SnapshotRng>;
}

impl<T> SnapshotRng for T
where
    T: RngCore + Clone + Send + 'static,
{
    fn boxed_clone(&self) -> Box<dyn SnapshotRng> {
        Box::new(self.clone())
    }
}

pub struct Shuffle {
    rng: Box<dyn SnapshotRng>,
    source: String,
}

impl Clone for Shuffle {
    fn clone(&self) -> Self {
        Shuffle {
            rng: self.rng.as_ref().boxed_clone(),
            source: self.source.clone(),
        }
    }
}

impl fmt::Debug for Shuffle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shuffle")
            .field("source", &self.source)
            .finish()
    }
}

/// Expand a u64 seed into the 16 bytes Lcg64Xsh32 expects.
pub fn seed_bytes(seed: u64) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&seed.to_le_bytes());
    bytes[8..16].copy_from_slice(&seed.to_le_bytes());
    bytes
}

impl Shuffle {
    /// OS-seeded, cryptographically strong.
    pub fn secure() -> Self {
        Shuffle {
            rng: Box::new(StdRng::from_entropy()),
            source: "secure".to_string(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Shuffle {
            rng: Box::new(Lcg64Xsh32::from_seed(seed_bytes(seed))),
            source: format!("seeded({})", seed),
        }
    }

    /// Inject any generator.
    pub fn from_rng<R>(rng: R) -> Self
    where
        R: RngCore + Clone + Send + 'static,
    {
        Shuffle {
            rng: Box::new(rng),
            source: "injected".to_string(),
        }
    }

    pub fn from_config(config: ShuffleConfig) -> Self {
        match config {
            ShuffleConfig::Secure => Shuffle::secure(),
            ShuffleConfig::Seeded(seed) => Shuffle::seeded(seed),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Uniform index into a collection of `len` items, `None` when empty.
    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }

    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        self.choose_index(items.len()).map(|i| items[i])
    }

    /// `amount` distinct items in random order (all of them if fewer exist).
    pub fn choose_many<T: Copy>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        items
            .choose_multiple(&mut self.rng, amount)
            .copied()
            .collect()
    }
}
