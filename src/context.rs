// This file is part of the ecgen package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Randomness context for the generation engine.
//!
//! Every draw the engine makes goes through a [`Context`], so a run seeded
//! with [`Context::from_seed`] and a single worker is reproducible
//! bit-for-bit. Workers get their own context via [`Context::fork`], seeded
//! from the parent stream, because a context must never be shared across
//! threads.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

pub struct Context {
    rng: ChaCha12Rng,
}

impl Context {
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha12Rng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Derive an independent context for a worker thread.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.gen())
    }

    pub fn rng(&mut self) -> &mut ChaCha12Rng {
        &mut self.rng
    }
}
