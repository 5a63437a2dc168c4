use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Named random streams derived from one seed.
///
/// A stream's state depends only on the seed and on the order in which stream
/// names are first requested, so a fixed phase list reproduces the same map.
pub struct RngStreams {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngStreams {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> PhaseRng<'_> {
        let master = &mut self.master;
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(master.next_u64()));
        PhaseRng { inner: entry }
    }
}

/// Borrowed view of one named stream.
pub struct PhaseRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl PhaseRng<'_> {
    /// Seed for a coherent-noise field drawn from this stream.
    pub fn noise_seed(&mut self) -> u32 {
        self.inner.next_u32()
    }
}

impl RngCore for PhaseRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
