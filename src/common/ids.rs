//! Deterministic hash helpers for algorithm identifiers.

/// Small non-cryptographic FNV-1a hash used to derive per-algorithm seeds.
#[derive(Copy, Clone, Debug)]
pub struct SimpleHash(u64);

impl SimpleHash {
    /// Create a new hash state with the 64-bit FNV offset basis.
    pub fn new() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }

    /// Feed bytes into the hash function.
    pub fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = (self.0 ^ u64::from(*b)).wrapping_mul(0x0000_0100_0000_01b3);
        }
    }

    pub fn finish64(&self) -> u64 {
        self.0
    }
}

impl Default for SimpleHash {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for one algorithm's placeholder network: base seed mixed with the id.
pub fn algorithm_seed(base: u64, algorithm_id: &str) -> u64 {
    let mut hasher = SimpleHash::new();
    hasher.update(&base.to_le_bytes());
    hasher.update(algorithm_id.as_bytes());
    hasher.finish64()
}
