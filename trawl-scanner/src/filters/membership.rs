use crate::error::{Result, ScanError};
use parking_lot::Mutex;
use std::f64::consts::LN_2;
use xxhash_rust::xxh3::xxh3_128;

/// Largest bit array a single store may allocate (1 GiB).
const MAX_BITS: u64 = 8 * 1024 * 1024 * 1024;

/// Bloom filter with an atomic test-and-set.
///
/// Memory is fixed at construction regardless of how many keys are inserted; the
/// price is a small chance of reporting an unseen key as already present.
pub struct MembershipStore {
    words: Mutex<Option<Vec<u64>>>,
    num_bits: u64,
    num_hashes: u32,
}

impl MembershipStore {
    /// Sizes the store for `expected_items` keys at `false_positive_rate`.
    pub fn with_capacity(expected_items: usize, false_positive_rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(ScanError::FilterInit(
                "expected item count must be positive".to_string(),
            ));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(ScanError::FilterInit(format!(
                "false positive rate must be within (0, 1), got {}",
                false_positive_rate
            )));
        }

        let n = expected_items as f64;
        let bits = (-n * false_positive_rate.ln() / (LN_2 * LN_2)).ceil();
        if !bits.is_finite() || bits > MAX_BITS as f64 {
            return Err(ScanError::FilterInit(format!(
                "{} items at rate {} needs more than {} bits",
                expected_items, false_positive_rate, MAX_BITS
            )));
        }

        let num_bits = (bits as u64).max(64);
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().clamp(1.0, 32.0) as u32;

        let len = num_bits.div_ceil(64) as usize;
        let mut words = Vec::new();
        words
            .try_reserve_exact(len)
            .map_err(|e| ScanError::FilterInit(format!("could not allocate store: {}", e)))?;
        words.resize(len, 0u64);

        Ok(Self {
            words: Mutex::new(Some(words)),
            num_bits,
            num_hashes,
        })
    }

    /// Records `key`. Returns true if it was not present before.
    ///
    /// A closed store records nothing and returns false.
    pub fn insert(&self, key: &[u8]) -> bool {
        let probes = self.probes(key);
        let mut guard = self.words.lock();
        let Some(words) = guard.as_mut() else {
            return false;
        };

        let mut fresh = false;
        for bit in probes {
            let (word, mask) = ((bit / 64) as usize, 1u64 << (bit % 64));
            if words[word] & mask == 0 {
                words[word] |= mask;
                fresh = true;
            }
        }
        fresh
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        let probes = self.probes(key);
        let guard = self.words.lock();
        match guard.as_ref() {
            Some(words) => probes
                .into_iter()
                .all(|bit| words[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0),
            None => false,
        }
    }

    /// Drops the bit array.
    pub fn close(&self) {
        self.words.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.words.lock().is_none()
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    // Kirsch-Mitzenmacher double hashing over both halves of one 128-bit digest.
    fn probes(&self, key: &[u8]) -> Vec<u64> {
        let digest = xxh3_128(key);
        let h1 = digest as u64;
        let h2 = ((digest >> 64) as u64) | 1;
        (0..u64::from(self.num_hashes))
            .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits)
            .collect()
    }
}
