use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Maps serialized keys to slot indices in `[0, table_size)`.
pub trait HashFunction {
    fn new(seed: u64) -> Self
    where
        Self: Sized;
    fn hash(&self, key: &[u8], table_size: usize) -> usize;
}

pub struct XxHashFunction {
    seed: u64,
}

impl HashFunction for XxHashFunction {
    fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn hash(&self, key: &[u8], table_size: usize) -> usize {
        let hash_val = xxh3_64_with_seed(key, self.seed);
        (hash_val % table_size as u64) as usize
    }
}

/// A hash function that sends every key to the same slot, for maximum
/// collision in tests.
#[cfg(test)]
pub struct ConstHashFunction {
    hash_val: u64,
}

#[cfg(test)]
impl HashFunction for ConstHashFunction {
    fn new(seed: u64) -> Self {
        Self { hash_val: seed }
    }

    fn hash(&self, _key: &[u8], table_size: usize) -> usize {
        (self.hash_val % table_size as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_hash_stays_in_range() {
        let hash_fn = XxHashFunction::new(0);
        for key in 0u32..100 {
            assert!(hash_fn.hash(&key.to_be_bytes(), 7) < 7);
        }
    }

    #[rstest]
    fn test_hash_is_deterministic_per_seed() {
        let a = XxHashFunction::new(42);
        let b = XxHashFunction::new(42);
        let c = XxHashFunction::new(43);
        assert_eq!(a.hash(b"key", 1024), b.hash(b"key", 1024));
        // A different seed scatters keys differently somewhere in a batch.
        assert!((0u32..64).any(|k| {
            a.hash(&k.to_be_bytes(), 1024) != c.hash(&k.to_be_bytes(), 1024)
        }));
    }
}
