//! Deterministic RNG for spin draws
//!
//! The server seeds from the system clock; tests seed explicitly so draw
//! sequences are reproducible.

/// Trait for random number generation in spin draws
pub trait DrawRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a uniform f64 in [0, 1)
    fn next_fraction(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Generate a random number in range [0, max)
    fn gen_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }
}

/// XorShift32 RNG - simple, fast, deterministic
///
/// Suitable for game logic where cryptographic security is not needed.
/// The same seed always produces the same sequence.
#[derive(Debug, Clone)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is combined into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }

    /// Create a new RNG from a u32 seed
    pub fn seed_from_u32(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }
}

impl DrawRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xorshift_deterministic() {
        let mut rng1 = XorShiftRng::seed_from_u64(12345);
        let mut rng2 = XorShiftRng::seed_from_u64(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_xorshift_different_seeds() {
        let mut rng1 = XorShiftRng::seed_from_u64(12345);
        let mut rng2 = XorShiftRng::seed_from_u64(54321);

        // Very unlikely to be equal with different seeds
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_fraction_in_unit_interval() {
        let mut rng = XorShiftRng::seed_from_u64(42);

        for _ in 0..1000 {
            let val = rng.next_fraction();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_gen_range() {
        let mut rng = XorShiftRng::seed_from_u64(42);

        for _ in 0..100 {
            let val = rng.gen_range(10);
            assert!(val < 10);
        }
    }
}
