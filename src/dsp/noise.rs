//! Pseudo-random noise sources.

/*
White, Gaussian and Brownian Noise
==================================

All three sources share one pseudo-random core: Sebastiano Vigna's
xoshiro256** (https://prng.di.unimi.it). It is fast, passes the usual
statistical batteries, and its 256 bits of state are plain data, so a
generator can live inside a node without locks or allocation.

The generator is `rand_xoshiro`'s. Seeding through
`SeedableRng::seed_from_u64` expands a single 64-bit seed into four state
words with SplitMix64, as the xoshiro authors recommend. The same seed
always yields the same sample stream.

Turning 64 bits into samples
----------------------------

Every draw is split into four 16-bit lanes (most significant first).

  uniform    one lane per sample: u · (2 / 65536) - 1     → [-1, 1)
  gaussian   the four lanes of one draw summed, then
             sum / 131072 - 1                            → [-1, 1)
             Adding four uniform values is a cheap
             central-limit approximation of a bell curve.
  brownian   uniform noise scaled by 0.01 and integrated. When the
             running value overshoots ±1 it is reflected back
             (z → 2 - z, z → -2 - z), keeping the walk bounded.

The reflection is not true Brownian motion; the perceived color of the
output depends on it, so it is kept exactly.
*/

use rand_core::RngCore;

pub use rand_xoshiro::{SplitMix64, Xoshiro256StarStar};

const LANE_SCALE: f32 = 2.0 / 65_536.0;
const LANE_SUM_SCALE: f32 = 1.0 / 131_072.0;
const BROWNIAN_STEP: f32 = 0.01;

#[inline]
fn lanes(value: u64) -> [u16; 4] {
    [
        (value >> 48) as u16,
        (value >> 32) as u16,
        (value >> 16) as u16,
        value as u16,
    ]
}

/// Fill `buffer` with uniform noise in `[-1, 1)`.
pub fn fill_uniform(rng: &mut Xoshiro256StarStar, buffer: &mut [f32]) {
    for chunk in buffer.chunks_mut(4) {
        let draw = lanes(rng.next_u64());
        for (sample, lane) in chunk.iter_mut().zip(draw) {
            *sample = lane as f32 * LANE_SCALE - 1.0;
        }
    }
}

/// Fill `buffer` with approximately normal noise in `[-1, 1)`.
pub fn fill_gaussian(rng: &mut Xoshiro256StarStar, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        let sum: u32 = lanes(rng.next_u64()).iter().map(|&lane| lane as u32).sum();
        *sample = sum as f32 * LANE_SUM_SCALE - 1.0;
    }
}

/// Reflecting integrator that turns uniform noise into a bounded random walk.
#[derive(Debug, Default, Clone)]
pub struct BrownianWalk {
    z: f32,
}

impl BrownianWalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate `buffer` (expected to hold uniform noise) in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        let mut z = self.z;

        for sample in buffer.iter_mut() {
            z += *sample * BROWNIAN_STEP;

            if z > 1.0 {
                z = 2.0 - z;
            } else if z < -1.0 {
                z = -2.0 - z;
            }

            *sample = z;
        }

        self.z = z;
    }

    pub fn value(&self) -> f32 {
        self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::SeedableRng;

    #[test]
    fn test_splitmix_reference_values() {
        // First outputs for seed 0 from the reference implementation.
        let mut rng = SplitMix64::seed_from_u64(0);
        assert_eq!(rng.next_u64(), 0xe220_a839_7b1d_cdaf);
        assert_eq!(rng.next_u64(), 0x6e78_9e6a_a1b9_65f4);
    }

    #[test]
    fn test_xoshiro_is_seeded_through_splitmix() {
        let mut expander = SplitMix64::seed_from_u64(42);
        let mut seed = [0u8; 32];
        for word in seed.chunks_exact_mut(8) {
            word.copy_from_slice(&expander.next_u64().to_le_bytes());
        }

        let mut from_u64 = Xoshiro256StarStar::seed_from_u64(42);
        let mut from_state = Xoshiro256StarStar::from_seed(seed);
        for _ in 0..1000 {
            assert_eq!(from_u64.next_u64(), from_state.next_u64());
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Xoshiro256StarStar::seed_from_u64(42);
        let mut b = Xoshiro256StarStar::seed_from_u64(42);
        let mut c = Xoshiro256StarStar::seed_from_u64(43);

        let first: Vec<u64> = (0..16).map(|_| a.next_u64()).collect();
        let second: Vec<u64> = (0..16).map(|_| b.next_u64()).collect();
        let other: Vec<u64> = (0..16).map(|_| c.next_u64()).collect();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_uniform_range_and_mean() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let mut buffer = vec![0.0f32; 65_536];
        fill_uniform(&mut rng, &mut buffer);

        assert!(buffer.iter().all(|&s| (-1.0..1.0).contains(&s)));

        let mean = buffer.iter().map(|&s| s as f64).sum::<f64>() / buffer.len() as f64;
        assert!(mean.abs() < 0.02, "mean should be near zero, got {mean}");
    }

    #[test]
    fn test_uniform_uses_four_lanes_per_draw() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(99);
        let mut buffer = vec![0.0f32; 6];
        fill_uniform(&mut rng, &mut buffer);

        let mut reference = Xoshiro256StarStar::seed_from_u64(99);
        let first = lanes(reference.next_u64());
        let second = lanes(reference.next_u64());
        let expected: Vec<f32> = first
            .iter()
            .chain(&second[..2])
            .map(|&lane| lane as f32 * LANE_SCALE - 1.0)
            .collect();

        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_gaussian_is_centered_and_narrower_than_uniform() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let mut buffer = vec![0.0f32; 65_536];
        fill_gaussian(&mut rng, &mut buffer);

        assert!(buffer.iter().all(|&s| (-1.0..1.0).contains(&s)));

        let n = buffer.len() as f64;
        let mean = buffer.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = buffer.iter().map(|&s| (s as f64 - mean).powi(2)).sum::<f64>() / n;

        // Uniform [-1, 1) has variance 1/3; the sum of four lanes has 1/12.
        assert!(mean.abs() < 0.01);
        assert!((variance - 1.0 / 12.0).abs() < 0.01, "variance {variance}");
    }

    #[test]
    fn test_brownian_walk_stays_bounded() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut walk = BrownianWalk::new();
        let mut buffer = vec![0.0f32; 4096];

        for _ in 0..64 {
            fill_uniform(&mut rng, &mut buffer);
            walk.render(&mut buffer);
            assert!(buffer.iter().all(|&s| (-1.0..=1.0).contains(&s)));
        }
    }

    #[test]
    fn test_brownian_reflects_at_edges() {
        let mut walk = BrownianWalk { z: 0.995 };
        let mut buffer = [1.0f32];
        walk.render(&mut buffer);

        // 0.995 + 0.01 = 1.005 → reflected to 0.995
        assert!((buffer[0] - 0.995).abs() < 1e-6);

        let mut walk = BrownianWalk { z: -0.995 };
        let mut buffer = [-1.0f32];
        walk.render(&mut buffer);
        assert!((buffer[0] + 0.995).abs() < 1e-6);
    }
}
