//! Generators for reference and test data files.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_common::Sample;

/// Full-scale amplitude of a Q31 sample.
const Q31_SCALE: f64 = 2_147_483_647.0;

/// A sine sampled at `rate` Hz for `seconds`, in Q31.
///
/// Produces `rate * seconds + 1` samples, `trunc(sin(2 pi f n / rate) * (2^31 - 1))`
/// for `n` from zero, so the last sample lands exactly on `seconds`.
pub fn sine_q31(rate: u32, frequency: f64, seconds: u32) -> Vec<Sample> {
    let count = u64::from(rate) * u64::from(seconds) + 1;
    let rate = f64::from(rate.max(1));
    (0..count)
        .map(|n| {
            let phase = 2.0 * PI * frequency * n as f64 / rate;
            Sample::from_signed((phase.sin() * Q31_SCALE) as i32)
        })
        .collect()
}

/// Test words around `threshold`, sorted and without duplicates.
///
/// Fixed values just below and above the threshold, `rounds` random draws
/// from four ranges, and the 32-bit edges. Arithmetic near the edges wraps.
pub fn threshold_vectors(threshold: i32, rounds: usize, seed: u64) -> Vec<Sample> {
    let t = threshold;
    let below = [
        t.wrapping_sub(1),
        t.wrapping_sub(100),
        t.wrapping_sub(1_000),
        t.wrapping_sub(10_000),
        t / 2,
        t / 10,
        0,
        -100_000,
        -1_000_000,
    ];
    let above = [
        t.wrapping_add(1),
        t.wrapping_add(100),
        t.wrapping_add(1_000),
        t.wrapping_add(10_000),
        t.saturating_mul(2),
        t.saturating_mul(10),
        2_000_000,
        10_000_000,
        50_000_000,
        100_000_000,
        2_000_000_000,
    ];
    let edges = [i32::MIN, -1, 0, 1, i32::MAX, 999_999, 1_000_000, 1_000_001];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut values: Vec<i32> = below.into_iter().chain(above).chain(edges).collect();
    for _ in 0..rounds {
        values.push(rng.gen_range(-1_000_000..=1_000_000));
        values.push(rng.gen_range(-10_000_000..=10_000_000));
        values.push(rng.gen_range(0..=2_000_000));
        values.push(rng.gen_range(1_000_001..=5_000_000));
    }
    values.sort_unstable();
    values.dedup();
    values.into_iter().map(Sample::from_signed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_length_and_shape() {
        let s = sine_q31(1_000, 10.0, 1);
        assert_eq!(s.len(), 1_001);
        assert_eq!(s[0].signed(), 0);
        // Quarter period of a 10 Hz sine at 1 kHz is sample 25.
        assert!(s[25].signed() > 2_147_000_000);
        assert!(s[75].signed() < -2_147_000_000);
        assert!(s.iter().all(|v| v.signed() != i32::MIN));
    }

    #[test]
    fn zero_duration_gives_one_sample() {
        assert_eq!(sine_q31(48_000, 1.0, 0).len(), 1);
    }

    #[test]
    fn vectors_are_sorted_unique_and_cover_edges() {
        let v: Vec<i32> = threshold_vectors(1_000_000, 10, 7)
            .into_iter()
            .map(Sample::signed)
            .collect();
        assert!(v.windows(2).all(|w| w[0] < w[1]));
        for edge in [i32::MIN, -1, 0, 1, i32::MAX, 999_999, 1_000_000, 1_000_001] {
            assert!(v.contains(&edge), "{edge} missing");
        }
        assert!(v.contains(&2_000_000_000));
    }

    #[test]
    fn vectors_are_reproducible() {
        assert_eq!(threshold_vectors(500, 5, 42), threshold_vectors(500, 5, 42));
        assert_ne!(threshold_vectors(500, 5, 42), threshold_vectors(500, 5, 43));
    }

    #[test]
    fn extreme_threshold_does_not_overflow() {
        let v = threshold_vectors(i32::MAX, 0, 0);
        assert!(v.contains(&Sample::from_signed(i32::MIN)));
        let v = threshold_vectors(i32::MIN, 0, 0);
        assert!(v.contains(&Sample::from_signed(i32::MAX)));
    }
}
