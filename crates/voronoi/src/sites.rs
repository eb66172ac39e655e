//! Reproducible random site sets.
//!
//! Model
//! - Sites are uniform in a clip rectangle.
//! - Determinism uses a replay token `(seed, index)` mixed into a single `StdRng`, so
//!   the k-th draw of a batch can be regenerated on its own.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::{Point, Rect};

/// Seed used by the CLI and examples when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// `n` uniform sites in `bounds` for draw `tok`.
///
/// A degenerate rectangle (zero width or height) yields sites on its edge line.
pub fn draw_sites(n: usize, bounds: Rect, tok: ReplayToken) -> Vec<Point> {
    let mut rng = tok.to_std_rng();
    (0..n)
        .map(|_| {
            let u: f64 = rng.gen();
            let v: f64 = rng.gen();
            Point::new(
                bounds.min.x + u * bounds.width(),
                bounds.min.y + v * bounds.height(),
            )
        })
        .collect()
}

/// `n` uniform sites in `bounds` from `seed` (draw index 0).
pub fn random_sites(n: usize, bounds: Rect, seed: u64) -> Vec<Point> {
    draw_sites(n, bounds, ReplayToken { seed, index: 0 })
}
