// THEORY:
// The `NeighborLocator` answers one question for the diffusion worker: "which pixel
// near (x, y) looks most like the pixel at (x, y)?" It scans a square window of
// half-extent `radius` around the target and keeps the candidate with the lowest
// RGB Manhattan distance.
//
// Key rules:
// 1.  **Randomized traversal**: the column offsets are shuffled once per call and
//     the row offsets are reshuffled for every candidate column. A fixed raster
//     scan would always favor the same direction on ties, and the picture would
//     drift that way over many iterations.
// 2.  **First-seen wins ties**: a candidate only replaces the current best when it
//     is strictly closer, so among equal distances the first one in shuffled order
//     is kept.
// 3.  **Self-bias**: the target's own coordinate is scored with `noise` added. A
//     pixel does not "stay put" merely because it matches itself; it stays only
//     when no neighbor comes within `noise` of it.
// 4.  **Bounds**: candidates outside the grid are skipped. The target is always in
//     bounds, so there is always a result (possibly the target itself).

use crate::core_modules::grid::{PixelSource, Point};
use crate::core_modules::smart_pixel::smart_pixel::rgb_distance;
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy)]
pub struct NeighborLocator {
    /// Half-extent of the search window.
    radius: usize,
    /// Penalty added to the target's own score.
    noise: u32,
}

impl NeighborLocator {
    pub fn new(radius: usize, noise: u32) -> Self {
        Self { radius, noise }
    }

    /// The radius actually scanned on a `width` x `height` grid. Offsets past the
    /// grid's largest extent can never land in bounds.
    fn effective_radius(&self, width: usize, height: usize) -> i64 {
        let clamped = self.radius.min(width.max(height).saturating_sub(1));
        i64::try_from(clamped).unwrap_or(i64::MAX)
    }

    /// Returns the coordinate of the most similar pixel in the window around `target`.
    pub fn locate<S, R>(&self, source: &S, target: Point, rng: &mut R) -> Point
    where
        S: PixelSource + ?Sized,
        R: Rng + ?Sized,
    {
        let reference = source.sample(target);
        let (width, height) = source.dimensions();
        let radius = self.effective_radius(width, height);
        let (tx, ty) = (target.x as i64, target.y as i64);

        let mut best = target;
        let mut best_score = u64::MAX;

        let mut column_offsets: Vec<i64> = (-radius..=radius).collect();
        let mut row_offsets: Vec<i64> = (-radius..=radius).collect();
        column_offsets.shuffle(rng);

        for dx in column_offsets {
            let i = tx + dx;
            if !source.contains(i, ty) {
                continue;
            }

            row_offsets.shuffle(rng);
            for &dy in &row_offsets {
                let j = ty + dy;
                if !source.contains(i, j) {
                    continue;
                }

                let candidate = Point::new(i as usize, j as usize);
                let mut score = rgb_distance(&reference, &source.sample(candidate)) as u64;
                if candidate == target {
                    score += self.noise as u64;
                }

                if score < best_score {
                    best = candidate;
                    best_score = score;
                }
            }
        }

        best
    }
}
