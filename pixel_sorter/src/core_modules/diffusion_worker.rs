// THEORY:
// A `DiffusionWorker` owns one column for one iteration. It visits the column's
// rows in shuffled order, asks the `NeighborLocator` for each pixel's best match,
// and moves the pixel a single cell toward that match by swapping it with the
// orthogonal neighbor in that direction.
//
// The best match may be up to `radius` cells away, but a pixel only ever moves one
// cell per iteration. Similar colors therefore gather gradually over many
// iterations instead of teleporting, which is what gives the output its "flow".

use crate::core_modules::grid::{PixelSource, Point};
use crate::core_modules::lock_grid::LockGrid;
use crate::core_modules::neighbor_locator::NeighborLocator;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// What one worker did during one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub column: usize,
    pub visited: usize,
    pub swaps: usize,
}

/// The single orthogonal step from `from` toward `to`, or `None` when they coincide.
///
/// With slope `m = |dy| / |dx|`, the step is vertical when `m > 1` (including
/// `dx == 0`, an infinite slope) and horizontal otherwise, so exact diagonals move
/// horizontally.
pub fn step_toward(from: Point, to: Point) -> Option<Point> {
    if from == to {
        return None;
    }

    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);

    let step = if dx == 0 || dy > dx {
        if to.y < from.y {
            Point::new(from.x, from.y - 1)
        } else {
            Point::new(from.x, from.y + 1)
        }
    } else if to.x < from.x {
        Point::new(from.x - 1, from.y)
    } else {
        Point::new(from.x + 1, from.y)
    };
    Some(step)
}

pub struct DiffusionWorker {
    column: usize,
    locator: NeighborLocator,
    rng: ChaCha8Rng,
}

impl DiffusionWorker {
    pub fn new(column: usize, locator: NeighborLocator, rng: ChaCha8Rng) -> Self {
        Self {
            column,
            locator,
            rng,
        }
    }

    /// Runs one pass over the column against the shared grid.
    pub fn run(mut self, grid: &LockGrid) -> WorkerReport {
        let (_, height) = grid.dimensions();
        let mut report = WorkerReport {
            column: self.column,
            ..WorkerReport::default()
        };

        let mut rows: Vec<usize> = (0..height).collect();
        rows.shuffle(&mut self.rng);

        for y in rows {
            let here = Point::new(self.column, y);
            let best = self.locator.locate(grid, here, &mut self.rng);
            report.visited += 1;

            // The step lies between `here` and an in-bounds match, so it is in bounds too.
            if let Some(next) = step_toward(here, best) {
                grid.swap(here, next);
                report.swaps += 1;
            }
        }

        report
    }
}
