// THEORY:
// The `LockGrid` is the shared, concurrently mutated form of a `PixelGrid` used by
// the diffusion mode. It is an arena of cells, one per coordinate, each behind its
// own read/write lock. Workers for different columns reach into each other's
// columns (search windows cross column boundaries), so locking is per pixel, never
// per column, and no lock is ever held across an iteration.
//
// Locking discipline:
// 1.  `sample` holds a read lock for a single read and releases it before the
//     caller does anything with the value. No read lock lives across decision logic.
// 2.  `swap` is the only writer. It takes exactly two write locks in ascending
//     flat-index order, exchanges the values and releases both. A global order on
//     a pair of locks cannot form a cycle, so there is no deadlock, and because
//     the exchange is atomic the multiset of pixels is conserved exactly.

use crate::core_modules::grid::{PixelGrid, PixelSource, Point};
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::SortError;
use parking_lot::RwLock;

pub struct LockGrid {
    width: usize,
    height: usize,
    cells: Vec<RwLock<Pixel>>,
}

impl LockGrid {
    fn index(&self, point: Point) -> usize {
        point.y * self.width + point.x
    }

    /// Exchanges the pixels at `a` and `b`.
    pub fn swap(&self, a: Point, b: Point) {
        let (ia, ib) = (self.index(a), self.index(b));
        if ia == ib {
            return;
        }
        let (first, second) = if ia < ib { (ia, ib) } else { (ib, ia) };

        let mut low = self.cells[first].write();
        let mut high = self.cells[second].write();
        std::mem::swap(&mut *low, &mut *high);
    }

    /// Consumes the locks and hands back a plain grid.
    pub fn into_grid(self) -> Result<PixelGrid, SortError> {
        let pixels = self.cells.into_iter().map(RwLock::into_inner).collect();
        PixelGrid::new(self.width, self.height, pixels)
    }
}

impl From<PixelGrid> for LockGrid {
    fn from(grid: PixelGrid) -> Self {
        let (width, height) = grid.dimensions();
        Self {
            width,
            height,
            cells: grid.into_pixels().into_iter().map(RwLock::new).collect(),
        }
    }
}

impl PixelSource for LockGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample(&self, point: Point) -> Pixel {
        *self.cells[self.index(point)].read()
    }
}
