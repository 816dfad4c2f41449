// THEORY:
// The `PixelGrid` is the decoded image the engine works on: a fixed rectangle of
// `Pixel`s addressed by (x, y), x in [0, width), y in [0, height). Dimensions
// never change during a run and every coordinate always holds a pixel.
//
// Storage is a flat row-major `Vec<Pixel>`. The segment mode wants whole columns
// it can own and hand to independent jobs, so the grid can be taken apart into
// columns and reassembled. The diffusion mode wraps the grid in a `LockGrid`
// instead. Both expose the same read seam, `PixelSource`, which is all the
// neighbor locator ever needs.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::SortError;

/// A coordinate in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Read access to a rectangular pixel store.
pub trait PixelSource {
    /// (width, height)
    fn dimensions(&self) -> (usize, usize);

    /// Reads one pixel. `point` must be in bounds.
    fn sample(&self, point: Point) -> Pixel;

    /// Bounds check for signed candidate coordinates.
    fn contains(&self, x: i64, y: i64) -> bool {
        let (width, height) = self.dimensions();
        x >= 0 && y >= 0 && (x as u64) < width as u64 && (y as u64) < height as u64
    }
}

/// A mutable 2D array of RGBA pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    /// Row-major pixel storage, `width * height` long.
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self, SortError> {
        if pixels.len() != width * height {
            return Err(SortError::DimensionMismatch {
                len: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid where every coordinate holds `pixel`.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Overwrites the pixel at (x, y). Panics when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) is outside a {}x{} grid",
            self.width,
            self.height
        );
        self.pixels[y * self.width + x] = pixel;
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Copies column `x` top to bottom.
    pub fn column(&self, x: usize) -> Vec<Pixel> {
        (0..self.height)
            .map(|y| self.pixels[y * self.width + x])
            .collect()
    }

    /// Splits the grid into owned columns, left to right.
    pub fn into_columns(self) -> Vec<Vec<Pixel>> {
        (0..self.width).map(|x| self.column(x)).collect()
    }

    /// Reassembles a grid from columns produced by `into_columns`.
    pub fn from_columns(
        width: usize,
        height: usize,
        columns: Vec<Vec<Pixel>>,
    ) -> Result<Self, SortError> {
        let total: usize = columns.iter().map(Vec::len).sum();
        if columns.len() != width || columns.iter().any(|c| c.len() != height) {
            return Err(SortError::DimensionMismatch {
                len: total,
                width,
                height,
            });
        }

        let mut grid = Self::filled(width, height, Pixel::default());
        for (x, column) in columns.into_iter().enumerate() {
            for (y, pixel) in column.into_iter().enumerate() {
                grid.pixels[y * width + x] = pixel;
            }
        }
        Ok(grid)
    }
}

impl PixelSource for PixelGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample(&self, point: Point) -> Pixel {
        self.pixels[point.y * self.width + point.x]
    }
}
