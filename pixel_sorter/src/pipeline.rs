// THEORY:
// The `pipeline` module is the top-level API of the engine. It takes a decoded
// grid, a mode and one immutable configuration, and hands back the reordered
// grid. It is only a selector: the segment mode goes to the `ColumnSortPool`,
// the diffusion mode to the `DiffusionScheduler`.
//
// Configuration is fixed for the duration of a run. It is validated once in
// `SortPipeline::new` and then copied into each component at construction;
// no component reads shared mutable tunables.

use crate::core_modules::grid::PixelGrid;
use crate::error::SortError;
use crate::parallel_pipeline::{ColumnSortPool, DiffusionScheduler, DiffusionSettings};

// Re-export key data structures for the public API.
pub use crate::core_modules::grid::Point;
pub use crate::core_modules::pixel::pixel::Pixel;

pub const DEFAULT_TOLERANCE: f64 = 0.1;
pub const DEFAULT_SEARCH_RADIUS: usize = 10;
pub const DEFAULT_ITERATIONS: usize = 10;
pub const DEFAULT_NOISE: u32 = 50;

/// Which reordering algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Segment each column into similar runs and sort every run by intensity.
    Segment,
    /// Nudge every pixel toward its most similar neighbor, over many iterations.
    Diffusion,
}

impl TryFrom<u8> for SortMode {
    type Error = SortError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SortMode::Segment),
            1 => Ok(SortMode::Diffusion),
            other => Err(SortError::UnknownMode(other)),
        }
    }
}

/// Configuration for the SortPipeline.
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Relative channel difference that ends a run. Segment mode only.
    pub tolerance: f64,
    /// Half-extent of the neighbor search window. Diffusion mode only.
    pub search_radius: usize,
    /// Number of diffusion passes over the whole grid. Diffusion mode only.
    pub iterations: usize,
    /// Penalty added to a pixel's own score when it is compared with its neighbors.
    pub noise: u32,
    /// Seed for the traversal orders. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            search_radius: DEFAULT_SEARCH_RADIUS,
            iterations: DEFAULT_ITERATIONS,
            noise: DEFAULT_NOISE,
            seed: None,
        }
    }
}

/// The glyph printed after a completed diffusion iteration: `X` every tenth,
/// `|` every fifth, `.` otherwise.
pub fn progress_glyph(completed: usize) -> char {
    match completed % 10 {
        0 => 'X',
        5 => '|',
        _ => '.',
    }
}

pub struct SortPipeline {
    mode: SortMode,
    config: SortConfig,
}

impl SortPipeline {
    pub fn new(mode: SortMode, config: SortConfig) -> Result<Self, SortError> {
        if config.tolerance.is_nan() || config.tolerance < 0.0 {
            return Err(SortError::InvalidTolerance(config.tolerance));
        }
        Ok(Self { mode, config })
    }

    pub async fn process(&self, grid: PixelGrid) -> Result<PixelGrid, SortError> {
        self.process_with_progress(grid, |_| {}).await
    }

    /// Same as `process`; `on_iteration` is called after each diffusion iteration.
    pub async fn process_with_progress<F>(
        &self,
        grid: PixelGrid,
        on_iteration: F,
    ) -> Result<PixelGrid, SortError>
    where
        F: FnMut(usize),
    {
        match self.mode {
            SortMode::Segment => ColumnSortPool::new(self.config.tolerance).run(grid).await,
            SortMode::Diffusion => {
                let scheduler = DiffusionScheduler::new(DiffusionSettings {
                    search_radius: self.config.search_radius,
                    iterations: self.config.iterations,
                    noise: self.config.noise,
                    seed: self.config.seed,
                });
                scheduler.run_with_progress(grid, on_iteration).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::column_segmenter::ColumnSegmenter;
    use crate::core_modules::grid::PixelSource;

    fn gray(v: u16) -> Pixel {
        Pixel::new(v, v, v, u16::MAX)
    }

    #[test]
    fn mode_from_selector() {
        assert_eq!(SortMode::try_from(0u8).unwrap(), SortMode::Segment);
        assert_eq!(SortMode::try_from(1u8).unwrap(), SortMode::Diffusion);
        assert!(matches!(SortMode::try_from(2u8), Err(SortError::UnknownMode(2))));
    }

    #[test]
    fn defaults() {
        let config = SortConfig::default();
        assert_eq!(config.tolerance, 0.1);
        assert_eq!(config.search_radius, 10);
        assert_eq!(config.iterations, 10);
        assert_eq!(config.noise, 50);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn rejects_bad_tolerance() {
        for tolerance in [-0.5, f64::NEG_INFINITY, f64::NAN] {
            let config = SortConfig {
                tolerance,
                ..SortConfig::default()
            };
            assert!(matches!(
                SortPipeline::new(SortMode::Segment, config),
                Err(SortError::InvalidTolerance(_))
            ));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn infinite_tolerance_sorts_whole_columns() {
        let grid = PixelGrid::new(2, 4, vec![
            gray(10), gray(0),
            gray(60000), gray(0),
            gray(300), gray(65535),
            gray(20000), gray(7),
        ])
        .unwrap();
        let config = SortConfig {
            tolerance: f64::INFINITY,
            ..SortConfig::default()
        };
        let out = SortPipeline::new(SortMode::Segment, config)
            .unwrap()
            .process(grid)
            .await
            .unwrap();

        assert_eq!(out.column(0), vec![gray(60000), gray(20000), gray(300), gray(10)]);
        assert_eq!(out.column(1), vec![gray(65535), gray(7), gray(0), gray(0)]);
    }

    #[test]
    fn progress_glyphs() {
        let strip: String = (1..=10).map(progress_glyph).collect();
        assert_eq!(strip, "....|....X");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn segment_mode_sorts_detected_runs() {
        let values = [
            [100u16, 9000, 120, 40000],
            [110, 9100, 60000, 41000],
            [90, 8900, 62000, 39000],
            [5000, 20, 61000, 100],
            [5100, 22, 200, 101],
        ];
        let pixels = values.iter().flat_map(|row| row.iter().map(|&v| gray(v))).collect();
        let grid = PixelGrid::new(4, 5, pixels).unwrap();

        let pipeline = SortPipeline::new(SortMode::Segment, SortConfig::default()).unwrap();
        let out = pipeline.process(grid.clone()).await.unwrap();

        let segmenter = ColumnSegmenter::new(0.1);
        for x in 0..4 {
            let before = grid.column(x);
            let after = out.column(x);
            for run in segmenter.segment(&before) {
                let run_after = &after[run.range()];
                assert!(run_after.windows(2).all(|w| w[0].intensity() >= w[1].intensity()));

                let mut a: Vec<_> = before[run.range()].to_vec();
                let mut b: Vec<_> = run_after.to_vec();
                a.sort_by_key(Pixel::channels);
                b.sort_by_key(Pixel::channels);
                assert_eq!(a, b);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn segment_mode_at_zero_tolerance_is_a_no_op() {
        let grid = PixelGrid::new(1, 3, vec![gray(10), gray(900), gray(40)]).unwrap();
        let config = SortConfig {
            tolerance: 0.0,
            ..SortConfig::default()
        };
        let pipeline = SortPipeline::new(SortMode::Segment, config).unwrap();
        assert_eq!(pipeline.process(grid.clone()).await.unwrap(), grid);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn diffusion_with_no_iterations_is_a_no_op() {
        let grid = PixelGrid::new(2, 2, vec![gray(1), gray(20000), gray(300), gray(65000)]).unwrap();
        let config = SortConfig {
            iterations: 0,
            ..SortConfig::default()
        };
        let pipeline = SortPipeline::new(SortMode::Diffusion, config).unwrap();

        let mut calls = 0;
        let out = pipeline
            .process_with_progress(grid.clone(), |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(out, grid);
        assert_eq!(calls, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn diffusion_preserves_dimensions() {
        let pixels = (0..7 * 3).map(|i| gray((i * 3000) as u16)).collect();
        let grid = PixelGrid::new(7, 3, pixels).unwrap();
        let config = SortConfig {
            search_radius: 2,
            iterations: 2,
            seed: Some(1),
            ..SortConfig::default()
        };
        let out = SortPipeline::new(SortMode::Diffusion, config)
            .unwrap()
            .process(grid)
            .await
            .unwrap();
        assert_eq!(out.dimensions(), (7, 3));
    }
}
