// THEORY:
// The `parallel_pipeline` module owns the concurrency of both modes. Column jobs
// are CPU-bound, so each one runs on tokio's blocking pool and the futures are
// joined with `try_join_all`. A join is a hard barrier: nothing after it starts
// until every job before it has finished.
//
// 1.  **Segment mode** (`ColumnSortPool`): the grid is taken apart into owned
//     columns, every column is segmented and sorted by its own job, and the grid
//     is reassembled. Columns share no memory, so there is no locking and a single
//     join.
// 2.  **Diffusion mode** (`DiffusionScheduler`): the grid becomes a shared
//     `LockGrid`. Each iteration shuffles the column order, spawns one
//     `DiffusionWorker` per column and joins them all before the next iteration
//     begins. Iterations never overlap.
//
// Randomness is never shared between jobs. The scheduler's own generator shuffles
// the columns and hands every worker a fresh, independently seeded generator.

use crate::core_modules::column_segmenter::ColumnSegmenter;
use crate::core_modules::diffusion_worker::{DiffusionWorker, WorkerReport};
use crate::core_modules::grid::{PixelGrid, PixelSource};
use crate::core_modules::lock_grid::LockGrid;
use crate::core_modules::neighbor_locator::NeighborLocator;
use crate::core_modules::run_sorter::RunSorter;
use crate::error::SortError;
use futures::future::try_join_all;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Pixels visited and swaps made across one iteration's worker reports.
fn iteration_totals(reports: &[WorkerReport]) -> (usize, usize) {
    reports
        .iter()
        .fold((0, 0), |(visited, swaps), r| (visited + r.visited, swaps + r.swaps))
}

/// Sorts every column of a grid concurrently.
pub struct ColumnSortPool {
    sorter: RunSorter,
}

impl ColumnSortPool {
    pub fn new(tolerance: f64) -> Self {
        Self {
            sorter: RunSorter::new(ColumnSegmenter::new(tolerance)),
        }
    }

    pub async fn run(&self, grid: PixelGrid) -> Result<PixelGrid, SortError> {
        let (width, height) = grid.dimensions();

        let jobs = grid.into_columns().into_iter().map(|mut column| {
            let sorter = self.sorter;
            tokio::task::spawn_blocking(move || {
                let runs = sorter.sort_column(&mut column).len();
                (column, runs)
            })
        });
        let sorted = try_join_all(jobs).await?;

        let total_runs: usize = sorted.iter().map(|(_, runs)| runs).sum();
        info!("sorted {width} columns ({total_runs} runs)");

        PixelGrid::from_columns(width, height, sorted.into_iter().map(|(c, _)| c).collect())
    }
}

/// Tunables for a diffusion run.
#[derive(Debug, Clone)]
pub struct DiffusionSettings {
    pub search_radius: usize,
    pub iterations: usize,
    pub noise: u32,
    pub seed: Option<u64>,
}

pub struct DiffusionScheduler {
    settings: DiffusionSettings,
}

impl DiffusionScheduler {
    pub fn new(settings: DiffusionSettings) -> Self {
        Self { settings }
    }

    pub async fn run(&self, grid: PixelGrid) -> Result<PixelGrid, SortError> {
        self.run_with_progress(grid, |_| {}).await
    }

    /// Runs every iteration, calling `on_iteration` with the number of completed
    /// iterations after each barrier.
    pub async fn run_with_progress<F>(
        &self,
        grid: PixelGrid,
        mut on_iteration: F,
    ) -> Result<PixelGrid, SortError>
    where
        F: FnMut(usize),
    {
        let locator = NeighborLocator::new(self.settings.search_radius, self.settings.noise);
        let mut rng = match self.settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let (width, _) = grid.dimensions();
        let grid = Arc::new(LockGrid::from(grid));

        for iteration in 0..self.settings.iterations {
            let mut columns: Vec<usize> = (0..width).collect();
            columns.shuffle(&mut rng);

            let jobs = columns.into_iter().map(|x| {
                let grid = Arc::clone(&grid);
                let worker = DiffusionWorker::new(x, locator, ChaCha8Rng::seed_from_u64(rng.next_u64()));
                tokio::task::spawn_blocking(move || worker.run(&grid))
            });
            let reports: Vec<WorkerReport> = try_join_all(jobs).await?;

            let (visited, swaps) = iteration_totals(&reports);
            debug!(
                "iteration {} finished: {} workers, {visited} pixels visited, {swaps} swaps",
                iteration + 1,
                reports.len()
            );
            on_iteration(iteration + 1);
        }

        info!(
            "diffusion finished after {} iterations (radius {}, noise {})",
            self.settings.iterations, self.settings.search_radius, self.settings.noise
        );

        let grid = Arc::try_unwrap(grid).map_err(|_| SortError::GridStillShared)?;
        grid.into_grid()
    }
}
