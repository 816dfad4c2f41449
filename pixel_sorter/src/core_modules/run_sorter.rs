// THEORY:
// The `RunSorter` reorders one column in place: each run from the segmenter's
// table is sorted by descending total intensity, brightest at the top. Runs never
// exchange pixels with each other, so boundaries hold by construction.
//
// A column is a self-contained unit of work. It shares no memory with any other
// column, which is what lets the segment mode sort every column at once without
// a single lock.

use crate::core_modules::column_segmenter::{ColumnSegmenter, Run};
use crate::core_modules::pixel::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct RunSorter {
    segmenter: ColumnSegmenter,
}

impl RunSorter {
    pub fn new(segmenter: ColumnSegmenter) -> Self {
        Self { segmenter }
    }

    /// Sorts a single run slice, brightest first.
    pub fn sort_run(run: &mut [Pixel]) {
        run.sort_by(|a, b| b.intensity().cmp(&a.intensity()));
    }

    /// Segments `column`, then sorts every run in place.
    /// Returns the run table that was used.
    pub fn sort_column(&self, column: &mut [Pixel]) -> Vec<Run> {
        let runs = self.segmenter.segment(column);
        for run in &runs {
            Self::sort_run(&mut column[run.range()]);
        }
        runs
    }
}
