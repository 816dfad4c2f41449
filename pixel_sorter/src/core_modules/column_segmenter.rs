// THEORY:
// The `ColumnSegmenter` cuts one column into runs: maximal vertical spans whose
// consecutive pixels stay "similar". Similarity is the per-channel relative
// difference against the previous pixel; the first pixel where any channel
// reaches the tolerance starts a new run.
//
// Runs are transient. They are computed once, as a static table, before the column
// is sorted, so sorting can never move a boundary. The table always covers the
// whole column: runs are contiguous, non-empty, and their lengths sum to the
// column height.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::smart_pixel::smart_pixel::breaks_run;
use std::ops::Range;

/// A half-open vertical span `[start, end)` within one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSegmenter {
    tolerance: f64,
}

impl ColumnSegmenter {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Length of the run that begins at `start`.
    ///
    /// Scans downward comparing each pixel with its predecessor and stops at the
    /// first break. Returns 0 only when `start` is past the end of the column.
    pub fn run_length(&self, column: &[Pixel], start: usize) -> usize {
        if start >= column.len() {
            return 0;
        }

        let mut previous = &column[start];
        for (offset, current) in column[start + 1..].iter().enumerate() {
            if breaks_run(previous, current, self.tolerance) {
                return offset + 1;
            }
            previous = current;
        }
        column.len() - start
    }

    /// Computes the full run table for a column, top to bottom.
    pub fn segment(&self, column: &[Pixel]) -> Vec<Run> {
        let mut runs = Vec::new();
        let mut start = 0;
        while start < column.len() {
            let end = start + self.run_length(column, start);
            runs.push(Run { start, end });
            start = end;
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(v: u16) -> Pixel {
        Pixel::new(v, v, v, u16::MAX)
    }

    #[test]
    fn uniform_column_is_one_run() {
        let column = vec![gray(1000); 7];
        let runs = ColumnSegmenter::new(0.1).segment(&column);
        assert_eq!(runs, vec![Run { start: 0, end: 7 }]);
    }

    #[test]
    fn breaks_at_the_first_dissimilar_pixel() {
        // 1000 -> 1040 is a 3.9% step, 1040 -> 2000 is 63%.
        let column = vec![gray(1000), gray(1040), gray(2000), gray(2010)];
        let segmenter = ColumnSegmenter::new(0.1);

        assert_eq!(segmenter.run_length(&column, 0), 2);
        assert_eq!(
            segmenter.segment(&column),
            vec![Run { start: 0, end: 2 }, Run { start: 2, end: 4 }]
        );
    }

    #[test]
    fn zero_tolerance_makes_every_run_length_one() {
        let column = vec![gray(10), gray(10), gray(30)];
        let runs = ColumnSegmenter::new(0.0).segment(&column);
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn black_pixels_do_not_fault() {
        let column = vec![Pixel::default(); 4];
        let runs = ColumnSegmenter::new(0.1).segment(&column);
        assert_eq!(runs, vec![Run { start: 0, end: 4 }]);
    }

    #[test]
    fn runs_tile_the_column() {
        let column: Vec<Pixel> = [5u16, 500, 510, 9000, 9100, 40, 41, 42, 60000]
            .iter()
            .map(|&v| gray(v))
            .collect();
        let segmenter = ColumnSegmenter::new(0.1);
        let runs = segmenter.segment(&column);

        let mut expected_start = 0;
        for run in &runs {
            assert_eq!(run.start, expected_start);
            assert!(run.len() >= 1 && run.len() <= column.len());
            // Inside a run nothing breaks; a boundary is only declared on a break.
            for y in run.start + 1..run.end {
                assert!(!breaks_run(&column[y - 1], &column[y], segmenter.tolerance()));
            }
            if run.end < column.len() {
                assert!(breaks_run(&column[run.end - 1], &column[run.end], segmenter.tolerance()));
            }
            expected_start = run.end;
        }
        assert_eq!(expected_start, column.len());
    }

    #[test]
    fn empty_column_has_no_runs() {
        let segmenter = ColumnSegmenter::new(0.1);
        assert!(segmenter.segment(&[]).is_empty());
        assert_eq!(segmenter.run_length(&[], 0), 0);
    }
}
