// THEORY:
// The `SmartPixel` module holds the pairwise comparisons. A single pixel says
// nothing about similarity; these functions quantify how two pixels relate, and
// each "lens" serves exactly one consumer:
// - `rgb_distance`: Manhattan distance over R, G, B. The neighbor locator's
//   similarity metric. Alpha is deliberately left out of it.
// - `relative_difference` / `breaks_run`: the per-channel relative difference
//   used by the column segmenter. All four channels count here, alpha included.

pub mod smart_pixel {
    use crate::core_modules::pixel::pixel::*;

    pub type ColorDistance = u32;
    pub type RelativeDifference = f64;

    /// Sum of absolute R, G and B differences.
    pub fn rgb_distance(a: &Pixel, b: &Pixel) -> ColorDistance {
        a.red.abs_diff(b.red) as ColorDistance
            + a.green.abs_diff(b.green) as ColorDistance
            + a.blue.abs_diff(b.blue) as ColorDistance
    }

    /// `|a - b| / ((a + b) / 2)` for one channel pair.
    ///
    /// Two zero channels are identical, so 0/0 is defined as 0 instead of NaN.
    pub fn relative_difference(a: Channel, b: Channel) -> RelativeDifference {
        let mean = (a as f64 + b as f64) / 2.0;
        if mean == 0.0 {
            return 0.0;
        }
        a.abs_diff(b) as f64 / mean
    }

    /// True when any channel's relative difference meets or exceeds `tolerance`.
    pub fn breaks_run(previous: &Pixel, current: &Pixel, tolerance: f64) -> bool {
        previous
            .channels()
            .iter()
            .zip(current.channels().iter())
            .any(|(&p, &c)| relative_difference(p, c) >= tolerance)
    }
}
