// THEORY:
// This file is the main entry point for the `pixel_sorter` library crate.
// It exports the `SortPipeline` and its configuration (`SortConfig`, `SortMode`)
// as the high-level interface to the engine: hand it a decoded `PixelGrid`, get
// the reordered grid back.
//
// The building blocks live in `core_modules` and stay public for callers that
// want a single stage (one column's run table, one neighbor lookup). The
// concurrent drivers for both modes live in `parallel_pipeline`, and the image
// decode/encode collaborators in `core_modules::utils::image_helper`.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::grid::PixelGrid;
pub use error::SortError;
pub use pipeline::{SortConfig, SortMode, SortPipeline};
