pub mod column_segmenter;
pub mod diffusion_worker;
pub mod grid;
pub mod lock_grid;
pub mod neighbor_locator;
pub mod pixel;
pub mod run_sorter;
pub mod smart_pixel;
pub mod utils;
