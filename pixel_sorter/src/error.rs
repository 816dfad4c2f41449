// THEORY:
// Every failure the engine can hit is terminal. There is no retry path and no
// partial output: a batch transformation either finishes or reports exactly why
// it stopped. `SortError` is the single error type the library hands back; the
// binary wraps it with context and exits.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode destination image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: usize, height: usize },

    #[error("tolerance must be a non-negative number, got {0}")]
    InvalidTolerance(f64),

    #[error("unknown sort mode {0} (expected 0 = segment, 1 = diffusion)")]
    UnknownMode(u8),

    #[error("a column worker failed: {0}")]
    WorkerFailed(#[from] tokio::task::JoinError),

    #[error("the locking grid is still shared after all workers joined")]
    GridStillShared,
}
