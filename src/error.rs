/// Usage errors. Geometric misses are `Option`/`bool`, never errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("flat coordinate list must have an even length, got {0}")]
    OddCoordinates(usize),
    #[error("a polygon needs at least 2 points, got {0}")]
    NotEnoughPoints(usize),
    #[error("tag registry is full, at most 64 tags can be allocated")]
    TagSpaceExhausted,
}
