pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Declared length prefix disagrees with the bytes received
    #[error("Size mismatch: declared {declared} bytes, received {actual} bytes")]
    SizeMismatch { declared: usize, actual: usize },

    /// Buffer shorter than the fixed layout
    #[error("Buffer too short: expected {expected} bytes, got {actual} bytes")]
    TooShort { expected: usize, actual: usize },
}
