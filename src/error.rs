use thiserror::Error;

/// Input validation failures, raised at the API boundary before any search
/// arithmetic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("container dimensions must be positive, got {length}x{width}")]
    EmptyContainer { length: u32, width: u32 },
    #[error("item dimensions must be positive, got {length}x{width}")]
    EmptyItem { length: u32, width: u32 },
}
